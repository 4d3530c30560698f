use super::*;

fn default_config() -> ChunkingConfig {
    ChunkingConfig {
        chunk_size: 1000,
        chunk_overlap: 0,
    }
}

#[test]
fn empty_input_yields_no_segments() {
    assert!(split_text("", "empty.txt", &default_config()).is_empty());
    assert!(split_text("   \n\t ", "blank.txt", &default_config()).is_empty());
}

#[test]
fn short_input_yields_single_segment() {
    let segments = split_text("hello world", "greeting.txt", &default_config());
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].content, "hello world");
    assert_eq!(segments[0].source, "greeting.txt");
    assert_eq!(segments[0].chunk_index, 0);
}

#[test]
fn count_is_ceil_of_length_over_chunk_size() {
    let config = default_config();

    for len in [1, 999, 1000, 1001, 2000, 2400, 3001] {
        let text = "a".repeat(len);
        let segments = split_text(&text, "t.txt", &config);
        assert_eq!(
            segments.len(),
            expected_segment_count(len, config.chunk_size),
            "wrong segment count for length {}",
            len
        );
    }
}

#[test]
fn segments_reassemble_to_input_with_zero_overlap() {
    let text = "x".repeat(2500);
    let segments = split_text(&text, "t.txt", &default_config());

    let reassembled: String = segments.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(reassembled, text);
}

#[test]
fn chunk_indices_are_sequential() {
    let text = "y".repeat(3500);
    let segments = split_text(&text, "t.txt", &default_config());

    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(segment.chunk_index, i);
    }
}

#[test]
fn overlap_repeats_tail_of_previous_segment() {
    let config = ChunkingConfig {
        chunk_size: 10,
        chunk_overlap: 3,
    };
    let text = "abcdefghijklmnopqrst";
    let segments = split_text(text, "t.txt", &config);

    assert!(segments.len() >= 2);
    let first_tail: String = segments[0].content.chars().rev().take(3).collect();
    let second_head: String = segments[1].content.chars().take(3).collect();
    let first_tail: String = first_tail.chars().rev().collect();
    assert_eq!(first_tail, second_head);
}

#[test]
fn splits_on_char_boundaries_for_multibyte_text() {
    let config = ChunkingConfig {
        chunk_size: 5,
        chunk_overlap: 0,
    };
    // 13 multibyte chars; byte-based splitting would panic or produce
    // invalid UTF-8 here.
    let text = "日本語のテキストを分割する";
    let segments = split_text(text, "jp.txt", &config);

    assert_eq!(segments.len(), 3);
    let reassembled: String = segments.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(reassembled, text);
}

#[test]
fn expected_count_handles_boundaries() {
    assert_eq!(expected_segment_count(0, 1000), 0);
    assert_eq!(expected_segment_count(1, 1000), 1);
    assert_eq!(expected_segment_count(1000, 1000), 1);
    assert_eq!(expected_segment_count(1001, 1000), 2);
    assert_eq!(expected_segment_count(2400, 1000), 3);
}
