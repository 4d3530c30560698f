#[cfg(test)]
mod tests;

use tracing::debug;

use crate::config::ChunkingConfig;

/// A bounded chunk of source text ready for embedding and storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The segment text.
    pub content: String,
    /// Label identifying where the text came from (file name or URL).
    pub source: String,
    /// Index of this segment within its source, in document order.
    pub chunk_index: usize,
}

/// Split raw text into fixed-size segments.
///
/// Segments hold at most `chunk_size` characters, with `chunk_overlap`
/// characters carried over from the end of each segment into the next.
/// Boundaries are measured in characters, never bytes, so a split cannot
/// land inside a code point. Empty or whitespace-only input yields no
/// segments.
#[inline]
pub fn split_text(text: &str, source: &str, config: &ChunkingConfig) -> Vec<Segment> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let chunk_size = config.chunk_size.max(1);
    // Overlap is validated against chunk size at config load, but clamp here
    // so a bad caller cannot loop forever.
    let step = chunk_size.saturating_sub(config.chunk_overlap).max(1);

    let mut segments = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let content: String = chars[start..end].iter().collect();
        segments.push(Segment {
            content,
            source: source.to_string(),
            chunk_index,
        });
        chunk_index += 1;

        if end == chars.len() {
            break;
        }
        start += step;
    }

    debug!(
        "Split {} chars from '{}' into {} segments",
        chars.len(),
        source,
        segments.len()
    );

    segments
}

/// Number of segments `split_text` produces for an input of `len` characters
/// with zero overlap.
#[inline]
pub fn expected_segment_count(len: usize, chunk_size: usize) -> usize {
    if len == 0 {
        return 0;
    }
    len.div_ceil(chunk_size.max(1))
}
