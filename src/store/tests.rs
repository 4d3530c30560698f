use super::*;
use tempfile::TempDir;

fn test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    (config, temp_dir)
}

fn record(id: &str, vector: Vec<f32>, content: &str, source: &str, index: u32) -> SegmentRecord {
    SegmentRecord {
        id: id.to_string(),
        vector,
        content: content.to_string(),
        source: source.to_string(),
        chunk_index: index,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Simple deterministic vector pointing mostly along one axis.
fn axis_vector(dim: usize, axis: usize) -> Vec<f32> {
    (0..dim)
        .map(|i| if i == axis { 1.0 } else { 0.01 })
        .collect()
}

#[tokio::test]
async fn create_makes_store_directory_exist() {
    let (config, _temp_dir) = test_config();
    assert!(!VectorStore::exists(&config));

    let store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    assert!(VectorStore::exists(&config));
    assert_eq!(
        store.count_segments().await.expect("count should succeed"),
        0
    );
}

#[tokio::test]
async fn open_fails_when_directory_is_absent() {
    let (config, _temp_dir) = test_config();

    let result = VectorStore::open(&config).await;
    assert!(matches!(result, Err(ChatError::StoreLoad(_))));
}

#[tokio::test]
async fn add_segments_increments_count() {
    let (config, _temp_dir) = test_config();
    let mut store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    let records = vec![
        record("a", axis_vector(8, 0), "first", "one.txt", 0),
        record("b", axis_vector(8, 1), "second", "one.txt", 1),
        record("c", axis_vector(8, 2), "third", "two.txt", 0),
    ];
    store
        .add_segments(records)
        .await
        .expect("add should succeed");

    assert_eq!(
        store.count_segments().await.expect("count should succeed"),
        3
    );
}

#[tokio::test]
async fn first_insert_adopts_embedding_dimension() {
    let (config, _temp_dir) = test_config();
    let mut store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    // Table starts with the placeholder dimension and is recreated on the
    // first insert with the real one.
    store
        .add_segments(vec![record("a", axis_vector(8, 0), "text", "f.txt", 0)])
        .await
        .expect("add should succeed");

    assert_eq!(store.vector_dimension(), 8);
}

#[tokio::test]
async fn mismatched_dimension_on_populated_store_is_an_error() {
    let (config, _temp_dir) = test_config();
    let mut store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    store
        .add_segments(vec![record("a", axis_vector(8, 0), "text", "f.txt", 0)])
        .await
        .expect("add should succeed");

    let result = store
        .add_segments(vec![record("b", axis_vector(16, 0), "other", "f.txt", 1)])
        .await;
    assert!(matches!(result, Err(ChatError::Store(_))));
}

#[tokio::test]
async fn search_returns_nearest_segment_first() {
    let (config, _temp_dir) = test_config();
    let mut store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    store
        .add_segments(vec![
            record("a", axis_vector(8, 0), "about cats", "pets.txt", 0),
            record("b", axis_vector(8, 4), "about dogs", "pets.txt", 1),
            record("c", axis_vector(8, 7), "about fish", "pets.txt", 2),
        ])
        .await
        .expect("add should succeed");

    let results = store
        .search_similar(&axis_vector(8, 4), 2)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "about dogs");
    assert!(results[0].distance <= results[1].distance);
}

#[tokio::test]
async fn search_on_empty_store_returns_no_results() {
    let (config, _temp_dir) = test_config();
    let store = VectorStore::create(&config)
        .await
        .expect("create should succeed");

    let results = store
        .search_similar(&axis_vector(768, 0), 4)
        .await
        .expect("search should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn reopen_preserves_segments_and_retrieval_order() {
    let (config, _temp_dir) = test_config();

    {
        let mut store = VectorStore::create(&config)
            .await
            .expect("create should succeed");
        store
            .add_segments(vec![
                record("a", axis_vector(8, 1), "alpha", "s.txt", 0),
                record("b", axis_vector(8, 3), "beta", "s.txt", 1),
                record("c", axis_vector(8, 6), "gamma", "s.txt", 2),
            ])
            .await
            .expect("add should succeed");
    }

    let reopened = VectorStore::open(&config)
        .await
        .expect("open should succeed");
    assert_eq!(
        reopened
            .count_segments()
            .await
            .expect("count should succeed"),
        3
    );
    assert_eq!(reopened.vector_dimension(), 8);

    let results = reopened
        .search_similar(&axis_vector(8, 3), 3)
        .await
        .expect("search should succeed");
    assert_eq!(results[0].content, "beta");
}
