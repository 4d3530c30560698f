use super::*;
use tempfile::TempDir;

#[test]
fn defaults_when_no_file_exists() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path()).expect("load should succeed");

    assert_eq!(config.ollama.chat_model, "llama2");
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 0);
    assert_eq!(config.store.directory, "db");
    assert_eq!(config.store.top_k, 4);
    assert_eq!(config.seed.url, None);
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load(temp_dir.path()).expect("load should succeed");
    config.ollama.chat_model = "mistral".to_string();
    config.store.top_k = 6;
    config.seed.url = Some("https://example.com/faq".to_string());

    config.save().expect("save should succeed");

    let reloaded = Config::load(temp_dir.path()).expect("reload should succeed");
    assert_eq!(reloaded, config);
}

#[test]
fn partial_file_fills_in_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[ollama]\nchat_model = \"phi3\"\n",
    )
    .expect("should write config");

    let config = Config::load(temp_dir.path()).expect("load should succeed");
    assert_eq!(config.ollama.chat_model, "phi3");
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.store.directory, "db");
}

#[test]
fn rejects_empty_model_name() {
    let mut config = Config::default();
    config.ollama.chat_model = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));
}

#[test]
fn rejects_overlap_not_smaller_than_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 100;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(100, 100))
    ));
}

#[test]
fn rejects_zero_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));
}

#[test]
fn rejects_zero_top_k() {
    let mut config = Config::default();
    config.store.top_k = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK(0))));
}

#[test]
fn rejects_invalid_seed_url() {
    let mut config = Config::default();
    config.seed.url = Some("not-a-url".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidSeedUrl(_))
    ));
}

#[test]
fn rejects_invalid_protocol() {
    let mut config = Config::default();
    config.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn store_path_joins_base_dir_and_directory() {
    let config = Config {
        base_dir: PathBuf::from("/tmp/ragchat"),
        ..Config::default()
    };
    assert_eq!(config.store_path(), PathBuf::from("/tmp/ragchat/db"));
}

#[test]
fn ollama_url_formats_correctly() {
    let config = Config::default();
    let url = config.ollama.ollama_url().expect("url should parse");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}
