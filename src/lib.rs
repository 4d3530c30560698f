use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Store load error: {0}")]
    StoreLoad(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod app;
pub mod chat;
pub mod chunking;
pub mod config;
pub mod ingest;
pub mod ollama;
pub mod scrape;
pub mod server;
pub mod store;
