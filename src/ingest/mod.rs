
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ChatError;
use crate::chunking::split_text;
use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::scrape::fetch_seed_text;
use crate::store::{SegmentRecord, VectorStore};

/// One raw text input to ingest, paired with an identifying label.
#[derive(Debug, Clone)]
pub struct IngestInput {
    /// Origin label (uploaded file name or URL)
    pub label: String,
    /// Raw bytes; must decode as UTF-8
    pub bytes: Vec<u8>,
}

impl IngestInput {
    #[inline]
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    #[inline]
    pub fn from_text(label: impl Into<String>, text: &str) -> Self {
        Self {
            label: label.into(),
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Per-input result of an ingestion batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub label: String,
    pub segments_added: usize,
    pub error: Option<String>,
}

impl ItemOutcome {
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of an ingestion batch. Failures are reported per item; one bad
/// input never aborts the rest of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub items: Vec<ItemOutcome>,
    pub segments_added: usize,
}

impl IngestReport {
    #[inline]
    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(ItemOutcome::succeeded)
    }
}

/// Ingest a batch of raw text inputs: decode, chunk, embed, and append to
/// the vector store.
///
/// When no store exists yet, the first input that produces segments creates
/// it. Each input is processed independently; a failed input is recorded in
/// the report and the batch continues.
#[inline]
pub async fn ingest_batch(
    inputs: Vec<IngestInput>,
    store: &mut Option<VectorStore>,
    ollama: &OllamaClient,
    config: &Config,
) -> IngestReport {
    let mut items = Vec::with_capacity(inputs.len());
    let mut segments_added = 0;

    for input in inputs {
        let label = input.label.clone();
        match ingest_one(input, store, ollama, config).await {
            Ok(count) => {
                info!("Ingested '{}' ({} segments)", label, count);
                segments_added += count;
                items.push(ItemOutcome {
                    label,
                    segments_added: count,
                    error: None,
                });
            }
            Err(e) => {
                warn!("Failed to ingest '{}': {}", label, e);
                items.push(ItemOutcome {
                    label,
                    segments_added: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    IngestReport {
        items,
        segments_added,
    }
}

async fn ingest_one(
    input: IngestInput,
    store: &mut Option<VectorStore>,
    ollama: &OllamaClient,
    config: &Config,
) -> Result<usize, ChatError> {
    let text = String::from_utf8(input.bytes).map_err(|e| {
        ChatError::Decoding(format!("'{}' is not valid UTF-8 text: {}", input.label, e))
    })?;

    let segments = split_text(&text, &input.label, &config.chunking);
    if segments.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = segments.iter().map(|s| s.content.clone()).collect();
    let vectors = ollama
        .embed_batch(&texts)
        .map_err(|e| ChatError::Embedding(e.to_string()))?;

    let created_at = Utc::now().to_rfc3339();
    let records: Vec<SegmentRecord> = segments
        .into_iter()
        .zip(vectors)
        .map(|(segment, vector)| SegmentRecord {
            id: Uuid::new_v4().to_string(),
            vector,
            content: segment.content,
            source: segment.source,
            chunk_index: segment.chunk_index as u32,
            created_at: created_at.clone(),
        })
        .collect();

    let count = records.len();

    if store.is_none() {
        *store = Some(VectorStore::create(config).await?);
    }
    // The store was just created above if it was absent.
    if let Some(store) = store.as_mut() {
        store.add_segments(records).await?;
    }

    Ok(count)
}

/// Scrape the configured seed page and ingest it as a single input.
///
/// Only meaningful when no store exists at start-up; a failed fetch or empty
/// extraction leaves the store absent rather than creating an unusable
/// empty one.
#[inline]
pub async fn ingest_seed(
    url: &str,
    store: &mut Option<VectorStore>,
    ollama: &OllamaClient,
    config: &Config,
) -> Result<usize, ChatError> {
    let text = fetch_seed_text(url).map_err(|e| ChatError::Fetch(e.to_string()))?;

    // Errors past the fetch keep their own kind (embedding, store, ...)
    ingest_one(IngestInput::from_text(url, &text), store, ollama, config).await
}
