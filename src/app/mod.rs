
use serde::Serialize;
use std::fmt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::ChatError;
use crate::chat::{Answer, FALLBACK_REPLY, answer_query};
use crate::config::Config;
use crate::ingest::{IngestInput, IngestReport, ingest_batch, ingest_seed};
use crate::ollama::OllamaClient;
use crate::store::VectorStore;

/// Start-up states. Construction either reaches `Serving` or fails fatally;
/// there is no transition out of `Serving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitStage {
    Uninitialized,
    ModelsReady,
    StoreReady,
    Serving,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::ModelsReady => "ModelsReady",
            Self::StoreReady => "StoreReady",
            Self::Serving => "Serving",
        };
        f.write_str(name)
    }
}

/// Tracks interaction identity so an unchanged question resubmitted
/// back-to-back returns the previous answer instead of regenerating it.
#[derive(Debug, Default)]
pub struct InteractionLog {
    counter: u64,
    last: Option<(String, Answer)>,
}

impl InteractionLog {
    /// Assign the next interaction number.
    pub fn next_interaction(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Answer previously recorded for this exact (trimmed) question, if it
    /// was the most recent interaction.
    pub fn cached(&self, question: &str) -> Option<Answer> {
        self.last
            .as_ref()
            .filter(|(q, _)| q == question.trim())
            .map(|(_, a)| a.clone())
    }

    pub fn record(&mut self, question: &str, answer: Answer) {
        self.last = Some((question.trim().to_string(), answer));
    }
}

struct SessionState {
    store: Option<VectorStore>,
    interactions: InteractionLog,
}

/// Outcome of one question submission.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    #[serde(flatten)]
    pub answer: Answer,
    /// True when the answer was served from the duplicate-submission guard.
    pub cached: bool,
    pub interaction: u64,
}

/// Snapshot of the running application for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub store_exists: bool,
    pub segment_count: u64,
    pub chat_model: String,
    pub embedding_model: String,
    pub seed_error: Option<String>,
}

/// Explicit application context constructed once at start-up and shared by
/// the ingestion workflow and the query orchestrator. The mutable session
/// state sits behind a single mutex: each user-triggered action runs to
/// completion before the next one touches the store.
pub struct AppContext {
    pub config: Config,
    pub ollama: OllamaClient,
    state: Mutex<SessionState>,
    seed_error: Option<String>,
}

impl AppContext {
    /// Walk the start-up state machine: construct and health-check the
    /// models, then load or create the vector store (optionally seeding it
    /// from the configured URL), ending in the `Serving` stage.
    ///
    /// Model construction failure and store load failure are fatal. A failed
    /// seed ingestion is not: the store stays absent and the failure is
    /// surfaced via [`StatusReport::seed_error`].
    #[inline]
    pub async fn bootstrap(config: Config) -> Result<Self, ChatError> {
        let mut stage = InitStage::Uninitialized;

        let ollama = OllamaClient::new(&config)
            .map_err(|e| ChatError::Initialization(e.to_string()))?;
        ollama.health_check().map_err(|e| {
            error!("Ollama health check failed: {}", e);
            ChatError::Initialization(format!(
                "Ollama is unavailable: {}. Make sure Ollama is running and the models are pulled.",
                e
            ))
        })?;
        stage = advance(stage, InitStage::ModelsReady);

        let mut seed_error = None;
        let store = if VectorStore::exists(&config) {
            Some(VectorStore::open(&config).await?)
        } else {
            let mut store = None;
            if let Some(url) = &config.seed.url {
                match ingest_seed(url, &mut store, &ollama, &config).await {
                    Ok(count) => info!("Seeded new store with {} segments from {}", count, url),
                    Err(e) => {
                        warn!("Seed ingestion failed, starting without seed content: {}", e);
                        seed_error = Some(e.to_string());
                    }
                }
            }
            store
        };
        stage = advance(stage, InitStage::StoreReady);

        advance(stage, InitStage::Serving);
        Ok(Self {
            config,
            ollama,
            state: Mutex::new(SessionState {
                store,
                interactions: InteractionLog::default(),
            }),
            seed_error,
        })
    }

    /// Answer a question, consulting the duplicate-submission guard first.
    #[inline]
    pub async fn ask(&self, question: &str) -> AskOutcome {
        let mut state = self.state.lock().await;
        let interaction = state.interactions.next_interaction();

        if let Some(answer) = state.interactions.cached(question) {
            info!("Interaction {}: unchanged question, reusing previous answer", interaction);
            return AskOutcome {
                answer,
                cached: true,
                interaction,
            };
        }

        let answer = answer_query(
            question,
            state.store.as_ref(),
            &self.ollama,
            self.config.store.top_k,
        )
        .await;
        // A failure reply is never recorded: resubmitting the same question
        // must reach the model again instead of replaying the error.
        if answer.text != FALLBACK_REPLY {
            state.interactions.record(question, answer.clone());
        }

        AskOutcome {
            answer,
            cached: false,
            interaction,
        }
    }

    /// Ingest a batch of uploaded inputs.
    #[inline]
    pub async fn ingest(&self, inputs: Vec<IngestInput>) -> IngestReport {
        let mut state = self.state.lock().await;
        ingest_batch(inputs, &mut state.store, &self.ollama, &self.config).await
    }

    #[inline]
    pub async fn status(&self) -> Result<StatusReport, ChatError> {
        let state = self.state.lock().await;
        let segment_count = match &state.store {
            Some(store) => store.count_segments().await?,
            None => 0,
        };

        Ok(StatusReport {
            store_exists: state.store.is_some(),
            segment_count,
            chat_model: self.ollama.chat_model().to_string(),
            embedding_model: self.ollama.embedding_model().to_string(),
            seed_error: self.seed_error.clone(),
        })
    }
}

fn advance(from: InitStage, to: InitStage) -> InitStage {
    info!("Initialization: {} -> {}", from, to);
    to
}
