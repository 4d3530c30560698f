
use serde::Serialize;
use tracing::{debug, error, info};

use crate::ChatError;
use crate::ollama::OllamaClient;
use crate::store::VectorStore;

/// Canned reply for a bare greeting; bypasses retrieval and generation.
pub const GREETING_REPLY: &str =
    "Hi there! Ask me a question, or upload a document to give me something to work with.";

/// Fixed user-facing reply when the model call fails. The underlying error
/// never propagates past a single interaction.
pub const FALLBACK_REPLY: &str = "An error occurred. Please try again.";

/// The answer produced for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Labels of the segments used as context, in retrieval order.
    pub sources: Vec<String>,
}

impl Answer {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Whether the trimmed input is a bare greeting. Equality is an exact
/// case-insensitive match; "hi there" is a real query.
#[inline]
pub fn is_greeting(query: &str) -> bool {
    query.trim().eq_ignore_ascii_case("hi")
}

/// Format the fixed retrieval-augmented prompt.
fn build_prompt(context: &[String], query: &str) -> String {
    format!(
        "use the following context to answer: {}\n\nQuestion: {}",
        context.join("\n\n"),
        query
    )
}

/// Answer a user query.
///
/// A bare greeting gets the canned reply. With an absent or empty store the
/// query goes to the model directly; otherwise the top-k nearest segments
/// are retrieved and prepended as context. Any failure along the way is
/// caught here and mapped to [`FALLBACK_REPLY`].
#[inline]
pub async fn answer_query(
    query: &str,
    store: Option<&VectorStore>,
    ollama: &OllamaClient,
    top_k: usize,
) -> Answer {
    if is_greeting(query) {
        debug!("Greeting detected, returning canned reply");
        return Answer::plain(GREETING_REPLY);
    }

    match try_answer(query, store, ollama, top_k).await {
        Ok(answer) => answer,
        Err(e) => {
            error!("Failed to answer query: {}", e);
            Answer::plain(FALLBACK_REPLY)
        }
    }
}

async fn try_answer(
    query: &str,
    store: Option<&VectorStore>,
    ollama: &OllamaClient,
    top_k: usize,
) -> Result<Answer, ChatError> {
    let Some(store) = store else {
        info!("No store available, querying model directly");
        return generate_direct(query, ollama);
    };

    if store.count_segments().await? == 0 {
        info!("Store is empty, querying model directly");
        return generate_direct(query, ollama);
    }

    let query_vector = ollama
        .embed(query)
        .map_err(|e| ChatError::Embedding(format!("Query embedding failed: {}", e)))?;

    let results = store.search_similar(&query_vector, top_k).await?;
    debug!("Retrieved {} segments for query", results.len());

    if results.is_empty() {
        return generate_direct(query, ollama);
    }

    let context: Vec<String> = results.iter().map(|r| r.content.clone()).collect();
    let mut sources: Vec<String> = Vec::new();
    for result in &results {
        if !sources.contains(&result.source) {
            sources.push(result.source.clone());
        }
    }

    let prompt = build_prompt(&context, query);
    let text = ollama
        .generate(&prompt)
        .map_err(|e| ChatError::Generation(e.to_string()))?;

    Ok(Answer { text, sources })
}

fn generate_direct(query: &str, ollama: &OllamaClient) -> Result<Answer, ChatError> {
    let text = ollama
        .generate(query)
        .map_err(|e| ChatError::Generation(e.to_string()))?;
    Ok(Answer::plain(text))
}
