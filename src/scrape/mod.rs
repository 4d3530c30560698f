
use anyhow::{Context, Result, anyhow};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

const FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Fetch the seed page and extract its visible paragraph text.
///
/// Paragraphs are joined with newlines and trimmed. A page with no `<p>`
/// text is an error rather than an empty result, so a missing seed never
/// silently produces an unusable empty store.
#[inline]
pub fn fetch_seed_text(url: &str) -> Result<String> {
    info!("Fetching seed content from {}", url);

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(FETCH_TIMEOUT_SECONDS)))
        .build()
        .into();

    let html = agent
        .get(url)
        .call()
        .and_then(|mut resp| resp.body_mut().read_to_string())
        .with_context(|| format!("Failed to fetch seed page: {}", url))?;

    let text = extract_paragraph_text(&html)?;

    info!("Extracted {} chars of seed text from {}", text.len(), url);
    Ok(text)
}

/// Extract visible `<p>` text from an HTML document, newline separated.
#[inline]
pub fn extract_paragraph_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("p").map_err(|e| anyhow!("Failed to parse paragraph selector: {}", e))?;

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    debug!("Found {} non-empty paragraphs", paragraphs.len());

    let text = paragraphs.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(anyhow!("Page contains no paragraph text"));
    }

    Ok(text)
}
