//! Wikipedia lead-section lookup through the MediaWiki query API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const USER_AGENT: &str = concat!("gen-narration/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Wikipedia returned HTTP {0}")]
    Status(u16),

    #[error("No Wikipedia page matches '{0}'")]
    NotFound(String),

    #[error("'{0}' is a disambiguation page; use a more specific keyword")]
    Disambiguation(String),

    #[error("Invalid page title '{title}': {reason}")]
    InvalidTitle { title: String, reason: String },
}

/// Something that can produce a topic summary for a keyword.
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn summary(&self, keyword: &str) -> Result<String, WikiError>;
}

/// Fetches the lead section of a Wikipedia article.
///
/// Titles are matched exactly (redirects followed, no search suggestions).
pub struct WikipediaClient {
    client: Client,
    endpoint: String,
    max_chars: usize,
}

impl WikipediaClient {
    /// Create a client for the `language` edition of Wikipedia.
    pub fn new(language: &str, max_chars: usize) -> Result<Self, WikiError> {
        let valid = !language.is_empty()
            && language
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(WikiError::InvalidLanguage(language.to_string()));
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            endpoint: format!("https://{}.wikipedia.org/w/api.php", language),
            max_chars,
        })
    }
}

#[async_trait]
impl SummarySource for WikipediaClient {
    async fn summary(&self, keyword: &str) -> Result<String, WikiError> {
        log::debug!("GET {} titles={}", self.endpoint, keyword);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", keyword),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::Status(status.as_u16()));
        }

        let body: QueryResponse = response.json().await?;
        let extract = page_extract(body, keyword)?;
        Ok(lead_section(&extract, self.max_chars))
    }
}

// MediaWiki response types (formatversion=2)

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    invalidreason: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

/// Pull the plain-text extract out of a query response.
fn page_extract(response: QueryResponse, keyword: &str) -> Result<String, WikiError> {
    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| WikiError::NotFound(keyword.to_string()))?;

    if page.invalid {
        return Err(WikiError::InvalidTitle {
            title: page.title,
            reason: page.invalidreason.unwrap_or_default(),
        });
    }
    if page.missing {
        return Err(WikiError::NotFound(page.title));
    }
    if page.pageprops.is_some_and(|p| p.disambiguation.is_some()) {
        return Err(WikiError::Disambiguation(page.title));
    }

    Ok(page.extract.unwrap_or_default())
}

/// Text before the first `==` section heading, trimmed and cut to `max_chars`
/// characters.
pub fn lead_section(extract: &str, max_chars: usize) -> String {
    extract
        .split("==")
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(max_chars)
        .collect()
}
