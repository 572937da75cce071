//! Bibliographic search capability and the OpenAlex client.

use crate::abstracts::{reconstruct_abstract, InvertedIndex};
use crate::models::Record;
use async_trait::async_trait;
use litgraph_core::config::SearchSettings;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode search response: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    /// Works published strictly after this year.
    pub min_year: i32,
    /// Requested page size.
    pub limit: usize,
}

/// One item as the search service returns it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Work {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub authorships: Vec<Authorship>,
    pub abstract_inverted_index: Option<InvertedIndex>,
    pub publication_year: Option<i32>,
    pub doi: Option<String>,
    #[serde(default)]
    pub cited_by_count: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Authorship {
    #[serde(default)]
    pub author: AuthorRef,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthorRef {
    pub display_name: Option<String>,
}

impl Work {
    pub fn into_record(self) -> Record {
        let abstract_text = match &self.abstract_inverted_index {
            Some(index) if !index.is_empty() => reconstruct_abstract(index),
            _ => "No abstract available".to_string(),
        };
        Record {
            title: self.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Untitled".into()),
            authors: self
                .authorships
                .into_iter()
                .filter_map(|a| a.author.display_name)
                .collect(),
            abstract_text,
            year: self.publication_year,
            external_id: self.doi,
            source_url: self.id,
            cited_by_count: self.cited_by_count,
        }
    }
}

/// `search(keywords, minYear) -> works`. Ranking and the result cap are
/// applied by the caller.
#[async_trait]
pub trait ScholarlySearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Work>, SearchError>;
}

#[derive(Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

/// Client for the OpenAlex `/works` endpoint.
pub struct OpenAlexClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexClient {
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(format!("litgraph/{} (mailto:{})", env!("CARGO_PKG_VERSION"), settings.mailto))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn works_url(&self) -> String {
        format!("{}/works", self.base_url)
    }

    /// The `filter` parameter for a query.
    /// Commas separate filters, so they are dropped from keywords.
    pub fn filter_for(query: &SearchQuery) -> String {
        let terms: Vec<String> = query
            .keywords
            .iter()
            .map(|kw| kw.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|kw| !kw.is_empty())
            .collect();
        format!("title.search:{},publication_year:>{}", terms.join(" "), query.min_year)
    }
}

#[async_trait]
impl ScholarlySearch for OpenAlexClient {
    fn name(&self) -> &str {
        "openalex"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Work>, SearchError> {
        let filter = Self::filter_for(query);
        let per_page = query.limit.to_string();
        debug!(%filter, limit = query.limit, "openalex search");

        let response = self
            .client
            .get(self.works_url())
            .query(&[
                ("filter", filter.as_str()),
                ("per_page", per_page.as_str()),
                ("sort", "cited_by_count:desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status { status: status.as_u16(), body });
        }

        let page: WorksPage = serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        debug!(count = page.results.len(), "openalex results");
        Ok(page.results)
    }
}
