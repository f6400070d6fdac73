use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::traits::{SearchResult, WebSearcher};

/// Encyclopedic backend over the MediaWiki search API.
pub struct WikipediaSearcher {
    lang: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: String,
    #[serde(default)]
    snippet: String,
}

impl WikipediaSearcher {
    pub fn new(lang: &str) -> Result<Self> {
        Ok(Self {
            lang: lang.to_string(),
            client: super::http_client()?,
        })
    }

    fn api_url(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }

    /// `https://{lang}.wikipedia.org/wiki/Title_With_Underscores`
    pub fn page_url(&self, title: &str) -> Result<String> {
        let mut url = Url::parse(&format!("https://{}.wikipedia.org/wiki/", self.lang))
            .context("invalid Wikipedia base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Wikipedia base URL cannot hold a path"))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));
        Ok(url.to_string())
    }
}

#[async_trait]
impl WebSearcher for WikipediaSearcher {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, lang = self.lang.as_str(), "Wikipedia search");

        let limit = max_results.to_string();
        let data: SearchResponse = self
            .client
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("utf8", "1"),
            ])
            .send()
            .await
            .context("Wikipedia request failed")?
            .error_for_status()
            .context("Wikipedia returned an error status")?
            .json()
            .await
            .context("Failed to parse Wikipedia response")?;

        let hits = data.query.map(|q| q.search).unwrap_or_default();
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits.into_iter().take(max_results) {
            results.push(SearchResult {
                url: self.page_url(&hit.title)?,
                title: hit.title,
                snippet: hit.snippet,
            });
        }

        debug!(query, count = results.len(), "Wikipedia search complete");
        Ok(results)
    }
}
