use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::traits::{SearchResult, WebSearcher};

const DDG_URL: &str = "https://api.duckduckgo.com/";

/// DuckDuckGo Instant Answer API. No credential required.
pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    results: Vec<Topic>,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

/// Either a leaf topic or a named group of topics.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Topic {
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl DuckDuckGoSearcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
        })
    }
}

impl InstantAnswer {
    fn into_results(self, max_results: usize) -> Vec<SearchResult> {
        let mut out = Vec::new();

        if !self.abstract_url.is_empty() {
            let title = if self.heading.is_empty() {
                self.abstract_text.clone()
            } else {
                self.heading.clone()
            };
            out.push(SearchResult {
                url: self.abstract_url,
                title,
                snippet: self.abstract_text,
            });
        }

        let mut stack: Vec<Topic> = self.results;
        stack.extend(self.related_topics);
        flatten(stack, &mut out);

        out.truncate(max_results);
        out
    }
}

fn flatten(topics: Vec<Topic>, out: &mut Vec<SearchResult>) {
    for topic in topics {
        if !topic.topics.is_empty() {
            flatten(topic.topics, out);
            continue;
        }
        if topic.first_url.is_empty() || out.iter().any(|r| r.url == topic.first_url) {
            continue;
        }
        out.push(SearchResult {
            url: topic.first_url,
            title: topic.text.clone(),
            snippet: topic.text,
        });
    }
}

#[async_trait]
impl WebSearcher for DuckDuckGoSearcher {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, "DuckDuckGo search");

        let answer: InstantAnswer = self
            .client
            .get(DDG_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("DuckDuckGo request failed")?
            .error_for_status()
            .context("DuckDuckGo returned an error status")?
            .json()
            .await
            .context("Failed to parse DuckDuckGo response")?;

        let results = answer.into_results(max_results);
        debug!(query, count = results.len(), "DuckDuckGo search complete");
        Ok(results)
    }
}
