//! Fact-check search backends, selected by `FACTCHECK_PROVIDER`.

mod duckduckgo;
mod serper;
mod wikipedia;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use postcraft_common::{Config, ConfigError, SearchProviderKind};

use crate::traits::WebSearcher;

pub use duckduckgo::DuckDuckGoSearcher;
pub use serper::SerperSearcher;
pub use wikipedia::WikipediaSearcher;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(SEARCH_TIMEOUT)
        .user_agent(concat!("postcraft/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Build the searcher the configuration names.
pub fn build_searcher(config: &Config) -> Result<Arc<dyn WebSearcher>> {
    let searcher: Arc<dyn WebSearcher> = match config.search_provider {
        SearchProviderKind::DuckDuckGo => Arc::new(DuckDuckGoSearcher::new()?),
        SearchProviderKind::Wikipedia => Arc::new(WikipediaSearcher::new(&config.wikipedia_lang)?),
        SearchProviderKind::Serper => {
            let key = config
                .serper_api_key
                .as_deref()
                .ok_or(ConfigError::Missing("SERPER_API_KEY"))?;
            Arc::new(SerperSearcher::new(key)?)
        }
    };
    Ok(searcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_configured_backend() {
        let mut config = Config::for_tests();
        assert_eq!(build_searcher(&config).unwrap().name(), "duckduckgo");

        config.search_provider = SearchProviderKind::Wikipedia;
        assert_eq!(build_searcher(&config).unwrap().name(), "wikipedia");

        config.search_provider = SearchProviderKind::Serper;
        assert!(build_searcher(&config).is_err());

        config.serper_api_key = Some("key".into());
        assert_eq!(build_searcher(&config).unwrap().name(), "serper");
    }
}
