use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::types::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchProviderKind {
    DuckDuckGo,
    Wikipedia,
    Serper,
}

impl SearchProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProviderKind::DuckDuckGo => "duckduckgo",
            SearchProviderKind::Wikipedia => "wikipedia",
            SearchProviderKind::Serper => "serper",
        }
    }
}

impl fmt::Display for SearchProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchProviderKind::DuckDuckGo),
            "wikipedia" => Ok(SearchProviderKind::Wikipedia),
            "serper" => Ok(SearchProviderKind::Serper),
            other => Err(format!("unknown search provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComplianceMode {
    #[default]
    Standard,
    Strict,
}

impl FromStr for ComplianceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ComplianceMode::Standard),
            "strict" => Ok(ComplianceMode::Strict),
            other => Err(format!("expected 'standard' or 'strict', got '{other}'")),
        }
    }
}

/// Process configuration. Loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    // Generation service
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub embedding_model: String,

    // Fact-checking
    pub search_provider: SearchProviderKind,
    pub serper_api_key: Option<String>,
    pub wikipedia_lang: String,

    // Review and scheduling
    pub compliance_mode: ComplianceMode,
    pub default_tz: Tz,

    // Drafting
    pub org_name: String,
    pub platforms: Vec<Platform>,
    pub semantic_analysis: bool,
}

impl Config {
    /// Load from the process environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_redacted();
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let search_provider = match get("FACTCHECK_PROVIDER") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::Invalid {
                key: "FACTCHECK_PROVIDER",
                message,
            })?,
            None => SearchProviderKind::DuckDuckGo,
        };

        let compliance_mode = match get("COMPLIANCE_MODE") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::Invalid {
                key: "COMPLIANCE_MODE",
                message,
            })?,
            None => ComplianceMode::Standard,
        };

        let default_tz = get("DEFAULT_TZ")
            .unwrap_or_else(|| "Asia/Kolkata".to_string())
            .parse::<Tz>()
            .map_err(|e| ConfigError::Invalid {
                key: "DEFAULT_TZ",
                message: e.to_string(),
            })?;

        let platforms = match get("PLATFORMS") {
            Some(raw) => parse_platforms(&raw)?,
            None => Platform::ALL.to_vec(),
        };

        let semantic_analysis = match get("SEMANTIC_ANALYSIS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "SEMANTIC_ANALYSIS",
                message: format!("expected a boolean, got '{raw}'"),
            })?,
            None => false,
        };

        let config = Self {
            openai_api_key: get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            openai_base_url: get("OPENAI_BASE_URL"),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            search_provider,
            serper_api_key: get("SERPER_API_KEY"),
            wikipedia_lang: get("WIKIPEDIA_LANG").unwrap_or_else(|| "en".to_string()),
            compliance_mode,
            default_tz,
            org_name: get("ORG_NAME").unwrap_or_else(|| "Acme".to_string()),
            platforms,
            semantic_analysis,
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks. Run by the loaders and again by the orchestrator
    /// before any stage, so hand-built configs are held to the same rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }
        if self.search_provider == SearchProviderKind::Serper
            && self.serper_api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::Missing("SERPER_API_KEY"));
        }
        if self.platforms.is_empty() {
            return Err(ConfigError::Invalid {
                key: "PLATFORMS",
                message: "at least one platform is required".into(),
            });
        }
        if self.wikipedia_lang.is_empty()
            || !self.wikipedia_lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Invalid {
                key: "WIKIPEDIA_LANG",
                message: format!("'{}' is not a language code", self.wikipedia_lang),
            });
        }
        Ok(())
    }

    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{head}...({} chars)", val.chars().count())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        let platforms: Vec<&str> = self.platforms.iter().map(|p| p.as_str()).collect();

        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  OPENAI_MODEL: {}", self.openai_model);
        tracing::info!("  FACTCHECK_PROVIDER: {}", self.search_provider);
        tracing::info!("  SERPER_API_KEY: {}", preview_opt(&self.serper_api_key));
        tracing::info!("  COMPLIANCE_MODE: {:?}", self.compliance_mode);
        tracing::info!("  DEFAULT_TZ: {}", self.default_tz);
        tracing::info!("  PLATFORMS: {}", platforms.join(","));
        tracing::info!("  SEMANTIC_ANALYSIS: {}", self.semantic_analysis);
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn for_tests() -> Self {
        Self {
            openai_api_key: "sk-test".to_string(),
            openai_model: "gpt-4o".to_string(),
            openai_base_url: None,
            embedding_model: "text-embedding-3-small".to_string(),
            search_provider: SearchProviderKind::DuckDuckGo,
            serper_api_key: None,
            wikipedia_lang: "en".to_string(),
            compliance_mode: ComplianceMode::Standard,
            default_tz: chrono_tz::Asia::Kolkata,
            org_name: "Acme".to_string(),
            platforms: Platform::ALL.to_vec(),
            semantic_analysis: false,
        }
    }
}

fn parse_platforms(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    let mut platforms = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let platform: Platform = part.parse().map_err(|message| ConfigError::Invalid {
            key: "PLATFORMS",
            message,
        })?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
