//! Curated lookup tables used by dedup, query building and source scoring.
//!
//! Every table is plain data with a `Default` holding the production lists,
//! so tests can hand the engine a minimal fixture instead.

use regex::Regex;

/// Organization names recognized in claim text, with their spelling variants.
#[derive(Debug, Clone)]
pub struct EntityTable {
    entries: Vec<(String, Vec<String>)>,
    pattern: Option<Regex>,
}

impl EntityTable {
    /// `entries` is a list of `(canonical, variants)`. Variants are matched
    /// case-insensitively on word boundaries.
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        let mut alternatives: Vec<String> = entries
            .iter()
            .flat_map(|(_, variants)| variants.iter().map(|v| regex::escape(&v.to_lowercase())))
            .collect();
        // Longest first so "european environment agency" beats "eea"-style prefixes.
        alternatives.sort_by_key(|a| std::cmp::Reverse(a.len()));

        let pattern = if alternatives.is_empty() {
            None
        } else {
            Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).ok()
        };

        Self { entries, pattern }
    }

    /// Canonical names of every entity mentioned in already-lowercased text.
    pub fn find(&self, lowered: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        pattern
            .find_iter(lowered)
            .filter_map(|m| self.canonical(m.as_str()))
            .map(str::to_string)
            .collect()
    }

    fn canonical(&self, variant: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, variants)| variants.iter().any(|v| v.eq_ignore_ascii_case(variant)))
            .map(|(canonical, _)| canonical.as_str())
    }
}

impl Default for EntityTable {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("deloitte", &["deloitte"]),
            ("lancet", &["lancet"]),
            ("fda", &["fda"]),
            ("gartner", &["gartner"]),
            ("buffer", &["buffer"]),
            ("booking.com", &["booking.com", "bookingcom"]),
            ("eea", &["european environment agency", "eea"]),
            ("world health organization", &["world health organization"]),
            ("cdc", &["cdc"]),
            ("mayo clinic", &["mayo clinic"]),
        ];
        Self::new(
            table
                .iter()
                .map(|(canonical, variants)| {
                    (
                        canonical.to_string(),
                        variants.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// Named-source patterns for query enhancement: `Gartner ... 48` becomes
/// `Gartner report 48`.
#[derive(Debug, Clone)]
pub struct NamedSource {
    pub name: String,
    pub keyword: String,
}

pub fn default_named_sources() -> Vec<NamedSource> {
    [("Gartner", "report"), ("Buffer", "survey")]
        .into_iter()
        .map(|(name, keyword)| NamedSource {
            name: name.to_string(),
            keyword: keyword.to_string(),
        })
        .collect()
}

/// Everything the verification engine looks up by name or domain.
#[derive(Debug, Clone)]
pub struct VerificationTables {
    pub entities: EntityTable,
    pub named_sources: Vec<NamedSource>,
    /// URL regexes for sources that always pass the relevance filter.
    pub quality_domains: Vec<Regex>,
    /// URL substrings for institutional sources.
    pub tier1: Vec<String>,
    /// URL substrings for reputable media and academic sources.
    pub tier2: Vec<String>,
    /// Words dropped from keyword-only query variants.
    pub query_stopwords: Vec<String>,
}

impl VerificationTables {
    pub fn is_quality_domain(&self, url_lower: &str) -> bool {
        self.quality_domains.iter().any(|re| re.is_match(url_lower))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for VerificationTables {
    fn default() -> Self {
        let quality = [
            r"\.gov", r"\.edu", r"\.org",
            r"reuters\.", r"bloomberg\.", r"wsj\.", r"bbc\.", r"guardian\.", r"nytimes\.",
            r"harvard\.", r"stanford\.", r"mit\.", r"oxford\.", r"cambridge\.",
            r"mckinsey\.", r"deloitte\.", r"gartner\.", r"statista\.", r"forrester\.",
            r"fortune\.", r"forbes\.", r"economist\.", r"ft\.com", r"npr\.org",
            r"who\.int", r"oecd\.", r"europa\.eu", r"worldbank\.", r"imf\.",
        ];

        Self {
            entities: EntityTable::default(),
            named_sources: default_named_sources(),
            quality_domains: quality.iter().filter_map(|p| Regex::new(p).ok()).collect(),
            tier1: strings(&[
                ".gov", ".edu", ".org", "nature.", "lancet.", "nejm.", "who.int", "europa.eu",
                "mckinsey.", "deloitte.", "gartner.", "statista.", "oecd.", "imf.", "worldbank.",
                "wttc.org", "unwto.org", "iata.org", "fda.gov", "cdc.gov", "eea.europa.eu",
            ]),
            tier2: strings(&[
                "reuters.", "bloomberg.", "wsj.", "ft.com", "economist.", "harvard.", "stanford.",
                "mit.edu", "pewresearch.", "weforum.", "booking.com", "forbes.", "fortune.",
                "bbc.com", "npr.org", "guardian.", "nytimes.", "washingtonpost.",
            ]),
            query_stopwords: strings(&["according", "study", "report", "research"]),
        }
    }
}
