//! Search query construction for claim verification.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::dedup::NUMBER;
use super::tables::{NamedSource, VerificationTables};

static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").unwrap());
static DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+(?:,\d+)*(?:\.\d+)?)").unwrap());

/// Make a claim more searchable: quote percentages, attach the report keyword
/// to named sources, quote dollar figures. Rewrites apply in that order.
pub fn enhance_query(claim_text: &str, named_sources: &[NamedSource]) -> String {
    let mut query = PERCENTAGE
        .replace_all(claim_text, |caps: &Captures| format!("\"{} percent\"", &caps[1]))
        .into_owned();

    for source in named_sources {
        let Ok(pattern) = Regex::new(&format!(r"{}.*?(\d+)", regex::escape(&source.name))) else {
            continue;
        };
        query = pattern
            .replace_all(&query, |caps: &Captures| {
                format!("{} {} {}", source.name, source.keyword, &caps[1])
            })
            .into_owned();
    }

    DOLLARS
        .replace_all(&query, |caps: &Captures| format!("\"${}\" savings", &caps[1]))
        .into_owned()
}

/// Up to two distinct variants: the enhanced query, then its keywords
/// (longer than three characters, minus stopwords) followed by its numbers.
pub fn query_variants(claim_text: &str, tables: &VerificationTables) -> Vec<String> {
    let enhanced = enhance_query(claim_text, &tables.named_sources);

    let numbers: Vec<&str> = NUMBER.find_iter(&enhanced).map(|m| m.as_str()).collect();
    let keywords: Vec<&str> = enhanced
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .filter(|w| {
            let lower = w.to_lowercase();
            !tables.query_stopwords.iter().any(|s| *s == lower)
        })
        .collect();
    let keyword_only = keywords
        .iter()
        .chain(numbers.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut variants: Vec<String> = Vec::with_capacity(2);
    for candidate in [enhanced, keyword_only] {
        let candidate = candidate.trim().to_string();
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants.truncate(2);
    variants
}
