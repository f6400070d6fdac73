//! Relevance filtering and confidence scoring of search results.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::dedup::NUMBER;
use super::tables::VerificationTables;
use crate::traits::SearchResult;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").unwrap());
static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static PERCENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?%").unwrap());

/// Weights and thresholds of the confidence formula.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    /// Confidence when the provider returned nothing at all.
    pub no_results: f64,
    /// Confidence when results existed but none were relevant.
    pub no_relevant_results: f64,
    pub base: f64,
    /// Multiplier on the best keyword-overlap ratio.
    pub overlap_weight: f64,
    pub exact_percentage_floor: f64,
    pub exact_number_floor: f64,
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
    /// Bonus at two and at three or more relevant results.
    pub consistency_two: f64,
    pub consistency_three: f64,
    pub max_confidence: f64,
    /// Title overlap (plus number bonus) a result must exceed to count as relevant.
    pub relevance_threshold: f64,
    pub number_match_bonus: f64,
    pub max_sources: usize,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            no_results: 0.1,
            no_relevant_results: 0.2,
            base: 0.5,
            overlap_weight: 0.4,
            exact_percentage_floor: 0.5,
            exact_number_floor: 0.4,
            tier1: 0.4,
            tier2: 0.25,
            tier3: 0.1,
            consistency_two: 0.1,
            consistency_three: 0.2,
            max_confidence: 0.95,
            relevance_threshold: 0.25,
            number_match_bonus: 0.3,
            max_sources: 3,
        }
    }
}

fn words(text_lower: &str) -> HashSet<&str> {
    WORD.find_iter(text_lower).map(|m| m.as_str()).collect()
}

fn overlap_ratio(claim: &HashSet<&str>, title: &HashSet<&str>) -> f64 {
    claim.intersection(title).count() as f64 / claim.len().max(1) as f64
}

/// Keep results from quality domains, with enough title overlap, or that
/// repeat one of the claim's numbers. Input order is preserved.
pub fn filter_relevant(
    results: &[SearchResult],
    claim_text: &str,
    tables: &VerificationTables,
    policy: &ScoringPolicy,
) -> Vec<SearchResult> {
    let claim_lower = claim_text.to_lowercase();
    let claim_words = words(&claim_lower);
    let claim_numbers: HashSet<&str> = NUMBER.find_iter(claim_text).map(|m| m.as_str()).collect();

    results
        .iter()
        .filter(|result| {
            let title_lower = result.title.to_lowercase();
            let title_words = words(&title_lower);
            let number_match = NUMBER
                .find_iter(&result.title)
                .any(|m| claim_numbers.contains(m.as_str()));

            let mut relevance = overlap_ratio(&claim_words, &title_words);
            if number_match {
                relevance += policy.number_match_bonus;
            }

            tables.is_quality_domain(&result.url.to_lowercase())
                || relevance > policy.relevance_threshold
                || number_match
        })
        .cloned()
        .collect()
}

/// Source-credibility class of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    Institutional,
    Reputable,
    Other,
}

pub fn source_tier(url: &str, tables: &VerificationTables) -> SourceTier {
    let url = url.to_lowercase();
    if tables.tier1.iter().any(|i| url.contains(i.as_str())) {
        SourceTier::Institutional
    } else if tables.tier2.iter().any(|i| url.contains(i.as_str())) {
        SourceTier::Reputable
    } else {
        SourceTier::Other
    }
}

/// Confidence in `[no_results, max_confidence]` for a claim given the raw
/// result count and the results that survived [`filter_relevant`].
pub fn score_confidence(
    claim_text: &str,
    raw_count: usize,
    relevant: &[SearchResult],
    tables: &VerificationTables,
    policy: &ScoringPolicy,
) -> f64 {
    if raw_count == 0 {
        return policy.no_results;
    }
    if relevant.is_empty() {
        return policy.no_relevant_results;
    }

    let claim_lower = claim_text.to_lowercase();
    let claim_words = words(&claim_lower);
    let claim_numbers: Vec<&str> = BARE_NUMBER.find_iter(&claim_lower).map(|m| m.as_str()).collect();
    let claim_percentages: Vec<&str> = PERCENT_TOKEN.find_iter(&claim_lower).map(|m| m.as_str()).collect();

    let mut content: f64 = 0.0;
    for result in relevant {
        let title = result.title.to_lowercase();
        let title_words = words(&title);
        content = content.max(overlap_ratio(&claim_words, &title_words) * policy.overlap_weight);

        for pct in &claim_percentages {
            if title.contains(pct) || title.contains(&pct.replace('%', " percent")) {
                content = content.max(policy.exact_percentage_floor);
            }
        }

        let padded = format!(" {title} ");
        for num in &claim_numbers {
            if padded.contains(&format!(" {num} ")) || title.contains(&format!("{num}%")) {
                content = content.max(policy.exact_number_floor);
            }
        }
    }

    let (mut tier1, mut tier2, mut tier3): (f64, f64, f64) = (0.0, 0.0, 0.0);
    for result in relevant {
        match source_tier(&result.url, tables) {
            SourceTier::Institutional => tier1 = policy.tier1,
            SourceTier::Reputable => tier2 = policy.tier2,
            SourceTier::Other => tier3 = policy.tier3,
        }
    }

    let consistency = match relevant.len() {
        n if n >= 3 => policy.consistency_three,
        2 => policy.consistency_two,
        _ => 0.0,
    };

    let total = policy.base + content.max(0.0) + tier1 + tier2 + tier3 + consistency;
    total.min(policy.max_confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, url: &str) -> SearchResult {
        SearchResult::new(title, url)
    }

    #[test]
    fn empty_provider_response_scores_floor() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy::default();
        assert_eq!(score_confidence("anything", 0, &[], &tables, &policy), 0.1);
    }

    #[test]
    fn irrelevant_results_score_point_two() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy::default();
        let raw = vec![result("Cooking pasta at home", "https://recipes.example/pasta")];
        let relevant = filter_relevant(&raw, "48% of workers are remote", &tables, &policy);
        assert!(relevant.is_empty());
        assert_eq!(
            score_confidence("48% of workers are remote", raw.len(), &relevant, &tables, &policy),
            0.2
        );
    }

    #[test]
    fn filter_keeps_quality_domains_and_number_matches() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy::default();
        let raw = vec![
            result("Unrelated headline", "https://www.bls.gov/news"),
            result("Survey shows 48% figure", "https://blog.example/a"),
            result("Nothing in common", "https://blog.example/b"),
        ];
        let kept = filter_relevant(&raw, "48% of workers are remote", &tables, &policy);
        let urls: Vec<&str> = kept.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://www.bls.gov/news", "https://blog.example/a"]);
    }

    #[test]
    fn strong_support_is_capped() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy::default();
        let relevant = vec![
            result("48% of workers are remote, Gartner says", "https://www.gartner.com/en/newsroom"),
            result("Remote workers: 48 percent", "https://www.reuters.com/business"),
            result("48% remote", "https://news.example.com/remote"),
        ];
        let score = score_confidence("48% of workers are remote", 3, &relevant, &tables, &policy);
        assert_eq!(score, 0.95);
    }

    #[test]
    fn single_unknown_source_scores_moderately() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy::default();
        // Overlap {workers} of {workers, are, remote} = 1/3 -> 0.133; tier3 0.1.
        let relevant = vec![result("Workers and productivity", "https://blog.example/x")];
        let score = score_confidence("Workers are remote", 1, &relevant, &tables, &policy);
        assert!((score - (0.5 + 0.4 / 3.0 + 0.1)).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn tiers_are_classified_in_priority_order() {
        let tables = VerificationTables::default();
        assert_eq!(source_tier("https://www.cdc.gov/x", &tables), SourceTier::Institutional);
        assert_eq!(source_tier("https://www.forbes.com/x", &tables), SourceTier::Reputable);
        assert_eq!(source_tier("https://medium.com/x", &tables), SourceTier::Other);
    }

    #[test]
    fn custom_policy_changes_the_cap() {
        let tables = VerificationTables::default();
        let policy = ScoringPolicy {
            max_confidence: 0.6,
            ..ScoringPolicy::default()
        };
        let relevant = vec![result("Workers are remote", "https://www.cdc.gov/x")];
        assert_eq!(score_confidence("Workers are remote", 1, &relevant, &tables, &policy), 0.6);
    }
}
