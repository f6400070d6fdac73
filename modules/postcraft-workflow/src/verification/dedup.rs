//! Claim deduplication by (numbers, entities) fingerprint.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use postcraft_common::Claim;

use super::tables::EntityTable;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PERCENT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*percent").unwrap());
static BOOKING_POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"booking\.com(?:['’]s)?").unwrap());
pub(crate) static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?%?").unwrap());

/// Lowercase, collapse whitespace, and canonicalize percent and org spellings.
pub fn normalize_claim_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = WHITESPACE.replace_all(&lowered, " ");
    let percent = PERCENT_WORD.replace_all(&collapsed, "${1}%");
    BOOKING_POSSESSIVE.replace_all(&percent, "booking.com").into_owned()
}

/// Canonical fingerprint of one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFingerprint {
    pub numbers: BTreeSet<String>,
    pub entities: BTreeSet<String>,
    pub signature: String,
}

impl ClaimFingerprint {
    pub fn of(text: &str, entities: &EntityTable) -> Self {
        let normalized = normalize_claim_text(text);
        let numbers: BTreeSet<String> = NUMBER
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect();
        let found: BTreeSet<String> = entities.find(&normalized).into_iter().collect();

        // Claims with neither numbers nor entities all share "_".
        let signature = format!(
            "{}_{}",
            numbers.iter().cloned().collect::<Vec<_>>().join("-"),
            found.iter().cloned().collect::<Vec<_>>().join("-")
        );

        Self {
            numbers,
            entities: found,
            signature,
        }
    }

    /// Same statistic attributed to the same source.
    pub fn overlaps(&self, other: &ClaimFingerprint) -> bool {
        !self.numbers.is_disjoint(&other.numbers) && !self.entities.is_disjoint(&other.entities)
    }
}

/// Result of grouping a claim list.
#[derive(Debug, Clone)]
pub struct DedupGroups {
    /// First occurrence of each group, verbatim and in input order.
    pub unique: Vec<Claim>,
    /// For every input claim, the index into `unique` of its representative.
    pub assignment: Vec<usize>,
}

/// Assign every claim to the first earlier claim it duplicates.
pub fn group_claims(claims: &[Claim], entities: &EntityTable) -> DedupGroups {
    let mut unique: Vec<Claim> = Vec::new();
    let mut retained: Vec<ClaimFingerprint> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut assignment = Vec::with_capacity(claims.len());

    for claim in claims {
        let fingerprint = ClaimFingerprint::of(&claim.text, entities);

        let existing = seen
            .get(&fingerprint.signature)
            .copied()
            .or_else(|| retained.iter().position(|r| r.overlaps(&fingerprint)));

        match existing {
            Some(idx) => assignment.push(idx),
            None => {
                let idx = unique.len();
                seen.insert(fingerprint.signature.clone(), idx);
                retained.push(fingerprint);
                unique.push(claim.clone());
                assignment.push(idx);
            }
        }
    }

    DedupGroups { unique, assignment }
}

/// Drop later duplicates, keeping first occurrences verbatim. Idempotent.
pub fn deduplicate(claims: &[Claim], entities: &EntityTable) -> Vec<Claim> {
    group_claims(claims, entities).unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_common::ClaimSeverity;

    fn claim(text: &str) -> Claim {
        Claim::new(text, ClaimSeverity::High)
    }

    #[test]
    fn normalization_canonicalizes_percent_and_orgs() {
        assert_eq!(
            normalize_claim_text("  Booking.com's   survey: 45 percent  of travelers "),
            "booking.com survey: 45% of travelers"
        );
    }

    #[test]
    fn same_statistic_from_same_source_collapses() {
        let claims = vec![
            claim("Buffer survey: 80% prefer remote"),
            claim("80% of workers prefer remote, per Buffer"),
        ];
        let unique = deduplicate(&claims, &EntityTable::default());
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].text, "Buffer survey: 80% prefer remote");
    }

    #[test]
    fn shared_number_and_entity_is_a_duplicate_even_with_extra_tokens() {
        let claims = vec![
            claim("Gartner says 48% of employees work remotely"),
            claim("In 2025, Gartner found 48 percent of staff were remote"),
        ];
        assert_eq!(deduplicate(&claims, &EntityTable::default()).len(), 1);
    }

    #[test]
    fn same_number_different_source_is_kept() {
        let claims = vec![
            claim("Gartner: 48% of workers are remote"),
            claim("Deloitte: 48% of hospitals use AI"),
        ];
        assert_eq!(deduplicate(&claims, &EntityTable::default()).len(), 2);
    }

    #[test]
    fn signature_joins_sorted_numbers_and_entities() {
        let fingerprint = ClaimFingerprint::of("Gartner and Buffer: 48% then 12%", &EntityTable::default());
        assert_eq!(fingerprint.signature, "12%-48%_buffer-gartner");
    }

    #[test]
    fn claims_without_tokens_share_one_signature() {
        let claims = vec![
            claim("Remote work is popular"),
            claim("Hybrid schedules are growing"),
            claim("Buffer tracks remote teams"),
        ];
        let groups = group_claims(&claims, &EntityTable::default());
        assert_eq!(groups.unique.len(), 2);
        assert_eq!(groups.assignment, vec![0, 0, 1]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let claims = vec![
            claim("Buffer survey: 80% prefer remote"),
            claim("80% of workers prefer remote, per Buffer"),
            claim("CDC reports 12% rise"),
            claim("The CDC saw a 12% rise in cases"),
            claim("Mayo Clinic trial enrolled 300 patients"),
            claim("No numbers here"),
        ];
        let table = EntityTable::default();
        let once = deduplicate(&claims, &table);
        let twice = deduplicate(&once, &table);
        assert_eq!(once, twice);
    }
}
