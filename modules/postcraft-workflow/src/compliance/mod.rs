//! Rule-based compliance review of post text and its verified claims.

mod rules;

use tracing::debug;

use postcraft_common::{
    Claim, ClaimSeverity, ComplianceIssue, ComplianceMode, IssueSeverity, Platform, Review,
};

use crate::traits::PostReviewer;

pub use rules::ComplianceRules;

pub const RULE_PROFANITY: &str = "profanity_check";
pub const RULE_ABSOLUTE_CLAIMS: &str = "absolute_claims";
pub const RULE_LOW_CONFIDENCE: &str = "low_confidence_claim";
pub const RULE_UNSOURCED: &str = "unsourced_claim";
pub const RULE_ATTRIBUTION: &str = "attribution_note";
pub const RULE_STRICT_RESTRICTED: &str = "strict_mode_restricted";

pub struct ComplianceEngine {
    rules: ComplianceRules,
    mode: ComplianceMode,
}

impl ComplianceEngine {
    pub fn new(mode: ComplianceMode) -> Self {
        Self::with_rules(ComplianceRules::default(), mode)
    }

    pub fn with_rules(rules: ComplianceRules, mode: ComplianceMode) -> Self {
        Self { rules, mode }
    }

    pub fn mode(&self) -> ComplianceMode {
        self.mode
    }

    /// All issues for one post version, in check order.
    pub fn check(&self, text: &str, claims: &[Claim]) -> Vec<ComplianceIssue> {
        let lower = text.to_lowercase();
        let mut issues = Vec::new();

        for word in matching(&self.rules.profanity, &lower) {
            issues.push(ComplianceIssue {
                rule_id: RULE_PROFANITY.into(),
                severity: IssueSeverity::Minor,
                message: format!("Potential profanity detected: '{word}'"),
                suggestion: format!("Consider replacing '{word}' with a more professional alternative"),
            });
        }

        for phrase in matching(&self.rules.absolute_phrases, &lower) {
            issues.push(ComplianceIssue {
                rule_id: RULE_ABSOLUTE_CLAIMS.into(),
                severity: IssueSeverity::Major,
                message: format!("Absolute claim detected: '{phrase}'"),
                suggestion: format!(
                    "Soften the claim by replacing '{phrase}' with more qualified language like 'may help' or 'typically'"
                ),
            });
        }

        issues.extend(claims.iter().filter_map(claim_issue));

        if self.mode == ComplianceMode::Strict {
            for term in matching(&self.rules.strict_restricted, &lower) {
                issues.push(ComplianceIssue {
                    rule_id: RULE_STRICT_RESTRICTED.into(),
                    severity: IssueSeverity::Critical,
                    message: format!("Restricted term in strict mode: '{term}'"),
                    suggestion: format!("Remove or replace '{term}' to avoid potential regulatory issues"),
                });
            }
        }

        issues
    }
}

impl PostReviewer for ComplianceEngine {
    fn review(&self, platform: Platform, text: &str, claims: &[Claim]) -> Review {
        let review = Review::new(self.check(text, claims), claims.to_vec());
        debug!(
            platform = %platform,
            status = %review.status(),
            issues = review.issues().len(),
            "Compliance review"
        );
        review
    }
}

fn matching<'a>(terms: &'a [String], lower: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    terms
        .iter()
        .map(String::as_str)
        .filter(move |term| !term.is_empty() && lower.contains(&term.to_lowercase()))
}

/// Confidence tiering by claim severity. Low-severity claims are never flagged.
fn claim_issue(claim: &Claim) -> Option<ComplianceIssue> {
    let confidence = claim.confidence;
    let text = &claim.text;

    let (rule_id, severity, message, suggestion) = match claim.severity {
        ClaimSeverity::High if confidence < 0.3 => (
            RULE_LOW_CONFIDENCE,
            IssueSeverity::Major,
            format!("Low confidence claim: '{text}' (confidence: {confidence:.2})"),
            "Add a reliable source or soften the claim with qualifying language",
        ),
        ClaimSeverity::High if confidence < 0.5 && claim.sources.is_empty() => (
            RULE_UNSOURCED,
            IssueSeverity::Minor,
            format!("Medium confidence claim without sources: '{text}' (confidence: {confidence:.2})"),
            "Consider adding supporting sources to strengthen the claim",
        ),
        ClaimSeverity::High if confidence < 0.6 && claim.sources.len() >= 2 => (
            RULE_ATTRIBUTION,
            IssueSeverity::Minor,
            format!("Attribution available: '{text}' (confidence: {confidence:.2})"),
            "Claim has supporting sources with partial verification",
        ),
        ClaimSeverity::Medium if confidence < 0.25 => (
            RULE_LOW_CONFIDENCE,
            IssueSeverity::Minor,
            format!("Low confidence claim: '{text}' (confidence: {confidence:.2})"),
            "Consider adding supporting sources",
        ),
        _ => return None,
    };

    Some(ComplianceIssue {
        rule_id: rule_id.into(),
        severity,
        message,
        suggestion: suggestion.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_common::ReviewStatus;

    fn engine(mode: ComplianceMode) -> ComplianceEngine {
        ComplianceEngine::new(mode)
    }

    fn scored(severity: ClaimSeverity, confidence: f64, sources: usize) -> Claim {
        Claim::new("Claim text", severity)
            .with_confidence(confidence)
            .with_sources((0..sources).map(|i| format!("https://s{i}.gov")).collect())
    }

    #[test]
    fn absolute_phrases_flag_in_standard_mode() {
        let review = engine(ComplianceMode::Standard).review(
            Platform::Twitter,
            "Results guaranteed, 100% of the time",
            &[],
        );
        assert_eq!(review.status(), ReviewStatus::Flag);
        assert!(review
            .issues()
            .iter()
            .any(|i| i.rule_id == RULE_ABSOLUTE_CLAIMS && i.severity == IssueSeverity::Major));
    }

    #[test]
    fn strict_mode_blocks_restricted_terms() {
        let review = engine(ComplianceMode::Strict).review(
            Platform::Linkedin,
            "Results guaranteed, 100% of the time. We diagnose issues fast.",
            &[],
        );
        assert_eq!(review.status(), ReviewStatus::Block);
        let critical: Vec<_> = review
            .issues()
            .iter()
            .filter(|i| i.rule_id == RULE_STRICT_RESTRICTED)
            .collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].severity, IssueSeverity::Critical);
        assert_eq!(critical[0].message, "Restricted term in strict mode: 'diagnose'");
    }

    #[test]
    fn restricted_terms_ignored_in_standard_mode() {
        let review = engine(ComplianceMode::Standard).review(Platform::Twitter, "We diagnose", &[]);
        assert_eq!(review.status(), ReviewStatus::Pass);
        assert!(review.issues().is_empty());
    }

    #[test]
    fn profanity_is_minor_and_passes() {
        let review = engine(ComplianceMode::Standard).review(Platform::Instagram, "I hate Mondays", &[]);
        assert_eq!(review.status(), ReviewStatus::Pass);
        assert_eq!(review.issues()[0].rule_id, RULE_PROFANITY);
        assert_eq!(review.issues()[0].severity, IssueSeverity::Minor);
    }

    #[test]
    fn high_severity_low_confidence_is_major() {
        let issues = engine(ComplianceMode::Standard).check("", &[scored(ClaimSeverity::High, 0.2, 0)]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, RULE_LOW_CONFIDENCE);
        assert_eq!(issues[0].severity, IssueSeverity::Major);
        assert_eq!(issues[0].message, "Low confidence claim: 'Claim text' (confidence: 0.20)");
    }

    #[test]
    fn high_severity_tiers() {
        let e = engine(ComplianceMode::Standard);
        assert_eq!(e.check("", &[scored(ClaimSeverity::High, 0.4, 0)])[0].rule_id, RULE_UNSOURCED);
        assert!(e.check("", &[scored(ClaimSeverity::High, 0.4, 1)]).is_empty());
        assert_eq!(e.check("", &[scored(ClaimSeverity::High, 0.55, 2)])[0].rule_id, RULE_ATTRIBUTION);
        assert!(e.check("", &[scored(ClaimSeverity::High, 0.55, 1)]).is_empty());
        assert!(e.check("", &[scored(ClaimSeverity::High, 0.6, 3)]).is_empty());
    }

    #[test]
    fn medium_and_low_severity_tiers() {
        let e = engine(ComplianceMode::Standard);
        let medium = e.check("", &[scored(ClaimSeverity::Medium, 0.2, 0)]);
        assert_eq!(medium[0].severity, IssueSeverity::Minor);
        assert!(e.check("", &[scored(ClaimSeverity::Medium, 0.3, 0)]).is_empty());
        assert!(e.check("", &[scored(ClaimSeverity::Low, 0.1, 0)]).is_empty());
    }

    #[test]
    fn custom_rules_replace_the_defaults() {
        let rules = ComplianceRules::new(["darn"], Vec::<String>::new(), ["refund"]);
        let e = ComplianceEngine::with_rules(rules, ComplianceMode::Strict);
        let issues = e.check("Darn, no refund and guaranteed", &[]);
        let ids: Vec<&str> = issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(ids, vec![RULE_PROFANITY, RULE_STRICT_RESTRICTED]);
    }

    #[test]
    fn review_keeps_claims() {
        let claims = vec![scored(ClaimSeverity::Low, 0.9, 1)];
        let review = engine(ComplianceMode::Standard).review(Platform::Twitter, "fine", &claims);
        assert_eq!(review.claims(), claims.as_slice());
    }
}
