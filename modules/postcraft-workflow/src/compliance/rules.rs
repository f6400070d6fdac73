/// Term lists checked by the compliance engine. Matching is a
/// case-insensitive substring scan in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRules {
    /// Informal or unprofessional words. Minor.
    pub profanity: Vec<String>,
    /// Guarantee-style phrases. Major.
    pub absolute_phrases: Vec<String>,
    /// Regulated-industry terms, checked only in strict mode. Critical.
    pub strict_restricted: Vec<String>,
}

impl ComplianceRules {
    pub fn new(
        profanity: impl IntoIterator<Item = impl Into<String>>,
        absolute_phrases: impl IntoIterator<Item = impl Into<String>>,
        strict_restricted: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            profanity: profanity.into_iter().map(Into::into).collect(),
            absolute_phrases: absolute_phrases.into_iter().map(Into::into).collect(),
            strict_restricted: strict_restricted.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self::new(
            ["damn", "hell", "crap", "stupid", "idiot", "hate"],
            [
                "guarantee",
                "guaranteed",
                "100%",
                "always works",
                "never fails",
                "instant results",
                "immediate",
            ],
            [
                "cure",
                "cures",
                "diagnose",
                "diagnosis",
                "treatment",
                "financial advice",
                "returns",
                "roi",
                "profit guaranteed",
                "investment",
            ],
        )
    }
}
