use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// --- Platforms ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Linkedin, Platform::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
        }
    }

    /// Accepted `primary_text` length in characters (inclusive).
    pub fn length_range(&self) -> (usize, usize) {
        match self {
            Platform::Twitter => (1, 280),
            Platform::Linkedin => (100, 1300),
            Platform::Instagram => (125, 2200),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            "instagram" => Ok(Platform::Instagram),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

// --- Content ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub text: String,
    /// 0.0-1.0
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub platform: Platform,
    pub primary_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<String>>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip)]
    revised: bool,
}

impl Post {
    pub fn new(platform: Platform, primary_text: impl Into<String>) -> Self {
        Self {
            platform,
            primary_text: primary_text.into(),
            thread: None,
            hashtags: Vec::new(),
            mentions: Vec::new(),
            notes: None,
            metadata: None,
            revised: false,
        }
    }

    /// Replace `primary_text` with a rewrite. A post accepts one revision;
    /// later calls are refused and return `false`.
    pub fn revise(&mut self, text: impl Into<String>, note: impl Into<String>) -> bool {
        if self.revised {
            return false;
        }
        self.primary_text = text.into();
        self.notes = Some(note.into());
        self.revised = true;
        true
    }

    pub fn is_revised(&self) -> bool {
        self.revised
    }

    pub fn set_metadata(&mut self, key: &str, value: serde_json::Value) {
        self.metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value);
    }
}

// --- Claims ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimSeverity {
    #[default]
    Low,
    Medium,
    High,
}

impl ClaimSeverity {
    /// Lenient parse for model output; anything unrecognized is `Low`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => ClaimSeverity::High,
            "medium" => ClaimSeverity::Medium,
            _ => ClaimSeverity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    #[serde(default)]
    pub severity: ClaimSeverity,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

impl Claim {
    pub fn new(text: impl Into<String>, severity: ClaimSeverity) -> Self {
        Self {
            text: text.into(),
            severity,
            sources: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

// --- Compliance ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub rule_id: String,
    pub severity: IssueSeverity,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pass,
    Flag,
    Block,
}

impl ReviewStatus {
    /// Any critical issue blocks; otherwise any major issue flags; minor-only passes.
    pub fn from_issues(issues: &[ComplianceIssue]) -> Self {
        if issues.iter().any(|i| i.severity == IssueSeverity::Critical) {
            ReviewStatus::Block
        } else if issues.iter().any(|i| i.severity == IssueSeverity::Major) {
            ReviewStatus::Flag
        } else {
            ReviewStatus::Pass
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewStatus::Pass => "pass",
            ReviewStatus::Flag => "flag",
            ReviewStatus::Block => "block",
        })
    }
}

/// Compliance outcome for one version of one post. The status is derived
/// from the issues at construction and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    status: ReviewStatus,
    issues: Vec<ComplianceIssue>,
    claims: Vec<Claim>,
}

impl Review {
    pub fn new(issues: Vec<ComplianceIssue>, claims: Vec<Claim>) -> Self {
        Self {
            status: ReviewStatus::from_issues(&issues),
            issues,
            claims,
        }
    }

    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    pub fn issues(&self) -> &[ComplianceIssue] {
        &self.issues
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.issues.iter().any(|i| i.rule_id == rule_id)
    }
}

// --- Scheduling ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingTime {
    pub platform: Platform,
    pub local_datetime: DateTime<FixedOffset>,
    pub rationale: String,
}

// --- Workflow state ---

/// Stage-owned fields of [`WorkflowState`]. `text` and `topic_hint` are
/// inputs and always readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    KeyPoints,
    Drafts,
    PostMetadata,
    Claims,
    Reviews,
    Timings,
}

/// Shared record for one pipeline invocation. Stages mutate it in place,
/// strictly one after another.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    pub text: String,
    pub topic_hint: Option<String>,
    pub key_points: Vec<KeyPoint>,
    pub drafts: BTreeMap<Platform, Post>,
    pub claims: BTreeMap<Platform, Vec<Claim>>,
    pub reviews: BTreeMap<Platform, Review>,
    pub timings: Vec<PostingTime>,
    errors: Vec<String>,
    version: u32,
    #[serde(skip)]
    produced: BTreeSet<StateField>,
}

impl WorkflowState {
    pub fn new(text: impl Into<String>, topic_hint: Option<String>) -> Self {
        Self {
            text: text.into(),
            topic_hint: topic_hint.filter(|h| !h.trim().is_empty()),
            key_points: Vec::new(),
            drafts: BTreeMap::new(),
            claims: BTreeMap::new(),
            reviews: BTreeMap::new(),
            timings: Vec::new(),
            errors: Vec::new(),
            version: 0,
            produced: BTreeSet::new(),
        }
    }

    /// Append-only; there is no way to remove an entry.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn mark_produced(&mut self, field: StateField) {
        self.produced.insert(field);
    }

    pub fn is_produced(&self, field: StateField) -> bool {
        self.produced.contains(&field)
    }

    /// Reset a stage-owned field to its empty default.
    pub fn reset(&mut self, field: StateField) {
        match field {
            StateField::KeyPoints => self.key_points.clear(),
            StateField::Drafts => self.drafts.clear(),
            StateField::PostMetadata => {
                for post in self.drafts.values_mut() {
                    post.metadata = None;
                }
            }
            StateField::Claims => self.claims.clear(),
            StateField::Reviews => self.reviews.clear(),
            StateField::Timings => self.timings.clear(),
        }
    }

    pub fn topic_hint_or_empty(&self) -> &str {
        self.topic_hint.as_deref().unwrap_or("")
    }
}

// --- Output ---

/// Caller-facing result assembled from a finished [`WorkflowState`].
#[derive(Debug, Clone, Serialize)]
pub struct ContentPlan {
    pub key_points: Vec<KeyPoint>,
    pub posts: Vec<Post>,
    pub reviews: BTreeMap<Platform, Review>,
    pub timings: Vec<PostingTime>,
    pub errors: Vec<String>,
}

impl From<WorkflowState> for ContentPlan {
    fn from(state: WorkflowState) -> Self {
        Self {
            key_points: state.key_points,
            posts: state.drafts.into_values().collect(),
            reviews: state.reviews,
            timings: state.timings,
            errors: state.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: IssueSeverity) -> ComplianceIssue {
        ComplianceIssue {
            rule_id: "rule".into(),
            severity,
            message: "m".into(),
            suggestion: "s".into(),
        }
    }

    #[test]
    fn status_is_pass_without_issues() {
        assert_eq!(ReviewStatus::from_issues(&[]), ReviewStatus::Pass);
    }

    #[test]
    fn minor_issues_never_change_pass() {
        let issues = vec![issue(IssueSeverity::Minor), issue(IssueSeverity::Minor)];
        assert_eq!(ReviewStatus::from_issues(&issues), ReviewStatus::Pass);
    }

    #[test]
    fn major_flags_and_critical_blocks() {
        let flagged = vec![issue(IssueSeverity::Minor), issue(IssueSeverity::Major)];
        assert_eq!(ReviewStatus::from_issues(&flagged), ReviewStatus::Flag);

        let blocked = vec![issue(IssueSeverity::Major), issue(IssueSeverity::Critical)];
        assert_eq!(ReviewStatus::from_issues(&blocked), ReviewStatus::Block);
    }

    #[test]
    fn review_status_follows_issues() {
        let review = Review::new(vec![issue(IssueSeverity::Critical)], vec![]);
        assert_eq!(review.status(), ReviewStatus::Block);
        assert!(review.has_rule("rule"));
    }

    #[test]
    fn post_accepts_a_single_revision() {
        let mut post = Post::new(Platform::Twitter, "original");
        assert!(post.revise("first rewrite", "auto-revised"));
        assert!(!post.revise("second rewrite", "auto-revised"));
        assert_eq!(post.primary_text, "first rewrite");
        assert_eq!(post.notes.as_deref(), Some("auto-revised"));
    }

    #[test]
    fn reset_clears_only_the_named_field() {
        let mut state = WorkflowState::new("text", None);
        let mut post = Post::new(Platform::Linkedin, "body");
        post.set_metadata("semantic_similarity", serde_json::json!(0.8));
        state.drafts.insert(Platform::Linkedin, post);
        state.key_points.push(KeyPoint {
            text: "k".into(),
            importance: 0.5,
        });

        state.reset(StateField::PostMetadata);

        assert_eq!(state.key_points.len(), 1);
        assert!(state.drafts[&Platform::Linkedin].metadata.is_none());
    }

    #[test]
    fn errors_accumulate() {
        let mut state = WorkflowState::new("text", Some("  ".into()));
        assert!(state.topic_hint.is_none());
        state.record_error("one");
        state.record_error("two");
        assert_eq!(state.errors(), ["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<Platform>(), Ok(Platform::Linkedin));
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn content_plan_serializes_lowercase_tags() {
        let mut state = WorkflowState::new("text", None);
        state
            .reviews
            .insert(Platform::Twitter, Review::new(vec![issue(IssueSeverity::Major)], vec![]));
        let json = serde_json::to_value(ContentPlan::from(state)).unwrap();
        assert_eq!(json["reviews"]["twitter"]["status"], "flag");
        assert_eq!(json["reviews"]["twitter"]["issues"][0]["severity"], "major");
    }
}
