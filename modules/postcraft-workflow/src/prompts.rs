//! Prompt builders and the reply shapes the model is asked to return.

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use postcraft_common::{ComplianceIssue, KeyPoint, Platform};

/// One extracted key point.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KeyPointReply {
    /// Specific key point, preserving numbers, dates and entities.
    pub text: String,
    /// 0 to 1, where 1 is most important.
    #[serde(default)]
    pub importance: Option<serde_json::Value>,
}

/// A drafted post.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DraftReply {
    #[serde(default)]
    pub primary_text: String,
    /// Optional follow-up posts (twitter threads).
    #[serde(default)]
    pub thread: Option<Vec<String>>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// A factual claim worth verifying.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClaimReply {
    pub text: String,
    /// "low", "medium" or "high"
    #[serde(default)]
    pub severity: Option<String>,
}

fn schema_of<T: JsonSchema>() -> String {
    serde_json::to_string_pretty(&schema_for!(T)).unwrap_or_default()
}

pub fn key_points_prompt(text: &str) -> String {
    format!(
        "Extract 5-8 key bullet points from the blog text below. Preserve numbers, dates, \
         entities. No marketing fluff.\n\n\
         Return a JSON array matching this schema:\n{schema}\n\n\
         Importance should be a float between 0 and 1, where 1 is most important.\n\
         Do not include any prose or explanation outside the JSON array.\n\n\
         Blog text:\n{text}",
        schema = schema_of::<Vec<KeyPointReply>>(),
        text = text.trim(),
    )
}

fn platform_rules(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "≤ 280 chars; also propose an optional thread of 3-5 tweets (≤ 280 each)",
        Platform::Linkedin => "500-1200 chars; professional tone; line breaks ok",
        Platform::Instagram => "125-2200 chars; warm tone; single CTA",
    }
}

pub fn draft_prompt(
    platform: Platform,
    org_name: &str,
    key_points: &[KeyPoint],
    source_text: &str,
    topic_hint: &str,
) -> String {
    let content = if key_points.is_empty() {
        let excerpt: String = source_text.chars().take(1000).collect();
        format!("Original blog content (extract key insights):\n{excerpt}")
    } else {
        let lines: Vec<String> = key_points
            .iter()
            .map(|kp| format!("- {} (importance: {})", kp.text, kp.importance))
            .collect();
        format!("Key insights:\n{}", lines.join("\n"))
    };

    format!(
        "Create a {platform} post for {org_name} using the key points below.\n\n\
         PLATFORM RULES ({platform}): {rules}\n\n\
         CONTENT STANDARDS:\n\
         - Use conditional language for statistics without verified sources (\"studies suggest\", \"reports indicate\")\n\
         - Include clear attribution for specific figures\n\
         - Avoid absolute statements; frame as trends or emerging patterns\n\
         - State the year explicitly for recent data\n\n\
         MENTIONS: Only use verified handles for major organizations (@deloitte, @who, @fda). \
         Use plain text for others.\n\n\
         Include 5-12 relevant hashtags. Do not invent facts beyond the provided key points.\n\n\
         Return a JSON object matching this schema:\n{schema}\n\n\
         {content}\n\n\
         Topic hint: {topic_hint}",
        rules = platform_rules(platform),
        schema = schema_of::<DraftReply>(),
    )
}

pub fn claims_prompt(source_text: &str, post_text: &str) -> String {
    format!(
        "From both the original blog content and social media post below, extract up to 10 \
         factual claims that should be verified, focusing on numeric statistics, named studies \
         or reports, time-bound claims, and quantifiable business metrics.\n\n\
         Severity levels:\n\
         - low: general industry facts\n\
         - medium: specific statistics without named sources\n\
         - high: claims with specific sources, percentages, or dollar amounts\n\n\
         Return a JSON array matching this schema:\n{schema}\n\n\
         Original blog content:\n{source_text}\n\n\
         Social media post:\n{post_text}",
        schema = schema_of::<Vec<ClaimReply>>(),
    )
}

/// `- message: suggestion` per issue.
pub fn issue_summary(issues: &[ComplianceIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("- {}: {}", i.message, i.suggestion))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn rewrite_prompt(issues: &[ComplianceIssue], post_text: &str) -> String {
    format!(
        "The following social media post has compliance issues. Please provide a minimally \
         invasive rewrite that resolves all issues while maintaining the original message and tone.\n\n\
         Issues to fix:\n{issues}\n\n\
         Original post:\n{post_text}\n\n\
         Return only the revised post text, no extra commentary.",
        issues = issue_summary(issues),
    )
}
