//! Draft hygiene: brand-mention validation and platform length guidance.

use postcraft_common::Platform;

/// Handles known to belong to the organizations they name.
pub const VERIFIED_HANDLES: [&str; 8] = [
    "@deloitte",
    "@fda",
    "@who",
    "@cdc",
    "@gartner_inc",
    "@bookingcom",
    "@buffer",
    "@statista",
];

/// Keep verified handles verbatim, turn other `@handles` into plain
/// title-cased names, and leave plain mentions alone.
pub fn validate_brand_mentions(mentions: &[String]) -> Vec<String> {
    mentions
        .iter()
        .map(|mention| {
            let trimmed = mention.trim();
            let lower = trimmed.to_lowercase();
            if VERIFIED_HANDLES.contains(&lower.as_str()) {
                trimmed.to_string()
            } else if let Some(handle) = trimmed.strip_prefix('@') {
                title_case(handle)
            } else {
                trimmed.to_string()
            }
        })
        .filter(|m| !m.is_empty())
        .collect()
}

/// Uppercase the first letter of every alphanumeric run, lowercase the rest.
fn title_case(handle: &str) -> String {
    let mut out = String::with_capacity(handle.len());
    let mut at_word_start = true;
    for c in handle.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !c.is_numeric();
        }
    }
    out
}

/// A warning when `text` falls outside the platform's accepted length.
pub fn length_warning(platform: Platform, text: &str) -> Option<String> {
    let (min, max) = platform.length_range();
    let len = text.chars().count();
    if len < min || len > max {
        Some(format!(
            "{platform} draft is {len} characters, outside the recommended {min}-{max} range"
        ))
    } else {
        None
    }
}
