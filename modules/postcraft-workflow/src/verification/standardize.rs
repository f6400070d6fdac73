//! Confidence-dependent rewording of claim text.

use std::sync::LazyLock;

use regex::Regex;

static PERCENT_PRESENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+%").unwrap());
static PERCENT_OF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+% of [^,]+)").unwrap());
static LEADING_HEDGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:reportedly\s+|according to reports,\s*)").unwrap());

const HEDGE_MARKERS: [&str; 4] = ["reportedly", "suggests", "indicates", "appears"];

/// Claims below this are hedged.
pub const HEDGE_BELOW: f64 = 0.4;
/// Claims at or above this lose a leading hedge.
pub const ASSERT_FROM: f64 = 0.7;

pub fn standardize_claim_text(text: &str, confidence: f64) -> String {
    if confidence < HEDGE_BELOW {
        hedge(text)
    } else if confidence >= ASSERT_FROM {
        strip_hedge(text)
    } else {
        text.to_string()
    }
}

fn hedge(text: &str) -> String {
    let lower = text.to_lowercase();
    if HEDGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return text.to_string();
    }

    // Statistics are hedged in place, or left alone without a "% of" phrase.
    if PERCENT_PRESENT.is_match(text) {
        return PERCENT_OF.replace(text, "reportedly ${1}").into_owned();
    }
    if lower.contains("according to") {
        return text.to_string();
    }

    format!("According to reports, {lower}")
}

fn strip_hedge(text: &str) -> String {
    let stripped = LEADING_HEDGE.replace(text, "");
    if stripped.len() == text.len() {
        return text.to_string();
    }
    uppercase_first(&stripped)
}

fn uppercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
