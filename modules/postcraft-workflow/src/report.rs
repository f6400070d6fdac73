//! Plain-text rendering of a finished workflow.

use std::fmt::Write;

use postcraft_common::{IssueSeverity, ReviewStatus, WorkflowState};

fn status_marker(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Pass => "[PASS]",
        ReviewStatus::Flag => "[FLAG]",
        ReviewStatus::Block => "[BLOCK]",
    }
}

fn severity_label(severity: IssueSeverity) -> &'static str {
    match severity {
        IssueSeverity::Minor => "minor",
        IssueSeverity::Major => "MAJOR",
        IssueSeverity::Critical => "CRITICAL",
    }
}

pub fn render_text_report(state: &WorkflowState) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, state);
    out
}

fn write_report(out: &mut String, state: &WorkflowState) -> std::fmt::Result {
    writeln!(out, "CONTENT PLAN")?;
    if let Some(hint) = &state.topic_hint {
        writeln!(out, "Topic: {hint}")?;
    }
    writeln!(out)?;

    writeln!(out, "Key points ({})", state.key_points.len())?;
    for point in &state.key_points {
        writeln!(out, "  - {} [{:.2}]", point.text, point.importance)?;
    }
    writeln!(out)?;

    writeln!(out, "Posts ({})", state.drafts.len())?;
    for (platform, post) in &state.drafts {
        let marker = state
            .reviews
            .get(platform)
            .map(|r| status_marker(r.status()))
            .unwrap_or("[UNREVIEWED]");
        let note = post.notes.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
        writeln!(out, "{marker} {platform}{note}")?;
        for line in post.primary_text.lines() {
            writeln!(out, "    {line}")?;
        }
        if let Some(thread) = &post.thread {
            for (i, part) in thread.iter().enumerate() {
                writeln!(out, "    {}/ {part}", i + 2)?;
            }
        }
        if !post.hashtags.is_empty() {
            writeln!(out, "    Hashtags: {}", post.hashtags.join(" "))?;
        }
        if !post.mentions.is_empty() {
            writeln!(out, "    Mentions: {}", post.mentions.join(", "))?;
        }

        if let Some(review) = state.reviews.get(platform) {
            for issue in review.issues() {
                writeln!(
                    out,
                    "    ! {} {}: {}",
                    severity_label(issue.severity),
                    issue.rule_id,
                    issue.message
                )?;
            }
        }

        let claims = state.claims.get(platform).map(Vec::as_slice).unwrap_or(&[]);
        for claim in claims {
            writeln!(out, "    * {} (confidence {:.2})", claim.text, claim.confidence)?;
            for source in &claim.sources {
                writeln!(out, "        {source}")?;
            }
        }
        writeln!(out)?;
    }

    if !state.timings.is_empty() {
        writeln!(out, "Schedule")?;
        for timing in &state.timings {
            writeln!(
                out,
                "  {}  {:<9}  {}",
                timing.local_datetime.format("%a %Y-%m-%d %H:%M %:z"),
                timing.platform.as_str(),
                timing.rationale
            )?;
        }
        writeln!(out)?;
    }

    let blocked = state
        .reviews
        .values()
        .filter(|r| r.status() == ReviewStatus::Block)
        .count();
    let flagged = state
        .reviews
        .values()
        .filter(|r| r.status() == ReviewStatus::Flag)
        .count();
    writeln!(
        out,
        "{} posts, {} blocked, {} flagged, {} warnings",
        state.drafts.len(),
        blocked,
        flagged,
        state.errors().len()
    )?;
    for error in state.errors() {
        writeln!(out, "  - {error}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_common::{Claim, ClaimSeverity, KeyPoint, Platform, Post, Review};

    #[test]
    fn report_lists_posts_claims_and_warnings() {
        let mut state = WorkflowState::new("source", Some("remote work".into()));
        state.key_points.push(KeyPoint {
            text: "Remote work is growing".into(),
            importance: 0.9,
        });
        let mut post = Post::new(Platform::Twitter, "Remote work keeps growing");
        post.revise("Remote work may keep growing", "auto-revised");
        state.drafts.insert(Platform::Twitter, post);
        let claim = Claim::new("Remote work rose 12%", ClaimSeverity::Medium)
            .with_confidence(0.65)
            .with_sources(vec!["https://example.gov/remote".into()]);
        state.claims.insert(Platform::Twitter, vec![claim.clone()]);
        state.reviews.insert(Platform::Twitter, Review::new(vec![], vec![claim]));
        state.record_error("extract-claims failed: linkedin: boom");

        let report = render_text_report(&state);

        assert!(report.contains("Topic: remote work"));
        assert!(report.contains("[PASS] twitter (auto-revised)"));
        assert!(report.contains("Remote work may keep growing"));
        assert!(report.contains("(confidence 0.65)"));
        assert!(report.contains("https://example.gov/remote"));
        assert!(report.contains("1 posts, 0 blocked, 0 flagged, 1 warnings"));
        assert!(report.contains("extract-claims failed: linkedin: boom"));
    }
}
