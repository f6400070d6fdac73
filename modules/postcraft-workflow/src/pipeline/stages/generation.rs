use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use ai_client::extract_json_block;
use postcraft_common::{Claim, ClaimSeverity, Config, KeyPoint, Platform, Post, WorkflowError, WorkflowState};

use crate::mentions::{length_warning, validate_brand_mentions};
use crate::prompts::{claims_prompt, draft_prompt, key_points_prompt, ClaimReply, DraftReply, KeyPointReply};
use crate::traits::TextGenerator;

pub const MAX_CLAIMS_PER_POST: usize = 10;

/// Parse a list reply. Models sometimes wrap the list in an object under
/// `wrapper_key`, which is accepted too.
fn parse_list<T: DeserializeOwned>(reply: &str, wrapper_key: &str) -> Result<Vec<T>> {
    let value = extract_json_block(reply).ok_or_else(|| anyhow!("reply contained no JSON"))?;
    let list = match value {
        Value::Object(mut map) => map
            .remove(wrapper_key)
            .ok_or_else(|| anyhow!("expected a JSON array or an object with `{wrapper_key}`"))?,
        other => other,
    };
    serde_json::from_value(list).context("reply did not match the expected shape")
}

fn importance_of(value: Option<&Value>) -> f64 {
    value
        .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
        .filter(|x: &f64| x.is_finite())
        .map(|x| x.clamp(0.0, 1.0))
        .unwrap_or(0.5)
}

pub async fn extract_key_points(generator: &dyn TextGenerator, state: &mut WorkflowState) -> Result<()> {
    if state.text.trim().is_empty() {
        bail!("source text is empty");
    }

    let reply = generator
        .generate(&key_points_prompt(&state.text))
        .await
        .context("key point generation failed")?;
    let points: Vec<KeyPoint> = parse_list::<KeyPointReply>(&reply, "key_points")?
        .into_iter()
        .filter(|p| !p.text.trim().is_empty())
        .map(|p| KeyPoint {
            importance: importance_of(p.importance.as_ref()),
            text: p.text.trim().to_string(),
        })
        .collect();

    if points.is_empty() {
        bail!("model returned no key points");
    }
    info!(count = points.len(), "Key points extracted");
    state.key_points = points;
    Ok(())
}

fn parse_draft(platform: Platform, reply: &str) -> Result<Post> {
    let value = extract_json_block(reply).ok_or_else(|| anyhow!("reply contained no JSON"))?;
    let draft: DraftReply = serde_json::from_value(value).context("draft reply did not match the expected shape")?;
    let text = draft.primary_text.trim();
    if text.is_empty() {
        bail!("draft has no primary text");
    }

    let mut post = Post::new(platform, text);
    post.thread = draft.thread.filter(|t| !t.is_empty());
    post.hashtags = draft.hashtags;
    post.mentions = validate_brand_mentions(&draft.mentions);
    Ok(post)
}

pub async fn generate_drafts(
    generator: &dyn TextGenerator,
    config: &Config,
    state: &mut WorkflowState,
) -> Result<()> {
    let prompts: Vec<(Platform, String)> = config
        .platforms
        .iter()
        .map(|&platform| {
            let prompt = draft_prompt(
                platform,
                &config.org_name,
                &state.key_points,
                &state.text,
                state.topic_hint_or_empty(),
            );
            (platform, prompt)
        })
        .collect();

    let replies = join_all(prompts.into_iter().map(|(platform, prompt)| async move {
        (platform, generator.generate(&prompt).await)
    }))
    .await;

    for (platform, reply) in replies {
        match reply.and_then(|r| parse_draft(platform, &r)) {
            Ok(post) => {
                if let Some(warning) = length_warning(platform, &post.primary_text) {
                    warn!(platform = %platform, "{warning}");
                    state.record_error(warning);
                }
                state.drafts.insert(platform, post);
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "Draft generation failed");
                state.record_error(WorkflowError::stage("generate-drafts", format!("{platform}: {e:#}")).to_string());
            }
        }
    }

    info!(drafted = state.drafts.len(), requested = config.platforms.len(), "Drafts generated");
    Ok(())
}

fn parse_claims(reply: &str) -> Result<Vec<Claim>> {
    Ok(parse_list::<ClaimReply>(reply, "claims")?
        .into_iter()
        .filter(|c| !c.text.trim().is_empty())
        .take(MAX_CLAIMS_PER_POST)
        .map(|c| {
            let severity = c
                .severity
                .as_deref()
                .map(ClaimSeverity::parse_lenient)
                .unwrap_or_default();
            Claim::new(c.text.trim(), severity)
        })
        .collect())
}

pub async fn extract_claims(generator: &dyn TextGenerator, state: &mut WorkflowState) -> Result<()> {
    let prompts: Vec<(Platform, String)> = state
        .drafts
        .iter()
        .map(|(platform, post)| (*platform, claims_prompt(&state.text, &post.primary_text)))
        .collect();

    let replies = join_all(prompts.into_iter().map(|(platform, prompt)| async move {
        (platform, generator.generate(&prompt).await)
    }))
    .await;

    for (platform, reply) in replies {
        let claims = match reply.and_then(|r| parse_claims(&r)) {
            Ok(claims) => {
                info!(platform = %platform, claims = claims.len(), "Claims extracted");
                claims
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "Claim extraction failed");
                state.record_error(WorkflowError::stage("extract-claims", format!("{platform}: {e:#}")).to_string());
                Vec::new()
            }
        };
        state.claims.insert(platform, claims);
    }
    Ok(())
}
