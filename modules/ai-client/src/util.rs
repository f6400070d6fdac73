/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Recover a JSON value from a free-form model reply.
///
/// Models wrap JSON in prose or code fences often enough that a plain
/// `serde_json::from_str` is not sufficient. Tries the whole (fence-stripped)
/// reply first, then the widest `{...}` / `[...]` span, preferring whichever
/// span closes last in the text.
pub fn extract_json_block(response: &str) -> Option<serde_json::Value> {
    let body = strip_code_blocks(response);
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }

    let object = span(body, '{', '}');
    let array = span(body, '[', ']');

    let mut candidates: Vec<&str> = [object, array].into_iter().flatten().collect();
    candidates.sort_by_key(|s| std::cmp::Reverse(s.as_ptr() as usize + s.len()));

    candidates
        .into_iter()
        .find_map(|candidate| serde_json::from_str(candidate).ok())
}

fn span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Cosine similarity between two vectors. Returns 0.0 for zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
