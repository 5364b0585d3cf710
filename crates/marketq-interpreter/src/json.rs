//! Tolerant JSON extraction from completion replies
//!
//! The completion service is asked for a bare JSON object but does not
//! reliably honor that, so replies are treated as untrusted text expected to
//! contain embedded JSON.

/// Extract the JSON payload from a completion reply.
///
/// Strips Markdown fences (```json ... ``` or ``` ... ```) when present,
/// otherwise falls back to the span from the first `{` to the last `}`.
/// Idempotent: applying it to its own output returns the same text.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}
