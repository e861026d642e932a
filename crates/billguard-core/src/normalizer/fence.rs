//! Code-fence stripping for model replies.
//!
//! The model is asked for bare JSON but sometimes wraps it in a markdown
//! block anyway. Handles:
//! - ```` ```json ... ``` ```` and unlabeled ```` ``` ... ``` ````
//! - a stray closing fence with no opening one
//! - a short preamble before a ```` ```json ```` block

use serde::de::IgnoredAny;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Remove surrounding code-fence markup and whitespace.
///
/// Applied until nothing changes, so `strip_code_fences(strip_code_fences(x))`
/// equals `strip_code_fences(x)`. Text without fences is only trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_once(current);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix(FENCE) {
        return fenced_body(skip_label(rest));
    }

    // A JSON value may mention a fence inside a string; only look for a
    // preamble block when the text is not already JSON-shaped.
    let json_shaped = text.starts_with(['{', '[']);
    if let Some(start) = text.find(JSON_FENCE).filter(|_| !json_shaped) {
        return fenced_body(&text[start + JSON_FENCE.len()..]);
    }

    if let Some(body) = text.strip_suffix(FENCE) {
        return body.trim();
    }

    text
}

/// Content up to the closing fence.
///
/// The first closing fence wins so trailing commentary that mentions a fence
/// is dropped. When that body is not JSON, a later fence may sit inside a
/// JSON string, so the body runs to the last fence instead.
fn fenced_body(after: &str) -> &str {
    let (Some(first), Some(last)) = (after.find(FENCE), after.rfind(FENCE)) else {
        return after.trim();
    };
    let body = after[..first].trim();
    if first == last || serde_json::from_str::<IgnoredAny>(body).is_ok() {
        body
    } else {
        after[..last].trim()
    }
}

/// Skip a language tag such as `json` right after an opening fence.
fn skip_label(rest: &str) -> &str {
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let followed_by_body = rest[end..].starts_with(|c: char| c.is_whitespace() || c == '{' || c == '[');
    if end > 0 && followed_by_body {
        &rest[end..]
    } else {
        rest
    }
}
