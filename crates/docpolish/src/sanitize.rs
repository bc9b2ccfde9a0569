//! Helpers for sanitizing user-supplied names and URLs.
//!
//! Logs are safe to share for debugging. URLs lose credentials and query
//! strings before they are logged, and upload names are reduced to a
//! plain file name before they are stored on a job.

use std::sync::LazyLock;

use regex::Regex;

static RE_UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Strips userinfo, query and fragment from a URL.
///
/// - `https://user:pw@host/docs?token=x` → `https://****@host/docs`
/// - `https://host/docs#intro` → `https://host/docs`
pub fn redact_url(url: &str) -> String {
    let url = url.split(['?', '#']).next().unwrap_or(url);

    if let Some(scheme_end) = url.find("://") {
        let after_scheme = &url[scheme_end + 3..];
        let authority_end = after_scheme.find('/').unwrap_or(after_scheme.len());
        if let Some(at_pos) = after_scheme[..authority_end].rfind('@') {
            let scheme = &url[..scheme_end + 3];
            let after_at = &after_scheme[at_pos + 1..];
            return format!("{}****@{}", scheme, after_at);
        }
    }

    url.to_string()
}

/// Reduces an uploaded file name to something safe to display and store.
///
/// Path separators become underscores, characters outside
/// `[A-Za-z0-9_.-]` are dropped and leading or trailing dots and
/// underscores are trimmed. Returns `None` when nothing usable remains.
pub fn secure_filename(name: &str) -> Option<String> {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = RE_UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
