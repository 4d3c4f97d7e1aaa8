//! Version token extraction from a resolved bundle URL.

use regex::Regex;
use std::sync::OnceLock;

const VERSION_PATTERN: &str = r"tinymce/([0-9.-]+)/plugins.min.js";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"))
}

/// Returns the concrete version embedded in `url`, if any.
pub fn extract_version(url: &str) -> Option<&str> {
    version_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
