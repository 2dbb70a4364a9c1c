//! Denylist sanitizer for free-text fields.
//!
//! The sanitizer deletes known-dangerous substrings in place. It is a
//! defense-in-depth layer for text that is stored or displayed: it does not
//! encode output, and attribute, CSS or entity-encoded payloads can get past
//! it. Output encoding at render time remains the presentation layer's job.
//!
//! Only free text (todo title and description) goes through here. Emails and
//! passwords are handed to the account service verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

// Angle brackets
static ANGLE_BRACKETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").unwrap());

// Script URL scheme
static SCRIPT_SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").unwrap());

// Inline event handler attribute, e.g. onclick= / onerror=. ASCII word
// characters only, matching how browsers name handler attributes.
static EVENT_HANDLER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i-u)on\w+=").unwrap());

/// Sanitize free text.
///
/// Each pass removes angle brackets, then `javascript:` (any case), then
/// `on<word>=` handlers (any case), then trims surrounding whitespace.
/// Passes repeat until the text stops changing, so removals that splice a
/// new match together (`javajavascript:script:`) are caught and the function
/// is idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = single_pass(text);
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Sanitize an optional value, keeping `None` as is.
pub fn sanitize_opt(text: Option<&str>) -> Option<String> {
    text.map(sanitize)
}

fn single_pass(text: &str) -> String {
    let text = ANGLE_BRACKETS_RE.replace_all(text, "");
    let text = SCRIPT_SCHEME_RE.replace_all(&text, "");
    let text = EVENT_HANDLER_RE.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_tags() {
        assert_eq!(
            sanitize("<script>alert(1)</script>"),
            "scriptalert(1)/script"
        );
    }

    #[test]
    fn test_trims_and_strips_markup() {
        assert_eq!(sanitize("  hello <b>world</b>  "), "hello bworld/b");
    }

    #[test]
    fn test_removes_script_scheme_any_case() {
        assert_eq!(sanitize("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize("go to jAvAsCrIpT:void(0) now"), "go to void(0) now");
    }

    #[test]
    fn test_removes_event_handlers() {
        assert_eq!(sanitize("<img src=x onerror=alert(1)>"), "img src=x alert(1)");
        assert_eq!(sanitize("ONCLICK=steal()"), "steal()");
        assert_eq!(sanitize("a onmouseover=b"), "a b");
    }

    #[test]
    fn test_event_handler_names_are_ascii() {
        assert_eq!(sanitize("Café onété=1 x"), "Café onété=1 x");
        assert_eq!(sanitize("naïve onClick_2=go"), "naïve go");
        // Kelvin sign does not fold to k outside Unicode mode
        assert_eq!(sanitize("on\u{212A}ey=1"), "on\u{212A}ey=1");
    }

    #[test]
    fn test_spliced_payloads_removed() {
        assert_eq!(sanitize("javajavascript:script:x"), "x");
        assert_eq!(sanitize("java<script:x"), "x");
        assert_eq!(sanitize("oonx=nclick=x"), "x");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize("Buy milk & eggs (2x)"), "Buy milk & eggs (2x)");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_sanitize_opt() {
        assert_eq!(sanitize_opt(None), None);
        assert_eq!(sanitize_opt(Some(" <i>x</i> ")), Some("ix/i".to_string()));
    }
}
