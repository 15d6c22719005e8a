//! Input sanitisation for review submissions
//!
//! Comments are trimmed, length-capped and have recognisable contact-info
//! substrings redacted in place before they are stored. The scanner runs on
//! the raw text, so redaction never hides anything from the doxxing
//! detector. Tags are reduced to the controlled vocabulary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_COMMENT_LENGTH, MAX_TAGS, VALID_TAGS};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.]+").expect("Invalid email regex"));

/// Local 8-digit numbers and country-code-prefixed forms.
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?973\s?\d{8}|\b\d{8}\b").expect("Invalid phone regex"));

const REDACTION: &str = "[contact removed]";

/// Trim, cap and redact a raw comment.
pub fn sanitize_comment(raw: &str) -> String {
    let trimmed = raw.trim();

    // Cap by character count, never splitting a code point
    let capped: String = trimmed.chars().take(MAX_COMMENT_LENGTH).collect();

    let redacted = EMAIL_REGEX.replace_all(&capped, REDACTION);
    let redacted = PHONE_REGEX.replace_all(&redacted, REDACTION);
    redacted.into_owned()
}

/// Keep only tags from the controlled vocabulary, preserving first-occurrence
/// order, dropping repeats, truncated to the maximum tag count.
pub fn sanitize_tags(tags: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in tags {
        if kept.len() >= MAX_TAGS {
            break;
        }
        if VALID_TAGS.contains(tag.as_str()) && !kept.iter().any(|t| t == tag) {
            kept.push(tag.clone());
        }
    }
    kept
}
