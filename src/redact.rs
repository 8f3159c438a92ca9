//! Best-effort redaction of sensitive text.
//!
//! Four independent substring substitutions run in a fixed order: email
//! addresses, phone-shaped digit groups, standalone runs of 8+ digits, and
//! (optionally) URLs. Each replaces every non-overlapping match with a fixed
//! placeholder token.
//!
//! This is lossy, heuristic scrubbing - NOT a security guarantee. Malformed
//! or ambiguous text simply yields no match and passes through unredacted.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// International prefix and area code optional, then two 3-4 digit groups.
// Bare digit runs of 6-11 digits match too, so most long numbers are
// consumed here before LONG_NUMBER_RE ever sees them.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:\+?\d{1,3}[\s-]?)?(?:\(\d{2,4}\)[\s-]?)?\d{3,4}[\s-]?\d{3,4})").unwrap()
});

static LONG_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{8,}\b").unwrap());

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Replace emails, phone numbers, long digit runs, and (if `redact_urls`)
/// URLs with placeholder tokens. Empty input is returned unchanged.
pub fn redact_text(text: &str, redact_urls: bool) -> String {
    if text.is_empty() {
        return text.to_string();
    }
    let redacted = EMAIL_RE.replace_all(text, "[REDACTED_EMAIL]");
    let redacted = PHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]");
    let redacted = LONG_NUMBER_RE.replace_all(&redacted, "[REDACTED_NUMBER]");
    if redact_urls {
        URL_RE.replace_all(&redacted, "[REDACTED_URL]").into_owned()
    } else {
        redacted.into_owned()
    }
}
