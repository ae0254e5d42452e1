//! Phrase matcher: secret passphrase containment
//!
//! Matching is substring containment over case-normalized text, not an
//! exact or tokenized match. The phrase can be buried in a longer
//! sentence ("the password is open please") and still pass. A short
//! secret can therefore match inside an unrelated word, a known
//! relaxation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Runs of whitespace collapse to one space before matching
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Containment matcher for the configured secret phrase
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    secret: String,
}

impl PhraseMatcher {
    /// Create a matcher for the given secret. The secret is normalized
    /// once here; utterances are normalized per call.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: normalize(secret),
        }
    }

    /// Whether the utterance contains the secret phrase
    pub fn matches(&self, utterance: &str) -> bool {
        normalize(utterance).contains(&self.secret)
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    RE_WHITESPACE.replace_all(lowered.trim(), " ").into_owned()
}

// =============================================================================
// TESTS
// =============================================================================
