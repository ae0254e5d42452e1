//! Speech capture: one blocking utterance per call
//!
//! Silence, timeouts, and unintelligible audio are all modeled as the
//! empty string rather than errors. The engine treats an empty utterance
//! as an explicit transition, so the seam never needs to fail.

use std::collections::VecDeque;
use std::io::BufRead;

/// One-shot utterance capture contract
pub trait SpeechCapture: Send {
    /// Capture one utterance, blocking until speech or timeout. Returns
    /// lowercased text, or an empty string when nothing usable was heard.
    fn capture(&mut self) -> String;
}

/// Replays a prepared list of utterances, then silence forever
pub struct ScriptedMic {
    utterances: VecDeque<String>,
}

impl ScriptedMic {
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: utterances.into_iter().map(Into::into).collect(),
        }
    }
}

impl SpeechCapture for ScriptedMic {
    fn capture(&mut self) -> String {
        self.utterances
            .pop_front()
            .map(|u| u.to_lowercase())
            .unwrap_or_default()
    }
}

/// Reads utterances as lines from a reader, for keyboard-driven runs.
/// End of input or a read error is silence.
pub struct LineMic<R: BufRead + Send> {
    reader: R,
}

impl<R: BufRead + Send> LineMic<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> SpeechCapture for LineMic<R> {
    fn capture(&mut self) -> String {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => String::new(),
            Ok(_) => line.trim().to_lowercase(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
