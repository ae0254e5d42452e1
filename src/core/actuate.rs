//! Actuation adapters: voice, hardware link, and pacing
//!
//! Three independent fire-and-forget effects. Each one can fail on its
//! own and the engine swallows the failure, so a dead speaker cannot
//! block the deterrent and a dead serial port cannot mute the voice.

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use thiserror::Error;

use crate::types::Tone;

/// Errors an actuation adapter can raise
#[derive(Debug, Error)]
pub enum ActuateError {
    #[error("actuator link write failed")]
    Link(#[from] std::io::Error),
    #[error("voice synthesis failed: {0}")]
    Voice(String),
}

/// Speech synthesis and playback contract
pub trait Voice: Send {
    fn speak(&mut self, text: &str, tone: Tone) -> Result<(), ActuateError>;
}

/// Serial-style byte link to the deterrent hardware
pub trait ActuatorLink: Send {
    fn signal(&mut self, command: &[u8]) -> Result<(), ActuateError>;
}

/// Fixed-length holds inside the tick (cooldowns, backoffs, farewells)
pub trait Pacer: Send {
    fn hold(&mut self, duration: Duration);
}

/// Voice that prints to the terminal, colored by tone
pub struct ConsoleVoice;

impl Voice for ConsoleVoice {
    fn speak(&mut self, text: &str, tone: Tone) -> Result<(), ActuateError> {
        let line = match tone {
            Tone::Friendly => format!("[WARDEN] {}", text).cyan(),
            Tone::Aggressive => format!("[WARDEN] {}", text).red().bold(),
        };
        println!("\n{}", line);
        Ok(())
    }
}

/// Voice that says nothing
pub struct NullVoice;

impl Voice for NullVoice {
    fn speak(&mut self, _text: &str, _tone: Tone) -> Result<(), ActuateError> {
        Ok(())
    }
}

/// Link that writes commands to any byte sink and flushes per command
pub struct WriterLink<W: Write + Send> {
    port: W,
}

impl<W: Write + Send> WriterLink<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    /// The sink, for inspection after a run
    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write + Send> ActuatorLink for WriterLink<W> {
    fn signal(&mut self, command: &[u8]) -> Result<(), ActuateError> {
        self.port.write_all(command)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Link for runs with no hardware connected. Explicitly supported
/// degraded mode, not an error.
pub struct NullLink;

impl ActuatorLink for NullLink {
    fn signal(&mut self, _command: &[u8]) -> Result<(), ActuateError> {
        Ok(())
    }
}

/// Pacer that really sleeps
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Pacer that returns immediately, recording what was asked of it
#[derive(Default)]
pub struct InstantPacer {
    pub held: Vec<Duration>,
}

impl InstantPacer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pacer for InstantPacer {
    fn hold(&mut self, duration: Duration) {
        self.held.push(duration);
    }
}

// =============================================================================
// TESTS
// =============================================================================
