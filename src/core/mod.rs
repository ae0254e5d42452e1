//! Core modules for Warden-0

pub mod actuate;
pub mod api;
pub mod capture;
pub mod debounce;
pub mod detect;
pub mod driver;
pub mod engine;
pub mod guard;
pub mod ledger;
pub mod oracle;
pub mod phrase;

pub use actuate::{
    ActuateError, ActuatorLink, ConsoleVoice, InstantPacer, NullLink, NullVoice, Pacer, SleepPacer,
    Voice, WriterLink,
};
pub use api::{create_router, run_server, ControllerStatus, StatusBoard, TickUpdate};
pub use capture::{LineMic, ScriptedMic, SpeechCapture};
pub use debounce::DebounceCounter;
pub use detect::{CameraFrame, DetectError, Detector, DetectorHandle, NullDetector, ScriptedDetector};
pub use driver::{FrameLoop, FrameSource, RunSummary, SyntheticFrames};
pub use engine::{decide, Decision, Directive, IntentObservation, Observations, Periphery, WardenEngine};
pub use guard::GuardTimer;
pub use ledger::{IncidentLedger, JsonlLedger, LedgerError, MemoryLedger, NullLedger};
pub use oracle::{IntentOracle, NullOracle, OracleError, ScriptedOracle};
pub use phrase::PhraseMatcher;
