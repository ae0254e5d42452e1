//! Frame loop driver
//!
//! Pulls frames from a source, feeds the engine one tick per frame,
//! renders the overlay line, and publishes to the status board when one
//! is attached. The loop owns nothing about the decision itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::api::StatusBoard;
use crate::core::detect::CameraFrame;
use crate::core::engine::{Periphery, WardenEngine};
use crate::types::{EncounterState, TickOutput};

/// Frame acquisition contract. `None` ends the run.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Option<CameraFrame>;
}

/// Source that fabricates frames at fixed geometry, optionally bounded
/// and optionally paced
pub struct SyntheticFrames {
    width: u32,
    height: u32,
    produced: u64,
    limit: Option<u64>,
    interval: Option<Duration>,
}

impl SyntheticFrames {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            produced: 0,
            limit: None,
            interval: None,
        }
    }

    /// Stop after this many frames
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sleep between frames, approximating a camera rate
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl FrameSource for SyntheticFrames {
    fn next_frame(&mut self) -> Option<CameraFrame> {
        if let Some(limit) = self.limit {
            if self.produced >= limit {
                return None;
            }
        }
        if let Some(interval) = self.interval {
            if self.produced > 0 {
                std::thread::sleep(interval);
            }
        }
        self.produced += 1;
        Some(CameraFrame::new(self.produced, self.width, self.height))
    }
}

/// What a finished run looked like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_state: EncounterState,
    pub deterrence_count: u32,
}

/// The watch loop: source → engine → render → publish
pub struct FrameLoop {
    engine: WardenEngine,
    periphery: Periphery,
    source: Box<dyn FrameSource>,
    board: Option<Arc<StatusBoard>>,
    stop: Arc<AtomicBool>,
    json: bool,
    no_color: bool,
    verbose: bool,
}

impl FrameLoop {
    pub fn new(engine: WardenEngine, periphery: Periphery, source: Box<dyn FrameSource>) -> Self {
        Self {
            engine,
            periphery,
            source,
            board: None,
            stop: Arc::new(AtomicBool::new(false)),
            json: false,
            no_color: false,
            verbose: false,
        }
    }

    /// Publish each tick to a status board
    pub fn with_board(mut self, board: Arc<StatusBoard>) -> Self {
        self.board = Some(board);
        self
    }

    /// Share a stop flag; setting it ends the loop at the next frame
    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_output(mut self, json: bool, no_color: bool, verbose: bool) -> Self {
        self.json = json;
        self.no_color = no_color;
        self.verbose = verbose;
        self
    }

    /// Run until the source dries up or the stop flag is raised
    pub fn run(&mut self) -> RunSummary {
        tracing::info!(state = %self.engine.state(), "watch loop started");

        while !self.stop.load(Ordering::Relaxed) {
            let Some(frame) = self.source.next_frame() else {
                break;
            };
            let output = self.engine.tick(&frame, &mut self.periphery);
            self.render(&output);
            if let Some(board) = &self.board {
                board.publish(&output, self.engine.encounter(), self.engine.tick_count());
            }
        }

        let summary = RunSummary {
            ticks: self.engine.tick_count(),
            final_state: self.engine.state(),
            deterrence_count: self.engine.encounter().deterrence_count,
        };
        tracing::info!(
            ticks = summary.ticks,
            state = %summary.final_state,
            "watch loop ended"
        );
        summary
    }

    /// Quiet ticks are skipped unless verbose: state changes and ticks
    /// with actions always render
    fn render(&self, output: &TickOutput) {
        if !self.verbose && !output.transitioned() && output.actions.is_empty() {
            return;
        }
        if self.json {
            match serde_json::to_string(output) {
                Ok(line) => println!("{}", line),
                Err(err) => tracing::warn!(%err, "output serialization failed"),
            }
        } else if self.no_color {
            println!("{}", output.to_parseable_string());
        } else {
            println!("{}", output.to_terminal_string());
        }
    }

    pub fn engine(&self) -> &WardenEngine {
        &self.engine
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actuate::{InstantPacer, NullLink, NullVoice};
    use crate::core::capture::ScriptedMic;
    use crate::core::detect::{DetectorHandle, NullDetector};
    use crate::core::ledger::NullLedger;
    use crate::core::oracle::NullOracle;

    fn quiet_periphery() -> Periphery {
        Periphery::new(
            DetectorHandle::new(Box::new(NullDetector)),
            Box::new(NullOracle),
            Box::new(ScriptedMic::new(Vec::<String>::new())),
            Box::new(NullVoice),
            Box::new(NullLink),
            Box::new(NullLedger),
            Box::new(InstantPacer::new()),
        )
        .with_seed(1)
    }

    #[test]
    fn test_loop_ends_when_source_exhausts() {
        let engine = WardenEngine::new("open");
        let source = SyntheticFrames::new(640, 480).with_limit(3);
        let mut frame_loop = FrameLoop::new(engine, quiet_periphery(), Box::new(source));

        let summary = frame_loop.run();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.final_state, EncounterState::Idle);
        assert_eq!(summary.deterrence_count, 0);
    }

    #[test]
    fn test_raised_stop_flag_prevents_any_tick() {
        let engine = WardenEngine::new("open");
        let source = SyntheticFrames::new(640, 480).with_limit(100);
        let stop = Arc::new(AtomicBool::new(true));
        let mut frame_loop =
            FrameLoop::new(engine, quiet_periphery(), Box::new(source)).with_stop(stop);

        let summary = frame_loop.run();
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn test_synthetic_frames_number_from_one() {
        let mut source = SyntheticFrames::new(640, 480).with_limit(2);
        assert_eq!(source.next_frame().map(|f| f.sequence), Some(1));
        assert_eq!(source.next_frame().map(|f| f.sequence), Some(2));
        assert!(source.next_frame().is_none());
    }
}
