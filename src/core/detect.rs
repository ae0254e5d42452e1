//! Detection adapter: the object-detector seam
//!
//! The controller never talks to a detection backend directly. It goes
//! through `DetectorHandle`, which applies the fail-to-empty policy: a
//! backend error becomes "no detections", never a crash. A monitoring
//! loop has to outlive model hiccups.

use std::collections::VecDeque;

use thiserror::Error;

use crate::types::DetectionFrame;

/// Opaque handle to one grabbed camera frame. Backends that need pixel
/// data hold it on their side of the seam; the controller only needs
/// identity and geometry.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame {
    /// Monotonic frame number from the source
    pub sequence: u64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl CameraFrame {
    pub fn new(sequence: u64, width: u32, height: u32) -> Self {
        Self {
            sequence,
            width,
            height,
        }
    }
}

/// Errors a detection backend can raise
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detection backend unavailable: {0}")]
    Unavailable(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Object-detection backend contract. Called at two different confidence
/// thresholds depending on controller state.
pub trait Detector: Send {
    fn detect(
        &mut self,
        frame: &CameraFrame,
        confidence: f32,
    ) -> Result<DetectionFrame, DetectError>;
}

/// Owning wrapper around a detection backend, applying the
/// fail-to-empty policy at the seam.
pub struct DetectorHandle {
    backend: Box<dyn Detector>,
}

impl DetectorHandle {
    pub fn new(backend: Box<dyn Detector>) -> Self {
        Self { backend }
    }

    /// Run detection. Backend failures degrade to an empty frame.
    pub fn detect(&mut self, frame: &CameraFrame, confidence: f32) -> DetectionFrame {
        match self.backend.detect(frame, confidence) {
            Ok(detections) => detections,
            Err(err) => {
                tracing::warn!(sequence = frame.sequence, %err, "detector failed, treating as empty frame");
                DetectionFrame::empty(frame.height as f32)
            }
        }
    }
}

/// Backend that replays a prepared script of results, one per call.
/// Records the confidence threshold of every call. An exhausted script
/// yields empty frames.
pub struct ScriptedDetector {
    script: VecDeque<Result<DetectionFrame, DetectError>>,
    thresholds: Vec<f32>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Result<DetectionFrame, DetectError>>) -> Self {
        Self {
            script: script.into(),
            thresholds: Vec::new(),
        }
    }

    /// Confidence thresholds seen so far, in call order
    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }
}

impl Detector for ScriptedDetector {
    fn detect(
        &mut self,
        frame: &CameraFrame,
        confidence: f32,
    ) -> Result<DetectionFrame, DetectError> {
        self.thresholds.push(confidence);
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(DetectionFrame::empty(frame.height as f32)))
    }
}

/// Backend that never sees anything
pub struct NullDetector;

impl Detector for NullDetector {
    fn detect(
        &mut self,
        frame: &CameraFrame,
        _confidence: f32,
    ) -> Result<DetectionFrame, DetectError> {
        Ok(DetectionFrame::empty(frame.height as f32))
    }
}

// =============================================================================
// TESTS
// =============================================================================
