//! Detection frame model
//!
//! One `DetectionFrame` per loop iteration: the labeled boxes the detector
//! recognized in the current camera frame. Not retained past the tick that
//! consumes it.

use serde::{Deserialize, Serialize};

/// Object classes the detector is primed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Person,
    CardboardBox,
    DeliveryPackage,
}

impl Label {
    /// Class names in detector order
    pub fn classes() -> [&'static str; 3] {
        ["person", "cardboard box", "delivery package"]
    }

    /// Parse a detector class name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "person" => Some(Label::Person),
            "cardboard box" => Some(Label::CardboardBox),
            "delivery package" => Some(Label::DeliveryPackage),
            _ => None,
        }
    }

    /// Whether this label is a package of either kind
    pub fn is_package(&self) -> bool {
        matches!(self, Label::CardboardBox | Label::DeliveryPackage)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Label::Person => "person",
            Label::CardboardBox => "cardboard box",
            Label::DeliveryPackage => "delivery package",
        };
        write!(f, "{}", name)
    }
}

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box height in pixels
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One recognized object in a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: Label,
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// All recognized objects in one camera frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub detections: Vec<Detection>,
    /// Frame height in pixels, needed for the oversized-person check
    pub frame_height: f32,
}

impl DetectionFrame {
    /// Create an empty frame (also the shape a failed detector call maps to)
    pub fn empty(frame_height: f32) -> Self {
        Self {
            detections: Vec::new(),
            frame_height,
        }
    }

    pub fn with_detections(frame_height: f32, detections: Vec<Detection>) -> Self {
        Self {
            detections,
            frame_height,
        }
    }

    /// Whether any box carries the given label
    pub fn contains(&self, label: Label) -> bool {
        self.detections.iter().any(|d| d.label == label)
    }

    /// A qualifying frame for the idle debounce: a person together with
    /// a box or package
    pub fn has_delivery_candidate(&self) -> bool {
        self.contains(Label::Person)
            && self.detections.iter().any(|d| d.label.is_package())
    }

    /// Person boxes taller than `ratio` of the frame height, in detector
    /// order. The guard tick acts on the first only.
    pub fn oversized_persons(&self, ratio: f32) -> impl Iterator<Item = &Detection> {
        let threshold = self.frame_height * ratio;
        self.detections
            .iter()
            .filter(move |d| d.label == Label::Person && d.bbox.height() > threshold)
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Short label summary for the overlay line, e.g. "person+package"
    pub fn summary(&self) -> String {
        if self.detections.is_empty() {
            return "-".to_string();
        }
        let mut parts: Vec<&str> = Vec::new();
        if self.contains(Label::Person) {
            parts.push("person");
        }
        if self.detections.iter().any(|d| d.label.is_package()) {
            parts.push("package");
        }
        if parts.is_empty() {
            parts.push("other");
        }
        parts.join("+")
    }
}

// =============================================================================
// TESTS
// =============================================================================
