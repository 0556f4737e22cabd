use serde::{Deserialize, Serialize};
use crate::common::{GuideBox, Position};

/// A finished, frame-space detection handed to the renderer and the speech policies.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    /// Normalized to the (rotated) frame, not the model input.
    pub bbox: GuideBox,
    pub distance_m: f32,
    pub position: Position,
    /// False when the class index had no entry in the label map.
    pub has_label: bool,
}

impl Detection {
    pub fn new(label: &str, confidence: f32, bbox: GuideBox, distance_m: f32) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bbox,
            distance_m,
            position: Position::from_center_x(bbox.cx()),
            has_label: true,
        }
    }

    /// Sets the normalized box and recomputes the position zone.
    ///
    /// # Arguments
    ///
    /// * `x1` - The x-coordinate of the top-left corner.
    /// * `y1` - The y-coordinate of the top-left corner.
    /// * `x2` - The x-coordinate of the bottom-right corner.
    /// * `y2` - The y-coordinate of the bottom-right corner.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = GuideBox::default().with_x1y1_x2y2(x1, y1, x2, y2);
        self.position = Position::from_center_x(self.bbox.cx());
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_distance(mut self, distance_m: f32) -> Self {
        self.distance_m = distance_m;
        self
    }

    pub fn with_has_label(mut self, has_label: bool) -> Self {
        self.has_label = has_label;
        self
    }

    /// Normalized horizontal center.
    pub fn cx(&self) -> f32 {
        self.bbox.cx()
    }

    /// `1` at the horizontal center of the frame, `0` at either edge.
    pub fn centering(&self) -> f32 {
        1. - (self.cx() - 0.5).abs() * 2.
    }

    /// Coarse distance bucket used in announcement signatures.
    pub fn distance_bucket(&self) -> &'static str {
        if self.distance_m < 1.0 {
            "near"
        } else if self.distance_m < 2.5 {
            "mid"
        } else {
            "far"
        }
    }
}
