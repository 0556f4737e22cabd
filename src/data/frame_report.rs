use std::time::Duration;
use serde::Serialize;
use crate::common::Detection;

/// Result of one accepted detection cycle, delivered to the consumer context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub detections: Vec<Detection>,
    /// Upright frame size the detections are normalized to.
    pub frame_width: u32,
    pub frame_height: u32,
    pub preprocess_time: Duration,
    pub inference_time: Duration,
}

impl FrameReport {
    pub fn new(detections: Vec<Detection>, frame_width: u32, frame_height: u32) -> Self {
        Self {
            detections,
            frame_width,
            frame_height,
            ..Default::default()
        }
    }

    pub fn with_timings(mut self, preprocess_time: Duration, inference_time: Duration) -> Self {
        self.preprocess_time = preprocess_time;
        self.inference_time = inference_time;
        self
    }
}
