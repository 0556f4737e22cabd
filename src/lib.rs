//! Detection decoding and spoken guidance for visually impaired users.
//!
//! Raw object-detector output is decoded into labeled, positioned and
//! distance-estimated detections, then turned into rate-limited speech.

mod utils;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod detectors;
pub mod speech;
pub mod throttle;

pub use common::{Detection, Frame, GuideBox, GuideConfig, LabelMap, Position};
pub use data::FrameReport;
pub use detection_processing::DetectionPipeline;
pub use detection_runners::{InferenceProcess, ModelRuntime};
pub use detectors::{init_detector, spawn_detector, Detector, FrameFeeder};
pub use speech::{Announcer, GuidanceController, RelevancePolicy, SpeechOutput};
pub use throttle::{InferenceSlot, InferenceThrottle};
