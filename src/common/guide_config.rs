//! Tunables for decoding, distance estimation, admission and speech policy.

use std::path::Path;
use std::time::Duration;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use crate::common::HeightPriors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    // decoding
    pub input_size: u32,
    pub num_classes: usize,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    /// Box values at or below this are treated as normalized to `[0, 1]`.
    pub normalized_coord_limit: f32,

    // distance
    pub vertical_fov_deg: f32,
    pub min_distance_m: f32,
    pub max_distance_m: f32,
    pub height_priors: HeightPriors,

    // admission
    pub min_inference_interval_ms: u64,

    // ambient speech
    pub global_speech_interval_ms: u64,
    pub label_cooldown_ms: u64,
    pub manual_pick_count: usize,
    pub auto_pick_count: usize,

    // guidance
    pub guidance_update_interval_ms: u64,
    pub not_found_prompt_interval_ms: u64,
    pub arrival_distance_m: f32,
    pub near_distance_m: f32,

    /// Drop detections whose class index had no label.
    pub hide_unknown: bool,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            num_classes: 80,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            normalized_coord_limit: 1.5,

            vertical_fov_deg: 60.0,
            min_distance_m: 0.05,
            max_distance_m: 20.0,
            height_priors: HeightPriors::default(),

            min_inference_interval_ms: 250,

            global_speech_interval_ms: 2_500,
            label_cooldown_ms: 8_000,
            manual_pick_count: 4,
            auto_pick_count: 3,

            guidance_update_interval_ms: 900,
            not_found_prompt_interval_ms: 2_500,
            arrival_distance_m: 0.25,
            near_distance_m: 0.6,

            hide_unknown: false,
        }
    }
}

impl GuideConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads a JSON config. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            anyhow::bail!("input_size must be positive");
        }
        if self.num_classes == 0 {
            anyhow::bail!("num_classes must be positive");
        }
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            anyhow::bail!("conf_threshold {} is outside [0, 1]", self.conf_threshold);
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!("iou_threshold {} is outside [0, 1]", self.iou_threshold);
        }
        if !(self.vertical_fov_deg > 0.0 && self.vertical_fov_deg < 180.0) {
            anyhow::bail!("vertical_fov_deg {} is outside (0, 180)", self.vertical_fov_deg);
        }
        if self.min_distance_m > self.max_distance_m {
            anyhow::bail!(
                "min_distance_m {} is larger than max_distance_m {}",
                self.min_distance_m,
                self.max_distance_m
            );
        }
        Ok(())
    }

    pub fn with_input_size(mut self, n: u32) -> Self {
        self.input_size = n;
        self
    }

    pub fn with_num_classes(mut self, n: usize) -> Self {
        self.num_classes = n;
        self
    }

    pub fn with_conf_threshold(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn with_iou_threshold(mut self, x: f32) -> Self {
        self.iou_threshold = x;
        self
    }

    pub fn with_vertical_fov_deg(mut self, x: f32) -> Self {
        self.vertical_fov_deg = x;
        self
    }

    pub fn with_height_priors(mut self, x: HeightPriors) -> Self {
        self.height_priors = x;
        self
    }

    pub fn with_min_inference_interval_ms(mut self, ms: u64) -> Self {
        self.min_inference_interval_ms = ms;
        self
    }

    pub fn with_global_speech_interval_ms(mut self, ms: u64) -> Self {
        self.global_speech_interval_ms = ms;
        self
    }

    pub fn with_label_cooldown_ms(mut self, ms: u64) -> Self {
        self.label_cooldown_ms = ms;
        self
    }

    pub fn with_guidance_update_interval_ms(mut self, ms: u64) -> Self {
        self.guidance_update_interval_ms = ms;
        self
    }

    pub fn with_hide_unknown(mut self, x: bool) -> Self {
        self.hide_unknown = x;
        self
    }

    pub fn min_inference_interval(&self) -> Duration {
        Duration::from_millis(self.min_inference_interval_ms)
    }

    pub fn global_speech_interval(&self) -> Duration {
        Duration::from_millis(self.global_speech_interval_ms)
    }

    pub fn label_cooldown(&self) -> Duration {
        Duration::from_millis(self.label_cooldown_ms)
    }

    pub fn guidance_update_interval(&self) -> Duration {
        Duration::from_millis(self.guidance_update_interval_ms)
    }

    pub fn not_found_prompt_interval(&self) -> Duration {
        Duration::from_millis(self.not_found_prompt_interval_ms)
    }

    pub fn to_string(&self) -> String {
        format!("Model Input Resolution: {0}x{0}\n\
        Classes: {1}\n\
        Detection Threshold: {2}\n\
        NMS IoU Threshold: {3}\n\
        Vertical FOV: {4} deg\n\
        Min Inference Interval: {5} ms",
                self.input_size, self.num_classes, self.conf_threshold,
                self.iou_threshold, self.vertical_fov_deg, self.min_inference_interval_ms)
    }
}
