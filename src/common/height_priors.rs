use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Typical real-world heights of objects, in meters, keyed by label.
///
/// Static configuration for the monocular distance heuristic. Values are
/// rough priors, not measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightPriors {
    pub heights: HashMap<String, f32>,
    pub fallback: f32,
}

impl Default for HeightPriors {
    fn default() -> Self {
        let heights = [
            ("person", 1.70),
            ("chair", 0.90),
            ("couch", 0.90),
            ("bed", 0.55),
            ("dining table", 0.75),
            ("tv", 0.60),
            ("laptop", 0.25),
            ("cell phone", 0.15),
            ("bottle", 0.28),
            ("cup", 0.08),
            ("book", 0.24),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self { heights, fallback: 0.50 }
    }
}

impl HeightPriors {
    pub fn with_height(mut self, label: &str, meters: f32) -> Self {
        self.heights.insert(label.to_string(), meters);
        self
    }

    pub fn with_fallback(mut self, meters: f32) -> Self {
        self.fallback = meters;
        self
    }

    pub fn height_of(&self, label: &str) -> f32 {
        self.heights.get(label).copied().unwrap_or(self.fallback)
    }
}
