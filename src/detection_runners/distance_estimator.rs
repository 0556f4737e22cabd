use crate::common::{GuideBox, GuideConfig, HeightPriors};

/// Coarse monocular distance from a pinhole camera model.
///
/// `distance = real_height * fy / box_height_px` with
/// `fy = (frame_height / 2) / tan(vfov / 2)`. There is no calibration step and
/// no per-class size variance: the estimate is a heuristic, only the formula
/// and its clamp range are fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEstimator {
    vertical_fov_deg: f32,
    min_distance_m: f32,
    max_distance_m: f32,
    priors: HeightPriors,
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self::new(&GuideConfig::default())
    }
}

impl DistanceEstimator {
    pub fn new(config: &GuideConfig) -> Self {
        Self {
            vertical_fov_deg: config.vertical_fov_deg,
            min_distance_m: config.min_distance_m,
            max_distance_m: config.max_distance_m,
            priors: config.height_priors.clone(),
        }
    }

    /// Focal length in pixels along the vertical axis.
    pub fn focal_length_px(&self, frame_height: u32) -> f32 {
        let half_fov = (self.vertical_fov_deg as f64 / 2.0).to_radians();
        ((frame_height as f64 / 2.0) / half_fov.tan()) as f32
    }

    /// Estimates meters to an object with the given normalized box.
    pub fn estimate(&self, label: &str, bbox: &GuideBox, frame_height: u32) -> f32 {
        let box_height_px = (bbox.height() * frame_height as f32).max(1.);
        let real_height = self.priors.height_of(label);
        let distance = real_height * self.focal_length_px(frame_height) / box_height_px;
        distance.clamp(self.min_distance_m, self.max_distance_m)
    }
}
