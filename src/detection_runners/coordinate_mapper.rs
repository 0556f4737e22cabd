use crate::common::{Candidate, GuideBox};

/// Maps input-space boxes back into normalized frame space.
///
/// Preprocessing stretches the frame to a square input (no letterbox), so the
/// two axes have independent scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale_x: f32,
    scale_y: f32,
    frame_width: f32,
    frame_height: f32,
}

impl CoordinateMapper {
    pub fn new(input_size: u32, frame_width: u32, frame_height: u32) -> Self {
        let input_size = input_size.max(1) as f32;
        let frame_width = frame_width.max(1) as f32;
        let frame_height = frame_height.max(1) as f32;
        Self {
            scale_x: frame_width / input_size,
            scale_y: frame_height / input_size,
            frame_width,
            frame_height,
        }
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    /// Center form in input pixels → clamped corner form in `[0, 1]`.
    pub fn map(&self, candidate: &Candidate) -> GuideBox {
        let b = candidate.corners();
        let (x1, x2) = (b.x1 * self.scale_x / self.frame_width, b.x2 * self.scale_x / self.frame_width);
        let (y1, y2) = (b.y1 * self.scale_y / self.frame_height, b.y2 * self.scale_y / self.frame_height);
        // corners stay ordered even for a negative extent
        GuideBox::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)).clamp_unit()
    }
}
