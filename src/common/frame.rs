use image::{DynamicImage, RgbImage};

/// One camera frame as delivered by the frame source.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub image: DynamicImage,
    /// Clockwise rotation needed to bring the image upright (0, 90, 180 or 270).
    pub rotation_degrees: u32,
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Self {
            image,
            rotation_degrees: 0,
        }
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::from(image),
            rotation_degrees: 0,
        }
    }
}

impl Frame {
    pub fn new(image: DynamicImage, rotation_degrees: u32) -> Self {
        Self {
            image,
            rotation_degrees,
        }
    }

    pub fn with_rotation(mut self, rotation_degrees: u32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    /// Dimensions after rotation, i.e. the frame space detections are normalized to.
    pub fn upright_dimensions(&self) -> (u32, u32) {
        let (w, h) = (self.image.width(), self.image.height());
        match self.rotation_degrees % 360 {
            90 | 270 => (h, w),
            _ => (w, h),
        }
    }
}
