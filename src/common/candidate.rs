use crate::common::GuideBox;
use crate::detection_runners::nms::Nms;

/// Raw pre-suppression guess in model input space (e.g. 640x640 pixels).
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub score: f32,
    pub class_id: usize,
}

impl Candidate {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32, score: f32, class_id: usize) -> Self {
        Self { cx, cy, w, h, score, class_id }
    }

    /// Corner form, still in input space.
    pub fn corners(&self) -> GuideBox {
        GuideBox::default().with_cxcy_wh(self.cx, self.cy, self.w, self.h)
    }
}

impl Nms for Candidate {
    fn iou(&self, other: &Self) -> f32 {
        self.corners().iou(&other.corners())
    }

    fn confidence(&self) -> f32 {
        self.score
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}
