use ndarray::{ArrayView2, ArrayView3, Axis};

/// Memory order of a `[batch, a, b]` detector output where one of `a`/`b`
/// is `4 + num_classes` and the other the anchor count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[1, 4 + nc, anchors]`: each field is strided by the anchor count.
    ChannelsFirst,
    /// `[1, anchors, 4 + nc]`: each anchor is contiguous.
    AnchorsLast,
}

impl TensorLayout {
    /// Classifies a shape. `None` for anything that is not rank 3 with a
    /// matching channel axis. Channels-first wins when both axes match.
    pub fn detect(shape: &[usize], num_classes: usize) -> Option<Self> {
        if shape.len() != 3 {
            return None;
        }
        let channels = 4 + num_classes;
        if shape[1] == channels {
            Some(TensorLayout::ChannelsFirst)
        } else if shape[2] == channels {
            Some(TensorLayout::AnchorsLast)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TensorLayout::ChannelsFirst => "channels_first",
            TensorLayout::AnchorsLast => "anchors_last",
        }
    }

    /// Views the first batch entry as `[anchors, 4 + nc]` regardless of layout.
    pub fn anchor_rows<'a>(&self, x: ArrayView3<'a, f32>) -> ArrayView2<'a, f32> {
        let x = x.index_axis_move(Axis(0), 0);
        match self {
            TensorLayout::ChannelsFirst => x.reversed_axes(),
            TensorLayout::AnchorsLast => x,
        }
    }
}

/// Coordinate scale of one anchor's box values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordScale {
    /// Values in `[0, 1]` relative to the model input.
    Normalized,
    /// Values already in model input pixels.
    Pixels,
}

impl CoordScale {
    /// Decided per anchor, since export pipelines differ.
    pub fn classify(cx: f32, cy: f32, w: f32, h: f32, normalized_limit: f32) -> Self {
        if cx.max(cy).max(w.max(h)) <= normalized_limit {
            CoordScale::Normalized
        } else {
            CoordScale::Pixels
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordScale::Normalized => "normalized_xywh",
            CoordScale::Pixels => "pixel_xywh",
        }
    }
}
