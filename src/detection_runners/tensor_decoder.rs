use ndarray::{ArrayView3, Axis};
use rayon::prelude::*;
use crate::common::{Candidate, GuideConfig};
use crate::data::{CoordScale, RawTensor, TensorLayout};

/// Parses a raw `[1, 4 + nc, anchors]` or `[1, anchors, 4 + nc]` detector
/// output into scored candidates.
///
/// Classification happens in two explicit steps: the memory layout once per
/// tensor, then the coordinate scale once per anchor. Anything malformed
/// yields an empty list, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDecoder {
    input_size: u32,
    num_classes: usize,
    conf_threshold: f32,
    normalized_coord_limit: f32,
}

impl Default for TensorDecoder {
    fn default() -> Self {
        Self::new(&GuideConfig::default())
    }
}

impl TensorDecoder {
    pub fn new(config: &GuideConfig) -> Self {
        Self {
            input_size: config.input_size,
            num_classes: config.num_classes,
            conf_threshold: config.conf_threshold,
            normalized_coord_limit: config.normalized_coord_limit,
        }
    }

    pub fn with_conf_threshold(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn decode_tensor(&self, raw: &RawTensor) -> Vec<Candidate> {
        match raw.as_slice() {
            Some(data) => self.decode(raw.shape(), data),
            None => {
                let data: Vec<f32> = raw.iter().copied().collect();
                self.decode(raw.shape(), &data)
            }
        }
    }

    /// Decodes a flat row-major buffer with the given logical shape.
    pub fn decode(&self, shape: &[usize], data: &[f32]) -> Vec<Candidate> {
        let layout = match TensorLayout::detect(shape, self.num_classes) {
            Some(layout) => layout,
            None => {
                log::warn!(
                    "Unexpected output shape {:?} (expected [1, {}, N] or [1, N, {}])",
                    shape,
                    4 + self.num_classes,
                    4 + self.num_classes
                );
                return Vec::new();
            }
        };
        if shape[0] == 0 {
            return Vec::new();
        }
        if data.len() != shape.iter().product::<usize>() {
            log::warn!("Output buffer of {} values does not match shape {:?}", data.len(), shape);
            return Vec::new();
        }

        let view = match ArrayView3::from_shape((shape[0], shape[1], shape[2]), data) {
            Ok(view) => view,
            Err(err) => {
                log::warn!("Output buffer of {} values does not fit shape {:?}: {}", data.len(), shape, err);
                return Vec::new();
            }
        };

        let rows = layout.anchor_rows(view);
        let input_size = self.input_size as f32;

        let candidates: Vec<(Candidate, CoordScale)> = rows
            .axis_iter(Axis(0))
            .into_par_iter()
            .filter_map(|row| {
                let (mut cx, mut cy, mut w, mut h) = (row[0], row[1], row[2], row[3]);
                if ![cx, cy, w, h].iter().all(|v| v.is_finite()) || w <= 0. || h <= 0. {
                    return None;
                }

                let scale = CoordScale::classify(cx, cy, w, h, self.normalized_coord_limit);
                if scale == CoordScale::Normalized {
                    cx *= input_size;
                    cy *= input_size;
                    w *= input_size;
                    h *= input_size;
                }

                // first strictly greatest positive score wins
                let mut best: Option<(usize, f32)> = None;
                for (class_id, &score) in row.iter().skip(4).take(self.num_classes).enumerate() {
                    if score > best.map_or(0., |(_, s)| s) {
                        best = Some((class_id, score));
                    }
                }
                let (class_id, score) = best?;

                if score < self.conf_threshold {
                    return None;
                }
                Some((Candidate::new(cx, cy, w, h, score, class_id), scale))
            })
            .collect();

        log::debug!(
            "decode_layout={} anchors={} candidates={} coord_scale={}",
            layout.as_str(),
            rows.len_of(Axis(0)),
            candidates.len(),
            candidates.last().map_or("none", |(_, s)| s.as_str())
        );

        candidates.into_iter().map(|(c, _)| c).collect()
    }
}
