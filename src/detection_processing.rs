use crate::common::{Detection, GuideConfig, LabelMap};
use crate::data::RawTensor;
use crate::detection_runners::{non_max_suppression, CoordinateMapper, DistanceEstimator, TensorDecoder};

/// The pure part of a detection cycle: raw output tensor in, finished
/// frame-space detections out. No I/O, no clock.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    decoder: TensorDecoder,
    estimator: DistanceEstimator,
    labels: LabelMap,
    input_size: u32,
    iou_threshold: f32,
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new(&GuideConfig::default(), LabelMap::coco())
    }
}

impl DetectionPipeline {
    pub fn new(config: &GuideConfig, labels: LabelMap) -> Self {
        Self {
            decoder: TensorDecoder::new(config),
            estimator: DistanceEstimator::new(config),
            labels,
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
        }
    }

    pub fn with_labels(mut self, labels: LabelMap) -> Self {
        self.labels = labels;
        self
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn process_tensor(&self, raw: &RawTensor, frame_width: u32, frame_height: u32) -> Vec<Detection> {
        let candidates = self.decoder.decode_tensor(raw);
        self.finalize(candidates, frame_width, frame_height)
    }

    /// Decodes a flat output buffer with the given shape for a frame of the
    /// given upright size.
    pub fn process(&self, shape: &[usize], data: &[f32], frame_width: u32, frame_height: u32) -> Vec<Detection> {
        let candidates = self.decoder.decode(shape, data);
        self.finalize(candidates, frame_width, frame_height)
    }

    fn finalize(&self, mut candidates: Vec<crate::common::Candidate>, frame_width: u32, frame_height: u32) -> Vec<Detection> {
        let decoded = candidates.len();
        non_max_suppression(&mut candidates, self.iou_threshold);

        let mapper = CoordinateMapper::new(self.input_size, frame_width, frame_height);
        let detections: Vec<Detection> = candidates
            .iter()
            .map(|candidate| {
                let bbox = mapper.map(candidate);
                let (label, has_label) = self.labels.resolve(candidate.class_id);
                let distance = self.estimator.estimate(label, &bbox, frame_height);
                Detection::new(label, candidate.score, bbox, distance).with_has_label(has_label)
            })
            .collect();

        log::debug!("candidates={} kept={} frame={}x{}", decoded, detections.len(), frame_width, frame_height);
        detections
    }
}
