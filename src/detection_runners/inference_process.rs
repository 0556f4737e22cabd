use std::time::Instant;
use ndarray::Array4;
use crate::common::{Detection, GuideConfig, LabelMap};
use crate::data::{FrameReport, RawTensor};
use crate::utils;

/// The model runtime: accepts one normalized NCHW input and returns the raw
/// detector output for it.
pub trait ModelRuntime: Send {
    /// Side length of the square model input.
    fn input_size(&self) -> u32;

    fn run(&mut self, input: Array4<f32>) -> anyhow::Result<RawTensor>;

    /// Class names embedded in the model, if it carries any.
    fn labels(&self) -> Option<LabelMap> {
        None
    }
}

impl<R: ModelRuntime + ?Sized> ModelRuntime for Box<R> {
    fn input_size(&self) -> u32 {
        (**self).input_size()
    }

    fn run(&mut self, input: Array4<f32>) -> anyhow::Result<RawTensor> {
        (**self).run(input)
    }

    fn labels(&self) -> Option<LabelMap> {
        (**self).labels()
    }
}

/// Input tensor plus the upright frame size it was taken from.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub input: Array4<f32>,
    pub frame_width: u32,
    pub frame_height: u32,
}

pub trait InferenceProcess: Sized {
    type Input; // Frame
    type Runtime: ModelRuntime;

    /// Creates a new instance around an already constructed runtime.
    fn new(config: &GuideConfig, runtime: Self::Runtime) -> anyhow::Result<Self>;

    /// Pre-process the input data.
    fn preprocess(&self, x: &Self::Input) -> anyhow::Result<Prepared>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, input: Array4<f32>) -> anyhow::Result<RawTensor>;

    /// Post-process the model's output into frame-space detections.
    fn postprocess(&self, ys: RawTensor, frame_width: u32, frame_height: u32) -> anyhow::Result<Vec<Detection>>;

    /// Executes the full pipeline.
    fn run(&mut self, x: &Self::Input) -> anyhow::Result<Vec<Detection>> {
        let prepared = self.preprocess(x)?;
        let ys = self.inference(prepared.input)?;
        self.postprocess(ys, prepared.frame_width, prepared.frame_height)
    }

    /// Executes the full pipeline, timing each stage.
    fn forward(&mut self, x: &Self::Input, profile: bool) -> anyhow::Result<FrameReport> {
        let detect_time = Instant::now();

        let t_pre = Instant::now();
        let prepared = self.preprocess(x)?;
        let t_pre = t_pre.elapsed();

        let mut _detect_elapsed = detect_time.elapsed();
        _detect_elapsed = utils::trace(profile, "TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let t_exe = Instant::now();
        let ys = self.inference(prepared.input)?;
        let t_exe = t_exe.elapsed();

        _detect_elapsed = utils::trace(profile, "TIME", "Detection run", detect_time, _detect_elapsed);

        let t_post = Instant::now();
        let detections = self.postprocess(ys, prepared.frame_width, prepared.frame_height)?;
        let t_post = t_post.elapsed();

        utils::trace(profile, "TIME", "Postprocessing", detect_time, _detect_elapsed);

        self.record_time(t_pre, t_exe, t_post);
        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(FrameReport::new(detections, prepared.frame_width, prepared.frame_height).with_timings(t_pre, t_exe))
    }

    fn record_time(&mut self, _pre: std::time::Duration, _exe: std::time::Duration, _post: std::time::Duration) {}

    fn print_time(&self);
}
