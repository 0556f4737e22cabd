use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use anyhow::Result;
use crossbeam_channel::{Receiver, TrySendError};
use ndarray::Array4;
use crate::common::{Detection, Frame, GuideConfig, LabelMap};
use crate::data::send_channels::{detection_channels, AdmittedFrame, DetectionState};
use crate::data::{FrameReport, RawTensor, TimeCalc, CROSS_MARK};
use crate::detection_processing::DetectionPipeline;
use crate::detection_runners::image_ops::preprocess_frame;
use crate::detection_runners::{InferenceProcess, ModelRuntime, Prepared};
use crate::throttle::InferenceThrottle;

/// A model runtime plus everything needed to turn its output into detections.
#[derive(Debug)]
pub struct Detector<R: ModelRuntime> {
    runtime: R,
    pipeline: DetectionPipeline,
    input_size: u32,
    profile: bool,
    pub ts: TimeCalc,
}

impl<R: ModelRuntime> InferenceProcess for Detector<R> {
    type Input = Frame;
    type Runtime = R;

    fn new(config: &GuideConfig, runtime: R) -> Result<Self> {
        config.validate()?;
        let input_size = runtime.input_size();
        if input_size == 0 {
            anyhow::bail!("{CROSS_MARK} Model runtime reports an input size of 0");
        }
        if input_size != config.input_size {
            log::warn!("Runtime input size {} overrides configured {}", input_size, config.input_size);
        }
        let config = config.clone().with_input_size(input_size);

        // labels embedded in the model win over the built-in list
        let labels = runtime.labels().unwrap_or_else(LabelMap::coco);
        log::info!("Detector ready: input={}x{} labels={}", input_size, input_size, labels.len());
        log::debug!("{}", config.to_string());

        Ok(Self {
            runtime,
            pipeline: DetectionPipeline::new(&config, labels),
            input_size,
            profile: false,
            ts: TimeCalc::default(),
        })
    }

    fn preprocess(&self, x: &Frame) -> Result<Prepared> {
        let (input, frame_width, frame_height) = preprocess_frame(&x.image, x.rotation_degrees, self.input_size)?;
        Ok(Prepared {
            input,
            frame_width,
            frame_height,
        })
    }

    fn inference(&mut self, input: Array4<f32>) -> Result<RawTensor> {
        self.runtime.run(input)
    }

    fn postprocess(&self, ys: RawTensor, frame_width: u32, frame_height: u32) -> Result<Vec<Detection>> {
        Ok(self.pipeline.process_tensor(&ys, frame_width, frame_height))
    }

    fn record_time(&mut self, pre: std::time::Duration, exe: std::time::Duration, post: std::time::Duration) {
        self.ts.add_or_push(0, pre);
        self.ts.add_or_push(1, exe);
        self.ts.add_or_push(2, post);
    }

    fn print_time(&self) {
        log::info!(
            "cycles={} avg={:?} (pre {:?} | run {:?} | post {:?})",
            self.ts.n(),
            self.ts.avg(),
            self.ts.avg_i(0).unwrap_or_default(),
            self.ts.avg_i(1).unwrap_or_default(),
            self.ts.avg_i(2).unwrap_or_default(),
        );
    }
}

impl<R: ModelRuntime> Detector<R> {
    pub fn with_labels(mut self, labels: LabelMap) -> Self {
        self.pipeline = self.pipeline.with_labels(labels);
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// One full detection cycle for a single frame.
    pub fn detect(&mut self, frame: &Frame) -> Result<FrameReport> {
        let profile = self.profile;
        self.forward(frame, profile)
    }
}

/// Builds a detector from a runtime construction result. A failed runtime
/// disables detection instead of bringing the application down.
pub fn init_detector<R: ModelRuntime>(config: &GuideConfig, runtime: Result<R>) -> Option<Detector<R>> {
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("{CROSS_MARK} Model runtime unavailable, detection disabled: {err:#}");
            return None;
        }
    };
    match Detector::new(config, runtime) {
        Ok(detector) => Some(detector),
        Err(err) => {
            log::error!("{CROSS_MARK} Detector setup failed, detection disabled: {err:#}");
            None
        }
    }
}

/// Producer side of a running detector: admits frames through the throttle
/// and hands them to the worker thread.
#[derive(Debug)]
pub struct FrameFeeder {
    throttle: Arc<InferenceThrottle>,
    frame_tx: Option<crossbeam_channel::Sender<AdmittedFrame>>,
}

impl FrameFeeder {
    /// Offers a frame. Returns `true` when it was accepted for inference;
    /// rejected frames are dropped silently.
    pub fn submit(&self, frame: Frame) -> bool {
        let Some(frame_tx) = &self.frame_tx else {
            return false;
        };
        let Some(slot) = self.throttle.try_admit() else {
            return false;
        };
        match frame_tx.try_send(AdmittedFrame { frame, slot }) {
            Ok(()) => true,
            // the slot travels back inside the error and is released when it drops
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Detection worker is gone, dropping frame");
                false
            }
        }
    }

    pub fn throttle(&self) -> &Arc<InferenceThrottle> {
        &self.throttle
    }

    /// Closes the frame channel, which ends the worker loop, and clears any
    /// in-flight claim.
    pub fn stop(&mut self) {
        self.frame_tx = None;
        self.throttle.release();
    }
}

impl Drop for FrameFeeder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts the single detection worker thread.
pub fn spawn_detector<R>(mut detector: Detector<R>, config: &GuideConfig) -> Result<(FrameFeeder, Receiver<FrameReport>, JoinHandle<()>)>
where
    R: ModelRuntime + 'static,
{
    let throttle = InferenceThrottle::new(config.min_inference_interval());
    let (send_state, detection_state) = detection_channels();

    let handle = std::thread::Builder::new()
        .name("sight_guide-detector".to_string())
        .spawn(move || detection_loop(&mut detector, detection_state))?;

    let feeder = FrameFeeder {
        throttle,
        frame_tx: Some(send_state.frame_tx),
    };
    Ok((feeder, send_state.report_rx, handle))
}

fn detection_loop<R: ModelRuntime>(detector: &mut Detector<R>, state: DetectionState) {
    log::info!("Detection worker started");
    // MESSAGE LOOP STARTS HERE
    while let Ok(AdmittedFrame { frame, slot }) = state.frame_rx.recv() {
        let detect_time = Instant::now();
        // a panicking runtime counts as a failed cycle, the worker keeps serving
        let result = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(&frame)))
            .unwrap_or_else(|payload| Err(anyhow::anyhow!("runtime panicked: {}", panic_message(&*payload))));
        drop(slot);

        match result {
            Ok(report) => {
                log::debug!("Cycle finished in {:?} with {} detections", detect_time.elapsed(), report.detections.len());
                if state.report_tx.send(report).is_err() {
                    log::info!("Report receiver dropped, stopping detection worker");
                    break;
                }
            }
            Err(err) => log::error!("{CROSS_MARK} Detection cycle failed: {err:#}"),
        }
    }
    detector.print_time();
    log::info!("Detection worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
