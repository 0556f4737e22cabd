use crate::common::Frame;
use crate::data::FrameReport;
use crate::throttle::InferenceSlot;

/// A frame that passed admission. Dropping it releases the in-flight slot.
#[derive(Debug)]
pub struct AdmittedFrame {
    pub frame: Frame,
    pub slot: InferenceSlot,
}

/// Worker side of the detection channels.
#[derive(Debug)]
pub struct DetectionState {
    pub frame_rx: crossbeam_channel::Receiver<AdmittedFrame>,
    pub report_tx: crossbeam_channel::Sender<FrameReport>,
}

/// Producer and consumer side of the detection channels.
#[derive(Debug)]
pub struct SendState {
    pub frame_tx: crossbeam_channel::Sender<AdmittedFrame>,
    pub report_rx: crossbeam_channel::Receiver<FrameReport>,
}

/// Frames are single-flight, so one buffered slot is enough.
pub fn detection_channels() -> (SendState, DetectionState) {
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(1);
    let (report_tx, report_rx) = crossbeam_channel::unbounded();
    (
        SendState { frame_tx, report_rx },
        DetectionState { frame_rx, report_tx },
    )
}
