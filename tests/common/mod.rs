#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use anyhow::Result;
use ndarray::Array4;
use sight_guide::data::RawTensor;
use sight_guide::ModelRuntime;

pub const CH: usize = 84;

/// Channels-first `[1, 84, anchors]` output with the given anchors set.
pub fn channels_first(anchors: usize, set: &[(usize, [f32; 4], usize, f32)]) -> RawTensor {
    let mut data = vec![0f32; CH * anchors];
    for &(a, bbox, class_id, score) in set {
        for (k, v) in bbox.iter().enumerate() {
            data[k * anchors + a] = *v;
        }
        data[(4 + class_id) * anchors + a] = score;
    }
    RawTensor::from_shape_vec(&[1, CH, anchors], data).unwrap()
}

/// Returns a canned output for every call and counts the calls.
pub struct FakeRuntime {
    pub output: RawTensor,
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
    pub panic_first: bool,
}

impl FakeRuntime {
    pub fn new(output: RawTensor) -> Self {
        Self {
            output,
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
            panic_first: false,
        }
    }

    /// Panics on its first call, then behaves like [`FakeRuntime::new`].
    pub fn panicking_once(output: RawTensor) -> Self {
        Self {
            panic_first: true,
            ..Self::new(output)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(RawTensor::default())
        }
    }
}

impl ModelRuntime for FakeRuntime {
    fn input_size(&self) -> u32 {
        64
    }

    fn run(&mut self, input: Array4<f32>) -> Result<RawTensor> {
        assert_eq!(input.shape(), &[1, 3, 64, 64]);
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_first && call == 0 {
            panic!("runtime crashed");
        }
        if self.fail {
            anyhow::bail!("runtime exploded");
        }
        Ok(self.output.clone())
    }
}
