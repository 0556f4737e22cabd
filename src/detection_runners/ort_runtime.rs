//! ONNX Runtime backed [`ModelRuntime`], loaded dynamically from a shared library.

use std::path::Path;
use anyhow::Result;
use half::f16;
use ndarray::Array4;
use ort::{
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Tensor,
};
use crate::common::LabelMap;
use crate::data::{RawTensor, CROSS_MARK};
use crate::detection_runners::inference_process::ModelRuntime;

#[derive(Debug)]
pub struct OrtRuntime {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: u32,
    labels: Option<LabelMap>,
}

impl OrtRuntime {
    /// Loads `onnxruntime` from `ort_lib_path` and opens the model at `onnx_path`.
    pub fn new<P: AsRef<Path>>(ort_lib_path: P, onnx_path: P, input_size: u32) -> Result<Self> {
        let ort_lib_path = ort_lib_path.as_ref();
        let onnx_path = onnx_path.as_ref();
        if !onnx_path.exists() {
            anyhow::bail!("{CROSS_MARK} Model file not found: {}", onnx_path.display());
        }

        let ort_init = ort::init_from(ort_lib_path.to_string_lossy().to_string());
        match ort_init.commit() {
            Ok(_) => {}
            Err(e) => {
                return Err(anyhow::anyhow!("{CROSS_MARK} Failed to commit ORT from {}: {:?}", ort_lib_path.display(), e));
            }
        };

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(onnx_path)?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => anyhow::bail!("{CROSS_MARK} Model has no inputs"),
        };
        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => anyhow::bail!("{CROSS_MARK} Model has no outputs"),
        };

        let labels = Self::fetch_names(&session);
        log::info!(
            "ORT session ready: input={} output={} size={} embedded_labels={}",
            input_name,
            output_name,
            input_size,
            labels.as_ref().map_or(0, |l| l.len())
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size,
            labels,
        })
    }

    /// Class names from the model's `names` metadata entry, e.g. `{0: 'person', 1: 'bicycle'}`.
    fn fetch_names(session: &Session) -> Option<LabelMap> {
        let metadata = session.metadata().ok()?;
        let names = metadata.custom("names").ok()??;
        match LabelMap::from_metadata_names(&names) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!("Ignoring model label metadata: {err}");
                None
            }
        }
    }
}

impl ModelRuntime for OrtRuntime {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn run(&mut self, input: Array4<f32>) -> Result<RawTensor> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])?;
        let output = &outputs[self.output_name.as_str()];

        let raw = match output.try_extract_array::<f32>() {
            Ok(x) => RawTensor::from(x.into_owned()),
            Err(_) => {
                // half-precision exports
                let x = output.try_extract_array::<f16>()?;
                RawTensor::from(x.mapv(f16::to_f32))
            }
        };
        Ok(raw)
    }

    fn labels(&self) -> Option<LabelMap> {
        self.labels.clone()
    }
}
