pub mod inference_process;
pub mod image_ops;
pub mod nms;
mod coordinate_mapper;
mod distance_estimator;
mod tensor_decoder;
#[cfg(feature = "ort-runtime")]
mod ort_runtime;

pub use coordinate_mapper::*;
pub use distance_estimator::*;
pub use inference_process::{InferenceProcess, ModelRuntime, Prepared};
pub use nms::{non_max_suppression, Nms};
pub use tensor_decoder::*;
#[cfg(feature = "ort-runtime")]
pub use ort_runtime::*;
