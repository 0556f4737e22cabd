mod frame_report;
mod raw_tensor;
mod tensor_layout;
mod time_calc;
pub mod send_channels;

pub use frame_report::FrameReport;
pub use raw_tensor::RawTensor;
pub use tensor_layout::{CoordScale, TensorLayout};
pub use time_calc::TimeCalc;

pub(crate) const CROSS_MARK: &str = "❌";
