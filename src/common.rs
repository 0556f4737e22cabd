mod candidate;
mod detection;
mod frame;
mod guide_box;
mod guide_config;
mod height_priors;
mod label_map;
mod position;

pub use candidate::*;
pub use detection::*;
pub use frame::*;
pub use guide_box::*;
pub use guide_config::*;
pub use height_priors::*;
pub use label_map::*;
pub use position::*;
