mod announcer;
mod guidance_controller;
mod relevance_policy;
mod speech_output;

pub use announcer::*;
pub use guidance_controller::*;
pub use relevance_policy::*;
pub use speech_output::*;
