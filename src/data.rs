mod model_input;
mod raw_detections;
mod time_calc;
pub mod send_channels;

pub use model_input::{ModelInput, TensorLayout};
pub use raw_detections::{RawDetections, CANDIDATE_FIELDS};
pub use send_channels::FrameResult;
pub use time_calc::TimeCalc;
