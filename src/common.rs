mod bounding_box;
mod detection;
mod detector_config;
mod errors;
mod inference_device;
mod input_frame;

pub use bounding_box::*;
pub use detection::*;
pub use detector_config::*;
pub use errors::*;
pub use inference_device::*;
pub use input_frame::*;
