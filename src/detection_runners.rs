pub mod image_ops;
pub mod inference_process;
pub mod ort_detector;
pub mod stub_detector;

pub use inference_process::InferenceEngine;
pub use ort_detector::*;
pub use stub_detector::{StubEngine, StubResponse};
