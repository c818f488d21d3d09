//! Pothole detection post-processing.
//!
//! Camera frames go through a fixed-size detection model; the dense output is
//! decoded into normalized boxes, filtered by confidence and reduced with
//! greedy Non-Maximum Suppression.
//!
//! ```no_run
//! use pothole_detect::common::{DetectorConfig, InputFrame};
//!
//! let config = DetectorConfig::new().with_model("model.onnx");
//! let mut detector = pothole_detect::init_detector(config)?;
//!
//! let frame = InputFrame::from(image::open("road.jpg")?);
//! for detection in detector.detect(&frame) {
//!     println!("{} {:?}", detection.caption(), detection.bbox().ltrb());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod utils;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod detectors;
pub mod frame_worker;

use crate::common::{Detection, DetectorConfig, InputFrame, ModelLoadError};
use crate::detection_runners::OrtEngine;

pub use crate::detectors::Detector;
pub use crate::frame_worker::{FrameStats, FrameWorker, SubmitOutcome};

/// Loads the ONNX model and runs one warm-up inference.
///
/// Failure here should disable detection, not the application.
pub fn init_detector(config: DetectorConfig) -> Result<Detector<OrtEngine>, ModelLoadError> {
    log::info!("Initializing ORT session with ({}) execution provider", config.device);
    let mut detector = Detector::from_config(config)?;
    detector
        .warm_up()
        .map_err(|e| ModelLoadError::Incompatible(format!("warm-up inference failed: {e}")))?;
    Ok(detector)
}

/// Runs one frame through `detector`; see [`Detector::detect`].
///
/// Returns no detections when the frame is empty or inference fails.
pub fn run_detection(detector: &mut Detector<OrtEngine>, frame: &InputFrame) -> Vec<Detection> {
    detector.detect(frame)
}
