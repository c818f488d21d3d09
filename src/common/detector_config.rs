//! Options for building a detector.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::common::{ConfigError, InferenceDevice, POTHOLE_LABEL};
use crate::data::TensorLayout;

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 640;
/// Candidate slots in the model output.
pub const NUM_DETECTIONS: usize = 8400;
/// Candidates must score strictly above this to be kept.
pub const CONFIDENCE_THRESHOLD: f32 = 0.6;
/// Boxes overlapping a stronger box above this IoU are suppressed.
pub const IOU_THRESHOLD: f32 = 0.4;
/// Intra-op threads for the inference session.
pub const NUM_THREADS: usize = 4;
/// Frames skipped between two processed frames.
pub const FRAME_SKIP_COUNT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_path: String,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub num_threads: usize,

    // model contract
    pub input_size: u32,
    pub input_layout: TensorLayout,
    pub num_detections: usize,
    pub boxes_normalized: bool,

    // post-processing
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub label: String,

    // caller-side frame pacing
    pub frame_skip: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            num_threads: NUM_THREADS,

            input_size: INPUT_SIZE,
            input_layout: TensorLayout::Nhwc,
            num_detections: NUM_DETECTIONS,
            boxes_normalized: true,

            conf_threshold: CONFIDENCE_THRESHOLD,
            iou_threshold: IOU_THRESHOLD,
            label: POTHOLE_LABEL.to_string(),

            frame_skip: FRAME_SKIP_COUNT,
        }
    }
}

impl DetectorConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads a JSON config. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_model(mut self, model_path: &str) -> Self {
        self.model_path = model_path.to_string();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = Some(ort_lib_path.to_string());
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    pub fn with_input_size(mut self, n: u32) -> Self {
        self.input_size = n;
        self
    }

    pub fn with_input_layout(mut self, layout: TensorLayout) -> Self {
        self.input_layout = layout;
        self
    }

    pub fn with_num_detections(mut self, n: usize) -> Self {
        self.num_detections = n;
        self
    }

    pub fn with_boxes_normalized(mut self, x: bool) -> Self {
        self.boxes_normalized = x;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou_threshold = x;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_frame_skip(mut self, n: u32) -> Self {
        self.frame_skip = n;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(ConfigError::Invalid(format!(
                "conf_threshold must be within [0, 1], got {}", self.conf_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::Invalid(format!(
                "iou_threshold must be within [0, 1], got {}", self.iou_threshold
            )));
        }
        if self.input_size == 0 {
            return Err(ConfigError::Invalid("input_size must be non-zero".to_string()));
        }
        if self.num_detections == 0 {
            return Err(ConfigError::Invalid("num_detections must be non-zero".to_string()));
        }
        if self.num_threads == 0 {
            return Err(ConfigError::Invalid("num_threads must be non-zero".to_string()));
        }
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("label must not be empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model Path: {}\n\
        Inference Device: {}\n\
        Model Input: {}x{} ({:?})\n\
        Candidates: {}\n\
        Thresholds: conf > {} | iou > {}",
               self.model_path, self.device, self.input_size, self.input_size,
               self.input_layout, self.num_detections, self.conf_threshold, self.iou_threshold)
    }
}
