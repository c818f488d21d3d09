use std::time::Instant;
use image::RgbImage;
use crate::common::{Detection, DetectorConfig, InferenceError, InputFrame, ModelLoadError};
use crate::data::{ModelInput, RawDetections, TimeCalc};
use crate::detection_processing::{decode_with_label, suppress};
use crate::detection_runners::{image_ops, InferenceEngine, OrtEngine};
use crate::utils;

/// Frame-in, boxes-out pipeline around one inference engine.
///
/// Thresholds and the model contract are fixed at construction. The detector
/// keeps nothing between frames apart from timing statistics.
#[derive(Debug)]
pub struct Detector<E: InferenceEngine = OrtEngine> {
    engine: E,
    config: DetectorConfig,
    timings: TimeCalc,
}

impl Detector<OrtEngine> {
    /// Loads the ONNX model named by `config`.
    pub fn from_config(config: DetectorConfig) -> Result<Self, ModelLoadError> {
        config.validate()?;
        let engine = OrtEngine::load(&config)?;
        Ok(Self::assemble(engine, config))
    }
}

impl<E: InferenceEngine> Detector<E> {
    pub fn with_engine(engine: E, config: DetectorConfig) -> Result<Self, ModelLoadError> {
        config.validate()?;
        Ok(Self::assemble(engine, config))
    }

    fn assemble(engine: E, config: DetectorConfig) -> Self {
        log::info!("Detector ready on `{}` engine\n{}", engine.name(), config);
        Self {
            engine,
            config,
            timings: TimeCalc::default(),
        }
    }

    /// Runs one inference on a blank frame so the first real frame is not slow.
    pub fn warm_up(&mut self) -> Result<(), InferenceError> {
        let size = self.config.input_size;
        let blank = image_ops::preprocess(&RgbImage::new(size, size), size, self.config.input_layout)?;
        self.engine.warm_up(&blank)
    }

    /// Detects potholes in `frame`.
    ///
    /// Never fails: an empty frame or an engine failure both yield no
    /// detections. Failures are logged at `error` level; use
    /// [`Detector::detect_checked`] to observe them directly.
    ///
    /// # Panics
    ///
    /// In debug builds, when the engine output does not have the configured
    /// `[5, num_detections]` shape.
    pub fn detect(&mut self, frame: &InputFrame) -> Vec<Detection> {
        match self.detect_checked(frame) {
            Ok(detections) => detections,
            Err(err) => {
                log::error!("Inference error: {}", err);
                vec![]
            }
        }
    }

    /// Like [`Detector::detect`] but hands inference failures to the caller.
    pub fn detect_checked(&mut self, frame: &InputFrame) -> Result<Vec<Detection>, InferenceError> {
        if frame.is_empty() {
            log::debug!("Empty frame, skipping detection");
            return Ok(vec![]);
        }

        let detect_time = Instant::now();
        let mut elapsed = detect_time.elapsed();

        let input = self.preprocess(frame)?;
        let mark = utils::trace("Preprocess", detect_time, elapsed);
        self.timings.add(TimeCalc::PREPROCESS, mark - elapsed);
        elapsed = mark;

        let raw = self.inference(&input)?;
        let mark = utils::trace("Inference", detect_time, elapsed);
        self.timings.add(TimeCalc::INFERENCE, mark - elapsed);
        elapsed = mark;

        let detections = self.postprocess(raw);
        let mark = utils::trace("Postprocess", detect_time, elapsed);
        self.timings.add(TimeCalc::POSTPROCESS, mark - elapsed);
        self.timings.finish_run();

        log::debug!(
            "Detection took {}ms, found {} potholes",
            detect_time.elapsed().as_millis(),
            detections.len()
        );
        Ok(detections)
    }

    /// Resizes and normalizes the frame to the model input.
    pub fn preprocess(&self, frame: &InputFrame) -> Result<ModelInput, InferenceError> {
        image_ops::preprocess(frame, self.config.input_size, self.config.input_layout)
    }

    /// Runs the engine and checks its output against the configured candidate count.
    ///
    /// A shape mismatch is a broken model contract: it panics in debug builds
    /// and is returned as an error otherwise.
    pub fn inference(&mut self, input: &ModelInput) -> Result<RawDetections, InferenceError> {
        let raw = match self.engine.infer(input) {
            Err(err @ (InferenceError::OutputShape { .. } | InferenceError::UnsupportedShape(_))) => {
                return Err(shape_violation(err));
            }
            result => result?,
        };
        if raw.num_candidates() != self.config.num_detections {
            return Err(shape_violation(InferenceError::OutputShape {
                expected: self.config.num_detections,
                got: raw.view().shape().to_vec(),
            }));
        }

        if self.config.boxes_normalized {
            Ok(raw)
        } else {
            Ok(raw.normalize_boxes(self.config.input_size))
        }
    }

    /// Decodes the raw tensor and applies NMS.
    pub fn postprocess(&self, raw: RawDetections) -> Vec<Detection> {
        let candidates = decode_with_label(&raw, self.config.conf_threshold, &self.config.label);
        log::trace!("{} candidates above confidence {}", candidates.len(), self.config.conf_threshold);
        suppress(&candidates, self.config.iou_threshold)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn timings(&self) -> &TimeCalc {
        &self.timings
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Consumes the detector, releasing the engine exactly once.
    pub fn release(self) {
        log::info!("Releasing `{}` engine", self.engine.name());
    }
}

fn shape_violation(err: InferenceError) -> InferenceError {
    if cfg!(debug_assertions) {
        panic!("model output violates the detector contract: {}", err);
    }
    err
}
