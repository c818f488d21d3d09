extern crate pothole_detect;

use std::io::Write;
use image::{Rgb, RgbImage};
use pothole_detect::common::{DetectorConfig, InferenceDevice, InferenceError, InputFrame, ModelLoadError};
use pothole_detect::data::RawDetections;
use pothole_detect::detection_runners::{StubEngine, StubResponse};
use pothole_detect::Detector;

fn frame() -> InputFrame {
    InputFrame::from(RgbImage::from_pixel(320, 240, Rgb([20, 20, 20])))
}

fn one_pothole() -> RawDetections {
    RawDetections::from_candidates(&[[0.5, 0.5, 0.2, 0.2, 0.9]])
}

fn small_config() -> DetectorConfig {
    DetectorConfig::default().with_num_detections(1)
}

#[tokio::test]
async fn empty_frame_skips_inference() {
    let mut detector = Detector::with_engine(StubEngine::new(one_pothole()), small_config()).unwrap();

    assert!(detector.detect(&InputFrame::default()).is_empty());
    assert!(detector.detect(&InputFrame::new(RgbImage::new(0, 10))).is_empty());
    assert_eq!(detector.engine().calls(), 0);
}

#[tokio::test]
async fn inference_failure_degrades_to_no_detections() {
    let _ = env_logger::builder().is_test(true).try_init();

    let engine = StubEngine::scripted(vec![
        StubResponse::Failure("delegate crashed".to_string()),
        StubResponse::Detections(one_pothole()),
    ]);
    let mut detector = Detector::with_engine(engine, small_config()).unwrap();

    assert!(detector.detect(&frame()).is_empty());
    // the next frame is unaffected
    assert_eq!(detector.detect(&frame()).len(), 1);
}

#[tokio::test]
async fn checked_detection_reports_the_failure() {
    let mut detector = Detector::with_engine(StubEngine::failing("out of memory"), small_config()).unwrap();

    match detector.detect_checked(&frame()) {
        Err(InferenceError::Engine(err)) => assert!(err.to_string().contains("out of memory")),
        other => panic!("expected an engine error, got {:?}", other),
    }
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "expected [5, 8400]")]
fn wrong_candidate_count_fails_loudly() {
    let config = DetectorConfig::default().with_num_detections(8400);
    let mut detector = Detector::with_engine(StubEngine::new(one_pothole()), config).unwrap();

    detector.detect(&frame());
}

#[cfg(not(debug_assertions))]
#[tokio::test]
async fn wrong_candidate_count_is_rejected() {
    let config = DetectorConfig::default().with_num_detections(8400);
    let mut detector = Detector::with_engine(StubEngine::new(one_pothole()), config).unwrap();

    match detector.detect_checked(&frame()) {
        Err(InferenceError::OutputShape { expected, got }) => {
            assert_eq!(expected, 8400);
            assert_eq!(got, vec![5, 1]);
        }
        other => panic!("expected a shape error, got {:?}", other),
    }
    assert!(detector.detect(&frame()).is_empty());
}

#[tokio::test]
async fn clear_road_yields_nothing() {
    let raw = RawDetections::from_candidates(&[
        [0.5, 0.5, 0.2, 0.2, 0.1],
        [0.3, 0.3, 0.1, 0.1, 0.59],
    ]);
    let config = DetectorConfig::default().with_num_detections(2);
    let mut detector = Detector::with_engine(StubEngine::new(raw), config).unwrap();

    assert!(detector.detect_checked(&frame()).unwrap().is_empty());
}

#[test]
fn missing_model_fails_construction() {
    let config = DetectorConfig::new().with_model("/definitely/not/here.onnx");
    match pothole_detect::init_detector(config) {
        Err(ModelLoadError::NotFound(path)) => assert_eq!(path, "/definitely/not/here.onnx"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn invalid_config_fails_construction() {
    let config = small_config().with_iou(1.5);
    let result = Detector::with_engine(StubEngine::new(one_pothole()), config);
    assert!(matches!(result, Err(ModelLoadError::Config(_))));
}

#[test]
fn config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "model_path": "models/pothole.onnx",
            "device": {{ "kind": "cuda", "id": 1 }},
            "input_layout": "nchw",
            "conf_threshold": 0.5,
            "boxes_normalized": false
        }}"#
    )
    .unwrap();

    let config = DetectorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.model_path, "models/pothole.onnx");
    assert_eq!(config.device, InferenceDevice::CUDA(1));
    assert_eq!(config.conf_threshold, 0.5);
    assert_eq!(config.iou_threshold, 0.4);
    assert!(!config.boxes_normalized);

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    write!(bad, r#"{{ "conf_threshold": 2.0 }}"#).unwrap();
    assert!(DetectorConfig::from_json_file(bad.path()).is_err());
}
