extern crate pothole_detect;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use pothole_detect::common::{intersection_over_union, BoundingBox, DetectorConfig, InputFrame, NUM_DETECTIONS};
use pothole_detect::data::{RawDetections, TensorLayout, CANDIDATE_FIELDS};
use pothole_detect::detection_processing::{decode, suppress};
use pothole_detect::detection_runners::StubEngine;
use pothole_detect::Detector;

/// Full-size raw tensor with the given `(slot, [cx, cy, w, h, conf])` entries set.
fn raw_with(candidates: &[(usize, [f32; CANDIDATE_FIELDS])]) -> RawDetections {
    let mut values = vec![0f32; CANDIDATE_FIELDS * NUM_DETECTIONS];
    for (slot, candidate) in candidates {
        for (field, value) in candidate.iter().enumerate() {
            values[field * NUM_DETECTIONS + slot] = *value;
        }
    }
    RawDetections::from_shape_vec(NUM_DETECTIONS, values).unwrap()
}

fn road_frame() -> InputFrame {
    InputFrame::from(RgbImage::from_pixel(1280, 720, Rgb([90, 90, 90])))
}

#[tokio::test]
async fn overlapping_candidates_collapse_to_best() {
    let _ = env_logger::builder().is_test(true).try_init();

    let raw = raw_with(&[
        (10, [0.50, 0.50, 0.2, 0.2, 0.80]),
        (4000, [0.52, 0.50, 0.2, 0.2, 0.65]),
        (8399, [0.50, 0.52, 0.2, 0.2, 0.95]),
    ]);
    let mut detector = Detector::with_engine(StubEngine::new(raw), DetectorConfig::default()).unwrap();

    let result = detector.detect(&road_frame());

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].confidence(), 0.95);
    assert_eq!(result[0].label(), "Pothole");
    let (l, t, r, b) = result[0].bbox().ltrb();
    assert!((l - 0.40).abs() < 1e-6 && (t - 0.42).abs() < 1e-6);
    assert!((r - 0.60).abs() < 1e-6 && (b - 0.62).abs() < 1e-6);
}

#[tokio::test]
async fn separate_potholes_are_all_reported() {
    let raw = raw_with(&[
        (0, [0.2, 0.8, 0.1, 0.1, 0.7]),
        (1, [0.8, 0.8, 0.1, 0.1, 0.9]),
        (2, [0.5, 0.2, 0.1, 0.1, 0.6]), // at threshold
        (3, [0.5, 0.5, 0.1, 0.1, 0.3]),
    ]);
    let mut detector = Detector::with_engine(StubEngine::new(raw), DetectorConfig::default()).unwrap();

    let confidences: Vec<f32> = detector.detect(&road_frame()).iter().map(|d| d.confidence()).collect();
    assert_eq!(confidences, vec![0.9, 0.7]);
}

#[tokio::test]
async fn engine_receives_fixed_size_input() {
    let config = DetectorConfig::default().with_input_layout(TensorLayout::Nchw);
    let mut detector = Detector::with_engine(StubEngine::new(raw_with(&[])), config).unwrap();

    assert!(detector.detect(&road_frame()).is_empty());
    assert_eq!(detector.engine().calls(), 1);
    assert_eq!(detector.engine().last_input_shape(), Some(&[1, 3, 640, 640][..]));
    assert_eq!(detector.timings().runs(), 1);
}

#[tokio::test]
async fn pixel_unit_models_are_normalized() {
    let raw = RawDetections::from_candidates(&[[320., 320., 64., 128., 0.9]]);
    let config = DetectorConfig::default()
        .with_num_detections(1)
        .with_boxes_normalized(false);
    let mut detector = Detector::with_engine(StubEngine::new(raw), config).unwrap();

    let result = detector.detect(&road_frame());
    assert_eq!(result.len(), 1);
    let (l, t, r, b) = result[0].bbox().ltrb();
    assert!((l - 0.45).abs() < 1e-6 && (r - 0.55).abs() < 1e-6);
    assert!((t - 0.40).abs() < 1e-6 && (b - 0.60).abs() < 1e-6);
}

#[tokio::test]
async fn thresholds_come_from_config() {
    let raw = RawDetections::from_candidates(&[
        [0.50, 0.5, 0.2, 0.2, 0.55],
        [0.56, 0.5, 0.2, 0.2, 0.52],
    ]);
    // IoU of the two boxes is 0.14 / 0.26, about 0.54.
    let config = DetectorConfig::default()
        .with_num_detections(2)
        .with_conf(0.5)
        .with_iou(0.6)
        .with_label("Crack");
    let mut detector = Detector::with_engine(StubEngine::new(raw), config).unwrap();

    let result = detector.detect(&road_frame());
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|d| d.label() == "Crack"));
}

#[test]
fn iou_properties_on_random_boxes() {
    let mut rng = StdRng::seed_from_u64(0x9071);
    for _ in 0..1000 {
        let a = random_box(&mut rng);
        let b = random_box(&mut rng);

        let ab = intersection_over_union(&a, &b);
        let ba = intersection_over_union(&b, &a);
        assert_eq!(ab, ba);
        assert!((0.0..=1.0).contains(&ab), "iou out of range: {}", ab);

        if a.area() > 0. {
            assert!((intersection_over_union(&a, &a) - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn pipeline_invariants_on_random_tensors() {
    let mut rng = StdRng::seed_from_u64(42);
    let (conf_threshold, iou_threshold) = (0.6, 0.4);

    for _ in 0..20 {
        let candidates: Vec<[f32; 5]> = (0..300)
            .map(|_| {
                [
                    rng.gen_range(-0.1..1.1),
                    rng.gen_range(-0.1..1.1),
                    rng.gen_range(0.0..0.5),
                    rng.gen_range(0.0..0.5),
                    rng.gen_range(0.0..1.0),
                ]
            })
            .collect();
        let raw = RawDetections::from_candidates(&candidates);

        let decoded = decode(&raw, conf_threshold);
        let kept = suppress(&decoded, iou_threshold);

        assert!(kept.len() <= decoded.len());
        assert!(decoded.len() <= candidates.len());
        assert!(kept.iter().all(|d| d.confidence() > conf_threshold));
        assert!(kept.windows(2).all(|w| w[0].confidence() >= w[1].confidence()));
        for (i, a) in kept.iter().enumerate() {
            let (l, t, r, b) = a.bbox().ltrb();
            assert!((0.0..=1.0).contains(&l) && (0.0..=1.0).contains(&r) && l <= r);
            assert!((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&b) && t <= b);
            for other in &kept[i + 1..] {
                assert!(a.iou(other) <= iou_threshold);
            }
        }

        assert_eq!(kept, suppress(&decoded, iou_threshold));
    }
}

fn random_box(rng: &mut StdRng) -> BoundingBox {
    let (x1, x2) = (rng.gen_range(0.0..1.0f32), rng.gen_range(0.0..1.0f32));
    let (y1, y2) = (rng.gen_range(0.0..1.0f32), rng.gen_range(0.0..1.0f32));
    BoundingBox::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}
