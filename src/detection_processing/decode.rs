use rayon::prelude::*;
use crate::common::{BoundingBox, Detection, POTHOLE_LABEL};
use crate::data::RawDetections;

/// Turns the raw tensor into pothole detections above `conf_threshold`.
pub fn decode(raw: &RawDetections, conf_threshold: f32) -> Vec<Detection> {
    decode_with_label(raw, conf_threshold, POTHOLE_LABEL)
}

/// Turns every candidate slot scoring strictly above `conf_threshold` into a detection.
///
/// Boxes are converted from center form and clamped to the frame; a box is
/// never dropped for lying off-frame. Output keeps slot order.
pub fn decode_with_label(raw: &RawDetections, conf_threshold: f32, label: &str) -> Vec<Detection> {
    (0..raw.num_candidates())
        .into_par_iter()
        .filter_map(|i| {
            let [cx, cy, w, h, conf] = raw.candidate(i);

            // NaN scores fail this test too
            if !(conf > conf_threshold) {
                return None;
            }

            let bbox = BoundingBox::from_cxcywh_clamped(cx, cy, w, h);
            Some(Detection::new(bbox, conf, label))
        })
        .collect()
}
