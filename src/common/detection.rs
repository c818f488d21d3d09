use serde::{Deserialize, Serialize};
use crate::common::BoundingBox;

/// Label emitted for every detection of the single-class pothole model.
pub const POTHOLE_LABEL: &str = "Pothole";

/// One detected object. Immutable once built.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Detection {
    bbox: BoundingBox,
    confidence: f32,
    label: String,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32, label: &str) -> Self {
        Self {
            bbox,
            confidence,
            label: label.to_string(),
        }
    }

    pub fn pothole(bbox: BoundingBox, confidence: f32) -> Self {
        Self::new(bbox, confidence, POTHOLE_LABEL)
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Computes the intersection over union (IoU) between this detection and another.
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Overlay caption such as `Pothole 87%`.
    pub fn caption(&self) -> String {
        format!("{} {:.0}%", self.label, self.confidence * 100.)
    }
}

/// One-line status text for a frame's result.
pub fn summary(detections: &[Detection], elapsed_ms: u128) -> String {
    match detections.len() {
        0 => format!("Road clear ({}ms)", elapsed_ms),
        1 => format!("1 pothole detected ({}ms)", elapsed_ms),
        n => format!("{} potholes detected ({}ms)", n, elapsed_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_rounds_percentage() {
        let d = Detection::pothole(BoundingBox::new(0., 0., 0.5, 0.5), 0.874);
        assert_eq!(d.caption(), "Pothole 87%");
        assert_eq!(d.label(), POTHOLE_LABEL);
    }

    #[test]
    fn summary_text() {
        let d = Detection::pothole(BoundingBox::new(0., 0., 0.5, 0.5), 0.9);
        assert_eq!(summary(&[], 12), "Road clear (12ms)");
        assert_eq!(summary(&[d.clone()], 7), "1 pothole detected (7ms)");
        assert_eq!(summary(&[d.clone(), d], 30), "2 potholes detected (30ms)");
    }
}
