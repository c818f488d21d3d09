use crate::common::Detection;

/// Anything greedy NMS can rank and compare.
pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

impl Nms for Detection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        Detection::iou(self, other)
    }

    /// Returns the confidence score of the detection.
    fn confidence(&self) -> f32 {
        Detection::confidence(self)
    }
}

/// Greedy NMS returning the surviving input indices, highest confidence first.
///
/// Ranking is a stable sort of an index permutation, so equal confidences keep
/// their input order and the result is the same on every run. A candidate is
/// suppressed when its IoU with a kept box is strictly above `iou_threshold`.
pub fn nms_indices<T: Nms>(items: &[T], iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].confidence().total_cmp(&items[a].confidence()));

    let mut suppressed = vec![false; order.len()];
    let mut keep = Vec::new();

    for (rank, &current) in order.iter().enumerate() {
        if suppressed[rank] {
            continue;
        }
        keep.push(current);

        for (later, &candidate) in order.iter().enumerate().skip(rank + 1) {
            if !suppressed[later] && items[current].iou(&items[candidate]) > iou_threshold {
                suppressed[later] = true;
            }
        }
    }

    keep
}

/// Greedy NMS over `items`, leaving the input untouched.
pub fn suppress<T: Nms + Clone>(items: &[T], iou_threshold: f32) -> Vec<T> {
    nms_indices(items, iou_threshold)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}
