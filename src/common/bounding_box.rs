use serde::{Deserialize, Serialize};

/// Axis-aligned box in normalized image coordinates.
///
/// All four edges are fractions of the image size, so `(0, 0, 1, 1)` covers the
/// whole frame regardless of its pixel resolution.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a box from center form and clamps every edge to `[0, 1]`.
    ///
    /// Edges are clamped independently after the conversion, so a box hanging
    /// off the frame is truncated to its visible part. A box lying entirely
    /// outside collapses to zero width or height.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    pub fn from_cxcywh_clamped(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        let half_w = w / 2.;
        let half_h = h / 2.;
        Self {
            left: (cx - half_w).clamp(0., 1.),
            top: (cy - half_h).clamp(0., 1.),
            right: (cx + half_w).clamp(0., 1.),
            bottom: (cy + half_h).clamp(0., 1.),
        }
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Returns the bounding box coordinates as `(left, top, right, bottom)`.
    pub fn ltrb(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &BoundingBox) -> f32 {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &BoundingBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Computes the intersection over union (IoU) between this bounding box and another.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        intersection_over_union(self, other)
    }

    /// Maps the normalized box onto an image of `width` x `height` pixels.
    ///
    /// # Returns
    ///
    /// The pixel coordinates as `(left, top, right, bottom)`.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32, f32, f32) {
        let (w, h) = (width as f32, height as f32);
        (self.left * w, self.top * h, self.right * w, self.bottom * h)
    }

    pub fn to_pixels_i32(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
        let (l, t, r, b) = self.to_pixels(width, height);
        (l.round() as i32, t.round() as i32, r.round() as i32, b.round() as i32)
    }
}

/// Intersection over union of two boxes.
///
/// Returns 0 when the union is empty, so degenerate boxes never produce NaN.
pub fn intersection_over_union(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let intersection = a.intersect(b);
    let union = a.area() + b.area() - intersection;
    if union > 0. {
        intersection / union
    } else {
        0.
    }
}
