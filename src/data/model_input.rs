use ndarray::{Array4, ArrayView4};
use serde::{Deserialize, Serialize};

/// Memory layout of the image tensor fed to the model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, H, W, 3]`, as exported for TFLite.
    #[default] Nhwc,
    /// `[1, 3, H, W]`, as exported for ONNX.
    Nchw,
}

impl TensorLayout {
    pub fn shape(&self, size: usize) -> [usize; 4] {
        match self {
            TensorLayout::Nhwc => [1, size, size, 3],
            TensorLayout::Nchw => [1, 3, size, size],
        }
    }
}

/// Model input, a single normalized RGB image with values in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ModelInput {
    tensor: Array4<f32>,
    layout: TensorLayout,
}

impl ModelInput {
    pub fn new(tensor: Array4<f32>, layout: TensorLayout) -> Self {
        Self { tensor, layout }
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.tensor.view()
    }

    pub fn shape(&self) -> &[usize] {
        self.tensor.shape()
    }

    /// Side length of the square image.
    pub fn size(&self) -> usize {
        match self.layout {
            TensorLayout::Nhwc => self.tensor.shape()[1],
            TensorLayout::Nchw => self.tensor.shape()[2],
        }
    }

    /// Returns the `[r, g, b]` value at pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        match self.layout {
            TensorLayout::Nhwc => [
                self.tensor[[0, y, x, 0]],
                self.tensor[[0, y, x, 1]],
                self.tensor[[0, y, x, 2]],
            ],
            TensorLayout::Nchw => [
                self.tensor[[0, 0, y, x]],
                self.tensor[[0, 1, y, x]],
                self.tensor[[0, 2, y, x]],
            ],
        }
    }
}
