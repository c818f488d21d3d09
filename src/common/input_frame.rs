use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Immutable RGB snapshot of one camera frame.
///
/// The detector only borrows a frame for the duration of a call.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub image: RgbImage,
}

impl InputFrame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// A frame with no pixels, treated as "no image".
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

impl std::ops::Deref for InputFrame {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for InputFrame {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }
}

impl From<RgbImage> for InputFrame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

impl From<RgbaImage> for InputFrame {
    fn from(image: RgbaImage) -> Self {
        Self::new(DynamicImage::from(image).to_rgb8())
    }
}

impl From<GrayImage> for InputFrame {
    fn from(image: GrayImage) -> Self {
        Self::new(DynamicImage::from(image).to_rgb8())
    }
}
