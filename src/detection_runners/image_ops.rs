//! Turns a camera frame into the model's fixed-size input tensor.

use fast_image_resize::{
    images::{Image as FirImage, ImageRef},
    pixels::PixelType,
    ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array4;
use crate::common::InferenceError;
use crate::data::{ModelInput, TensorLayout};

/// Stretches `image` to `size` x `size` (aspect ratio is not kept) and maps
/// every channel to `value / 255`.
pub fn preprocess(image: &RgbImage, size: u32, layout: TensorLayout) -> Result<ModelInput, InferenceError> {
    let resized = resize_exact(image, size)?;
    let tensor = normalize(resized.buffer(), size as usize, layout)?;
    Ok(ModelInput::new(tensor, layout))
}

fn resize_exact<'a>(image: &RgbImage, size: u32) -> Result<FirImage<'a>, InferenceError> {
    let src = ImageRef::new(image.width(), image.height(), image.as_raw(), PixelType::U8x3)
        .map_err(|e| InferenceError::Preprocess(e.to_string()))?;

    let mut dst = FirImage::new(size, size, PixelType::U8x3);
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| InferenceError::Preprocess(e.to_string()))?;
    Ok(dst)
}

fn normalize(buf: &[u8], size: usize, layout: TensorLayout) -> Result<Array4<f32>, InferenceError> {
    let hw = size * size;
    if buf.len() != hw * 3 {
        return Err(InferenceError::Preprocess(format!(
            "unexpected buffer size: got {}, expected {}", buf.len(), hw * 3
        )));
    }

    let mut out = Array4::<f32>::zeros(layout.shape(size));
    for (i, rgb) in buf.chunks_exact(3).enumerate() {
        let (y, x) = (i / size, i % size);
        for (c, &v) in rgb.iter().enumerate() {
            let value = v as f32 / 255.0;
            match layout {
                TensorLayout::Nhwc => out[[0, y, x, c]] = value,
                TensorLayout::Nchw => out[[0, c, y, x]] = value,
            }
        }
    }
    Ok(out)
}
