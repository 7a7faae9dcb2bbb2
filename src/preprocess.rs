//! Turning a data-URI image into the normalized input tensor the classifier
//! was trained on. This must mirror the training-time transform exactly:
//! a divergence here degrades predictions without raising any error.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::RgbImage;
use tch::Tensor;

use crate::config::{PreprocessMode, IMG_HEIGHT, IMG_WIDTH};

// Channel-wise constants published for the EfficientNetV2 preprocessing,
// applied after scaling samples to [0, 1].
const MEAN_RGB: [f32; 3] = [0.485, 0.456, 0.406];
const STDDEV_RGB: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode a `data:<mime>;base64,<payload>` string and preprocess it into a
/// `(1, 224, 224, 3)` float tensor ready for inference.
pub fn decode_and_normalize(data_uri: &str, mode: PreprocessMode) -> Result<Tensor> {
    let image = decode_data_uri(data_uri)?;
    let samples = normalize(&image, mode);
    Ok(Tensor::from_slice(&samples).view([1, IMG_HEIGHT as i64, IMG_WIDTH as i64, 3]))
}

/// Everything after the first comma is the base64 payload; the scheme prefix
/// is discarded unchecked.
fn decode_data_uri(data_uri: &str) -> Result<RgbImage> {
    let (_, payload) = data_uri
        .split_once(',')
        .ok_or_else(|| anyhow!("missing comma separator in data URI"))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .context("invalid base64 image payload")?;

    let image = image::load_from_memory(&bytes).context("unsupported image encoding")?;

    // Force 3-channel color, then resize (not crop) to the model's input size
    Ok(image::imageops::resize(
        &image.to_rgb8(),
        IMG_WIDTH,
        IMG_HEIGHT,
        FilterType::Triangle,
    ))
}

/// Flatten to `f32` samples in row-major `(H, W, 3)` order, normalized per
/// the configured mode.
fn normalize(image: &RgbImage, mode: PreprocessMode) -> Vec<f32> {
    let mut samples = Vec::with_capacity((IMG_WIDTH * IMG_HEIGHT * 3) as usize);
    for pixel in image.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            let value = value as f32;
            samples.push(match mode {
                PreprocessMode::Efficientnet => {
                    (value / 255.0 - MEAN_RGB[channel]) / STDDEV_RGB[channel]
                }
                PreprocessMode::Rescale => value / 255.0,
            });
        }
    }
    samples
}
