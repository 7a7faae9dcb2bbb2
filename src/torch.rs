//! Loading and running the trained classifier

use anyhow::Result;
use tch::{no_grad, CModule, Tensor};

/// The classifier artifact: a TorchScript module loaded once at startup and
/// shared read-only for the lifetime of the process.
#[derive(Debug)]
pub struct TorchModel {
    model: CModule,
}

impl TorchModel {
    pub fn new(path: &str) -> Result<Self> {
        Ok(TorchModel {
            model: CModule::load(path)?,
        })
    }

    /// Run the classifier on a preprocessed input batch. Returns the raw
    /// output tensor; the final probability activation is part of the
    /// artifact, so no softmax is applied here.
    pub fn predict(&self, input: Tensor) -> Result<Tensor> {
        let output = no_grad(|| self.model.forward_ts(&[input]))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreprocessMode, DEFAULT_LABELS};
    use crate::preprocess;
    use crate::server::protocol::format_predictions;
    use base64::{engine::general_purpose, Engine as _};
    use image::{ImageBuffer, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    #[ignore = "needs a TorchScript artifact; point MODEL_PATH at one"]
    fn probabilities_sum_to_one() {
        let path =
            std::env::var("MODEL_PATH").unwrap_or_else(|_| "skin_condition_model.pt".into());
        let model = TorchModel::new(&path).unwrap();

        let image: RgbImage = ImageBuffer::from_pixel(300, 300, Rgb([128, 128, 128]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        let uri = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&bytes)
        );

        let input = preprocess::decode_and_normalize(&uri, PreprocessMode::Efficientnet).unwrap();
        let output = model.predict(input).unwrap();
        let predictions = format_predictions(&output, &DEFAULT_LABELS).unwrap();

        let total: f64 = predictions.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-3, "probabilities sum to {total}");
    }
}
