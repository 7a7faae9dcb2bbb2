//! Wire types for the predict endpoint, and the mapping from the raw output
//! vector to labelled predictions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tch::Tensor;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// `data:<mime>;base64,<payload>` string holding the image to classify
    #[serde(rename = "photoDataUri")]
    pub photo_data_uri: Option<String>,
}

/// One class prediction, in the classifier's output-index order
#[derive(Debug, Serialize)]
pub struct Prediction {
    pub condition: String,
    pub probability: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
}

/// Pair each output index with its label. Indices past the label count are
/// dropped silently; surplus labels are unused. Output order is preserved,
/// never sorted by probability.
pub fn format_predictions(output: &Tensor, labels: &[String]) -> Result<Vec<Prediction>> {
    let size = output.size();
    if size.len() != 2 || size[0] != 1 {
        bail!("expected classifier output of shape (1, C), got {size:?}");
    }

    let classes = size[1] as usize;
    let predictions = labels
        .iter()
        .take(classes)
        .enumerate()
        .map(|(i, label)| Prediction {
            condition: label.clone(),
            probability: output.double_value(&[0, i as i64]),
        })
        .collect();

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of(values: &[f32]) -> Tensor {
        Tensor::from_slice(values).view([1, values.len() as i64])
    }

    fn labelled(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn truncates_to_label_count() {
        let output = output_of(&[0.1, 0.2, 0.3, 0.25, 0.15]);
        let predictions = format_predictions(&output, &labelled(&["a", "b", "c"])).unwrap();
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[2].condition, "c");
    }

    #[test]
    fn surplus_labels_are_unused() {
        let output = output_of(&[0.6, 0.4]);
        let predictions =
            format_predictions(&output, &labelled(&["a", "b", "c", "d", "e"])).unwrap();
        assert_eq!(predictions.len(), 2);
    }

    #[test]
    fn empty_label_list_yields_no_predictions() {
        let output = output_of(&[0.5, 0.3, 0.2]);
        let predictions = format_predictions(&output, &[]).unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn preserves_output_index_order() {
        let output = output_of(&[0.1, 0.7, 0.2]);
        let predictions = format_predictions(&output, &labelled(&["a", "b", "c"])).unwrap();
        let conditions: Vec<_> = predictions.iter().map(|p| p.condition.as_str()).collect();
        assert_eq!(conditions, vec!["a", "b", "c"]);
        assert!((predictions[1].probability - 0.7).abs() < 1e-6);
    }

    #[test]
    fn rejects_output_without_batch_dimension() {
        let output = Tensor::from_slice(&[0.5f32, 0.5]).view([2]);
        assert!(format_predictions(&output, &labelled(&["a", "b"])).is_err());
    }

    #[test]
    fn rejects_multi_batch_output() {
        let output = Tensor::from_slice(&[0.5f32, 0.5, 0.1, 0.9]).view([2, 2]);
        assert!(format_predictions(&output, &labelled(&["a", "b"])).is_err());
    }
}
