//! Process configuration -- environment variables with built-in defaults,
//! plus the class-label list the classifier's output indices map to

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use tracing::{info, warn};

/// Width the classifier expects its input resized to
pub const IMG_WIDTH: u32 = 224;

/// Height the classifier expects its input resized to
pub const IMG_HEIGHT: u32 = 224;

/// Labels used when no label file is configured or the configured one is
/// unusable. Index-aligned to the classifier's output vector.
pub static DEFAULT_LABELS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Acne",
        "Eczema",
        "Psoriasis",
        "Rosacea",
        "Vitiligo",
        "Melanoma",
        "Healthy",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// The pixel normalization applied before inference. Must match whatever
/// transform was used at training time -- a mismatch degrades accuracy
/// silently instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessMode {
    /// Channel-wise standardization published for the EfficientNetV2 family
    Efficientnet,

    /// Plain division by 255
    Rescale,
}

/// Settings read once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path to the TorchScript classifier artifact
    pub model_path: String,

    /// Optional path to a JSON array of class-label strings
    pub labels_path: Option<String>,

    pub preprocess_mode: PreprocessMode,

    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Load settings from environment variables (`MODEL_PATH`, `LABELS_PATH`,
    /// `PREPROCESS_MODE`, `HOST`, `PORT`), falling back to defaults
    pub fn from_env() -> Result<Self> {
        config::Config::builder()
            .set_default("model_path", "skin_condition_model.pt")?
            .set_default("preprocess_mode", "efficientnet")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5001)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
            .context("invalid configuration")
    }
}

/// Load the label list from `path`. Any read or parse failure falls back to
/// [`DEFAULT_LABELS`] -- a bad label file degrades labelling, it never stops
/// the server.
pub fn load_labels(path: Option<&str>) -> Vec<String> {
    let Some(path) = path else {
        return DEFAULT_LABELS.clone();
    };

    match read_labels(path) {
        Ok(labels) => {
            info!("loaded {} class labels from {path}", labels.len());
            labels
        }
        Err(err) => {
            warn!("falling back to built-in labels: {err:#}");
            DEFAULT_LABELS.clone()
        }
    }
}

fn read_labels(path: &str) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let labels = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    Ok(labels)
}
