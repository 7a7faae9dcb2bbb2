use crate::config::Settings;
use crate::torch::TorchModel;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use tracing::error;

pub mod protocol;
pub mod routes;

/// Shared per-process state. The model is `None` when loading failed at
/// startup; the server still runs and every inference request is refused.
pub struct AppState {
    pub model: Option<TorchModel>,
    pub labels: Vec<String>,
    pub settings: Settings,
}

/// Request-pipeline failures, one variant per stage. Each maps to a fixed
/// status/message pair; underlying causes are logged server-side and never
/// serialized into the response.
#[derive(Debug)]
pub enum ApiError {
    NoImageData,
    ModelNotLoaded,
    Preprocess(anyhow::Error),
    Predict(anyhow::Error),
    Format(anyhow::Error),
    Internal(anyhow::Error),
}

impl ApiError {
    fn message(&self) -> &'static str {
        match self {
            ApiError::NoImageData => "No image data provided.",
            ApiError::ModelNotLoaded => "Model is not loaded.",
            ApiError::Preprocess(_) => "Preprocess failed",
            ApiError::Predict(_) => "Model predict failed",
            ApiError::Format(_) => "Format predictions failed",
            ApiError::Internal(_) => "Failed to process image.",
        }
    }

    fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            ApiError::NoImageData | ApiError::ModelNotLoaded => None,
            ApiError::Preprocess(err)
            | ApiError::Predict(err)
            | ApiError::Format(err)
            | ApiError::Internal(err) => Some(err),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        if let Some(cause) = self.cause() {
            error!("{}: {cause:#}", self.message());
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.message() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoImageData => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> ApiError {
        ApiError::Internal(err)
    }
}
