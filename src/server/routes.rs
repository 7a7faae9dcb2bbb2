//! The user-facing JSON web server that listens for inference requests.
//! A single stateless pipeline per request: decode, infer, format.

use super::protocol::{format_predictions, PredictRequest, PredictResponse};
use super::{ApiError, AppState};
use crate::preprocess;
use actix_web::{post, web, Responder};
use tracing::debug;

type Result<T> = std::result::Result<T, ApiError>;

#[post("/predict")]
pub async fn predict(
    req: Option<web::Json<PredictRequest>>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let data_uri = req
        .and_then(|r| r.into_inner().photo_data_uri)
        .ok_or(ApiError::NoImageData)?;

    let input = preprocess::decode_and_normalize(&data_uri, state.settings.preprocess_mode)
        .map_err(ApiError::Preprocess)?;

    let model = state.model.as_ref().ok_or(ApiError::ModelNotLoaded)?;
    let output = model.predict(input).map_err(ApiError::Predict)?;

    let predictions = format_predictions(&output, &state.labels).map_err(ApiError::Format)?;

    debug!("served {} class predictions", predictions.len());
    Ok(web::Json(PredictResponse { predictions }))
}
