//! Failures of the prediction route, rendered as `{status: false, error}`.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::form::FormError;
use crate::error::PipelineError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    Form(#[from] FormError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Form(e) => tracing::info!(error = %e, "Rejected prediction form"),
            ServerError::Pipeline(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Prediction failed")
            }
        }

        Json(json!({
            "status": false,
            "error": self.to_string(),
        }))
        .into_response()
    }
}
