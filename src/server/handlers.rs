use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use tracing::{error, info};

use super::error::ServerError;
use super::form::parse_heart_data;
use super::state::AppState;
use crate::predict_pipeline::StrokePrediction;

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index.render("Rendering"))
}

/// Runs the whole training pipeline inside the request.
pub async fn train(State(state): State<Arc<AppState>>) -> String {
    match state.trainer.run_pipeline().await {
        Ok(summary) => {
            info!(
                run = %summary.run,
                test_accuracy = summary.metrics.test_accuracy,
                model = %summary.saved_model_path.display(),
                "Training run succeeded"
            );
            "Training successful !!".to_string()
        }
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "Training run failed");
            format!("Error Occurred! {e}")
        }
    }
}

fn predict_from_form(
    state: &AppState,
    fields: &HashMap<String, String>,
) -> Result<StrokePrediction, ServerError> {
    let data = parse_heart_data(fields)?;
    Ok(state.predictor.predict(&data)?)
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let Form(fields) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return Json(json!({ "status": false, "error": rejection.body_text() }))
                .into_response()
        }
    };

    match predict_from_form(&state, &fields) {
        Ok(prediction) => Html(state.index.render(&prediction.to_string())).into_response(),
        Err(e) => e.into_response(),
    }
}
