//! Integration test: HTTP routes against stubbed pipelines.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use stroke_risk::artifacts::ClassificationMetrics;
use stroke_risk::predict_pipeline::{StrokePrediction, StrokePredictor};
use stroke_risk::records::HeartData;
use stroke_risk::server::{create_router, AppState, IndexTemplate, ServerConfig};
use stroke_risk::train_pipeline::{TrainRunner, TrainingSummary};
use stroke_risk::PipelineError;

struct OkTrainer;

#[async_trait]
impl TrainRunner for OkTrainer {
    async fn run_pipeline(&self) -> stroke_risk::Result<TrainingSummary> {
        Ok(TrainingSummary {
            run: "01_01_2024_00_00_00".to_string(),
            metrics: ClassificationMetrics {
                train_accuracy: 0.95,
                test_accuracy: 0.93,
                cv_accuracy: Some(0.92),
            },
            saved_model_path: PathBuf::from("saved_models/model.json"),
        })
    }
}

struct FailingTrainer;

#[async_trait]
impl TrainRunner for FailingTrainer {
    async fn run_pipeline(&self) -> stroke_risk::Result<TrainingSummary> {
        Err(PipelineError::validation("the data frame is empty and cannot be split"))
    }
}

struct FixedPredictor(i32);

impl StrokePredictor for FixedPredictor {
    fn predict(&self, _input: &HeartData) -> stroke_risk::Result<StrokePrediction> {
        Ok(StrokePrediction { label: self.0 })
    }
}

struct MissingModel;

impl StrokePredictor for MissingModel {
    fn predict(&self, _input: &HeartData) -> stroke_risk::Result<StrokePrediction> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "saved_models/model.json not found").into())
    }
}

fn test_app(trainer: Arc<dyn TrainRunner>, predictor: Arc<dyn StrokePredictor>) -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: None,
        template_dir: PathBuf::from("templates"),
    };
    let state = AppState::new(trainer, predictor, IndexTemplate::embedded());
    create_router(Arc::new(state), &config)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const WELL_FORMED: &str = "gender=Male&age=67&hypertension=0&heart_disease=1&ever_married=Yes\
&work_type=Private&Residence_type=Urban&avg_glucose_level=228.69\
&smoking_status=formerly+smoked&bmi=36.6";

#[tokio::test]
async fn test_index_renders_form() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(FixedPredictor(0)));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form"));
    assert!(html.contains("Rendering"));
}

#[tokio::test]
async fn test_train_success_message() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(FixedPredictor(0)));
    let response = app
        .oneshot(Request::builder().uri("/train").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Training successful !!");
}

#[tokio::test]
async fn test_train_failure_message() {
    let app = test_app(Arc::new(FailingTrainer), Arc::new(FixedPredictor(0)));
    let response = app
        .oneshot(Request::builder().uri("/train").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let text = body_text(response).await;
    assert!(text.starts_with("Error Occurred! "));
    assert!(text.contains("the data frame is empty and cannot be split"));
}

#[tokio::test]
async fn test_predict_renders_prediction() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(FixedPredictor(1)));
    let response = app.oneshot(form_request(WELL_FORMED)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("1 (Stroke risk detected)"));
}

#[tokio::test]
async fn test_predict_rejects_non_numeric_age() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(FixedPredictor(1)));
    let body = WELL_FORMED.replace("age=67", "age=sixty");
    let response = app.oneshot(form_request(&body)).await.unwrap();

    let payload: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(payload["status"], serde_json::json!(false));
    assert!(payload["error"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn test_predict_reports_missing_model() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(MissingModel));
    let response = app.oneshot(form_request(WELL_FORMED)).await.unwrap();

    let payload: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(payload["status"], serde_json::json!(false));
    assert!(payload["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_predict_without_form_body_returns_error_payload() {
    let app = test_app(Arc::new(OkTrainer), Arc::new(FixedPredictor(1)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let payload: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(payload["status"], serde_json::json!(false));
}
