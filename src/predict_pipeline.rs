//! Scoring a single submitted patient against the saved model.

use std::env;
use std::fmt;
use std::path::PathBuf;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::constants::{MODEL_FILE_NAME, SAVED_MODEL_DIR};
use crate::error::{PipelineError, Result, ResultExt};
use crate::records::HeartData;
use crate::trainer::StrokeModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrokePrediction {
    pub label: i32,
}

impl StrokePrediction {
    pub fn at_risk(&self) -> bool {
        self.label == 1
    }

    pub fn description(&self) -> &'static str {
        if self.at_risk() {
            "Stroke risk detected"
        } else {
            "No stroke risk detected"
        }
    }
}

impl fmt::Display for StrokePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.description())
    }
}

/// Something that can turn one set of submitted features into a prediction.
pub trait StrokePredictor: Send + Sync {
    fn predict(&self, input: &HeartData) -> Result<StrokePrediction>;
}

/// Loads the saved model on every call so a fresh training run is picked up
/// without a restart.
pub struct HeartStrokeClassifier {
    model_path: PathBuf,
}

impl HeartStrokeClassifier {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }

    pub fn from_env() -> Self {
        let dir = env::var("SAVED_MODEL_DIR").unwrap_or_else(|_| SAVED_MODEL_DIR.to_string());
        Self::new(PathBuf::from(dir).join(MODEL_FILE_NAME))
    }

    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<i32>> {
        let model = StrokeModel::load(&self.model_path)?;
        model.predict(df)
    }
}

impl StrokePredictor for HeartStrokeClassifier {
    fn predict(&self, input: &HeartData) -> Result<StrokePrediction> {
        let run = || -> Result<StrokePrediction> {
            let df = input.to_data_frame()?;
            let label = self
                .predict_frame(&df)?
                .first()
                .copied()
                .ok_or_else(|| PipelineError::model("classifier returned no prediction"))?;
            Ok(StrokePrediction { label })
        };
        let prediction = run().context("HeartStrokeClassifier::predict")?;
        info!(label = prediction.label, "Scored submission");
        Ok(prediction)
    }
}
