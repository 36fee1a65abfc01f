//! Outputs handed from one pipeline stage to the next.

use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataIngestionArtifact {
    pub trained_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTransformationArtifact {
    pub transformed_object_file_path: PathBuf,
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// Mean held-out accuracy over the K folds; `None` when the train split
    /// is too small to fold.
    pub cv_accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelTrainerArtifact {
    pub trained_model_file_path: PathBuf,
    pub metrics: ClassificationMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPusherArtifact {
    pub saved_model_path: PathBuf,
}
