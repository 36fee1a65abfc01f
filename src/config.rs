//! Per-run configuration for each pipeline stage.
//!
//! Every training run writes under `artifact/<timestamp>/`; the stage configs
//! are derived from that root so one run never overwrites another.

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::constants::*;

#[derive(Debug, Clone)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    pub artifact_dir: PathBuf,
    pub timestamp: String,
    pub schema_file_path: PathBuf,
    pub saved_model_dir: PathBuf,
}

impl TrainingPipelineConfig {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self::with_root(ARTIFACT_DIR, timestamp)
    }

    /// Config rooted at `root/<timestamp>` instead of the default artifact dir.
    pub fn with_root(root: impl AsRef<Path>, timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        Self {
            pipeline_name: PIPELINE_NAME.to_string(),
            artifact_dir: root.as_ref().join(&timestamp),
            timestamp,
            schema_file_path: env::var("SCHEMA_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(SCHEMA_FILE_PATH)),
            saved_model_dir: env::var("SAVED_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(SAVED_MODEL_DIR)),
        }
    }

    pub fn now() -> Self {
        Self::new(current_timestamp())
    }
}

pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone)]
pub struct DataIngestionConfig {
    pub data_ingestion_dir: PathBuf,
    pub feature_store_file_path: PathBuf,
    pub training_file_path: PathBuf,
    pub testing_file_path: PathBuf,
    pub train_test_split_ratio: f64,
    /// `None` shuffles from OS entropy, so splits differ between runs.
    pub split_seed: Option<u64>,
    pub collection_name: String,
}

impl DataIngestionConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let data_ingestion_dir = pipeline.artifact_dir.join(DATA_INGESTION_DIR_NAME);
        let ingested_dir = data_ingestion_dir.join(DATA_INGESTION_INGESTED_DIR);
        Self {
            feature_store_file_path: data_ingestion_dir
                .join(DATA_INGESTION_FEATURE_STORE_DIR)
                .join(FILE_NAME),
            training_file_path: ingested_dir.join(TRAIN_FILE_NAME),
            testing_file_path: ingested_dir.join(TEST_FILE_NAME),
            train_test_split_ratio: DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO,
            split_seed: Some(DATA_INGESTION_SPLIT_SEED),
            collection_name: COLLECTION_NAME.to_string(),
            data_ingestion_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataTransformationConfig {
    pub data_transformation_dir: PathBuf,
    pub transformed_train_file_path: PathBuf,
    pub transformed_test_file_path: PathBuf,
    pub transformed_object_file_path: PathBuf,
}

impl DataTransformationConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let dir = pipeline.artifact_dir.join(DATA_TRANSFORMATION_DIR_NAME);
        let data_dir = dir.join(DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR);
        Self {
            transformed_train_file_path: data_dir.join(TRANSFORMED_TRAIN_FILE_NAME),
            transformed_test_file_path: data_dir.join(TRANSFORMED_TEST_FILE_NAME),
            transformed_object_file_path: dir
                .join(DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR)
                .join(PREPROCESSING_OBJECT_FILE_NAME),
            data_transformation_dir: dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelTrainerConfig {
    pub model_trainer_dir: PathBuf,
    pub trained_model_file_path: PathBuf,
    pub expected_accuracy: f64,
    pub over_fitting_under_fitting_threshold: f64,
    pub n_neighbors: usize,
    pub cv_folds: usize,
}

impl ModelTrainerConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        let dir = pipeline.artifact_dir.join(MODEL_TRAINER_DIR_NAME);
        Self {
            trained_model_file_path: dir
                .join(MODEL_TRAINER_TRAINED_MODEL_DIR)
                .join(MODEL_FILE_NAME),
            expected_accuracy: MODEL_TRAINER_EXPECTED_ACCURACY,
            over_fitting_under_fitting_threshold:
                MODEL_TRAINER_OVER_FITTING_UNDER_FITTING_THRESHOLD,
            n_neighbors: MODEL_TRAINER_N_NEIGHBORS,
            cv_folds: MODEL_TRAINER_CV_FOLDS,
            model_trainer_dir: dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelPusherConfig {
    pub saved_model_path: PathBuf,
}

impl ModelPusherConfig {
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        Self {
            saved_model_path: pipeline.saved_model_dir.join(MODEL_FILE_NAME),
        }
    }
}
