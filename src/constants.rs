//! Fixed names and default locations shared by the pipeline stages.

pub static DATABASE_NAME: &str = "stroke_risk";
pub static COLLECTION_NAME: &str = "stroke_data";
pub static MONGODB_URL_KEY: &str = "MONGODB_URL";

pub static PIPELINE_NAME: &str = "stroke_risk";
pub static ARTIFACT_DIR: &str = "artifact";
pub static SCHEMA_FILE_PATH: &str = "config/schema.yaml";

pub static FILE_NAME: &str = "stroke.csv";
pub static TRAIN_FILE_NAME: &str = "train.csv";
pub static TEST_FILE_NAME: &str = "test.csv";
pub static MODEL_FILE_NAME: &str = "model.json";
pub static TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

pub static DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub static DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub static DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub static DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO: f64 = 0.2;
pub static DATA_INGESTION_SPLIT_SEED: u64 = 42;

pub static DATA_TRANSFORMATION_DIR_NAME: &str = "data_transformation";
pub static DATA_TRANSFORMATION_TRANSFORMED_DATA_DIR: &str = "transformed";
pub static DATA_TRANSFORMATION_TRANSFORMED_OBJECT_DIR: &str = "transformed_object";
pub static PREPROCESSING_OBJECT_FILE_NAME: &str = "preprocessing.json";
pub static TRANSFORMED_TRAIN_FILE_NAME: &str = "train.parquet";
pub static TRANSFORMED_TEST_FILE_NAME: &str = "test.parquet";

pub static MODEL_TRAINER_DIR_NAME: &str = "model_trainer";
pub static MODEL_TRAINER_TRAINED_MODEL_DIR: &str = "trained_model";
pub static MODEL_TRAINER_EXPECTED_ACCURACY: f64 = 0.6;
pub static MODEL_TRAINER_OVER_FITTING_UNDER_FITTING_THRESHOLD: f64 = 0.05;
pub static MODEL_TRAINER_N_NEIGHBORS: usize = 3;
pub static MODEL_TRAINER_CV_FOLDS: usize = 3;

pub static SAVED_MODEL_DIR: &str = "saved_models";

pub static APP_HOST: &str = "0.0.0.0";
pub static APP_PORT: u16 = 8080;
pub static STATIC_DIR: &str = "static";
pub static TEMPLATE_DIR: &str = "templates";
