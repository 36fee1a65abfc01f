//! Stroke risk classification: a batch training pipeline over a patient
//! collection and a small web service that scores submitted forms.

pub mod artifacts;
pub mod config;
pub mod constants;
pub mod data_access;
pub mod error;
pub mod ingestion;
pub mod predict_pipeline;
pub mod pusher;
pub mod records;
pub mod schema;
pub mod server;
pub mod storage;
pub mod train_pipeline;
pub mod trainer;
pub mod transformation;

pub use error::{ErrorKind, PipelineError, Result};
