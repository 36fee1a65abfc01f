//! Error type shared by every pipeline stage.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Io,
    ExternalService,
    Model,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data frame error: {0}")]
    Polars(#[from] PolarsError),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("schema file error: {0}")]
    Schema(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("model error: {0}")]
    Model(String),

    #[error("error occurred in {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PipelineError::Validation(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        PipelineError::Model(msg.into())
    }

    /// Classify the innermost cause, looking through any context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) | PipelineError::Schema(_) => ErrorKind::Validation,
            PipelineError::Io(_) | PipelineError::Serialization(_) => ErrorKind::Io,
            PipelineError::Polars(PolarsError::Io(_)) => ErrorKind::Io,
            PipelineError::Polars(_) => ErrorKind::Validation,
            PipelineError::Database(_) | PipelineError::MissingConfig(_) => {
                ErrorKind::ExternalService
            }
            PipelineError::Model(_) => ErrorKind::Model,
            PipelineError::Context { source, .. } => source.kind(),
        }
    }

    /// The innermost error, with all context layers removed.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<smartcore::error::Failed> for PipelineError {
    fn from(e: smartcore::error::Failed) -> Self {
        PipelineError::Model(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Attach the component/operation that was running when an error surfaced.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Context {
            context: context.into(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_the_underlying_kind() {
        let res: Result<()> = Err(PipelineError::validation("empty frame"));
        let err = res.context("DataIngestion::split_data_as_train_test").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "error occurred in DataIngestion::split_data_as_train_test: validation failed: empty frame"
        );
        assert!(matches!(err.root_cause(), PipelineError::Validation(_)));
    }

    #[test]
    fn io_errors_are_classified_as_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let res: std::result::Result<(), std::io::Error> = Err(io);
        let err = res.context("reading").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn missing_database_url_is_an_external_service_failure() {
        let err = PipelineError::MissingConfig("MONGODB_URL".to_string());
        assert_eq!(err.kind(), ErrorKind::ExternalService);
    }
}
