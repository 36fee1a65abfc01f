//! End-to-end training run: ingestion, transformation, training, push.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sysinfo::{System, SystemExt};
use tracing::{info, info_span, Instrument};

use crate::artifacts::{
    ClassificationMetrics, DataIngestionArtifact, DataTransformationArtifact,
    ModelPusherArtifact, ModelTrainerArtifact,
};
use crate::config::{
    current_timestamp, DataIngestionConfig, DataTransformationConfig, ModelPusherConfig,
    ModelTrainerConfig, TrainingPipelineConfig,
};
use crate::constants::ARTIFACT_DIR;
use crate::data_access::CollectionSource;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::pusher::ModelPusher;
use crate::schema::SchemaConfig;
use crate::trainer::ModelTrainer;
use crate::transformation::DataTransformation;

/// What a finished run reports back.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub run: String,
    pub metrics: ClassificationMetrics,
    pub saved_model_path: PathBuf,
}

/// Something that can run the training pipeline on demand.
#[async_trait]
pub trait TrainRunner: Send + Sync {
    async fn run_pipeline(&self) -> Result<TrainingSummary>;
}

fn used_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.used_memory()
}

pub struct TrainPipeline {
    source: Arc<dyn CollectionSource>,
    artifact_root: PathBuf,
    schema_file_path: Option<PathBuf>,
    saved_model_dir: Option<PathBuf>,
    expected_accuracy: Option<f64>,
    split_seed: Option<Option<u64>>,
}

impl TrainPipeline {
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self {
            source,
            artifact_root: PathBuf::from(ARTIFACT_DIR),
            schema_file_path: None,
            saved_model_dir: None,
            expected_accuracy: None,
            split_seed: None,
        }
    }

    pub fn with_artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.artifact_root = root.into();
        self
    }

    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file_path = Some(path.into());
        self
    }

    pub fn with_saved_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.saved_model_dir = Some(dir.into());
        self
    }

    pub fn with_expected_accuracy(mut self, accuracy: f64) -> Self {
        self.expected_accuracy = Some(accuracy);
        self
    }

    /// `None` disables seeding, so every run draws a different split.
    pub fn with_split_seed(mut self, seed: Option<u64>) -> Self {
        self.split_seed = Some(seed);
        self
    }

    fn pipeline_config(&self) -> TrainingPipelineConfig {
        let mut config = TrainingPipelineConfig::with_root(&self.artifact_root, current_timestamp());
        if let Some(path) = &self.schema_file_path {
            config.schema_file_path = path.clone();
        }
        if let Some(dir) = &self.saved_model_dir {
            config.saved_model_dir = dir.clone();
        }
        config
    }

    pub async fn start_data_ingestion(
        &self,
        pipeline: &TrainingPipelineConfig,
    ) -> Result<DataIngestionArtifact> {
        let mut config = DataIngestionConfig::new(pipeline);
        if let Some(seed) = self.split_seed {
            config.split_seed = seed;
        }
        DataIngestion::new(config, self.source.clone(), &pipeline.schema_file_path)
            .initiate_data_ingestion()
            .instrument(info_span!("data_ingestion"))
            .await
    }

    pub fn start_data_transformation(
        &self,
        pipeline: &TrainingPipelineConfig,
        ingestion: DataIngestionArtifact,
    ) -> Result<DataTransformationArtifact> {
        let config = DataTransformationConfig::new(pipeline);
        info_span!("data_transformation").in_scope(|| {
            DataTransformation::new(ingestion, config, &pipeline.schema_file_path)
                .initiate_data_transformation()
        })
    }

    pub fn start_model_trainer(
        &self,
        pipeline: &TrainingPipelineConfig,
        transformation: DataTransformationArtifact,
    ) -> Result<ModelTrainerArtifact> {
        let mut config = ModelTrainerConfig::new(pipeline);
        if let Some(accuracy) = self.expected_accuracy {
            config.expected_accuracy = accuracy;
        }
        let schema = SchemaConfig::read(&pipeline.schema_file_path)?;
        info_span!("model_trainer").in_scope(|| {
            ModelTrainer::new(transformation, config, &schema).initiate_model_trainer()
        })
    }

    pub fn start_model_pusher(
        &self,
        pipeline: &TrainingPipelineConfig,
        trainer: ModelTrainerArtifact,
    ) -> Result<ModelPusherArtifact> {
        let config = ModelPusherConfig::new(pipeline);
        info_span!("model_pusher")
            .in_scope(|| ModelPusher::new(trainer, config).initiate_model_pusher())
    }

    /// Run only the ingestion stage in a fresh artifact directory.
    pub async fn run_ingestion(&self) -> Result<DataIngestionArtifact> {
        let pipeline = self.pipeline_config();
        let span = info_span!("ingestion_run", run = %pipeline.timestamp);
        self.start_data_ingestion(&pipeline).instrument(span).await
    }

    async fn run(&self, pipeline: TrainingPipelineConfig) -> Result<TrainingSummary> {
        let memory_before = used_memory();
        info!(
            artifact_dir = %pipeline.artifact_dir.display(),
            used_memory_bytes = memory_before,
            "Starting training pipeline"
        );

        let ingestion = self.start_data_ingestion(&pipeline).await?;
        let transformation = self.start_data_transformation(&pipeline, ingestion)?;
        let trainer = self.start_model_trainer(&pipeline, transformation)?;
        let metrics = trainer.metrics.clone();
        let pusher = self.start_model_pusher(&pipeline, trainer)?;

        let memory_after = used_memory();
        info!(
            used_memory_bytes = memory_after,
            memory_delta_bytes = memory_after.saturating_sub(memory_before),
            "Training pipeline finished"
        );
        Ok(TrainingSummary {
            run: pipeline.timestamp,
            metrics,
            saved_model_path: pusher.saved_model_path,
        })
    }
}

#[async_trait]
impl TrainRunner for TrainPipeline {
    async fn run_pipeline(&self) -> Result<TrainingSummary> {
        let pipeline = self.pipeline_config();
        let span = info_span!("train_pipeline", run = %pipeline.timestamp);
        self.run(pipeline).instrument(span).await
    }
}
