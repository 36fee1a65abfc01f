//! Publish an accepted model to the directory the prediction pipeline reads.

use std::fs;

use tracing::info;

use crate::artifacts::{ModelPusherArtifact, ModelTrainerArtifact};
use crate::config::ModelPusherConfig;
use crate::error::{Result, ResultExt};

pub struct ModelPusher {
    trainer_artifact: ModelTrainerArtifact,
    config: ModelPusherConfig,
}

impl ModelPusher {
    pub fn new(trainer_artifact: ModelTrainerArtifact, config: ModelPusherConfig) -> Self {
        Self {
            trainer_artifact,
            config,
        }
    }

    pub fn initiate_model_pusher(&self) -> Result<ModelPusherArtifact> {
        self.run().context("ModelPusher::initiate_model_pusher")
    }

    fn run(&self) -> Result<ModelPusherArtifact> {
        let target = &self.config.saved_model_path;
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::copy(&self.trainer_artifact.trained_model_file_path, target)?;
        info!(
            from = %self.trainer_artifact.trained_model_file_path.display(),
            to = %target.display(),
            "Pushed model"
        );

        Ok(ModelPusherArtifact {
            saved_model_path: target.clone(),
        })
    }
}
