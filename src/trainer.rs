//! KNN classifier training on the transformed splits.

use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use smartcore::api::SupervisedEstimator;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::accuracy;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::model_selection::{cross_validate, KFold};
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};
use tracing::{info, warn};

use crate::artifacts::{ClassificationMetrics, DataTransformationArtifact, ModelTrainerArtifact};
use crate::config::ModelTrainerConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::schema::SchemaConfig;
use crate::storage;
use crate::transformation::{frame_to_xy, FeaturePreprocessor};

pub type Classifier = KNNClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>, Euclidian<f64>>;

/// Everything needed to score a raw feature frame.
#[derive(Serialize, Deserialize)]
pub struct StrokeModel {
    pub preprocessor: FeaturePreprocessor,
    pub classifier: Classifier,
}

impl StrokeModel {
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<i32>> {
        let x = self.preprocessor.transform_matrix(df)?;
        Ok(self.classifier.predict(&x)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        storage::write_bytes(path, &serde_json::to_vec(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

pub struct ModelTrainer {
    transformation_artifact: DataTransformationArtifact,
    config: ModelTrainerConfig,
    target_column: String,
}

impl ModelTrainer {
    pub fn new(
        transformation_artifact: DataTransformationArtifact,
        config: ModelTrainerConfig,
        schema: &SchemaConfig,
    ) -> Self {
        Self {
            transformation_artifact,
            config,
            target_column: schema.target_column.clone(),
        }
    }

    pub fn initiate_model_trainer(&self) -> Result<ModelTrainerArtifact> {
        self.run().context("ModelTrainer::initiate_model_trainer")
    }

    fn run(&self) -> Result<ModelTrainerArtifact> {
        let train = storage::read_parquet(&self.transformation_artifact.transformed_train_file_path)?;
        let test = storage::read_parquet(&self.transformation_artifact.transformed_test_file_path)?;
        let (x_train, y_train) = frame_to_xy(&train, &self.target_column)?;
        let (x_test, y_test) = frame_to_xy(&test, &self.target_column)?;

        let (classifier, metrics) = train_classifier(
            &x_train,
            &y_train,
            &x_test,
            &y_test,
            self.config.n_neighbors,
            self.config.cv_folds,
        )?;
        info!(
            train_accuracy = metrics.train_accuracy,
            test_accuracy = metrics.test_accuracy,
            cv_accuracy = ?metrics.cv_accuracy,
            "Trained KNN classifier"
        );

        if metrics.test_accuracy < self.config.expected_accuracy {
            return Err(PipelineError::model(format!(
                "no model reached the expected accuracy {}: test accuracy was {:.4}",
                self.config.expected_accuracy, metrics.test_accuracy
            )));
        }
        let gap = (metrics.train_accuracy - metrics.test_accuracy).abs();
        if gap > self.config.over_fitting_under_fitting_threshold {
            warn!(
                gap,
                threshold = self.config.over_fitting_under_fitting_threshold,
                "Train and test accuracy diverge"
            );
        }

        let preprocessor =
            FeaturePreprocessor::load(&self.transformation_artifact.transformed_object_file_path)?;
        let model = StrokeModel {
            preprocessor,
            classifier,
        };
        model.save(&self.config.trained_model_file_path)?;

        let artifact = ModelTrainerArtifact {
            trained_model_file_path: self.config.trained_model_file_path.clone(),
            metrics,
        };
        info!(path = %artifact.trained_model_file_path.display(), "Saved trained model");
        Ok(artifact)
    }
}

/// Fit a KNN classifier and score it on both splits.
pub fn train_classifier(
    x_train: &DenseMatrix<f64>,
    y_train: &Vec<i32>,
    x_test: &DenseMatrix<f64>,
    y_test: &Vec<i32>,
    n_neighbors: usize,
    cv_folds: usize,
) -> Result<(Classifier, ClassificationMetrics)> {
    let n_train = x_train.shape().0;
    if n_train < n_neighbors {
        return Err(PipelineError::validation(format!(
            "train split has {n_train} rows, fewer than the {n_neighbors} neighbours required"
        )));
    }
    let parameters = KNNClassifierParameters::default().with_k(n_neighbors);

    let classifier = KNNClassifier::fit(x_train, y_train, parameters.clone())?;
    let train_accuracy = accuracy(y_train, &classifier.predict(x_train)?);
    let test_accuracy = accuracy(y_test, &classifier.predict(x_test)?);

    // Each fold's train part must still hold at least k rows.
    let cv_accuracy = if cv_folds > 1 && n_train * (cv_folds - 1) / cv_folds >= n_neighbors {
        let cv = KFold::default().with_n_splits(cv_folds);
        let results = cross_validate(
            KNNClassifier::new(),
            x_train,
            y_train,
            parameters,
            &cv,
            &accuracy,
        )?;
        Some(results.mean_test_score())
    } else {
        None
    };

    Ok((
        classifier,
        ClassificationMetrics {
            train_accuracy,
            test_accuracy,
            cv_accuracy,
        },
    ))
}
