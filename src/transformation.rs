//! Feature preprocessing fitted on the train split and replayed at
//! prediction time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use num::Float;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::artifacts::{DataIngestionArtifact, DataTransformationArtifact};
use crate::config::DataTransformationConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::schema::SchemaConfig;
use crate::storage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFeature {
    pub name: String,
    /// Train-split mean, used in place of nulls.
    pub fill: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalFeature {
    pub name: String,
    /// Codes start at 1; 0 is reserved for values not seen during fitting.
    pub codes: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    pub numerical: Vec<NumericFeature>,
    pub categorical: Vec<CategoricalFeature>,
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df.column(name)?.cast(&DataType::Utf8)?;
    Ok(series
        .utf8()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn min_max<T: Float>(values: &[T]) -> Option<(T, T)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn min_max_scale<T: Float>(value: T, min: T, max: T) -> T {
    let range = max - min;
    if range == T::zero() {
        T::zero()
    } else {
        (value - min) / range
    }
}

impl NumericFeature {
    fn fit(name: &str, values: &[Option<f64>]) -> Result<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(PipelineError::validation(format!(
                "numeric column `{name}` has no values"
            )));
        }
        let fill = present.iter().sum::<f64>() / present.len() as f64;
        // Imputed values sit at the mean, inside [min, max] already.
        let (min, max) = min_max(&present).unwrap_or((fill, fill));
        Ok(Self {
            name: name.to_string(),
            fill,
            min,
            max,
        })
    }

    fn apply(&self, value: Option<f64>) -> f64 {
        min_max_scale(value.unwrap_or(self.fill), self.min, self.max)
    }
}

impl CategoricalFeature {
    fn fit(name: &str, values: &[String]) -> Self {
        let mut codes = BTreeMap::new();
        for value in values {
            if !codes.contains_key(value) {
                let code = codes.len() as u32 + 1;
                codes.insert(value.clone(), code);
            }
        }
        Self {
            name: name.to_string(),
            codes,
        }
    }

    fn apply(&self, value: &str) -> f64 {
        self.codes.get(value).copied().unwrap_or(0) as f64
    }
}

impl FeaturePreprocessor {
    pub fn fit(df: &DataFrame, schema: &SchemaConfig) -> Result<Self> {
        let numerical = schema
            .numerical_columns
            .iter()
            .map(|name| NumericFeature::fit(name, &numeric_column(df, name)?))
            .collect::<Result<Vec<_>>>()?;
        let categorical = schema
            .categorical_columns
            .iter()
            .map(|name| Ok(CategoricalFeature::fit(name, &text_column(df, name)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            numerical,
            categorical,
        })
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.numerical
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.categorical.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Transformed feature columns, in `feature_names()` order.
    pub fn transform_columns(&self, df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        let mut columns = Vec::with_capacity(self.numerical.len() + self.categorical.len());
        for feature in &self.numerical {
            let values = numeric_column(df, &feature.name)?;
            columns.push(values.into_iter().map(|v| feature.apply(v)).collect());
        }
        for feature in &self.categorical {
            let values = text_column(df, &feature.name)?;
            columns.push(values.iter().map(|v| feature.apply(v)).collect());
        }
        Ok(columns)
    }

    pub fn transform_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let columns = self
            .transform_columns(df)?
            .into_iter()
            .zip(self.feature_names())
            .map(|(values, name)| Series::new(name, values))
            .collect::<Vec<_>>();
        Ok(DataFrame::new(columns)?)
    }

    pub fn transform_matrix(&self, df: &DataFrame) -> Result<DenseMatrix<f64>> {
        columns_to_matrix(&self.transform_columns(df)?, df.height())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        storage::write_bytes(path, &serde_json::to_vec_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

/// Build a matrix from column vectors that all have `nrows` entries.
pub fn columns_to_matrix(columns: &[Vec<f64>], nrows: usize) -> Result<DenseMatrix<f64>> {
    if let Some(bad) = columns.iter().find(|c| c.len() != nrows) {
        return Err(PipelineError::validation(format!(
            "feature column has {} rows, expected {nrows}",
            bad.len()
        )));
    }
    let values: Vec<f64> = columns.iter().flatten().copied().collect();
    Ok(DenseMatrix::new(nrows, columns.len(), values, true))
}

/// Split a transformed frame into a feature matrix and the integer label.
pub fn frame_to_xy(df: &DataFrame, target_column: &str) -> Result<(DenseMatrix<f64>, Vec<i32>)> {
    let target = target_values(df, target_column)?;
    let columns = df
        .get_column_names()
        .into_iter()
        .filter(|name| *name != target_column)
        .map(|name| Ok(numeric_column(df, name)?.into_iter().flatten().collect()))
        .collect::<Result<Vec<Vec<f64>>>>()?;
    Ok((columns_to_matrix(&columns, df.height())?, target))
}

pub fn target_values(df: &DataFrame, target_column: &str) -> Result<Vec<i32>> {
    let series = df.column(target_column)?.cast(&DataType::Int32)?;
    let ca = series.i32()?;
    if ca.null_count() > 0 {
        return Err(PipelineError::validation(format!(
            "target column `{target_column}` has {} missing labels",
            ca.null_count()
        )));
    }
    Ok(ca.into_no_null_iter().collect())
}

pub fn check_required_columns(df: &DataFrame, schema: &SchemaConfig) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<&str> = schema
        .feature_columns()
        .into_iter()
        .chain(std::iter::once(schema.target_column.as_str()))
        .filter(|name| !present.contains(name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::validation(format!(
            "dataset is missing required columns: {}",
            missing.join(", ")
        )))
    }
}

pub struct DataTransformation {
    ingestion_artifact: DataIngestionArtifact,
    config: DataTransformationConfig,
    schema_file_path: PathBuf,
}

impl DataTransformation {
    pub fn new(
        ingestion_artifact: DataIngestionArtifact,
        config: DataTransformationConfig,
        schema_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ingestion_artifact,
            config,
            schema_file_path: schema_file_path.into(),
        }
    }

    pub fn initiate_data_transformation(&self) -> Result<DataTransformationArtifact> {
        self.run()
            .context("DataTransformation::initiate_data_transformation")
    }

    fn run(&self) -> Result<DataTransformationArtifact> {
        let schema = SchemaConfig::read(&self.schema_file_path)?;
        let train = storage::read_csv(&self.ingestion_artifact.trained_file_path)?;
        let test = storage::read_csv(&self.ingestion_artifact.test_file_path)?;
        check_required_columns(&train, &schema)?;
        check_required_columns(&test, &schema)?;

        let preprocessor = FeaturePreprocessor::fit(&train, &schema)?;
        info!(
            numerical = preprocessor.numerical.len(),
            categorical = preprocessor.categorical.len(),
            "Fitted preprocessor on the train split"
        );

        let mut train_out = self.transformed_with_target(&preprocessor, &train, &schema)?;
        let mut test_out = self.transformed_with_target(&preprocessor, &test, &schema)?;

        storage::write_parquet(&self.config.transformed_train_file_path, &mut train_out)?;
        storage::write_parquet(&self.config.transformed_test_file_path, &mut test_out)?;
        preprocessor.save(&self.config.transformed_object_file_path)?;

        let artifact = DataTransformationArtifact {
            transformed_object_file_path: self.config.transformed_object_file_path.clone(),
            transformed_train_file_path: self.config.transformed_train_file_path.clone(),
            transformed_test_file_path: self.config.transformed_test_file_path.clone(),
        };
        info!(?artifact, "Data transformation completed");
        Ok(artifact)
    }

    fn transformed_with_target(
        &self,
        preprocessor: &FeaturePreprocessor,
        df: &DataFrame,
        schema: &SchemaConfig,
    ) -> Result<DataFrame> {
        let mut out = preprocessor.transform_frame(df)?;
        let target = target_values(df, &schema.target_column)?;
        out.with_column(Series::new(&schema.target_column, target))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcore::linalg::basic::arrays::Array;

    fn schema() -> SchemaConfig {
        SchemaConfig::from_yaml_str(
            "target_column: stroke\nnumerical_columns: [age, bmi]\ncategorical_columns: [gender]\n",
        )
        .unwrap()
    }

    fn train_frame() -> DataFrame {
        df!(
            "age" => &[20.0, 40.0, 60.0],
            "bmi" => &[Some(20.0), None, Some(30.0)],
            "gender" => &["Male", "Female", "Male"],
            "stroke" => &[0, 0, 1]
        )
        .unwrap()
    }

    #[test]
    fn fit_imputes_encodes_and_scales() {
        let pre = FeaturePreprocessor::fit(&train_frame(), &schema()).unwrap();
        let columns = pre.transform_columns(&train_frame()).unwrap();

        assert_eq!(pre.feature_names(), vec!["age", "bmi", "gender"]);
        assert_eq!(columns[0], vec![0.0, 0.5, 1.0]);
        // null bmi is filled with the mean (25.0) before scaling
        assert_eq!(columns[1], vec![0.0, 0.5, 1.0]);
        assert_eq!(columns[2], vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn unseen_category_maps_to_zero() {
        let pre = FeaturePreprocessor::fit(&train_frame(), &schema()).unwrap();
        let row = df!("age" => &[40], "bmi" => &[25.0], "gender" => &["Other"]).unwrap();

        let columns = pre.transform_columns(&row).unwrap();
        assert_eq!(columns[2], vec![0.0]);
        assert_eq!(columns[0], vec![0.5]);
    }

    #[test]
    fn constant_column_scales_to_zero() {
        let df = df!("age" => &[5.0, 5.0], "bmi" => &[1.0, 2.0], "gender" => &["a", "b"]).unwrap();
        let pre = FeaturePreprocessor::fit(&df, &schema()).unwrap();
        assert_eq!(pre.transform_columns(&df).unwrap()[0], vec![0.0, 0.0]);
    }

    #[test]
    fn matrix_has_rows_and_feature_columns() {
        let pre = FeaturePreprocessor::fit(&train_frame(), &schema()).unwrap();
        let x = pre.transform_matrix(&train_frame()).unwrap();
        assert_eq!(x.shape(), (3, 3));
        assert_eq!(*x.get((1, 2)), 2.0);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let df = df!("age" => &[1.0], "stroke" => &[0]).unwrap();
        let err = check_required_columns(&df, &schema()).unwrap_err();
        assert!(err.to_string().contains("bmi"));
        assert!(err.to_string().contains("gender"));
    }

    #[test]
    fn missing_label_is_a_validation_error() {
        let df = df!("stroke" => &[Some(1), None]).unwrap();
        assert!(matches!(
            target_values(&df, "stroke").unwrap_err(),
            PipelineError::Validation(_)
        ));
    }

    #[test]
    fn preprocessor_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obj/preprocessing.json");
        let pre = FeaturePreprocessor::fit(&train_frame(), &schema()).unwrap();

        pre.save(&path).unwrap();
        assert_eq!(FeaturePreprocessor::load(&path).unwrap(), pre);
    }
}
