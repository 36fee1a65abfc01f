//! Data ingestion: export the collection, prune columns, split, persist.

use std::path::PathBuf;
use std::sync::Arc;

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use tracing::{info, warn};

use crate::artifacts::DataIngestionArtifact;
use crate::config::DataIngestionConfig;
use crate::data_access::CollectionSource;
use crate::error::{PipelineError, Result, ResultExt};
use crate::schema::SchemaConfig;
use crate::storage;

pub struct DataIngestion {
    config: DataIngestionConfig,
    source: Arc<dyn CollectionSource>,
    schema_file_path: PathBuf,
}

impl DataIngestion {
    pub fn new(
        config: DataIngestionConfig,
        source: Arc<dyn CollectionSource>,
        schema_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            source,
            schema_file_path: schema_file_path.into(),
        }
    }

    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Export the whole collection and snapshot it to the feature store.
    ///
    /// An empty collection is not an error here: a warning is logged, nothing
    /// is written and an empty frame is returned.
    pub async fn export_data_into_feature_store(&self) -> Result<DataFrame> {
        info!("Exporting data from the collection source");
        let mut df = self
            .source
            .export_collection_as_dataframe(&self.config.collection_name)
            .await
            .context("DataIngestion::export_data_into_feature_store")?;

        info!(
            database = self.source.database_name(),
            collection = %self.config.collection_name,
            rows = df.height(),
            columns = df.width(),
            "Exported collection"
        );

        if df.height() == 0 {
            warn!(collection = %self.config.collection_name, "No data found in the collection");
            return Ok(DataFrame::default());
        }

        let path = &self.config.feature_store_file_path;
        info!(path = %path.display(), "Saving exported data to the feature store");
        storage::write_csv(path, &mut df).context("DataIngestion::export_data_into_feature_store")?;

        Ok(df)
    }

    /// Split `df` by the configured ratio and write both partitions as CSV.
    pub fn split_data_as_train_test(&self, df: &DataFrame) -> Result<()> {
        let (mut train, mut test) = train_test_split(
            df,
            self.config.train_test_split_ratio,
            self.config.split_seed,
        )
        .context("DataIngestion::split_data_as_train_test")?;
        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            seed = ?self.config.split_seed,
            "Performed train test split"
        );

        storage::write_csv(&self.config.training_file_path, &mut train)
            .context("DataIngestion::split_data_as_train_test")?;
        storage::write_csv(&self.config.testing_file_path, &mut test)
            .context("DataIngestion::split_data_as_train_test")?;
        info!(
            train = %self.config.training_file_path.display(),
            test = %self.config.testing_file_path.display(),
            "Exported train and test files"
        );

        Ok(())
    }

    pub async fn initiate_data_ingestion(&self) -> Result<DataIngestionArtifact> {
        self.run()
            .await
            .context("DataIngestion::initiate_data_ingestion")
    }

    async fn run(&self) -> Result<DataIngestionArtifact> {
        let df = self.export_data_into_feature_store().await?;
        let schema = SchemaConfig::read(&self.schema_file_path)?;

        // An empty export has no columns to drop; let the split reject it.
        let df = if df.height() == 0 {
            df
        } else {
            schema.drop_columns_from(&df)?
        };
        info!(dropped = ?schema.drop_columns, columns = df.width(), "Applied schema drop list");

        self.split_data_as_train_test(&df)?;

        let artifact = DataIngestionArtifact {
            trained_file_path: self.config.training_file_path.clone(),
            test_file_path: self.config.testing_file_path.clone(),
        };
        info!(?artifact, "Data ingestion completed");
        Ok(artifact)
    }
}

/// Shuffle the rows of `df` and cut off `ceil(len * test_size)` of them as
/// the test partition.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: Option<u64>,
) -> Result<(DataFrame, DataFrame)> {
    let n = df.height();
    if n == 0 {
        return Err(PipelineError::validation(
            "the data frame is empty and cannot be split",
        ));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::validation(format!(
            "test size must be in (0, 1), got {test_size}"
        )));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_train == 0 {
        return Err(PipelineError::validation(format!(
            "with {n} rows and test size {test_size} the train partition would be empty"
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut thread_rng()),
    }

    let test_idx = IdxCa::from_vec("test", indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("train", indices[n_test..].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: i32) -> DataFrame {
        let ids: Vec<i32> = (0..n).collect();
        let ages: Vec<f64> = ids.iter().map(|i| 20.0 + *i as f64).collect();
        df!("id" => ids, "age" => ages).unwrap()
    }

    #[test]
    fn partitions_cover_every_row() {
        let df = frame(10);
        let (train, test) = train_test_split(&df, 0.2, Some(7)).unwrap();

        assert_eq!(train.height(), 8);
        assert_eq!(test.height(), 2);

        let mut ids: Vec<i32> = train
            .column("id")
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .chain(test.column("id").unwrap().i32().unwrap().into_no_null_iter())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_size_rounds_up() {
        let (train, test) = train_test_split(&frame(11), 0.2, Some(1)).unwrap();
        assert_eq!(test.height(), 3);
        assert_eq!(train.height(), 8);
    }

    #[test]
    fn same_seed_same_split() {
        let df = frame(50);
        let (a, _) = train_test_split(&df, 0.3, Some(42)).unwrap();
        let (b, _) = train_test_split(&df, 0.3, Some(42)).unwrap();
        assert!(a.frame_equal(&b));
    }

    #[test]
    fn empty_frame_is_rejected() {
        let err = train_test_split(&DataFrame::default(), 0.2, None).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn single_row_cannot_be_split() {
        let err = train_test_split(&frame(1), 0.2, None).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn ratio_outside_unit_interval_is_rejected() {
        assert!(train_test_split(&frame(10), 0.0, None).is_err());
        assert!(train_test_split(&frame(10), 1.0, None).is_err());
    }
}
