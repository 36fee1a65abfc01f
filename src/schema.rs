//! Declarative dataset schema read from `config/schema.yaml`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaConfig {
    /// Expected columns of the stored collection, one `{name: type}` map each.
    #[serde(default)]
    pub columns: Vec<HashMap<String, String>>,
    pub target_column: String,
    #[serde(default)]
    pub numerical_columns: Vec<String>,
    #[serde(default)]
    pub categorical_columns: Vec<String>,
    #[serde(rename = "Drop_columns", default)]
    pub drop_columns: Vec<String>,
}

impl SchemaConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Feature columns in model order: numerical first, then categorical.
    pub fn feature_columns(&self) -> Vec<&str> {
        self.numerical_columns
            .iter()
            .chain(self.categorical_columns.iter())
            .map(String::as_str)
            .collect()
    }

    /// Remove `drop_columns` from `df`. Every listed column must be present.
    pub fn drop_columns_from(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for name in &self.drop_columns {
            if out.column(name).is_err() {
                return Err(PipelineError::validation(format!(
                    "column `{name}` listed in Drop_columns is not in the dataset"
                )));
            }
            out = out.drop(name)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    const SCHEMA: &str = r#"
columns:
  - id: int
  - gender: category
  - age: float
  - stroke: int
target_column: stroke
numerical_columns:
  - age
categorical_columns:
  - gender
Drop_columns:
  - id
"#;

    #[test]
    fn parses_schema_yaml() {
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.drop_columns, vec!["id".to_string()]);
        assert_eq!(schema.target_column, "stroke");
        assert_eq!(schema.columns.len(), 4);
        assert_eq!(schema.feature_columns(), vec!["age", "gender"]);
    }

    #[test]
    fn drops_exactly_the_listed_columns() {
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        let df = df!(
            "id" => &[1, 2],
            "gender" => &["Male", "Female"],
            "age" => &[30.0, 40.0],
            "stroke" => &[0, 1]
        )
        .unwrap();

        let pruned = schema.drop_columns_from(&df).unwrap();
        assert_eq!(pruned.get_column_names(), vec!["gender", "age", "stroke"]);
        assert_eq!(pruned.height(), 2);
    }

    #[test]
    fn unknown_drop_column_is_a_validation_error() {
        let schema = SchemaConfig::from_yaml_str(SCHEMA).unwrap();
        let df = df!("age" => &[30.0]).unwrap();

        let err = schema.drop_columns_from(&df).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
