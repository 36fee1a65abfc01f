//! Sources the ingestion stage can export a collection from.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Client;
use polars::prelude::*;
use tracing::{debug, info};

use crate::constants::{DATABASE_NAME, MONGODB_URL_KEY};
use crate::error::{PipelineError, Result};
use crate::records::RAW_SCHEMA;
use crate::storage::{self, NULL_TOKENS};

/// Anything that can hand over a whole collection as a data frame.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    fn database_name(&self) -> &str;

    async fn export_collection_as_dataframe(&self, collection_name: &str) -> Result<DataFrame>;
}

pub struct MongoCollectionSource {
    url: Option<String>,
    database_name: String,
}

impl MongoCollectionSource {
    pub fn new(url: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            database_name: database_name.into(),
        }
    }

    /// Build from `MONGODB_URL`, reading from the default database. A missing
    /// URL is only reported when a collection is actually exported.
    pub fn from_env() -> Self {
        Self {
            url: env::var(MONGODB_URL_KEY).ok(),
            database_name: DATABASE_NAME.to_string(),
        }
    }
}

#[async_trait]
impl CollectionSource for MongoCollectionSource {
    fn database_name(&self) -> &str {
        &self.database_name
    }

    async fn export_collection_as_dataframe(&self, collection_name: &str) -> Result<DataFrame> {
        let url = self.url.as_deref().ok_or_else(|| {
            PipelineError::MissingConfig(format!("{MONGODB_URL_KEY} is not set"))
        })?;
        let client = Client::with_uri_str(url).await?;
        let collection = client
            .database(&self.database_name)
            .collection::<Document>(collection_name);

        let mut cursor = collection.find(None, None).await?;
        let mut documents = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            documents.push(doc);
        }
        debug!(
            database = %self.database_name,
            collection = collection_name,
            documents = documents.len(),
            "Fetched collection"
        );

        Ok(documents_to_frame(&documents)?)
    }
}

/// Reads a raw CSV snapshot of the collection instead of a live database.
pub struct CsvCollectionSource {
    path: PathBuf,
}

impl CsvCollectionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CollectionSource for CsvCollectionSource {
    fn database_name(&self) -> &str {
        "csv"
    }

    async fn export_collection_as_dataframe(&self, collection_name: &str) -> Result<DataFrame> {
        info!(path = %self.path.display(), collection = collection_name, "Reading collection snapshot");
        storage::read_csv_with_schema(&self.path, &RAW_SCHEMA)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    fn widen(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Text, _) | (_, Text) => Text,
            (Float, _) | (_, Float) => Float,
            (Int, Int) => Int,
        }
    }
}

fn is_null(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => true,
        Bson::String(s) => NULL_TOKENS.contains(&s.as_str()),
        Bson::Double(f) => f.is_nan(),
        _ => false,
    }
}

fn kind_of(value: &Bson) -> ColumnKind {
    match value {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Boolean(_) => ColumnKind::Int,
        Bson::Double(_) => ColumnKind::Float,
        _ => ColumnKind::Text,
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        Bson::Boolean(b) => Some(*b as i64),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        other => as_i64(other).map(|v| v as f64),
    }
}

fn as_text(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a list of documents into a frame. `_id` is dropped, null tokens become
/// nulls and every column gets the narrowest of Int64, Float64 or Utf8 that
/// holds all of its values.
pub fn documents_to_frame(documents: &[Document]) -> PolarsResult<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    let mut kinds: HashMap<&str, ColumnKind> = HashMap::new();

    for doc in documents {
        for (key, value) in doc {
            if key == "_id" {
                continue;
            }
            if !kinds.contains_key(key.as_str()) {
                names.push(key.as_str());
                kinds.insert(key.as_str(), ColumnKind::Int);
            }
            if !is_null(value) {
                let kind = kinds[key.as_str()].widen(kind_of(value));
                kinds.insert(key.as_str(), kind);
            }
        }
    }

    let columns = names
        .iter()
        .map(|name| {
            let values = documents
                .iter()
                .map(|doc| doc.get(*name).filter(|v| !is_null(v)));
            match kinds[name] {
                ColumnKind::Int => {
                    let v: Vec<Option<i64>> = values.map(|v| v.and_then(as_i64)).collect();
                    Series::new(name, v)
                }
                ColumnKind::Float => {
                    let v: Vec<Option<f64>> = values.map(|v| v.and_then(as_f64)).collect();
                    Series::new(name, v)
                }
                ColumnKind::Text => {
                    let v: Vec<Option<String>> = values.map(|v| v.map(as_text)).collect();
                    Series::new(name, v)
                }
            }
        })
        .collect::<Vec<_>>();

    DataFrame::new(columns)
}
