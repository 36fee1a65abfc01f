use lazy_static::lazy_static;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Column types of the raw stroke dataset as stored in the collection.
    pub static ref RAW_SCHEMA: Schema = StrokeRecord::raw_schema();
}

/// One patient row of the raw dataset, including the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub id: i32,
    pub gender: String,
    pub age: f64,
    pub hypertension: i32,
    pub heart_disease: i32,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type")]
    pub residence_type: String,
    pub avg_glucose_level: f64,
    pub bmi: Option<f64>,
    pub smoking_status: String,
    pub stroke: i32,
}

impl StrokeRecord {
    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id", DataType::Int32),
            Field::new("gender", DataType::Utf8),
            Field::new("age", DataType::Float64),
            Field::new("hypertension", DataType::Int32),
            Field::new("heart_disease", DataType::Int32),
            Field::new("ever_married", DataType::Utf8),
            Field::new("work_type", DataType::Utf8),
            Field::new("Residence_type", DataType::Utf8),
            Field::new("avg_glucose_level", DataType::Float64),
            Field::new("bmi", DataType::Float64),
            Field::new("smoking_status", DataType::Utf8),
            Field::new("stroke", DataType::Int32),
        ])
    }
}

/// Features submitted for a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartData {
    pub gender: String,
    pub age: i64,
    pub hypertension: i32,
    pub heart_disease: i32,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type")]
    pub residence_type: String,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub smoking_status: String,
}

impl HeartData {
    /// Single-row frame with the same column names as the ingested dataset.
    pub fn to_data_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            "gender" => &[self.gender.as_str()],
            "age" => &[self.age],
            "hypertension" => &[self.hypertension],
            "heart_disease" => &[self.heart_disease],
            "ever_married" => &[self.ever_married.as_str()],
            "work_type" => &[self.work_type.as_str()],
            "Residence_type" => &[self.residence_type.as_str()],
            "avg_glucose_level" => &[self.avg_glucose_level],
            "bmi" => &[self.bmi],
            "smoking_status" => &[self.smoking_status.as_str()]
        )
    }
}
