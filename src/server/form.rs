use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::records::HeartData;

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    #[error("invalid {kind} for `{field}`: {value:?}")]
    InvalidNumber {
        field: &'static str,
        kind: &'static str,
        value: String,
    },
}

fn text(fields: &HashMap<String, String>, name: &'static str) -> Result<String, FormError> {
    fields
        .get(name)
        .cloned()
        .ok_or(FormError::MissingField(name))
}

fn number<T: FromStr>(
    fields: &HashMap<String, String>,
    name: &'static str,
    kind: &'static str,
) -> Result<T, FormError> {
    let raw = text(fields, name)?;
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        field: name,
        kind,
        value: raw,
    })
}

/// Coerce the posted form into typed features: ages and flags are integers,
/// glucose and BMI are floats, everything else stays text.
pub fn parse_heart_data(fields: &HashMap<String, String>) -> Result<HeartData, FormError> {
    Ok(HeartData {
        gender: text(fields, "gender")?,
        age: number(fields, "age", "integer")?,
        hypertension: number(fields, "hypertension", "integer")?,
        heart_disease: number(fields, "heart_disease", "integer")?,
        ever_married: text(fields, "ever_married")?,
        work_type: text(fields, "work_type")?,
        residence_type: text(fields, "Residence_type")?,
        avg_glucose_level: number(fields, "avg_glucose_level", "float")?,
        bmi: number(fields, "bmi", "float")?,
        smoking_status: text(fields, "smoking_status")?,
    })
}
