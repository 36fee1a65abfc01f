#![allow(dead_code)]

use std::path::{Path, PathBuf};

use stroke_risk::records::{HeartData, StrokeRecord};

pub fn schema_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/schema.yaml")
}

/// Deterministic patients where older, hyperglycaemic, hypertensive people
/// are the ones who had a stroke.
pub fn stroke_records(n: usize) -> Vec<StrokeRecord> {
    let genders = ["Male", "Female"];
    let work = ["Private", "Self-employed", "Govt_job"];
    let smoking = ["never smoked", "formerly smoked", "smokes", "Unknown"];

    (0..n)
        .map(|i| {
            let high_risk = i % 3 == 0;
            let age = if high_risk { 65.0 + (i % 15) as f64 } else { 20.0 + (i % 30) as f64 };
            StrokeRecord {
                id: 1000 + i as i32,
                gender: genders[i % 2].to_string(),
                age,
                hypertension: high_risk as i32,
                heart_disease: (high_risk && i % 2 == 0) as i32,
                ever_married: if age > 30.0 { "Yes" } else { "No" }.to_string(),
                work_type: work[i % 3].to_string(),
                residence_type: if i % 2 == 0 { "Urban" } else { "Rural" }.to_string(),
                avg_glucose_level: if high_risk { 200.0 + i as f64 } else { 80.0 + (i % 20) as f64 },
                bmi: if i % 7 == 3 { None } else { Some(22.0 + (i % 10) as f64) },
                smoking_status: smoking[i % 4].to_string(),
                stroke: high_risk as i32,
            }
        })
        .collect()
}

pub fn write_records(path: &Path, records: &[StrokeRecord]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for record in records {
        writer.serialize(record).unwrap();
    }
    writer.flush().unwrap();
}

pub fn high_risk_patient() -> HeartData {
    HeartData {
        gender: "Male".to_string(),
        age: 72,
        hypertension: 1,
        heart_disease: 1,
        ever_married: "Yes".to_string(),
        work_type: "Private".to_string(),
        residence_type: "Urban".to_string(),
        avg_glucose_level: 230.0,
        bmi: 27.0,
        smoking_status: "smokes".to_string(),
    }
}
