//! Reading and writing data frames on local disk.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use polars_io::parquet::ParquetWriter;

use crate::error::Result;

/// Tokens that mean "no value" in raw and ingested CSV files.
pub static NULL_TOKENS: [&str; 3] = ["N/A", "na", "NA"];

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

fn null_values() -> NullValues {
    NullValues::AllColumns(NULL_TOKENS.iter().map(|s| s.to_string()).collect())
}

/// Read a CSV with a header row, inferring column types.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let file = File::open(path)?;

    Ok(CsvReader::new(file)
        .has_header(true)
        .with_null_values(Some(null_values()))
        .finish()?)
}

/// Read a CSV, forcing the dtypes of the columns named in `schema`.
pub fn read_csv_with_schema<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<DataFrame> {
    let file = File::open(path)?;

    Ok(CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Some(Arc::new(schema.clone())))
        .with_null_values(Some(null_values()))
        .finish()?)
}

/// Write `df` as CSV with a header row, creating parent directories.
pub fn write_csv<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let mut file = File::create(path)?;

    CsvWriter::new(&mut file).has_header(true).finish(df)?;

    Ok(())
}

pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let file = File::open(path)?;

    Ok(ParquetReader::new(file).finish()?)
}

pub fn write_parquet<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    let mut file = File::create(path)?;

    ParquetWriter::new(&mut file).finish(df)?;

    Ok(())
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_write_creates_directories_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/frame.csv");
        let mut df = df!(
            "gender" => &["Male", "Female"],
            "bmi" => &[Some(22.5), None]
        )
        .unwrap();

        write_csv(&path, &mut df).unwrap();
        let back = read_csv(&path).unwrap();

        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.column("bmi").unwrap().null_count(), 1);
    }

    #[test]
    fn na_tokens_become_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "age,bmi\n30,N/A\n40,27.1\n").unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.column("bmi").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("bmi").unwrap().null_count(), 1);
    }

    #[test]
    fn parquet_round_trip_keeps_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/frame.parquet");
        let mut df = df!("x" => &[1.0, 2.0, 3.0], "y" => &[0, 1, 0]).unwrap();

        write_parquet(&path, &mut df).unwrap();
        assert_eq!(read_parquet(&path).unwrap().shape(), (3, 2));
    }
}
