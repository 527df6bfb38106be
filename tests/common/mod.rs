//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Two-column frame used across the audit tests
///
/// - `A`: integers with one missing value (25% missing, 2 distinct of 3 present)
/// - `B`: text, "x" three times and "y" once
pub fn create_audit_dataframe() -> DataFrame {
    df! {
        "A" => [Some(1i64), Some(2), Some(2), None],
        "B" => ["x", "y", "x", "x"],
    }
    .unwrap()
}

/// 100 rows with a two-group target and features of known association
///
/// - `target`: "yes" for even rows, "no" for odd rows
/// - `segment`: identical to `target`, fully associated
/// - `noise`: categorical, independent of the target
/// - `score`: numeric, every "yes" row above every "no" row
/// - `flat`: numeric, constant
pub fn create_target_dataframe() -> DataFrame {
    let n = 100;
    let target: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "yes" } else { "no" }).collect();
    let noise: Vec<&str> = (0..n)
        .map(|i| if (i / 2) % 2 == 0 { "left" } else { "right" })
        .collect();
    let score: Vec<f64> = (0..n)
        .map(|i| if i % 2 == 0 { 100.0 + i as f64 } else { i as f64 })
        .collect();

    df! {
        "target" => target.clone(),
        "segment" => target,
        "noise" => noise,
        "score" => score,
        "flat" => vec![1.0f64; n],
    }
    .unwrap()
}

/// Create a DataFrame with known correlation patterns
pub fn create_correlation_test_dataframe() -> DataFrame {
    df! {
        "label" => ["a", "b", "a", "b", "a", "b", "a", "b", "a", "b"],
        "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "b" => [2.0f64, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0], // b = 2a
        "c" => [10.0f64, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], // reversed a
        "d" => [1.0f64, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0, 81.0, 100.0], // monotone in a
    }
    .unwrap()
}

/// Create a larger random DataFrame for consistency checks
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let columns: Vec<Column> = (0..cols)
        .map(|i| {
            let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
            Column::new(format!("feature_{}", i).into(), values)
        })
        .collect();

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
