//! Integration tests for dataset loading

use dataudit::pipeline::{dataset_stats, load_dataset, DataAudit, Ratio};

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_csv() {
    let mut df = common::create_audit_dataframe();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 100).unwrap();
    assert_eq!(loaded.shape(), (4, 2));
    assert_eq!(loaded.column("A").unwrap().null_count(), 1);
}

#[test]
fn test_load_parquet() {
    let mut df = common::create_target_dataframe();
    let (_temp_dir, path) = common::create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, 100).unwrap();
    assert_eq!(loaded.shape(), df.shape());

    let (rows, cols, memory_mb) = dataset_stats(&loaded);
    assert_eq!((rows, cols), (100, 5));
    assert!(memory_mb > 0.0);
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("data.xlsx");
    std::fs::write(&path, b"not a dataset").unwrap();

    let err = load_dataset(&path, 100).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_loaded_csv_audits_like_in_memory_frame() {
    let mut df = common::create_audit_dataframe();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 100).unwrap();
    let mut audit = DataAudit::new();
    audit.fit(&loaded).unwrap();

    let summary = audit.view_summary().unwrap();
    assert_eq!(summary.row("A").unwrap().pct_missing, Ratio::Defined(0.25));
    assert_eq!(summary.row("B").unwrap().pct_unique, Ratio::Defined(0.5));
}
