//! Integration tests for the feature/target association metrics

use dataudit::pipeline::{
    adjusted_mutual_information, chi_square_pvalues, kruskal_pvalues, DataAudit, AMI,
    PVALUE_CHI_SQUARE, PVALUE_KRUSKAL,
};
use dataudit::AuditError;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_chi_square_target_against_itself_is_significant() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let vector =
        chi_square_pvalues(&df, &["target", "segment"], target, PVALUE_CHI_SQUARE).unwrap();

    assert_eq!(vector.name, PVALUE_CHI_SQUARE);
    assert_eq!(vector.len(), 2);
    assert!(vector.get("target").unwrap() < 1e-10);
    assert!(vector.get("segment").unwrap() < 1e-10);
}

#[test]
fn test_chi_square_independent_feature_is_not_significant() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let vector = chi_square_pvalues(&df, &["noise"], target, PVALUE_CHI_SQUARE).unwrap();
    let p = vector.get("noise").unwrap();
    assert!(p > 0.5, "independent feature should not be significant, got {}", p);
}

#[test]
fn test_ami_of_identical_partitions_is_one() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let vector = adjusted_mutual_information(&df, &["segment", "noise"], target, AMI).unwrap();

    assert!((vector.get("segment").unwrap() - 1.0).abs() < 1e-9);
    assert!(vector.get("noise").unwrap().abs() < 0.05);
}

#[test]
fn test_kruskal_separated_groups() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let vector = kruskal_pvalues(&df, &["score", "flat"], target, PVALUE_KRUSKAL).unwrap();

    assert!(vector.get("score").unwrap() < 1e-10);
    assert!(vector.get("flat").unwrap().is_nan());
}

#[test]
fn test_kruskal_single_group_target_is_degenerate() {
    let df = df! {
        "target" => ["a", "a", "a", "a"],
        "x" => [1.0f64, 2.0, 3.0, 4.0],
    }
    .unwrap();
    let target = df.column("target").unwrap();

    let err = kruskal_pvalues(&df, &["x"], target, PVALUE_KRUSKAL).unwrap_err();
    assert!(matches!(err, AuditError::DegenerateTarget { groups: 1, .. }));
}

#[test]
fn test_kruskal_rejects_text_candidate() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let err = kruskal_pvalues(&df, &["noise"], target, PVALUE_KRUSKAL).unwrap_err();
    assert!(matches!(err, AuditError::NotNumeric { column } if column == "noise"));
}

#[test]
fn test_unknown_candidate_is_invalid_selection() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let err = chi_square_pvalues(&df, &["missing_col"], target, PVALUE_CHI_SQUARE).unwrap_err();
    assert!(matches!(err, AuditError::InvalidSelection { .. }));
}

#[test]
fn test_target_length_mismatch() {
    let df = common::create_target_dataframe();
    let short = Column::new("target".into(), ["yes", "no"]);

    let err = adjusted_mutual_information(&df, &["noise"], &short, AMI).unwrap_err();
    assert!(matches!(
        err,
        AuditError::LengthMismatch { expected: 100, actual: 2, .. }
    ));
}

#[test]
fn test_metrics_extend_the_summary() {
    let df = common::create_target_dataframe();
    let target = df.column("target").unwrap();

    let mut audit = DataAudit::new();
    audit.fit(&df).unwrap();

    let chi = chi_square_pvalues(&df, &["segment", "noise"], target, PVALUE_CHI_SQUARE).unwrap();
    let kw = kruskal_pvalues(&df, &["score", "flat"], target, PVALUE_KRUSKAL).unwrap();
    audit.extend(&[chi, kw]).unwrap();

    let summary = audit.view_summary().unwrap();
    assert_eq!(summary.len(), df.width());
    assert!(summary.metric("segment", PVALUE_CHI_SQUARE).unwrap() < 1e-10);
    assert!(summary.metric("score", PVALUE_KRUSKAL).unwrap() < 1e-10);
    // NaN p-values are stored as null cells
    assert_eq!(summary.metric("flat", PVALUE_KRUSKAL), None);
    assert_eq!(summary.metric("score", PVALUE_CHI_SQUARE), None);
}
