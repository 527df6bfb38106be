//! Per-column summary statistics (one summary row per audited column)

use std::collections::BTreeSet;
use std::fmt;

use polars::prelude::*;
use serde::{Serialize, Serializer};

use super::stats::{mean, quantile_sorted, round_ratio, sample_std};
use super::values::{numeric_values, CellValue};

/// Placeholder written into free-text fields until annotated
pub const PLACEHOLDER: &str = ".";

/// A ratio that may be undefined because its denominator is zero.
///
/// `Undefined` is deliberately distinct from `Defined(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn from_counts(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }

    fn rounded(self) -> Self {
        match self {
            Ratio::Defined(v) => Ratio::Defined(round_ratio(v)),
            Ratio::Undefined => Ratio::Undefined,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{}", v),
            Ratio::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Defined(v) => serializer.serialize_f64(*v),
            Ratio::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

/// Descriptive statistics over the non-missing values of a numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl NumericStats {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        // Infinite inputs leave std undefined and can leave mean or median NaN
        Self {
            mean: mean(&sorted).filter(|v| !v.is_nan()),
            std: sample_std(&sorted).filter(|v| v.is_finite()),
            min: sorted.first().copied(),
            median: quantile_sorted(&sorted, 0.5).filter(|v| !v.is_nan()),
            max: sorted.last().copied(),
        }
    }
}

/// One row of the audit summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub variable: String,
    pub label: String,
    /// Dataframe dtype of the column, e.g. `i64` or `str`
    pub dtype: String,
    /// Distinct non-missing values over non-missing values, rounded
    pub pct_unique: Ratio,
    /// Missing values over all rows, rounded
    pub pct_missing: Ratio,
    /// Populated for integer and float columns only
    pub stats: Option<NumericStats>,
    pub comment: String,
    pub row_count: usize,
    pub non_missing_count: usize,
    pub distinct_count: usize,
}

impl SummaryRow {
    pub fn missing_count(&self) -> usize {
        self.row_count - self.non_missing_count
    }

    /// Unrounded missing ratio, recomputed from the counts.
    pub fn exact_pct_missing(&self) -> Ratio {
        Ratio::from_counts(self.missing_count(), self.row_count)
    }

    /// Unrounded unique ratio, recomputed from the counts.
    pub fn exact_pct_unique(&self) -> Ratio {
        Ratio::from_counts(self.distinct_count, self.non_missing_count)
    }
}

/// Summarize one column given its typed cells.
pub fn summarize_column(col: &Column, values: &[CellValue]) -> PolarsResult<SummaryRow> {
    let row_count = values.len();
    let non_missing_count = values.iter().filter(|v| !v.is_missing()).count();
    let distinct_count = values
        .iter()
        .filter(|v| !v.is_missing())
        .collect::<BTreeSet<_>>()
        .len();

    let stats = numeric_values(col)?.map(|v| NumericStats::from_values(&v));

    Ok(SummaryRow {
        variable: col.name().to_string(),
        label: PLACEHOLDER.to_string(),
        dtype: col.dtype().to_string(),
        pct_unique: Ratio::from_counts(distinct_count, non_missing_count).rounded(),
        pct_missing: Ratio::from_counts(row_count - non_missing_count, row_count).rounded(),
        stats,
        comment: PLACEHOLDER.to_string(),
        row_count,
        non_missing_count,
        distinct_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::values::column_values;

    fn summarize(df: &DataFrame, name: &str) -> SummaryRow {
        let col = df.column(name).unwrap();
        let values = column_values(col).unwrap();
        summarize_column(col, &values).unwrap()
    }

    #[test]
    fn test_numeric_column_summary() {
        let df = df! {
            "A" => [Some(1i64), Some(2), Some(2), None],
        }
        .unwrap();

        let row = summarize(&df, "A");
        assert_eq!(row.pct_missing, Ratio::Defined(0.25));
        assert_eq!(row.pct_unique, Ratio::Defined(0.6667));
        let stats = row.stats.unwrap();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(2.0));
        assert_eq!(stats.median, Some(2.0));
        assert!((stats.mean.unwrap() - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_column_has_no_stats() {
        let df = df! {
            "B" => ["x", "y", "x", "x"],
        }
        .unwrap();

        let row = summarize(&df, "B");
        assert!(row.stats.is_none());
        assert_eq!(row.pct_unique, Ratio::Defined(0.5));
        assert_eq!(row.pct_missing, Ratio::Defined(0.0));
        assert_eq!(row.label, PLACEHOLDER);
        assert_eq!(row.comment, PLACEHOLDER);
    }

    #[test]
    fn test_infinite_value_leaves_std_undefined() {
        let df = df! {
            "x" => [1.0f64, f64::INFINITY, 3.0],
        }
        .unwrap();

        let stats = summarize(&df, "x").stats.unwrap();
        assert_eq!(stats.std, None);
        assert_eq!(stats.mean, Some(f64::INFINITY));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.max, Some(f64::INFINITY));
    }

    #[test]
    fn test_opposite_infinities_leave_mean_undefined() {
        let stats = NumericStats::from_values(&[f64::NEG_INFINITY, 0.0, f64::INFINITY]);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, Some(0.0));
    }

    #[test]
    fn test_all_missing_unique_ratio_is_undefined() {
        let df = df! {
            "gone" => [None::<f64>, None, None],
        }
        .unwrap();

        let row = summarize(&df, "gone");
        assert!(row.pct_unique.is_undefined());
        assert_eq!(row.pct_missing, Ratio::Defined(1.0));
        let stats = row.stats.unwrap();
        assert!(stats.mean.is_none());
        assert!(stats.std.is_none());
    }

    #[test]
    fn test_boolean_column_is_not_numeric() {
        let df = df! {
            "flag" => [true, false, true],
        }
        .unwrap();

        let row = summarize(&df, "flag");
        assert!(row.stats.is_none());
        assert_eq!(row.distinct_count, 2);
    }

    #[test]
    fn test_exact_ratios_from_counts() {
        let df = df! {
            "c" => [Some("a"), None, None, Some("b"), Some("b"), Some("c")],
        }
        .unwrap();

        let row = summarize(&df, "c");
        assert_eq!(row.exact_pct_missing(), Ratio::Defined(2.0 / 6.0));
        assert_eq!(row.pct_missing, Ratio::Defined(0.3333));
        assert_eq!(row.missing_count(), 2);
    }
}
