//! Pairwise Pearson and Spearman correlation report over numeric columns

use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use super::stats::{average_ranks, pearson};
use super::values::optional_numeric_values;
use crate::error::AuditResult;
use crate::utils::{create_spinner, finish_with_success};

/// Correlation coefficients of one ordered pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub variable_x: String,
    pub variable_y: String,
    pub pearson: f64,
    pub spearman: f64,
}

/// Long-form correlation report: one row per ordered pair of distinct numeric columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub rows: Vec<CorrelationRow>,
}

impl CorrelationReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, x: &str, y: &str) -> Option<&CorrelationRow> {
        self.rows
            .iter()
            .find(|r| r.variable_x == x && r.variable_y == y)
    }
}

/// Compute Pearson and Spearman coefficients for every ordered pair (x, y)
/// of distinct numeric columns.
///
/// Each pair uses the rows where both values are present. Coefficients that
/// are undefined (zero variance, fewer than two shared rows) are reported as 0.
pub fn correlation_report(df: &DataFrame) -> AuditResult<CorrelationReport> {
    let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for col in df.get_columns() {
        if col.dtype().is_primitive_numeric() {
            columns.push((col.name().to_string(), optional_numeric_values(col)?));
        }
    }

    let n_cols = columns.len();
    if n_cols < 2 {
        return Ok(CorrelationReport::default());
    }

    let spinner = create_spinner(&format!("Correlating {} numeric columns...", n_cols));

    let has_missing = columns
        .iter()
        .any(|(_, values)| values.iter().any(|v| v.is_none()));

    let (pearson_m, spearman_m) = if has_missing {
        pairwise_matrices(&columns)
    } else {
        let dense: Vec<Vec<f64>> = columns
            .iter()
            .map(|(_, values)| values.iter().map(|v| v.unwrap_or_default()).collect())
            .collect();
        let ranked: Vec<Vec<f64>> = dense.par_iter().map(|v| average_ranks(v)).collect();
        (correlation_matrix(&dense), correlation_matrix(&ranked))
    };

    let mut rows = Vec::with_capacity(n_cols * (n_cols - 1));
    for i in 0..n_cols {
        for j in 0..n_cols {
            if i == j {
                continue;
            }
            rows.push(CorrelationRow {
                variable_x: columns[i].0.clone(),
                variable_y: columns[j].0.clone(),
                pearson: pearson_m[(i, j)],
                spearman: spearman_m[(i, j)],
            });
        }
    }

    finish_with_success(
        &spinner,
        &format!("Correlated {} column pairs", rows.len()),
    );

    Ok(CorrelationReport { rows })
}

/// Pairwise-complete coefficients for columns containing missing values.
fn pairwise_matrices(columns: &[(String, Vec<Option<f64>>)]) -> (Mat<f64>, Mat<f64>) {
    let n_cols = columns.len();

    // Upper triangle only; both coefficients are symmetric
    let pairs: Vec<(usize, usize)> = (0..n_cols)
        .flat_map(|i| ((i + 1)..n_cols).map(move |j| (i, j)))
        .collect();

    let coefficients: Vec<(usize, usize, f64, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let (x, y): (Vec<f64>, Vec<f64>) = columns[i]
                .1
                .iter()
                .zip(columns[j].1.iter())
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();

            let p = pearson(&x, &y).unwrap_or(0.0);
            let s = pearson(&average_ranks(&x), &average_ranks(&y)).unwrap_or(0.0);
            (i, j, p, s)
        })
        .collect();

    let mut pearson_m = Mat::<f64>::zeros(n_cols, n_cols);
    let mut spearman_m = Mat::<f64>::zeros(n_cols, n_cols);
    for (i, j, p, s) in coefficients {
        pearson_m[(i, j)] = p;
        pearson_m[(j, i)] = p;
        spearman_m[(i, j)] = s;
        spearman_m[(j, i)] = s;
    }

    (pearson_m, spearman_m)
}

/// Correlation matrix of null-free, equally long columns.
///
/// Columns are standardised as Z = (X - mean) / (std * sqrt(n)), so R = Z^T Z.
/// A zero-variance column, or one holding an infinite value, stays all-zero
/// in Z and therefore correlates 0 with everything.
fn correlation_matrix(columns: &[Vec<f64>]) -> Mat<f64> {
    let n_cols = columns.len();
    let n_rows = columns.first().map_or(0, |c| c.len());

    let standardized: Vec<Option<Vec<f64>>> = columns
        .par_iter()
        .map(|values| {
            if n_rows < 2 {
                return None;
            }
            let n = n_rows as f64;
            let mean = values.iter().sum::<f64>() / n;
            let ss: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
            // An infinite value makes `ss` NaN; treated like zero variance
            if !(ss > 0.0 && ss.is_finite()) {
                return None;
            }
            let scale = ss.sqrt();
            Some(values.iter().map(|x| (x - mean) / scale).collect())
        })
        .collect();

    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, col) in standardized.iter().enumerate() {
        if let Some(col) = col {
            for (row_idx, &val) in col.iter().enumerate() {
                z[(row_idx, col_idx)] = val;
            }
        }
    }

    let mut corr = z.transpose() * &z;
    for i in 0..corr.nrows() {
        for j in 0..corr.ncols() {
            let r = corr[(i, j)];
            corr[(i, j)] = if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 };
        }
    }
    corr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_matches_pairwise() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0],
            vec![5.0, 5.0, 5.0, 5.0, 5.0],
        ];
        let m = correlation_matrix(&columns);

        let direct = pearson(&columns[0], &columns[1]).unwrap();
        assert!((m[(0, 1)] - direct).abs() < 1e-12);
        assert!((m[(1, 0)] - direct).abs() < 1e-12);
        assert_eq!(m[(0, 2)], 0.0);
        assert_eq!(m[(2, 1)], 0.0);
    }

    #[test]
    fn test_matrix_infinite_value_correlates_zero() {
        let columns = vec![
            vec![1.0, 2.0, f64::INFINITY, 4.0],
            vec![2.0, 1.0, 3.0, 5.0],
        ];
        let m = correlation_matrix(&columns);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(1, 0)], 0.0);
        for i in 0..2 {
            for j in 0..2 {
                assert!(m[(i, j)].is_finite());
            }
        }
    }

    #[test]
    fn test_pairwise_infinite_value_correlates_zero() {
        let columns = vec![
            ("x".to_string(), vec![Some(1.0), Some(2.0), Some(f64::INFINITY), Some(4.0), None]),
            ("y".to_string(), vec![Some(2.0), Some(1.0), Some(3.0), Some(5.0), Some(9.0)]),
        ];
        let (p, s) = pairwise_matrices(&columns);
        assert_eq!(p[(0, 1)], 0.0);
        assert!(s[(0, 1)].is_finite());
    }

    #[test]
    fn test_pairwise_ignores_incomplete_rows() {
        let columns = vec![
            ("a".to_string(), vec![Some(1.0), Some(2.0), None, Some(4.0)]),
            ("b".to_string(), vec![Some(2.0), Some(4.0), Some(100.0), Some(8.0)]),
        ];
        let (p, s) = pairwise_matrices(&columns);
        assert!((p[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((s[(1, 0)] - 1.0).abs() < 1e-12);
    }
}
