//! Association between candidate features and a target column
//!
//! Three independent screens, each returning one value per candidate:
//! - chi-squared test of independence (p-value, lower = stronger association)
//! - adjusted mutual information (1 = identical partitions, 0 = chance level)
//! - Kruskal–Wallis rank test across target groups (p-value)

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::gamma::ln_gamma;

use super::contingency::ContingencyTable;
use super::values::{column_values, CellValue};
use crate::error::{AuditError, AuditResult};

/// Default output name of [`chi_square_pvalues`]
pub const PVALUE_CHI_SQUARE: &str = "PVALUE_CHI_SQUARE";
/// Default output name of [`adjusted_mutual_information`]
pub const AMI: &str = "AMI";
/// Default output name of [`kruskal_pvalues`]
pub const PVALUE_KRUSKAL: &str = "PVALUE_KRUSKAL";

/// A named vector with one value per candidate column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationVector {
    pub name: String,
    entries: Vec<(String, f64)>,
}

impl AssociationVector {
    pub fn new(name: impl Into<String>, entries: Vec<(String, f64)>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn get(&self, variable: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, f64)> {
        self.entries.iter().map(|(name, value)| (name, *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two-column frame: `VARIABLE` and the vector's name.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();
        let values: Vec<f64> = self.entries.iter().map(|(_, v)| *v).collect();
        DataFrame::new(vec![
            Column::new("VARIABLE".into(), names),
            Column::new(self.name.as_str().into(), values),
        ])
    }
}

/// Chi-squared independence p-value of each candidate against the target.
///
/// The contingency table keeps missing values as their own bucket on both axes.
pub fn chi_square_pvalues<S: AsRef<str>>(
    df: &DataFrame,
    candidates: &[S],
    target: &Column,
    name: &str,
) -> AuditResult<AssociationVector> {
    let target_values = target_cells(df, target)?;

    let entries = resolve_candidates(df, candidates)?
        .into_iter()
        .map(|col| {
            let values = column_values(col)?;
            let table = ContingencyTable::new(&values, &target_values);
            Ok((col.name().to_string(), chi_square_pvalue(&table)?))
        })
        .collect::<AuditResult<Vec<_>>>()?;

    Ok(AssociationVector::new(name, entries))
}

/// Adjusted mutual information of each candidate's partition against the target's.
pub fn adjusted_mutual_information<S: AsRef<str>>(
    df: &DataFrame,
    candidates: &[S],
    target: &Column,
    name: &str,
) -> AuditResult<AssociationVector> {
    let target_values = target_cells(df, target)?;

    let entries = resolve_candidates(df, candidates)?
        .into_iter()
        .map(|col| {
            let values = column_values(col)?;
            let table = ContingencyTable::new(&values, &target_values);
            Ok((col.name().to_string(), adjusted_mutual_info(&table)))
        })
        .collect::<AuditResult<Vec<_>>>()?;

    Ok(AssociationVector::new(name, entries))
}

/// Kruskal–Wallis p-value of each numeric candidate across the target's groups.
///
/// Fails with `DegenerateTarget` when the target has fewer than two
/// non-missing groups and with `NotNumeric` for a non-numeric candidate.
/// A candidate whose values fall into fewer than two groups, or are all
/// identical, gets NaN.
pub fn kruskal_pvalues<S: AsRef<str>>(
    df: &DataFrame,
    candidates: &[S],
    target: &Column,
    name: &str,
) -> AuditResult<AssociationVector> {
    let target_values = target_cells(df, target)?;

    let groups = target_values
        .iter()
        .filter(|v| !v.is_missing())
        .collect::<BTreeSet<_>>()
        .len();
    if groups < 2 {
        return Err(AuditError::DegenerateTarget {
            target: target.name().to_string(),
            groups,
        });
    }

    let entries = resolve_candidates(df, candidates)?
        .into_iter()
        .map(|col| {
            if !col.dtype().is_primitive_numeric() {
                return Err(AuditError::NotNumeric {
                    column: col.name().to_string(),
                });
            }
            let values = column_values(col)?;
            let table = ContingencyTable::complete(&values, &target_values);
            Ok((col.name().to_string(), kruskal_pvalue(&table)?))
        })
        .collect::<AuditResult<Vec<_>>>()?;

    Ok(AssociationVector::new(name, entries))
}

fn target_cells(df: &DataFrame, target: &Column) -> AuditResult<Vec<CellValue>> {
    if target.len() != df.height() {
        return Err(AuditError::LengthMismatch {
            column: target.name().to_string(),
            expected: df.height(),
            actual: target.len(),
        });
    }
    Ok(column_values(target)?)
}

fn resolve_candidates<'a, S: AsRef<str>>(
    df: &'a DataFrame,
    candidates: &[S],
) -> AuditResult<Vec<&'a Column>> {
    let missing: Vec<String> = candidates
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| df.column(c).is_err())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AuditError::InvalidSelection { missing });
    }

    Ok(candidates
        .iter()
        .filter_map(|c| df.column(c.as_ref()).ok())
        .collect())
}

fn chi_squared_sf(statistic: f64, dof: f64) -> AuditResult<f64> {
    let dist = ChiSquared::new(dof).map_err(|e| AuditError::Statistic(e.to_string()))?;
    Ok(dist.sf(statistic))
}

/// Pearson chi-squared test on a contingency table.
///
/// Applies the Yates continuity correction when there is one degree of
/// freedom. A table with a single row or column has p = 1.
fn chi_square_pvalue(table: &ContingencyTable) -> AuditResult<f64> {
    let (n_rows, n_cols) = table.shape();
    if n_rows < 2 || n_cols < 2 {
        return Ok(1.0);
    }

    let dof = (n_rows - 1) * (n_cols - 1);
    let total = table.total as f64;

    let mut statistic = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = table.row_totals[i] as f64 * table.col_totals[j] as f64 / total;
            let mut diff = (observed as f64 - expected).abs();
            if dof == 1 {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff * diff / expected;
        }
    }

    chi_squared_sf(statistic, dof as f64)
}

fn entropy(totals: &[u64], n: f64) -> f64 {
    totals
        .iter()
        .filter(|&&t| t > 0)
        .map(|&t| {
            let p = t as f64 / n;
            -p * p.ln()
        })
        .sum()
}

fn mutual_info(table: &ContingencyTable) -> f64 {
    let n = table.total as f64;
    let mut mi = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &nij) in row.iter().enumerate() {
            if nij == 0 {
                continue;
            }
            let nij = nij as f64;
            let outer = table.row_totals[i] as f64 * table.col_totals[j] as f64;
            mi += nij / n * (n * nij / outer).ln();
        }
    }
    mi.max(0.0)
}

/// Expected mutual information of two random partitions with the table's margins
/// (hypergeometric model).
fn expected_mutual_info(table: &ContingencyTable) -> f64 {
    let n = table.total;
    let nf = n as f64;
    let ln_n_fact = ln_gamma(nf + 1.0);

    let mut emi = 0.0;
    for &a in &table.row_totals {
        for &b in &table.col_totals {
            let start = (a + b).saturating_sub(n).max(1);
            let end = a.min(b);
            if start > end {
                continue;
            }

            let (af, bf) = (a as f64, b as f64);
            let fixed = ln_gamma(af + 1.0) + ln_gamma(bf + 1.0) + ln_gamma(nf - af + 1.0)
                + ln_gamma(nf - bf + 1.0)
                - ln_n_fact;

            for nij in start..=end {
                let x = nij as f64;
                let log_prob = fixed
                    - ln_gamma(x + 1.0)
                    - ln_gamma(af - x + 1.0)
                    - ln_gamma(bf - x + 1.0)
                    - ln_gamma(nf - af - bf + x + 1.0);
                let term = x / nf * ((nf * x).ln() - (af * bf).ln());
                emi += term * log_prob.exp();
            }
        }
    }
    emi
}

/// Adjusted mutual information with arithmetic-mean normalisation.
fn adjusted_mutual_info(table: &ContingencyTable) -> f64 {
    let (n_rows, n_cols) = table.shape();
    if (n_rows == 1 && n_cols == 1) || (n_rows == 0 && n_cols == 0) {
        return 1.0;
    }

    let n = table.total as f64;
    let mi = mutual_info(table);
    let emi = expected_mutual_info(table);
    let normalizer = (entropy(&table.row_totals, n) + entropy(&table.col_totals, n)) / 2.0;

    let mut denominator = normalizer - emi;
    denominator = if denominator < 0.0 {
        denominator.min(-f64::EPSILON)
    } else {
        denominator.max(f64::EPSILON)
    };

    (mi - emi) / denominator
}

/// Kruskal–Wallis H test from a (sorted value × group) contingency table.
///
/// Rows are the distinct feature values in ascending order, so midranks follow
/// directly from the row margins.
fn kruskal_pvalue(table: &ContingencyTable) -> AuditResult<f64> {
    let (_, n_groups) = table.shape();
    let n = table.total as f64;
    if n_groups < 2 || n < 2.0 {
        return Ok(f64::NAN);
    }

    let mut rank_sums = vec![0.0; n_groups];
    let mut cumulative = 0.0;
    let mut tie_sum = 0.0;

    for (row, &t) in table.counts.iter().zip(table.row_totals.iter()) {
        let t = t as f64;
        let midrank = cumulative + (t + 1.0) / 2.0;
        cumulative += t;
        tie_sum += t * t * t - t;

        for (sum, &count) in rank_sums.iter_mut().zip(row.iter()) {
            *sum += count as f64 * midrank;
        }
    }

    let tie_correction = 1.0 - tie_sum / (n * n * n - n);
    if tie_correction <= 0.0 {
        return Ok(f64::NAN);
    }

    let weighted: f64 = rank_sums
        .iter()
        .zip(table.col_totals.iter())
        .map(|(r, &size)| r * r / size as f64)
        .sum();
    let h = (12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0)) / tie_correction;

    chi_squared_sf(h.max(0.0), (n_groups - 1) as f64)
}
