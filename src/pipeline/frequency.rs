//! Per-column value frequency tables

use std::collections::BTreeMap;

use serde::Serialize;

use super::stats::round_ratio;
use super::values::CellValue;

/// One distinct value of a column with its absolute and relative frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub value: CellValue,
    /// Absolute count ("# Total")
    pub count: usize,
    /// Share of all rows, rounded to 4 decimals ("% Total")
    pub share: f64,
}

/// Value counts for a single feature, ordered by value with the missing bucket last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub feature: String,
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    /// Total number of rows counted, missing entries included.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn get(&self, value: &CellValue) -> Option<&FrequencyRow> {
        self.rows.iter().find(|r| &r.value == value)
    }

    pub fn missing(&self) -> Option<&FrequencyRow> {
        self.rows.iter().find(|r| r.value.is_missing())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tabulate every distinct value of a column, the missing marker included.
///
/// An empty column yields an empty table; an all-missing column yields a
/// single missing-bucket row.
pub fn tabulate(feature: &str, values: &[CellValue]) -> FrequencyTable {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let total = values.len() as f64;
    let rows = counts
        .into_iter()
        .map(|(value, count)| FrequencyRow {
            value: value.clone(),
            count,
            share: round_ratio(count as f64 / total),
        })
        .collect();

    FrequencyTable {
        feature: feature.to_string(),
        rows,
    }
}
