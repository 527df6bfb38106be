//! Cross-tabulation of two equally long columns

use std::collections::BTreeMap;

use super::values::CellValue;

/// Joint counts of (row value, column value) with row and column margins.
///
/// Labels are sorted ascending with the missing bucket last, the same order
/// as the frequency tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    pub row_labels: Vec<CellValue>,
    pub col_labels: Vec<CellValue>,
    /// `counts[i][j]` = rows with `row_labels[i]` and `col_labels[j]`
    pub counts: Vec<Vec<u64>>,
    pub row_totals: Vec<u64>,
    pub col_totals: Vec<u64>,
    pub total: u64,
}

impl ContingencyTable {
    /// Cross-tabulate every pair, missing buckets included.
    pub fn new(rows: &[CellValue], cols: &[CellValue]) -> Self {
        Self::from_pairs(rows.iter().zip(cols.iter()))
    }

    /// Cross-tabulate only pairs where neither side is missing.
    pub fn complete(rows: &[CellValue], cols: &[CellValue]) -> Self {
        Self::from_pairs(
            rows.iter()
                .zip(cols.iter())
                .filter(|(r, c)| !r.is_missing() && !c.is_missing()),
        )
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (&'a CellValue, &'a CellValue)>) -> Self {
        let mut joint: BTreeMap<(&CellValue, &CellValue), u64> = BTreeMap::new();
        let mut row_index: BTreeMap<&CellValue, usize> = BTreeMap::new();
        let mut col_index: BTreeMap<&CellValue, usize> = BTreeMap::new();

        for (r, c) in pairs {
            *joint.entry((r, c)).or_insert(0) += 1;
            row_index.entry(r).or_insert(0);
            col_index.entry(c).or_insert(0);
        }

        // BTreeMap iteration gives the sorted label order
        for (i, slot) in row_index.values_mut().enumerate() {
            *slot = i;
        }
        for (j, slot) in col_index.values_mut().enumerate() {
            *slot = j;
        }

        let mut counts = vec![vec![0u64; col_index.len()]; row_index.len()];
        for ((r, c), n) in &joint {
            counts[row_index[r]][col_index[c]] = *n;
        }

        let row_totals: Vec<u64> = counts.iter().map(|row| row.iter().sum()).collect();
        let col_totals: Vec<u64> = (0..col_index.len())
            .map(|j| counts.iter().map(|row| row[j]).sum())
            .collect();
        let total = row_totals.iter().sum();

        Self {
            row_labels: row_index.keys().map(|v| (*v).clone()).collect(),
            col_labels: col_index.keys().map(|v| (*v).clone()).collect(),
            counts,
            row_totals,
            col_totals,
            total,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_margins() {
        let rows = vec![text("a"), text("a"), text("b"), CellValue::Missing];
        let cols = vec![
            CellValue::Integer(0),
            CellValue::Integer(1),
            CellValue::Integer(1),
            CellValue::Integer(0),
        ];

        let table = ContingencyTable::new(&rows, &cols);
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.row_labels[2], CellValue::Missing);
        assert_eq!(table.counts, vec![vec![1, 1], vec![0, 1], vec![1, 0]]);
        assert_eq!(table.row_totals, vec![2, 1, 1]);
        assert_eq!(table.col_totals, vec![2, 2]);
        assert_eq!(table.total, 4);
    }

    #[test]
    fn test_complete_drops_missing() {
        let rows = vec![text("a"), CellValue::Missing, text("b")];
        let cols = vec![CellValue::Integer(0), CellValue::Integer(1), CellValue::Missing];

        let table = ContingencyTable::complete(&rows, &cols);
        assert_eq!(table.shape(), (1, 1));
        assert_eq!(table.total, 1);
    }
}
