//! Typed cell extraction from dataframe columns
//!
//! Every column is read into a vector of [`CellValue`] so that frequency
//! tables, contingency tables and rank statistics can share one notion of
//! "distinct value" and one ordering. Nulls and floating-point NaN are both
//! treated as [`CellValue::Missing`].

use std::cmp::Ordering;
use std::fmt;

use polars::prelude::*;
use serde::Serialize;

/// Display token used for the missing-value bucket
pub const MISSING_TOKEN: &str = "NA";

/// A single cell of a dataset column.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Boolean(bool),
    Integer(i64),
    /// Unsigned 64-bit values, kept apart so values above `i64::MAX` survive
    UInteger(u64),
    Float(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(n) => Some(*n as f64),
            CellValue::UInteger(n) => Some(*n as f64),
            CellValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            CellValue::Boolean(_) => 0,
            CellValue::Integer(_) => 1,
            CellValue::UInteger(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Text(_) => 4,
            CellValue::Missing => 5,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending within a type; `Missing` sorts after every observed value.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::UInteger(a), CellValue::UInteger(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => {
                normalize_zero(*a).total_cmp(&normalize_zero(*b))
            }
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Missing, CellValue::Missing) => Ordering::Equal,
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::UInteger(n) => write!(f, "{}", n),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Missing => f.write_str(MISSING_TOKEN),
        }
    }
}

// -0.0 and 0.0 are the same value for counting purposes
fn normalize_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

/// Read a column into typed cells, one per row.
pub fn column_values(col: &Column) -> PolarsResult<Vec<CellValue>> {
    let values: Vec<CellValue> = match col.dtype() {
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::Boolean))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map_or(CellValue::Missing, CellValue::Integer))
                .collect()
        }
        DataType::UInt64 => col
            .u64()?
            .into_iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::UInteger))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| match v {
                    Some(x) if !x.is_nan() => CellValue::Float(x),
                    _ => CellValue::Missing,
                })
                .collect()
        }
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map_or(CellValue::Missing, |s| CellValue::Text(s.to_string())))
            .collect(),
        _ => {
            // Categorical, temporal and nested types are audited by their string rendering
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map_or(CellValue::Missing, |s| CellValue::Text(s.to_string())))
                .collect()
        }
    };

    Ok(values)
}

/// Non-missing numeric values of a column, in row order.
///
/// Returns `None` when the column is not an integer or float column.
pub fn numeric_values(col: &Column) -> PolarsResult<Option<Vec<f64>>> {
    if !col.dtype().is_primitive_numeric() {
        return Ok(None);
    }

    let cast = col.cast(&DataType::Float64)?;
    let values = cast
        .f64()?
        .into_iter()
        .flatten()
        .filter(|x| !x.is_nan())
        .collect();

    Ok(Some(values))
}

/// Numeric values with their missing positions preserved, for pairwise statistics.
pub fn optional_numeric_values(col: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sorts_last() {
        let mut values = vec![
            CellValue::Missing,
            CellValue::Integer(3),
            CellValue::Integer(-1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![CellValue::Integer(-1), CellValue::Integer(3), CellValue::Missing]
        );
    }

    #[test]
    fn test_nan_and_null_are_missing() {
        let df = df! {
            "x" => [Some(1.0f64), None, Some(f64::NAN)],
        }
        .unwrap();

        let values = column_values(df.column("x").unwrap()).unwrap();
        assert_eq!(values[0], CellValue::Float(1.0));
        assert!(values[1].is_missing());
        assert!(values[2].is_missing());
    }

    #[test]
    fn test_string_column_values() {
        let df = df! {
            "s" => [Some("a"), None, Some("b")],
        }
        .unwrap();

        let values = column_values(df.column("s").unwrap()).unwrap();
        assert_eq!(values[0], CellValue::Text("a".to_string()));
        assert!(values[1].is_missing());
        assert_eq!(values[2].to_string(), "b");
    }

    #[test]
    fn test_numeric_values_skips_non_numeric() {
        let df = df! {
            "s" => ["a", "b"],
            "n" => [Some(1i32), None],
        }
        .unwrap();

        assert!(numeric_values(df.column("s").unwrap()).unwrap().is_none());
        assert_eq!(
            numeric_values(df.column("n").unwrap()).unwrap(),
            Some(vec![1.0])
        );
    }

    #[test]
    fn test_unsigned_values_above_i64_range() {
        let df = df! {
            "id" => [u64::MAX, 1, 2, 3],
        }
        .unwrap();

        let values = column_values(df.column("id").unwrap()).unwrap();
        assert!(values.iter().all(|v| !v.is_missing()));
        assert_eq!(values[0], CellValue::UInteger(u64::MAX));
        assert_eq!(values[0].to_string(), "18446744073709551615");
        assert!(values[1] < values[0]);
    }

    #[test]
    fn test_signed_zero_is_one_value() {
        assert_eq!(CellValue::Float(0.0), CellValue::Float(-0.0));
    }
}
