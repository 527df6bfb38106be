//! Data audit engine: summary table plus one frequency table per feature
//!
//! The engine is an explicit state value. [`AuditState::Unfitted`] until a
//! successful `fit`, then [`AuditState::Fitted`] holding its own copy of the
//! audited columns, the summary table and the per-feature frequency tables.
//! Every read, extend and export operation goes through [`DataAudit::fitted`],
//! so the "fit first" precondition is checked in one place.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;

use super::association::AssociationVector;
use super::frequency::{tabulate, FrequencyTable};
use super::summary::{summarize_column, SummaryRow};
use super::values::column_values;
use crate::error::{AuditError, AuditResult};
use crate::report::{DisplaySink, ReportSink};
use crate::utils::{create_progress_bar, finish_with_success};

/// Fixed, upper-cased header set of the summary table
pub const SUMMARY_HEADERS: [&str; 11] = [
    "VARIABLE",
    "LABEL",
    "TYPE",
    "% UNIQUE",
    "% MISSING",
    "MEAN",
    "STD",
    "MIN",
    "50%",
    "MAX",
    "COMMENT",
];

/// Frequency tables keyed by the full, untruncated feature name
pub type FeatureTables = BTreeMap<String, FrequencyTable>;

/// An externally computed metric column left-joined onto the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricColumn {
    pub name: String,
    /// One cell per summary row, `None` where the join found no value
    pub values: Vec<Option<f64>>,
}

/// Summary rows in dataset column order, plus any extension columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
    extensions: Vec<MetricColumn>,
}

impl SummaryTable {
    pub fn new(rows: Vec<SummaryRow>) -> Self {
        Self {
            rows,
            extensions: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn extensions(&self) -> &[MetricColumn] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fixed headers followed by extension column names in insertion order.
    pub fn headers(&self) -> Vec<String> {
        SUMMARY_HEADERS
            .iter()
            .map(|h| h.to_string())
            .chain(self.extensions.iter().map(|c| c.name.clone()))
            .collect()
    }

    pub fn row(&self, variable: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.variable == variable)
    }

    pub fn extension(&self, name: &str) -> Option<&MetricColumn> {
        self.extensions.iter().find(|c| c.name == name)
    }

    /// Value of an extension column for one variable.
    pub fn metric(&self, variable: &str, column: &str) -> Option<f64> {
        let idx = self.rows.iter().position(|r| r.variable == variable)?;
        self.extension(column)?.values[idx]
    }

    fn row_mut(&mut self, variable: &str) -> AuditResult<&mut SummaryRow> {
        self.rows
            .iter_mut()
            .find(|r| r.variable == variable)
            .ok_or_else(|| AuditError::invalid_selection([variable]))
    }

    /// Left-join a named vector on the variable name.
    ///
    /// Every existing row is kept. Rows without a match, and non-finite
    /// values, become null cells. A column with the same name is replaced.
    fn left_join(&mut self, vector: &AssociationVector) {
        let lookup: BTreeMap<&str, f64> = vector
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();

        let values: Vec<Option<f64>> = self
            .rows
            .iter()
            .map(|r| {
                lookup
                    .get(r.variable.as_str())
                    .copied()
                    .filter(|v| v.is_finite())
            })
            .collect();

        let unmatched = values.iter().filter(|v| v.is_none()).count();
        if unmatched > 0 {
            log::warn!(
                "{} of {} summary rows have no value in column '{}'",
                unmatched,
                self.rows.len(),
                vector.name
            );
        }

        let known: HashSet<&str> = self.rows.iter().map(|r| r.variable.as_str()).collect();
        let dropped = lookup.keys().filter(|k| !known.contains(*k)).count();
        if dropped > 0 {
            log::debug!(
                "{} entries of '{}' match no audited variable and were ignored",
                dropped,
                vector.name
            );
        }

        let column = MetricColumn {
            name: vector.name.clone(),
            values,
        };

        match self.extensions.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => {
                log::warn!("Replacing existing summary column '{}'", column.name);
                *existing = column;
            }
            None => self.extensions.push(column),
        }
    }
}

/// Results of a successful fit.
#[derive(Debug, Clone)]
pub struct FittedAudit {
    data: DataFrame,
    summary: SummaryTable,
    features: FeatureTables,
}

impl FittedAudit {
    /// Audit every column of `df`, or only the `selection` when given.
    ///
    /// Included columns keep the dataset's column order. Fails with
    /// `InvalidSelection` when a selected name is not a column of `df`.
    pub fn from_dataframe<S: AsRef<str>>(
        df: &DataFrame,
        selection: Option<&[S]>,
    ) -> AuditResult<Self> {
        let data = select_columns(df, selection)?;

        let columns = data.get_columns();
        let pb = create_progress_bar(columns.len() as u64, "Auditing columns");

        let mut rows = Vec::with_capacity(columns.len());
        let mut features = FeatureTables::new();

        for col in columns {
            let name = col.name().to_string();
            pb.set_message(format!("Processing {}", name));

            let values = column_values(col)?;
            rows.push(summarize_column(col, &values)?);
            features.insert(name, tabulate(col.name(), &values));

            pb.inc(1);
        }

        finish_with_success(&pb, &format!("Audited {} column(s)", rows.len()));

        Ok(Self {
            data,
            summary: SummaryTable::new(rows),
            features,
        })
    }

    /// The private copy of the audited columns.
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn summary(&self) -> &SummaryTable {
        &self.summary
    }

    pub fn features(&self) -> &FeatureTables {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<&FrequencyTable> {
        self.features.get(name)
    }
}

/// Lifecycle of a [`DataAudit`].
#[derive(Debug, Clone, Default)]
pub enum AuditState {
    #[default]
    Unfitted,
    Fitted(FittedAudit),
}

/// Univariate audit of a dataset.
#[derive(Debug, Clone, Default)]
pub struct DataAudit {
    state: AuditState,
}

impl DataAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuditState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, AuditState::Fitted(_))
    }

    /// Audit every column of `df`. Replaces any earlier fit.
    pub fn fit(&mut self, df: &DataFrame) -> AuditResult<()> {
        self.fit_inner::<&str>(df, None)
    }

    /// Audit only the selected columns of `df`. Replaces any earlier fit.
    pub fn fit_selection<S: AsRef<str>>(
        &mut self,
        df: &DataFrame,
        selection: &[S],
    ) -> AuditResult<()> {
        self.fit_inner(df, Some(selection))
    }

    fn fit_inner<S: AsRef<str>>(
        &mut self,
        df: &DataFrame,
        selection: Option<&[S]>,
    ) -> AuditResult<()> {
        // State only changes once the new fit is complete
        let fitted = FittedAudit::from_dataframe(df, selection)?;
        self.state = AuditState::Fitted(fitted);
        Ok(())
    }

    pub fn fitted(&self) -> AuditResult<&FittedAudit> {
        match &self.state {
            AuditState::Fitted(fitted) => Ok(fitted),
            AuditState::Unfitted => Err(AuditError::NotFitted),
        }
    }

    fn fitted_mut(&mut self) -> AuditResult<&mut FittedAudit> {
        match &mut self.state {
            AuditState::Fitted(fitted) => Ok(fitted),
            AuditState::Unfitted => Err(AuditError::NotFitted),
        }
    }

    /// Left-join each vector onto the summary table, in order.
    pub fn extend(&mut self, columns: &[AssociationVector]) -> AuditResult<()> {
        let fitted = self.fitted_mut()?;
        for column in columns {
            fitted.summary.left_join(column);
        }
        Ok(())
    }

    pub fn set_label(&mut self, variable: &str, label: impl Into<String>) -> AuditResult<()> {
        self.fitted_mut()?.summary.row_mut(variable)?.label = label.into();
        Ok(())
    }

    pub fn set_comment(&mut self, variable: &str, comment: impl Into<String>) -> AuditResult<()> {
        self.fitted_mut()?.summary.row_mut(variable)?.comment = comment.into();
        Ok(())
    }

    /// A copy of the summary table.
    pub fn view_summary(&self) -> AuditResult<SummaryTable> {
        Ok(self.fitted()?.summary.clone())
    }

    /// A copy of one feature's frequency table.
    ///
    /// Returns `Ok(None)` and logs a warning when the feature has no table.
    pub fn view_feature(&self, name: &str) -> AuditResult<Option<FrequencyTable>> {
        let fitted = self.fitted()?;
        match fitted.feature(name) {
            Some(table) => Ok(Some(table.clone())),
            None => {
                log::warn!("Feature {} not present", name);
                Ok(None)
            }
        }
    }

    pub fn display_summary(&self, sink: &mut dyn DisplaySink) -> AuditResult<()> {
        let fitted = self.fitted()?;
        sink.display(&fitted.summary);
        Ok(())
    }

    /// Display one feature's table; returns `false` when there is none.
    pub fn display_feature(&self, name: &str, sink: &mut dyn DisplaySink) -> AuditResult<bool> {
        match self.view_feature(name)? {
            Some(table) => {
                sink.display(&table);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Hand the summary and frequency tables to a report sink.
    pub fn export(&self, sink: &mut dyn ReportSink, destination: &Path) -> AuditResult<()> {
        let fitted = self.fitted()?;
        sink.write_report(&fitted.summary, &fitted.features, destination)?;
        Ok(())
    }
}

/// Copy the selected columns of `df`, in dataset order.
fn select_columns<S: AsRef<str>>(
    df: &DataFrame,
    selection: Option<&[S]>,
) -> AuditResult<DataFrame> {
    let Some(selection) = selection else {
        return Ok(df.clone());
    };

    let present: HashSet<&str> = df.get_columns().iter().map(|c| c.name().as_str()).collect();
    let missing: Vec<String> = selection
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !present.contains(s))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AuditError::InvalidSelection { missing });
    }

    let wanted: HashSet<&str> = selection.iter().map(|s| s.as_ref()).collect();
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|c| wanted.contains(c.name().as_str()))
        .cloned()
        .collect();

    Ok(DataFrame::new(columns)?)
}
