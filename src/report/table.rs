//! Tabular views over audit results and their terminal display

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Table};
use console::style;
use polars::prelude::*;

use crate::pipeline::{
    AssociationVector, CorrelationReport, FrequencyTable, NumericStats, Ratio, SummaryTable,
};

/// A table that can be displayed as text or converted into a dataframe.
pub trait TabularView {
    fn title(&self) -> String;
    fn column_names(&self) -> Vec<String>;
    /// Display strings, one inner vector per row, aligned with `column_names`
    fn cells(&self) -> Vec<Vec<String>>;
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

/// Renders a table for human inspection.
pub trait DisplaySink {
    fn display(&mut self, table: &dyn TabularView);
}

/// Prints tables to stdout with comfy-table.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    /// Maximum number of rows printed per table, all when `None`
    pub max_rows: Option<usize>,
}

impl TerminalDisplay {
    pub fn render(&self, table: &dyn TabularView) -> Table {
        let mut out = Table::new();
        out.load_preset(UTF8_FULL_CONDENSED);
        out.set_header(
            table
                .column_names()
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

        let rows = table.cells();
        let limit = self.max_rows.unwrap_or(rows.len());
        for row in rows.into_iter().take(limit) {
            out.add_row(row);
        }
        out
    }
}

impl DisplaySink for TerminalDisplay {
    fn display(&mut self, table: &dyn TabularView) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style(table.title().to_uppercase()).white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());

        // Indent the table
        for line in self.render(table).to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Write any table as CSV.
pub fn export_table_csv(table: &dyn TabularView, output_path: &Path) -> Result<()> {
    let mut df = table
        .to_dataframe()
        .with_context(|| format!("Failed to build table '{}'", table.title()))?;

    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create CSV file: {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", output_path.display()))?;
    file.flush()?;

    Ok(())
}

pub(crate) fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{:.4}", v),
        None => String::new(),
    }
}

fn format_ratio(ratio: Ratio) -> String {
    match ratio {
        Ratio::Defined(v) => format!("{:.4}", v),
        Ratio::Undefined => "undefined".to_string(),
    }
}

fn stat(stats: &Option<NumericStats>, pick: fn(&NumericStats) -> Option<f64>) -> Option<f64> {
    stats.as_ref().and_then(pick)
}

impl TabularView for SummaryTable {
    fn title(&self) -> String {
        "Summary".to_string()
    }

    fn column_names(&self) -> Vec<String> {
        self.headers()
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows()
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let mut cells = vec![
                    r.variable.clone(),
                    r.label.clone(),
                    r.dtype.clone(),
                    format_ratio(r.pct_unique),
                    format_ratio(r.pct_missing),
                    format_number(stat(&r.stats, |s| s.mean)),
                    format_number(stat(&r.stats, |s| s.std)),
                    format_number(stat(&r.stats, |s| s.min)),
                    format_number(stat(&r.stats, |s| s.median)),
                    format_number(stat(&r.stats, |s| s.max)),
                    r.comment.clone(),
                ];
                cells.extend(self.extensions().iter().map(|c| format_number(c.values[idx])));
                cells
            })
            .collect()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = self.rows();
        let variables: Vec<&str> = rows.iter().map(|r| r.variable.as_str()).collect();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        let dtypes: Vec<&str> = rows.iter().map(|r| r.dtype.as_str()).collect();
        let comments: Vec<&str> = rows.iter().map(|r| r.comment.as_str()).collect();
        let num = |pick: fn(&NumericStats) -> Option<f64>| -> Vec<Option<f64>> {
            rows.iter().map(|r| stat(&r.stats, pick)).collect()
        };

        let mut columns = vec![
            Column::new("VARIABLE".into(), variables),
            Column::new("LABEL".into(), labels),
            Column::new("TYPE".into(), dtypes),
            Column::new(
                "% UNIQUE".into(),
                rows.iter().map(|r| r.pct_unique.value()).collect::<Vec<_>>(),
            ),
            Column::new(
                "% MISSING".into(),
                rows.iter().map(|r| r.pct_missing.value()).collect::<Vec<_>>(),
            ),
            Column::new("MEAN".into(), num(|s| s.mean)),
            Column::new("STD".into(), num(|s| s.std)),
            Column::new("MIN".into(), num(|s| s.min)),
            Column::new("50%".into(), num(|s| s.median)),
            Column::new("MAX".into(), num(|s| s.max)),
            Column::new("COMMENT".into(), comments),
        ];
        for ext in self.extensions() {
            columns.push(Column::new(ext.name.as_str().into(), ext.values.clone()));
        }

        DataFrame::new(columns)
    }
}

impl TabularView for FrequencyTable {
    fn title(&self) -> String {
        self.feature.clone()
    }

    fn column_names(&self) -> Vec<String> {
        vec!["Value".into(), "# Total".into(), "% Total".into()]
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![r.value.to_string(), r.count.to_string(), format!("{:.4}", r.share)])
            .collect()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let values: Vec<String> = self.rows.iter().map(|r| r.value.to_string()).collect();
        let counts: Vec<u64> = self.rows.iter().map(|r| r.count as u64).collect();
        let shares: Vec<f64> = self.rows.iter().map(|r| r.share).collect();

        DataFrame::new(vec![
            Column::new("Value".into(), values),
            Column::new("# Total".into(), counts),
            Column::new("% Total".into(), shares),
        ])
    }
}

impl TabularView for CorrelationReport {
    fn title(&self) -> String {
        "Correlation".to_string()
    }

    fn column_names(&self) -> Vec<String> {
        vec![
            "variable_x".into(),
            "variable_y".into(),
            "pearson".into(),
            "spearman".into(),
        ]
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.variable_x.clone(),
                    r.variable_y.clone(),
                    format!("{:.4}", r.pearson),
                    format!("{:.4}", r.spearman),
                ]
            })
            .collect()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let xs: Vec<&str> = self.rows.iter().map(|r| r.variable_x.as_str()).collect();
        let ys: Vec<&str> = self.rows.iter().map(|r| r.variable_y.as_str()).collect();
        let p: Vec<f64> = self.rows.iter().map(|r| r.pearson).collect();
        let s: Vec<f64> = self.rows.iter().map(|r| r.spearman).collect();

        DataFrame::new(vec![
            Column::new("variable_x".into(), xs),
            Column::new("variable_y".into(), ys),
            Column::new("pearson".into(), p),
            Column::new("spearman".into(), s),
        ])
    }
}

impl TabularView for AssociationVector {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn column_names(&self) -> Vec<String> {
        vec!["VARIABLE".into(), self.name.clone()]
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|(name, value)| vec![name.clone(), format!("{:.4}", value)])
            .collect()
    }

    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        AssociationVector::to_dataframe(self)
    }
}
