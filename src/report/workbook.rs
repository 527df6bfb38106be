//! Workbook export: one summary sheet, one sheet per feature, linked both ways
//!
//! The workbook is a zip archive of CSV sheets plus a `workbook.json`
//! manifest that records the sheets and every cross-reference link.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::anchors::{assign_anchors, SHEET_NAME_LIMIT};
use super::table::TabularView;
use crate::pipeline::{FeatureTables, SummaryTable};
use crate::utils::{create_progress_bar, finish_with_success};

/// Name of the manifest entry inside the workbook archive
pub const MANIFEST_NAME: &str = "workbook.json";

/// Persists an audit (summary plus per-feature tables) to a destination.
pub trait ReportSink {
    fn write_report(
        &mut self,
        summary: &SummaryTable,
        features: &FeatureTables,
        destination: &Path,
    ) -> Result<()>;
}

/// Layout options of the exported workbook
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    pub summary_sheet: String,
    /// Maximum sheet name length; longer feature names are truncated
    pub sheet_name_limit: usize,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            summary_sheet: "Summary".to_string(),
            sheet_name_limit: SHEET_NAME_LIMIT,
        }
    }
}

/// A sheet inside the workbook
#[derive(Debug, Clone, Serialize)]
pub struct SheetEntry {
    pub name: String,
    pub file: String,
    /// Full feature name, absent for the summary sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

/// A cross-reference from one cell to the top-left cell of another sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLink {
    pub from_sheet: String,
    pub from_cell: String,
    pub to_sheet: String,
    pub to_cell: String,
}

impl SheetLink {
    /// Spreadsheet-style target, e.g. `#Summary!A1`
    pub fn target(&self) -> String {
        format!("#{}!{}", self.to_sheet, self.to_cell)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkbookManifest {
    pub generated_at: String,
    pub dataudit_version: String,
    pub summary_sheet: String,
    pub sheets: Vec<SheetEntry>,
    pub links: Vec<SheetLink>,
}

/// Writes the audit as a zipped workbook of CSV sheets.
#[derive(Debug, Clone, Default)]
pub struct WorkbookSink {
    pub options: WorkbookOptions,
}

impl WorkbookSink {
    pub fn new(options: WorkbookOptions) -> Self {
        Self { options }
    }

    /// Sheets and links for an audit, features in summary row order.
    pub fn plan(&self, summary: &SummaryTable, features: &FeatureTables) -> WorkbookManifest {
        let summary_sheet = self.options.summary_sheet.clone();

        // Summary order first, then any table without a summary row
        let mut ordered: Vec<&str> = summary
            .rows()
            .iter()
            .map(|r| r.variable.as_str())
            .filter(|v| features.contains_key(*v))
            .collect();
        for name in features.keys() {
            if summary.row(name).is_none() {
                ordered.push(name.as_str());
            }
        }

        let anchors = assign_anchors(
            ordered.iter().copied(),
            self.options.sheet_name_limit,
            &[summary_sheet.as_str()],
        );

        let mut sheets = vec![SheetEntry {
            name: summary_sheet.clone(),
            file: format!("{}.csv", summary_sheet),
            feature: None,
        }];
        let mut links = Vec::new();

        for (feature, anchor) in &anchors {
            sheets.push(SheetEntry {
                name: anchor.clone(),
                file: format!("{}.csv", anchor),
                feature: Some(feature.clone()),
            });

            // Header is row 1; VARIABLE sits in column B after the SHEET column
            if let Some(idx) = summary.rows().iter().position(|r| &r.variable == feature) {
                links.push(SheetLink {
                    from_sheet: summary_sheet.clone(),
                    from_cell: format!("B{}", idx + 2),
                    to_sheet: anchor.clone(),
                    to_cell: "A1".to_string(),
                });
            }
            links.push(SheetLink {
                from_sheet: anchor.clone(),
                from_cell: "A1".to_string(),
                to_sheet: summary_sheet.clone(),
                to_cell: "A1".to_string(),
            });
        }

        WorkbookManifest {
            generated_at: Utc::now().to_rfc3339(),
            dataudit_version: env!("CARGO_PKG_VERSION").to_string(),
            summary_sheet,
            sheets,
            links,
        }
    }
}

impl ReportSink for WorkbookSink {
    fn write_report(
        &mut self,
        summary: &SummaryTable,
        features: &FeatureTables,
        destination: &Path,
    ) -> Result<()> {
        let manifest = self.plan(summary, features);

        let zip_file = std::fs::File::create(destination)
            .with_context(|| format!("Failed to create workbook: {}", destination.display()))?;
        let mut zip = ZipWriter::new(zip_file);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        // Summary sheet with a leading SHEET column naming each row's feature sheet
        let sheet_of = |variable: &str| -> Option<String> {
            manifest
                .sheets
                .iter()
                .find(|s| s.feature.as_deref() == Some(variable))
                .map(|s| s.name.clone())
        };
        let sheet_column: Vec<Option<String>> = summary
            .rows()
            .iter()
            .map(|r| sheet_of(&r.variable))
            .collect();
        let mut summary_df = summary
            .to_dataframe()
            .context("Failed to build summary sheet")?;
        summary_df.insert_column(0, Column::new("SHEET".into(), sheet_column))?;

        let summary_file = &manifest.sheets[0].file;
        zip.start_file(summary_file.as_str(), options)
            .with_context(|| format!("Failed to add {} to workbook", summary_file))?;
        zip.write_all(&to_csv_bytes(&mut summary_df)?)?;

        let pb = create_progress_bar(features.len() as u64, "Exporting");
        for sheet in manifest.sheets.iter().skip(1) {
            let Some(feature) = sheet.feature.as_deref() else {
                continue;
            };
            let Some(table) = features.get(feature) else {
                continue;
            };
            pb.set_message(format!("Exporting {}", feature));

            let mut df = table
                .to_dataframe()
                .with_context(|| format!("Failed to build sheet for '{}'", feature))?;
            zip.start_file(sheet.file.as_str(), options)
                .with_context(|| format!("Failed to add {} to workbook", sheet.file))?;
            zip.write_all(&to_csv_bytes(&mut df)?)?;
            pb.inc(1);
        }
        finish_with_success(&pb, &format!("Exported {} feature sheet(s)", features.len()));

        let json = serde_json::to_string_pretty(&manifest)
            .context("Failed to serialize workbook manifest to JSON")?;
        zip.start_file(MANIFEST_NAME, options)
            .context("Failed to add manifest to workbook")?;
        zip.write_all(json.as_bytes())?;

        zip.finish().context("Failed to finalize workbook")?;

        log::info!(
            "Wrote workbook with {} sheet(s) to {}",
            manifest.sheets.len(),
            destination.display()
        );

        Ok(())
    }
}

fn to_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .finish(df)
        .context("Failed to write CSV sheet")?;
    Ok(buf)
}
