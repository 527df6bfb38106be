//! dataudit: univariate data audit CLI
//!
//! Loads a dataset, profiles the selected columns, optionally scores them
//! against a target and exports the audit as a linked workbook.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use polars::prelude::*;

use dataudit::cli::Cli;
use dataudit::pipeline::{
    adjusted_mutual_information, chi_square_pvalues, correlation_report, dataset_stats,
    kruskal_pvalues, load_dataset, AssociationVector, DataAudit, AMI, PVALUE_CHI_SQUARE,
    PVALUE_KRUSKAL,
};
use dataudit::report::{export_table_csv, TerminalDisplay, WorkbookSink};
use dataudit::utils::styling::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_success,
};
use dataudit::utils::{create_spinner, finish_with_success, ProjectPaths};
use dataudit::AuditError;

const WORKBOOK_FILE: &str = "data_audit.zip";
const CORRELATION_FILE: &str = "correlation.csv";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let paths = ProjectPaths::new(&cli.project_root, &cli.iteration);
    let output_dir = paths.iteration_dir(None)?;
    let workbook_path = cli
        .output
        .clone()
        .unwrap_or_else(|| output_dir.join(WORKBOOK_FILE));

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        cli.target.as_deref(),
        &workbook_path,
        cli.columns.len(),
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(&cli.input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols, memory_mb) = dataset_stats(&df);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_elapsed(step_start);

    if let Some(target) = &cli.target {
        if df.column(target).is_err() {
            anyhow::bail!(
                "Target column '{}' not found in dataset. Available columns: {:?}",
                target,
                df.get_column_names()
            );
        }
    }

    // Step 2: Univariate audit
    print_step_header(2, "Univariate Audit");
    let step_start = Instant::now();
    let mut audit = DataAudit::new();
    match cli.selection() {
        Some(selection) => audit.fit_selection(&df, selection)?,
        None => audit.fit(&df)?,
    }
    let audited = audit.fitted()?.summary().len();
    print_count("audited column(s)", audited, None);
    print_success("Summary and frequency tables built");
    print_elapsed(step_start);

    // Step 3: Target association
    if let Some(target) = &cli.target {
        print_step_header(3, "Target Association");
        let step_start = Instant::now();
        let vectors = association_vectors(&audit, &df, target)?;
        audit.extend(&vectors)?;
        for vector in &vectors {
            print_count(
                "column(s) scored",
                vector.len(),
                Some(&format!("({})", vector.name)),
            );
        }
        print_elapsed(step_start);
    }

    // Step 4: Correlation
    print_step_header(4, "Correlation Analysis");
    let step_start = Instant::now();
    let report = correlation_report(audit.fitted()?.data())?;
    if report.is_empty() {
        print_info("Fewer than two numeric columns, no correlation computed");
    } else {
        let path = output_dir.join(CORRELATION_FILE);
        export_table_csv(&report, &path)?;
        print_count("correlation pair(s)", report.len(), None);
        print_success(&format!("Saved to {}", path.display()));
    }
    print_elapsed(step_start);

    // Step 5: Export workbook
    print_step_header(5, "Export Workbook");
    let step_start = Instant::now();
    audit.export(&mut WorkbookSink::default(), &workbook_path)?;
    print_success(&format!("Saved to {}", workbook_path.display()));
    print_elapsed(step_start);

    if !cli.no_display {
        let mut display = TerminalDisplay {
            max_rows: cli.max_rows,
        };
        audit.display_summary(&mut display)?;
    }

    print_completion();

    Ok(())
}

/// Score every audited column except the target against it.
///
/// Categorical columns get chi-squared and AMI, numeric columns Kruskal-Wallis.
fn association_vectors(
    audit: &DataAudit,
    df: &DataFrame,
    target: &str,
) -> Result<Vec<AssociationVector>> {
    let fitted = audit.fitted()?;
    let data = fitted.data();
    let target_col = df.column(target)?;

    let (numeric, categorical): (Vec<&Column>, Vec<&Column>) = data
        .get_columns()
        .iter()
        .filter(|c| c.name().as_str() != target)
        .partition(|c| c.dtype().is_primitive_numeric());
    let numeric: Vec<String> = numeric.iter().map(|c| c.name().to_string()).collect();
    let categorical: Vec<String> = categorical.iter().map(|c| c.name().to_string()).collect();

    let mut vectors = Vec::new();
    if !categorical.is_empty() {
        vectors.push(chi_square_pvalues(data, &categorical, target_col, PVALUE_CHI_SQUARE)?);
        vectors.push(adjusted_mutual_information(data, &categorical, target_col, AMI)?);
    }
    if !numeric.is_empty() {
        match kruskal_pvalues(data, &numeric, target_col, PVALUE_KRUSKAL) {
            Ok(vector) => vectors.push(vector),
            Err(err @ AuditError::DegenerateTarget { .. }) => {
                log::warn!("Skipping Kruskal-Wallis: {}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(vectors)
}

fn print_elapsed(start: Instant) {
    println!(
        "      {}",
        style(format!("Completed in {:.2}s", start.elapsed().as_secs_f64())).dim()
    );
}
