//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::DEFAULT_INFER_SCHEMA_LENGTH;

/// dataudit - Profile every column of a dataset and score features against a target
#[derive(Parser, Debug)]
#[command(name = "dataudit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target column name.
    /// When given, every other audited column is scored against it
    /// (chi-squared and AMI for categorical columns, Kruskal-Wallis for numeric ones).
    #[arg(short, long)]
    pub target: Option<String>,

    /// Columns to audit (comma-separated). Defaults to every column.
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Project root containing the 00_Data / 01_Scripts / 02_Outputs folders.
    /// Defaults to the current directory.
    #[arg(short = 'p', long, default_value = ".")]
    pub project_root: PathBuf,

    /// Iteration folder under 02_Outputs that receives the exported files
    #[arg(long, default_value = "i01", value_parser = validate_iteration)]
    pub iteration: String,

    /// Workbook output path.
    /// Defaults to data_audit.zip inside the iteration folder.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,

    /// Maximum number of summary rows printed to the terminal
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Skip printing the summary table
    #[arg(long, default_value = "false")]
    pub no_display: bool,
}

impl Cli {
    /// The audit selection, `None` when every column is audited.
    pub fn selection(&self) -> Option<&[String]> {
        if self.columns.is_empty() {
            None
        } else {
            Some(&self.columns)
        }
    }
}

/// Validator for the iteration folder name
fn validate_iteration(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("iteration must not be empty".to_string());
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(format!(
            "iteration must be a single folder name, got '{}'",
            s
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["dataudit", "--input", "data.csv"]);
        assert_eq!(cli.iteration, "i01");
        assert_eq!(cli.infer_schema_length, DEFAULT_INFER_SCHEMA_LENGTH);
        assert!(cli.selection().is_none());
        assert!(!cli.no_display);
    }

    #[test]
    fn test_columns_are_comma_delimited() {
        let cli = Cli::parse_from(["dataudit", "-i", "data.csv", "--columns", "a,b,c"]);
        assert_eq!(cli.selection().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_iteration_rejects_paths() {
        assert!(validate_iteration("i02").is_ok());
        assert!(validate_iteration("../x").is_err());
        assert!(validate_iteration("  ").is_err());
    }
}
