//! Project folder layout: data, scripts and per-iteration outputs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const DATA_ORIGINAL: &str = "00_Data/Original Data";
const DATA_PREPARED: &str = "00_Data/Prepared Data";
const SCRIPTS: &str = "01_Scripts";
const OUTPUTS: &str = "02_Outputs";

/// Folders of an analysis project rooted at `root`.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    iteration: String,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, iteration: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            iteration: iteration.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iteration(&self) -> &str {
        &self.iteration
    }

    /// Create the data, scripts and outputs folders. Existing folders are left alone.
    pub fn create_folder_structure(&self) -> Result<()> {
        for dir in [DATA_ORIGINAL, DATA_PREPARED, SCRIPTS, OUTPUTS] {
            let path = self.root.join(dir);
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create folder: {}", path.display()))?;
        }
        Ok(())
    }

    pub fn data_original_dir(&self) -> PathBuf {
        self.warn_if_missing(self.root.join(DATA_ORIGINAL))
    }

    pub fn data_prepared_dir(&self) -> PathBuf {
        self.warn_if_missing(self.root.join(DATA_PREPARED))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(SCRIPTS)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join(OUTPUTS)
    }

    /// Output folder of `iteration` (or the configured one), created on demand.
    pub fn iteration_dir(&self, iteration: Option<&str>) -> Result<PathBuf> {
        let name = iteration.unwrap_or(&self.iteration);
        let path = self.outputs_dir().join(name);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create iteration folder: {}", path.display()))?;
        Ok(path)
    }

    fn warn_if_missing(&self, path: PathBuf) -> PathBuf {
        if !path.is_dir() {
            log::warn!("Directory {} may not exist", path.display());
        }
        path
    }
}
