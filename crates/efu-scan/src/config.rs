//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use efu_core::{EfuError, STANDARD_COLUMNS};

/// Configuration for building records from a directory tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Columns of every produced record.
    #[builder(default = "default_columns()")]
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,

    /// Emit a record for the root itself.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_root: bool,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Glob patterns matched against entry names; matching entries and
    /// everything below them are skipped.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Root identifier stamped into every record's provenance.
    #[builder(default)]
    #[serde(default)]
    pub root_id: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_columns() -> Vec<String> {
    STANDARD_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref columns) = self.columns {
            if columns.is_empty() {
                return Err("At least one column is required".to_string());
            }
        }
        if let Some(ref patterns) = self.ignore_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Bad ignore pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            columns: default_columns(),
            include_root: true,
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            ignore_patterns: Vec::new(),
            threads: 0,
            root_id: None,
        }
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, EfuError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| EfuError::InvalidConfig {
                message: format!("Bad ignore pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| EfuError::InvalidConfig {
            message: e.to_string(),
        })
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
