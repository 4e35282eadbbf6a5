//! File system population of EFU records.
//!
//! This crate turns file system metadata into [`EfuRecord`]s: one path at a
//! time through [`record_from_path`] / [`AppendFromPath`], or a whole tree
//! through [`RecordScanner`], which walks directories in parallel with jwalk.
//!
//! # Example
//!
//! ```rust,no_run
//! use efu_scan::{RecordScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let report = RecordScanner::new().scan(&config).unwrap();
//!
//! let doc = report.records.to_document(Default::default()).unwrap();
//! println!("{} entries", doc.rows.len());
//! ```

mod config;
mod populate;
mod scanner;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use populate::{
    AppendFromPath, attributes, attributes_of, created_filetime, modified_filetime,
    record_from_metadata, record_from_path,
};
pub use scanner::{RecordScanner, ScanReport, ScanWarning, WarningKind};

// Re-export core types for convenience
pub use efu_core::{EfuError, EfuRecord, EfuRecords, Filetime, Provenance, Value};
