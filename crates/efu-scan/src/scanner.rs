//! JWalk-based directory walker producing EFU records.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use efu_core::{EfuError, EfuRecords, FILENAME, Filetime, Provenance};

use crate::config::ScanConfig;
use crate::populate::record_from_metadata;

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal problem with one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Records collected from one walk.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Records, sorted by filename.
    pub records: EfuRecords,
    /// Entries that could not be read.
    pub warnings: Vec<ScanWarning>,
    /// When the walk started.
    pub scanned_at: Filetime,
    /// How long the walk took.
    pub duration: Duration,
}

impl ScanReport {
    /// Check if any entry was skipped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Walks a directory tree and turns every entry into a record.
#[derive(Debug, Default)]
pub struct RecordScanner;

impl RecordScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Walk `config.root`.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanReport, EfuError> {
        let start = Instant::now();
        let scanned_at = Filetime::now();

        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| EfuError::io(&config.root, e))?;
        if !root_path.is_dir() {
            return Err(EfuError::NotADirectory { path: root_path });
        }

        let provenance = Provenance::seen_at(scanned_at, config.root_id.clone());
        let mut records = EfuRecords::new();
        let mut warnings = Vec::new();

        for entry_result in self.walker(config, &root_path)? {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping entry without metadata");
                    warnings.push(ScanWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    continue;
                }
            };

            trace!(path = %path.display(), depth = entry.depth(), "record");
            let record = record_from_metadata(&path, &metadata, &config.columns)
                .with_provenance(provenance.clone());
            records.push(record);
        }

        records.sort_by_column(FILENAME);

        let duration = start.elapsed();
        debug!(
            root = %root_path.display(),
            records = records.len(),
            warnings = warnings.len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan finished"
        );

        Ok(ScanReport {
            records,
            warnings,
            scanned_at,
            duration,
        })
    }

    fn walker(&self, config: &ScanConfig, root_path: &Path) -> Result<WalkDir, EfuError> {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let ignore = config.ignore_set()?;

        Ok(WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .sort(true)
            .min_depth(if config.include_root { 0 } else { 1 })
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                if ignore.is_empty() {
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) => !ignore.is_match(entry.file_name()),
                    Err(_) => true,
                });
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efu_core::Value;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.log"), "another file here").unwrap();

        temp
    }

    fn names(report: &ScanReport, root: &Path) -> Vec<String> {
        report
            .records
            .iter()
            .map(|r| {
                let filename = r[FILENAME].to_string();
                Path::new(&filename)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let root = temp.path().canonicalize().unwrap();
        let report = RecordScanner::new().scan(&ScanConfig::new(&root)).unwrap();

        assert_eq!(
            names(&report, &root),
            vec![
                "",
                "dir1",
                "dir1/file2.txt",
                "dir1/subdir",
                "dir1/subdir/file3.txt",
                "dir2",
                "dir2/file4.log",
                "file1.txt",
            ]
        );
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_without_root_and_depth_limit() {
        let temp = create_test_tree();
        let root = temp.path().canonicalize().unwrap();
        let config = ScanConfig::builder()
            .root(&root)
            .include_root(false)
            .max_depth(1u32)
            .build()
            .unwrap();

        let report = RecordScanner::new().scan(&config).unwrap();
        assert_eq!(names(&report, &root), vec!["dir1", "dir2", "file1.txt"]);
    }

    #[test]
    fn test_ignore_patterns_prune_subtrees() {
        let temp = create_test_tree();
        let root = temp.path().canonicalize().unwrap();
        let config = ScanConfig::builder()
            .root(&root)
            .include_root(false)
            .ignore_patterns(vec!["subdir".to_string(), "*.log".to_string()])
            .build()
            .unwrap();

        let report = RecordScanner::new().scan(&config).unwrap();
        assert_eq!(
            names(&report, &root),
            vec!["dir1", "dir1/file2.txt", "dir2", "file1.txt"]
        );
    }

    #[test]
    fn test_provenance_stamped() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .root_id("root-1".to_string())
            .build()
            .unwrap();

        let report = RecordScanner::new().scan(&config).unwrap();
        for record in &report.records {
            assert_eq!(record.provenance().first_seen, report.scanned_at);
            assert_eq!(record.provenance().last_seen, report.scanned_at);
            assert_eq!(record.provenance().root.as_deref(), Some("root-1"));
        }
    }

    #[test]
    fn test_file_sizes() {
        let temp = create_test_tree();
        let root = temp.path().canonicalize().unwrap();
        let report = RecordScanner::new().scan(&ScanConfig::new(&root)).unwrap();

        let file1 = report
            .records
            .iter()
            .find(|r| r[FILENAME].to_string().ends_with("file1.txt"))
            .unwrap();
        assert_eq!(file1["Size"], Value::Integer(5));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = create_test_tree();
        let result = RecordScanner::new().scan(&ScanConfig::new(temp.path().join("file1.txt")));
        assert!(matches!(result, Err(EfuError::NotADirectory { .. })));
    }
}
