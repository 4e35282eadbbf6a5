//! Fill records from file system metadata.

use std::fs::Metadata;
use std::path::Path;

use efu_core::{
    ATTRIBUTES, DATE_CREATED, DATE_MODIFIED, EfuError, EfuRecord, EfuRecords, FILENAME, Filetime,
    SIZE, Value,
};

/// Windows file attribute bits, as stored in the `Attributes` column.
pub mod attributes {
    pub const READONLY: u32 = 0x1;
    pub const HIDDEN: u32 = 0x2;
    pub const DIRECTORY: u32 = 0x10;
    pub const ARCHIVE: u32 = 0x20;
    pub const REPARSE_POINT: u32 = 0x400;
}

/// Attribute bitmask for an entry.
#[cfg(windows)]
pub fn attributes_of(metadata: &Metadata) -> u32 {
    use std::os::windows::fs::MetadataExt;
    metadata.file_attributes()
}

/// Attribute bitmask for an entry.
///
/// Directories are `DIRECTORY`, everything else `ARCHIVE`; symlinks add
/// `REPARSE_POINT` and read-only entries add `READONLY`.
#[cfg(not(windows))]
pub fn attributes_of(metadata: &Metadata) -> u32 {
    let mut bits = if metadata.is_dir() {
        attributes::DIRECTORY
    } else {
        attributes::ARCHIVE
    };
    if metadata.file_type().is_symlink() {
        bits |= attributes::REPARSE_POINT;
    }
    if metadata.permissions().readonly() {
        bits |= attributes::READONLY;
    }
    bits
}

/// Modification time as FILETIME.
pub fn modified_filetime(metadata: &Metadata) -> Option<Filetime> {
    metadata.modified().ok().and_then(Filetime::from_system_time)
}

/// Inode change time as FILETIME.
#[cfg(unix)]
pub fn created_filetime(metadata: &Metadata) -> Option<Filetime> {
    use std::os::unix::fs::MetadataExt;
    Filetime::from_unix(metadata.ctime(), metadata.ctime_nsec() as u32)
}

/// Creation time as FILETIME.
#[cfg(not(unix))]
pub fn created_filetime(metadata: &Metadata) -> Option<Filetime> {
    metadata.created().ok().and_then(Filetime::from_system_time)
}

/// Build a record from already-read metadata.
///
/// Only columns in `columns` are filled; unknown standard columns stay out.
pub fn record_from_metadata<S: AsRef<str>>(
    path: &Path,
    metadata: &Metadata,
    columns: &[S],
) -> EfuRecord {
    let mut record = EfuRecord::new(columns.iter().map(|c| c.as_ref()));

    record.set_existing(FILENAME, path.to_string_lossy().into_owned());
    let size = if metadata.is_dir() {
        Value::Null
    } else {
        Value::Integer(metadata.len())
    };
    record.set_existing(SIZE, size);
    record.set_existing(DATE_MODIFIED, modified_filetime(metadata).map(u64::from));
    record.set_existing(DATE_CREATED, created_filetime(metadata).map(u64::from));
    record.set_existing(ATTRIBUTES, attributes_of(metadata));

    record
}

/// Build a record for `path`, following symlinks.
pub fn record_from_path<S: AsRef<str>>(
    path: impl AsRef<Path>,
    columns: &[S],
) -> Result<EfuRecord, EfuError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| EfuError::io(path, e))?;
    Ok(record_from_metadata(path, &metadata, columns))
}

/// Populate-and-push for record collections.
pub trait AppendFromPath {
    /// Create a record for `path` and append it.
    fn append_from_path<S: AsRef<str>>(
        &mut self,
        path: impl AsRef<Path>,
        columns: &[S],
    ) -> Result<(), EfuError>;
}

impl AppendFromPath for EfuRecords {
    fn append_from_path<S: AsRef<str>>(
        &mut self,
        path: impl AsRef<Path>,
        columns: &[S],
    ) -> Result<(), EfuError> {
        self.push(record_from_path(path, columns)?);
        Ok(())
    }
}
