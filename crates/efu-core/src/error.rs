//! Error types for EFU encoding and decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing EFU data.
#[derive(Debug, Error)]
pub enum EfuError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write to a stream failed.
    #[error("Write failed: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Bytes are not valid text under the requested encoding.
    #[error("Invalid {encoding} data{}", offset_suffix(.offset))]
    Decode {
        encoding: &'static str,
        offset: Option<usize>,
    },

    /// Text contains characters the requested encoding cannot represent.
    #[error("Text cannot be represented in {encoding}")]
    Encode { encoding: &'static str },

    /// An object list was empty, so no header can be derived.
    #[error("Record set must not be empty")]
    EmptyRecordSet,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl EfuError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Check if this error came from the filesystem.
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::Io { .. }
                | Self::NotADirectory { .. }
        )
    }
}

fn offset_suffix(offset: &Option<usize>) -> String {
    offset.map(|o| format!(" at byte {o}")).unwrap_or_default()
}

/// Convenience alias for results carrying [`EfuError`].
pub type Result<T, E = EfuError> = std::result::Result<T, E>;
