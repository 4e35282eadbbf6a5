//! Error types for root identity.

use thiserror::Error;

/// Errors that can occur while describing a root.
#[derive(Debug, Error)]
pub enum RootError {
    /// Value could not be turned into JSON.
    #[error("Cannot serialize to JSON: {0}")]
    Json(#[from] serde_json::Error),
}
