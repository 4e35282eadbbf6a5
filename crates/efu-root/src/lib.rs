//! Host identity for EFU collections.
//!
//! A [`Root`] records which machine and path a set of records was collected
//! from. Its canonical JSON form (RFC 8785) hashes to a short, stable
//! identifier that can be stamped into record provenance.

mod canonical;
mod error;
mod host;
mod root;

pub use canonical::{HASH_LEN, canonical_hash, canonical_json};
pub use error::RootError;
pub use host::{HostFacts, SystemHost, format_mac};
pub use root::Root;
