//! Machine and path a collection was taken from.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash, canonical_json, hash_bytes};
use crate::error::RootError;
use crate::host::{HostFacts, SystemHost, format_mac};

/// Identity of a collection root: which machine, which path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub path: Option<String>,
}

impl Root {
    /// Describe `path` (or the current directory) on this machine.
    pub fn new(path: Option<&Path>) -> Self {
        Self::from_host(&SystemHost, path)
    }

    /// Describe the current directory on this machine.
    pub fn current() -> Self {
        Self::new(None)
    }

    /// Describe `path` using the given host facts.
    ///
    /// Name resolution is skipped when the host name is unknown.
    pub fn from_host(host: &impl HostFacts, path: Option<&Path>) -> Self {
        let hostname = host.hostname();
        let ip_address = hostname.as_deref().and_then(|h| host.resolve_ipv4(h));
        let mac_address = host.mac_address().map(format_mac);

        let path: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => host.current_dir(),
        };

        Self {
            hostname,
            mac_address,
            ip_address,
            path: path.map(|p| p.to_string_lossy().into_owned()),
        }
    }

    /// Canonical JSON of this root.
    pub fn to_json(&self) -> Result<String, RootError> {
        canonical_json(self)
    }

    /// Short identifier: the canonical hash of [`Root::to_json`].
    pub fn id(&self) -> Result<String, RootError> {
        Ok(hash_bytes(self.to_json()?.as_bytes()))
    }

    /// Canonical hash of any serializable value.
    pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, RootError> {
        canonical_hash(value)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
