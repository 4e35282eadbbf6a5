//! Host probing.

use std::net::{IpAddr, ToSocketAddrs};
use std::path::PathBuf;

use tracing::debug;

/// Source of host facts. Each lookup may fail independently.
pub trait HostFacts {
    /// Host name of this machine.
    fn hostname(&self) -> Option<String>;

    /// Hardware address of the primary interface.
    fn mac_address(&self) -> Option<[u8; 6]>;

    /// IPv4 address `hostname` resolves to.
    fn resolve_ipv4(&self, hostname: &str) -> Option<String>;

    /// Current working directory.
    fn current_dir(&self) -> Option<PathBuf>;
}

/// Reads facts from the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostFacts for SystemHost {
    fn hostname(&self) -> Option<String> {
        let name = gethostname::gethostname();
        match name.into_string() {
            Ok(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    fn mac_address(&self) -> Option<[u8; 6]> {
        match mac_address::get_mac_address() {
            Ok(Some(mac)) => Some(mac.bytes()),
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "MAC address lookup failed");
                None
            }
        }
    }

    fn resolve_ipv4(&self, hostname: &str) -> Option<String> {
        let addrs = match (hostname, 0).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(hostname, error = %err, "host name resolution failed");
                return None;
            }
        };
        addrs
            .map(|addr| addr.ip())
            .find(IpAddr::is_ipv4)
            .map(|ip| ip.to_string())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }
}

/// Format a hardware address as lowercase, colon separated octets.
pub fn format_mac(bytes: [u8; 6]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
