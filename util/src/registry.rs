//! Registry of known daemons and machines
//!
//! Configuration files refer to daemons and machines by symbolic name. A [`Registry`] resolves
//! those names to daemon connection handles and machine IP addresses.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A lookup of symbolic daemon and machine names.
pub trait Registry {
    /// Get the handle for the named daemon, or `None` if it is not registered.
    fn daemon(&self, name: &str) -> Option<DaemonHandle>;

    /// Get the IP address of the named machine, or `None` if it is not registered.
    fn machine_ip(&self, name: &str) -> Option<IpAddr>;

    /// Returns true if the named daemon is registered.
    fn has_daemon(&self, name: &str) -> bool {
        self.daemon(name).is_some()
    }

    /// Returns true if the named machine is registered.
    fn has_machine(&self, name: &str) -> bool {
        self.machine_ip(name).is_some()
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything needed to connect to a daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonHandle {
    /// Symbolic name of the daemon
    pub name: String,

    /// Address of the machine the daemon runs on
    pub host: IpAddr,

    /// Port the daemon listens on
    pub port: u16,
}

/// Registry entry for a single daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonEntry {
    pub host: IpAddr,
    pub port: u16,
}

/// A registry backed by fixed tables, normally loaded from a TOML parameter file:
///
/// ```toml
/// [machines]
/// dome-host = "10.2.6.1"
///
/// [daemons.dome]
/// host = "10.2.6.1"
/// port = 9004
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticRegistry {
    #[serde(default)]
    daemons: HashMap<String, DaemonEntry>,

    #[serde(default)]
    machines: HashMap<String, IpAddr>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DaemonHandle {
    /// The socket address of the daemon.
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a daemon to the registry.
    pub fn with_daemon(mut self, name: &str, host: IpAddr, port: u16) -> Self {
        self.daemons
            .insert(name.to_string(), DaemonEntry { host, port });
        self
    }

    /// Add a machine to the registry.
    pub fn with_machine(mut self, name: &str, ip: IpAddr) -> Self {
        self.machines.insert(name.to_string(), ip);
        self
    }

    /// Number of registered daemons and machines.
    pub fn counts(&self) -> (usize, usize) {
        (self.daemons.len(), self.machines.len())
    }
}

impl Registry for StaticRegistry {
    fn daemon(&self, name: &str) -> Option<DaemonHandle> {
        self.daemons.get(name).map(|e| DaemonHandle {
            name: name.to_string(),
            host: e.host,
            port: e.port,
        })
    }

    fn machine_ip(&self, name: &str) -> Option<IpAddr> {
        self.machines.get(name).copied()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_from_toml() {
        let registry: StaticRegistry = toml::from_str(
            r#"
            [machines]
            dome-host = "10.2.6.1"
            ops = "10.2.6.20"

            [daemons.dome]
            host = "10.2.6.1"
            port = 9004
            "#,
        )
        .unwrap();

        assert_eq!(registry.counts(), (1, 2));
        assert_eq!(
            registry.machine_ip("ops"),
            Some(IpAddr::V4(Ipv4Addr::new(10, 2, 6, 20)))
        );
        assert!(registry.has_machine("dome-host"));
        assert!(!registry.has_machine("dome"));

        let dome = registry.daemon("dome").unwrap();
        assert_eq!(dome.name, "dome");
        assert_eq!(dome.address(), "10.2.6.1:9004".parse::<std::net::SocketAddr>().unwrap());
        assert!(!registry.has_daemon("dome-host"));
    }

    #[test]
    fn test_builder() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let registry = StaticRegistry::new()
            .with_daemon("dome", localhost, 9004)
            .with_machine("local", localhost);

        assert!(registry.has_daemon("dome"));
        assert_eq!(registry.machine_ip("local"), Some(localhost));
        assert_eq!(registry.daemon("other"), None);
    }
}
