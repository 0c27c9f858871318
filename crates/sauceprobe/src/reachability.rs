//! Host reachability, probed once per host for the life of the process.
//!
//! Entries are keyed by host name alone: the port only shapes the first
//! probe, and every later check of that host returns the stored answer.
//! Entries are written once and never invalidated. Concurrent first checks
//! of the same host block on a single probe rather than racing.

use std::collections::HashMap;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

/// Connect timeout used by [`TcpProbe`]
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Port connected to for host-level probes
pub const ECHO_PORT: u16 = 7;

/// Something that can tell whether a host answers
pub trait Probe: Send + Sync {
    /// Probe `host`; `port == 0` means "the host itself", any other value a
    /// TCP service on that port
    fn probe(&self, host: &str, port: u16) -> bool;
}

/// Probe over plain TCP connects
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl TcpProbe {
    /// Create a probe with the given connect timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Probe for TcpProbe {
    fn probe(&self, host: &str, port: u16) -> bool {
        let host_level = port == 0;
        let target_port = if host_level { ECHO_PORT } else { port };
        let Ok(addrs) = (host, target_port).to_socket_addrs() else {
            return false;
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                // A refusal still proves the host is up.
                Err(e) if host_level && e.kind() == std::io::ErrorKind::ConnectionRefused => {
                    return true
                }
                Err(_) => {}
            }
        }
        false
    }
}

/// Memo of probe results keyed by host name
#[derive(Debug)]
pub struct ReachabilityCache<P = TcpProbe> {
    probe: P,
    entries: Mutex<HashMap<String, Arc<OnceLock<bool>>>>,
}

impl Default for ReachabilityCache<TcpProbe> {
    fn default() -> Self {
        Self::new(TcpProbe::default())
    }
}

impl ReachabilityCache<TcpProbe> {
    /// Process-wide cache over [`TcpProbe`]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ReachabilityCache<TcpProbe>> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }
}

impl<P: Probe> ReachabilityCache<P> {
    /// Create a cache over `probe`
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cell(&self, host: &str) -> Arc<OnceLock<bool>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(host.to_string()).or_default())
    }

    fn lookup(&self, host: &str, port: u16) -> (bool, bool) {
        let cell = self.cell(host);
        let mut probed = false;
        let reachable = *cell.get_or_init(|| {
            probed = true;
            self.probe.probe(host, port)
        });
        (reachable, probed)
    }

    /// Whether `host` is reachable.
    ///
    /// Only the first call for a host probes, against `port` (or the host
    /// itself for `0`); later calls return the stored answer whatever port
    /// they pass.
    pub fn check(&self, host: &str, port: u16) -> bool {
        let (reachable, probed) = self.lookup(host, port);
        if probed {
            if reachable {
                info!(host, port, "host reachable");
            } else {
                warn!(host, port, "host unreachable");
            }
        }
        reachable
    }

    /// Host-level [`check`](Self::check) without logging
    pub fn check_quiet(&self, host: &str) -> bool {
        self.lookup(host, 0).0
    }

    /// Stored result for `host`, if it has been probed
    #[must_use]
    pub fn cached(&self, host: &str) -> Option<bool> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(host).and_then(|cell| cell.get().copied())
    }
}
