//! logport-discover: locate active logger-daemon control ports
//!
//! Given a host and a selector, this crate answers "where is the logging
//! daemon's control channel": by scanning the local port-advertisement
//! directory when the host is this machine, or by asking that host's
//! collector the same question over the metrics protocol when it is not.
//!
//! ## Discovery flow
//!
//! [`find_ports`] asks the host identity resolver whether the requested host
//! designates the local machine. Local requests are served from the port
//! directory ([`scan_local_ports`]); remote requests open a collector
//! session and decode the well-known port metric ([`query_remote_ports`]).
//!
//! ## Ownership
//!
//! Every discovery call returns an owned [`PortSnapshot`]. Nothing is shared
//! or overwritten between calls, so the API is safe to use from concurrent
//! callers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use logport_discover::{find_ports, DiscoveryConfig, Selector, TcpCollector};
//!
//! let config = DiscoveryConfig::default();
//! let client = TcpCollector::default();
//! let snapshot = find_ports(&config, &client, "localhost", &Selector::All).unwrap();
//! for record in &snapshot.ports {
//!     println!("{}: port {}", record.name, record.port);
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use logport_core::schema::PORT_SNAPSHOT_V1;
use logport_core::{get_platform, LogportError, LogportResult};

mod collector;
mod hostid;
mod remote;
mod scan;
mod tcp;

pub use collector::{
    CollectorClient, CollectorSession, InstanceValue, MetricDesc, MetricId, ValueSet,
};
pub use hostid::{is_local_host, HostLocality};
pub use tcp::{TcpCollector, TcpSession, PROTOCOL_VERSION};

// ============================================================================
// Well-Known Names
// ============================================================================

/// Symbolic filename under which the primary logger advertises its port.
pub const PRIMARY_LINK: &str = "primary";

/// Default directory scanned for port-advertisement files.
#[cfg(unix)]
pub const DEFAULT_PORT_DIR: &str = "/var/run/logport";

/// Default directory scanned for port-advertisement files.
#[cfg(windows)]
pub const DEFAULT_PORT_DIR: &str = r"C:\ProgramData\logport\ports";

/// TCP port of the collector service used for remote queries.
pub const DEFAULT_COLLECTOR_PORT: u16 = 7661;

/// Metric through which a collector advertises per-logger control ports.
pub const LOGGER_PORT_METRIC: &str = "collector.logger.port";

/// Instance number under which the primary logger is advertised.
pub const PRIMARY_INSTANCE: i32 = 0;

/// Pseudo-instance advertised by collectors of an older protocol generation.
///
/// Not a real logger; skipped during decoding. Stays until the last
/// deployments speaking that generation are retired.
pub const RESERVED_LEGACY_INST: i32 = 1;

/// Largest pid accepted in a selector (pid_t is signed).
const MAX_SAFE_PID: u32 = i32::MAX as u32;

// ============================================================================
// Core Types
// ============================================================================

/// Identity of the logger process that owns a control port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerId {
    /// The distinguished primary logger, advertised under [`PRIMARY_LINK`].
    Primary,
    /// An ordinary logger, identified by its process id.
    Pid(u32),
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerId::Primary => f.write_str(PRIMARY_LINK),
            LoggerId::Pid(pid) => write!(f, "{}", pid),
        }
    }
}

/// Which loggers a discovery request is interested in.
///
/// Decided once at the API boundary; never re-derived per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// One specific logger process.
    Pid(u32),
    /// The primary logger.
    Primary,
    /// Every active logger.
    All,
}

impl Selector {
    /// Validate selector values.
    ///
    /// Returns an error for pid 0 and for pids that do not fit a `pid_t`.
    pub fn validate(&self) -> LogportResult<()> {
        if let Selector::Pid(pid) = self {
            if *pid == 0 {
                return Err(LogportError::invalid_argument("PID 0 is not valid"));
            }
            if *pid > MAX_SAFE_PID {
                return Err(LogportError::invalid_argument(format!(
                    "PID {} exceeds maximum safe value {}",
                    pid, MAX_SAFE_PID
                )));
            }
        }
        Ok(())
    }

    /// True when the selector targets a single logger (find-one semantics).
    pub fn is_single(&self) -> bool {
        !matches!(self, Selector::All)
    }

    /// Whether a record owner satisfies this selector.
    pub fn matches(&self, owner: LoggerId) -> bool {
        match self {
            Selector::All => true,
            Selector::Primary => owner == LoggerId::Primary,
            Selector::Pid(pid) => owner == LoggerId::Pid(*pid),
        }
    }
}

/// One discovered control-port advertisement.
///
/// Only fully parsed advertisements become records; a malformed entry is
/// skipped with a warning, never included half-filled.
#[derive(Debug, Clone, Serialize)]
pub struct PortRecord {
    /// The logger that owns the port.
    pub owner: LoggerId,

    /// The advertised control port.
    pub port: u16,

    /// The filesystem entry or instance name this record was derived from.
    pub name: String,

    /// Collector hostname the logger last attached to (local scans only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector_host: Option<String>,

    /// Base pathname of the archive being recorded (local scans only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
}

/// Snapshot of discovered logger control ports.
///
/// Owned by the caller; repeated discovery calls return independent
/// snapshots with no shared state.
#[derive(Debug, Clone, Serialize)]
pub struct PortSnapshot {
    /// Schema identifier for version detection.
    pub schema_id: &'static str,

    /// Timestamp of snapshot (ISO 8601).
    pub timestamp: String,

    /// Current platform (e.g., "linux", "macos", "windows").
    pub platform: &'static str,

    /// Whether the records came from a local scan or a remote query.
    pub source: HostLocality,

    /// Discovered port records.
    pub ports: Vec<PortRecord>,

    /// Warnings about skipped or partially readable entries.
    pub warnings: Vec<String>,
}

/// Request-scoped discovery configuration.
///
/// Passed explicitly through the call chain; there is no process-wide
/// discovery state.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory scanned for port-advertisement files.
    pub port_dir: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            port_dir: PathBuf::from(DEFAULT_PORT_DIR),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Scan the local port-advertisement directory for active logger ports.
///
/// Per-entry problems (an unreadable file, a malformed port line) are
/// reported in the snapshot's `warnings` and the scan continues; only
/// failure to list the directory itself aborts the scan.
///
/// A [`Selector::Pid`] whose process no longer exists returns an empty
/// snapshot without touching the filesystem.
pub fn scan_local_ports(
    config: &DiscoveryConfig,
    selector: &Selector,
) -> LogportResult<PortSnapshot> {
    selector.validate()?;
    let (ports, warnings) = scan::scan_local(config, selector)?;
    Ok(make_snapshot(HostLocality::Local, ports, warnings))
}

/// Query a remote host's collector for its active logger ports.
///
/// The collector session lives exactly as long as this call: it is dropped
/// on every exit path, success or failure.
pub fn query_remote_ports<C: CollectorClient>(
    client: &C,
    host: &str,
    selector: &Selector,
) -> LogportResult<PortSnapshot> {
    selector.validate()?;
    let mut session = client.connect(host)?;
    let ports = remote::query_remote(&mut session, selector)?;
    Ok(make_snapshot(HostLocality::Remote, ports, Vec::new()))
}

/// Locate active logger control ports on the given host.
///
/// Pure routing: the host identity resolver's verdict decides between the
/// local scanner and the remote collector query, and a resolver error is
/// propagated unchanged.
pub fn find_ports<C: CollectorClient>(
    config: &DiscoveryConfig,
    client: &C,
    host: &str,
    selector: &Selector,
) -> LogportResult<PortSnapshot> {
    selector.validate()?;
    match hostid::is_local_host(host)? {
        HostLocality::Local => scan_local_ports(config, selector),
        HostLocality::Remote => query_remote_ports(client, host, selector),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn make_snapshot(
    source: HostLocality,
    ports: Vec<PortRecord>,
    warnings: Vec<String>,
) -> PortSnapshot {
    PortSnapshot {
        schema_id: PORT_SNAPSHOT_V1,
        timestamp: current_timestamp(),
        platform: get_platform(),
        source,
        ports,
        warnings,
    }
}

/// Get current timestamp in ISO 8601 format.
fn current_timestamp() -> String {
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

// ============================================================================
// Tests
// ============================================================================
