//! Local port registry scanner.
//!
//! Loggers advertise their control channel by writing a small text file into
//! a well-known directory: the filename is the logger's pid (or the symbolic
//! primary name), the first line is the port, and two optional lines carry
//! the collector host and archive base path.
//!
//! Scanning is self-cleaning: numeric entries whose process no longer exists
//! are excluded, so stale files left by crashed loggers never surface as
//! records. There is no separate garbage collector.

use std::fs;
use std::path::Path;

use logport_core::{LogportError, LogportResult};
use logport_proc::process_exists;

use crate::{DiscoveryConfig, LoggerId, PortRecord, Selector, PRIMARY_LINK};

/// Directory-entry predicate derived from a selector, decided once per scan.
enum EntryPredicate {
    /// The textual decimal rendering of one pid.
    Exact(String),
    /// The symbolic primary filename.
    Primary,
    /// Primary, or any numeric entry whose process is still alive.
    AnyActive,
}

impl EntryPredicate {
    fn for_selector(selector: &Selector) -> EntryPredicate {
        match selector {
            Selector::Pid(pid) => EntryPredicate::Exact(pid.to_string()),
            Selector::Primary => EntryPredicate::Primary,
            Selector::All => EntryPredicate::AnyActive,
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            EntryPredicate::Exact(rendered) => name == rendered,
            EntryPredicate::Primary => name == PRIMARY_LINK,
            EntryPredicate::AnyActive => {
                if name == PRIMARY_LINK {
                    return true;
                }
                match numeric_pid(name) {
                    Some(pid) => pid > 1 && process_exists(pid),
                    None => false,
                }
            }
        }
    }
}

/// Scan the port directory for entries matching the selector.
///
/// Returns the fully parsed records plus diagnostics for entries that were
/// skipped or only partially readable.
pub(crate) fn scan_local(
    config: &DiscoveryConfig,
    selector: &Selector,
) -> LogportResult<(Vec<PortRecord>, Vec<String>)> {
    // A request for one specific pid that is already gone costs nothing:
    // empty result, no directory access.
    if let Selector::Pid(pid) = selector {
        if !process_exists(*pid) {
            return Ok((Vec::new(), Vec::new()));
        }
    }

    let predicate = EntryPredicate::for_selector(selector);

    let entries = fs::read_dir(&config.port_dir).map_err(LogportError::scan_failed)?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(LogportError::scan_failed)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if predicate.matches(&name) {
            names.push(name);
        }
    }
    // Deterministic ordering regardless of directory iteration order.
    names.sort();

    let mut records = Vec::with_capacity(names.len());
    let mut warnings = Vec::new();
    for name in names {
        let path = config.port_dir.join(&name);
        if let Some(record) = read_port_file(&path, name, &mut warnings) {
            records.push(record);
        }
    }

    Ok((records, warnings))
}

/// Read and parse one port file; `None` skips the entry after recording a
/// warning.
fn read_port_file(path: &Path, name: String, warnings: &mut Vec<String>) -> Option<PortRecord> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warnings.push(format!("port file {}: {}", path.display(), e));
            return None;
        }
    };

    // The predicate only passes pid renderings and the primary link, but the
    // directory can change between listing and reading.
    let owner = match owner_from_name(&name) {
        Some(owner) => owner,
        None => {
            warnings.push(format!("unrecognised port file {}", path.display()));
            return None;
        }
    };

    let mut lines = contents.split_inclusive('\n');

    let port = match lines.next() {
        None => {
            warnings.push(format!("port file {} empty", path.display()));
            return None;
        }
        Some(first) => match parse_port_line(first) {
            Some(port) => port,
            None => {
                warnings.push(format!("port file {}: no port number", path.display()));
                return None;
            }
        },
    };

    let collector_host = match lines.next() {
        Some(line) => Some(strip_newline(line).to_string()),
        None => {
            warnings.push(format!(
                "port file {}: no collector host name",
                path.display()
            ));
            None
        }
    };

    // Without a host line there is no archive line to look for.
    let archive_path = if collector_host.is_some() {
        match lines.next() {
            Some(line) => Some(strip_newline(line).to_string()),
            None => {
                warnings.push(format!(
                    "port file {}: no archive base pathname",
                    path.display()
                ));
                None
            }
        }
    } else {
        None
    };

    Some(PortRecord {
        owner,
        port,
        name,
        collector_host,
        archive_path,
    })
}

/// Parse the filename back into the owning logger's identity.
fn owner_from_name(name: &str) -> Option<LoggerId> {
    if let Some(pid) = numeric_pid(name) {
        return Some(LoggerId::Pid(pid));
    }
    if name == PRIMARY_LINK {
        return Some(LoggerId::Primary);
    }
    None
}

/// Parse a filename as a pid: every byte a digit, value fits a u32.
fn numeric_pid(name: &str) -> Option<u32> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// The port line is digits immediately followed by the line terminator;
/// anything else, including a missing terminator, invalidates the entry.
fn parse_port_line(line: &str) -> Option<u16> {
    let digits = line.strip_suffix('\n')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|port| *port != 0)
}

fn strip_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_line_requires_digits_then_newline() {
        assert_eq!(parse_port_line("4330\n"), Some(4330));
        assert_eq!(parse_port_line("1\n"), Some(1));

        // Missing terminator
        assert_eq!(parse_port_line("4330"), None);
        // Trailing garbage
        assert_eq!(parse_port_line("4330 \n"), None);
        assert_eq!(parse_port_line("4330x\n"), None);
        // Not a number
        assert_eq!(parse_port_line("port\n"), None);
        assert_eq!(parse_port_line("\n"), None);
        // Sign prefixes are garbage too
        assert_eq!(parse_port_line("-1\n"), None);
        assert_eq!(parse_port_line("+4330\n"), None);
        // Out of range for a port
        assert_eq!(parse_port_line("0\n"), None);
        assert_eq!(parse_port_line("70000\n"), None);
    }

    #[test]
    fn numeric_pid_requires_pure_digits() {
        assert_eq!(numeric_pid("1234"), Some(1234));
        assert_eq!(numeric_pid("007"), Some(7));
        assert_eq!(numeric_pid(""), None);
        assert_eq!(numeric_pid("12a4"), None);
        assert_eq!(numeric_pid("-12"), None);
        assert_eq!(numeric_pid("primary"), None);
        // Overflow
        assert_eq!(numeric_pid("99999999999999999999"), None);
    }

    #[test]
    fn owner_from_name_recognises_pids_and_primary() {
        assert_eq!(owner_from_name("1234"), Some(LoggerId::Pid(1234)));
        assert_eq!(owner_from_name(PRIMARY_LINK), Some(LoggerId::Primary));
        assert_eq!(owner_from_name("backup"), None);
        assert_eq!(owner_from_name("12.bak"), None);
    }

    #[test]
    fn exact_predicate_matches_rendering_only() {
        let predicate = EntryPredicate::for_selector(&Selector::Pid(7));
        assert!(predicate.matches("7"));
        // "007" names the same pid but is not the canonical rendering.
        assert!(!predicate.matches("007"));
        assert!(!predicate.matches("70"));
        assert!(!predicate.matches(PRIMARY_LINK));
    }

    #[test]
    fn primary_predicate_matches_symbolic_name_only() {
        let predicate = EntryPredicate::for_selector(&Selector::Primary);
        assert!(predicate.matches(PRIMARY_LINK));
        assert!(!predicate.matches("1234"));
    }

    #[test]
    fn any_active_predicate_filters_on_liveness() {
        let predicate = EntryPredicate::for_selector(&Selector::All);
        let own_pid = std::process::id().to_string();

        assert!(predicate.matches(PRIMARY_LINK));
        assert!(predicate.matches(&own_pid));
        // Dead process: valid number, no such pid.
        assert!(!predicate.matches("999999999"));
        // Pids 0 and 1 are never logger port files.
        assert!(!predicate.matches("0"));
        assert!(!predicate.matches("1"));
        assert!(!predicate.matches("notapid"));
    }
}
