//! Host identity resolution.
//!
//! Deciding whether a hostname designates the local machine is not a string
//! compare: `localhost`, the machine's canonical name, a secondary DNS
//! alias, and any of its interface addresses all name the same box. The
//! resolver therefore compares full resolved address sets and reports Local
//! when they share any address, which classifies aliases, IP literals, and
//! multi-homed hosts correctly.
//!
//! Failure to resolve the *input* name means that host is unreachable;
//! failure to resolve our *own* name means the environment is broken. The
//! two are reported as distinct errors.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};

use serde::Serialize;

use logport_core::{LogportError, LogportResult};

/// The host identity resolver's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostLocality {
    /// The name designates the local machine.
    Local,
    /// The name designates some other machine.
    Remote,
}

/// Report whether `hostname` designates the local machine.
///
/// The literal `"localhost"` (any case) short-circuits to `Local` without
/// any resolution. Otherwise both the local machine's canonical name and
/// the input are resolved to their full address sets, and the verdict is
/// `Local` iff the sets intersect.
pub fn is_local_host(hostname: &str) -> LogportResult<HostLocality> {
    // Fast path: no resolution at all for the canonical loopback name.
    if hostname.eq_ignore_ascii_case("localhost") {
        return Ok(HostLocality::Local);
    }

    let local_name = local_hostname()?;
    let local_addrs = resolve_addrs(&local_name).map_err(|e| {
        LogportError::host_identity_failed(format!(
            "cannot resolve own hostname '{}': {}",
            local_name, e
        ))
    })?;
    if local_addrs.is_empty() {
        return Err(LogportError::host_identity_failed(format!(
            "own hostname '{}' resolved to no addresses",
            local_name
        )));
    }

    let host_addrs =
        resolve_addrs(hostname).map_err(|_| LogportError::host_unreachable(hostname))?;
    if host_addrs.is_empty() {
        return Err(LogportError::host_unreachable(hostname));
    }

    if addr_sets_intersect(&local_addrs, &host_addrs) {
        Ok(HostLocality::Local)
    } else {
        Ok(HostLocality::Remote)
    }
}

/// Any shared address makes two names equivalent; exact set equality is not
/// required (multi-homed hosts advertise different subsets per name).
fn addr_sets_intersect(a: &[IpAddr], b: &[IpAddr]) -> bool {
    a.iter().any(|addr| b.contains(addr))
}

/// Resolve a name to its full set of addresses.
///
/// Port 0 keeps the lookup service-agnostic; only the addresses matter.
/// IP literals resolve without consulting any resolver.
fn resolve_addrs(name: &str) -> io::Result<Vec<IpAddr>> {
    Ok((name, 0u16)
        .to_socket_addrs()?
        .map(|addr| addr.ip())
        .collect())
}

/// Obtain the local machine's own hostname.
#[cfg(unix)]
fn local_hostname() -> LogportResult<String> {
    let mut buf = vec![0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return Err(LogportError::host_identity_failed(format!(
            "gethostname: {}",
            io::Error::last_os_error()
        )));
    }

    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..end]).into_owned();
    if name.is_empty() {
        return Err(LogportError::host_identity_failed(
            "gethostname returned an empty name",
        ));
    }
    Ok(name)
}

/// Obtain the local machine's own hostname.
#[cfg(windows)]
fn local_hostname() -> LogportResult<String> {
    use windows_sys::Win32::Foundation::GetLastError;
    use windows_sys::Win32::System::SystemInformation::{
        ComputerNameDnsHostname, GetComputerNameExW,
    };

    unsafe {
        // First call reports the required buffer size.
        let mut size: u32 = 0;
        GetComputerNameExW(ComputerNameDnsHostname, std::ptr::null_mut(), &mut size);

        let mut buf = vec![0u16; size as usize + 1];
        let mut len = buf.len() as u32;
        if GetComputerNameExW(ComputerNameDnsHostname, buf.as_mut_ptr(), &mut len) == 0 {
            return Err(LogportError::host_identity_failed(format!(
                "GetComputerNameExW failed: {}",
                GetLastError()
            )));
        }
        Ok(String::from_utf16_lossy(&buf[..len as usize]))
    }
}
