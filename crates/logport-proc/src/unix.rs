use std::io;

use libc::{kill as libc_kill, EPERM, ESRCH};

pub fn process_exists_impl(pid: u32) -> bool {
    // Safe: libc expects pid_t (signed), but pid==0 and pid>i32::MAX are
    // rejected at the API boundary. Signal 0 performs the permission and
    // existence checks without delivering anything.
    let result = unsafe { libc_kill(pid as i32, 0) };

    if result == 0 {
        return true;
    }

    let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);

    match errno {
        // The process exists but belongs to someone else; the record
        // behind this probe is evidence enough.
        EPERM => true,
        ESRCH => false,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_self_succeeds() {
        assert!(process_exists_impl(std::process::id()));
    }

    #[test]
    fn probe_nonexistent_pid_fails() {
        // Use a high but safe PID that's extremely unlikely to exist.
        // (u32::MAX is rejected before reaching this function; see lib.rs.)
        assert!(!process_exists_impl(999_999_999));
    }
}
