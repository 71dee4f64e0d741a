//! Windows implementation using Win32 process APIs
//!
//! Uses the following APIs:
//! - `OpenProcess` - existence and access probe
//! - `CloseHandle` - release the probe handle
//! - `GetLastError` - distinguish "gone" from "protected"

use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ACCESS_DENIED};
use windows_sys::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

pub fn process_exists_impl(pid: u32) -> bool {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle != 0 {
            CloseHandle(handle);
            return true;
        }

        // Access denied means the process exists but is protected
        // (e.g., owned by another user or the system).
        GetLastError() == ERROR_ACCESS_DENIED
    }
}
