//! Signal delivery shared by every Unix target

use std::io;

use super::error::{ProbeError, ProbeResult};

/// Reads errno after a failed libc call.
pub fn last_errno_error() -> ProbeError {
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => ProbeError::NoSuchProcess,
        Some(libc::EPERM) | Some(libc::EACCES) => ProbeError::AccessDenied,
        Some(libc::ENOSYS) => ProbeError::Unavailable,
        _ => ProbeError::Other(err.to_string()),
    }
}

/// Sends `signal` to `pid`, mapping errno onto the probe taxonomy.
pub fn send_signal(pid: u32, signal: libc::c_int) -> ProbeResult<()> {
    // SAFETY: kill only reads its arguments.
    let result = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if result == -1 {
        return Err(last_errno_error());
    }
    Ok(())
}
