//! Windows process controls using Win32 APIs
//!
//! sysinfo enumerates processes on Windows. This module adds termination,
//! suspend/resume through ntdll, nice values mapped onto priority classes and
//! CPU affinity masks.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use windows::core::PCSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, NTSTATUS, STATUS_SUCCESS};
use windows::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, GetPriorityClass, GetProcessAffinityMask, OpenProcess,
    SetPriorityClass, SetProcessAffinityMask, TerminateProcess, ABOVE_NORMAL_PRIORITY_CLASS,
    BELOW_NORMAL_PRIORITY_CLASS, HIGH_PRIORITY_CLASS, IDLE_PRIORITY_CLASS,
    NORMAL_PRIORITY_CLASS, PROCESS_ACCESS_RIGHTS, PROCESS_CREATION_FLAGS,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_SET_INFORMATION, PROCESS_SUSPEND_RESUME,
    PROCESS_TERMINATE, REALTIME_PRIORITY_CLASS,
};

use super::error::{ProbeError, ProbeResult};

/// HRESULT for ERROR_ACCESS_DENIED
const HRESULT_ACCESS_DENIED: i32 = 0x8007_0005_u32 as i32;

/// HRESULT for ERROR_INVALID_PARAMETER, returned by OpenProcess for dead pids
const HRESULT_INVALID_PARAMETER: i32 = 0x8007_0057_u32 as i32;

/// Exit code GetExitCodeProcess reports while a process is running
const STILL_ACTIVE_CODE: u32 = 259;

fn probe_error(err: windows::core::Error) -> ProbeError {
    match err.code().0 {
        HRESULT_ACCESS_DENIED => ProbeError::AccessDenied,
        HRESULT_INVALID_PARAMETER => ProbeError::NoSuchProcess,
        _ => ProbeError::Other(err.message().to_string()),
    }
}

// ============================================================================
// Handles
// ============================================================================

/// A process HANDLE closed on drop.
struct OwnedProcessHandle(HANDLE);

impl OwnedProcessHandle {
    fn open(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> ProbeResult<Self> {
        // SAFETY: OpenProcess is safe to call with valid parameters.
        let handle = unsafe { OpenProcess(access, false, pid) }.map_err(probe_error)?;
        if handle.is_invalid() {
            return Err(ProbeError::NoSuchProcess);
        }
        Ok(Self(handle))
    }

    fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedProcessHandle {
    fn drop(&mut self) {
        // SAFETY: We own this handle and close it exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

// ============================================================================
// Liveness and termination
// ============================================================================

/// `NoSuchProcess` once `pid` has exited. A process we may not open is
/// still alive.
pub fn ensure_alive(pid: u32) -> ProbeResult<()> {
    let handle = match OwnedProcessHandle::open(pid, PROCESS_QUERY_LIMITED_INFORMATION) {
        Ok(handle) => handle,
        Err(ProbeError::NoSuchProcess) => {
            forget_suspended(pid);
            return Err(ProbeError::NoSuchProcess);
        }
        Err(_) => return Ok(()),
    };
    let mut code: u32 = 0;
    // SAFETY: the out-pointer is valid for writes.
    match unsafe { GetExitCodeProcess(handle.as_raw(), &mut code) } {
        // A process that exits with 259 is reported alive
        Ok(()) if code != STILL_ACTIVE_CODE => {
            forget_suspended(pid);
            Err(ProbeError::NoSuchProcess)
        }
        _ => Ok(()),
    }
}

pub fn terminate(pid: u32) -> ProbeResult<()> {
    let handle = OwnedProcessHandle::open(pid, PROCESS_TERMINATE)?;
    // SAFETY: TerminateProcess is safe with a valid handle.
    unsafe { TerminateProcess(handle.as_raw(), 1) }.map_err(probe_error)?;
    forget_suspended(pid);
    Ok(())
}

// ============================================================================
// Suspend / resume
// ============================================================================

type NtSuspendResumeProcess = unsafe extern "system" fn(HANDLE) -> NTSTATUS;

/// Windows has no "stopped" state; track the pids suspended from here.
fn suspended_pids() -> &'static Mutex<HashSet<u32>> {
    static SUSPENDED: OnceLock<Mutex<HashSet<u32>>> = OnceLock::new();
    SUSPENDED.get_or_init(|| Mutex::new(HashSet::new()))
}

pub fn is_suspended(pid: u32) -> bool {
    suspended_pids()
        .lock()
        .map(|set| set.contains(&pid))
        .unwrap_or(false)
}

fn forget_suspended(pid: u32) {
    if let Ok(mut set) = suspended_pids().lock() {
        set.remove(&pid);
    }
}

/// Drops suspended pids that are no longer running, so a recycled pid does
/// not inherit the stopped state.
pub fn prune_suspended(live: &HashSet<u32>) {
    if let Ok(mut set) = suspended_pids().lock() {
        set.retain(|pid| live.contains(pid));
    }
}

fn load_ntdll_function(name: &'static [u8]) -> ProbeResult<NtSuspendResumeProcess> {
    // SAFETY: both names are NUL-terminated and the transmuted signature
    // matches the documented ntdll export.
    unsafe {
        let module = GetModuleHandleA(PCSTR(b"ntdll.dll\0".as_ptr())).map_err(probe_error)?;
        let proc = GetProcAddress(module, PCSTR(name.as_ptr())).ok_or(ProbeError::Unavailable)?;
        Ok(std::mem::transmute::<_, NtSuspendResumeProcess>(proc))
    }
}

fn call_suspend_resume(pid: u32, function: &'static [u8]) -> ProbeResult<()> {
    let call = load_ntdll_function(function)?;
    let handle = OwnedProcessHandle::open(pid, PROCESS_SUSPEND_RESUME)?;
    // SAFETY: the handle is valid for the duration of the call.
    let status = unsafe { call(handle.as_raw()) };
    if status != STATUS_SUCCESS {
        return Err(ProbeError::Other(format!("NTSTATUS 0x{:08X}", status.0)));
    }
    Ok(())
}

pub fn suspend(pid: u32) -> ProbeResult<()> {
    call_suspend_resume(pid, b"NtSuspendProcess\0")?;
    if let Ok(mut set) = suspended_pids().lock() {
        set.insert(pid);
    }
    Ok(())
}

pub fn resume(pid: u32) -> ProbeResult<()> {
    call_suspend_resume(pid, b"NtResumeProcess\0")?;
    forget_suspended(pid);
    Ok(())
}

// ============================================================================
// Priority
// ============================================================================

/// Nice value reported for each priority class.
fn nice_from_class(class: PROCESS_CREATION_FLAGS) -> i32 {
    match class {
        IDLE_PRIORITY_CLASS => 19,
        BELOW_NORMAL_PRIORITY_CLASS => 10,
        ABOVE_NORMAL_PRIORITY_CLASS => -10,
        HIGH_PRIORITY_CLASS => -15,
        REALTIME_PRIORITY_CLASS => -20,
        _ => 0,
    }
}

/// Priority class chosen for a nice value. Realtime is never requested.
fn class_from_nice(value: i32) -> PROCESS_CREATION_FLAGS {
    match value {
        i32::MIN..=-15 => HIGH_PRIORITY_CLASS,
        -14..=-5 => ABOVE_NORMAL_PRIORITY_CLASS,
        -4..=4 => NORMAL_PRIORITY_CLASS,
        5..=14 => BELOW_NORMAL_PRIORITY_CLASS,
        _ => IDLE_PRIORITY_CLASS,
    }
}

pub fn get_nice(pid: u32) -> ProbeResult<i32> {
    let handle = OwnedProcessHandle::open(pid, PROCESS_QUERY_LIMITED_INFORMATION)?;
    // SAFETY: GetPriorityClass is safe with a valid handle.
    let class = unsafe { GetPriorityClass(handle.as_raw()) };
    if class == 0 {
        return Err(probe_error(windows::core::Error::from_win32()));
    }
    Ok(nice_from_class(PROCESS_CREATION_FLAGS(class)))
}

pub fn set_nice(pid: u32, value: i32) -> ProbeResult<()> {
    let handle = OwnedProcessHandle::open(pid, PROCESS_SET_INFORMATION)?;
    // SAFETY: SetPriorityClass is safe with a valid handle.
    unsafe { SetPriorityClass(handle.as_raw(), class_from_nice(value)) }.map_err(probe_error)
}

// ============================================================================
// Affinity
// ============================================================================

pub fn get_affinity(pid: u32) -> ProbeResult<Vec<usize>> {
    let handle = OwnedProcessHandle::open(pid, PROCESS_QUERY_LIMITED_INFORMATION)?;
    let mut process_mask: usize = 0;
    let mut system_mask: usize = 0;
    // SAFETY: both out-pointers are valid for writes.
    unsafe { GetProcessAffinityMask(handle.as_raw(), &mut process_mask, &mut system_mask) }
        .map_err(probe_error)?;
    Ok((0..usize::BITS as usize)
        .filter(|core| (process_mask >> core) & 1 == 1)
        .collect())
}

pub fn set_affinity(pid: u32, cores: &[usize]) -> ProbeResult<()> {
    let mask = cores.iter().fold(0usize, |mask, core| mask | (1 << core));
    let handle = OwnedProcessHandle::open(
        pid,
        PROCESS_SET_INFORMATION | PROCESS_QUERY_LIMITED_INFORMATION,
    )?;
    // SAFETY: SetProcessAffinityMask is safe with a valid handle.
    unsafe { SetProcessAffinityMask(handle.as_raw(), mask) }.map_err(probe_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_class_round_trip_for_class_anchors() {
        for nice in [19, 10, 0, -10, -15] {
            assert_eq!(nice_from_class(class_from_nice(nice)), nice);
        }
    }

    #[test]
    fn test_exited_pid_loses_suspended_state() {
        let pid = u32::MAX - 7;
        if let Ok(mut set) = suspended_pids().lock() {
            set.insert(pid);
        }
        assert!(is_suspended(pid));
        prune_suspended(&HashSet::from([std::process::id()]));
        assert!(!is_suspended(pid));
    }

    #[test]
    fn test_own_process_is_alive() {
        assert_eq!(ensure_alive(std::process::id()), Ok(()));
    }

    #[test]
    fn test_get_own_nice() {
        let pid = std::process::id();
        assert_eq!(get_nice(pid), Ok(0));
        assert!(!get_affinity(pid).unwrap().is_empty());
    }
}
