//! One row of the process table

use crate::constants::{NOT_AVAILABLE, PERMISSION_DENIED};
use crate::system::{Field, ProbeError, ProcessHandle, ProcessStatus};

/// Identifies a process across ticks.
///
/// Pids are recycled by the OS, so a pid is only trusted again when the
/// start time read at action time equals the one captured with the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub pid: u32,
    /// `None` when the start time could not be read for the row
    pub start_time: Option<u64>,
}

impl ProcessIdentity {
    /// True unless both start times are known and differ.
    pub fn corroborated_by(&self, start_time: Option<u64>) -> bool {
        match (self.start_time, start_time) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}

/// A process as seen at one tick. Built fresh every tick and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub user: Field<String>,
    pub parent_pid: Field<u32>,
    /// Seconds since the Unix epoch
    pub start_time: Field<u64>,
    pub executable_path: Field<String>,
    pub thread_count: Field<u32>,
    pub status: ProcessStatus,
}

impl ProcessRecord {
    /// Reads every column from a live handle.
    ///
    /// Returns `None` when the process disappeared before its name could be
    /// read. Any other failing probe only affects its own column.
    pub fn from_handle(handle: &dyn ProcessHandle) -> Option<Self> {
        let name = match handle.name() {
            Ok(name) => name,
            Err(ProbeError::NoSuchProcess) => return None,
            Err(ProbeError::AccessDenied) => PERMISSION_DENIED.to_string(),
            Err(_) => NOT_AVAILABLE.to_string(),
        };

        Some(Self {
            pid: handle.pid(),
            name,
            cpu_percent: handle.cpu_percent().unwrap_or(0.0).max(0.0),
            mem_percent: handle.mem_percent().unwrap_or(0.0).clamp(0.0, 100.0),
            user: handle.username().into(),
            parent_pid: handle.ppid().into(),
            start_time: handle.create_time().into(),
            executable_path: Field::from(handle.exe()).map(|p| p.display().to_string()),
            thread_count: handle.num_threads().into(),
            status: handle
                .status()
                .unwrap_or_else(|_| ProcessStatus::Unknown(NOT_AVAILABLE.to_string())),
        })
    }

    /// The token the action gateway needs to act on this row later.
    pub fn identity(&self) -> ProcessIdentity {
        ProcessIdentity {
            pid: self.pid,
            start_time: self.start_time.as_option().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fake::FakeProcess;

    #[test]
    fn test_vanished_process_yields_no_record() {
        let mut process = FakeProcess::new(42, "ghost");
        process.name = Err(ProbeError::NoSuchProcess);
        assert!(ProcessRecord::from_handle(&process).is_none());
    }

    #[test]
    fn test_field_failures_become_sentinels() {
        let mut process = FakeProcess::new(7, "daemon");
        process.username = Err(ProbeError::AccessDenied);
        process.exe = Err(ProbeError::AccessDenied);
        process.threads = Err(ProbeError::NoSuchProcess);

        let record = ProcessRecord::from_handle(&process).unwrap();
        assert_eq!(record.name, "daemon");
        assert_eq!(record.user.to_string(), "Permission Denied");
        assert_eq!(record.executable_path, Field::Denied);
        assert_eq!(record.thread_count.to_string(), "N/A");
    }

    #[test]
    fn test_identity_captures_start_time() {
        let process = FakeProcess::new(9, "shell");
        let record = ProcessRecord::from_handle(&process).unwrap();
        let identity = record.identity();
        assert_eq!(identity.pid, 9);
        assert_eq!(identity.start_time, Some(1_700_000_009));
        assert!(identity.corroborated_by(Some(1_700_000_009)));
        assert!(!identity.corroborated_by(Some(1)));
        assert!(identity.corroborated_by(None));
    }
}
