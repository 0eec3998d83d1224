//! Process management operations (kill, suspend, renice, affinity, io priority)
//!
//! Every action re-resolves the target pid and checks its start time against
//! the identity captured with the table row before touching the process.

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};

use crate::constants::{NICE_MAX, NICE_MIN};
use crate::system::{
    ActionError, ActionResult, Connection, Field, IoPriority, OpenFile, ProbeError, ProcessHandle,
    ProcessSource, ProcessStatus, Revealer,
};

use super::{ProcessIdentity, ProcessRecord};

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The OS call was made and succeeded
    Applied(String),
    /// The process was already in the requested state; nothing was called
    NoChange(String),
}

impl ActionOutcome {
    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Applied(message) | ActionOutcome::NoChange(message) => message,
        }
    }

    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A kill that has been looked at but not confirmed.
///
/// Only `ActionGateway::kill` consumes it, so termination cannot happen
/// without going through `prepare_kill` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingKill {
    identity: ProcessIdentity,
    name: String,
}

impl PendingKill {
    pub fn pid(&self) -> u32 {
        self.identity.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Everything the inspect dialog shows about one process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDetails {
    pub identity: ProcessIdentity,
    pub name: Field<String>,
    pub exe: Field<PathBuf>,
    pub status: Field<ProcessStatus>,
    pub threads: Field<u32>,
    pub user: Field<String>,
    pub parent_pid: Field<u32>,
    pub cwd: Field<PathBuf>,
    pub cmdline: Field<Vec<String>>,
    pub nice: Field<i32>,
    pub affinity: Field<Vec<usize>>,
    pub io_priority: Field<IoPriority>,
    pub open_files: Field<Vec<OpenFile>>,
    pub connections: Field<Vec<Connection>>,
}

/// Applies user actions to live processes.
pub struct ActionGateway {
    revealer: Box<dyn Revealer>,
    logical_cpus: usize,
}

impl ActionGateway {
    pub fn new(revealer: Box<dyn Revealer>, logical_cpus: usize) -> Self {
        Self {
            revealer,
            logical_cpus: logical_cpus.max(1),
        }
    }

    pub fn logical_cpus(&self) -> usize {
        self.logical_cpus
    }

    /// Re-opens the pid and rejects it if its start time changed.
    fn resolve(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<Box<dyn ProcessHandle>> {
        let handle = source.open(identity.pid)?;
        let start_time = match handle.create_time() {
            Ok(start_time) => Some(start_time),
            Err(ProbeError::NoSuchProcess) => return Err(ActionError::ProcessVanished),
            Err(_) => None,
        };
        if !identity.corroborated_by(start_time) {
            warn!("pid {} was reused by another process", identity.pid);
            return Err(ActionError::ProcessVanished);
        }
        Ok(handle)
    }

    /// First half of a kill: confirms the process still exists.
    pub fn prepare_kill(
        &self,
        source: &mut dyn ProcessSource,
        record: &ProcessRecord,
    ) -> ActionResult<PendingKill> {
        let identity = record.identity();
        self.resolve(source, &identity)?;
        Ok(PendingKill {
            identity,
            name: record.name.clone(),
        })
    }

    /// Forcefully terminates a confirmed process.
    pub fn kill(
        &self,
        source: &mut dyn ProcessSource,
        pending: PendingKill,
    ) -> ActionResult<ActionOutcome> {
        let result = self
            .resolve(source, &pending.identity)
            .and_then(|handle| handle.kill().map_err(ActionError::from));
        log_result("kill", pending.pid(), result).map(|()| {
            ActionOutcome::Applied(format!(
                "Terminated process: {} (PID {})",
                pending.name,
                pending.pid()
            ))
        })
    }

    /// Current nice value, to pre-fill the renice prompt.
    pub fn prepare_renice(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<i32> {
        let handle = self.resolve(source, identity)?;
        Ok(handle.nice()?)
    }

    pub fn renice(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
        value: i32,
    ) -> ActionResult<ActionOutcome> {
        if !(NICE_MIN..=NICE_MAX).contains(&value) {
            return Err(ActionError::InvalidArgument {
                reason: format!(
                    "nice value {} is outside {}..={}",
                    value, NICE_MIN, NICE_MAX
                ),
            });
        }
        let result = self
            .resolve(source, identity)
            .and_then(|handle| handle.set_nice(value).map_err(ActionError::from));
        log_result("renice", identity.pid, result).map(|()| {
            ActionOutcome::Applied(format!("PID {}: nice set to {}", identity.pid, value))
        })
    }

    /// Stops the process. A process that is already stopped is left alone.
    ///
    /// The status check and the signal are two separate OS calls, so the
    /// process can change state in between.
    pub fn suspend(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<ActionOutcome> {
        let handle = self.resolve(source, identity)?;
        if handle.status().is_ok_and(|s| s.is_stopped()) {
            return Ok(ActionOutcome::NoChange(format!(
                "PID {} is already suspended",
                identity.pid
            )));
        }
        log_result("suspend", identity.pid, handle.suspend().map_err(ActionError::from))
            .map(|()| ActionOutcome::Applied(format!("Suspended PID {}", identity.pid)))
    }

    /// Continues a stopped process. A running process is left alone.
    pub fn resume(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<ActionOutcome> {
        let handle = self.resolve(source, identity)?;
        if !handle.status().is_ok_and(|s| s.is_stopped()) {
            return Ok(ActionOutcome::NoChange(format!(
                "PID {} is not suspended",
                identity.pid
            )));
        }
        log_result("resume", identity.pid, handle.resume().map_err(ActionError::from))
            .map(|()| ActionOutcome::Applied(format!("Resumed PID {}", identity.pid)))
    }

    /// Current core set, to pre-select the affinity dialog.
    pub fn prepare_affinity(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<Vec<usize>> {
        let handle = self.resolve(source, identity)?;
        Ok(handle.cpu_affinity()?)
    }

    /// Pins the process to `cores`, each below the logical cpu count.
    pub fn set_cpu_affinity(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
        cores: &[usize],
    ) -> ActionResult<ActionOutcome> {
        if cores.is_empty() {
            return Err(ActionError::InvalidArgument {
                reason: "at least one core must be selected".to_string(),
            });
        }
        if let Some(core) = cores.iter().find(|c| **c >= self.logical_cpus) {
            return Err(ActionError::InvalidArgument {
                reason: format!(
                    "core {} does not exist (system has {} logical cpus)",
                    core, self.logical_cpus
                ),
            });
        }

        let mut cores = cores.to_vec();
        cores.sort_unstable();
        cores.dedup();

        let result = self
            .resolve(source, identity)
            .and_then(|handle| handle.set_cpu_affinity(&cores).map_err(ActionError::from));
        log_result("set affinity", identity.pid, result).map(|()| {
            let count = cores.len();
            ActionOutcome::Applied(format!(
                "Set affinity of PID {} to {} core{}",
                identity.pid,
                count,
                if count == 1 { "" } else { "s" }
            ))
        })
    }

    /// Current I/O class, to pre-select the picker.
    pub fn prepare_io_priority(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<IoPriority> {
        let handle = self.resolve(source, identity)?;
        Ok(handle.io_priority()?)
    }

    pub fn set_io_priority(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
        class: IoPriority,
    ) -> ActionResult<ActionOutcome> {
        let result = self
            .resolve(source, identity)
            .and_then(|handle| handle.set_io_priority(class).map_err(ActionError::from));
        log_result("set io priority", identity.pid, result).map(|()| {
            ActionOutcome::Applied(format!("PID {}: I/O priority set to {}", identity.pid, class))
        })
    }

    /// Shows the directory holding the process executable.
    pub fn open_containing_folder(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<ActionOutcome> {
        let handle = self.resolve(source, identity)?;
        let exe = handle.exe().map_err(|err| match err {
            ProbeError::NoSuchProcess => ActionError::ProcessVanished,
            other => ActionError::PathUnavailable {
                reason: format!("cannot read executable path: {}", other),
            },
        })?;
        let dir = exe
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| ActionError::PathUnavailable {
                reason: format!("{} has no parent directory", exe.display()),
            })?;

        let result = self.revealer.reveal(dir).map_err(|err| ActionError::PathUnavailable {
            reason: format!("{}: {}", dir.display(), err),
        });
        log_result("open folder", identity.pid, result)
            .map(|()| ActionOutcome::Applied(format!("Opened {}", dir.display())))
    }

    /// Reads the detail record for one process.
    pub fn inspect(
        &self,
        source: &mut dyn ProcessSource,
        identity: &ProcessIdentity,
    ) -> ActionResult<ProcessDetails> {
        let handle = self.resolve(source, identity)?;
        let name: Field<String> = match handle.name() {
            Err(ProbeError::NoSuchProcess) => return Err(ActionError::ProcessVanished),
            other => other.into(),
        };
        Ok(ProcessDetails {
            identity: *identity,
            name,
            exe: handle.exe().into(),
            status: handle.status().into(),
            threads: handle.num_threads().into(),
            user: handle.username().into(),
            parent_pid: handle.ppid().into(),
            cwd: handle.cwd().into(),
            cmdline: handle.cmdline().into(),
            nice: handle.nice().into(),
            affinity: handle.cpu_affinity().into(),
            io_priority: handle.io_priority().into(),
            open_files: handle.open_files().into(),
            connections: handle.connections().into(),
        })
    }
}

fn log_result<T>(action: &str, pid: u32, result: ActionResult<T>) -> ActionResult<T> {
    match &result {
        Ok(_) => info!("{} pid {}: ok", action, pid),
        Err(err) => warn!("{} pid {} failed: {}", action, pid, err),
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;
    use crate::constants::ELEVATION_HINT;
    use crate::system::fake::{FakeProcess, FakeProcessSource, Mutation};

    #[derive(Default, Clone)]
    struct RecordingRevealer {
        revealed: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl Revealer for RecordingRevealer {
        fn reveal(&self, dir: &Path) -> io::Result<()> {
            self.revealed.borrow_mut().push(dir.to_path_buf());
            Ok(())
        }
    }

    fn gateway() -> ActionGateway {
        ActionGateway::new(Box::new(RecordingRevealer::default()), 4)
    }

    fn identity_of(process: &FakeProcess) -> ProcessIdentity {
        ProcessRecord::from_handle(process).unwrap().identity()
    }

    #[test]
    fn test_renice_out_of_range_makes_no_os_call() {
        let process = FakeProcess::new(100, "worker");
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let err = gateway().renice(&mut source, &identity, 25).unwrap_err();
        assert!(matches!(err, ActionError::InvalidArgument { .. }));
        assert_eq!(source.open_calls, 0);
        assert!(source.mutations().is_empty());
    }

    #[test]
    fn test_renice_applies_value() {
        let process = FakeProcess::new(100, "worker");
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let outcome = gateway().renice(&mut source, &identity, -5).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(source.mutations(), vec![Mutation::Nice(100, -5)]);
    }

    #[test]
    fn test_suspend_stopped_process_is_a_no_op() {
        let process = FakeProcess::new(5, "paused").with_status(ProcessStatus::Stopped);
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let outcome = gateway().suspend(&mut source, &identity).unwrap();
        assert!(matches!(outcome, ActionOutcome::NoChange(_)));
        assert!(source.mutations().is_empty());
    }

    #[test]
    fn test_resume_running_process_is_a_no_op() {
        let process = FakeProcess::new(5, "busy").with_status(ProcessStatus::Running);
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let outcome = gateway().resume(&mut source, &identity).unwrap();
        assert!(!outcome.is_applied());
        assert!(source.mutations().is_empty());
    }

    #[test]
    fn test_suspend_and_resume_reach_the_process() {
        let running = FakeProcess::new(5, "job");
        let identity = identity_of(&running);
        let mut source = FakeProcessSource::new(vec![running]);
        gateway().suspend(&mut source, &identity).unwrap();

        source.processes[0].status = ProcessStatus::Stopped;
        gateway().resume(&mut source, &identity).unwrap();
        assert_eq!(source.mutations(), vec![Mutation::Suspend(5), Mutation::Resume(5)]);
    }

    #[test]
    fn test_recycled_pid_is_treated_as_vanished() {
        let original = FakeProcess::new(77, "old");
        let identity = identity_of(&original);

        let mut replacement = FakeProcess::new(77, "new");
        replacement.create_time = Ok(1_800_000_000);
        let mut source = FakeProcessSource::new(vec![replacement]);

        let err = gateway().suspend(&mut source, &identity).unwrap_err();
        assert_eq!(err, ActionError::ProcessVanished);
        assert!(source.mutations().is_empty());
    }

    #[test]
    fn test_kill_requires_prepared_token() {
        let process = FakeProcess::new(12, "hung");
        let record = ProcessRecord::from_handle(&process).unwrap();
        let mut source = FakeProcessSource::new(vec![process]);
        let gateway = gateway();

        let pending = gateway.prepare_kill(&mut source, &record).unwrap();
        assert_eq!(pending.pid(), 12);
        assert!(source.mutations().is_empty());

        gateway.kill(&mut source, pending).unwrap();
        assert_eq!(source.mutations(), vec![Mutation::Kill(12)]);
    }

    #[test]
    fn test_kill_after_exit_reports_vanished() {
        let process = FakeProcess::new(12, "hung");
        let record = ProcessRecord::from_handle(&process).unwrap();
        let mut source = FakeProcessSource::new(vec![process]);
        let gateway = gateway();
        let pending = gateway.prepare_kill(&mut source, &record).unwrap();

        source.processes.clear();
        assert_eq!(
            gateway.kill(&mut source, pending).unwrap_err(),
            ActionError::ProcessVanished
        );
    }

    #[test]
    fn test_permission_denied_carries_hint() {
        let mut process = FakeProcess::new(1, "init");
        process.mutation_error = Some(ProbeError::AccessDenied);
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let err = gateway().renice(&mut source, &identity, 0).unwrap_err();
        assert_eq!(err, ActionError::PermissionDenied { hint: ELEVATION_HINT });
    }

    #[test]
    fn test_os_message_is_passed_through() {
        let mut process = FakeProcess::new(1, "init");
        process.mutation_error = Some(ProbeError::Other("Invalid argument (os error 22)".into()));
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let err = gateway()
            .set_io_priority(&mut source, &identity, IoPriority::High)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument (os error 22)");
    }

    #[test]
    fn test_affinity_rejects_empty_and_out_of_range() {
        let process = FakeProcess::new(3, "build");
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);
        let gateway = gateway();

        assert!(matches!(
            gateway.set_cpu_affinity(&mut source, &identity, &[]),
            Err(ActionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            gateway.set_cpu_affinity(&mut source, &identity, &[0, 4]),
            Err(ActionError::InvalidArgument { .. })
        ));
        assert_eq!(source.open_calls, 0);

        gateway.set_cpu_affinity(&mut source, &identity, &[2, 0, 2]).unwrap();
        assert_eq!(source.mutations(), vec![Mutation::Affinity(3, vec![0, 2])]);
    }

    #[test]
    fn test_prepare_reads_current_values() {
        let mut process = FakeProcess::new(8, "db");
        process.nice = Ok(10);
        process.io_priority = IoPriority::Low;
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);
        let gateway = gateway();

        assert_eq!(gateway.prepare_renice(&mut source, &identity), Ok(10));
        assert_eq!(gateway.prepare_io_priority(&mut source, &identity), Ok(IoPriority::Low));
        assert_eq!(gateway.prepare_affinity(&mut source, &identity), Ok(vec![0, 1]));
    }

    #[test]
    fn test_open_containing_folder_reveals_parent() {
        let revealer = RecordingRevealer::default();
        let gateway = ActionGateway::new(Box::new(revealer.clone()), 2);
        let process = FakeProcess::new(4, "editor");
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        gateway.open_containing_folder(&mut source, &identity).unwrap();
        assert_eq!(*revealer.revealed.borrow(), vec![PathBuf::from("/usr/bin")]);
    }

    #[test]
    fn test_unreadable_executable_is_path_unavailable() {
        let mut process = FakeProcess::new(4, "kthreadd");
        process.exe = Err(ProbeError::AccessDenied);
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        assert!(matches!(
            gateway().open_containing_folder(&mut source, &identity),
            Err(ActionError::PathUnavailable { .. })
        ));
    }

    #[test]
    fn test_inspect_keeps_partial_details() {
        let mut process = FakeProcess::new(6, "agent");
        process.username = Err(ProbeError::AccessDenied);
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::new(vec![process]);

        let details = gateway().inspect(&mut source, &identity).unwrap();
        assert_eq!(details.name, Field::Present("agent".to_string()));
        assert_eq!(details.user, Field::Denied);
        assert_eq!(details.connections, Field::Denied);
        assert_eq!(details.threads, Field::Present(1));
    }

    #[test]
    fn test_inspect_vanished_process() {
        let process = FakeProcess::new(6, "agent");
        let identity = identity_of(&process);
        let mut source = FakeProcessSource::default();
        assert_eq!(
            gateway().inspect(&mut source, &identity).unwrap_err(),
            ActionError::ProcessVanished
        );
    }
}
