//! In-memory sources for unit tests

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::error::{ProbeError, ProbeResult};
use super::source::{
    Connection, DiskCounters, DiskUsage, GpuReading, InterfaceCounters, IoPriority, LoggedInUser,
    MemoryUsage, NetCounters, OpenFile, Partition, ProcessHandle, ProcessSource,
    ProcessStatus, ResourceSource, TemperatureReading,
};

/// A mutating call that reached a fake process.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Kill(u32),
    Suspend(u32),
    Resume(u32),
    Nice(u32, i32),
    Affinity(u32, Vec<usize>),
    IoPriority(u32, IoPriority),
}

#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub pid: u32,
    pub name: ProbeResult<String>,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub username: ProbeResult<String>,
    pub create_time: ProbeResult<u64>,
    pub exe: ProbeResult<PathBuf>,
    pub threads: ProbeResult<u32>,
    pub ppid: ProbeResult<u32>,
    pub status: ProcessStatus,
    pub nice: ProbeResult<i32>,
    pub affinity: Vec<usize>,
    pub io_priority: IoPriority,
    /// Returned by every mutator when set
    pub mutation_error: Option<ProbeError>,
    log: Rc<RefCell<Vec<Mutation>>>,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        Self {
            pid,
            name: Ok(name.to_string()),
            cpu_percent: 0.0,
            mem_percent: 0.0,
            username: Ok("alice".to_string()),
            create_time: Ok(1_700_000_000 + u64::from(pid)),
            exe: Ok(PathBuf::from(format!("/usr/bin/{}", name))),
            threads: Ok(1),
            ppid: Ok(1),
            status: ProcessStatus::Sleeping,
            nice: Ok(0),
            affinity: vec![0, 1],
            io_priority: IoPriority::Normal,
            mutation_error: None,
            log: Rc::default(),
        }
    }

    pub fn with_cpu(mut self, cpu_percent: f64) -> Self {
        self.cpu_percent = cpu_percent;
        self
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    fn mutate(&self, mutation: Mutation) -> ProbeResult<()> {
        if let Some(err) = &self.mutation_error {
            return Err(err.clone());
        }
        self.log.borrow_mut().push(mutation);
        Ok(())
    }
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }
    fn name(&self) -> ProbeResult<String> {
        self.name.clone()
    }
    fn cpu_percent(&self) -> ProbeResult<f64> {
        Ok(self.cpu_percent)
    }
    fn mem_percent(&self) -> ProbeResult<f64> {
        Ok(self.mem_percent)
    }
    fn username(&self) -> ProbeResult<String> {
        self.username.clone()
    }
    fn create_time(&self) -> ProbeResult<u64> {
        self.create_time.clone()
    }
    fn exe(&self) -> ProbeResult<PathBuf> {
        self.exe.clone()
    }
    fn cmdline(&self) -> ProbeResult<Vec<String>> {
        Ok(vec![self.name.clone().unwrap_or_default()])
    }
    fn cwd(&self) -> ProbeResult<PathBuf> {
        Ok(PathBuf::from("/"))
    }
    fn num_threads(&self) -> ProbeResult<u32> {
        self.threads.clone()
    }
    fn ppid(&self) -> ProbeResult<u32> {
        self.ppid.clone()
    }
    fn status(&self) -> ProbeResult<ProcessStatus> {
        Ok(self.status.clone())
    }
    fn open_files(&self) -> ProbeResult<Vec<OpenFile>> {
        Ok(Vec::new())
    }
    fn connections(&self) -> ProbeResult<Vec<Connection>> {
        Err(ProbeError::AccessDenied)
    }
    fn nice(&self) -> ProbeResult<i32> {
        self.nice.clone()
    }
    fn cpu_affinity(&self) -> ProbeResult<Vec<usize>> {
        Ok(self.affinity.clone())
    }
    fn io_priority(&self) -> ProbeResult<IoPriority> {
        Ok(self.io_priority)
    }

    fn kill(&self) -> ProbeResult<()> {
        self.mutate(Mutation::Kill(self.pid))
    }
    fn suspend(&self) -> ProbeResult<()> {
        self.mutate(Mutation::Suspend(self.pid))
    }
    fn resume(&self) -> ProbeResult<()> {
        self.mutate(Mutation::Resume(self.pid))
    }
    fn set_nice(&self, value: i32) -> ProbeResult<()> {
        self.mutate(Mutation::Nice(self.pid, value))
    }
    fn set_cpu_affinity(&self, cores: &[usize]) -> ProbeResult<()> {
        self.mutate(Mutation::Affinity(self.pid, cores.to_vec()))
    }
    fn set_io_priority(&self, class: IoPriority) -> ProbeResult<()> {
        self.mutate(Mutation::IoPriority(self.pid, class))
    }
}

/// Hands out clones of its processes and records every OS interaction.
#[derive(Debug, Default)]
pub struct FakeProcessSource {
    pub processes: Vec<FakeProcess>,
    pub enumerate_error: Option<ProbeError>,
    pub open_calls: usize,
    log: Rc<RefCell<Vec<Mutation>>>,
    exited: Rc<RefCell<Vec<u32>>>,
}

impl FakeProcessSource {
    pub fn new(processes: Vec<FakeProcess>) -> Self {
        Self {
            processes,
            ..Self::default()
        }
    }

    /// A source whose enumeration always fails with `err`.
    pub fn failing(err: ProbeError) -> Self {
        Self {
            enumerate_error: Some(err),
            ..Self::default()
        }
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.log.borrow().clone()
    }

    /// Shared view of the mutation log, for tests that hand the source away.
    pub fn mutation_log(&self) -> Rc<RefCell<Vec<Mutation>>> {
        Rc::clone(&self.log)
    }

    /// Pids pushed here disappear from the source, for tests that hand the
    /// source away before the process exits.
    pub fn exited_pids(&self) -> Rc<RefCell<Vec<u32>>> {
        Rc::clone(&self.exited)
    }

    fn is_running(&self, process: &FakeProcess) -> bool {
        !self.exited.borrow().contains(&process.pid)
    }

    fn hand_out(&self, process: &FakeProcess) -> Box<dyn ProcessHandle> {
        let mut handle = process.clone();
        handle.log = Rc::clone(&self.log);
        Box::new(handle)
    }
}

impl ProcessSource for FakeProcessSource {
    fn enumerate(&mut self) -> ProbeResult<Vec<Box<dyn ProcessHandle>>> {
        if let Some(err) = &self.enumerate_error {
            return Err(err.clone());
        }
        Ok(self
            .processes
            .iter()
            .filter(|p| self.is_running(p))
            .map(|p| self.hand_out(p))
            .collect())
    }

    fn open(&mut self, pid: u32) -> ProbeResult<Box<dyn ProcessHandle>> {
        self.open_calls += 1;
        self.processes
            .iter()
            .find(|p| p.pid == pid && self.is_running(p))
            .map(|p| self.hand_out(p))
            .ok_or(ProbeError::NoSuchProcess)
    }
}

/// Counters set directly by the test between ticks.
#[derive(Debug, Clone)]
pub struct FakeResourceSource {
    pub cpu_percent: f64,
    pub memory: MemoryUsage,
    pub disk: ProbeResult<DiskUsage>,
    pub disk_io: Option<DiskCounters>,
    pub net: ProbeResult<NetCounters>,
    pub refresh_error: Option<ProbeError>,
    pub temperatures: ProbeResult<Vec<TemperatureReading>>,
    pub gpus: ProbeResult<Vec<GpuReading>>,
}

impl Default for FakeResourceSource {
    fn default() -> Self {
        Self {
            cpu_percent: 12.5,
            memory: MemoryUsage {
                total: 8 * 1024 * 1024 * 1024,
                used: 2 * 1024 * 1024 * 1024,
                percent: 25.0,
            },
            disk: Ok(DiskUsage::from_totals(100, 60)),
            disk_io: Some(DiskCounters::default()),
            net: Ok(NetCounters::default()),
            refresh_error: None,
            temperatures: Err(ProbeError::Unavailable),
            gpus: Err(ProbeError::Unavailable),
        }
    }
}

impl ResourceSource for FakeResourceSource {
    fn refresh(&mut self) -> ProbeResult<()> {
        match &self.refresh_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
    fn cpu_percent(&self) -> f64 {
        self.cpu_percent
    }
    fn virtual_memory(&self) -> MemoryUsage {
        self.memory
    }
    fn disk_usage(&self, _path: &Path) -> ProbeResult<DiskUsage> {
        self.disk.clone()
    }
    fn disk_io_counters(&self) -> Option<DiskCounters> {
        self.disk_io
    }
    fn net_io_counters(&self) -> ProbeResult<NetCounters> {
        self.net.clone()
    }
    fn net_io_per_interface(&self) -> Vec<InterfaceCounters> {
        match &self.net {
            Ok(counters) => vec![InterfaceCounters {
                name: "eth0".to_string(),
                counters: *counters,
            }],
            Err(_) => Vec::new(),
        }
    }
    fn sensors_temperatures(&self) -> ProbeResult<Vec<TemperatureReading>> {
        self.temperatures.clone()
    }

    fn gpu_stats(&self) -> ProbeResult<Vec<GpuReading>> {
        self.gpus.clone()
    }
    fn users(&self) -> ProbeResult<Vec<LoggedInUser>> {
        Ok(Vec::new())
    }
    fn disk_partitions(&self) -> Vec<Partition> {
        Vec::new()
    }
    fn boot_time(&self) -> u64 {
        1_700_000_000
    }
    fn cpu_count(&self, logical: bool) -> Option<usize> {
        Some(if logical { 4 } else { 2 })
    }
    fn net_connections(&self) -> ProbeResult<Vec<Connection>> {
        Ok(Vec::new())
    }
}
