//! sysinfo-backed process and resource sources
//!
//! sysinfo gives the portable baseline. Platform modules fill in what it
//! cannot report, or cannot report with a usable error class.

use std::path::{Path, PathBuf};

use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, Pid, Process,
    ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System, UpdateKind, Users,
};

#[cfg(target_os = "linux")]
use super::linux;
#[cfg(unix)]
use super::unix;
#[cfg(windows)]
use super::win32;

use super::error::{ProbeError, ProbeResult};
use super::source::{
    Connection, DiskCounters, DiskUsage, GpuReading, InterfaceCounters, IoPriority, LoggedInUser,
    MemoryUsage, NetCounters, OpenFile, Partition, ProcessHandle, ProcessSource,
    ProcessStatus, ResourceSource, TemperatureReading,
};

fn process_refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing()
        .with_cpu()
        .with_memory()
        .with_exe(UpdateKind::OnlyIfNotSet)
        .with_cmd(UpdateKind::OnlyIfNotSet)
        .with_cwd(UpdateKind::OnlyIfNotSet)
        .with_user(UpdateKind::OnlyIfNotSet)
}

fn map_status(status: sysinfo::ProcessStatus) -> ProcessStatus {
    match status {
        sysinfo::ProcessStatus::Run => ProcessStatus::Running,
        sysinfo::ProcessStatus::Sleep => ProcessStatus::Sleeping,
        sysinfo::ProcessStatus::UninterruptibleDiskSleep => ProcessStatus::DiskSleep,
        sysinfo::ProcessStatus::Stop => ProcessStatus::Stopped,
        sysinfo::ProcessStatus::Tracing => ProcessStatus::Tracing,
        sysinfo::ProcessStatus::Zombie => ProcessStatus::Zombie,
        sysinfo::ProcessStatus::Dead => ProcessStatus::Dead,
        sysinfo::ProcessStatus::Idle => ProcessStatus::Idle,
        other => ProcessStatus::Unknown(other.to_string().to_lowercase()),
    }
}

/// Falls back to the value sysinfo cached when the direct probe has no answer.
fn or_cached<T: Clone>(probe: ProbeResult<T>, cached: &Option<T>) -> ProbeResult<T> {
    match probe {
        Err(ProbeError::Unavailable) => cached.clone().ok_or(ProbeError::Unavailable),
        other => other,
    }
}

/// `NoSuchProcess` once the process has exited, so a row built from a
/// stale sysinfo entry is dropped.
fn ensure_alive(pid: u32) -> ProbeResult<()> {
    #[cfg(target_os = "linux")]
    {
        linux::ensure_alive(pid)
    }
    #[cfg(all(unix, not(target_os = "linux")))]
    {
        match unix::send_signal(pid, 0) {
            Err(ProbeError::NoSuchProcess) => Err(ProbeError::NoSuchProcess),
            _ => Ok(()),
        }
    }
    #[cfg(windows)]
    {
        win32::ensure_alive(pid)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
        Ok(())
    }
}

// ============================================================================
// Process handle
// ============================================================================

/// A process as seen by the last sysinfo refresh.
///
/// Cheap values are copied out of sysinfo; everything else is probed when
/// asked for.
pub struct NativeProcess {
    pid: u32,
    name: String,
    cpu_percent: f64,
    mem_percent: f64,
    username: Option<String>,
    start_time: u64,
    exe: Option<PathBuf>,
    cmdline: Vec<String>,
    cwd: Option<PathBuf>,
    ppid: Option<u32>,
    status: ProcessStatus,
    threads: Option<u32>,
}

impl NativeProcess {
    fn from_sysinfo(process: &Process, total_memory: u64, users: &Users) -> Self {
        let mem_percent = if total_memory == 0 {
            0.0
        } else {
            process.memory() as f64 / total_memory as f64 * 100.0
        };
        let username = process
            .user_id()
            .and_then(|uid| users.get_user_by_id(uid))
            .map(|user| user.name().to_string());

        Self {
            pid: process.pid().as_u32(),
            name: process.name().to_string_lossy().into_owned(),
            cpu_percent: f64::from(process.cpu_usage()).max(0.0),
            mem_percent,
            username,
            start_time: process.start_time(),
            exe: process.exe().map(Path::to_path_buf),
            cmdline: process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
            cwd: process.cwd().map(Path::to_path_buf),
            ppid: process.parent().map(|pid| pid.as_u32()),
            status: map_status(process.status()),
            threads: process.tasks().map(|tasks| tasks.len() as u32),
        }
    }
}

impl ProcessHandle for NativeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> ProbeResult<String> {
        ensure_alive(self.pid)?;
        Ok(self.name.clone())
    }

    fn cpu_percent(&self) -> ProbeResult<f64> {
        Ok(self.cpu_percent)
    }

    fn mem_percent(&self) -> ProbeResult<f64> {
        Ok(self.mem_percent)
    }

    fn username(&self) -> ProbeResult<String> {
        self.username.clone().ok_or(ProbeError::Unavailable)
    }

    fn create_time(&self) -> ProbeResult<u64> {
        Ok(self.start_time)
    }

    fn exe(&self) -> ProbeResult<PathBuf> {
        #[cfg(target_os = "linux")]
        let probe = linux::read_exe(self.pid);
        #[cfg(not(target_os = "linux"))]
        let probe = Err(ProbeError::Unavailable);
        or_cached(probe, &self.exe)
    }

    fn cmdline(&self) -> ProbeResult<Vec<String>> {
        Ok(self.cmdline.clone())
    }

    fn cwd(&self) -> ProbeResult<PathBuf> {
        #[cfg(target_os = "linux")]
        let probe = linux::read_cwd(self.pid);
        #[cfg(not(target_os = "linux"))]
        let probe = Err(ProbeError::Unavailable);
        or_cached(probe, &self.cwd)
    }

    fn num_threads(&self) -> ProbeResult<u32> {
        #[cfg(target_os = "linux")]
        let probe = linux::read_thread_count(self.pid);
        #[cfg(not(target_os = "linux"))]
        let probe = Err(ProbeError::Unavailable);
        or_cached(probe, &self.threads)
    }

    fn ppid(&self) -> ProbeResult<u32> {
        self.ppid.ok_or(ProbeError::Unavailable)
    }

    fn status(&self) -> ProbeResult<ProcessStatus> {
        #[cfg(windows)]
        {
            if win32::is_suspended(self.pid) {
                return Ok(ProcessStatus::Stopped);
            }
        }
        Ok(self.status.clone())
    }

    fn open_files(&self) -> ProbeResult<Vec<OpenFile>> {
        #[cfg(target_os = "linux")]
        {
            linux::read_open_files(self.pid)
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn connections(&self) -> ProbeResult<Vec<Connection>> {
        #[cfg(target_os = "linux")]
        {
            linux::process_connections(self.pid)
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn nice(&self) -> ProbeResult<i32> {
        #[cfg(target_os = "linux")]
        {
            linux::get_nice(self.pid)
        }
        #[cfg(windows)]
        {
            win32::get_nice(self.pid)
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn cpu_affinity(&self) -> ProbeResult<Vec<usize>> {
        #[cfg(target_os = "linux")]
        {
            linux::get_affinity(self.pid)
        }
        #[cfg(windows)]
        {
            win32::get_affinity(self.pid)
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn io_priority(&self) -> ProbeResult<IoPriority> {
        #[cfg(target_os = "linux")]
        {
            linux::get_io_priority(self.pid)
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn kill(&self) -> ProbeResult<()> {
        #[cfg(unix)]
        {
            unix::send_signal(self.pid, libc::SIGKILL)
        }
        #[cfg(windows)]
        {
            win32::terminate(self.pid)
        }
        #[cfg(not(any(unix, windows)))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn suspend(&self) -> ProbeResult<()> {
        #[cfg(unix)]
        {
            unix::send_signal(self.pid, libc::SIGSTOP)
        }
        #[cfg(windows)]
        {
            win32::suspend(self.pid)
        }
        #[cfg(not(any(unix, windows)))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn resume(&self) -> ProbeResult<()> {
        #[cfg(unix)]
        {
            unix::send_signal(self.pid, libc::SIGCONT)
        }
        #[cfg(windows)]
        {
            win32::resume(self.pid)
        }
        #[cfg(not(any(unix, windows)))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn set_nice(&self, value: i32) -> ProbeResult<()> {
        #[cfg(target_os = "linux")]
        {
            linux::set_nice(self.pid, value)
        }
        #[cfg(windows)]
        {
            win32::set_nice(self.pid, value)
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        {
            let _ = value;
            Err(ProbeError::Unavailable)
        }
    }

    fn set_cpu_affinity(&self, cores: &[usize]) -> ProbeResult<()> {
        #[cfg(target_os = "linux")]
        {
            linux::set_affinity(self.pid, cores)
        }
        #[cfg(windows)]
        {
            win32::set_affinity(self.pid, cores)
        }
        #[cfg(not(any(target_os = "linux", windows)))]
        {
            let _ = cores;
            Err(ProbeError::Unavailable)
        }
    }

    fn set_io_priority(&self, class: IoPriority) -> ProbeResult<()> {
        #[cfg(target_os = "linux")]
        {
            linux::set_io_priority(self.pid, class)
        }
        #[cfg(not(target_os = "linux"))]
        {
            let _ = class;
            Err(ProbeError::Unavailable)
        }
    }
}

// ============================================================================
// Process source
// ============================================================================

/// Live processes through sysinfo.
pub struct NativeProcessSource {
    system: System,
    users: Users,
}

impl NativeProcessSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        Self {
            system,
            users: Users::new_with_refreshed_list(),
        }
    }

    fn snapshot(&self, process: &Process) -> Box<dyn ProcessHandle> {
        Box::new(NativeProcess::from_sysinfo(
            process,
            self.system.total_memory(),
            &self.users,
        ))
    }
}

impl Default for NativeProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for NativeProcessSource {
    fn enumerate(&mut self) -> ProbeResult<Vec<Box<dyn ProcessHandle>>> {
        self.system
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, true, process_refresh_kind());
        self.users = Users::new_with_refreshed_list();

        let mut processes: Vec<&Process> = self.system.processes().values().collect();
        if processes.is_empty() {
            return Err(ProbeError::Other("process table is empty".to_string()));
        }
        // sysinfo keeps a hash map; pid order is what the OS hands out
        processes.sort_by_key(|p| p.pid());
        #[cfg(windows)]
        win32::prune_suspended(
            &processes
                .iter()
                .map(|p| p.pid().as_u32())
                .collect::<std::collections::HashSet<u32>>(),
        );
        Ok(processes.into_iter().map(|p| self.snapshot(p)).collect())
    }

    fn open(&mut self, pid: u32) -> ProbeResult<Box<dyn ProcessHandle>> {
        let sys_pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            process_refresh_kind(),
        );
        let process = self.system.process(sys_pid).ok_or(ProbeError::NoSuchProcess)?;
        Ok(self.snapshot(process))
    }
}

// ============================================================================
// Resource source
// ============================================================================

/// System counters through sysinfo.
pub struct NativeResourceSource {
    system: System,
    networks: Networks,
    disks: Disks,
    components: Components,
}

impl NativeResourceSource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            system,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for NativeResourceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSource for NativeResourceSource {
    fn refresh(&mut self) -> ProbeResult<()> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.networks.refresh(true);
        self.disks.refresh(true);
        self.components.refresh(true);
        Ok(())
    }

    fn cpu_percent(&self) -> f64 {
        f64::from(self.system.global_cpu_usage())
    }

    fn virtual_memory(&self) -> MemoryUsage {
        let total = self.system.total_memory();
        let used = total.saturating_sub(self.system.available_memory());
        let percent = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };
        MemoryUsage { total, used, percent }
    }

    fn disk_usage(&self, path: &Path) -> ProbeResult<DiskUsage> {
        self.disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| DiskUsage::from_totals(disk.total_space(), disk.available_space()))
            .ok_or(ProbeError::Unavailable)
    }

    fn disk_io_counters(&self) -> Option<DiskCounters> {
        #[cfg(target_os = "linux")]
        {
            linux::disk_io_counters()
        }
        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }

    fn net_io_counters(&self) -> ProbeResult<NetCounters> {
        Ok(self
            .networks
            .iter()
            .fold(NetCounters::default(), |acc, (_name, data)| NetCounters {
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
                bytes_recv: acc.bytes_recv + data.total_received(),
            }))
    }

    fn net_io_per_interface(&self) -> Vec<InterfaceCounters> {
        let mut interfaces: Vec<InterfaceCounters> = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.clone(),
                counters: NetCounters {
                    bytes_sent: data.total_transmitted(),
                    bytes_recv: data.total_received(),
                },
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        interfaces
    }

    fn sensors_temperatures(&self) -> ProbeResult<Vec<TemperatureReading>> {
        let readings: Vec<TemperatureReading> = self
            .components
            .list()
            .iter()
            .filter_map(|component| {
                component.temperature().map(|celsius| TemperatureReading {
                    label: component.label().to_string(),
                    celsius,
                })
            })
            .collect();
        if readings.is_empty() {
            return Err(ProbeError::Unavailable);
        }
        Ok(readings)
    }

    /// sysinfo has no GPU counters on any platform.
    fn gpu_stats(&self) -> ProbeResult<Vec<GpuReading>> {
        Err(ProbeError::Unavailable)
    }

    fn users(&self) -> ProbeResult<Vec<LoggedInUser>> {
        #[cfg(target_os = "linux")]
        {
            linux::logged_in_users()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unavailable)
        }
    }

    fn disk_partitions(&self) -> Vec<Partition> {
        self.disks
            .list()
            .iter()
            .map(|disk| Partition {
                device: disk.name().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().to_path_buf(),
                fs_type: disk.file_system().to_string_lossy().into_owned(),
                usage: DiskUsage::from_totals(disk.total_space(), disk.available_space()),
            })
            .collect()
    }

    fn boot_time(&self) -> u64 {
        System::boot_time()
    }

    fn cpu_count(&self, logical: bool) -> Option<usize> {
        if logical {
            Some(self.system.cpus().len().max(1))
        } else {
            System::physical_core_count()
        }
    }

    fn net_connections(&self) -> ProbeResult<Vec<Connection>> {
        #[cfg(target_os = "linux")]
        {
            linux::system_connections()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unavailable)
        }
    }
}
