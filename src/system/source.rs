//! OS collaborator interfaces
//!
//! The sampler and the action gateway only ever talk to the operating system
//! through these traits. `native` provides the real implementation.

use std::fmt;
use std::path::{Path, PathBuf};

use super::error::ProbeResult;

// ============================================================================
// Process data
// ============================================================================

/// Scheduler state of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    Tracing,
    Zombie,
    Dead,
    Idle,
    Unknown(String),
}

impl ProcessStatus {
    /// True when the process is stopped by a signal (or suspended on Windows).
    #[inline]
    pub fn is_stopped(&self) -> bool {
        matches!(self, ProcessStatus::Stopped)
    }

    pub fn name(&self) -> &str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::DiskSleep => "disk-sleep",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Tracing => "tracing-stop",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Unknown(name) => name,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// I/O scheduling class, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IoPriority {
    Idle,
    Low,
    BelowNormal,
    Normal,
    AboveNormal,
    High,
}

impl IoPriority {
    /// All classes in ascending order.
    pub const ALL: [IoPriority; 6] = [
        IoPriority::Idle,
        IoPriority::Low,
        IoPriority::BelowNormal,
        IoPriority::Normal,
        IoPriority::AboveNormal,
        IoPriority::High,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IoPriority::Idle => "Idle",
            IoPriority::Low => "Low",
            IoPriority::BelowNormal => "Below Normal",
            IoPriority::Normal => "Normal",
            IoPriority::AboveNormal => "Above Normal",
            IoPriority::High => "High",
        }
    }
}

impl fmt::Display for IoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file held open by a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub path: PathBuf,
    pub fd: Option<u32>,
}

/// Transport of an inet socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Tcp,
    Udp,
}

impl SocketKind {
    pub fn name(&self) -> &'static str {
        match self {
            SocketKind::Tcp => "TCP",
            SocketKind::Udp => "UDP",
        }
    }
}

/// An inet socket, either owned by one process or taken from the system table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub kind: SocketKind,
    pub local: String,
    /// Empty when the socket is not connected
    pub remote: String,
    pub status: String,
    pub pid: Option<u32>,
}

// ============================================================================
// Resource data
// ============================================================================

/// System memory totals in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub percent: f64,
}

/// Usage of one mounted filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    pub fn from_totals(total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        let percent = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };
        Self { total, used, free, percent }
    }
}

/// Cumulative disk I/O byte counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Cumulative network byte counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Counters of one network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub counters: NetCounters,
}

/// One temperature sensor reading in degrees Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub label: String,
    pub celsius: f32,
}

/// One GPU as reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuReading {
    pub name: String,
    pub utilization_percent: f32,
    pub memory_used: u64,
    pub memory_total: u64,
}

/// A user session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub name: String,
    pub terminal: String,
    pub host: String,
    /// Seconds since the Unix epoch
    pub started: u64,
}

/// A mounted filesystem with its usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub usage: DiskUsage,
}

// ============================================================================
// Traits
// ============================================================================

/// A live process whose fields are probed on demand.
///
/// Every accessor may fail on its own; a handle never caches failures.
pub trait ProcessHandle {
    fn pid(&self) -> u32;
    fn name(&self) -> ProbeResult<String>;
    fn cpu_percent(&self) -> ProbeResult<f64>;
    fn mem_percent(&self) -> ProbeResult<f64>;
    fn username(&self) -> ProbeResult<String>;
    /// Seconds since the Unix epoch
    fn create_time(&self) -> ProbeResult<u64>;
    fn exe(&self) -> ProbeResult<PathBuf>;
    fn cmdline(&self) -> ProbeResult<Vec<String>>;
    fn cwd(&self) -> ProbeResult<PathBuf>;
    fn num_threads(&self) -> ProbeResult<u32>;
    fn ppid(&self) -> ProbeResult<u32>;
    fn status(&self) -> ProbeResult<ProcessStatus>;
    fn open_files(&self) -> ProbeResult<Vec<OpenFile>>;
    fn connections(&self) -> ProbeResult<Vec<Connection>>;
    fn nice(&self) -> ProbeResult<i32>;
    fn cpu_affinity(&self) -> ProbeResult<Vec<usize>>;
    fn io_priority(&self) -> ProbeResult<IoPriority>;

    fn kill(&self) -> ProbeResult<()>;
    fn suspend(&self) -> ProbeResult<()>;
    fn resume(&self) -> ProbeResult<()>;
    fn set_nice(&self, value: i32) -> ProbeResult<()>;
    fn set_cpu_affinity(&self, cores: &[usize]) -> ProbeResult<()>;
    fn set_io_priority(&self, class: IoPriority) -> ProbeResult<()>;
}

/// Enumerates and resolves live processes.
pub trait ProcessSource {
    /// All live processes in OS enumeration order.
    fn enumerate(&mut self) -> ProbeResult<Vec<Box<dyn ProcessHandle>>>;

    /// Resolves a single pid. Fails with `NoSuchProcess` if it is gone.
    fn open(&mut self, pid: u32) -> ProbeResult<Box<dyn ProcessHandle>>;
}

/// Point-in-time system counters.
pub trait ResourceSource {
    /// Pulls fresh counters from the OS. Called once per tick before reading.
    fn refresh(&mut self) -> ProbeResult<()>;

    fn cpu_percent(&self) -> f64;
    fn virtual_memory(&self) -> MemoryUsage;
    fn disk_usage(&self, path: &Path) -> ProbeResult<DiskUsage>;

    /// `None` when the platform exposes no disk counters.
    fn disk_io_counters(&self) -> Option<DiskCounters>;
    fn net_io_counters(&self) -> ProbeResult<NetCounters>;
    fn net_io_per_interface(&self) -> Vec<InterfaceCounters>;

    fn sensors_temperatures(&self) -> ProbeResult<Vec<TemperatureReading>>;
    fn gpu_stats(&self) -> ProbeResult<Vec<GpuReading>>;
    fn users(&self) -> ProbeResult<Vec<LoggedInUser>>;
    fn disk_partitions(&self) -> Vec<Partition>;
    /// Seconds since the Unix epoch
    fn boot_time(&self) -> u64;
    fn cpu_count(&self, logical: bool) -> Option<usize>;
    fn net_connections(&self) -> ProbeResult<Vec<Connection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage_percent() {
        let usage = DiskUsage::from_totals(200, 50);
        assert_eq!(usage.used, 150);
        assert!((usage.percent - 75.0).abs() < f64::EPSILON);
        assert_eq!(DiskUsage::from_totals(0, 0).percent, 0.0);
    }

    #[test]
    fn test_io_priority_ordering() {
        assert!(IoPriority::Idle < IoPriority::Normal);
        assert!(IoPriority::Normal < IoPriority::High);
        assert_eq!(IoPriority::ALL.len(), 6);
    }
}
