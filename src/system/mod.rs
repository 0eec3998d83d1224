//! System information module - process and resource probes
//!
//! This module provides the OS-facing traits the rest of the application
//! is written against, plus the sysinfo-backed implementation and the
//! platform-specific probes it falls back on.

pub mod error;
pub mod field;
pub mod native;
pub mod reveal;
pub mod source;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod win32;

#[cfg(test)]
pub mod fake;

pub use error::{ActionError, ActionResult, ProbeError};
pub use field::Field;
pub use native::{NativeProcessSource, NativeResourceSource};
pub use reveal::{FileManagerRevealer, Revealer};
pub use source::{
    Connection, DiskCounters, GpuReading, InterfaceCounters, IoPriority, LoggedInUser,
    MemoryUsage, NetCounters, OpenFile, Partition, ProcessHandle, ProcessSource, ProcessStatus,
    ResourceSource, TemperatureReading,
};
