//! Linux probes built on `/proc` and raw libc calls
//!
//! sysinfo covers enumeration and the common counters. Everything that needs
//! a precise error class (exe, cwd, fds, sockets) or that sysinfo does not
//! expose at all (nice, affinity, ioprio, stop/continue, sessions) lives here.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::mem;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use crate::constants::DISKSTATS_SECTOR_BYTES;

use super::error::{ProbeError, ProbeResult};
use super::source::{Connection, DiskCounters, IoPriority, LoggedInUser, OpenFile, SocketKind};
use super::unix::last_errno_error;

// ============================================================================
// Error classification
// ============================================================================

fn proc_dir(pid: u32) -> PathBuf {
    PathBuf::from(format!("/proc/{}", pid))
}

/// A missing entry under `/proc/<pid>` means the process exited only if the
/// directory itself is gone. Kernel threads have no `exe` link at all.
fn classify_proc_error(pid: u32, err: &io::Error) -> ProbeError {
    match ProbeError::from_io(err) {
        ProbeError::NoSuchProcess if proc_dir(pid).exists() => ProbeError::Unavailable,
        other => other,
    }
}

// ============================================================================
// Per-process files
// ============================================================================

/// `NoSuchProcess` once `/proc/<pid>` is gone.
pub fn ensure_alive(pid: u32) -> ProbeResult<()> {
    match fs::metadata(proc_dir(pid)) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ProbeError::NoSuchProcess),
        _ => Ok(()),
    }
}

pub fn read_exe(pid: u32) -> ProbeResult<PathBuf> {
    fs::read_link(proc_dir(pid).join("exe")).map_err(|e| classify_proc_error(pid, &e))
}

pub fn read_cwd(pid: u32) -> ProbeResult<PathBuf> {
    fs::read_link(proc_dir(pid).join("cwd")).map_err(|e| classify_proc_error(pid, &e))
}

/// Thread count from the `Threads:` line of `/proc/<pid>/status`.
pub fn read_thread_count(pid: u32) -> ProbeResult<u32> {
    let status = fs::read_to_string(proc_dir(pid).join("status"))
        .map_err(|e| classify_proc_error(pid, &e))?;
    parse_thread_count(&status).ok_or(ProbeError::Unavailable)
}

fn parse_thread_count(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Regular files reachable through `/proc/<pid>/fd`.
pub fn read_open_files(pid: u32) -> ProbeResult<Vec<OpenFile>> {
    let fd_dir = proc_dir(pid).join("fd");
    let entries = fs::read_dir(&fd_dir).map_err(|e| classify_proc_error(pid, &e))?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let target = match fs::read_link(entry.path()) {
            Ok(target) => target,
            Err(_) => continue,
        };
        if !target.is_absolute() || !target.is_file() {
            continue;
        }
        let fd = entry.file_name().to_str().and_then(|s| s.parse().ok());
        files.push(OpenFile { path: target, fd });
    }
    files.sort_by_key(|f| f.fd);
    Ok(files)
}

/// Socket inodes referenced by the fds of `pid`.
fn socket_inodes(pid: u32) -> ProbeResult<Vec<u64>> {
    let fd_dir = proc_dir(pid).join("fd");
    let entries = fs::read_dir(&fd_dir).map_err(|e| classify_proc_error(pid, &e))?;

    Ok(entries
        .flatten()
        .filter_map(|entry| fs::read_link(entry.path()).ok())
        .filter_map(|target| parse_socket_inode(&target))
        .collect())
}

fn parse_socket_inode(target: &Path) -> Option<u64> {
    target
        .to_str()?
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

// ============================================================================
// Sockets
// ============================================================================

/// One row of `/proc/net/{tcp,tcp6,udp,udp6}`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InetEntry {
    kind: SocketKind,
    local: String,
    remote: String,
    status: String,
    inode: u64,
}

const INET_TABLES: [(&str, SocketKind, bool); 4] = [
    ("/proc/net/tcp", SocketKind::Tcp, false),
    ("/proc/net/tcp6", SocketKind::Tcp, true),
    ("/proc/net/udp", SocketKind::Udp, false),
    ("/proc/net/udp6", SocketKind::Udp, true),
];

/// Formats an IPv4 address stored as a little-endian u32
fn format_ipv4(addr: u32) -> String {
    let bytes = addr.to_le_bytes();
    Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).to_string()
}

/// Formats an IPv6 address stored as four little-endian u32 words
fn format_ipv6(hex: &str) -> Option<String> {
    if hex.len() != 32 {
        return None;
    }
    let mut bytes = [0u8; 16];
    for (word, chunk) in bytes.chunks_mut(4).enumerate() {
        let value = u32::from_str_radix(&hex[word * 8..word * 8 + 8], 16).ok()?;
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    Some(Ipv6Addr::from(bytes).to_string())
}

/// Parses `ADDR:PORT` in kernel hex notation. The unspecified address with
/// port 0 means "not connected" and yields an empty string.
fn parse_endpoint(raw: &str, ipv6: bool) -> Option<String> {
    let (addr_hex, port_hex) = raw.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let is_zero = addr_hex.bytes().all(|b| b == b'0');
    if is_zero && port == 0 {
        return Some(String::new());
    }
    if ipv6 {
        Some(format!("[{}]:{}", format_ipv6(addr_hex)?, port))
    } else {
        let addr = u32::from_str_radix(addr_hex, 16).ok()?;
        Some(format!("{}:{}", format_ipv4(addr), port))
    }
}

fn tcp_state_name(state: u8) -> &'static str {
    match state {
        0x01 => "ESTABLISHED",
        0x02 => "SYN_SENT",
        0x03 => "SYN_RECV",
        0x04 => "FIN_WAIT1",
        0x05 => "FIN_WAIT2",
        0x06 => "TIME_WAIT",
        0x07 => "CLOSE",
        0x08 => "CLOSE_WAIT",
        0x09 => "LAST_ACK",
        0x0A => "LISTEN",
        0x0B => "CLOSING",
        _ => "UNKNOWN",
    }
}

fn parse_inet_table(content: &str, kind: SocketKind, ipv6: bool) -> Vec<InetEntry> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 {
                return None;
            }
            let local = parse_endpoint(fields[1], ipv6)?;
            let remote = parse_endpoint(fields[2], ipv6)?;
            let state = u8::from_str_radix(fields[3], 16).ok()?;
            let inode = fields[9].parse().ok()?;
            let status = match kind {
                SocketKind::Tcp => tcp_state_name(state).to_string(),
                SocketKind::Udp => "NONE".to_string(),
            };
            Some(InetEntry { kind, local, remote, status, inode })
        })
        .collect()
}

fn read_inet_tables() -> Vec<InetEntry> {
    INET_TABLES
        .iter()
        .filter_map(|(path, kind, ipv6)| {
            fs::read_to_string(path)
                .ok()
                .map(|content| parse_inet_table(&content, *kind, *ipv6))
        })
        .flatten()
        .collect()
}

fn to_connection(entry: InetEntry, pid: Option<u32>) -> Connection {
    Connection {
        kind: entry.kind,
        local: entry.local,
        remote: entry.remote,
        status: entry.status,
        pid,
    }
}

/// Inet sockets owned by `pid`.
pub fn process_connections(pid: u32) -> ProbeResult<Vec<Connection>> {
    let inodes = socket_inodes(pid)?;
    Ok(read_inet_tables()
        .into_iter()
        .filter(|entry| inodes.contains(&entry.inode))
        .map(|entry| to_connection(entry, Some(pid)))
        .collect())
}

/// Every inet socket on the system. Owners are filled in where the fd
/// table of the owning process is readable.
pub fn system_connections() -> ProbeResult<Vec<Connection>> {
    let entries = read_inet_tables();
    if entries.is_empty() && !Path::new("/proc/net/tcp").exists() {
        return Err(ProbeError::Unavailable);
    }

    let mut owners: HashMap<u64, u32> = HashMap::new();
    if let Ok(proc_entries) = fs::read_dir("/proc") {
        for entry in proc_entries.flatten() {
            let pid = match entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) {
                Some(pid) => pid,
                None => continue,
            };
            if let Ok(inodes) = socket_inodes(pid) {
                for inode in inodes {
                    owners.entry(inode).or_insert(pid);
                }
            }
        }
    }

    Ok(entries
        .into_iter()
        .map(|entry| {
            let pid = owners.get(&entry.inode).copied();
            to_connection(entry, pid)
        })
        .collect())
}

// ============================================================================
// Disk counters
// ============================================================================

/// Sums whole-device counters from `/proc/diskstats`.
pub fn disk_io_counters() -> Option<DiskCounters> {
    let content = fs::read_to_string("/proc/diskstats").ok()?;
    parse_diskstats(&content, |name| Path::new("/sys/block").join(name).exists())
}

fn parse_diskstats(content: &str, is_device: impl Fn(&str) -> bool) -> Option<DiskCounters> {
    let mut totals = DiskCounters::default();
    let mut seen = false;

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if name.starts_with("loop") || name.starts_with("ram") || !is_device(name) {
            continue;
        }
        let sectors_read: u64 = match fields[5].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let sectors_written: u64 = match fields[9].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        totals.read_bytes += sectors_read * DISKSTATS_SECTOR_BYTES;
        totals.write_bytes += sectors_written * DISKSTATS_SECTOR_BYTES;
        seen = true;
    }

    seen.then_some(totals)
}

// ============================================================================
// Scheduling
// ============================================================================

pub fn get_nice(pid: u32) -> ProbeResult<i32> {
    // SAFETY: errno is thread-local; getpriority can legitimately return -1
    // so errno is cleared first and checked afterwards.
    unsafe {
        *libc::__errno_location() = 0;
        let value = libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t);
        if value == -1 && *libc::__errno_location() != 0 {
            return Err(last_errno_error());
        }
        Ok(value)
    }
}

pub fn set_nice(pid: u32, value: i32) -> ProbeResult<()> {
    // SAFETY: setpriority only reads its arguments.
    let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid as libc::id_t, value) };
    if result == -1 {
        return Err(last_errno_error());
    }
    Ok(())
}

pub fn get_affinity(pid: u32) -> ProbeResult<Vec<usize>> {
    // SAFETY: cpu_set_t is plain data and sched_getaffinity writes at most
    // size_of::<cpu_set_t>() bytes into it.
    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        let result = libc::sched_getaffinity(
            pid as libc::pid_t,
            mem::size_of::<libc::cpu_set_t>(),
            &mut set,
        );
        if result == -1 {
            return Err(last_errno_error());
        }
        Ok((0..libc::CPU_SETSIZE as usize)
            .filter(|&core| libc::CPU_ISSET(core, &set))
            .collect())
    }
}

pub fn set_affinity(pid: u32, cores: &[usize]) -> ProbeResult<()> {
    // SAFETY: cores are range-checked by the caller against the logical core
    // count, which is always below CPU_SETSIZE.
    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_ZERO(&mut set);
        for &core in cores {
            libc::CPU_SET(core, &mut set);
        }
        let result =
            libc::sched_setaffinity(pid as libc::pid_t, mem::size_of::<libc::cpu_set_t>(), &set);
        if result == -1 {
            return Err(last_errno_error());
        }
    }
    Ok(())
}

const IOPRIO_WHO_PROCESS: libc::c_long = 1;
const IOPRIO_CLASS_SHIFT: u32 = 13;
const IOPRIO_CLASS_NONE: u32 = 0;
const IOPRIO_CLASS_RT: u32 = 1;
const IOPRIO_CLASS_BE: u32 = 2;
const IOPRIO_CLASS_IDLE: u32 = 3;

/// Maps a kernel `(class, level)` pair onto the six user-facing classes.
fn io_priority_from_kernel(class: u32, level: u32) -> IoPriority {
    match class {
        IOPRIO_CLASS_IDLE => IoPriority::Idle,
        IOPRIO_CLASS_RT => IoPriority::High,
        IOPRIO_CLASS_NONE => IoPriority::Normal,
        _ => match level {
            0..=1 => IoPriority::High,
            2..=3 => IoPriority::AboveNormal,
            4 => IoPriority::Normal,
            5..=6 => IoPriority::BelowNormal,
            _ => IoPriority::Low,
        },
    }
}

fn io_priority_to_kernel(priority: IoPriority) -> (u32, u32) {
    match priority {
        IoPriority::Idle => (IOPRIO_CLASS_IDLE, 0),
        IoPriority::Low => (IOPRIO_CLASS_BE, 7),
        IoPriority::BelowNormal => (IOPRIO_CLASS_BE, 5),
        IoPriority::Normal => (IOPRIO_CLASS_BE, 4),
        IoPriority::AboveNormal => (IOPRIO_CLASS_BE, 2),
        IoPriority::High => (IOPRIO_CLASS_BE, 0),
    }
}

pub fn get_io_priority(pid: u32) -> ProbeResult<IoPriority> {
    // SAFETY: ioprio_get takes two integers and returns an integer.
    let value =
        unsafe { libc::syscall(libc::SYS_ioprio_get, IOPRIO_WHO_PROCESS, pid as libc::c_long) };
    if value == -1 {
        return Err(last_errno_error());
    }
    let value = value as u32;
    Ok(io_priority_from_kernel(value >> IOPRIO_CLASS_SHIFT, value & 0xff))
}

pub fn set_io_priority(pid: u32, priority: IoPriority) -> ProbeResult<()> {
    let (class, level) = io_priority_to_kernel(priority);
    let value = ((class << IOPRIO_CLASS_SHIFT) | level) as libc::c_long;
    // SAFETY: ioprio_set takes three integers.
    let result = unsafe {
        libc::syscall(libc::SYS_ioprio_set, IOPRIO_WHO_PROCESS, pid as libc::c_long, value)
    };
    if result == -1 {
        return Err(last_errno_error());
    }
    Ok(())
}

// ============================================================================
// Sessions
// ============================================================================

fn c_chars_to_string(raw: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Logged-in users from the utmp database.
pub fn logged_in_users() -> ProbeResult<Vec<LoggedInUser>> {
    let mut users = Vec::new();
    // SAFETY: setutxent/getutxent/endutxent are used from the single UI
    // thread only; each returned record is copied out before the next call.
    unsafe {
        libc::setutxent();
        loop {
            let record = libc::getutxent();
            if record.is_null() {
                break;
            }
            let record = &*record;
            if record.ut_type != libc::USER_PROCESS {
                continue;
            }
            users.push(LoggedInUser {
                name: c_chars_to_string(&record.ut_user),
                terminal: c_chars_to_string(&record.ut_line),
                host: c_chars_to_string(&record.ut_host),
                started: record.ut_tv.tv_sec.max(0) as u64,
            });
        }
        libc::endutxent();
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ipv4() {
        assert_eq!(format_ipv4(0x0100007F), "127.0.0.1"); // localhost
        assert_eq!(format_ipv4(0), "0.0.0.0");
    }

    #[test]
    fn test_parse_tcp_table() {
        let table = concat!(
            "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt",
            "   uid  timeout inode\n",
            "   0: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000",
            "     0        0 23181 1 0000000000000000 100 0 0 10 0\n",
            "   1: 0100007F:A2C4 0100007F:0277 01 00000000:00000000 00:00000000 00000000",
            "  1000        0 99871 1 0000000000000000 20 4 30 10 -1\n",
        );
        let entries = parse_inet_table(table, SocketKind::Tcp, false);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].local, "127.0.0.1:631");
        assert_eq!(entries[0].remote, "");
        assert_eq!(entries[0].status, "LISTEN");
        assert_eq!(entries[0].inode, 23181);
        assert_eq!(entries[1].remote, "127.0.0.1:631");
        assert_eq!(entries[1].status, "ESTABLISHED");
    }

    #[test]
    fn test_parse_ipv6_loopback() {
        let endpoint = parse_endpoint("00000000000000000000000001000000:0035", true);
        assert_eq!(endpoint.as_deref(), Some("[::1]:53"));
    }

    #[test]
    fn test_parse_socket_inode() {
        assert_eq!(parse_socket_inode(Path::new("socket:[4242]")), Some(4242));
        assert_eq!(parse_socket_inode(Path::new("/dev/null")), None);
    }

    #[test]
    fn test_parse_diskstats_skips_partitions_and_loops() {
        let stats = "   8       0 sda 100 0 10 0 50 0 20 0 0 0 0\n   \
            8       1 sda1 90 0 8 0 40 0 16 0 0 0 0\n   \
            7       0 loop0 5 0 4 0 0 0 0 0 0 0 0\n";
        let counters = parse_diskstats(stats, |name| name == "sda").unwrap();
        assert_eq!(counters.read_bytes, 10 * 512);
        assert_eq!(counters.write_bytes, 20 * 512);

        assert!(parse_diskstats("", |_| true).is_none());
    }

    #[test]
    fn test_parse_thread_count() {
        let status = "Name:\tbash\nState:\tS (sleeping)\nThreads:\t4\n";
        assert_eq!(parse_thread_count(status), Some(4));
        assert_eq!(parse_thread_count("Name:\tbash\n"), None);
    }

    #[test]
    fn test_io_priority_kernel_mapping() {
        for class in IoPriority::ALL {
            let (kernel_class, level) = io_priority_to_kernel(class);
            assert_eq!(io_priority_from_kernel(kernel_class, level), class);
        }
    }

    #[test]
    fn test_probes_on_current_process() {
        let pid = std::process::id();
        assert!(read_exe(pid).is_ok());
        assert!(read_thread_count(pid).unwrap() >= 1);
        assert!(get_nice(pid).is_ok());
        assert!(!get_affinity(pid).unwrap().is_empty());
    }

    #[test]
    fn test_missing_process_is_no_such_process() {
        // pid_max never reaches u32::MAX
        assert_eq!(read_exe(u32::MAX - 1), Err(ProbeError::NoSuchProcess));
    }
}
