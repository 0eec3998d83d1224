//! Throughput rates from cumulative counters
//!
//! The baselines from the previous tick are carried in a `RateState` value
//! that goes into `compute_rates` and comes back out updated. Nothing here
//! reads a clock or the OS.

use crate::constants::BYTES_PER_KB;
use crate::system::{DiskCounters, NetCounters};

/// Counter baselines from the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateState {
    pub net: Option<NetCounters>,
    pub disk: Option<DiskCounters>,
}

/// Network throughput in KB/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetRates {
    Available { upload_kbs: f64, download_kbs: f64 },
    Unavailable,
}

/// Disk throughput in KB/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiskRates {
    Available { read_kbs: f64, write_kbs: f64 },
    /// The platform exposes no disk counters. Never reported as zero.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateReport {
    pub net: NetRates,
    pub disk: DiskRates,
}

/// KB/s between two readings of one counter.
///
/// No baseline yet, or a counter that went backwards (reset or wrap),
/// gives 0 for this tick.
pub fn counter_rate(previous: Option<u64>, current: u64, elapsed_secs: f64) -> f64 {
    match previous {
        Some(previous) if current >= previous && elapsed_secs > 0.0 => {
            (current - previous) as f64 / elapsed_secs / BYTES_PER_KB
        }
        _ => 0.0,
    }
}

/// Computes this tick's rates and the baselines for the next one.
///
/// The new baseline is always the current reading. A source that reports
/// no counters clears its baseline so its first tick back reports 0.
pub fn compute_rates(
    state: RateState,
    net: Option<NetCounters>,
    disk: Option<DiskCounters>,
    elapsed_secs: f64,
) -> (RateReport, RateState) {
    let net_rates = match net {
        Some(current) => {
            let previous = state.net;
            NetRates::Available {
                upload_kbs: counter_rate(
                    previous.map(|p| p.bytes_sent),
                    current.bytes_sent,
                    elapsed_secs,
                ),
                download_kbs: counter_rate(
                    previous.map(|p| p.bytes_recv),
                    current.bytes_recv,
                    elapsed_secs,
                ),
            }
        }
        None => NetRates::Unavailable,
    };

    let disk_rates = match disk {
        Some(current) => {
            let previous = state.disk;
            DiskRates::Available {
                read_kbs: counter_rate(
                    previous.map(|p| p.read_bytes),
                    current.read_bytes,
                    elapsed_secs,
                ),
                write_kbs: counter_rate(
                    previous.map(|p| p.write_bytes),
                    current.write_bytes,
                    elapsed_secs,
                ),
            }
        }
        None => DiskRates::Unavailable,
    };

    let report = RateReport {
        net: net_rates,
        disk: disk_rates,
    };
    (report, RateState { net, disk })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(sent: u64, recv: u64) -> Option<NetCounters> {
        Some(NetCounters {
            bytes_sent: sent,
            bytes_recv: recv,
        })
    }

    #[test]
    fn test_first_tick_reports_zero_and_sets_baseline() {
        let (report, state) = compute_rates(RateState::default(), net(5000, 9000), None, 1.0);
        assert_eq!(
            report.net,
            NetRates::Available {
                upload_kbs: 0.0,
                download_kbs: 0.0
            }
        );
        assert_eq!(state.net, net(5000, 9000));
    }

    #[test]
    fn test_upload_one_kilobyte_per_second() {
        let (_, state) = compute_rates(RateState::default(), net(1000, 2000), None, 1.0);
        let (report, _) = compute_rates(state, net(2024, 2000), None, 1.0);
        assert_eq!(
            report.net,
            NetRates::Available {
                upload_kbs: 1.0,
                download_kbs: 0.0
            }
        );
    }

    #[test]
    fn test_counter_reset_reports_zero_and_rebases() {
        let (_, state) = compute_rates(RateState::default(), net(10_000, 10_000), None, 1.0);
        let (report, state) = compute_rates(state, net(100, 20_240), None, 1.0);
        assert_eq!(
            report.net,
            NetRates::Available {
                upload_kbs: 0.0,
                download_kbs: 10.0
            }
        );
        assert_eq!(state.net, net(100, 20_240));
    }

    #[test]
    fn test_rate_divides_by_elapsed() {
        assert_eq!(counter_rate(Some(0), 4096, 2.0), 2.0);
        assert_eq!(counter_rate(Some(0), 4096, 0.0), 0.0);
        assert_eq!(counter_rate(None, 4096, 1.0), 0.0);
    }

    #[test]
    fn test_missing_disk_counters_clear_baseline() {
        let disk = DiskCounters {
            read_bytes: 1024,
            write_bytes: 0,
        };
        let (_, state) = compute_rates(RateState::default(), None, Some(disk), 1.0);
        let (report, state) = compute_rates(state, None, None, 1.0);
        assert_eq!(report.disk, DiskRates::Unavailable);
        assert_eq!(state.disk, None);

        let back = DiskCounters {
            read_bytes: 1_000_000,
            write_bytes: 0,
        };
        let (report, _) = compute_rates(state, None, Some(back), 1.0);
        assert_eq!(
            report.disk,
            DiskRates::Available {
                read_kbs: 0.0,
                write_kbs: 0.0
            }
        );
    }
}
