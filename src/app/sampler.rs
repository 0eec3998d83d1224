//! Per-tick snapshot of processes and system resources
//!
//! Each tick runs a fixed sequence of stages against the OS sources. A stage
//! that fails is logged and skipped; the stages after it still run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use crate::constants::DEFAULT_REFRESH_MS;
use crate::system::{
    Connection, Field, GpuReading, InterfaceCounters, LoggedInUser, MemoryUsage, Partition,
    ProcessSource, ResourceSource, TemperatureReading,
};

use super::rates::{compute_rates, DiskRates, NetRates, RateReport, RateState};
use super::series::{SeriesKey, SeriesSet};
use super::ProcessRecord;

/// System-wide state at one tick. Rebuilt fully every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub memory: MemoryUsage,
    pub disk_percent: Field<f64>,
    /// Seconds since the Unix epoch
    pub boot_time: u64,
    pub logical_cpus: usize,
    pub physical_cpus: Field<usize>,
    pub partitions: Vec<Partition>,
    pub logged_in_users: Field<Vec<LoggedInUser>>,
    pub temperature_readings: Field<Vec<TemperatureReading>>,
    pub gpus: Field<Vec<GpuReading>>,
    pub interfaces: Vec<InterfaceCounters>,
    pub connections: Field<Vec<Connection>>,
}

/// Sampler settings fixed at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub interval: Duration,
    pub disk_mount: PathBuf,
    /// Read the system socket table every tick
    pub sample_connections: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_REFRESH_MS),
            disk_mount: PathBuf::from("/"),
            sample_connections: true,
        }
    }
}

/// The stages of one tick, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStage {
    Resources,
    Rates,
    Series,
    Processes,
    StatusLine,
}

impl TickStage {
    pub const ORDER: [TickStage; 5] = [
        TickStage::Resources,
        TickStage::Rates,
        TickStage::Series,
        TickStage::Processes,
        TickStage::StatusLine,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TickStage::Resources => "resources",
            TickStage::Rates => "rates",
            TickStage::Series => "series",
            TickStage::Processes => "processes",
            TickStage::StatusLine => "status line",
        }
    }
}

/// Everything one tick produced.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// All processes in OS enumeration order
    pub records: Vec<ProcessRecord>,
    pub resources: Option<ResourceSnapshot>,
    pub rates: Option<RateReport>,
    pub status_line: String,
    /// Stages that failed this tick
    pub failed_stages: Vec<TickStage>,
}

/// Values handed from one stage to the next within a tick.
#[derive(Default)]
struct TickContext {
    elapsed_secs: f64,
    report: TickReport,
}

/// Drives the per-tick stages and owns everything that must survive
/// between ticks: counter baselines, series history and the tick clock.
pub struct Sampler {
    config: SamplerConfig,
    rate_state: RateState,
    series: SeriesSet,
    last_tick: Option<Instant>,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            rate_state: RateState::default(),
            series: SeriesSet::new(),
            last_tick: None,
        }
    }

    pub fn series(&self) -> &SeriesSet {
        &self.series
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.config.interval = interval;
    }

    /// Runs one tick against both sources.
    pub fn tick(
        &mut self,
        processes: &mut dyn ProcessSource,
        resources: &mut dyn ResourceSource,
    ) -> TickReport {
        let now = Instant::now();
        let mut ctx = TickContext {
            elapsed_secs: self.elapsed_secs(now),
            report: TickReport::default(),
        };

        for stage in TickStage::ORDER {
            let result = match stage {
                TickStage::Resources => self.sample_resources(&mut ctx, resources),
                TickStage::Rates => self.sample_rates(&mut ctx, resources),
                TickStage::Series => self.append_series(&mut ctx),
                TickStage::Processes => Self::sample_processes(&mut ctx, processes),
                TickStage::StatusLine => Self::build_status_line(&mut ctx),
            };
            if let Err(err) = result {
                warn!("{} stage failed: {:#}", stage.name(), err);
                ctx.report.failed_stages.push(stage);
            }
        }

        self.last_tick = Some(now);
        ctx.report
    }

    /// Measured time since the previous tick, or the configured interval
    /// when there is no usable measurement.
    fn elapsed_secs(&self, now: Instant) -> f64 {
        let measured = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        if measured > 0.0 {
            measured
        } else {
            self.config.interval.as_secs_f64()
        }
    }

    fn sample_resources(
        &self,
        ctx: &mut TickContext,
        resources: &mut dyn ResourceSource,
    ) -> Result<()> {
        resources.refresh().context("refreshing system counters")?;

        let memory = resources.virtual_memory();
        let connections = if self.config.sample_connections {
            resources.net_connections().into()
        } else {
            Field::Unavailable
        };

        ctx.report.resources = Some(ResourceSnapshot {
            cpu_percent: resources.cpu_percent(),
            ram_percent: memory.percent,
            memory,
            disk_percent: Field::from(resources.disk_usage(&self.config.disk_mount))
                .map(|d| d.percent),
            boot_time: resources.boot_time(),
            logical_cpus: resources.cpu_count(true).unwrap_or(1),
            physical_cpus: resources.cpu_count(false).map_or(Field::Unavailable, Field::Present),
            partitions: resources.disk_partitions(),
            logged_in_users: resources.users().into(),
            temperature_readings: resources.sensors_temperatures().into(),
            gpus: resources.gpu_stats().into(),
            interfaces: resources.net_io_per_interface(),
            connections,
        });
        Ok(())
    }

    fn sample_rates(
        &mut self,
        ctx: &mut TickContext,
        resources: &mut dyn ResourceSource,
    ) -> Result<()> {
        let net = match resources.net_io_counters() {
            Ok(counters) => Some(counters),
            Err(err) => {
                debug!("network counters unavailable: {}", err);
                None
            }
        };
        let disk = resources.disk_io_counters();

        let (report, state) = compute_rates(self.rate_state, net, disk, ctx.elapsed_secs);
        self.rate_state = state;
        ctx.report.rates = Some(report);
        Ok(())
    }

    fn append_series(&mut self, ctx: &mut TickContext) -> Result<()> {
        if let Some(rates) = ctx.report.rates {
            match rates.net {
                NetRates::Available { upload_kbs, download_kbs } => {
                    self.series.append(SeriesKey::Upload, upload_kbs);
                    self.series.append(SeriesKey::Download, download_kbs);
                }
                NetRates::Unavailable => {
                    self.series.mark_unavailable(SeriesKey::Upload);
                    self.series.mark_unavailable(SeriesKey::Download);
                }
            }
            match rates.disk {
                DiskRates::Available { read_kbs, write_kbs } => {
                    self.series.append(SeriesKey::DiskRead, read_kbs);
                    self.series.append(SeriesKey::DiskWrite, write_kbs);
                }
                DiskRates::Unavailable => {
                    self.series.mark_unavailable(SeriesKey::DiskRead);
                    self.series.mark_unavailable(SeriesKey::DiskWrite);
                }
            }
        }

        let Some(snapshot) = &ctx.report.resources else {
            bail!("no resource snapshot for cpu and ram series");
        };
        self.series.append(SeriesKey::Cpu, snapshot.cpu_percent);
        self.series.append(SeriesKey::Ram, snapshot.ram_percent);
        Ok(())
    }

    fn sample_processes(ctx: &mut TickContext, processes: &mut dyn ProcessSource) -> Result<()> {
        let handles = processes.enumerate().context("enumerating processes")?;
        let total = handles.len();
        ctx.report.records = handles
            .iter()
            .filter_map(|handle| ProcessRecord::from_handle(handle.as_ref()))
            .collect();
        let dropped = total - ctx.report.records.len();
        if dropped > 0 {
            debug!("{} processes exited during enumeration", dropped);
        }
        Ok(())
    }

    fn build_status_line(ctx: &mut TickContext) -> Result<()> {
        let Some(snapshot) = &ctx.report.resources else {
            bail!("no resource snapshot");
        };
        ctx.report.status_line = format_status_line(snapshot);
        Ok(())
    }
}

/// `CPU: x% | RAM: y% | Disk: z%`
pub fn format_status_line(snapshot: &ResourceSnapshot) -> String {
    format!(
        "CPU: {:.1}% | RAM: {:.1}% | Disk: {}",
        snapshot.cpu_percent,
        snapshot.ram_percent,
        snapshot.disk_percent.display_with(|p| format!("{:.1}%", p))
    )
}

/// Rows whose name contains `filter` (ignoring case) or whose pid text
/// contains it. An empty filter keeps every row.
pub fn filter_records(records: &[ProcessRecord], filter: &str) -> Vec<ProcessRecord> {
    if filter.is_empty() {
        return records.to_vec();
    }
    let needle = filter.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle) || r.pid.to_string().contains(&needle))
        .cloned()
        .collect()
}
