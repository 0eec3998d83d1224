//! Application state and core logic

use std::time::Duration;

use log::info;

use crate::config::Settings;
use crate::constants::{MAX_REFRESH_MS, MIN_REFRESH_MS};
use crate::startup::{StartupAdapter, StartupEntry};
use crate::system::{
    ActionError, ActionResult, NativeProcessSource, NativeResourceSource, ProcessSource,
    ResourceSource, Revealer, FileManagerRevealer,
};

use super::{
    filter_records, sort_records, ActionGateway, ActionOutcome, AffinityDialog, IoPriorityDialog,
    PendingKill, ProcessDetails, ProcessIdentity, ProcessRecord, RateReport, ResourceSnapshot,
    Sampler, SamplerConfig, SeriesSet, SortColumn, TickStage, ViewMode,
};

/// Application state
pub struct App {
    processes: Box<dyn ProcessSource>,
    resources: Box<dyn ResourceSource>,
    pub(super) startup: Box<dyn StartupAdapter>,
    sampler: Sampler,
    pub(super) gateway: ActionGateway,
    /// All processes from the last tick, in OS order unless sorted
    pub processes_list: Vec<ProcessRecord>,
    /// Rows visible after applying the filter
    pub filtered_processes: Vec<ProcessRecord>,
    pub resource_snapshot: Option<ResourceSnapshot>,
    pub rates: Option<RateReport>,
    /// `CPU: x% | RAM: y% | Disk: z%` from the last tick
    pub status_line: String,
    /// Result of the last action, shown in the footer until the next key
    pub status_message: Option<String>,
    /// Currently selected process index
    pub selected_index: usize,
    /// Scroll offset for the process list
    pub scroll_offset: usize,
    /// Column used by the next sort
    pub sort_column: SortColumn,
    /// Whether the rows are currently sorted by `sort_column`
    pub sort_applied: bool,
    /// Re-apply the sort after every refresh
    pub pin_sort: bool,
    /// Search filter string
    pub filter: String,
    /// Current view/input mode
    pub view_mode: ViewMode,
    /// Page that overlays such as help return to
    pub last_page: ViewMode,
    pub pending_kill: Option<PendingKill>,
    /// Target and typed text of the renice prompt
    pub renice_target: Option<(ProcessIdentity, String)>,
    pub renice_input: String,
    pub io_priority_dialog: Option<IoPriorityDialog>,
    pub affinity_dialog: Option<AffinityDialog>,
    /// Cached process details for the detail view
    pub detail_view_data: Option<ProcessDetails>,
    /// Scroll offset for detail view
    pub detail_scroll_offset: usize,
    pub startup_entries: Vec<StartupEntry>,
    pub startup_selected: usize,
    /// Scroll offset for the system and network pages
    pub page_scroll_offset: usize,
    /// Scroll offset for help overlay
    pub help_scroll_offset: usize,
    /// Refresh interval in milliseconds
    pub refresh_interval_ms: u64,
}

impl App {
    /// Creates an App over the given OS collaborators.
    pub fn new(
        settings: &Settings,
        processes: Box<dyn ProcessSource>,
        resources: Box<dyn ResourceSource>,
        startup: Box<dyn StartupAdapter>,
        revealer: Box<dyn Revealer>,
    ) -> Self {
        let logical_cpus = resources.cpu_count(true).unwrap_or(1);
        let sampler = Sampler::new(SamplerConfig {
            interval: settings.interval,
            disk_mount: settings.disk_mount.clone(),
            sample_connections: settings.sample_connections,
        });

        Self {
            processes,
            resources,
            startup,
            sampler,
            gateway: ActionGateway::new(revealer, logical_cpus),
            processes_list: Vec::new(),
            filtered_processes: Vec::new(),
            resource_snapshot: None,
            rates: None,
            status_line: String::new(),
            status_message: None,
            selected_index: 0,
            scroll_offset: 0,
            sort_column: settings.sort.unwrap_or_default(),
            sort_applied: false,
            pin_sort: settings.pin_sort || settings.sort.is_some(),
            filter: settings.filter.clone(),
            view_mode: ViewMode::default(),
            last_page: ViewMode::default(),
            pending_kill: None,
            renice_target: None,
            renice_input: String::new(),
            io_priority_dialog: None,
            affinity_dialog: None,
            detail_view_data: None,
            detail_scroll_offset: 0,
            startup_entries: Vec::new(),
            startup_selected: 0,
            page_scroll_offset: 0,
            help_scroll_offset: 0,
            refresh_interval_ms: settings.interval.as_millis() as u64,
        }
    }

    /// Creates an App backed by the real operating system.
    pub fn native(settings: &Settings) -> Self {
        Self::new(
            settings,
            Box::new(NativeProcessSource::new()),
            Box::new(NativeResourceSource::new()),
            crate::startup::platform_adapter(),
            Box::new(FileManagerRevealer),
        )
    }

    pub fn series(&self) -> &SeriesSet {
        self.sampler.series()
    }

    pub fn startup_adapter_name(&self) -> &'static str {
        self.startup.name()
    }

    /// Runs one sampler tick and rebuilds the visible rows.
    ///
    /// Rows come back in OS order; the sort is only re-applied when pinned.
    pub fn refresh(&mut self) {
        let report = self
            .sampler
            .tick(self.processes.as_mut(), self.resources.as_mut());

        if !report.failed_stages.contains(&TickStage::Processes) {
            self.processes_list = report.records;
        }
        if report.resources.is_some() {
            self.resource_snapshot = report.resources;
        }
        self.rates = report.rates;
        if !report.status_line.is_empty() {
            self.status_line = report.status_line;
        }

        self.sort_applied = false;
        if self.pin_sort {
            self.apply_sort();
        }
        self.apply_filter();
    }

    /// Sorts the current rows by `sort_column`.
    pub fn apply_sort(&mut self) {
        sort_records(&mut self.processes_list, self.sort_column);
        self.sort_applied = true;
    }

    /// Sorts by the next column, or by the current one if unsorted.
    pub fn cycle_sort(&mut self) {
        if self.sort_applied {
            self.sort_column = self.sort_column.next();
        }
        self.apply_sort();
        self.apply_filter();
    }

    pub fn toggle_pin_sort(&mut self) {
        self.pin_sort = !self.pin_sort;
        if self.pin_sort && !self.sort_applied {
            self.apply_sort();
            self.apply_filter();
        }
        self.status_message = Some(if self.pin_sort {
            format!("Sort pinned to {}", self.sort_column.name())
        } else {
            "Sort unpinned; rows follow OS order after the next refresh".to_string()
        });
    }

    /// Apply the current filter to the process list.
    ///
    /// Matches names case-insensitively and pids as text. Adjusts selection
    /// if needed.
    pub fn apply_filter(&mut self) {
        self.filtered_processes = filter_records(&self.processes_list, &self.filter);

        if self.selected_index >= self.filtered_processes.len() {
            self.selected_index = self.filtered_processes.len().saturating_sub(1);
        }
    }

    pub fn selected_process(&self) -> Option<&ProcessRecord> {
        self.filtered_processes.get(self.selected_index)
    }

    /// Runs a gateway call against the process source.
    pub(super) fn with_gateway<T>(
        &mut self,
        action: impl FnOnce(&ActionGateway, &mut dyn ProcessSource) -> ActionResult<T>,
    ) -> ActionResult<T> {
        action(&self.gateway, self.processes.as_mut())
    }

    /// Shows an action result in the footer. A vanished process or an
    /// applied change triggers an immediate refresh.
    pub(super) fn report_action(&mut self, result: ActionResult<ActionOutcome>) {
        match result {
            Ok(outcome) => {
                let applied = outcome.is_applied();
                self.status_message = Some(outcome.message().to_string());
                if applied {
                    self.refresh();
                }
            }
            Err(err) => {
                self.status_message = Some(err.to_string());
                if err == ActionError::ProcessVanished {
                    self.refresh();
                }
            }
        }
    }

    /// Increases refresh interval (slower refresh).
    ///
    /// Steps: 250ms → 500ms → 1s → 2s → 5s → 10s
    pub fn increase_refresh_interval(&mut self) {
        self.refresh_interval_ms = match self.refresh_interval_ms {
            x if x >= 5000 => MAX_REFRESH_MS,
            x if x >= 2000 => 5000,
            x if x >= 1000 => 2000,
            x if x >= 500 => 1000,
            _ => 500,
        };
        self.interval_changed();
    }

    /// Decreases refresh interval (faster refresh).
    ///
    /// Steps: 10s → 5s → 2s → 1s → 500ms → 250ms
    pub fn decrease_refresh_interval(&mut self) {
        self.refresh_interval_ms = match self.refresh_interval_ms {
            x if x <= 500 => MIN_REFRESH_MS,
            x if x <= 1000 => 500,
            x if x <= 2000 => 1000,
            x if x <= 5000 => 2000,
            _ => 5000,
        };
        self.interval_changed();
    }

    fn interval_changed(&mut self) {
        self.sampler
            .set_interval(Duration::from_millis(self.refresh_interval_ms));
        info!("refresh interval set to {} ms", self.refresh_interval_ms);
    }

    /// Formats refresh interval for display.
    ///
    /// # Returns
    /// A string like "2.0s" or "500ms" depending on interval.
    pub fn format_refresh_interval(&self) -> String {
        if self.refresh_interval_ms >= 1000 {
            format!("{:.1}s", self.refresh_interval_ms as f64 / 1000.0)
        } else {
            format!("{}ms", self.refresh_interval_ms)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::startup::UnsupportedStartup;
    use crate::system::fake::{FakeProcess, FakeProcessSource, FakeResourceSource};

    pub(crate) struct NoReveal;

    impl Revealer for NoReveal {
        fn reveal(&self, _dir: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn settings() -> Settings {
        Settings {
            interval: Duration::from_millis(1000),
            filter: String::new(),
            sort: None,
            pin_sort: false,
            disk_mount: PathBuf::from("/"),
            sample_connections: true,
            log_level: "info".into(),
            log_file: PathBuf::from("/dev/null"),
            once: false,
        }
    }

    pub(crate) fn test_app(source: FakeProcessSource, settings: &Settings) -> App {
        App::new(
            settings,
            Box::new(source),
            Box::new(FakeResourceSource::default()),
            Box::new(UnsupportedStartup),
            Box::new(NoReveal),
        )
    }

    fn three_processes() -> FakeProcessSource {
        FakeProcessSource::new(vec![
            FakeProcess::new(30, "zsh").with_cpu(1.0),
            FakeProcess::new(10, "Firefox").with_cpu(50.0),
            FakeProcess::new(20, "sshd").with_cpu(5.0),
        ])
    }

    fn pids(app: &App) -> Vec<u32> {
        app.filtered_processes.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_refresh_keeps_os_order() {
        let mut app = test_app(three_processes(), &settings());
        app.refresh();
        assert_eq!(pids(&app), vec![30, 10, 20]);
        assert_eq!(app.status_line, "CPU: 12.5% | RAM: 25.0% | Disk: 40.0%");
        assert_eq!(app.series().values(crate::app::SeriesKey::Cpu), vec![12.5]);
    }

    #[test]
    fn test_unpinned_sort_resets_on_refresh() {
        let mut app = test_app(three_processes(), &settings());
        app.refresh();
        app.cycle_sort();
        assert_eq!(pids(&app), vec![10, 20, 30]);

        app.refresh();
        assert_eq!(pids(&app), vec![30, 10, 20]);
        assert!(!app.sort_applied);
    }

    #[test]
    fn test_pinned_sort_survives_refresh() {
        let mut settings = settings();
        settings.sort = Some(SortColumn::Cpu);
        let mut app = test_app(three_processes(), &settings);
        app.refresh();
        assert_eq!(pids(&app), vec![30, 20, 10]);
        app.refresh();
        assert_eq!(pids(&app), vec![30, 20, 10]);
    }

    #[test]
    fn test_filter_by_name_and_pid() {
        let mut app = test_app(three_processes(), &settings());
        app.refresh();

        app.filter = "fire".into();
        app.apply_filter();
        assert_eq!(pids(&app), vec![10]);

        app.filter = "0".into();
        app.apply_filter();
        assert_eq!(pids(&app), vec![30, 10, 20]);

        app.filter = "nothing".into();
        app.apply_filter();
        assert!(app.filtered_processes.is_empty());
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_refresh_interval_steps_stay_in_range() {
        let mut app = test_app(FakeProcessSource::default(), &settings());
        for _ in 0..10 {
            app.increase_refresh_interval();
        }
        assert_eq!(app.refresh_interval_ms, MAX_REFRESH_MS);
        for _ in 0..10 {
            app.decrease_refresh_interval();
        }
        assert_eq!(app.refresh_interval_ms, MIN_REFRESH_MS);
        assert_eq!(app.format_refresh_interval(), "250ms");
    }
}
