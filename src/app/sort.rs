//! Sorting options for the process list

use std::cmp::Ordering;

use clap::ValueEnum;

use super::ProcessRecord;

/// Sort column options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortColumn {
    #[default]
    Pid,
    Name,
    Cpu,
    #[value(alias = "mem")]
    Memory,
    User,
    Status,
    Threads,
    Started,
    #[value(alias = "ppid")]
    Parent,
}

/// The displayed value a column sorts on.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortColumn {
    /// Cycle to the next sort option
    pub fn next(self) -> Self {
        match self {
            SortColumn::Pid => SortColumn::Name,
            SortColumn::Name => SortColumn::Cpu,
            SortColumn::Cpu => SortColumn::Memory,
            SortColumn::Memory => SortColumn::User,
            SortColumn::User => SortColumn::Status,
            SortColumn::Status => SortColumn::Threads,
            SortColumn::Threads => SortColumn::Started,
            SortColumn::Started => SortColumn::Parent,
            SortColumn::Parent => SortColumn::Pid,
        }
    }

    /// Get display name for the sort column
    pub fn name(&self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::Name => "Name",
            SortColumn::Cpu => "CPU%",
            SortColumn::Memory => "Mem%",
            SortColumn::User => "User",
            SortColumn::Status => "Status",
            SortColumn::Threads => "Threads",
            SortColumn::Started => "Started",
            SortColumn::Parent => "PPID",
        }
    }

    /// `None` when the value is missing for this row.
    fn key(&self, record: &ProcessRecord) -> Option<SortKey> {
        match self {
            SortColumn::Pid => Some(SortKey::Number(f64::from(record.pid))),
            SortColumn::Name => Some(SortKey::Text(record.name.to_lowercase())),
            SortColumn::Cpu => Some(SortKey::Number(record.cpu_percent)),
            SortColumn::Memory => Some(SortKey::Number(record.mem_percent)),
            SortColumn::User => record.user.as_option().map(|u| SortKey::Text(u.to_lowercase())),
            SortColumn::Status => Some(SortKey::Text(record.status.name().to_string())),
            SortColumn::Threads => record
                .thread_count
                .as_option()
                .map(|t| SortKey::Number(f64::from(*t))),
            SortColumn::Started => record
                .start_time
                .as_option()
                .map(|t| SortKey::Number(*t as f64)),
            SortColumn::Parent => record
                .parent_pid
                .as_option()
                .map(|p| SortKey::Number(f64::from(*p))),
        }
    }
}

/// Stable ascending sort on `column`. Rows missing the value go last.
pub fn sort_records(records: &mut [ProcessRecord], column: SortColumn) {
    records.sort_by(|a, b| match (column.key(a), column.key(b)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fake::FakeProcess;
    use crate::system::ProbeError;

    fn record(process: FakeProcess) -> ProcessRecord {
        ProcessRecord::from_handle(&process).unwrap()
    }

    #[test]
    fn test_sort_is_stable_and_ascending() {
        let mut rows = vec![
            record(FakeProcess::new(3, "b").with_cpu(5.0)),
            record(FakeProcess::new(1, "a").with_cpu(1.0)),
            record(FakeProcess::new(2, "c").with_cpu(5.0)),
        ];
        sort_records(&mut rows, SortColumn::Cpu);
        let pids: Vec<u32> = rows.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![1, 3, 2]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let mut rows = vec![
            record(FakeProcess::new(1, "zsh")),
            record(FakeProcess::new(2, "Bash")),
            record(FakeProcess::new(3, "awk")),
        ];
        sort_records(&mut rows, SortColumn::Name);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["awk", "Bash", "zsh"]);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let mut hidden = FakeProcess::new(1, "kworker");
        hidden.username = Err(ProbeError::AccessDenied);
        let mut rows = vec![
            record(hidden),
            record(FakeProcess::new(2, "vim")),
        ];
        sort_records(&mut rows, SortColumn::User);
        assert_eq!(rows[0].pid, 2);
        assert_eq!(rows[1].pid, 1);
    }

    #[test]
    fn test_cycle_visits_every_column() {
        let mut column = SortColumn::Pid;
        for _ in 0..9 {
            column = column.next();
        }
        assert_eq!(column, SortColumn::Pid);
    }
}
