//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{MAX_REFRESH_MS, MIN_REFRESH_MS};

use super::SortColumn;

/// Interactive process monitor with live resource graphs and process controls.
///
/// Flags override the values from the config file.
#[derive(Debug, Default, Parser)]
#[command(version, about)]
pub struct Args {
    /// Refresh interval in milliseconds (250-10000)
    #[arg(
        short = 'i',
        long = "interval",
        alias = "refresh",
        env = "HEL_INTERVAL_MS",
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(MIN_REFRESH_MS..=MAX_REFRESH_MS)
    )]
    pub interval: Option<u64>,

    /// Initial filter matched against process names and pids
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Initial sort column
    #[arg(short, long, value_enum, value_name = "COLUMN")]
    pub sort: Option<SortColumn>,

    /// Keep the sort order across refreshes
    #[arg(long)]
    pub pin_sort: bool,

    /// Mount point whose usage is shown as "Disk"
    #[arg(long, value_name = "PATH")]
    pub disk_mount: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(short, long, env = "HEL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs here instead of the default data directory
    #[arg(long, env = "HEL_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print one summary to stdout and exit (non-interactive)
    #[arg(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_flags() {
        let args = Args::try_parse_from([
            "hel",
            "--interval",
            "500",
            "--filter",
            "fire",
            "--sort",
            "mem",
            "--pin-sort",
            "--disk-mount",
            "/home",
            "--once",
        ])
        .unwrap();
        assert_eq!(args.interval, Some(500));
        assert_eq!(args.filter.as_deref(), Some("fire"));
        assert_eq!(args.sort, Some(SortColumn::Memory));
        assert!(args.pin_sort);
        assert_eq!(args.disk_mount, Some(PathBuf::from("/home")));
        assert!(args.once);
    }

    #[test]
    fn test_rejects_interval_out_of_range() {
        assert!(Args::try_parse_from(["hel", "--interval", "100"]).is_err());
        assert!(Args::try_parse_from(["hel", "--interval", "20000"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_sort_column() {
        assert!(Args::try_parse_from(["hel", "--sort", "handles"]).is_err());
    }
}
