//! Centralized constants for the application
//!
//! This module contains all magic numbers and configuration constants
//! used throughout the application, making them easy to find and modify.

// ============================================================================
// Application Info
// ============================================================================

/// Application name displayed in header
pub const DISPLAY_NAME: &str = "Hel Process Manager";

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Application version from Cargo.toml
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used for config and log files
pub const CONFIG_DIR_NAME: &str = "hel-process-manager";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Log file name inside the data directory
pub const LOG_FILE_NAME: &str = "hel-process-manager.log";

// ============================================================================
// Refresh Rate (milliseconds)
// ============================================================================

/// Default tick interval in milliseconds
pub const DEFAULT_REFRESH_MS: u64 = 1000;

/// Minimum allowed refresh interval
pub const MIN_REFRESH_MS: u64 = 250;

/// Maximum allowed refresh interval
pub const MAX_REFRESH_MS: u64 = 10000;

// ============================================================================
// Series and rates
// ============================================================================

/// Samples kept per metric series
pub const SERIES_CAPACITY: usize = 60;

/// Bytes in a kilobyte
pub const BYTES_PER_KB: f64 = 1024.0;

/// Bytes in a megabyte
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Bytes in a gigabyte
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Sector size used by /proc/diskstats
pub const DISKSTATS_SECTOR_BYTES: u64 = 512;

// ============================================================================
// Process actions
// ============================================================================

/// Lowest accepted nice value
pub const NICE_MIN: i32 = -20;

/// Highest accepted nice value
pub const NICE_MAX: i32 = 19;

/// Hint attached to permission failures
pub const ELEVATION_HINT: &str = "try running with elevated privileges (root/Administrator)";

// ============================================================================
// Display sentinels
// ============================================================================

/// Shown when a field could not be read
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown when the OS refused to expose a field
pub const PERMISSION_DENIED: &str = "Permission Denied";

/// Format used for process start and boot times
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Navigation
// ============================================================================

/// Lines subtracted from terminal height to calculate visible rows
/// (accounts for header, footer, etc.)
pub const VISIBLE_ROWS_OVERHEAD: usize = 6;

/// Rows in the detail view before the open files section
/// (pid plus one per detail field)
pub const DETAIL_INFO_ROWS: usize = 12;

// ============================================================================
// UI Dialog Dimensions
// ============================================================================

/// Width of the help dialog box
pub const HELP_DIALOG_WIDTH: usize = 56;

/// Width of the CPU affinity dialog box
pub const AFFINITY_DIALOG_WIDTH: usize = 60;

/// Width of the renice / io priority prompt
pub const PROMPT_DIALOG_WIDTH: usize = 56;

/// Minimum margin from screen edge for dialogs
pub const DIALOG_MARGIN: usize = 4;

/// Width of the key column in help dialog
pub const HELP_KEY_COL_WIDTH: usize = 14;

/// Height in rows of one sparkline graph on the performance view
pub const GRAPH_HEIGHT: usize = 4;

// ============================================================================
// CPU Usage Thresholds (for coloring)
// ============================================================================

/// CPU usage threshold for red color (critical)
pub const CPU_THRESHOLD_CRITICAL: f64 = 80.0;

/// CPU usage threshold for yellow color (warning)
pub const CPU_THRESHOLD_WARNING: f64 = 50.0;

/// CPU usage threshold for cyan color (moderate)
pub const CPU_THRESHOLD_MODERATE: f64 = 20.0;
