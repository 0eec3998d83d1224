//! Utility functions for UI rendering

use chrono::{Local, TimeZone};
use crossterm::style::Color;

use crate::constants::{
    BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB, CPU_THRESHOLD_CRITICAL, CPU_THRESHOLD_MODERATE,
    CPU_THRESHOLD_WARNING, NOT_AVAILABLE, TIMESTAMP_FORMAT,
};

/// Eighth-block glyphs, empty to full.
const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Truncates a string to fit within a given width.
///
/// If the string exceeds `max_len` characters, it is truncated and "..."
/// is appended.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Formats a byte count with a binary unit.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < BYTES_PER_KB {
        format!("{:.0} B", bytes)
    } else if bytes < BYTES_PER_MB {
        format!("{:.1} KB", bytes / BYTES_PER_KB)
    } else if bytes < BYTES_PER_GB {
        format!("{:.1} MB", bytes / BYTES_PER_MB)
    } else {
        format!("{:.1} GB", bytes / BYTES_PER_GB)
    }
}

/// Formats a rate given in KB/s, switching to MB/s above 1024.
#[must_use]
pub fn format_kbs(kbs: f64) -> String {
    if kbs < BYTES_PER_KB {
        format!("{:.1} KB/s", kbs)
    } else {
        format!("{:.1} MB/s", kbs / BYTES_PER_KB)
    }
}

/// Local time for a Unix timestamp.
#[must_use]
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Returns a color based on CPU usage percentage for visual indication.
///
/// # Color Thresholds
/// * Red - Critical usage (≥80%)
/// * Yellow - Warning level (≥50%)
/// * Cyan - Moderate usage (≥20%)
/// * Green - Low usage (<20%)
#[must_use]
pub fn cpu_color(percent: f64) -> Color {
    if percent >= CPU_THRESHOLD_CRITICAL {
        Color::Red
    } else if percent >= CPU_THRESHOLD_WARNING {
        Color::Yellow
    } else if percent >= CPU_THRESHOLD_MODERATE {
        Color::Cyan
    } else {
        Color::Green
    }
}

/// Draws `values` as a block graph `height` rows tall, top row first.
///
/// Only the newest `width` samples are shown. Values are scaled against
/// `ceiling`, or against the largest sample when no ceiling is given.
#[must_use]
pub fn sparkline(values: &[f64], width: usize, height: usize, ceiling: Option<f64>) -> Vec<String> {
    let shown = &values[values.len().saturating_sub(width)..];
    let max = ceiling
        .unwrap_or_else(|| shown.iter().copied().fold(0.0, f64::max))
        .max(f64::EPSILON);
    let levels = height * 8;

    let filled: Vec<usize> = shown
        .iter()
        .map(|v| ((v.max(0.0) / max).min(1.0) * levels as f64).round() as usize)
        .collect();

    (0..height)
        .map(|row| {
            let floor = (height - 1 - row) * 8;
            filled
                .iter()
                .map(|level| BLOCKS[level.saturating_sub(floor).min(8)])
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_counts_chars() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a long process name", 10), "a long ...");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(8 * 1024 * 1024 * 1024), "8.0 GB");
    }

    #[test]
    fn test_format_kbs() {
        assert_eq!(format_kbs(10.0), "10.0 KB/s");
        assert_eq!(format_kbs(2048.0), "2.0 MB/s");
    }

    #[test]
    fn test_sparkline_scales_to_ceiling() {
        let rows = sparkline(&[0.0, 50.0, 100.0], 10, 2, Some(100.0));
        assert_eq!(rows, vec!["  █".to_string(), " ██".to_string()]);
    }

    #[test]
    fn test_sparkline_keeps_newest_samples() {
        let rows = sparkline(&[100.0, 0.0, 0.0], 2, 1, Some(100.0));
        assert_eq!(rows, vec!["  ".to_string()]);
    }
}
