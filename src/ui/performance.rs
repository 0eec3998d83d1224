//! Performance page: one rolling graph per metric

use crossterm::style::Color;

use crate::app::{SeriesKey, SeriesSet};
use crate::constants::{GRAPH_HEIGHT, SERIES_CAPACITY};

use super::utils::{format_kbs, sparkline};

fn graph_color(key: SeriesKey) -> Color {
    match key {
        SeriesKey::Cpu => Color::Green,
        SeriesKey::Ram => Color::Magenta,
        SeriesKey::DiskRead | SeriesKey::DiskWrite => Color::Yellow,
        SeriesKey::Upload | SeriesKey::Download => Color::Cyan,
    }
}

fn format_latest(key: SeriesKey, value: f64) -> String {
    match key {
        SeriesKey::Cpu | SeriesKey::Ram => format!("{:.1}%", value),
        _ => format_kbs(value),
    }
}

/// Lines for all six graphs.
///
/// A metric the platform cannot measure gets a caption instead of a graph,
/// so it is never drawn as a flat zero line.
pub fn performance_lines(series: &SeriesSet, width: usize) -> Vec<(Color, String)> {
    let graph_width = width.saturating_sub(4).min(SERIES_CAPACITY).max(1);
    let mut lines = Vec::new();

    for key in SeriesKey::ALL {
        let values = series.values(key);
        if !series.is_available(key) {
            lines.push((Color::White, format!(" {}", key.label())));
            lines.push((Color::DarkGrey, "   not available on this platform".to_string()));
            lines.push((Color::Reset, String::new()));
            continue;
        }

        let latest = series
            .get(key)
            .and_then(|buffer| buffer.latest())
            .map(|v| format_latest(key, v))
            .unwrap_or_else(|| "waiting for samples".to_string());
        let peak = values.iter().copied().fold(0.0, f64::max);
        let ceiling = match key {
            SeriesKey::Cpu | SeriesKey::Ram => Some(100.0),
            _ => None,
        };
        lines.push((
            Color::White,
            format!(
                " {}: {}  (peak {}, {} samples)",
                key.label(),
                latest,
                format_latest(key, peak),
                values.len()
            ),
        ));
        for row in sparkline(&values, graph_width, GRAPH_HEIGHT, ceiling) {
            lines.push((graph_color(key), format!("   {}", row)));
        }
        lines.push((Color::Reset, String::new()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_metric_gets_caption() {
        let mut series = SeriesSet::new();
        series.append(SeriesKey::Cpu, 40.0);
        series.mark_unavailable(SeriesKey::DiskRead);

        let lines = performance_lines(&series, 80);
        let text: Vec<&str> = lines.iter().map(|(_, l)| l.as_str()).collect();
        assert!(text.iter().any(|l| l.contains("CPU %: 40.0%")));

        let disk = text.iter().position(|l| l.contains("Disk Read")).unwrap();
        assert!(text[disk + 1].contains("not available"));
    }
}
