//! System page: boot time, cores, memory, partitions, users, sensors and GPUs

use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::style::Color;

use crate::app::ResourceSnapshot;
use crate::system::Field;

use super::utils::{format_bytes, format_timestamp};

fn heading(lines: &mut Vec<(Color, String)>, title: &str) {
    lines.push((Color::Reset, String::new()));
    lines.push((Color::Cyan, format!("── {} ──", title)));
}

fn format_uptime(boot_time: u64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(boot_time);
    let secs = now.saturating_sub(boot_time);
    let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Pushes the sentinel line for a list that could not be read.
fn unreadable<T>(lines: &mut Vec<(Color, String)>, field: &Field<T>) {
    lines.push((Color::DarkGrey, format!("  {}", field.display_with(|_| String::new()))));
}

pub fn system_info_lines(snapshot: Option<&ResourceSnapshot>) -> Vec<(Color, String)> {
    let Some(snapshot) = snapshot else {
        return vec![(Color::DarkGrey, " Waiting for the first sample...".to_string())];
    };

    let mut lines = vec![
        (Color::Cyan, "── Overview ──".to_string()),
        (
            Color::White,
            format!(
                "  Boot time:      {} (up {})",
                format_timestamp(snapshot.boot_time),
                format_uptime(snapshot.boot_time)
            ),
        ),
        (
            Color::White,
            format!(
                "  CPUs:           {} logical, {} physical",
                snapshot.logical_cpus, snapshot.physical_cpus
            ),
        ),
        (Color::White, format!("  CPU usage:      {:.1}%", snapshot.cpu_percent)),
        (
            Color::White,
            format!(
                "  Memory:         {} / {} ({:.1}%)",
                format_bytes(snapshot.memory.used),
                format_bytes(snapshot.memory.total),
                snapshot.ram_percent
            ),
        ),
        (
            Color::White,
            format!(
                "  Disk usage:     {}",
                snapshot.disk_percent.display_with(|p| format!("{:.1}%", p))
            ),
        ),
    ];

    heading(&mut lines, "Partitions");
    if snapshot.partitions.is_empty() {
        lines.push((Color::DarkGrey, "  None".to_string()));
    }
    for partition in &snapshot.partitions {
        lines.push((
            Color::White,
            format!(
                "  {:<20} {:<24} {:<8} {:>10} / {:>10} ({:.1}%)",
                partition.device,
                partition.mount_point.display(),
                partition.fs_type,
                format_bytes(partition.usage.used),
                format_bytes(partition.usage.total),
                partition.usage.percent
            ),
        ));
    }

    heading(&mut lines, "Logged-in Users");
    match &snapshot.logged_in_users {
        Field::Present(users) if users.is_empty() => {
            lines.push((Color::DarkGrey, "  None".to_string()));
        }
        Field::Present(users) => {
            for user in users {
                let host = if user.host.is_empty() { "local" } else { &user.host };
                lines.push((
                    Color::White,
                    format!(
                        "  {:<16} {:<10} {:<20} since {}",
                        user.name,
                        user.terminal,
                        host,
                        format_timestamp(user.started)
                    ),
                ));
            }
        }
        other => unreadable(&mut lines, other),
    }

    heading(&mut lines, "Temperatures");
    match &snapshot.temperature_readings {
        Field::Present(readings) if readings.is_empty() => {
            lines.push((Color::DarkGrey, "  No sensors found".to_string()));
        }
        Field::Present(readings) => {
            for reading in readings {
                let color = if reading.celsius >= 80.0 { Color::Red } else { Color::White };
                lines.push((
                    color,
                    format!("  {:<32} {:>6.1} °C", reading.label, reading.celsius),
                ));
            }
        }
        other => unreadable(&mut lines, other),
    }

    heading(&mut lines, "GPU");
    match &snapshot.gpus {
        Field::Present(gpus) if gpus.is_empty() => {
            lines.push((Color::DarkGrey, "  No GPUs found".to_string()));
        }
        Field::Present(gpus) => {
            for gpu in gpus {
                lines.push((
                    Color::White,
                    format!(
                        "  {:<32} {:>5.1}%  {} / {}",
                        gpu.name,
                        gpu.utilization_percent,
                        format_bytes(gpu.memory_used),
                        format_bytes(gpu.memory_total)
                    ),
                ));
            }
        }
        Field::Unavailable => {
            lines.push((
                Color::DarkGrey,
                "  GPU monitoring not available on this platform".to_string(),
            ));
        }
        other => unreadable(&mut lines, other),
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Sampler, SamplerConfig};
    use crate::system::fake::{FakeProcessSource, FakeResourceSource};
    use crate::system::GpuReading;

    fn snapshot(resources: &mut FakeResourceSource) -> ResourceSnapshot {
        Sampler::new(SamplerConfig::default())
            .tick(&mut FakeProcessSource::default(), resources)
            .resources
            .unwrap()
    }

    fn has_line(lines: &[(Color, String)], text: &str) -> bool {
        lines.iter().any(|(_, line)| line.contains(text))
    }

    #[test]
    fn test_gpu_unavailable_by_default() {
        let snapshot = snapshot(&mut FakeResourceSource::default());
        assert_eq!(snapshot.gpus, Field::Unavailable);

        let lines = system_info_lines(Some(&snapshot));
        assert!(has_line(&lines, "── GPU ──"));
        assert!(has_line(&lines, "GPU monitoring not available"));
    }

    #[test]
    fn test_gpu_readings_listed() {
        let mut resources = FakeResourceSource {
            gpus: Ok(vec![GpuReading {
                name: "Test Adapter".into(),
                utilization_percent: 40.0,
                memory_used: 1024,
                memory_total: 4096,
            }]),
            ..FakeResourceSource::default()
        };
        let lines = system_info_lines(Some(&snapshot(&mut resources)));
        assert!(has_line(&lines, "Test Adapter"));
        assert!(!has_line(&lines, "not available on this platform"));
    }

    #[test]
    fn test_waiting_before_first_sample() {
        assert!(has_line(&system_info_lines(None), "Waiting"));
    }
}
