//! Network page: throughput, interface counters and the socket table

use crossterm::style::Color;

use crate::app::{NetRates, RateReport, ResourceSnapshot};
use crate::system::Field;

use super::utils::{format_bytes, format_kbs};

pub fn network_lines(
    snapshot: Option<&ResourceSnapshot>,
    rates: Option<&RateReport>,
) -> Vec<(Color, String)> {
    let mut lines = vec![(Color::Cyan, "── Throughput ──".to_string())];
    match rates.map(|r| r.net) {
        Some(NetRates::Available {
            upload_kbs,
            download_kbs,
        }) => {
            lines.push((Color::White, format!("  Upload:    {}", format_kbs(upload_kbs))));
            lines.push((Color::White, format!("  Download:  {}", format_kbs(download_kbs))));
        }
        Some(NetRates::Unavailable) => {
            lines.push((Color::DarkGrey, "  Network counters not available".to_string()));
        }
        None => lines.push((Color::DarkGrey, "  Waiting for the first sample...".to_string())),
    }

    let Some(snapshot) = snapshot else {
        return lines;
    };

    lines.push((Color::Reset, String::new()));
    lines.push((Color::Cyan, format!("── Interfaces ({}) ──", snapshot.interfaces.len())));
    lines.push((
        Color::DarkGrey,
        format!("  {:<16} {:>12} {:>12}", "Name", "Sent", "Received"),
    ));
    for iface in &snapshot.interfaces {
        lines.push((
            Color::White,
            format!(
                "  {:<16} {:>12} {:>12}",
                iface.name,
                format_bytes(iface.counters.bytes_sent),
                format_bytes(iface.counters.bytes_recv)
            ),
        ));
    }

    lines.push((Color::Reset, String::new()));
    match &snapshot.connections {
        Field::Present(connections) => {
            lines.push((Color::Cyan, format!("── Connections ({}) ──", connections.len())));
            lines.push((
                Color::DarkGrey,
                format!(
                    "  {:<5} {:<28} {:<28} {:<12} {:>7}",
                    "Proto", "Local", "Remote", "State", "PID"
                ),
            ));
            for conn in connections {
                let color = match conn.status.as_str() {
                    "ESTABLISHED" => Color::Green,
                    "LISTEN" => Color::Cyan,
                    "TIME_WAIT" | "CLOSE_WAIT" => Color::Yellow,
                    _ => Color::White,
                };
                lines.push((
                    color,
                    format!(
                        "  {:<5} {:<28} {:<28} {:<12} {:>7}",
                        conn.kind.name(),
                        conn.local,
                        if conn.remote.is_empty() { "-" } else { &conn.remote },
                        conn.status,
                        conn.pid.map(|pid| pid.to_string()).unwrap_or_else(|| "-".into())
                    ),
                ));
            }
        }
        other => {
            lines.push((Color::Cyan, "── Connections ──".to_string()));
            lines.push((Color::DarkGrey, format!("  {}", other.display_with(|_| String::new()))));
        }
    }

    lines
}
