//! Process detail view rendering

use std::io;

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::app::{detail_line_count, App, ProcessDetails};
use crate::system::Field;

use super::utils::truncate_string;

fn list_section<T>(
    lines: &mut Vec<(Color, String)>,
    title: &str,
    items: &Field<Vec<T>>,
    render: impl Fn(&T) -> (Color, String),
) {
    lines.push((Color::Reset, String::new()));
    match items {
        Field::Present(items) => {
            lines.push((Color::Cyan, format!("── {} ({}) ──", title, items.len())));
            if items.is_empty() {
                lines.push((Color::DarkGrey, "  None".to_string()));
            }
            lines.extend(items.iter().map(render));
        }
        other => {
            lines.push((Color::Cyan, format!("── {} ──", title)));
            lines.push((Color::DarkGrey, format!("  {}", other.display_with(|_| String::new()))));
        }
    }
}

/// Builds every line of the detail view, top to bottom.
pub fn detail_lines(details: &ProcessDetails) -> Vec<(Color, String)> {
    let mut lines: Vec<(Color, String)> = vec![
        (Color::White, format!("  PID:          {}", details.identity.pid)),
        (Color::White, format!("  Name:         {}", details.name)),
        (
            Color::White,
            format!("  Executable:   {}", details.exe.display_with(|p| p.display().to_string())),
        ),
        (Color::White, format!("  Status:       {}", details.status)),
        (Color::White, format!("  Threads:      {}", details.threads)),
        (Color::White, format!("  User:         {}", details.user)),
        (Color::White, format!("  Parent PID:   {}", details.parent_pid)),
        (
            Color::White,
            format!("  Working dir:  {}", details.cwd.display_with(|p| p.display().to_string())),
        ),
        (
            Color::White,
            format!("  Command:      {}", details.cmdline.display_with(|args| args.join(" "))),
        ),
        (Color::White, format!("  Nice:         {}", details.nice)),
        (
            Color::White,
            format!(
                "  CPU affinity: {}",
                details.affinity.display_with(|cores| {
                    cores.iter().map(usize::to_string).collect::<Vec<_>>().join(",")
                })
            ),
        ),
        (Color::White, format!("  I/O priority: {}", details.io_priority)),
    ];

    list_section(&mut lines, "Open Files", &details.open_files, |file| {
        let fd = file.fd.map(|fd| fd.to_string()).unwrap_or_else(|| "-".to_string());
        (Color::White, format!("  {:>5}  {}", fd, file.path.display()))
    });

    list_section(&mut lines, "Connections", &details.connections, |conn| {
        let color = match conn.status.as_str() {
            "ESTABLISHED" => Color::Green,
            "LISTEN" => Color::Cyan,
            "TIME_WAIT" | "CLOSE_WAIT" => Color::Yellow,
            _ => Color::White,
        };
        let remote = if conn.remote.is_empty() { "-" } else { &conn.remote };
        (
            color,
            format!(
                "  {}  {:>21} → {:<21}  [{}]",
                conn.kind.name(),
                conn.local,
                remote,
                conn.status
            ),
        )
    });

    lines
}

/// Renders the detailed process view
pub fn render_detail_view(
    stdout: &mut io::Stdout,
    app: &mut App,
    width: usize,
    height: usize,
) -> io::Result<()> {
    let Some(details) = app.detail_view_data.as_ref() else {
        return Ok(());
    };
    let lines = detail_lines(details);
    let title = format!(
        " Process Details: {} (PID {})",
        details.name.display_with(String::clone),
        details.identity.pid
    );

    let visible_rows = height.saturating_sub(4);

    // Clamp scroll offset
    let max_scroll = detail_line_count(details).saturating_sub(visible_rows);
    if app.detail_scroll_offset > max_scroll {
        app.detail_scroll_offset = max_scroll;
    }

    execute!(
        stdout,
        SetBackgroundColor(Color::DarkMagenta),
        SetForegroundColor(Color::White),
        Print(format!("{:w$}", truncate_string(&title, width), w = width)),
        ResetColor,
        Print("\r\n"),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "{:w$}",
            format!(
                " Scroll: {}/{} lines  |  ↑↓/PgUp/PgDn: Scroll  |  Esc/Enter: Close",
                app.detail_scroll_offset + 1,
                lines.len()
            ),
            w = width
        )),
        ResetColor,
        Print("\r\n"),
    )?;

    for (color, line) in lines.iter().skip(app.detail_scroll_offset).take(visible_rows) {
        execute!(
            stdout,
            SetForegroundColor(*color),
            Print(format!("{:w$}", truncate_string(line, width.saturating_sub(1)), w = width)),
            ResetColor,
            Print("\r\n")
        )?;
    }

    // Fill remaining space
    let lines_rendered = lines
        .len()
        .saturating_sub(app.detail_scroll_offset)
        .min(visible_rows);
    for _ in lines_rendered..visible_rows {
        execute!(stdout, Print(format!("{:w$}\r\n", "", w = width)))?;
    }

    let message = app.status_message.as_deref().unwrap_or("");
    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print(format!("{:w$}", truncate_string(message, width), w = width)),
        ResetColor,
        Print("\r\n"),
        SetBackgroundColor(Color::DarkMagenta),
        SetForegroundColor(Color::White),
        Print(format!(
            "{:w$}",
            " Esc/Enter: Back to process list  |  k: Kill process  |  a: CPU affinity",
            w = width
        )),
        ResetColor,
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::ProcessIdentity;
    use crate::system::source::SocketKind;
    use crate::system::{Connection, IoPriority, OpenFile, ProcessStatus};

    fn details() -> ProcessDetails {
        ProcessDetails {
            identity: ProcessIdentity { pid: 7, start_time: None },
            name: Field::Present("nginx".into()),
            exe: Field::Present(PathBuf::from("/usr/sbin/nginx")),
            status: Field::Present(ProcessStatus::Sleeping),
            threads: Field::Present(4),
            user: Field::Denied,
            parent_pid: Field::Present(1),
            cwd: Field::Unavailable,
            cmdline: Field::Present(vec!["nginx".into(), "-g".into()]),
            nice: Field::Present(0),
            affinity: Field::Present(vec![0, 1]),
            io_priority: Field::Present(IoPriority::Normal),
            open_files: Field::Present(vec![
                OpenFile { path: PathBuf::from("/var/log/a"), fd: Some(3) },
                OpenFile { path: PathBuf::from("/var/log/b"), fd: None },
            ]),
            connections: Field::Present(vec![Connection {
                kind: SocketKind::Tcp,
                local: "0.0.0.0:80".into(),
                remote: String::new(),
                status: "LISTEN".into(),
                pid: Some(7),
            }]),
        }
    }

    #[test]
    fn test_line_count_matches_rendered_lines() {
        let mut details = details();
        assert_eq!(detail_lines(&details).len(), detail_line_count(&details));

        details.open_files = Field::Denied;
        details.connections = Field::Present(Vec::new());
        assert_eq!(detail_lines(&details).len(), detail_line_count(&details));
    }

    #[test]
    fn test_sentinels_shown_for_unreadable_fields() {
        let lines = detail_lines(&details());
        assert!(lines.iter().any(|(_, l)| l.contains("User:") && l.contains("Permission Denied")));
        assert!(lines.iter().any(|(_, l)| l.contains("Working dir:") && l.contains("N/A")));
        assert!(lines.iter().any(|(_, l)| l.contains("nginx -g")));
    }
}
