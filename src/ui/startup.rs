//! Startup page rendering

use std::io;

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::app::App;

use super::utils::truncate_string;

pub fn render_startup_list(
    stdout: &mut io::Stdout,
    app: &App,
    rows: usize,
    width: usize,
) -> io::Result<()> {
    let header = format!(
        " {:<8}  {:<7}  {:<28}  {}",
        "Status", "Scope", "Name", "Command"
    );
    let source = format!(" Source: {}", app.startup_adapter_name());
    execute!(
        stdout,
        SetForegroundColor(Color::DarkGrey),
        Print(format!("{:w$}", truncate_string(&source, width), w = width)),
        Print("\r\n"),
        SetBackgroundColor(Color::DarkGrey),
        SetForegroundColor(Color::White),
        Print(format!("{:w$}", truncate_string(&header, width), w = width)),
        ResetColor,
        Print("\r\n")
    )?;
    let rows = rows.saturating_sub(2);

    if app.startup_entries.is_empty() {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("{:w$}\r\n", " No startup entries found", w = width)),
            ResetColor
        )?;
        for _ in 1..rows {
            execute!(stdout, Print(format!("{:w$}\r\n", "", w = width)))?;
        }
        return Ok(());
    }

    let offset = (app.startup_selected + 1).saturating_sub(rows);
    for (index, entry) in app.startup_entries.iter().enumerate().skip(offset).take(rows) {
        let (status, status_color) = if entry.enabled {
            ("enabled", Color::Green)
        } else {
            ("disabled", Color::DarkGrey)
        };
        let line = format!(
            "  {:<7}  {:<28}  {}",
            entry.scope.name(),
            truncate_string(&entry.display_name, 28),
            entry.command
        );
        let rest = width.saturating_sub(9);
        let bg = if index == app.startup_selected {
            Color::DarkCyan
        } else {
            Color::Reset
        };
        execute!(
            stdout,
            SetBackgroundColor(bg),
            SetForegroundColor(status_color),
            Print(format!(" {:<8}", status)),
            SetForegroundColor(Color::White),
            Print(format!("{:w$}", truncate_string(&line, rest), w = rest)),
            ResetColor,
            Print("\r\n")
        )?;
    }

    let rendered = app.startup_entries.len().saturating_sub(offset).min(rows);
    for _ in rendered..rows {
        execute!(stdout, Print(format!("{:w$}\r\n", "", w = width)))?;
    }
    Ok(())
}
