//! Process list rendering

use std::io;

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::app::{App, ProcessRecord, SortColumn};

use super::utils::{cpu_color, format_timestamp, truncate_string};

/// Fixed width of every column left of the name.
const FIXED_COLUMNS_WIDTH: usize = 94;

fn header_label(column: SortColumn, app: &App) -> String {
    let marker = if app.sort_applied && app.sort_column == column {
        "↑"
    } else {
        ""
    };
    let label = match column {
        SortColumn::Pid => "PID",
        SortColumn::Name => "Name",
        SortColumn::Cpu => "CPU%",
        SortColumn::Memory => "MEM%",
        SortColumn::User => "User",
        SortColumn::Status => "Status",
        SortColumn::Threads => "Thrd",
        SortColumn::Started => "Started",
        SortColumn::Parent => "PPID",
    };
    format!("{}{}", label, marker)
}

/// Renders the column headers, marking the sorted column.
pub fn render_column_headers(stdout: &mut io::Stdout, app: &App, width: usize) -> io::Result<()> {
    let header = format!(
        " {:>7}  {:>7}  {:>6}  {:>6}  {:<12}  {:<12}  {:>5}  {:<19}  {}",
        header_label(SortColumn::Pid, app),
        header_label(SortColumn::Parent, app),
        header_label(SortColumn::Cpu, app),
        header_label(SortColumn::Memory, app),
        header_label(SortColumn::User, app),
        header_label(SortColumn::Status, app),
        header_label(SortColumn::Threads, app),
        header_label(SortColumn::Started, app),
        header_label(SortColumn::Name, app),
    );
    execute!(
        stdout,
        SetBackgroundColor(Color::DarkGrey),
        SetForegroundColor(Color::White),
        Print(format!("{:w$}", truncate_string(&header, width), w = width)),
        ResetColor,
        Print("\r\n")
    )
}

fn row_parts(entry: &ProcessRecord, width: usize) -> (String, String, String) {
    let prefix = format!(
        " {:>7}  {:>7}  ",
        entry.pid,
        entry.parent_pid.display_with(u32::to_string),
    );
    let cpu_str = format!("{:>5.1}%", entry.cpu_percent);

    let suspend_indicator = if entry.status.is_stopped() { "[S] " } else { "" };
    let name_space = width.saturating_sub(FIXED_COLUMNS_WIDTH + suspend_indicator.len());
    let suffix = format!(
        "  {:>5.1}%  {:<12}  {:<12}  {:>5}  {:<19}  {}{}",
        entry.mem_percent,
        truncate_string(&entry.user.to_string(), 12),
        truncate_string(entry.status.name(), 12),
        entry.thread_count.to_string(),
        entry.start_time.display_with(|secs| format_timestamp(*secs)),
        suspend_indicator,
        truncate_string(&entry.name, name_space.max(8)),
    );
    (prefix, cpu_str, suffix)
}

/// Renders the scrollable process list.
///
/// Highlights the selected row and colors the CPU column by load.
/// Suspended processes are tagged with `[S]`.
pub fn render_process_list(
    stdout: &mut io::Stdout,
    app: &mut App,
    visible_rows: usize,
    width: usize,
) -> io::Result<()> {
    // Adjust scroll offset to keep selection visible
    if app.selected_index < app.scroll_offset {
        app.scroll_offset = app.selected_index;
    } else if app.selected_index >= app.scroll_offset + visible_rows {
        app.scroll_offset = app.selected_index + 1 - visible_rows;
    }

    for (i, entry) in app
        .filtered_processes
        .iter()
        .skip(app.scroll_offset)
        .take(visible_rows)
        .enumerate()
    {
        let is_selected = app.scroll_offset + i == app.selected_index;
        let (prefix, cpu_str, suffix) = row_parts(entry, width);
        let rest = width.saturating_sub(prefix.chars().count() + cpu_str.len());
        let suffix = truncate_string(&suffix, rest);

        if is_selected {
            // Selected row - use background color, CPU still colored
            execute!(
                stdout,
                SetBackgroundColor(Color::DarkCyan),
                SetForegroundColor(Color::White),
                Print(&prefix),
                SetForegroundColor(cpu_color(entry.cpu_percent)),
                Print(&cpu_str),
                SetForegroundColor(Color::White),
                Print(format!("{:w$}", suffix, w = rest)),
                ResetColor,
            )?;
        } else {
            execute!(
                stdout,
                Print(&prefix),
                SetForegroundColor(cpu_color(entry.cpu_percent)),
                Print(&cpu_str),
                ResetColor,
                Print(format!("{:w$}", suffix, w = rest)),
            )?;
        }
        execute!(stdout, Print("\r\n"))?;
    }

    // Fill remaining space
    for _ in app.filtered_processes.len().min(visible_rows)..visible_rows {
        execute!(stdout, Print(format!("{:w$}\r\n", "", w = width)))?;
    }

    Ok(())
}
