//! Header, stats bar, filter bar, footer, and dialog frame components

use std::io;

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::app::{App, ViewMode};
use crate::constants::{APP_VERSION, DIALOG_MARGIN, DISPLAY_NAME};

use super::utils::truncate_string;

/// Renders the title bar with the page tabs.
///
/// The active page is highlighted; number keys 1-5 select a page.
pub fn render_header(stdout: &mut io::Stdout, app: &App, width: usize) -> io::Result<()> {
    let title = format!(" {} v{} ", DISPLAY_NAME, APP_VERSION);
    execute!(
        stdout,
        SetBackgroundColor(Color::DarkBlue),
        SetForegroundColor(Color::White),
        Print(&title),
    )?;

    let mut used = title.chars().count();
    for (index, page) in ViewMode::PAGES.iter().enumerate() {
        let tab = format!(" {}:{} ", index + 1, page.title());
        used += tab.chars().count();
        if *page == app.last_page {
            execute!(
                stdout,
                SetBackgroundColor(Color::White),
                SetForegroundColor(Color::DarkBlue),
                Print(tab),
                SetBackgroundColor(Color::DarkBlue),
                SetForegroundColor(Color::White),
            )?;
        } else {
            execute!(stdout, Print(tab))?;
        }
    }

    execute!(
        stdout,
        Print(format!("{:w$}", "", w = width.saturating_sub(used))),
        ResetColor,
        Print("\r\n")
    )
}

/// Renders the status line with process count, sort and refresh rate.
pub fn render_system_stats(stdout: &mut io::Stdout, app: &App, width: usize) -> io::Result<()> {
    let proc_count = if app.filter.is_empty() {
        format!("Processes: {}", app.processes_list.len())
    } else {
        format!(
            "Showing: {}/{}",
            app.filtered_processes.len(),
            app.processes_list.len()
        )
    };
    let sort_str = match (app.sort_applied, app.pin_sort) {
        (_, true) => format!("Sort: {} (pinned)", app.sort_column.name()),
        (true, false) => format!("Sort: {}", app.sort_column.name()),
        (false, false) => "Sort: OS order".to_string(),
    };
    let line = format!(
        " {}  |  {}  |  {}  |  Refresh: {}",
        app.status_line,
        proc_count,
        sort_str,
        app.format_refresh_interval()
    );

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(format!("{:w$}", truncate_string(&line, width), w = width)),
        ResetColor,
        Print("\r\n")
    )
}

/// Renders the filter bar when active or showing current filter.
///
/// In filter mode, displays an input field with cursor.
/// Otherwise, shows the current filter value if set.
pub fn render_filter_bar(stdout: &mut io::Stdout, app: &App, width: usize) -> io::Result<()> {
    if app.view_mode == ViewMode::FilterInput {
        execute!(
            stdout,
            SetBackgroundColor(Color::DarkYellow),
            SetForegroundColor(Color::Black),
            Print(format!(
                " Filter: {}█{:width$}",
                app.filter,
                "",
                width = width.saturating_sub(app.filter.chars().count() + 10)
            )),
            ResetColor,
            Print("\r\n")
        )
    } else if !app.filter.is_empty() {
        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                " Filter: \"{}\" (press / to edit, Esc to clear)",
                app.filter
            )),
            ResetColor,
            Print("\r\n")
        )
    } else {
        execute!(stdout, Print("\r\n"))
    }
}

fn footer_hint(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::ConfirmKill => " Kill process? Y:Confirm | N/Esc:Cancel",
        ViewMode::FilterInput => " Type to filter | Enter:Apply | Esc:Done",
        ViewMode::ProcessList => concat!(
            " ?:Help | q:Quit | Enter:Details | k:Kill | p/u:Suspend/Resume | n:Nice",
            " | a:Affinity | i:I/O | o:Folder | s:Sort | l:Pin | /:Filter"
        ),
        ViewMode::Startup => " ?:Help | q:Quit | e:Enable | d:Disable | r:Reload | Tab:Next page",
        _ => " ?:Help | q:Quit | 1-5/Tab:Pages | [/]:Speed",
    }
}

/// Renders the message line and the key hints.
///
/// The message line shows the pending kill prompt, the result of the last
/// action, or the selected executable path.
pub fn render_footer(stdout: &mut io::Stdout, app: &App, width: usize) -> io::Result<()> {
    if app.view_mode == ViewMode::ConfirmKill {
        let prompt = app
            .pending_kill
            .as_ref()
            .map(|pending| {
                format!(
                    " Kill process '{}' (PID {})? [Y/N]",
                    truncate_string(pending.name(), 30),
                    pending.pid()
                )
            })
            .unwrap_or_default();
        execute!(
            stdout,
            SetBackgroundColor(Color::DarkRed),
            SetForegroundColor(Color::White),
            Print(format!("{:w$}", prompt, w = width)),
            ResetColor,
            Print("\r\n")
        )?;
    } else if let Some(ref msg) = app.status_message {
        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print(format!(" {}", truncate_string(msg, width.saturating_sub(2)))),
            ResetColor,
            Print("\r\n")
        )?;
    } else if app.view_mode == ViewMode::ProcessList {
        let path_display = app
            .selected_process()
            .map(|p| format!(" Path: {}", p.executable_path))
            .unwrap_or_default();
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "{:w$}",
                truncate_string(&path_display, width),
                w = width
            )),
            ResetColor,
            Print("\r\n")
        )?;
    } else {
        execute!(stdout, Print("\r\n"))?;
    }

    let (bg, fg) = match app.view_mode {
        ViewMode::ConfirmKill => (Color::DarkRed, Color::White),
        ViewMode::FilterInput => (Color::DarkYellow, Color::Black),
        _ => (Color::DarkBlue, Color::White),
    };
    execute!(
        stdout,
        SetBackgroundColor(bg),
        SetForegroundColor(fg),
        Print(format!(
            "{:w$}",
            truncate_string(footer_hint(app.view_mode), width),
            w = width
        )),
        ResetColor,
    )
}

/// A centered box drawn over a dimmed screen.
///
/// Lines are added top to bottom with `line`; `close` draws the bottom
/// border.
pub struct DialogFrame {
    start_x: usize,
    inner_width: usize,
    y: usize,
    bottom: usize,
}

impl DialogFrame {
    /// Dims the screen and draws the top border and title.
    pub fn open(
        stdout: &mut io::Stdout,
        title: &str,
        box_width: usize,
        content_rows: usize,
        width: usize,
        height: usize,
    ) -> io::Result<Self> {
        let box_width = box_width.min(width.saturating_sub(DIALOG_MARGIN)).max(10);
        let box_height = (content_rows + 3).min(height.saturating_sub(2));
        let start_x = width.saturating_sub(box_width) / 2;
        let start_y = height.saturating_sub(box_height) / 2;

        for y in 0..height {
            execute!(
                stdout,
                MoveTo(0, y as u16),
                SetBackgroundColor(Color::Black),
                Print(format!("{:w$}", "", w = width)),
                ResetColor
            )?;
        }

        let inner_width = box_width - 2;
        execute!(
            stdout,
            MoveTo(start_x as u16, start_y as u16),
            SetBackgroundColor(Color::DarkBlue),
            SetForegroundColor(Color::White),
            Print("┌"),
            Print("─".repeat(inner_width)),
            Print("┐"),
            ResetColor
        )?;

        let mut frame = Self {
            start_x,
            inner_width,
            y: start_y + 1,
            bottom: start_y + box_height.saturating_sub(1),
        };
        frame.line(stdout, title, Color::Yellow)?;
        Ok(frame)
    }

    /// Draws one bordered line. Lines past the bottom border are dropped.
    pub fn line(&mut self, stdout: &mut io::Stdout, content: &str, fg: Color) -> io::Result<()> {
        self.styled_line(stdout, content, fg, Color::DarkBlue)
    }

    pub fn styled_line(
        &mut self,
        stdout: &mut io::Stdout,
        content: &str,
        fg: Color,
        bg: Color,
    ) -> io::Result<()> {
        if self.y >= self.bottom {
            return Ok(());
        }
        let text = truncate_string(content, self.inner_width);
        execute!(
            stdout,
            MoveTo(self.start_x as u16, self.y as u16),
            SetBackgroundColor(Color::DarkBlue),
            SetForegroundColor(Color::White),
            Print("│"),
            SetBackgroundColor(bg),
            SetForegroundColor(fg),
            Print(format!("{:<w$}", text, w = self.inner_width)),
            SetBackgroundColor(Color::DarkBlue),
            SetForegroundColor(Color::White),
            Print("│"),
            ResetColor
        )?;
        self.y += 1;
        Ok(())
    }

    /// Pads to the bottom and draws the bottom border.
    pub fn close(mut self, stdout: &mut io::Stdout) -> io::Result<()> {
        while self.y < self.bottom {
            self.line(stdout, "", Color::White)?;
        }
        execute!(
            stdout,
            MoveTo(self.start_x as u16, self.bottom as u16),
            SetBackgroundColor(Color::DarkBlue),
            SetForegroundColor(Color::White),
            Print("└"),
            Print("─".repeat(self.inner_width)),
            Print("┘"),
            ResetColor
        )
    }
}

/// Prints a scrollable block of colored lines filling `rows` rows.
///
/// Clamps `offset` so the last line stays on screen.
pub fn render_lines(
    stdout: &mut io::Stdout,
    lines: &[(Color, String)],
    offset: &mut usize,
    rows: usize,
    width: usize,
) -> io::Result<()> {
    *offset = (*offset).min(lines.len().saturating_sub(rows));
    for (color, line) in lines.iter().skip(*offset).take(rows) {
        execute!(
            stdout,
            SetForegroundColor(*color),
            Print(format!("{:w$}", truncate_string(line, width), w = width)),
            ResetColor,
            Print("\r\n")
        )?;
    }
    let rendered = lines.len().saturating_sub(*offset).min(rows);
    for _ in rendered..rows {
        execute!(stdout, Print(format!("{:w$}\r\n", "", w = width)))?;
    }
    Ok(())
}
