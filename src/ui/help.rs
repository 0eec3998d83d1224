//! Help overlay rendering

use std::io;

use crossterm::style::Color;

use crate::app::App;
use crate::constants::{HELP_DIALOG_WIDTH, HELP_KEY_COL_WIDTH};

use super::components::DialogFrame;

/// Help content definition
const HELP_LINES: &[(&str, &str)] = &[
    ("PAGES", ""),
    ("  1-5 / Tab", "Processes, Performance, System, Network, Startup"),
    ("", ""),
    ("NAVIGATION", ""),
    ("  Up/Down", "Move selection up/down"),
    ("  PgUp/PgDn", "Scroll by page"),
    ("  Home/End", "Jump to first/last row"),
    ("  Enter", "View process details"),
    ("", ""),
    ("PROCESS ACTIONS", ""),
    ("  k", "Kill selected process"),
    ("  p / u", "Suspend / resume process"),
    ("  n", "Set nice value"),
    ("  a", "Set CPU affinity"),
    ("  i", "Set I/O priority"),
    ("  o", "Open containing folder"),
    ("", ""),
    ("VIEW OPTIONS", ""),
    ("  s", "Sort (next column)"),
    ("  l", "Pin sort across refreshes"),
    ("  /", "Filter by name or PID"),
    ("  Esc", "Clear filter"),
    ("", ""),
    ("STARTUP PAGE", ""),
    ("  e / d", "Enable / disable entry"),
    ("  r", "Reload entries"),
    ("", ""),
    ("OTHER", ""),
    ("  [ / ]", "Slower / faster refresh"),
    ("  ?", "Show this help"),
    ("  q / Ctrl+C", "Quit application"),
];

/// Renders the help overlay showing all keyboard shortcuts
pub fn render_help_overlay(
    stdout: &mut io::Stdout,
    app: &mut App,
    width: usize,
    height: usize,
) -> io::Result<()> {
    let visible = height.saturating_sub(6).max(1);
    let max_scroll = HELP_LINES.len().saturating_sub(visible);
    app.help_scroll_offset = app.help_scroll_offset.min(max_scroll);

    let mut frame = DialogFrame::open(
        stdout,
        " Keyboard Shortcuts (any key closes)",
        HELP_DIALOG_WIDTH,
        HELP_LINES.len().min(visible) + 1,
        width,
        height,
    )?;
    frame.line(stdout, "", Color::White)?;

    for (key, desc) in HELP_LINES.iter().skip(app.help_scroll_offset).take(visible) {
        if desc.is_empty() {
            // Section header or blank line
            frame.line(stdout, &format!(" {}", key), Color::Cyan)?;
        } else {
            let line = format!(" {:<kw$}{}", key, desc, kw = HELP_KEY_COL_WIDTH);
            frame.line(stdout, &line, Color::White)?;
        }
    }

    frame.close(stdout)
}
