//! Main rendering entry point
//!
//! Draws the page under the current mode, then any dialog on top of it.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{self, Clear, ClearType},
};

use crate::app::{App, ViewMode};
use crate::constants::VISIBLE_ROWS_OVERHEAD;

use super::affinity::render_affinity_dialog;
use super::components::{
    render_filter_bar, render_footer, render_header, render_lines, render_system_stats,
};
use super::detail_view::render_detail_view;
use super::help::render_help_overlay;
use super::network::network_lines;
use super::performance::performance_lines;
use super::process_list::{render_column_headers, render_process_list};
use super::prompt::{render_io_priority_dialog, render_renice_prompt};
use super::startup::render_startup_list;
use super::system_info::system_info_lines;

/// Lines used by the title bar, status line and the two footer lines.
const CHROME_ROWS: usize = 4;

/// The full-screen view drawn underneath the current mode.
fn base_view(app: &App) -> ViewMode {
    match app.view_mode {
        mode if mode.is_page() => mode,
        ViewMode::Help => app.last_page,
        ViewMode::DetailView => ViewMode::DetailView,
        ViewMode::Affinity if app.detail_view_data.is_some() => ViewMode::DetailView,
        _ => ViewMode::ProcessList,
    }
}

/// Renders the UI to the terminal
pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let width = width as usize;
    let height = height as usize;

    // Clear and move to top
    execute!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;

    match base_view(app) {
        ViewMode::DetailView => render_detail_view(stdout, app, width, height)?,
        page => render_page(stdout, app, page, width, height)?,
    }

    match app.view_mode {
        ViewMode::Help => render_help_overlay(stdout, app, width, height)?,
        ViewMode::Affinity => render_affinity_dialog(stdout, app, width, height)?,
        ViewMode::ReniceInput => render_renice_prompt(stdout, app, width, height)?,
        ViewMode::IoPriorityPick => render_io_priority_dialog(stdout, app, width, height)?,
        _ => {}
    }

    stdout.flush()
}

fn render_page(
    stdout: &mut io::Stdout,
    app: &mut App,
    page: ViewMode,
    width: usize,
    height: usize,
) -> io::Result<()> {
    render_header(stdout, app, width)?;
    render_system_stats(stdout, app, width)?;

    let body_rows = height.saturating_sub(CHROME_ROWS);
    match page {
        ViewMode::ProcessList => {
            render_filter_bar(stdout, app, width)?;
            render_column_headers(stdout, app, width)?;
            let visible_rows = height.saturating_sub(VISIBLE_ROWS_OVERHEAD);
            render_process_list(stdout, app, visible_rows, width)?;
        }
        ViewMode::Startup => render_startup_list(stdout, app, body_rows, width)?,
        _ => {
            let lines = match page {
                ViewMode::Performance => performance_lines(app.series(), width),
                ViewMode::SystemInfo => system_info_lines(app.resource_snapshot.as_ref()),
                _ => network_lines(app.resource_snapshot.as_ref(), app.rates.as_ref()),
            };
            render_lines(stdout, &lines, &mut app.page_scroll_offset, body_rows, width)?;
        }
    }

    render_footer(stdout, app, width)
}
