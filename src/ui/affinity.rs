//! CPU affinity dialog rendering

use std::io;

use crossterm::style::Color;

use crate::app::App;
use crate::constants::AFFINITY_DIALOG_WIDTH;

use super::components::DialogFrame;

/// Each cell reads `>[X] Core 12  `
const CELL_WIDTH: usize = 14;

/// Renders the CPU affinity dialog overlay
pub fn render_affinity_dialog(
    stdout: &mut io::Stdout,
    app: &App,
    width: usize,
    height: usize,
) -> io::Result<()> {
    let Some(dialog) = app.affinity_dialog.as_ref() else {
        return Ok(());
    };
    let total_cores = dialog.cores.len();
    let cores_per_row = ((AFFINITY_DIALOG_WIDTH - 3) / CELL_WIDTH).clamp(1, total_cores.max(1));
    let num_rows = total_cores.div_ceil(cores_per_row);

    let title = format!(
        " Set CPU Affinity: {} (PID: {})",
        dialog.name, dialog.identity.pid
    );
    let mut frame = DialogFrame::open(
        stdout,
        &title,
        AFFINITY_DIALOG_WIDTH,
        num_rows + 6,
        width,
        height,
    )?;

    let selected_count = dialog.cores.iter().filter(|on| **on).count();
    frame.line(
        stdout,
        &format!(" Selected: {}/{} cores", selected_count, total_cores),
        Color::Cyan,
    )?;
    frame.line(stdout, "", Color::White)?;

    for row in 0..num_rows {
        let mut line = String::from(" ");
        for core in (row * cores_per_row)..((row + 1) * cores_per_row).min(total_cores) {
            let cursor = if core == dialog.selected_core { ">" } else { " " };
            let checkbox = if dialog.cores[core] { "[X]" } else { "[ ]" };
            line.push_str(&format!(
                "{:<cw$}",
                format!("{}{}Core {}", cursor, checkbox, core),
                cw = CELL_WIDTH
            ));
        }
        let cursor_in_row = dialog.selected_core / cores_per_row == row;
        let bg = if cursor_in_row { Color::DarkCyan } else { Color::DarkBlue };
        frame.styled_line(stdout, &line, Color::White, bg)?;
    }

    frame.line(stdout, "", Color::White)?;
    frame.line(
        stdout,
        " ←/→: Select   Space: Toggle   A: All   1: Only this",
        Color::DarkGrey,
    )?;
    frame.line(stdout, " Enter: Apply   Esc: Cancel", Color::DarkGrey)?;
    frame.close(stdout)
}
