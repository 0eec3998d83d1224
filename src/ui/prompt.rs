//! Renice prompt and I/O priority picker

use std::io;

use crossterm::style::Color;

use crate::app::App;
use crate::constants::{NICE_MAX, NICE_MIN, PROMPT_DIALOG_WIDTH};
use crate::system::IoPriority;

use super::components::DialogFrame;

pub fn render_renice_prompt(
    stdout: &mut io::Stdout,
    app: &App,
    width: usize,
    height: usize,
) -> io::Result<()> {
    let Some((identity, name)) = app.renice_target.as_ref() else {
        return Ok(());
    };
    let title = format!(" Set nice value: {} (PID: {})", name, identity.pid);
    let mut frame = DialogFrame::open(stdout, &title, PROMPT_DIALOG_WIDTH, 5, width, height)?;

    frame.line(stdout, "", Color::White)?;
    frame.styled_line(
        stdout,
        &format!(" Nice: {}█", app.renice_input),
        Color::Black,
        Color::DarkYellow,
    )?;
    frame.line(stdout, "", Color::White)?;
    frame.line(
        stdout,
        &format!(" Range {}..{}; lower runs sooner", NICE_MIN, NICE_MAX),
        Color::DarkGrey,
    )?;
    frame.line(stdout, " Enter: Apply   Esc: Cancel", Color::DarkGrey)?;
    frame.close(stdout)
}

pub fn render_io_priority_dialog(
    stdout: &mut io::Stdout,
    app: &App,
    width: usize,
    height: usize,
) -> io::Result<()> {
    let Some(dialog) = app.io_priority_dialog.as_ref() else {
        return Ok(());
    };
    let title = format!(" I/O priority: {} (PID: {})", dialog.name, dialog.identity.pid);
    let mut frame = DialogFrame::open(
        stdout,
        &title,
        PROMPT_DIALOG_WIDTH,
        IoPriority::ALL.len() + 3,
        width,
        height,
    )?;

    frame.line(stdout, "", Color::White)?;
    for (index, class) in IoPriority::ALL.iter().enumerate() {
        if index == dialog.selected {
            frame.styled_line(stdout, &format!(" > {}", class), Color::White, Color::DarkCyan)?;
        } else {
            frame.line(stdout, &format!("   {}", class), Color::White)?;
        }
    }
    frame.line(stdout, "", Color::White)?;
    frame.line(stdout, " ↑/↓: Select   Enter: Apply   Esc: Cancel", Color::DarkGrey)?;
    frame.close(stdout)
}
