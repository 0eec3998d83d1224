//! Input/keyboard event handling
//!
//! Keys are dispatched on the current view mode. Pages share the global
//! keys (quit, page switch, help, refresh interval); dialogs capture all
//! input until closed.

use std::io;

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal;

use crate::constants::VISIBLE_ROWS_OVERHEAD;

use super::{App, ViewMode};

/// Result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue running the application
    Continue,
    /// Exit the application
    Exit,
}

fn visible_rows() -> io::Result<usize> {
    let (_, height) = terminal::size()?;
    Ok((height as usize).saturating_sub(VISIBLE_ROWS_OVERHEAD).max(1))
}

impl App {
    /// Entry point for every key press.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> io::Result<KeyAction> {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(KeyAction::Exit);
        }
        if self.view_mode != ViewMode::ConfirmKill {
            self.status_message = None;
        }

        match self.view_mode {
            ViewMode::Help => self.handle_help_key(code),
            ViewMode::FilterInput => self.handle_filter_key(code),
            ViewMode::ConfirmKill => self.handle_confirm_kill_key(code),
            ViewMode::ReniceInput => self.handle_renice_key(code),
            ViewMode::IoPriorityPick => self.handle_io_priority_key(code),
            ViewMode::Affinity => self.handle_affinity_key(code),
            ViewMode::DetailView => return self.handle_detail_view_key(code),
            _ => return self.handle_page_key(code),
        }
        Ok(KeyAction::Continue)
    }

    /// Keys shared by all pages. Returns `None` if the key was not one.
    fn handle_global_key(&mut self, code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Some(KeyAction::Exit),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.show_page(ViewMode::PAGES[index]);
            }
            KeyCode::Tab => self.show_page(self.view_mode.next_page()),
            KeyCode::Char('?') => {
                self.help_scroll_offset = 0;
                self.view_mode = ViewMode::Help;
            }
            KeyCode::Char('[') => self.increase_refresh_interval(),
            KeyCode::Char(']') => self.decrease_refresh_interval(),
            _ => return None,
        }
        Some(KeyAction::Continue)
    }

    fn handle_page_key(&mut self, code: KeyCode) -> io::Result<KeyAction> {
        if let Some(action) = self.handle_global_key(code) {
            return Ok(action);
        }

        match code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::PageUp => self.page_up(visible_rows()?),
            KeyCode::PageDown => self.page_down(visible_rows()?),
            KeyCode::Home => self.jump_to_start(),
            KeyCode::End => self.jump_to_end(),
            _ => match self.view_mode {
                ViewMode::ProcessList => self.handle_process_list_key(code),
                ViewMode::Startup => self.handle_startup_key(code),
                _ => {}
            },
        }
        Ok(KeyAction::Continue)
    }

    fn handle_process_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('k') | KeyCode::Char('K') => self.request_kill(),
            KeyCode::Char('p') | KeyCode::Char('P') => self.suspend_selected(),
            KeyCode::Char('u') | KeyCode::Char('U') => self.resume_selected(),
            KeyCode::Char('n') | KeyCode::Char('N') => self.open_renice_prompt(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.open_affinity_dialog(),
            KeyCode::Char('i') | KeyCode::Char('I') => self.open_io_priority_dialog(),
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_containing_folder(),
            KeyCode::Char('s') | KeyCode::Char('S') => self.cycle_sort(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.toggle_pin_sort(),
            KeyCode::Char('/') => self.view_mode = ViewMode::FilterInput,
            KeyCode::Esc => {
                self.filter.clear();
                self.apply_filter();
            }
            KeyCode::Enter => self.open_detail_view(),
            _ => {}
        }
    }

    fn handle_startup_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('e') | KeyCode::Char('E') => self.set_startup_enabled(true),
            KeyCode::Char('d') | KeyCode::Char('D') => self.set_startup_enabled(false),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload_startup_entries(),
            _ => {}
        }
    }

    /// Handles key events when help overlay is shown
    fn handle_help_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.help_scroll_offset = self.help_scroll_offset.saturating_sub(1),
            KeyCode::Down => self.help_scroll_offset += 1,
            // Any other key closes help
            _ => self.view_mode = self.last_page,
        }
    }

    /// Handles key events in confirm kill mode
    fn handle_confirm_kill_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_kill(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_kill(),
            _ => {}
        }
    }

    /// Handles key events in filter mode
    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => self.view_mode = ViewMode::ProcessList,
            KeyCode::Backspace => {
                self.filter.pop();
                self.apply_filter();
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.apply_filter();
            }
            _ => {}
        }
    }

    fn handle_renice_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_renice_prompt(),
            KeyCode::Enter => self.apply_renice(),
            KeyCode::Backspace => {
                self.renice_input.pop();
            }
            KeyCode::Char(c) if c == '-' || c.is_ascii_digit() => self.renice_input.push(c),
            _ => {}
        }
    }

    fn handle_io_priority_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_io_priority_dialog(),
            KeyCode::Enter => self.apply_io_priority(),
            KeyCode::Up => self.io_priority_move_up(),
            KeyCode::Down => self.io_priority_move_down(),
            _ => {}
        }
    }

    fn handle_affinity_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_affinity_dialog(),
            KeyCode::Enter => self.apply_affinity(),
            KeyCode::Char(' ') => self.toggle_affinity_core(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.select_all_cores(),
            KeyCode::Char('1') => self.select_single_core(),
            KeyCode::Left => self.affinity_move_left(),
            KeyCode::Right => self.affinity_move_right(),
            _ => {}
        }
    }

    /// Handles key events in detail view mode
    fn handle_detail_view_key(&mut self, code: KeyCode) -> io::Result<KeyAction> {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close_detail_view(),
            KeyCode::Char('k') | KeyCode::Char('K') => {
                // Allow killing from detail view
                self.close_detail_view();
                self.request_kill();
            }
            KeyCode::Char('a') | KeyCode::Char('A') => self.open_affinity_dialog(),
            KeyCode::Up => self.detail_scroll_up(),
            KeyCode::Down => self.detail_scroll_down(visible_rows()?),
            KeyCode::PageUp => self.detail_page_up(visible_rows()?),
            KeyCode::PageDown => self.detail_page_down(visible_rows()?),
            KeyCode::Home => self.detail_scroll_offset = 0,
            KeyCode::End => self.detail_scroll_offset = usize::MAX, // clamped during render
            _ => {}
        }
        Ok(KeyAction::Continue)
    }
}
