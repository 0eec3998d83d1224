//! Detail view management

use crate::constants::DETAIL_INFO_ROWS;
use crate::system::ActionError;

use super::state::App;
use super::{ProcessDetails, ViewMode};

/// Lines the detail view renders for `details`.
///
/// Each list section has a header and a separator, and shows one
/// placeholder row when it is empty or unreadable.
pub fn detail_line_count(details: &ProcessDetails) -> usize {
    let files = details.open_files.as_option().map_or(0, Vec::len).max(1);
    let connections = details.connections.as_option().map_or(0, Vec::len).max(1);
    DETAIL_INFO_ROWS + 2 + files + 2 + connections
}

impl App {
    /// Opens detail view for the currently selected process
    pub fn open_detail_view(&mut self) {
        let Some(identity) = self.selected_process().map(|p| p.identity()) else {
            return;
        };

        match self.with_gateway(|gateway, source| gateway.inspect(source, &identity)) {
            Ok(details) => {
                self.detail_view_data = Some(details);
                self.detail_scroll_offset = 0;
                self.view_mode = ViewMode::DetailView;
            }
            Err(err) => self.report_action(Err(err)),
        }
    }

    /// Closes the detail view and returns to process list
    pub fn close_detail_view(&mut self) {
        self.view_mode = ViewMode::ProcessList;
        self.detail_view_data = None;
        self.detail_scroll_offset = 0;
    }

    /// Re-reads the viewed process after a tick.
    ///
    /// Closes the view if the process has exited.
    pub fn refresh_detail_view(&mut self) {
        let Some(identity) = self.detail_view_data.as_ref().map(|d| d.identity) else {
            return;
        };

        match self.with_gateway(|gateway, source| gateway.inspect(source, &identity)) {
            Ok(details) => self.detail_view_data = Some(details),
            Err(ActionError::ProcessVanished) => {
                self.status_message = Some(ActionError::ProcessVanished.to_string());
                self.close_detail_view();
            }
            // Keep the last good read
            Err(_) => {}
        }
    }

    fn detail_max_offset(&self, visible: usize) -> usize {
        self.detail_view_data
            .as_ref()
            .map_or(0, |details| detail_line_count(details).saturating_sub(visible))
    }

    /// Scrolls the detail view down
    pub fn detail_scroll_down(&mut self, visible: usize) {
        if self.detail_scroll_offset < self.detail_max_offset(visible) {
            self.detail_scroll_offset += 1;
        }
    }

    /// Scrolls the detail view up
    pub fn detail_scroll_up(&mut self) {
        self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
    }

    /// Pages the detail view down
    pub fn detail_page_down(&mut self, visible: usize) {
        self.detail_scroll_offset =
            (self.detail_scroll_offset + visible).min(self.detail_max_offset(visible));
    }

    /// Pages the detail view up
    pub fn detail_page_up(&mut self, lines: usize) {
        self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(lines);
    }
}
