//! Navigation methods for the application
//!
//! Row movement applies to whichever list the current page shows: the
//! process table or the startup entries. The performance, system and
//! network pages scroll as a whole.

use super::state::App;
use super::ViewMode;

impl App {
    fn list_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Startup => self.startup_entries.len(),
            _ => self.filtered_processes.len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.view_mode {
            ViewMode::Startup => &mut self.startup_selected,
            ViewMode::Performance | ViewMode::SystemInfo | ViewMode::Network => {
                &mut self.page_scroll_offset
            }
            _ => &mut self.selected_index,
        }
    }

    fn last_index(&self) -> usize {
        match self.view_mode {
            // Page views clamp while rendering
            ViewMode::Performance | ViewMode::SystemInfo | ViewMode::Network => usize::MAX,
            _ => self.list_len().saturating_sub(1),
        }
    }

    /// Moves selection up by one row.
    pub fn move_up(&mut self) {
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_sub(1);
    }

    /// Moves selection down by one row.
    pub fn move_down(&mut self) {
        let last = self.last_index();
        let cursor = self.cursor_mut();
        if *cursor < last {
            *cursor += 1;
        }
    }

    /// Moves selection up by one page.
    ///
    /// # Arguments
    /// * `visible_rows` - Number of rows visible in the current view
    pub fn page_up(&mut self, visible_rows: usize) {
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_sub(visible_rows);
    }

    /// Moves selection down by one page.
    ///
    /// # Arguments
    /// * `visible_rows` - Number of rows visible in the current view
    pub fn page_down(&mut self, visible_rows: usize) {
        let last = self.last_index();
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_add(visible_rows).min(last);
    }

    /// Jumps selection to the first row.
    pub fn jump_to_start(&mut self) {
        *self.cursor_mut() = 0;
    }

    /// Jumps selection to the last row.
    pub fn jump_to_end(&mut self) {
        let last = self.last_index();
        *self.cursor_mut() = last;
    }

    /// Switches to another full-screen page.
    pub fn show_page(&mut self, page: ViewMode) {
        if !page.is_page() || page == self.view_mode {
            return;
        }
        self.page_scroll_offset = 0;
        if page == ViewMode::Startup {
            self.reload_startup_entries();
        }
        self.view_mode = page;
        self.last_page = page;
    }
}

#[cfg(test)]
mod tests {
    use crate::app::state::tests::{settings, test_app};
    use crate::app::ViewMode;
    use crate::system::fake::{FakeProcess, FakeProcessSource};

    #[test]
    fn test_selection_stays_within_rows() {
        let source = FakeProcessSource::new(vec![
            FakeProcess::new(1, "init"),
            FakeProcess::new(2, "kthreadd"),
            FakeProcess::new(3, "bash"),
        ]);
        let mut app = test_app(source, &settings());
        app.refresh();

        app.move_up();
        assert_eq!(app.selected_index, 0);
        app.page_down(10);
        assert_eq!(app.selected_index, 2);
        app.move_down();
        assert_eq!(app.selected_index, 2);
        app.jump_to_start();
        assert_eq!(app.selected_index, 0);
        app.jump_to_end();
        assert_eq!(app.selected_process().map(|p| p.pid), Some(3));
    }

    #[test]
    fn test_show_page_ignores_dialogs() {
        let mut app = test_app(FakeProcessSource::default(), &settings());
        app.show_page(ViewMode::Help);
        assert_eq!(app.view_mode, ViewMode::ProcessList);
        app.show_page(ViewMode::Network);
        assert_eq!(app.view_mode, ViewMode::Network);
        app.move_down();
        assert_eq!(app.page_scroll_offset, 1);
        assert_eq!(app.selected_index, 0);
    }
}
