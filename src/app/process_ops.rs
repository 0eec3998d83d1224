//! Process management flows (kill, suspend, renice, I/O priority, folder)
//!
//! Each flow picks the selected row, hands its identity to the gateway and
//! shows the outcome in the footer.

use crate::system::{ActionError, IoPriority};

use super::state::App;
use super::{ProcessIdentity, ViewMode};

/// State of the I/O priority picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoPriorityDialog {
    pub identity: ProcessIdentity,
    pub name: String,
    /// Index into `IoPriority::ALL`
    pub selected: usize,
}

impl IoPriorityDialog {
    pub fn class(&self) -> IoPriority {
        IoPriority::ALL[self.selected.min(IoPriority::ALL.len() - 1)]
    }
}

impl App {
    fn selected_identity(&self) -> Option<(ProcessIdentity, String)> {
        self.selected_process()
            .map(|p| (p.identity(), p.name.clone()))
    }

    /// Requests to kill the currently selected process (shows confirmation)
    pub fn request_kill(&mut self) {
        let Some(record) = self.selected_process().cloned() else {
            return;
        };

        match self.with_gateway(|gateway, source| gateway.prepare_kill(source, &record)) {
            Ok(pending) => {
                self.status_message = Some(format!(
                    "Kill {} (PID {})? Press Y to confirm, N to cancel",
                    pending.name(),
                    pending.pid()
                ));
                self.pending_kill = Some(pending);
                self.view_mode = ViewMode::ConfirmKill;
            }
            Err(err) => self.report_action(Err(err)),
        }
    }

    /// Confirms and executes the pending kill
    pub fn confirm_kill(&mut self) {
        self.view_mode = ViewMode::ProcessList;
        let Some(pending) = self.pending_kill.take() else {
            return;
        };
        let result = self.with_gateway(|gateway, source| gateway.kill(source, pending));
        self.report_action(result);
    }

    /// Cancels the pending kill
    pub fn cancel_kill(&mut self) {
        self.view_mode = ViewMode::ProcessList;
        self.pending_kill = None;
        self.status_message = None;
    }

    pub fn suspend_selected(&mut self) {
        let Some((identity, _)) = self.selected_identity() else {
            return;
        };
        let result = self.with_gateway(|gateway, source| gateway.suspend(source, &identity));
        self.report_action(result);
    }

    pub fn resume_selected(&mut self) {
        let Some((identity, _)) = self.selected_identity() else {
            return;
        };
        let result = self.with_gateway(|gateway, source| gateway.resume(source, &identity));
        self.report_action(result);
    }

    /// Opens the renice prompt pre-filled with the current nice value.
    pub fn open_renice_prompt(&mut self) {
        let Some((identity, name)) = self.selected_identity() else {
            return;
        };
        match self.with_gateway(|gateway, source| gateway.prepare_renice(source, &identity)) {
            Ok(current) => {
                self.renice_input = current.to_string();
                self.renice_target = Some((identity, name));
                self.view_mode = ViewMode::ReniceInput;
            }
            Err(err) => self.report_action(Err(err)),
        }
    }

    pub fn close_renice_prompt(&mut self) {
        self.view_mode = ViewMode::ProcessList;
        self.renice_target = None;
        self.renice_input.clear();
    }

    /// Parses the typed value and applies it.
    pub fn apply_renice(&mut self) {
        let Some((identity, _)) = self.renice_target.take() else {
            self.close_renice_prompt();
            return;
        };
        let input = self.renice_input.trim().to_string();
        self.close_renice_prompt();

        let result = match input.parse::<i32>() {
            Ok(value) => {
                self.with_gateway(|gateway, source| gateway.renice(source, &identity, value))
            }
            Err(_) => Err(ActionError::InvalidArgument {
                reason: format!("'{}' is not a whole number", input),
            }),
        };
        self.report_action(result);
    }

    /// Opens the I/O class picker on the current class.
    pub fn open_io_priority_dialog(&mut self) {
        let Some((identity, name)) = self.selected_identity() else {
            return;
        };
        match self.with_gateway(|gateway, source| gateway.prepare_io_priority(source, &identity)) {
            Ok(current) => {
                let selected = IoPriority::ALL
                    .iter()
                    .position(|class| *class == current)
                    .unwrap_or(0);
                self.io_priority_dialog = Some(IoPriorityDialog {
                    identity,
                    name,
                    selected,
                });
                self.view_mode = ViewMode::IoPriorityPick;
            }
            Err(err) => self.report_action(Err(err)),
        }
    }

    pub fn close_io_priority_dialog(&mut self) {
        self.view_mode = ViewMode::ProcessList;
        self.io_priority_dialog = None;
    }

    pub fn io_priority_move_up(&mut self) {
        if let Some(dialog) = self.io_priority_dialog.as_mut() {
            dialog.selected = dialog.selected.saturating_sub(1);
        }
    }

    pub fn io_priority_move_down(&mut self) {
        if let Some(dialog) = self.io_priority_dialog.as_mut() {
            dialog.selected = (dialog.selected + 1).min(IoPriority::ALL.len() - 1);
        }
    }

    pub fn apply_io_priority(&mut self) {
        let Some(dialog) = self.io_priority_dialog.take() else {
            self.close_io_priority_dialog();
            return;
        };
        self.close_io_priority_dialog();
        let class = dialog.class();
        let result = self.with_gateway(|gateway, source| {
            gateway.set_io_priority(source, &dialog.identity, class)
        });
        self.report_action(result);
    }

    /// Reveals the selected executable's directory in the file manager.
    pub fn open_containing_folder(&mut self) {
        let Some((identity, _)) = self.selected_identity() else {
            return;
        };
        let result =
            self.with_gateway(|gateway, source| gateway.open_containing_folder(source, &identity));
        self.report_action(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{settings, test_app};
    use crate::system::fake::{FakeProcess, FakeProcessSource, Mutation};
    use crate::system::ProcessStatus;

    #[test]
    fn test_kill_needs_confirmation() {
        let source = FakeProcessSource::new(vec![FakeProcess::new(42, "runaway")]);
        let log = source.mutation_log();
        let mut app = test_app(source, &settings());
        app.refresh();

        app.request_kill();
        assert_eq!(app.view_mode, ViewMode::ConfirmKill);
        assert!(log.borrow().is_empty());

        app.confirm_kill();
        assert_eq!(*log.borrow(), vec![Mutation::Kill(42)]);
        assert_eq!(app.view_mode, ViewMode::ProcessList);
        assert!(app.status_message.as_deref().unwrap_or("").contains("runaway"));
    }

    #[test]
    fn test_open_folder_of_exited_process_refreshes_table() {
        let source = FakeProcessSource::new(vec![
            FakeProcess::new(42, "gone"),
            FakeProcess::new(43, "stays"),
        ]);
        let exited = source.exited_pids();
        let mut app = test_app(source, &settings());
        app.refresh();
        assert_eq!(app.processes_list.len(), 2);

        exited.borrow_mut().push(42);
        app.open_containing_folder();
        assert_eq!(app.status_message.as_deref(), Some("Process no longer exists"));
        let pids: Vec<u32> = app.processes_list.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![43]);
    }

    #[test]
    fn test_cancel_kill_makes_no_call() {
        let source = FakeProcessSource::new(vec![FakeProcess::new(42, "runaway")]);
        let log = source.mutation_log();
        let mut app = test_app(source, &settings());
        app.refresh();

        app.request_kill();
        app.cancel_kill();
        assert!(app.pending_kill.is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_renice_prompt_rejects_garbage_and_range() {
        let source = FakeProcessSource::new(vec![FakeProcess::new(7, "job")]);
        let log = source.mutation_log();
        let mut app = test_app(source, &settings());
        app.refresh();

        app.open_renice_prompt();
        assert_eq!(app.view_mode, ViewMode::ReniceInput);
        assert_eq!(app.renice_input, "0");

        app.renice_input = "abc".into();
        app.apply_renice();
        assert!(app.status_message.as_deref().unwrap_or("").starts_with("Invalid argument"));

        app.open_renice_prompt();
        app.renice_input = "25".into();
        app.apply_renice();
        assert!(app.status_message.as_deref().unwrap_or("").contains("outside"));
        assert!(log.borrow().is_empty());

        app.open_renice_prompt();
        app.renice_input = "10".into();
        app.apply_renice();
        assert_eq!(*log.borrow(), vec![Mutation::Nice(7, 10)]);
    }

    #[test]
    fn test_suspend_on_stopped_process_reports_no_op() {
        let source = FakeProcessSource::new(vec![
            FakeProcess::new(3, "paused").with_status(ProcessStatus::Stopped)
        ]);
        let log = source.mutation_log();
        let mut app = test_app(source, &settings());
        app.refresh();

        app.suspend_selected();
        assert!(app.status_message.as_deref().unwrap_or("").contains("already suspended"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_io_priority_picker_starts_on_current_class() {
        let source = FakeProcessSource::new(vec![FakeProcess::new(3, "backup")]);
        let log = source.mutation_log();
        let mut app = test_app(source, &settings());
        app.refresh();

        app.open_io_priority_dialog();
        let dialog = app.io_priority_dialog.clone().unwrap();
        assert_eq!(dialog.class(), IoPriority::Normal);

        app.io_priority_move_up();
        app.apply_io_priority();
        assert_eq!(*log.borrow(), vec![Mutation::IoPriority(3, IoPriority::BelowNormal)]);
        assert!(app.io_priority_dialog.is_none());
    }
}
