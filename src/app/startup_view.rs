//! Startup page flows

use log::warn;

use super::state::App;

impl App {
    /// Reads the autostart entries again from disk or registry.
    pub fn reload_startup_entries(&mut self) {
        self.startup_entries = self.startup.list_entries();
        if self.startup_selected >= self.startup_entries.len() {
            self.startup_selected = self.startup_entries.len().saturating_sub(1);
        }
    }

    /// Enables or disables the highlighted entry.
    pub fn set_startup_enabled(&mut self, enabled: bool) {
        let Some(entry) = self.startup_entries.get(self.startup_selected).cloned() else {
            return;
        };
        let verb = if enabled { "enable" } else { "disable" };

        if entry.enabled == enabled {
            self.status_message = Some(format!(
                "{} is already {}d",
                entry.display_name, verb
            ));
            return;
        }

        match self.startup.set_enabled(&entry, enabled) {
            Ok(()) => {
                self.status_message = Some(format!("{}: {}d", entry.display_name, verb));
                self.reload_startup_entries();
            }
            Err(err) => {
                warn!("failed to {} startup entry {}: {}", verb, entry.display_name, err);
                self.status_message =
                    Some(format!("Cannot {} {}: {}", verb, entry.display_name, err));
            }
        }
    }
}
