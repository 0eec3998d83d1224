//! CPU affinity dialog management

use super::state::App;
use super::{ProcessIdentity, ViewMode};

/// Core checkboxes for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityDialog {
    pub identity: ProcessIdentity,
    pub name: String,
    /// One entry per logical cpu
    pub cores: Vec<bool>,
    pub selected_core: usize,
}

impl AffinityDialog {
    fn new(
        identity: ProcessIdentity,
        name: String,
        logical_cpus: usize,
        current: &[usize],
    ) -> Self {
        let mut cores = vec![false; logical_cpus];
        for core in current {
            if let Some(slot) = cores.get_mut(*core) {
                *slot = true;
            }
        }
        Self {
            identity,
            name,
            cores,
            selected_core: 0,
        }
    }

    /// Indices of the checked cores.
    pub fn chosen(&self) -> Vec<usize> {
        self.cores
            .iter()
            .enumerate()
            .filter_map(|(core, on)| on.then_some(core))
            .collect()
    }
}

impl App {
    /// Opens the affinity dialog for the selected process, or the one in
    /// the detail view.
    pub fn open_affinity_dialog(&mut self) {
        let target = match (&self.detail_view_data, self.view_mode) {
            (Some(details), ViewMode::DetailView) => details
                .name
                .as_option()
                .cloned()
                .map(|name| (details.identity, name)),
            _ => self.selected_process().map(|p| (p.identity(), p.name.clone())),
        };
        let Some((identity, name)) = target else {
            return;
        };

        match self.with_gateway(|gateway, source| gateway.prepare_affinity(source, &identity)) {
            Ok(current) => {
                let logical_cpus = self.gateway.logical_cpus();
                self.affinity_dialog =
                    Some(AffinityDialog::new(identity, name, logical_cpus, &current));
                self.view_mode = ViewMode::Affinity;
            }
            Err(err) => self.report_action(Err(err)),
        }
    }

    /// Closes the affinity dialog without applying changes
    pub fn close_affinity_dialog(&mut self) {
        self.affinity_dialog = None;
        self.view_mode = if self.detail_view_data.is_some() {
            ViewMode::DetailView
        } else {
            ViewMode::ProcessList
        };
    }

    /// Toggles the selected core.
    pub fn toggle_affinity_core(&mut self) {
        if let Some(dialog) = self.affinity_dialog.as_mut() {
            if let Some(slot) = dialog.cores.get_mut(dialog.selected_core) {
                *slot = !*slot;
            }
        }
    }

    pub fn select_all_cores(&mut self) {
        if let Some(dialog) = self.affinity_dialog.as_mut() {
            dialog.cores.iter_mut().for_each(|slot| *slot = true);
        }
    }

    /// Leaves only the core under the cursor checked.
    pub fn select_single_core(&mut self) {
        if let Some(dialog) = self.affinity_dialog.as_mut() {
            let selected = dialog.selected_core;
            for (core, slot) in dialog.cores.iter_mut().enumerate() {
                *slot = core == selected;
            }
        }
    }

    pub fn affinity_move_left(&mut self) {
        if let Some(dialog) = self.affinity_dialog.as_mut() {
            dialog.selected_core = dialog.selected_core.saturating_sub(1);
        }
    }

    pub fn affinity_move_right(&mut self) {
        if let Some(dialog) = self.affinity_dialog.as_mut() {
            if dialog.selected_core + 1 < dialog.cores.len() {
                dialog.selected_core += 1;
            }
        }
    }

    /// Applies the checked cores. An empty selection is rejected by the
    /// gateway and the dialog stays open.
    pub fn apply_affinity(&mut self) {
        let Some(dialog) = self.affinity_dialog.clone() else {
            return;
        };
        let cores = dialog.chosen();
        let result = self.with_gateway(|gateway, source| {
            gateway.set_cpu_affinity(source, &dialog.identity, &cores)
        });
        let keep_open = matches!(result, Err(crate::system::ActionError::InvalidArgument { .. }));
        if !keep_open {
            self.close_affinity_dialog();
        }
        self.report_action(result);
    }
}
