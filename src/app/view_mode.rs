//! View mode enum for application state
//!
//! Defines mutually exclusive application modes, ensuring only one
//! mode can be active at a time.

/// The current view/input mode of the application.
///
/// The first five are full-screen pages reachable with the number keys;
/// the rest are dialogs drawn over the process list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Process table (default mode)
    #[default]
    ProcessList,

    /// Six rolling graphs
    Performance,

    /// Boot time, cores, users, partitions and sensors
    SystemInfo,

    /// Interface counters and the socket table
    Network,

    /// Autostart entries
    Startup,

    /// Filter input mode - typing a name or pid filter
    FilterInput,

    /// Kill confirmation dialog - waiting for Y/N
    ConfirmKill,

    /// Typing a new nice value
    ReniceInput,

    /// Choosing an I/O priority class
    IoPriorityPick,

    /// CPU affinity editing dialog
    Affinity,

    /// Detailed process information view
    DetailView,

    /// Help overlay showing keyboard shortcuts
    Help,
}

impl ViewMode {
    /// Pages in tab order.
    pub const PAGES: [ViewMode; 5] = [
        ViewMode::ProcessList,
        ViewMode::Performance,
        ViewMode::SystemInfo,
        ViewMode::Network,
        ViewMode::Startup,
    ];

    /// True for the full-screen pages.
    #[inline]
    pub fn is_page(&self) -> bool {
        Self::PAGES.contains(self)
    }

    /// The page after this one, wrapping around.
    pub fn next_page(&self) -> ViewMode {
        let index = Self::PAGES.iter().position(|p| p == self).unwrap_or(0);
        Self::PAGES[(index + 1) % Self::PAGES.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::ProcessList => "Processes",
            ViewMode::Performance => "Performance",
            ViewMode::SystemInfo => "System",
            ViewMode::Network => "Network",
            ViewMode::Startup => "Startup",
            ViewMode::FilterInput => "Filter",
            ViewMode::ConfirmKill => "Kill",
            ViewMode::ReniceInput => "Renice",
            ViewMode::IoPriorityPick => "I/O Priority",
            ViewMode::Affinity => "CPU Affinity",
            ViewMode::DetailView => "Details",
            ViewMode::Help => "Help",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_cycle() {
        assert_eq!(ViewMode::ProcessList.next_page(), ViewMode::Performance);
        assert_eq!(ViewMode::Startup.next_page(), ViewMode::ProcessList);
        assert!(ViewMode::Network.is_page());
        assert!(!ViewMode::Help.is_page());
    }
}
