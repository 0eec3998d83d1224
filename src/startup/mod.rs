//! Autostart entries
//!
//! Each platform keeps its login items somewhere different. The adapter for
//! the compile target is chosen once by `platform_adapter`.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[cfg(windows)]
mod registry;
#[cfg(all(unix, not(target_os = "macos")))]
mod xdg;

#[cfg(windows)]
pub use registry::RegistryRunKeys;
#[cfg(all(unix, not(target_os = "macos")))]
pub use xdg::XdgAutostart;

/// Whose login an entry runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupScope {
    User,
    System,
}

impl StartupScope {
    pub fn name(&self) -> &'static str {
        match self {
            StartupScope::User => "User",
            StartupScope::System => "System",
        }
    }
}

/// One program launched at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupEntry {
    pub display_name: String,
    pub command: String,
    pub enabled: bool,
    /// File or registry key the entry was read from
    pub backing_path: PathBuf,
    pub scope: StartupScope,
}

/// Why toggling an entry failed.
#[derive(Debug)]
pub enum StartupError {
    /// The backing file is gone
    NotFound(PathBuf),
    /// The file has no `[Desktop Entry]` group
    MissingDesktopEntry(PathBuf),
    /// Reading or writing the backing store failed
    Io { path: PathBuf, source: io::Error },
    /// This adapter cannot change entries
    ReadOnly(&'static str),
    Unsupported,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::NotFound(path) => write!(f, "{} does not exist", path.display()),
            StartupError::MissingDesktopEntry(path) => {
                write!(f, "{} has no [Desktop Entry] group", path.display())
            }
            StartupError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            StartupError::ReadOnly(reason) => f.write_str(reason),
            StartupError::Unsupported => f.write_str("unsupported OS"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Lists and toggles autostart entries.
pub trait StartupAdapter {
    /// Short label for the view title
    fn name(&self) -> &'static str;

    /// Reads all entries fresh from the backing store.
    fn list_entries(&self) -> Vec<StartupEntry>;

    /// Writes the enabled state straight to the entry's backing store.
    fn set_enabled(&self, entry: &StartupEntry, enabled: bool) -> Result<(), StartupError>;
}

/// Used where no autostart mechanism is known.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedStartup;

impl StartupAdapter for UnsupportedStartup {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn list_entries(&self) -> Vec<StartupEntry> {
        Vec::new()
    }

    fn set_enabled(&self, _entry: &StartupEntry, _enabled: bool) -> Result<(), StartupError> {
        Err(StartupError::Unsupported)
    }
}

/// The adapter for the platform this binary was built for.
pub fn platform_adapter() -> Box<dyn StartupAdapter> {
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        match XdgAutostart::from_env() {
            Some(adapter) => Box::new(adapter),
            None => {
                log::warn!("no home directory; startup entries disabled");
                Box::new(UnsupportedStartup)
            }
        }
    }
    #[cfg(windows)]
    {
        Box::new(RegistryRunKeys)
    }
    #[cfg(any(target_os = "macos", not(any(unix, windows))))]
    {
        Box::new(UnsupportedStartup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_adapter() {
        let adapter = UnsupportedStartup;
        assert!(adapter.list_entries().is_empty());

        let entry = StartupEntry {
            display_name: "x".into(),
            command: "x".into(),
            enabled: true,
            backing_path: PathBuf::from("x"),
            scope: StartupScope::User,
        };
        let err = adapter.set_enabled(&entry, false).unwrap_err();
        assert!(err.to_string().contains("unsupported OS"));
    }
}
