//! XDG autostart `.desktop` files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::{debug, info};

use super::{StartupAdapter, StartupEntry, StartupError, StartupScope};

const DESKTOP_ENTRY_GROUP: &str = "[Desktop Entry]";
const SYSTEM_AUTOSTART_DIR: &str = "/etc/xdg/autostart";

/// Keys read from the `[Desktop Entry]` group.
#[derive(Debug, Default, PartialEq, Eq)]
struct DesktopEntry {
    name: Option<String>,
    exec: Option<String>,
    hidden: bool,
}

/// Same spellings a desktop-file `true` accepts in practice.
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn is_group_header(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('[') && line.ends_with(']')
}

/// Splits `key=value`, ignoring comments and blank lines.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    line.split_once('=').map(|(key, value)| (key.trim(), value.trim()))
}

/// `None` when the file has no `[Desktop Entry]` group.
fn parse_desktop_entry(contents: &str) -> Option<DesktopEntry> {
    let mut entry = DesktopEntry::default();
    let mut in_group = false;
    let mut found = false;

    for line in contents.lines() {
        if is_group_header(line) {
            in_group = line.trim() == DESKTOP_ENTRY_GROUP;
            found |= in_group;
            continue;
        }
        if !in_group {
            continue;
        }
        match split_key(line) {
            Some(("Name", value)) => entry.name = Some(value.to_string()),
            Some(("Exec", value)) => entry.exec = Some(value.to_string()),
            Some(("Hidden", value)) => entry.hidden = parse_bool(value),
            _ => {}
        }
    }

    found.then_some(entry)
}

/// Rewrites the `Hidden` key of the `[Desktop Entry]` group, keeping every
/// other line untouched.
fn set_hidden(contents: &str, hidden: bool) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut in_group = false;
    let mut header_index = None;
    let mut wrote_hidden = false;

    for line in contents.lines() {
        if is_group_header(line) {
            in_group = line.trim() == DESKTOP_ENTRY_GROUP;
            if in_group && header_index.is_none() {
                header_index = Some(lines.len());
            }
            lines.push(line.to_string());
            continue;
        }
        if in_group {
            if let Some(("Hidden", value)) = split_key(line) {
                if hidden {
                    if !wrote_hidden {
                        lines.push("Hidden=true".to_string());
                        wrote_hidden = true;
                    }
                    continue;
                }
                if parse_bool(value) {
                    continue;
                }
            }
        }
        lines.push(line.to_string());
    }

    let header_index = header_index?;
    if hidden && !wrote_hidden {
        lines.insert(header_index + 1, "Hidden=true".to_string());
    }

    let mut output = lines.join("\n");
    if contents.ends_with('\n') {
        output.push('\n');
    }
    Some(output)
}

/// Reads `~/.config/autostart` (honouring `$XDG_CONFIG_HOME`) and
/// `/etc/xdg/autostart`.
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    user_dir: PathBuf,
    system_dir: PathBuf,
}

impl XdgAutostart {
    pub fn new(user_dir: PathBuf, system_dir: PathBuf) -> Self {
        Self { user_dir, system_dir }
    }

    /// `None` when no home directory can be found.
    pub fn from_env() -> Option<Self> {
        let base = BaseDirs::new()?;
        Some(Self::new(
            base.config_dir().join("autostart"),
            PathBuf::from(SYSTEM_AUTOSTART_DIR),
        ))
    }

    fn scan(dir: &Path, scope: StartupScope) -> Vec<StartupEntry> {
        let Ok(read_dir) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "desktop"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| {
                let contents = match fs::read_to_string(&path) {
                    Ok(contents) => contents,
                    Err(err) => {
                        debug!("skipping {}: {}", path.display(), err);
                        return None;
                    }
                };
                let Some(parsed) = parse_desktop_entry(&contents) else {
                    debug!("skipping {}: no {} group", path.display(), DESKTOP_ENTRY_GROUP);
                    return None;
                };
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some(StartupEntry {
                    display_name: parsed.name.unwrap_or(file_name),
                    command: parsed.exec.unwrap_or_default(),
                    enabled: !parsed.hidden,
                    backing_path: path,
                    scope,
                })
            })
            .collect()
    }
}

impl StartupAdapter for XdgAutostart {
    fn name(&self) -> &'static str {
        "XDG autostart"
    }

    fn list_entries(&self) -> Vec<StartupEntry> {
        let mut entries = Self::scan(&self.user_dir, StartupScope::User);
        entries.extend(Self::scan(&self.system_dir, StartupScope::System));
        entries
    }

    fn set_enabled(&self, entry: &StartupEntry, enabled: bool) -> Result<(), StartupError> {
        let path = &entry.backing_path;
        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StartupError::NotFound(path.clone()),
            _ => StartupError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let updated = set_hidden(&contents, !enabled)
            .ok_or_else(|| StartupError::MissingDesktopEntry(path.clone()))?;
        fs::write(path, updated).map_err(|source| StartupError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            "{} startup entry {}",
            if enabled { "enabled" } else { "disabled" },
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIREFOX: &str =
        "[Desktop Entry]\nType=Application\nName=Firefox\nExec=firefox --new-window\n";

    fn adapter(user: &TempDir, system: &TempDir) -> XdgAutostart {
        XdgAutostart::new(user.path().to_path_buf(), system.path().to_path_buf())
    }

    #[test]
    fn test_lists_user_and_system_entries() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        fs::write(user.path().join("firefox.desktop"), FIREFOX).unwrap();
        fs::write(
            system.path().join("tracker.desktop"),
            "[Desktop Entry]\nExec=tracker\nHidden=true\n",
        )
        .unwrap();
        fs::write(user.path().join("notes.txt"), "not a desktop file").unwrap();

        let entries = adapter(&user, &system).list_entries();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].display_name, "Firefox");
        assert_eq!(entries[0].command, "firefox --new-window");
        assert!(entries[0].enabled);
        assert_eq!(entries[0].scope, StartupScope::User);

        assert_eq!(entries[1].display_name, "tracker.desktop");
        assert!(!entries[1].enabled);
        assert_eq!(entries[1].scope, StartupScope::System);
    }

    #[test]
    fn test_unparseable_files_are_skipped() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        fs::write(user.path().join("broken.desktop"), "Name=No group here\n").unwrap();
        fs::write(user.path().join("binary.desktop"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(adapter(&user, &system).list_entries().is_empty());
    }

    #[test]
    fn test_disable_then_enable_preserves_other_lines() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let path = user.path().join("firefox.desktop");
        let original = "# managed by hand\n[Desktop Entry]\nName=Firefox\nExec=firefox\n\n\
                        [Desktop Action new]\nName=New\n";
        fs::write(&path, original).unwrap();

        let adapter = adapter(&user, &system);
        let entry = adapter.list_entries().remove(0);

        adapter.set_enabled(&entry, false).unwrap();
        let disabled = fs::read_to_string(&path).unwrap();
        assert_eq!(
            disabled,
            "# managed by hand\n[Desktop Entry]\nHidden=true\nName=Firefox\nExec=firefox\n\n\
             [Desktop Action new]\nName=New\n"
        );
        assert!(!adapter.list_entries()[0].enabled);

        adapter.set_enabled(&entry, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(adapter.list_entries()[0].enabled);
    }

    #[test]
    fn test_disable_replaces_existing_hidden_key_in_place() {
        let updated = set_hidden("[Desktop Entry]\nName=A\nHidden=false\nExec=a\n", true).unwrap();
        assert_eq!(updated, "[Desktop Entry]\nName=A\nHidden=true\nExec=a\n");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let entry = StartupEntry {
            display_name: "gone".into(),
            command: String::new(),
            enabled: true,
            backing_path: user.path().join("gone.desktop"),
            scope: StartupScope::User,
        };
        let err = adapter(&user, &system).set_enabled(&entry, false).unwrap_err();
        assert!(matches!(err, StartupError::NotFound(_)));
    }

    #[test]
    fn test_missing_group_is_an_error() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let path = user.path().join("odd.desktop");
        fs::write(&path, "Name=odd\n").unwrap();
        let entry = StartupEntry {
            display_name: "odd".into(),
            command: String::new(),
            enabled: true,
            backing_path: path,
            scope: StartupScope::User,
        };
        let err = adapter(&user, &system).set_enabled(&entry, false).unwrap_err();
        assert!(matches!(err, StartupError::MissingDesktopEntry(_)));
    }
}
