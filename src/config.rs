//! Configuration management (TOML)
//!
//! Settings come from three layers: built-in defaults, the optional config
//! file, then command-line flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::app::{Args, SortColumn};
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_REFRESH_MS, LOG_FILE_NAME, MAX_REFRESH_MS,
    MIN_REFRESH_MS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub interval_ms: u64,
    pub disk_mount: PathBuf,
    pub pin_sort: bool,
    pub sample_connections: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_REFRESH_MS,
            disk_mount: PathBuf::from("/"),
            pin_sort: false,
            sample_connections: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", CONFIG_DIR_NAME)
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        };
        let config = Self::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

/// Final settings after all layers are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval: Duration,
    pub filter: String,
    pub sort: Option<SortColumn>,
    pub pin_sort: bool,
    pub disk_mount: PathBuf,
    pub sample_connections: bool,
    pub log_level: String,
    pub log_file: PathBuf,
    pub once: bool,
}

impl Settings {
    /// Merges `file` under `args`. Returns the settings and any warnings,
    /// which are logged once logging is up.
    pub fn resolve(args: &Args, file: FileConfig) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let interval_ms = match args.interval {
            Some(ms) => ms,
            None => {
                let ms = file.general.interval_ms;
                let clamped = ms.clamp(MIN_REFRESH_MS, MAX_REFRESH_MS);
                if clamped != ms {
                    warnings.push(format!(
                        "interval_ms {} is outside {}..={}, using {}",
                        ms, MIN_REFRESH_MS, MAX_REFRESH_MS, clamped
                    ));
                }
                clamped
            }
        };

        let log_file = args
            .log_file
            .clone()
            .or(file.logging.file)
            .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME)))
            .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME));

        let settings = Self {
            interval: Duration::from_millis(interval_ms),
            filter: args.filter.clone().unwrap_or_default(),
            sort: args.sort,
            pin_sort: args.pin_sort || file.general.pin_sort,
            disk_mount: args.disk_mount.clone().unwrap_or(file.general.disk_mount),
            sample_connections: file.general.sample_connections,
            log_level: file.logging.level,
            log_file,
            once: args.once,
        };
        (settings, warnings)
    }

    /// Reads the config file named by `args` (or the default one) and merges.
    /// A broken file is reported as a warning and replaced by defaults.
    pub fn load(args: &Args) -> (Self, Vec<String>) {
        let path = args.config.clone().or_else(FileConfig::default_path);
        let mut warnings = Vec::new();

        let file = match path.as_deref().map(FileConfig::load) {
            Some(Ok(Some(config))) => config,
            Some(Ok(None)) | None => FileConfig::default(),
            Some(Err(err)) => {
                warnings.push(format!("{:#}; using defaults", err));
                FileConfig::default()
            }
        };

        let (settings, more) = Self::resolve(args, file);
        warnings.extend(more);
        (settings, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = FileConfig::parse("[general]\npin_sort = true\n").unwrap();
        assert!(config.general.pin_sort);
        assert_eq!(config.general.interval_ms, DEFAULT_REFRESH_MS);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig::parse(concat!(
            "[general]\ninterval_ms = 2000\ndisk_mount = \"/data\"\n",
            "\n[logging]\nlevel = \"debug\"\n",
        ))
        .unwrap();
        let args = Args {
            interval: Some(500),
            ..Args::default()
        };
        let (settings, warnings) = Settings::resolve(&args, file);
        assert!(warnings.is_empty());
        assert_eq!(settings.interval, Duration::from_millis(500));
        assert_eq!(settings.disk_mount, PathBuf::from("/data"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_out_of_range_file_interval_is_clamped() {
        let file = FileConfig::parse("[general]\ninterval_ms = 50\n").unwrap();
        let (settings, warnings) = Settings::resolve(&Args::default(), file);
        assert_eq!(settings.interval, Duration::from_millis(MIN_REFRESH_MS));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\ninterval_ms = ").unwrap();

        let args = Args {
            config: Some(path),
            ..Args::default()
        };
        let (settings, warnings) = Settings::load(&args);
        assert_eq!(settings.interval, Duration::from_millis(DEFAULT_REFRESH_MS));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileConfig::load(&dir.path().join("absent.toml")).unwrap(), None);
    }
}
