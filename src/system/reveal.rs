//! "Show in file manager" primitive

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Opens a directory in the desktop file manager.
pub trait Revealer {
    fn reveal(&self, dir: &Path) -> io::Result<()>;
}

/// Hands the directory to the platform opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileManagerRevealer;

impl FileManagerRevealer {
    #[cfg(target_os = "macos")]
    const OPENER: &'static str = "open";
    #[cfg(windows)]
    const OPENER: &'static str = "explorer";
    #[cfg(not(any(target_os = "macos", windows)))]
    const OPENER: &'static str = "xdg-open";
}

impl Revealer for FileManagerRevealer {
    fn reveal(&self, dir: &Path) -> io::Result<()> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            ));
        }
        let mut child = Command::new(Self::OPENER)
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Reap the opener without blocking the UI thread
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}
