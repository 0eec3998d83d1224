//! Registry `Run` keys (read only)

use std::path::PathBuf;

use log::debug;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::ERROR_NO_MORE_ITEMS;
use windows::Win32::System::Registry::{
    RegCloseKey, RegEnumValueW, RegOpenKeyExW, HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
    KEY_READ, REG_EXPAND_SZ, REG_SZ,
};

use super::{StartupAdapter, StartupEntry, StartupError, StartupScope};

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Longest value name the registry allows, plus the terminator
const MAX_VALUE_NAME: usize = 16_384;

/// Value data buffer; longer commands are skipped
const MAX_VALUE_DATA: usize = 32_768;

/// An open registry key closed on drop.
struct OwnedKey(HKEY);

impl OwnedKey {
    fn open(root: HKEY, path: &str) -> Option<Self> {
        let wide: Vec<u16> = path.encode_utf16().chain(Some(0)).collect();
        let mut key = HKEY::default();
        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let status = unsafe { RegOpenKeyExW(root, PCWSTR(wide.as_ptr()), 0, KEY_READ, &mut key) };
        status.is_ok().then_some(Self(key))
    }
}

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: We own this key and close it exactly once.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

fn wide_to_string(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|c| *c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

/// Lists the string values of one `Run` key.
fn read_run_key(root: HKEY, root_name: &str, scope: StartupScope) -> Vec<StartupEntry> {
    let Some(key) = OwnedKey::open(root, RUN_KEY) else {
        debug!("cannot open {}\\{}", root_name, RUN_KEY);
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut name = vec![0u16; MAX_VALUE_NAME];
    let mut data = vec![0u8; MAX_VALUE_DATA];

    for index in 0.. {
        let mut name_len = name.len() as u32;
        let mut data_len = data.len() as u32;
        let mut value_type = 0u32;
        // SAFETY: the buffers and their lengths stay valid for the call.
        let status = unsafe {
            RegEnumValueW(
                key.0,
                index,
                PWSTR(name.as_mut_ptr()),
                &mut name_len,
                None,
                Some(&mut value_type as *mut u32),
                Some(data.as_mut_ptr()),
                Some(&mut data_len as *mut u32),
            )
        };
        if status == ERROR_NO_MORE_ITEMS {
            break;
        }
        if status.is_err() {
            debug!("skipping value {} of {}\\{}: {:?}", index, root_name, RUN_KEY, status);
            continue;
        }
        if value_type != REG_SZ.0 && value_type != REG_EXPAND_SZ.0 {
            continue;
        }

        let command: Vec<u16> = data[..data_len as usize]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let display_name = wide_to_string(&name[..name_len as usize]);
        entries.push(StartupEntry {
            backing_path: PathBuf::from(format!("{}\\{}\\{}", root_name, RUN_KEY, display_name)),
            display_name,
            command: wide_to_string(&command),
            enabled: true,
            scope,
        });
    }
    entries
}

/// `HKCU` and `HKLM` `...\CurrentVersion\Run` values.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryRunKeys;

impl StartupAdapter for RegistryRunKeys {
    fn name(&self) -> &'static str {
        "Registry Run keys"
    }

    fn list_entries(&self) -> Vec<StartupEntry> {
        let mut entries = read_run_key(HKEY_CURRENT_USER, "HKCU", StartupScope::User);
        entries.extend(read_run_key(HKEY_LOCAL_MACHINE, "HKLM", StartupScope::System));
        entries
    }

    fn set_enabled(&self, _entry: &StartupEntry, _enabled: bool) -> Result<(), StartupError> {
        Err(StartupError::ReadOnly(
            "Toggling registry Run entries is not supported; \
             the StartupApproved state is not edited",
        ))
    }
}
