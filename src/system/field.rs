//! Per-field probe results
//!
//! A process row is assembled from many independent OS queries. Each one is
//! stored as a `Field` so a single failure never costs the whole row.

use std::fmt;

use crate::constants::{NOT_AVAILABLE, PERMISSION_DENIED};

use super::error::{ProbeError, ProbeResult};

/// The outcome of reading one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    /// The value was read
    Present(T),
    /// The value could not be read
    #[default]
    Unavailable,
    /// The OS refused to expose the value
    Denied,
}

impl<T> Field<T> {
    /// Borrow the value, if one was read.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Field::Present(value) => Field::Present(f(value)),
            Field::Unavailable => Field::Unavailable,
            Field::Denied => Field::Denied,
        }
    }

    /// Renders the value with `f`, or the matching sentinel text.
    pub fn display_with<F: FnOnce(&T) -> String>(&self, f: F) -> String {
        match self {
            Field::Present(value) => f(value),
            Field::Unavailable => NOT_AVAILABLE.to_string(),
            Field::Denied => PERMISSION_DENIED.to_string(),
        }
    }
}

impl<T> From<ProbeResult<T>> for Field<T> {
    fn from(result: ProbeResult<T>) -> Self {
        match result {
            Ok(value) => Field::Present(value),
            Err(ProbeError::AccessDenied) => Field::Denied,
            Err(_) => Field::Unavailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Present(value) => write!(f, "{}", value),
            Field::Unavailable => f.write_str(NOT_AVAILABLE),
            Field::Denied => f.write_str(PERMISSION_DENIED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_failures_become_sentinels() {
        let denied: Field<u32> = Err(ProbeError::AccessDenied).into();
        let gone: Field<u32> = Err(ProbeError::NoSuchProcess).into();
        let other: Field<u32> = Err(ProbeError::Other("boom".into())).into();

        assert_eq!(denied.to_string(), "Permission Denied");
        assert_eq!(gone.to_string(), "N/A");
        assert_eq!(other, Field::Unavailable);
    }

    #[test]
    fn test_present_value_displays_itself() {
        let threads: Field<u32> = Ok(12).into();
        assert_eq!(threads.to_string(), "12");
        assert_eq!(threads.as_option(), Some(&12));
        assert_eq!(threads.map(|t| t * 2), Field::Present(24));
    }
}
