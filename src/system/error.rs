//! Custom error types for type-safe error handling
//!
//! `ProbeError` classifies a single failed OS query. `ActionError` is what
//! the action gateway reports back to the user after a mutating call.

use std::fmt;
use std::io;

use crate::constants::ELEVATION_HINT;

// ============================================================================
// Probe Error
// ============================================================================

/// Why a single OS query failed.
///
/// Every accessor on a process or resource source can fail independently,
/// so callers decide per field what a failure means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The process no longer exists
    NoSuchProcess,

    /// The OS refused to expose the value
    AccessDenied,

    /// The platform does not provide this value
    Unavailable,

    /// Anything else, with the OS message
    Other(String),
}

impl ProbeError {
    /// Classifies an `io::Error` coming from a `/proc` read or a syscall.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ProbeError::NoSuchProcess,
            io::ErrorKind::PermissionDenied => ProbeError::AccessDenied,
            io::ErrorKind::Unsupported => ProbeError::Unavailable,
            _ => ProbeError::Other(err.to_string()),
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::NoSuchProcess => write!(f, "Process not found or has terminated"),
            ProbeError::AccessDenied => write!(f, "Access denied"),
            ProbeError::Unavailable => write!(f, "Not available on this platform"),
            ProbeError::Other(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        ProbeError::from_io(&err)
    }
}

// ============================================================================
// Action Error
// ============================================================================

/// Errors reported by the process action gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The target process exited, or its pid now belongs to another process
    ProcessVanished,

    /// The OS refused the action
    PermissionDenied {
        /// What the user can try instead
        hint: &'static str,
    },

    /// The OS call failed for another reason
    ActionFailed {
        /// OS message, unmodified
        message: String,
    },

    /// Rejected before any OS call was made
    InvalidArgument {
        /// Description of what was invalid
        reason: String,
    },

    /// The executable path could not be resolved or revealed
    PathUnavailable {
        /// Why the path could not be used
        reason: String,
    },

    /// This platform cannot perform the action
    Unsupported,
}

impl ActionError {
    /// Maps a probe failure raised while resolving or mutating a process.
    pub fn from_probe(err: ProbeError) -> Self {
        match err {
            ProbeError::NoSuchProcess => ActionError::ProcessVanished,
            ProbeError::AccessDenied => ActionError::PermissionDenied { hint: ELEVATION_HINT },
            ProbeError::Unavailable => ActionError::Unsupported,
            ProbeError::Other(message) => ActionError::ActionFailed { message },
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::ProcessVanished => {
                write!(f, "Process no longer exists")
            }
            ActionError::PermissionDenied { hint } => {
                write!(f, "Permission denied - {}", hint)
            }
            ActionError::ActionFailed { message } => {
                write!(f, "{}", message)
            }
            ActionError::InvalidArgument { reason } => {
                write!(f, "Invalid argument: {}", reason)
            }
            ActionError::PathUnavailable { reason } => {
                write!(f, "Path unavailable: {}", reason)
            }
            ActionError::Unsupported => {
                write!(f, "Not supported on this platform")
            }
        }
    }
}

impl std::error::Error for ActionError {}

impl From<ProbeError> for ActionError {
    fn from(err: ProbeError) -> Self {
        ActionError::from_probe(err)
    }
}

// ============================================================================
// Result type aliases
// ============================================================================

/// Result type for OS queries
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type for gateway actions
pub type ActionResult<T> = Result<T, ActionError>;
