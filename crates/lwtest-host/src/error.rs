//! Host failure taxonomy.

use thiserror::Error;

use crate::dl::OsFailure;
use crate::exit::HostExit;

/// Why a host run stopped before printing a fixture id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The full-path host was started without a library path.
    #[error("usage: <fullpath-to-library>")]
    Usage,
    /// The library (or one of its imports) could not be loaded.
    #[error("{}({mode}) failed {failure}", .failure.api)]
    Load {
        mode: &'static str,
        failure: OsFailure,
    },
    /// The library loaded but does not export the entry point.
    #[error("{} failed {failure}", .failure.api)]
    Resolve {
        symbol: &'static str,
        failure: OsFailure,
    },
}

impl HostError {
    /// Exit status the host reports for this failure.
    #[must_use]
    pub fn exit_status(&self) -> HostExit {
        match self {
            Self::Usage => HostExit::Usage,
            Self::Load { .. } => HostExit::LoadFailed,
            Self::Resolve { .. } => HostExit::ResolveFailed,
        }
    }

    /// Short event name used in structured logs.
    #[must_use]
    pub fn event(&self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Load { .. } => "load_failed",
            Self::Resolve { .. } => "resolve_failed",
        }
    }

    /// The platform failure behind this error, if any.
    #[must_use]
    pub fn os_failure(&self) -> Option<&OsFailure> {
        match self {
            Self::Usage => None,
            Self::Load { failure, .. } | Self::Resolve { failure, .. } => Some(failure),
        }
    }
}
