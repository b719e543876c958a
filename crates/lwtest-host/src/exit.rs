//! Exit statuses shared by both hosts.

use std::process::ExitCode;

/// Process exit status of a host run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HostExit {
    /// Load, resolve and call all completed. The returned id is not judged.
    Success = 0,
    /// Required argument missing (full-path host only).
    Usage = 2,
    LoadFailed = 10,
    ResolveFailed = 11,
}

impl HostExit {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<HostExit> for ExitCode {
    fn from(value: HostExit) -> Self {
        ExitCode::from(value.code())
    }
}
