//! Run-time configuration for the hosts.
//!
//! Both hosts read the same two environment variables:
//!
//! - `LWTEST_LOG`: path of a JSONL file structured log records are appended
//!   to. Logging is off when unset or empty.
//! - `LWTEST_RUN_ID`: run id embedded in trace ids. Defaults to the process
//!   id.

use std::ffi::OsString;
use std::path::PathBuf;

pub const LOG_ENV: &str = "LWTEST_LOG";
pub const RUN_ID_ENV: &str = "LWTEST_RUN_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub log_path: Option<PathBuf>,
    pub run_id: String,
}

impl HostConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build the configuration from an explicit variable list.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut log_path = None;
        let mut run_id = None;
        for (key, value) in vars {
            if value.is_empty() {
                continue;
            }
            if key == LOG_ENV {
                log_path = Some(PathBuf::from(value));
            } else if key == RUN_ID_ENV {
                run_id = Some(value.to_string_lossy().into_owned());
            }
        }
        Self {
            log_path,
            run_id: run_id.unwrap_or_else(|| std::process::id().to_string()),
        }
    }
}
