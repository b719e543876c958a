//! Thin wrapper for running cargo from the harness.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::HarnessError;

/// A cargo command line plus the environment it runs with.
#[derive(Debug, Clone)]
pub struct CargoInvocation {
    program: OsString,
    args: Vec<String>,
    envs: Vec<(String, OsString)>,
    cwd: PathBuf,
}

impl CargoInvocation {
    /// Start a cargo command in `cwd`, using `$CARGO` when the harness itself
    /// runs under cargo.
    #[must_use]
    pub fn new(cwd: &Path, subcommand: &str) -> Self {
        Self {
            program: std::env::var_os("CARGO").unwrap_or_else(|| OsString::from("cargo")),
            args: vec![subcommand.to_string()],
            envs: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn release(self, release: bool) -> Self {
        if release { self.arg("--release") } else { self }
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_env(&self, key: &str) -> Option<&OsString> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn display(&self) -> String {
        format!("{} {}", self.program.to_string_lossy(), self.args.join(" "))
    }

    /// Run to completion, inheriting stdio.
    pub fn run(&self) -> Result<(), HarnessError> {
        eprintln!("harness: {}", self.display());
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.cwd);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        let status = command.status().map_err(|source| HarnessError::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(HarnessError::CommandFailed {
                command: self.display(),
                status: status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "terminated".to_string()),
            })
        }
    }
}
