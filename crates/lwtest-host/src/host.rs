//! The load, resolve, call, release sequence shared by both hosts.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use lwtest_core::{FIXTURE_ID_SYMBOL, FIXTURE_ID_SYMBOL_C};

use crate::config::HostConfig;
use crate::dl::{Library, OsFailure};
use crate::error::HostError;
use crate::exit::HostExit;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel};

/// What the host hands to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// An explicit path, used as given.
    FullPath(PathBuf),
    /// A bare filename resolved through the default search path.
    Name(OsString),
}

impl LoadTarget {
    /// The fixture library's platform filename, e.g. `liblwtest_a.so`.
    #[must_use]
    pub fn fixture_name() -> Self {
        Self::Name(lwtest_core::library_filename(lwtest_core::LWTEST_A_STEM).into())
    }

    /// Full-path target from the arguments after the program name.
    ///
    /// Only a missing first argument is a usage error. Any value, including
    /// an empty or dash-prefixed one, goes to the loader unchanged.
    pub fn from_args<I>(args: I) -> Result<Self, HostError>
    where
        I: IntoIterator<Item = OsString>,
    {
        args.into_iter()
            .next()
            .map(|arg| Self::FullPath(PathBuf::from(arg)))
            .ok_or(HostError::Usage)
    }

    /// `fullpath` or `name`, as shown in diagnostics.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::FullPath(_) => "fullpath",
            Self::Name(_) => "name",
        }
    }

    #[must_use]
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            Self::FullPath(path) => path.as_os_str(),
            Self::Name(name) => name.as_os_str(),
        }
    }
}

/// Result of a completed sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRun {
    pub fixture_id: i32,
    /// Set when the final release failed. The run still counts as a success.
    pub release_failure: Option<OsFailure>,
}

/// Load `target`, resolve and call `lwtest_fixture_id`, then release.
///
/// The library is released on every path after a successful load; on a
/// resolution failure it is dropped before the error is returned.
pub fn run(target: &LoadTarget) -> Result<HostRun, HostError> {
    let library = Library::open(target.as_os_str()).map_err(|failure| HostError::Load {
        mode: target.mode(),
        failure,
    })?;

    // SAFETY: lwtest_fixture_id is `int (void)` in every fixture build.
    let entry = unsafe { library.entry(FIXTURE_ID_SYMBOL_C) }.map_err(|failure| {
        HostError::Resolve {
            symbol: FIXTURE_ID_SYMBOL,
            failure,
        }
    })?;
    let fixture_id = entry.call();
    drop(entry);

    Ok(HostRun {
        fixture_id,
        release_failure: library.close().err(),
    })
}

/// Drive one host process: log, run, print the `HOST:` line and pick the
/// exit status.
pub struct Host {
    name: &'static str,
    log: LogEmitter,
}

impl Host {
    #[must_use]
    pub fn new(name: &'static str, log: LogEmitter) -> Self {
        Self { name, log }
    }

    /// Build a host whose logging follows [`HostConfig`].
    ///
    /// An unwritable log path is reported on stderr and logging is turned
    /// off; it never fails the run.
    #[must_use]
    pub fn from_config(name: &'static str, config: &HostConfig) -> Self {
        let log = match &config.log_path {
            Some(path) => LogEmitter::to_file(path, name, &config.run_id).unwrap_or_else(|err| {
                eprintln!("{name}: cannot open log {}: {err}", path.display());
                LogEmitter::disabled(name)
            }),
            None => LogEmitter::disabled(name),
        };
        Self::new(name, log)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Report a failure detected before any load attempt.
    pub fn fail(&mut self, err: &HostError) -> HostExit {
        println!("HOST: {err}");
        let status = err.exit_status();
        let entry = self.failure_entry(err);
        self.record(entry);
        self.record_exit(status);
        status
    }

    /// Run the full sequence against `target`.
    pub fn execute(&mut self, target: &LoadTarget) -> HostExit {
        let start = self
            .log
            .entry(LogLevel::Info, "load_start")
            .with_mode(target.mode())
            .with_target(target.as_os_str().to_string_lossy());
        self.record(start);
        self.finish(target, run(target))
    }

    /// Print and record the outcome of a run, then pick the exit status.
    fn finish(&mut self, target: &LoadTarget, outcome: Result<HostRun, HostError>) -> HostExit {
        let status = match outcome {
            Ok(outcome) => {
                println!("HOST: {FIXTURE_ID_SYMBOL}={}", outcome.fixture_id);
                let called = self
                    .log
                    .entry(LogLevel::Info, "fixture_called")
                    .with_symbol(FIXTURE_ID_SYMBOL)
                    .with_fixture_id(outcome.fixture_id);
                self.record(called);
                if let Some(failure) = &outcome.release_failure {
                    eprintln!("HOST: {} failed {failure}", failure.api);
                    let mut warn = self
                        .log
                        .entry(LogLevel::Warn, "release_failed")
                        .with_os_code(failure.code);
                    if let Some(detail) = &failure.detail {
                        warn = warn.with_detail(detail.clone());
                    }
                    self.record(warn);
                }
                HostExit::Success
            }
            Err(err) => {
                println!("HOST: {err}");
                let entry = self
                    .failure_entry(&err)
                    .with_mode(target.mode())
                    .with_target(target.as_os_str().to_string_lossy());
                self.record(entry);
                err.exit_status()
            }
        };
        self.record_exit(status);
        status
    }

    fn failure_entry(&mut self, err: &HostError) -> LogEntry {
        let mut entry = self
            .log
            .entry(LogLevel::Error, err.event())
            .with_detail(err.to_string());
        if let HostError::Resolve { symbol, .. } = err {
            entry = entry.with_symbol(*symbol);
        }
        if let Some(failure) = err.os_failure() {
            entry = entry.with_os_code(failure.code);
        }
        entry
    }

    fn record_exit(&mut self, status: HostExit) {
        let entry = self
            .log
            .entry(LogLevel::Info, "host_exit")
            .with_exit_code(i32::from(status.code()));
        self.record(entry);
    }

    fn record(&mut self, entry: LogEntry) {
        if let Err(err) = self.log.emit_entry(&entry) {
            eprintln!("{}: log write failed: {err}", self.name);
        }
    }
}
