//! Platform dynamic loading for the host programs.
//!
//! One owning [`Library`] per platform: `dlopen`/`dlsym`/`dlclose` through
//! `libc` on Unix, `LoadLibrary`/`GetProcAddress`/`FreeLibrary` through
//! `libloading` on Windows. Failures carry the platform's last-error value
//! in an [`OsFailure`].

use std::ffi::c_int;
use std::fmt;
use std::marker::PhantomData;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::{CODE_LABEL, LOAD_API, Library, RELEASE_API, RESOLVE_API};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{CODE_LABEL, LOAD_API, Library, RELEASE_API, RESOLVE_API};

/// Signature of `lwtest_fixture_id`.
pub type FixtureIdFn = unsafe extern "C" fn() -> c_int;

/// A loader call that failed and the last-error value it left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsFailure {
    /// Platform API that failed (`dlopen`, `GetProcAddress`, ...).
    pub api: &'static str,
    /// `errno` on Unix, `GetLastError()` on Windows.
    pub code: i32,
    /// Loader message, when the platform has one (`dlerror()`).
    pub detail: Option<String>,
}

impl OsFailure {
    #[must_use]
    pub fn new(api: &'static str, code: i32, detail: Option<String>) -> Self {
        Self { api, code, detail }
    }
}

impl fmt::Display for OsFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CODE_LABEL}={}", self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for OsFailure {}

/// A resolved `lwtest_fixture_id` that cannot outlive its library.
#[derive(Debug)]
pub struct Entry<'lib> {
    func: FixtureIdFn,
    _library: PhantomData<&'lib Library>,
}

impl Entry<'_> {
    pub(crate) fn new(func: FixtureIdFn) -> Self {
        Self {
            func,
            _library: PhantomData,
        }
    }

    /// Invoke the entry point.
    pub fn call(&self) -> c_int {
        // SAFETY: `Library::entry` callers vouch for the signature, and the
        // borrow keeps the library mapped.
        unsafe { (self.func)() }
    }
}
