use std::ffi::{CStr, OsStr};

use libloading::os::windows::Library as RawLibrary;

use super::{Entry, FixtureIdFn, OsFailure};

pub const LOAD_API: &str = "LoadLibrary";
pub const RESOLVE_API: &str = "GetProcAddress";
pub const RELEASE_API: &str = "FreeLibrary";
pub const CODE_LABEL: &str = "gle";

const ERROR_MOD_NOT_FOUND: i32 = 126;

/// A module handle, freed on drop.
#[derive(Debug)]
pub struct Library {
    inner: RawLibrary,
}

impl Library {
    /// Load a library by full path or, for a bare name, through the standard
    /// DLL search order (application directory first).
    pub fn open(name: &OsStr) -> Result<Self, OsFailure> {
        if name.is_empty() {
            return Err(OsFailure::new(
                LOAD_API,
                ERROR_MOD_NOT_FOUND,
                Some("empty library path".to_string()),
            ));
        }
        // SAFETY: loading runs DllMain; the fixtures' entry points have no side effects.
        match unsafe { RawLibrary::new(name) } {
            Ok(inner) => Ok(Self { inner }),
            Err(err) => Err(failure(LOAD_API, &err)),
        }
    }

    /// Resolve `symbol` as a `lwtest_fixture_id`-shaped entry point.
    ///
    /// # Safety
    ///
    /// The symbol must name a C function taking no arguments and returning
    /// `int`.
    pub unsafe fn entry(&self, symbol: &CStr) -> Result<Entry<'_>, OsFailure> {
        // SAFETY: the caller guarantees the signature.
        let func = unsafe { self.inner.get::<FixtureIdFn>(symbol.to_bytes_with_nul()) }
            .map_err(|err| failure(RESOLVE_API, &err))?;
        Ok(Entry::new(*func))
    }

    /// Release the handle, reporting a `FreeLibrary` failure.
    pub fn close(self) -> Result<(), OsFailure> {
        self.inner
            .close()
            .map_err(|err| failure(RELEASE_API, &err))
    }
}

fn failure(api: &'static str, err: &libloading::Error) -> OsFailure {
    OsFailure::new(api, last_error_code(err), None)
}

/// libloading keeps the `GetLastError()` value as an `io::Error` source.
fn last_error_code(err: &libloading::Error) -> i32 {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(code) = cause
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::raw_os_error)
        {
            return code;
        }
        source = cause.source();
    }
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
