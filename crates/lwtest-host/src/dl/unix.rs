use std::ffi::{CStr, CString, OsStr, c_void};
use std::os::unix::ffi::OsStrExt;
use std::ptr::NonNull;

use super::{Entry, FixtureIdFn, OsFailure};

pub const LOAD_API: &str = "dlopen";
pub const RESOLVE_API: &str = "dlsym";
pub const RELEASE_API: &str = "dlclose";
pub const CODE_LABEL: &str = "errno";

/// A `dlopen` handle, closed on drop.
#[derive(Debug)]
pub struct Library {
    handle: NonNull<c_void>,
}

impl Library {
    /// Load a library by path or, when `name` has no slash, through the
    /// dynamic linker's search path.
    ///
    /// Uses `RTLD_NOW` so every import, including transitive ones, is bound
    /// before this returns.
    pub fn open(name: &OsStr) -> Result<Self, OsFailure> {
        // dlopen("") hands back the main program, which is not a library load.
        if name.is_empty() {
            return Err(OsFailure::new(
                LOAD_API,
                libc::ENOENT,
                Some("empty library path".to_string()),
            ));
        }
        let Ok(c_name) = CString::new(name.as_bytes()) else {
            return Err(OsFailure::new(
                LOAD_API,
                libc::EINVAL,
                Some("library name contains a NUL byte".to_string()),
            ));
        };

        clear_dlerror();
        // SAFETY: c_name is a valid NUL-terminated string for the call.
        let handle = unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        match NonNull::new(handle) {
            Some(handle) => Ok(Self { handle }),
            None => Err(last_failure(LOAD_API)),
        }
    }

    /// Resolve `symbol` as a `lwtest_fixture_id`-shaped entry point.
    ///
    /// # Safety
    ///
    /// The symbol must name a C function taking no arguments and returning
    /// `int`.
    pub unsafe fn entry(&self, symbol: &CStr) -> Result<Entry<'_>, OsFailure> {
        clear_dlerror();
        // SAFETY: handle came from dlopen and is still open; symbol is NUL-terminated.
        let ptr = unsafe { libc::dlsym(self.handle.as_ptr(), symbol.as_ptr()) };
        if ptr.is_null() {
            return Err(last_failure(RESOLVE_API));
        }
        // SAFETY: non-null code address; the caller guarantees the signature.
        let func = unsafe { std::mem::transmute::<*mut c_void, FixtureIdFn>(ptr) };
        Ok(Entry::new(func))
    }

    /// Release the handle, reporting a `dlclose` failure instead of
    /// swallowing it as `Drop` does.
    pub fn close(self) -> Result<(), OsFailure> {
        let handle = self.handle;
        std::mem::forget(self);
        clear_dlerror();
        // SAFETY: handle is open and ownership ends here.
        let rc = unsafe { libc::dlclose(handle.as_ptr()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(last_failure(RELEASE_API))
        }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        // SAFETY: handle is open and owned by self.
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }
}

fn clear_dlerror() {
    // SAFETY: dlerror only reads and resets thread-local loader state.
    unsafe {
        libc::dlerror();
    }
}

/// Capture errno first; dlerror() must not get a chance to overwrite it.
fn last_failure(api: &'static str) -> OsFailure {
    let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    // SAFETY: dlerror returns null or a NUL-terminated thread-local string
    // that stays valid until the next dl* call on this thread.
    let detail = unsafe {
        let msg = libc::dlerror();
        (!msg.is_null()).then(|| CStr::from_ptr(msg).to_string_lossy().into_owned())
    };
    OsFailure::new(api, code, detail)
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_with_loader_message() {
        let err = Library::open(OsStr::new("/nonexistent/lwtest/liblwtest_a.so")).unwrap_err();
        assert_eq!(err.api, "dlopen");
        let detail = err.detail.expect("dlerror text");
        assert!(detail.contains("liblwtest_a.so"), "{detail}");
    }

    #[test]
    fn interior_nul_is_rejected_before_dlopen() {
        use std::os::unix::ffi::OsStrExt;
        let err = Library::open(OsStr::from_bytes(b"lib\0x.so")).unwrap_err();
        assert_eq!(err.code, libc::EINVAL);
    }

    #[test]
    fn empty_path_is_a_load_failure() {
        let err = Library::open(OsStr::new("")).unwrap_err();
        assert_eq!(err.api, "dlopen");
        assert_eq!(err.code, libc::ENOENT);
    }

    #[test]
    fn resolves_present_symbol_and_rejects_absent_one() {
        let lib = Library::open(OsStr::new("libc.so.6")).expect("libc.so.6 should load");
        // getpid has the right shape: no arguments, integer result.
        let entry = unsafe { lib.entry(c"getpid") }.expect("getpid should resolve");
        assert_eq!(entry.call(), std::process::id() as i32);
        drop(entry);

        let err = unsafe { lib.entry(c"lwtest_fixture_id") }.unwrap_err();
        assert_eq!(err.api, "dlsym");
        assert!(
            err.detail.as_deref().unwrap_or_default().contains("lwtest_fixture_id"),
            "{err:?}"
        );
        lib.close().expect("dlclose should succeed");
    }
}
