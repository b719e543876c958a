//! # lwtest-core
//!
//! Identifiers shared by the lwtest fixture libraries, the host programs and
//! the staging harness.
//!
//! Nothing in here touches the loader. The exporting library uses the
//! sentinel table to pick its return value at build time; the hosts and tests
//! use the symbol names and platform filenames to find it again.

use std::ffi::{CStr, c_int};

pub mod time;

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Entry point exported by `lwtest_a`.
pub const FIXTURE_ID_SYMBOL: &str = "lwtest_fixture_id";
/// NUL-terminated form of [`FIXTURE_ID_SYMBOL`] for `dlsym`/`GetProcAddress`.
pub const FIXTURE_ID_SYMBOL_C: &CStr = c"lwtest_fixture_id";

/// Entry point exported by `lwtest_b` and imported by `lwtest_a`.
pub const FORCE_IMPORT_SYMBOL: &str = "lwtest_b_force_import";
/// NUL-terminated form of [`FORCE_IMPORT_SYMBOL`].
pub const FORCE_IMPORT_SYMBOL_C: &CStr = c"lwtest_b_force_import";

// ---------------------------------------------------------------------------
// Sentinel ids
// ---------------------------------------------------------------------------

pub const LWTEST_A_V1_ID: c_int = 1001;
pub const LWTEST_A_V2_ID: c_int = 1002;
/// Returned when the variant flag is neither 1 nor 2.
pub const LWTEST_A_FALLBACK_ID: c_int = 1999;
/// Returned by `lwtest_b_force_import`. Callers discard it.
pub const LWTEST_B_ID: c_int = 2001;

/// Variant used when `LWTEST_VARIANT` is not set at build time.
pub const DEFAULT_VARIANT: i64 = 1;

/// Map a build-time variant flag to the id `lwtest_fixture_id` returns.
#[must_use]
pub const fn fixture_id_for_variant(variant: i64) -> c_int {
    match variant {
        1 => LWTEST_A_V1_ID,
        2 => LWTEST_A_V2_ID,
        _ => LWTEST_A_FALLBACK_ID,
    }
}

/// Parse the textual variant flag as the build script receives it.
///
/// Surrounding whitespace is ignored; an empty value means
/// [`DEFAULT_VARIANT`].
pub fn parse_variant(raw: &str) -> Result<i64, std::num::ParseIntError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_VARIANT);
    }
    trimmed.parse::<i64>()
}

// ---------------------------------------------------------------------------
// Artifact names
// ---------------------------------------------------------------------------

pub const LWTEST_A_STEM: &str = "lwtest_a";
pub const LWTEST_B_STEM: &str = "lwtest_b";

pub const HOST_FULLPATH_STEM: &str = "host_dynamic_loadlibrary_fullpath";
pub const HOST_NAME_STEM: &str = "host_dynamic_loadlibrary_name";

/// Platform filename of a dynamic library: `lwtest_a.dll`, `liblwtest_a.so`,
/// `liblwtest_a.dylib`.
#[must_use]
pub fn library_filename(stem: &str) -> String {
    format!(
        "{}{stem}{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

/// Platform filename of an executable.
#[must_use]
pub fn executable_filename(stem: &str) -> String {
    format!("{stem}{}", std::env::consts::EXE_SUFFIX)
}

/// Stem of a staged per-variant copy of `lwtest_a`, e.g. `lwtest_a_v2`.
#[must_use]
pub fn variant_stem(variant: i64) -> String {
    format!("{LWTEST_A_STEM}_v{variant}")
}
