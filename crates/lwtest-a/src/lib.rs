//! # lwtest-a
//!
//! The fixture library the hosts load. It exports one C entry point,
//! [`lwtest_fixture_id`], whose return value is fixed when the library is
//! built (`LWTEST_VARIANT`, see `build.rs`).
//!
//! The library also imports `lwtest_b_force_import` from `lwtest_b`. That
//! import is bound by the platform loader, so a missing `lwtest_b` makes the
//! load of this library fail rather than the later call.

use std::ffi::c_int;

include!(concat!(env!("OUT_DIR"), "/variant.rs"));

unsafe extern "C" {
    fn lwtest_b_force_import() -> c_int;
}

fn touch_b() {
    // SAFETY: no arguments, no preconditions; lwtest_b is bound at load time.
    let id = unsafe { lwtest_b_force_import() };
    std::hint::black_box(id);
}

/// Return the sentinel id selected by the build-time variant.
#[unsafe(no_mangle)]
pub extern "C" fn lwtest_fixture_id() -> c_int {
    touch_b();
    lwtest_core::fixture_id_for_variant(LWTEST_VARIANT)
}
