//! # lwtest-b
//!
//! The library `lwtest_a` imports from. It exists so that loading `lwtest_a`
//! needs the platform loader to bind a second library; the value it returns
//! is never inspected.

use std::ffi::c_int;

/// Imported by `lwtest_a` through its link-time dependency on this library.
#[unsafe(no_mangle)]
pub extern "C" fn lwtest_b_force_import() -> c_int {
    lwtest_core::LWTEST_B_ID
}
