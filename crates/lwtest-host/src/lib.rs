//! # lwtest-host
//!
//! Host side of the lwtest dynamic-loading fixtures. Two binaries share this
//! library:
//!
//! - `host_dynamic_loadlibrary_fullpath <path>` loads the fixture library
//!   from an explicit path.
//! - `host_dynamic_loadlibrary_name` loads it by bare filename through the
//!   platform's default search path.
//!
//! Both resolve `lwtest_fixture_id`, call it, print
//! `HOST: lwtest_fixture_id=<id>` and release the library. Exit statuses are
//! in [`exit::HostExit`].

pub mod config;
pub mod dl;
pub mod error;
pub mod exit;
pub mod host;
pub mod structured_log;

pub use error::HostError;
pub use exit::HostExit;
pub use host::{HostRun, LoadTarget};
