//! Staging and test driving for the lwtest fixtures.
//!
//! This crate provides:
//! - Staging: build `lwtest_a` once per variant plus `lwtest_b` and both
//!   hosts, and copy them into one fixture directory.
//! - Artifact index: SHA-256 digests of everything staged.
//! - Test driving: run the workspace tests against a staged directory.

#![forbid(unsafe_code)]

pub mod artifacts;
pub mod cargo;
pub mod error;
pub mod stage;

pub use artifacts::{ArtifactEntry, ArtifactIndex, ArtifactKind};
pub use error::HarnessError;
pub use stage::{StageOptions, stage};
