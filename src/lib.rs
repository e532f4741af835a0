//! m64prs-stage - build and install orchestrator for the m64prs bundle
//!
//! This crate builds the native mupen64plus subprojects and the cargo
//! workspace, then stages everything into a runnable install tree.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for m64prs-stage unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted process runner and a fake source checkout.
#[cfg(test)]
pub mod test_support;

pub use core::{HostOs, InstallScheme, Profile};
pub use util::context::GlobalContext;
