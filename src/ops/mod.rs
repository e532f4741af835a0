//! High-level operations.
//!
//! This module contains the implementation of m64prs-stage commands.

pub mod install;
pub mod stage_build;
pub mod stage_clean;
pub mod stage_run;

pub use stage_build::{build, select_scheme, BuildOptions, BuildPhase, BuildResult};
pub use stage_clean::{clean, CleanResult};
pub use stage_run::run;
