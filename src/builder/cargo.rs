//! Managed workspace build.

use std::path::Path;

use anyhow::Result;

use super::check_build;
use crate::core::bundle::MANAGED_PACKAGES;
use crate::core::Profile;
use crate::util::process::{ProcessBuilder, ProcessRunner};

/// Subproject name reported when the cargo step fails.
pub const WORKSPACE_SUBPROJECT: &str = "cargo workspace";

/// The `cargo build` invocation for the front end, the input bridge, and its UI.
pub fn build_command(root: &Path, profile: Profile, jobs: Option<usize>) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new("cargo").arg("build");
    for package in MANAGED_PACKAGES {
        cmd = cmd.args(["-p", package]);
    }
    if profile.is_release() {
        cmd = cmd.arg("--release");
    }
    if let Some(jobs) = jobs {
        cmd = cmd.args(["-j".to_string(), jobs.to_string()]);
    }
    cmd.cwd(root)
}

/// Build the managed packages in the repository root.
pub fn build(
    runner: &dyn ProcessRunner,
    root: &Path,
    profile: Profile,
    jobs: Option<usize>,
) -> Result<()> {
    let cmd = build_command(root, profile, jobs);
    tracing::info!("building managed workspace ({})", profile);
    let output = runner.status(&cmd)?;
    check_build(WORKSPACE_SUBPROJECT, &output)
}
