//! Subproject build dispatch.
//!
//! Native subprojects are built by a host-specific [`NativeBuildStrategy`]:
//! Make on Unix-like hosts, MSBuild on Windows. The managed workspace is
//! built by cargo ([`cargo`]). Every tool is launched through a
//! [`ProcessRunner`].

pub mod cargo;
pub mod make;
pub mod msbuild;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{BuildTarget, HostOs, Profile};
use crate::util::errors::StageError;
use crate::util::fs::{ensure_dir, InstallSummary};
use crate::util::process::{ProcessOutput, ProcessRunner};

pub use make::MakeStrategy;
pub use msbuild::MsBuildStrategy;
pub use toolchain::{TargetArch, ToolchainEnvironment};

/// Location of the native subprojects and their collected outputs.
#[derive(Debug, Clone)]
pub struct NativeTree {
    /// `m64prs/native`
    pub root: PathBuf,
    /// `m64prs/native/target`
    pub target_dir: PathBuf,
    pub host: HostOs,
}

impl NativeTree {
    pub fn new(root: impl Into<PathBuf>, target_dir: impl Into<PathBuf>, host: HostOs) -> Self {
        NativeTree {
            root: root.into(),
            target_dir: target_dir.into(),
            host,
        }
    }

    /// Canonical path of a target's artifact once collected.
    pub fn artifact_path(&self, target: &BuildTarget) -> PathBuf {
        self.target_dir.join(target.artifact_file(self.host))
    }
}

/// Options shared by every native build step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBuildOptions {
    pub profile: Profile,
    pub jobs: Option<usize>,
}

/// A way of building the native subprojects on one host family.
pub trait NativeBuildStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Build one subproject.
    fn build_target(
        &self,
        runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
        opts: &NativeBuildOptions,
    ) -> Result<()>;

    /// Put the subproject's artifact into the native target directory under
    /// its canonical name.
    fn collect_target(&self, tree: &NativeTree, target: &BuildTarget) -> Result<InstallSummary>;

    /// Remove a subproject's own build products.
    fn clean_target(
        &self,
        runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
    ) -> Result<()>;
}

/// Build every target in order, then collect every artifact.
///
/// The first failing build aborts the sequence; nothing is collected.
pub fn build_all(
    strategy: &dyn NativeBuildStrategy,
    runner: &dyn ProcessRunner,
    tree: &NativeTree,
    targets: &[BuildTarget],
    opts: &NativeBuildOptions,
) -> Result<InstallSummary> {
    ensure_dir(&tree.target_dir)?;

    for target in targets {
        tracing::info!("building {} with {}", target.name, strategy.name());
        strategy.build_target(runner, tree, target, opts)?;
    }

    let mut summary = InstallSummary::default();
    for target in targets {
        summary.merge(strategy.collect_target(tree, target)?);
    }
    Ok(summary)
}

/// Clean every target whose source directory exists.
pub fn clean_all(
    strategy: &dyn NativeBuildStrategy,
    runner: &dyn ProcessRunner,
    tree: &NativeTree,
    targets: &[BuildTarget],
) -> Result<()> {
    for target in targets {
        if !target.source_dir(&tree.root).is_dir() {
            tracing::debug!("skipping clean of missing subproject {}", target.name);
            continue;
        }
        strategy.clean_target(runner, tree, target)?;
    }
    Ok(())
}

/// Map a finished build step to `SubprojectBuildFailed` when it exited nonzero.
pub(crate) fn check_build(subproject: &str, output: &ProcessOutput) -> Result<()> {
    if output.success() {
        Ok(())
    } else {
        Err(StageError::SubprojectBuildFailed {
            subproject: subproject.to_string(),
            code: output.code,
        }
        .into())
    }
}

/// Path of `dir` with a trailing separator, as MSBuild directory properties expect.
pub(crate) fn with_trailing_separator(dir: &Path) -> String {
    let mut s = dir.display().to_string();
    if !s.ends_with(std::path::MAIN_SEPARATOR) {
        s.push(std::path::MAIN_SEPARATOR);
    }
    s
}
