//! MSBuild strategy for Windows hosts.

use std::path::PathBuf;

use anyhow::Result;

use super::toolchain::MsvcToolchain;
use super::{check_build, with_trailing_separator, NativeBuildOptions, NativeBuildStrategy, NativeTree};
use crate::core::{ArtifactKind, BuildTarget};
use crate::util::fs::{install, install_symbols, remove_dir_all_if_exists, InstallSummary};
use crate::util::process::{ProcessBuilder, ProcessRunner};

/// Builds each subproject's `projects/msvc` project with the captured
/// developer-shell environment.
#[derive(Debug, Clone, Copy)]
pub struct MsBuildStrategy<'a> {
    toolchain: &'a MsvcToolchain,
}

impl<'a> MsBuildStrategy<'a> {
    pub fn new(toolchain: &'a MsvcToolchain) -> Self {
        MsBuildStrategy { toolchain }
    }
}

/// Per-subproject MSBuild output directory, `<native target>/<name>`.
pub fn out_dir(tree: &NativeTree, target: &BuildTarget) -> PathBuf {
    tree.target_dir.join(target.name)
}

/// Copy a subproject's DLL, and its PDB when present, from its own output
/// directory to the canonical path in the native target directory.
pub fn collect_output(tree: &NativeTree, target: &BuildTarget) -> Result<InstallSummary> {
    let out = out_dir(tree, target);
    let mut summary = InstallSummary::default();
    summary.record(install(
        &out.join(target.artifact_file(tree.host)),
        &tree.artifact_path(target),
    )?);

    let pdb = ArtifactKind::DebugSymbols.file_name(target.artifact, tree.host);
    if let Some(outcome) = install_symbols(&out.join(&pdb), &tree.target_dir.join(&pdb))? {
        summary.record(outcome);
    }
    Ok(summary)
}

/// Remove a subproject's output directory. Returns whether it existed.
pub fn clean_output(tree: &NativeTree, target: &BuildTarget) -> Result<bool> {
    remove_dir_all_if_exists(&out_dir(tree, target))
}

impl NativeBuildStrategy for MsBuildStrategy<'_> {
    fn name(&self) -> &'static str {
        "msbuild"
    }

    fn build_target(
        &self,
        runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
        opts: &NativeBuildOptions,
    ) -> Result<()> {
        let out_dir = out_dir(tree, target);
        let int_dir = out_dir.join("obj");

        let mut cmd = ProcessBuilder::new(&self.toolchain.msbuild)
            .arg(format!("/p:Configuration={}", opts.profile.msbuild_config()))
            .arg(format!("/p:Platform={}", self.toolchain.arch.msbuild_platform()))
            .arg(format!("/p:OutDir={}", with_trailing_separator(&out_dir)))
            .arg(format!("/p:IntDir={}", with_trailing_separator(&int_dir)));
        if let Some(jobs) = opts.jobs {
            cmd = cmd.arg(format!("/m:{}", jobs));
        }
        let cmd = self
            .toolchain
            .env
            .apply_to(cmd.arg(target.msbuild_project(&tree.root)));

        let output = runner.status(&cmd)?;
        check_build(target.name, &output)
    }

    fn collect_target(&self, tree: &NativeTree, target: &BuildTarget) -> Result<InstallSummary> {
        collect_output(tree, target)
    }

    fn clean_target(
        &self,
        _runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
    ) -> Result<()> {
        clean_output(tree, target)?;
        Ok(())
    }
}
