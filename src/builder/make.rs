//! Make strategy for Unix-like hosts.

use anyhow::Result;

use super::{check_build, NativeBuildOptions, NativeBuildStrategy, NativeTree};
use crate::core::bundle::CORE_SONAME_VERSION;
use crate::core::{ArtifactKind, BuildTarget, HostOs};
use crate::util::errors::StageError;
use crate::util::fs::{install, InstallSummary};
use crate::util::process::{find_executable, ProcessBuilder, ProcessRunner};
use crate::util::vcs;

const COMPILE_DB: &str = "compile_commands.json";

/// Builds each subproject with its `projects/unix` Makefile.
#[derive(Debug, Clone, Copy)]
pub struct MakeStrategy {
    /// compiledb was found on PATH and wrapping is allowed.
    compiledb: bool,
}

impl MakeStrategy {
    pub fn new(compiledb: bool) -> Self {
        MakeStrategy { compiledb }
    }

    /// Look up compiledb on PATH, unless wrapping is disabled.
    pub fn detect(allow_compile_db: bool) -> Self {
        let compiledb = allow_compile_db && find_executable("compiledb").is_some();
        tracing::debug!("compiledb available: {}", compiledb);
        MakeStrategy::new(compiledb)
    }

    fn make_command(&self, tree: &NativeTree, target: &BuildTarget) -> ProcessBuilder {
        let dir = target.make_dir(&tree.root);
        let wrap = self.compiledb && vcs::is_ignored(&dir, COMPILE_DB);
        if self.compiledb && !wrap {
            tracing::debug!("{} is not git-ignored in {}, not wrapping", COMPILE_DB, target.name);
        }

        let cmd = if wrap {
            ProcessBuilder::new("compiledb").arg("make")
        } else {
            ProcessBuilder::new("make")
        };
        cmd.cwd(dir)
    }
}

/// File name the mupen64plus Makefiles give an artifact.
pub fn makefile_output_name(target: &BuildTarget, host: HostOs) -> String {
    match (target.kind, host) {
        (ArtifactKind::SharedLibrary, HostOs::Unix) => {
            format!("lib{}.so.{}", target.artifact, CORE_SONAME_VERSION)
        }
        (ArtifactKind::Plugin, HostOs::Unix) => format!("{}.so", target.artifact),
        (ArtifactKind::Plugin, HostOs::Darwin) => format!("{}.dylib", target.artifact),
        (kind, host) => kind.file_name(target.artifact, host),
    }
}

impl NativeBuildStrategy for MakeStrategy {
    fn name(&self) -> &'static str {
        "make"
    }

    fn build_target(
        &self,
        runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
        opts: &NativeBuildOptions,
    ) -> Result<()> {
        let mut cmd = self
            .make_command(tree, target)
            .args(target.make_args)
            .arg(opts.profile.make_flag());
        if let Some(jobs) = opts.jobs {
            cmd = cmd.arg(format!("-j{}", jobs));
        }

        let output = runner.status(&cmd)?;
        check_build(target.name, &output)
    }

    fn collect_target(&self, tree: &NativeTree, target: &BuildTarget) -> Result<InstallSummary> {
        let built = target
            .make_dir(&tree.root)
            .join(makefile_output_name(target, tree.host));
        let mut summary = InstallSummary::default();
        summary.record(install(&built, &tree.artifact_path(target))?);
        Ok(summary)
    }

    fn clean_target(
        &self,
        runner: &dyn ProcessRunner,
        tree: &NativeTree,
        target: &BuildTarget,
    ) -> Result<()> {
        let dir = target.make_dir(&tree.root);
        if !dir.is_dir() {
            return Ok(());
        }

        let cmd = ProcessBuilder::new("make").arg("clean").cwd(dir);
        let output = runner.status(&cmd)?;
        if !output.success() {
            return Err(StageError::ProcessFailed {
                program: format!("make clean ({})", target.name),
                code: output.code,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_all;
    use crate::core::{Profile, BUILD_TARGETS};
    use crate::test_support::{BundleFixture, CommandPattern, FakeRunner};
    use crate::util::process::ProcessOutput;
    use std::path::Path;

    #[test]
    fn test_makefile_output_names() {
        let core = &BUILD_TARGETS[0];
        let rice = &BUILD_TARGETS[3];
        assert_eq!(makefile_output_name(core, HostOs::Unix), "libmupen64plus.so.2.0.0");
        assert_eq!(makefile_output_name(core, HostOs::Darwin), "libmupen64plus.dylib");
        assert_eq!(makefile_output_name(rice, HostOs::Unix), "mupen64plus-video-rice.so");
        assert_eq!(makefile_output_name(rice, HostOs::Darwin), "mupen64plus-video-rice.dylib");
        assert_eq!(makefile_output_name(rice, HostOs::Other), "mupen64plus-video-rice");
    }

    #[test]
    fn test_make_arguments() {
        let fixture = BundleFixture::new(HostOs::Unix);
        let runner = FakeRunner::new();
        let opts = NativeBuildOptions {
            profile: Profile::Release,
            jobs: Some(8),
        };

        MakeStrategy::new(false)
            .build_target(&runner, &fixture.native_tree(), &BUILD_TARGETS[0], &opts)
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].command, "make all TAS=1 DEBUG=0 -j8");
        assert!(!calls[0].captured);
        assert_eq!(
            calls[0].cwd.as_deref(),
            Some(BUILD_TARGETS[0].make_dir(&fixture.native_dir()).as_path())
        );
    }

    #[test]
    fn test_compiledb_requires_ignore_rule() {
        let fixture = BundleFixture::new(HostOs::Unix);
        let runner = FakeRunner::new();
        let strategy = MakeStrategy::new(true);
        let tree = fixture.native_tree();

        strategy
            .build_target(&runner, &tree, &BUILD_TARGETS[1], &NativeBuildOptions::default())
            .unwrap();
        fixture.git_ignore(&["compile_commands.json"]);
        strategy
            .build_target(&runner, &tree, &BUILD_TARGETS[1], &NativeBuildOptions::default())
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec!["make all DEBUG=1", "compiledb make all DEBUG=1"]
        );
    }

    #[test]
    fn test_collect_uses_canonical_names() {
        let fixture = BundleFixture::new(HostOs::Unix);
        let tree = fixture.native_tree();

        let summary = build_all(
            &MakeStrategy::new(false),
            &FakeRunner::new(),
            &tree,
            &BUILD_TARGETS,
            &NativeBuildOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.copied, 5);
        assert!(tree.target_dir.join("libmupen64plus.so").is_file());
        assert!(tree.target_dir.join("libmupen64plus-rsp-hle.so").is_file());
    }

    #[test]
    fn test_clean_failure_is_reported() {
        let fixture = BundleFixture::new(HostOs::Unix);
        let runner = FakeRunner::new()
            .expect(CommandPattern::Exact("make clean".into()), ProcessOutput::failed(2));

        let err = MakeStrategy::new(false)
            .clean_target(&runner, &fixture.native_tree(), &BUILD_TARGETS[0])
            .unwrap_err();
        assert!(err.to_string().contains("make clean (mupen64plus-core)"));
    }

    #[test]
    fn test_clean_ignores_missing_project_dir() {
        let runner = FakeRunner::strict();
        let tree = NativeTree::new(Path::new("/nonexistent/native"), "/nonexistent/target", HostOs::Unix);
        MakeStrategy::new(false)
            .clean_target(&runner, &tree, &BUILD_TARGETS[0])
            .unwrap();
        assert!(runner.calls().is_empty());
    }
}
