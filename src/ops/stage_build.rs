//! Implementation of `m64prs-stage build`.
//!
//! A build walks a fixed sequence of phases:
//!
//! ```text
//! Init -> DirectoriesPrepared -> (Windows: EnvironmentBootstrapped)
//!      -> NativeSubprojectsBuilt -> ManagedWorkspaceBuilt
//!      -> ArtifactsStaged -> DataStaged -> Done
//! ```
//!
//! Any failure moves to `Failed`; the returned error names the last phase
//! that completed. Nothing is rolled back.

use std::fmt;

use anyhow::Result;

use crate::builder::toolchain::msvc;
use crate::builder::{self, MakeStrategy, MsBuildStrategy, NativeBuildOptions, NativeTree, TargetArch};
use crate::core::scheme::find_scheme;
use crate::core::{HostOs, InstallDirs, InstallScheme, Profile, BUILD_TARGETS};
use crate::ops::install::{stage_artifacts, stage_data, StageSources};
use crate::util::config::Config;
use crate::util::context::GlobalContext;
use crate::util::errors::StageError;
use crate::util::fs::{relative_path, InstallSummary};
use crate::util::process::ProcessRunner;
use crate::util::shell::Status;

/// Options for the build command.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub profile: Profile,
    pub scheme: InstallScheme,
    /// Parallel jobs passed to make, MSBuild, and cargo
    pub jobs: Option<usize>,
}

impl BuildOptions {
    /// Combine command-line values with configuration. Flags win.
    pub fn resolve(
        release: bool,
        scheme: Option<InstallScheme>,
        jobs: Option<usize>,
        ctx: &GlobalContext,
    ) -> Result<Self, StageError> {
        Ok(BuildOptions {
            profile: Profile::select(release, ctx.env().profile.as_deref()),
            scheme: select_scheme(scheme, ctx.config())?,
            jobs: jobs.or(ctx.config().build.jobs),
        })
    }
}

/// The flag if given, else the configured scheme, else the default.
pub fn select_scheme(cli: Option<InstallScheme>, config: &Config) -> Result<InstallScheme, StageError> {
    match (cli, config.build.install_scheme.as_deref()) {
        (Some(scheme), _) => Ok(scheme),
        (None, Some(name)) => find_scheme(name),
        (None, None) => Ok(InstallScheme::default()),
    }
}

/// Progress of a build through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Init,
    DirectoriesPrepared,
    EnvironmentBootstrapped,
    NativeSubprojectsBuilt,
    ManagedWorkspaceBuilt,
    ArtifactsStaged,
    DataStaged,
    Done,
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildPhase::Init => "init",
            BuildPhase::DirectoriesPrepared => "directories prepared",
            BuildPhase::EnvironmentBootstrapped => "environment bootstrapped",
            BuildPhase::NativeSubprojectsBuilt => "native subprojects built",
            BuildPhase::ManagedWorkspaceBuilt => "managed workspace built",
            BuildPhase::ArtifactsStaged => "artifacts staged",
            BuildPhase::DataStaged => "data staged",
            BuildPhase::Done => "done",
            BuildPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub profile: Profile,
    pub install_dirs: InstallDirs,
    /// Native outputs collected into the native target directory
    pub collected: InstallSummary,
    pub staged: InstallSummary,
    pub phase: BuildPhase,
}

struct Sequence {
    phase: BuildPhase,
}

impl Sequence {
    fn advance(&mut self, next: BuildPhase) {
        tracing::debug!("build phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Build every subproject and stage the result under `install/<profile>`.
pub fn build(ctx: &GlobalContext, runner: &dyn ProcessRunner, opts: &BuildOptions) -> Result<BuildResult> {
    let mut seq = Sequence {
        phase: BuildPhase::Init,
    };

    match run(ctx, runner, opts, &mut seq) {
        Ok(result) => Ok(result),
        Err(err) => {
            let reached = seq.phase;
            seq.advance(BuildPhase::Failed);
            Err(err.context(format!("build stopped after phase `{}`", reached)))
        }
    }
}

fn run(
    ctx: &GlobalContext,
    runner: &dyn ProcessRunner,
    opts: &BuildOptions,
    seq: &mut Sequence,
) -> Result<BuildResult> {
    let shell = ctx.shell();
    let host = ctx.host();
    let install_root = ctx.install_dir(opts.profile);
    tracing::info!(
        "building {} into {} ({} scheme, {})",
        opts.profile,
        install_root.display(),
        opts.scheme,
        host
    );

    let dirs = opts.scheme.resolve(&install_root);
    dirs.create_all()?;
    seq.advance(BuildPhase::DirectoriesPrepared);

    let tree = NativeTree::new(ctx.native_dir(), ctx.native_target_dir(), host);
    let native_opts = NativeBuildOptions {
        profile: opts.profile,
        jobs: opts.jobs,
    };
    let arch = TargetArch::from_hint(
        ctx.env()
            .target_arch
            .as_deref()
            .or(ctx.config().windows.arch.as_deref()),
    );

    let span = shell.span(Status::Building, format!("native subprojects ({})", opts.profile));
    let collected = match host {
        HostOs::Windows => {
            shell.status(Status::Bootstrapping, format!("MSVC developer environment ({})", arch));
            let toolchain = msvc::bootstrap(runner, ctx.env(), arch)?;
            seq.advance(BuildPhase::EnvironmentBootstrapped);
            builder::build_all(&MsBuildStrategy::new(&toolchain), runner, &tree, &BUILD_TARGETS, &native_opts)?
        }
        HostOs::Darwin | HostOs::Unix | HostOs::Other => {
            let strategy = MakeStrategy::detect(ctx.config().compile_db());
            builder::build_all(&strategy, runner, &tree, &BUILD_TARGETS, &native_opts)?
        }
    };
    span.finish_with_message("native subprojects");
    seq.advance(BuildPhase::NativeSubprojectsBuilt);

    let span = shell.span(Status::Building, "cargo workspace");
    builder::cargo::build(runner, ctx.root(), opts.profile, opts.jobs)?;
    span.finish_with_message("cargo workspace");
    seq.advance(BuildPhase::ManagedWorkspaceBuilt);

    let sources = StageSources {
        native: tree,
        cargo_target_dir: ctx.target_dir(opts.profile),
        win32_deps_dir: ctx.win32_deps_dir(),
        i18n_dir: ctx.i18n_source_dir(),
        arch,
    };
    let span = shell.span(
        Status::Staging,
        relative_path(ctx.root(), &install_root).display(),
    );
    let mut progress = shell.progress(sources.artifact_count(), "staging");
    let mut staged = stage_artifacts(shell, &mut progress, &sources, &dirs)?;
    progress.finish();
    seq.advance(BuildPhase::ArtifactsStaged);

    staged.merge(stage_data(shell, &sources, &dirs)?);
    seq.advance(BuildPhase::DataStaged);
    span.finish_with_message(format!(
        "staging ({} copied, {} fresh)",
        staged.copied, staged.skipped
    ));

    seq.advance(BuildPhase::Done);
    Ok(BuildResult {
        profile: opts.profile,
        install_dirs: dirs,
        collected,
        staged,
        phase: seq.phase,
    })
}
