//! Staging of built artifacts and data into an install tree.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::{NativeTree, TargetArch};
use crate::core::bundle::{ManagedArtifact, MANAGED_ARTIFACTS, WIN32_RUNTIME_DEPS};
use crate::core::{ArtifactKind, HostOs, InstallDirs, BUILD_TARGETS};
use crate::util::fs::{install, install_as, install_symbols, install_tree, InstallOutcome, InstallSummary};
use crate::util::shell::{Progress, Shell, Status};

/// Where staging reads from.
#[derive(Debug, Clone)]
pub struct StageSources {
    pub native: NativeTree,
    /// `target/<profile>` of the managed workspace
    pub cargo_target_dir: PathBuf,
    /// `m64prs/native/mupen64plus-win32-deps`
    pub win32_deps_dir: PathBuf,
    /// Compiled translation catalogs
    pub i18n_dir: PathBuf,
    /// Architecture of the Windows runtime libraries
    pub arch: TargetArch,
}

impl StageSources {
    fn host(&self) -> HostOs {
        self.native.host
    }

    /// Number of copy steps [`stage_artifacts`] performs, for progress display.
    pub fn artifact_count(&self) -> u64 {
        let deps = match self.host() {
            HostOs::Windows => WIN32_RUNTIME_DEPS.len(),
            HostOs::Darwin | HostOs::Unix | HostOs::Other => 0,
        };
        (MANAGED_ARTIFACTS.len() + BUILD_TARGETS.len() + deps) as u64
    }
}

/// Report one install through the shell and fold it into `summary`.
fn report(shell: &Shell, summary: &mut InstallSummary, outcome: InstallOutcome, dest: &Path) {
    summary.record(outcome);
    match outcome {
        InstallOutcome::Copied => shell.status(Status::Copied, dest.display()),
        InstallOutcome::Skipped => shell.status(Status::Fresh, dest.display()),
    }
}

fn stage_managed(
    shell: &Shell,
    summary: &mut InstallSummary,
    sources: &StageSources,
    dirs: &InstallDirs,
    artifact: &ManagedArtifact,
) -> Result<()> {
    let host = sources.host();
    let dest_dir = dirs.get(artifact.role);
    let staged = artifact.staged_file(host);

    let outcome = install_as(&sources.cargo_target_dir, &artifact.source_file(host), dest_dir, &staged)?;
    report(shell, summary, outcome, &dest_dir.join(&staged));

    let symbols = sources.cargo_target_dir.join(artifact.symbols_file(host));
    if let Some(outcome) = install_symbols(&symbols, dest_dir)? {
        report(shell, summary, outcome, dest_dir);
    }
    Ok(())
}

/// Copy executables, libraries, plugins, and on Windows the runtime
/// libraries into their role directories.
///
/// The directories must already exist ([`InstallDirs::create_all`]).
pub fn stage_artifacts(
    shell: &Shell,
    progress: &mut Progress,
    sources: &StageSources,
    dirs: &InstallDirs,
) -> Result<InstallSummary> {
    let host = sources.host();
    let mut summary = InstallSummary::default();

    // bin: front end
    let (frontend, bridge_and_ui) = MANAGED_ARTIFACTS.split_at(1);
    for artifact in frontend {
        stage_managed(shell, &mut summary, sources, dirs, artifact)?;
        progress.inc(1);
    }

    // core and plugin: native outputs, already under canonical names
    for target in &BUILD_TARGETS {
        let dest_dir = dirs.get(target.role());
        let outcome = install(&sources.native.artifact_path(target), dest_dir)?;
        report(shell, &mut summary, outcome, &dest_dir.join(target.artifact_file(host)));

        let symbols = sources
            .native
            .target_dir
            .join(ArtifactKind::DebugSymbols.file_name(target.artifact, host));
        if let Some(outcome) = install_symbols(&symbols, dest_dir)? {
            report(shell, &mut summary, outcome, dest_dir);
        }
        progress.inc(1);
    }

    // plugin: input bridge and its UI
    for artifact in bridge_and_ui {
        stage_managed(shell, &mut summary, sources, dirs, artifact)?;
        progress.inc(1);
    }

    match host {
        HostOs::Windows => {
            for dep in &WIN32_RUNTIME_DEPS {
                let dll = ArtifactKind::SharedLibrary.file_name(dep.name, host);
                let source = dep
                    .source_dir(&sources.win32_deps_dir, sources.arch.deps_dir())
                    .join(&dll);
                let outcome = install(&source, &dirs.bin)?;
                report(shell, &mut summary, outcome, &dirs.bin.join(&dll));
                progress.inc(1);
            }
        }
        HostOs::Darwin | HostOs::Unix | HostOs::Other => {}
    }

    Ok(summary)
}

/// Copy each subproject's data directory, then the translation catalogs if
/// they have been generated.
pub fn stage_data(shell: &Shell, sources: &StageSources, dirs: &InstallDirs) -> Result<InstallSummary> {
    let mut summary = InstallSummary::default();

    for target in &BUILD_TARGETS {
        if let Some(data) = target.data_source(&sources.native.root) {
            let staged = install_tree(&data, &dirs.data)?;
            tracing::debug!(
                "{} data: {} copied, {} fresh",
                target.name,
                staged.copied,
                staged.skipped
            );
            summary.merge(staged);
        }
    }

    if sources.i18n_dir.is_dir() {
        summary.merge(install_tree(&sources.i18n_dir, &dirs.i18n)?);
    } else {
        shell.warn(format!(
            "no translation catalogs at {}, skipping",
            sources.i18n_dir.display()
        ));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheme::{PORTABLE, UNIX};
    use crate::core::Profile;
    use crate::test_support::{data_file, BundleFixture, CATALOG};
    use crate::util::errors::StageError;
    use crate::util::shell::ColorChoice;
    use std::sync::Arc;

    fn sources(fixture: &BundleFixture, arch: TargetArch) -> StageSources {
        let ctx = fixture.context();
        StageSources {
            native: fixture.native_tree(),
            cargo_target_dir: ctx.target_dir(Profile::Debug),
            win32_deps_dir: ctx.win32_deps_dir(),
            i18n_dir: ctx.i18n_source_dir(),
            arch,
        }
    }

    fn quiet() -> Arc<Shell> {
        Arc::new(Shell::from_flags(true, false, ColorChoice::Never))
    }

    /// Stand in for the collect step: move build outputs to canonical names.
    fn collect(fixture: &BundleFixture) {
        use crate::builder::make::MakeStrategy;
        use crate::builder::{msbuild, NativeBuildStrategy};
        let tree = fixture.native_tree();
        std::fs::create_dir_all(&tree.target_dir).unwrap();
        for target in &BUILD_TARGETS {
            if fixture.host().is_windows() {
                msbuild::collect_output(&tree, target).unwrap();
            } else {
                MakeStrategy::new(false).collect_target(&tree, target).unwrap();
            }
        }
    }

    #[test]
    fn test_unix_layout_is_complete() {
        let fixture = BundleFixture::new(HostOs::Unix);
        collect(&fixture);
        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X64);
        let dirs = UNIX.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        let mut progress = shell.progress(sources.artifact_count(), "staging");
        let summary = stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap();
        assert_eq!(summary.copied, 8);
        assert_eq!(progress.position(), 8);

        assert!(dirs.bin.join("m64prs-gtk").is_file());
        assert!(dirs.core.join("libmupen64plus.so").is_file());
        for plugin in [
            "libmupen64plus-audio-sdl.so",
            "libmupen64plus-input-sdl.so",
            "libmupen64plus-video-rice.so",
            "libmupen64plus-rsp-hle.so",
            "libmupen64plus-input-tasinput.so",
            "tasinput-ui",
        ] {
            assert!(dirs.plugin.join(plugin).is_file(), "{plugin}");
        }

        let data = stage_data(&shell, &sources, &dirs).unwrap();
        assert_eq!(data.copied, 4);
        for target in BUILD_TARGETS.iter().filter(|t| t.data_dir.is_some()) {
            assert!(dirs.data.join(data_file(target)).is_file(), "{}", target.name);
        }
        assert!(dirs.i18n.join(CATALOG).is_file());
    }

    #[test]
    fn test_restaging_copies_nothing() {
        let fixture = BundleFixture::new(HostOs::Unix);
        collect(&fixture);
        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X64);
        let dirs = PORTABLE.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        let mut progress = shell.progress(sources.artifact_count(), "staging");
        stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap();
        let again = stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap();
        assert_eq!(again.copied, 0);
        assert_eq!(again.skipped, 8);
    }

    #[test]
    fn test_windows_stages_runtime_and_symbols() {
        let fixture = BundleFixture::new(HostOs::Windows);
        collect(&fixture);
        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X86);
        let dirs = PORTABLE.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        let mut progress = shell.progress(sources.artifact_count(), "staging");
        stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap();

        assert!(dirs.bin.join("m64prs-gtk.exe").is_file());
        assert!(dirs.bin.join("m64prs_gtk.pdb").is_file());
        assert!(dirs.bin.join("SDL2.dll").is_file());
        assert!(dirs.bin.join("zlib.dll").is_file());
        assert!(dirs.core.join("mupen64plus.dll").is_file());
        assert!(dirs.core.join("mupen64plus.pdb").is_file());
        assert!(dirs.plugin.join("mupen64plus-input-tasinput.dll").is_file());
        assert!(dirs.plugin.join("tasinput-ui.exe").is_file());
    }

    #[test]
    fn test_darwin_symbol_bundles_are_staged() {
        let fixture = BundleFixture::new(HostOs::Darwin);
        collect(&fixture);
        let dwarf = fixture
            .native_tree()
            .target_dir
            .join("mupen64plus.dSYM/Contents/Resources/DWARF");
        std::fs::create_dir_all(&dwarf).unwrap();
        std::fs::write(dwarf.join("mupen64plus"), "dwarf").unwrap();

        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X64);
        let dirs = PORTABLE.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        let mut progress = shell.progress(sources.artifact_count(), "staging");
        let summary = stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap();
        assert_eq!(summary.copied, 9);
        assert!(dirs
            .core
            .join("mupen64plus.dSYM/Contents/Resources/DWARF/mupen64plus")
            .is_file());
        assert!(dirs.core.join("libmupen64plus.dylib").is_file());
    }

    #[test]
    fn test_missing_artifact_aborts() {
        let fixture = BundleFixture::new(HostOs::Unix);
        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X64);
        let dirs = PORTABLE.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        // native outputs were never collected
        let mut progress = shell.progress(sources.artifact_count(), "staging");
        let err = stage_artifacts(&shell, &mut progress, &sources, &dirs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::MissingSource { .. })
        ));
    }

    #[test]
    fn test_missing_catalogs_are_skipped() {
        let fixture = BundleFixture::new(HostOs::Unix);
        std::fs::remove_dir_all(fixture.root().join("m64prs/gtk/locale")).unwrap();
        let shell = quiet();
        let sources = sources(&fixture, TargetArch::X64);
        let dirs = UNIX.resolve(&fixture.install_dir(Profile::Debug));
        dirs.create_all().unwrap();

        stage_data(&shell, &sources, &dirs).unwrap();
        assert!(dirs.data.join(data_file(&BUILD_TARGETS[0])).is_file());
        assert_eq!(std::fs::read_dir(&dirs.i18n).unwrap().count(), 0);
    }
}
