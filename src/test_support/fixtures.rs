//! Test fixtures for staging scenarios.
//!
//! [`BundleFixture`] lays out a fake m64prs checkout in a temporary
//! directory: every native subproject with its build output already in place
//! (where the host's build tool would leave it), cargo outputs for both
//! profiles, data files, translation catalogs, and on Windows the prebuilt
//! runtime libraries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::builder::make::makefile_output_name;
use crate::builder::msbuild;
use crate::builder::{NativeTree, TargetArch};
use crate::core::bundle::{MANAGED_ARTIFACTS, WIN32_RUNTIME_DEPS};
use crate::core::{ArtifactKind, BuildTarget, HostOs, Profile, BUILD_TARGETS};
use crate::util::config::{BuildEnv, Config};
use crate::util::context::GlobalContext;
use crate::util::shell::{ColorChoice, Shell};

/// Data file placed in each subproject that ships data.
pub fn data_file(target: &BuildTarget) -> String {
    format!("{}.ini", target.name)
}

/// Relative path of the sample translation catalog under the i18n dir.
pub const CATALOG: &str = "de/LC_MESSAGES/m64prs.mo";

/// A fake source checkout.
pub struct BundleFixture {
    tmp: TempDir,
    host: HostOs,
}

impl BundleFixture {
    /// Lay out a checkout with outputs for `host`.
    pub fn new(host: HostOs) -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let fixture = BundleFixture { tmp, host };
        fixture.write_native();
        fixture.write_managed();
        fixture.write(&fixture.root().join("m64prs/gtk/locale").join(CATALOG), "catalog");
        if host.is_windows() {
            fixture.write_runtime_deps();
        }
        fixture
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    pub fn native_dir(&self) -> PathBuf {
        self.root().join("m64prs/native")
    }

    pub fn native_tree(&self) -> NativeTree {
        NativeTree::new(self.native_dir(), self.native_dir().join("target"), self.host)
    }

    pub fn install_dir(&self, profile: Profile) -> PathBuf {
        self.root().join("install").join(profile.dir_name())
    }

    /// A context rooted at the fixture, with a quiet shell and `env`.
    pub fn context_with(&self, config: Config, env: BuildEnv) -> GlobalContext {
        GlobalContext::from_parts(
            self.root().to_path_buf(),
            self.host,
            config,
            env,
            Arc::new(Shell::from_flags(true, false, ColorChoice::Never)),
        )
    }

    pub fn context(&self) -> GlobalContext {
        self.context_with(Config::default(), BuildEnv::default())
    }

    /// Turn the checkout into a git repository ignoring `patterns`.
    pub fn git_ignore(&self, patterns: &[&str]) {
        if git2::Repository::open(self.root()).is_err() {
            git2::Repository::init(self.root()).expect("failed to init repository");
        }
        fs::write(self.root().join(".gitignore"), patterns.join("\n") + "\n")
            .expect("failed to write .gitignore");
    }

    fn write(&self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(path, contents).expect("failed to write fixture file");
    }

    fn write_native(&self) {
        let tree = self.native_tree();
        for target in &BUILD_TARGETS {
            let make_dir = target.make_dir(&tree.root);
            fs::create_dir_all(&make_dir).expect("failed to create fixture dir");

            if self.host.is_windows() {
                let out = msbuild::out_dir(&tree, target);
                self.write(&out.join(target.artifact_file(self.host)), target.artifact);
                let pdb = ArtifactKind::DebugSymbols.file_name(target.artifact, self.host);
                self.write(&out.join(pdb), "symbols");
            } else {
                self.write(&make_dir.join(makefile_output_name(target, self.host)), target.artifact);
            }

            if let Some(data) = target.data_source(&tree.root) {
                self.write(&data.join(data_file(target)), target.name);
            }
        }
    }

    fn write_managed(&self) {
        for profile in [Profile::Debug, Profile::Release] {
            let dir = self.root().join("target").join(profile.dir_name());
            for artifact in &MANAGED_ARTIFACTS {
                self.write(&dir.join(artifact.source_file(self.host)), artifact.artifact);
            }
            if self.host.is_windows() {
                self.write(&dir.join(MANAGED_ARTIFACTS[0].symbols_file(self.host)), "symbols");
            }
        }
    }

    fn write_runtime_deps(&self) {
        let deps_root = self.native_dir().join("mupen64plus-win32-deps");
        for dep in &WIN32_RUNTIME_DEPS {
            for arch in [TargetArch::X86, TargetArch::X64] {
                let dll = ArtifactKind::SharedLibrary.file_name(dep.name, HostOs::Windows);
                self.write(&dep.source_dir(&deps_root, arch.deps_dir()).join(dll), dep.name);
            }
        }
    }
}

/// Create an empty `vswhere.exe` under a fake `Program Files (x86)`.
pub fn fake_vswhere(program_files_x86: &Path) -> PathBuf {
    let path = crate::builder::toolchain::msvc::vswhere_path(Some(program_files_x86));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create vswhere dir");
    }
    fs::write(&path, "").expect("failed to write vswhere");
    path
}
