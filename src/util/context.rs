//! Global context for staging operations.
//!
//! Provides centralized access to the source root, host, configuration,
//! environment hints, and output shell.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::core::bundle::{I18N_SOURCE_DIR, NATIVE_DIR, NATIVE_TARGET_DIR, WIN32_DEPS_DIR};
use crate::core::{HostOs, Profile};
use crate::util::config::{self, BuildEnv, Config};
use crate::util::shell::Shell;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Repository root (contains `m64prs/native`)
    root: PathBuf,

    host: HostOs,

    /// Merged global and project configuration
    config: Config,

    env: BuildEnv,

    shell: Arc<Shell>,
}

impl GlobalContext {
    /// Create a context for an explicit source root, reading config files and
    /// environment hints.
    pub fn new(root: PathBuf, shell: Arc<Shell>) -> Result<Self> {
        if !root.join(NATIVE_DIR).is_dir() {
            bail!(
                "{} does not look like an m64prs checkout (no {} directory)",
                root.display(),
                NATIVE_DIR
            );
        }

        let global = config::global_config_path();
        let config = config::load_config(global.as_deref(), &config::project_config_path(&root));

        Ok(GlobalContext {
            root,
            host: HostOs::current(),
            config,
            env: BuildEnv::from_process(),
            shell,
        })
    }

    /// Locate the root by walking up from the current directory.
    pub fn discover(shell: Arc<Shell>) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let root = find_root(&cwd).with_context(|| {
            format!(
                "could not find an m64prs checkout in {} or any parent directory",
                cwd.display()
            )
        })?;
        Self::new(root, shell)
    }

    /// Assemble a context from parts, without touching the filesystem.
    pub fn from_parts(
        root: PathBuf,
        host: HostOs,
        config: Config,
        env: BuildEnv,
        shell: Arc<Shell>,
    ) -> Self {
        GlobalContext {
            root,
            host,
            config,
            env,
            shell,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn env(&self) -> &BuildEnv {
        &self.env
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }

    /// `m64prs/native`
    pub fn native_dir(&self) -> PathBuf {
        self.root.join(NATIVE_DIR)
    }

    /// `m64prs/native/target`
    pub fn native_target_dir(&self) -> PathBuf {
        self.native_dir().join(NATIVE_TARGET_DIR)
    }

    /// Cargo output directory for a profile.
    pub fn target_dir(&self, profile: Profile) -> PathBuf {
        self.root.join("target").join(profile.dir_name())
    }

    /// Install root for a profile.
    pub fn install_dir(&self, profile: Profile) -> PathBuf {
        self.root.join("install").join(profile.dir_name())
    }

    pub fn win32_deps_dir(&self) -> PathBuf {
        self.native_dir().join(WIN32_DEPS_DIR)
    }

    pub fn i18n_source_dir(&self) -> PathBuf {
        self.root.join(I18N_SOURCE_DIR)
    }
}

/// Walk up from `start` to the first directory containing `m64prs/native`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(NATIVE_DIR).is_dir())
        .map(Path::to_path_buf)
}
