//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `<config dir>/m64prs-stage/config.toml` - user-wide defaults
//! - Project: `<root>/.m64prs-stage/config.toml` - overrides for one checkout
//!
//! Project config takes precedence over global config. Command-line flags and
//! environment hints take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub windows: WindowsConfig,
}

/// `[build]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Install scheme used when `--install-scheme` is absent
    pub install_scheme: Option<String>,

    /// Allow wrapping make with compiledb (default: true)
    pub compile_db: Option<bool>,

    /// Parallel jobs used when `--jobs` is absent
    pub jobs: Option<usize>,
}

/// `[windows]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WindowsConfig {
    /// Target architecture (`x86` or `x86_64`)
    pub arch: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Overlay `other` on top of `self`; set keys in `other` win.
    pub fn merge(&mut self, other: Config) {
        if other.build.install_scheme.is_some() {
            self.build.install_scheme = other.build.install_scheme;
        }
        if other.build.compile_db.is_some() {
            self.build.compile_db = other.build.compile_db;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.windows.arch.is_some() {
            self.windows.arch = other.windows.arch;
        }
    }

    /// Whether compiledb wrapping is allowed.
    pub fn compile_db(&self) -> bool {
        self.build.compile_db.unwrap_or(true)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.m64prs-stage/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Global config path, if the platform has a config directory.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "m64prs-stage")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Project config path under a source root.
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".m64prs-stage").join("config.toml")
}

/// Environment hints, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    /// `ProgramFiles(x86)`
    pub program_files_x86: Option<PathBuf>,
    /// `CARGO_CFG_TARGET_ARCH`
    pub target_arch: Option<String>,
    /// `PROFILE`
    pub profile: Option<String>,
}

impl BuildEnv {
    pub fn from_process() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        BuildEnv {
            program_files_x86: var("ProgramFiles(x86)").map(PathBuf::from),
            target_arch: var("CARGO_CFG_TARGET_ARCH"),
            profile: var("PROFILE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.install_scheme.is_none());
        assert!(config.compile_db());
        assert!(config.windows.arch.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
install-scheme = "unix"
compile-db = false
jobs = 8

[windows]
arch = "x86"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.install_scheme.as_deref(), Some("unix"));
        assert!(!config.compile_db());
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.windows.arch.as_deref(), Some("x86"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.install_scheme = Some("portable".to_string());
        base.build.jobs = Some(4);

        let mut override_cfg = Config::default();
        override_cfg.build.install_scheme = Some("unix".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.install_scheme.as_deref(), Some("unix"));
        assert_eq!(base.build.jobs, Some(4));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();

        std::fs::write(&global, "[build]\njobs = 2\ninstall-scheme = \"unix\"\n").unwrap();
        std::fs::write(&project, "[build]\njobs = 16\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.jobs, Some(16));
        assert_eq!(config.build.install_scheme.as_deref(), Some("unix"));
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\njobs = ").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
