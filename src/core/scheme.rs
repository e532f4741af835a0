//! Install schemes.
//!
//! A scheme maps each logical install role to a directory relative to the
//! install root. Resolution only computes paths; creating the directories is
//! a separate, explicit step ([`InstallDirs::create_all`]).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::errors::StageError;
use crate::util::fs::ensure_dir;

/// Logical destination of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallRole {
    /// The front-end executable and its runtime libraries.
    Bin,
    /// The emulator core library.
    Core,
    /// Emulator plugins.
    Plugin,
    /// Read-only data files.
    Data,
    /// Translation catalogs.
    I18n,
}

impl InstallRole {
    pub const ALL: [InstallRole; 5] = [
        InstallRole::Bin,
        InstallRole::Core,
        InstallRole::Plugin,
        InstallRole::Data,
        InstallRole::I18n,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstallRole::Bin => "bin",
            InstallRole::Core => "core",
            InstallRole::Plugin => "plugin",
            InstallRole::Data => "data",
            InstallRole::I18n => "i18n",
        }
    }
}

impl fmt::Display for InstallRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named layout convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallScheme {
    pub name: &'static str,
    bin: &'static str,
    core: &'static str,
    plugin: &'static str,
    data: &'static str,
    i18n: &'static str,
}

/// Everything next to the executable. An empty segment means the root itself.
pub const PORTABLE: InstallScheme = InstallScheme {
    name: "portable",
    bin: "",
    core: "core",
    plugin: "plugin",
    data: "data",
    i18n: "i18n",
};

/// FHS-style prefix layout.
pub const UNIX: InstallScheme = InstallScheme {
    name: "unix",
    bin: "bin",
    core: "lib/m64prs",
    plugin: "lib/m64prs/plugin",
    data: "share/m64prs",
    i18n: "share/locale",
};

/// Registered schemes. The first entry is the default.
pub const SCHEMES: &[InstallScheme] = &[PORTABLE, UNIX];

impl InstallScheme {
    /// Path segment for `role`, relative to the install root.
    pub fn segment(&self, role: InstallRole) -> &'static str {
        match role {
            InstallRole::Bin => self.bin,
            InstallRole::Core => self.core,
            InstallRole::Plugin => self.plugin,
            InstallRole::Data => self.data,
            InstallRole::I18n => self.i18n,
        }
    }

    /// Compute the role directories under `root`.
    pub fn resolve(&self, root: &Path) -> InstallDirs {
        let dir = |role| {
            let segment = self.segment(role);
            if segment.is_empty() {
                root.to_path_buf()
            } else {
                root.join(segment)
            }
        };
        InstallDirs {
            bin: dir(InstallRole::Bin),
            core: dir(InstallRole::Core),
            plugin: dir(InstallRole::Plugin),
            data: dir(InstallRole::Data),
            i18n: dir(InstallRole::I18n),
        }
    }
}

impl Default for InstallScheme {
    fn default() -> Self {
        SCHEMES[0]
    }
}

impl fmt::Display for InstallScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Names of all registered schemes, in registration order.
pub fn scheme_names() -> Vec<&'static str> {
    SCHEMES.iter().map(|s| s.name).collect()
}

/// Look up a registered scheme by name.
pub fn find_scheme(name: &str) -> Result<InstallScheme, StageError> {
    SCHEMES
        .iter()
        .find(|s| s.name == name)
        .copied()
        .ok_or_else(|| StageError::UnknownScheme {
            name: name.to_string(),
            available: scheme_names().into_iter().map(String::from).collect(),
        })
}

/// Resolve `scheme_name` against `install_root`.
pub fn resolve(scheme_name: &str, install_root: &Path) -> Result<InstallDirs, StageError> {
    Ok(find_scheme(scheme_name)?.resolve(install_root))
}

/// Concrete directories for every install role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDirs {
    pub bin: PathBuf,
    pub core: PathBuf,
    pub plugin: PathBuf,
    pub data: PathBuf,
    pub i18n: PathBuf,
}

impl InstallDirs {
    pub fn get(&self, role: InstallRole) -> &Path {
        match role {
            InstallRole::Bin => &self.bin,
            InstallRole::Core => &self.core,
            InstallRole::Plugin => &self.plugin,
            InstallRole::Data => &self.data,
            InstallRole::I18n => &self.i18n,
        }
    }

    /// Create every role directory, including parents.
    pub fn create_all(&self) -> Result<()> {
        for role in InstallRole::ALL {
            ensure_dir(self.get(role))?;
        }
        Ok(())
    }
}
