//! Static description of the m64prs source tree.
//!
//! The orchestrator does not discover subprojects; the bundle is a fixed
//! list, built and staged in the order declared here.

use std::path::{Path, PathBuf};

use super::artifact::ArtifactKind;
use super::host::HostOs;
use super::scheme::InstallRole;

/// Application name used in install paths.
pub const APP_NAME: &str = "m64prs";

/// Native subprojects, relative to the repository root.
pub const NATIVE_DIR: &str = "m64prs/native";

/// Collected native outputs, relative to [`NATIVE_DIR`].
pub const NATIVE_TARGET_DIR: &str = "target";

/// Prebuilt Windows runtime libraries, relative to [`NATIVE_DIR`].
pub const WIN32_DEPS_DIR: &str = "mupen64plus-win32-deps";

/// Compiled translation catalogs, relative to the repository root.
pub const I18N_SOURCE_DIR: &str = "m64prs/gtk/locale";

/// Version suffix the core's Unix Makefile appends to its shared object.
pub const CORE_SONAME_VERSION: &str = "2.0.0";

/// A native subproject built by Make or MSBuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTarget {
    /// Directory under [`NATIVE_DIR`], also the MSBuild project name.
    pub name: &'static str,
    /// Logical name of the produced artifact.
    pub artifact: &'static str,
    pub kind: ArtifactKind,
    /// Arguments passed to `make`, before the build-variant flag.
    pub make_args: &'static [&'static str],
    /// Data files shipped with the subproject, relative to its directory.
    pub data_dir: Option<&'static str>,
}

impl BuildTarget {
    pub fn source_dir(&self, native_root: &Path) -> PathBuf {
        native_root.join(self.name)
    }

    /// Working directory for the Make strategy.
    pub fn make_dir(&self, native_root: &Path) -> PathBuf {
        self.source_dir(native_root).join("projects").join("unix")
    }

    /// Project file for the MSBuild strategy.
    pub fn msbuild_project(&self, native_root: &Path) -> PathBuf {
        self.source_dir(native_root)
            .join("projects")
            .join("msvc")
            .join(format!("{}.vcxproj", self.name))
    }

    pub fn data_source(&self, native_root: &Path) -> Option<PathBuf> {
        self.data_dir.map(|dir| self.source_dir(native_root).join(dir))
    }

    /// Canonical file name of the artifact in the native target directory.
    pub fn artifact_file(&self, host: HostOs) -> String {
        self.kind.file_name(self.artifact, host)
    }

    /// Install role of the artifact.
    pub fn role(&self) -> InstallRole {
        match self.kind {
            ArtifactKind::Plugin => InstallRole::Plugin,
            _ => InstallRole::Core,
        }
    }
}

/// Native build order. Nothing here depends on another entry's output; the
/// order is kept fixed so builds are reproducible.
pub const BUILD_TARGETS: [BuildTarget; 5] = [
    BuildTarget {
        name: "mupen64plus-core",
        artifact: "mupen64plus",
        kind: ArtifactKind::SharedLibrary,
        make_args: &["all", "TAS=1"],
        data_dir: Some("data"),
    },
    BuildTarget {
        name: "mupen64plus-audio-sdl",
        artifact: "mupen64plus-audio-sdl",
        kind: ArtifactKind::Plugin,
        make_args: &["all"],
        data_dir: None,
    },
    BuildTarget {
        name: "mupen64plus-input-sdl",
        artifact: "mupen64plus-input-sdl",
        kind: ArtifactKind::Plugin,
        make_args: &["all"],
        data_dir: Some("data"),
    },
    BuildTarget {
        name: "mupen64plus-video-rice",
        artifact: "mupen64plus-video-rice",
        kind: ArtifactKind::Plugin,
        make_args: &["all"],
        data_dir: Some("data"),
    },
    BuildTarget {
        name: "mupen64plus-rsp-hle",
        artifact: "mupen64plus-rsp-hle",
        kind: ArtifactKind::Plugin,
        make_args: &["all"],
        data_dir: None,
    },
];

/// Cargo packages built by the managed workspace step.
pub const MANAGED_PACKAGES: [&str; 3] = ["m64prs-gtk", "tasinput-bridge", "tasinput-ui"];

/// An artifact produced by the managed workspace build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedArtifact {
    /// Logical name in `target/<profile>/`.
    pub artifact: &'static str,
    pub kind: ArtifactKind,
    pub role: InstallRole,
    /// Logical name once staged.
    pub staged_name: &'static str,
    pub staged_kind: ArtifactKind,
}

impl ManagedArtifact {
    pub fn source_file(&self, host: HostOs) -> String {
        self.kind.file_name(self.artifact, host)
    }

    pub fn staged_file(&self, host: HostOs) -> String {
        self.staged_kind.file_name(self.staged_name, host)
    }

    /// Symbol file name. Cargo writes PDBs with underscores in place of dashes.
    pub fn symbols_file(&self, host: HostOs) -> String {
        ArtifactKind::DebugSymbols.file_name(&self.artifact.replace('-', "_"), host)
    }
}

/// The front end.
pub const FRONTEND: ManagedArtifact = ManagedArtifact {
    artifact: "m64prs-gtk",
    kind: ArtifactKind::Executable,
    role: InstallRole::Bin,
    staged_name: "m64prs-gtk",
    staged_kind: ArtifactKind::Executable,
};

/// Managed artifacts in staging order.
pub const MANAGED_ARTIFACTS: [ManagedArtifact; 3] = [
    FRONTEND,
    // The input bridge is a cdylib, staged under the plugin naming the
    // front end scans for.
    ManagedArtifact {
        artifact: "tasinput_bridge",
        kind: ArtifactKind::SharedLibrary,
        role: InstallRole::Plugin,
        staged_name: "mupen64plus-input-tasinput",
        staged_kind: ArtifactKind::Plugin,
    },
    // The bridge spawns its UI from its own directory.
    ManagedArtifact {
        artifact: "tasinput-ui",
        kind: ArtifactKind::Executable,
        role: InstallRole::Plugin,
        staged_name: "tasinput-ui",
        staged_kind: ArtifactKind::Executable,
    },
];

/// A prebuilt Windows runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeDependency {
    pub name: &'static str,
    /// Version-tagged folder under [`WIN32_DEPS_DIR`].
    pub folder: &'static str,
}

impl RuntimeDependency {
    /// Directory holding the DLL for the given architecture folder.
    pub fn source_dir(&self, deps_root: &Path, arch_dir: &str) -> PathBuf {
        deps_root.join(self.folder).join("lib").join(arch_dir)
    }
}

pub const WIN32_RUNTIME_DEPS: [RuntimeDependency; 5] = [
    RuntimeDependency { name: "freetype", folder: "freetype-2.13.0" },
    RuntimeDependency { name: "libpng16", folder: "libpng-1.6.39" },
    RuntimeDependency { name: "SDL2_net", folder: "SDL2_net-2.2.0" },
    RuntimeDependency { name: "SDL2", folder: "SDL2-2.26.3" },
    RuntimeDependency { name: "zlib", folder: "zlib-1.2.13" },
];
