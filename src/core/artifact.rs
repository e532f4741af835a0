//! Platform-specific artifact naming.

use std::fmt;

use super::host::HostOs;

/// The role a build output plays, which decides its on-disk file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A runnable program.
    Executable,
    /// A shared library linked or loaded by name (the emulator core).
    SharedLibrary,
    /// A plugin loaded from the plugin directory.
    Plugin,
    /// Debug symbols for an executable or library.
    DebugSymbols,
}

impl ArtifactKind {
    /// All kinds, in declaration order.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Executable,
        ArtifactKind::SharedLibrary,
        ArtifactKind::Plugin,
        ArtifactKind::DebugSymbols,
    ];

    /// Concrete file name for `logical` on `host`.
    ///
    /// Unknown hosts get the logical name unchanged.
    pub fn file_name(self, logical: &str, host: HostOs) -> String {
        match (self, host) {
            (_, HostOs::Other) => logical.to_string(),

            (ArtifactKind::Executable, HostOs::Windows) => format!("{logical}.exe"),
            (ArtifactKind::Executable, HostOs::Darwin | HostOs::Unix) => logical.to_string(),

            (ArtifactKind::SharedLibrary | ArtifactKind::Plugin, HostOs::Windows) => {
                format!("{logical}.dll")
            }
            (ArtifactKind::SharedLibrary, HostOs::Darwin) => format!("lib{logical}.dylib"),
            (ArtifactKind::Plugin, HostOs::Darwin) => format!("{logical}.dylib"),
            (ArtifactKind::SharedLibrary | ArtifactKind::Plugin, HostOs::Unix) => {
                format!("lib{logical}.so")
            }

            (ArtifactKind::DebugSymbols, HostOs::Windows) => format!("{logical}.pdb"),
            (ArtifactKind::DebugSymbols, HostOs::Darwin) => format!("{logical}.dSYM"),
            (ArtifactKind::DebugSymbols, HostOs::Unix) => format!("{logical}.debug"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Executable => "executable",
            ArtifactKind::SharedLibrary => "shared library",
            ArtifactKind::Plugin => "plugin",
            ArtifactKind::DebugSymbols => "debug symbols",
        };
        f.write_str(s)
    }
}
