//! Host operating system detection.
//!
//! Every platform-conditional decision in the orchestrator matches on
//! [`HostOs`], so supporting a new platform is a change in one place.

use std::fmt;

/// Operating system family of the machine running the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    /// Windows (MSVC toolchain, MSBuild projects).
    Windows,
    /// macOS and other Darwin-derived systems.
    Darwin,
    /// Linux and the BSDs.
    Unix,
    /// Anything else. Naming degrades to the bare logical name.
    Other,
}

impl HostOs {
    /// All host families, in declaration order.
    pub const ALL: [HostOs; 4] = [HostOs::Windows, HostOs::Darwin, HostOs::Unix, HostOs::Other];

    /// The host this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a host family.
    pub fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => HostOs::Windows,
            "macos" | "ios" => HostOs::Darwin,
            "linux" | "freebsd" | "dragonfly" | "netbsd" | "openbsd" => HostOs::Unix,
            _ => HostOs::Other,
        }
    }

    /// Whether native subprojects are built with MSBuild on this host.
    pub fn is_windows(self) -> bool {
        matches!(self, HostOs::Windows)
    }

    /// Short lowercase name, used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Windows => "windows",
            HostOs::Darwin => "darwin",
            HostOs::Unix => "unix",
            HostOs::Other => "other",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
