//! Native toolchain environment.
//!
//! On Windows the MSVC tools only work inside a developer shell. The shell's
//! environment is captured once per build ([`msvc::bootstrap`]) and replayed,
//! in full, into every native build subprocess.

use std::collections::BTreeMap;
use std::fmt;

use crate::util::errors::StageError;
use crate::util::process::ProcessBuilder;

pub mod msvc;

pub use msvc::MsvcToolchain;

/// Environment captured from a developer shell. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainEnvironment {
    vars: BTreeMap<String, String>,
}

impl ToolchainEnvironment {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replace the command's inherited environment with this one.
    pub fn apply_to(&self, cmd: ProcessBuilder) -> ProcessBuilder {
        cmd.env_clear().envs(self.vars.iter())
    }
}

impl FromIterator<(String, String)> for ToolchainEnvironment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ToolchainEnvironment {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Parse `set` output: one `KEY=VALUE` per line, split on the first `=`.
///
/// Any line without `=` (including blank lines) is rejected with its
/// 1-based line number.
pub fn parse_env_output(output: &str) -> Result<ToolchainEnvironment, StageError> {
    output
        .lines()
        .enumerate()
        .map(|(idx, line)| match line.split_once('=') {
            Some((key, value)) => Ok((key.to_string(), value.to_string())),
            None => Err(StageError::MalformedEnvironmentOutput {
                line: idx + 1,
                content: line.to_string(),
            }),
        })
        .collect()
}

/// Windows target architecture of the native build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetArch {
    X86,
    #[default]
    X64,
}

impl TargetArch {
    /// Parse a target-architecture hint such as `CARGO_CFG_TARGET_ARCH`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            None | Some("") => TargetArch::X64,
            Some("x86") => TargetArch::X86,
            Some("x86_64") => TargetArch::X64,
            Some(other) => {
                tracing::warn!("unsupported target architecture `{}`, building for x86_64", other);
                TargetArch::X64
            }
        }
    }

    /// `-arch=` value for VsDevCmd.bat.
    pub fn dev_env_tag(self) -> &'static str {
        match self {
            TargetArch::X86 => "x86",
            TargetArch::X64 => "amd64",
        }
    }

    /// MSBuild `Platform` property value.
    pub fn msbuild_platform(self) -> &'static str {
        match self {
            TargetArch::X86 => "Win32",
            TargetArch::X64 => "x64",
        }
    }

    /// Architecture folder in the prebuilt dependency tree.
    pub fn deps_dir(self) -> &'static str {
        match self {
            TargetArch::X86 => "x86",
            TargetArch::X64 => "x64",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetArch::X86 => f.write_str("x86"),
            TargetArch::X64 => f.write_str("x86_64"),
        }
    }
}
