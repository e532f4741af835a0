//! Subprocess execution utilities.
//!
//! Every external tool (make, compiledb, cargo, vswhere, cmd, MSBuild, and
//! the staged front end) is launched through [`ProcessRunner`], so builds can
//! be exercised in tests without the tools installed.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::util::errors::StageError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<OsString>,
    raw_args: Vec<String>,
    env: BTreeMap<String, String>,
    env_clear: bool,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            raw_args: Vec::new(),
            env: BTreeMap::new(),
            env_clear: false,
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Append an argument verbatim, without the platform's quoting.
    ///
    /// Only Windows distinguishes raw arguments; elsewhere this is [`arg`](Self::arg).
    pub fn raw_arg(mut self, arg: impl Into<String>) -> Self {
        self.raw_args.push(arg.into());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables.
    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    /// Start the child from an empty environment instead of inheriting ours.
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments, raw arguments last.
    pub fn get_args(&self) -> Vec<&OsStr> {
        self.args
            .iter()
            .map(OsString::as_os_str)
            .chain(self.raw_args.iter().map(OsStr::new))
            .collect()
    }

    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn get_env_clear(&self) -> bool {
        self.env_clear
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            for arg in &self.raw_args {
                cmd.raw_arg(arg);
            }
        }
        #[cfg(not(windows))]
        cmd.args(&self.raw_args);

        if self.env_clear {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(
            self.get_args()
                .into_iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Short program name for error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Exit code and captured output of a finished child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Launches external tools.
///
/// Neither method treats a nonzero exit as an error; callers map that to the
/// failure kind that fits their step.
pub trait ProcessRunner {
    /// Run to completion, capturing stdout and stderr.
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;

    /// Run to completion with inherited stdio. Captured streams are empty.
    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;
}

/// Runs real processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    interrupted: Arc<AtomicBool>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report [`StageError::Interrupted`] once `flag` is set.
    pub fn with_interrupt_flag(flag: Arc<AtomicBool>) -> Self {
        SystemRunner { interrupted: flag }
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(StageError::Interrupted.into());
        }
        Ok(())
    }
}

impl ProcessRunner for SystemRunner {
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.check_interrupt()?;
        tracing::debug!("exec: {}", cmd.display_command());

        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to execute `{}`", cmd.display_command()))?;

        self.check_interrupt()?;
        Ok(output.into())
    }

    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.check_interrupt()?;
        tracing::debug!("exec: {}", cmd.display_command());

        let status = cmd
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", cmd.display_command()))?;

        self.check_interrupt()?;
        Ok(ProcessOutput {
            code: status.code(),
            ..ProcessOutput::default()
        })
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
