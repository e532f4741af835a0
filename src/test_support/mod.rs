//! Test utilities and doubles for unit tests.
//!
//! [`FakeRunner`] stands in for [`SystemRunner`](crate::util::SystemRunner):
//! it matches each command line against a list of expectations, returns the
//! canned output, and records the call for later assertions.
//!
//! ```rust,ignore
//! let runner = FakeRunner::new()
//!     .expect(CommandPattern::StartsWith("make".into()), ProcessOutput::failed(2));
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ProcessOutput, ProcessRunner};

pub use fixtures::*;

impl ProcessOutput {
    /// Exit 0 with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        ProcessOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Nonzero exit with empty output.
    pub fn failed(code: i32) -> Self {
        ProcessOutput {
            code: Some(code),
            ..ProcessOutput::default()
        }
    }
}

/// Pattern for matching command lines.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    output: ProcessOutput,
    times: Option<usize>,
    used: usize,
}

impl Expectation {
    fn available(&self) -> bool {
        self.times.map_or(true, |n| self.used < n)
    }
}

/// A command the runner was asked to execute.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub env_clear: bool,
    /// Whether stdout was captured (`output`) or inherited (`status`).
    pub captured: bool,
}

/// Pattern-matching [`ProcessRunner`] double.
#[derive(Debug)]
pub struct FakeRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<RecordedCall>>,
    default_output: Option<ProcessOutput>,
}

impl FakeRunner {
    /// A runner where unmatched commands succeed with empty output.
    pub fn new() -> Self {
        FakeRunner {
            expectations: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            default_output: Some(ProcessOutput::ok("")),
        }
    }

    /// A runner where unmatched commands are an error.
    pub fn strict() -> Self {
        FakeRunner {
            default_output: None,
            ..FakeRunner::new()
        }
    }

    /// Answer every matching command with `output`. Earlier expectations win.
    pub fn expect(self, pattern: CommandPattern, output: ProcessOutput) -> Self {
        self.push(pattern, output, None)
    }

    /// Answer only the first `times` matching commands.
    pub fn expect_times(self, pattern: CommandPattern, output: ProcessOutput, times: usize) -> Self {
        self.push(pattern, output, Some(times))
    }

    fn push(self, pattern: CommandPattern, output: ProcessOutput, times: Option<usize>) -> Self {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(Expectation {
                pattern,
                output,
                times,
                used: 0,
            });
        }
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines of all calls so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    /// Whether any recorded command matches `pattern`.
    pub fn was_called(&self, pattern: &CommandPattern) -> bool {
        self.calls().iter().any(|c| pattern.matches(&c.command))
    }

    fn run(&self, cmd: &ProcessBuilder, captured: bool) -> Result<ProcessOutput> {
        let command = cmd.display_command();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.clone(),
                cwd: cmd.get_cwd().map(PathBuf::from),
                env: cmd.get_env().clone(),
                env_clear: cmd.get_env_clear(),
                captured,
            });
        }

        if let Ok(mut expectations) = self.expectations.lock() {
            if let Some(exp) = expectations
                .iter_mut()
                .find(|e| e.available() && e.pattern.matches(&command))
            {
                exp.used += 1;
                return Ok(exp.output.clone());
            }
        }

        match &self.default_output {
            Some(output) => Ok(output.clone()),
            None => bail!("unexpected command: {}", command),
        }
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        FakeRunner::new()
    }
}

impl ProcessRunner for FakeRunner {
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.run(cmd, true)
    }

    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let mut output = self.run(cmd, false)?;
        output.stdout.clear();
        output.stderr.clear();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_pattern_matching() {
        assert!(CommandPattern::Exact("make clean".into()).matches("make clean"));
        assert!(!CommandPattern::Exact("make".into()).matches("make clean"));
        assert!(CommandPattern::StartsWith("make".into()).matches("make all TAS=1"));
        assert!(CommandPattern::Contains("TAS=1".into()).matches("make all TAS=1"));
        assert!(CommandPattern::Regex(r"-j\d+$".into()).matches("make all -j8"));
        assert!(CommandPattern::Any.matches("anything"));
    }

    #[test]
    fn test_first_matching_expectation_wins() {
        let runner = FakeRunner::strict()
            .expect_times(CommandPattern::StartsWith("make".into()), ProcessOutput::failed(2), 1)
            .expect(CommandPattern::Any, ProcessOutput::ok("fine"));

        let first = runner.output(&ProcessBuilder::new("make").arg("all")).unwrap();
        assert_eq!(first.code, Some(2));
        let second = runner.output(&ProcessBuilder::new("make").arg("all")).unwrap();
        assert_eq!(second.stdout, "fine");
        assert_eq!(runner.commands(), vec!["make all", "make all"]);
    }

    #[test]
    fn test_strict_runner_rejects_unknown_commands() {
        let runner = FakeRunner::strict();
        assert!(runner.status(&ProcessBuilder::new("cargo")).is_err());
        assert_eq!(runner.calls().len(), 1);
    }
}
