//! Typed orchestration errors.
//!
//! Library code returns `anyhow::Result` and wraps these with path context;
//! the CLI recovers them with `downcast_ref` to print an actionable message.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Failure kinds the orchestrator distinguishes.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum StageError {
    #[error("source file not found: {}", path.display())]
    #[diagnostic(code(m64prs_stage::install::missing_source))]
    MissingSource { path: PathBuf },

    #[error("unknown install scheme `{name}`")]
    #[diagnostic(code(m64prs_stage::scheme::unknown))]
    UnknownScheme { name: String, available: Vec<String> },

    #[error("Visual Studio locator not found at {}", path.display())]
    #[diagnostic(code(m64prs_stage::toolchain::not_found))]
    ToolchainNotFound { path: PathBuf },

    #[error("toolchain discovery failed: {query}")]
    #[diagnostic(code(m64prs_stage::toolchain::discovery))]
    ToolchainDiscoveryFailure { query: String, detail: String },

    #[error("malformed developer environment output on line {line}: `{content}`")]
    #[diagnostic(code(m64prs_stage::toolchain::malformed_env))]
    MalformedEnvironmentOutput { line: usize, content: String },

    #[error("build of `{subproject}` failed ({})", describe_exit(.code))]
    #[diagnostic(code(m64prs_stage::build::subproject_failed))]
    SubprojectBuildFailed { subproject: String, code: Option<i32> },

    #[error("`{program}` failed ({})", describe_exit(.code))]
    #[diagnostic(code(m64prs_stage::process::failed))]
    ProcessFailed { program: String, code: Option<i32> },

    #[error("interrupted")]
    #[diagnostic(code(m64prs_stage::interrupted))]
    Interrupted,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl StageError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }

        match self {
            StageError::MissingSource { path } => diag
                .with_location(path)
                .with_suggestion(suggestions::MISSING_SOURCE),
            StageError::UnknownScheme { available, .. } => diag
                .with_context(format!("registered schemes: {}", available.join(", ")))
                .with_suggestion(suggestions::UNKNOWN_SCHEME),
            StageError::ToolchainNotFound { .. } => {
                diag.with_suggestion(suggestions::INSTALL_VISUAL_STUDIO)
            }
            StageError::ToolchainDiscoveryFailure { detail, .. } => {
                let diag = if detail.trim().is_empty() {
                    diag
                } else {
                    diag.with_context(detail.trim().to_string())
                };
                diag.with_suggestion(suggestions::INSTALL_MSBUILD)
            }
            StageError::MalformedEnvironmentOutput { .. } => {
                diag.with_suggestion(suggestions::BROKEN_DEV_SHELL)
            }
            StageError::SubprojectBuildFailed { .. } => {
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }
            StageError::ProcessFailed { .. } => diag,
            StageError::Interrupted => {
                diag.with_context("the install tree may be partially staged")
            }
        }
    }
}
