//! User-friendly diagnostic messages.
//!
//! Every fatal error printed by the CLI goes through [`Diagnostic`], so it
//! carries the root cause, any relevant context, and a suggested fix.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// A copy source is missing after a successful build.
    pub const MISSING_SOURCE: &str =
        "Re-run `m64prs-stage build`; if it persists, check that the subproject still produces this file";

    /// The requested install scheme is not registered.
    pub const UNKNOWN_SCHEME: &str = "Pass one of the registered schemes to `--install-scheme`";

    /// Visual Studio is not installed where the locator is expected.
    pub const INSTALL_VISUAL_STUDIO: &str =
        "Install Visual Studio or the Build Tools with the \"Desktop development with C++\" workload";

    /// vswhere could not report an installation or MSBuild.
    pub const INSTALL_MSBUILD: &str =
        "Make sure the MSBuild component is installed, then run `vswhere -latest` by hand";

    /// The developer shell printed something other than `KEY=VALUE` lines.
    pub const BROKEN_DEV_SHELL: &str =
        "Run VsDevCmd.bat in a fresh console and fix whatever it prints besides the environment";

    /// A native or cargo build returned nonzero.
    pub const BUILD_FAILED: &str = "Scroll up for the build tool's own output; nothing was staged";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Stable error code, if any
    pub code: Option<String>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m".to_string(),
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m".to_string(),
            (true, Severity::Note) => "\x1b[1;36mnote\x1b[0m".to_string(),
            (false, severity) => severity.to_string(),
        };

        match &self.code {
            Some(code) => output.push_str(&format!("{}[{}]: {}\n", severity_str, code, self.message)),
            None => output.push_str(&format!("{}: {}\n", severity_str, self.message)),
        }

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
