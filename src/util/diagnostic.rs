//! User-facing diagnostic messages.
//!
//! Diagnostics produced during configuration are collected on the plan
//! (and serialized with it) and printed by the CLI. A diagnostic carries a
//! severity, a one-line message, and optional context and hint lines.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Hints appended to errors the user can fix from the command line.
pub mod suggestions {
    pub const UNKNOWN_OPTION: &str = "help: Run `lms-build graph` to list declared options";

    pub const NOT_CONFIGURED: &str = "help: Run `lms-build configure` first";

    pub const PACKAGE_NOT_FOUND: &str =
        "help: Pass `--prefix-path <dir>` or set CMAKE_PREFIX_PATH to the install prefix";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
        }
    }

    /// ANSI SGR sequence used when color is on.
    fn style(&self) -> &'static str {
        match self {
            Severity::Note => "1;36",
            Severity::Warning => "1;33",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message reported during configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,

    /// `= ...` lines explaining the circumstances
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// `help: ...` lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// File the diagnostic refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            context: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Informational message; configuration continues.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    pub fn with_context(mut self, line: impl Into<String>) -> Self {
        self.context.push(line.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, optionally with ANSI colors.
    pub fn render(&self, color: bool) -> String {
        let paint = |label: &str, style: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", style, label)
            } else {
                label.to_string()
            }
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{}: {}\n",
            paint(self.severity.label(), self.severity.style()),
            self.message
        ));
        if let Some(ref path) = self.location {
            out.push_str(&format!("  --> {}\n", path.display()));
        }
        for line in &self.context {
            out.push_str(&format!("  = {}\n", line));
        }
        for hint in &self.hints {
            out.push_str(&format!("{}: {}\n", paint("help", "1;32"), hint));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.render(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        let diag = Diagnostic::warning("public header directory does not exist")
            .with_location("/src/include")
            .with_context("the library is enabled")
            .with_hint("create it or set `targets.include_dir`");

        assert_eq!(
            diag.render(false),
            "warning: public header directory does not exist\n\
             \x20 --> /src/include\n\
             \x20 = the library is enabled\n\
             help: create it or set `targets.include_dir`\n"
        );
    }

    #[test]
    fn test_note_is_one_line() {
        let diag = Diagnostic::note("Library Management System is disabled.");
        assert_eq!(diag.to_string(), "note: Library Management System is disabled.\n");
    }

    #[test]
    fn test_render_color() {
        let rendered = Diagnostic::warning("header directory missing").render(true);
        assert!(rendered.starts_with("\x1b[1;33mwarning\x1b[0m: "));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning > Severity::Note);
    }
}
