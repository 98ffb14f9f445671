//! Structured diagnostic messages with severity, codes, notes, and help.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Each diagnostic carries a severity level, a unique code, a primary
/// message, and optional explanatory notes and help text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, code: DiagnosticCode, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message.into())
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message.into())
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, code, message.into())
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 201);
        let diag = Diagnostic::error(code, "no valid core region");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "no valid core region");
        assert_eq!(format!("{}", diag.code), "E201");
    }

    #[test]
    fn create_warning_and_note() {
        let w = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "slow");
        assert_eq!(w.severity, Severity::Warning);
        let n = Diagnostic::note(DiagnosticCode::new(Category::Note, 1), "built");
        assert_eq!(n.severity, Severity::Note);
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Warning, 301);
        let diag = Diagnostic::warning(code, "conjugate gradient did not converge")
            .with_note("residual 0.02 after 1000 iterations")
            .with_help("raise solver.max_iterations");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }
}
