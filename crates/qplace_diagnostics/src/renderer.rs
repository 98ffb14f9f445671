//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[W301]: conjugate gradient stopped at the iteration cap
///    = note: residual norm 2.1e-2 after 1000 iterations
///    = help: raise solver.max_iterations
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_severity(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let ansi = match severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
        };
        format!("{ansi}{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.paint_severity(diag.severity),
            diag.code,
            diag.message
        );

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_warning_with_notes() {
        let code = DiagnosticCode::new(Category::Warning, 301);
        let diag = Diagnostic::warning(code, "solver stopped at the iteration cap")
            .with_note("residual norm 0.5")
            .with_help("raise solver.max_iterations");

        let output = TerminalRenderer::new(false).render(&diag);

        assert!(output.starts_with("warning[W301]: solver stopped at the iteration cap\n"));
        assert!(output.contains("= note: residual norm 0.5"));
        assert!(output.contains("= help: raise solver.max_iterations"));
    }

    #[test]
    fn render_plain_error() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 201), "no region");
        let output = TerminalRenderer::new(false).render(&diag);
        assert_eq!(output, "error[E201]: no region\n");
    }

    #[test]
    fn render_colored_severity() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Note, 1), "graph built");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.contains("\x1b["));
        assert!(output.contains("[N001]: graph built"));
    }
}
