//! Shared helpers for CLI commands: config lookup, design I/O and
//! diagnostic rendering.

use std::path::{Path, PathBuf};

use qplace_config::{
    load_config, resolve_settings, Overrides, QplaceConfig, ResolvedSettings, CONFIG_FILE_NAME,
};
use qplace_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use qplace_place::Design;

use crate::GlobalArgs;

/// Finds the configuration file to use for a design.
///
/// An explicit `--config` path wins; otherwise `qplace.toml` next to the
/// design is used when it exists.
pub fn find_config(global: &GlobalArgs, design: &Path) -> Option<PathBuf> {
    if let Some(ref path) = global.config {
        return Some(PathBuf::from(path));
    }
    let dir = design.parent().unwrap_or_else(|| Path::new("."));
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Loads the configuration for a design and applies command-line overrides.
pub fn load_settings(
    global: &GlobalArgs,
    design: &Path,
    overrides: &Overrides,
) -> Result<ResolvedSettings, Box<dyn std::error::Error>> {
    let config = match find_config(global, design) {
        Some(path) => load_config(&path)
            .map_err(|e| format!("failed to load {}: {e}", path.display()))?,
        None => QplaceConfig::default(),
    };
    Ok(resolve_settings(&config, overrides)?)
}

/// Reads and validates a JSON design.
pub fn load_design(path: &Path) -> Result<Design, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Design::from_json(&text).map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Writes a design as JSON to `path`, or to stdout when `path` is `None`.
pub fn save_design(design: &Design, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = design.to_json()?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Returns whether a diagnostic of this severity should be shown.
pub fn is_visible(severity: Severity, global: &GlobalArgs) -> bool {
    match severity {
        Severity::Error => true,
        Severity::Warning => !global.quiet,
        Severity::Note => global.verbose && !global.quiet,
    }
}

/// Renders the visible diagnostics in a sink to stderr.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) -> usize {
    let renderer = TerminalRenderer::new(global.color);
    let mut shown = 0;
    for diag in sink.take_all() {
        if is_visible(diag.severity, global) {
            eprint!("{}", renderer.render(&diag));
            shown += 1;
        }
    }
    shown
}

#[cfg(test)]
pub(crate) fn test_global(config: Option<String>) -> GlobalArgs {
    GlobalArgs {
        quiet: true,
        verbose: false,
        color: false,
        config,
    }
}
