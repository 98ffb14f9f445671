//! The `qplace place` command.
//!
//! Loads the design and configuration, runs the placer, renders the
//! diagnostics and writes the placed design.

use std::path::Path;

use qplace_config::Overrides;
use qplace_diagnostics::DiagnosticSink;
use qplace_place::quadratic_place;

use crate::pipeline::{load_design, load_settings, render_diagnostics, save_design};
use crate::{GlobalArgs, PlaceArgs};

/// Runs the placer and returns the process exit code.
pub fn run(args: &PlaceArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let design_path = Path::new(&args.design);
    let overrides = Overrides {
        partition_depth: args.partition_depth,
        seed: args.seed,
        solve_mode: args.solve_mode.map(Into::into),
    };
    let settings = load_settings(global, design_path, &overrides)?;
    let mut design = load_design(design_path)?;

    let sink = DiagnosticSink::new();
    let report = quadratic_place(&mut design, &settings, &sink)?;
    let failed = sink.has_errors();
    render_diagnostics(&sink, global);

    if failed {
        return Ok(1);
    }

    save_design(&design, args.output.as_deref().map(Path::new))?;

    if !global.quiet {
        let stats = &report.stats;
        eprintln!(
            "placed {} instances in {:.1?} ({} solves, {} skipped, {} partitions, max depth {})",
            report.placed,
            report.elapsed,
            stats.solves,
            stats.skipped_solves,
            stats.partitions,
            stats.max_depth
        );
        if stats.non_converged > 0 {
            eprintln!(
                "{} axis solves stopped at the iteration cap",
                stats.non_converged
            );
        }
    }
    Ok(0)
}
