//! The `qplace stats` command.

use std::path::Path;

use qplace_common::Rect;
use qplace_config::Overrides;
use qplace_diagnostics::DiagnosticSink;
use qplace_place::{build_graph, derive_region_or_report, ChipDatabase, Design};

use crate::pipeline::{load_design, load_settings, render_diagnostics};
use crate::GlobalArgs;

/// Counts describing what the placer would work on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignStats {
    /// Cells in the design.
    pub cells: usize,
    /// Movable cells with at least one connected net.
    pub instances: usize,
    /// Fixed pins turned into pads.
    pub pads: usize,
    /// Nets with at least one endpoint.
    pub nets: usize,
    /// Nets declared in the design.
    pub declared_nets: usize,
}

/// Collects statistics for a design placed into `region`.
pub fn collect(
    design: &Design,
    region: Rect,
    sink: &DiagnosticSink,
) -> Result<DesignStats, Box<dyn std::error::Error>> {
    let (graph, _) = build_graph(design, region, sink)?;
    Ok(DesignStats {
        cells: design.cells.len(),
        instances: graph.instance_count(),
        pads: graph.pad_count(),
        nets: graph.net_count(),
        declared_nets: design.net_count(),
    })
}

/// Prints design statistics and returns the process exit code.
pub fn run(design: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(design);
    let settings = load_settings(global, path, &Overrides::default())?;
    let design = load_design(path)?;

    let sink = DiagnosticSink::new();
    let Some(region) = derive_region_or_report(&design, settings.region, &sink) else {
        render_diagnostics(&sink, global);
        return Ok(1);
    };
    let stats = collect(&design, region, &sink)?;
    render_diagnostics(&sink, global);

    println!("design:    {}", design.name);
    println!("region:    {region}");
    println!("cells:     {}", stats.cells);
    println!("instances: {}", stats.instances);
    println!("pads:      {}", stats.pads);
    println!("nets:      {} of {} declared", stats.nets, stats.declared_nets);
    Ok(0)
}
