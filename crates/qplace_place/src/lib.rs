//! Quadratic placement engine.
//!
//! Movable instances are placed by minimizing squared wire length under a
//! clique net model. The engine builds a sparse system from the netlist,
//! solves it per axis with conjugate gradient, and then recursively
//! quadrisects the core region so each sub-problem stays small.
//!
//! # Pipeline
//!
//! 1. **Region**: explicit override, placement rows, core box or core polygon
//! 2. **Graph**: movable instances, fixed pins as pads, nets
//! 3. **Global solve**: one system over all instances (or per net group)
//! 4. **Quadrisection**: halves and quadrants re-solved with virtual pads
//! 5. **Finalize**: grid-aligned origins written back, status `Placed`
//!
//! # Usage
//!
//! ```ignore
//! use qplace_place::{quadratic_place, Design};
//!
//! let mut design = Design::from_json(&text)?;
//! let report = quadratic_place(&mut design, &settings, &sink)?;
//! println!("placed {} instances", report.placed);
//! ```

#![warn(missing_docs)]

pub mod db;
pub mod design;
pub mod graph;
pub mod ids;
pub mod partition;
pub mod placer;
pub mod solver;
pub mod weights;

pub use db::{
    build_graph, derive_region, derive_region_or_report, finalize, ChipDatabase, FixedPin,
    MovableInstance, PlaceStatus, PlacedInstance,
};
pub use design::{Cell, CellPin, Design, DesignError, IoPin};
pub use graph::{ConnectedGroup, GraphError, PlacementGraph, MAX_NET_DEGREE};
pub use ids::{CellId, InstanceId, NetId, NodeId, PadId};
pub use placer::{Phase, PlacementStats, PlacerOptions, QuadraticPlacer, SolveOutcome};
pub use solver::{mat_vec, CgSolution, ConjugateGradient};

use std::time::{Duration, Instant};

use qplace_common::{PlaceResult, Rect};
use qplace_config::ResolvedSettings;
use qplace_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Note emitted when GPU execution is requested.
pub const GPU_UNAVAILABLE: DiagnosticCode = DiagnosticCode::new(Category::Note, 2);

/// Summary of one placement run.
#[derive(Debug, Clone, Default)]
pub struct PlacementReport {
    /// Region that was placed into, if one could be derived.
    pub region: Option<Rect>,
    /// Instances whose origin was written back.
    pub placed: usize,
    /// Solver and partition counters.
    pub stats: PlacementStats,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Places every connected movable instance of `db`.
///
/// Design problems such as a missing core region are reported to `sink` and
/// leave the database untouched; `Err` means an internal bug.
pub fn quadratic_place(
    db: &mut dyn ChipDatabase,
    settings: &ResolvedSettings,
    sink: &DiagnosticSink,
) -> PlaceResult<PlacementReport> {
    let start = Instant::now();
    let mut report = PlacementReport::default();

    let Some(region) = derive_region_or_report(&*db, settings.region, sink) else {
        report.elapsed = start.elapsed();
        return Ok(report);
    };
    report.region = Some(region);

    if settings.use_gpu {
        sink.emit(
            Diagnostic::note(GPU_UNAVAILABLE, "GPU placement requested; running on the CPU")
                .with_note("the use_gpu setting has no effect"),
        );
    }

    let (mut graph, placed) = build_graph(&*db, region, sink)?;
    let mut placer = QuadraticPlacer::new(PlacerOptions::from(settings), sink);
    placer.run(&mut graph)?;

    report.placed = finalize(db, &graph, &placed, region, settings.grid)?;
    report.stats = placer.stats().clone();
    report.elapsed = start.elapsed();
    Ok(report)
}
