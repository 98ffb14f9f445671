//! The quadratic placer: global solve followed by recursive quadrisection.
//!
//! The global solve places every instance against the fixed pads. With a
//! partition depth above one, the region is then cut into halves and
//! quadrants; each part is re-solved in a sub-graph whose outside
//! connections are replaced by virtual pads, and the four quadrants recurse
//! two levels deeper.

use std::collections::{BTreeSet, HashSet};

use qplace_common::{PlaceResult, Region};
use qplace_config::{ResolvedSettings, SolveMode};
use qplace_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::graph::PlacementGraph;
use crate::ids::{InstanceId, NetId};
use crate::partition::{assign, build_subgraph, Cut, CutAxis, CutSide};
use crate::solver::ConjugateGradient;
use crate::weights::assemble;

/// Note emitted when a solve is skipped for lack of connectivity.
pub const SOLVE_SKIPPED: DiagnosticCode = DiagnosticCode::new(Category::Note, 101);

/// Note emitted when sub-region results cannot be written back.
pub const WRITE_REJECTED: DiagnosticCode = DiagnosticCode::new(Category::Note, 102);

/// Where the placer is in its run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Solving the whole problem once.
    GlobalSolve,
    /// Working on partitions at the given depth.
    Partitioning {
        /// Current recursion depth.
        depth: u32,
    },
    /// Finished.
    Done,
}

/// Whether a solve produced coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveOutcome {
    /// New coordinates were written.
    Solved,
    /// Nothing to solve; coordinates are unchanged.
    Skipped,
}

/// Placer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacerOptions {
    /// Quadrisection depth; 0 or 1 disables partitioning.
    pub partition_depth: u32,
    /// How the global solve is split up.
    pub solve_mode: SolveMode,
    /// CG settings for every solve.
    pub solver: ConjugateGradient,
    /// Fixed seed for the initial guesses, or `None` for entropy.
    pub seed: Option<u64>,
}

impl Default for PlacerOptions {
    fn default() -> Self {
        Self {
            partition_depth: 0,
            solve_mode: SolveMode::Whole,
            solver: ConjugateGradient::default(),
            seed: None,
        }
    }
}

impl From<&ResolvedSettings> for PlacerOptions {
    fn from(settings: &ResolvedSettings) -> Self {
        Self {
            partition_depth: settings.partition_depth,
            solve_mode: settings.solve_mode,
            solver: ConjugateGradient {
                max_iterations: settings.max_iterations,
                tolerance: settings.tolerance,
            },
            seed: settings.seed,
        }
    }
}

/// Counters collected while placing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlacementStats {
    /// Solves that produced coordinates.
    pub solves: usize,
    /// Solves skipped for lack of connectivity.
    pub skipped_solves: usize,
    /// Axis solves that stopped without converging, each reported as
    /// `W301` (iteration cap) or `N103` (no curvature).
    pub non_converged: usize,
    /// Partition nodes visited.
    pub partitions: usize,
    /// Deepest partition level visited.
    pub max_depth: u32,
    /// Sub-region write-backs that were rejected.
    pub rejected_writes: usize,
}

/// Drives global and partitioned solves over a [`PlacementGraph`].
pub struct QuadraticPlacer<'s> {
    options: PlacerOptions,
    rng: StdRng,
    sink: &'s DiagnosticSink,
    phase: Phase,
    stats: PlacementStats,
}

impl<'s> QuadraticPlacer<'s> {
    /// Creates a placer that reports into `sink`.
    pub fn new(options: PlacerOptions, sink: &'s DiagnosticSink) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            options,
            rng,
            sink,
            phase: Phase::GlobalSolve,
            stats: PlacementStats::default(),
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the counters collected so far.
    pub fn stats(&self) -> &PlacementStats {
        &self.stats
    }

    /// Runs the global solve and then the partitioning passes.
    pub fn run(&mut self, graph: &mut PlacementGraph) -> PlaceResult<()> {
        self.phase = Phase::GlobalSolve;
        self.global_solve(graph)?;
        self.place_partitions(graph)?;
        self.phase = Phase::Done;
        Ok(())
    }

    /// Solves the whole graph according to the configured solve mode.
    pub fn global_solve(&mut self, graph: &mut PlacementGraph) -> PlaceResult<SolveOutcome> {
        match self.options.solve_mode {
            SolveMode::Whole => self.solve_graph(graph),
            SolveMode::NetGroups => self.solve_net_groups(graph),
        }
    }

    /// Solves every instance of `graph` against all of its pads.
    pub fn solve_graph(&mut self, graph: &mut PlacementGraph) -> PlaceResult<SolveOutcome> {
        let instances = graph.instance_ids();
        let nets = graph.net_ids();
        let has_pads = graph.pad_count() > 0;
        self.solve_scope(graph, &instances, &nets, has_pads)
    }

    /// Solves each connected net group with more than one instance on its own.
    fn solve_net_groups(&mut self, graph: &mut PlacementGraph) -> PlaceResult<SolveOutcome> {
        let mut visited: HashSet<NetId> = HashSet::new();
        let mut outcome = SolveOutcome::Skipped;

        for net in graph.net_ids() {
            if visited.contains(&net) {
                continue;
            }
            let group = graph.collect_connected_group(net);
            visited.insert(net);
            visited.extend(group.nets.iter().copied());
            if group.instances.len() <= 1 {
                continue;
            }
            let instances: Vec<InstanceId> = group.instances.iter().copied().collect();
            let nets: Vec<NetId> = group.nets.iter().copied().collect();
            if self.solve_scope(graph, &instances, &nets, !group.pads.is_empty())?
                == SolveOutcome::Solved
            {
                outcome = SolveOutcome::Solved;
            }
        }
        Ok(outcome)
    }

    fn solve_scope(
        &mut self,
        graph: &mut PlacementGraph,
        instances: &[InstanceId],
        nets: &[NetId],
        has_pads: bool,
    ) -> PlaceResult<SolveOutcome> {
        let region = graph.region();
        if instances.is_empty() || nets.is_empty() || !has_pads {
            self.skip(format!(
                "{} instances, {} nets{} in {region}",
                instances.len(),
                nets.len(),
                if has_pads { "" } else { " and no pads" }
            ));
            return Ok(SolveOutcome::Skipped);
        }

        let keys: Vec<InstanceId> = {
            let mut seen = HashSet::with_capacity(instances.len());
            instances.iter().copied().filter(|id| seen.insert(*id)).collect()
        };
        let assembly = assemble(graph, &keys, nets);
        if assembly.is_degenerate() {
            self.skip(format!(
                "no net connects the {} instances in {region}",
                keys.len()
            ));
            return Ok(SolveOutcome::Skipped);
        }

        let cg = self.options.solver;
        let sx = cg.solve(
            &assembly.matrix,
            &assembly.bx,
            Some((region.llx, region.urx)),
            &mut self.rng,
            self.sink,
        )?;
        let sy = cg.solve(
            &assembly.matrix,
            &assembly.by,
            Some((region.lly, region.ury)),
            &mut self.rng,
            self.sink,
        )?;
        self.stats.non_converged += usize::from(!sx.converged) + usize::from(!sy.converged);

        let (mut xs, mut ys) = (sx.x, sy.x);
        if !assembly.floating.is_empty() {
            let floating: BTreeSet<InstanceId> = assembly.floating.iter().copied().collect();
            let (cx, cy) = region.center();
            for (k, id) in keys.iter().enumerate() {
                if floating.contains(id) {
                    xs[k] = cx;
                    ys[k] = cy;
                }
            }
        }

        graph.set_locations(xs.as_slice(), ys.as_slice(), &keys)?;
        self.stats.solves += 1;
        Ok(SolveOutcome::Solved)
    }

    fn skip(&mut self, detail: String) {
        self.stats.skipped_solves += 1;
        self.sink.emit(Diagnostic::note(
            SOLVE_SKIPPED,
            format!("solve skipped: {detail}"),
        ));
    }

    /// Runs quadrisection over all instances when the depth asks for it.
    pub fn place_partitions(&mut self, graph: &mut PlacementGraph) -> PlaceResult<()> {
        if self.options.partition_depth > 1 {
            let all = graph.instance_ids();
            let region = graph.region();
            self.place(graph, &all, region, 1)?;
        }
        Ok(())
    }

    fn place(
        &mut self,
        graph: &mut PlacementGraph,
        set: &[InstanceId],
        region: Region,
        depth: u32,
    ) -> PlaceResult<()> {
        if depth >= self.options.partition_depth || set.is_empty() {
            return Ok(());
        }
        self.phase = Phase::Partitioning { depth };
        self.stats.partitions += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let (left, right) = assign(graph, set, CutAxis::X);
        let (left_box, right_box) = region.split_x();
        let left_xy = self.contain_and_solve(graph, &left, left_box, Cut::new(CutAxis::X, CutSide::Lower))?;
        let right_xy = self.contain_and_solve(graph, &right, right_box, Cut::new(CutAxis::X, CutSide::Upper))?;
        self.write_back(graph, &left, left_xy);
        self.write_back(graph, &right, right_xy);

        let mut quadrants = Vec::with_capacity(4);
        let mut solved = Vec::with_capacity(4);
        for (half, half_box) in [(left, left_box), (right, right_box)] {
            let (bottom, top) = assign(graph, &half, CutAxis::Y);
            let (bottom_box, top_box) = half_box.split_y();
            let bottom_xy = self.contain_and_solve(graph, &bottom, bottom_box, Cut::new(CutAxis::Y, CutSide::Lower))?;
            let top_xy = self.contain_and_solve(graph, &top, top_box, Cut::new(CutAxis::Y, CutSide::Upper))?;
            solved.push(bottom_xy);
            solved.push(top_xy);
            quadrants.push((bottom, bottom_box));
            quadrants.push((top, top_box));
        }
        for ((quadrant, _), xy) in quadrants.iter().zip(solved) {
            self.write_back(graph, quadrant, xy);
        }

        for (quadrant, quadrant_box) in &quadrants {
            self.place(graph, quadrant, *quadrant_box, depth + 2)?;
        }
        Ok(())
    }

    /// Solves one half in isolation and returns its new coordinates.
    ///
    /// Returns `None` when the half is empty or its solve was skipped.
    fn contain_and_solve(
        &mut self,
        parent: &PlacementGraph,
        half: &[InstanceId],
        region: Region,
        cut: Cut,
    ) -> PlaceResult<Option<(Vec<f32>, Vec<f32>)>> {
        if half.is_empty() {
            return Ok(None);
        }
        let mut sub = build_subgraph(parent, half, region, cut)?;
        match self.solve_graph(&mut sub)? {
            SolveOutcome::Solved => Ok(Some(sub.locations(half)?)),
            SolveOutcome::Skipped => Ok(None),
        }
    }

    fn write_back(
        &mut self,
        graph: &mut PlacementGraph,
        keys: &[InstanceId],
        coords: Option<(Vec<f32>, Vec<f32>)>,
    ) {
        let Some((xs, ys)) = coords else {
            return;
        };
        if let Err(err) = graph.set_locations(&xs, &ys, keys) {
            self.stats.rejected_writes += 1;
            self.sink.emit(
                Diagnostic::note(
                    WRITE_REJECTED,
                    format!("sub-region result for {} instances not applied", keys.len()),
                )
                .with_note(err.to_string()),
            );
        }
    }
}
