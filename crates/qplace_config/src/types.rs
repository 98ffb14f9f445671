//! Configuration types deserialized from `qplace.toml`.

use qplace_common::Rect;
use serde::Deserialize;

/// Default conjugate-gradient iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default absolute residual-norm tolerance.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

/// The top-level configuration parsed from `qplace.toml`.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QplaceConfig {
    /// Placement flow settings.
    #[serde(default)]
    pub placer: PlacerConfig,
    /// Linear solver settings.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Optional override of the placement region, in database units.
    #[serde(default)]
    pub region: Option<Rect>,
}

/// Placement flow settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    /// Quadrisection depth; 0 and 1 run only the global solve.
    pub partition_depth: u32,
    /// Requests GPU execution. Accepted for compatibility and otherwise ignored.
    pub use_gpu: bool,
    /// How the global solve is organized.
    pub solve_mode: SolveMode,
    /// Placement grid pitch in database units that final origins snap to.
    pub grid: i64,
    /// Seed for the solver's initial guess; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            partition_depth: 0,
            use_gpu: false,
            solve_mode: SolveMode::default(),
            grid: 1,
            seed: None,
        }
    }
}

/// Organization of the global solve.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    /// One linear system over every movable instance (default).
    #[default]
    Whole,
    /// One linear system per connected group of nets.
    NetGroups,
}

/// Conjugate-gradient solver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap per solve.
    pub max_iterations: usize,
    /// Absolute residual-norm tolerance.
    pub tolerance: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
