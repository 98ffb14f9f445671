//! Settings resolution: merging command-line overrides onto a configuration.

use crate::error::ConfigError;
use crate::loader::validate_config;
use crate::types::{QplaceConfig, SolveMode};
use qplace_common::Rect;

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Overrides `placer.partition_depth`.
    pub partition_depth: Option<u32>,
    /// Overrides `placer.seed`.
    pub seed: Option<u64>,
    /// Overrides `placer.solve_mode`.
    pub solve_mode: Option<SolveMode>,
}

/// Fully resolved placer settings with overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    /// Quadrisection depth.
    pub partition_depth: u32,
    /// GPU request (inert).
    pub use_gpu: bool,
    /// Global solve organization.
    pub solve_mode: SolveMode,
    /// Placement grid pitch.
    pub grid: i64,
    /// RNG seed for initial guesses.
    pub seed: Option<u64>,
    /// Conjugate-gradient iteration cap.
    pub max_iterations: usize,
    /// Conjugate-gradient residual tolerance.
    pub tolerance: f32,
    /// Region override.
    pub region: Option<Rect>,
}

/// Resolves the final settings from a configuration and overrides.
///
/// Overrides replace file values field by field; the merged result is
/// validated again so overrides cannot bypass range checks.
pub fn resolve_settings(
    config: &QplaceConfig,
    overrides: &Overrides,
) -> Result<ResolvedSettings, ConfigError> {
    let mut merged = config.clone();
    if let Some(depth) = overrides.partition_depth {
        merged.placer.partition_depth = depth;
    }
    if let Some(seed) = overrides.seed {
        merged.placer.seed = Some(seed);
    }
    if let Some(mode) = overrides.solve_mode {
        merged.placer.solve_mode = mode;
    }
    validate_config(&merged)?;

    Ok(ResolvedSettings {
        partition_depth: merged.placer.partition_depth,
        use_gpu: merged.placer.use_gpu,
        solve_mode: merged.placer.solve_mode,
        grid: merged.placer.grid,
        seed: merged.placer.seed,
        max_iterations: merged.solver.max_iterations,
        tolerance: merged.solver.tolerance,
        region: merged.region,
    })
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        let config = QplaceConfig::default();
        Self {
            partition_depth: config.placer.partition_depth,
            use_gpu: config.placer.use_gpu,
            solve_mode: config.placer.solve_mode,
            grid: config.placer.grid,
            seed: config.placer.seed,
            max_iterations: config.solver.max_iterations,
            tolerance: config.solver.tolerance,
            region: config.region,
        }
    }
}
