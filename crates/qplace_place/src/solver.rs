//! Sparse matrix-vector products and the conjugate-gradient solver.
//!
//! The placement matrix is symmetric positive (semi-)definite, so plain
//! unpreconditioned CG is enough. Everything runs in single precision with an
//! absolute residual-norm stopping rule.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use qplace_common::{InternalError, PlaceResult};
use qplace_config::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use qplace_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use rand::Rng;

/// Warning emitted when CG stops at the iteration cap.
pub const CG_NOT_CONVERGED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);

/// Note emitted when CG stops early on a direction without curvature.
pub const CG_STALLED: DiagnosticCode = DiagnosticCode::new(Category::Note, 103);

/// Computes `y = A * x`, overwriting `y`.
pub fn mat_vec(a: &CsrMatrix<f32>, x: &DVector<f32>, y: &mut DVector<f32>) {
    *y = a * x;
}

/// The result of one conjugate-gradient solve.
#[derive(Debug, Clone)]
pub struct CgSolution {
    /// The solution vector.
    pub x: DVector<f32>,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the residual norm dropped below the tolerance.
    pub converged: bool,
    /// Final residual norm `||b - A x||`.
    pub residual: f32,
}

/// Conjugate-gradient settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjugateGradient {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Absolute tolerance on the residual norm.
    pub tolerance: f32,
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ConjugateGradient {
    /// Solves `A x = b`.
    ///
    /// The initial guess is drawn uniformly from `range` when given, else from
    /// `[0, 1)`. Hitting the iteration cap is not an error: a `W301` warning
    /// is emitted and the current iterate is returned.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        a: &CsrMatrix<f32>,
        b: &DVector<f32>,
        range: Option<(f32, f32)>,
        rng: &mut R,
        sink: &DiagnosticSink,
    ) -> PlaceResult<CgSolution> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(InternalError::new(format!(
                "conjugate gradient needs a square matrix, got {n}x{}",
                a.ncols()
            )));
        }
        if b.len() != n {
            return Err(InternalError::new(format!(
                "right-hand side has {} entries for a {n}x{n} matrix",
                b.len()
            )));
        }

        let mut x = initial_guess(n, range, rng);
        let mut ap = DVector::zeros(n);
        mat_vec(a, &x, &mut ap);
        let mut r = b - &ap;
        let mut p = r.clone();
        let mut rnorm_old = r.norm_squared();

        let mut iterations = 0;
        let mut converged = rnorm_old.sqrt() < self.tolerance;
        let mut stalled = false;

        while !converged && iterations < self.max_iterations {
            mat_vec(a, &p, &mut ap);
            let p_ap = p.dot(&ap);
            if !(p_ap.is_finite() && p_ap > 0.0) {
                stalled = true;
                break;
            }
            let alpha = rnorm_old / p_ap;
            x.axpy(alpha, &p, 1.0);
            r.axpy(-alpha, &ap, 1.0);
            iterations += 1;

            let rnorm = r.norm_squared();
            if rnorm.sqrt() < self.tolerance {
                rnorm_old = rnorm;
                converged = true;
                break;
            }

            // p = r + beta * p
            p.axpy(1.0, &r, rnorm / rnorm_old);
            rnorm_old = rnorm;
        }

        let residual = rnorm_old.sqrt();
        if stalled {
            sink.emit(
                Diagnostic::note(
                    CG_STALLED,
                    format!("conjugate gradient stopped after {iterations} iterations"),
                )
                .with_note(format!(
                    "search direction has no positive curvature; residual norm {residual:e} for a {n}x{n} system"
                )),
            );
        } else if !converged {
            sink.emit(
                Diagnostic::warning(
                    CG_NOT_CONVERGED,
                    format!(
                        "conjugate gradient reached the iteration cap of {}",
                        self.max_iterations
                    ),
                )
                .with_note(format!(
                    "residual norm {residual:e} for a {n}x{n} system; the approximate solution is used"
                ))
                .with_help("raise solver.max_iterations or loosen solver.tolerance"),
            );
        }

        Ok(CgSolution {
            x,
            iterations,
            converged,
            residual,
        })
    }
}

fn initial_guess<R: Rng + ?Sized>(
    n: usize,
    range: Option<(f32, f32)>,
    rng: &mut R,
) -> DVector<f32> {
    match range {
        Some((lo, hi)) => {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            DVector::from_iterator(
                n,
                (0..n).map(|_| if lo < hi { rng.gen_range(lo..=hi) } else { lo }),
            )
        }
        None => DVector::from_iterator(n, (0..n).map(|_| rng.gen::<f32>())),
    }
}
