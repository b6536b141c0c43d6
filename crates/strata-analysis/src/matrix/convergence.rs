//! Power iteration on matrices and distributions.
//!
//! Both computations stop when the L1 distance between consecutive iterates
//! drops below `epsilon`, or after `max_iter` steps. Hitting the cap is not an
//! error: the best-effort value is returned with `converged = false`. The cap
//! is what guarantees termination on chains whose powers oscillate (periodic
//! classes never satisfy the distance criterion).

use nalgebra::RowDVector;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::{Matrix, MatrixError, l1};

/// Result of an iterative computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Convergence<T> {
    /// Last iterate.
    pub value: T,
    /// Number of multiplication steps performed.
    pub iterations: usize,
    /// Whether the stopping criterion was met before the iteration cap.
    pub converged: bool,
    /// L1 distance between the last two iterates (`f64::INFINITY` if no step ran).
    pub residual: f64,
}

/// Raise `base` to successive powers until they stabilize.
///
/// Starting from `base`, each step right-multiplies the current matrix by
/// `base`. After `k` steps the value is `base^(k+1)`.
#[must_use]
#[instrument(skip(base), fields(size = base.size()))]
pub fn converge_powers(base: &Matrix, epsilon: f64, max_iter: usize) -> Convergence<Matrix> {
    let mut current = base.clone();
    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    let mut converged = false;

    for _ in 0..max_iter {
        iterations += 1;

        let next = current.product(base);
        residual = current.distance(&next);
        current = next;

        if residual < epsilon {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations, residual, "matrix powers converged");
    } else {
        warn!(max_iter, residual, "matrix powers did not converge");
    }

    Convergence {
        value: current,
        iterations,
        converged,
        residual,
    }
}

/// Iterate `p ← p · matrix` from `initial` until the distribution stabilizes.
///
/// The matrix may be sub-stochastic (a class's submatrix when probability
/// can leave the class); the returned vector's total mass then decays below 1.
///
/// # Errors
///
/// Returns [`MatrixError::VectorLength`] if `initial` does not match the
/// matrix size.
#[instrument(skip(matrix, initial), fields(size = matrix.size()))]
pub fn stationary_distribution(
    matrix: &Matrix,
    initial: &[f64],
    epsilon: f64,
    max_iter: usize,
) -> Result<Convergence<Vec<f64>>, MatrixError> {
    if initial.len() != matrix.size() {
        return Err(MatrixError::VectorLength {
            len: initial.len(),
            size: matrix.size(),
        });
    }

    let mut p = RowDVector::from_row_slice(initial);
    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    let mut converged = false;

    for _ in 0..max_iter {
        iterations += 1;

        let next = &p * &matrix.data;
        residual = l1(p.iter(), next.iter());
        p = next;

        if residual < epsilon {
            converged = true;
            break;
        }
    }

    if !converged {
        debug!(max_iter, residual, "distribution did not converge");
    }

    Ok(Convergence {
        value: p.iter().copied().collect(),
        iterations,
        converged,
        residual,
    })
}

/// Uniform distribution over `size` states (empty for `size = 0`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn uniform(size: usize) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    vec![1.0 / size as f64; size]
}
