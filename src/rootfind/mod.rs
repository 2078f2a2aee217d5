//! Nonlinear root finding for implicit time steps.
//!
//! Residuals are small value objects implementing [`Residual`]; plain
//! closures `Fn(&Vector) -> Vector` work too. Two interchangeable
//! strategies share one signature:
//!
//! - [`broyden`] — quasi-Newton direct solve: one finite-difference
//!   Jacobian up front, rank-1 secant updates thereafter. Fast when it
//!   converges, but may fail on poorly scaled or non-smooth residuals.
//! - [`newton`] — classical Newton iteration: a fresh forward-difference
//!   Jacobian every iteration, solved via LU.
//!
//! [`solve_with_fallback`] encodes the policy used by the implicit
//! schemes: try the direct solve first, and on any failure retry with
//! Newton on the same residual and guess. A Newton failure is final.
//!
//! # Example
//!
//! ```
//! use odestep::rootfind::{newton, RootSettings};
//! use odestep::Vector;
//!
//! // Intersection of the unit circle with y = x: root at (√½, √½)
//! let r = |x: &Vector<f64, 2>| {
//!     Vector::from_array([x[0] * x[0] + x[1] * x[1] - 1.0, x[0] - x[1]])
//! };
//! let guess = Vector::from_array([1.0, 0.5]);
//! let root = newton(&r, &guess, &RootSettings::default()).unwrap();
//! assert!((root.x[0] - 0.5_f64.sqrt()).abs() < 1e-10);
//! ```

mod broyden;
mod newton;


use core::fmt;

use num_traits::{Float, One};

use crate::matrix::vector::Vector;
use crate::traits::LinalgScalar;
use crate::Matrix;

pub use broyden::broyden;
pub use newton::newton;

/// A residual function: zero at the desired implicit update.
///
/// Implementations capture the step-local context (time, base state,
/// step size, governing vector field) at construction and must be pure
/// functions of `x` — evaluation order never changes the result.
pub trait Residual<T: LinalgScalar, const N: usize> {
    /// Evaluate the residual at a candidate root.
    fn eval(&self, x: &Vector<T, N>) -> Vector<T, N>;
}

impl<T, const N: usize, F> Residual<T, N> for F
where
    T: LinalgScalar,
    F: Fn(&Vector<T, N>) -> Vector<T, N>,
{
    fn eval(&self, x: &Vector<T, N>) -> Vector<T, N> {
        self(x)
    }
}

/// Errors from the root-finding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootError {
    /// Iteration budget exhausted without meeting the tolerance.
    MaxIterations,
    /// The (approximate) Jacobian became singular.
    Singular,
    /// A residual evaluation or iterate was NaN or infinite.
    NotFinite,
}

impl fmt::Display for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxIterations => write!(f, "maximum iterations exceeded"),
            Self::Singular => write!(f, "singular Jacobian"),
            Self::NotFinite => write!(f, "residual is not finite"),
        }
    }
}

/// Settings for the root-finding strategies.
#[derive(Debug, Clone, Copy)]
pub struct RootSettings<T> {
    /// Convergence tolerance on the residual norm `‖r(x)‖`.
    pub f_tol: T,
    /// Convergence tolerance on the update norm `‖Δx‖`.
    pub x_tol: T,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for RootSettings<f64> {
    fn default() -> Self {
        Self {
            f_tol: 1e-10,
            x_tol: 1e-12,
            max_iter: 100,
        }
    }
}

impl Default for RootSettings<f32> {
    fn default() -> Self {
        Self {
            f_tol: 1e-5,
            x_tol: 1e-6,
            max_iter: 100,
        }
    }
}

/// Result of a successful root solve.
#[derive(Debug, Clone, Copy)]
pub struct RootResult<T: LinalgScalar, const N: usize> {
    /// Approximate root.
    pub x: Vector<T, N>,
    /// Residual at the root.
    pub fx: Vector<T, N>,
    /// Residual norm at the root.
    pub residual_norm: T::Real,
    /// Iterations performed.
    pub iterations: usize,
    /// Residual evaluations performed.
    pub evals: usize,
}

/// Forward-difference Jacobian of a residual.
///
/// Perturbs each component by `√ε · max(|xⱼ|, 1)` along the real axis,
/// reusing `fx = r(x)` supplied by the caller. Costs `N` evaluations.
pub fn fd_jacobian<T: LinalgScalar, const N: usize>(
    residual: &impl Residual<T, N>,
    x: &Vector<T, N>,
    fx: &Vector<T, N>,
) -> Matrix<T, N, N> {
    let sqrt_eps = T::lepsilon().sqrt();
    let one = T::Real::one();
    let mut jac = Matrix::<T, N, N>::zeros();

    for j in 0..N {
        let xj_mod = x[j].modulus();
        let hj = sqrt_eps * if xj_mod > one { xj_mod } else { one };
        let mut x_pert = *x;
        x_pert[j] = x_pert[j] + T::from_real(hj);
        let f_pert = residual.eval(&x_pert);
        let inv_hj = T::from_real(one / hj);
        for i in 0..N {
            jac[(i, j)] = (f_pert[i] - fx[i]) * inv_hj;
        }
    }

    jac
}

/// Solve a residual with the direct strategy, falling back to Newton.
///
/// The first strategy's failure kind is logged but not inspected; the
/// retry always runs Newton on the same residual and initial guess. A
/// Newton failure propagates to the caller — the step cannot complete.
pub fn solve_with_fallback<T: LinalgScalar, const N: usize>(
    residual: &impl Residual<T, N>,
    guess: &Vector<T, N>,
    settings: &RootSettings<T::Real>,
) -> Result<RootResult<T, N>, RootError> {
    match broyden(residual, guess, settings) {
        Ok(result) => Ok(result),
        Err(err) => {
            log::info!("direct solve failed ({err}), switching nonlinear solver");
            newton(residual, guess, settings)
        }
    }
}
