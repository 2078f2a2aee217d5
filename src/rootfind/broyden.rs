use num_traits::{Float, One};

use super::{fd_jacobian, Residual, RootError, RootResult, RootSettings};
use crate::linalg::{lu_in_place, lu_solve};
use crate::matrix::vector::Vector;
use crate::traits::LinalgScalar;

/// Quasi-Newton direct solve (Broyden's good method).
///
/// One forward-difference Jacobian is computed at the initial guess;
/// after each step the approximation is corrected with the rank-1
/// secant update
///
/// ```text
/// J ← J + r(x₁) ⊗ conj(Δx) / ‖Δx‖²
/// ```
///
/// (using `J Δx = -r(x₀)` to simplify the numerator). This avoids the
/// `N` evaluations per iteration that full Newton pays, at the cost of
/// robustness: a stale secant approximation can go singular or stall on
/// residuals that Newton handles from the same guess.
pub fn broyden<T: LinalgScalar, const N: usize>(
    residual: &impl Residual<T, N>,
    guess: &Vector<T, N>,
    settings: &RootSettings<T::Real>,
) -> Result<RootResult<T, N>, RootError> {
    let mut x = *guess;
    let mut fx = residual.eval(&x);
    let mut evals = 1usize;

    let mut jac = fd_jacobian(residual, &x, &fx);
    evals += N;

    for iter in 0..settings.max_iter {
        let norm = fx.norm();
        if !norm.is_finite() {
            return Err(RootError::NotFinite);
        }
        if norm < settings.f_tol {
            return Ok(RootResult {
                x,
                fx,
                residual_norm: norm,
                iterations: iter,
                evals,
            });
        }

        let mut lu = jac;
        let mut perm = [0usize; N];
        if lu_in_place(&mut lu, &mut perm).is_err() {
            return Err(RootError::Singular);
        }
        let dx = lu_solve(&lu, &perm, &(-fx));
        if !dx.is_finite() {
            return Err(RootError::NotFinite);
        }

        let x1 = x + dx;
        let fx1 = residual.eval(&x1);
        evals += 1;

        let dx_norm2 = dx.norm_squared();
        if dx_norm2 < T::Real::epsilon() * T::Real::epsilon() {
            // Update direction collapsed; the secant history is spent.
            return Err(RootError::Singular);
        }

        // Secant correction: with J Δx = -r(x₀), the numerator
        // r(x₁) - r(x₀) - J Δx reduces to r(x₁).
        jac = jac + fx1.outer(&dx.conj()) * T::from_real(T::Real::one() / dx_norm2);

        x = x1;
        fx = fx1;

        if dx.norm() < settings.x_tol {
            let norm = fx.norm();
            if !norm.is_finite() {
                return Err(RootError::NotFinite);
            }
            if norm < settings.f_tol {
                return Ok(RootResult {
                    x,
                    fx,
                    residual_norm: norm,
                    iterations: iter + 1,
                    evals,
                });
            }
        }
    }

    Err(RootError::MaxIterations)
}
