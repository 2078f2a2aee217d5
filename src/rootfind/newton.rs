use num_traits::Float;

use super::{fd_jacobian, Residual, RootError, RootResult, RootSettings};
use crate::linalg::{lu_in_place, lu_solve};
use crate::matrix::vector::Vector;
use crate::traits::LinalgScalar;

/// Classical Newton iteration on a vector residual.
///
/// Each iteration estimates the Jacobian by forward differences,
/// LU-solves the linearized residual `J Δx = -r(x)`, and applies the
/// full update. Converges when the residual norm drops below
/// `settings.f_tol` (or the update norm below `settings.x_tol`).
///
/// # Errors
///
/// [`RootError::Singular`] if the Jacobian cannot be factorized,
/// [`RootError::NotFinite`] on NaN/Inf residuals, and
/// [`RootError::MaxIterations`] when the budget runs out.
pub fn newton<T: LinalgScalar, const N: usize>(
    residual: &impl Residual<T, N>,
    guess: &Vector<T, N>,
    settings: &RootSettings<T::Real>,
) -> Result<RootResult<T, N>, RootError> {
    let mut x = *guess;
    let mut fx = residual.eval(&x);
    let mut evals = 1usize;

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

        let mut jac = fd_jacobian(residual, &x, &fx);
        evals += N;

        let mut perm = [0usize; N];
        if lu_in_place(&mut jac, &mut perm).is_err() {
            return Err(RootError::Singular);
        }
        let dx = lu_solve(&jac, &perm, &(-fx));

        x = x + dx;
        fx = residual.eval(&x);
        evals += 1;

        if dx.norm() < settings.x_tol {
            let norm = fx.norm();
            if !norm.is_finite() {
                return Err(RootError::NotFinite);
            }
            return Ok(RootResult {
                x,
                fx,
                residual_norm: norm,
                iterations: iter + 1,
                evals,
            });
        }
    }

    Err(RootError::MaxIterations)
}
