//! System contracts consumed by the schemes.
//!
//! A system is anything exposing its dynamics as a vector field
//! `f(t, u) → du/dt`; plain closures qualify through a blanket impl.
//! Constrained mechanical systems additionally implement
//! [`NonHolonomic`], which derives the constraint residual, the
//! reaction force, and the partitioned splitting from a handful of
//! block accessors.

pub mod nonholonomic;


use crate::matrix::vector::Vector;
use crate::traits::LinalgScalar;

pub use nonholonomic::{NonHolonomic, SparkPart};

/// A dynamical system's vector field.
///
/// The sole required operation is the time derivative. Implicit schemes
/// additionally consult [`backward_residual`](Self::backward_residual),
/// which has a generic default; systems with a closed-form residual may
/// override it as a fast path.
///
/// # Example
///
/// ```
/// use odestep::{Vector, VectorField};
///
/// // Exponential decay, as a closure
/// let decay = |_t: f64, u: &Vector<f64, 1>| *u * (-1.0);
/// let du = decay.f(0.0, &Vector::from_array([2.0]));
/// assert_eq!(du[0], -2.0);
/// ```
pub trait VectorField<T: LinalgScalar, const N: usize> {
    /// Time derivative `du/dt` at `(t, u)`.
    fn f(&self, t: T::Real, u: &Vector<T, N>) -> Vector<T, N>;

    /// Residual of a backward-Euler update from `u0` to `u1` over `h`:
    /// `u1 - u0 - h·f(t1, u1)`, zero when `u1` is the implicit update.
    fn backward_residual(
        &self,
        t1: T::Real,
        u0: &Vector<T, N>,
        u1: &Vector<T, N>,
        h: T::Real,
    ) -> Vector<T, N> {
        *u1 - *u0 - self.f(t1, u1) * T::from_real(h)
    }
}

impl<T, const N: usize, F> VectorField<T, N> for F
where
    T: LinalgScalar,
    F: Fn(T::Real, &Vector<T, N>) -> Vector<T, N>,
{
    fn f(&self, t: T::Real, u: &Vector<T, N>) -> Vector<T, N> {
        self(t, u)
    }
}
