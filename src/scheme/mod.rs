//! One-step time-advance schemes.
//!
//! A [`Scheme`] turns the current `(t, u)` into `(t + h, u1)`. Schemes
//! own their step size `h` and whatever per-run accumulator state they
//! need; the outer loop owns the state vector and the clock.
//!
//! | Scheme | Update rule | Root-finding | Error control |
//! |---|---|---|---|
//! | [`ExplicitEuler`] | `u + h·f(t, u)` | no | none |
//! | [`ExplicitTrapezoidal`] | Heun predictor-corrector | no | none |
//! | [`ImplicitEuler`] | solves `u1 - u0 - h·f(t+h, u1) = 0` | yes, with fallback | none |
//! | [`RungeKutta4`] | 4-stage explicit | no | none |
//! | [`RungeKutta34`] | RK4 + embedded 3rd-order estimate | no | adaptive `h` |
//! | [`StiffAdapter`] | delegates to an external BDF stepper | external | external |
//!
//! Implicit schemes advance through the residual pipeline
//! ([`ResidualScheme`]): build a guess and a residual over `(t, u0, h)`,
//! solve with [`crate::rootfind::solve_with_fallback`], reconstruct the
//! increment, and accumulate it through compensated summation
//! ([`CompensatedSum`]) so thousands of small increments into a large
//! state do not drift.
//!
//! # Example
//!
//! ```
//! use odestep::{RungeKutta4, Scheme, Vector};
//!
//! // Harmonic oscillator: y'' = -y as [y, y']
//! let sys = |_t: f64, u: &Vector<f64, 2>| Vector::from_array([u[1], -u[0]]);
//! let mut scheme = RungeKutta4::with_stepsize(sys, 1e-3);
//!
//! let mut t = 0.0;
//! let mut u = Vector::from_array([1.0, 0.0]);
//! scheme.initialize(t, &u).unwrap();
//! while t < core::f64::consts::TAU {
//!     let (t1, u1) = scheme.step(t, &u).unwrap();
//!     t = t1;
//!     u = u1;
//! }
//! assert!((u[0] - 1.0).abs() < 1e-6);
//! ```

mod adaptive;
mod explicit;
mod implicit;
mod stiff;

#[cfg(test)]
mod tests;

use core::fmt;

use crate::matrix::vector::Vector;
use crate::rootfind::{solve_with_fallback, Residual, RootError, RootSettings};
use crate::traits::{LinalgScalar, Scalar};

pub use adaptive::RungeKutta34;
pub use explicit::{ExplicitEuler, ExplicitTrapezoidal, RungeKutta4};
pub use implicit::{BackwardEulerResidual, ImplicitEuler};
pub use stiff::{Bdf2, Bdf2Factory, StiffAdapter, StiffIntegrator, StiffSolverFactory, StiffVariant};

/// Step size used when a scheme is constructed without an explicit one.
pub const DEFAULT_STEPSIZE: f64 = 0.01;

/// Errors from advancing a scheme by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeError {
    /// Both root-finding strategies failed; the step cannot complete.
    RootSolve(RootError),
    /// `step` was called before `initialize`.
    NotInitialized,
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootSolve(err) => write!(f, "root solve failed: {err}"),
            Self::NotInitialized => write!(f, "scheme used before initialize()"),
        }
    }
}

impl From<RootError> for SchemeError {
    fn from(err: RootError) -> Self {
        Self::RootSolve(err)
    }
}

/// A pluggable rule for advancing system state by one time step.
///
/// Lifecycle: construct once per integration run, call
/// [`initialize`](Self::initialize) exactly once after the initial state
/// is known, then call [`step`](Self::step) repeatedly. The scheme never
/// retains a state vector across calls except through its roundoff
/// accumulator.
pub trait Scheme<T: LinalgScalar, const N: usize> {
    /// One-time setup: resets the roundoff accumulator and, for
    /// adapter-style schemes, binds external resources to `(t0, u0)`.
    fn initialize(&mut self, t0: T::Real, u0: &Vector<T, N>) -> Result<(), SchemeError>;

    /// Advance from `(t, u0)` to `(t + h, u1)`.
    fn step(&mut self, t: T::Real, u0: &Vector<T, N>)
        -> Result<(T::Real, Vector<T, N>), SchemeError>;

    /// Current step size.
    fn stepsize(&self) -> T::Real;

    /// Overwrite the step size for subsequent steps.
    fn set_stepsize(&mut self, h: T::Real);

    /// Adjust the step size from the last step's error estimate.
    ///
    /// No-op by default; adaptive schemes override.
    fn increment_stepsize(&mut self) {}
}

/// Compensated summation accumulator (Kahan-style).
///
/// Tracks the low-order bits lost when adding a small increment to a
/// much larger state, so that over thousands of steps the accumulated
/// state equals the true sum to full available precision.
///
/// The update per step is:
///
/// ```text
/// carry += du
/// u1 = u0 + carry
/// carry += u0 - u1
/// ```
///
/// Invariant: `u0 + carry` always recovers the compensated value even
/// though `u0` alone may have lost precision.
///
/// ```
/// use odestep::{CompensatedSum, Vector};
///
/// let mut acc = CompensatedSum::new();
/// let mut u = Vector::from_array([1.0_f64]);
/// for _ in 0..10_000 {
///     u = acc.advance(&u, &Vector::from_array([1e-16]));
/// }
/// // Naive summation would leave u at exactly 1.0.
/// assert!((u[0] + acc.carry()[0] - (1.0 + 1e-12)).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompensatedSum<T: Scalar, const N: usize> {
    carry: Vector<T, N>,
}

impl<T: Scalar, const N: usize> CompensatedSum<T, N> {
    /// Fresh accumulator with zero carry.
    pub fn new() -> Self {
        Self {
            carry: Vector::zeros(),
        }
    }

    /// Reset the carry to the zero of the state's additive group.
    ///
    /// Called exactly once per run, from `initialize()`.
    pub fn reset(&mut self) {
        self.carry = Vector::zeros();
    }

    /// Add `du` into `u0`, returning the compensated `u1`.
    pub fn advance(&mut self, u0: &Vector<T, N>, du: &Vector<T, N>) -> Vector<T, N> {
        self.carry += *du;
        let u1 = *u0 + self.carry;
        self.carry += *u0 - u1;
        u1
    }

    /// The current carry (the bits `u0` has lost).
    pub fn carry(&self) -> &Vector<T, N> {
        &self.carry
    }
}

impl<T: Scalar, const N: usize> Default for CompensatedSum<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Residual-driven schemes: advance by solving `r(x) = 0`.
///
/// The pipeline is fixed; schemes customize its pieces:
/// [`guess`](Self::guess) (additive identity by default),
/// [`residual`](Self::residual) (scheme-specific value object), and
/// [`reconstruct`](Self::reconstruct) (identity by default — override
/// when the root is the next state rather than the increment).
pub trait ResidualScheme<T: LinalgScalar, const N: usize> {
    /// The residual value object borrowed from this scheme for one step.
    type Res<'a>: Residual<T, N>
    where
        Self: 'a,
        T: 'a;

    /// Build the residual closure over `(t, u0, h)`.
    fn residual<'a>(&'a self, t: T::Real, u0: &'a Vector<T, N>, h: T::Real) -> Self::Res<'a>;

    /// Initial guess handed to the root finder; zero, sized like the
    /// state, unless overridden.
    fn guess(&self, _t: T::Real, _u0: &Vector<T, N>, _h: T::Real) -> Vector<T, N> {
        Vector::zeros()
    }

    /// Map a solved root back into a state increment.
    fn reconstruct(&self, root: Vector<T, N>, _u0: &Vector<T, N>) -> Vector<T, N> {
        root
    }

    /// Root-finder tolerances for this scheme.
    fn solver(&self) -> &RootSettings<T::Real>;

    /// Compute the state increment: guess → residual → direct solve
    /// with Newton fallback → reconstruct.
    fn delta(
        &self,
        t: T::Real,
        u0: &Vector<T, N>,
        h: T::Real,
    ) -> Result<(T::Real, Vector<T, N>), SchemeError> {
        let residual = self.residual(t, u0, h);
        let guess = self.guess(t, u0, h);
        let root = solve_with_fallback(&residual, &guess, self.solver())?;
        Ok((t + h, self.reconstruct(root.x, u0)))
    }
}
