use super::{Scheme, SchemeError, DEFAULT_STEPSIZE};
use crate::matrix::vector::Vector;
use crate::system::VectorField;
use crate::traits::{FloatScalar, LinalgScalar};

/// Adaptive Runge-Kutta of order 4 with an embedded 3rd-order estimate.
///
/// Each step evaluates the four classic RK4 stages plus one extra stage
/// `Z3`; the weighted stage difference `h/6·(2Y2 + Z3 − 2Y3 − Y4)` is a
/// local error estimate of the embedded 3rd-order solution. The
/// estimate is stored on the scheme and consumed by
/// [`increment_stepsize`](Scheme::increment_stepsize):
///
/// ```text
/// h ← h · (tol / error)^(1/4)
/// ```
///
/// When the estimate is numerically zero (below 1e-15) the step size is
/// reset to `h = 1` instead, avoiding a divide-by-near-zero blow-up.
///
/// ```
/// use odestep::{RungeKutta34, Scheme, Vector};
///
/// let decay = |_t: f64, u: &Vector<f64, 1>| *u * (-1.0);
/// let mut scheme = RungeKutta34::with_stepsize(decay, 0.1);
/// scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
/// let (_, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
/// scheme.increment_stepsize();
/// assert!((u1[0] - (-0.1_f64).exp()).abs() < 1e-6);
/// ```
pub struct RungeKutta34<V, P> {
    system: V,
    h: P,
    tol: P,
    error: P,
}

impl<V, P: FloatScalar> RungeKutta34<V, P> {
    /// Exponent order used in the step-size update.
    const ERROR_ORDER: f64 = 4.0;

    /// Default local error tolerance.
    const DEFAULT_TOL: f64 = 1e-6;

    /// New scheme with the default step size and tolerance.
    pub fn new(system: V) -> Self {
        Self::with_stepsize(system, P::from(DEFAULT_STEPSIZE).unwrap())
    }

    /// New scheme with an explicit step size.
    pub fn with_stepsize(system: V, h: P) -> Self {
        Self {
            system,
            h,
            tol: P::from(Self::DEFAULT_TOL).unwrap(),
            error: P::zero(),
        }
    }

    /// Set the local error tolerance driving step-size adaptation.
    pub fn set_tolerance(&mut self, tol: P) {
        self.tol = tol;
    }

    /// Local error estimate of the most recent step.
    ///
    /// Meaningful only immediately after a `step()` call.
    pub fn error_estimate(&self) -> P {
        self.error
    }
}

impl<T, P, V, const N: usize> Scheme<T, N> for RungeKutta34<V, P>
where
    P: FloatScalar,
    T: LinalgScalar<Real = P>,
    V: VectorField<T, N>,
{
    fn initialize(&mut self, _t0: P, _u0: &Vector<T, N>) -> Result<(), SchemeError> {
        self.error = P::zero();
        Ok(())
    }

    fn step(&mut self, t: P, u0: &Vector<T, N>) -> Result<(P, Vector<T, N>), SchemeError> {
        let h = self.h;
        let half = P::from(0.5).unwrap();
        let sixth = P::from(1.0 / 6.0).unwrap();
        let two = T::from_real(P::from(2.0).unwrap());

        let y1 = self.system.f(t, u0);
        let y2 = self.system.f(t + h * half, &(*u0 + y1 * T::from_real(h * half)));
        let y3 = self.system.f(t + h * half, &(*u0 + y2 * T::from_real(h * half)));
        let z3 = self.system.f(
            t + h,
            &(*u0 - y1 * T::from_real(h) + y2 * T::from_real(h + h)),
        );
        let y4 = self.system.f(t + h, &(*u0 + y3 * T::from_real(h)));

        self.error = ((y2 * two + z3 - y3 * two - y4) * T::from_real(h * sixth)).norm();

        let u1 = *u0 + (y1 + y2 * two + y3 * two + y4) * T::from_real(h * sixth);
        Ok((t + h, u1))
    }

    fn stepsize(&self) -> P {
        self.h
    }

    fn set_stepsize(&mut self, h: P) {
        self.h = h;
    }

    fn increment_stepsize(&mut self) {
        if self.error > P::from(1e-15).unwrap() {
            let order = P::from(Self::ERROR_ORDER).unwrap();
            self.h = self.h * (self.tol / self.error).powf(P::one() / order);
        } else {
            self.h = P::one();
        }
    }
}
