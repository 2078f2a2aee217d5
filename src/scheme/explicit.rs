use super::{Scheme, SchemeError, DEFAULT_STEPSIZE};
use crate::matrix::vector::Vector;
use crate::system::VectorField;
use crate::traits::{FloatScalar, LinalgScalar};

/// Forward Euler: `u1 = u + h·f(t, u)`.
///
/// First order, one vector-field evaluation per step. The update is a
/// single closed-form expression, so `step` bypasses root-finding and
/// accumulation entirely.
///
/// ```
/// use odestep::{ExplicitEuler, Scheme, Vector};
///
/// let decay = |_t: f64, u: &Vector<f64, 1>| *u * (-1.0);
/// let mut scheme = ExplicitEuler::with_stepsize(decay, 0.125);
/// scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
/// let (t1, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
/// assert_eq!(t1, 0.125);
/// assert_eq!(u1[0], 0.875); // exact: 1 - h
/// ```
pub struct ExplicitEuler<V, P> {
    system: V,
    h: P,
}

impl<V, P: FloatScalar> ExplicitEuler<V, P> {
    /// New scheme with the default step size.
    pub fn new(system: V) -> Self {
        Self {
            system,
            h: P::from(DEFAULT_STEPSIZE).unwrap(),
        }
    }

    /// New scheme with an explicit step size.
    pub fn with_stepsize(system: V, h: P) -> Self {
        Self { system, h }
    }
}

impl<T, P, V, const N: usize> Scheme<T, N> for ExplicitEuler<V, P>
where
    P: FloatScalar,
    T: LinalgScalar<Real = P>,
    V: VectorField<T, N>,
{
    fn initialize(&mut self, _t0: P, _u0: &Vector<T, N>) -> Result<(), SchemeError> {
        Ok(())
    }

    fn step(&mut self, t: P, u0: &Vector<T, N>) -> Result<(P, Vector<T, N>), SchemeError> {
        let h = self.h;
        Ok((t + h, *u0 + self.system.f(t, u0) * T::from_real(h)))
    }

    fn stepsize(&self) -> P {
        self.h
    }

    fn set_stepsize(&mut self, h: P) {
        self.h = h;
    }
}

/// Explicit trapezoidal rule (Heun's method).
///
/// Second order: a forward-Euler predictor followed by a trapezoidal
/// corrector, two evaluations per step.
pub struct ExplicitTrapezoidal<V, P> {
    system: V,
    h: P,
}

impl<V, P: FloatScalar> ExplicitTrapezoidal<V, P> {
    pub fn new(system: V) -> Self {
        Self {
            system,
            h: P::from(DEFAULT_STEPSIZE).unwrap(),
        }
    }

    pub fn with_stepsize(system: V, h: P) -> Self {
        Self { system, h }
    }
}

impl<T, P, V, const N: usize> Scheme<T, N> for ExplicitTrapezoidal<V, P>
where
    P: FloatScalar,
    T: LinalgScalar<Real = P>,
    V: VectorField<T, N>,
{
    fn initialize(&mut self, _t0: P, _u0: &Vector<T, N>) -> Result<(), SchemeError> {
        Ok(())
    }

    fn step(&mut self, t: P, u0: &Vector<T, N>) -> Result<(P, Vector<T, N>), SchemeError> {
        let h = self.h;
        let half = P::from(0.5).unwrap();
        let f0 = self.system.f(t, u0);
        let predict = *u0 + f0 * T::from_real(h);
        let f1 = self.system.f(t + h, &predict);
        Ok((t + h, *u0 + (f0 + f1) * T::from_real(h * half)))
    }

    fn stepsize(&self) -> P {
        self.h
    }

    fn set_stepsize(&mut self, h: P) {
        self.h = h;
    }
}

/// Classic 4th-order Runge-Kutta.
///
/// Four stages, fourth order, no error estimate.
///
/// ```
/// use odestep::{RungeKutta4, Scheme, Vector};
///
/// let decay = |_t: f64, u: &Vector<f64, 1>| *u * (-1.0);
/// let mut scheme = RungeKutta4::with_stepsize(decay, 0.01);
/// scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
/// let (_, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
/// assert!((u1[0] - (-0.01_f64).exp()).abs() < 1e-10);
/// ```
pub struct RungeKutta4<V, P> {
    system: V,
    h: P,
}

impl<V, P: FloatScalar> RungeKutta4<V, P> {
    /// New scheme with the default step size.
    pub fn new(system: V) -> Self {
        Self {
            system,
            h: P::from(DEFAULT_STEPSIZE).unwrap(),
        }
    }

    /// New scheme with an explicit step size.
    pub fn with_stepsize(system: V, h: P) -> Self {
        Self { system, h }
    }
}

impl<T, P, V, const N: usize> Scheme<T, N> for RungeKutta4<V, P>
where
    P: FloatScalar,
    T: LinalgScalar<Real = P>,
    V: VectorField<T, N>,
{
    fn initialize(&mut self, _t0: P, _u0: &Vector<T, N>) -> Result<(), SchemeError> {
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
        let y4 = self.system.f(t + h, &(*u0 + y3 * T::from_real(h)));

        let u1 = *u0 + (y1 + y2 * two + y3 * two + y4) * T::from_real(h * sixth);
        Ok((t + h, u1))
    }

    fn stepsize(&self) -> P {
        self.h
    }

    fn set_stepsize(&mut self, h: P) {
        self.h = h;
    }
}
