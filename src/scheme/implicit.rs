use num_traits::NumCast;

use super::{CompensatedSum, ResidualScheme, Scheme, SchemeError, DEFAULT_STEPSIZE};
use crate::matrix::vector::Vector;
use crate::rootfind::{Residual, RootSettings};
use crate::system::VectorField;
use crate::traits::LinalgScalar;

/// Residual of one backward-Euler step, fixed over `(t, u0, h)` and the
/// governing system.
///
/// Solves for the next state directly: `r(u1) = u1 - u0 - h·f(t+h, u1)`.
/// Evaluation delegates to the system's
/// [`backward_residual`](VectorField::backward_residual) so systems with
/// a closed-form residual get their fast path.
pub struct BackwardEulerResidual<'a, V, T: LinalgScalar, const N: usize> {
    system: &'a V,
    t: T::Real,
    u0: &'a Vector<T, N>,
    h: T::Real,
}

impl<'a, T, V, const N: usize> Residual<T, N> for BackwardEulerResidual<'a, V, T, N>
where
    T: LinalgScalar,
    V: VectorField<T, N>,
{
    fn eval(&self, u1: &Vector<T, N>) -> Vector<T, N> {
        self.system.backward_residual(self.t + self.h, self.u0, u1, self.h)
    }
}

/// Backward (implicit) Euler.
///
/// First order and unconditionally stable: each step solves
/// `u1 - u0 - h·f(t+h, u1) = 0` through the direct-solve/Newton
/// fallback, seeded with a forward-Euler guess. Since the root is the
/// next state rather than the increment, `reconstruct` subtracts `u0`;
/// the increment then flows through compensated summation.
///
/// ```
/// use odestep::{ImplicitEuler, Scheme, Vector};
///
/// // Stiff decay: y' = -50y. Forward Euler at h = 0.1 would explode;
/// // backward Euler contracts by 1/(1 + 50h) per step.
/// let stiff = |_t: f64, u: &Vector<f64, 1>| *u * (-50.0);
/// let mut scheme = ImplicitEuler::with_stepsize(stiff, 0.1);
/// scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
/// let (_, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
/// assert!((u1[0] - 1.0 / 6.0).abs() < 1e-8);
/// ```
pub struct ImplicitEuler<V, T: LinalgScalar, const N: usize> {
    system: V,
    h: T::Real,
    solver: RootSettings<T::Real>,
    roundoff: CompensatedSum<T, N>,
}

impl<V, T, const N: usize> ImplicitEuler<V, T, N>
where
    T: LinalgScalar,
{
    /// New scheme with the default step size and solver tolerances.
    pub fn new(system: V) -> Self
    where
        RootSettings<T::Real>: Default,
    {
        Self::with_settings(
            system,
            <T::Real as NumCast>::from(DEFAULT_STEPSIZE).unwrap(),
            RootSettings::default(),
        )
    }

    /// New scheme with an explicit step size.
    pub fn with_stepsize(system: V, h: T::Real) -> Self
    where
        RootSettings<T::Real>: Default,
    {
        Self::with_settings(system, h, RootSettings::default())
    }

    /// New scheme with explicit step size and root-finder settings.
    pub fn with_settings(system: V, h: T::Real, solver: RootSettings<T::Real>) -> Self {
        Self {
            system,
            h,
            solver,
            roundoff: CompensatedSum::new(),
        }
    }
}

impl<V, T, const N: usize> ResidualScheme<T, N> for ImplicitEuler<V, T, N>
where
    T: LinalgScalar,
    V: VectorField<T, N>,
{
    type Res<'a>
        = BackwardEulerResidual<'a, V, T, N>
    where
        Self: 'a;

    fn residual<'a>(&'a self, t: T::Real, u0: &'a Vector<T, N>, h: T::Real) -> Self::Res<'a> {
        BackwardEulerResidual {
            system: &self.system,
            t,
            u0,
            h,
        }
    }

    /// Forward-Euler predictor: `u0 + h·f(t, u0)`.
    fn guess(&self, t: T::Real, u0: &Vector<T, N>, h: T::Real) -> Vector<T, N> {
        *u0 + self.system.f(t, u0) * T::from_real(h)
    }

    /// The root is the next state; the increment is `root - u0`.
    fn reconstruct(&self, root: Vector<T, N>, u0: &Vector<T, N>) -> Vector<T, N> {
        root - *u0
    }

    fn solver(&self) -> &RootSettings<T::Real> {
        &self.solver
    }
}

impl<V, T, const N: usize> Scheme<T, N> for ImplicitEuler<V, T, N>
where
    T: LinalgScalar,
    V: VectorField<T, N>,
{
    fn initialize(&mut self, _t0: T::Real, _u0: &Vector<T, N>) -> Result<(), SchemeError> {
        self.roundoff.reset();
        Ok(())
    }

    fn step(
        &mut self,
        t: T::Real,
        u0: &Vector<T, N>,
    ) -> Result<(T::Real, Vector<T, N>), SchemeError> {
        let (t1, du) = self.delta(t, u0, self.h)?;
        let u1 = self.roundoff.advance(u0, &du);
        Ok((t1, u1))
    }

    fn stepsize(&self) -> T::Real {
        self.h
    }

    fn set_stepsize(&mut self, h: T::Real) {
        self.h = h;
    }
}
