use num_traits::{NumCast, Zero};

use super::{Scheme, SchemeError, DEFAULT_STEPSIZE};
use crate::matrix::vector::Vector;
use crate::rootfind::{newton, RootSettings};
use crate::system::VectorField;
use crate::traits::LinalgScalar;

/// Which mode of a dual-variant external solver to instantiate.
///
/// Mirrors solver suites that ship separate real and complex codes
/// (e.g. `vode`/`zvode`): the choice is made once per run, from the
/// scalar type of the initial state, and never re-checked per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StiffVariant {
    /// Real-valued state.
    Real,
    /// Complex-valued state.
    Complex,
}

/// Minimal imperative stepper contract for an external stiff solver.
///
/// The adapter treats implementations as opaque sequential resources:
/// bound to an initial value once, then advanced monotonically in time,
/// never out of order and never from two call sites.
pub trait StiffIntegrator<T: LinalgScalar, const N: usize> {
    /// Bind the solver to an initial condition.
    fn set_initial_value(&mut self, u0: &Vector<T, N>, t0: T::Real);

    /// Advance the internal state toward `target`.
    fn integrate(&mut self, target: T::Real);

    /// Whether the last `integrate` call completed successfully.
    fn successful(&self) -> bool;

    /// Current internal time.
    fn t(&self) -> T::Real;

    /// Current internal state.
    fn y(&self) -> Vector<T, N>;
}

/// Builds the external stiff solver bound by [`StiffAdapter::initialize`].
pub trait StiffSolverFactory<T: LinalgScalar, const N: usize> {
    /// Concrete solver type produced by this factory.
    type Solver: StiffIntegrator<T, N>;

    /// Instantiate the requested solver variant.
    fn build(&self, variant: StiffVariant) -> Self::Solver;
}

/// Scheme that delegates each step to an external variable-order BDF
/// solver.
///
/// `initialize` selects the solver variant from the state's scalar type
/// (complex states get [`StiffVariant::Complex`]) and binds it to the
/// initial condition; `step` advances the solver by `h` from its own
/// internal time and returns whatever `(t, y)` the solver then holds.
///
/// A solver reporting an unsuccessful step is a reportable, non-fatal
/// condition: it is logged, latched on [`stalled`](Self::stalled), and
/// the step still returns the solver's best-known state. Resumption or
/// abort policy belongs to the caller.
pub struct StiffAdapter<F, T, const N: usize>
where
    T: LinalgScalar,
    F: StiffSolverFactory<T, N>,
{
    factory: F,
    solver: Option<F::Solver>,
    h: T::Real,
    stalled: bool,
}

impl<F, T, const N: usize> StiffAdapter<F, T, N>
where
    T: LinalgScalar,
    F: StiffSolverFactory<T, N>,
{
    /// New adapter with the default step size. The external solver is
    /// not built until `initialize`.
    pub fn new(factory: F) -> Self {
        Self::with_stepsize(factory, <T::Real as NumCast>::from(DEFAULT_STEPSIZE).unwrap())
    }

    /// New adapter with an explicit step size.
    pub fn with_stepsize(factory: F, h: T::Real) -> Self {
        Self {
            factory,
            solver: None,
            h,
            stalled: false,
        }
    }

    /// Whether the external solver has reported an unsuccessful step
    /// since `initialize`.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    /// The bound external solver, once `initialize` has run.
    pub fn solver(&self) -> Option<&F::Solver> {
        self.solver.as_ref()
    }
}

impl<F, T, const N: usize> Scheme<T, N> for StiffAdapter<F, T, N>
where
    T: LinalgScalar,
    F: StiffSolverFactory<T, N>,
{
    fn initialize(&mut self, t0: T::Real, u0: &Vector<T, N>) -> Result<(), SchemeError> {
        let variant = if T::IS_COMPLEX {
            StiffVariant::Complex
        } else {
            StiffVariant::Real
        };
        let mut solver = self.factory.build(variant);
        solver.set_initial_value(u0, t0);
        self.solver = Some(solver);
        self.stalled = false;
        Ok(())
    }

    fn step(
        &mut self,
        _t: T::Real,
        _u0: &Vector<T, N>,
    ) -> Result<(T::Real, Vector<T, N>), SchemeError> {
        let solver = self.solver.as_mut().ok_or(SchemeError::NotInitialized)?;
        let target = solver.t() + self.h;
        solver.integrate(target);
        if !solver.successful() {
            log::warn!("external stiff solver reported an unsuccessful step");
            self.stalled = true;
        }
        Ok((solver.t(), solver.y()))
    }

    fn stepsize(&self) -> T::Real {
        self.h
    }

    fn set_stepsize(&mut self, h: T::Real) {
        self.h = h;
    }
}

/// Compact fixed-order BDF2 integrator satisfying [`StiffIntegrator`].
///
/// Each `integrate` call splits the requested interval into equal
/// substeps: a backward-Euler startup step, then the two-step formula
///
/// ```text
/// y₂ − 4/3·y₁ + 1/3·y₀ = 2h/3 · f(t₂, y₂)
/// ```
///
/// with each implicit solve handled by Newton iteration. If a solve
/// fails, the integrator stops where it is, keeps the last completed
/// `(t, y)`, and reports `successful() == false`.
pub struct Bdf2<V, T, const N: usize>
where
    T: LinalgScalar,
{
    system: V,
    variant: StiffVariant,
    t: T::Real,
    y: Vector<T, N>,
    substeps: usize,
    solver: RootSettings<T::Real>,
    ok: bool,
}

impl<V, T, const N: usize> Bdf2<V, T, N>
where
    T: LinalgScalar,
{
    /// New integrator with default substep count and tolerances.
    pub fn new(system: V) -> Self
    where
        RootSettings<T::Real>: Default,
    {
        Self::with_settings(system, 10, RootSettings::default())
    }

    /// New integrator with explicit internal substep count and
    /// root-finder settings.
    pub fn with_settings(system: V, substeps: usize, solver: RootSettings<T::Real>) -> Self {
        let variant = if T::IS_COMPLEX {
            StiffVariant::Complex
        } else {
            StiffVariant::Real
        };
        Self {
            system,
            variant,
            t: T::Real::zero(),
            y: Vector::zeros(),
            substeps,
            solver,
            ok: true,
        }
    }

    /// Which variant this instance was built as.
    pub fn variant(&self) -> StiffVariant {
        self.variant
    }
}

impl<V, T, const N: usize> StiffIntegrator<T, N> for Bdf2<V, T, N>
where
    T: LinalgScalar,
    V: VectorField<T, N>,
{
    fn set_initial_value(&mut self, u0: &Vector<T, N>, t0: T::Real) {
        self.t = t0;
        self.y = *u0;
        self.ok = true;
    }

    fn integrate(&mut self, target: T::Real) {
        if !self.ok {
            return;
        }

        let nsub = self.substeps.max(1);
        let h = (target - self.t) / <T::Real as NumCast>::from(nsub).unwrap();
        if h == T::Real::zero() {
            return;
        }

        let t0 = self.t;
        let four_thirds = T::from_real(<T::Real as NumCast>::from(4.0 / 3.0).unwrap());
        let third = T::from_real(<T::Real as NumCast>::from(1.0 / 3.0).unwrap());
        let two_thirds_h = T::from_real(h * <T::Real as NumCast>::from(2.0 / 3.0).unwrap());
        let hr = T::from_real(h);

        // Backward-Euler startup step.
        let sys = &self.system;
        let y_curr = self.y;
        let t1 = t0 + h;
        let be = |y1: &Vector<T, N>| *y1 - y_curr - sys.f(t1, y1) * hr;
        let mut y_prev = y_curr;
        let mut y = match newton(&be, &y_curr, &self.solver) {
            Ok(root) => root.x,
            Err(_) => {
                self.ok = false;
                return;
            }
        };
        self.t = t1;
        self.y = y;

        // Two-step BDF for the remaining substeps.
        for k in 1..nsub {
            let tk = t0 + h * <T::Real as NumCast>::from(k + 1).unwrap();
            let (ya, yb) = (y, y_prev);
            let r = |y2: &Vector<T, N>| {
                *y2 - ya * four_thirds + yb * third - sys.f(tk, y2) * two_thirds_h
            };
            match newton(&r, &y, &self.solver) {
                Ok(root) => {
                    y_prev = y;
                    y = root.x;
                    self.t = tk;
                    self.y = y;
                }
                Err(_) => {
                    self.ok = false;
                    return;
                }
            }
        }

        self.t = target;
    }

    fn successful(&self) -> bool {
        self.ok
    }

    fn t(&self) -> T::Real {
        self.t
    }

    fn y(&self) -> Vector<T, N> {
        self.y
    }
}

/// Factory producing [`Bdf2`] instances for the adapter.
///
/// Both variants share the generic implementation; the requested
/// variant is recorded on the built solver.
pub struct Bdf2Factory<V> {
    system: V,
    substeps: usize,
}

impl<V> Bdf2Factory<V> {
    /// Factory wrapping a system, with the given internal substep count.
    pub fn new(system: V, substeps: usize) -> Self {
        Self { system, substeps }
    }
}

impl<V, T, const N: usize> StiffSolverFactory<T, N> for Bdf2Factory<V>
where
    T: LinalgScalar,
    V: VectorField<T, N> + Clone,
    RootSettings<T::Real>: Default,
{
    type Solver = Bdf2<V, T, N>;

    fn build(&self, variant: StiffVariant) -> Bdf2<V, T, N> {
        let mut solver =
            Bdf2::with_settings(self.system.clone(), self.substeps, RootSettings::default());
        solver.variant = variant;
        solver
    }
}
