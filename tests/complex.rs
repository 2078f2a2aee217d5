//! Complex-valued states through the full stack: schemes, root
//! finding, and the stiff adapter's variant selection.

use num_complex::Complex;
use odestep::rootfind::{newton, RootSettings};
use odestep::{
    Bdf2Factory, CompensatedSum, ImplicitEuler, RungeKutta4, Scheme, StiffAdapter,
    StiffIntegrator, StiffSolverFactory, StiffVariant, Vector,
};

type C = Complex<f64>;

fn c(re: f64, im: f64) -> C {
    Complex::new(re, im)
}

// ── Schemes over complex states ─────────────────────────────────────

#[test]
fn rk4_complex_rotation() {
    // u' = i·u from 1: u(t) = e^{it}
    let rotation = |_t: f64, u: &Vector<C, 1>| *u * c(0.0, 1.0);
    let mut scheme = RungeKutta4::with_stepsize(rotation, 1e-3);
    scheme.initialize(0.0, &Vector::from_array([c(1.0, 0.0)])).unwrap();

    let mut t = 0.0;
    let mut u = Vector::from_array([c(1.0, 0.0)]);
    for _ in 0..1000 {
        let (t1, u1) = scheme.step(t, &u).unwrap();
        t = t1;
        u = u1;
    }
    assert!((u[0].re - 1.0_f64.cos()).abs() < 1e-9);
    assert!((u[0].im - 1.0_f64.sin()).abs() < 1e-9);
    // Rotation preserves the modulus.
    assert!((u[0].norm() - 1.0).abs() < 1e-9);
}

#[test]
fn implicit_euler_complex_rotation() {
    // Backward Euler on u' = iω·u: u1 = u0 / (1 - iωh)
    let omega = 2.0;
    let rotation = move |_t: f64, u: &Vector<C, 1>| *u * c(0.0, omega);
    let mut scheme = ImplicitEuler::with_stepsize(rotation, 0.05);
    let u0 = Vector::from_array([c(1.0, 0.0)]);
    scheme.initialize(0.0, &u0).unwrap();

    let (_, u1) = scheme.step(0.0, &u0).unwrap();
    let expected = c(1.0, 0.0) / (c(1.0, 0.0) - c(0.0, omega * 0.05));
    assert!((u1[0] - expected).norm() < 1e-8, "{:?} vs {expected:?}", u1[0]);
}

#[test]
fn newton_solves_complex_residual() {
    // x² = i has the principal root (1 + i)/√2.
    let r = |x: &Vector<C, 1>| Vector::from_array([x[0] * x[0] - c(0.0, 1.0)]);
    let root = newton(
        &r,
        &Vector::from_array([c(1.0, 0.5)]),
        &RootSettings::default(),
    )
    .unwrap();
    let s = 0.5_f64.sqrt();
    assert!((root.x[0] - c(s, s)).norm() < 1e-9);
}

#[test]
fn compensated_summation_over_complex_states() {
    let mut acc = CompensatedSum::new();
    let mut u = Vector::from_array([c(1.0, 1.0)]);
    let du = Vector::from_array([c(1e-16, -1e-16)]);
    for _ in 0..10_000 {
        u = acc.advance(&u, &du);
    }
    let total = u[0] + acc.carry()[0];
    assert!((total.re - (1.0 + 1e-12)).abs() < 1e-15);
    assert!((total.im - (1.0 - 1e-12)).abs() < 1e-15);
}

// ── Stiff adapter variant selection ─────────────────────────────────

struct RecordingSolver {
    variant: StiffVariant,
    t: f64,
    y: Vector<C, 1>,
}

impl StiffIntegrator<C, 1> for RecordingSolver {
    fn set_initial_value(&mut self, u0: &Vector<C, 1>, t0: f64) {
        self.t = t0;
        self.y = *u0;
    }

    fn integrate(&mut self, target: f64) {
        // Exact e^{it} rotation of the bound initial state.
        self.y = Vector::from_array([self.y[0] * c((target - self.t).cos(), (target - self.t).sin())]);
        self.t = target;
    }

    fn successful(&self) -> bool {
        true
    }

    fn t(&self) -> f64 {
        self.t
    }

    fn y(&self) -> Vector<C, 1> {
        self.y
    }
}

struct RecordingFactory;

impl StiffSolverFactory<C, 1> for RecordingFactory {
    type Solver = RecordingSolver;

    fn build(&self, variant: StiffVariant) -> RecordingSolver {
        RecordingSolver {
            variant,
            t: 0.0,
            y: Vector::zeros(),
        }
    }
}

#[test]
fn adapter_selects_complex_variant_for_complex_state() {
    let mut adapter = StiffAdapter::with_stepsize(RecordingFactory, 0.1);
    adapter
        .initialize(0.0, &Vector::from_array([c(1.0, 0.0)]))
        .unwrap();
    assert_eq!(adapter.solver().unwrap().variant, StiffVariant::Complex);

    // The bound solver produces complex output of the matching type.
    let (t1, u1) = adapter.step(0.0, &Vector::from_array([c(1.0, 0.0)])).unwrap();
    assert!((t1 - 0.1).abs() < 1e-15);
    assert!((u1[0].im - 0.1_f64.sin()).abs() < 1e-12);
}

#[test]
fn bdf2_complex_decaying_rotation() {
    // u' = (-1 + i)·u: u(1) = e^{-1}(cos 1 + i sin 1)
    let field = |_t: f64, u: &Vector<C, 1>| *u * c(-1.0, 1.0);
    let factory = Bdf2Factory::new(field, 100);
    let mut adapter = StiffAdapter::with_stepsize(factory, 1.0);
    adapter
        .initialize(0.0, &Vector::from_array([c(1.0, 0.0)]))
        .unwrap();
    assert_eq!(
        adapter.solver().unwrap().variant(),
        StiffVariant::Complex
    );

    let (t1, u1) = adapter.step(0.0, &Vector::from_array([c(1.0, 0.0)])).unwrap();
    assert!(!adapter.stalled());
    assert!((t1 - 1.0).abs() < 1e-12);

    let exact = c((-1.0_f64).exp() * 1.0_f64.cos(), (-1.0_f64).exp() * 1.0_f64.sin());
    assert!(
        (u1[0] - exact).norm() < 5e-3,
        "{:?} vs {exact:?}",
        u1[0]
    );
}
