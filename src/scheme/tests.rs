use super::*;
use crate::Vector;

const TAU: f64 = 2.0 * core::f64::consts::PI;

fn decay(_t: f64, u: &Vector<f64, 1>) -> Vector<f64, 1> {
    *u * (-1.0)
}

fn oscillator(_t: f64, u: &Vector<f64, 2>) -> Vector<f64, 2> {
    Vector::from_array([u[1], -u[0]])
}

/// Drive a scheme from `(0, u0)` until `t` reaches `tf`, clamping the
/// final step so the run ends exactly at `tf`.
fn run<const N: usize>(
    scheme: &mut impl Scheme<f64, N>,
    u0: Vector<f64, N>,
    tf: f64,
) -> Vector<f64, N> {
    let mut t = 0.0;
    let mut u = u0;
    scheme.initialize(t, &u).unwrap();
    while t < tf - 1e-12 {
        if t + scheme.stepsize() > tf {
            scheme.set_stepsize(tf - t);
        }
        let (t1, u1) = scheme.step(t, &u).unwrap();
        t = t1;
        u = u1;
    }
    u
}

// ── Explicit Euler ──────────────────────────────────────────────────

#[test]
fn explicit_euler_single_step_is_exact() {
    // For f(t,u) = -u, one step from u = 1 is 1 - h, exact in floating
    // point when h is a power of two.
    let mut scheme = ExplicitEuler::with_stepsize(decay, 0.125);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    let (t1, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
    assert_eq!(t1, 0.125);
    assert_eq!(u1[0], 0.875);
}

#[test]
fn explicit_euler_matches_closed_form() {
    let h = 0.0625;
    let mut scheme = ExplicitEuler::with_stepsize(decay, h);
    let u = run(&mut scheme, Vector::from_array([1.0]), 1.0);
    let n = (1.0 / h).round() as i32;
    assert!((u[0] - (1.0 - h).powi(n)).abs() < 1e-13);
}

// ── Explicit trapezoidal ────────────────────────────────────────────

#[test]
fn trapezoidal_is_second_order() {
    let exact = (-1.0_f64).exp();
    let mut errs = [0.0; 2];
    for (i, &h) in [0.02, 0.01].iter().enumerate() {
        let mut scheme = ExplicitTrapezoidal::with_stepsize(decay, h);
        let u = run(&mut scheme, Vector::from_array([1.0]), 1.0);
        errs[i] = (u[0] - exact).abs();
    }
    let ratio = errs[0] / errs[1];
    assert!(
        (3.0..5.0).contains(&ratio),
        "halving h gave error ratio {ratio}, expected ≈ 4"
    );
}

// ── RK4 ─────────────────────────────────────────────────────────────

#[test]
fn rk4_single_step_accuracy() {
    let mut scheme = RungeKutta4::with_stepsize(decay, 0.01);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    let (_, u1) = scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
    assert!((u1[0] - (-0.01_f64).exp()).abs() < 1e-10);
}

#[test]
fn rk4_is_fourth_order() {
    // Halving h should shrink the global error by ≈ 2⁴.
    let exact = (-1.0_f64).exp();
    let mut errs = [0.0; 2];
    for (i, &h) in [0.1, 0.05].iter().enumerate() {
        let mut scheme = RungeKutta4::with_stepsize(decay, h);
        let u = run(&mut scheme, Vector::from_array([1.0]), 1.0);
        errs[i] = (u[0] - exact).abs();
    }
    let ratio = errs[0] / errs[1];
    assert!(
        (12.0..20.0).contains(&ratio),
        "halving h gave error ratio {ratio}, expected ≈ 16"
    );
}

#[test]
fn rk4_harmonic_oscillator_round_trip() {
    let mut scheme = RungeKutta4::with_stepsize(oscillator, 1e-3);
    let u = run(&mut scheme, Vector::from_array([1.0, 0.0]), TAU);
    assert!((u[0] - 1.0).abs() < 1e-8);
    assert!(u[1].abs() < 1e-8);
}

// ── Implicit Euler ──────────────────────────────────────────────────

#[test]
fn implicit_euler_linear_decay() {
    // Backward Euler on y' = -y contracts by 1/(1+h) per step.
    let h = 0.1;
    let mut scheme = ImplicitEuler::with_stepsize(decay, h);
    let u = run(&mut scheme, Vector::from_array([1.0]), 1.0);
    let expected = (1.0_f64 / (1.0 + h)).powi(10);
    assert!((u[0] - expected).abs() < 1e-7, "{} vs {expected}", u[0]);
}

#[test]
fn implicit_euler_stable_on_stiff_decay() {
    // Forward Euler at h = 0.1 on y' = -50y oscillates with growing
    // amplitude; backward Euler contracts monotonically.
    let stiff = |_t: f64, u: &Vector<f64, 1>| *u * (-50.0);
    let mut scheme = ImplicitEuler::with_stepsize(stiff, 0.1);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();

    let mut t = 0.0;
    let mut u = Vector::from_array([1.0]);
    let mut prev = u[0];
    for _ in 0..10 {
        let (t1, u1) = scheme.step(t, &u).unwrap();
        t = t1;
        u = u1;
        assert!(u[0] > 0.0 && u[0] < prev, "not contracting: {} -> {}", prev, u[0]);
        prev = u[0];
    }
    assert!((u[0] - (1.0_f64 / 6.0).powi(10)).abs() < 1e-9);
}

#[test]
fn implicit_euler_residual_pipeline_defaults() {
    // The residual pipeline built over (t, u0, h): the backward-Euler
    // residual vanishes at the implicit update and the guess is the
    // forward-Euler predictor.
    use crate::rootfind::Residual;

    let scheme: ImplicitEuler<_, f64, 1> = ImplicitEuler::with_stepsize(decay, 0.5);
    let u0 = Vector::from_array([2.0]);

    let guess = ResidualScheme::guess(&scheme, 0.0, &u0, 0.5);
    assert_eq!(guess[0], 1.0); // 2 + 0.5·(-2)

    let residual = ResidualScheme::residual(&scheme, 0.0, &u0, 0.5);
    let u1 = Vector::from_array([2.0 / 1.5]);
    assert!(residual.eval(&u1).norm() < 1e-14);

    let du = ResidualScheme::reconstruct(&scheme, u1, &u0);
    assert!((du[0] - (2.0 / 1.5 - 2.0)).abs() < 1e-14);
}

// ── Compensated summation ───────────────────────────────────────────

#[test]
fn compensated_summation_beats_naive() {
    // 10⁴ increments of 1e-16 into a base of 1.0. Naively each addition
    // rounds away; the compensated total matches the exact sum.
    let n = 10_000;
    let du = Vector::from_array([1e-16_f64]);
    let exact = 1.0 + (n as f64) * 1e-16;

    let mut naive = Vector::from_array([1.0_f64]);
    for _ in 0..n {
        naive = naive + du;
    }

    let mut acc = CompensatedSum::new();
    let mut u = Vector::from_array([1.0_f64]);
    for _ in 0..n {
        u = acc.advance(&u, &du);
    }
    let compensated = u[0] + acc.carry()[0];

    let naive_err = (naive[0] - exact).abs();
    let comp_err = (compensated - exact).abs();
    assert_eq!(naive[0], 1.0); // every naive addition was lost
    assert!(
        comp_err < naive_err,
        "compensated err {comp_err} not below naive err {naive_err}"
    );
    assert!(comp_err < 1e-15);
}

#[test]
fn compensated_carry_recovers_lost_bits() {
    let mut acc = CompensatedSum::new();
    let u0 = Vector::from_array([1e8_f64]);
    let du = Vector::from_array([1e-9_f64]);
    let u1 = acc.advance(&u0, &du);
    // u1 + carry recovers the true sum even though u1 alone cannot
    // represent it.
    assert!(((u1[0] + acc.carry()[0]) - (1e8 + 1e-9)).abs() < 1e-10);
}

#[test]
fn compensated_reset_clears_carry() {
    let mut acc: CompensatedSum<f64, 1> = CompensatedSum::new();
    acc.advance(&Vector::from_array([1.0]), &Vector::from_array([1e-20]));
    acc.reset();
    assert_eq!(acc.carry()[0], 0.0);
}

// ── Adaptive RK34 ───────────────────────────────────────────────────

#[test]
fn rk34_accuracy_on_oscillator() {
    let mut scheme = RungeKutta34::with_stepsize(oscillator, 1e-3);
    let u = run(&mut scheme, Vector::from_array([1.0, 0.0]), TAU);
    assert!((u[0] - 1.0).abs() < 1e-8);
}

#[test]
fn rk34_large_error_shrinks_stepsize() {
    let mut scheme = RungeKutta34::with_stepsize(decay, 1.0);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
    assert!(scheme.error_estimate() > 1e-3);
    scheme.increment_stepsize();
    let h: f64 = Scheme::<f64, 1>::stepsize(&scheme);
    assert!(h < 1.0, "h = {h} did not shrink");
}

#[test]
fn rk34_small_error_grows_stepsize() {
    let mut scheme = RungeKutta34::with_stepsize(decay, 0.01);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
    let err = scheme.error_estimate();
    assert!(err > 1e-15 && err < 1e-6, "error estimate {err}");
    scheme.increment_stepsize();
    let h: f64 = Scheme::<f64, 1>::stepsize(&scheme);
    assert!(h > 0.01, "h = {h} did not grow");
}

#[test]
fn rk34_zero_error_resets_stepsize_to_one() {
    // A constant field has zero local error; the update rule would
    // divide by it, so the scheme resets h = 1 instead.
    let frozen = |_t: f64, _u: &Vector<f64, 1>| Vector::<f64, 1>::zeros();
    let mut scheme = RungeKutta34::with_stepsize(frozen, 0.3);
    scheme.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    scheme.step(0.0, &Vector::from_array([1.0])).unwrap();
    scheme.increment_stepsize();
    let h: f64 = Scheme::<f64, 1>::stepsize(&scheme);
    assert_eq!(h, 1.0);
}

#[test]
fn rk34_stepsize_is_writable_between_steps() {
    let mut scheme = RungeKutta34::with_stepsize(decay, 0.1);
    Scheme::<f64, 1>::set_stepsize(&mut scheme, 0.05);
    let h: f64 = Scheme::<f64, 1>::stepsize(&scheme);
    assert_eq!(h, 0.05);
}

// ── Stiff adapter ───────────────────────────────────────────────────

/// Scripted external solver: integrates exactly to the target and
/// reports failure on demand.
struct MockSolver {
    variant: StiffVariant,
    t: f64,
    y: Vector<f64, 1>,
    fail_after: Option<f64>,
    ok: bool,
}

impl StiffIntegrator<f64, 1> for MockSolver {
    fn set_initial_value(&mut self, u0: &Vector<f64, 1>, t0: f64) {
        self.t = t0;
        self.y = *u0;
        self.ok = true;
    }

    fn integrate(&mut self, target: f64) {
        if let Some(limit) = self.fail_after {
            if target > limit {
                self.ok = false;
                return; // hold the last good state
            }
        }
        self.y = Vector::from_array([(-target).exp()]);
        self.t = target;
    }

    fn successful(&self) -> bool {
        self.ok
    }

    fn t(&self) -> f64 {
        self.t
    }

    fn y(&self) -> Vector<f64, 1> {
        self.y
    }
}

struct MockFactory {
    fail_after: Option<f64>,
}

impl StiffSolverFactory<f64, 1> for MockFactory {
    type Solver = MockSolver;

    fn build(&self, variant: StiffVariant) -> MockSolver {
        MockSolver {
            variant,
            t: 0.0,
            y: Vector::zeros(),
            fail_after: self.fail_after,
            ok: true,
        }
    }
}

#[test]
fn adapter_selects_real_variant_for_real_state() {
    let mut adapter = StiffAdapter::with_stepsize(MockFactory { fail_after: None }, 0.1);
    adapter.initialize(0.0, &Vector::from_array([1.0])).unwrap();
    assert_eq!(adapter.solver().unwrap().variant, StiffVariant::Real);
}

#[test]
fn adapter_step_before_initialize_is_an_error() {
    let mut adapter: StiffAdapter<MockFactory, f64, 1> =
        StiffAdapter::with_stepsize(MockFactory { fail_after: None }, 0.1);
    let err = adapter.step(0.0, &Vector::from_array([1.0])).unwrap_err();
    assert_eq!(err, SchemeError::NotInitialized);
}

#[test]
fn adapter_delegates_and_tracks_solver_time() {
    let mut adapter = StiffAdapter::with_stepsize(MockFactory { fail_after: None }, 0.25);
    adapter.initialize(0.0, &Vector::from_array([1.0])).unwrap();

    let (t1, u1) = adapter.step(0.0, &Vector::from_array([1.0])).unwrap();
    assert!((t1 - 0.25).abs() < 1e-15);
    assert!((u1[0] - (-0.25_f64).exp()).abs() < 1e-15);
    assert!(!adapter.stalled());

    // The adapter advances the solver's own clock, not the caller's.
    let (t2, _) = adapter.step(99.0, &u1).unwrap();
    assert!((t2 - 0.5).abs() < 1e-15);
}

#[test]
fn adapter_surfaces_stall_without_failing() {
    let mut adapter = StiffAdapter::with_stepsize(MockFactory { fail_after: Some(0.3) }, 0.25);
    adapter.initialize(0.0, &Vector::from_array([1.0])).unwrap();

    let (t1, _) = adapter.step(0.0, &Vector::from_array([1.0])).unwrap();
    assert!(!adapter.stalled());

    // Second step crosses the failure point: reported, not fatal, and
    // the solver's best-known state comes back.
    let (t2, u2) = adapter.step(t1, &Vector::from_array([0.0])).unwrap();
    assert!(adapter.stalled());
    assert!((t2 - 0.25).abs() < 1e-15);
    assert!((u2[0] - (-0.25_f64).exp()).abs() < 1e-15);
}

// ── Reference BDF2 integrator ───────────────────────────────────────

#[test]
fn bdf2_stiff_linear_decay() {
    // y' = -1000y over [0, 0.002]: λh = -0.02 per substep.
    let stiff = |_t: f64, u: &Vector<f64, 1>| *u * (-1000.0);
    let mut bdf: Bdf2<_, f64, 1> = Bdf2::with_settings(
        stiff,
        100,
        crate::rootfind::RootSettings::default(),
    );
    bdf.set_initial_value(&Vector::from_array([1.0]), 0.0);
    bdf.integrate(0.002);
    assert!(bdf.successful());
    let exact = (-2.0_f64).exp();
    let rel = (bdf.y()[0] - exact).abs() / exact;
    assert!(rel < 1e-2, "relative error {rel}");
}

#[test]
fn bdf2_newton_failure_stalls_and_keeps_state() {
    // The field turns NaN past t = 0.5; the integrator must stop at the
    // last completed substep and report the stall.
    let partial = |t: f64, u: &Vector<f64, 1>| {
        if t > 0.5 {
            Vector::from_array([f64::NAN])
        } else {
            *u * (-1.0)
        }
    };
    let mut bdf: Bdf2<_, f64, 1> = Bdf2::with_settings(
        partial,
        10,
        crate::rootfind::RootSettings::default(),
    );
    bdf.set_initial_value(&Vector::from_array([1.0]), 0.0);
    bdf.integrate(1.0);
    assert!(!bdf.successful());
    assert!((bdf.t() - 0.5).abs() < 1e-12);
    assert!(bdf.y()[0].is_finite());
    assert!(bdf.y()[0] > 0.0);
}

#[test]
fn adapter_with_bdf2_end_to_end() {
    let factory = Bdf2Factory::new(decay, 10);
    let mut adapter = StiffAdapter::with_stepsize(factory, 0.1);
    adapter.initialize(0.0, &Vector::from_array([1.0])).unwrap();

    let mut t = 0.0;
    let mut u = Vector::from_array([1.0]);
    for _ in 0..10 {
        let (t1, u1) = adapter.step(t, &u).unwrap();
        t = t1;
        u = u1;
    }
    assert!(!adapter.stalled());
    assert!((t - 1.0).abs() < 1e-12);
    assert!((u[0] - (-1.0_f64).exp()).abs() < 1e-3);
}
