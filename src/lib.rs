//! # odestep
//!
//! Numerical time integration for ODEs and DAEs: pluggable one-step
//! schemes over fixed-size state vectors, with the nonlinear machinery
//! implicit schemes need and the accumulation discipline long
//! integrations need.
//!
//! The outer time loop stays yours: it owns the clock and the state,
//! and calls `step(t, u) -> (t1, u1)` on whichever scheme it was given.
//! This crate supplies the schemes.
//!
//! ## Quick start
//!
//! ```
//! use odestep::{RungeKutta4, Scheme, Vector};
//!
//! // Harmonic oscillator y'' = -y as the first-order system [y, y']
//! let sys = |_t: f64, u: &Vector<f64, 2>| Vector::from_array([u[1], -u[0]]);
//!
//! let mut scheme = RungeKutta4::with_stepsize(sys, 1e-3);
//! let mut t = 0.0;
//! let mut u = Vector::from_array([1.0, 0.0]);
//! scheme.initialize(t, &u).unwrap();
//! while t < core::f64::consts::TAU {
//!     let (t1, u1) = scheme.step(t, &u).unwrap();
//!     t = t1;
//!     u = u1;
//! }
//! assert!((u[0] - 1.0).abs() < 1e-6); // cos(2π) ≈ 1
//! ```
//!
//! ## Modules
//!
//! - [`scheme`] — the [`Scheme`] contract and its variants: explicit
//!   Euler, explicit trapezoidal, classic RK4, adaptive RK34 with
//!   error-driven step-size control, backward Euler (root-finding with
//!   fallback plus compensated summation), and an adapter delegating to
//!   an external stiff BDF solver.
//!
//! - [`rootfind`] — nonlinear root finding for the implicit schemes: a
//!   quasi-Newton direct solve, classical Newton iteration, and the
//!   try-direct-else-Newton fallback policy.
//!
//! - [`system`] — the [`VectorField`] contract (closures qualify) and
//!   the [`NonHolonomic`] trait splitting a constrained mechanical
//!   system into the two additive parts a partitioned (Spark-style)
//!   integrator consumes.
//!
//! - [`matrix`] — stack-allocated, const-generic `Matrix<T, M, N>` and
//!   the [`Vector`] state type, over real or complex elements.
//!
//! - [`linalg`] — LU decomposition with partial pivoting, shared by the
//!   Newton-type solvers.
//!
//! ## Real and complex states
//!
//! All schemes are generic over [`LinalgScalar`], covering `f32`/`f64`
//! and `Complex<f32>`/`Complex<f64>` states with real time and step
//! size. Components that wrap dual-variant external solvers pick the
//! real or complex mode once, at `initialize()`.
//!
//! ## Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | yes     | Hardware FPU via the system libm |
//! | `libm`  | no      | Pure-Rust software float fallback for no-std |
//!
//! Logging goes through the [`log`] facade; the crate never installs a
//! logger.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod linalg;
pub mod matrix;
pub mod rootfind;
pub mod scheme;
pub mod system;
pub mod traits;

pub use matrix::vector::Vector;
pub use matrix::Matrix;
pub use num_complex::Complex;

pub use scheme::{
    Bdf2, Bdf2Factory, CompensatedSum, ExplicitEuler, ExplicitTrapezoidal, ImplicitEuler,
    ResidualScheme, RungeKutta34, RungeKutta4, Scheme, SchemeError, StiffAdapter, StiffIntegrator,
    StiffSolverFactory, StiffVariant, DEFAULT_STEPSIZE,
};

pub use rootfind::{RootError, RootResult, RootSettings};
pub use system::{NonHolonomic, SparkPart, VectorField};
pub use traits::{FloatScalar, LinalgScalar, Scalar};
