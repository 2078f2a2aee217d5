use crate::matrix::vector::Vector;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Tag identifying one additive half of the partitioned dynamics.
///
/// A partitioned (Spark Lobatto IIIA-IIIB) integrator evaluates the two
/// halves at different internal stage times, so each must be computable
/// from the current augmented state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparkPart {
    /// Carries the velocity into the position slot: `[v, 0]`.
    Kinematic,
    /// Carries external plus reaction force into the velocity slot:
    /// `[0, f + F]`.
    Dynamic,
}

/// A mechanical system subject to nonholonomic (velocity-level)
/// constraints, presented as a DAE.
///
/// The full state `u` decomposes into position, velocity, and Lagrange
/// multiplier blocks. By convention (and as the provided accessor
/// defaults assume) the layout is `u = [q | v | λ]`; systems with a
/// different layout override the block accessors.
///
/// Const parameters (relations documented, not machine-checked):
///
/// - `D` — degrees of freedom (position and velocity block size)
/// - `C` — number of constraints (multiplier block size)
/// - `A` — augmented `(q, v)` state size, `A = 2D`
/// - `N` — full state size, `N = 2D + C`
///
/// Only `position`/`velocity`/`lag` layout, `force`, `codistribution`,
/// and `energy` are system-specific; the constraint residual, reaction
/// force, and partitioned splitting are derived.
pub trait NonHolonomic<T: FloatScalar, const D: usize, const C: usize, const A: usize, const N: usize>
{
    /// External (constraint-free) force acting on the velocity block.
    fn force(&self, u: &Vector<T, N>) -> Vector<T, D>;

    /// Codistribution at the current configuration: the C×D matrix
    /// whose rows span the constrained directions.
    fn codistribution(&self, u: &Vector<T, N>) -> Matrix<T, C, D>;

    /// Total mechanical energy at `u`.
    fn energy(&self, u: &Vector<T, N>) -> T;

    /// Position block `q`.
    fn position(&self, u: &Vector<T, N>) -> Vector<T, D> {
        let mut q = Vector::zeros();
        for i in 0..D {
            q[i] = u[i];
        }
        q
    }

    /// Velocity block `v`.
    fn velocity(&self, u: &Vector<T, N>) -> Vector<T, D> {
        let mut v = Vector::zeros();
        for i in 0..D {
            v[i] = u[D + i];
        }
        v
    }

    /// Lagrange multiplier block `λ`.
    fn lag(&self, u: &Vector<T, N>) -> Vector<T, C> {
        let mut l = Vector::zeros();
        for i in 0..C {
            l[i] = u[2 * D + i];
        }
        l
    }

    /// Assemble a full state from its blocks.
    fn assemble(&self, q: &Vector<T, D>, v: &Vector<T, D>, l: &Vector<T, C>) -> Vector<T, N> {
        let mut u = Vector::zeros();
        for i in 0..D {
            u[i] = q[i];
            u[D + i] = v[i];
        }
        for i in 0..C {
            u[2 * D + i] = l[i];
        }
        u
    }

    /// Constraint residual: the codistribution contracted with the
    /// velocity, `⟨ω(q), v⟩`. Vanishes on admissible states.
    fn constraint(&self, u: &Vector<T, N>) -> Vector<T, C> {
        self.codistribution(u).mul_vector(&self.velocity(u))
    }

    /// Reaction force: the codistribution contracted with the
    /// multiplier, `ωᵀ(q)·λ` — the constraint's back-reaction on the
    /// dynamics.
    fn reaction_force(&self, u: &Vector<T, N>) -> Vector<T, D> {
        self.codistribution(u).tr_mul_vector(&self.lag(u))
    }

    /// One additive contribution to the split dynamics over the
    /// augmented `(q, v)` state.
    ///
    /// Summing the two parts' nonzero halves reconstructs the standard
    /// second-order mechanical ODE with constraint reaction:
    /// `q̇ = v`, `v̇ = f + F`.
    fn multi_dynamics(&self, part: SparkPart, u: &Vector<T, N>) -> Vector<T, A> {
        let mut out = Vector::zeros();
        match part {
            SparkPart::Kinematic => {
                let v = self.velocity(u);
                for i in 0..D {
                    out[i] = v[i];
                }
            }
            SparkPart::Dynamic => {
                let fv = self.force(u) + self.reaction_force(u);
                for i in 0..D {
                    out[D + i] = fv[i];
                }
            }
        }
        out
    }
}
