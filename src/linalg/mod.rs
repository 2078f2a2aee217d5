//! Dense linear solves used by the Newton-type root finders.
//!
//! LU decomposition with partial pivoting over [`crate::LinalgScalar`]
//! elements, so the same factorization serves real and complex Jacobians.

mod lu;

use core::fmt;

pub use lu::{lu_in_place, lu_solve, solve};

/// Errors from linear algebra operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// Matrix is singular to working precision.
    Singular,
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singular => write!(f, "matrix is singular to working precision"),
        }
    }
}
