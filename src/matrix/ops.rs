use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::matrix::vector::Vector;
use crate::traits::Scalar;
use crate::Matrix;

// ── Element-wise addition ───────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Add for Matrix<T, M, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        for i in 0..M {
            for j in 0..N {
                out[(i, j)] = self[(i, j)] + rhs[(i, j)];
            }
        }
        out
    }
}

impl<T: Scalar, const M: usize, const N: usize> AddAssign for Matrix<T, M, N> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..M {
            for j in 0..N {
                self[(i, j)] = self[(i, j)] + rhs[(i, j)];
            }
        }
    }
}

// ── Element-wise subtraction ────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Sub for Matrix<T, M, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut out = self;
        for i in 0..M {
            for j in 0..N {
                out[(i, j)] = self[(i, j)] - rhs[(i, j)];
            }
        }
        out
    }
}

impl<T: Scalar, const M: usize, const N: usize> SubAssign for Matrix<T, M, N> {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..M {
            for j in 0..N {
                self[(i, j)] = self[(i, j)] - rhs[(i, j)];
            }
        }
    }
}

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Neg for Matrix<T, M, N> {
    type Output = Self;

    fn neg(self) -> Self {
        let mut out = self;
        for i in 0..M {
            for j in 0..N {
                out[(i, j)] = T::zero() - self[(i, j)];
            }
        }
        out
    }
}

// ── Scalar multiplication and division ──────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Mul<T> for Matrix<T, M, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        let mut out = self;
        for i in 0..M {
            for j in 0..N {
                out[(i, j)] = self[(i, j)] * rhs;
            }
        }
        out
    }
}

impl<T: Scalar, const M: usize, const N: usize> MulAssign<T> for Matrix<T, M, N> {
    fn mul_assign(&mut self, rhs: T) {
        for i in 0..M {
            for j in 0..N {
                self[(i, j)] = self[(i, j)] * rhs;
            }
        }
    }
}

impl<T: Scalar, const M: usize, const N: usize> Div<T> for Matrix<T, M, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        let mut out = self;
        for i in 0..M {
            for j in 0..N {
                out[(i, j)] = self[(i, j)] / rhs;
            }
        }
        out
    }
}

// ── Matrix-vector products ──────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Matrix-vector product `A·v`, treating `v` as a column.
    ///
    /// ```
    /// use odestep::{Matrix, Vector};
    /// let a = Matrix::new([[1.0, 2.0], [3.0, 4.0]]);
    /// let v = Vector::from_array([1.0, 1.0]);
    /// let av = a.mul_vector(&v);
    /// assert_eq!(av[0], 3.0);
    /// assert_eq!(av[1], 7.0);
    /// ```
    pub fn mul_vector(&self, v: &Vector<T, N>) -> Vector<T, M> {
        let mut out = Vector::<T, M>::zeros();
        for i in 0..M {
            let mut sum = T::zero();
            for j in 0..N {
                sum = sum + self[(i, j)] * v[j];
            }
            out[i] = sum;
        }
        out
    }

    /// Transposed matrix-vector product `Aᵀ·w`, treating `w` as a column.
    pub fn tr_mul_vector(&self, w: &Vector<T, M>) -> Vector<T, N> {
        let mut out = Vector::<T, N>::zeros();
        for j in 0..N {
            let mut sum = T::zero();
            for i in 0..M {
                sum = sum + self[(i, j)] * w[i];
            }
            out[j] = sum;
        }
        out
    }
}
