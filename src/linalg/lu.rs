use super::LinalgError;
use crate::matrix::vector::Vector;
use crate::traits::LinalgScalar;
use crate::Matrix;

/// LU decomposition with partial pivoting, in place.
///
/// On return, `a` contains both factors packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (unit diagonal implied)
///
/// `perm` receives the row permutation.
pub fn lu_in_place<T: LinalgScalar, const N: usize>(
    a: &mut Matrix<T, N, N>,
    perm: &mut [usize; N],
) -> Result<(), LinalgError> {
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    for col in 0..N {
        // Partial pivoting: row with largest modulus in this column
        let mut max_row = col;
        let mut max_val = a[(col, col)].modulus();
        for row in (col + 1)..N {
            let val = a[(row, col)].modulus();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < T::lepsilon() {
            return Err(LinalgError::Singular);
        }

        if max_row != col {
            perm.swap(col, max_row);
            a.data.swap(col, max_row);
        }

        let pivot = a[(col, col)];
        let inv_pivot = T::one() / pivot;

        for row in (col + 1)..N {
            let factor = a[(row, col)] * inv_pivot;
            a[(row, col)] = factor;
            for j in (col + 1)..N {
                a[(row, j)] = a[(row, j)] - factor * a[(col, j)];
            }
        }
    }

    Ok(())
}

/// Solve `Ax = b` given the packed LU factors and permutation from
/// [`lu_in_place`].
pub fn lu_solve<T: LinalgScalar, const N: usize>(
    lu: &Matrix<T, N, N>,
    perm: &[usize; N],
    b: &Vector<T, N>,
) -> Vector<T, N> {
    let mut x = Vector::<T, N>::zeros();

    // Forward substitution: Ly = Pb
    for i in 0..N {
        let mut sum = b[perm[i]];
        for j in 0..i {
            sum = sum - lu[(i, j)] * x[j];
        }
        x[i] = sum;
    }

    // Back substitution: Ux = y
    for i in (0..N).rev() {
        let mut sum = x[i];
        for j in (i + 1)..N {
            sum = sum - lu[(i, j)] * x[j];
        }
        x[i] = sum / lu[(i, i)];
    }

    x
}

/// Solve `Ax = b` directly, factorizing a copy of `A`.
///
/// ```
/// use odestep::{linalg, Matrix, Vector};
///
/// let a = Matrix::new([
///     [2.0_f64, 1.0, -1.0],
///     [-3.0, -1.0, 2.0],
///     [-2.0, 1.0, 2.0],
/// ]);
/// let b = Vector::from_array([8.0, -11.0, -3.0]);
/// let x = linalg::solve(&a, &b).unwrap(); // x = [2, 3, -1]
/// assert!((x[0] - 2.0).abs() < 1e-12);
/// assert!((x[1] - 3.0).abs() < 1e-12);
/// assert!((x[2] + 1.0).abs() < 1e-12);
/// ```
pub fn solve<T: LinalgScalar, const N: usize>(
    a: &Matrix<T, N, N>,
    b: &Vector<T, N>,
) -> Result<Vector<T, N>, LinalgError> {
    let mut lu = *a;
    let mut perm = [0usize; N];
    lu_in_place(&mut lu, &mut perm)?;
    Ok(lu_solve(&lu, &perm, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_identity() {
        let a: Matrix<f64, 2, 2> = Matrix::eye();
        let b = Vector::from_array([3.0, -4.0]);
        let x = solve(&a, &b).unwrap();
        assert_eq!(x, b);
    }

    #[test]
    fn solve_with_pivoting() {
        // Leading zero forces a row swap.
        let a = Matrix::new([[0.0_f64, 2.0], [1.0, 1.0]]);
        let b = Vector::from_array([4.0, 3.0]);
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_rejected() {
        let a = Matrix::new([[1.0_f64, 2.0], [2.0, 4.0]]);
        let b = Vector::from_array([1.0, 2.0]);
        assert_eq!(solve(&a, &b).unwrap_err(), LinalgError::Singular);
    }
}
