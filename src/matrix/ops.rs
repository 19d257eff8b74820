use core::ops::Mul;

use super::DenseMatrix;
use crate::traits::Scalar;

// ── Multiplication ──────────────────────────────────────────────────

/// Matrix product `A * B`. Panics if the inner dimensions do not match.
impl<T: Scalar> Mul<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(
            self.num_cols(),
            rhs.num_rows(),
            "matrix multiply dimension mismatch: {}x{} * {}x{}",
            self.num_rows(),
            self.num_cols(),
            rhs.num_rows(),
            rhs.num_cols(),
        );
        let m = self.num_rows();
        let n = rhs.num_cols();
        let k = self.num_cols();

        let mut out = DenseMatrix::zeros(m, n);
        for i in 0..m {
            for p in 0..k {
                let aip = self.get(i, p);
                for j in 0..n {
                    let v = out.get(i, j) + aip * rhs.get(p, j);
                    out.set(i, j, v);
                }
            }
        }
        out
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Return the transpose as a new matrix.
    pub fn transpose(&self) -> DenseMatrix<T> {
        let mut out = DenseMatrix::zeros(self.num_cols(), self.num_rows());
        for i in 0..self.num_rows() {
            for j in 0..self.num_cols() {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    /// Overwrite the matrix with the identity.
    ///
    /// Every element is written, so stale contents left by a non-preserving
    /// [`reshape`](DenseMatrix::reshape) are cleared.
    pub fn set_identity(&mut self) {
        for i in 0..self.num_rows() {
            for j in 0..self.num_cols() {
                self.set(i, j, if i == j { T::one() } else { T::zero() });
            }
        }
    }
}
