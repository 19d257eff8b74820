use alloc::vec::Vec;
use core::mem;

use crate::linalg::householder::{
    compute_tau_and_divide, divide_elements_bcol, rank1_update_left, rank1_update_right,
};
use crate::linalg::LinalgError;
use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// Similarity reduction of a square matrix to upper Hessenberg form,
/// `A = Q H Qᵀ`, using Householder reflectors.
///
/// Like [`BidiagonalDecomposition`](crate::BidiagonalDecomposition) this
/// engine is destructive: `decompose` swaps the input into the combined `QH`
/// storage, with H on and above the sub-diagonal and the reflector vectors
/// packed below it. Step k eliminates column k below the sub-diagonal; a zero
/// gamma marks a step where the column was already zero.
#[derive(Debug)]
pub struct HessenbergDecomposition<T> {
    /// Combined storage for H and the packed reflector vectors.
    qh: DenseMatrix<T>,
    n: usize,

    gammas: Vec<T>,
    /// Staging buffer for the rank-1 updates.
    b: Vec<T>,
    /// Contiguous copy of the reflector being applied.
    u: Vec<T>,
}

impl<T: FloatScalar> HessenbergDecomposition<T> {
    pub fn new() -> Self {
        Self {
            qh: DenseMatrix::default(),
            n: 0,
            gammas: Vec::new(),
            b: Vec::new(),
            u: Vec::new(),
        }
    }

    /// Reduce `a` to Hessenberg form. Panics if `a` is not square.
    ///
    /// Destructive: the caller's matrix is swapped into the engine and
    /// afterwards holds the engine's retired workspace.
    pub fn decompose(&mut self, a: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        assert!(a.is_square(), "Hessenberg reduction requires a square matrix");
        self.init(a);
        for k in 0..self.n.saturating_sub(2) {
            self.compute_step(k);
        }
        Ok(())
    }

    /// The input matrix is claimed by `decompose`.
    pub fn input_modified(&self) -> bool {
        true
    }

    fn init(&mut self, a: &mut DenseMatrix<T>) {
        mem::swap(&mut self.qh, a);
        self.n = self.qh.num_rows();

        if self.b.len() < self.n {
            self.b.resize(self.n, T::zero());
            self.u.resize(self.n, T::zero());
        }
        if self.gammas.len() < self.n {
            self.gammas.resize(self.n, T::zero());
        }
    }

    /// Eliminate column k below the sub-diagonal and apply the reflector
    /// from both sides to preserve similarity.
    fn compute_step(&mut self, k: usize) {
        let n = self.n;

        let mut max = T::zero();
        {
            let data = self.qh.data();
            for i in (k + 1)..n {
                let val = data[i * n + k];
                self.u[i] = val;
                let val = val.abs();
                if val > max {
                    max = val;
                }
            }
        }

        if max > T::zero() {
            let tau = compute_tau_and_divide(k + 1, n, &mut self.u, max);

            let nu = self.u[k + 1] + tau;
            divide_elements_bcol(k + 2, n, n, &mut self.u, self.qh.data_mut(), k, nu);
            self.u[k + 1] = T::one();

            let gamma = nu / tau;
            self.gammas[k] = gamma;

            // two-sided application keeps the eigenvalues unchanged
            rank1_update_left(&mut self.qh, &self.u, gamma, k + 1, k + 1, n, &mut self.b);
            rank1_update_right(&mut self.qh, &self.u, gamma, 0, k + 1, n);

            self.qh.data_mut()[(k + 1) * n + k] = -tau * max;
        } else {
            self.gammas[k] = T::zero();
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The raw combined QH matrix.
    pub fn qh(&self) -> &DenseMatrix<T> {
        &self.qh
    }

    /// Gamma scale factors for the stored reflectors.
    pub fn gammas(&self) -> &[T] {
        &self.gammas
    }

    /// The upper Hessenberg factor H. Pass a matrix to reuse its storage.
    pub fn get_h(&self, h: Option<DenseMatrix<T>>) -> DenseMatrix<T> {
        let n = self.n;
        let mut h = match h {
            Some(mut h) => {
                h.reshape(n, n, false);
                h.zero();
                h
            }
            None => DenseMatrix::zeros(n, n),
        };

        // row 0 and the upper triangle plus the sub-diagonal
        for j in 0..n {
            h.set(0, j, self.qh.get(0, j));
        }
        for i in 1..n {
            for j in (i - 1)..n {
                h.set(i, j, self.qh.get(i, j));
            }
        }
        h
    }

    /// The orthogonal factor Q, accumulated by replaying the stored
    /// reflectors in reverse order onto the identity.
    pub fn get_q(&mut self, q: Option<DenseMatrix<T>>) -> DenseMatrix<T> {
        let n = self.n;
        let mut q = match q {
            Some(mut q) => {
                q.reshape(n, n, false);
                q
            }
            None => DenseMatrix::zeros(n, n),
        };
        q.set_identity();

        for i in 0..n {
            self.u[i] = T::zero();
        }

        for j in (0..n.saturating_sub(2)).rev() {
            self.u[j + 1] = T::one();
            for i in (j + 2)..n {
                self.u[i] = self.qh.get(i, j);
            }
            rank1_update_left(&mut q, &self.u, self.gammas[j], j + 1, j + 1, n, &mut self.b);
        }

        q
    }
}

impl<T: FloatScalar> Default for HessenbergDecomposition<T> {
    fn default() -> Self {
        Self::new()
    }
}
