use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use num_complex::Complex;

use crate::linalg::hessenberg::HessenbergDecomposition;
use crate::linalg::householder::find_max;
use crate::linalg::LinalgError;
use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// Eigenvalues of a 2x2 block.
fn eig2x2<T: FloatScalar>(a: T, b: T, c: T, d: T) -> (Complex<T>, Complex<T>) {
    let half = T::one() / (T::one() + T::one());
    let tr = (a + d) * half;
    let det = a * d - b * c;
    let disc = tr * tr - det;

    if disc >= T::zero() {
        let sq = disc.sqrt();
        (
            Complex::new(tr + sq, T::zero()),
            Complex::new(tr - sq, T::zero()),
        )
    } else {
        let sq = (T::zero() - disc).sqrt();
        (Complex::new(tr, sq), Complex::new(tr, T::zero() - sq))
    }
}

/// 3-element Householder: returns (v0, v1, v2, tau) with v0 = 1.
#[inline]
fn householder3<T: FloatScalar>(x: T, y: T, z: T) -> (T, T, T, T) {
    let norm = (x * x + y * y + z * z).sqrt();
    if norm <= T::epsilon() {
        return (T::one(), T::zero(), T::zero(), T::zero());
    }
    let sign = if x >= T::zero() { T::one() } else { T::zero() - T::one() };
    let u0 = x + sign * norm;
    let v1 = y / u0;
    let v2 = z / u0;
    let tau = (T::one() + T::one()) / (T::one() + v1 * v1 + v2 * v2);
    (T::one(), v1, v2, tau)
}

/// 2-element Householder: returns (v0, v1, tau) with v0 = 1.
#[inline]
fn householder2<T: FloatScalar>(x: T, y: T) -> (T, T, T) {
    let norm = (x * x + y * y).sqrt();
    if norm <= T::epsilon() {
        return (T::one(), T::zero(), T::zero());
    }
    let sign = if x >= T::zero() { T::one() } else { T::zero() - T::one() };
    let u0 = x + sign * norm;
    let v1 = y / u0;
    let tau = (T::one() + T::one()) / (T::one() + v1 * v1);
    (T::one(), v1, tau)
}

/// Francis double-shift QR iteration on an upper Hessenberg matrix.
///
/// Drives `h` towards real Schur form (quasi-upper-triangular), recording
/// each eigenvalue as it deflates off the bottom of the active block,
/// together with its diagonal index. Real eigenvalues deflate as 1x1 blocks;
/// complex conjugate pairs as 2x2 blocks.
///
/// When `create_r` is false only the active block is kept consistent: the
/// left updates stop at the block's right edge and the right updates at its
/// top edge, leaving the rest of `h` stale. That is enough for eigenvalues
/// and skips roughly half the arithmetic. With `create_r` set the full
/// quasi-triangular factor is produced, and `q` (when provided) accumulates
/// the orthogonal similarity transform.
///
/// The deflation sequence is unaffected by `create_r`: the active block sees
/// identical arithmetic either way, so two runs over the same input record
/// the same eigenvalues at the same indices in the same order.
fn implicit_qr<T: FloatScalar>(
    h: &mut DenseMatrix<T>,
    mut q: Option<&mut DenseMatrix<T>>,
    create_r: bool,
    max_iter: usize,
    values: &mut Vec<Complex<T>>,
    indices: &mut Vec<usize>,
) -> Result<(), LinalgError> {
    let n = h.num_rows();
    values.clear();
    indices.clear();

    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        values.push(Complex::new(h.get(0, 0), T::zero()));
        indices.push(0);
        return Ok(());
    }

    let eps = T::epsilon();
    let mut iter = 0usize;
    let mut p = n; // active submatrix is h[0..p, 0..p]

    while p > 2 {
        // deflate a single real eigenvalue off the bottom
        let tol = eps * (h.get(p - 2, p - 2).abs() + h.get(p - 1, p - 1).abs());
        if h.get(p - 1, p - 2).abs() <= tol {
            h.set(p - 1, p - 2, T::zero());
            values.push(Complex::new(h.get(p - 1, p - 1), T::zero()));
            indices.push(p - 1);
            p -= 1;
            continue;
        }

        // deflate a trailing 2x2 block
        if p >= 3 {
            let tol2 = eps * (h.get(p - 3, p - 3).abs() + h.get(p - 2, p - 2).abs());
            if h.get(p - 2, p - 3).abs() <= tol2 {
                h.set(p - 2, p - 3, T::zero());
                let (l0, l1) = eig2x2(
                    h.get(p - 2, p - 2),
                    h.get(p - 2, p - 1),
                    h.get(p - 1, p - 2),
                    h.get(p - 1, p - 1),
                );
                values.push(l0);
                indices.push(p - 2);
                values.push(l1);
                indices.push(p - 1);
                p -= 2;
                continue;
            }
        }

        iter += 1;
        if iter > max_iter {
            return Err(LinalgError::ConvergenceFailure);
        }

        // find the start of the active unreduced block
        let mut q_start = p - 1;
        while q_start > 0 {
            let tol_q =
                eps * (h.get(q_start - 1, q_start - 1).abs() + h.get(q_start, q_start).abs());
            if h.get(q_start, q_start - 1).abs() <= tol_q {
                h.set(q_start, q_start - 1, T::zero());
                break;
            }
            q_start -= 1;
        }

        // exceptional shift every 10 iterations
        let (s, t) = if iter % 10 == 0 {
            let w = h.get(p - 1, p - 2).abs() + h.get(p - 2, p - 3).abs();
            (w + w, w * w)
        } else {
            // Francis double shift from the bottom-right 2x2 block
            let a11 = h.get(p - 2, p - 2);
            let a12 = h.get(p - 2, p - 1);
            let a21 = h.get(p - 1, p - 2);
            let a22 = h.get(p - 1, p - 1);
            (a11 + a22, a11 * a22 - a12 * a21)
        };

        // implicit double shift: first column of (H^2 - s*H + t*I)
        let h00 = h.get(q_start, q_start);
        let h10 = h.get(q_start + 1, q_start);
        let h01 = h.get(q_start, q_start + 1);
        let h11 = h.get(q_start + 1, q_start + 1);

        let mut x = h00 * h00 + h01 * h10 - s * h00 + t;
        let mut y = h10 * (h00 + h11 - s);
        let mut z = if q_start + 2 < p {
            h10 * h.get(q_start + 2, q_start + 1)
        } else {
            T::zero()
        };

        // chase the bulge down the diagonal
        for k in q_start..(p - 1) {
            let (v0, v1, v2, tau) = if k + 2 < p {
                householder3(x, y, z)
            } else {
                let (v0h, v1h, tau_h) = householder2(x, y);
                (v0h, v1h, T::zero(), tau_h)
            };
            let use3 = k + 2 < p;

            let col_start = if k > q_start { k - 1 } else { k };

            // apply from the left
            let col_end = if create_r { n } else { p };
            for j in col_start..col_end {
                let mut dot = v0 * h.get(k, j) + v1 * h.get(k + 1, j);
                if use3 {
                    dot = dot + v2 * h.get(k + 2, j);
                }
                dot = tau * dot;
                h.set(k, j, h.get(k, j) - dot * v0);
                h.set(k + 1, j, h.get(k + 1, j) - dot * v1);
                if use3 {
                    h.set(k + 2, j, h.get(k + 2, j) - dot * v2);
                }
            }

            // apply from the right
            let row_end = if use3 { (k + 4).min(p) } else { p }.min(n);
            let row_start = if create_r { 0 } else { q_start };
            for i in row_start..row_end {
                let mut dot = v0 * h.get(i, k) + v1 * h.get(i, k + 1);
                if use3 {
                    dot = dot + v2 * h.get(i, k + 2);
                }
                dot = tau * dot;
                h.set(i, k, h.get(i, k) - dot * v0);
                h.set(i, k + 1, h.get(i, k + 1) - dot * v1);
                if use3 {
                    h.set(i, k + 2, h.get(i, k + 2) - dot * v2);
                }
            }

            // accumulate into Q
            if let Some(q) = q.as_mut() {
                for i in 0..n {
                    let mut dot = v0 * q.get(i, k) + v1 * q.get(i, k + 1);
                    if use3 {
                        dot = dot + v2 * q.get(i, k + 2);
                    }
                    dot = tau * dot;
                    q.set(i, k, q.get(i, k) - dot * v0);
                    q.set(i, k + 1, q.get(i, k + 1) - dot * v1);
                    if use3 {
                        q.set(i, k + 2, q.get(i, k + 2) - dot * v2);
                    }
                }
            }

            // pick up the fill-in entries from column k for the next bulge
            if k + 2 < p - 1 {
                x = h.get(k + 1, k);
                y = h.get(k + 2, k);
                z = h.get(k + 3, k);
            } else if k + 1 < p - 1 {
                x = h.get(k + 1, k);
                y = h.get(k + 2, k);
                z = T::zero();
            }
        }

        // clean up sub-sub-diagonal noise inside the active block
        for i in q_start..p {
            for j in q_start..i.saturating_sub(1) {
                if h.get(i, j).abs() < eps * (h.get(i, i).abs() + h.get(j, j).abs()) {
                    h.set(i, j, T::zero());
                }
            }
        }
    }

    // remaining 1x1 or 2x2 block at the top
    if p == 2 {
        let tol = eps * (h.get(0, 0).abs() + h.get(1, 1).abs());
        if h.get(1, 0).abs() <= tol {
            h.set(1, 0, T::zero());
            values.push(Complex::new(h.get(1, 1), T::zero()));
            indices.push(1);
            values.push(Complex::new(h.get(0, 0), T::zero()));
            indices.push(0);
        } else {
            let (l0, l1) = eig2x2(h.get(0, 0), h.get(0, 1), h.get(1, 0), h.get(1, 1));
            values.push(l0);
            indices.push(0);
            values.push(l1);
            indices.push(1);
        }
    } else if p == 1 {
        values.push(Complex::new(h.get(0, 0), T::zero()));
        indices.push(0);
    }

    Ok(())
}

/// Eigenvalue decomposition of a general real square matrix via Hessenberg
/// reduction followed by implicit double-shift QR iteration.
///
/// Eigenvalues are reported in deflation order, each as a
/// [`Complex`](num_complex::Complex) number; conjugate pairs appear adjacent.
/// When constructed with `compute_vectors`, the QR iteration runs twice: a
/// cheap values-only pass, then a full pass that builds the quasi-triangular
/// factor and Schur vectors, from which real eigenvectors are recovered by
/// back-substitution. Eigenvectors of complex eigenvalues are not computed
/// and are reported as `None`.
///
/// # Example
///
/// ```
/// use factoris::{DenseMatrix, EigenDecomposition};
///
/// let mut a = DenseMatrix::from_rows(2, 2, &[2.0_f64, 0.0, 0.0, 3.0]);
/// let mut eigen = EigenDecomposition::new(true);
/// eigen.decompose(&mut a).unwrap();
///
/// let mut sum = 0.0;
/// for i in 0..eigen.number_of_eigenvalues() {
///     sum += eigen.eigenvalue(i).re;
/// }
/// assert!((sum - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct EigenDecomposition<T: FloatScalar> {
    hessenberg: HessenbergDecomposition<T>,
    compute_vectors: bool,

    values: Vec<Complex<T>>,
    /// Diagonal index in the quasi-triangular factor for each eigenvalue.
    indices: Vec<usize>,
    /// Position-aligned with `values`; `None` for complex eigenvalues or
    /// when vectors were not requested.
    vectors: Vec<Option<DenseMatrix<T>>>,

    /// Hessenberg form, kept so the second QR pass can restart from it.
    h: DenseMatrix<T>,
    /// Quasi-triangular factor being iterated on.
    t: DenseMatrix<T>,
    /// Accumulated orthogonal transform (only valid with vectors).
    q: DenseMatrix<T>,
}

impl<T: FloatScalar> EigenDecomposition<T> {
    pub fn new(compute_vectors: bool) -> Self {
        Self {
            hessenberg: HessenbergDecomposition::new(),
            compute_vectors,
            values: Vec::new(),
            indices: Vec::new(),
            vectors: Vec::new(),
            h: DenseMatrix::default(),
            t: DenseMatrix::default(),
            q: DenseMatrix::default(),
        }
    }

    /// Compute eigenvalues (and eigenvectors, if requested) of `a`.
    ///
    /// Panics if `a` is not square. Destructive: the caller's matrix is
    /// swapped into the engine. Fails with
    /// [`ConvergenceFailure`](LinalgError::ConvergenceFailure) if the QR
    /// iteration does not deflate every eigenvalue within `30 n` iterations.
    pub fn decompose(&mut self, a: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        assert!(a.is_square(), "eigenvalue decomposition requires a square matrix");
        let n = a.num_rows();
        let max_iter = 30 * n.max(1);

        self.vectors.clear();
        self.hessenberg.decompose(a)?;
        self.h = self.hessenberg.get_h(Some(mem::take(&mut self.h)));

        // values-only pass
        self.t.set_from(&self.h);
        implicit_qr(
            &mut self.t,
            None,
            false,
            max_iter,
            &mut self.values,
            &mut self.indices,
        )?;

        if self.compute_vectors {
            // full pass: rebuild T from the Hessenberg form with the Schur
            // vectors accumulated; both passes deflate identically, so the
            // recorded values stay aligned with the factor
            self.q = self.hessenberg.get_q(Some(mem::take(&mut self.q)));
            self.t.set_from(&self.h);
            implicit_qr(
                &mut self.t,
                Some(&mut self.q),
                true,
                max_iter,
                &mut self.values,
                &mut self.indices,
            )?;
            self.extract_vectors();
        }

        Ok(())
    }

    /// The input matrix is claimed by `decompose`.
    pub fn input_modified(&self) -> bool {
        true
    }

    pub fn number_of_eigenvalues(&self) -> usize {
        self.values.len()
    }

    /// The i-th eigenvalue, in deflation order.
    pub fn eigenvalue(&self, i: usize) -> Complex<T> {
        self.values[i]
    }

    /// All eigenvalues, in deflation order.
    pub fn eigenvalues(&self) -> &[Complex<T>] {
        &self.values
    }

    /// Eigenvector paired with [`eigenvalue`](Self::eigenvalue)`(i)`, as an
    /// `n x 1` unit-norm column.
    ///
    /// `None` for complex eigenvalues and when the decomposition was
    /// constructed without vectors.
    pub fn eigenvector(&self, i: usize) -> Option<&DenseMatrix<T>> {
        self.vectors.get(i)?.as_ref()
    }

    /// Solve `(T - λI) y = 0` by back-substitution over the
    /// quasi-triangular factor for each real eigenvalue, then map back
    /// through the Schur vectors.
    fn extract_vectors(&mut self) {
        let n = self.t.num_rows();
        let eps = T::epsilon();
        let t_norm = {
            let m = find_max(self.t.data(), 0, n * n);
            if m > T::zero() {
                m
            } else {
                T::one()
            }
        };

        self.vectors.clear();
        let mut y = vec![T::zero(); n];

        for k in 0..self.values.len() {
            let lambda = self.values[k];
            if lambda.im != T::zero() {
                self.vectors.push(None);
                continue;
            }
            let lam = lambda.re;
            let e = self.indices[k];

            for v in y.iter_mut() {
                *v = T::zero();
            }

            // seed the trailing block; deflation zeroes the sub-diagonal at
            // every block boundary, so a nonzero entry means e sits inside
            // an unsplit 2x2 block
            let top = if e + 1 < n && self.t.get(e + 1, e) != T::zero() {
                // block (e, e+1): null vector of the 2x2 minus lambda.
                // (b, λ-a) degenerates when b == 0 and λ == a; the mirror
                // form (λ-d, c) is also a null vector and cannot vanish
                // since c is the nonzero sub-diagonal
                y[e] = self.t.get(e, e + 1);
                y[e + 1] = lam - self.t.get(e, e);
                if y[e].abs() + y[e + 1].abs() <= eps * t_norm {
                    y[e] = lam - self.t.get(e + 1, e + 1);
                    y[e + 1] = self.t.get(e + 1, e);
                }
                e
            } else if e > 0 && self.t.get(e, e - 1) != T::zero() {
                // block (e-1, e)
                y[e - 1] = self.t.get(e - 1, e);
                y[e] = lam - self.t.get(e - 1, e - 1);
                if y[e - 1].abs() + y[e].abs() <= eps * t_norm {
                    y[e - 1] = lam - self.t.get(e, e);
                    y[e] = self.t.get(e, e - 1);
                }
                e - 1
            } else {
                y[e] = T::one();
                e
            };

            // back-substitute upwards; 2x2 bumps are solved pairwise
            let mut i = top;
            while i > 0 {
                i -= 1;
                if i > 0 && self.t.get(i, i - 1) != T::zero() {
                    let (r0, r1) = (i - 1, i);
                    let mut rhs0 = T::zero();
                    let mut rhs1 = T::zero();
                    for j in (i + 1)..n {
                        rhs0 = rhs0 - self.t.get(r0, j) * y[j];
                        rhs1 = rhs1 - self.t.get(r1, j) * y[j];
                    }
                    let a11 = self.t.get(r0, r0) - lam;
                    let a12 = self.t.get(r0, r1);
                    let a21 = self.t.get(r1, r0);
                    let a22 = self.t.get(r1, r1) - lam;
                    let mut det = a11 * a22 - a12 * a21;
                    if det.abs() <= eps * t_norm * t_norm {
                        det = eps * t_norm * t_norm;
                    }
                    y[r0] = (rhs0 * a22 - a12 * rhs1) / det;
                    y[r1] = (a11 * rhs1 - a21 * rhs0) / det;
                    i -= 1;
                } else {
                    let mut rhs = T::zero();
                    for j in (i + 1)..n {
                        rhs = rhs - self.t.get(i, j) * y[j];
                    }
                    let mut denom = self.t.get(i, i) - lam;
                    if denom.abs() <= eps * t_norm {
                        denom = eps * t_norm;
                    }
                    y[i] = rhs / denom;
                }
            }

            // x = Q y, normalized
            let mut x = DenseMatrix::zeros(n, 1);
            let mut norm = T::zero();
            for r in 0..n {
                let mut sum = T::zero();
                for c in 0..n {
                    sum = sum + self.q.get(r, c) * y[c];
                }
                x.set(r, 0, sum);
                norm = norm + sum * sum;
            }
            let norm = norm.sqrt();
            if norm > T::zero() {
                for r in 0..n {
                    x.set(r, 0, x.get(r, 0) / norm);
                }
            }
            self.vectors.push(Some(x));
        }
    }
}
