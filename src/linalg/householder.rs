//! Householder reflector kernels.
//!
//! Low-level primitives shared by every decomposition in this crate: reflector
//! scale computation, normalized division into matrix storage, and rank-1
//! application of `I - γuuᵀ` from either side. All of them work on flat
//! row-major buffers with explicit index arithmetic and never allocate.
//!
//! None of these fail. A sub-vector whose absolute maximum is zero never
//! reaches them: the calling engine records a zero gamma instead (the
//! identity transform) and skips the step.

use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// Absolute-value maximum of `u[start..start + length]`.
///
/// Every reflector computation calls this first to pick a safe normalizer
/// for the sub-vector, mitigating overflow/underflow in the norm.
pub fn find_max<T: FloatScalar>(u: &[T], start: usize, length: usize) -> T {
    let mut max = T::zero();
    for &v in &u[start..start + length] {
        let v = v.abs();
        if v > max {
            max = v;
        }
    }
    max
}

/// Normalize `u[j..num_rows]` by `max` in place and return
/// `tau = sign(u[j]) * ||u[j..num_rows]||` of the normalized sub-vector.
///
/// The sign selection makes the later `u[j] + tau` addition free of
/// catastrophic cancellation.
pub fn compute_tau_and_divide<T: FloatScalar>(
    j: usize,
    num_rows: usize,
    u: &mut [T],
    max: T,
) -> T {
    let mut tau = T::zero();
    for i in j..num_rows {
        let d = u[i] / max;
        u[i] = d;
        tau = tau + d * d;
    }
    let mut tau = tau.sqrt();
    if u[j] < T::zero() {
        tau = -tau;
    }
    tau
}

/// Divide `u[j..num_rows]` by `alpha`, mirroring each quotient into column
/// `start_b` of the `num_cols`-wide flat matrix buffer `b`.
///
/// The matrix copy is the packed reflector kept for later replay; `u` is the
/// contiguous fast-access copy the rank-1 updates read.
pub fn divide_elements_bcol<T: FloatScalar>(
    j: usize,
    num_rows: usize,
    num_cols: usize,
    u: &mut [T],
    b: &mut [T],
    start_b: usize,
    alpha: T,
) {
    let mut index_b = j * num_cols + start_b;
    for i in j..num_rows {
        let val = u[i] / alpha;
        u[i] = val;
        b[index_b] = val;
        index_b += num_cols;
    }
}

/// Divide the sub-row `b[start_b + j .. start_b + num_cols]` by `alpha` in
/// place, copying each quotient into `u`.
pub fn divide_elements_brow<T: FloatScalar>(
    j: usize,
    num_cols: usize,
    u: &mut [T],
    b: &mut [T],
    start_b: usize,
    alpha: T,
) {
    let mut index_b = start_b + j;
    for i in j..num_cols {
        let val = b[index_b] / alpha;
        b[index_b] = val;
        u[i] = val;
        index_b += 1;
    }
}

/// Apply `A ← (I - γuuᵀ)A` in place over columns `col_a0..num_cols`, with the
/// reflector window spanning rows `w0..w1`.
///
/// `temp` must hold at least `num_cols` elements; it stages `γ·uᵀA` so the
/// update is two passes over the touched region and no allocation.
pub fn rank1_update_left<T: FloatScalar>(
    a: &mut DenseMatrix<T>,
    u: &[T],
    gamma: T,
    col_a0: usize,
    w0: usize,
    w1: usize,
    temp: &mut [T],
) {
    let num_cols = a.num_cols();
    let data = a.data_mut();

    // temp = uᵀ A over the window rows
    {
        let u0 = u[w0];
        let row = w0 * num_cols;
        for i in col_a0..num_cols {
            temp[i] = u0 * data[row + i];
        }
    }
    for k in (w0 + 1)..w1 {
        let mut index_a = k * num_cols + col_a0;
        let val_u = u[k];
        for i in col_a0..num_cols {
            temp[i] = temp[i] + val_u * data[index_a];
            index_a += 1;
        }
    }
    for t in temp[col_a0..num_cols].iter_mut() {
        *t = *t * gamma;
    }

    // A -= u * temp
    for i in w0..w1 {
        let val_u = u[i];
        let mut index_a = i * num_cols + col_a0;
        for j in col_a0..num_cols {
            data[index_a] = data[index_a] - val_u * temp[j];
            index_a += 1;
        }
    }
}

/// Apply `A ← A(I - γuuᵀ)` in place over rows `row_a0..num_rows`, with the
/// reflector window spanning columns `w0..w1`.
pub fn rank1_update_right<T: FloatScalar>(
    a: &mut DenseMatrix<T>,
    u: &[T],
    gamma: T,
    row_a0: usize,
    w0: usize,
    w1: usize,
) {
    let num_rows = a.num_rows();
    let num_cols = a.num_cols();
    let data = a.data_mut();

    for i in row_a0..num_rows {
        let start_index = i * num_cols + w0;

        let mut sum = T::zero();
        let mut row_index = start_index;
        for j in w0..w1 {
            sum = sum + data[row_index] * u[j];
            row_index += 1;
        }
        let sum = -gamma * sum;

        let mut row_index = start_index;
        for j in w0..w1 {
            data[row_index] = data[row_index] + sum * u[j];
            row_index += 1;
        }
    }
}
