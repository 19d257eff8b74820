//! Operations on the output of a singular value decomposition: ordering,
//! rank and nullity, null-space extraction.
//!
//! SVD engines in general report singular values unsorted; everything here
//! works either on the raw factors or through the
//! [`SingularValueDecomposition`] interface.

use crate::linalg::svd::SingularValueDecomposition;
use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// Swap the i-th and j-th singular vector inside a factor matrix. Vectors
/// are rows when the factor is stored transposed, columns otherwise.
fn swap_row_or_col<T: FloatScalar>(m: &mut DenseMatrix<T>, tran: bool, i: usize, j: usize) {
    if tran {
        for c in 0..m.num_cols() {
            let tmp = m.get(i, c);
            m.set(i, c, m.get(j, c));
            m.set(j, c, tmp);
        }
    } else {
        for r in 0..m.num_rows() {
            let tmp = m.get(r, i);
            m.set(r, i, m.get(r, j));
            m.set(r, j, tmp);
        }
    }
}

/// Verify that the U, W, V factors have consistent shapes.
///
/// W square means a compact decomposition, where only the singular-vector
/// counts can be checked; otherwise U and V must be full orthogonal matrices
/// matching W's sides. Panics on mismatch.
pub fn check_svd_dimensions<T: FloatScalar>(
    u: Option<&DenseMatrix<T>>,
    tran_u: bool,
    w: &DenseMatrix<T>,
    v: Option<&DenseMatrix<T>>,
    tran_v: bool,
) {
    let num_singular = w.num_rows().min(w.num_cols());
    let compact = w.num_rows() == w.num_cols();

    if compact {
        if let Some(u) = u {
            let vectors = if tran_u { u.num_rows() } else { u.num_cols() };
            assert_eq!(vectors, num_singular, "U has an unexpected number of singular vectors");
        }
        if let Some(v) = v {
            let vectors = if tran_v { v.num_rows() } else { v.num_cols() };
            assert_eq!(vectors, num_singular, "V has an unexpected number of singular vectors");
        }
    } else {
        if let Some(u) = u {
            assert!(u.is_square(), "U must be square in a full decomposition");
            assert_eq!(u.num_rows(), w.num_rows(), "U size does not match W");
        }
        if let Some(v) = v {
            assert!(v.is_square(), "V must be square in a full decomposition");
            assert_eq!(v.num_rows(), w.num_cols(), "V size does not match W");
        }
    }
}

/// Reorder the singular values on W's diagonal into descending order,
/// permuting the singular vectors in U and V to match, so that
/// `U W Vᵀ` is unchanged.
///
/// Selection sort, so already-sorted input does no swaps. A NaN singular
/// value compares larger than nothing and halts the sort: values after the
/// NaN's selection point are left where they are.
pub fn descending_order<T: FloatScalar>(
    mut u: Option<&mut DenseMatrix<T>>,
    tran_u: bool,
    w: &mut DenseMatrix<T>,
    mut v: Option<&mut DenseMatrix<T>>,
    tran_v: bool,
) {
    check_svd_dimensions(u.as_deref(), tran_u, w, v.as_deref(), tran_v);

    let num_singular = w.num_rows().min(w.num_cols());
    for i in 0..num_singular {
        let mut big_value = T::zero() - T::one();
        let mut big_index = None;
        for j in i..num_singular {
            let val = w.get(j, j);
            // false for NaN, leaving big_index unset
            if val > big_value {
                big_value = val;
                big_index = Some(j);
            }
        }

        let big_index = match big_index {
            Some(idx) => idx,
            None => break,
        };
        if big_index == i {
            continue;
        }

        let tmp = w.get(i, i);
        w.set(i, i, big_value);
        w.set(big_index, big_index, tmp);

        if let Some(v) = v.as_mut() {
            swap_row_or_col(v, tran_v, i, big_index);
        }
        if let Some(u) = u.as_mut() {
            swap_row_or_col(u, tran_u, i, big_index);
        }
    }
}

/// [`descending_order`] for singular values kept in a plain array instead
/// of a diagonal matrix.
pub fn descending_order_values<T: FloatScalar>(
    mut u: Option<&mut DenseMatrix<T>>,
    tran_u: bool,
    values: &mut [T],
    mut v: Option<&mut DenseMatrix<T>>,
    tran_v: bool,
) {
    for i in 0..values.len() {
        let mut big_value = T::zero() - T::one();
        let mut big_index = None;
        for (j, &val) in values.iter().enumerate().skip(i) {
            if val > big_value {
                big_value = val;
                big_index = Some(j);
            }
        }

        let big_index = match big_index {
            Some(idx) => idx,
            None => break,
        };
        if big_index == i {
            continue;
        }

        values[big_index] = values[i];
        values[i] = big_value;

        if let Some(v) = v.as_mut() {
            swap_row_or_col(v, tran_v, i, big_index);
        }
        if let Some(u) = u.as_mut() {
            swap_row_or_col(u, tran_u, i, big_index);
        }
    }
}

/// Null space of the decomposed matrix: every right singular vector whose
/// singular value is at most `tol`, plus the vectors a rank-deficient wide
/// matrix implies beyond the reported singular values.
///
/// Returns an `n x k` matrix whose columns span the null space (`k` may be
/// zero). Panics if the decomposition is compact and cannot provide all `n`
/// right singular vectors.
pub fn null_space<T: FloatScalar, S: SingularValueDecomposition<T>>(
    svd: &mut S,
    storage: Option<DenseMatrix<T>>,
    tol: T,
) -> DenseMatrix<T> {
    let num_singular = svd.number_of_singular_values();
    let n = svd.num_cols();

    let v = svd.get_v(None, true);
    assert_eq!(
        v.num_rows(),
        n,
        "the null space cannot be computed from a compact decomposition of a wide matrix"
    );

    let mut num_vectors = n - num_singular;
    for i in 0..num_singular {
        if svd.singular_values()[i] <= tol {
            num_vectors += 1;
        }
    }

    let mut ns = match storage {
        Some(mut m) => {
            m.reshape(n, num_vectors, false);
            m
        }
        None => DenseMatrix::zeros(n, num_vectors),
    };

    // rows of Vᵀ are right singular vectors; copy the null ones in as columns
    let mut count = 0;
    for i in 0..num_singular {
        if svd.singular_values()[i] <= tol {
            for j in 0..n {
                ns.set(j, count, v.get(i, j));
            }
            count += 1;
        }
    }
    for i in num_singular..n {
        for j in 0..n {
            ns.set(j, count, v.get(i, j));
        }
        count += 1;
    }

    ns
}

/// A single null vector: the right (or left) singular vector paired with
/// the smallest singular value, as a column.
///
/// For a rectangular matrix with more columns than rows (rows than columns,
/// for the left case) the trailing singular vector has no singular value at
/// all and is returned directly.
pub fn null_vector<T: FloatScalar, S: SingularValueDecomposition<T>>(
    svd: &mut S,
    is_right: bool,
    storage: Option<DenseMatrix<T>>,
) -> DenseMatrix<T> {
    let num_singular = svd.number_of_singular_values();

    let a = if is_right {
        let v = svd.get_v(None, true);
        assert_eq!(
            v.num_rows(),
            svd.num_cols(),
            "the right null vector cannot be computed from a compact decomposition of a wide matrix"
        );
        v
    } else {
        let u = svd.get_u(None, false);
        assert_eq!(
            u.num_cols(),
            svd.num_rows(),
            "the left null vector cannot be computed from a compact decomposition of a tall matrix"
        );
        u
    };

    let length = if is_right { svd.num_cols() } else { svd.num_rows() };
    let mut nv = match storage {
        Some(mut m) => {
            m.reshape(length, 1, false);
            m
        }
        None => DenseMatrix::zeros(length, 1),
    };

    let smallest_index = if is_right && svd.num_cols() > svd.num_rows() {
        svd.num_cols() - 1
    } else if !is_right && svd.num_rows() > svd.num_cols() {
        svd.num_rows() - 1
    } else {
        let mut smallest_value = T::infinity();
        let mut smallest = 0;
        for (i, &s) in svd.singular_values()[..num_singular].iter().enumerate() {
            if s < smallest_value {
                smallest_value = s;
                smallest = i;
            }
        }
        smallest
    };

    if is_right {
        for j in 0..length {
            nv.set(j, 0, a.get(smallest_index, j));
        }
    } else {
        for j in 0..length {
            nv.set(j, 0, a.get(j, smallest_index));
        }
    }

    nv
}

/// Numerical rank: the number of singular values above `threshold`.
pub fn rank<T: FloatScalar, S: SingularValueDecomposition<T>>(svd: &S, threshold: T) -> usize {
    let num_singular = svd.number_of_singular_values();
    let mut count = 0;
    for &s in svd.singular_values()[..num_singular].iter() {
        if s > threshold {
            count += 1;
        }
    }
    count
}

/// Numerical nullity: singular values at or below `threshold`, plus the
/// columns of a wide matrix that have no singular value at all.
pub fn nullity<T: FloatScalar, S: SingularValueDecomposition<T>>(svd: &S, threshold: T) -> usize {
    let num_singular = svd.number_of_singular_values();
    let mut count = 0;
    for &s in svd.singular_values()[..num_singular].iter() {
        if s <= threshold {
            count += 1;
        }
    }
    count + svd.num_cols() - num_singular
}
