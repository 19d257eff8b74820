use crate::linalg::LinalgError;
use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// Interface for singular value decompositions `A = U W Vᵀ`.
///
/// Implementations may be compact (factors trimmed to `min(m, n)`) or full,
/// and may claim the input matrix as workspace; callers check
/// [`input_modified`](Self::input_modified) or wrap the algorithm in
/// [`SafeSvd`] when the input must survive.
pub trait SingularValueDecomposition<T> {
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> Result<(), LinalgError>;

    /// Whether `decompose` consumes the contents of the input matrix.
    fn input_modified(&self) -> bool;

    /// The singular values, in the order matching the columns of U and V.
    /// Not guaranteed to be sorted.
    fn singular_values(&self) -> &[T];

    fn number_of_singular_values(&self) -> usize;

    /// Whether the factors are compact (`min(m, n)` columns) rather than
    /// full orthogonal matrices.
    fn is_compact(&self) -> bool;

    /// The left singular vectors, optionally transposed. Pass a matrix to
    /// reuse its storage.
    fn get_u(&mut self, u: Option<DenseMatrix<T>>, transposed: bool) -> DenseMatrix<T>;

    /// The right singular vectors, optionally transposed.
    fn get_v(&mut self, v: Option<DenseMatrix<T>>, transposed: bool) -> DenseMatrix<T>;

    /// The diagonal matrix of singular values.
    fn get_w(&mut self, w: Option<DenseMatrix<T>>) -> DenseMatrix<T>;

    /// Row count of the decomposed matrix.
    fn num_rows(&self) -> usize;

    /// Column count of the decomposed matrix.
    fn num_cols(&self) -> usize;
}

/// Wraps a destructive SVD so the caller's matrix is never touched.
///
/// When the wrapped algorithm claims its input, `decompose` copies the
/// matrix into an internal workspace first; when it does not, the copy is
/// skipped and the call is free. Everything else delegates.
#[derive(Debug)]
pub struct SafeSvd<T, S> {
    alg: S,
    work: DenseMatrix<T>,
}

impl<T: FloatScalar, S: SingularValueDecomposition<T>> SafeSvd<T, S> {
    pub fn new(alg: S) -> Self {
        Self {
            alg,
            work: DenseMatrix::default(),
        }
    }

    pub fn alg(&self) -> &S {
        &self.alg
    }

    pub fn alg_mut(&mut self) -> &mut S {
        &mut self.alg
    }
}

impl<T: FloatScalar, S: SingularValueDecomposition<T>> SingularValueDecomposition<T>
    for SafeSvd<T, S>
{
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        if self.alg.input_modified() {
            self.work.set_from(a);
            self.alg.decompose(&mut self.work)
        } else {
            self.alg.decompose(a)
        }
    }

    fn input_modified(&self) -> bool {
        false
    }

    fn singular_values(&self) -> &[T] {
        self.alg.singular_values()
    }

    fn number_of_singular_values(&self) -> usize {
        self.alg.number_of_singular_values()
    }

    fn is_compact(&self) -> bool {
        self.alg.is_compact()
    }

    fn get_u(&mut self, u: Option<DenseMatrix<T>>, transposed: bool) -> DenseMatrix<T> {
        self.alg.get_u(u, transposed)
    }

    fn get_v(&mut self, v: Option<DenseMatrix<T>>, transposed: bool) -> DenseMatrix<T> {
        self.alg.get_v(v, transposed)
    }

    fn get_w(&mut self, w: Option<DenseMatrix<T>>) -> DenseMatrix<T> {
        self.alg.get_w(w)
    }

    fn num_rows(&self) -> usize {
        self.alg.num_rows()
    }

    fn num_cols(&self) -> usize {
        self.alg.num_cols()
    }
}
