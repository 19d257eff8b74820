pub mod block;
mod ops;

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::traits::Scalar;

/// Dynamically-sized heap-allocated dense matrix.
///
/// Row-major `Vec<T>` storage with runtime dimensions: element `(i, j)` lives
/// at `data[i * num_cols + j]`. This is the storage format every decomposition
/// engine in this crate operates on, and the layout the reflector kernels'
/// index arithmetic assumes.
///
/// The backing buffer may be larger than `num_rows * num_cols`: [`reshape`]
/// reuses it whenever it is big enough, so a matrix that is repeatedly resized
/// allocates only when it grows past its high-water mark.
///
/// [`reshape`]: DenseMatrix::reshape
///
/// # Examples
///
/// ```
/// use factoris::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(a[(0, 2)], 3.0);
/// assert_eq!(a[(1, 0)], 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    num_rows: usize,
    num_cols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> DenseMatrix<T> {
    /// Create a `num_rows x num_cols` matrix of zeros.
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self {
            data: vec![T::zero(); num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Create an `n x n` identity matrix.
    ///
    /// ```
    /// use factoris::DenseMatrix;
    /// let id = DenseMatrix::<f32>::identity(3);
    /// assert_eq!(id[(0, 0)], 1.0);
    /// assert_eq!(id[(0, 1)], 0.0);
    /// ```
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Create a matrix from a flat slice in row-major order.
    ///
    /// Panics if `row_major.len() != num_rows * num_cols`.
    pub fn from_rows(num_rows: usize, num_cols: usize, row_major: &[T]) -> Self {
        assert_eq!(
            row_major.len(),
            num_rows * num_cols,
            "slice length {} does not match {}x{} matrix",
            row_major.len(),
            num_rows,
            num_cols,
        );
        Self {
            data: row_major.to_vec(),
            num_rows,
            num_cols,
        }
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    pub fn from_fn(num_rows: usize, num_cols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for i in 0..num_rows {
            for j in 0..num_cols {
                data.push(f(i, j));
            }
        }
        Self {
            data,
            num_rows,
            num_cols,
        }
    }

    /// Change the matrix dimensions, reusing the backing buffer when it is
    /// large enough.
    ///
    /// If `preserve_values` is false the contents after the call are
    /// unspecified; if true, the flat buffer contents are kept (note that the
    /// row-major *interpretation* of those values changes with `num_cols`).
    pub fn reshape(&mut self, num_rows: usize, num_cols: usize, preserve_values: bool) {
        let len = num_rows * num_cols;
        if len > self.data.len() {
            if preserve_values {
                self.data.resize(len, T::zero());
            } else {
                self.data = vec![T::zero(); len];
            }
        }
        self.num_rows = num_rows;
        self.num_cols = num_cols;
    }

    /// Set every element in the active region to zero.
    pub fn zero(&mut self) {
        for v in self.data[..self.num_rows * self.num_cols].iter_mut() {
            *v = T::zero();
        }
    }

    /// Copy the dimensions and contents of `other` into this matrix,
    /// reusing the buffer where possible.
    pub fn set_from(&mut self, other: &DenseMatrix<T>) {
        self.reshape(other.num_rows, other.num_cols, false);
        let len = self.num_rows * self.num_cols;
        self.data[..len].copy_from_slice(&other.data[..len]);
    }
}

impl<T: Copy> DenseMatrix<T> {
    /// Element at `(row, col)`, bounds-checked.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        self.data[row * self.num_cols + col]
    }

    /// Set the element at `(row, col)`, bounds-checked.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        self.data[row * self.num_cols + col] = value;
    }

    /// Element at `(row, col)` without a bounds check.
    ///
    /// # Safety
    ///
    /// `row * num_cols + col` must be within the backing buffer.
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        *self.data.get_unchecked(row * self.num_cols + col)
    }

    /// Set the element at `(row, col)` without a bounds check.
    ///
    /// # Safety
    ///
    /// `row * num_cols + col` must be within the backing buffer.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: T) {
        *self.data.get_unchecked_mut(row * self.num_cols + col) = value;
    }
}

impl<T> DenseMatrix<T> {
    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of elements in the active region.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    /// The flat row-major buffer. May be longer than `num_elements()`.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the flat row-major buffer.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Default for DenseMatrix<T> {
    /// An empty 0×0 matrix.
    fn default() -> Self {
        Self {
            data: Vec::new(),
            num_rows: 0,
            num_cols: 0,
        }
    }
}

impl<T: Scalar> PartialEq for DenseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.num_rows == other.num_rows
            && self.num_cols == other.num_cols
            && self.data[..self.num_elements()] == other.data[..other.num_elements()]
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        &self.data[row * self.num_cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        &mut self.data[row * self.num_cols + col]
    }
}
