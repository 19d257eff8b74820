use alloc::vec::Vec;

use crate::linalg::LinalgError;
use crate::matrix::block::{convert_block_to_row, convert_row_to_block, BlockMatrix};
use crate::matrix::DenseMatrix;
use crate::traits::FloatScalar;

/// A decomposition that operates on block-tiled storage.
///
/// `input_modified` reports whether `decompose` consumes the matrix contents;
/// the [`BlockAdapter`] uses it to decide whether the buffer still needs to
/// be converted back to row-major layout for the caller.
pub trait BlockDecomposition<T> {
    fn decompose(&mut self, a: &mut BlockMatrix<'_, T>) -> Result<(), LinalgError>;
    fn input_modified(&self) -> bool;
}

/// Presents a block-tiled decomposition behind a row-major interface.
///
/// `decompose` permutes the caller's buffer into block layout in place,
/// runs the wrapped algorithm on a [`BlockMatrix`] view of it, and converts
/// back to row-major afterwards. The back-conversion is skipped when the
/// wrapped algorithm claims the input anyway, since the contents are then
/// the algorithm's workspace and not the caller's matrix.
///
/// The permutation scratch buffer (one band of rows) is grown on demand and
/// reused across calls.
#[derive(Debug)]
pub struct BlockAdapter<T, D> {
    alg: D,
    block_length: usize,
    tmp: Vec<T>,
}

impl<T: FloatScalar, D: BlockDecomposition<T>> BlockAdapter<T, D> {
    pub fn new(alg: D, block_length: usize) -> Self {
        assert!(block_length > 0, "block length must be positive");
        Self {
            alg,
            block_length,
            tmp: Vec::new(),
        }
    }

    /// Run the wrapped decomposition on a row-major matrix.
    pub fn decompose(&mut self, a: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let num_rows = a.num_rows();
        let num_cols = a.num_cols();

        let band = self.block_length.min(num_rows) * num_cols;
        if self.tmp.len() < band {
            self.tmp.resize(band, T::zero());
        }

        convert_row_to_block(num_rows, num_cols, self.block_length, a.data_mut(), &mut self.tmp);

        let result = {
            let mut view = BlockMatrix {
                data: a.data_mut(),
                num_rows,
                num_cols,
                block_length: self.block_length,
            };
            self.alg.decompose(&mut view)
        };

        if !self.alg.input_modified() {
            convert_block_to_row(num_rows, num_cols, self.block_length, a.data_mut(), &mut self.tmp);
        }

        result
    }

    /// Convert a block-layout matrix produced by the wrapped algorithm back
    /// to row-major, e.g. an extracted factor.
    pub fn convert_to_row_major(&mut self, a: &mut DenseMatrix<T>) {
        let num_rows = a.num_rows();
        let num_cols = a.num_cols();
        let band = self.block_length.min(num_rows) * num_cols;
        if self.tmp.len() < band {
            self.tmp.resize(band, T::zero());
        }
        convert_block_to_row(num_rows, num_cols, self.block_length, a.data_mut(), &mut self.tmp);
    }

    pub fn input_modified(&self) -> bool {
        self.alg.input_modified()
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }

    pub fn alg(&self) -> &D {
        &self.alg
    }

    pub fn alg_mut(&mut self) -> &mut D {
        &mut self.alg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Scales every element through the block view and records what it saw.
    struct RecordingAlg {
        modifies: bool,
        seen: Vec<f64>,
    }

    impl BlockDecomposition<f64> for RecordingAlg {
        fn decompose(&mut self, a: &mut BlockMatrix<'_, f64>) -> Result<(), LinalgError> {
            self.seen.clear();
            for i in 0..a.num_rows {
                for j in 0..a.num_cols {
                    self.seen.push(a.get(i, j));
                    let v = a.get(i, j) * 2.0;
                    a.set(i, j, v);
                }
            }
            Ok(())
        }

        fn input_modified(&self) -> bool {
            self.modifies
        }
    }

    struct FailingAlg;

    impl BlockDecomposition<f64> for FailingAlg {
        fn decompose(&mut self, _a: &mut BlockMatrix<'_, f64>) -> Result<(), LinalgError> {
            Err(LinalgError::Singular)
        }

        fn input_modified(&self) -> bool {
            false
        }
    }

    fn sample(rows: usize, cols: usize) -> DenseMatrix<f64> {
        DenseMatrix::from_fn(rows, cols, |i, j| (i * cols + j) as f64)
    }

    #[test]
    fn algorithm_sees_row_major_values() {
        let mut a = sample(5, 7);
        let mut adapter = BlockAdapter::new(
            RecordingAlg {
                modifies: false,
                seen: Vec::new(),
            },
            3,
        );
        adapter.decompose(&mut a).unwrap();

        let expected: Vec<f64> = (0..35).map(|v| v as f64).collect();
        assert_eq!(adapter.alg().seen, expected);
    }

    #[test]
    fn converts_back_when_input_preserved() {
        let mut a = sample(5, 7);
        let mut adapter = BlockAdapter::new(
            RecordingAlg {
                modifies: false,
                seen: Vec::new(),
            },
            3,
        );
        adapter.decompose(&mut a).unwrap();
        assert!(!adapter.input_modified());

        // doubled, and back in row-major order
        for i in 0..5 {
            for j in 0..7 {
                assert_eq!(a.get(i, j), 2.0 * (i * 7 + j) as f64, "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn skips_back_conversion_when_input_claimed() {
        let mut a = sample(4, 4);
        let mut adapter = BlockAdapter::new(
            RecordingAlg {
                modifies: true,
                seen: Vec::new(),
            },
            3,
        );
        adapter.decompose(&mut a).unwrap();
        assert!(adapter.input_modified());

        // still in block layout: converting back by hand recovers the result
        adapter.convert_to_row_major(&mut a);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(a.get(i, j), 2.0 * (i * 4 + j) as f64, "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn error_is_forwarded_and_buffer_restored() {
        let original = sample(5, 3);
        let mut a = original.clone();
        let mut adapter = BlockAdapter::new(FailingAlg, 2);
        assert_eq!(adapter.decompose(&mut a), Err(LinalgError::Singular));
        // non-destructive algorithm: buffer back in row-major layout
        assert_eq!(a, original);
    }

    #[test]
    #[should_panic(expected = "block length")]
    fn rejects_zero_block_length() {
        let _ = BlockAdapter::new(FailingAlg, 0);
    }
}
