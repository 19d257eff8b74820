//! Block-tiled reinterpretation of a dense row-major buffer.
//!
//! A block matrix stores the same elements as a row-major [`DenseMatrix`],
//! reordered so that each `block_length`-square tile is contiguous. Tiles are
//! laid out in row-major order of tiles, and row-major within each tile;
//! tiles on the right and bottom edges are truncated to fit. Block-oriented
//! algorithms get cache-friendly tile access without the dense layer copying
//! anything: conversion happens in place through a small scratch band.
//!
//! [`DenseMatrix`]: super::DenseMatrix

/// Borrowed view of a flat buffer in block-tiled layout.
///
/// Holds no data of its own: it reinterprets a [`DenseMatrix`]'s buffer after
/// [`convert_row_to_block`] has reordered it. The view is only valid while
/// the buffer actually holds block-layout data.
///
/// [`DenseMatrix`]: super::DenseMatrix
#[derive(Debug)]
pub struct BlockMatrix<'a, T> {
    /// The shared buffer, in block-tiled order.
    pub data: &'a mut [T],
    pub num_rows: usize,
    pub num_cols: usize,
    /// Edge length of a full tile.
    pub block_length: usize,
}

impl<'a, T: Copy> BlockMatrix<'a, T> {
    /// Flat index of element `(row, col)` in the block layout.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        debug_assert!(self.block_length > 0, "block length must be positive");
        let block_row = row - row % self.block_length;
        let block_col = col - col % self.block_length;
        let block_height = self.block_length.min(self.num_rows - block_row);
        let block_width = self.block_length.min(self.num_cols - block_col);

        block_row * self.num_cols
            + block_height * block_col
            + (row - block_row) * block_width
            + (col - block_col)
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        self.data[self.index_of(row, col)]
    }

    /// Set the element at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.num_rows && col < self.num_cols, "index out of bounds");
        let idx = self.index_of(row, col);
        self.data[idx] = value;
    }
}

/// Reorder a row-major buffer into block-tiled layout in place.
///
/// `tmp` must hold at least `min(block_length, num_rows) * num_cols`
/// elements; it is used as the staging area for one band of rows at a time.
/// The conversion is a pure permutation of the elements.
pub fn convert_row_to_block<T: Copy>(
    num_rows: usize,
    num_cols: usize,
    block_length: usize,
    data: &mut [T],
    tmp: &mut [T],
) {
    let band = block_length.min(num_rows) * num_cols;
    assert!(tmp.len() >= band, "scratch buffer too small: {} < {}", tmp.len(), band);

    let mut i = 0;
    while i < num_rows {
        let block_height = block_length.min(num_rows - i);
        let band_start = i * num_cols;
        tmp[..block_height * num_cols]
            .copy_from_slice(&data[band_start..band_start + block_height * num_cols]);

        let mut j = 0;
        while j < num_cols {
            let block_width = block_length.min(num_cols - j);
            let mut index_dst = band_start + block_height * j;
            let mut index_src = j;
            for _ in 0..block_height {
                data[index_dst..index_dst + block_width]
                    .copy_from_slice(&tmp[index_src..index_src + block_width]);
                index_dst += block_width;
                index_src += num_cols;
            }
            j += block_length;
        }
        i += block_length;
    }
}

/// Reorder a block-tiled buffer back into row-major layout in place.
///
/// Exact inverse of [`convert_row_to_block`]; same `tmp` requirement.
pub fn convert_block_to_row<T: Copy>(
    num_rows: usize,
    num_cols: usize,
    block_length: usize,
    data: &mut [T],
    tmp: &mut [T],
) {
    let band = block_length.min(num_rows) * num_cols;
    assert!(tmp.len() >= band, "scratch buffer too small: {} < {}", tmp.len(), band);

    let mut i = 0;
    while i < num_rows {
        let block_height = block_length.min(num_rows - i);
        let band_start = i * num_cols;
        tmp[..block_height * num_cols]
            .copy_from_slice(&data[band_start..band_start + block_height * num_cols]);

        let mut j = 0;
        while j < num_cols {
            let block_width = block_length.min(num_cols - j);
            let mut index_src = block_height * j;
            for k in 0..block_height {
                let row_start = (i + k) * num_cols + j;
                data[row_start..row_start + block_width]
                    .copy_from_slice(&tmp[index_src..index_src + block_width]);
                index_src += block_width;
            }
            j += block_length;
        }
        i += block_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn sequence(len: usize) -> Vec<f32> {
        (0..len).map(|v| v as f32).collect()
    }

    #[test]
    fn round_trip_is_bit_identical() {
        // dims chosen so edge tiles are truncated in both directions
        for &(rows, cols, bl) in &[(5usize, 7usize, 3usize), (4, 4, 2), (6, 3, 4), (1, 5, 2), (7, 1, 3)] {
            let original = sequence(rows * cols);
            let mut data = original.clone();
            let mut tmp = vec![0.0_f32; bl.min(rows) * cols];

            convert_row_to_block(rows, cols, bl, &mut data, &mut tmp);
            convert_block_to_row(rows, cols, bl, &mut data, &mut tmp);

            assert_eq!(data, original, "{}x{} bl={}", rows, cols, bl);
        }
    }

    #[test]
    fn block_get_matches_row_layout() {
        let rows = 5;
        let cols = 7;
        let bl = 3;
        let mut data = sequence(rows * cols);
        let mut tmp = vec![0.0_f32; bl.min(rows) * cols];
        convert_row_to_block(rows, cols, bl, &mut data, &mut tmp);

        let block = BlockMatrix {
            data: &mut data,
            num_rows: rows,
            num_cols: cols,
            block_length: bl,
        };
        for i in 0..rows {
            for j in 0..cols {
                assert_eq!(block.get(i, j), (i * cols + j) as f32, "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn block_set_round_trips_through_row_layout() {
        let rows = 4;
        let cols = 6;
        let bl = 3;
        let mut data = vec![0.0_f32; rows * cols];
        let mut tmp = vec![0.0_f32; bl.min(rows) * cols];
        convert_row_to_block(rows, cols, bl, &mut data, &mut tmp);

        {
            let mut block = BlockMatrix {
                data: &mut data,
                num_rows: rows,
                num_cols: cols,
                block_length: bl,
            };
            block.set(3, 5, 42.0);
            block.set(0, 0, 7.0);
        }

        convert_block_to_row(rows, cols, bl, &mut data, &mut tmp);
        assert_eq!(data[3 * cols + 5], 42.0);
        assert_eq!(data[0], 7.0);
    }

    #[test]
    #[should_panic(expected = "block length")]
    fn zero_block_length_is_rejected() {
        let mut data = [0.0_f32; 4];
        let block = BlockMatrix {
            data: &mut data,
            num_rows: 2,
            num_cols: 2,
            block_length: 0,
        };
        let _ = block.get(0, 0);
    }

    #[test]
    fn conversion_is_identity_when_one_band() {
        // block_length >= rows: tiles are full-height column strips
        let rows = 2;
        let cols = 3;
        let bl = 4;
        let original = sequence(rows * cols);
        let mut data = original.clone();
        let mut tmp = vec![0.0_f32; rows * cols];
        convert_row_to_block(rows, cols, bl, &mut data, &mut tmp);
        // single band, single col block: layout unchanged
        assert_eq!(data, original);
    }
}
