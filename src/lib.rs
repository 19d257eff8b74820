//! # factoris
//!
//! Pure-Rust dense matrix decomposition kernels, no-std compatible (with
//! `alloc`). Householder-based bidiagonalization and Hessenberg reduction,
//! implicit double-shift QR eigenvalue iteration, block-storage adapters, and
//! singular value post-processing.
//!
//! ## Quick start
//!
//! ```
//! use factoris::{DenseMatrix, EigenDecomposition};
//!
//! let mut a = DenseMatrix::from_rows(3, 3, &[
//!     2.0_f64, 1.0, 0.0,
//!     1.0, 3.0, 1.0,
//!     0.0, 1.0, 2.0,
//! ]);
//!
//! let mut eigen = EigenDecomposition::new(true);
//! eigen.decompose(&mut a).unwrap();
//!
//! let sum: f64 = eigen.eigenvalues().iter().map(|l| l.re).sum();
//! assert!((sum - 7.0).abs() < 1e-10); // trace
//! ```
//!
//! ## Modules
//!
//! - [`matrix`] — Heap-allocated [`DenseMatrix<T>`] with runtime dimensions
//!   and `Vec<T>` row-major storage that survives reshaping, plus the
//!   block-tiled [`BlockMatrix`] view and its in-place layout conversions.
//!
//! - [`linalg`] — The decomposition engines. Householder reflector kernels
//!   ([`linalg::householder`]), bidiagonalization
//!   ([`BidiagonalDecomposition`]), Hessenberg reduction
//!   ([`HessenbergDecomposition`]), eigenvalues and eigenvectors of general
//!   real matrices ([`EigenDecomposition`]), the row-major facade over
//!   block algorithms ([`BlockAdapter`]), the SVD interface with its
//!   non-destructive [`SafeSvd`] wrapper, and singular value utilities
//!   ([`linalg::singular`]).
//!
//! - [`traits`] — Element traits: [`Scalar`] for all matrix elements and
//!   [`FloatScalar`] for the real floats the decompositions require.
//!
//! Engines are reusable: construct once, call `decompose` many times, and
//! all internal workspace is recycled. Most engines claim the input matrix
//! as workspace (their `input_modified` returns true); clone first, or wrap
//! in [`SafeSvd`] where applicable, when the input must survive.
//!
//! ## Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | yes     | Hardware FPU via system libm, `std::error::Error` |
//! | `libm`  | no      | Pure-Rust software float fallback for no-std |

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod linalg;
pub mod matrix;
pub mod traits;

pub use linalg::{
    BidiagonalDecomposition, BlockAdapter, BlockDecomposition, EigenDecomposition,
    HessenbergDecomposition, LinalgError, SafeSvd, SingularValueDecomposition,
};
pub use matrix::block::BlockMatrix;
pub use matrix::DenseMatrix;
pub use traits::{FloatScalar, Scalar};
