pub(crate) mod bidiagonal;
pub(crate) mod block_adapter;
pub(crate) mod eigen;
pub(crate) mod hessenberg;
pub mod householder;
pub mod singular;
pub(crate) mod svd;

pub use bidiagonal::BidiagonalDecomposition;
pub use block_adapter::{BlockAdapter, BlockDecomposition};
pub use eigen::EigenDecomposition;
pub use hessenberg::HessenbergDecomposition;
pub use svd::{SafeSvd, SingularValueDecomposition};

/// Errors from the decomposition engines.
///
/// Structural precondition violations (non-square input where square is
/// required, mismatched dimensions, compact factors where full ones are
/// needed) panic at the call site instead; this enum covers failures that
/// only show up mid-computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// A wrapped algorithm detected a structural degeneracy it cannot
    /// recover from (e.g. a block Cholesky finding the matrix is not
    /// positive definite). No engine in this crate emits this itself.
    Singular,
    /// Iterative algorithm did not converge within the iteration budget.
    ConvergenceFailure,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular or degenerate"),
            LinalgError::ConvergenceFailure => {
                write!(f, "iterative algorithm did not converge")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}
