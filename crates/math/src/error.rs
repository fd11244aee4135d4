//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Cluster count of zero.
    #[error("invalid cluster count: {0}")]
    InvalidClusterCount(usize),

    /// More clusters requested than samples available.
    #[error("cannot fit {k} clusters to {samples} samples")]
    TooManyClusters {
        /// Requested cluster count.
        k: usize,
        /// Number of samples.
        samples: usize,
    },

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}
