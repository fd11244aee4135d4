//! Error types for core data validation.

use crate::{Date, Symbol};

/// Errors raised when constructing core data types.
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    /// Close price is zero, negative, or not finite.
    #[error("invalid close price {close} on {date}")]
    InvalidPrice {
        /// Observation date.
        date: Date,
        /// Offending close price.
        close: f64,
    },

    /// Two observations share a date.
    #[error("duplicate date in price series: {0}")]
    DuplicateDate(Date),

    /// Observations are not in ascending date order.
    #[error("price series out of order: {next} follows {previous}")]
    UnorderedDates {
        /// Earlier observation date.
        previous: Date,
        /// Later observation date.
        next: Date,
    },

    /// Symbol inserted twice into a feature matrix.
    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(Symbol),

    /// Symbol present in only one of a matrix and its assignment.
    #[error("symbol {0} not present in both feature matrix and cluster assignment")]
    UnmatchedSymbol(Symbol),

    /// Length mismatch between paired collections.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
