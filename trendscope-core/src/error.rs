//! Error taxonomy for the core engine.
//!
//! Every variant is a local, synchronous validation failure. Numeric
//! degeneracies (zero variance, zero denominators) are never errors; they are
//! mapped to sentinel values at the output boundary instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("no bars supplied")]
    EmptyInput,

    #[error("insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("malformed bar series: {0}")]
    MalformedBar(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
