//! Bar series normalization

pub mod normalize;

pub use normalize::{is_canonical, normalize, EmptyPolicy, Normalized, Rejection};
