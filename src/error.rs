//! Error type shared by every stage of the rank-sum pipeline.

use crate::sample::Group;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MannWhitneyError>;

/// Failures of the Mann-Whitney pipeline.
///
/// All variants are deterministic validation failures on immutable input;
/// none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MannWhitneyError {
    /// One of the two samples has no observations, so U is undefined.
    #[error("sample for group {group} is empty")]
    EmptySample {
        /// The group whose sample was empty.
        group: Group,
    },

    /// An observation does not belong to exactly one of the two expected groups.
    #[error("invalid group tag at position {index}: {detail}")]
    InvalidGroupTag {
        /// Position of the offending observation in its input sequence.
        index: usize,
        /// What was wrong with the tag.
        detail: String,
    },

    /// The standard deviation of U under H₀ is zero (or not finite).
    #[error("variance of U is degenerate (sigma_u = {sigma_u})")]
    DegenerateVariance {
        /// The offending standard deviation.
        sigma_u: f64,
    },

    /// A NaN or infinite value cannot be placed in the ranking order.
    #[error("non-finite value in group {group} at position {index}")]
    NonFiniteValue {
        /// Group of the offending observation.
        group: Group,
        /// Position of the offending observation within its sample.
        index: usize,
    },

    /// The requested combination of options is not meaningful.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
