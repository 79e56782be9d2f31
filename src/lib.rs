//! # u-ranktest
//!
//! Two-sample Mann-Whitney U test: a rank-based comparison of two
//! independent samples that does not assume normally distributed data.
//!
//! The pipeline operates on raw `f64` observations and knows nothing about
//! where they came from.
//!
//! ## Modules
//!
//! - [`sample`] — Observations, per-group samples, labeled-row splitting
//! - [`rank`] — Combined-pool ranking (averaged ties) and per-group rank sums
//! - [`statistic`] — U statistics, normal-approximation Z, p-values, effect sizes
//! - [`config`] — Tie policy, corrections, nominated U, alternative hypothesis
//!
//! ## Pipeline
//!
//! ```text
//! Sample A, Sample B ──▶ rank ──▶ aggregate ──▶ u_statistics ──▶ z_score
//! ```
//!
//! Each stage consumes the previous stage's output and produces a new
//! immutable value; there is no shared state, so independent sample pairs can
//! be tested concurrently without coordination.
//!
//! ## Quick Start
//!
//! ```
//! use u_ranktest::mann_whitney_u_test;
//!
//! let a = [12.1, 14.3, 15.0, 16.8, 18.2, 19.9];
//! let b = [8.4, 9.1, 10.7, 11.0, 12.1, 13.5];
//! let r = mann_whitney_u_test(&a, &b).unwrap();
//! assert_eq!(r.u_a + r.u_b, 36.0);
//! assert!(r.z.z > 0.0); // A tends larger
//! ```
//!
//! ## Design Philosophy
//!
//! - **Averaged ranks**: tied values share the mean of the positions they span
//! - **Exact bookkeeping**: rank sums and U are kept as doubled integers, so
//!   `R_A + R_B = N(N+1)/2` and `U_A + U_B = n_A·n_B` hold exactly
//! - **Floating point statistics**: μ, σ_U and Z are never truncated

#![warn(missing_docs)]

pub mod config;
pub mod error;
mod mann_whitney;
pub mod rank;
pub mod sample;
pub mod statistic;

pub use config::MannWhitneyConfig;
pub use error::{MannWhitneyError, Result};
pub use mann_whitney::{MannWhitney, MannWhitneyResult};
pub use sample::{Group, GroupCodes, Observation, Sample};
pub use statistic::{Alternative, UChoice, ZResult};

/// Mann-Whitney U test with default configuration.
///
/// Averaged ranks, tie-corrected variance, Z standardized from `U_B`,
/// two-sided p-value.
///
/// # Errors
///
/// - [`MannWhitneyError::EmptySample`] if either slice is empty
/// - [`MannWhitneyError::NonFiniteValue`] for NaN or infinite values
/// - [`MannWhitneyError::DegenerateVariance`] if every value is tied
///
/// # References
///
/// - Mann & Whitney (1947). "On a test of whether one of two random
///   variables is stochastically larger than the other". Annals of
///   Mathematical Statistics, 18(1), 50–60.
pub fn mann_whitney_u_test(a: &[f64], b: &[f64]) -> Result<MannWhitneyResult> {
    MannWhitney::new().run_slices(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convenience_matches_runner() {
        let a = [3.0, 1.0, 4.0, 1.0, 5.0];
        let b = [9.0, 2.0, 6.0, 5.0];
        let direct = mann_whitney_u_test(&a, &b).expect("valid");
        let runner = MannWhitney::new().run_slices(&a, &b).expect("valid");
        assert_eq!(direct, runner);
    }

    #[test]
    fn convenience_surfaces_errors() {
        assert!(matches!(
            mann_whitney_u_test(&[], &[1.0]),
            Err(MannWhitneyError::EmptySample { group: Group::A })
        ));
        assert!(matches!(
            mann_whitney_u_test(&[1.0, f64::NAN], &[1.0]),
            Err(MannWhitneyError::NonFiniteValue { .. })
        ));
    }
}
