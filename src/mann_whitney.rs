//! The four-stage pipeline: rank, aggregate, U statistics, normal approximation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MannWhitneyConfig;
use crate::error::Result;
use crate::rank::{aggregate, rank, TiePolicy};
use crate::sample::{split_labeled, Group, GroupCodes, Sample};
use crate::statistic::{
    common_language, p_value, rank_biserial, u_statistics, z_score, Alternative, UChoice, ZResult,
};

/// Runs Mann-Whitney U tests with a fixed configuration.
///
/// Stateless apart from its configuration; one instance can be reused for
/// any number of sample pairs, from any thread.
///
/// # Examples
///
/// ```
/// use u_ranktest::MannWhitney;
///
/// let a = [1.0, 3.0, 5.0];
/// let b = [2.0, 4.0, 6.0];
/// let r = MannWhitney::new().run_slices(&a, &b).unwrap();
/// assert_eq!((r.u_a, r.u_b), (6.0, 3.0));
/// assert_eq!(r.rank_sum_a + r.rank_sum_b, 21.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MannWhitney {
    config: MannWhitneyConfig,
}

/// Outcome of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyResult {
    /// Size of sample A.
    pub n_a: usize,
    /// Size of sample B.
    pub n_b: usize,
    /// Sum of ranks of group A.
    pub rank_sum_a: f64,
    /// Sum of ranks of group B.
    pub rank_sum_b: f64,
    /// `U_A`.
    pub u_a: f64,
    /// `U_B`.
    pub u_b: f64,
    /// Which U was standardized.
    pub statistic: UChoice,
    /// The standardized U.
    pub u: f64,
    /// Z score with the null mean and standard deviation behind it.
    pub z: ZResult,
    /// p-value of `z.z` under `alternative`.
    pub p_value: f64,
    /// Alternative hypothesis used for the p-value.
    pub alternative: Alternative,
    /// Rank-biserial correlation, positive when A tends larger.
    pub rank_biserial: f64,
    /// Estimated `P(A > B) + ½·P(A = B)`.
    pub common_language: f64,
    /// Number of blocks of tied values in the combined pool.
    pub tie_blocks: usize,
    /// Whether σ_U was tie-corrected.
    pub tie_corrected: bool,
    /// Whether the continuity correction was applied.
    pub continuity_corrected: bool,
}

impl MannWhitney {
    /// Create with default configuration (averaged ranks, tie-corrected
    /// variance, Z from `U_B`, two-sided p-value).
    pub fn new() -> Self {
        Self {
            config: MannWhitneyConfig::default(),
        }
    }

    /// Create with the plain, uncorrected normal approximation.
    pub fn uncorrected() -> Self {
        Self {
            config: MannWhitneyConfig::uncorrected(),
        }
    }

    /// Create from an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`crate::MannWhitneyError::InvalidConfig`] for an invalid combination.
    pub fn with_config(config: MannWhitneyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Set the tie policy.
    pub fn tie_policy(mut self, policy: TiePolicy) -> Self {
        self.config.tie_policy = policy;
        self
    }

    /// Enable or disable the variance tie correction.
    pub fn tie_correction(mut self, enabled: bool) -> Self {
        self.config.tie_correction = enabled;
        self
    }

    /// Enable or disable the continuity correction.
    pub fn continuity_correction(mut self, enabled: bool) -> Self {
        self.config.continuity_correction = enabled;
        self
    }

    /// Choose which U is standardized.
    pub fn statistic(mut self, choice: UChoice) -> Self {
        self.config.statistic = choice;
        self
    }

    /// Set the alternative hypothesis.
    pub fn alternative(mut self, alternative: Alternative) -> Self {
        self.config.alternative = alternative;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &MannWhitneyConfig {
        &self.config
    }

    /// Runs the test on two samples, consuming them.
    ///
    /// # Errors
    ///
    /// - [`crate::MannWhitneyError::InvalidConfig`] if setters produced an
    ///   invalid combination
    /// - any error of [`rank`] or [`z_score`]
    pub fn run(&self, a: Sample, b: Sample) -> Result<MannWhitneyResult> {
        self.config.validate()?;

        let ranking = rank(a, b, self.config.tie_policy)?;
        let (n_a, n_b) = (ranking.n_a(), ranking.n_b());
        let sums = aggregate(&ranking);
        let u = u_statistics(&sums);

        let nominated = u.select(self.config.statistic);
        let z = z_score(
            nominated,
            n_a,
            n_b,
            ranking.tie_term(),
            self.config.z_options(),
        )?;
        let p = p_value(z.z, self.config.alternative);

        debug!(
            n_a,
            n_b,
            u = nominated,
            z = z.z,
            p_value = p,
            "mann-whitney test complete"
        );

        Ok(MannWhitneyResult {
            n_a,
            n_b,
            rank_sum_a: sums.a(),
            rank_sum_b: sums.b(),
            u_a: u.a(),
            u_b: u.b(),
            statistic: self.config.statistic,
            u: nominated,
            z,
            p_value: p,
            alternative: self.config.alternative,
            rank_biserial: rank_biserial(&u),
            common_language: common_language(&u),
            tie_blocks: ranking.tie_sizes().len(),
            tie_corrected: self.config.tie_correction,
            continuity_corrected: self.config.continuity_correction,
        })
    }

    /// Runs the test on two plain value slices (group A, group B).
    pub fn run_slices(&self, a: &[f64], b: &[f64]) -> Result<MannWhitneyResult> {
        self.run(Sample::new(Group::A, a), Sample::new(Group::B, b))
    }

    /// Runs the test on `(value, group code)` rows.
    ///
    /// # Errors
    ///
    /// [`crate::MannWhitneyError::InvalidGroupTag`] for unknown codes, plus
    /// everything [`MannWhitney::run`] reports.
    pub fn run_labeled(
        &self,
        rows: &[(f64, i64)],
        codes: GroupCodes,
    ) -> Result<MannWhitneyResult> {
        let (a, b) = split_labeled(rows, codes)?;
        self.run(a, b)
    }
}
