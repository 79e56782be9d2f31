//! U statistics, the normal approximation and derived quantities.
//!
//! # Algorithm
//!
//! ```text
//! U_A = n_A·n_B + n_A(n_A+1)/2 − R_A
//! U_B = n_A·n_B + n_B(n_B+1)/2 − R_B          U_A + U_B = n_A·n_B
//!
//! μ   = n_A·n_B / 2
//! σ²  = n_A·n_B / 12 · ((N+1) − Σ(tᵢ³ − tᵢ) / (N(N−1)))
//! z   = (U − μ) / σ
//! ```
//!
//! `U_B` counts the (A, B) pairs where the A value is larger, `U_A` those
//! where the B value is larger; tied pairs count ½ toward each. The tie term
//! is dropped when tie correction is off.
//!
//! # References
//!
//! - Mann & Whitney (1947), *Annals of Mathematical Statistics* 18(1).
//! - Lehmann, E.L. (1975). *Nonparametrics: Statistical Methods Based on
//!   Ranks*, Holden-Day, §1.4 (tie correction).

use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::special;

use crate::error::{MannWhitneyError, Result};
use crate::rank::RankSums;
use crate::sample::Group;

/// The pair `(U_A, U_B)`.
///
/// Held as doubled integers; both values are exact multiples of ½.
/// Deserializing rejects negative or non-complementary pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUStatistic")]
pub struct UStatistic {
    doubled_a: i64,
    doubled_b: i64,
    n_a: usize,
    n_b: usize,
}

#[derive(Deserialize)]
struct RawUStatistic {
    doubled_a: i64,
    doubled_b: i64,
    n_a: usize,
    n_b: usize,
}

impl TryFrom<RawUStatistic> for UStatistic {
    type Error = String;

    fn try_from(raw: RawUStatistic) -> std::result::Result<Self, Self::Error> {
        let u = UStatistic {
            doubled_a: raw.doubled_a,
            doubled_b: raw.doubled_b,
            n_a: raw.n_a,
            n_b: raw.n_b,
        };
        if u.doubled_a < 0 || u.doubled_b < 0 || !u.is_complementary() {
            return Err(format!(
                "U pair ({}, {}) is not a valid split of {}",
                u.a(),
                u.b(),
                u.product()
            ));
        }
        Ok(u)
    }
}

impl UStatistic {
    /// `U_A`.
    pub fn a(&self) -> f64 {
        self.doubled_a as f64 / 2.0
    }

    /// `U_B`.
    pub fn b(&self) -> f64 {
        self.doubled_b as f64 / 2.0
    }

    /// `min(U_A, U_B)`.
    pub fn smaller(&self) -> f64 {
        self.doubled_a.min(self.doubled_b) as f64 / 2.0
    }

    /// `n_A·n_B`, the exact value of `U_A + U_B`.
    pub fn product(&self) -> f64 {
        (self.n_a * self.n_b) as f64
    }

    /// Whether `U_A + U_B == n_A·n_B` holds exactly.
    pub fn is_complementary(&self) -> bool {
        self.doubled_a + self.doubled_b == 2 * (self.n_a * self.n_b) as i64
    }

    /// Sample sizes `(n_A, n_B)`.
    pub fn sizes(&self) -> (usize, usize) {
        (self.n_a, self.n_b)
    }

    /// The U selected by `choice`.
    pub fn select(&self, choice: UChoice) -> f64 {
        match choice {
            UChoice::GroupA => self.a(),
            UChoice::GroupB => self.b(),
            UChoice::Smaller => self.smaller(),
        }
    }
}

/// Which U is standardized into the reported Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UChoice {
    /// `U_A`.
    GroupA,
    /// `U_B`, the second group's U.
    #[default]
    GroupB,
    /// `min(U_A, U_B)`; Z is then never positive, so only a two-sided
    /// alternative is accepted.
    Smaller,
}

/// Direction of the alternative hypothesis, relative to the reported Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alternative {
    /// The nominated U differs from its null mean in either direction.
    #[default]
    TwoSided,
    /// The nominated U is below its null mean.
    Less,
    /// The nominated U is above its null mean.
    Greater,
}

/// Corrections applied by [`z_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZOptions {
    /// Subtract the tie term from the variance.
    pub tie_correction: bool,
    /// Shrink `|U − μ|` by ½ toward zero.
    pub continuity_correction: bool,
}

impl Default for ZOptions {
    fn default() -> Self {
        Self {
            tie_correction: true,
            continuity_correction: false,
        }
    }
}

impl ZOptions {
    /// The plain textbook formula: no tie or continuity correction.
    pub fn uncorrected() -> Self {
        Self {
            tie_correction: false,
            continuity_correction: false,
        }
    }
}

/// Standardized statistic and the null moments used to compute it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZResult {
    /// `(U − μ) / σ`.
    pub z: f64,
    /// Null mean `μ = n_A·n_B / 2`.
    pub mu: f64,
    /// Null standard deviation `σ_U`.
    pub sigma_u: f64,
}

/// Derives `(U_A, U_B)` from the rank sums.
///
/// Computed in doubled integer arithmetic, so no intermediate is truncated.
///
/// # Examples
///
/// ```
/// use u_ranktest::rank::{aggregate, rank, TiePolicy};
/// use u_ranktest::sample::{Group, Sample};
/// use u_ranktest::statistic::u_statistics;
///
/// let a = Sample::new(Group::A, &[1.0, 3.0, 5.0]);
/// let b = Sample::new(Group::B, &[2.0, 4.0, 6.0]);
/// let u = u_statistics(&aggregate(&rank(a, b, TiePolicy::Average).unwrap()));
/// assert_eq!((u.a(), u.b()), (6.0, 3.0));
/// assert!(u.is_complementary());
/// ```
pub fn u_statistics(sums: &RankSums) -> UStatistic {
    let n_a = sums.n_a();
    let n_b = sums.n_b();
    let na = n_a as i64;
    let nb = n_b as i64;
    let two_nanb = 2 * na * nb;

    let doubled_a = two_nanb + na * (na + 1) - sums.doubled(Group::A) as i64;
    let doubled_b = two_nanb + nb * (nb + 1) - sums.doubled(Group::B) as i64;

    let u = UStatistic {
        doubled_a,
        doubled_b,
        n_a,
        n_b,
    };
    debug!(u_a = u.a(), u_b = u.b(), "computed U statistics");
    u
}

/// Standardizes `u` under the normal approximation.
///
/// `tie_term` is Σ(tᵢ³ − tᵢ) over the tie blocks of the combined pool
/// (see [`crate::rank::Ranking::tie_term`]); it is ignored unless
/// `options.tie_correction` is set.
///
/// # Errors
///
/// [`MannWhitneyError::DegenerateVariance`] if σ_U is zero or not finite:
/// an empty sample, or every observation tied under tie correction.
///
/// # Examples
///
/// ```
/// use u_ranktest::statistic::{z_score, ZOptions};
///
/// let r = z_score(3.0, 3, 3, 0.0, ZOptions::uncorrected()).unwrap();
/// assert_eq!(r.mu, 4.5);
/// assert!((r.sigma_u - 5.25_f64.sqrt()).abs() < 1e-12);
/// assert!((r.z - (-1.5 / 5.25_f64.sqrt())).abs() < 1e-12);
/// ```
pub fn z_score(
    u: f64,
    n_a: usize,
    n_b: usize,
    tie_term: f64,
    options: ZOptions,
) -> Result<ZResult> {
    let na = n_a as f64;
    let nb = n_b as f64;
    let n = na + nb;

    let mu = na * nb / 2.0;
    let tie_adjust = if options.tie_correction && n > 1.0 {
        tie_term / (n * (n - 1.0))
    } else {
        0.0
    };
    let sigma_sq = na * nb / 12.0 * ((n + 1.0) - tie_adjust);

    if !sigma_sq.is_finite() || sigma_sq <= 0.0 {
        return Err(MannWhitneyError::DegenerateVariance {
            sigma_u: sigma_sq.max(0.0).sqrt(),
        });
    }
    let sigma_u = sigma_sq.sqrt();

    let mut diff = u - mu;
    if options.continuity_correction {
        diff = diff.signum() * (diff.abs() - 0.5).max(0.0);
    }
    let z = diff / sigma_u;

    debug!(u, mu, sigma_u, z, "normal approximation");
    Ok(ZResult { z, mu, sigma_u })
}

/// p-value of `z` under the standard normal distribution.
///
/// # Examples
///
/// ```
/// use u_ranktest::statistic::{p_value, Alternative};
///
/// assert!((p_value(0.0, Alternative::TwoSided) - 1.0).abs() < 1e-6);
/// assert!((p_value(1.96, Alternative::TwoSided) - 0.05).abs() < 1e-3);
/// ```
pub fn p_value(z: f64, alternative: Alternative) -> f64 {
    let p = match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - special::standard_normal_cdf(z.abs())),
        Alternative::Less => special::standard_normal_cdf(z),
        Alternative::Greater => 1.0 - special::standard_normal_cdf(z),
    };
    p.clamp(0.0, 1.0)
}

/// Rank-biserial correlation `2·U_B/(n_A·n_B) − 1`, in `[-1, 1]`.
///
/// Positive when group A tends to take larger values.
pub fn rank_biserial(u: &UStatistic) -> f64 {
    2.0 * u.b() / u.product() - 1.0
}

/// Common-language effect size `U_B/(n_A·n_B)`.
///
/// Estimates `P(A > B) + ½·P(A = B)` for a random pair.
pub fn common_language(u: &UStatistic) -> f64 {
    u.b() / u.product()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::rank::{aggregate, rank, TiePolicy};
    use crate::sample::Sample;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rank_sum_and_u_invariants(
            a in proptest::collection::vec(-20_i32..20, 1..=30),
            b in proptest::collection::vec(-20_i32..20, 1..=30),
        ) {
            // small integer range forces plenty of ties
            let a: Vec<f64> = a.into_iter().map(f64::from).collect();
            let b: Vec<f64> = b.into_iter().map(f64::from).collect();
            let n = (a.len() + b.len()) as f64;
            let nanb = (a.len() * b.len()) as f64;

            let r = rank(Sample::new(Group::A, &a), Sample::new(Group::B, &b), TiePolicy::Average)
                .expect("valid samples");
            let sums = aggregate(&r);
            prop_assert!(sums.invariant_holds());
            prop_assert_eq!(sums.a() + sums.b(), n * (n + 1.0) / 2.0);

            let u = u_statistics(&sums);
            prop_assert!(u.is_complementary());
            prop_assert_eq!(u.a() + u.b(), nanb);
            prop_assert!(u.a() >= 0.0 && u.a() <= nanb, "U_A = {}", u.a());
            prop_assert!(u.b() >= 0.0 && u.b() <= nanb, "U_B = {}", u.b());
        }

        #[test]
        fn swapping_samples_swaps_u(
            a in proptest::collection::vec(-1e3_f64..1e3, 1..=25),
            b in proptest::collection::vec(-1e3_f64..1e3, 1..=25),
        ) {
            let fwd = rank(Sample::new(Group::A, &a), Sample::new(Group::B, &b), TiePolicy::Average)
                .expect("valid samples");
            let rev = rank(Sample::new(Group::A, &b), Sample::new(Group::B, &a), TiePolicy::Average)
                .expect("valid samples");
            let uf = u_statistics(&aggregate(&fwd));
            let ur = u_statistics(&aggregate(&rev));
            prop_assert_eq!(uf.a(), ur.b());
            prop_assert_eq!(uf.b(), ur.a());

            let opts = ZOptions::default();
            let zf = z_score(uf.b(), a.len(), b.len(), fwd.tie_term(), opts);
            let zr = z_score(ur.a(), b.len(), a.len(), rev.tie_term(), opts);
            if let (Ok(zf), Ok(zr)) = (zf, zr) {
                prop_assert_eq!(zf.mu, zr.mu);
                prop_assert!((zf.sigma_u - zr.sigma_u).abs() < 1e-9);
                prop_assert!((zf.z - zr.z).abs() < 1e-9);
            }
        }

        #[test]
        fn p_value_bounded(z in -40.0_f64..40.0) {
            for alt in [Alternative::TwoSided, Alternative::Less, Alternative::Greater] {
                let p = p_value(z, alt);
                prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
            }
        }
    }
}
