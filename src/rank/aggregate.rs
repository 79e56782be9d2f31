//! Per-group rank sums.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ranker::Ranking;
use crate::sample::Group;

/// Sum of ranks per group.
///
/// Stored as doubled integers, so `R_A + R_B = N(N+1)/2` can be checked
/// without rounding.
///
/// Deserializing rejects sums that break the invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRankSums")]
pub struct RankSums {
    doubled_a: u64,
    doubled_b: u64,
    n_a: usize,
    n_b: usize,
}

#[derive(Deserialize)]
struct RawRankSums {
    doubled_a: u64,
    doubled_b: u64,
    n_a: usize,
    n_b: usize,
}

impl TryFrom<RawRankSums> for RankSums {
    type Error = String;

    fn try_from(raw: RawRankSums) -> Result<Self, Self::Error> {
        let sums = RankSums {
            doubled_a: raw.doubled_a,
            doubled_b: raw.doubled_b,
            n_a: raw.n_a,
            n_b: raw.n_b,
        };
        if !sums.invariant_holds() {
            return Err(format!(
                "rank sums {} + {} do not add up to {}",
                sums.a(),
                sums.b(),
                sums.expected_total()
            ));
        }
        // each group's sum lies between its lowest and highest possible ranks
        let (na, nb) = (sums.n_a as u64, sums.n_b as u64);
        let low_a = na * (na + 1);
        if sums.doubled_a < low_a || sums.doubled_a > low_a + 2 * na * nb {
            return Err(format!(
                "rank sum {} is out of range for n_a = {}, n_b = {}",
                sums.a(),
                na,
                nb
            ));
        }
        Ok(sums)
    }
}

impl RankSums {
    /// Rank sum of group A.
    pub fn a(&self) -> f64 {
        self.doubled_a as f64 / 2.0
    }

    /// Rank sum of group B.
    pub fn b(&self) -> f64 {
        self.doubled_b as f64 / 2.0
    }

    /// Rank sum of the given group.
    pub fn get(&self, group: Group) -> f64 {
        match group {
            Group::A => self.a(),
            Group::B => self.b(),
        }
    }

    /// Number of observations counted for group A.
    pub fn n_a(&self) -> usize {
        self.n_a
    }

    /// Number of observations counted for group B.
    pub fn n_b(&self) -> usize {
        self.n_b
    }

    /// `N(N+1)/2` for `N = n_a + n_b`.
    pub fn expected_total(&self) -> f64 {
        let n = (self.n_a + self.n_b) as u64;
        (n * (n + 1)) as f64 / 2.0
    }

    /// Whether `R_A + R_B == N(N+1)/2` holds exactly.
    pub fn invariant_holds(&self) -> bool {
        let n = (self.n_a + self.n_b) as u64;
        self.doubled_a + self.doubled_b == n * (n + 1)
    }

    pub(crate) fn doubled(&self, group: Group) -> u64 {
        match group {
            Group::A => self.doubled_a,
            Group::B => self.doubled_b,
        }
    }
}

/// Sums ranks per group. The order of the ranked pool is irrelevant.
///
/// # Examples
///
/// ```
/// use u_ranktest::rank::{aggregate, rank, TiePolicy};
/// use u_ranktest::sample::{Group, Sample};
///
/// let a = Sample::new(Group::A, &[1.0, 3.0, 5.0]);
/// let b = Sample::new(Group::B, &[2.0, 4.0, 6.0]);
/// let sums = aggregate(&rank(a, b, TiePolicy::Average).unwrap());
/// assert_eq!(sums.a(), 9.0);
/// assert_eq!(sums.b(), 12.0);
/// assert!(sums.invariant_holds());
/// ```
pub fn aggregate(ranking: &Ranking) -> RankSums {
    let mut sums = RankSums {
        doubled_a: 0,
        doubled_b: 0,
        n_a: 0,
        n_b: 0,
    };
    for obs in ranking.observations() {
        match obs.group() {
            Group::A => {
                sums.doubled_a += obs.doubled_rank();
                sums.n_a += 1;
            }
            Group::B => {
                sums.doubled_b += obs.doubled_rank();
                sums.n_b += 1;
            }
        }
    }

    if !sums.invariant_holds() {
        warn!(
            rank_sum_a = sums.a(),
            rank_sum_b = sums.b(),
            expected = sums.expected_total(),
            "rank sums violate N(N+1)/2"
        );
    }
    debug_assert!(sums.invariant_holds(), "rank-sum invariant violated");
    debug!(
        rank_sum_a = sums.a(),
        rank_sum_b = sums.b(),
        "aggregated rank sums"
    );

    sums
}
