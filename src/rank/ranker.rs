//! Combined-pool ranking with tie resolution.
//!
//! # Algorithm
//!
//! Both samples are merged (A first, then B, each in input order) and sorted
//! ascending with a stable sort. Walking the sorted pool, each maximal block
//! of equal values spanning positions `i+1 ..= j` receives
//!
//! ```text
//! average:  (i + 1 + j) / 2      for every member
//! ordinal:  i + 1, i + 2, ..., j in pool order
//! ```
//!
//! Block sizes `t > 1` are recorded for the variance tie correction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MannWhitneyError, Result};
use crate::sample::{Group, Observation, Sample};

/// How observations with equal values are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
    /// Every tied value gets the mean of the positions its block spans.
    #[default]
    Average,
    /// Raw post-sort positions; within a tie block group A precedes group B.
    ///
    /// Biases U whenever a tie block mixes both groups. Only useful for
    /// reproducing naive implementations.
    Ordinal,
}

/// An observation annotated with its rank in the combined pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedObservation {
    observation: Observation,
    doubled_rank: u64,
}

impl RankedObservation {
    /// The underlying observation.
    pub fn observation(&self) -> Observation {
        self.observation
    }

    /// Observed value.
    pub fn value(&self) -> f64 {
        self.observation.value
    }

    /// Group membership.
    pub fn group(&self) -> Group {
        self.observation.group
    }

    /// 1-based rank, possibly fractional (x.5) under [`TiePolicy::Average`].
    pub fn rank(&self) -> f64 {
        self.doubled_rank as f64 / 2.0
    }

    pub(crate) fn doubled_rank(&self) -> u64 {
        self.doubled_rank
    }
}

/// The ranked combined pool, in ascending value order.
#[derive(Debug, Clone)]
pub struct Ranking {
    observations: Vec<RankedObservation>,
    tie_sizes: Vec<usize>,
    n_a: usize,
    n_b: usize,
    policy: TiePolicy,
}

impl Ranking {
    /// Ranked observations sorted by value.
    pub fn observations(&self) -> &[RankedObservation] {
        &self.observations
    }

    /// Size of sample A.
    pub fn n_a(&self) -> usize {
        self.n_a
    }

    /// Size of sample B.
    pub fn n_b(&self) -> usize {
        self.n_b
    }

    /// Total number of observations `N`.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false` for a ranking produced by [`rank`].
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Policy the ranks were assigned under.
    pub fn policy(&self) -> TiePolicy {
        self.policy
    }

    /// Sizes of every block of tied values (only blocks with `t > 1`).
    pub fn tie_sizes(&self) -> &[usize] {
        &self.tie_sizes
    }

    /// Whether any value occurs more than once.
    pub fn has_ties(&self) -> bool {
        !self.tie_sizes.is_empty()
    }

    /// Σ (tᵢ³ − tᵢ) over all tie blocks.
    pub fn tie_term(&self) -> f64 {
        self.tie_sizes
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }
}

/// Ranks the combined pool of two samples.
///
/// Both samples are consumed; the result owns every observation.
///
/// # Errors
///
/// - [`MannWhitneyError::InvalidGroupTag`] if `a` is not a group-A sample,
///   `b` is not a group-B sample, or an observation's tag differs from its
///   sample's group
/// - [`MannWhitneyError::EmptySample`] if either sample has no observations
/// - [`MannWhitneyError::NonFiniteValue`] for NaN or infinite values
///
/// # Examples
///
/// ```
/// use u_ranktest::rank::{rank, TiePolicy};
/// use u_ranktest::sample::{Group, Sample};
///
/// let a = Sample::new(Group::A, &[1.0, 2.0, 5.0]);
/// let b = Sample::new(Group::B, &[2.0, 2.0]);
/// let ranking = rank(a, b, TiePolicy::Average).unwrap();
/// let ranks: Vec<f64> = ranking.observations().iter().map(|r| r.rank()).collect();
/// assert_eq!(ranks, vec![1.0, 3.0, 3.0, 3.0, 5.0]);
/// ```
pub fn rank(a: Sample, b: Sample, policy: TiePolicy) -> Result<Ranking> {
    check_group(&a, Group::A)?;
    check_group(&b, Group::B)?;
    for sample in [&a, &b] {
        if sample.is_empty() {
            return Err(MannWhitneyError::EmptySample {
                group: sample.group(),
            });
        }
        if let Some(index) = sample.values().position(|v| !v.is_finite()) {
            return Err(MannWhitneyError::NonFiniteValue {
                group: sample.group(),
                index,
            });
        }
    }

    let n_a = a.len();
    let n_b = b.len();
    let n = n_a + n_b;

    let mut pool: Vec<Observation> = Vec::with_capacity(n);
    pool.extend(a.into_observations());
    pool.extend(b.into_observations());
    // stable: tie blocks keep A-then-B input order
    pool.sort_by(|x, y| x.value.total_cmp(&y.value));

    let mut observations = Vec::with_capacity(n);
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && pool[j].value == pool[i].value {
            j += 1;
        }
        // Positions i+1..=j are tied
        if j - i > 1 {
            tie_sizes.push(j - i);
        }
        for (pos, &observation) in pool.iter().enumerate().take(j).skip(i) {
            let doubled_rank = match policy {
                TiePolicy::Average => (i + 1 + j) as u64,
                TiePolicy::Ordinal => 2 * (pos + 1) as u64,
            };
            observations.push(RankedObservation {
                observation,
                doubled_rank,
            });
        }
        i = j;
    }

    debug!(
        n_a,
        n_b,
        tie_blocks = tie_sizes.len(),
        ?policy,
        "ranked combined pool"
    );

    Ok(Ranking {
        observations,
        tie_sizes,
        n_a,
        n_b,
        policy,
    })
}

fn check_group(sample: &Sample, expected: Group) -> Result<()> {
    if sample.group() != expected {
        return Err(MannWhitneyError::InvalidGroupTag {
            index: 0,
            detail: format!(
                "expected a sample for group {expected}, got group {}",
                sample.group()
            ),
        });
    }
    if let Some((index, obs)) = sample
        .observations()
        .iter()
        .enumerate()
        .find(|(_, o)| o.group != expected)
    {
        return Err(MannWhitneyError::InvalidGroupTag {
            index,
            detail: format!("observation tagged {} in sample for group {expected}", obs.group),
        });
    }
    Ok(())
}
