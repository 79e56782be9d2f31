//! Observations and the two independent samples fed into the ranker.
//!
//! A [`Sample`] owns its observations and is sized independently of the
//! other group; nothing here assumes `n_A == n_B`.
//!
//! # Examples
//!
//! ```
//! use u_ranktest::sample::{split_labeled, Group, GroupCodes};
//!
//! let rows = [(12.0, 1), (7.5, 2), (9.0, 1), (8.0, 2), (11.0, 2)];
//! let (a, b) = split_labeled(&rows, GroupCodes::default()).unwrap();
//! assert_eq!(a.group(), Group::A);
//! assert_eq!(a.len(), 2);
//! assert_eq!(b.len(), 3);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MannWhitneyError, Result};

/// One of exactly two group identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// First sample.
    A,
    /// Second sample.
    B,
}

impl Group {
    /// The other group.
    pub fn other(self) -> Group {
        match self {
            Group::A => Group::B,
            Group::B => Group::A,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => f.write_str("A"),
            Group::B => f.write_str("B"),
        }
    }
}

/// A numeric value tagged with the group it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observed value.
    pub value: f64,
    /// Group membership.
    pub group: Group,
}

impl Observation {
    /// Creates an observation.
    pub fn new(value: f64, group: Group) -> Self {
        Self { value, group }
    }
}

/// An ordered sequence of observations belonging to one group.
///
/// Deserialization goes through [`Sample::from_observations`], so a sample
/// read from JSON (or any serde format) carries consistent tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct Sample {
    group: Group,
    observations: Vec<Observation>,
}

#[derive(Deserialize)]
struct RawSample {
    group: Group,
    observations: Vec<Observation>,
}

impl TryFrom<RawSample> for Sample {
    type Error = MannWhitneyError;

    fn try_from(raw: RawSample) -> Result<Self> {
        Sample::from_observations(raw.group, raw.observations)
    }
}

impl Sample {
    /// Tags every value with `group`.
    ///
    /// Construction never fails; emptiness and non-finite values are
    /// rejected by the ranker, where they make the test undefined.
    pub fn new(group: Group, values: &[f64]) -> Self {
        Self {
            group,
            observations: values.iter().map(|&v| Observation::new(v, group)).collect(),
        }
    }

    /// Builds a sample from already tagged observations.
    ///
    /// # Errors
    ///
    /// [`MannWhitneyError::InvalidGroupTag`] if any observation is tagged with
    /// the other group.
    pub fn from_observations(group: Group, observations: Vec<Observation>) -> Result<Self> {
        if let Some((index, obs)) = observations
            .iter()
            .enumerate()
            .find(|(_, o)| o.group != group)
        {
            return Err(MannWhitneyError::InvalidGroupTag {
                index,
                detail: format!("observation tagged {} in sample for group {group}", obs.group),
            });
        }
        Ok(Self {
            group,
            observations,
        })
    }

    /// Group this sample belongs to.
    pub fn group(&self) -> Group {
        self.group
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the sample has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The observations in input order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Iterator over the raw values.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub(crate) fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    #[cfg(test)]
    pub(crate) fn unchecked(group: Group, observations: Vec<Observation>) -> Self {
        Self {
            group,
            observations,
        }
    }
}

/// Integer codes a loader uses to label the two groups.
///
/// Defaults to `1` for group A and `2` for group B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCodes {
    /// Code identifying group A.
    pub a: i64,
    /// Code identifying group B.
    pub b: i64,
}

impl Default for GroupCodes {
    fn default() -> Self {
        Self { a: 1, b: 2 }
    }
}

impl GroupCodes {
    /// Creates a code mapping. Returns `None` if both groups share a code.
    pub fn new(a: i64, b: i64) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(Self { a, b })
    }

    /// Resolves a code to its group.
    pub fn resolve(&self, code: i64) -> Option<Group> {
        if code == self.a {
            Some(Group::A)
        } else if code == self.b {
            Some(Group::B)
        } else {
            None
        }
    }
}

/// Splits `(value, group code)` rows into the two samples, keeping input order.
///
/// # Errors
///
/// - [`MannWhitneyError::InvalidGroupTag`] for a code matching neither group
///   (or when both groups were configured with the same code).
///
/// Empty groups are not rejected here; the ranker reports them.
pub fn split_labeled(rows: &[(f64, i64)], codes: GroupCodes) -> Result<(Sample, Sample)> {
    if codes.a == codes.b {
        return Err(MannWhitneyError::InvalidGroupTag {
            index: 0,
            detail: format!("code {} is assigned to both groups", codes.a),
        });
    }

    let mut a = Vec::new();
    let mut b = Vec::new();
    for (index, &(value, code)) in rows.iter().enumerate() {
        match codes.resolve(code) {
            Some(Group::A) => a.push(Observation::new(value, Group::A)),
            Some(Group::B) => b.push(Observation::new(value, Group::B)),
            None => {
                return Err(MannWhitneyError::InvalidGroupTag {
                    index,
                    detail: format!(
                        "code {code} matches neither group A ({}) nor group B ({})",
                        codes.a, codes.b
                    ),
                });
            }
        }
    }

    Ok((
        Sample {
            group: Group::A,
            observations: a,
        },
        Sample {
            group: Group::B,
            observations: b,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tags_every_value() {
        let s = Sample::new(Group::B, &[3.0, 1.0, 2.0]);
        assert_eq!(s.len(), 3);
        assert!(s.observations().iter().all(|o| o.group == Group::B));
        // input order preserved
        assert_eq!(s.values().collect::<Vec<_>>(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn from_observations_rejects_foreign_tag() {
        let obs = vec![
            Observation::new(1.0, Group::A),
            Observation::new(2.0, Group::B),
        ];
        let err = Sample::from_observations(Group::A, obs).unwrap_err();
        assert!(matches!(err, MannWhitneyError::InvalidGroupTag { index: 1, .. }));
    }

    #[test]
    fn from_observations_accepts_consistent_tags() {
        let obs = vec![Observation::new(1.0, Group::A); 4];
        let s = Sample::from_observations(Group::A, obs).expect("consistent");
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn deserialize_rejects_foreign_tag() {
        let json = r#"{"group":"A","observations":[{"value":1.0,"group":"B"},{"value":2.0,"group":"A"}]}"#;
        let err = serde_json::from_str::<Sample>(json).unwrap_err();
        assert!(err.to_string().contains("invalid group tag"), "{err}");
    }

    #[test]
    fn deserialize_accepts_consistent_sample() {
        let s = Sample::new(Group::B, &[3.0, 4.0]);
        let json = serde_json::to_string(&s).expect("serialize");
        let back: Sample = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, s);
    }

    #[test]
    fn split_labeled_default_codes() {
        let rows = [(5.0, 1), (6.0, 2), (7.0, 1)];
        let (a, b) = split_labeled(&rows, GroupCodes::default()).expect("valid codes");
        assert_eq!(a.values().collect::<Vec<_>>(), vec![5.0, 7.0]);
        assert_eq!(b.values().collect::<Vec<_>>(), vec![6.0]);
        assert_eq!(b.group(), Group::B);
    }

    #[test]
    fn split_labeled_unknown_code() {
        let rows = [(5.0, 1), (6.0, 3)];
        let err = split_labeled(&rows, GroupCodes::default()).unwrap_err();
        assert!(matches!(err, MannWhitneyError::InvalidGroupTag { index: 1, .. }));
    }

    #[test]
    fn split_labeled_same_code_twice() {
        let codes = GroupCodes { a: 4, b: 4 };
        assert!(split_labeled(&[(1.0, 4)], codes).is_err());
        assert!(GroupCodes::new(4, 4).is_none());
    }

    #[test]
    fn custom_codes_resolve() {
        let codes = GroupCodes::new(15, 6).expect("distinct");
        assert_eq!(codes.resolve(15), Some(Group::A));
        assert_eq!(codes.resolve(6), Some(Group::B));
        assert_eq!(codes.resolve(0), None);
    }

    #[test]
    fn group_other_and_display() {
        assert_eq!(Group::A.other(), Group::B);
        assert_eq!(Group::B.other(), Group::A);
        assert_eq!(Group::A.to_string(), "A");
    }
}
