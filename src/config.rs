//! Configuration for a Mann-Whitney run.

use serde::{Deserialize, Serialize};

use crate::error::{MannWhitneyError, Result};
use crate::rank::TiePolicy;
use crate::statistic::{Alternative, UChoice, ZOptions};

/// Configuration options for [`crate::MannWhitney`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MannWhitneyConfig {
    /// How tied values are ranked (default: `Average`).
    pub tie_policy: TiePolicy,

    /// Reduce the variance of U by the tie term (default: true).
    pub tie_correction: bool,

    /// Apply the ½ continuity correction to `U − μ` (default: false).
    pub continuity_correction: bool,

    /// Which U is standardized into Z (default: `GroupB`).
    pub statistic: UChoice,

    /// Alternative hypothesis for the p-value (default: `TwoSided`).
    pub alternative: Alternative,
}

impl Default for MannWhitneyConfig {
    fn default() -> Self {
        Self {
            tie_policy: TiePolicy::Average,
            tie_correction: true,
            continuity_correction: false,
            statistic: UChoice::GroupB,
            alternative: Alternative::TwoSided,
        }
    }
}

impl MannWhitneyConfig {
    /// Plain normal approximation: averaged ranks, no tie or continuity
    /// correction, Z taken from `U_B`.
    pub fn uncorrected() -> Self {
        Self {
            tie_correction: false,
            ..Self::default()
        }
    }

    /// Checks that the options can be combined.
    ///
    /// # Errors
    ///
    /// [`MannWhitneyError::InvalidConfig`] when
    /// - tie correction is requested together with ordinal ranks (the tie
    ///   term assumes averaged ranks)
    /// - the smaller U is combined with a one-sided alternative (its Z is
    ///   never positive, so it carries no direction)
    pub fn validate(&self) -> Result<()> {
        if self.tie_correction && self.tie_policy == TiePolicy::Ordinal {
            return Err(MannWhitneyError::InvalidConfig(
                "tie correction requires TiePolicy::Average".to_string(),
            ));
        }
        if self.statistic == UChoice::Smaller && self.alternative != Alternative::TwoSided {
            return Err(MannWhitneyError::InvalidConfig(
                "UChoice::Smaller only supports a two-sided alternative".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn z_options(&self) -> ZOptions {
        ZOptions {
            tie_correction: self.tie_correction,
            continuity_correction: self.continuity_correction,
        }
    }
}
