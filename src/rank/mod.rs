//! Ranking of the combined pool and per-group rank sums.
//!
//! # Stages
//!
//! - [`rank`] — merges both samples, sorts ascending and assigns 1-based ranks
//!   under a [`TiePolicy`]
//! - [`aggregate`] — sums ranks per group and checks
//!   `R_A + R_B = N(N+1)/2`
//!
//! Ranks are tracked internally as doubled integers: an averaged rank is
//! always a multiple of ½, so every rank sum stays exact.
//!
//! # References
//!
//! - Mann, H.B. & Whitney, D.R. (1947). "On a test of whether one of two
//!   random variables is stochastically larger than the other",
//!   *Annals of Mathematical Statistics* 18(1), pp. 50-60.

mod aggregate;
mod ranker;

pub use aggregate::{aggregate, RankSums};
pub use ranker::{rank, RankedObservation, Ranking, TiePolicy};
