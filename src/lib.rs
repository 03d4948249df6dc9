//! Team balancing for a recurring pickup game.
//!
//! [`build`] makes a greedy, deterministic partition of rated players into a
//! fixed number of teams, [`refine`] improves any partition by random
//! two-player swaps, and [`build_history_aware_partition`] redistributes a set
//! of past weeks while keeping frequently paired players apart.

pub mod action;
pub mod build;
pub mod error;
pub mod history;
pub mod model;
pub mod refine;

use log::debug;
use rand::Rng;

pub use crate::build::build;
pub use crate::error::{BalanceError, Result};
pub use crate::history::{
    build_history_aware_partition, build_history_aware_partition_with, PairingHistory, PairingLimits,
};
pub use crate::model::condition::{MonthKey, PairKey};
pub use crate::model::entity::{Id, Player, Rating};
pub use crate::model::group::{imbalance, Partition, Team, WeekSnapshot};
pub use crate::refine::{refine, refine_with, RefineParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConfig {
    pub team_count: usize,
    pub refine: RefineParams,
}

impl BalanceConfig {
    pub fn new(team_count: usize) -> BalanceConfig {
        BalanceConfig { team_count, refine: RefineParams::default() }
    }
}

/// Builds a partition and refines it. A single team has nothing to swap, so it
/// is returned as built.
pub fn balance<R: Rng>(players: &[Player], config: &BalanceConfig, rng: &mut R) -> Result<Partition> {
    let initial = build(players, config.team_count)?;
    if initial.len() < 2 {
        debug!("single team, skipping refinement");
        return Ok(initial);
    }
    refine_with(&initial, &config.refine, rng)
}
