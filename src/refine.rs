use log::{debug, trace};
use rand::Rng;

use crate::action::{Action, Index, Position};
use crate::error::{BalanceError, Result};
use crate::model::entity::Rating;
use crate::model::group::Partition;

pub const DEFAULT_ITERATIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineParams {
    pub iterations: usize,
}

impl Default for RefineParams {
    fn default() -> Self {
        RefineParams { iterations: DEFAULT_ITERATIONS }
    }
}

struct State {
    best: Partition,
    best_score: Rating,
    n_iterations: usize,
    n_accepted: usize,
}

/// Draws cross-team swaps. Team sizes never change under a swap, so they are
/// captured once.
struct SwapGenerator<'a, R: Rng> {
    sizes: Vec<Index>,
    rng: &'a mut R,
}

impl<'a, R: Rng> SwapGenerator<'a, R> {
    fn new(partition: &Partition, rng: &'a mut R) -> Result<SwapGenerator<'a, R>> {
        let sizes = partition.sizes();
        if sizes.len() < 2 {
            return Err(BalanceError::TooFewTeams(sizes.len()));
        }
        if let Some(team_index) = sizes.iter().position(|size| *size == 0) {
            return Err(BalanceError::EmptyTeam(team_index));
        }
        Ok(SwapGenerator { sizes, rng })
    }

    fn next(&mut self) -> Action {
        let n_teams = self.sizes.len();
        let first = self.rng.gen_range(0..n_teams);
        let mut second = self.rng.gen_range(0..n_teams - 1);
        if second >= first {
            second += 1;
        }
        let pos1 = Position {
            team_index: first,
            player_index: self.rng.gen_range(0..self.sizes[first]),
        };
        let pos2 = Position {
            team_index: second,
            player_index: self.rng.gen_range(0..self.sizes[second]),
        };
        Action::Swap(pos1, pos2)
    }
}

/// Greedy hill climbing over random two-player swaps.
///
/// Runs exactly `iterations` trials. Each trial swaps one random player from
/// each of two distinct random teams on a copy of the best partition so far,
/// and keeps the copy only when its imbalance is strictly lower. Needs at least
/// two teams and no empty team.
pub fn refine<R: Rng>(initial: &Partition, iterations: usize, rng: &mut R) -> Result<Partition> {
    let mut swaps = SwapGenerator::new(initial, rng)?;
    let mut state = State {
        best: initial.clone(),
        best_score: initial.imbalance(),
        n_iterations: 0,
        n_accepted: 0,
    };
    let start_score = state.best_score;

    while state.n_iterations < iterations {
        let mut trial = state.best.clone();
        let action = swaps.next();
        trace!("trying {:?}", action);
        trial.act(action)?;
        let score = trial.imbalance();
        if score < state.best_score {
            trace!("accepted swap, imbalance {:.2} -> {:.2}", state.best_score, score);
            state.best = trial;
            state.best_score = score;
            state.n_accepted += 1;
        }
        state.n_iterations += 1;
    }

    debug!(
        "refined over {} iterations, {} accepted, imbalance {:.2} -> {:.2}",
        state.n_iterations, state.n_accepted, start_score, state.best_score
    );
    Ok(state.best)
}

pub fn refine_with<R: Rng>(initial: &Partition, params: &RefineParams, rng: &mut R) -> Result<Partition> {
    refine(initial, params.iterations, rng)
}
