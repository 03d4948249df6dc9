use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace, warn};

use crate::action::Action;
use crate::build::{capacities, check_pool, closer_to, seed};
use crate::error::{BalanceError, Result};
use crate::model::condition::{MonthKey, PairCounts, PairKey};
use crate::model::entity::Player;
use crate::model::group::{Partition, Team, WeekSnapshot};

pub const DEFAULT_MONTHLY_CAP: u32 = 2;

/// Limits on how often the same two players may share a team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingLimits {
    /// A pair already teamed this many times in a month is not teamed again.
    pub monthly_cap: u32,
    /// Reject pairs that shared a team the week before the target week.
    pub forbid_last_week: bool,
}

impl Default for PairingLimits {
    fn default() -> Self {
        PairingLimits { monthly_cap: DEFAULT_MONTHLY_CAP, forbid_last_week: true }
    }
}

/// Co-occurrence counts per month, plus the pairs of the previous week.
#[derive(Debug, Clone, Default)]
pub struct PairingHistory {
    months: HashMap<MonthKey, PairCounts>,
    last_week: HashSet<PairKey>,
}

impl PairingHistory {
    pub fn from_weeks<'a>(weeks: impl IntoIterator<Item = &'a WeekSnapshot>) -> PairingHistory {
        let mut history = PairingHistory::default();
        for week in weeks {
            let month = MonthKey::from(week.date);
            for pair in week.teams.iter().flat_map(team_pairs) {
                history.record(month, pair);
            }
        }
        history
    }

    /// Replaces the previous-week pair set with the pairs of `week`.
    pub fn set_last_week(&mut self, week: &WeekSnapshot) {
        self.last_week = week.teams.iter().flat_map(team_pairs).collect();
    }

    pub fn record(&mut self, month: MonthKey, pair: PairKey) {
        self.months.entry(month).or_default().increment(pair);
    }

    pub fn count(&self, month: MonthKey, pair: &PairKey) -> u32 {
        self.months.get(&month).map_or(0, |counts| counts.get_pair(pair))
    }

    pub fn played_last_week(&self, pair: &PairKey) -> bool {
        self.last_week.contains(pair)
    }

    fn allows(&self, player: &Player, team: &Team, months: &[MonthKey], limits: &PairingLimits) -> bool {
        team.players().iter().all(|member| {
            let pair = PairKey::new(&player.id, &member.id);
            let over_cap = months.iter().any(|month| self.count(*month, &pair) >= limits.monthly_cap);
            let repeat = limits.forbid_last_week && self.played_last_week(&pair);
            if over_cap || repeat {
                trace!("rejecting pair {} for team {}", pair, team.id);
            }
            !over_cap && !repeat
        })
    }
}

fn team_pairs(team: &Team) -> impl Iterator<Item = PairKey> + '_ {
    team.players()
        .iter()
        .tuple_combinations()
        .map(|(a, b)| PairKey::new(&a.id, &b.id))
}

/// `build_history_aware_partition_with` under the default limits.
pub fn build_history_aware_partition(
    weeks: &[WeekSnapshot],
    team_count: usize,
    current_month: MonthKey,
) -> Result<Partition> {
    build_history_aware_partition_with(weeks, team_count, current_month, &PairingLimits::default())
}

/// Redistributes every player seen in `weeks` into `team_count` teams while
/// keeping frequent pairs apart.
///
/// The latest-dated week is the target week; the week before it supplies the
/// last-week pairs. Players are seeded like [`crate::build::build`], but the
/// rounds run the other way around: where `build` places each player into the
/// closest open team, here each team in index order picks the closest-rated
/// remaining player that passes the pairing limits against all of its members,
/// checked in both the current month and the target week's month. A team with no acceptable candidate
/// stops receiving players, so the result may leave players unassigned; use
/// [`Partition::unassigned`] to detect that.
pub fn build_history_aware_partition_with(
    weeks: &[WeekSnapshot],
    team_count: usize,
    current_month: MonthKey,
    limits: &PairingLimits,
) -> Result<Partition> {
    if team_count == 0 {
        return Err(BalanceError::InvalidTeamCount(team_count));
    }
    let ordered: Vec<&WeekSnapshot> = weeks.iter().sorted_by_key(|week| week.date).collect();
    let target = match ordered.last() {
        Some(week) => *week,
        None => return Err(BalanceError::NotEnoughPlayers { players: 0, teams: team_count }),
    };
    let target_month = MonthKey::from(target.date);

    let mut history = PairingHistory::from_weeks(ordered.iter().copied());
    if ordered.len() >= 2 {
        history.set_last_week(ordered[ordered.len() - 2]);
    }

    let players = collect_pool(&ordered);
    check_pool(&players, team_count)?;
    let capacities = capacities(players.len(), team_count);
    let months: Vec<MonthKey> = [current_month, target_month].into_iter().dedup().collect();

    let (mut partition, mut pool) = seed(&players, team_count)?;

    let mut closed = vec![false; team_count];
    'rounds: for round in 1..capacities[0] {
        for team_index in 0..team_count {
            if pool.is_empty() {
                break 'rounds;
            }
            if closed[team_index] || capacities[team_index] <= round {
                continue;
            }
            let team = partition.team(team_index).ok_or(BalanceError::InvalidPosition)?;
            let average = team.average_rating();
            let pick = (0..pool.len())
                .sorted_by(|a, b| closer_to(average, pool[*a].rating, pool[*b].rating))
                .find(|index| history.allows(&pool[*index], team, &months, limits));

            match pick {
                Some(index) => {
                    let player = pool.remove(index);
                    for member in team.players() {
                        for month in &months {
                            history.record(*month, PairKey::new(&player.id, &member.id));
                        }
                    }
                    partition.act(Action::Add { player, team_index })?;
                }
                None => {
                    debug!("no acceptable candidate for team {} in round {}", team_index, round);
                    closed[team_index] = true;
                }
            }
        }
    }

    if !pool.is_empty() {
        warn!(
            "history-aware build left {} of {} players unassigned",
            pool.len(),
            players.len()
        );
    }
    debug!(
        "history-aware build of {} teams for {} (current {}), imbalance {:.2}",
        team_count,
        target_month,
        current_month,
        partition.imbalance()
    );
    Ok(partition)
}

/// Every distinct player across `weeks`, first appearance wins.
fn collect_pool(weeks: &[&WeekSnapshot]) -> Vec<Player> {
    weeks
        .iter()
        .flat_map(|week| week.teams.iter())
        .flat_map(|team| team.players().iter())
        .unique_by(|player| player.id.clone())
        .cloned()
        .collect()
}
