use std::cmp::Ordering;

use itertools::Itertools;
use log::debug;

use crate::action::{Action, Index};
use crate::error::{BalanceError, Result};
use crate::model::entity::{rank_by_rating, validate_pool, Player, Rating};
use crate::model::group::{Partition, Team};

/// Greedy seed-then-best-fit partition of `players` into `team_count` teams.
///
/// The strongest `team_count` players seed one team each. The rest are handed
/// out in rounds of `team_count`, strongest first: each player joins the team,
/// among those not yet served this round, whose current average is closest to
/// the player's rating. A short final round only serves the earliest teams, so
/// they absorb the remainder.
pub fn build(players: &[Player], team_count: usize) -> Result<Partition> {
    check_pool(players, team_count)?;

    let (mut partition, rest) = seed(players, team_count)?;
    for round in rest.chunks(team_count) {
        let mut open: Vec<Index> = (0..round.len()).collect();
        for player in round {
            let slot = best_fit(partition.teams(), &open, player.rating)
                .ok_or(BalanceError::InvalidPosition)?;
            let team_index = open.remove(slot);
            partition.act(Action::Add { player: player.clone(), team_index })?;
        }
    }

    debug!(
        "built {} teams from {} players, imbalance {:.2}",
        team_count,
        players.len(),
        partition.imbalance()
    );
    Ok(partition)
}

pub(crate) fn check_pool(players: &[Player], team_count: usize) -> Result<()> {
    if team_count == 0 {
        return Err(BalanceError::InvalidTeamCount(team_count));
    }
    if players.len() < team_count {
        return Err(BalanceError::NotEnoughPlayers { players: players.len(), teams: team_count });
    }
    validate_pool(players)
}

/// Headcount per team: an even share, plus one for the earliest teams while the
/// remainder lasts.
pub(crate) fn capacities(pool_size: usize, team_count: usize) -> Vec<usize> {
    let base = pool_size / team_count;
    let extra = pool_size % team_count;
    (0..team_count).map(|index| base + usize::from(index < extra)).collect()
}

/// Ranks `players` and gives the strongest `team_count` one team each.
/// Returns the seeded partition and the remaining players, strongest first.
pub(crate) fn seed(players: &[Player], team_count: usize) -> Result<(Partition, Vec<Player>)> {
    let mut ranked = rank_by_rating(players);
    let rest = ranked.split_off(team_count);
    let mut partition = Partition::empty(team_count);
    for (team_index, player) in ranked.into_iter().enumerate() {
        partition.act(Action::Add { player, team_index })?;
    }
    Ok((partition, rest))
}

/// Orders two ratings by their distance to `target`, nearer first.
pub(crate) fn closer_to(target: Rating, a: Rating, b: Rating) -> Ordering {
    (a - target).abs().total_cmp(&(b - target).abs())
}

/// Position in `candidates` of the team whose average is closest to `rating`.
/// Ties go to the earliest candidate.
fn best_fit(teams: &[Team], candidates: &[Index], rating: Rating) -> Option<usize> {
    candidates.iter().position_min_by(|a, b| {
        closer_to(rating, teams[**a].average_rating(), teams[**b].average_rating())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(spec: &[(&str, f64)]) -> Vec<Player> {
        spec.iter().map(|(id, rating)| Player::new(*id, *rating)).collect()
    }

    fn ids(team: &Team) -> Vec<&str> {
        team.players().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn four_players_two_teams() {
        let pool = players(&[("a", 90.0), ("b", 80.0), ("c", 50.0), ("d", 40.0)]);
        let partition = build(&pool, 2).unwrap();

        assert_eq!(ids(&partition.teams()[0]), vec!["a", "d"]);
        assert_eq!(ids(&partition.teams()[1]), vec!["b", "c"]);
        assert_eq!(partition.teams()[0].average_rating(), 65.0);
        assert_eq!(partition.teams()[1].average_rating(), 65.0);
        assert_eq!(partition.imbalance(), 0.0);
    }

    #[test]
    fn input_order_does_not_matter_for_distinct_ratings() {
        let pool = players(&[("d", 40.0), ("b", 80.0), ("c", 50.0), ("a", 90.0)]);
        let partition = build(&pool, 2).unwrap();
        assert_eq!(ids(&partition.teams()[0]), vec!["a", "d"]);
        assert_eq!(ids(&partition.teams()[1]), vec!["b", "c"]);
    }

    #[test]
    fn single_team_takes_everyone() {
        let pool = players(&[("a", 10.0), ("b", 30.0), ("c", 20.0)]);
        let partition = build(&pool, 1).unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!(ids(&partition.teams()[0]), vec!["b", "c", "a"]);
    }

    #[test]
    fn remainder_goes_to_earliest_teams() {
        let pool = players(&[
            ("a", 70.0),
            ("b", 60.0),
            ("c", 50.0),
            ("d", 40.0),
            ("e", 30.0),
            ("f", 20.0),
            ("g", 10.0),
        ]);
        let partition = build(&pool, 3).unwrap();
        assert_eq!(partition.sizes(), vec![3, 2, 2]);
        assert_eq!(partition.player_count(), 7);
        assert!(partition.unassigned(&pool).is_empty());
    }

    #[test]
    fn equal_ratings_keep_input_order() {
        let pool = players(&[("p", 50.0), ("q", 50.0), ("r", 50.0), ("s", 50.0)]);
        let first = build(&pool, 2).unwrap();
        let second = build(&pool, 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first.teams()[0]), vec!["p", "r"]);
        assert_eq!(ids(&first.teams()[1]), vec!["q", "s"]);
    }

    #[test]
    fn rejects_bad_team_counts() {
        let pool = players(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(build(&pool, 0), Err(BalanceError::InvalidTeamCount(0)));
        assert_eq!(
            build(&pool, 3),
            Err(BalanceError::NotEnoughPlayers { players: 2, teams: 3 })
        );
    }

    #[test]
    fn rejects_duplicate_players() {
        let pool = players(&[("a", 1.0), ("a", 2.0)]);
        assert_eq!(build(&pool, 1), Err(BalanceError::DuplicatePlayer("a".to_string())));
    }

    #[test]
    fn seed_gives_top_players_one_team_each() {
        let pool = players(&[("c", 50.0), ("a", 90.0), ("d", 40.0), ("b", 80.0)]);
        let (partition, rest) = seed(&pool, 2).unwrap();
        assert_eq!(ids(&partition.teams()[0]), vec!["a"]);
        assert_eq!(ids(&partition.teams()[1]), vec!["b"]);
        let rest: Vec<_> = rest.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(rest, vec!["c", "d"]);
    }

    #[test]
    fn closer_rating_orders_first() {
        assert_eq!(closer_to(60.0, 55.0, 70.0), Ordering::Less);
        assert_eq!(closer_to(60.0, 80.0, 45.0), Ordering::Greater);
        assert_eq!(closer_to(60.0, 50.0, 70.0), Ordering::Equal);
    }

    #[test]
    fn capacity_split() {
        assert_eq!(capacities(7, 3), vec![3, 2, 2]);
        assert_eq!(capacities(6, 3), vec![2, 2, 2]);
        assert_eq!(capacities(5, 1), vec![5]);
    }
}
