use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use team_balance::{build, refine, Partition, Player};

fn pool_strategy() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec(0u32..100, 1..40).prop_map(|ratings| {
        ratings
            .into_iter()
            .enumerate()
            .map(|(i, rating)| Player::new(format!("player-{i}"), rating as f64))
            .collect()
    })
}

fn pool_and_teams() -> impl Strategy<Value = (Vec<Player>, usize)> {
    pool_strategy().prop_flat_map(|pool| {
        let len = pool.len();
        (Just(pool), 1..=len)
    })
}

fn assigned_ids(partition: &Partition) -> Vec<String> {
    partition
        .teams()
        .iter()
        .flat_map(|team| team.players().iter().map(|p| p.id.clone()))
        .collect()
}

proptest! {
    /// Property: every input player lands in exactly one team
    #[test]
    fn prop_build_is_exact_cover((pool, team_count) in pool_and_teams()) {
        let partition = build(&pool, team_count).unwrap();
        let ids = assigned_ids(&partition);
        let unique: HashSet<&String> = ids.iter().collect();
        let input: HashSet<&String> = pool.iter().map(|p| &p.id).collect();

        prop_assert_eq!(partition.len(), team_count);
        prop_assert_eq!(ids.len(), pool.len());
        prop_assert_eq!(unique, input);
    }

    /// Property: headcounts differ by at most one, larger teams first
    #[test]
    fn prop_build_sizes_are_even((pool, team_count) in pool_and_teams()) {
        let sizes = build(&pool, team_count).unwrap().sizes();
        prop_assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(sizes[0] - sizes[team_count - 1] <= 1);
    }

    /// Property: one team holds the whole pool
    #[test]
    fn prop_single_team_takes_all(pool in pool_strategy()) {
        let partition = build(&pool, 1).unwrap();
        prop_assert_eq!(partition.teams()[0].len(), pool.len());
    }

    /// Property: build is deterministic
    #[test]
    fn prop_build_is_deterministic((pool, team_count) in pool_and_teams()) {
        prop_assert_eq!(build(&pool, team_count).unwrap(), build(&pool, team_count).unwrap());
    }

    /// Property: refine never raises imbalance and never changes headcounts
    #[test]
    fn prop_refine_never_worsens(
        (pool, team_count) in pool_and_teams(),
        iterations in 0usize..300,
        seed in any::<u64>()
    ) {
        prop_assume!(team_count >= 2);
        let initial = build(&pool, team_count).unwrap();
        let refined = refine(&initial, iterations, &mut SmallRng::seed_from_u64(seed)).unwrap();

        prop_assert!(refined.imbalance() <= initial.imbalance());
        prop_assert_eq!(refined.sizes(), initial.sizes());
        prop_assert!(refined.unassigned(&pool).is_empty());
    }

    /// Property: zero iterations is the identity
    #[test]
    fn prop_refine_zero_iterations((pool, team_count) in pool_and_teams(), seed in any::<u64>()) {
        prop_assume!(team_count >= 2);
        let initial = build(&pool, team_count).unwrap();
        let refined = refine(&initial, 0, &mut SmallRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(refined, initial);
    }

    /// Property: a fixed seed reproduces the same refinement
    #[test]
    fn prop_refine_is_seeded((pool, team_count) in pool_and_teams(), seed in any::<u64>()) {
        prop_assume!(team_count >= 2);
        let initial = build(&pool, team_count).unwrap();
        let a = refine(&initial, 100, &mut SmallRng::seed_from_u64(seed)).unwrap();
        let b = refine(&initial, 100, &mut SmallRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }
}
