pub mod entity {
    use std::collections::HashSet;

    use serde::{Deserialize, Serialize};

    use crate::error::{BalanceError, Result};

    pub type Id = String;
    pub type Rating = f64;

    /// A rated player. The rating is an overall skill score computed upstream.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Player {
        pub id: Id,
        pub rating: Rating,
    }

    impl Player {
        pub fn new(id: impl Into<Id>, rating: Rating) -> Player {
            Player { id: id.into(), rating }
        }

        fn validate(&self) -> Result<()> {
            if self.id.is_empty() {
                return Err(BalanceError::InvalidPlayer {
                    id: self.id.clone(),
                    reason: "empty id".to_string(),
                });
            }
            if !self.rating.is_finite() || self.rating < 0.0 {
                return Err(BalanceError::InvalidPlayer {
                    id: self.id.clone(),
                    reason: format!("rating {} is not a non-negative number", self.rating),
                });
            }
            Ok(())
        }
    }

    /// Checks every record and rejects repeated ids.
    pub fn validate_pool(players: &[Player]) -> Result<()> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in players {
            player.validate()?;
            if !seen.insert(player.id.as_str()) {
                return Err(BalanceError::DuplicatePlayer(player.id.clone()));
            }
        }
        Ok(())
    }

    /// Descending by rating. Equal ratings keep their input order.
    pub fn rank_by_rating(players: &[Player]) -> Vec<Player> {
        let mut ranked = players.to_vec();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        ranked
    }
}


pub mod group {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use itertools::{Itertools, MinMaxResult};
    use serde::ser::SerializeStruct;
    use serde::{Deserialize, Serialize, Serializer};

    use super::entity::{Player, Rating};
    use crate::action::{Action, Index, Position};
    use crate::error::{BalanceError, Result};

    /// One team of a partition. The average rating is always derived from the
    /// current members.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct Team {
        #[serde(default)]
        pub id: Index,
        players: Vec<Player>,
    }

    impl Team {
        pub fn new(id: Index) -> Team {
            Team { id, players: Vec::new() }
        }

        pub fn with_players(id: Index, players: Vec<Player>) -> Team {
            Team { id, players }
        }

        pub fn players(&self) -> &[Player] {
            &self.players
        }

        pub fn len(&self) -> usize {
            self.players.len()
        }

        pub fn is_empty(&self) -> bool {
            self.players.is_empty()
        }

        pub fn contains(&self, id: &str) -> bool {
            self.players.iter().any(|player| player.id == id)
        }

        pub fn total_rating(&self) -> Rating {
            self.players.iter().map(|player| player.rating).sum()
        }

        /// Zero for an empty team.
        pub fn average_rating(&self) -> Rating {
            if self.players.is_empty() {
                0.0
            } else {
                self.total_rating() / self.players.len() as Rating
            }
        }
    }

    impl Serialize for Team {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Team", 3)?;
            state.serialize_field("id", &self.id)?;
            state.serialize_field("players", &self.players)?;
            state.serialize_field("averageRating", &self.average_rating())?;
            state.end()
        }
    }

    /// Max minus min of the per-team rating sums.
    pub fn imbalance(teams: &[Team]) -> Rating {
        match teams.iter().map(Team::total_rating).minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0.0,
            MinMaxResult::MinMax(min, max) => max - min,
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Partition {
        teams: Vec<Team>,
    }

    impl Partition {
        /// `team_count` empty teams with ids `0..team_count`.
        pub fn empty(team_count: usize) -> Partition {
            Partition { teams: (0..team_count).map(Team::new).collect() }
        }

        pub fn new(teams: Vec<Team>) -> Partition {
            Partition { teams }
        }

        pub fn teams(&self) -> &[Team] {
            &self.teams
        }

        pub fn team(&self, index: Index) -> Option<&Team> {
            self.teams.get(index)
        }

        pub fn len(&self) -> usize {
            self.teams.len()
        }

        pub fn is_empty(&self) -> bool {
            self.teams.is_empty()
        }

        pub fn sizes(&self) -> Vec<usize> {
            self.teams.iter().map(Team::len).collect()
        }

        pub fn player_count(&self) -> usize {
            self.teams.iter().map(Team::len).sum()
        }

        pub fn imbalance(&self) -> Rating {
            imbalance(&self.teams)
        }

        /// Players of `pool` that no team holds. Empty for a complete partition.
        pub fn unassigned(&self, pool: &[Player]) -> Vec<Player> {
            let assigned: HashSet<&str> = self.teams
                .iter()
                .flat_map(|team| team.players.iter().map(|player| player.id.as_str()))
                .collect();
            pool.iter()
                .filter(|player| !assigned.contains(player.id.as_str()))
                .cloned()
                .collect()
        }

        pub fn get_player(&self, position: &Position) -> Option<&Player> {
            self.teams.get(position.team_index)?.players.get(position.player_index)
        }

        pub fn act(&mut self, action: Action) -> Result<()> {
            match action {
                Action::Add { player, team_index } => {
                    let team = self.teams.get_mut(team_index).ok_or(BalanceError::InvalidPosition)?;
                    team.players.push(player);
                    Ok(())
                }
                Action::Swap(first, second) => {
                    let a = self.get_player(&first).ok_or(BalanceError::InvalidPosition)?.clone();
                    let b = self.get_player(&second).ok_or(BalanceError::InvalidPosition)?.clone();
                    self.teams[first.team_index].players[first.player_index] = b;
                    self.teams[second.team_index].players[second.player_index] = a;
                    Ok(())
                }
            }
        }
    }

    /// A past week: its date and the teams that played.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct WeekSnapshot {
        pub date: NaiveDate,
        pub teams: Vec<Team>,
    }
}

pub mod condition {
    use std::collections::HashMap;
    use std::fmt;

    use chrono::{Datelike, NaiveDate};
    use serde::{Deserialize, Serialize};

    use super::entity::Id;

    /// Unordered pair of player ids, stored sorted.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct PairKey(Id, Id);

    impl PairKey {
        pub fn new(a: &str, b: &str) -> PairKey {
            if a <= b {
                PairKey(a.to_string(), b.to_string())
            } else {
                PairKey(b.to_string(), a.to_string())
            }
        }
    }

    impl fmt::Display for PairKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}|{}", self.0, self.1)
        }
    }

    /// Calendar year and month.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct MonthKey {
        pub year: i32,
        pub month: u32,
    }

    impl MonthKey {
        /// `None` when `month` is outside `1..=12`.
        pub fn new(year: i32, month: u32) -> Option<MonthKey> {
            NaiveDate::from_ymd_opt(year, month, 1).map(MonthKey::from)
        }
    }

    impl From<NaiveDate> for MonthKey {
        fn from(date: NaiveDate) -> Self {
            MonthKey { year: date.year(), month: date.month() }
        }
    }

    impl fmt::Display for MonthKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:04}-{:02}", self.year, self.month)
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct PairCounts(HashMap<PairKey, u32>);

    impl PairCounts {
        pub fn get_pair(&self, key: &PairKey) -> u32 {
            self.0.get(key).copied().unwrap_or(0)
        }

        pub fn increment(&mut self, key: PairKey) {
            *self.0.entry(key).or_insert(0) += 1;
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }
}
