use thiserror::Error;

use crate::action::Index;
use crate::model::entity::Id;

pub type Result<T> = std::result::Result<T, BalanceError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BalanceError {
    #[error("team count must be positive, got {0}")]
    InvalidTeamCount(usize),

    #[error("not enough players: {players} players for {teams} teams")]
    NotEnoughPlayers { players: usize, teams: usize },

    #[error("swapping needs at least two teams, got {0}")]
    TooFewTeams(usize),

    #[error("team {0} is empty")]
    EmptyTeam(Index),

    #[error("invalid player '{id}': {reason}")]
    InvalidPlayer { id: Id, reason: String },

    #[error("player '{0}' appears more than once")]
    DuplicatePlayer(Id),

    #[error("invalid position")]
    InvalidPosition,
}

impl BalanceError {
    /// Every variant is a caller input problem; none is retried.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            BalanceError::InvalidTeamCount(_)
            | BalanceError::NotEnoughPlayers { .. }
            | BalanceError::TooFewTeams(_)
            | BalanceError::EmptyTeam(_)
            | BalanceError::InvalidPlayer { .. }
            | BalanceError::DuplicatePlayer(_)
            | BalanceError::InvalidPosition => true,
        }
    }
}
