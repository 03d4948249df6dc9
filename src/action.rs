use crate::model::entity::Player;

pub type Index = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub team_index: Index,
    pub player_index: Index,
}

/// A change applied to a partition through `Partition::act`.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add { player: Player, team_index: Index },
    Swap(Position, Position),
}
