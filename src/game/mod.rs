//! Game simulation modules

pub mod attack;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod input;
pub mod r#match;
pub mod motion;
pub mod physics;
pub mod projectile;
pub mod runner;
pub mod simulation;
pub mod snapshot;

use serde::{Deserialize, Serialize};

pub use attack::{AttackId, AttackTable};
pub use fighter::{Fighter, FighterState};
pub use input::{Button, InputSymbol};
pub use r#match::{MatchPhase, MatchRules, MatchState, RoundOutcome};
pub use runner::{GameMatch, MatchHandle, RunnerError};
pub use simulation::Simulation;
pub use snapshot::FrameResult;

/// One of the two fighters in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FighterId {
    #[serde(rename = "p1")]
    One,
    #[serde(rename = "p2")]
    Two,
}

impl FighterId {
    /// Both fighters in resolution order
    pub const BOTH: [FighterId; 2] = [FighterId::One, FighterId::Two];

    pub fn index(self) -> usize {
        match self {
            FighterId::One => 0,
            FighterId::Two => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            FighterId::One => FighterId::Two,
            FighterId::Two => FighterId::One,
        }
    }

    /// Fighter one starts on the left facing right
    pub fn default_facing(self) -> i8 {
        match self {
            FighterId::One => 1,
            FighterId::Two => -1,
        }
    }
}

impl std::fmt::Display for FighterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FighterId::One => write!(f, "p1"),
            FighterId::Two => write!(f, "p2"),
        }
    }
}
