//! Match rules, round/match state and outcome evaluation

use serde::{Deserialize, Serialize};

use crate::util::time::{frames_from_secs, secs_from_frames};

use super::FighterId;

/// Frames of "get ready" before a round's fight starts
pub const ROUND_START_FRAMES: u32 = 120;
/// Frames the round result stays up before the next round
pub const ROUND_END_FRAMES: u32 = 180;
pub const DEFAULT_ROUND_SECONDS: u32 = 99;
pub const DEFAULT_TOTAL_ROUNDS: u32 = 3;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Fighters reset, countdown running
    RoundStart,
    /// Full per-frame pipeline running
    Fighting,
    /// Round decided, result pause
    RoundEnd,
    /// Match decided, simulation frozen
    MatchOver,
}

/// Tunable match rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    pub total_rounds: u32,
    /// Round timer in frames
    pub round_frames: u32,
    pub countdown_frames: u32,
    pub round_end_frames: u32,
}

impl MatchRules {
    pub fn new(total_rounds: u32, round_seconds: u32) -> Self {
        Self {
            total_rounds: total_rounds.max(1),
            round_frames: frames_from_secs(round_seconds),
            ..Self::default()
        }
    }

    /// Round wins needed to take the match: ceil((total_rounds + 1) / 2)
    pub fn wins_needed(&self) -> u32 {
        self.total_rounds / 2 + 1
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            round_frames: frames_from_secs(DEFAULT_ROUND_SECONDS),
            countdown_frames: ROUND_START_FRAMES,
            round_end_frames: ROUND_END_FRAMES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    KnockOut,
    DoubleKnockOut,
    TimeUp,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RoundOutcome {
    Winner {
        fighter: FighterId,
        reason: RoundEndReason,
    },
    /// No round awarded
    Draw { reason: RoundEndReason },
}

impl RoundOutcome {
    pub fn winner(&self) -> Option<FighterId> {
        match self {
            RoundOutcome::Winner { fighter, .. } => Some(*fighter),
            RoundOutcome::Draw { .. } => None,
        }
    }

    pub fn reason(&self) -> RoundEndReason {
        match self {
            RoundOutcome::Winner { reason, .. } | RoundOutcome::Draw { reason } => *reason,
        }
    }

    /// Knockout check after hit resolution. `None` while both are standing;
    /// a simultaneous knockout is a draw.
    pub fn from_knockouts(knocked_out: [bool; 2]) -> Option<Self> {
        match knocked_out {
            [false, false] => None,
            [true, true] => Some(RoundOutcome::Draw {
                reason: RoundEndReason::DoubleKnockOut,
            }),
            [false, true] => Some(RoundOutcome::Winner {
                fighter: FighterId::One,
                reason: RoundEndReason::KnockOut,
            }),
            [true, false] => Some(RoundOutcome::Winner {
                fighter: FighterId::Two,
                reason: RoundEndReason::KnockOut,
            }),
        }
    }

    /// Timer expiry: higher remaining health wins, exact tie is a draw
    pub fn from_time_up(health: [f32; 2]) -> Self {
        let reason = RoundEndReason::TimeUp;
        if health[0] > health[1] {
            RoundOutcome::Winner {
                fighter: FighterId::One,
                reason,
            }
        } else if health[1] > health[0] {
            RoundOutcome::Winner {
                fighter: FighterId::Two,
                reason,
            }
        } else {
            RoundOutcome::Draw { reason }
        }
    }
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner { fighter: FighterId },
    Draw,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<FighterId> {
        match self {
            MatchOutcome::Winner { fighter } => Some(*fighter),
            MatchOutcome::Draw => None,
        }
    }
}

/// What the round-end pause produced this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEndStep {
    Waiting,
    NextRound { round: u32 },
    MatchOver(MatchOutcome),
}

/// Round and match counters, owned by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    /// 1-based round number
    pub round: u32,
    pub rounds_played: u32,
    /// Round wins per fighter, indexed by `FighterId::index`
    pub wins: [u32; 2],
    /// Frames left on the round timer
    pub round_timer: u32,
    /// Frames left in the current countdown or result pause
    pub phase_timer: u32,
    pub last_round: Option<RoundOutcome>,
    pub outcome: Option<MatchOutcome>,
}

impl MatchState {
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            phase: MatchPhase::RoundStart,
            round: 1,
            rounds_played: 0,
            wins: [0; 2],
            round_timer: rules.round_frames,
            phase_timer: rules.countdown_frames,
            last_round: None,
            outcome: None,
        }
    }

    /// Whole seconds left on the round clock, as shown on a HUD
    pub fn seconds_remaining(&self) -> u32 {
        secs_from_frames(self.round_timer)
    }

    pub fn wins_for(&self, fighter: FighterId) -> u32 {
        self.wins[fighter.index()]
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::MatchOver
    }

    /// Count down the round-start countdown; true on the frame the fight starts
    pub fn tick_countdown(&mut self) -> bool {
        if self.phase != MatchPhase::RoundStart {
            return false;
        }
        self.phase_timer = self.phase_timer.saturating_sub(1);
        if self.phase_timer == 0 {
            self.phase = MatchPhase::Fighting;
            return true;
        }
        false
    }

    /// Count down the round timer; true on the frame it runs out
    pub fn tick_round_timer(&mut self) -> bool {
        if self.phase != MatchPhase::Fighting || self.round_timer == 0 {
            return false;
        }
        self.round_timer -= 1;
        self.round_timer == 0
    }

    /// Record a decided round and start the result pause
    pub fn end_round(&mut self, outcome: RoundOutcome, rules: &MatchRules) {
        if let Some(winner) = outcome.winner() {
            self.wins[winner.index()] += 1;
        }
        self.rounds_played += 1;
        self.last_round = Some(outcome);
        self.phase = MatchPhase::RoundEnd;
        self.phase_timer = rules.round_end_frames;
    }

    /// The match result if the match is decided.
    ///
    /// A fighter reaching the required wins takes it. Once `total_rounds`
    /// rounds have been played without that (drawn rounds), more wins takes
    /// the match and equal wins is a drawn match.
    pub fn decide(&self, rules: &MatchRules) -> Option<MatchOutcome> {
        let needed = rules.wins_needed();
        for fighter in FighterId::BOTH {
            if self.wins_for(fighter) >= needed {
                return Some(MatchOutcome::Winner { fighter });
            }
        }
        if self.rounds_played < rules.total_rounds {
            return None;
        }
        let [one, two] = self.wins;
        Some(match one.cmp(&two) {
            std::cmp::Ordering::Greater => MatchOutcome::Winner {
                fighter: FighterId::One,
            },
            std::cmp::Ordering::Less => MatchOutcome::Winner {
                fighter: FighterId::Two,
            },
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        })
    }

    /// Count down the result pause; at zero either the match ends or the next
    /// round begins (the caller resets the fighters)
    pub fn tick_round_end(&mut self, rules: &MatchRules) -> RoundEndStep {
        if self.phase != MatchPhase::RoundEnd {
            return RoundEndStep::Waiting;
        }
        self.phase_timer = self.phase_timer.saturating_sub(1);
        if self.phase_timer > 0 {
            return RoundEndStep::Waiting;
        }

        if let Some(outcome) = self.decide(rules) {
            self.phase = MatchPhase::MatchOver;
            self.outcome = Some(outcome);
            return RoundEndStep::MatchOver(outcome);
        }

        self.round += 1;
        self.phase = MatchPhase::RoundStart;
        self.phase_timer = rules.countdown_frames;
        self.round_timer = rules.round_frames;
        RoundEndStep::NextRound { round: self.round }
    }
}
