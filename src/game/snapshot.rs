//! Snapshot building for collaborators outside the simulation

use serde::Serialize;

use super::attack::AttackId;
use super::events::GameEvent;
use super::fighter::{Fighter, FighterState};
use super::physics::Rect;
use super::projectile::{Projectile, ProjectileSet};
use super::r#match::{MatchPhase, MatchState};
use super::FighterId;

/// Public view of one fighter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterSnapshot {
    pub id: FighterId,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub facing: i8,
    pub state: FighterState,
    pub current_attack: Option<AttackId>,
    pub attack_frame: u32,
    pub health: f32,
    pub super_meter: f32,
    pub charge_level: f32,
    pub combo_count: u32,
    /// Live (unconsumed) hitboxes
    pub hitboxes: Vec<Rect>,
    pub hurtbox: Rect,
}

impl From<&Fighter> for FighterSnapshot {
    fn from(f: &Fighter) -> Self {
        Self {
            id: f.id,
            x: f.x,
            y: f.y,
            vel_x: f.vel_x,
            vel_y: f.vel_y,
            facing: f.facing,
            state: f.state,
            current_attack: f.current_attack,
            attack_frame: f.attack_frame,
            health: f.health,
            super_meter: f.super_meter,
            charge_level: f.charge_level,
            combo_count: f.combo_count,
            hitboxes: f
                .hitboxes
                .iter()
                .filter(|h| !h.consumed)
                .map(|h| h.rect)
                .collect(),
            hurtbox: f.hurtbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileSnapshot {
    pub id: u32,
    pub owner: FighterId,
    pub rect: Rect,
    pub vel_x: f32,
    pub lifetime_remaining: u32,
    pub charge_level: f32,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            rect: p.rect,
            vel_x: p.vel_x,
            lifetime_remaining: p.lifetime_remaining,
            charge_level: p.charge_level,
        }
    }
}

/// Phase change that happened during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub from: MatchPhase,
    pub to: MatchPhase,
}

/// Everything one `step` produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame: u64,
    pub fighters: [FighterSnapshot; 2],
    pub projectiles: Vec<ProjectileSnapshot>,
    pub events: Vec<GameEvent>,
    pub transition: Option<PhaseTransition>,
    #[serde(rename = "match")]
    pub match_state: MatchState,
}

impl FrameResult {
    pub fn fighter(&self, id: FighterId) -> &FighterSnapshot {
        &self.fighters[id.index()]
    }

    pub fn phase(&self) -> MatchPhase {
        self.match_state.phase
    }
}

/// Read-only view returned by `Simulation::get_match_state`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub frame: u64,
    pub seconds_remaining: u32,
    pub fighters: [FighterSnapshot; 2],
    pub projectiles: Vec<ProjectileSnapshot>,
    #[serde(rename = "match")]
    pub match_state: MatchState,
}

/// Builds snapshots from simulation state
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn fighters(fighters: &[Fighter; 2]) -> [FighterSnapshot; 2] {
        [
            FighterSnapshot::from(&fighters[0]),
            FighterSnapshot::from(&fighters[1]),
        ]
    }

    pub fn projectiles(projectiles: &ProjectileSet) -> Vec<ProjectileSnapshot> {
        projectiles.iter().map(ProjectileSnapshot::from).collect()
    }

    pub fn frame(
        frame: u64,
        fighters: &[Fighter; 2],
        projectiles: &ProjectileSet,
        events: Vec<GameEvent>,
        phase_before: MatchPhase,
        match_state: &MatchState,
    ) -> FrameResult {
        let transition = (phase_before != match_state.phase).then_some(PhaseTransition {
            from: phase_before,
            to: match_state.phase,
        });
        FrameResult {
            frame,
            fighters: Self::fighters(fighters),
            projectiles: Self::projectiles(projectiles),
            events,
            transition,
            match_state: match_state.clone(),
        }
    }

    pub fn match_snapshot(
        frame: u64,
        fighters: &[Fighter; 2],
        projectiles: &ProjectileSet,
        match_state: &MatchState,
    ) -> MatchSnapshot {
        MatchSnapshot {
            frame,
            seconds_remaining: match_state.seconds_remaining(),
            fighters: Self::fighters(fighters),
            projectiles: Self::projectiles(projectiles),
            match_state: match_state.clone(),
        }
    }
}

/// Decides which frames a publisher forwards: every `interval`-th frame plus
/// any frame carrying events or a phase change
pub struct PublishThrottle {
    frames_since_publish: u32,
    interval: u32,
}

impl PublishThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            frames_since_publish: 0,
            interval: interval.max(1),
        }
    }

    pub fn should_publish(&mut self, result: &FrameResult) -> bool {
        self.frames_since_publish += 1;
        let important = !result.events.is_empty() || result.transition.is_some();
        if important || self.frames_since_publish >= self.interval {
            self.frames_since_publish = 0;
            true
        } else {
            false
        }
    }
}
