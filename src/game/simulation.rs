//! The simulation aggregate: one fixed step advances every component once
//!
//! Per fighting frame: inputs recorded, motions recognized, both fighters
//! advanced against the opponent's start-of-frame position, projectiles
//! moved, hits resolved against the frame's final boxes, then knockouts and
//! the round timer checked.

use tracing::{debug, info};

use crate::util::time::Clock;

use super::attack::AttackTable;
use super::combat::CombatSystem;
use super::events::GameEvent;
use super::fighter::{Fighter, FighterFrame, FrameContext};
use super::input::{HeldInput, InputEvent, InputSymbol};
use super::motion::MotionRecognizer;
use super::physics::{FighterStats, PhysicsSystem, Stage};
use super::projectile::ProjectileSet;
use super::r#match::{MatchPhase, MatchRules, MatchState, RoundEndStep, RoundOutcome};
use super::snapshot::{FrameResult, MatchSnapshot, SnapshotBuilder};
use super::FighterId;

/// Input samples for one frame, per fighter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBatch {
    symbols: [Vec<InputSymbol>; 2],
}

impl InputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `push`
    pub fn with(mut self, fighter: FighterId, symbol: impl Into<InputSymbol>) -> Self {
        self.push(fighter, symbol.into());
        self
    }

    pub fn push(&mut self, fighter: FighterId, symbol: InputSymbol) {
        self.symbols[fighter.index()].push(symbol);
    }

    pub fn symbols(&self, fighter: FighterId) -> &[InputSymbol] {
        &self.symbols[fighter.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.iter().all(Vec::is_empty)
    }

    fn held(&self, fighter: FighterId) -> HeldInput {
        HeldInput::from_symbols(self.symbols(fighter).iter().copied())
    }
}

/// Owns every piece of mutable game state. Nothing outside `step` mutates it
/// except `submit_input`, which only queues.
pub struct Simulation {
    clock: Clock,
    fighters: [Fighter; 2],
    projectiles: ProjectileSet,
    table: AttackTable,
    recognizer: MotionRecognizer,
    stage: Stage,
    rules: MatchRules,
    state: MatchState,
    queued: Vec<(FighterId, InputEvent)>,
    /// Events raised outside a step, delivered with the next frame
    carried_events: Vec<GameEvent>,
}

impl Simulation {
    /// Standard roster, stage and frame data
    pub fn new(rules: MatchRules) -> Self {
        Self::with_parts(
            rules,
            Stage::default(),
            [FighterStats::default(); 2],
            AttackTable::standard(),
            MotionRecognizer::standard(),
        )
    }

    pub fn with_parts(
        rules: MatchRules,
        stage: Stage,
        stats: [FighterStats; 2],
        table: AttackTable,
        recognizer: MotionRecognizer,
    ) -> Self {
        let fighters = FighterId::BOTH.map(|id| {
            Fighter::new(id, stats[id.index()], stage.spawn_x[id.index()], &stage)
        });
        let state = MatchState::new(&rules);
        info!(round = state.round, total_rounds = rules.total_rounds, "Round started");

        Self {
            clock: Clock::new(),
            fighters,
            projectiles: ProjectileSet::new(),
            table,
            recognizer,
            stage,
            rules,
            state,
            queued: Vec::new(),
            carried_events: vec![GameEvent::RoundStarted { round: 1 }],
        }
    }

    /// Last completed frame (0 before the first step)
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    pub fn fighter(&self, id: FighterId) -> &Fighter {
        &self.fighters[id.index()]
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn projectiles(&self) -> &ProjectileSet {
        &self.projectiles
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Queue one input sample for `fighter`, consumed at the start of the
    /// first step whose frame is at or past `frame`
    pub fn submit_input(&mut self, fighter: FighterId, symbol: InputSymbol, frame: u64) {
        self.queued.push((fighter, InputEvent { frame, symbol }));
    }

    /// Number of queued samples not yet consumed
    pub fn queued_inputs(&self) -> usize {
        self.queued.len()
    }

    /// Read-only snapshot for UI collaborators
    pub fn get_match_state(&self) -> MatchSnapshot {
        SnapshotBuilder::match_snapshot(self.frame(), &self.fighters, &self.projectiles, &self.state)
    }

    /// Advance exactly one frame. `batch` holds this frame's samples on top of
    /// anything queued through `submit_input`.
    pub fn step(&mut self, batch: InputBatch) -> FrameResult {
        let frame = self.clock.tick();
        let mut events = std::mem::take(&mut self.carried_events);
        let batch = self.drain_queued(frame, batch);
        let phase_before = self.state.phase;

        match self.state.phase {
            MatchPhase::RoundStart => {
                self.advance_without_input(frame);
                if self.state.tick_countdown() {
                    info!(round = self.state.round, frame, "Fight");
                    events.push(GameEvent::FightStarted {
                        round: self.state.round,
                    });
                }
            }
            MatchPhase::Fighting => self.fighting_frame(frame, &batch, &mut events),
            MatchPhase::RoundEnd => {
                self.advance_without_input(frame);
                self.projectiles.clear();
                self.round_end_frame(&mut events);
            }
            MatchPhase::MatchOver => self.advance_without_input(frame),
        }

        SnapshotBuilder::frame(
            frame,
            &self.fighters,
            &self.projectiles,
            events,
            phase_before,
            &self.state,
        )
    }

    /// Merge queued samples due this frame into the batch, keep the rest
    fn drain_queued(&mut self, frame: u64, mut batch: InputBatch) -> InputBatch {
        let (due, later): (Vec<_>, Vec<_>) = self
            .queued
            .drain(..)
            .partition(|(_, event)| event.frame <= frame);
        self.queued = later;
        for (fighter, event) in due {
            batch.push(fighter, event.symbol);
        }
        batch
    }

    fn fighting_frame(&mut self, frame: u64, batch: &InputBatch, events: &mut Vec<GameEvent>) {
        for id in FighterId::BOTH {
            let buffer = &mut self.fighters[id.index()].input_buffer;
            for symbol in batch.symbols(id) {
                buffer.record(*symbol, frame);
            }
        }

        let start_x = [self.fighters[0].x, self.fighters[1].x];
        let specials = FighterId::BOTH.map(|id| {
            let fighter = &self.fighters[id.index()];
            let facing = PhysicsSystem::facing_toward(
                fighter.x,
                start_x[id.opponent().index()],
                fighter.facing,
            );
            self.recognizer.recognize(&fighter.input_buffer, facing)
        });

        let ctx = FrameContext {
            frame,
            table: &self.table,
            stage: &self.stage,
        };
        let outputs: [FighterFrame; 2] = FighterId::BOTH.map(|id| {
            self.fighters[id.index()].advance(
                &ctx,
                &batch.held(id),
                specials[id.index()],
                start_x[id.opponent().index()],
            )
        });

        let mut launches = Vec::new();
        for (id, out) in FighterId::BOTH.into_iter().zip(outputs) {
            if let Some(attack) = out.attack_started {
                if out.special_performed {
                    self.fighters[id.index()].input_buffer.clear();
                    debug!(fighter = %id, ?attack, frame, "Special move");
                    events.push(GameEvent::SpecialMove { fighter: id, attack });
                }
                events.push(GameEvent::AttackStarted { fighter: id, attack });
            }
            launches.extend(out.projectile);
        }

        for expired in self.projectiles.update(&self.stage) {
            events.push(GameEvent::from(expired));
        }
        for launch in launches {
            let id = self.projectiles.spawn(launch);
            if let Some(projectile) = self.projectiles.iter().find(|p| p.id == id) {
                debug!(owner = %projectile.owner, projectile_id = id, charge = projectile.charge_level, "Projectile spawned");
                events.push(GameEvent::projectile_spawned(projectile));
            }
        }

        let hits = CombatSystem::resolve(&mut self.fighters, &mut self.projectiles);
        events.extend(hits.iter().map(GameEvent::from));

        let knocked_out = [self.fighters[0].is_knocked_out(), self.fighters[1].is_knocked_out()];
        if let Some(outcome) = RoundOutcome::from_knockouts(knocked_out) {
            for id in FighterId::BOTH {
                if knocked_out[id.index()] {
                    debug!(fighter = %id, frame, "Knock out");
                    events.push(GameEvent::KnockOut { fighter: id });
                }
            }
            if let Some(winner) = outcome.winner() {
                self.fighters[winner.index()].declare_victory();
            }
            self.finish_round(outcome, events);
            return;
        }

        if self.state.tick_round_timer() {
            let health = [self.fighters[0].health, self.fighters[1].health];
            self.finish_round(RoundOutcome::from_time_up(health), events);
        }
    }

    fn finish_round(&mut self, outcome: RoundOutcome, events: &mut Vec<GameEvent>) {
        self.state.end_round(outcome, &self.rules);
        info!(
            round = self.state.round,
            winner = ?outcome.winner(),
            reason = ?outcome.reason(),
            wins = ?self.state.wins,
            "Round ended"
        );
        events.push(GameEvent::RoundEnded {
            round: self.state.round,
            outcome,
            wins: self.state.wins,
        });
    }

    fn round_end_frame(&mut self, events: &mut Vec<GameEvent>) {
        match self.state.tick_round_end(&self.rules) {
            RoundEndStep::Waiting => {}
            RoundEndStep::NextRound { round } => {
                self.reset_fighters();
                info!(round, "Round started");
                events.push(GameEvent::RoundStarted { round });
            }
            RoundEndStep::MatchOver(outcome) => {
                info!(winner = ?outcome.winner(), wins = ?self.state.wins, "Match over");
                events.push(GameEvent::MatchOver { outcome });
            }
        }
    }

    /// Countdown, result pause and match over: bodies settle, inputs are dropped
    fn advance_without_input(&mut self, frame: u64) {
        let ctx = FrameContext {
            frame,
            table: &self.table,
            stage: &self.stage,
        };
        let start_x = [self.fighters[0].x, self.fighters[1].x];
        let idle = HeldInput::default();
        for id in FighterId::BOTH {
            self.fighters[id.index()].advance(&ctx, &idle, None, start_x[id.opponent().index()]);
        }
    }

    fn reset_fighters(&mut self) {
        for fighter in &mut self.fighters {
            let spawn_x = self.stage.spawn_x[fighter.id.index()];
            fighter.reset(spawn_x, &self.stage);
        }
        self.projectiles.clear();
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(MatchRules::default())
    }
}
