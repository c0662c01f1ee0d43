//! Async fixed-rate driver around a `Simulation`
//!
//! The match task owns the simulation. Collaborators talk to it through a
//! `MatchHandle`: inputs go in over an mpsc queue and are handed to
//! `Simulation::submit_input`, frame results come out over a broadcast channel.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::util::time::{tick_duration, Timer, SIMULATION_TPS};

use super::input::InputSymbol;
use super::r#match::MatchOutcome;
use super::simulation::{InputBatch, Simulation};
use super::snapshot::{FrameResult, PublishThrottle};
use super::FighterId;

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("match {0} is no longer running")]
    Stopped(Uuid),

    #[error("input queue for match {0} is full")]
    QueueFull(Uuid),
}

/// Messages accepted by a running match
#[derive(Debug, Clone)]
pub enum MatchCommand {
    /// One input sample; `frame: None` means the next frame
    Input {
        fighter: FighterId,
        symbol: InputSymbol,
        frame: Option<u64>,
    },
    Stop,
}

/// Anything that decides a fighter's input from the last published frame:
/// a local pad adapter, a bot. Sees the same data any client would.
pub trait Controller: Send {
    fn sample(&mut self, fighter: FighterId, last: Option<&FrameResult>) -> Vec<InputSymbol>;
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub tps: u32,
    /// Pace frames with a timer instead of stepping back to back
    pub realtime: bool,
    /// Publish every n-th frame, plus every frame with events
    pub publish_interval: u32,
    /// Hard stop, in frames
    pub max_frames: Option<u64>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tps: SIMULATION_TPS,
            realtime: false,
            publish_interval: 1,
            max_frames: None,
        }
    }
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    input_tx: mpsc::Sender<MatchCommand>,
    frame_tx: broadcast::Sender<FrameResult>,
}

impl MatchHandle {
    /// Queue an input sample for the next frame
    pub fn submit(&self, fighter: FighterId, symbol: InputSymbol) -> Result<(), RunnerError> {
        self.send(MatchCommand::Input {
            fighter,
            symbol,
            frame: None,
        })
    }

    /// Queue an input sample for a specific frame
    pub fn submit_at(&self, fighter: FighterId, symbol: InputSymbol, frame: u64) -> Result<(), RunnerError> {
        self.send(MatchCommand::Input {
            fighter,
            symbol,
            frame: Some(frame),
        })
    }

    pub fn stop(&self) -> Result<(), RunnerError> {
        self.send(MatchCommand::Stop)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameResult> {
        self.frame_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.input_tx.is_closed()
    }

    fn send(&self, command: MatchCommand) -> Result<(), RunnerError> {
        self.input_tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => RunnerError::QueueFull(self.id),
            mpsc::error::TrySendError::Closed(_) => RunnerError::Stopped(self.id),
        })
    }
}

/// How a match run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub frames: u64,
    pub outcome: Option<MatchOutcome>,
    pub wins: [u32; 2],
    pub rounds_played: u32,
    /// Stopped before the match was decided
    pub interrupted: bool,
}

/// The authoritative match task
pub struct GameMatch {
    id: Uuid,
    sim: Simulation,
    options: RunnerOptions,
    input_rx: mpsc::Receiver<MatchCommand>,
    frame_tx: broadcast::Sender<FrameResult>,
    controllers: Vec<(FighterId, Box<dyn Controller>)>,
    last_frame: Option<FrameResult>,
    stop_requested: bool,
}

impl GameMatch {
    /// Create a new match
    pub fn new(id: Uuid, sim: Simulation, options: RunnerOptions) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (frame_tx, _) = broadcast::channel(1024);

        let handle = MatchHandle {
            id,
            input_tx,
            frame_tx: frame_tx.clone(),
        };

        let game_match = Self {
            id,
            sim,
            options,
            input_rx,
            frame_tx,
            controllers: Vec::new(),
            last_frame: None,
            stop_requested: false,
        };

        (game_match, handle)
    }

    /// Attach a controller that samples input for `fighter` every frame
    pub fn with_controller(mut self, fighter: FighterId, controller: Box<dyn Controller>) -> Self {
        self.controllers.push((fighter, controller));
        self
    }

    /// Run the fixed-step loop until the match is decided or stopped
    pub async fn run(mut self) -> MatchSummary {
        info!(match_id = %self.id, realtime = self.options.realtime, "Match started");

        let mut ticker = self.options.realtime.then(|| {
            let mut ticker = interval(tick_duration(self.options.tps));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        let mut throttle = PublishThrottle::new(self.options.publish_interval);
        let mut slowest = Duration::ZERO;

        loop {
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                None => tokio::task::yield_now().await,
            }

            self.process_inputs();
            if self.stop_requested {
                info!(match_id = %self.id, frame = self.sim.frame(), "Match stopped");
                break;
            }
            self.sample_controllers();

            let timer = Timer::new();
            let result = self.sim.step(InputBatch::new());
            slowest = slowest.max(Duration::from_micros(timer.elapsed_micros()));

            if throttle.should_publish(&result) {
                // No subscribers is fine
                let _ = self.frame_tx.send(result.clone());
            }
            self.last_frame = Some(result);

            if self.sim.is_over() {
                info!(match_id = %self.id, frame = self.sim.frame(), "Match ended");
                break;
            }
            if self.options.max_frames.is_some_and(|max| self.sim.frame() >= max) {
                warn!(match_id = %self.id, frame = self.sim.frame(), "Frame limit reached, ending match");
                break;
            }
        }

        info!(match_id = %self.id, slowest_step_us = slowest.as_micros() as u64, "Runner finished");
        self.summary()
    }

    /// Drain the command queue into the simulation's input queue
    fn process_inputs(&mut self) {
        let next = self.sim.frame() + 1;
        while let Ok(command) = self.input_rx.try_recv() {
            match command {
                MatchCommand::Input {
                    fighter,
                    symbol,
                    frame,
                } => self.sim.submit_input(fighter, symbol, frame.unwrap_or(next)),
                MatchCommand::Stop => self.stop_requested = true,
            }
        }
    }

    fn sample_controllers(&mut self) {
        let next = self.sim.frame() + 1;
        for (fighter, controller) in &mut self.controllers {
            for symbol in controller.sample(*fighter, self.last_frame.as_ref()) {
                self.sim.submit_input(*fighter, symbol, next);
            }
        }
    }

    fn summary(&self) -> MatchSummary {
        let state = self.sim.get_match_state().match_state;
        MatchSummary {
            match_id: self.id,
            frames: self.sim.frame(),
            outcome: state.outcome,
            wins: state.wins,
            rounds_played: state.rounds_played,
            interrupted: state.outcome.is_none(),
        }
    }
}
