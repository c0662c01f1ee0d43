//! Time utilities for the fixed-step simulation
//!
//! Every simulation timer is counted in frames. Wall time only exists at the
//! edges: the async runner paces itself with it and the host measures how long
//! a step took.

use std::time::{Duration, Instant};

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // 60 frames per second

/// Convert whole seconds into frames at the simulation rate
pub const fn frames_from_secs(secs: u32) -> u32 {
    secs.saturating_mul(SIMULATION_TPS)
}

/// Whole seconds remaining for a frame count, rounded up (what a HUD shows)
pub const fn secs_from_frames(frames: u32) -> u32 {
    frames.div_ceil(SIMULATION_TPS)
}

/// Tick duration for a host running at `tps` frames per second
pub fn tick_duration(tps: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(tps.max(1)))
}

/// Monotonic frame counter. Advanced exactly once per simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self { frame: 0 }
    }

    /// Current frame number (0 before the first step)
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one frame and return the new frame number
    pub fn tick(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
