//! Fighter physics, stage bounds and box geometry

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the top-left corner (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict AABB overlap; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Body and movement constants for a fighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FighterStats {
    /// Horizontal walk speed (px/frame)
    pub walk_speed: f32,
    /// Initial vertical velocity of a jump (negative is up)
    pub jump_power: f32,
    /// Downward acceleration while airborne (px/frame²)
    pub gravity: f32,
    /// Horizontal velocity multiplier applied each grounded frame when not walking
    pub friction: f32,
    /// Body width
    pub width: f32,
    /// Standing body height
    pub height: f32,
    /// Body height while crouched (blocking, charging)
    pub crouch_height: f32,
    pub max_health: f32,
    pub max_super: f32,
}

impl Default for FighterStats {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            jump_power: -15.0,
            gravity: 0.8,
            friction: 0.8,
            width: 60.0,
            height: 120.0,
            crouch_height: 80.0,
            max_health: 100.0,
            max_super: 100.0,
        }
    }
}

/// Stage geometry. Fighters are clamped to `[left_bound, right_bound]`;
/// projectiles live until they leave `[world_min_x, world_max_x]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub ground_y: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    pub world_min_x: f32,
    pub world_max_x: f32,
    /// Spawn x for fighter one and fighter two
    pub spawn_x: [f32; 2],
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            ground_y: 500.0,
            left_bound: 50.0,
            right_bound: 1150.0,
            world_min_x: 0.0,
            world_max_x: 1200.0,
            spawn_x: [200.0, 1000.0],
        }
    }
}

/// Result of integrating one frame of body motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyStep {
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub grounded: bool,
    /// True on the frame the body touched the ground after being airborne
    pub landed: bool,
}

/// Physics system for integrating fighter bodies
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Integrate one frame: gravity while airborne, optional ground friction,
    /// position update, ground snap and stage clamp.
    #[allow(clippy::too_many_arguments)]
    pub fn step_body(
        x: f32,
        y: f32,
        vel_x: f32,
        vel_y: f32,
        grounded: bool,
        apply_friction: bool,
        stats: &FighterStats,
        stage: &Stage,
    ) -> BodyStep {
        let mut vel_x = vel_x;
        let mut vel_y = vel_y;

        if !grounded {
            vel_y += stats.gravity;
        } else if apply_friction {
            vel_x *= stats.friction;
            if vel_x.abs() < 0.01 {
                vel_x = 0.0;
            }
        }

        let new_x = x + vel_x;
        let mut new_y = y + vel_y;
        let mut now_grounded = grounded;
        let mut landed = false;

        if new_y >= stage.ground_y {
            new_y = stage.ground_y;
            vel_y = 0.0;
            landed = !grounded;
            now_grounded = true;
        } else {
            now_grounded = now_grounded && vel_y == 0.0;
        }

        BodyStep {
            x: Self::clamp_to_stage(new_x, stage),
            y: new_y,
            vel_x,
            vel_y,
            grounded: now_grounded,
            landed,
        }
    }

    /// Out-of-range positions are clamped, never treated as errors
    pub fn clamp_to_stage(x: f32, stage: &Stage) -> f32 {
        x.clamp(stage.left_bound, stage.right_bound)
    }

    /// Whether a rectangle has left the projectile world bounds
    pub fn outside_world(rect: &Rect, stage: &Stage) -> bool {
        rect.x < stage.world_min_x || rect.x > stage.world_max_x
    }

    /// Facing toward the opponent; keeps the previous facing when stacked
    pub fn facing_toward(self_x: f32, opponent_x: f32, previous: i8) -> i8 {
        let dx = opponent_x - self_x;
        if dx > 0.0 {
            1
        } else if dx < 0.0 {
            -1
        } else {
            previous
        }
    }
}
