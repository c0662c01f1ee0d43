//! Projectiles - independently simulated ranged attacks

use serde::{Deserialize, Serialize};

use super::combat::HitPayload;
use super::physics::{PhysicsSystem, Rect, Stage};
use super::FighterId;

/// Spawn request produced by a fighter when a projectile attack goes active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub owner: FighterId,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub size: f32,
    pub damage: f32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub knockback: f32,
    pub lifetime: u32,
    /// 0.0 for an uncharged throw
    pub charge_level: f32,
}

/// Active projectile in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub owner: FighterId,
    pub rect: Rect,
    pub vel_x: f32,
    pub vel_y: f32,
    pub damage: f32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub knockback: f32,
    pub lifetime_remaining: u32,
    pub charge_level: f32,
}

impl Projectile {
    fn from_launch(id: u32, launch: ProjectileLaunch) -> Self {
        Self {
            id,
            owner: launch.owner,
            rect: Rect::new(launch.x, launch.y, launch.size, launch.size),
            vel_x: launch.vel_x,
            vel_y: launch.vel_y,
            damage: launch.damage,
            hitstun: launch.hitstun,
            blockstun: launch.blockstun,
            knockback: launch.knockback,
            lifetime_remaining: launch.lifetime,
            charge_level: launch.charge_level,
        }
    }

    /// Move one frame, returns false if the lifetime ran out
    pub fn update(&mut self) -> bool {
        self.rect.x += self.vel_x;
        self.rect.y += self.vel_y;
        self.lifetime_remaining = self.lifetime_remaining.saturating_sub(1);
        self.lifetime_remaining > 0
    }

    pub fn payload(&self) -> HitPayload {
        HitPayload {
            damage: self.damage,
            hitstun: self.hitstun,
            blockstun: self.blockstun,
            knockback: self.knockback,
        }
    }
}

/// Why a projectile left the set without hitting anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    Lifetime,
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub id: u32,
    pub owner: FighterId,
    pub reason: ExpiryReason,
}

/// All live projectiles, in spawn order
#[derive(Debug, Clone, Default)]
pub struct ProjectileSet {
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a projectile, returns its id
    pub fn spawn(&mut self, launch: ProjectileLaunch) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.projectiles.push(Projectile::from_launch(id, launch));
        id
    }

    /// Advance every projectile one frame and drop the expired ones
    pub fn update(&mut self, stage: &Stage) -> Vec<Expired> {
        let mut expired = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            let alive = projectile.update();
            let reason = if !alive {
                Some(ExpiryReason::Lifetime)
            } else if PhysicsSystem::outside_world(&projectile.rect, stage) {
                Some(ExpiryReason::OutOfBounds)
            } else {
                None
            };
            match reason {
                Some(reason) => {
                    expired.push(Expired {
                        id: projectile.id,
                        owner: projectile.owner,
                        reason,
                    });
                    false
                }
                None => true,
            }
        });
        expired
    }

    pub fn remove(&mut self, id: u32) -> Option<Projectile> {
        let pos = self.projectiles.iter().position(|p| p.id == id)?;
        Some(self.projectiles.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}
