//! Combat system - hitboxes, hit detection and hit application

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::fighter::{Fighter, HitOutcome};
use super::physics::Rect;
use super::projectile::ProjectileSet;
use super::FighterId;

/// Super meter awarded to the attacker on every successful hit
pub const METER_GAIN_ON_HIT: f32 = 10.0;

/// Active damaging area of a swing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub owner: FighterId,
    pub rect: Rect,
    pub damage: f32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub knockback: f32,
    /// Set once this swing has connected; the swing cannot hit again
    pub consumed: bool,
}

/// Damage payload shared by strikes and projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPayload {
    pub damage: f32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub knockback: f32,
}

impl From<&Hitbox> for HitPayload {
    fn from(hitbox: &Hitbox) -> Self {
        Self {
            damage: hitbox.damage,
            hitstun: hitbox.hitstun,
            blockstun: hitbox.blockstun,
            knockback: hitbox.knockback,
        }
    }
}

/// What connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitSource {
    Strike { hitbox_index: usize },
    Projectile { projectile_id: u32 },
}

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: FighterId,
    pub defender: FighterId,
    pub source: HitSource,
    /// Damage actually applied (0 when blocked)
    pub damage: f32,
    pub blocked: bool,
    /// Attacker combo count after this hit (unchanged when blocked)
    pub combo: u32,
    pub knocked_out: bool,
    /// Contact point for effects
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
struct PendingHit {
    attacker: FighterId,
    source: HitSource,
    payload: HitPayload,
    /// Knockback direction
    direction: i8,
    contact: (f32, f32),
}

/// Resolves hitboxes and projectiles against hurtboxes
pub struct CombatSystem;

impl CombatSystem {
    /// Resolve every unconsumed hitbox and live projectile against the opposing
    /// hurtbox.
    ///
    /// All overlaps are collected against this frame's boxes before any hit is
    /// applied, so a trade lands both ways and the outcome does not depend on
    /// which fighter is iterated first. Application order is fixed: fighter
    /// one's strikes, fighter two's strikes, then projectiles by id.
    pub fn resolve(fighters: &mut [Fighter; 2], projectiles: &mut ProjectileSet) -> Vec<HitResult> {
        let mut pending = Vec::new();

        for attacker in FighterId::BOTH {
            let striker = &fighters[attacker.index()];
            let defender = &fighters[attacker.opponent().index()];
            if !defender.can_be_hit() {
                continue;
            }
            for (hitbox_index, hitbox) in striker.hitboxes.iter().enumerate() {
                if hitbox.consumed || !hitbox.rect.intersects(&defender.hurtbox) {
                    continue;
                }
                pending.push(PendingHit {
                    attacker,
                    source: HitSource::Strike { hitbox_index },
                    payload: HitPayload::from(hitbox),
                    direction: striker.facing,
                    contact: hitbox.rect.center(),
                });
            }
        }

        let mut by_id: Vec<_> = projectiles.iter().collect();
        by_id.sort_by_key(|p| p.id);
        for projectile in by_id {
            let defender = &fighters[projectile.owner.opponent().index()];
            if !defender.can_be_hit() || !projectile.rect.intersects(&defender.hurtbox) {
                continue;
            }
            pending.push(PendingHit {
                attacker: projectile.owner,
                source: HitSource::Projectile {
                    projectile_id: projectile.id,
                },
                payload: projectile.payload(),
                direction: fighters[projectile.owner.index()].facing,
                contact: projectile.rect.center(),
            });
        }

        // Consume sources first so a trade cannot leave a live hitbox behind
        for hit in &pending {
            match hit.source {
                HitSource::Strike { hitbox_index } => {
                    if let Some(hitbox) = fighters[hit.attacker.index()].hitboxes.get_mut(hitbox_index) {
                        hitbox.consumed = true;
                    }
                }
                HitSource::Projectile { projectile_id } => {
                    projectiles.remove(projectile_id);
                }
            }
        }

        pending
            .into_iter()
            .map(|hit| Self::apply_hit(fighters, hit))
            .collect()
    }

    fn apply_hit(fighters: &mut [Fighter; 2], hit: PendingHit) -> HitResult {
        let defender_id = hit.attacker.opponent();
        let outcome = fighters[defender_id.index()].take_hit(&hit.payload, hit.direction);

        let (damage, blocked, knocked_out, combo) = match outcome {
            HitOutcome::Blocked => (0.0, true, false, fighters[hit.attacker.index()].combo_count),
            HitOutcome::Hit {
                damage,
                was_in_hitstun,
                knocked_out,
            } => {
                let attacker = &mut fighters[hit.attacker.index()];
                attacker.register_hit(was_in_hitstun, METER_GAIN_ON_HIT);
                (damage, false, knocked_out, attacker.combo_count)
            }
        };

        trace!(
            attacker = ?hit.attacker,
            defender = ?defender_id,
            damage,
            blocked,
            combo,
            "Hit resolved"
        );

        HitResult {
            attacker: hit.attacker,
            defender: defender_id,
            source: hit.source,
            damage,
            blocked,
            combo,
            knocked_out,
            x: hit.contact.0,
            y: hit.contact.1,
        }
    }

    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: f32, damage: f32) -> (f32, bool) {
        let new_health = (current_health - damage).max(0.0);
        (new_health, new_health <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::attack::{AttackDefinition, AttackId, AttackKind, AttackTable, HitboxShape};
    use crate::game::fighter::{FighterState, FrameContext};
    use crate::game::input::HeldInput;
    use crate::game::physics::{FighterStats, Stage};
    use crate::game::projectile::ProjectileLaunch;

    fn jab() -> AttackDefinition {
        AttackDefinition {
            startup: 3,
            active: 2,
            recovery: 6,
            damage: 10.0,
            hitstun: 8,
            blockstun: 4,
            knockback: 2.0,
            impulse: None,
            kind: AttackKind::Strike(HitboxShape {
                offset_x: 0.0,
                offset_y: 0.0,
                width: 60.0,
                height: 120.0,
            }),
        }
    }

    fn setup() -> ([Fighter; 2], AttackTable, Stage) {
        let stage = Stage::default();
        let stats = FighterStats::default();
        let table = AttackTable::standard().with_entry(AttackId::LightPunch, jab());
        // Stacked close enough that a zero-offset hitbox covers the defender
        let mut one = Fighter::new(FighterId::One, stats, 400.0, &stage);
        let mut two = Fighter::new(FighterId::Two, stats, 420.0, &stage);
        one.facing = 1;
        two.facing = -1;
        ([one, two], table, stage)
    }

    fn advance_both(fighters: &mut [Fighter; 2], table: &AttackTable, stage: &Stage, frame: u64) {
        let ctx = FrameContext { frame, table, stage };
        let xs = [fighters[0].x, fighters[1].x];
        for (i, fighter) in fighters.iter_mut().enumerate() {
            fighter.advance(&ctx, &HeldInput::default(), None, xs[1 - i]);
        }
    }

    #[test]
    fn test_apply_damage_clamps() {
        assert_eq!(CombatSystem::apply_damage(100.0, 30.0), (70.0, false));
        assert_eq!(CombatSystem::apply_damage(10.0, 30.0), (0.0, true));
    }

    #[test]
    fn test_first_active_frame_hit() {
        let (mut fighters, table, stage) = setup();
        let mut projectiles = ProjectileSet::new();
        fighters[0].start_attack(AttackId::LightPunch, &table);

        for frame in 1..=3 {
            advance_both(&mut fighters, &table, &stage, frame);
            let hits = CombatSystem::resolve(&mut fighters, &mut projectiles);
            if frame < 3 {
                assert!(hits.is_empty(), "hit before startup on frame {frame}");
            } else {
                assert_eq!(hits.len(), 1);
            }
        }

        assert_eq!(fighters[1].health, 90.0);
        assert_eq!(fighters[1].state, FighterState::HitStun);
        assert_eq!(fighters[1].hitstun_remaining, 8);
        assert_eq!(fighters[0].combo_count, 1);
        assert_eq!(fighters[0].super_meter, METER_GAIN_ON_HIT);
    }

    #[test]
    fn test_consumed_hitbox_never_hits_twice() {
        let (mut fighters, table, stage) = setup();
        let mut projectiles = ProjectileSet::new();
        fighters[0].start_attack(AttackId::LightPunch, &table);

        let mut total = 0;
        for frame in 1..=12 {
            advance_both(&mut fighters, &table, &stage, frame);
            total += CombatSystem::resolve(&mut fighters, &mut projectiles).len();
        }
        assert_eq!(total, 1);
        assert_eq!(fighters[1].health, 90.0);
    }

    #[test]
    fn test_combo_increments_inside_hitstun() {
        let (mut fighters, table, stage) = setup();
        let mut projectiles = ProjectileSet::new();

        fighters[0].start_attack(AttackId::LightPunch, &table);
        for frame in 1..=3 {
            advance_both(&mut fighters, &table, &stage, frame);
            CombatSystem::resolve(&mut fighters, &mut projectiles);
        }
        assert_eq!(fighters[0].combo_count, 1);

        // Projectile lands while the defender is still in hitstun
        let defender = &fighters[1];
        projectiles.spawn(ProjectileLaunch {
            owner: FighterId::One,
            x: defender.hurtbox.x,
            y: defender.hurtbox.y,
            vel_x: 0.0,
            vel_y: 0.0,
            size: 10.0,
            damage: 15.0,
            hitstun: 12,
            blockstun: 6,
            knockback: 4.0,
            lifetime: 60,
            charge_level: 0.0,
        });
        let hits = CombatSystem::resolve(&mut fighters, &mut projectiles);
        assert_eq!(hits.len(), 1);
        assert_eq!(fighters[0].combo_count, 2);
        assert!(projectiles.is_empty(), "projectile should be destroyed on hit");
    }

    #[test]
    fn test_combo_resets_outside_hitstun() {
        let (mut fighters, _table, _stage) = setup();
        let mut projectiles = ProjectileSet::new();
        fighters[0].combo_count = 4;
        let defender = &fighters[1];
        assert_eq!(defender.state, FighterState::Idle);
        projectiles.spawn(ProjectileLaunch {
            owner: FighterId::One,
            x: defender.hurtbox.x,
            y: defender.hurtbox.y,
            vel_x: 0.0,
            vel_y: 0.0,
            size: 10.0,
            damage: 15.0,
            hitstun: 12,
            blockstun: 6,
            knockback: 4.0,
            lifetime: 60,
            charge_level: 0.0,
        });
        CombatSystem::resolve(&mut fighters, &mut projectiles);
        assert_eq!(fighters[0].combo_count, 1);
        assert_eq!(fighters[1].health, 85.0);
    }

    #[test]
    fn test_blocking_takes_no_damage() {
        let (mut fighters, table, stage) = setup();
        let mut projectiles = ProjectileSet::new();
        fighters[1].state = FighterState::Blocking;
        fighters[1].refresh_hurtbox();
        fighters[0].start_attack(AttackId::LightPunch, &table);

        let block = HeldInput {
            down: true,
            ..HeldInput::default()
        };
        let mut results = Vec::new();
        for frame in 1..=3 {
            let ctx = FrameContext {
                frame,
                table: &table,
                stage: &stage,
            };
            let xs = [fighters[0].x, fighters[1].x];
            fighters[0].advance(&ctx, &HeldInput::default(), None, xs[1]);
            fighters[1].advance(&ctx, &block, None, xs[0]);
            results.extend(CombatSystem::resolve(&mut fighters, &mut projectiles));
        }

        assert_eq!(results.len(), 1);
        assert!(results[0].blocked);
        assert_eq!(fighters[1].health, 100.0);
        assert_eq!(fighters[1].state, FighterState::BlockStun);
        assert_eq!(fighters[1].blockstun_remaining, 4);
        assert_eq!(fighters[0].combo_count, 0);
        assert_eq!(fighters[0].super_meter, 0.0);
    }

    #[test]
    fn test_projectile_knockback_follows_owner_facing() {
        let (mut fighters, _table, _stage) = setup();
        let mut projectiles = ProjectileSet::new();
        // Thrower has crossed over: faces left, its projectile still travels right
        fighters[0].x = 700.0;
        fighters[0].facing = -1;
        let defender = &fighters[1];
        projectiles.spawn(ProjectileLaunch {
            owner: FighterId::One,
            x: defender.hurtbox.x,
            y: defender.hurtbox.y,
            vel_x: 8.0,
            vel_y: 0.0,
            size: 10.0,
            damage: 15.0,
            hitstun: 12,
            blockstun: 6,
            knockback: 4.0,
            lifetime: 60,
            charge_level: 0.0,
        });

        let hits = CombatSystem::resolve(&mut fighters, &mut projectiles);
        assert_eq!(hits.len(), 1);
        assert_eq!(fighters[1].vel_x, -4.0);
    }

    #[test]
    fn test_trade_hits_both_fighters() {
        let (mut fighters, table, stage) = setup();
        let mut projectiles = ProjectileSet::new();
        fighters[0].start_attack(AttackId::LightPunch, &table);
        fighters[1].start_attack(AttackId::LightPunch, &table);
        for frame in 1..=3 {
            advance_both(&mut fighters, &table, &stage, frame);
            CombatSystem::resolve(&mut fighters, &mut projectiles);
        }
        assert_eq!(fighters[0].health, 90.0);
        assert_eq!(fighters[1].health, 90.0);
        assert_eq!(fighters[0].state, FighterState::HitStun);
        assert_eq!(fighters[1].state, FighterState::HitStun);
    }
}
