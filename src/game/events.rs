//! Frame events for presentation collaborators (HUD, audio, effects)

use serde::{Deserialize, Serialize};

use super::attack::AttackId;
use super::combat::{HitResult, HitSource};
use super::projectile::{Expired, ExpiryReason, Projectile};
use super::r#match::{MatchOutcome, RoundOutcome};
use super::FighterId;

/// Something that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Fighters reset, countdown started
    RoundStarted { round: u32 },

    /// Countdown finished, inputs are live
    FightStarted { round: u32 },

    AttackStarted {
        fighter: FighterId,
        attack: AttackId,
    },

    /// A motion input was recognized and performed
    SpecialMove {
        fighter: FighterId,
        attack: AttackId,
    },

    ProjectileSpawned {
        projectile_id: u32,
        owner: FighterId,
        x: f32,
        y: f32,
        vel_x: f32,
        charge_level: f32,
    },

    /// Projectile left without hitting anything
    ProjectileExpired {
        projectile_id: u32,
        owner: FighterId,
        reason: ExpiryReason,
    },

    Hit {
        attacker: FighterId,
        defender: FighterId,
        source: HitSource,
        damage: f32,
        combo: u32,
        x: f32,
        y: f32,
    },

    Blocked {
        attacker: FighterId,
        defender: FighterId,
        source: HitSource,
        x: f32,
        y: f32,
    },

    KnockOut { fighter: FighterId },

    RoundEnded {
        round: u32,
        outcome: RoundOutcome,
        wins: [u32; 2],
    },

    MatchOver { outcome: MatchOutcome },
}

impl GameEvent {
    pub fn projectile_spawned(projectile: &Projectile) -> Self {
        GameEvent::ProjectileSpawned {
            projectile_id: projectile.id,
            owner: projectile.owner,
            x: projectile.rect.x,
            y: projectile.rect.y,
            vel_x: projectile.vel_x,
            charge_level: projectile.charge_level,
        }
    }
}

impl From<&HitResult> for GameEvent {
    fn from(hit: &HitResult) -> Self {
        if hit.blocked {
            GameEvent::Blocked {
                attacker: hit.attacker,
                defender: hit.defender,
                source: hit.source,
                x: hit.x,
                y: hit.y,
            }
        } else {
            GameEvent::Hit {
                attacker: hit.attacker,
                defender: hit.defender,
                source: hit.source,
                damage: hit.damage,
                combo: hit.combo,
                x: hit.x,
                y: hit.y,
            }
        }
    }
}

impl From<Expired> for GameEvent {
    fn from(expired: Expired) -> Self {
        GameEvent::ProjectileExpired {
            projectile_id: expired.id,
            owner: expired.owner,
            reason: expired.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::r#match::RoundEndReason;

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::RoundEnded {
            round: 2,
            outcome: RoundOutcome::Winner {
                fighter: FighterId::Two,
                reason: RoundEndReason::TimeUp,
            },
            wins: [1, 1],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "round_ended");
        assert_eq!(json["outcome"]["result"], "winner");
        assert_eq!(json["outcome"]["fighter"], "p2");
        assert_eq!(json["outcome"]["reason"], "time_up");
    }

    #[test]
    fn test_blocked_hit_becomes_blocked_event() {
        let hit = HitResult {
            attacker: FighterId::One,
            defender: FighterId::Two,
            source: HitSource::Strike { hitbox_index: 0 },
            damage: 0.0,
            blocked: true,
            combo: 0,
            knocked_out: false,
            x: 10.0,
            y: 20.0,
        };
        assert!(matches!(GameEvent::from(&hit), GameEvent::Blocked { .. }));

        let json = serde_json::to_value(GameEvent::from(&HitResult {
            blocked: false,
            damage: 10.0,
            combo: 1,
            ..hit
        }))
        .unwrap();
        assert_eq!(json["event_type"], "hit");
        assert_eq!(json["source"]["kind"], "strike");
        assert_eq!(json["damage"], 10.0);
    }
}
