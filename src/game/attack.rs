//! Attack frame data: identifiers, definitions and the lookup table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::input::Button;
use super::physics::Rect;

/// Every attack a fighter can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackId {
    LightPunch,
    MediumPunch,
    HeavyPunch,
    LightKick,
    MediumKick,
    HeavyKick,
    Hadouken,
    ChargedHadouken,
    Shoryuken,
    Tatsumaki,
}

impl AttackId {
    /// Normal attack bound to a button
    pub fn for_button(button: Button) -> Self {
        match button {
            Button::LightPunch => AttackId::LightPunch,
            Button::MediumPunch => AttackId::MediumPunch,
            Button::HeavyPunch => AttackId::HeavyPunch,
            Button::LightKick => AttackId::LightKick,
            Button::MediumKick => AttackId::MediumKick,
            Button::HeavyKick => AttackId::HeavyKick,
        }
    }
}

/// Hitbox placement relative to the fighter origin, authored facing right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxShape {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl HitboxShape {
    /// World rectangle for a fighter at `(x, y)` with `body_width`, mirrored when facing left
    pub fn place(&self, x: f32, y: f32, body_width: f32, facing: i8) -> Rect {
        let rect_x = if facing >= 0 {
            x + self.offset_x
        } else {
            x + body_width - self.offset_x - self.width
        };
        Rect::new(rect_x, y + self.offset_y, self.width, self.height)
    }
}

/// Projectile launched when the attack's startup completes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    /// Horizontal speed (px/frame) before facing is applied
    pub speed: f32,
    /// Lifetime in frames
    pub lifetime: u32,
    /// Square size of the collision rectangle
    pub size: f32,
    /// Spawn height relative to the fighter origin
    pub offset_y: f32,
}

/// What happens during the active window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackKind {
    /// Melee hitbox present for the whole active window
    Strike(HitboxShape),
    /// A projectile is spawned on the first active frame; no melee hitbox
    Projectile(ProjectileSpec),
}

/// Immutable frame data for one attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackDefinition {
    pub startup: u32,
    pub active: u32,
    pub recovery: u32,
    pub damage: f32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub knockback: f32,
    /// Velocity applied at attack start, x in the fighter's facing direction
    pub impulse: Option<(f32, f32)>,
    pub kind: AttackKind,
}

impl AttackDefinition {
    /// Frame index at which the active window ends
    pub fn active_end(&self) -> u32 {
        self.startup + self.active
    }

    pub fn total_frames(&self) -> u32 {
        self.startup + self.active + self.recovery
    }

    /// Whether frame `attack_frame` lies in `[startup, startup + active)`
    pub fn is_active(&self, attack_frame: u32) -> bool {
        attack_frame >= self.startup && attack_frame < self.active_end()
    }

    pub fn is_finished(&self, attack_frame: u32) -> bool {
        attack_frame >= self.total_frames()
    }

    pub fn hitbox_shape(&self) -> Option<&HitboxShape> {
        match &self.kind {
            AttackKind::Strike(shape) => Some(shape),
            AttackKind::Projectile(_) => None,
        }
    }

    pub fn projectile(&self) -> Option<&ProjectileSpec> {
        match &self.kind {
            AttackKind::Projectile(shot) => Some(shot),
            AttackKind::Strike(_) => None,
        }
    }

    fn strike(
        (startup, active, recovery): (u32, u32, u32),
        damage: f32,
        (hitstun, blockstun): (u32, u32),
        knockback: f32,
        shape: HitboxShape,
    ) -> Self {
        Self {
            startup,
            active,
            recovery,
            damage,
            hitstun,
            blockstun,
            knockback,
            impulse: None,
            kind: AttackKind::Strike(shape),
        }
    }
}

/// Frame data lookup keyed by attack id
#[derive(Debug, Clone)]
pub struct AttackTable {
    entries: HashMap<AttackId, AttackDefinition>,
}

impl AttackTable {
    /// An empty table, to be filled with `with_entry`
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The standard roster frame data
    pub fn standard() -> Self {
        let shape = |offset_x, offset_y, width, height| HitboxShape {
            offset_x,
            offset_y,
            width,
            height,
        };

        let hadouken = ProjectileSpec {
            speed: 8.0,
            lifetime: 120,
            size: 25.0,
            offset_y: 40.0,
        };

        Self::empty()
            .with_entry(
                AttackId::LightPunch,
                AttackDefinition::strike((3, 2, 6), 10.0, (8, 4), 2.0, shape(60.0, 30.0, 40.0, 25.0)),
            )
            .with_entry(
                AttackId::MediumPunch,
                AttackDefinition::strike((5, 3, 8), 15.0, (12, 6), 4.0, shape(60.0, 28.0, 45.0, 25.0)),
            )
            .with_entry(
                AttackId::HeavyPunch,
                AttackDefinition::strike((8, 4, 12), 25.0, (18, 10), 8.0, shape(60.0, 25.0, 55.0, 30.0)),
            )
            .with_entry(
                AttackId::LightKick,
                AttackDefinition::strike((4, 3, 7), 12.0, (10, 5), 3.0, shape(60.0, 70.0, 45.0, 25.0)),
            )
            .with_entry(
                AttackId::MediumKick,
                AttackDefinition::strike((6, 4, 9), 18.0, (14, 7), 5.0, shape(60.0, 60.0, 50.0, 30.0)),
            )
            .with_entry(
                AttackId::HeavyKick,
                AttackDefinition::strike((9, 5, 13), 28.0, (20, 11), 10.0, shape(55.0, 10.0, 55.0, 35.0)),
            )
            .with_entry(
                AttackId::Hadouken,
                AttackDefinition {
                    startup: 8,
                    active: 2,
                    recovery: 20,
                    damage: 15.0,
                    hitstun: 12,
                    blockstun: 6,
                    knockback: 4.0,
                    impulse: None,
                    kind: AttackKind::Projectile(hadouken),
                },
            )
            .with_entry(
                AttackId::ChargedHadouken,
                AttackDefinition {
                    startup: 10,
                    active: 2,
                    recovery: 28,
                    damage: 15.0,
                    hitstun: 12,
                    blockstun: 6,
                    knockback: 4.0,
                    impulse: None,
                    kind: AttackKind::Projectile(hadouken),
                },
            )
            .with_entry(
                AttackId::Shoryuken,
                AttackDefinition {
                    impulse: Some((2.0, -12.0)),
                    ..AttackDefinition::strike((3, 12, 20), 20.0, (15, 8), 6.0, shape(0.0, -20.0, 60.0, 40.0))
                },
            )
            .with_entry(
                AttackId::Tatsumaki,
                AttackDefinition {
                    impulse: Some((6.0, 0.0)),
                    ..AttackDefinition::strike((5, 20, 15), 12.0, (10, 6), 3.0, shape(-20.0, 0.0, 100.0, 120.0))
                },
            )
    }

    /// Insert or replace an entry
    pub fn with_entry(mut self, id: AttackId, definition: AttackDefinition) -> Self {
        self.entries.insert(id, definition);
        self
    }

    pub fn contains(&self, id: AttackId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Look up frame data.
    ///
    /// # Panics
    /// Panics when `id` has no entry. A missing entry is a programming error:
    /// running without frame data would desync startup/active/recovery timing.
    pub fn get(&self, id: AttackId) -> &AttackDefinition {
        self.entries
            .get(&id)
            .unwrap_or_else(|| panic!("attack table has no frame data for {id:?}"))
    }
}

impl Default for AttackTable {
    fn default() -> Self {
        Self::standard()
    }
}
