//! Fighter state machine
//!
//! One fighter's body, resources and attack timeline, advanced one frame at a
//! time. The attack timeline is a single counter compared against the frame
//! data's cumulative thresholds: the hitbox exists while
//! `startup <= attack_frame < startup + active` and the fighter returns to
//! `Idle` once `attack_frame >= startup + active + recovery`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::attack::{AttackDefinition, AttackId, AttackTable};
use super::combat::{CombatSystem, HitPayload, Hitbox};
use super::input::{Button, HeldInput, InputBuffer};
use super::physics::{FighterStats, PhysicsSystem, Rect, Stage};
use super::projectile::ProjectileLaunch;
use super::FighterId;

/// Holding this button past `CHARGE_START_FRAMES` charges a projectile instead
/// of throwing the normal attack on release
pub const CHARGE_BUTTON: Button = Button::HeavyPunch;
/// Frames the charge button must be held before charging starts
pub const CHARGE_START_FRAMES: u32 = 20;
/// Frames of charging needed to reach a full charge
pub const MAX_CHARGE_FRAMES: u32 = 120;
/// Minimum charge level for a release to fire
pub const MIN_CHARGE_RELEASE: f32 = 0.2;
/// Frames between two projectile launches by the same fighter
pub const PROJECTILE_COOLDOWN_FRAMES: u32 = 120;

/// Pose / state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    Idle,
    Walking,
    Jumping,
    Attacking,
    Charging,
    Blocking,
    HitStun,
    BlockStun,
    /// Knocked out, terminal for the round
    Crashed,
    /// Opponent knocked out, terminal for the round
    Victory,
}

impl FighterState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FighterState::Crashed | FighterState::Victory)
    }

    /// States that read directional input
    fn is_neutral(self) -> bool {
        matches!(
            self,
            FighterState::Idle | FighterState::Walking | FighterState::Blocking
        )
    }
}

/// Read-only per-frame context shared by both fighters
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub frame: u64,
    pub table: &'a AttackTable,
    pub stage: &'a Stage,
}

/// What a fighter did this frame, for the simulation to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FighterFrame {
    pub attack_started: Option<AttackId>,
    /// Set when the recognized special move was actually performed
    pub special_performed: bool,
    pub projectile: Option<ProjectileLaunch>,
    pub jumped: bool,
    pub landed: bool,
}

/// Result of a hit landing on this fighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    Blocked,
    Hit {
        damage: f32,
        was_in_hitstun: bool,
        knocked_out: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Fighter {
    pub id: FighterId,
    /// +1 facing right, -1 facing left
    pub facing: i8,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub grounded: bool,

    // State
    pub state: FighterState,
    pub current_attack: Option<AttackId>,
    pub attack_frame: u32,

    // Resources
    pub health: f32,
    pub super_meter: f32,
    pub charge_level: f32,

    // Combat
    pub hitstun_remaining: u32,
    pub blockstun_remaining: u32,
    pub combo_count: u32,
    pub hitboxes: Vec<Hitbox>,
    pub hurtbox: Rect,

    pub input_buffer: InputBuffer,

    stats: FighterStats,
    previous_input: HeldInput,
    button_hold_frames: [u32; 6],
    projectile_cooldown: u32,
    /// Charge level carried into the charged projectile launch
    launch_charge: f32,
    /// Current attack carries its own velocity; friction is suspended
    attack_moves: bool,
}

impl Fighter {
    pub fn new(id: FighterId, stats: FighterStats, spawn_x: f32, stage: &Stage) -> Self {
        let mut fighter = Self {
            id,
            facing: id.default_facing(),
            x: spawn_x,
            y: stage.ground_y,
            vel_x: 0.0,
            vel_y: 0.0,
            grounded: true,
            state: FighterState::Idle,
            current_attack: None,
            attack_frame: 0,
            health: stats.max_health,
            super_meter: 0.0,
            charge_level: 0.0,
            hitstun_remaining: 0,
            blockstun_remaining: 0,
            combo_count: 0,
            hitboxes: Vec::new(),
            hurtbox: Rect::default(),
            input_buffer: InputBuffer::default(),
            stats,
            previous_input: HeldInput::default(),
            button_hold_frames: [0; 6],
            projectile_cooldown: 0,
            launch_charge: 0.0,
            attack_moves: false,
        };
        fighter.refresh_hurtbox();
        fighter
    }

    /// Back to round-start condition at `spawn_x`
    pub fn reset(&mut self, spawn_x: f32, stage: &Stage) {
        *self = Self::new(self.id, self.stats, spawn_x, stage);
    }

    /// True only in Idle or Walking
    pub fn can_attack(&self) -> bool {
        matches!(self.state, FighterState::Idle | FighterState::Walking)
    }

    pub fn can_be_hit(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn is_knocked_out(&self) -> bool {
        self.health <= 0.0
    }

    pub fn projectile_ready(&self) -> bool {
        self.projectile_cooldown == 0
    }

    /// Enter `Attacking` with `attack_frame = 0`. No hitbox yet.
    pub fn start_attack(&mut self, id: AttackId, table: &AttackTable) {
        let definition = table.get(id);
        self.state = FighterState::Attacking;
        self.current_attack = Some(id);
        self.attack_frame = 0;
        self.hitboxes.clear();
        self.attack_moves = definition.impulse.is_some();
        if let Some((impulse_x, impulse_y)) = definition.impulse {
            self.vel_x = impulse_x * f32::from(self.facing);
            if impulse_y != 0.0 {
                self.vel_y = impulse_y;
                self.grounded = false;
            }
        }
    }

    /// Advance one frame.
    ///
    /// `special` is a motion the recognizer found this frame; it is performed
    /// only if the fighter can attack once movement for the frame is applied.
    /// `opponent_x` is the opponent's position at the start of the frame.
    pub fn advance(
        &mut self,
        ctx: &FrameContext<'_>,
        input: &HeldInput,
        special: Option<AttackId>,
        opponent_x: f32,
    ) -> FighterFrame {
        let mut out = FighterFrame::default();

        if self.state.is_terminal() {
            self.integrate(ctx.stage, &mut out);
            self.refresh_hurtbox();
            self.previous_input = *input;
            return out;
        }

        self.facing = PhysicsSystem::facing_toward(self.x, opponent_x, self.facing);
        self.projectile_cooldown = self.projectile_cooldown.saturating_sub(1);
        let was_attacking = self.state == FighterState::Attacking;

        self.tick_stun();
        let released = self.track_buttons(input);
        self.apply_movement(input, &mut out);

        if let Some(id) = special {
            if self.can_attack() && self.can_launch(ctx.table.get(id)) {
                self.start_attack(id, ctx.table);
                out.attack_started = Some(id);
                out.special_performed = true;
            }
        }

        self.update_charge(input, &released, ctx.table, &mut out);

        if out.attack_started.is_none() && self.can_attack() {
            let normal = released.iter().find_map(|(button, held_for)| {
                let charged = *button == CHARGE_BUTTON && *held_for >= CHARGE_START_FRAMES;
                (!charged).then(|| AttackId::for_button(*button))
            });
            if let Some(id) = normal {
                self.start_attack(id, ctx.table);
                out.attack_started = Some(id);
            }
        }

        if let Some(id) = out.attack_started {
            trace!(fighter = ?self.id, frame = ctx.frame, attack = ?id, "Attack started");
        }

        self.integrate(ctx.stage, &mut out);

        if self.state == FighterState::Attacking {
            if was_attacking && out.attack_started.is_none() {
                self.attack_frame += 1;
            }
            self.run_attack_timeline(ctx.table, &mut out);
        }

        self.refresh_hurtbox();
        self.previous_input = *input;
        out
    }

    /// Count down hitstun / blockstun; both recover at zero
    fn tick_stun(&mut self) {
        match self.state {
            FighterState::HitStun => {
                self.hitstun_remaining = self.hitstun_remaining.saturating_sub(1);
                if self.hitstun_remaining == 0 {
                    self.recover();
                }
            }
            FighterState::BlockStun => {
                self.blockstun_remaining = self.blockstun_remaining.saturating_sub(1);
                if self.blockstun_remaining == 0 {
                    self.recover();
                }
            }
            _ => {}
        }
    }

    /// Update hold counters; returns buttons released this frame with how
    /// long they had been held
    fn track_buttons(&mut self, input: &HeldInput) -> Vec<(Button, u32)> {
        let mut released = Vec::new();
        for button in Button::ALL {
            let i = button.index();
            if input.button(button) {
                self.button_hold_frames[i] += 1;
            } else {
                if self.previous_input.button(button) {
                    released.push((button, self.button_hold_frames[i]));
                }
                self.button_hold_frames[i] = 0;
            }
        }
        released
    }

    /// Walk, jump and block. Only neutral states read directions.
    fn apply_movement(&mut self, input: &HeldInput, out: &mut FighterFrame) {
        if !self.state.is_neutral() || !self.grounded {
            return;
        }

        if input.down {
            self.state = FighterState::Blocking;
        } else if input.up {
            self.state = FighterState::Jumping;
            self.vel_x = f32::from(input.horizontal()) * self.stats.walk_speed;
            self.vel_y = self.stats.jump_power;
            self.grounded = false;
            out.jumped = true;
        } else if input.horizontal() != 0 {
            self.state = FighterState::Walking;
            self.vel_x = f32::from(input.horizontal()) * self.stats.walk_speed;
        } else {
            self.state = FighterState::Idle;
        }
    }

    fn update_charge(
        &mut self,
        input: &HeldInput,
        released: &[(Button, u32)],
        table: &AttackTable,
        out: &mut FighterFrame,
    ) {
        let held_for = self.button_hold_frames[CHARGE_BUTTON.index()];

        if self.state == FighterState::Charging {
            if input.button(CHARGE_BUTTON) {
                let charged = held_for.saturating_sub(CHARGE_START_FRAMES) as f32;
                self.charge_level = (charged / MAX_CHARGE_FRAMES as f32).clamp(0.0, 1.0);
                return;
            }

            let level = self.charge_level;
            self.charge_level = 0.0;
            self.state = FighterState::Idle;
            let released_charge = released.iter().any(|(button, _)| *button == CHARGE_BUTTON);
            if released_charge
                && level >= MIN_CHARGE_RELEASE
                && self.can_launch(table.get(AttackId::ChargedHadouken))
            {
                self.launch_charge = level;
                self.start_attack(AttackId::ChargedHadouken, table);
                out.attack_started = Some(AttackId::ChargedHadouken);
            }
            return;
        }

        if out.attack_started.is_none()
            && self.can_attack()
            && input.button(CHARGE_BUTTON)
            && held_for >= CHARGE_START_FRAMES
        {
            self.state = FighterState::Charging;
            self.charge_level = 0.0;
        }
    }

    /// Projectile attacks also need the launch cooldown to have expired
    fn can_launch(&self, definition: &AttackDefinition) -> bool {
        definition.projectile().is_none() || self.projectile_ready()
    }

    fn integrate(&mut self, stage: &Stage, out: &mut FighterFrame) {
        let moving_attack = self.state == FighterState::Attacking && self.attack_moves;
        let apply_friction = self.state != FighterState::Walking && !moving_attack;

        let step = PhysicsSystem::step_body(
            self.x,
            self.y,
            self.vel_x,
            self.vel_y,
            self.grounded,
            apply_friction,
            &self.stats,
            stage,
        );
        self.x = step.x;
        self.y = step.y;
        self.vel_x = step.vel_x;
        self.vel_y = step.vel_y;
        self.grounded = step.grounded;

        if step.landed {
            out.landed = true;
            if self.state == FighterState::Jumping {
                self.state = FighterState::Idle;
                self.vel_x = 0.0;
            }
        }
    }

    fn run_attack_timeline(&mut self, table: &AttackTable, out: &mut FighterFrame) {
        let Some(id) = self.current_attack else {
            self.recover();
            return;
        };
        let definition = *table.get(id);

        if definition.is_finished(self.attack_frame) {
            self.end_attack();
            return;
        }

        match definition.hitbox_shape() {
            Some(shape) if definition.is_active(self.attack_frame) => {
                let rect = shape.place(self.x, self.y, self.stats.width, self.facing);
                match self.hitboxes.first_mut() {
                    Some(hitbox) => hitbox.rect = rect,
                    None => self.hitboxes.push(Hitbox {
                        owner: self.id,
                        rect,
                        damage: definition.damage,
                        hitstun: definition.hitstun,
                        blockstun: definition.blockstun,
                        knockback: definition.knockback,
                        consumed: false,
                    }),
                }
            }
            _ => self.hitboxes.clear(),
        }

        if let Some(shot) = definition.projectile() {
            if self.attack_frame == definition.startup {
                let power = 1.0 + self.launch_charge;
                let size = shot.size + self.launch_charge * 15.0;
                let spawn_x = if self.facing >= 0 {
                    self.x + self.stats.width
                } else {
                    self.x - size
                };
                out.projectile = Some(ProjectileLaunch {
                    owner: self.id,
                    x: spawn_x,
                    y: self.y + shot.offset_y,
                    vel_x: shot.speed * power * f32::from(self.facing),
                    vel_y: 0.0,
                    size,
                    damage: (definition.damage * power).floor(),
                    hitstun: definition.hitstun,
                    blockstun: definition.blockstun,
                    knockback: definition.knockback,
                    lifetime: (shot.lifetime as f32 * power).floor() as u32,
                    charge_level: self.launch_charge,
                });
                self.projectile_cooldown = PROJECTILE_COOLDOWN_FRAMES;
                self.launch_charge = 0.0;
            }
        }
    }

    /// Back to neutral: Idle on the ground, Jumping until landing otherwise
    fn recover(&mut self) {
        self.state = if self.grounded {
            FighterState::Idle
        } else {
            FighterState::Jumping
        };
    }

    fn end_attack(&mut self) {
        self.recover();
        self.current_attack = None;
        self.attack_frame = 0;
        self.attack_moves = false;
        self.hitboxes.clear();
    }

    /// Recompute the hurtbox from position and pose; crouched poses shrink it
    pub fn refresh_hurtbox(&mut self) {
        let crouched = matches!(
            self.state,
            FighterState::Blocking | FighterState::BlockStun | FighterState::Charging
        );
        self.hurtbox = if crouched {
            let offset = self.stats.height - self.stats.crouch_height;
            Rect::new(self.x, self.y + offset, self.stats.width, self.stats.crouch_height)
        } else {
            Rect::new(self.x, self.y, self.stats.width, self.stats.height)
        };
    }

    /// Apply a hit landing on this fighter. Blocking fighters take blockstun
    /// and no damage.
    pub fn take_hit(&mut self, payload: &HitPayload, direction: i8) -> HitOutcome {
        if matches!(self.state, FighterState::Blocking | FighterState::BlockStun) {
            self.state = FighterState::BlockStun;
            self.blockstun_remaining = payload.blockstun;
            self.vel_x += payload.knockback * f32::from(direction);
            return HitOutcome::Blocked;
        }

        let was_in_hitstun = self.state == FighterState::HitStun;
        let before = self.health;
        let (health, knocked_out) = CombatSystem::apply_damage(self.health, payload.damage);
        self.health = health;

        self.current_attack = None;
        self.attack_frame = 0;
        self.attack_moves = false;
        self.hitboxes.clear();
        self.charge_level = 0.0;
        self.launch_charge = 0.0;
        self.vel_x += payload.knockback * f32::from(direction);

        if knocked_out {
            self.state = FighterState::Crashed;
            self.hitstun_remaining = 0;
        } else {
            self.state = FighterState::HitStun;
            self.hitstun_remaining = payload.hitstun;
        }
        self.refresh_hurtbox();

        HitOutcome::Hit {
            damage: before - health,
            was_in_hitstun,
            knocked_out,
        }
    }

    /// Attacker bookkeeping after landing a hit
    pub fn register_hit(&mut self, defender_was_in_hitstun: bool, meter_gain: f32) {
        self.combo_count = if defender_was_in_hitstun {
            self.combo_count + 1
        } else {
            1
        };
        self.super_meter = (self.super_meter + meter_gain).clamp(0.0, self.stats.max_super);
    }

    /// The opponent was knocked out
    pub fn declare_victory(&mut self) {
        self.state = FighterState::Victory;
        self.current_attack = None;
        self.attack_frame = 0;
        self.attack_moves = false;
        self.hitboxes.clear();
        self.charge_level = 0.0;
        self.refresh_hurtbox();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::InputSymbol;

    const FAR: f32 = 1000.0;

    struct Rig {
        table: AttackTable,
        stage: Stage,
        fighter: Fighter,
        frame: u64,
    }

    impl Rig {
        fn new() -> Self {
            let stage = Stage::default();
            let fighter = Fighter::new(FighterId::One, FighterStats::default(), 200.0, &stage);
            Self {
                table: AttackTable::standard(),
                stage,
                fighter,
                frame: 0,
            }
        }

        fn step(&mut self, symbols: &[InputSymbol]) -> FighterFrame {
            self.step_with(symbols, None)
        }

        fn step_with(&mut self, symbols: &[InputSymbol], special: Option<AttackId>) -> FighterFrame {
            self.frame += 1;
            let ctx = FrameContext {
                frame: self.frame,
                table: &self.table,
                stage: &self.stage,
            };
            let held = HeldInput::from_symbols(symbols.iter().copied());
            self.fighter.advance(&ctx, &held, special, FAR)
        }
    }

    fn button(b: Button) -> InputSymbol {
        InputSymbol::Button(b)
    }

    #[test]
    fn test_hitstun_ending_airborne_falls_as_jumping() {
        let mut rig = Rig::new();
        rig.step(&[InputSymbol::Up]);
        rig.step(&[]);
        assert!(!rig.fighter.grounded);

        let payload = HitPayload {
            damage: 5.0,
            hitstun: 2,
            blockstun: 1,
            knockback: 0.0,
        };
        rig.fighter.take_hit(&payload, 1);
        rig.step(&[]);
        rig.step(&[]);
        assert!(!rig.fighter.grounded);
        assert_eq!(rig.fighter.state, FighterState::Jumping);
        assert!(!rig.fighter.can_attack());

        rig.step(&[button(Button::LightPunch)]);
        let frame = rig.step(&[]);
        assert_eq!(frame.attack_started, None);

        for _ in 0..60 {
            if rig.fighter.grounded {
                break;
            }
            rig.step(&[]);
        }
        assert!(rig.fighter.grounded);
        assert_eq!(rig.fighter.state, FighterState::Idle);
    }

    #[test]
    fn test_hitbox_only_inside_active_window() {
        let table = AttackTable::standard();
        for id in [
            AttackId::LightPunch,
            AttackId::MediumPunch,
            AttackId::HeavyPunch,
            AttackId::LightKick,
            AttackId::MediumKick,
            AttackId::HeavyKick,
            AttackId::Shoryuken,
            AttackId::Tatsumaki,
        ] {
            let mut rig = Rig::new();
            rig.fighter.start_attack(id, &rig.table);
            let definition = *table.get(id);
            assert!(rig.fighter.hitboxes.is_empty());

            while rig.fighter.state == FighterState::Attacking {
                rig.step(&[]);
                if rig.fighter.state != FighterState::Attacking {
                    break;
                }
                let frame = rig.fighter.attack_frame;
                assert_eq!(
                    !rig.fighter.hitboxes.is_empty(),
                    definition.is_active(frame),
                    "{id:?} hitbox presence wrong at attack frame {frame}"
                );
            }
            assert!(rig.fighter.hitboxes.is_empty());
            assert_eq!(rig.fighter.current_attack, None);
        }
    }

    #[test]
    fn test_attack_returns_to_idle_after_total_frames() {
        let mut rig = Rig::new();
        rig.fighter.start_attack(AttackId::LightPunch, &rig.table);
        // 3 startup + 2 active + 6 recovery
        for _ in 0..10 {
            rig.step(&[]);
            assert_eq!(rig.fighter.state, FighterState::Attacking);
        }
        rig.step(&[]);
        assert_eq!(rig.fighter.state, FighterState::Idle);
    }

    #[test]
    fn test_normal_attack_fires_on_release() {
        let mut rig = Rig::new();
        let lp = button(Button::LightPunch);
        assert_eq!(rig.step(&[lp]).attack_started, None);
        assert_eq!(rig.step(&[lp]).attack_started, None);
        let out = rig.step(&[]);
        assert_eq!(out.attack_started, Some(AttackId::LightPunch));
        assert_eq!(rig.fighter.state, FighterState::Attacking);
        assert_eq!(rig.fighter.attack_frame, 0);
    }

    #[test]
    fn test_attack_input_is_dropped_while_attacking() {
        let mut rig = Rig::new();
        rig.fighter.start_attack(AttackId::HeavyKick, &rig.table);
        rig.step(&[button(Button::LightPunch)]);
        let out = rig.step(&[]);
        assert_eq!(out.attack_started, None);
        assert_eq!(rig.fighter.current_attack, Some(AttackId::HeavyKick));
    }

    #[test]
    fn test_can_attack_only_in_idle_or_walking() {
        let mut rig = Rig::new();
        assert!(rig.fighter.can_attack());

        rig.step(&[InputSymbol::Right]);
        assert_eq!(rig.fighter.state, FighterState::Walking);
        assert!(rig.fighter.can_attack());

        for state in [
            FighterState::HitStun,
            FighterState::BlockStun,
            FighterState::Attacking,
            FighterState::Jumping,
            FighterState::Charging,
            FighterState::Blocking,
            FighterState::Crashed,
            FighterState::Victory,
        ] {
            rig.fighter.state = state;
            assert!(!rig.fighter.can_attack(), "{state:?} should not allow attacks");
        }
    }

    #[test]
    fn test_walk_jump_and_land() {
        let mut rig = Rig::new();
        let start_x = rig.fighter.x;
        for _ in 0..5 {
            rig.step(&[InputSymbol::Right]);
        }
        assert!(rig.fighter.x > start_x);

        let out = rig.step(&[InputSymbol::Up]);
        assert!(out.jumped);
        assert_eq!(rig.fighter.state, FighterState::Jumping);
        assert!(!rig.fighter.grounded);

        // Holding up mid-air does not jump again
        assert!(!rig.step(&[InputSymbol::Up]).jumped);

        let mut frames = 0;
        loop {
            let out = rig.step(&[]);
            frames += 1;
            if out.landed {
                break;
            }
            assert!(frames < 100, "never landed");
        }
        assert_eq!(rig.fighter.state, FighterState::Idle);
        assert_eq!(rig.fighter.y, rig.stage.ground_y);
    }

    #[test]
    fn test_block_crouches_hurtbox() {
        let mut rig = Rig::new();
        let standing = rig.fighter.hurtbox;
        rig.step(&[InputSymbol::Down]);
        assert_eq!(rig.fighter.state, FighterState::Blocking);
        assert!(rig.fighter.hurtbox.height < standing.height);
        assert_eq!(
            rig.fighter.hurtbox.y + rig.fighter.hurtbox.height,
            standing.y + standing.height
        );
        rig.step(&[]);
        assert_eq!(rig.fighter.state, FighterState::Idle);
        assert_eq!(rig.fighter.hurtbox, standing);
    }

    #[test]
    fn test_facing_tracks_opponent() {
        let mut rig = Rig::new();
        rig.fighter.facing = -1;
        rig.step(&[]);
        assert_eq!(rig.fighter.facing, 1);

        let ctx = FrameContext {
            frame: 99,
            table: &rig.table,
            stage: &rig.stage,
        };
        rig.fighter.advance(&ctx, &HeldInput::default(), None, 50.0);
        assert_eq!(rig.fighter.facing, -1);
    }

    #[test]
    fn test_special_spawns_projectile_at_startup() {
        let mut rig = Rig::new();
        let out = rig.step_with(&[], Some(AttackId::Hadouken));
        assert!(out.special_performed);
        assert_eq!(out.attack_started, Some(AttackId::Hadouken));

        let startup = rig.table.get(AttackId::Hadouken).startup;
        let mut launched_at = None;
        for _ in 0..startup + 2 {
            if let Some(launch) = rig.step(&[]).projectile {
                assert!(launched_at.is_none(), "launched twice");
                launched_at = Some(rig.fighter.attack_frame);
                assert_eq!(launch.damage, 15.0);
                assert_eq!(launch.lifetime, 120);
                assert!(launch.vel_x > 0.0);
            }
        }
        assert_eq!(launched_at, Some(startup));
        assert!(!rig.fighter.projectile_ready());
    }

    #[test]
    fn test_projectile_cooldown_blocks_second_special() {
        let mut rig = Rig::new();
        rig.step_with(&[], Some(AttackId::Hadouken));
        while rig.fighter.state == FighterState::Attacking {
            rig.step(&[]);
        }
        let out = rig.step_with(&[], Some(AttackId::Hadouken));
        assert!(!out.special_performed);
        assert_eq!(rig.fighter.state, FighterState::Idle);

        // Melee specials are not gated by the projectile cooldown
        let out = rig.step_with(&[], Some(AttackId::Tatsumaki));
        assert!(out.special_performed);
    }

    #[test]
    fn test_special_blocked_outside_neutral() {
        let mut rig = Rig::new();
        rig.fighter.state = FighterState::HitStun;
        rig.fighter.hitstun_remaining = 5;
        let out = rig.step_with(&[], Some(AttackId::Hadouken));
        assert!(!out.special_performed);
        assert_eq!(rig.fighter.state, FighterState::HitStun);
    }

    #[test]
    fn test_charge_release_fires_scaled_projectile() {
        let mut rig = Rig::new();
        let hp = button(Button::HeavyPunch);
        for _ in 0..CHARGE_START_FRAMES {
            rig.step(&[hp]);
        }
        assert_eq!(rig.fighter.state, FighterState::Charging);

        for _ in 0..MAX_CHARGE_FRAMES / 2 {
            rig.step(&[hp]);
        }
        let level = rig.fighter.charge_level;
        assert!(level > 0.45 && level <= 0.5, "level was {level}");

        let out = rig.step(&[]);
        assert_eq!(out.attack_started, Some(AttackId::ChargedHadouken));
        assert_eq!(rig.fighter.charge_level, 0.0);

        let mut launch = None;
        while rig.fighter.state == FighterState::Attacking && launch.is_none() {
            launch = rig.step(&[]).projectile;
        }
        let launch = launch.expect("charged projectile");
        let power = 1.0 + level;
        assert_eq!(launch.damage, (15.0 * power).floor());
        assert_eq!(launch.lifetime, (120.0 * power).floor() as u32);
        assert!(launch.size > 25.0);
        assert_eq!(launch.charge_level, level);
    }

    #[test]
    fn test_weak_charge_returns_to_idle() {
        let mut rig = Rig::new();
        let hp = button(Button::HeavyPunch);
        for _ in 0..CHARGE_START_FRAMES + 5 {
            rig.step(&[hp]);
        }
        assert_eq!(rig.fighter.state, FighterState::Charging);
        let out = rig.step(&[]);
        assert_eq!(out.attack_started, None);
        assert_eq!(rig.fighter.state, FighterState::Idle);
    }

    #[test]
    fn test_heavy_punch_tap_is_a_normal() {
        let mut rig = Rig::new();
        rig.step(&[button(Button::HeavyPunch)]);
        let out = rig.step(&[]);
        assert_eq!(out.attack_started, Some(AttackId::HeavyPunch));
    }

    #[test]
    fn test_take_hit_and_knockout() {
        let mut rig = Rig::new();
        let payload = HitPayload {
            damage: 30.0,
            hitstun: 8,
            blockstun: 4,
            knockback: 2.0,
        };
        let outcome = rig.fighter.take_hit(&payload, -1);
        assert_eq!(
            outcome,
            HitOutcome::Hit {
                damage: 30.0,
                was_in_hitstun: false,
                knocked_out: false
            }
        );
        assert_eq!(rig.fighter.state, FighterState::HitStun);
        assert!(rig.fighter.vel_x < 0.0);

        let big = HitPayload {
            damage: 500.0,
            ..payload
        };
        match rig.fighter.take_hit(&big, 1) {
            HitOutcome::Hit {
                damage,
                was_in_hitstun,
                knocked_out,
            } => {
                assert_eq!(damage, 70.0);
                assert!(was_in_hitstun);
                assert!(knocked_out);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(rig.fighter.health, 0.0);
        assert_eq!(rig.fighter.state, FighterState::Crashed);

        // Terminal for the round: input no longer moves the state
        rig.step(&[InputSymbol::Right, button(Button::LightPunch)]);
        rig.step(&[]);
        assert_eq!(rig.fighter.state, FighterState::Crashed);
    }

    #[test]
    fn test_hitstun_counts_down_to_idle() {
        let mut rig = Rig::new();
        let payload = HitPayload {
            damage: 10.0,
            hitstun: 8,
            blockstun: 4,
            knockback: 0.0,
        };
        rig.fighter.take_hit(&payload, 1);
        for _ in 0..7 {
            rig.step(&[]);
            assert_eq!(rig.fighter.state, FighterState::HitStun);
        }
        rig.step(&[]);
        assert_eq!(rig.fighter.state, FighterState::Idle);
    }

    #[test]
    fn test_reset_restores_round_start() {
        let mut rig = Rig::new();
        rig.fighter.health = 12.0;
        rig.fighter.super_meter = 40.0;
        rig.fighter.combo_count = 3;
        rig.fighter.start_attack(AttackId::Tatsumaki, &rig.table);
        rig.fighter.input_buffer.record(InputSymbol::Down, 1);
        rig.fighter.reset(300.0, &rig.stage);
        assert_eq!(rig.fighter.health, 100.0);
        assert_eq!(rig.fighter.super_meter, 0.0);
        assert_eq!(rig.fighter.combo_count, 0);
        assert_eq!(rig.fighter.state, FighterState::Idle);
        assert_eq!(rig.fighter.x, 300.0);
        assert!(rig.fighter.hitboxes.is_empty());
        assert!(rig.fighter.input_buffer.is_empty());
    }
}
