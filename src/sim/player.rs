//! Player controller: movement, aiming, resources and skills

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cooldown::{Cooldown, Timer};
use super::error::{CombatError, CombatResult};
use super::hall::BatteryStore;
use super::world::Rect;
use crate::facing_angle;
use crate::tuning::{PlayerTuning, SkillTuning};

/// Held movement keys for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Sum of the held directions (not normalized)
    pub fn vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Instant jump along the last movement/aim direction
    Dash,
    /// Timed damage multiplier
    DoubleDamage,
}

impl SkillKind {
    pub fn activation_notice(&self) -> &'static str {
        match self {
            SkillKind::Dash => "Dash!",
            SkillKind::DoubleDamage => "Double Damage activated!",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillKind::Dash => "Dash",
            SkillKind::DoubleDamage => "Double Damage",
        }
    }

    pub fn other(&self) -> SkillKind {
        match self {
            SkillKind::Dash => SkillKind::DoubleDamage,
            SkillKind::DoubleDamage => SkillKind::Dash,
        }
    }
}

/// A player-held ability
#[derive(Debug, Clone)]
pub struct Skill {
    pub kind: SkillKind,
    pub energy_cost: f32,
    pub duration_ms: f64,
    /// Dash distance or damage multiplier
    pub magnitude: f32,
    pub gate: Cooldown,
    pub timer: Timer,
}

impl Skill {
    pub fn new(kind: SkillKind, tuning: &SkillTuning) -> Self {
        Self {
            kind,
            energy_cost: tuning.energy_cost,
            duration_ms: tuning.duration_ms,
            magnitude: tuning.magnitude,
            gate: Cooldown::new(tuning.cooldown_ms),
            timer: Timer::default(),
        }
    }

    pub fn active(&self) -> bool {
        self.timer.active()
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Current movement direction (unit or zero)
    pub direction: Vec2,
    /// Last non-zero movement or aim direction; dashes follow it
    pub last_direction: Vec2,
    /// Facing (radians)
    pub angle: f32,
    pub move_speed: f32,
    pub collision_radius: f32,

    pub hp: f32,
    pub max_hp: f32,
    pub armor: f32,
    pub max_armor: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub energy_recovery_rate: f32,

    pub shot_cost: f32,
    pub shot_gate: Cooldown,
    /// Multiplies outgoing shot damage (Double Damage)
    pub damage_multiplier: f32,

    last_damage_at: Option<f64>,
    armor_regen_delay_ms: f64,
    armor_gate: Cooldown,

    pub skills: Vec<Skill>,
    pub selected_skill: SkillKind,

    pub backpack: BatteryStore,
    /// Banked experience
    pub experience: u32,
    /// Experience earned since the last bank; lost on defeat
    pub level_experience: u32,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            direction: Vec2::ZERO,
            last_direction: Vec2::X,
            angle: 0.0,
            move_speed: tuning.move_speed,
            collision_radius: tuning.collision_radius,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            armor: tuning.max_armor,
            max_armor: tuning.max_armor,
            energy: tuning.max_energy,
            max_energy: tuning.max_energy,
            energy_recovery_rate: tuning.energy_recovery_rate,
            shot_cost: tuning.shot_cost,
            shot_gate: Cooldown::new(tuning.shot_cooldown_ms),
            damage_multiplier: 1.0,
            last_damage_at: None,
            armor_regen_delay_ms: tuning.armor_regen_delay_ms,
            armor_gate: Cooldown::new(tuning.armor_regen_interval_ms),
            skills: vec![
                Skill::new(SkillKind::Dash, &tuning.dash),
                Skill::new(SkillKind::DoubleDamage, &tuning.double_damage),
            ],
            selected_skill: SkillKind::Dash,
            backpack: BatteryStore::new(tuning.starting_batteries, tuning.backpack_capacity),
            experience: 0,
            level_experience: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Advance movement, aim, skill timers and regeneration by one tick.
    ///
    /// `aim` is a world-space target; when present it drives facing and the
    /// dash direction independently of movement.
    pub fn update(
        &mut self,
        keys: MoveKeys,
        aim: Option<Vec2>,
        dt: f32,
        now_ms: f64,
        bounds: Rect,
        margin: f32,
    ) {
        self.tick_skills(dt as f64 * 1000.0);

        let input = keys.vector();
        if input != Vec2::ZERO {
            self.direction = input.normalize();
            self.last_direction = self.direction;
            self.pos = bounds.clamp(self.pos + self.direction * self.move_speed * dt, margin);
        } else {
            self.direction = Vec2::ZERO;
        }

        let aim_dir = aim.map(|t| (t - self.pos).normalize_or_zero());
        match aim_dir {
            Some(dir) if dir != Vec2::ZERO => {
                self.angle = facing_angle(dir);
                self.last_direction = dir;
            }
            Some(_) => {}
            None if self.direction != Vec2::ZERO => self.angle = facing_angle(self.direction),
            None => {}
        }

        self.recover_energy(self.energy_recovery_rate * dt);
        self.regenerate_armor(now_ms);
    }

    /// Spend `cost` energy, all or nothing
    pub fn use_energy(&mut self, cost: f32) -> CombatResult<()> {
        if self.energy >= cost {
            self.energy -= cost;
            Ok(())
        } else {
            Err(CombatError::InsufficientEnergy {
                available: self.energy,
                required: cost,
            })
        }
    }

    pub fn recover_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Apply damage, armor first. Returns whether the player is still alive.
    pub fn take_damage(&mut self, amount: f32, now_ms: f64) -> bool {
        self.last_damage_at = Some(now_ms);
        let absorbed = amount.min(self.armor);
        self.armor -= absorbed;
        let rest = amount - absorbed;
        if rest > 0.0 {
            self.hp = (self.hp - rest).max(0.0);
        }
        log::debug!("Player hit for {}: hp={} armor={}", amount, self.hp, self.armor);
        self.is_alive()
    }

    fn regenerate_armor(&mut self, now_ms: f64) {
        if self.armor >= self.max_armor {
            return;
        }
        let quiet = self
            .last_damage_at
            .is_none_or(|t| now_ms - t >= self.armor_regen_delay_ms);
        if quiet && self.armor_gate.try_fire(now_ms) {
            self.armor = (self.armor + 1.0).min(self.max_armor);
        }
    }

    pub fn active_skill(&self) -> Option<SkillKind> {
        self.skills.iter().find(|s| s.active()).map(|s| s.kind)
    }

    /// Activate the selected skill
    pub fn activate_skill(
        &mut self,
        now_ms: f64,
        bounds: Rect,
        margin: f32,
    ) -> CombatResult<SkillKind> {
        if self.active_skill().is_some() {
            return Err(CombatError::SkillActive);
        }
        let kind = self.selected_skill;
        let Some(idx) = self.skills.iter().position(|s| s.kind == kind) else {
            return Err(CombatError::SkillActive);
        };

        let remaining_ms = self.skills[idx].gate.remaining(now_ms);
        if remaining_ms > 0.0 {
            return Err(CombatError::SkillCooldown { remaining_ms });
        }
        self.use_energy(self.skills[idx].energy_cost)?;

        let skill = &mut self.skills[idx];
        skill.gate.fire(now_ms);
        skill.timer.start(skill.duration_ms);
        let magnitude = skill.magnitude;

        match kind {
            SkillKind::Dash => {
                self.pos = bounds.clamp(self.pos + self.last_direction * magnitude, margin);
            }
            SkillKind::DoubleDamage => {
                self.damage_multiplier = magnitude;
            }
        }
        log::debug!("Skill {} activated", kind.name());
        Ok(kind)
    }

    /// Count skill timers down and revert expired effects
    fn tick_skills(&mut self, dt_ms: f64) {
        for skill in &mut self.skills {
            if skill.timer.tick(dt_ms) && skill.kind == SkillKind::DoubleDamage {
                self.damage_multiplier = 1.0;
            }
        }
    }

    pub fn add_experience(&mut self, amount: u32) {
        self.level_experience += amount;
    }

    /// Move unbanked experience into the total
    pub fn bank_experience(&mut self) {
        self.experience += self.level_experience;
        self.level_experience = 0;
    }

    pub fn forfeit_experience(&mut self) {
        if self.level_experience > 0 {
            log::info!("Lost {} unbanked experience", self.level_experience);
        }
        self.level_experience = 0;
    }

    /// Full resources at `pos`, skills and timers reset
    pub fn respawn(&mut self, pos: Vec2, tuning: &PlayerTuning) {
        let experience = self.experience;
        *self = Player::new(tuning);
        self.pos = pos;
        self.experience = experience;
    }

    /// Refill hp, armor and energy (entering the world)
    pub fn restore(&mut self) {
        self.hp = self.max_hp;
        self.armor = self.max_armor;
        self.energy = self.max_energy;
    }
}
