//! Enemy archetypes and their behavior state machines
//!
//! Every enemy shares a body (position, hp, hit flash, movement) and carries a
//! per-archetype brain. The behavior state is recomputed every tick from the
//! distance to the player, the hp fraction (boss) and the brain's timers.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cooldown::{Cooldown, Timer};
use super::player::Player;
use super::projectile::{Projectile, spawn_enemy_shot};
use super::world::{Area, Rect};
use crate::tuning::{BossTuning, MeleeTuning, ProjectileTuning, RangedTuning, Tuning};
use crate::{direction_to, distance, facing_angle, rotate};

/// Red hit flash after taking damage (visual only)
pub const HIT_FLASH_MS: f64 = 100.0;

/// Enemy behavior variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Melee,
    Ranged,
    Boss,
}

impl Archetype {
    /// Experience awarded for the kill
    pub fn experience(&self) -> u32 {
        match self {
            Archetype::Melee => 1,
            Archetype::Ranged => 3,
            Archetype::Boss => 10,
        }
    }
}

/// Discrete behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    #[default]
    Idle,
    Patrol,
    Chase,
    Approach,
    Attack,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    One,
    Two,
}

#[derive(Debug, Clone)]
pub struct MeleeBrain {
    pub chase_distance: f32,
    pub contact_damage: f32,
    pub contact_gate: Cooldown,
    pub charge_gate: Cooldown,
    pub charge: Timer,
    pub charge_duration_ms: f64,
    pub charge_speed_multiplier: f32,
}

#[derive(Debug, Clone)]
pub struct RangedBrain {
    pub patrol_distance: f32,
    pub min_distance: f32,
    pub shot_gate: Cooldown,
    pub shot_damage: f32,
    pub patrol_direction: Vec2,
    pub patrol_elapsed_ms: f64,
    pub patrol_duration_ms: f64,
    patrol_range_ms: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct BossBrain {
    pub phase: BossPhase,
    pub min_distance: f32,
    phase_two_threshold: f32,
    phase_two_cooldown_ms: f64,
    pub shot_gate: Cooldown,
    pub shot_damage: f32,
    pub burst_gate: Cooldown,
    /// Telegraph before a burst; the burst fires when it runs out
    pub warning: Timer,
    warning_ms: f64,
    burst_spread_deg: Vec<f32>,
}

/// Per-archetype state
#[derive(Debug, Clone)]
pub enum Brain {
    Melee(MeleeBrain),
    Ranged(RangedBrain),
    Boss(BossBrain),
}

/// Everything an enemy reads or writes during its update
pub struct EnemyContext<'a> {
    pub dt: f32,
    pub now_ms: f64,
    pub player: &'a mut Player,
    pub area: Area<'a>,
    /// Movement is clamped to these bounds
    pub bounds: Rect,
    pub shots: &'a mut Vec<Projectile>,
    pub projectiles: &'a ProjectileTuning,
    pub rng: &'a mut Pcg32,
}

impl EnemyContext<'_> {
    /// Spawn an enemy shot; false if the projectile cap refused it
    fn shoot(&mut self, origin: Vec2, dir: Vec2, damage: f32) -> bool {
        spawn_enemy_shot(origin, dir, damage, self.now_ms, self.projectiles, self.shots).is_ok()
    }
}

/// What an enemy's update did to the outside world
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyReport {
    /// Contact damage took the player to 0 hp
    pub player_defeated: bool,
    pub contact_hit: bool,
    pub shots_fired: u32,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Movement direction (unit or zero)
    pub direction: Vec2,
    /// Facing toward the player (radians)
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub collision_radius: f32,
    pub alive: bool,
    pub state: Behavior,
    pub hit_flash: Timer,
    pub brain: Brain,
}

impl Enemy {
    fn body(id: u32, pos: Vec2, hp: f32, speed: f32, collision_radius: f32, brain: Brain) -> Self {
        Self {
            id,
            pos,
            direction: Vec2::ZERO,
            angle: 0.0,
            hp,
            max_hp: hp,
            speed,
            collision_radius,
            alive: true,
            state: Behavior::Idle,
            hit_flash: Timer::default(),
            brain,
        }
    }

    pub fn melee(id: u32, pos: Vec2, t: &MeleeTuning) -> Self {
        let brain = MeleeBrain {
            chase_distance: t.chase_distance,
            contact_damage: t.contact_damage,
            contact_gate: Cooldown::new(t.contact_cooldown_ms),
            charge_gate: Cooldown::new(t.charge_cooldown_ms),
            charge: Timer::default(),
            charge_duration_ms: t.charge_duration_ms,
            charge_speed_multiplier: t.charge_speed_multiplier,
        };
        Self::body(id, pos, t.hp, t.speed, t.collision_radius, Brain::Melee(brain))
    }

    /// Ranged enemies start with a fixed patrol heading; later headings are
    /// re-rolled from the simulation RNG
    pub fn ranged(id: u32, pos: Vec2, t: &RangedTuning) -> Self {
        let brain = RangedBrain {
            patrol_distance: t.patrol_distance,
            min_distance: t.min_distance,
            shot_gate: Cooldown::new(t.shot_cooldown_ms),
            shot_damage: t.shot_damage,
            patrol_direction: Vec2::X,
            patrol_elapsed_ms: 0.0,
            patrol_duration_ms: t.patrol_min_ms,
            patrol_range_ms: (t.patrol_min_ms, t.patrol_max_ms),
        };
        Self::body(id, pos, t.hp, t.speed, t.collision_radius, Brain::Ranged(brain))
    }

    pub fn boss(id: u32, pos: Vec2, t: &BossTuning) -> Self {
        let brain = BossBrain {
            phase: BossPhase::One,
            min_distance: t.min_distance,
            phase_two_threshold: t.phase_two_threshold,
            phase_two_cooldown_ms: t.phase_two_cooldown_ms,
            shot_gate: Cooldown::new(t.phase_one_cooldown_ms),
            shot_damage: t.shot_damage,
            burst_gate: Cooldown::new(t.burst_cooldown_ms),
            warning: Timer::default(),
            warning_ms: t.burst_warning_ms,
            burst_spread_deg: t.burst_spread_deg.clone(),
        };
        Self::body(id, pos, t.hp, t.speed, t.collision_radius, Brain::Boss(brain))
    }

    pub fn spawn(id: u32, archetype: Archetype, pos: Vec2, tuning: &Tuning) -> Self {
        match archetype {
            Archetype::Melee => Self::melee(id, pos, &tuning.melee),
            Archetype::Ranged => Self::ranged(id, pos, &tuning.ranged),
            Archetype::Boss => Self::boss(id, pos, &tuning.boss),
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self.brain {
            Brain::Melee(_) => Archetype::Melee,
            Brain::Ranged(_) => Archetype::Ranged,
            Brain::Boss(_) => Archetype::Boss,
        }
    }

    /// Boss burst telegraph is showing
    pub fn warning_active(&self) -> bool {
        matches!(&self.brain, Brain::Boss(b) if b.warning.active())
    }

    pub fn boss_phase(&self) -> Option<BossPhase> {
        match &self.brain {
            Brain::Boss(b) => Some(b.phase),
            _ => None,
        }
    }

    /// Apply damage. Returns true exactly once: on the hit that kills.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        self.hit_flash.start(HIT_FLASH_MS);
        self.check_phase();
        if self.hp <= 0.0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// One-way boss transition into phase 2
    fn check_phase(&mut self) {
        let (hp, max_hp, id) = (self.hp, self.max_hp, self.id);
        if let Brain::Boss(b) = &mut self.brain {
            if b.phase == BossPhase::One && hp < max_hp * b.phase_two_threshold {
                b.phase = BossPhase::Two;
                b.shot_gate.duration_ms = b.phase_two_cooldown_ms;
                log::info!("Boss {} entered phase 2", id);
            }
        }
    }

    /// Run one tick of behavior. No-op for dead enemies.
    pub fn update(&mut self, ctx: &mut EnemyContext) -> EnemyReport {
        let mut report = EnemyReport::default();
        if !self.alive {
            return report;
        }
        let dt_ms = ctx.dt as f64 * 1000.0;
        let to_player = ctx.player.pos - self.pos;
        let dist = distance(self.pos, ctx.player.pos);
        let toward = direction_to(self.pos, ctx.player.pos);
        self.check_phase();

        let mut speed = self.speed;
        match &mut self.brain {
            Brain::Melee(b) => {
                let contact = self.collision_radius + ctx.player.collision_radius;
                if dist <= contact && b.contact_gate.try_fire(ctx.now_ms) {
                    report.contact_hit = true;
                    if !ctx.player.take_damage(b.contact_damage, ctx.now_ms) {
                        report.player_defeated = true;
                    }
                }

                self.state = if dist > b.chase_distance {
                    Behavior::Chase
                } else if dist > contact {
                    Behavior::Approach
                } else {
                    Behavior::Attack
                };

                if self.state == Behavior::Attack && b.charge_gate.try_fire(ctx.now_ms) {
                    b.charge.start(b.charge_duration_ms);
                }
                if b.charge.active() {
                    speed *= b.charge_speed_multiplier;
                }
                b.charge.tick(dt_ms);

                if dist > 0.0 {
                    self.direction = toward;
                }
            }
            Brain::Ranged(b) => {
                if dist > b.patrol_distance {
                    self.state = Behavior::Patrol;
                    b.patrol_elapsed_ms += dt_ms;
                    if b.patrol_elapsed_ms >= b.patrol_duration_ms {
                        b.patrol_direction = random_direction(ctx.rng);
                        b.patrol_elapsed_ms = 0.0;
                        let (lo, hi) = b.patrol_range_ms;
                        b.patrol_duration_ms = if hi > lo {
                            ctx.rng.random_range(lo..hi)
                        } else {
                            lo
                        };
                    }
                    self.direction = b.patrol_direction.normalize_or_zero();
                } else if dist < b.min_distance {
                    self.state = Behavior::Retreat;
                    self.direction = if dist > 0.0 {
                        -toward
                    } else {
                        random_direction(ctx.rng).normalize_or_zero()
                    };
                } else {
                    self.state = Behavior::Attack;
                    self.direction = Vec2::ZERO;
                    if dist > 0.0
                        && b.shot_gate.ready(ctx.now_ms)
                        && ctx.shoot(self.pos, toward, b.shot_damage)
                    {
                        b.shot_gate.fire(ctx.now_ms);
                        report.shots_fired += 1;
                    }
                }
            }
            Brain::Boss(b) => {
                if dist < b.min_distance {
                    self.state = Behavior::Retreat;
                    self.direction = if dist > 0.0 {
                        -toward
                    } else {
                        random_direction(ctx.rng).normalize_or_zero()
                    };
                } else {
                    self.state = Behavior::Attack;
                    self.direction = toward;
                }

                // A telegraphed burst goes off when its warning runs out
                if b.warning.tick(dt_ms) && dist > 0.0 {
                    for offset in &b.burst_spread_deg {
                        let dir = rotate(toward, offset.to_radians());
                        if !ctx.shoot(self.pos, dir, b.shot_damage) {
                            break;
                        }
                        report.shots_fired += 1;
                    }
                }

                if self.state == Behavior::Attack && dist > 0.0 {
                    let burst_ready = b.phase == BossPhase::Two && !b.warning.active();
                    if burst_ready && b.burst_gate.try_fire(ctx.now_ms) {
                        b.warning.start(b.warning_ms);
                    } else if b.shot_gate.ready(ctx.now_ms)
                        && ctx.shoot(self.pos, toward, b.shot_damage)
                    {
                        b.shot_gate.fire(ctx.now_ms);
                        report.shots_fired += 1;
                    }
                }
            }
        }

        if to_player != Vec2::ZERO {
            self.angle = facing_angle(to_player);
        }
        self.hit_flash.tick(dt_ms);
        self.step(speed, ctx.dt, &ctx.area, ctx.bounds);
        report
    }

    /// Move along `direction`; a move ending in a wall tile is cancelled
    fn step(&mut self, speed: f32, dt: f32, area: &Area, bounds: Rect) {
        let next = self.pos + self.direction * speed * dt;
        if area.is_walled() && area.is_wall(next) {
            return;
        }
        self.pos = bounds.clamp(next, 0.0);
    }
}

/// Uniform heading in [-1, 1]^2, not normalized
fn random_direction(rng: &mut Pcg32) -> Vec2 {
    Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
}
