//! Projectile spawning, movement, culling and hit resolution
//!
//! Projectiles live in two collections owned by the game state, one per side.
//! Each tick a collection is advanced and resolved in a single pass:
//!
//! 1. advance (`pos += vel * dt`) and drop expired shots
//! 2. drop shots that entered a safe corridor
//! 3. drop shots that left the valid area
//! 4. enemy shots test the player, player shots test live enemies (first hit
//!    only)
//! 5. shots inside a hall wall tile are spent
//!
//! A shot that is spent in step 4 is never tested again, so it damages at most
//! one target.

use glam::Vec2;

use super::enemy::{Archetype, Enemy};
use super::error::{CombatError, CombatResult};
use super::player::Player;
use super::world::Area;
use crate::circles_overlap;
use crate::facing_angle;
use crate::tuning::ProjectileTuning;

/// Which side fired a projectile (and therefore which side it can hurt)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    /// Velocity (units/s)
    pub vel: Vec2,
    /// Presentation angle (radians)
    pub angle: f32,
    pub spawned_at: f64,
    pub damage: f32,
    pub radius: f32,
    /// Cleared when the shot is spent; spent shots are removed the same tick
    pub visible: bool,
    pub side: Side,
}

impl Projectile {
    pub fn new(
        side: Side,
        pos: Vec2,
        dir: Vec2,
        speed: f32,
        damage: f32,
        radius: f32,
        now_ms: f64,
    ) -> Self {
        Self {
            pos,
            vel: dir * speed,
            angle: facing_angle(dir),
            spawned_at: now_ms,
            damage,
            radius,
            visible: true,
            side,
        }
    }

    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    #[inline]
    pub fn expired(&self, now_ms: f64, lifetime_ms: f64) -> bool {
        now_ms - self.spawned_at > lifetime_ms
    }
}

/// A player shot killed an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillEvent {
    pub enemy_id: u32,
    pub archetype: Archetype,
    pub experience: u32,
    pub pos: Vec2,
}

/// Outcome of resolving one projectile collection for one tick
#[derive(Debug, Clone, Default)]
pub struct ProjectileReport {
    /// Shots that struck a target
    pub hits: u32,
    pub kills: Vec<KillEvent>,
    /// An enemy shot took the player to 0 hp
    pub player_defeated: bool,
}

/// Fire a player shot toward `aim` (need not be normalized).
///
/// Refused with `InsufficientEnergy` whenever the player cannot pay the shot
/// cost, cooldown or not, so an empty pool is always reported. Otherwise
/// refused silently while the shot cooldown runs. A refused shot spends no
/// energy.
pub fn spawn_player_shot(
    player: &mut Player,
    aim: Vec2,
    speed_multiplier: f32,
    now_ms: f64,
    tuning: &ProjectileTuning,
    sink: &mut Vec<Projectile>,
) -> CombatResult<()> {
    if player.energy < player.shot_cost {
        return Err(CombatError::InsufficientEnergy {
            available: player.energy,
            required: player.shot_cost,
        });
    }
    if !player.shot_gate.ready(now_ms) {
        return Err(CombatError::ShotCooldown);
    }
    let dir = aim.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Err(CombatError::NoAimDirection);
    }
    player.use_energy(player.shot_cost)?;

    sink.push(Projectile::new(
        Side::Player,
        player.pos,
        dir,
        tuning.player_speed * speed_multiplier,
        tuning.player_damage * player.damage_multiplier,
        tuning.radius,
        now_ms,
    ));
    player.shot_gate.fire(now_ms);
    Ok(())
}

/// Queue an enemy shot, refusing once the collection holds `enemy_cap` shots
pub fn spawn_enemy_shot(
    origin: Vec2,
    dir: Vec2,
    damage: f32,
    now_ms: f64,
    tuning: &ProjectileTuning,
    sink: &mut Vec<Projectile>,
) -> CombatResult<()> {
    if sink.len() >= tuning.enemy_cap {
        return Err(CombatError::ProjectileCap {
            limit: tuning.enemy_cap,
        });
    }
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Err(CombatError::NoAimDirection);
    }
    sink.push(Projectile::new(
        Side::Enemy,
        origin,
        dir,
        tuning.enemy_speed,
        damage,
        tuning.radius,
        now_ms,
    ));
    Ok(())
}

/// Move the shot and decide whether it survives the tick
fn advance_and_cull(
    p: &mut Projectile,
    dt: f32,
    now_ms: f64,
    lifetime_ms: f64,
    area: &Area,
) -> bool {
    p.advance(dt);
    !p.expired(now_ms, lifetime_ms) && !area.is_safe(p.pos) && area.contains(p.pos)
}

/// Advance and resolve enemy shots against the player
pub fn update_enemy_projectiles(
    projectiles: &mut Vec<Projectile>,
    dt: f32,
    now_ms: f64,
    area: Area,
    player: &mut Player,
    tuning: &ProjectileTuning,
) -> ProjectileReport {
    let mut report = ProjectileReport::default();

    projectiles.retain_mut(|p| {
        if !advance_and_cull(p, dt, now_ms, tuning.lifetime_ms, &area) {
            return false;
        }
        if player.is_alive()
            && circles_overlap(p.pos, p.radius, player.pos, player.collision_radius)
        {
            if !player.take_damage(p.damage, now_ms) {
                report.player_defeated = true;
            }
            report.hits += 1;
            p.visible = false;
        }
        if p.visible && area.is_walled() && area.is_wall(p.pos) {
            p.visible = false;
        }
        p.visible
    });

    report
}

/// Advance and resolve player shots against live enemies
pub fn update_player_projectiles(
    projectiles: &mut Vec<Projectile>,
    dt: f32,
    now_ms: f64,
    area: Area,
    enemies: &mut [Enemy],
    tuning: &ProjectileTuning,
) -> ProjectileReport {
    let mut report = ProjectileReport::default();

    projectiles.retain_mut(|p| {
        if !advance_and_cull(p, dt, now_ms, tuning.lifetime_ms, &area) {
            return false;
        }
        let target = enemies
            .iter_mut()
            .filter(|e| e.alive)
            .find(|e| circles_overlap(p.pos, p.radius, e.pos, e.collision_radius));
        if let Some(enemy) = target {
            p.visible = false;
            report.hits += 1;
            if enemy.take_damage(p.damage) {
                let archetype = enemy.archetype();
                report.kills.push(KillEvent {
                    enemy_id: enemy.id,
                    archetype,
                    experience: archetype.experience(),
                    pos: enemy.pos,
                });
            }
        }
        if p.visible && area.is_walled() && area.is_wall(p.pos) {
            p.visible = false;
        }
        p.visible
    });

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hall::{BatteryStore, StartHall};
    use crate::sim::world::World;
    use crate::tuning::{PlayerTuning, Tuning, WorldTuning};
    use proptest::prelude::*;

    fn player_at(pos: Vec2) -> Player {
        let mut p = Player::new(&PlayerTuning::default());
        p.pos = pos;
        p
    }

    fn world() -> World {
        World::new(&WorldTuning::default())
    }

    #[test]
    fn test_player_shot_costs_energy_and_scales_damage() {
        let tuning = ProjectileTuning::default();
        let mut player = player_at(Vec2::new(100.0, 100.0));
        player.damage_multiplier = 2.0;
        let mut shots = Vec::new();

        spawn_player_shot(&mut player, Vec2::new(3.0, 4.0), 1.0, 0.0, &tuning, &mut shots).unwrap();
        assert_eq!(shots.len(), 1);
        assert_eq!(player.energy, 96.0);
        assert_eq!(shots[0].damage, 2.0);
        assert!((shots[0].vel.length() - tuning.player_speed).abs() < 1e-3);
        assert!((shots[0].angle - 4.0f32.atan2(3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_player_shot_cooldown_is_silent() {
        let tuning = ProjectileTuning::default();
        let mut player = player_at(Vec2::ZERO);
        let mut shots = Vec::new();
        spawn_player_shot(&mut player, Vec2::X, 1.0, 0.0, &tuning, &mut shots).unwrap();
        let err =
            spawn_player_shot(&mut player, Vec2::X, 1.0, 100.0, &tuning, &mut shots).unwrap_err();
        assert_eq!(err, CombatError::ShotCooldown);
        assert_eq!(err.notice(), None);
        assert_eq!(shots.len(), 1);
        assert!(spawn_player_shot(&mut player, Vec2::X, 1.0, 250.0, &tuning, &mut shots).is_ok());
    }

    #[test]
    fn test_empty_pool_reported_during_cooldown() {
        let tuning = ProjectileTuning::default();
        let mut player = player_at(Vec2::ZERO);
        player.energy = 4.0;
        let mut shots = Vec::new();
        spawn_player_shot(&mut player, Vec2::X, 1.0, 0.0, &tuning, &mut shots).unwrap();
        assert_eq!(player.energy, 0.0);
        let err =
            spawn_player_shot(&mut player, Vec2::X, 1.0, 1.0, &tuning, &mut shots).unwrap_err();
        assert_eq!(err.notice(), Some("Not enough energy!"));
        assert_eq!(shots.len(), 1);
        assert_eq!(player.energy, 0.0);
    }

    #[test]
    fn test_enemy_shot_cap() {
        let tuning = ProjectileTuning::default();
        let mut shots = Vec::new();
        for _ in 0..tuning.enemy_cap {
            spawn_enemy_shot(Vec2::ZERO, Vec2::X, 2.0, 0.0, &tuning, &mut shots).unwrap();
        }
        assert_eq!(
            spawn_enemy_shot(Vec2::ZERO, Vec2::X, 2.0, 0.0, &tuning, &mut shots),
            Err(CombatError::ProjectileCap { limit: 50 })
        );
        assert_eq!(shots.len(), 50);
    }

    #[test]
    fn test_enemy_shot_hits_player_once() {
        let tuning = ProjectileTuning::default();
        let w = world();
        let mut player = player_at(Vec2::new(500.0, 500.0));
        let mut shots = vec![Projectile::new(
            Side::Enemy,
            Vec2::new(470.0, 500.0),
            Vec2::X,
            300.0,
            2.0,
            10.0,
            0.0,
        )];
        let area = Area::World(&w);
        let report = update_enemy_projectiles(&mut shots, 0.01, 10.0, area, &mut player, &tuning);
        assert_eq!(report.hits, 1);
        assert!(!report.player_defeated);
        assert!(shots.is_empty());
        assert_eq!(player.armor, 3.0);
        assert_eq!(player.hp, 10.0);
    }

    #[test]
    fn test_enemy_shot_reports_defeat() {
        let tuning = ProjectileTuning::default();
        let w = world();
        let mut player = player_at(Vec2::new(500.0, 500.0));
        player.armor = 0.0;
        player.hp = 1.0;
        let mut shots = vec![Projectile::new(
            Side::Enemy,
            player.pos,
            Vec2::X,
            0.0,
            2.0,
            10.0,
            0.0,
        )];
        let area = Area::World(&w);
        let report = update_enemy_projectiles(&mut shots, 0.01, 10.0, area, &mut player, &tuning);
        assert!(report.player_defeated);
        assert_eq!(player.hp, 0.0);
    }

    #[test]
    fn test_player_shot_damages_only_first_enemy() {
        let tuning = Tuning::default();
        let w = world();
        let pos = Vec2::new(800.0, 800.0);
        let mut enemies = vec![
            Enemy::spawn(1, Archetype::Melee, pos, &tuning),
            Enemy::spawn(2, Archetype::Melee, pos, &tuning),
        ];
        let mut shots = vec![Projectile::new(Side::Player, pos, Vec2::X, 0.0, 1.0, 10.0, 0.0)];
        let report = update_player_projectiles(
            &mut shots,
            0.01,
            10.0,
            Area::World(&w),
            &mut enemies,
            &tuning.projectiles,
        );
        assert_eq!(report.hits, 1);
        assert_eq!(enemies[0].hp, 3.0);
        assert_eq!(enemies[1].hp, 4.0);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_kill_event_carries_experience() {
        let tuning = Tuning::default();
        let w = world();
        let pos = Vec2::new(800.0, 800.0);
        let mut enemies = vec![Enemy::spawn(7, Archetype::Ranged, pos, &tuning)];
        enemies[0].hp = 1.0;
        let mut shots = vec![
            Projectile::new(Side::Player, pos, Vec2::X, 0.0, 1.0, 10.0, 0.0),
            Projectile::new(Side::Player, pos, Vec2::X, 0.0, 1.0, 10.0, 0.0),
        ];
        let report = update_player_projectiles(
            &mut shots,
            0.01,
            10.0,
            Area::World(&w),
            &mut enemies,
            &tuning.projectiles,
        );
        assert_eq!(report.kills.len(), 1);
        assert_eq!(report.kills[0].enemy_id, 7);
        assert_eq!(report.kills[0].experience, 3);
        // The second shot passes through the corpse
        assert_eq!(report.hits, 1);
        assert_eq!(shots.len(), 1);
    }

    #[test]
    fn test_shot_removed_on_the_tick_it_enters_a_corridor() {
        let tuning = ProjectileTuning::default();
        let w = world();
        let edge = w.corridor(1).unwrap().bounds.min.x;
        let mut player = player_at(Vec2::new(100.0, 100.0));
        let mut shots = vec![Projectile::new(
            Side::Enemy,
            Vec2::new(edge - 2.0, 500.0),
            Vec2::X,
            300.0,
            2.0,
            10.0,
            0.0,
        )];
        let dt = 1.0 / 120.0;
        let area = Area::World(&w);
        let report = update_enemy_projectiles(&mut shots, dt, 8.0, area, &mut player, &tuning);
        assert_eq!(report.hits, 0);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_shot_out_of_bounds_and_expired() {
        let tuning = ProjectileTuning::default();
        let w = world();
        let mut player = player_at(Vec2::new(2000.0, 1000.0));
        let mut shots = vec![
            Projectile::new(Side::Enemy, Vec2::new(1.0, 500.0), -Vec2::X, 300.0, 2.0, 10.0, 0.0),
            Projectile::new(Side::Enemy, Vec2::new(500.0, 500.0), Vec2::Y, 1.0, 2.0, 10.0, 0.0),
        ];
        update_enemy_projectiles(&mut shots, 0.1, 3001.0, Area::World(&w), &mut player, &tuning);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_hall_wall_spends_shot() {
        let tuning = ProjectileTuning::default();
        let hall = StartHall::new(1280.0, 720.0, 32.0, BatteryStore::new(10, 128));
        let mut player = player_at(hall.center());
        let mut shots = vec![Projectile::new(
            Side::Enemy,
            Vec2::new(40.0, 300.0),
            -Vec2::X,
            300.0,
            2.0,
            10.0,
            0.0,
        )];
        // 40 - 300*0.05 = 25: inside the left wall column
        update_enemy_projectiles(&mut shots, 0.05, 50.0, Area::Hall(&hall), &mut player, &tuning);
        assert!(shots.is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_drift_without_collisions(
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
            n in 1u32..60,
        ) {
            let start = Vec2::new(5000.0, 1000.0);
            let mut p = Projectile::new(Side::Player, start, Vec2::X, 0.0, 1.0, 10.0, 0.0);
            p.vel = Vec2::new(vx, vy);
            let dt = 1.0 / 120.0;
            let mut expected = p.pos;
            for _ in 0..n {
                p.advance(dt);
                expected += p.vel * dt;
            }
            prop_assert_eq!(p.pos, expected);
            let approx = Vec2::new(5000.0, 1000.0) + p.vel * dt * n as f32;
            prop_assert!((p.pos - approx).length() < 0.05);
        }
    }
}
