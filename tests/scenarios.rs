//! End-to-end scenarios driven through `tick`

use glam::Vec2;
use z2h::consts::SIM_DT;
use z2h::sim::{
    Archetype, GamePhase, GameState, Location, Projectile, Side, TickInput, ZoneId, tick,
};

fn fire_at(target: Vec2) -> TickInput {
    TickInput {
        fire: true,
        aim: Some(target),
        ..Default::default()
    }
}

fn interact() -> TickInput {
    TickInput {
        interact: true,
        ..Default::default()
    }
}

#[test]
fn test_last_shot_then_energy_notice_once() {
    let mut state = GameState::new(1);
    state.player.energy = 4.0;
    state.player.energy_recovery_rate = 0.0;
    let target = state.player.pos + Vec2::new(100.0, 0.0);

    tick(&mut state, &fire_at(target), SIM_DT);
    assert_eq!(state.player.energy, 0.0);
    assert_eq!(state.player_projectiles.len(), 1);

    tick(&mut state, &fire_at(target), SIM_DT);
    tick(&mut state, &fire_at(target), SIM_DT);
    assert_eq!(state.player.energy, 0.0);
    assert_eq!(state.player_projectiles.len(), 1);
    let notices = state
        .notices
        .iter()
        .filter(|n| n.text == "Not enough energy!")
        .count();
    assert_eq!(notices, 1);
}

#[test]
fn test_melee_contact_respects_window() {
    let mut state = GameState::new(2);
    state.enter_world();
    state.enemies.truncate(1);
    state.enemies[0].pos = state.player.pos + Vec2::new(10.0, 0.0);

    let mut hit_times = Vec::new();
    for _ in 0..240 {
        let outcome = tick(&mut state, &TickInput::default(), SIM_DT);
        if outcome.player_hits > 0 {
            hit_times.push(state.time_ms);
        }
    }
    assert_eq!(hit_times.len(), 2);
    assert!(hit_times[1] - hit_times[0] >= 1000.0);
    assert!(state.player.is_alive());
}

#[test]
fn test_contact_and_shot_land_in_same_tick() {
    let mut state = GameState::new(6);
    state.enter_world();
    state.enemies.truncate(1);
    state.enemies[0].pos = state.player.pos + Vec2::new(10.0, 0.0);
    // No armor to absorb either hit
    state.player.armor = 0.0;
    state.player.max_armor = 0.0;
    state.enemy_projectiles.push(Projectile::new(
        Side::Enemy,
        state.player.pos,
        Vec2::X,
        0.0,
        3.0,
        10.0,
        state.time_ms,
    ));

    let outcome = tick(&mut state, &TickInput::default(), SIM_DT);
    assert_eq!(outcome.player_hits, 2);
    assert!(!outcome.player_defeated);
    // 2 contact + 3 shot
    assert_eq!(state.player.hp, state.player.max_hp - 5.0);
    assert!(state.enemy_projectiles.is_empty());
}

#[test]
fn test_corridor_gate_needs_cleared_level() {
    let mut state = GameState::new(3);
    state.enter_world();
    let l1 = state.world.level(1).unwrap().bounds;
    let mid_y = l1.center().y;

    // Level 1 exit into the corridor
    state.player.pos = Vec2::new(l1.max.x - 20.0, mid_y);
    let outcome = tick(&mut state, &interact(), SIM_DT);
    assert!(outcome.zone_changed);
    assert_eq!(state.location, Location::World(ZoneId::Corridor { from: 1 }));
    assert!(state.enemies.is_empty());

    // Forward end is locked
    let c = state.world.corridor(1).unwrap().bounds;
    state.player.pos = Vec2::new(c.max.x - 20.0, mid_y);
    let outcome = tick(&mut state, &interact(), SIM_DT);
    assert!(!outcome.zone_changed);
    assert!(state.notices.contains("Clear all enemies to proceed!"));

    // Back into level 1: the roster is waiting again
    state.player.pos = Vec2::new(c.min.x + 20.0, mid_y);
    tick(&mut state, &interact(), SIM_DT);
    assert_eq!(state.location, Location::World(ZoneId::Level(1)));
    assert_eq!(state.enemies.len(), 3);

    for enemy in &mut state.enemies {
        enemy.take_damage(100.0);
    }
    let outcome = tick(&mut state, &TickInput::default(), SIM_DT);
    assert_eq!(outcome.level_cleared, Some(1));
    assert!(state.notices.contains("Level 1 cleared!"));

    state.player.pos = Vec2::new(l1.max.x - 20.0, mid_y);
    tick(&mut state, &interact(), SIM_DT);
    state.player.pos = Vec2::new(c.max.x - 20.0, mid_y);
    tick(&mut state, &interact(), SIM_DT);
    assert_eq!(state.location, Location::World(ZoneId::Level(2)));
    assert!(state.enemies.iter().any(|e| e.archetype() == Archetype::Boss));
    assert!(state.player_projectiles.is_empty() && state.enemy_projectiles.is_empty());
}

#[test]
fn test_kill_banks_experience_on_clear() {
    let mut state = GameState::new(4);
    state.enter_world();
    state.enemies.truncate(1);
    state.enemies[0].pos = state.player.pos + Vec2::new(150.0, 0.0);
    state.enemies[0].hp = 1.0;

    let mut cleared = None;
    let mut kills = 0;
    for _ in 0..120 {
        let target = state.enemies.first().map(|e| e.pos).unwrap_or(Vec2::ZERO);
        let outcome = tick(&mut state, &fire_at(target), SIM_DT);
        kills += outcome.kills.len();
        if outcome.level_cleared.is_some() {
            cleared = outcome.level_cleared;
            break;
        }
    }
    assert_eq!(kills, 1);
    assert_eq!(cleared, Some(1));
    assert_eq!(state.player.experience, 1);
    assert!(state.world.is_cleared(1));
}

#[test]
fn test_defeat_resets_to_hall() {
    let mut state = GameState::new(5);
    state.enter_world();
    state.enemies.clear();
    state.player.add_experience(7);
    state.player.armor = 0.0;
    state.player.hp = 1.0;
    state.enemy_projectiles.push(Projectile::new(
        Side::Enemy,
        state.player.pos,
        Vec2::X,
        0.0,
        2.0,
        10.0,
        state.time_ms,
    ));

    let outcome = tick(&mut state, &TickInput::default(), SIM_DT);
    assert!(outcome.player_defeated);
    assert!(matches!(state.phase, GamePhase::GameOver { .. }));

    let mut respawned = false;
    for _ in 0..200 {
        if tick(&mut state, &TickInput::default(), SIM_DT).respawned {
            respawned = true;
            break;
        }
    }
    assert!(respawned);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.location, Location::Hall);
    assert_eq!(state.player.hp, state.player.max_hp);
    assert_eq!(state.player.level_experience, 0);
    assert_eq!(state.player.experience, 0);
    assert!(!state.world.is_cleared(1));
}
