//! Fixed timestep simulation tick
//!
//! One tick runs, in order: player update and actions, enemy behavior,
//! projectile advance and collision, then zone transitions. Nothing later in
//! the tick can affect something earlier in the same tick.

use glam::Vec2;

use super::enemy::EnemyContext;
use super::hall::{HallFixture, transfer};
use super::player::MoveKeys;
use super::projectile::{
    KillEvent, spawn_player_shot, update_enemy_projectiles, update_player_projectiles,
};
use super::state::{GamePhase, GameState, Location};
use super::world::Area;
use crate::consts::*;

/// Move batteries between the backpack and the hall store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryTransfer {
    /// Backpack to store
    Deposit(u32),
    /// Store to backpack
    Withdraw(u32),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub keys: MoveKeys,
    /// Aim target in world coordinates (pointer)
    pub aim: Option<Vec2>,
    /// Fire a shot
    pub fire: bool,
    /// Activate the selected skill
    pub use_skill: bool,
    /// Use the gate or fixture in reach
    pub interact: bool,
    /// Pause toggle (menu)
    pub pause: bool,
    /// Battery transfer at the hall store
    pub transfer: Option<BatteryTransfer>,
}

impl TickInput {
    /// Drop the one-shot actions, keeping held keys and aim
    pub fn clear_actions(&mut self) {
        self.fire = false;
        self.use_skill = false;
        self.interact = false;
        self.pause = false;
        self.transfer = None;
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub kills: Vec<KillEvent>,
    /// Player shots that struck an enemy
    pub enemy_hits: u32,
    /// Enemy shots and contact hits that struck the player
    pub player_hits: u32,
    pub player_defeated: bool,
    pub zone_changed: bool,
    pub level_cleared: Option<u32>,
    pub respawned: bool,
}

impl TickOutcome {
    /// Fold a later tick's outcome into this one
    pub fn merge(&mut self, other: TickOutcome) {
        self.kills.extend(other.kills);
        self.enemy_hits += other.enemy_hits;
        self.player_hits += other.player_hits;
        self.player_defeated |= other.player_defeated;
        self.zone_changed |= other.zone_changed;
        self.level_cleared = self.level_cleared.or(other.level_cleared);
        self.respawned |= other.respawned;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return outcome;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver { .. } => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return outcome,
        GamePhase::GameOver { .. } => {
            state.time_ms += dt as f64 * 1000.0;
            state.time_ticks += 1;
            outcome.respawned = state.update_game_over();
            state.notices.expire(state.time_ms);
            return outcome;
        }
        GamePhase::Playing => {}
    }

    state.time_ms += dt as f64 * 1000.0;
    state.time_ticks += 1;
    let now = state.time_ms;

    update_player(state, input, dt, now);

    // Enemies
    let bounds = state.context_bounds();
    {
        let GameState {
            player,
            enemies,
            enemy_projectiles,
            hall,
            world,
            rng,
            tuning,
            location,
            ..
        } = state;
        let area = match location {
            Location::Hall => Area::Hall(hall),
            Location::World(_) => Area::World(world),
        };
        let mut ctx = EnemyContext {
            dt,
            now_ms: now,
            player,
            area,
            bounds,
            shots: enemy_projectiles,
            projectiles: &tuning.projectiles,
            rng,
        };
        for enemy in enemies.iter_mut() {
            let report = enemy.update(&mut ctx);
            if report.contact_hit {
                outcome.player_hits += 1;
            }
            outcome.player_defeated |= report.player_defeated;
        }
    }

    // Projectiles
    {
        let GameState {
            player,
            enemies,
            player_projectiles,
            enemy_projectiles,
            hall,
            world,
            tuning,
            location,
            ..
        } = state;
        let area = match location {
            Location::Hall => Area::Hall(hall),
            Location::World(_) => Area::World(world),
        };

        let report = update_player_projectiles(
            player_projectiles,
            dt,
            now,
            area,
            enemies,
            &tuning.projectiles,
        );
        outcome.enemy_hits += report.hits;
        for kill in &report.kills {
            log::debug!("Enemy {} ({:?}) killed", kill.enemy_id, kill.archetype);
            player.add_experience(kill.experience);
        }
        outcome.kills = report.kills;

        let report = update_enemy_projectiles(
            enemy_projectiles,
            dt,
            now,
            area,
            player,
            &tuning.projectiles,
        );
        outcome.player_hits += report.hits;
        outcome.player_defeated |= report.player_defeated;
    }

    if outcome.player_defeated {
        state.defeat();
        state.notices.expire(now);
        return outcome;
    }

    // Zone transitions
    outcome.level_cleared = state.settle_level();
    if input.interact {
        outcome.zone_changed = interact(state);
    }

    state.notices.expire(now);
    outcome
}

/// Movement, skill use, firing and battery transfer
fn update_player(state: &mut GameState, input: &TickInput, dt: f32, now: f64) {
    let bounds = state.context_bounds();
    let margin = state.player.collision_radius;
    let walled = state.area().is_walled();
    let before = state.player.pos;

    state.player.update(input.keys, input.aim, dt, now, bounds, margin);

    if input.use_skill {
        match state.player.activate_skill(now, bounds, margin) {
            Ok(kind) => {
                state.notices.push(kind.activation_notice(), now);
            }
            Err(err) => {
                if let Some(text) = err.notice() {
                    state.notices.push(text, now);
                }
            }
        }
    }

    // Hall walls stop the player; the move (or dash) is undone
    if walled && state.hall.is_wall(state.player.pos) {
        state.player.pos = before;
    }

    if input.fire {
        let aim = input
            .aim
            .map(|t| t - state.player.pos)
            .unwrap_or(state.player.last_direction);
        let result = spawn_player_shot(
            &mut state.player,
            aim,
            1.0,
            now,
            &state.tuning.projectiles,
            &mut state.player_projectiles,
        );
        if let Err(err) = result {
            if let Some(text) = err.notice() {
                state.notices.push(text, now);
            }
        }
    }

    if let Some(request) = input.transfer {
        transfer_batteries(state, request, now);
    }
}

/// Battery transfer; only works standing at the hall store
fn transfer_batteries(state: &mut GameState, request: BatteryTransfer, now: f64) {
    if state.location != Location::Hall
        || state.hall.fixture_near(state.player.pos) != Some(HallFixture::BatteryStorage)
    {
        return;
    }
    let text = match request {
        BatteryTransfer::Deposit(n) => {
            let moved = transfer(&mut state.player.backpack, &mut state.hall.storage, n);
            format!("{} batteries deposited", moved)
        }
        BatteryTransfer::Withdraw(n) => {
            let moved = transfer(&mut state.hall.storage, &mut state.player.backpack, n);
            format!("{} batteries withdrawn", moved)
        }
    };
    log::debug!("{}", text);
    state.notices.push(text, now);
}

/// Use whatever is in reach. Returns true if the player changed zone.
fn interact(state: &mut GameState) -> bool {
    let now = state.time_ms;
    match state.location {
        Location::Hall => match state.hall.fixture_near(state.player.pos) {
            Some(HallFixture::Gate) => {
                state.enter_world();
                true
            }
            Some(HallFixture::PropertyTree) => {
                let next = state.player.selected_skill.other();
                state.player.selected_skill = next;
                state.notices.push(format!("Switched to {}!", next.name()), now);
                false
            }
            Some(HallFixture::BatteryStorage) | None => false,
        },
        Location::World(_) => state.use_world_gate(),
    }
}

/// Fixed-step driver: feeds frame time into whole `SIM_DT` ticks
#[derive(Debug, Clone)]
pub struct Simulation {
    pub state: GameState,
    /// Input applied to the next ticks; one-shot actions are consumed by the
    /// first tick that sees them
    pub input: TickInput,
    accumulator: f32,
}

impl Simulation {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Run as many ticks as `frame_dt` (seconds) covers, at most
    /// `MAX_SUBSTEPS`. A partial tick carries into the next frame; time
    /// beyond the substep cap is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step = tick(&mut self.state, &self.input, SIM_DT);
            outcome.merge(step);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_actions();
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        outcome
    }

    /// Start over with a new seed
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        self.state = GameState::with_tuning(seed, tuning);
        self.accumulator = 0.0;
        self.input = TickInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hall::HallFixture;
    use crate::sim::world::ZoneId;

    fn at_fixture(state: &mut GameState, fixture: HallFixture) {
        state.player.pos = state.hall.fixture_pos(fixture);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        let t = state.time_ms;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ms, t);

        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.time_ms > t);
    }

    #[test]
    fn test_hall_gate_enters_level_one() {
        let mut state = GameState::new(1);
        at_fixture(&mut state, HallFixture::Gate);
        let input = TickInput {
            interact: true,
            ..Default::default()
        };
        let outcome = tick(&mut state, &input, SIM_DT);
        assert!(outcome.zone_changed);
        assert_eq!(state.location, Location::World(ZoneId::Level(1)));
        assert_eq!(state.enemies.len(), 3);
    }

    #[test]
    fn test_property_tree_switches_skill() {
        let mut state = GameState::new(1);
        at_fixture(&mut state, HallFixture::PropertyTree);
        let input = TickInput {
            interact: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.selected_skill.name(), "Double Damage");
        assert!(state.notices.contains("Switched to Double Damage!"));
    }

    #[test]
    fn test_battery_transfer_at_store() {
        let mut state = GameState::new(1);
        at_fixture(&mut state, HallFixture::BatteryStorage);
        let input = TickInput {
            transfer: Some(BatteryTransfer::Deposit(4)),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.backpack.stock, 6);
        assert_eq!(state.hall.storage.stock, 14);
        assert!(state.notices.contains("4 batteries deposited"));

        let input = TickInput {
            transfer: Some(BatteryTransfer::Withdraw(100)),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.backpack.stock, 20);
        assert_eq!(state.hall.storage.stock, 0);
        assert!(state.notices.contains("14 batteries withdrawn"));
    }

    #[test]
    fn test_transfer_ignored_away_from_store() {
        let mut state = GameState::new(1);
        let input = TickInput {
            transfer: Some(BatteryTransfer::Deposit(4)),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.backpack.stock, 10);
        assert!(state.notices.is_empty());
    }

    #[test]
    fn test_hall_wall_blocks_player() {
        let mut state = GameState::new(1);
        state.player.pos = Vec2::new(60.0, 300.0);
        let input = TickInput {
            keys: MoveKeys {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.player.pos.x >= 32.0);
        assert!(!state.hall.is_wall(state.player.pos));
    }

    #[test]
    fn test_simulation_substeps() {
        let mut sim = Simulation::new(GameState::new(1));
        sim.advance(SIM_DT * 3.5);
        assert_eq!(sim.state.time_ticks, 3);
        sim.advance(SIM_DT);
        assert_eq!(sim.state.time_ticks, 4);
        // Long frames are capped
        sim.advance(1.0);
        assert_eq!(sim.state.time_ticks, 4 + MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_slow_frames_leave_no_backlog() {
        let mut sim = Simulation::new(GameState::new(1));
        for _ in 0..100 {
            sim.advance(0.1);
        }
        // Back at 60 fps: about two ticks per frame, never a catch-up burst
        for _ in 0..60 {
            let before = sim.state.time_ticks;
            sim.advance(1.0 / 60.0);
            assert!(sim.state.time_ticks - before <= 3);
        }
    }

    #[test]
    fn test_simulation_consumes_one_shot_actions() {
        let mut sim = Simulation::new(GameState::new(1));
        sim.input.fire = true;
        sim.input.aim = Some(sim.state.player.pos + Vec2::X * 100.0);
        sim.advance(SIM_DT * 2.0);
        assert!(!sim.input.fire);
        assert_eq!(sim.state.player_projectiles.len(), 1);
    }

    #[test]
    fn test_determinism() {
        let run = |seed| {
            let mut state = GameState::new(seed);
            state.enter_world();
            let input = TickInput {
                keys: MoveKeys {
                    right: true,
                    ..Default::default()
                },
                ..Default::default()
            };
            for _ in 0..600 {
                tick(&mut state, &input, SIM_DT);
            }
            (
                state.player.pos,
                state.player.hp,
                state.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(99999), run(99999));
    }
}
