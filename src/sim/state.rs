//! Game state and zone transitions
//!
//! Everything the simulation mutates lives on `GameState`: the player, the
//! enemy roster, both projectile collections, the hall and the world. Nothing
//! is global; the tick borrows what each subsystem needs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::enemy::Enemy;
use super::hall::{BatteryStore, StartHall};
use super::player::Player;
use super::projectile::Projectile;
use super::world::{Area, GateOutcome, Rect, World, ZoneId};
use crate::consts::*;
use crate::notices::Notices;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen (menu open)
    Paused,
    /// Player defeated at `since_ms`; resets after a short delay
    GameOver { since_ms: f64 },
}

/// Which context the player is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Hall,
    World(ZoneId),
}

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded source for spawn positions and enemy wandering
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation clock (ms)
    pub time_ms: f64,
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub location: Location,
    pub player: Player,
    /// Live roster of the current level, ordered by id
    pub enemies: Vec<Enemy>,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub hall: StartHall,
    pub world: World,
    pub notices: Notices,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let hall = StartHall::new(
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            TILE_SIZE,
            BatteryStore::new(
                tuning.world.hall_starting_batteries,
                tuning.world.hall_battery_capacity,
            ),
        );
        let mut player = Player::new(&tuning.player);
        player.pos = hall.center();

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world: World::new(&tuning.world),
            notices: Notices::new(tuning.notices.clone()),
            tuning,
            time_ms: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            location: Location::Hall,
            player,
            enemies: Vec::new(),
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            hall,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn area(&self) -> Area<'_> {
        match self.location {
            Location::Hall => Area::Hall(&self.hall),
            Location::World(_) => Area::World(&self.world),
        }
    }

    /// Rectangle the player (and the current roster) is confined to
    pub fn context_bounds(&self) -> Rect {
        match self.location {
            Location::Hall => self.hall.bounds(),
            Location::World(zone) => self
                .world
                .zone_bounds(zone)
                .unwrap_or(self.world.bounds),
        }
    }

    pub fn clear_projectiles(&mut self) {
        self.player_projectiles.clear();
        self.enemy_projectiles.clear();
    }

    /// Leave the hall through its gate into level 1
    pub fn enter_world(&mut self) {
        let Some(first) = self.world.level(1) else {
            log::warn!("World has no levels");
            return;
        };
        let arrival = first.bounds.center();
        self.player.restore();
        self.enter_zone(ZoneId::Level(1), arrival);
        self.notices.push("Energy fully restored!", self.time_ms);
    }

    /// Move the player into `zone` at `arrival`. Clears projectiles and the
    /// roster of the zone being left; an uncleared level spawns its roster.
    pub fn enter_zone(&mut self, zone: ZoneId, arrival: Vec2) {
        self.clear_projectiles();
        if let Location::World(ZoneId::Level(prev)) = self.location {
            if let Some(level) = self.world.level_mut(prev) {
                if !level.cleared {
                    level.spawned = false;
                }
            }
            self.enemies.clear();
        }

        self.location = Location::World(zone);
        self.player.pos = arrival;
        log::info!("Entered {}", zone);

        if let ZoneId::Level(n) = zone {
            let pending = self.world.level(n).is_some_and(|l| !l.cleared && !l.spawned);
            if pending {
                self.spawn_roster(n);
            }
        }
    }

    /// Spawn level `number`'s roster at seeded random positions
    pub fn spawn_roster(&mut self, number: u32) {
        let Some(bounds) = self.world.level(number).map(|l| l.bounds) else {
            return;
        };
        let roster = self
            .tuning
            .world
            .rosters
            .get(number.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default();
        let margin = self.tuning.world.spawn_margin;

        for archetype in roster {
            let id = self.next_entity_id();
            let pos = bounds.random_point(&mut self.rng, margin);
            self.enemies.push(Enemy::spawn(id, archetype, pos, &self.tuning));
        }
        if let Some(level) = self.world.level_mut(number) {
            level.spawned = true;
        }
        log::info!("Level {} spawned {} enemies", number, self.enemies.len());
    }

    /// Act on a gate near the player. Returns true if the player moved.
    pub fn use_world_gate(&mut self) -> bool {
        let Location::World(zone) = self.location else {
            return false;
        };
        match self.world.gate_at(zone, self.player.pos) {
            Some(GateOutcome::Move { to, arrival }) => {
                self.enter_zone(to, arrival);
                true
            }
            Some(GateOutcome::Locked) => {
                self.notices.push("Clear all enemies to proceed!", self.time_ms);
                false
            }
            None => false,
        }
    }

    /// Drop dead enemies; mark the current level cleared once its roster is
    /// gone. Returns the cleared level's number.
    pub fn settle_level(&mut self) -> Option<u32> {
        self.enemies.retain(|e| e.alive);
        let Location::World(ZoneId::Level(n)) = self.location else {
            return None;
        };
        let level = self.world.level(n)?;
        if level.cleared || !level.spawned || !self.enemies.is_empty() {
            return None;
        }
        self.world.mark_cleared(n);
        self.player.bank_experience();
        self.notices.push(format!("Level {} cleared!", n), self.time_ms);
        log::info!("Level {} cleared (experience {})", n, self.player.experience);
        Some(n)
    }

    /// Enter game over
    pub fn defeat(&mut self) {
        if matches!(self.phase, GamePhase::GameOver { .. }) {
            return;
        }
        log::info!("Player defeated at {:.0} ms", self.time_ms);
        self.phase = GamePhase::GameOver {
            since_ms: self.time_ms,
        };
    }

    /// Back to the hall with full resources; unbanked experience is lost
    /// and level progress starts over
    pub fn respawn(&mut self) {
        self.player.forfeit_experience();
        self.player.respawn(self.hall.center(), &self.tuning.player);
        self.enemies.clear();
        self.clear_projectiles();
        self.world.reset_progress();
        self.location = Location::Hall;
        self.phase = GamePhase::Playing;
        log::info!("Player respawned in the start hall");
    }

    /// Respawn once the game-over delay has elapsed
    pub fn update_game_over(&mut self) -> bool {
        match self.phase {
            GamePhase::GameOver { since_ms } if self.time_ms - since_ms >= GAME_OVER_DELAY_MS => {
                self.respawn();
                true
            }
            _ => false,
        }
    }
}
