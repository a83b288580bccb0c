//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster and projectiles in spawn order)
//! - No rendering or platform dependencies

pub mod cooldown;
pub mod enemy;
pub mod error;
pub mod hall;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod world;

pub use cooldown::{Cooldown, Timer};
pub use enemy::{Archetype, Behavior, BossPhase, Enemy};
pub use error::{CombatError, CombatResult};
pub use hall::{BatteryStore, HallFixture, StartHall, Tile};
pub use player::{MoveKeys, Player, Skill, SkillKind};
pub use projectile::{KillEvent, Projectile, Side};
pub use state::{GamePhase, GameState, Location};
pub use tick::{BatteryTransfer, Simulation, TickInput, TickOutcome, tick};
pub use world::{Area, Rect, World, ZoneId};
