//! Data-driven game balance
//!
//! Every gameplay number lives here so balance passes never touch simulation
//! code. Tuning files are JSON; any field left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::enemy::Archetype;

/// Failure loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A timed player ability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillTuning {
    pub energy_cost: f32,
    pub cooldown_ms: f64,
    pub duration_ms: f64,
    /// Dash distance, or damage multiplier for Double Damage
    pub magnitude: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Movement speed (units/s)
    pub move_speed: f32,
    pub collision_radius: f32,
    pub max_hp: f32,
    pub max_armor: f32,
    pub max_energy: f32,
    /// Passive energy regeneration (energy/s)
    pub energy_recovery_rate: f32,
    /// Energy consumed per shot
    pub shot_cost: f32,
    pub shot_cooldown_ms: f64,
    /// Quiet time after taking damage before armor starts regenerating
    pub armor_regen_delay_ms: f64,
    /// One armor point is restored per interval
    pub armor_regen_interval_ms: f64,
    pub backpack_capacity: u32,
    pub starting_batteries: u32,
    pub dash: SkillTuning,
    pub double_damage: SkillTuning,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 420.0,
            collision_radius: 20.0,
            max_hp: 10.0,
            max_armor: 5.0,
            max_energy: 100.0,
            energy_recovery_rate: 2.0,
            shot_cost: 4.0,
            shot_cooldown_ms: 250.0,
            armor_regen_delay_ms: 3000.0,
            armor_regen_interval_ms: 1000.0,
            backpack_capacity: 64,
            starting_batteries: 10,
            dash: SkillTuning {
                energy_cost: 20.0,
                cooldown_ms: 10_000.0,
                duration_ms: 100.0,
                magnitude: 150.0,
            },
            double_damage: SkillTuning {
                energy_cost: 20.0,
                cooldown_ms: 20_000.0,
                duration_ms: 5000.0,
                magnitude: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Player projectile speed (units/s)
    pub player_speed: f32,
    /// Enemy projectile speed (units/s)
    pub enemy_speed: f32,
    pub lifetime_ms: f64,
    /// Base damage of a player shot before the damage multiplier
    pub player_damage: f32,
    pub radius: f32,
    /// Ceiling on live enemy projectiles
    pub enemy_cap: usize,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 570.0,
            enemy_speed: 300.0,
            lifetime_ms: 3000.0,
            player_damage: 1.0,
            radius: 10.0,
            enemy_cap: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    pub hp: f32,
    pub speed: f32,
    pub collision_radius: f32,
    /// Beyond this distance the enemy chases instead of approaching
    pub chase_distance: f32,
    pub contact_damage: f32,
    pub contact_cooldown_ms: f64,
    pub charge_cooldown_ms: f64,
    pub charge_duration_ms: f64,
    pub charge_speed_multiplier: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            hp: 4.0,
            speed: 100.0,
            collision_radius: 20.0,
            chase_distance: 300.0,
            contact_damage: 2.0,
            contact_cooldown_ms: 1000.0,
            charge_cooldown_ms: 5000.0,
            charge_duration_ms: 500.0,
            charge_speed_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    pub hp: f32,
    pub speed: f32,
    pub collision_radius: f32,
    /// Beyond this distance the enemy patrols
    pub patrol_distance: f32,
    /// Closer than this the enemy retreats
    pub min_distance: f32,
    pub shot_cooldown_ms: f64,
    pub shot_damage: f32,
    pub patrol_min_ms: f64,
    pub patrol_max_ms: f64,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            hp: 6.0,
            speed: 80.0,
            collision_radius: 24.0,
            patrol_distance: 500.0,
            min_distance: 200.0,
            shot_cooldown_ms: 2000.0,
            shot_damage: 2.0,
            patrol_min_ms: 2000.0,
            patrol_max_ms: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub hp: f32,
    pub speed: f32,
    pub collision_radius: f32,
    pub min_distance: f32,
    /// HP fraction below which phase 2 begins
    pub phase_two_threshold: f32,
    pub phase_one_cooldown_ms: f64,
    pub phase_two_cooldown_ms: f64,
    pub burst_cooldown_ms: f64,
    pub burst_warning_ms: f64,
    /// Fan offsets around the aim direction (degrees)
    pub burst_spread_deg: Vec<f32>,
    pub shot_damage: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            hp: 10.0,
            speed: 60.0,
            collision_radius: 48.0,
            min_distance: 150.0,
            phase_two_threshold: 0.5,
            phase_one_cooldown_ms: 1500.0,
            phase_two_cooldown_ms: 1000.0,
            burst_cooldown_ms: 5000.0,
            burst_warning_ms: 500.0,
            burst_spread_deg: vec![-30.0, -15.0, 0.0, 15.0, 30.0],
            shot_damage: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub level_width: f32,
    pub level_height: f32,
    pub corridor_width: f32,
    /// Distance from a gate within which interaction works
    pub gate_reach: f32,
    /// Keep-out margin for roster spawn positions
    pub spawn_margin: f32,
    /// Level numbers (1-based) that host a boss
    pub boss_levels: Vec<u32>,
    /// Enemy roster per level, index 0 is level 1
    pub rosters: Vec<Vec<Archetype>>,
    pub hall_battery_capacity: u32,
    pub hall_starting_batteries: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        use Archetype::*;
        Self {
            level_width: SCREEN_WIDTH * 3.0,
            level_height: SCREEN_HEIGHT * 3.0,
            corridor_width: 200.0,
            gate_reach: 100.0,
            spawn_margin: 100.0,
            boss_levels: vec![2, 4],
            rosters: vec![
                vec![Melee, Melee, Melee],
                vec![Boss, Melee, Melee],
                vec![Ranged, Ranged, Melee, Melee],
                vec![Boss, Ranged, Ranged],
            ],
            hall_battery_capacity: 128,
            hall_starting_batteries: 10,
        }
    }
}

impl WorldTuning {
    pub fn level_count(&self) -> u32 {
        self.rosters.len() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeTuning {
    /// Maximum simultaneous notices
    pub capacity: usize,
    pub lifetime_ms: f64,
    /// Minimum gap before the same text may show again
    pub repeat_interval_ms: f64,
}

impl Default for NoticeTuning {
    fn default() -> Self {
        Self {
            capacity: 3,
            lifetime_ms: 3000.0,
            repeat_interval_ms: 1000.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectiles: ProjectileTuning,
    pub melee: MeleeTuning,
    pub ranged: RangedTuning,
    pub boss: BossTuning,
    pub world: WorldTuning,
    pub notices: NoticeTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning ({} levels)", tuning.world.level_count());
        Ok(tuning)
    }

    /// Load from `path`, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning: {}", e);
                Self::default()
            }
        }
    }
}
