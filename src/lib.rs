//! Z2H - simulation core of a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (player, enemies, projectiles, zones)
//! - `tuning`: Data-driven game balance
//! - `notices`: Transient player-facing messages
//! - `render`: Render-sink contract (drawing lives outside the crate)

pub mod notices;
pub mod render;
pub mod sim;
pub mod tuning;

pub use notices::Notices;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical screen size; the start hall and each level derive from it
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Hall grid tile edge length (world units)
    pub const TILE_SIZE: f32 = 32.0;

    /// Delay between defeat and the respawn reset (ms)
    pub const GAME_OVER_DELAY_MS: f64 = 1500.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Facing angle (radians) of a direction vector
#[inline]
pub fn facing_angle(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// Rotate a vector by `radians`
#[inline]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}

/// Circle-circle overlap test (strict, touching circles do not collide)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    distance(a, b) < ra + rb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_direction_to_is_unit_or_zero() {
        let d = direction_to(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - 0.6).abs() < 1e-6);
        assert_eq!(direction_to(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_facing_angle() {
        assert!(facing_angle(Vec2::X).abs() < 1e-6);
        assert!((facing_angle(Vec2::Y) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = rotate(Vec2::X, FRAC_PI_2);
        assert!(r.x.abs() < 1e-6);
        assert!((r.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
    }
}
