//! World zones and the area classifier
//!
//! The world is a row of rectangular levels along X with a corridor between
//! each consecutive pair:
//!
//! ```text
//! | level 1 | c1 | level 2 | c2 | level 3 | c3 | level 4 |
//! ```
//!
//! Corridors are safe zones: projectiles do not survive in them, and moving
//! forward out of one requires the level behind it to be cleared.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hall::StartHall;
use crate::tuning::WorldTuning;

/// Axis-aligned rectangle (min inclusive, max exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Clamp a point to lie at least `margin` inside the rectangle
    pub fn clamp(&self, p: Vec2, margin: f32) -> Vec2 {
        p.clamp(self.min + Vec2::splat(margin), self.max - Vec2::splat(margin))
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Uniform random point at least `margin` from every edge
    pub fn random_point(&self, rng: &mut impl Rng, margin: f32) -> Vec2 {
        let lo = self.min + Vec2::splat(margin);
        let hi = self.max - Vec2::splat(margin);
        if lo.x >= hi.x || lo.y >= hi.y {
            return self.center();
        }
        Vec2::new(rng.random_range(lo.x..hi.x), rng.random_range(lo.y..hi.y))
    }
}

/// Logical zone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    /// Level number, 1-based
    Level(u32),
    /// Corridor joining level `from` to level `from + 1`
    Corridor { from: u32 },
}

impl ZoneId {
    /// Safe zones destroy any projectile that enters them
    pub fn is_safe(&self) -> bool {
        matches!(self, ZoneId::Corridor { .. })
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneId::Level(n) => write!(f, "level {}", n),
            ZoneId::Corridor { from } => write!(f, "corridor {}-{}", from, from + 1),
        }
    }
}

/// A level zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    pub bounds: Rect,
    pub is_boss: bool,
    /// Set once the level's roster is fully defeated
    pub cleared: bool,
    /// Roster already spawned for this run
    pub spawned: bool,
}

/// A corridor zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corridor {
    pub from: u32,
    pub bounds: Rect,
}

/// Result of interacting near a gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateOutcome {
    /// Step into `to`, arriving at `arrival`
    Move { to: ZoneId, arrival: Vec2 },
    /// The forward gate is shut until the level behind it is cleared
    Locked,
}

/// Static zone geometry plus per-level cleared flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub levels: Vec<Level>,
    pub corridors: Vec<Corridor>,
    pub bounds: Rect,
    pub gate_reach: f32,
}

/// Arrival offset from a gate edge
const ARRIVAL_INSET: f32 = 50.0;

impl World {
    pub fn new(tuning: &WorldTuning) -> Self {
        let lw = tuning.level_width;
        let lh = tuning.level_height;
        let cw = tuning.corridor_width;
        let count = tuning.level_count();

        let mut levels = Vec::with_capacity(count as usize);
        let mut corridors = Vec::with_capacity(count.saturating_sub(1) as usize);
        for i in 0..count {
            let number = i + 1;
            let x = i as f32 * (lw + cw);
            levels.push(Level {
                number,
                bounds: Rect::new(x, 0.0, lw, lh),
                is_boss: tuning.boss_levels.contains(&number),
                cleared: false,
                spawned: false,
            });
            if number < count {
                corridors.push(Corridor {
                    from: number,
                    bounds: Rect::new(x + lw, 0.0, cw, lh),
                });
            }
        }

        let total_width = count as f32 * lw + count.saturating_sub(1) as f32 * cw;
        Self {
            levels,
            corridors,
            bounds: Rect::new(0.0, 0.0, total_width, lh),
            gate_reach: tuning.gate_reach,
        }
    }

    /// Classify a world position; `None` outside every zone
    pub fn locate(&self, p: Vec2) -> Option<ZoneId> {
        if let Some(c) = self.corridors.iter().find(|c| c.bounds.contains(p)) {
            return Some(ZoneId::Corridor { from: c.from });
        }
        self.levels
            .iter()
            .find(|l| l.bounds.contains(p))
            .map(|l| ZoneId::Level(l.number))
    }

    pub fn level(&self, number: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.number == number)
    }

    pub fn level_mut(&mut self, number: u32) -> Option<&mut Level> {
        self.levels.iter_mut().find(|l| l.number == number)
    }

    pub fn corridor(&self, from: u32) -> Option<&Corridor> {
        self.corridors.iter().find(|c| c.from == from)
    }

    pub fn zone_bounds(&self, zone: ZoneId) -> Option<Rect> {
        match zone {
            ZoneId::Level(n) => self.level(n).map(|l| l.bounds),
            ZoneId::Corridor { from } => self.corridor(from).map(|c| c.bounds),
        }
    }

    pub fn is_cleared(&self, number: u32) -> bool {
        self.level(number).is_some_and(|l| l.cleared)
    }

    pub fn mark_cleared(&mut self, number: u32) {
        if let Some(level) = self.level_mut(number) {
            level.cleared = true;
        }
    }

    /// Passing from level `from` to an adjacent level `to`: backwards is
    /// always allowed, forwards needs `from` cleared
    pub fn can_pass(&self, from: u32, to: u32) -> bool {
        to < from || self.is_cleared(from)
    }

    /// Forget cleared/spawned state (new run)
    pub fn reset_progress(&mut self) {
        for level in &mut self.levels {
            level.cleared = false;
            level.spawned = false;
        }
    }

    /// Resolve an interaction at `p` while standing in `zone`
    pub fn gate_at(&self, zone: ZoneId, p: Vec2) -> Option<GateOutcome> {
        let reach = self.gate_reach;
        let near = |gate: Vec2| (p - gate).abs().max_element() < reach;

        match zone {
            ZoneId::Level(n) => {
                let level = self.level(n)?;
                let mid_y = level.bounds.center().y;
                if let Some(c) = self.corridor(n) {
                    if near(Vec2::new(level.bounds.max.x, mid_y)) {
                        return Some(GateOutcome::Move {
                            to: ZoneId::Corridor { from: n },
                            arrival: Vec2::new(c.bounds.min.x + ARRIVAL_INSET, mid_y),
                        });
                    }
                }
                if n > 1 {
                    if let Some(c) = self.corridor(n - 1) {
                        if near(Vec2::new(level.bounds.min.x, mid_y)) {
                            return Some(GateOutcome::Move {
                                to: ZoneId::Corridor { from: n - 1 },
                                arrival: Vec2::new(c.bounds.max.x - ARRIVAL_INSET, mid_y),
                            });
                        }
                    }
                }
                None
            }
            ZoneId::Corridor { from } => {
                let c = self.corridor(from)?;
                let mid_y = c.bounds.center().y;
                if near(Vec2::new(c.bounds.min.x, mid_y)) {
                    let back = self.level(from)?;
                    return Some(GateOutcome::Move {
                        to: ZoneId::Level(from),
                        arrival: Vec2::new(back.bounds.max.x - ARRIVAL_INSET, mid_y),
                    });
                }
                if near(Vec2::new(c.bounds.max.x, mid_y)) {
                    if !self.can_pass(from, from + 1) {
                        return Some(GateOutcome::Locked);
                    }
                    let next = self.level(from + 1)?;
                    return Some(GateOutcome::Move {
                        to: ZoneId::Level(from + 1),
                        arrival: Vec2::new(next.bounds.min.x + ARRIVAL_INSET, mid_y),
                    });
                }
                None
            }
        }
    }
}

/// Where the simulation currently runs, as seen by projectiles and enemies
#[derive(Debug, Clone, Copy)]
pub enum Area<'a> {
    /// Walled start hall
    Hall(&'a StartHall),
    /// Open world of levels and corridors
    World(&'a World),
}

impl Area<'_> {
    /// Valid region for projectiles
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Area::Hall(hall) => hall.is_valid_position(p),
            Area::World(world) => world.bounds.contains(p),
        }
    }

    /// True if `p` lies in a safe corridor (never in the hall)
    pub fn is_safe(&self, p: Vec2) -> bool {
        match self {
            Area::Hall(_) => false,
            Area::World(world) => world.locate(p).is_some_and(|z| z.is_safe()),
        }
    }

    /// True if `p` is inside a wall tile (only the hall has walls)
    pub fn is_wall(&self, p: Vec2) -> bool {
        match self {
            Area::Hall(hall) => hall.is_wall(p),
            Area::World(_) => false,
        }
    }

    pub fn is_walled(&self) -> bool {
        matches!(self, Area::Hall(_))
    }
}
