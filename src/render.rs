//! Render-sink contract
//!
//! The crate does not draw. `draw_frame` walks the visible state and hands
//! each entity to a `RenderSink` as a sprite (key, screen position, angle,
//! tint) or, when the sprite asset is missing, as a solid-color circle.

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::*;
use crate::sim::enemy::{Archetype, Enemy};
use crate::sim::hall::Tile;
use crate::sim::projectile::{Projectile, Side};
use crate::sim::state::{GameState, Location};

/// RGBA color
pub type Color = [f32; 4];

pub const MELEE_COLOR: Color = [0.0, 0.0, 1.0, 1.0];
pub const RANGED_COLOR: Color = [0.0, 1.0, 0.0, 1.0];
pub const BOSS_COLOR: Color = [0.5, 0.0, 0.5, 1.0];
pub const PROJECTILE_COLOR: Color = [1.0, 0.0, 0.0, 1.0];
pub const PLAYER_COLOR: Color = [1.0, 1.0, 1.0, 1.0];
const WALL_COLOR: Color = [0.3, 0.3, 0.3, 1.0];
const FLOOR_COLOR: Color = [0.1, 0.1, 0.1, 1.0];
const FIXTURE_COLOR: Color = [1.0, 0.8, 0.0, 1.0];

/// Sprite identifiers the host maps to loaded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Melee,
    Ranged,
    Boss,
    PlayerShot,
    EnemyShot,
    Tile(Tile),
}

impl SpriteKey {
    pub fn for_enemy(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Melee => SpriteKey::Melee,
            Archetype::Ranged => SpriteKey::Ranged,
            Archetype::Boss => SpriteKey::Boss,
        }
    }
}

/// Color overlay applied to a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    #[default]
    None,
    /// Red flash after taking damage
    Hit,
    /// Yellow boss burst telegraph
    Warning,
}

/// Receives draw calls in screen space. Implemented by the host.
pub trait RenderSink {
    fn sprite(&mut self, pos: Vec2, angle: f32, key: SpriteKey, tint: Tint);
    fn fallback(&mut self, pos: Vec2, color: Color, radius: f32);
}

/// Which sprites the host managed to load
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    loaded: HashSet<SpriteKey>,
    /// Missing keys already reported
    warned: HashSet<SpriteKey>,
}

impl AssetSet {
    pub fn new(loaded: impl IntoIterator<Item = SpriteKey>) -> Self {
        Self {
            loaded: loaded.into_iter().collect(),
            warned: HashSet::new(),
        }
    }

    pub fn has(&self, key: SpriteKey) -> bool {
        self.loaded.contains(&key)
    }

    /// Returns true if the sprite can be drawn; logs a missing key once
    fn check(&mut self, key: SpriteKey) -> bool {
        if self.has(key) {
            return true;
        }
        if self.warned.insert(key) {
            log::warn!("Missing sprite {:?}, drawing fallback", key);
        }
        false
    }
}

/// World-to-screen transform centred on the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
}

impl Camera {
    pub fn follow(target: Vec2) -> Self {
        Self {
            offset: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * 0.5 - target,
        }
    }

    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world + self.offset
    }
}

fn emit(
    assets: &mut AssetSet,
    sink: &mut impl RenderSink,
    pos: Vec2,
    angle: f32,
    key: SpriteKey,
    tint: Tint,
    color: Color,
    radius: f32,
) {
    if assets.check(key) {
        sink.sprite(pos, angle, key, tint);
    } else {
        sink.fallback(pos, color, radius);
    }
}

fn enemy_tint(enemy: &Enemy) -> Tint {
    if enemy.hit_flash.active() {
        Tint::Hit
    } else if enemy.warning_active() {
        Tint::Warning
    } else {
        Tint::None
    }
}

fn enemy_color(archetype: Archetype) -> Color {
    match archetype {
        Archetype::Melee => MELEE_COLOR,
        Archetype::Ranged => RANGED_COLOR,
        Archetype::Boss => BOSS_COLOR,
    }
}

fn tile_color(tile: Tile) -> Color {
    match tile {
        Tile::Wall => WALL_COLOR,
        Tile::Floor => FLOOR_COLOR,
        Tile::Gate | Tile::BatteryStorage | Tile::PropertyTree => FIXTURE_COLOR,
    }
}

fn draw_projectiles(
    shots: &[Projectile],
    camera: &Camera,
    assets: &mut AssetSet,
    sink: &mut impl RenderSink,
) {
    for shot in shots.iter().filter(|p| p.visible) {
        let key = match shot.side {
            Side::Player => SpriteKey::PlayerShot,
            Side::Enemy => SpriteKey::EnemyShot,
        };
        emit(
            assets,
            sink,
            camera.to_screen(shot.pos),
            shot.angle,
            key,
            Tint::None,
            PROJECTILE_COLOR,
            shot.radius,
        );
    }
}

/// Draw one frame: hall tiles (hall only), enemies, player, projectiles
pub fn draw_frame(state: &GameState, assets: &mut AssetSet, sink: &mut impl RenderSink) {
    let camera = Camera::follow(state.player.pos);

    if state.location == Location::Hall {
        let half = state.hall.tile_size * 0.5;
        for ((x, y), tile) in state.hall.tiles() {
            let center = Vec2::new(x as f32, y as f32) * state.hall.tile_size + Vec2::splat(half);
            emit(
                assets,
                sink,
                camera.to_screen(center),
                0.0,
                SpriteKey::Tile(tile),
                Tint::None,
                tile_color(tile),
                half,
            );
        }
    }

    for enemy in state.enemies.iter().filter(|e| e.alive) {
        let archetype = enemy.archetype();
        emit(
            assets,
            sink,
            camera.to_screen(enemy.pos),
            enemy.angle,
            SpriteKey::for_enemy(archetype),
            enemy_tint(enemy),
            enemy_color(archetype),
            enemy.collision_radius,
        );
    }

    let player = &state.player;
    emit(
        assets,
        sink,
        camera.to_screen(player.pos),
        player.angle,
        SpriteKey::Player,
        Tint::None,
        PLAYER_COLOR,
        player.collision_radius,
    );

    draw_projectiles(&state.player_projectiles, &camera, assets, sink);
    draw_projectiles(&state.enemy_projectiles, &camera, assets, sink);
}
