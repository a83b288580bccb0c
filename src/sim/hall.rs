//! The start hall: a walled tile room with a gate, a battery store and the
//! property tree (skill selection).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::Rect;

/// Hall tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Floor,
    Wall,
    Gate,
    BatteryStorage,
    PropertyTree,
}

/// Something the player can interact with in the hall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HallFixture {
    Gate,
    BatteryStorage,
    PropertyTree,
}

/// Bounded battery container. Transfers move as much as fits and report the
/// amount actually moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStore {
    pub stock: u32,
    pub capacity: u32,
}

impl BatteryStore {
    pub fn new(stock: u32, capacity: u32) -> Self {
        Self {
            stock: stock.min(capacity),
            capacity,
        }
    }

    pub fn space_left(&self) -> u32 {
        self.capacity - self.stock
    }

    /// Store up to `amount`; returns the amount stored
    pub fn deposit(&mut self, amount: u32) -> u32 {
        let moved = amount.min(self.space_left());
        self.stock += moved;
        moved
    }

    /// Take up to `amount`; returns the amount taken
    pub fn withdraw(&mut self, amount: u32) -> u32 {
        let moved = amount.min(self.stock);
        self.stock -= moved;
        moved
    }
}

/// Move up to `amount` batteries from `src` to `dst`; returns the amount moved
pub fn transfer(src: &mut BatteryStore, dst: &mut BatteryStore, amount: u32) -> u32 {
    let wanted = amount.min(dst.space_left());
    let taken = src.withdraw(wanted);
    dst.deposit(taken)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartHall {
    /// Grid size in tiles
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    grid: Vec<Tile>,
    pub gate: (usize, usize),
    pub battery_pos: (usize, usize),
    pub tree_pos: (usize, usize),
    pub storage: BatteryStore,
}

impl StartHall {
    /// Build a hall covering a `screen_w` x `screen_h` area
    pub fn new(screen_w: f32, screen_h: f32, tile_size: f32, storage: BatteryStore) -> Self {
        let width = (screen_w / tile_size) as usize;
        let height = (screen_h / tile_size) as usize;

        let mut grid = vec![Tile::Wall; width * height];
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                grid[y * width + x] = Tile::Floor;
            }
        }

        let gate = (width / 2, height.saturating_sub(2));
        let battery_pos = (width / 3, height / 2);
        let tree_pos = (width * 2 / 3, height / 2);

        let mut hall = Self {
            width,
            height,
            tile_size,
            grid,
            gate,
            battery_pos,
            tree_pos,
            storage,
        };
        hall.set(gate, Tile::Gate);
        hall.set(battery_pos, Tile::BatteryStorage);
        hall.set(tree_pos, Tile::PropertyTree);
        hall
    }

    fn set(&mut self, (x, y): (usize, usize), tile: Tile) {
        if x < self.width && y < self.height {
            self.grid[y * self.width + x] = tile;
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Grid cell containing `p`, if inside the grid
    pub fn cell(&self, p: Vec2) -> Option<(usize, usize)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.tile_size) as usize;
        let y = (p.y / self.tile_size) as usize;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Tile at grid cell `(x, y)`, `None` outside the grid
    pub fn tile(&self, (x, y): (usize, usize)) -> Option<Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.grid.get(y * self.width + x).copied()
    }

    /// Inside the hall rectangle
    pub fn is_valid_position(&self, p: Vec2) -> bool {
        self.bounds().contains(p)
    }

    /// Wall tile at `p`; anything outside the grid counts as wall
    pub fn is_wall(&self, p: Vec2) -> bool {
        self.cell(p).and_then(|c| self.tile(c)).is_none_or(|t| t == Tile::Wall)
    }

    fn tile_center(&self, (x, y): (usize, usize)) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.tile_size,
            (y as f32 + 0.5) * self.tile_size,
        )
    }

    /// Position of a fixture's tile center
    pub fn fixture_pos(&self, fixture: HallFixture) -> Vec2 {
        match fixture {
            HallFixture::Gate => self.tile_center(self.gate),
            HallFixture::BatteryStorage => self.tile_center(self.battery_pos),
            HallFixture::PropertyTree => self.tile_center(self.tree_pos),
        }
    }

    /// Fixture within interaction reach of `p`, gate first
    pub fn fixture_near(&self, p: Vec2) -> Option<HallFixture> {
        let reach = |f: HallFixture| match f {
            HallFixture::Gate => self.tile_size,
            _ => self.tile_size * 1.5,
        };
        [
            HallFixture::Gate,
            HallFixture::BatteryStorage,
            HallFixture::PropertyTree,
        ]
        .into_iter()
        .find(|&f| (p - self.fixture_pos(f)).abs().max_element() < reach(f))
    }

    /// Iterate all tiles with their grid coordinates
    pub fn tiles(&self) -> impl Iterator<Item = ((usize, usize), Tile)> + '_ {
        self.grid
            .iter()
            .enumerate()
            .map(|(i, &t)| ((i % self.width, i / self.width), t))
    }
}
