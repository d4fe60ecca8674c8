#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grim Halls.
//!
//! One [`World`] value owns the whole simulation aggregate: the tile grid,
//! the door timer table, the player, and the enemy arena. Adapters mutate it
//! exclusively through [`apply`] and observe it through [`query`] views, so
//! independent sessions can coexist and tests drive the simulation with the
//! exact command stream a live session would produce.

use std::collections::BTreeMap;

use grim_halls_core::{
    AmmoReserves, CellCoord, Command, DoorState, Event, MoveDirection, Pace, PickupKind, Tile,
    TileView, WeaponKind, WorldPoint, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod combat;
mod enemies;

use enemies::Enemy;
use grim_halls_core::EnemyId;

const DEFAULT_SPRAY_SEED: u64 = 0x6b8b_4567_327b_23c6;

const TILE_LENGTH: f32 = 64.0;
const DOOR_TOGGLE_TICKS: u32 = 60;
const INTERACT_REACH_TILES: f32 = 1.5;

const WALK_SPEED: f32 = 3.0;
const SPRINT_SPEED: f32 = 6.0;
const PLAYER_MAX_HEALTH: u32 = 100;
const STARTING_AMMO: AmmoReserves = AmmoReserves::new(50, 20, 5);
const PLAYER_SPAWN_TILES: (f32, f32) = (1.5, 1.5);

const ENEMY_MELEE_DAMAGE: u32 = 10;
const ENEMY_SPAWNS_TILES: [(f32, f32); 5] = [
    (8.5, 2.5),
    (14.5, 8.5),
    (12.5, 13.5),
    (3.5, 9.5),
    (9.5, 14.5),
];

const HEALTH_PICKUP_AMOUNT: u32 = 25;
const AMMO_PICKUP_PISTOL: u32 = 20;
const AMMO_PICKUP_SHOTGUN: u32 = 5;
const AMMO_PICKUP_BFG: u32 = 1;

/// Built-in level: `#` wall, `.` floor, `D` closed door, `H` health pack,
/// `A` ammo cache.
const DEFAULT_LAYOUT: [&str; 16] = [
    "################",
    "#..............#",
    "#...H.....#..H.#",
    "#.........#....#",
    "#..###D####....#",
    "#..#...........#",
    "#..#...........#",
    "#..D........A..#",
    "#..#...##......#",
    "#..#...#...A...#",
    "#..#...#.......#",
    "#...........#..#",
    "#.H.........#..#",
    "#...........#..#",
    "#..............#",
    "################",
];

/// Dense mutable tile grid plus the pristine copy used for session resets.
#[derive(Clone, Debug)]
struct Grid {
    cells: Vec<Tile>,
    initial: Vec<Tile>,
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl Grid {
    fn from_layout(rows: &[&str], tile_length: f32) -> Self {
        let row_count = rows.len() as u32;
        let column_count = rows.first().map_or(0, |row| row.len()) as u32;
        let cells: Vec<Tile> = rows
            .iter()
            .flat_map(|row| row.chars().map(tile_from_glyph))
            .collect();
        Self {
            initial: cells.clone(),
            cells,
            columns: column_count,
            rows: row_count,
            tile_length,
        }
    }

    fn view(&self) -> TileView<'_> {
        TileView::new(&self.cells, self.columns, self.rows, self.tile_length)
    }

    fn tile_at(&self, cell: CellCoord) -> Tile {
        self.view().tile_at(cell)
    }

    /// Writes a tile; out-of-bounds writes are silently ignored.
    fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        if cell.column() < self.columns && cell.row() < self.rows {
            let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = tile;
            }
        }
    }

    fn restore_initial(&mut self) {
        self.cells.copy_from_slice(&self.initial);
    }
}

fn tile_from_glyph(glyph: char) -> Tile {
    match glyph {
        '#' => Tile::Wall,
        'D' => Tile::Door(DoorState::Closed),
        'H' => Tile::HealthPickup,
        'A' => Tile::AmmoPickup,
        _ => Tile::Empty,
    }
}

/// Player record owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: WorldPoint,
    pub(crate) facing_degrees: f32,
    pub(crate) pace: Pace,
    pub(crate) health: u32,
    pub(crate) ammo: AmmoReserves,
    pub(crate) weapon: WeaponKind,
}

impl Player {
    fn spawn(tile_length: f32) -> Self {
        Self {
            position: WorldPoint::new(
                PLAYER_SPAWN_TILES.0 * tile_length,
                PLAYER_SPAWN_TILES.1 * tile_length,
            ),
            facing_degrees: 0.0,
            pace: Pace::Walk,
            health: PLAYER_MAX_HEALTH,
            ammo: STARTING_AMMO,
            weapon: WeaponKind::Pistol,
        }
    }

    fn speed(&self) -> f32 {
        match self.pace {
            Pace::Walk => WALK_SPEED,
            Pace::Sprint => SPRINT_SPEED,
        }
    }

    pub(crate) fn spend_round(&mut self) {
        match self.weapon {
            WeaponKind::Pistol => self.ammo.pistol = self.ammo.pistol.saturating_sub(1),
            WeaponKind::Shotgun => self.ammo.shotgun = self.ammo.shotgun.saturating_sub(1),
            WeaponKind::Bfg => self.ammo.bfg = self.ammo.bfg.saturating_sub(1),
        }
    }
}

/// Movement intents accumulated between ticks and drained by the next one.
#[derive(Clone, Copy, Debug, Default)]
struct PendingMotion {
    dx: f32,
    dy: f32,
    rotation_degrees: f32,
}

impl PendingMotion {
    fn take(&mut self) -> (f32, f32, f32) {
        let drained = (self.dx, self.dy, self.rotation_degrees);
        *self = Self::default();
        drained
    }
}

/// Represents the authoritative Grim Halls world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    door_timers: BTreeMap<CellCoord, u32>,
    player: Player,
    enemies: Vec<Enemy>,
    enemy_spawns: Vec<WorldPoint>,
    pending: PendingMotion,
    spray_rng: ChaCha8Rng,
    down: bool,
    tick_index: u64,
}

impl World {
    /// Creates a new world on the built-in level with the default spray seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SPRAY_SEED)
    }

    /// Creates a new world on the built-in level with an explicit spray seed.
    ///
    /// Two worlds constructed with the same seed and fed the same command
    /// stream stay bit-for-bit identical.
    #[must_use]
    pub fn with_seed(spray_seed: u64) -> Self {
        let grid = Grid::from_layout(&DEFAULT_LAYOUT, TILE_LENGTH);
        let enemy_spawns = ENEMY_SPAWNS_TILES
            .iter()
            .map(|(x, y)| WorldPoint::new(x * TILE_LENGTH, y * TILE_LENGTH))
            .collect();
        let mut world = Self {
            banner: WELCOME_BANNER,
            player: Player::spawn(grid.tile_length),
            door_timers: BTreeMap::new(),
            enemies: Vec::new(),
            enemy_spawns,
            pending: PendingMotion::default(),
            spray_rng: ChaCha8Rng::seed_from_u64(spray_seed),
            down: false,
            tick_index: 0,
            grid,
        };
        world.reset_enemies();
        world
    }

    fn reset(&mut self) {
        self.grid.restore_initial();
        self.door_timers.clear();
        self.player = Player::spawn(self.grid.tile_length);
        self.pending = PendingMotion::default();
        self.down = false;
        self.tick_index = 0;
        self.reset_enemies();
    }

    fn reset_enemies(&mut self) {
        self.enemies.clear();
        for (index, spawn) in self.enemy_spawns.iter().enumerate() {
            self.enemies
                .push(Enemy::spawn(EnemyId::new(index as u32), *spawn));
        }
    }

    fn queue_move(&mut self, direction: MoveDirection) {
        let offset = match direction {
            MoveDirection::Forward => 0.0,
            MoveDirection::Backward => 180.0,
            MoveDirection::StrafeLeft => -90.0,
            MoveDirection::StrafeRight => 90.0,
        };
        let radians = grim_halls_core::angles::to_radians(self.player.facing_degrees + offset);
        let speed = self.player.speed();
        self.pending.dx += radians.cos() * speed;
        self.pending.dy += radians.sin() * speed;
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced);

        let (dx, dy, rotation) = self.pending.take();
        self.player.facing_degrees =
            grim_halls_core::angles::normalize_degrees(self.player.facing_degrees + rotation);

        // Each axis is tested on its own so a blocked diagonal still slides
        // along the free axis.
        let tiles = self.grid.view();
        let position = self.player.position;
        let mut x = position.x();
        let mut y = position.y();
        if !tiles.is_blocking_at(x + dx, y) {
            x += dx;
        }
        if !tiles.is_blocking_at(x, y + dy) {
            y += dy;
        }
        self.player.position = WorldPoint::new(x, y);

        self.advance_door_timers(out_events);
        self.advance_enemies(out_events);

        if self.player.health == 0 && !self.down {
            self.down = true;
            out_events.push(Event::PlayerDown);
        }
    }

    fn advance_door_timers(&mut self, out_events: &mut Vec<Event>) {
        let mut completed: Vec<CellCoord> = Vec::new();
        for (cell, remaining) in self.door_timers.iter_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                completed.push(*cell);
            }
        }

        for cell in completed {
            let _ = self.door_timers.remove(&cell);
            if let Tile::Door(state) = self.grid.tile_at(cell) {
                let next = state.toggled();
                self.grid.set_tile(cell, Tile::Door(next));
                out_events.push(Event::DoorToggled { cell, state: next });
            }
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let tiles = self.grid.view();
        let target = self.player.position;

        for enemy in self.enemies.iter_mut() {
            if enemy.advance(target, &tiles) {
                self.player.health = self.player.health.saturating_sub(ENEMY_MELEE_DAMAGE);
                out_events.push(Event::PlayerDamaged {
                    amount: ENEMY_MELEE_DAMAGE,
                    remaining: self.player.health,
                });
            }
        }
    }

    fn fire(&mut self, out_events: &mut Vec<Event>) {
        let tiles = self.grid.view();
        combat::fire(
            &tiles,
            &mut self.player,
            &mut self.enemies,
            &mut self.spray_rng,
            out_events,
        );
    }

    fn interact(&mut self, out_events: &mut Vec<Event>) {
        let tiles = self.grid.view();
        let reach = INTERACT_REACH_TILES * self.grid.tile_length;
        let probe = self
            .player
            .position
            .advanced_by(self.player.facing_degrees, reach);

        let door_cell = tiles
            .cell_containing(probe.x(), probe.y())
            .filter(|cell| matches!(self.grid.tile_at(*cell), Tile::Door(_)));
        if let Some(cell) = door_cell {
            // Re-interacting restarts an in-flight animation.
            let _ = self.door_timers.insert(cell, DOOR_TOGGLE_TICKS);
            out_events.push(Event::DoorActuated { cell });
        }

        let standing_cell =
            tiles.cell_containing(self.player.position.x(), self.player.position.y());
        if let Some(cell) = standing_cell {
            match self.grid.tile_at(cell) {
                Tile::HealthPickup => {
                    self.player.health =
                        (self.player.health + HEALTH_PICKUP_AMOUNT).min(PLAYER_MAX_HEALTH);
                    self.grid.set_tile(cell, Tile::Empty);
                    out_events.push(Event::PickupCollected {
                        cell,
                        kind: PickupKind::Health,
                    });
                }
                Tile::AmmoPickup => {
                    self.player.ammo.pistol += AMMO_PICKUP_PISTOL;
                    self.player.ammo.shotgun += AMMO_PICKUP_SHOTGUN;
                    self.player.ammo.bfg += AMMO_PICKUP_BFG;
                    self.grid.set_tile(cell, Tile::Empty);
                    out_events.push(Event::PickupCollected {
                        cell,
                        kind: PickupKind::Ammo,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// After the player goes down every command except [`Command::NewGame`] is
/// ignored; the session controller decides between restart and quit.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.down && !matches!(command, Command::NewGame) {
        return;
    }

    match command {
        Command::NewGame => {
            world.reset();
            out_events.push(Event::SessionReset);
        }
        Command::Tick => world.tick(out_events),
        Command::Move { direction } => world.queue_move(direction),
        Command::Rotate { delta_degrees } => {
            world.pending.rotation_degrees += delta_degrees;
        }
        Command::SetPace { pace } => world.player.pace = pace,
        Command::SwitchWeapon { weapon } => world.player.weapon = weapon,
        Command::FireWeapon => world.fire(out_events),
        Command::Interact => world.interact(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use grim_halls_core::{CellCoord, EnemyView, PlayerSnapshot, TileView};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Captures an immutable snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            facing_degrees: world.player.facing_degrees,
            pace: world.player.pace,
            health: world.player.health,
            max_health: super::PLAYER_MAX_HEALTH,
            weapon: world.player.weapon,
            ammo: world.player.ammo,
        }
    }

    /// Captures a read-only view of the enemy arena in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Remaining ticks of an in-flight door animation, if one exists.
    #[must_use]
    pub fn door_countdown(world: &World, cell: CellCoord) -> Option<u32> {
        world.door_timers.get(&cell).copied()
    }

    /// Whether the player has gone down and the session awaits a restart.
    #[must_use]
    pub fn is_down(world: &World) -> bool {
        world.down
    }

    /// Number of ticks applied since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(any(test, feature = "scenario_scaffolding"))]
impl World {
    /// Builds a world from an explicit layout with an empty enemy arena.
    ///
    /// Test scaffolding only; sessions always run the built-in level.
    #[must_use]
    pub fn from_layout(rows: &[&str]) -> Self {
        let grid = Grid::from_layout(rows, TILE_LENGTH);
        Self {
            banner: WELCOME_BANNER,
            player: Player::spawn(grid.tile_length),
            door_timers: BTreeMap::new(),
            enemies: Vec::new(),
            enemy_spawns: Vec::new(),
            pending: PendingMotion::default(),
            spray_rng: ChaCha8Rng::seed_from_u64(DEFAULT_SPRAY_SEED),
            down: false,
            tick_index: 0,
            grid,
        }
    }

    /// Spawns an enemy at the provided tile-space position.
    pub fn place_enemy_at(&mut self, x_tiles: f32, y_tiles: f32) -> EnemyId {
        let id = EnemyId::new(self.enemies.len() as u32);
        let position = WorldPoint::new(
            x_tiles * self.grid.tile_length,
            y_tiles * self.grid.tile_length,
        );
        self.enemy_spawns.push(position);
        self.enemies.push(Enemy::spawn(id, position));
        id
    }

    /// Moves the player to the provided tile-space position.
    pub fn set_player_position(&mut self, x_tiles: f32, y_tiles: f32) {
        self.player.position = WorldPoint::new(
            x_tiles * self.grid.tile_length,
            y_tiles * self.grid.tile_length,
        );
    }

    /// Points the player along the provided facing angle.
    pub fn set_player_facing(&mut self, degrees: f32) {
        self.player.facing_degrees = grim_halls_core::angles::normalize_degrees(degrees);
    }

    /// Overrides the player's health.
    pub fn set_player_health(&mut self, health: u32) {
        self.player.health = health.min(PLAYER_MAX_HEALTH);
    }

    /// Overrides the player's ammunition reserves.
    pub fn set_ammo(&mut self, ammo: AmmoReserves) {
        self.player.ammo = ammo;
    }
}
