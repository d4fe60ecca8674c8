#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grim Halls engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. Read access flows through immutable snapshots and
//! borrowed views defined here, so systems and renderers never touch world
//! internals directly.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grim Halls.";

/// Angle arithmetic shared by raycasting, visibility, enemy AI and combat.
///
/// Every angle crossing a crate boundary in this workspace is expressed in
/// degrees; these helpers keep normalization identical everywhere.
pub mod angles {
    /// Wraps an angle into the canonical `[0, 360)` range.
    #[must_use]
    pub fn normalize_degrees(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(360.0);
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    }

    /// Signed smallest rotation from `reference` to `target` in `[-180, 180)`.
    #[must_use]
    pub fn relative_degrees(target: f32, reference: f32) -> f32 {
        let difference = normalize_degrees(target - reference);
        if difference >= 180.0 {
            difference - 360.0
        } else {
            difference
        }
    }

    /// Converts degrees to radians for trigonometric evaluation.
    #[must_use]
    pub fn to_radians(degrees: f32) -> f32 {
        degrees.to_radians()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous position measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Direction from this point toward `other`, normalized to `[0, 360)`.
    #[must_use]
    pub fn bearing_to_degrees(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        angles::normalize_degrees(dy.atan2(dx).to_degrees())
    }

    /// Point reached by travelling `distance` units along `angle_degrees`.
    #[must_use]
    pub fn advanced_by(self, angle_degrees: f32, distance: f32) -> WorldPoint {
        let radians = angles::to_radians(angle_degrees);
        WorldPoint {
            x: self.x + radians.cos() * distance,
            y: self.y + radians.sin() * distance,
        }
    }
}

/// Animation state of a door cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorState {
    /// The door blocks movement and rays.
    Closed,
    /// The door is retracted and behaves like an empty cell.
    Open,
}

impl DoorState {
    /// State reached after one completed toggle cycle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// Contents of a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable floor.
    Empty,
    /// Solid wall.
    Wall,
    /// Door in the given animation state.
    Door(DoorState),
    /// Health pack waiting to be collected.
    HealthPickup,
    /// Ammunition cache waiting to be collected.
    AmmoPickup,
}

impl Tile {
    /// Whether the tile stops movement and terminates rays.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Wall | Self::Door(DoorState::Closed))
    }
}

/// Kind of collectible consumed from a map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restores player health.
    Health,
    /// Refills every ammunition pool.
    Ammo,
}

/// Read-only view into the dense tile grid.
///
/// Out-of-bounds queries resolve to [`Tile::Wall`]: the map is conceptually
/// surrounded by solid rock, so lookups fail closed rather than erroring.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    cells: &'a [Tile],
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Tile], columns: u32, rows: u32, tile_length: f32) -> Self {
        debug_assert_eq!(cells.len(), columns as usize * rows as usize);
        Self {
            cells,
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Returns the tile stored at the provided cell, walling off the exterior.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Tile {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(Tile::Wall)
    }

    /// Cell containing the continuous coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell_containing(&self, x: f32, y: f32) -> Option<CellCoord> {
        let column = (x / self.tile_length).floor();
        let row = (y / self.tile_length).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        let column = column as u32;
        let row = row as u32;
        if column < self.columns && row < self.rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }

    /// Tile containing the continuous coordinate, walling off the exterior.
    #[must_use]
    pub fn tile_at_point(&self, x: f32, y: f32) -> Tile {
        self.cell_containing(x, y)
            .map_or(Tile::Wall, |cell| self.tile_at(cell))
    }

    /// Whether the continuous coordinate lies inside a blocking tile.
    #[must_use]
    pub fn is_blocking_at(&self, x: f32, y: f32) -> bool {
        self.tile_at_point(x, y).is_blocking()
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + 'a {
        self.cells.iter().copied()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an enemy for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioral state an enemy occupies between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Player is out of range; the enemy holds position.
    Idle,
    /// Player is within chase range; the enemy advances.
    Chasing,
    /// Player is within melee range; the enemy strikes on cooldown.
    Attacking,
}

/// Weapons available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Single precise shot with a small spray cone.
    Pistol,
    /// Eight-pellet spread, each pellet at half damage.
    Shotgun,
    /// Wide cone that damages every enemy in range, walls notwithstanding.
    Bfg,
}

impl WeaponKind {
    /// Static firing profile for the weapon.
    #[must_use]
    pub const fn profile(self) -> WeaponProfile {
        match self {
            Self::Pistol => WeaponProfile {
                name: "pistol",
                base_damage: 20,
                pellet_count: 1,
                spread_degrees: 5.0,
            },
            Self::Shotgun => WeaponProfile {
                name: "shotgun",
                base_damage: 15,
                pellet_count: 8,
                spread_degrees: 15.0,
            },
            Self::Bfg => WeaponProfile {
                name: "BFG",
                base_damage: 100,
                pellet_count: 1,
                spread_degrees: 30.0,
            },
        }
    }
}

/// Static description of a weapon's firing behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponProfile {
    /// Display name shown on the HUD.
    pub name: &'static str,
    /// Nominal damage per pellet before falloff and pellet halving.
    pub base_damage: u32,
    /// Pellets resolved per trigger pull.
    pub pellet_count: u32,
    /// Maximum angular deviation applied to each pellet.
    pub spread_degrees: f32,
}

/// Ammunition counts per weapon pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoReserves {
    /// Rounds available to the pistol.
    pub pistol: u32,
    /// Shells available to the shotgun.
    pub shotgun: u32,
    /// Charges available to the BFG.
    pub bfg: u32,
}

impl AmmoReserves {
    /// Creates reserves with explicit per-pool counts.
    #[must_use]
    pub const fn new(pistol: u32, shotgun: u32, bfg: u32) -> Self {
        Self {
            pistol,
            shotgun,
            bfg,
        }
    }

    /// Rounds remaining in the pool feeding the provided weapon.
    #[must_use]
    pub const fn for_weapon(&self, weapon: WeaponKind) -> u32 {
        match weapon {
            WeaponKind::Pistol => self.pistol,
            WeaponKind::Shotgun => self.shotgun,
            WeaponKind::Bfg => self.bfg,
        }
    }
}

/// Direction of a movement intent relative to the player's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    /// Along the facing angle.
    Forward,
    /// Against the facing angle.
    Backward,
    /// Perpendicular, 90 degrees counter-clockwise of facing.
    StrafeLeft,
    /// Perpendicular, 90 degrees clockwise of facing.
    StrafeRight,
}

/// Movement speed the player is currently using.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pace {
    /// Default movement speed.
    Walk,
    /// Doubled movement speed while sprinting.
    Sprint,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Resets the session to its initial spawn configuration.
    NewGame,
    /// Advances the simulation by exactly one fixed tick.
    Tick,
    /// Queues one step of movement for the next tick.
    Move {
        /// Direction of travel relative to the current facing.
        direction: MoveDirection,
    },
    /// Queues a rotation of the player's facing for the next tick.
    Rotate {
        /// Signed rotation in degrees; positive turns clockwise.
        delta_degrees: f32,
    },
    /// Selects the player's movement speed.
    SetPace {
        /// Pace to activate.
        pace: Pace,
    },
    /// Equips the requested weapon.
    SwitchWeapon {
        /// Weapon to equip.
        weapon: WeaponKind,
    },
    /// Fires the equipped weapon, resolving hits synchronously.
    FireWeapon,
    /// Actuates the door ahead of the player and collects underfoot pickups.
    Interact,
}

/// Events broadcast by the world after processing commands.
///
/// Events are the only signal channel out of the simulation: the audio
/// collaborator maps them to cues, the session loop watches for the
/// terminal condition, and tests assert against them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The session returned to its initial spawn configuration.
    SessionReset,
    /// One fixed tick of simulated time elapsed.
    TimeAdvanced,
    /// A weapon discharged one use of ammunition.
    ShotFired {
        /// Weapon that fired.
        weapon: WeaponKind,
    },
    /// A trigger pull was rejected because its ammunition pool was empty.
    FireRejected {
        /// Weapon whose pool was empty.
        weapon: WeaponKind,
    },
    /// An enemy absorbed a non-lethal hit.
    EnemyHit {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Hit points subtracted after falloff.
        damage: u32,
    },
    /// An enemy's health reached zero and it was marked dead.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// The player absorbed a melee strike.
    PlayerDamaged {
        /// Hit points subtracted.
        amount: u32,
        /// Health remaining after the strike.
        remaining: u32,
    },
    /// The player's health reached zero; the session awaits a restart.
    PlayerDown,
    /// A door began animating toward its opposite state.
    DoorActuated {
        /// Cell containing the door.
        cell: CellCoord,
    },
    /// A door animation completed and the cell flipped state.
    DoorToggled {
        /// Cell containing the door.
        cell: CellCoord,
        /// State the door settled into.
        state: DoorState,
    },
    /// A pickup was consumed from the map.
    PickupCollected {
        /// Cell the pickup occupied.
        cell: CellCoord,
        /// Kind of pickup collected.
        kind: PickupKind,
    },
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Continuous world position.
    pub position: WorldPoint,
    /// Facing angle in degrees, normalized to `[0, 360)`.
    pub facing_degrees: f32,
    /// Active movement pace.
    pub pace: Pace,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Weapon currently equipped.
    pub weapon: WeaponKind,
    /// Ammunition remaining per pool.
    pub ammo: AmmoReserves,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Stable identifier assigned at spawn.
    pub id: EnemyId,
    /// Continuous world position.
    pub position: WorldPoint,
    /// Facing angle derived during the most recent update.
    pub facing_degrees: f32,
    /// Behavioral state after the most recent update.
    pub state: EnemyState,
    /// Remaining health; zero once dead.
    pub health: u32,
    /// Whether the enemy has been killed.
    pub dead: bool,
}

/// Read-only snapshot describing every enemy in the arena.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over enemies that are still alive, in spawn order.
    pub fn iter_living(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter().filter(|snapshot| !snapshot.dead)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn normalize_wraps_into_range() {
        assert_eq!(angles::normalize_degrees(370.0), 10.0);
        assert_eq!(angles::normalize_degrees(-90.0), 270.0);
        assert_eq!(angles::normalize_degrees(0.0), 0.0);
        assert_eq!(angles::normalize_degrees(360.0), 0.0);
    }

    #[test]
    fn relative_angle_picks_shortest_rotation() {
        assert_eq!(angles::relative_degrees(350.0, 10.0), -20.0);
        assert_eq!(angles::relative_degrees(10.0, 350.0), 20.0);
        assert_eq!(angles::relative_degrees(90.0, 90.0), 0.0);
        assert_eq!(angles::relative_degrees(270.0, 90.0), -180.0);
    }

    #[test]
    fn bearing_matches_cardinal_directions() {
        let origin = WorldPoint::new(0.0, 0.0);
        assert!((origin.bearing_to_degrees(WorldPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-4);
        assert!((origin.bearing_to_degrees(WorldPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((origin.bearing_to_degrees(WorldPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn blocking_covers_walls_and_closed_doors_only() {
        assert!(Tile::Wall.is_blocking());
        assert!(Tile::Door(DoorState::Closed).is_blocking());
        assert!(!Tile::Door(DoorState::Open).is_blocking());
        assert!(!Tile::Empty.is_blocking());
        assert!(!Tile::HealthPickup.is_blocking());
        assert!(!Tile::AmmoPickup.is_blocking());
    }

    #[test]
    fn tile_view_fails_closed_outside_bounds() {
        let cells = vec![Tile::Empty; 4];
        let view = TileView::new(&cells, 2, 2, 64.0);

        assert_eq!(view.tile_at(CellCoord::new(5, 0)), Tile::Wall);
        assert_eq!(view.tile_at_point(-1.0, 32.0), Tile::Wall);
        assert_eq!(view.tile_at_point(32.0, 1000.0), Tile::Wall);
        assert!(view.is_blocking_at(-0.1, -0.1));
        assert_eq!(view.tile_at_point(32.0, 32.0), Tile::Empty);
    }

    #[test]
    fn cell_containing_truncates_toward_tile_origin() {
        let cells = vec![Tile::Empty; 9];
        let view = TileView::new(&cells, 3, 3, 64.0);

        assert_eq!(view.cell_containing(63.9, 0.0), Some(CellCoord::new(0, 0)));
        assert_eq!(view.cell_containing(64.0, 64.0), Some(CellCoord::new(1, 1)));
        assert_eq!(view.cell_containing(192.0, 0.0), None);
    }

    #[test]
    fn weapon_profiles_match_expectations() {
        let pistol = WeaponKind::Pistol.profile();
        assert_eq!(pistol.base_damage, 20);
        assert_eq!(pistol.pellet_count, 1);
        assert_eq!(pistol.spread_degrees, 5.0);

        let shotgun = WeaponKind::Shotgun.profile();
        assert_eq!(shotgun.base_damage, 15);
        assert_eq!(shotgun.pellet_count, 8);
        assert_eq!(shotgun.spread_degrees, 15.0);

        let bfg = WeaponKind::Bfg.profile();
        assert_eq!(bfg.base_damage, 100);
        assert_eq!(bfg.spread_degrees, 30.0);
    }

    #[test]
    fn ammo_reserves_route_by_weapon() {
        let reserves = AmmoReserves::new(50, 20, 5);
        assert_eq!(reserves.for_weapon(WeaponKind::Pistol), 50);
        assert_eq!(reserves.for_weapon(WeaponKind::Shotgun), 20);
        assert_eq!(reserves.for_weapon(WeaponKind::Bfg), 5);
    }

    #[test]
    fn enemy_view_sorts_by_spawn_order() {
        let view = EnemyView::from_snapshots(vec![
            enemy_snapshot(2, false),
            enemy_snapshot(0, true),
            enemy_snapshot(1, false),
        ]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let living: Vec<u32> = view
            .iter_living()
            .map(|snapshot| snapshot.id.get())
            .collect();
        assert_eq!(living, vec![1, 2]);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(7, 11));
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::Door(DoorState::Open));
        assert_round_trip(&Tile::AmmoPickup);
    }

    #[test]
    fn weapon_kind_round_trips_through_bincode() {
        assert_round_trip(&WeaponKind::Shotgun);
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(3));
    }

    fn enemy_snapshot(id: u32, dead: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: WorldPoint::new(0.0, 0.0),
            facing_degrees: 0.0,
            state: EnemyState::Idle,
            health: if dead { 0 } else { 100 },
            dead,
        }
    }
}
