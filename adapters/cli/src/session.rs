//! Fixed-tick session driving the simulation from frame input.
//!
//! The rendering backend hands over wall-clock frame deltas; the session
//! converts them into a fixed 60 Hz tick stream, translates [`FrameInput`]
//! into world commands, forwards events to the audio sink, and recomposes
//! the scene the backend draws next.

use std::time::Duration;

use glam::Vec2;
use grim_halls_core::{angles, CellCoord, Command, Event, MoveDirection, Pace, Tile, WorldPoint};
use grim_halls_rendering::{
    cue_for_event, AudioSink, Color, FrameInput, HudModel, MinimapModel, OverlayKind, Scene,
    SpriteBillboard, SpriteKind, WallSlice,
};
use grim_halls_system_raycast::HitAxis;
use grim_halls_system_visibility::Visibility;
use grim_halls_world::{self as world, query, World};

/// Fixed simulation rate enforced by the session, not the world.
pub(crate) const TICKS_PER_SECOND: u32 = 60;
const TICK: Duration = Duration::from_nanos(1_000_000_000 / TICKS_PER_SECOND as u64);
/// A stalled frame pays at most this many catch-up ticks.
const MAX_BACKLOG_TICKS: u32 = 4;

/// Upper-viewport fill.
pub(crate) const SKY_COLOR: Color = Color::from_rgb_u8(50, 50, 100);
/// Lower-viewport fill.
pub(crate) const FLOOR_COLOR: Color = Color::from_rgb_u8(50, 50, 50);

/// One interactive game session: world, visibility index and pacing state.
pub(crate) struct Session {
    world: World,
    visibility: Visibility,
    accumulator: Duration,
    paused: bool,
    ray_count: usize,
    fov_degrees: f32,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(spray_seed: u64, ray_count: usize, fov_degrees: f32) -> Self {
        let mut session = Self {
            world: World::with_seed(spray_seed),
            visibility: Visibility::new(),
            accumulator: Duration::ZERO,
            paused: false,
            ray_count,
            fov_degrees,
            events: Vec::new(),
        };
        session.rebuild_visibility();
        session
    }

    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Consumes one frame of wall-clock time and input.
    pub(crate) fn advance_frame<A>(&mut self, frame_dt: Duration, input: FrameInput, audio: &mut A)
    where
        A: AudioSink,
    {
        self.events.clear();

        if input.pause_toggle {
            self.paused = !self.paused;
        }
        if input.restart && query::is_down(&self.world) {
            self.submit(Command::NewGame);
        }
        if self.paused {
            return;
        }

        if let Some(weapon) = input.select_weapon {
            self.submit(Command::SwitchWeapon { weapon });
        }
        let pace = if input.sprinting {
            Pace::Sprint
        } else {
            Pace::Walk
        };
        self.submit(Command::SetPace { pace });
        if input.rotation_degrees != 0.0 {
            self.submit(Command::Rotate {
                delta_degrees: input.rotation_degrees,
            });
        }
        if input.fire {
            self.submit(Command::FireWeapon);
        }
        if input.interact {
            self.submit(Command::Interact);
        }

        self.accumulator += frame_dt;
        if self.accumulator > TICK * MAX_BACKLOG_TICKS {
            self.accumulator = TICK * MAX_BACKLOG_TICKS;
        }
        while self.accumulator >= TICK {
            self.accumulator -= TICK;
            for direction in held_directions(input) {
                self.submit(Command::Move { direction });
            }
            self.submit(Command::Tick);
        }

        for event in &self.events {
            if let Some(cue) = cue_for_event(event) {
                audio.play(cue);
            }
        }

        self.rebuild_visibility();
    }

    /// Repopulates the scene from the current world state.
    pub(crate) fn compose_scene(&self, scene: &mut Scene) {
        let tiles = query::tile_view(&self.world);
        let player = query::player(&self.world);
        let enemies = query::enemy_view(&self.world);
        let buffer = self.visibility.depth_buffer();
        let tile_length = tiles.tile_length();

        scene.sky_color = SKY_COLOR;
        scene.floor_color = FLOOR_COLOR;
        scene.tile_length = tile_length;
        scene.fov_degrees = self.fov_degrees;

        scene.wall_slices.clear();
        scene
            .wall_slices
            .extend(buffer.samples().iter().map(|sample| WallSlice {
                distance: sample.distance,
                tile: sample.tile,
                texture_offset: sample.texture_offset,
                shaded: sample.axis == HitAxis::Vertical,
            }));

        scene.sprites.clear();
        for enemy in enemies.iter_living() {
            let distance = player.position.distance_to(enemy.position);
            let bearing = player.position.bearing_to_degrees(enemy.position);
            let relative = angles::relative_degrees(bearing, player.facing_degrees);
            if buffer.is_visible(relative, distance) {
                scene.sprites.push(SpriteBillboard {
                    kind: SpriteKind::Enemy,
                    relative_degrees: relative,
                    distance,
                });
            }
        }
        for row in 0..tiles.rows() {
            for column in 0..tiles.columns() {
                let cell = CellCoord::new(column, row);
                let kind = match tiles.tile_at(cell) {
                    Tile::HealthPickup => SpriteKind::HealthPickup,
                    Tile::AmmoPickup => SpriteKind::AmmoPickup,
                    _ => continue,
                };
                let center = WorldPoint::new(
                    (column as f32 + 0.5) * tile_length,
                    (row as f32 + 0.5) * tile_length,
                );
                let distance = player.position.distance_to(center);
                let bearing = player.position.bearing_to_degrees(center);
                let relative = angles::relative_degrees(bearing, player.facing_degrees);
                if buffer.is_visible(relative, distance) {
                    scene.sprites.push(SpriteBillboard {
                        kind,
                        relative_degrees: relative,
                        distance,
                    });
                }
            }
        }
        scene
            .sprites
            .sort_by(|a, b| b.distance.total_cmp(&a.distance));

        scene.hud = HudModel {
            health: player.health,
            max_health: player.max_health,
            weapon: player.weapon,
            ammo: player.ammo,
        };

        scene.minimap = Some(MinimapModel {
            columns: tiles.columns(),
            rows: tiles.rows(),
            tiles: tiles.iter().collect(),
            player_position_tiles: Vec2::new(
                player.position.x() / tile_length,
                player.position.y() / tile_length,
            ),
            player_facing_degrees: player.facing_degrees,
            enemy_positions_tiles: enemies
                .iter_living()
                .map(|enemy| {
                    Vec2::new(
                        enemy.position.x() / tile_length,
                        enemy.position.y() / tile_length,
                    )
                })
                .collect(),
        });

        scene.overlay = if query::is_down(&self.world) {
            Some(OverlayKind::Down)
        } else if self.paused {
            Some(OverlayKind::Paused)
        } else {
            None
        };
    }

    /// Builds the scene shown before the first frame of input arrives.
    pub(crate) fn initial_scene(&self) -> Scene {
        let tiles = query::tile_view(&self.world);
        let player = query::player(&self.world);
        let mut scene = Scene::new(
            SKY_COLOR,
            FLOOR_COLOR,
            tiles.tile_length(),
            self.fov_degrees,
            HudModel {
                health: player.health,
                max_health: player.max_health,
                weapon: player.weapon,
                ammo: player.ammo,
            },
        );
        self.compose_scene(&mut scene);
        scene
    }

    fn submit(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn rebuild_visibility(&mut self) {
        let tiles = query::tile_view(&self.world);
        let player = query::player(&self.world);
        self.visibility.rebuild(
            &tiles,
            player.position,
            player.facing_degrees,
            self.ray_count,
            self.fov_degrees,
        );
    }
}

fn held_directions(input: FrameInput) -> impl Iterator<Item = MoveDirection> {
    [
        (input.move_forward, MoveDirection::Forward),
        (input.move_backward, MoveDirection::Backward),
        (input.strafe_left, MoveDirection::StrafeLeft),
        (input.strafe_right, MoveDirection::StrafeRight),
    ]
    .into_iter()
    .filter_map(|(held, direction)| held.then_some(direction))
}

/// Simulates `ticks` world ticks without a window and prints a summary.
pub(crate) fn run_headless(spray_seed: u64, ticks: u64) -> anyhow::Result<()> {
    let mut world = World::with_seed(spray_seed);
    let mut events = Vec::new();
    let mut event_total = 0usize;

    println!("{}", query::welcome_banner(&world));

    for _ in 0..ticks {
        events.clear();
        world::apply(&mut world, Command::Tick, &mut events);
        event_total += events.len();
        if query::is_down(&world) {
            break;
        }
    }

    let player = query::player(&world);
    let living = query::enemy_view(&world).iter_living().count();
    println!(
        "simulated {} ticks: player health {}/{} with {} equipped, {} enemies alive, {} events",
        query::tick_index(&world),
        player.health,
        player.max_health,
        player.weapon.profile().name,
        living,
        event_total
    );
    Ok(())
}
