#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering and audio contracts for Grim Halls adapters.
//!
//! The simulation never draws or plays anything itself. Each frame the
//! session composes a [`Scene`] from world snapshots and the visibility
//! buffer; a [`RenderingBackend`] presents it and reports the player's raw
//! intent back through [`FrameInput`]. Audio is a capability: the core emits
//! events unconditionally, [`cue_for_event`] maps them to cues, and an
//! [`AudioSink`] decides playable versus silent without ever failing into
//! the simulation.

use anyhow::Result as AnyResult;
use glam::Vec2;
use grim_halls_core::{AmmoReserves, Event, Tile, WeaponKind};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);

        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by the backend before updating the scene.
///
/// Movement flags reflect held keys; everything else is edge-triggered and
/// true for exactly the frame the press was observed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Move along the facing angle.
    pub move_forward: bool,
    /// Move against the facing angle.
    pub move_backward: bool,
    /// Strafe 90 degrees counter-clockwise of facing.
    pub strafe_left: bool,
    /// Strafe 90 degrees clockwise of facing.
    pub strafe_right: bool,
    /// Whether the sprint modifier is held.
    pub sprinting: bool,
    /// Signed rotation accumulated over the frame, in degrees.
    pub rotation_degrees: f32,
    /// Trigger pull observed this frame.
    pub fire: bool,
    /// Interaction press observed this frame.
    pub interact: bool,
    /// Weapon selection press observed this frame.
    pub select_weapon: Option<WeaponKind>,
    /// Pause toggle press observed this frame.
    pub pause_toggle: bool,
    /// Restart press observed this frame.
    pub restart: bool,
}

/// One screen column of wall, already fisheye-corrected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSlice {
    /// Perpendicular distance to the wall face in world units.
    pub distance: f32,
    /// Tile that was struck; selects the surface tint.
    pub tile: Tile,
    /// Offset along the struck face for texture sampling, `[0, tile_length)`.
    pub texture_offset: f32,
    /// Whether the slice struck a vertical grid face and should be dimmed.
    pub shaded: bool,
}

/// Kind of billboard sprite projected into the first-person view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    /// A living enemy.
    Enemy,
    /// An uncollected health pack.
    HealthPickup,
    /// An uncollected ammo cache.
    AmmoPickup,
}

/// A visible sprite positioned relative to the player's facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteBillboard {
    /// What the sprite depicts.
    pub kind: SpriteKind,
    /// Angular offset from the facing direction, degrees, negative is left.
    pub relative_degrees: f32,
    /// Straight-line distance from the player in world units.
    pub distance: f32,
}

/// Player status shown on the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudModel {
    /// Current player health.
    pub health: u32,
    /// Player health ceiling.
    pub max_health: u32,
    /// Weapon currently equipped.
    pub weapon: WeaponKind,
    /// Ammunition remaining per pool.
    pub ammo: AmmoReserves,
}

/// Top-down overview drawn in a screen corner.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimapModel {
    /// Number of tile columns in the snapshot.
    pub columns: u32,
    /// Number of tile rows in the snapshot.
    pub rows: u32,
    /// Row-major copy of the tile grid.
    pub tiles: Vec<Tile>,
    /// Player position in tile units.
    pub player_position_tiles: Vec2,
    /// Player facing angle in degrees.
    pub player_facing_degrees: f32,
    /// Living enemy positions in tile units.
    pub enemy_positions_tiles: Vec<Vec2>,
}

/// Full-screen state overlay drawn above the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    /// Simulation is paused; rendering continues.
    Paused,
    /// The player is down and the session awaits a restart.
    Down,
}

/// Scene description consumed by rendering backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Fill for the upper half of the viewport.
    pub sky_color: Color,
    /// Fill for the lower half of the viewport.
    pub floor_color: Color,
    /// Tile edge length in world units, for projecting wall heights.
    pub tile_length: f32,
    /// Field of view the wall slices span, for projecting sprite columns.
    pub fov_degrees: f32,
    /// One corrected wall sample per screen column, left to right.
    pub wall_slices: Vec<WallSlice>,
    /// Visible sprites, ordered far to near for painter's-algorithm drawing.
    pub sprites: Vec<SpriteBillboard>,
    /// Player status for the heads-up display.
    pub hud: HudModel,
    /// Optional top-down overview.
    pub minimap: Option<MinimapModel>,
    /// Optional full-screen state overlay.
    pub overlay: Option<OverlayKind>,
}

impl Scene {
    /// Creates an empty scene showing only sky, floor and HUD.
    #[must_use]
    pub fn new(
        sky_color: Color,
        floor_color: Color,
        tile_length: f32,
        fov_degrees: f32,
        hud: HudModel,
    ) -> Self {
        Self {
            sky_color,
            floor_color,
            tile_length,
            fov_degrees,
            wall_slices: Vec::new(),
            sprites: Vec::new(),
            hud,
            minimap: None,
            overlay: None,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Grim Halls scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the backend, and may mutate the scene before it is
    /// rendered. The backend owns window lifetime and the quit chord; the
    /// closure owns everything the simulation decides.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Fire-and-forget sound cues emitted by the simulation's event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Pistol discharge.
    PistolShot,
    /// Shotgun discharge.
    ShotgunBlast,
    /// BFG discharge.
    BfgDischarge,
    /// Enemy absorbed a non-lethal hit.
    EnemyPain,
    /// Enemy died.
    EnemyDeath,
    /// Player absorbed a melee strike.
    PlayerPain,
    /// Door animation started.
    DoorActuated,
    /// Pickup collected.
    PickupChime,
}

/// Maps a simulation event to the cue it should trigger, if any.
#[must_use]
pub fn cue_for_event(event: &Event) -> Option<AudioCue> {
    match event {
        Event::ShotFired { weapon } => Some(match weapon {
            WeaponKind::Pistol => AudioCue::PistolShot,
            WeaponKind::Shotgun => AudioCue::ShotgunBlast,
            WeaponKind::Bfg => AudioCue::BfgDischarge,
        }),
        Event::EnemyHit { .. } => Some(AudioCue::EnemyPain),
        Event::EnemyKilled { .. } => Some(AudioCue::EnemyDeath),
        Event::PlayerDamaged { .. } => Some(AudioCue::PlayerPain),
        Event::DoorActuated { .. } => Some(AudioCue::DoorActuated),
        Event::PickupCollected { .. } => Some(AudioCue::PickupChime),
        Event::SessionReset
        | Event::TimeAdvanced
        | Event::FireRejected { .. }
        | Event::PlayerDown
        | Event::DoorToggled { .. } => None,
    }
}

/// Destination for audio cues.
///
/// Implementations decide internally whether a cue is playable; playback
/// failure is never surfaced to the caller.
pub trait AudioSink {
    /// Plays the provided cue, or silently drops it.
    fn play(&mut self, cue: AudioCue);
}

/// Sink that swallows every cue, for headless runs and environments without
/// an audio stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use grim_halls_core::{CellCoord, DoorState, EnemyId, PickupKind};

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(100, 150, 200).lighten(0.5);
        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 150.0 / 255.0);
        assert!(color.blue > 200.0 / 255.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn darken_scales_channels_towards_black() {
        let color = Color::from_rgb_u8(100, 150, 200).darken(0.5);
        assert!((color.red - 50.0 / 255.0).abs() < 1e-4);
        assert!((color.green - 75.0 / 255.0).abs() < 1e-4);
        assert!((color.blue - 100.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn shade_amounts_are_clamped() {
        let color = Color::from_rgb_u8(10, 20, 30);
        assert_eq!(color.darken(2.0).red, 0.0);
        assert_eq!(color.lighten(2.0).red, 1.0);
    }

    #[test]
    fn weapon_discharges_map_to_distinct_cues() {
        assert_eq!(
            cue_for_event(&Event::ShotFired {
                weapon: WeaponKind::Pistol
            }),
            Some(AudioCue::PistolShot)
        );
        assert_eq!(
            cue_for_event(&Event::ShotFired {
                weapon: WeaponKind::Shotgun
            }),
            Some(AudioCue::ShotgunBlast)
        );
        assert_eq!(
            cue_for_event(&Event::ShotFired {
                weapon: WeaponKind::Bfg
            }),
            Some(AudioCue::BfgDischarge)
        );
    }

    #[test]
    fn combat_and_world_events_carry_their_cues() {
        assert_eq!(
            cue_for_event(&Event::EnemyHit {
                enemy: EnemyId::new(0),
                damage: 10
            }),
            Some(AudioCue::EnemyPain)
        );
        assert_eq!(
            cue_for_event(&Event::EnemyKilled {
                enemy: EnemyId::new(0)
            }),
            Some(AudioCue::EnemyDeath)
        );
        assert_eq!(
            cue_for_event(&Event::DoorActuated {
                cell: CellCoord::new(1, 1)
            }),
            Some(AudioCue::DoorActuated)
        );
        assert_eq!(
            cue_for_event(&Event::PickupCollected {
                cell: CellCoord::new(1, 1),
                kind: PickupKind::Ammo
            }),
            Some(AudioCue::PickupChime)
        );
    }

    #[test]
    fn bookkeeping_events_are_silent() {
        assert_eq!(cue_for_event(&Event::TimeAdvanced), None);
        assert_eq!(cue_for_event(&Event::SessionReset), None);
        assert_eq!(cue_for_event(&Event::PlayerDown), None);
        assert_eq!(
            cue_for_event(&Event::DoorToggled {
                cell: CellCoord::new(1, 1),
                state: DoorState::Open
            }),
            None
        );
        assert_eq!(
            cue_for_event(&Event::FireRejected {
                weapon: WeaponKind::Pistol
            }),
            None
        );
    }

    #[test]
    fn silent_audio_swallows_cues() {
        let mut sink = SilentAudio;
        sink.play(AudioCue::EnemyDeath);
    }
}
