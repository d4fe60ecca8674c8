#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Grim Halls.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in containerised CI environments. We
//! therefore depend on macroquad without its default `audio` feature and the
//! session routes cues into a silent sink; consumers that want sound can
//! enable `macroquad/audio` in their own dependency specification and supply
//! a real [`grim_halls_rendering::AudioSink`].
//!
//! The backend owns the window, the per-frame input poll, and the projection
//! of the scene's wall slices and sprite billboards; everything it draws
//! comes out of the [`Scene`] the session closure populated.

mod config;

pub use config::DisplayConfig;

use anyhow::Result;
use grim_halls_core::{Tile, WeaponKind};
use grim_halls_rendering::{
    Color, FrameInput, HudModel, MinimapModel, OverlayKind, Presentation, RenderingBackend, Scene,
    SpriteKind,
};
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::time::Duration;

/// Degrees per second of rotation while an arrow key is held.
const KEY_TURN_RATE: f32 = 180.0;
/// Fraction of the screen height a wall or sprite may grow to.
const MAX_PROJECTED_SCALE: f32 = 2.0;
/// Extra darkening applied to vertical-face wall slices.
const VERTICAL_FACE_SHADE: f32 = 0.2;
/// Edge length of the minimap in pixels.
const MINIMAP_SIZE: f32 = 120.0;

const WALL_TINT: Color = Color::from_rgb_u8(150, 75, 0);
const DOOR_TINT: Color = Color::from_rgb_u8(100, 50, 0);
const HEALTH_TINT: Color = Color::from_rgb_u8(200, 0, 0);
const AMMO_TINT: Color = Color::from_rgb_u8(200, 200, 0);
const ENEMY_BODY_TINT: Color = Color::from_rgb_u8(200, 20, 20);
const ENEMY_CORE_TINT: Color = Color::from_rgb_u8(50, 50, 50);
const FLOOR_DETAIL_TINT: Color = Color::from_rgb_u8(50, 50, 50);
const PLAYER_MARKER_TINT: Color = Color::from_rgb_u8(0, 255, 0);
const TEXT_TINT: Color = Color::from_rgb_u8(255, 255, 255);
const WARNING_TINT: Color = Color::from_rgb_u8(255, 255, 0);
const DANGER_TINT: Color = Color::from_rgb_u8(255, 0, 0);

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    config: DisplayConfig,
}

impl MacroquadBackend {
    /// Returns a backend using the default display configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a backend using the provided display configuration.
    #[must_use]
    pub const fn with_config(config: DisplayConfig) -> Self {
        Self { config }
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self { config } = self;
        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let conf = macroquad::window::Conf {
            window_title,
            window_width: config.window_width,
            window_height: config.window_height,
            ..macroquad::window::Conf::default()
        };

        macroquad::Window::from_config(conf, async move {
            let background = to_macroquad_color(clear_color);
            let mut scene = scene;
            let mut mouse_anchor: Option<f32> = None;

            loop {
                if quit_requested() {
                    break;
                }

                macroquad::window::clear_background(background);

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let frame_input =
                    gather_frame_input(frame_dt, &mut mouse_anchor, config.mouse_sensitivity);

                update_scene(frame_dt, frame_input, &mut scene);
                draw_scene(&scene, config.show_minimap);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn quit_requested() -> bool {
    let control_held = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
    control_held && is_key_pressed(KeyCode::Q)
}

fn gather_frame_input(
    frame_dt: Duration,
    mouse_anchor: &mut Option<f32>,
    mouse_sensitivity: f32,
) -> FrameInput {
    let mut rotation_degrees = 0.0;
    let turn_step = KEY_TURN_RATE * frame_dt.as_secs_f32();
    if is_key_down(KeyCode::Left) {
        rotation_degrees -= turn_step;
    }
    if is_key_down(KeyCode::Right) {
        rotation_degrees += turn_step;
    }

    let (mouse_x, _) = mouse_position();
    if let Some(anchor) = *mouse_anchor {
        rotation_degrees += (mouse_x - anchor) * mouse_sensitivity;
    }
    *mouse_anchor = Some(mouse_x);

    let select_weapon = if is_key_pressed(KeyCode::Key1) {
        Some(WeaponKind::Pistol)
    } else if is_key_pressed(KeyCode::Key2) {
        Some(WeaponKind::Shotgun)
    } else if is_key_pressed(KeyCode::Key3) {
        Some(WeaponKind::Bfg)
    } else {
        None
    };

    FrameInput {
        move_forward: is_key_down(KeyCode::W),
        move_backward: is_key_down(KeyCode::S),
        strafe_left: is_key_down(KeyCode::A),
        strafe_right: is_key_down(KeyCode::D),
        sprinting: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
        rotation_degrees,
        fire: is_mouse_button_pressed(MouseButton::Left) || is_key_pressed(KeyCode::Space),
        interact: is_key_pressed(KeyCode::E),
        select_weapon,
        pause_toggle: is_key_pressed(KeyCode::Escape),
        restart: is_key_pressed(KeyCode::R),
    }
}

fn draw_scene(scene: &Scene, show_minimap: bool) {
    let width = macroquad::window::screen_width();
    let height = macroquad::window::screen_height();

    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        width,
        height / 2.0,
        to_macroquad_color(scene.sky_color),
    );
    macroquad::shapes::draw_rectangle(
        0.0,
        height / 2.0,
        width,
        height / 2.0,
        to_macroquad_color(scene.floor_color),
    );

    draw_wall_slices(scene, width, height);
    draw_sprites(scene, width, height);
    draw_hud(&scene.hud, height);

    if show_minimap {
        if let Some(minimap) = &scene.minimap {
            draw_minimap(minimap, width);
        }
    }

    if let Some(overlay) = scene.overlay {
        draw_overlay(overlay, width, height);
    }
}

fn draw_wall_slices(scene: &Scene, width: f32, height: f32) {
    let count = scene.wall_slices.len();
    if count == 0 {
        return;
    }

    let column_width = width / count as f32;
    for (index, slice) in scene.wall_slices.iter().enumerate() {
        if slice.distance <= 0.0 {
            continue;
        }

        let wall_height =
            (height * scene.tile_length / slice.distance).min(height * MAX_PROJECTED_SCALE);
        let mut tint = surface_tint(slice.tile);
        if slice.shaded {
            tint = tint.darken(VERTICAL_FACE_SHADE);
        }
        // Grout lines every eight texels, sampled from the face offset.
        if slice.texture_offset.rem_euclid(8.0) < 1.0 {
            tint = tint.darken(0.35);
        }

        macroquad::shapes::draw_rectangle(
            index as f32 * column_width,
            (height - wall_height) / 2.0,
            column_width.ceil(),
            wall_height,
            to_macroquad_color(tint),
        );
    }
}

fn draw_sprites(scene: &Scene, width: f32, height: f32) {
    if scene.fov_degrees <= 0.0 {
        return;
    }

    for sprite in &scene.sprites {
        if sprite.distance <= 0.0 {
            continue;
        }

        let center_x = width / 2.0 + sprite.relative_degrees / scene.fov_degrees * width;
        let center_y = height / 2.0;

        match sprite.kind {
            SpriteKind::Enemy => {
                let size = (height * scene.tile_length / sprite.distance)
                    .min(height * MAX_PROJECTED_SCALE);
                macroquad::shapes::draw_circle(
                    center_x,
                    center_y,
                    size / 3.0,
                    to_macroquad_color(ENEMY_BODY_TINT),
                );
                macroquad::shapes::draw_circle(
                    center_x,
                    center_y,
                    size / 4.0,
                    to_macroquad_color(ENEMY_CORE_TINT),
                );
            }
            SpriteKind::HealthPickup | SpriteKind::AmmoPickup => {
                let size = (height * scene.tile_length / sprite.distance / 2.0).min(height);
                let tint = if sprite.kind == SpriteKind::HealthPickup {
                    HEALTH_TINT
                } else {
                    AMMO_TINT
                };
                macroquad::shapes::draw_rectangle(
                    center_x - size / 2.0,
                    center_y - size / 2.0,
                    size,
                    size,
                    to_macroquad_color(tint),
                );
            }
        }
    }
}

fn draw_hud(hud: &HudModel, height: f32) {
    let health_tint = if hud.health < 25 { DANGER_TINT } else { TEXT_TINT };
    macroquad::text::draw_text(
        &format!("Health: {}", hud.health),
        10.0,
        height - 52.0,
        24.0,
        to_macroquad_color(health_tint),
    );

    let (label, rounds, low_mark) = match hud.weapon {
        WeaponKind::Pistol => ("Pistol", hud.ammo.pistol, 10),
        WeaponKind::Shotgun => ("Shotgun", hud.ammo.shotgun, 5),
        WeaponKind::Bfg => ("BFG", hud.ammo.bfg, 2),
    };
    let ammo_tint = if rounds < low_mark { WARNING_TINT } else { TEXT_TINT };
    macroquad::text::draw_text(
        &format!("{label}: {rounds}"),
        10.0,
        height - 22.0,
        24.0,
        to_macroquad_color(ammo_tint),
    );

    let selector = "1:Pistol 2:Shotgun 3:BFG";
    let metrics = macroquad::text::measure_text(selector, None, 24, 1.0);
    macroquad::text::draw_text(
        selector,
        macroquad::window::screen_width() - metrics.width - 10.0,
        height - 22.0,
        24.0,
        to_macroquad_color(TEXT_TINT),
    );
}

fn draw_minimap(minimap: &MinimapModel, screen_width: f32) {
    let span = minimap.columns.max(minimap.rows).max(1) as f32;
    let tile = MINIMAP_SIZE / span;
    let origin_x = screen_width - MINIMAP_SIZE - 10.0;
    let origin_y = 10.0;

    macroquad::shapes::draw_rectangle(
        origin_x,
        origin_y,
        MINIMAP_SIZE,
        MINIMAP_SIZE,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.5),
    );

    for row in 0..minimap.rows {
        for column in 0..minimap.columns {
            let index = (row * minimap.columns + column) as usize;
            let Some(cell) = minimap.tiles.get(index) else {
                continue;
            };
            let tint = match cell {
                Tile::Wall => WALL_TINT,
                Tile::Door(_) => DOOR_TINT,
                Tile::HealthPickup => HEALTH_TINT,
                Tile::AmmoPickup => AMMO_TINT,
                Tile::Empty => FLOOR_DETAIL_TINT,
            };
            macroquad::shapes::draw_rectangle(
                origin_x + column as f32 * tile,
                origin_y + row as f32 * tile,
                tile,
                tile,
                to_macroquad_color(tint),
            );
        }
    }

    for enemy in &minimap.enemy_positions_tiles {
        macroquad::shapes::draw_circle(
            origin_x + enemy.x * tile,
            origin_y + enemy.y * tile,
            tile / 3.0,
            to_macroquad_color(ENEMY_BODY_TINT),
        );
    }

    let player_x = origin_x + minimap.player_position_tiles.x * tile;
    let player_y = origin_y + minimap.player_position_tiles.y * tile;
    macroquad::shapes::draw_circle(
        player_x,
        player_y,
        tile / 2.0,
        to_macroquad_color(PLAYER_MARKER_TINT),
    );

    let heading = minimap.player_facing_degrees.to_radians();
    macroquad::shapes::draw_line(
        player_x,
        player_y,
        player_x + heading.cos() * tile,
        player_y + heading.sin() * tile,
        2.0,
        to_macroquad_color(PLAYER_MARKER_TINT),
    );
}

fn draw_overlay(overlay: OverlayKind, width: f32, height: f32) {
    let (veil, title, hint) = match overlay {
        OverlayKind::Paused => (
            macroquad::color::Color::new(0.0, 0.0, 0.0, 0.5),
            "PAUSED",
            "Press ESC to resume",
        ),
        OverlayKind::Down => (
            macroquad::color::Color::new(0.8, 0.0, 0.0, 0.5),
            "YOU DIED",
            "Press R to restart",
        ),
    };

    macroquad::shapes::draw_rectangle(0.0, 0.0, width, height, veil);

    let title_metrics = macroquad::text::measure_text(title, None, 48, 1.0);
    macroquad::text::draw_text(
        title,
        (width - title_metrics.width) / 2.0,
        height / 2.0,
        48.0,
        to_macroquad_color(DANGER_TINT),
    );

    let hint_metrics = macroquad::text::measure_text(hint, None, 24, 1.0);
    macroquad::text::draw_text(
        hint,
        (width - hint_metrics.width) / 2.0,
        height / 2.0 + 50.0,
        24.0,
        to_macroquad_color(TEXT_TINT),
    );
}

fn surface_tint(tile: Tile) -> Color {
    match tile {
        Tile::Door(_) => DOOR_TINT,
        _ => WALL_TINT,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
