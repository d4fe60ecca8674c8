#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Grim Halls experience.

mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use grim_halls_rendering::{Color, Presentation, RenderingBackend, SilentAudio};
use grim_halls_rendering_macroquad::{DisplayConfig, MacroquadBackend};

use session::Session;

/// First-person corridor shooter built on a tile-grid raycaster.
#[derive(Debug, Parser)]
#[command(name = "grim-halls", version)]
struct Args {
    /// Seed for the weapon spray RNG; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Path to a TOML display configuration; defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    display_config: Option<PathBuf>,

    /// Simulate the given number of ticks without opening a window.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let spray_seed = args.seed.unwrap_or_else(rand::random);

    if let Some(ticks) = args.headless {
        return session::run_headless(spray_seed, ticks);
    }

    let config = match &args.display_config {
        Some(path) => DisplayConfig::load(path)?,
        None => DisplayConfig::default(),
    };

    let mut game = Session::new(spray_seed, config.ray_count, config.fov_degrees);
    println!("{}", game.welcome_banner());

    let presentation = Presentation::new(
        "Grim Halls",
        Color::from_rgb_u8(0, 0, 0),
        game.initial_scene(),
    );
    let backend = MacroquadBackend::with_config(config);
    let mut audio = SilentAudio;

    backend.run(presentation, move |frame_dt, input, scene| {
        game.advance_frame(frame_dt, input, &mut audio);
        game.compose_scene(scene);
    })
}
