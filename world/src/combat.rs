//! Weapon fire resolution.
//!
//! A trigger pull is resolved synchronously against the enemy arena. Pistol
//! and shotgun pellets are hitscans occluded by the same ray cast the
//! renderer uses for walls; the BFG sweeps a cone that ignores walls
//! entirely. All randomness draws from the world's seeded spray RNG.

use grim_halls_core::{angles, Event, TileView, WeaponKind, WorldPoint};
use grim_halls_system_raycast as raycast;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::enemies::{DamageOutcome, Enemy};
use crate::Player;

/// Angular tolerance for a pellet to connect with an enemy, in degrees.
const HIT_TOLERANCE_DEGREES: f32 = 5.0;
/// Distance over which pellet damage decays to its floor, in tile-widths.
const FALLOFF_RANGE_TILES: f32 = 10.0;
/// Maximum reach of the BFG cone, in tile-widths.
const BFG_RANGE_TILES: f32 = 10.0;

/// Resolves one trigger pull of the player's equipped weapon.
pub(crate) fn fire(
    tiles: &TileView<'_>,
    player: &mut Player,
    enemies: &mut [Enemy],
    spray_rng: &mut ChaCha8Rng,
    out_events: &mut Vec<Event>,
) {
    let weapon = player.weapon;
    if player.ammo.for_weapon(weapon) == 0 {
        out_events.push(Event::FireRejected { weapon });
        return;
    }

    player.spend_round();
    out_events.push(Event::ShotFired { weapon });

    let profile = weapon.profile();
    match weapon {
        WeaponKind::Pistol => {
            let spray = sprayed_angle(player.facing_degrees, profile.spread_degrees, spray_rng);
            hitscan(
                tiles,
                player.position,
                enemies,
                spray,
                profile.base_damage,
                out_events,
            );
        }
        WeaponKind::Shotgun => {
            for _ in 0..profile.pellet_count {
                let spray =
                    sprayed_angle(player.facing_degrees, profile.spread_degrees, spray_rng);
                hitscan(
                    tiles,
                    player.position,
                    enemies,
                    spray,
                    profile.base_damage / 2,
                    out_events,
                );
            }
        }
        WeaponKind::Bfg => {
            cone_blast(
                tiles,
                player.position,
                player.facing_degrees,
                enemies,
                profile.base_damage,
                profile.spread_degrees,
                out_events,
            );
        }
    }
}

fn sprayed_angle(facing_degrees: f32, spread_degrees: f32, spray_rng: &mut ChaCha8Rng) -> f32 {
    facing_degrees + spray_rng.gen_range(-spread_degrees..=spread_degrees)
}

/// Resolves a single pellet along `spray_degrees`.
///
/// The pellet connects with the first enemy in arena order whose bearing
/// deviates less than the tolerance and who stands nearer than the wall the
/// ray reports; everyone behind that enemy is untouched. This first-match
/// rule is the deliberate tie-break for enemies sharing a firing line.
fn hitscan(
    tiles: &TileView<'_>,
    origin: WorldPoint,
    enemies: &mut [Enemy],
    spray_degrees: f32,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    let wall_distance = raycast::cast(tiles, origin, spray_degrees).distance;

    for enemy in enemies.iter_mut() {
        if enemy.is_dead() {
            continue;
        }

        let distance = origin.distance_to(enemy.position());
        let bearing = origin.bearing_to_degrees(enemy.position());
        let deviation = angles::relative_degrees(bearing, spray_degrees);

        if deviation.abs() < HIT_TOLERANCE_DEGREES && distance < wall_distance {
            let dealt = falloff_damage(damage, distance, tiles.tile_length());
            push_damage_events(enemy.take_damage(dealt), enemy.id(), dealt, out_events);
            return;
        }
    }
}

/// Damages every living enemy inside the cone, walls notwithstanding.
fn cone_blast(
    tiles: &TileView<'_>,
    origin: WorldPoint,
    facing_degrees: f32,
    enemies: &mut [Enemy],
    damage: u32,
    spread_degrees: f32,
    out_events: &mut Vec<Event>,
) {
    let range = BFG_RANGE_TILES * tiles.tile_length();

    for enemy in enemies.iter_mut() {
        if enemy.is_dead() {
            continue;
        }

        let bearing = origin.bearing_to_degrees(enemy.position());
        let deviation = angles::relative_degrees(bearing, facing_degrees);
        if deviation.abs() <= spread_degrees && origin.distance_to(enemy.position()) < range {
            push_damage_events(enemy.take_damage(damage), enemy.id(), damage, out_events);
        }
    }
}

fn push_damage_events(
    outcome: DamageOutcome,
    enemy: grim_halls_core::EnemyId,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    match outcome {
        DamageOutcome::Wounded => out_events.push(Event::EnemyHit { enemy, damage }),
        DamageOutcome::Killed => out_events.push(Event::EnemyKilled { enemy }),
        DamageOutcome::Ignored => {}
    }
}

/// Linear damage falloff over the falloff range, floored at half nominal.
pub(crate) fn falloff_damage(nominal: u32, distance: f32, tile_length: f32) -> u32 {
    let range = FALLOFF_RANGE_TILES * tile_length;
    let scaled = nominal as f32 * (1.0 - distance / range);
    scaled.max(nominal as f32 / 2.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = 64.0;

    #[test]
    fn falloff_is_monotonically_non_increasing() {
        let mut previous = u32::MAX;
        for step in 0..200 {
            let distance = step as f32 * 0.1 * TILE;
            let dealt = falloff_damage(20, distance, TILE);
            assert!(
                dealt <= previous,
                "damage rose from {previous} to {dealt} at distance {distance}"
            );
            previous = dealt;
        }
    }

    #[test]
    fn falloff_never_drops_below_half_nominal() {
        for step in 0..200 {
            let distance = step as f32 * 0.25 * TILE;
            assert!(falloff_damage(20, distance, TILE) >= 10);
        }
    }

    #[test]
    fn point_blank_deals_full_damage() {
        assert_eq!(falloff_damage(20, 0.0, TILE), 20);
    }

    #[test]
    fn falloff_midpoint_deals_three_quarters() {
        // Halfway across the falloff range: 20 * (1 - 0.5) clamps to the
        // floor of 10, while a quarter of the way yields 15.
        assert_eq!(falloff_damage(20, 2.5 * TILE, TILE), 15);
        assert_eq!(falloff_damage(20, 5.0 * TILE, TILE), 10);
    }
}
