#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless ray/grid intersection service.
//!
//! [`cast`] is the single occlusion primitive of the engine: the visibility
//! system calls it once per screen column and combat calls it once per
//! pellet, so what the renderer draws and what a shot can reach always agree.
//! The ray is resolved as two independent marches, one over horizontal grid
//! lines (constant y) and one over vertical grid lines (constant x); each
//! march walks tile by tile until it reaches a blocking cell or leaves the
//! grid, and the nearer blocking candidate wins.

use grim_halls_core::{angles, CellCoord, TileView, WorldPoint};

/// Upper bound on tiles visited per axis march; guarantees termination.
pub const MAX_MARCH_STEPS: usize = 100;

/// Saturating result distance, in tile-widths, when neither march hits.
pub const MAX_DEPTH_TILES: f32 = 12.5;

/// Direction components smaller than this skip their axis march entirely,
/// keeping the step formulas away from division blow-up.
const DIRECTION_EPSILON: f32 = 1e-4;

/// Grid-line family that produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitAxis {
    /// Constant-y boundary: the ray crossed a north/south tile face.
    Horizontal,
    /// Constant-x boundary: the ray crossed an east/west tile face.
    Vertical,
}

/// Result of casting a single ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Euclidean distance from the origin to the intersection, in world units.
    pub distance: f32,
    /// Which grid-line family was struck; renderers shade the two apart.
    pub axis: HitAxis,
    /// Offset of the intersection along the struck face, `[0, tile_length)`,
    /// used for texture sampling.
    pub texture_offset: f32,
    /// Cell whose face was struck; the map origin when nothing was hit.
    pub cell: CellCoord,
}

/// Maximum distance [`cast`] can report for the provided grid.
#[must_use]
pub fn max_depth(tiles: &TileView<'_>) -> f32 {
    MAX_DEPTH_TILES * tiles.tile_length()
}

/// Casts a ray from `origin` along `angle_degrees`, returning the nearest
/// blocking intersection.
///
/// The angle is normalized to `[0, 360)` before use. When neither march
/// reaches a blocking cell within [`MAX_MARCH_STEPS`] the result saturates to
/// [`max_depth`] with axis [`HitAxis::Vertical`] by convention.
#[must_use]
pub fn cast(tiles: &TileView<'_>, origin: WorldPoint, angle_degrees: f32) -> RayHit {
    let angle = angles::normalize_degrees(angle_degrees);
    let radians = angles::to_radians(angle);
    let (sin_a, cos_a) = radians.sin_cos();
    let tile_length = tiles.tile_length();

    let mut nearest: Option<RayHit> = None;

    if sin_a.abs() > DIRECTION_EPSILON {
        let (first_y, step_y) = if sin_a > 0.0 {
            (
                (origin.y() / tile_length).floor() * tile_length + tile_length,
                tile_length,
            )
        } else {
            ((origin.y() / tile_length).floor() * tile_length, -tile_length)
        };
        let step_x = step_y / radians.tan();
        let first_x = origin.x() + (first_y - origin.y()) / sin_a * cos_a;
        let candidate = march(
            tiles,
            origin,
            first_x,
            first_y,
            step_x,
            step_y,
            HitAxis::Horizontal,
        );
        nearest = closer(nearest, candidate);
    }

    if cos_a.abs() > DIRECTION_EPSILON {
        let (first_x, step_x) = if cos_a > 0.0 {
            (
                (origin.x() / tile_length).floor() * tile_length + tile_length,
                tile_length,
            )
        } else {
            ((origin.x() / tile_length).floor() * tile_length, -tile_length)
        };
        let step_y = step_x * radians.tan();
        let first_y = origin.y() + (first_x - origin.x()) * radians.tan();
        let candidate = march(
            tiles,
            origin,
            first_x,
            first_y,
            step_x,
            step_y,
            HitAxis::Vertical,
        );
        nearest = closer(nearest, candidate);
    }

    nearest.unwrap_or(RayHit {
        distance: max_depth(tiles),
        axis: HitAxis::Vertical,
        texture_offset: 0.0,
        cell: CellCoord::new(0, 0),
    })
}

/// Walks one grid-line family until a blocking cell, the grid boundary, or
/// the step bound ends the march.
fn march(
    tiles: &TileView<'_>,
    origin: WorldPoint,
    first_x: f32,
    first_y: f32,
    step_x: f32,
    step_y: f32,
    axis: HitAxis,
) -> Option<RayHit> {
    let tile_length = tiles.tile_length();
    let mut x = first_x;
    let mut y = first_y;

    for _ in 0..MAX_MARCH_STEPS {
        let cell = tiles.cell_containing(x, y)?;

        if tiles.tile_at(cell).is_blocking() {
            let texture_offset = match axis {
                HitAxis::Horizontal => x.rem_euclid(tile_length),
                HitAxis::Vertical => y.rem_euclid(tile_length),
            };
            return Some(RayHit {
                distance: origin.distance_to(WorldPoint::new(x, y)),
                axis,
                texture_offset,
                cell,
            });
        }

        x += step_x;
        y += step_y;
    }

    None
}

fn closer(nearest: Option<RayHit>, candidate: Option<RayHit>) -> Option<RayHit> {
    match (nearest, candidate) {
        (Some(best), Some(next)) if next.distance < best.distance => Some(next),
        (None, next) => next,
        (best, _) => best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grim_halls_core::{DoorState, Tile};

    const TILE: f32 = 64.0;

    /// 4x4 room with a one-tile solid perimeter and an empty interior.
    fn room_cells() -> Vec<Tile> {
        let mut cells = vec![Tile::Wall; 16];
        for row in 1..3 {
            for column in 1..3 {
                cells[row * 4 + column] = Tile::Empty;
            }
        }
        cells
    }

    fn center() -> WorldPoint {
        WorldPoint::new(1.5 * TILE, 1.5 * TILE)
    }

    #[test]
    fn east_cast_hits_interior_wall_face() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);

        let hit = cast(&view, center(), 0.0);

        assert!((hit.distance - 1.5 * TILE).abs() < 1e-3);
        assert_eq!(hit.axis, HitAxis::Vertical);
        assert_eq!(hit.cell, CellCoord::new(3, 1));
    }

    #[test]
    fn south_cast_skips_vertical_march_and_hits_horizontal() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);

        let hit = cast(&view, center(), 90.0);

        assert!((hit.distance - 1.5 * TILE).abs() < 1e-3);
        assert_eq!(hit.axis, HitAxis::Horizontal);
        assert_eq!(hit.cell, CellCoord::new(1, 3));
    }

    #[test]
    fn west_cast_registers_the_boundary_column() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);

        let hit = cast(&view, center(), 180.0);

        // Negative-direction marches test the cell at floor(coordinate /
        // tile_length) on each crossing, so the perimeter column registers at
        // its far face: 1.5 tiles out instead of 0.5.
        assert!((hit.distance - 1.5 * TILE).abs() < 1e-3);
        assert_eq!(hit.axis, HitAxis::Vertical);
        assert_eq!(hit.cell.column(), 0);
    }

    #[test]
    fn every_angle_terminates_within_depth_bound_in_enclosed_room() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);
        let origin = center();

        for step in 0..360 {
            let hit = cast(&view, origin, step as f32);
            assert!(hit.distance > 0.0, "angle {step} returned zero distance");
            assert!(
                hit.distance < max_depth(&view),
                "angle {step} failed to hit the perimeter"
            );
        }
    }

    #[test]
    fn angle_is_normalized_before_marching() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);

        let wrapped = cast(&view, center(), 360.0 + 45.0);
        let direct = cast(&view, center(), 45.0);

        assert_eq!(wrapped, direct);
    }

    #[test]
    fn closed_door_blocks_and_open_door_is_transparent() {
        let mut cells = room_cells();
        // Door in the interior cell directly east of the origin.
        cells[4 + 2] = Tile::Door(DoorState::Closed);
        let view = TileView::new(&cells, 4, 4, TILE);

        let blocked = cast(&view, center(), 0.0);
        assert!((blocked.distance - 0.5 * TILE).abs() < 1e-3);
        assert_eq!(blocked.cell, CellCoord::new(2, 1));

        cells[4 + 2] = Tile::Door(DoorState::Open);
        let view = TileView::new(&cells, 4, 4, TILE);
        let through = cast(&view, center(), 0.0);
        assert!((through.distance - 1.5 * TILE).abs() < 1e-3);
        assert_eq!(through.cell, CellCoord::new(3, 1));
    }

    #[test]
    fn unbounded_grid_saturates_to_max_depth() {
        let cells = vec![Tile::Empty; 64 * 64];
        let view = TileView::new(&cells, 64, 64, TILE);
        let origin = WorldPoint::new(32.0 * TILE, 32.0 * TILE);

        let hit = cast(&view, origin, 30.0);

        assert_eq!(hit.distance, max_depth(&view));
        assert_eq!(hit.axis, HitAxis::Vertical);
        assert_eq!(hit.cell, CellCoord::new(0, 0));
    }

    #[test]
    fn texture_offset_stays_within_one_tile() {
        let cells = room_cells();
        let view = TileView::new(&cells, 4, 4, TILE);

        for step in 0..72 {
            let hit = cast(&view, center(), step as f32 * 5.0);
            assert!(
                (0.0..TILE).contains(&hit.texture_offset),
                "angle {} produced offset {}",
                step * 5,
                hit.texture_offset
            );
        }
    }

    #[test]
    fn diagonal_cast_prefers_the_nearer_axis_candidate() {
        let mut cells = room_cells();
        // Wall protruding into the interior south of the origin row.
        cells[2 * 4 + 2] = Tile::Wall;
        let view = TileView::new(&cells, 4, 4, TILE);

        // Aim down-right toward the protrusion; the vertical-face hit on the
        // protruding cell is nearer than any horizontal-face candidate.
        let hit = cast(&view, WorldPoint::new(1.25 * TILE, 1.5 * TILE), 45.0);

        assert!(hit.distance < 1.5 * TILE);
    }
}
