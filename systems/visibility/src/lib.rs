#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-column wall depth buffer and sprite/item occlusion tests.
//!
//! Once per tick the session rebuilds a [`Visibility`] buffer: one ray per
//! screen column across the field of view, each stored distance corrected for
//! the fisheye effect by the cosine of its angular offset from the facing
//! direction. Renderers read the same buffer for wall heights that
//! [`DepthBuffer::is_visible`] consults for occlusion, so a sprite can never
//! be drawn through a wall the column pass already found.

use grim_halls_core::{angles, Tile, TileView, WorldPoint};
use grim_halls_system_raycast::{self as raycast, HitAxis};

/// One screen column's wall sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSample {
    /// Perpendicular (fisheye-corrected) distance to the wall face.
    pub distance: f32,
    /// Grid-line family the column's ray struck.
    pub axis: HitAxis,
    /// Tile that terminated the ray.
    pub tile: Tile,
    /// Offset along the struck face for texture sampling.
    pub texture_offset: f32,
}

/// Reusable per-column depth storage.
///
/// The internal buffer is cleared and refilled on every [`rebuild`] call so a
/// long-lived session performs no per-tick allocation once the column count
/// stabilizes.
///
/// [`rebuild`]: Visibility::rebuild
#[derive(Clone, Debug, Default)]
pub struct Visibility {
    samples: Vec<ColumnSample>,
    fov_degrees: f32,
}

impl Visibility {
    /// Creates an empty visibility index; call [`rebuild`](Self::rebuild)
    /// before reading from it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the depth buffer for the provided viewpoint.
    ///
    /// Column `i` of `column_count` casts at
    /// `facing - fov/2 + fov * i / column_count`; the raw radial distance is
    /// multiplied by the cosine of the column's offset from `facing_degrees`
    /// before being stored, yielding the perpendicular distance used for
    /// flat-wall projection.
    pub fn rebuild(
        &mut self,
        tiles: &TileView<'_>,
        position: WorldPoint,
        facing_degrees: f32,
        column_count: usize,
        fov_degrees: f32,
    ) {
        self.samples.clear();
        self.samples.reserve(column_count);
        self.fov_degrees = fov_degrees;

        let half_fov = fov_degrees / 2.0;
        for column in 0..column_count {
            let offset = -half_fov + fov_degrees * column as f32 / column_count as f32;
            let hit = raycast::cast(tiles, position, facing_degrees + offset);
            self.samples.push(ColumnSample {
                distance: hit.distance * angles::to_radians(offset).cos(),
                axis: hit.axis,
                tile: tiles.tile_at(hit.cell),
                texture_offset: hit.texture_offset,
            });
        }
    }

    /// Borrowed view over the most recent rebuild.
    #[must_use]
    pub fn depth_buffer(&self) -> DepthBuffer<'_> {
        DepthBuffer {
            samples: &self.samples,
            fov_degrees: self.fov_degrees,
        }
    }
}

/// Read-only view into a rebuilt depth buffer.
#[derive(Clone, Copy, Debug)]
pub struct DepthBuffer<'a> {
    samples: &'a [ColumnSample],
    fov_degrees: f32,
}

impl<'a> DepthBuffer<'a> {
    /// Number of columns captured by the most recent rebuild.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.samples.len()
    }

    /// Field of view the buffer was built with.
    #[must_use]
    pub const fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    /// Corrected wall distance stored for the provided column.
    #[must_use]
    pub fn distance_at(&self, column: usize) -> Option<f32> {
        self.samples.get(column).map(|sample| sample.distance)
    }

    /// All column samples in left-to-right order.
    #[must_use]
    pub fn samples(&self) -> &'a [ColumnSample] {
        self.samples
    }

    /// Column whose ray lies nearest the provided facing-relative angle.
    ///
    /// Angles at the extreme edge of the field of view clamp to the last
    /// column instead of indexing past the buffer.
    #[must_use]
    pub fn column_for(&self, relative_degrees: f32) -> Option<usize> {
        if self.samples.is_empty() || self.fov_degrees <= 0.0 {
            return None;
        }
        let half_fov = self.fov_degrees / 2.0;
        if relative_degrees.abs() > half_fov {
            return None;
        }
        let scaled = (relative_degrees + half_fov) / self.fov_degrees * self.samples.len() as f32;
        let column = (scaled as usize).min(self.samples.len() - 1);
        Some(column)
    }

    /// Whether a point at `relative_degrees` from the facing direction and
    /// `distance` world units away is unobstructed by the wall columns.
    ///
    /// True only when the angle lies inside the field of view and the
    /// distance is strictly below the stored wall depth for its column.
    #[must_use]
    pub fn is_visible(&self, relative_degrees: f32, distance: f32) -> bool {
        match self.column_for(relative_degrees) {
            Some(column) => distance < self.samples[column].distance,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grim_halls_core::Tile;

    const TILE: f32 = 64.0;
    const FOV: f32 = 60.0;
    const COLUMNS: usize = 120;

    /// 6x6 room: solid perimeter, empty interior.
    fn room_cells() -> Vec<Tile> {
        let mut cells = vec![Tile::Wall; 36];
        for row in 1..5 {
            for column in 1..5 {
                cells[row * 6 + column] = Tile::Empty;
            }
        }
        cells
    }

    fn rebuilt(position: WorldPoint, facing: f32) -> Visibility {
        let cells = room_cells();
        let view = TileView::new(&cells, 6, 6, TILE);
        let mut visibility = Visibility::new();
        visibility.rebuild(&view, position, facing, COLUMNS, FOV);
        visibility
    }

    #[test]
    fn buffer_length_always_matches_column_count() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 1.5 * TILE), 0.0);
        assert_eq!(visibility.depth_buffer().column_count(), COLUMNS);
    }

    #[test]
    fn center_column_keeps_the_raw_radial_distance() {
        let cells = room_cells();
        let view = TileView::new(&cells, 6, 6, TILE);
        let position = WorldPoint::new(1.5 * TILE, 2.5 * TILE);

        let mut visibility = Visibility::new();
        visibility.rebuild(&view, position, 0.0, COLUMNS, FOV);
        let buffer = visibility.depth_buffer();

        // Column count/2 casts at exactly the facing angle: zero offset, so
        // the fisheye factor is cos(0) = 1.
        let raw = raycast::cast(&view, position, 0.0).distance;
        let stored = buffer.distance_at(COLUMNS / 2).expect("center column");
        assert!((stored - raw).abs() < 1e-3);
    }

    #[test]
    fn edge_columns_store_shortened_perpendicular_distances() {
        let cells = room_cells();
        let view = TileView::new(&cells, 6, 6, TILE);
        let position = WorldPoint::new(3.0 * TILE, 3.0 * TILE);

        let mut visibility = Visibility::new();
        visibility.rebuild(&view, position, 45.0, COLUMNS, FOV);
        let buffer = visibility.depth_buffer();

        let half_fov = FOV / 2.0;
        let edge_offset = -half_fov;
        let raw = raycast::cast(&view, position, 45.0 + edge_offset).distance;
        let stored = buffer.distance_at(0).expect("edge column");
        assert!((stored - raw * edge_offset.to_radians().cos()).abs() < 1e-3);
        assert!(stored < raw);
    }

    #[test]
    fn samples_capture_the_struck_surface() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 2.5 * TILE), 0.0);
        let buffer = visibility.depth_buffer();

        let center = buffer.samples()[COLUMNS / 2];
        assert_eq!(center.tile, Tile::Wall);
        assert_eq!(center.axis, HitAxis::Vertical);
        assert!((0.0..TILE).contains(&center.texture_offset));
    }

    #[test]
    fn near_point_is_visible_and_far_point_is_occluded() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 2.5 * TILE), 0.0);
        let buffer = visibility.depth_buffer();

        // Straight ahead the eastern perimeter sits 3.5 tiles out.
        assert!(buffer.is_visible(0.0, 2.0 * TILE));
        assert!(!buffer.is_visible(0.0, 4.0 * TILE));
    }

    #[test]
    fn wall_depth_itself_is_not_visible() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 2.5 * TILE), 0.0);
        let buffer = visibility.depth_buffer();
        let wall = buffer.distance_at(COLUMNS / 2).expect("center column");

        // Strict comparison: a point exactly on the wall face is occluded.
        assert!(!buffer.is_visible(0.0, wall));
    }

    #[test]
    fn angles_outside_the_field_of_view_are_never_visible() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 2.5 * TILE), 0.0);
        let buffer = visibility.depth_buffer();

        assert!(!buffer.is_visible(FOV / 2.0 + 1.0, 1.0));
        assert!(!buffer.is_visible(-(FOV / 2.0) - 1.0, 1.0));
    }

    #[test]
    fn fov_edge_clamps_to_the_last_column() {
        let visibility = rebuilt(WorldPoint::new(1.5 * TILE, 2.5 * TILE), 0.0);
        let buffer = visibility.depth_buffer();

        assert_eq!(buffer.column_for(FOV / 2.0), Some(COLUMNS - 1));
        assert_eq!(buffer.column_for(-(FOV / 2.0)), Some(0));
    }

    #[test]
    fn empty_buffer_reports_nothing_visible() {
        let visibility = Visibility::new();
        let buffer = visibility.depth_buffer();

        assert_eq!(buffer.column_count(), 0);
        assert!(!buffer.is_visible(0.0, 1.0));
    }
}
