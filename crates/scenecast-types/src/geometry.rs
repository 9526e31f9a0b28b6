//! Coordinate types shared by scan records and the player status.
//!
//! Two coordinate spaces leave the core: absolute world tiles
//! ([`WorldPosition`]) and canvas pixels ([`ScreenPoint`]). The host's
//! fixed-point local space never appears in a snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Absolute tile coordinate, independent of camera and scene origin.
///
/// This is the deduplication key used by the grid scanner: two objects
/// of the same category resolving to the same `WorldPosition` produce
/// a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldPosition {
    /// Tile x coordinate.
    pub x: i32,
    /// Tile y coordinate.
    pub y: i32,
    /// Vertical level (0 = ground floor).
    pub plane: u8,
}

impl WorldPosition {
    /// Construct a world position.
    pub const fn new(x: i32, y: i32, plane: u8) -> Self {
        Self { x, y, plane }
    }
}

impl core::fmt::Display for WorldPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

/// A point on the host's rendering canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScreenPoint {
    /// Horizontal pixel offset from the canvas origin.
    pub x: i32,
    /// Vertical pixel offset from the canvas origin.
    pub y: i32,
}

impl ScreenPoint {
    /// Construct a screen point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by the given pixel offsets.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_position_orders_by_x_then_y_then_plane() {
        let a = WorldPosition::new(1, 5, 0);
        let b = WorldPosition::new(2, 0, 0);
        let c = WorldPosition::new(2, 0, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn offset_saturates() {
        let p = ScreenPoint::new(i32::MAX, 0).offset(1, 1);
        assert_eq!(p, ScreenPoint::new(i32::MAX, 1));
    }

    #[test]
    fn world_position_serializes_with_labels() {
        let json = serde_json::to_value(WorldPosition::new(3087, 3235, 0)).unwrap_or_default();
        assert_eq!(json["x"], 3087);
        assert_eq!(json["y"], 3235);
        assert_eq!(json["plane"], 0);
    }
}
