//! Read-only view of the host world.
//!
//! The host owns a mutable, cyclic scene graph. The core only ever sees it
//! through [`WorldView`], and only for the duration of one tick: the
//! scanner and assembler copy primitive fields (ids, coordinates, levels)
//! into owned records and keep no borrows past the call.
//!
//! Local coordinates are the host's fixed-point scene space, where one
//! tile spans [`LOCAL_TILE_SIZE`] units.

use scenecast_types::{InterfaceState, ScreenPoint, Skill, WorldPosition};

/// Local units per tile in the host's fixed-point coordinate system.
pub const LOCAL_TILE_SIZE: u32 = 128;

/// Animation id the host reports when no animation is playing.
pub const IDLE_ANIMATION: i32 = -1;

/// A position in the host's fixed-point local scene space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPoint {
    /// Local x in fixed-point units.
    pub x: i32,
    /// Local y in fixed-point units.
    pub y: i32,
}

impl LocalPoint {
    /// Construct a local point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other` in local units, truncated.
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        let squared = dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy));
        u32::try_from(squared.isqrt()).unwrap_or(u32::MAX)
    }
}

/// Convert a raw local distance into whole tiles (floor division).
pub const fn tile_distance(raw: u32) -> u32 {
    raw / LOCAL_TILE_SIZE
}

/// Dimensions of the active plane's tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridSize {
    /// A square grid.
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Total number of tiles.
    pub fn tile_count(self) -> u64 {
        u64::from(self.width).saturating_mul(u64::from(self.height))
    }
}

/// An object attached to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneObject {
    /// Raw object identifier.
    pub id: i32,
    /// Local position, `None` when the host cannot resolve it.
    pub local: Option<LocalPoint>,
}

/// One grid cell and the objects attached to it, in host order.
///
/// Slots may be empty: the host's object arrays contain holes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tile {
    objects: Vec<Option<SceneObject>>,
}

impl Tile {
    /// Create a tile from raw object slots.
    pub const fn new(objects: Vec<Option<SceneObject>>) -> Self {
        Self { objects }
    }

    /// Attach an object in the next slot.
    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(Some(object));
    }

    /// Append an empty slot.
    pub fn push_hole(&mut self) {
        self.objects.push(None);
    }

    /// Present objects in slot order, skipping holes.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().flatten()
    }
}

/// The local player as exposed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    /// Local position (distance anchor).
    pub local: LocalPoint,
    /// Absolute tile position.
    pub world: WorldPosition,
    /// Current animation id, [`IDLE_ANIMATION`] when none.
    pub animation: i32,
    /// Current pose animation id.
    pub pose_animation: i32,
    /// Pose animation used while standing still.
    pub idle_pose_animation: i32,
    /// Name of the current interaction target.
    pub interacting_with: Option<String>,
}

/// One raw inventory container slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    /// Item id; `-1` or `0` marks an empty slot.
    pub id: i32,
    /// Stack size.
    pub quantity: u32,
}

impl ItemStack {
    /// An empty placeholder slot.
    pub const EMPTY: Self = Self { id: -1, quantity: 0 };

    /// True for empty or placeholder slots.
    pub const fn is_empty(self) -> bool {
        self.id == -1 || self.id == 0
    }
}

/// Pixel bounds of a widget on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetBounds {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl WidgetBounds {
    /// Centre point, rounded down.
    pub fn center(self) -> ScreenPoint {
        let half_w = i32::try_from(self.width / 2).unwrap_or(i32::MAX);
        let half_h = i32::try_from(self.height / 2).unwrap_or(i32::MAX);
        ScreenPoint::new(self.x.saturating_add(half_w), self.y.saturating_add(half_h))
    }
}

/// Read-only access to the host world for the duration of one tick.
///
/// Implemented by the host adapter. All methods are cheap lookups; none
/// may block. Returning `None` marks a value the host cannot resolve
/// right now.
pub trait WorldView {
    /// Index of the plane the player is on.
    fn plane(&self) -> u8;

    /// Size of the active plane's tile grid.
    fn grid_size(&self) -> GridSize;

    /// The tile at `(x, y)` on the active plane.
    fn tile(&self, x: u32, y: u32) -> Option<&Tile>;

    /// The local player, absent while loading or logged out.
    fn local_player(&self) -> Option<&PlayerView>;

    /// Convert a local point to an absolute world tile.
    fn world_position(&self, local: LocalPoint) -> Option<WorldPosition>;

    /// Project a local point onto the canvas; `None` when off-screen.
    fn project(&self, local: LocalPoint) -> Option<ScreenPoint>;

    /// Current (boosted) level of a skill.
    fn boosted_level(&self, skill: Skill) -> u32;

    /// Base (real) level of a skill.
    fn real_level(&self, skill: Skill) -> u32;

    /// Run energy in hundredths of a percent (0..=10000).
    fn energy(&self) -> u32;

    /// Raw inventory slots, `None` when the container is not loaded.
    fn inventory(&self) -> Option<&[ItemStack]>;

    /// Canvas bounds of an inventory slot widget, `None` when hidden.
    fn inventory_slot_bounds(&self, slot: usize) -> Option<WidgetBounds>;

    /// Display name of an item.
    fn item_name(&self, item_id: i32) -> Option<&str>;

    /// Which blocking interfaces are open.
    fn interface_state(&self) -> InterfaceState;

    /// Text of the open dialog box.
    fn dialog_text(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean_and_truncated() {
        let a = LocalPoint::new(0, 0);
        assert_eq!(a.distance_to(LocalPoint::new(300, 400)), 500);
        assert_eq!(a.distance_to(LocalPoint::new(1, 1)), 1);
        assert_eq!(a.distance_to(a), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = LocalPoint::new(-640, 1280);
        let b = LocalPoint::new(896, -128);
        assert_eq!(a.distance_to(b), b.distance_to(a));
    }

    #[test]
    fn distance_survives_extreme_coordinates() {
        let a = LocalPoint::new(i32::MIN, i32::MIN);
        let b = LocalPoint::new(i32::MAX, i32::MAX);
        assert!(a.distance_to(b) > 0);
    }

    #[test]
    fn tile_distance_floors() {
        assert_eq!(tile_distance(0), 0);
        assert_eq!(tile_distance(127), 0);
        assert_eq!(tile_distance(128), 1);
        assert_eq!(tile_distance(639), 4);
        assert_eq!(tile_distance(640), 5);
    }

    #[test]
    fn empty_slots() {
        assert!(ItemStack::EMPTY.is_empty());
        assert!(ItemStack { id: 0, quantity: 1 }.is_empty());
        assert!(!ItemStack { id: 1519, quantity: 1 }.is_empty());
    }

    #[test]
    fn tile_skips_holes() {
        let mut tile = Tile::default();
        tile.push_hole();
        tile.push(SceneObject {
            id: 10829,
            local: None,
        });
        assert_eq!(tile.objects().count(), 1);
    }

    #[test]
    fn widget_center() {
        let bounds = WidgetBounds {
            x: 560,
            y: 210,
            width: 36,
            height: 32,
        };
        assert_eq!(bounds.center(), ScreenPoint::new(578, 226));
    }
}
