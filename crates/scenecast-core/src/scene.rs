//! In-memory scene implementing [`WorldView`].
//!
//! [`SceneModel`] holds a flat row-major tile grid for a single plane, the
//! local player, skill levels, an inventory container and a simple
//! top-down camera. The engine's demo driver and the tests use it in
//! place of a live host.

use std::collections::BTreeMap;

use scenecast_types::{InterfaceState, ScreenPoint, Skill, WorldPosition};

use crate::world::{
    GridSize, ItemStack, LOCAL_TILE_SIZE, LocalPoint, PlayerView, SceneObject, Tile,
    WidgetBounds, WorldView,
};

/// Number of inventory widget columns.
const INVENTORY_COLUMNS: usize = 4;

/// A top-down camera mapping local space onto a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Local point rendered at the canvas centre.
    pub center: LocalPoint,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Pixels per tile.
    pub tile_pixels: u32,
}

impl Viewport {
    /// Project a local point; `None` outside the canvas.
    pub fn project(&self, local: LocalPoint) -> Option<ScreenPoint> {
        let scale = i64::from(self.tile_pixels);
        let tile = i64::from(LOCAL_TILE_SIZE);
        let dx = i64::from(local.x).checked_sub(i64::from(self.center.x))?;
        let dy = i64::from(local.y).checked_sub(i64::from(self.center.y))?;
        let px = dx.checked_mul(scale)?.checked_div(tile)?;
        let py = dy.checked_mul(scale)?.checked_div(tile)?;
        // Canvas y grows downwards, world y grows north.
        let sx = i64::from(self.width / 2).checked_add(px)?;
        let sy = i64::from(self.height / 2).checked_sub(py)?;
        let on_canvas = (0..i64::from(self.width)).contains(&sx)
            && (0..i64::from(self.height)).contains(&sy);
        if !on_canvas {
            return None;
        }
        Some(ScreenPoint::new(i32::try_from(sx).ok()?, i32::try_from(sy).ok()?))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: LocalPoint::new(0, 0),
            width: 765,
            height: 503,
            tile_pixels: 32,
        }
    }
}

/// Placement of the inventory tab on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryWidget {
    /// Top-left corner of slot 0.
    pub origin: ScreenPoint,
    /// Slot width in pixels.
    pub slot_width: u32,
    /// Slot height in pixels.
    pub slot_height: u32,
    /// Whether the tab is currently shown.
    pub visible: bool,
}

impl Default for InventoryWidget {
    fn default() -> Self {
        Self {
            origin: ScreenPoint::new(563, 213),
            slot_width: 42,
            slot_height: 36,
            visible: true,
        }
    }
}

/// A mutable, single-plane in-memory world.
#[derive(Debug, Clone)]
pub struct SceneModel {
    plane: u8,
    size: GridSize,
    /// World tile of grid cell (0, 0).
    base: (i32, i32),
    /// Row-major: index = y * width + x. `None` is an unloaded tile.
    tiles: Vec<Option<Tile>>,
    player: Option<PlayerView>,
    /// (boosted, real) per skill.
    levels: BTreeMap<Skill, (u32, u32)>,
    energy: u32,
    inventory: Option<Vec<ItemStack>>,
    inventory_widget: InventoryWidget,
    item_names: BTreeMap<i32, String>,
    interface: InterfaceState,
    dialog_text: Option<String>,
    viewport: Viewport,
}

impl SceneModel {
    /// Create an empty loaded scene whose cell (0, 0) is world tile
    /// `(base_x, base_y)`.
    pub fn new(size: GridSize, base_x: i32, base_y: i32, plane: u8) -> Self {
        let cells = usize::try_from(size.tile_count()).unwrap_or(0);
        Self {
            plane,
            size,
            base: (base_x, base_y),
            tiles: vec![Some(Tile::default()); cells],
            player: None,
            levels: BTreeMap::new(),
            energy: 10_000,
            inventory: Some(vec![ItemStack::EMPTY; scenecast_types::INVENTORY_CAPACITY]),
            inventory_widget: InventoryWidget::default(),
            item_names: BTreeMap::new(),
            interface: InterfaceState::default(),
            dialog_text: None,
            viewport: Viewport::default(),
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let row = u64::from(y).checked_mul(u64::from(self.size.width))?;
        usize::try_from(row.checked_add(u64::from(x))?).ok()
    }

    /// Local point at the centre of grid cell `(x, y)`.
    pub fn tile_center(x: u32, y: u32) -> LocalPoint {
        let half = LOCAL_TILE_SIZE / 2;
        let lx = x.saturating_mul(LOCAL_TILE_SIZE).saturating_add(half);
        let ly = y.saturating_mul(LOCAL_TILE_SIZE).saturating_add(half);
        LocalPoint::new(
            i32::try_from(lx).unwrap_or(i32::MAX),
            i32::try_from(ly).unwrap_or(i32::MAX),
        )
    }

    /// World tile of grid cell `(x, y)`.
    pub fn world_of(&self, x: u32, y: u32) -> WorldPosition {
        let wx = self
            .base
            .0
            .saturating_add(i32::try_from(x).unwrap_or(i32::MAX));
        let wy = self
            .base
            .1
            .saturating_add(i32::try_from(y).unwrap_or(i32::MAX));
        WorldPosition::new(wx, wy, self.plane)
    }

    // -------------------------------------------------------------------
    // Tiles
    // -------------------------------------------------------------------

    /// Attach an object at the centre of cell `(x, y)`. Returns false when
    /// the cell is outside the grid or unloaded.
    pub fn place_object(&mut self, x: u32, y: u32, object_id: i32) -> bool {
        let local = Self::tile_center(x, y);
        self.place_raw(
            x,
            y,
            SceneObject {
                id: object_id,
                local: Some(local),
            },
        )
    }

    /// Attach an arbitrary object (possibly unresolvable) to cell `(x, y)`.
    pub fn place_raw(&mut self, x: u32, y: u32, object: SceneObject) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        match self.tiles.get_mut(idx) {
            Some(Some(tile)) => {
                tile.push(object);
                true
            }
            _ => false,
        }
    }

    /// Replace every object on cell `(x, y)` with a single object.
    pub fn replace_objects(&mut self, x: u32, y: u32, object_id: i32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if let Some(slot) = self.tiles.get_mut(idx) {
            *slot = Some(Tile::default());
        }
        self.place_object(x, y, object_id)
    }

    /// Mark cell `(x, y)` as unloaded.
    pub fn unload_tile(&mut self, x: u32, y: u32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if let Some(slot) = self.tiles.get_mut(idx) {
            *slot = None;
        }
    }

    // -------------------------------------------------------------------
    // Player
    // -------------------------------------------------------------------

    /// Place the local player, idle, at the centre of cell `(x, y)` and
    /// centre the camera on them.
    pub fn spawn_player(&mut self, x: u32, y: u32) {
        let local = Self::tile_center(x, y);
        self.player = Some(PlayerView {
            local,
            world: self.world_of(x, y),
            animation: crate::world::IDLE_ANIMATION,
            pose_animation: 808,
            idle_pose_animation: 808,
            interacting_with: None,
        });
        self.viewport.center = local;
    }

    /// Remove the local player (loading screen, logged out).
    pub fn despawn_player(&mut self) {
        self.player = None;
    }

    /// Mutable access to the local player.
    pub const fn player_mut(&mut self) -> Option<&mut PlayerView> {
        self.player.as_mut()
    }

    /// Set boosted and real level of a skill.
    pub fn set_level(&mut self, skill: Skill, boosted: u32, real: u32) {
        self.levels.insert(skill, (boosted, real));
    }

    /// Set run energy in hundredths of a percent.
    pub const fn set_energy(&mut self, energy: u32) {
        self.energy = energy;
    }

    /// Set open interfaces.
    pub const fn set_interface(&mut self, interface: InterfaceState) {
        self.interface = interface;
    }

    /// Set or clear dialog text.
    pub fn set_dialog_text(&mut self, text: Option<String>) {
        self.dialog_text = text;
    }

    // -------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------

    /// Register an item display name.
    pub fn define_item(&mut self, item_id: i32, name: &str) {
        self.item_names.insert(item_id, name.to_owned());
    }

    /// Put a stack into a slot. Returns false when the slot does not exist
    /// or the container is unloaded.
    pub fn set_slot(&mut self, slot: usize, stack: ItemStack) -> bool {
        match self.inventory.as_mut().and_then(|items| items.get_mut(slot)) {
            Some(entry) => {
                *entry = stack;
                true
            }
            None => false,
        }
    }

    /// Empty every slot.
    pub fn clear_inventory(&mut self) {
        if let Some(items) = self.inventory.as_mut() {
            items.fill(ItemStack::EMPTY);
        }
    }

    /// Number of occupied slots.
    pub fn occupied_slots(&self) -> usize {
        self.inventory
            .as_ref()
            .map_or(0, |items| items.iter().filter(|s| !s.is_empty()).count())
    }

    /// Drop the inventory container entirely.
    pub fn unload_inventory(&mut self) {
        self.inventory = None;
    }

    /// Show or hide the inventory tab.
    pub const fn set_inventory_visible(&mut self, visible: bool) {
        self.inventory_widget.visible = visible;
    }

    /// Replace the camera.
    pub const fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl WorldView for SceneModel {
    fn plane(&self) -> u8 {
        self.plane
    }

    fn grid_size(&self) -> GridSize {
        self.size
    }

    fn tile(&self, x: u32, y: u32) -> Option<&Tile> {
        self.tiles.get(self.index(x, y)?)?.as_ref()
    }

    fn local_player(&self) -> Option<&PlayerView> {
        self.player.as_ref()
    }

    fn world_position(&self, local: LocalPoint) -> Option<WorldPosition> {
        let tile = i32::try_from(LOCAL_TILE_SIZE).ok()?;
        if local.x < 0 || local.y < 0 {
            return None;
        }
        let gx = u32::try_from(local.x.checked_div(tile)?).ok()?;
        let gy = u32::try_from(local.y.checked_div(tile)?).ok()?;
        if gx >= self.size.width || gy >= self.size.height {
            return None;
        }
        Some(self.world_of(gx, gy))
    }

    fn project(&self, local: LocalPoint) -> Option<ScreenPoint> {
        self.viewport.project(local)
    }

    fn boosted_level(&self, skill: Skill) -> u32 {
        self.levels.get(&skill).map_or(1, |&(boosted, _)| boosted)
    }

    fn real_level(&self, skill: Skill) -> u32 {
        self.levels.get(&skill).map_or(1, |&(_, real)| real)
    }

    fn energy(&self) -> u32 {
        self.energy
    }

    fn inventory(&self) -> Option<&[ItemStack]> {
        self.inventory.as_deref()
    }

    fn inventory_slot_bounds(&self, slot: usize) -> Option<WidgetBounds> {
        let widget = &self.inventory_widget;
        if !widget.visible || slot >= scenecast_types::INVENTORY_CAPACITY {
            return None;
        }
        let column = u32::try_from(slot % INVENTORY_COLUMNS).ok()?;
        let row = u32::try_from(slot / INVENTORY_COLUMNS).ok()?;
        let dx = i32::try_from(column.checked_mul(widget.slot_width)?).ok()?;
        let dy = i32::try_from(row.checked_mul(widget.slot_height)?).ok()?;
        Some(WidgetBounds {
            x: widget.origin.x.checked_add(dx)?,
            y: widget.origin.y.checked_add(dy)?,
            width: widget.slot_width,
            height: widget.slot_height,
        })
    }

    fn item_name(&self, item_id: i32) -> Option<&str> {
        self.item_names.get(&item_id).map(String::as_str)
    }

    fn interface_state(&self) -> InterfaceState {
        self.interface
    }

    fn dialog_text(&self) -> Option<&str> {
        self.dialog_text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneModel {
        SceneModel::new(GridSize::square(8), 3200, 3200, 0)
    }

    #[test]
    fn world_position_round_trips_cell_centres() {
        let s = scene();
        let local = SceneModel::tile_center(3, 5);
        assert_eq!(s.world_position(local), Some(WorldPosition::new(3203, 3205, 0)));
    }

    #[test]
    fn world_position_rejects_points_outside_the_grid() {
        let s = scene();
        assert_eq!(s.world_position(LocalPoint::new(-1, 0)), None);
        assert_eq!(s.world_position(SceneModel::tile_center(8, 0)), None);
    }

    #[test]
    fn camera_centre_projects_to_canvas_centre() {
        let mut s = scene();
        s.spawn_player(4, 4);
        let centre = SceneModel::tile_center(4, 4);
        assert_eq!(s.project(centre), Some(ScreenPoint::new(382, 251)));
    }

    #[test]
    fn far_points_are_off_screen() {
        let mut s = scene();
        s.spawn_player(0, 0);
        s.set_viewport(Viewport {
            center: SceneModel::tile_center(0, 0),
            width: 64,
            height: 64,
            tile_pixels: 32,
        });
        assert!(s.project(SceneModel::tile_center(0, 0)).is_some());
        assert!(s.project(SceneModel::tile_center(7, 7)).is_none());
    }

    #[test]
    fn unloaded_tiles_resolve_to_none() {
        let mut s = scene();
        assert!(s.place_object(1, 1, 10829));
        s.unload_tile(1, 1);
        assert!(s.tile(1, 1).is_none());
        assert!(!s.place_object(1, 1, 10829));
        assert!(!s.place_object(99, 1, 10829));
    }

    #[test]
    fn slot_bounds_follow_a_four_column_grid() {
        let s = scene();
        let first = s.inventory_slot_bounds(0);
        let fifth = s.inventory_slot_bounds(4);
        assert_eq!(first.map(|b| (b.x, b.y)), Some((563, 213)));
        assert_eq!(fifth.map(|b| (b.x, b.y)), Some((563, 249)));
        assert!(s.inventory_slot_bounds(28).is_none());
    }

    #[test]
    fn hidden_inventory_has_no_bounds() {
        let mut s = scene();
        s.set_inventory_visible(false);
        assert!(s.inventory_slot_bounds(0).is_none());
    }
}
