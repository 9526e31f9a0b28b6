//! Grid scan: one pass over the active plane producing per-category
//! entity records.
//!
//! Tiles are visited exactly once in row-major order (row `y` outer,
//! column `x` inner) and objects within a tile in host slot order. That
//! order is the deduplication tie-break: the first object of a category
//! seen at a world position produces the record, later ones at the same
//! position are dropped.
//!
//! Unresolvable tiles or objects drop only their own contribution. A
//! missing local player aborts the whole scan, since every distance is
//! measured from it.

use std::collections::BTreeSet;

use scenecast_types::{EntityCategory, EntityRecord, WorldPosition};
use tracing::debug;

use crate::classifier;
use crate::world::{WorldView, tile_distance};

/// Errors that abort a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// The host has no local player (loading, logged out).
    #[error("no local player; world view is not valid")]
    NoLocalPlayer,
}

/// Records from one scan, grouped by category, each group in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    trees: Vec<EntityRecord>,
    banks: Vec<EntityRecord>,
    ore_veins: Vec<EntityRecord>,
    hoppers: Vec<EntityRecord>,
    sacks: Vec<EntityRecord>,
    broken_struts: Vec<EntityRecord>,
}

impl ScanOutput {
    /// Records of one category in scan order.
    pub fn records(&self, category: EntityCategory) -> &[EntityRecord] {
        match category {
            EntityCategory::Tree => &self.trees,
            EntityCategory::Bank => &self.banks,
            EntityCategory::OreVein => &self.ore_veins,
            EntityCategory::Hopper => &self.hoppers,
            EntityCategory::Sack => &self.sacks,
            EntityCategory::BrokenStrut => &self.broken_struts,
        }
    }

    const fn bucket_mut(&mut self, category: EntityCategory) -> &mut Vec<EntityRecord> {
        match category {
            EntityCategory::Tree => &mut self.trees,
            EntityCategory::Bank => &mut self.banks,
            EntityCategory::OreVein => &mut self.ore_veins,
            EntityCategory::Hopper => &mut self.hoppers,
            EntityCategory::Sack => &mut self.sacks,
            EntityCategory::BrokenStrut => &mut self.broken_struts,
        }
    }

    fn push(&mut self, record: EntityRecord) {
        self.bucket_mut(record.category()).push(record);
    }

    /// All records, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        EntityCategory::ALL
            .into_iter()
            .flat_map(move |category| self.records(category).iter())
    }

    /// Total number of records across categories.
    pub fn len(&self) -> usize {
        EntityCategory::ALL
            .iter()
            .map(|&category| self.records(category).len())
            .sum()
    }

    /// True when no category has a record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take ownership of one category's records.
    pub fn take(&mut self, category: EntityCategory) -> Vec<EntityRecord> {
        std::mem::take(self.bucket_mut(category))
    }
}

/// Scan the active plane of `world`.
///
/// # Errors
///
/// Returns [`ScanError::NoLocalPlayer`] when the host has no local player.
pub fn scan(world: &dyn WorldView) -> Result<ScanOutput, ScanError> {
    let player = world.local_player().ok_or(ScanError::NoLocalPlayer)?;
    let anchor = player.local;
    let size = world.grid_size();

    let mut seen: BTreeSet<(EntityCategory, WorldPosition)> = BTreeSet::new();
    let mut output = ScanOutput::default();
    let mut unresolved: u32 = 0;

    for y in 0..size.height {
        for x in 0..size.width {
            let Some(tile) = world.tile(x, y) else {
                continue;
            };
            for object in tile.objects() {
                let Some(kind) = classifier::classify(object.id) else {
                    continue;
                };
                let Some((local, position)) = object
                    .local
                    .and_then(|local| Some((local, world.world_position(local)?)))
                else {
                    unresolved = unresolved.saturating_add(1);
                    continue;
                };
                if !seen.insert((kind.category(), position)) {
                    continue;
                }
                output.push(EntityRecord {
                    object_id: object.id,
                    kind,
                    position,
                    screen: world.project(local),
                    distance: tile_distance(local.distance_to(anchor)),
                });
            }
        }
    }

    debug!(
        plane = world.plane(),
        records = output.len(),
        trees = output.trees.len(),
        banks = output.banks.len(),
        ore_veins = output.ore_veins.len(),
        unresolved,
        "grid scan complete"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneModel;
    use crate::world::{GridSize, LocalPoint, SceneObject};
    use scenecast_types::{BankKind, EntityKind, TreeState};

    fn scene_with_player() -> SceneModel {
        let mut scene = SceneModel::new(GridSize::square(16), 3000, 3200, 0);
        scene.spawn_player(8, 8);
        scene
    }

    #[test]
    fn missing_player_aborts_scan() {
        let mut scene = SceneModel::new(GridSize::square(4), 0, 0, 0);
        scene.place_object(1, 1, 10829);
        assert_eq!(scan(&scene), Err(ScanError::NoLocalPlayer));
    }

    #[test]
    fn two_willows_on_one_tile_collapse_first_seen_wins() {
        let mut scene = scene_with_player();
        scene.place_object(5, 5, 10829);
        scene.place_object(5, 5, 10831);
        let out = scan(&scene).unwrap_or_default();
        let trees = out.records(EntityCategory::Tree);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees.first().map(|r| r.kind), Some(EntityKind::Tree(TreeState::Full)));
        assert_eq!(trees.first().map(|r| r.object_id), Some(10829));
    }

    #[test]
    fn reversed_order_keeps_the_chopped_variant() {
        let mut scene = scene_with_player();
        scene.place_object(5, 5, 10831);
        scene.place_object(5, 5, 10829);
        let out = scan(&scene).unwrap_or_default();
        let kinds: Vec<_> = out.records(EntityCategory::Tree).iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Tree(TreeState::Chopped)]);
    }

    #[test]
    fn different_categories_on_one_tile_both_report() {
        let mut scene = scene_with_player();
        scene.place_object(2, 2, 10829);
        scene.place_object(2, 2, 10355);
        let out = scan(&scene).unwrap_or_default();
        assert_eq!(out.records(EntityCategory::Tree).len(), 1);
        assert_eq!(out.records(EntityCategory::Bank).len(), 1);
    }

    #[test]
    fn booth_and_chest_on_one_tile_are_one_bank() {
        let mut scene = scene_with_player();
        scene.place_object(3, 3, 4483);
        scene.place_object(3, 3, 10355);
        let out = scan(&scene).unwrap_or_default();
        let banks = out.records(EntityCategory::Bank);
        assert_eq!(banks.len(), 1);
        assert_eq!(banks.first().map(|r| r.kind), Some(EntityKind::Bank(BankKind::Chest)));
    }

    #[test]
    fn objects_sharing_a_world_tile_from_different_cells_dedup() {
        let mut scene = scene_with_player();
        // A large object anchored in cell (4, 4) but reported from (4, 5).
        scene.place_object(4, 4, 10829);
        scene.place_raw(
            4,
            5,
            SceneObject {
                id: 10833,
                local: Some(SceneModel::tile_center(4, 4)),
            },
        );
        let out = scan(&scene).unwrap_or_default();
        assert_eq!(out.records(EntityCategory::Tree).len(), 1);
    }

    #[test]
    fn records_follow_row_major_order() {
        let mut scene = scene_with_player();
        scene.place_object(9, 1, 10829);
        scene.place_object(2, 3, 10829);
        scene.place_object(0, 1, 10829);
        let out = scan(&scene).unwrap_or_default();
        let xs: Vec<_> = out
            .records(EntityCategory::Tree)
            .iter()
            .map(|r| (r.position.x, r.position.y))
            .collect();
        assert_eq!(xs, vec![(3000, 3201), (3009, 3201), (3002, 3203)]);
    }

    #[test]
    fn distance_is_whole_tiles_from_player() {
        let mut scene = scene_with_player();
        scene.place_object(8, 13, 10829);
        scene.place_object(11, 12, 10829);
        let out = scan(&scene).unwrap_or_default();
        let distances: Vec<_> = out
            .records(EntityCategory::Tree)
            .iter()
            .map(|r| r.distance)
            .collect();
        // (11,12) is 3-4-5 away; (8,13) is 5 tiles straight north.
        assert_eq!(distances, vec![5, 5]);
    }

    #[test]
    fn off_screen_records_are_kept_without_projection() {
        let mut scene = scene_with_player();
        scene.set_viewport(crate::scene::Viewport {
            center: SceneModel::tile_center(8, 8),
            width: 96,
            height: 96,
            tile_pixels: 32,
        });
        scene.place_object(8, 9, 10829);
        scene.place_object(15, 15, 10829);
        let out = scan(&scene).unwrap_or_default();
        let trees = out.records(EntityCategory::Tree);
        assert_eq!(trees.len(), 2);
        assert!(trees.iter().any(|r| r.screen.is_some()));
        assert!(trees.iter().any(|r| r.screen.is_none()));
    }

    #[test]
    fn unresolvable_tiles_and_objects_are_skipped() {
        let mut scene = scene_with_player();
        scene.place_object(1, 1, 10829);
        scene.unload_tile(1, 1);
        scene.place_raw(2, 2, SceneObject { id: 10829, local: None });
        scene.place_raw(
            3,
            3,
            SceneObject {
                id: 10829,
                local: Some(LocalPoint::new(-500, -500)),
            },
        );
        scene.place_object(4, 4, 10829);
        let out = scan(&scene).unwrap_or_default();
        assert_eq!(out.records(EntityCategory::Tree).len(), 1);
    }

    #[test]
    fn positions_are_unique_per_category() {
        let mut scene = scene_with_player();
        for x in 0..16 {
            for id in [10829, 10831, 10833, 10355, 4483, 26661, 26665] {
                scene.place_object(x, x, id);
            }
        }
        let out = scan(&scene).unwrap_or_default();
        for category in EntityCategory::ALL {
            let records = out.records(category);
            let unique: BTreeSet<_> = records.iter().map(|r| r.position).collect();
            assert_eq!(unique.len(), records.len(), "{category} has duplicates");
        }
        assert_eq!(out.records(EntityCategory::Tree).len(), 16);
        assert_eq!(out.records(EntityCategory::Bank).len(), 16);
        assert_eq!(out.records(EntityCategory::OreVein).len(), 16);
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn take_empties_one_category() {
        let mut scene = scene_with_player();
        scene.place_object(1, 1, 10829);
        scene.place_object(1, 2, 26674);
        let mut out = scan(&scene).unwrap_or_default();
        assert_eq!(out.take(EntityCategory::Tree).len(), 1);
        assert!(out.records(EntityCategory::Tree).is_empty());
        assert_eq!(out.iter().count(), 1);
    }
}
