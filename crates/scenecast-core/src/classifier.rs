//! Entity classification: raw object id to [`EntityKind`].
//!
//! Classification is a pure lookup over closed, static tables: one
//! membership table per category, plus a state table for categories whose
//! look changes (trees, ore veins). Membership tables are consulted in a
//! fixed order and the first hit wins, so an id listed under both booths
//! and chests is a booth.

use scenecast_types::{BankKind, EntityKind, TreeState, VeinState};

// ---------------------------------------------------------------------------
// Membership tables
// ---------------------------------------------------------------------------

/// Willow trees in every growth stage.
const TREE_IDS: &[i32] = &[10819, 10829, 10831, 10833];

/// Bank booths across the known bank locations.
const BANK_BOOTH_IDS: &[i32] = &[
    10355, 10356, 10357, 10358, // standard booths
    11338, 12798, 14367, 19230, //
    24914, 25808, 27254, 29085, //
    34752, 35647, 36786, 37474,
];

/// Bank chests. 27254 and 34752 also appear as booths and classify as such.
const BANK_CHEST_IDS: &[i32] = &[4483, 8981, 14382, 21301, 27254, 34752];

/// Motherlode Mine ore veins, active and depleted.
const ORE_VEIN_IDS: &[i32] = &[26661, 26662, 26663, 26664, 26665, 26666, 26667, 26668];

/// Pay-dirt hopper.
const HOPPER_IDS: &[i32] = &[26674];

/// Collection sack.
const SACK_IDS: &[i32] = &[26688];

/// Broken water-wheel strut.
const BROKEN_STRUT_IDS: &[i32] = &[26670];

// ---------------------------------------------------------------------------
// State tables
// ---------------------------------------------------------------------------

const TREE_STATES: &[(i32, TreeState)] = &[
    (10829, TreeState::Full),
    (10831, TreeState::Chopped),
    (10833, TreeState::Stump),
];

const VEIN_STATES: &[(i32, VeinState)] = &[
    (26661, VeinState::Active),
    (26662, VeinState::Active),
    (26663, VeinState::Active),
    (26664, VeinState::Active),
    (26665, VeinState::Depleted),
    (26666, VeinState::Depleted),
    (26667, VeinState::Depleted),
    (26668, VeinState::Depleted),
];

/// Classify a raw object id.
///
/// Returns `None` for every id outside the membership tables; that is the
/// normal "not of interest" answer, not an error.
pub fn classify(object_id: i32) -> Option<EntityKind> {
    if TREE_IDS.contains(&object_id) {
        Some(EntityKind::Tree(tree_state(object_id)))
    } else if BANK_BOOTH_IDS.contains(&object_id) {
        Some(EntityKind::Bank(BankKind::Booth))
    } else if BANK_CHEST_IDS.contains(&object_id) {
        Some(EntityKind::Bank(BankKind::Chest))
    } else if ORE_VEIN_IDS.contains(&object_id) {
        Some(EntityKind::OreVein(vein_state(object_id)))
    } else if HOPPER_IDS.contains(&object_id) {
        Some(EntityKind::Hopper)
    } else if SACK_IDS.contains(&object_id) {
        Some(EntityKind::Sack)
    } else if BROKEN_STRUT_IDS.contains(&object_id) {
        Some(EntityKind::BrokenStrut)
    } else {
        None
    }
}

/// Visual state of a tree id, [`TreeState::Unknown`] when unmapped.
pub fn tree_state(object_id: i32) -> TreeState {
    lookup(TREE_STATES, object_id).unwrap_or(TreeState::Unknown)
}

/// Visual state of an ore vein id, [`VeinState::Unknown`] when unmapped.
pub fn vein_state(object_id: i32) -> VeinState {
    lookup(VEIN_STATES, object_id).unwrap_or(VeinState::Unknown)
}

fn lookup<T: Copy>(table: &[(i32, T)], object_id: i32) -> Option<T> {
    table
        .iter()
        .find(|(id, _)| *id == object_id)
        .map(|&(_, value)| value)
}
