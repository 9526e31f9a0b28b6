//! Record structs produced each tick: scanned entities, player status,
//! inventory slots and chat lines.
//!
//! Every record is an owned copy of primitive host data. Nothing here
//! points back into the host scene graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Activity, EntityCategory, EntityKind, Skill};
use crate::geometry::{ScreenPoint, WorldPosition};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// One interesting scene object found by the grid scanner.
///
/// Created fresh every scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityRecord {
    /// Raw host object identifier of the first object seen at this tile.
    pub object_id: i32,
    /// Category and category-specific state.
    pub kind: EntityKind,
    /// Absolute tile position.
    pub position: WorldPosition,
    /// Canvas position, absent when the tile is off-screen.
    pub screen: Option<ScreenPoint>,
    /// Distance from the local player in whole tiles.
    pub distance: u32,
}

impl EntityRecord {
    /// The broad category of this record.
    pub const fn category(&self) -> EntityCategory {
        self.kind.category()
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Which blocking interfaces are currently open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InterfaceState {
    /// The bank interface is open.
    pub in_bank: bool,
    /// A dialog box is open.
    pub in_dialog: bool,
    /// A shop interface is open.
    pub in_shop: bool,
}

/// The local player's status, rebuilt every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerStatus {
    /// Absolute tile position.
    pub position: WorldPosition,
    /// Current (boosted) hitpoints.
    pub health: u32,
    /// Base hitpoints level.
    pub max_health: u32,
    /// Current (boosted) prayer points.
    pub prayer: u32,
    /// Run energy as a percentage (0-100).
    pub run_energy: u32,
    /// Base levels of the tracked skills.
    pub skill_levels: BTreeMap<Skill, u32>,
    /// Raw animation id; `-1` when no animation is playing.
    pub animation_id: i32,
    /// Activity derived from `animation_id`.
    #[ts(as = "String")]
    pub activity: Activity,
    /// True iff `animation_id` is the "no animation" sentinel.
    pub is_idle: bool,
    /// True when the pose animation differs from the idle pose.
    pub is_moving: bool,
    /// Name of the actor the player is interacting with, if any.
    pub interacting_with: Option<String>,
    /// Open interfaces.
    pub interface: InterfaceState,
    /// Text of the open dialog, if any.
    pub dialog_text: Option<String>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// One occupied inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventorySlotRecord {
    /// Host item identifier.
    pub item_id: i32,
    /// Display name from the item definition lookup.
    pub name: String,
    /// Stack size.
    pub quantity: u32,
    /// Zero-based slot index.
    pub slot: u32,
    /// Canvas centre of the slot widget, absent when the inventory tab is
    /// hidden.
    pub screen: Option<ScreenPoint>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// One formatted chat line, e.g. `[Alice] hello` or `[System] You get some logs.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatLogEntry(pub String);

impl ChatLogEntry {
    /// The formatted text of this line.
    pub fn text(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::TreeState;

    #[test]
    fn record_serializes_absent_screen_as_null() {
        let record = EntityRecord {
            object_id: 10829,
            kind: EntityKind::Tree(TreeState::Full),
            position: WorldPosition::new(3088, 3234, 0),
            screen: None,
            distance: 4,
        };
        let json = serde_json::to_value(&record).unwrap_or_default();
        assert!(json["screen"].is_null());
        assert_eq!(json["kind"]["state"], "full");
        assert_eq!(json["distance"], 4);
    }

    #[test]
    fn chat_entry_is_a_bare_string() {
        let json = serde_json::to_string(&ChatLogEntry(String::from("[System] hi")))
            .unwrap_or_default();
        assert_eq!(json, "\"[System] hi\"");
    }

    #[test]
    fn skill_levels_serialize_as_object() {
        let mut levels = BTreeMap::new();
        levels.insert(Skill::Woodcutting, 35);
        let json = serde_json::to_value(&levels).unwrap_or_default();
        assert_eq!(json["woodcutting"], 35);
    }
}
