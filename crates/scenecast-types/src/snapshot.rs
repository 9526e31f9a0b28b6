//! The immutable snapshot published to subscribers.
//!
//! A [`Snapshot`] is either a full [`LiveSnapshot`] or the minimal empty
//! value produced while no local player exists. The empty variant
//! serializes to `{}`, the same payload the cache serves before the first
//! tick completes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{ChatLogEntry, EntityRecord, InventorySlotRecord, PlayerStatus};

/// Number of slots in a full inventory.
pub const INVENTORY_CAPACITY: usize = 28;

/// One fully assembled view of world, player, inventory and chat state.
///
/// Counts and flags are derived once at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LiveSnapshot {
    /// Milliseconds since the Unix epoch at assembly time.
    pub timestamp: i64,
    /// Local player status.
    pub player: PlayerStatus,
    /// Trees in scan order.
    pub trees: Vec<EntityRecord>,
    /// Number of entries in `trees`.
    pub tree_count: u32,
    /// Bank booths and chests in scan order.
    pub banks: Vec<EntityRecord>,
    /// Number of entries in `banks`.
    pub bank_count: u32,
    /// Ore veins in scan order.
    pub ore_veins: Vec<EntityRecord>,
    /// Number of entries in `ore_veins`.
    pub ore_vein_count: u32,
    /// Hoppers in scan order.
    pub hoppers: Vec<EntityRecord>,
    /// Number of entries in `hoppers`.
    pub hopper_count: u32,
    /// Sacks in scan order.
    pub sacks: Vec<EntityRecord>,
    /// Number of entries in `sacks`.
    pub sack_count: u32,
    /// Broken struts in scan order.
    pub broken_struts: Vec<EntityRecord>,
    /// Number of entries in `broken_struts`.
    pub broken_strut_count: u32,
    /// Occupied inventory slots in slot order.
    pub inventory: Vec<InventorySlotRecord>,
    /// Number of occupied slots.
    pub inventory_count: u32,
    /// True when at least [`INVENTORY_CAPACITY`] slots are occupied.
    pub inventory_full: bool,
    /// Copy of the chat ring, oldest first.
    pub chat_messages: Vec<ChatLogEntry>,
}

/// Marker for the empty snapshot; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EmptySnapshot {}

/// A snapshot as handed to the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum Snapshot {
    /// Full world view.
    Live(Box<LiveSnapshot>),
    /// No local player was available.
    Empty(EmptySnapshot),
}

impl Snapshot {
    /// The empty snapshot.
    pub const fn empty() -> Self {
        Self::Empty(EmptySnapshot {})
    }

    /// Return the live snapshot, if this is one.
    pub fn as_live(&self) -> Option<&LiveSnapshot> {
        match self {
            Self::Live(live) => Some(live),
            Self::Empty(_) => None,
        }
    }

    /// True for the empty snapshot.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_empty_object() {
        let json = serde_json::to_string(&Snapshot::empty()).unwrap_or_default();
        assert_eq!(json, "{}");
    }

    #[test]
    fn empty_object_parses_as_empty() {
        let parsed: Result<Snapshot, _> = serde_json::from_str("{}");
        assert!(parsed.is_ok_and(|s| s.is_empty()));
    }
}
