//! Snapshot assembly and serialization.
//!
//! The assembler reads player status and inventory fresh from the world,
//! combines them with the tick's scan output and a copy of the chat ring,
//! and derives the counts and flags consumers rely on. Serialization is
//! field-labeled JSON so consumers tolerate reordering and added fields.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scenecast_types::{
    EntityCategory, INVENTORY_CAPACITY, InventorySlotRecord, LiveSnapshot, PlayerStatus, Skill,
    Snapshot,
};

use crate::activity::activity_for_animation;
use crate::cache::Payload;
use crate::chat::ChatLog;
use crate::scanner::ScanOutput;
use crate::world::{IDLE_ANIMATION, WorldView};

/// Skills whose base levels are reported.
const REPORTED_SKILLS: [Skill; 2] = [Skill::Woodcutting, Skill::Mining];

/// Name used for items missing from the definition lookup.
const UNKNOWN_ITEM_NAME: &str = "Unknown";

/// Errors that can occur while turning a snapshot into a payload.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// JSON encoding failed.
    #[error("snapshot serialization failed: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Read the local player's status, `None` when there is no local player.
pub fn read_player_status(world: &dyn WorldView) -> Option<PlayerStatus> {
    let player = world.local_player()?;
    let skill_levels: BTreeMap<Skill, u32> = REPORTED_SKILLS
        .into_iter()
        .map(|skill| (skill, world.real_level(skill)))
        .collect();

    Some(PlayerStatus {
        position: player.world,
        health: world.boosted_level(Skill::Hitpoints),
        max_health: world.real_level(Skill::Hitpoints),
        prayer: world.boosted_level(Skill::Prayer),
        run_energy: world.energy() / 100,
        skill_levels,
        animation_id: player.animation,
        activity: activity_for_animation(player.animation),
        is_idle: player.animation == IDLE_ANIMATION,
        is_moving: player.pose_animation != player.idle_pose_animation,
        interacting_with: player.interacting_with.clone(),
        interface: world.interface_state(),
        dialog_text: world.dialog_text().map(str::to_owned),
    })
}

/// Read the occupied inventory slots in slot order.
///
/// Empty and placeholder slots are skipped. A hidden inventory tab leaves
/// the items listed but without screen positions; a missing container
/// yields no items.
pub fn read_inventory(world: &dyn WorldView) -> Vec<InventorySlotRecord> {
    let Some(items) = world.inventory() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter(|(_, stack)| !stack.is_empty())
        .map(|(slot, stack)| InventorySlotRecord {
            item_id: stack.id,
            name: world
                .item_name(stack.id)
                .unwrap_or(UNKNOWN_ITEM_NAME)
                .to_owned(),
            quantity: stack.quantity,
            slot: u32::try_from(slot).unwrap_or(u32::MAX),
            screen: world.inventory_slot_bounds(slot).map(|b| b.center()),
        })
        .collect()
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Assemble one immutable snapshot.
///
/// Consumes the scan output. Returns the empty snapshot when the world
/// has no local player.
pub fn assemble(
    world: &dyn WorldView,
    mut scan: ScanOutput,
    chat: &ChatLog,
    now: DateTime<Utc>,
) -> Snapshot {
    let Some(player) = read_player_status(world) else {
        return Snapshot::empty();
    };
    let inventory = read_inventory(world);

    let trees = scan.take(EntityCategory::Tree);
    let banks = scan.take(EntityCategory::Bank);
    let ore_veins = scan.take(EntityCategory::OreVein);
    let hoppers = scan.take(EntityCategory::Hopper);
    let sacks = scan.take(EntityCategory::Sack);
    let broken_struts = scan.take(EntityCategory::BrokenStrut);

    Snapshot::Live(Box::new(LiveSnapshot {
        timestamp: now.timestamp_millis(),
        player,
        tree_count: count(trees.len()),
        trees,
        bank_count: count(banks.len()),
        banks,
        ore_vein_count: count(ore_veins.len()),
        ore_veins,
        hopper_count: count(hoppers.len()),
        hoppers,
        sack_count: count(sacks.len()),
        sacks,
        broken_strut_count: count(broken_struts.len()),
        broken_struts,
        inventory_count: count(inventory.len()),
        inventory_full: inventory.len() >= INVENTORY_CAPACITY,
        inventory,
        chat_messages: chat.to_vec(),
    }))
}

/// Serialize a snapshot into a shareable payload.
///
/// # Errors
///
/// Returns [`AssembleError::Serialization`] if JSON encoding fails.
pub fn serialize(snapshot: &Snapshot) -> Result<Payload, AssembleError> {
    let json = serde_json::to_string(snapshot)?;
    Ok(Payload::from(json))
}
