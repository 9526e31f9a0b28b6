//! Shared snapshot data model for the Scenecast world publisher.
//!
//! This crate is the single source of truth for every value that crosses
//! the network boundary. Types flow downstream to `TypeScript` via `ts-rs`
//! so dashboard and overlay consumers can type the payloads they receive.
//!
//! # Modules
//!
//! - [`ids`] -- UUID v7 identifier newtypes
//! - [`geometry`] -- World tile positions and canvas points
//! - [`enums`] -- Entity categories and kinds, skills, player activity
//! - [`structs`] -- Entity, player, inventory and chat records
//! - [`snapshot`] -- The assembled snapshot published each tick
//! - [`connection`] -- Subscriber connection lifecycle

pub mod connection;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use connection::{CloseReason, ConnectionInfo, ConnectionState};
pub use enums::{
    Activity, BankKind, EntityCategory, EntityKind, ParseActivityError, ParseCategoryError, Skill,
    TreeState, VeinState,
};
pub use geometry::{ScreenPoint, WorldPosition};
pub use ids::ConnectionId;
pub use snapshot::{EmptySnapshot, INVENTORY_CAPACITY, LiveSnapshot, Snapshot};
pub use structs::{ChatLogEntry, EntityRecord, InterfaceState, InventorySlotRecord, PlayerStatus};
