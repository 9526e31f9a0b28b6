//! Grid scan, classification and tick pipeline for the Scenecast publisher.
//!
//! This crate owns the synchronous per-tick pipeline:
//! scan, classify, deduplicate, assemble, serialize, cache, hand off.
//! Nothing here performs network I/O; the broadcast side plugs in through
//! the [`SnapshotSink`] trait.
//!
//! # Modules
//!
//! - [`world`] -- The read-only [`WorldView`] boundary and its value types.
//! - [`scene`] -- [`SceneModel`], an in-memory world for the demo driver
//!   and tests.
//! - [`classifier`] -- Object id to entity kind lookup tables.
//! - [`activity`] -- Animation id to player activity table.
//! - [`scanner`] -- The single-pass grid scan with per-category dedup.
//! - [`chat`] -- Bounded ring of recent chat lines.
//! - [`assembler`] -- Snapshot assembly and JSON serialization.
//! - [`cache`] -- Last-known-good serialized snapshot.
//! - [`tick`] -- [`Publisher`], the per-tick pipeline entry points.
//! - [`overlay`] -- Outline and distance-label planning.
//! - [`config`] -- Configuration loading from `scenecast.yaml`.
//! - [`runner`] -- The async tick loop with operator stop.
//!
//! [`SnapshotSink`]: tick::SnapshotSink
//! [`WorldView`]: world::WorldView
//! [`SceneModel`]: scene::SceneModel
//! [`Publisher`]: tick::Publisher

pub mod activity;
pub mod assembler;
pub mod cache;
pub mod chat;
pub mod classifier;
pub mod config;
pub mod overlay;
pub mod runner;
pub mod scanner;
pub mod scene;
pub mod tick;
pub mod world;
