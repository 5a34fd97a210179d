//! `tc-engine` — The TempoCut engine facade.
//!
//! Ties the timeline model and edit algorithms (`tc-timeline`) and beat
//! detection (`tc-beat`) into one editing surface:
//!
//! - **Engine** — orchestrated edits (`add_clip`, `move_clip`,
//!   `delete_clip`, zone management) over immutable `TimelineState`
//!   snapshots, with snap, ripple, and gap closing applied per config
//! - **Events** — per-instance pub/sub bus for edit notifications
//! - **History** — bounded snapshot-based undo/redo with batch grouping
//!
//! Each `Engine` value is a self-contained session: state, config,
//! history, and handlers live on the instance, so several timelines can
//! be edited side by side in one process.

pub mod engine;
pub mod events;
pub mod history;

// Re-export primary API
pub use engine::Engine;
pub use events::{EngineEvent, EventBus, EventKind, HandlerId};
pub use history::{HistoryEntry, HistoryManager};
