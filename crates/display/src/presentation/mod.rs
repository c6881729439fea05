//! Presentation surfaces.
//!
//! - `SlotBoard`: in-memory latest-value store, shareable across tasks
//! - `ConsoleSurface`: writes each slot update to a terminal

pub mod console;
pub mod slot_board;

pub use console::ConsoleSurface;
pub use slot_board::{SlotBoard, Slots};
