//! Filter presets for a table
//!
//! Built-in presets come from configuration; custom presets are persisted
//! through a [`tablekit_core::PresetRepository`].

mod manager;
mod storage;

pub use manager::FilterPresetStore;
pub use storage::{InMemoryPresetRepository, SqlitePresetRepository};
