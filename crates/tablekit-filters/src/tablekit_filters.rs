//! Filter editing for tablekit
//!
//! - [`FilterExpressionBuilder`] turns advanced filter condition rows into a filter set
//! - faceted and date filter helpers for list-style column filters
//! - sort slot helpers for the multi-column sort editor
//! - [`FilterPresetStore`] with in-memory and SQLite repositories

mod builder;
mod faceted;
mod filter_types;
pub mod presets;
mod sort_controls;

pub use builder::*;
pub use faceted::*;
pub use filter_types::*;
pub use presets::{FilterPresetStore, InMemoryPresetRepository, SqlitePresetRepository};
pub use sort_controls::*;
