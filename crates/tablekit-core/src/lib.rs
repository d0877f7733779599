//! Tablekit Core - value types and seams for remote data tables
//!
//! This crate provides the pieces every other tablekit crate depends on:
//!
//! - `ViewState` / `ViewStateController` - canonical search, filter, sort,
//!   pagination and column visibility state with pure transitions
//! - `FilterValue`, `SortCriterion`, `Pagination`, `ColumnDef` - shared value types
//! - `FilterPreset` and the `PresetRepository` persistence seam
//! - `RowSelection` - row selection over the page on display
//! - `IdentityProvider` - source of the user identity sent with requests
//! - `TableError` - the error type shared across the workspace

mod error;
mod identity;
mod preset;
mod selection;
mod types;
mod view_state;

pub use error::*;
pub use identity::*;
pub use preset::*;
pub use selection::*;
pub use types::*;
pub use view_state::*;
