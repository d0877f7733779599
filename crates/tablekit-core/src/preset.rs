//! Saved filter presets and their persistence seam

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FilterSet, Result};

/// A named, reusable filter combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub filters: FilterSet,
    pub created_at: DateTime<Utc>,
    /// Built-in presets are never persisted, deleted or overwritten
    #[serde(default)]
    pub is_built_in: bool,
}

impl FilterPreset {
    pub fn built_in(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        filters: FilterSet,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description,
            filters,
            created_at: Utc::now(),
            is_built_in: true,
        }
    }
}

/// Key under which the custom presets of a table are stored
pub fn preset_storage_key(table_name: &str) -> String {
    format!("filter-presets-{}", table_name)
}

/// Persistence for user-created presets
///
/// `save` replaces the whole collection for the table.
pub trait PresetRepository: Send + Sync {
    fn load(&self, table_name: &str) -> Result<Vec<FilterPreset>>;

    fn save(&self, table_name: &str, presets: &[FilterPreset]) -> Result<()>;
}
