//! Tablekit settings
//!
//! Settings are stored as JSON in the user's config directory. Every section
//! has defaults, so a partial file only needs the values it changes.

mod settings_file;

pub use settings_file::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tablekit_core::{ColumnDef, FilterPreset, FilterSet, FilterValue, SortCriterion, ViewState};
use tablekit_filters::FacetedFilterConfig;
use tablekit_services::{AccessPolicy, DatasetAccessRule, QueryCache, TableQueryConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablekitSettings {
    pub endpoint: EndpointSettings,
    pub pagination: PaginationSettings,
    pub cache: CacheSettings,
    /// Per-table configuration keyed by table name
    pub tables: BTreeMap<String, TableSettings>,
    /// Identity header overrides per dataset
    pub access_rules: Vec<DatasetAccessRule>,
}

impl TablekitSettings {
    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file()
    }

    /// Settings for a table; unknown tables get defaults
    pub fn table(&self, table_name: &str) -> TableSettings {
        self.tables.get(table_name).cloned().unwrap_or_default()
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.access_rules.clone())
    }

    pub fn query_cache(&self) -> QueryCache {
        QueryCache::new(self.cache.stale_time(), self.cache.retention())
    }

    /// Initial view state of a table
    pub fn initial_view(&self, table_name: &str) -> ViewState {
        let table = self.table(table_name);
        let mut view = ViewState::with_page_size(self.pagination.default_page_size);
        view.column_visibility = table.initial_visibility;
        view
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Listing endpoint; the suggestions endpoint is derived from it
    pub listing_url: String,
    pub request_timeout_secs: u64,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            listing_url: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl EndpointSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_page_size: u32,
    pub page_size_options: Vec<u32>,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 30, 40, 50],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Results younger than this are served without revalidation
    pub stale_time_ms: u64,
    pub retention_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time_ms: 0,
            retention_secs: 300,
        }
    }
}

impl CacheSettings {
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Known columns, in display order
    pub columns: Vec<ColumnDef>,
    pub search_columns: Vec<String>,
    pub default_order: Option<SortCriterion>,
    pub additional_params: Option<Map<String, Value>>,
    pub initial_filters: FilterSet,
    pub initial_visibility: BTreeMap<String, bool>,
    pub faceted_filters: Vec<FacetedFilterConfig>,
    /// Column targeted by the single-day date filter
    pub date_filter_column: Option<String>,
    pub builtin_presets: Vec<BuiltinPresetSettings>,
}

impl TableSettings {
    pub fn query_config(&self, table_name: &str) -> TableQueryConfig {
        TableQueryConfig {
            table_name: table_name.to_string(),
            search_columns: self.search_columns.clone(),
            default_order: self.default_order.clone(),
            additional_params: self.additional_params.clone(),
        }
    }

    /// Built-in presets with relative date ranges resolved against `now`
    pub fn builtin_presets(&self, now: DateTime<Utc>) -> Vec<FilterPreset> {
        self.builtin_presets
            .iter()
            .map(|preset| preset.resolve(now))
            .collect()
    }
}

/// Built-in preset as declared in settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinPresetSettings {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub filters: IndexMap<String, PresetFilterSettings>,
}

/// A preset filter: a fixed value or a window ending now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetFilterSettings {
    LastDays { last_days: u32 },
    Value(FilterValue),
}

impl BuiltinPresetSettings {
    pub fn resolve(&self, now: DateTime<Utc>) -> FilterPreset {
        let filters = self
            .filters
            .iter()
            .map(|(column, filter)| {
                let value = match filter {
                    PresetFilterSettings::LastDays { last_days } => {
                        FilterValue::last_days(*last_days, now)
                    }
                    PresetFilterSettings::Value(value) => value.clone(),
                };
                (column.clone(), value)
            })
            .collect();

        FilterPreset {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            filters,
            created_at: now,
            is_built_in: true,
        }
    }
}
