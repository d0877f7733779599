//! Filter preset store
//!
//! Keeps built-in presets and the custom presets of one table. Custom presets
//! are loaded once when the store is opened and written back as a whole
//! collection on every change.

use std::sync::Arc;

use chrono::Utc;
use tablekit_core::{FilterPreset, FilterSet, PresetRepository, Result, TableError};
use uuid::Uuid;

/// Presets of one table
pub struct FilterPresetStore {
    table_name: String,
    builtins: Vec<FilterPreset>,
    custom: Vec<FilterPreset>,
    repository: Arc<dyn PresetRepository>,
}

impl FilterPresetStore {
    /// Open the store for `table_name`, loading its custom presets.
    ///
    /// A repository that cannot be read leaves the store with built-ins only.
    pub fn open(
        table_name: impl Into<String>,
        builtins: Vec<FilterPreset>,
        repository: Arc<dyn PresetRepository>,
    ) -> Self {
        let table_name = table_name.into();
        let custom = match repository.load(&table_name) {
            Ok(presets) => presets
                .into_iter()
                .filter(|preset| !preset.is_built_in)
                .collect(),
            Err(err) => {
                tracing::warn!(table = %table_name, error = %err, "failed to load filter presets");
                Vec::new()
            }
        };

        let builtins = builtins
            .into_iter()
            .map(|mut preset| {
                preset.is_built_in = true;
                preset
            })
            .collect();

        Self {
            table_name,
            builtins,
            custom,
            repository,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Built-in presets followed by custom presets
    pub fn list(&self) -> Vec<&FilterPreset> {
        self.builtins.iter().chain(self.custom.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.builtins.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<&FilterPreset> {
        self.builtins
            .iter()
            .chain(self.custom.iter())
            .find(|preset| preset.id == id)
    }

    /// Save the filters as a new custom preset and return it
    pub fn save(
        &mut self,
        name: &str,
        description: Option<&str>,
        filters: FilterSet,
    ) -> Result<FilterPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TableError::Validation("Preset name is required".to_string()));
        }

        let preset = FilterPreset {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            filters,
            created_at: Utc::now(),
            is_built_in: false,
        };

        let mut custom = self.custom.clone();
        custom.push(preset.clone());
        self.persist(custom)?;

        tracing::debug!(table = %self.table_name, preset = %preset.id, "saved filter preset");
        Ok(preset)
    }

    /// Delete a custom preset
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.is_built_in(id) {
            return Err(TableError::ProtectedPreset(id.to_string()));
        }
        if !self.custom.iter().any(|preset| preset.id == id) {
            return Err(TableError::PresetNotFound(id.to_string()));
        }

        let custom = self
            .custom
            .iter()
            .filter(|preset| preset.id != id)
            .cloned()
            .collect();
        self.persist(custom)?;

        tracing::debug!(table = %self.table_name, preset = %id, "deleted filter preset");
        Ok(())
    }

    /// Replace the filters of a custom preset
    pub fn update_filters(&mut self, id: &str, filters: FilterSet) -> Result<FilterPreset> {
        if self.is_built_in(id) {
            return Err(TableError::ProtectedPreset(id.to_string()));
        }

        let mut custom = self.custom.clone();
        let preset = custom
            .iter_mut()
            .find(|preset| preset.id == id)
            .ok_or_else(|| TableError::PresetNotFound(id.to_string()))?;
        preset.filters = filters;
        let updated = preset.clone();

        self.persist(custom)?;
        Ok(updated)
    }

    /// Filter set of a preset, ready for `ViewStateController::apply_filter_set`
    pub fn apply(&self, id: &str) -> Result<FilterSet> {
        self.get(id)
            .map(|preset| preset.filters.clone())
            .ok_or_else(|| TableError::PresetNotFound(id.to_string()))
    }

    fn is_built_in(&self, id: &str) -> bool {
        self.builtins.iter().any(|preset| preset.id == id)
    }

    /// Write the collection first; memory only changes once it is stored
    fn persist(&mut self, custom: Vec<FilterPreset>) -> Result<()> {
        self.repository.save(&self.table_name, &custom)?;
        self.custom = custom;
        Ok(())
    }
}
