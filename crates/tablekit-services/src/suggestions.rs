//! Search autocomplete suggestions

use std::sync::Arc;

use parking_lot::RwLock;
use tablekit_core::Result;

use crate::request::TableQueryConfig;
use crate::transport::{ListingTransport, SuggestionsRequest};

const FALLBACK_COLUMN: &str = "title";

/// Suggestions for the free-text search of one table, fetched once and cached
pub struct SuggestionSource {
    config: TableQueryConfig,
    transport: Arc<dyn ListingTransport>,
    cached: RwLock<Option<Arc<Vec<String>>>>,
}

impl SuggestionSource {
    pub fn new(config: TableQueryConfig, transport: Arc<dyn ListingTransport>) -> Self {
        Self {
            config,
            transport,
            cached: RwLock::new(None),
        }
    }

    /// Suggestions are only offered for tables with search columns
    pub fn is_enabled(&self) -> bool {
        !self.config.search_columns.is_empty()
    }

    pub fn request(&self) -> SuggestionsRequest {
        SuggestionsRequest {
            table: self.config.table_name.clone(),
            column: self
                .config
                .search_columns
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_COLUMN.to_string()),
        }
    }

    /// All suggestions for the table
    #[tracing::instrument(skip(self), fields(table = %self.config.table_name))]
    pub async fn load(&self) -> Result<Arc<Vec<String>>> {
        if !self.is_enabled() {
            return Ok(Arc::new(Vec::new()));
        }
        if let Some(cached) = self.cached.read().clone() {
            return Ok(cached);
        }

        let suggestions = Arc::new(self.transport.fetch_suggestions(&self.request()).await?);
        tracing::debug!(count = suggestions.len(), "loaded search suggestions");
        *self.cached.write() = Some(suggestions.clone());
        Ok(suggestions)
    }

    /// Suggestions matching the typed query
    pub async fn matching(&self, query: &str) -> Result<Vec<String>> {
        let all = self.load().await?;
        Ok(filter_suggestions(&all, query))
    }

    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }
}

/// Case-insensitive substring match; an empty query keeps everything
pub fn filter_suggestions(suggestions: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return suggestions.to_vec();
    }
    let needle = query.to_lowercase();
    suggestions
        .iter()
        .filter(|suggestion| suggestion.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
