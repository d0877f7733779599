//! Per-dataset identity header rules

use serde::{Deserialize, Serialize};
use tablekit_core::UserIdentity;

use crate::transport::RequestHeaders;

/// Header override for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetAccessRule {
    pub table: String,
    /// Role sent regardless of the caller's own role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_role: Option<String>,
    /// User id sent when the caller has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_user_id: Option<String>,
}

/// Explicit table of dataset rules; no dataset is special unless listed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPolicy {
    rules: Vec<DatasetAccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<DatasetAccessRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DatasetAccessRule] {
        &self.rules
    }

    pub fn rule_for(&self, table: &str) -> Option<&DatasetAccessRule> {
        self.rules.iter().find(|rule| rule.table == table)
    }

    /// Identity headers for a request against `table`
    pub fn headers_for(&self, table: &str, user: Option<&UserIdentity>) -> RequestHeaders {
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

        let mut headers = RequestHeaders {
            user_id: user.and_then(|u| non_empty(&u.id)),
            user_type: user.and_then(|u| non_empty(&u.role)),
        };

        if let Some(rule) = self.rule_for(table) {
            if let Some(role) = &rule.forced_role {
                tracing::debug!(table, role = %role, "forcing role for dataset");
                headers.user_type = Some(role.clone());
            }
            if headers.user_id.is_none() {
                headers.user_id = rule.fallback_user_id.clone();
            }
        }

        headers
    }
}
