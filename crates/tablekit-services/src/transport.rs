//! Listing endpoint wire types and the transport seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tablekit_core::{Result, Row, SortDirection};

/// Body of a listing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub table: String,
    pub page_size: u32,
    pub page_number: u32,
    /// Primary `[column, direction]` pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<(String, SortDirection)>,
    /// Full ordered sort, present only for more than one sort column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_sort: Option<Vec<MultiSortEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default)]
    pub column_filters: Map<String, Value>,
    #[serde(default)]
    pub additional_params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSortEntry {
    pub column: String,
    pub direction: SortDirection,
}

/// Identity headers attached to a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub user_id: Option<String>,
    pub user_type: Option<String>,
}

impl RequestHeaders {
    pub const USER_ID: &'static str = "x-user-id";
    pub const USER_TYPE: &'static str = "x-user-type";

    /// Header name/value pairs that are set
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(id) = self.user_id.as_deref() {
            pairs.push((Self::USER_ID, id));
        }
        if let Some(user_type) = self.user_type.as_deref() {
            pairs.push((Self::USER_TYPE, user_type));
        }
        pairs
    }
}

/// Body of a listing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    pub data: Vec<Row>,
    #[serde(default)]
    pub pagination: ResponsePagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePagination {
    #[serde(default, rename = "totalDocs")]
    pub total_docs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsRequest {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One fetched page. Replaced wholesale by the next successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    /// Total number of matching rows across all pages
    pub total_count: u64,
}

impl From<ListingResponse> for QueryResult {
    fn from(response: ListingResponse) -> Self {
        Self {
            rows: response.data,
            total_count: response.pagination.total_docs,
        }
    }
}

/// Remote listing endpoint
#[async_trait]
pub trait ListingTransport: Send + Sync {
    /// Fetch one page of a table
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        headers: &RequestHeaders,
    ) -> Result<ListingResponse>;

    /// Fetch the autocomplete suggestions for a column
    async fn fetch_suggestions(&self, request: &SuggestionsRequest) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_without_pagination_defaults_to_zero() {
        let response: ListingResponse =
            serde_json::from_value(json!({"data": [{"id": 1}]})).unwrap();
        let result = QueryResult::from(response);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn test_response_without_data_is_rejected() {
        let response = serde_json::from_value::<ListingResponse>(json!({"pagination": {"totalDocs": 3}}));
        assert!(response.is_err());
    }

    #[test]
    fn test_order_by_serializes_as_pair() {
        let request = ListingRequest {
            table: "users".into(),
            page_size: 10,
            page_number: 1,
            order_by: Some(("name".into(), SortDirection::Desc)),
            multi_sort: None,
            search_columns: None,
            search_query: None,
            column_filters: Map::new(),
            additional_params: Map::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["orderBy"], json!(["name", "desc"]));
        assert!(json.get("multiSort").is_none());
        assert_eq!(json["pageNumber"], json!(1));
    }

    #[test]
    fn test_header_pairs_skip_missing_values() {
        let headers = RequestHeaders {
            user_id: None,
            user_type: Some("Admin".into()),
        };
        assert_eq!(headers.pairs(), vec![("x-user-type", "Admin")]);
    }
}
