//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tablekit_core::{Result, Row, TableError};
use tablekit_services::{
    ListingRequest, ListingResponse, ListingTransport, RequestHeaders, ResponsePagination,
    SuggestionsRequest,
};
use tokio::sync::Notify;

/// Mock listing endpoint for testing executor logic without a server.
///
/// Pages can be held back with [`MockTransport::hold_page`] until
/// [`MockTransport::release_page`] is called, to control the order in
/// which concurrent responses arrive.
pub struct MockTransport {
    /// Response per page number; pages without one get `default_response`
    pub pages: parking_lot::Mutex<HashMap<u32, ListingResponse>>,
    pub default_response: parking_lot::Mutex<ListingResponse>,
    pub suggestions: Vec<String>,
    pub should_fail: parking_lot::Mutex<bool>,
    pub call_count: Arc<parking_lot::Mutex<usize>>,
    pub suggestion_calls: Arc<parking_lot::Mutex<Vec<SuggestionsRequest>>>,
    /// Log of every listing request with its headers, for assertion in tests
    pub request_log: Arc<parking_lot::Mutex<Vec<(ListingRequest, RequestHeaders)>>>,
    gates: parking_lot::Mutex<HashMap<u32, Arc<Notify>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            pages: parking_lot::Mutex::new(HashMap::new()),
            default_response: parking_lot::Mutex::new(listing(vec![], 0)),
            suggestions: vec![],
            should_fail: parking_lot::Mutex::new(false),
            call_count: Arc::new(parking_lot::Mutex::new(0)),
            suggestion_calls: Arc::new(parking_lot::Mutex::new(Vec::new())),
            request_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
            gates: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn with_response(self, response: ListingResponse) -> Self {
        *self.default_response.lock() = response;
        self
    }

    pub fn with_page(self, page_number: u32, response: ListingResponse) -> Self {
        self.pages.lock().insert(page_number, response);
        self
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn set_response(&self, response: ListingResponse) {
        *self.default_response.lock() = response;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.should_fail.lock() = failing;
    }

    /// Hold responses for `page_number` until released
    pub fn hold_page(&self, page_number: u32) {
        self.gates
            .lock()
            .insert(page_number, Arc::new(Notify::new()));
    }

    pub fn release_page(&self, page_number: u32) {
        if let Some(gate) = self.gates.lock().get(&page_number) {
            gate.notify_one();
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    pub fn request_log(&self) -> Vec<(ListingRequest, RequestHeaders)> {
        self.request_log.lock().clone()
    }

    pub fn last_request(&self) -> Option<ListingRequest> {
        self.request_log.lock().last().map(|(request, _)| request.clone())
    }
}

#[async_trait]
impl ListingTransport for MockTransport {
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        headers: &RequestHeaders,
    ) -> Result<ListingResponse> {
        *self.call_count.lock() += 1;
        self.request_log
            .lock()
            .push((request.clone(), headers.clone()));

        let gate = self.gates.lock().get(&request.page_number).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if *self.should_fail.lock() {
            return Err(TableError::Network("connection refused".into()));
        }

        let page = self.pages.lock().get(&request.page_number).cloned();
        Ok(page.unwrap_or_else(|| self.default_response.lock().clone()))
    }

    async fn fetch_suggestions(&self, request: &SuggestionsRequest) -> Result<Vec<String>> {
        self.suggestion_calls.lock().push(request.clone());
        if *self.should_fail.lock() {
            return Err(TableError::Network("connection refused".into()));
        }
        Ok(self.suggestions.clone())
    }
}

/// Build a row from a JSON object literal
pub fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

pub fn listing(data: Vec<Row>, total_docs: u64) -> ListingResponse {
    ListingResponse {
        data,
        pagination: ResponsePagination { total_docs },
    }
}

/// `count` user rows with ids starting at `first_id`
pub fn user_rows(first_id: u64, count: u64) -> Vec<Row> {
    (first_id..first_id + count)
        .map(|id| row(json!({"id": id, "name": format!("User {}", id), "status": "active"})))
        .collect()
}
