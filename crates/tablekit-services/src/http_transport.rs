//! HTTP listing transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tablekit_core::{Result, TableError};

use crate::transport::{
    ListingRequest, ListingResponse, ListingTransport, RequestHeaders, SuggestionsRequest,
    SuggestionsResponse,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Suggestions endpoint for a listing endpoint
///
/// `https://host/api/pagination` becomes `https://host/api/pagination/suggestions`.
pub fn suggestions_url(listing_url: &str) -> String {
    listing_url.replacen("/pagination", "/pagination/suggestions", 1)
}

/// Listing transport speaking JSON over HTTP POST
pub struct HttpListingTransport {
    client: Client,
    listing_url: String,
    suggestions_url: String,
}

impl HttpListingTransport {
    pub fn new(listing_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let listing_url = listing_url.into();
        if listing_url.trim().is_empty() {
            return Err(TableError::Configuration(
                "Listing endpoint URL is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TableError::Configuration(e.to_string()))?;

        Ok(Self {
            suggestions_url: suggestions_url(&listing_url),
            listing_url,
            client,
        })
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TableError::Network(format!("Status {}: {}", status, body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TableError::Network(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ListingTransport for HttpListingTransport {
    #[tracing::instrument(skip(self, request, headers), fields(table = %request.table, page = request.page_number))]
    async fn fetch_page(
        &self,
        request: &ListingRequest,
        headers: &RequestHeaders,
    ) -> Result<ListingResponse> {
        let mut builder = self
            .client
            .post(self.listing_url.as_str())
            .header("Content-Type", "application/json");
        for (name, value) in headers.pairs() {
            builder = builder.header(name, value);
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| TableError::Network(e.to_string()))?;

        let listing: ListingResponse = Self::decode(response).await?;
        tracing::debug!(
            rows = listing.data.len(),
            total = listing.pagination.total_docs,
            "listing response received"
        );
        Ok(listing)
    }

    #[tracing::instrument(skip(self, request), fields(table = %request.table))]
    async fn fetch_suggestions(&self, request: &SuggestionsRequest) -> Result<Vec<String>> {
        let response = self
            .client
            .post(self.suggestions_url.as_str())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TableError::Network(e.to_string()))?;

        let suggestions: SuggestionsResponse = Self::decode(response).await?;
        Ok(suggestions.suggestions)
    }
}
