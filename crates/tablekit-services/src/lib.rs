//! Tablekit Services
//!
//! Everything between the view state and the remote listing endpoint.
//!
//! ```text
//! ViewStateController (tablekit-core)
//!     ↓ ViewState
//! QueryExecutor ← RequestKey, QueryCache, AccessPolicy
//!     ↓ ListingRequest
//! ListingTransport (HttpListingTransport)
//!     ↓ QueryResult
//! TableBinding → TableView
//! ```
//!
//! - [`QueryExecutor`] - cached, de-duplicated listing queries with
//!   stale-while-revalidate and last-writer-wins by request key
//! - [`SuggestionSource`] - search autocomplete
//! - [`TableBinding`] - render model for the fetched page

mod access_policy;
mod cache;
mod http_transport;
mod query_executor;
mod request;
mod suggestions;
mod table_binding;
mod transport;

pub use access_policy::{AccessPolicy, DatasetAccessRule};
pub use cache::{CachedResult, QueryCache, DEFAULT_CACHE_RETENTION, DEFAULT_STALE_TIME};
pub use http_transport::{suggestions_url, HttpListingTransport, DEFAULT_REQUEST_TIMEOUT};
pub use query_executor::{DataChangeCallback, QueryExecutor, QueryState};
pub use request::{build_listing_request, filter_value_to_wire, RequestKey, TableQueryConfig};
pub use suggestions::{filter_suggestions, SuggestionSource};
pub use table_binding::{
    cell_text, ColumnHeader, PaginationFooter, RenderedRow, TableBinding, TableBody, TableView,
    DEFAULT_PAGE_SIZE_OPTIONS, EMPTY_MESSAGE, SKELETON_ROWS,
};
pub use transport::{
    ListingRequest, ListingResponse, ListingTransport, MultiSortEntry, QueryResult,
    RequestHeaders, ResponsePagination, SuggestionsRequest, SuggestionsResponse,
};
