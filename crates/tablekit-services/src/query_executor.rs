//! Query executor
//!
//! Derives the listing request from a view state, de-duplicates identical
//! requests in flight, caches results and keeps the displayed state in step
//! with the most recently requested key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tablekit_core::{IdentityProvider, Result, Row, TableError, ViewState};

use crate::access_policy::AccessPolicy;
use crate::cache::QueryCache;
use crate::request::{build_listing_request, RequestKey, TableQueryConfig};
use crate::transport::{ListingTransport, QueryResult};

type FetchOutcome = std::result::Result<Arc<QueryResult>, TableError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Callback invoked with the rows of every result applied to the display
pub type DataChangeCallback = Arc<dyn Fn(&[Row]) + Send + Sync>;

/// Snapshot of what the table should display
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    /// Key of the most recent `execute`/`reload`
    pub current_key: Option<RequestKey>,
    /// Last result applied for display; kept across errors and refetches
    pub result: Option<Arc<QueryResult>>,
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<TableError>,
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        self.is_fetching && self.result.is_none()
    }
}

struct InFlight {
    generation: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct DisplayState {
    query: QueryState,
    /// Generation of the displayed result; reset when the key changes
    applied_generation: u64,
}

/// Executes listing queries for one table
pub struct QueryExecutor {
    config: TableQueryConfig,
    transport: Arc<dyn ListingTransport>,
    identity: Arc<dyn IdentityProvider>,
    policy: AccessPolicy,
    cache: QueryCache,
    in_flight: Mutex<HashMap<RequestKey, InFlight>>,
    state: RwLock<DisplayState>,
    observers: RwLock<Vec<DataChangeCallback>>,
    next_generation: AtomicU64,
}

impl QueryExecutor {
    pub fn new(
        config: TableQueryConfig,
        transport: Arc<dyn ListingTransport>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            identity,
            policy: AccessPolicy::default(),
            cache: QueryCache::default(),
            in_flight: Mutex::new(HashMap::new()),
            state: RwLock::new(DisplayState::default()),
            observers: RwLock::new(Vec::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &TableQueryConfig {
        &self.config
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Current display snapshot
    pub fn state(&self) -> QueryState {
        self.state.read().query.clone()
    }

    /// Register a callback for applied results
    pub fn on_data_change(&self, callback: impl Fn(&[Row]) + Send + Sync + 'static) {
        self.observers.write().push(Arc::new(callback));
    }

    /// Fetch the page described by `view`.
    ///
    /// A fresh cached result is returned without a network call. A stale one
    /// is displayed at once and revalidated. A request already in flight for
    /// the same key is joined rather than repeated. The returned result is
    /// the one for `view`, even if the display has since moved to another key.
    #[tracing::instrument(skip(self, view), fields(table = %self.config.table_name))]
    pub async fn execute(&self, view: &ViewState) -> Result<Arc<QueryResult>> {
        let key = RequestKey::from_view(&self.config.table_name, view);
        self.set_current_key(&key);

        if let Some(hit) = self.cache.get(&key) {
            if hit.is_fresh {
                tracing::debug!(page = key.page_number, "query cache hit");
                self.apply_success(&key, hit.result.clone(), hit.generation);
                return Ok(hit.result);
            }
            tracing::debug!(page = key.page_number, "stale cache hit, revalidating");
            self.apply_success(&key, hit.result.clone(), hit.generation);
        } else {
            tracing::debug!(page = key.page_number, "query cache miss");
        }

        self.fetch(key, view).await
    }

    /// Drop cached results and in-flight handles for the table and fetch `view` again
    #[tracing::instrument(skip(self, view), fields(table = %self.config.table_name))]
    pub async fn reload(&self, view: &ViewState) -> Result<Arc<QueryResult>> {
        let table = self.config.table_name.as_str();
        let dropped = self.cache.invalidate_table(table);
        self.in_flight.lock().retain(|key, _| key.table != table);
        tracing::info!(table, dropped, "reloading table data");

        let key = RequestKey::from_view(table, view);
        self.set_current_key(&key);
        self.fetch(key, view).await
    }

    /// Whether a request for `key` is currently in flight
    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    async fn fetch(&self, key: RequestKey, view: &ViewState) -> Result<Arc<QueryResult>> {
        if self.is_current(&key) {
            self.state.write().query.is_fetching = true;
        }

        let (generation, future) = self.join_or_start(&key, view);
        let outcome = future.await;
        self.finish_in_flight(&key, generation);

        match outcome {
            Ok(result) => {
                self.cache.insert(key.clone(), result.clone(), generation);
                self.apply_success(&key, result.clone(), generation);
                Ok(result)
            }
            Err(err) => {
                tracing::warn!(table = %key.table, page = key.page_number, error = %err, "listing request failed");
                self.apply_error(&key, err.clone(), generation);
                Err(err)
            }
        }
    }

    fn join_or_start(&self, key: &RequestKey, view: &ViewState) -> (u64, SharedFetch) {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(key) {
            tracing::debug!(page = key.page_number, "joining in-flight request");
            return (existing.generation, existing.future.clone());
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let request = build_listing_request(&self.config, view);
        let user = self.identity.current_user();
        let headers = self.policy.headers_for(&self.config.table_name, user.as_ref());
        let transport = self.transport.clone();

        let fetch: BoxFuture<'static, FetchOutcome> = async move {
            let response = transport.fetch_page(&request, &headers).await?;
            Ok(Arc::new(QueryResult::from(response)))
        }
        .boxed();
        let future = fetch.shared();

        in_flight.insert(
            key.clone(),
            InFlight {
                generation,
                future: future.clone(),
            },
        );
        (generation, future)
    }

    fn finish_in_flight(&self, key: &RequestKey, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
        {
            in_flight.remove(key);
        }
    }

    fn set_current_key(&self, key: &RequestKey) {
        let mut state = self.state.write();
        if state.query.current_key.as_ref() != Some(key) {
            state.query.current_key = Some(key.clone());
            state.query.is_error = false;
            state.query.error = None;
            state.applied_generation = 0;
        }
    }

    fn is_current(&self, key: &RequestKey) -> bool {
        self.state.read().query.current_key.as_ref() == Some(key)
    }

    fn apply_success(&self, key: &RequestKey, result: Arc<QueryResult>, generation: u64) {
        let still_fetching = self.is_in_flight(key);
        {
            let mut state = self.state.write();
            if state.query.current_key.as_ref() != Some(key) {
                tracing::debug!(page = key.page_number, "discarding result for superseded query");
                return;
            }
            if generation < state.applied_generation {
                tracing::debug!(page = key.page_number, "discarding result older than the displayed one");
                return;
            }
            state.applied_generation = generation;
            state.query.result = Some(result.clone());
            state.query.is_fetching = still_fetching;
            state.query.is_error = false;
            state.query.error = None;
        }
        self.notify(&result.rows);
    }

    fn apply_error(&self, key: &RequestKey, error: TableError, generation: u64) {
        let still_fetching = self.is_in_flight(key);
        let mut state = self.state.write();
        if state.query.current_key.as_ref() != Some(key) || generation < state.applied_generation {
            return;
        }
        state.query.is_fetching = still_fetching;
        state.query.is_error = true;
        state.query.error = Some(error);
    }

    fn notify(&self, rows: &[Row]) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer(rows);
        }
    }
}
