// ============================================================================
// ExploreBD list client
// ============================================================================

pub mod adapter;
pub mod booking;
pub mod cache;
pub mod connection;
pub mod core;
pub mod list;
pub mod resources;

pub use cache::{CacheStats, QueryCache};
pub use connection::{
    HttpResponse, Transport,
    auth::{Access, Role, Session, check_route, guard},
    config::ClientConfig,
    http::HttpTransport,
};
pub use crate::core::{
    Filters, ListError, ListStatus, PageRequest, PageResponse, Record, Result, SortCriterion,
};
pub use list::{ListController, ListView};
pub use resources::ResourceConfig;

use std::num::NonZeroUsize;
use std::sync::Arc;

// ============================================================================
// High-level Client API
// ============================================================================

/// API client with a shared query cache
///
/// This is the recommended entry point: one `Client` per application, one
/// [`ListController`] per mounted list screen.
///
/// # Examples
///
/// ```no_run
/// use explorebd::{Client, ClientConfig, resources};
///
/// # async fn run() -> explorebd::Result<()> {
/// let client = Client::new(ClientConfig::new("https://api.explorebd.example"))?;
///
/// let mut packages = client.controller(&resources::PACKAGES);
/// packages.set_filter("tourType", "hiking");
/// packages.load(client.cache()).await;
///
/// for record in packages.view().rows() {
///     println!("{:?}", record.text("tripTitle"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    transport: Arc<HttpTransport>,
    cache: QueryCache,
}

impl Client {
    /// Build a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| ListError::Config("cache_capacity must be > 0".into()))?;
        let stale_after = config.stale_after;

        let transport = Arc::new(HttpTransport::new(config)?);
        let cache = QueryCache::new(transport.clone(), capacity).with_stale_after(stale_after);

        Ok(Self { transport, cache })
    }

    /// Build a client from `EXPLOREBD_*` environment variables
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().map_err(ListError::Config)?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// The shared query cache
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// A fresh controller for a list screen
    pub fn controller(&self, resource: &ResourceConfig) -> ListController {
        ListController::new(resource)
    }

    /// Fetch one page through the cache
    pub async fn fetch_page(&self, request: PageRequest) -> Result<Arc<PageResponse>> {
        self.cache.fetch(request).await
    }

    /// Swap the bearer token after sign-in or sign-out. Cached pages were
    /// fetched under the old identity and are dropped.
    pub fn set_bearer_token(&self, token: Option<String>) -> Result<()> {
        self.transport.set_bearer_token(token)?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Forget cached pages of a resource after a mutation
    pub fn invalidate(&self, resource: &str) {
        self.cache.invalidate(resource);
    }
}
