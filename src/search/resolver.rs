use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::types::CacheConfig;
use crate::domain::listing::ResultPage;
use crate::domain::query::SearchQuery;
use crate::error::HostelError;
use crate::ports::gateway::ListingGateway;

/// What the view layer gets back for a query: possibly cached data, whether
/// a fetch is still running behind it, and the last error if one occurred.
/// On failure `data` keeps the previously cached page so the UI can show
/// "stale data + retry" instead of blanking.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub data: Option<ResultPage>,
    pub is_loading: bool,
    pub error: Option<Arc<HostelError>>,
}

type FetchSlot = Option<Result<ResultPage, Arc<HostelError>>>;

struct CachedPage {
    page: ResultPage,
    fetched_at: Instant,
}

#[derive(Default)]
struct Visible {
    data: Option<ResultPage>,
    error: Option<Arc<HostelError>>,
}

/// Cache and fetch orchestrator in front of a [`ListingGateway`].
///
/// Results are cached per [`SearchQuery::cache_key`] in an LRU map. At most
/// one request is in flight per key: concurrent resolvers for the same key
/// attach to the pending fetch instead of issuing their own. A response only
/// reaches the *visible* slot if its key still matches the latest requested
/// one, so an abandoned fetch can never overwrite a newer result.
///
/// Cheaply cloneable; clones share the cache and visible state.
#[derive(Clone)]
pub struct ResultResolver {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn ListingGateway>,
    stale_after: Duration,
    cache: Mutex<LruCache<String, CachedPage>>,
    in_flight: Mutex<HashMap<String, watch::Receiver<FetchSlot>>>,
    latest_key: Mutex<Option<String>>,
    visible: Mutex<Visible>,
}

/// Releases an `in_flight` slot when the leading fetch ends, including when
/// the leader's future is dropped mid-fetch. Without this, a cancelled
/// leader would leave a dead receiver behind and wedge the key for every
/// later resolve.
struct InFlightSlot<'a> {
    inner: &'a Inner,
    key: &'a str,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.inner.in_flight.lock().unwrap().remove(self.key);
    }
}

impl ResultResolver {
    pub fn new(gateway: Arc<dyn ListingGateway>, config: &CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_entries).unwrap_or_else(|| {
            warn!("Cache max_entries was 0, defaulting to 100");
            NonZeroUsize::new(100).unwrap()
        });
        Self {
            inner: Arc::new(Inner {
                gateway,
                stale_after: Duration::from_secs(config.stale_after_secs),
                cache: Mutex::new(LruCache::new(cap)),
                in_flight: Mutex::new(HashMap::new()),
                latest_key: Mutex::new(None),
                visible: Mutex::new(Visible::default()),
            }),
        }
    }

    /// Resolve a query to a page of results. Serves a fresh cache hit
    /// without touching the network; serves a stale hit immediately while a
    /// background refresh runs; awaits the fetch on a miss.
    pub async fn resolve(&self, query: &SearchQuery) -> Resolution {
        if let Err(e) = query.validate() {
            return Resolution {
                data: None,
                is_loading: false,
                error: Some(Arc::new(e)),
            };
        }

        let inner = &self.inner;
        let key = query.cache_key();
        *inner.latest_key.lock().unwrap() = Some(key.clone());

        let cached = {
            let mut cache = inner.cache.lock().unwrap();
            cache.get(&key).map(|entry| {
                (
                    entry.page.clone(),
                    entry.fetched_at.elapsed() < inner.stale_after,
                )
            })
        };

        if let Some((page, fresh)) = cached {
            inner.commit_visible(&key, Ok(page.clone()));
            if fresh {
                debug!(key, "Cache hit");
                return Resolution {
                    data: Some(page),
                    is_loading: false,
                    error: None,
                };
            }

            debug!(key, "Serving stale cache entry, refreshing in background");
            let inner = Arc::clone(inner);
            let query = query.clone();
            let bg_key = key.clone();
            tokio::spawn(async move {
                let _ = inner.fetch_coalesced(&query, &bg_key).await;
            });
            return Resolution {
                data: Some(page),
                is_loading: true,
                error: None,
            };
        }

        match inner.fetch_coalesced(query, &key).await {
            Ok(page) => Resolution {
                data: Some(page),
                is_loading: false,
                error: None,
            },
            Err(e) => {
                // keep whatever was cached for this key visible
                let stale = inner
                    .cache
                    .lock()
                    .unwrap()
                    .peek(&key)
                    .map(|entry| entry.page.clone());
                Resolution {
                    data: stale,
                    is_loading: false,
                    error: Some(e),
                }
            }
        }
    }

    /// The consumer-facing state for the most recently requested key.
    pub fn visible(&self) -> Resolution {
        let inner = &self.inner;
        let latest = inner.latest_key.lock().unwrap().clone();
        let is_loading = match latest {
            Some(ref key) => inner.in_flight.lock().unwrap().contains_key(key),
            None => false,
        };
        let visible = inner.visible.lock().unwrap();
        Resolution {
            data: visible.data.clone(),
            is_loading,
            error: visible.error.clone(),
        }
    }
}

impl Inner {
    /// Run the gateway fetch for `key`, or attach to one already in flight.
    async fn fetch_coalesced(
        &self,
        query: &SearchQuery,
        key: &str,
    ) -> Result<ResultPage, Arc<HostelError>> {
        loop {
            enum Role {
                Leader(watch::Sender<FetchSlot>),
                Follower(watch::Receiver<FetchSlot>),
            }

            let role = {
                let mut in_flight = self.in_flight.lock().unwrap();
                if let Some(rx) = in_flight.get(key) {
                    Role::Follower(rx.clone())
                } else {
                    let (tx, rx) = watch::channel(None);
                    in_flight.insert(key.to_string(), rx);
                    Role::Leader(tx)
                }
            };

            match role {
                Role::Leader(tx) => {
                    // Declared after tx so it drops first, clearing the slot
                    // before followers observe the closed channel.
                    let _slot = InFlightSlot { inner: self, key };
                    debug!(key, "Fetching listings");
                    let result = self.gateway.list_listings(query).await.map_err(Arc::new);

                    if let Ok(ref page) = result {
                        self.cache.lock().unwrap().put(
                            key.to_string(),
                            CachedPage {
                                page: page.clone(),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                    self.commit_visible(key, result.clone());
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
                Role::Follower(mut rx) => {
                    debug!(key, "Joining in-flight fetch");
                    loop {
                        if let Some(result) = rx.borrow_and_update().clone() {
                            return result;
                        }
                        if rx.changed().await.is_err() {
                            // Leader vanished without publishing; take over.
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Response-time guard: only the latest requested key may update the
    /// visible slot. Errors keep previous data on screen.
    fn commit_visible(&self, key: &str, result: Result<ResultPage, Arc<HostelError>>) {
        {
            let latest = self.latest_key.lock().unwrap();
            if latest.as_deref() != Some(key) {
                debug!(key, "Discarding response for superseded query");
                return;
            }
        }
        let mut visible = self.visible.lock().unwrap();
        match result {
            Ok(page) => {
                visible.data = Some(page);
                visible.error = None;
            }
            Err(e) => visible.error = Some(e),
        }
    }
}
