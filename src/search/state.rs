use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::query::{Filters, SearchQuery, SortBy};
use crate::search::debounce::{DebounceHandle, Debouncer};

/// Owner of the user's in-progress search. Free-text input is committed
/// through a debouncer; discrete controls (filters, sort, pagination) commit
/// immediately. The committed [`SearchQuery`] is published on a watch
/// channel for consumers to fetch against, and serializes to/from the
/// browser URL so results stay shareable.
pub struct SearchState {
    committed: watch::Sender<SearchQuery>,
    raw_term: Mutex<String>,
    debouncer: Debouncer,
    pending: Mutex<Option<DebounceHandle>>,
}

impl SearchState {
    pub fn new(initial: SearchQuery, debounce_delay: Duration) -> Self {
        let raw_term = initial.location_term.clone();
        let (committed, _) = watch::channel(initial);
        Self {
            committed,
            raw_term: Mutex::new(raw_term),
            debouncer: Debouncer::new(debounce_delay),
            pending: Mutex::new(None),
        }
    }

    /// The URL is the source of truth on page load and navigation.
    pub fn from_url_query(query: &str, debounce_delay: Duration) -> Self {
        Self::new(SearchQuery::from_url_query(query), debounce_delay)
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchQuery> {
        self.committed.subscribe()
    }

    /// The committed query consumers should currently fetch against.
    pub fn query(&self) -> SearchQuery {
        self.committed.borrow().clone()
    }

    /// What the user has typed so far, committed or not.
    pub fn raw_term(&self) -> String {
        self.raw_term.lock().unwrap().clone()
    }

    /// True while typed input has not yet been committed.
    pub fn is_searching(&self) -> bool {
        *self.raw_term.lock().unwrap() != self.committed.borrow().location_term
    }

    /// Record a keystroke. Restarts the debounce clock; the term commits
    /// (resetting to page 1) only once input has been stable for the full
    /// delay. An empty string is a valid term meaning "no location filter".
    pub fn input(&self, text: &str) {
        *self.raw_term.lock().unwrap() = text.to_string();

        let committed = self.committed.clone();
        let term = text.to_string();
        let handle = self.debouncer.submit(move || {
            committed.send_if_modified(|query| {
                if query.location_term == term {
                    return false;
                }
                *query = query.clone().with_term(term.clone());
                true
            });
        });
        *self.pending.lock().unwrap() = Some(handle);
    }

    /// Replace the filter set. Commits immediately and resets to page 1.
    pub fn set_filters(&self, filters: Filters) {
        self.committed.send_if_modified(|query| {
            if query.filters == filters {
                return false;
            }
            *query = query.clone().with_filters(filters.clone());
            true
        });
    }

    /// Change the sort order. Commits immediately and resets to page 1.
    pub fn set_sort(&self, sort_by: SortBy) {
        self.committed.send_if_modified(|query| {
            if query.sort_by == sort_by {
                return false;
            }
            *query = query.clone().with_sort(sort_by);
            true
        });
    }

    /// Navigate to a page. Commits immediately; no reset.
    pub fn set_page(&self, page: u32) {
        self.committed.send_if_modified(|query| {
            if query.page == page {
                return false;
            }
            *query = query.clone().with_page(page);
            true
        });
    }

    /// Drop the term and all filters, keeping the configured page size.
    /// Cancels any pending debounced commit.
    pub fn clear(&self) {
        if let Some(handle) = self.pending.lock().unwrap().take() {
            handle.cancel();
        }
        self.raw_term.lock().unwrap().clear();
        self.committed.send_if_modified(|query| {
            let cleared = SearchQuery {
                page_size: query.page_size,
                ..SearchQuery::default()
            };
            if *query == cleared {
                return false;
            }
            *query = cleared;
            true
        });
    }

    /// Serialized form of the committed query for the address bar.
    pub fn url_query(&self) -> String {
        self.committed.borrow().to_url_query()
    }
}
