use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::listing::{
    Availability, FilterOptions, Listing, Location, ResultPage,
};
use crate::domain::query::SearchQuery;
use crate::error::Result;
use crate::ports::gateway::ListingGateway;

type ListingsFn = Box<dyn Fn(&SearchQuery) -> Result<ResultPage> + Send + Sync>;
type GetFn = Box<dyn Fn(&str) -> Result<Listing> + Send + Sync>;
type FeaturedFn = Box<dyn Fn(u32) -> Result<Vec<Listing>> + Send + Sync>;
type FiltersFn = Box<dyn Fn() -> Result<FilterOptions> + Send + Sync>;
type SuggestFn = Box<dyn Fn(&str) -> Result<Vec<String>> + Send + Sync>;

pub struct MockGateway {
    listings_fn: Mutex<ListingsFn>,
    get_fn: Mutex<GetFn>,
    featured_fn: Mutex<FeaturedFn>,
    filters_fn: Mutex<FiltersFn>,
    suggest_fn: Mutex<SuggestFn>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            listings_fn: Mutex::new(Box::new(|_| Ok(make_result_page(0)))),
            get_fn: Mutex::new(Box::new(|id| Ok(make_listing(id, "Test Hostel", 8000.0)))),
            featured_fn: Mutex::new(Box::new(|_| Ok(vec![]))),
            filters_fn: Mutex::new(Box::new(|| Ok(make_filter_options()))),
            suggest_fn: Mutex::new(Box::new(|_| Ok(vec![]))),
        }
    }

    #[must_use]
    pub fn with_listings(
        self,
        f: impl Fn(&SearchQuery) -> Result<ResultPage> + Send + Sync + 'static,
    ) -> Self {
        *self.listings_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_listing(self, f: impl Fn(&str) -> Result<Listing> + Send + Sync + 'static) -> Self {
        *self.get_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_featured(
        self,
        f: impl Fn(u32) -> Result<Vec<Listing>> + Send + Sync + 'static,
    ) -> Self {
        *self.featured_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_filter_options(
        self,
        f: impl Fn() -> Result<FilterOptions> + Send + Sync + 'static,
    ) -> Self {
        *self.filters_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_suggestions(
        self,
        f: impl Fn(&str) -> Result<Vec<String>> + Send + Sync + 'static,
    ) -> Self {
        *self.suggest_fn.lock().unwrap() = Box::new(f);
        self
    }
}

#[async_trait]
impl ListingGateway for MockGateway {
    async fn list_listings(&self, query: &SearchQuery) -> Result<ResultPage> {
        let f = self.listings_fn.lock().unwrap();
        f(query)
    }

    async fn get_listing(&self, id: &str) -> Result<Listing> {
        let f = self.get_fn.lock().unwrap();
        f(id)
    }

    async fn list_featured(&self, limit: u32) -> Result<Vec<Listing>> {
        let f = self.featured_fn.lock().unwrap();
        f(limit)
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        let f = self.filters_fn.lock().unwrap();
        f()
    }

    async fn search_suggestions(&self, term: &str) -> Result<Vec<String>> {
        let f = self.suggest_fn.lock().unwrap();
        f(term)
    }
}

// --- Factory functions ---

pub fn make_listing(id: &str, title: &str, price: f64) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        location: Location {
            area: "Juja".to_string(),
            city: "Nairobi".to_string(),
            distance: None,
        },
        price,
        currency: "KES".to_string(),
        room_type: "Single Room".to_string(),
        images: vec![format!("https://img.example.com/{id}.jpg")],
        amenities: vec!["wifi".to_string(), "water".to_string()],
        landlord: None,
        features: std::collections::BTreeMap::new(),
        availability: Availability::default(),
        featured: false,
        verified: false,
    }
}

pub fn make_result_page(count: u32) -> ResultPage {
    let items = (0..count)
        .map(|i| make_listing(&format!("h{i}"), &format!("Hostel {i}"), 5000.0 + f64::from(i) * 500.0))
        .collect();
    ResultPage {
        items,
        total: count,
        page: 1,
        page_size: crate::domain::query::DEFAULT_PAGE_SIZE,
        total_pages: u32::from(count > 0),
    }
}

pub fn make_filter_options() -> FilterOptions {
    FilterOptions {
        room_types: vec!["Single Room".to_string(), "Bedsitter".to_string()],
        amenities: vec!["wifi".to_string(), "water".to_string(), "parking".to_string()],
        min_price: 0.0,
        max_price: 50_000.0,
    }
}

/// Raw backend record the way the listings endpoint actually disgorges it,
/// for exercising `normalize` and the wire envelopes.
pub fn raw_listing(id: &str, name: &str, price: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "price": price,
        "location": "Juja, Nairobi",
        "room_type": "Single Room",
        "images": [format!("https://img.example.com/{id}.jpg")],
        "amenities": {"wifi": true, "hot_water": "yes", "parking": false},
        "landlord": {"name": "Test Landlord", "is_verified": true},
        "available": true,
    })
}
