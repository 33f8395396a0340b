use async_trait::async_trait;

use crate::domain::listing::{FilterOptions, Listing, ResultPage};
use crate::domain::query::SearchQuery;
use crate::error::Result;

/// Remote listing gateway. Implementations talk to the hostel backend and
/// hand back normalized domain shapes; callers decide retry and surface
/// policy for every typed failure.
#[async_trait]
pub trait ListingGateway: Send + Sync {
    async fn list_listings(&self, query: &SearchQuery) -> Result<ResultPage>;
    async fn get_listing(&self, id: &str) -> Result<Listing>;
    async fn list_featured(&self, limit: u32) -> Result<Vec<Listing>>;
    async fn filter_options(&self) -> Result<FilterOptions>;
    async fn search_suggestions(&self, term: &str) -> Result<Vec<String>>;
}
