use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::adapters::rest::wire::{FiltersEnvelope, ListingsEnvelope, SuggestionsEnvelope};
use crate::config::types::ApiConfig;
use crate::domain::listing::{FilterOptions, Listing, ResultPage};
use crate::domain::normalize::normalize;
use crate::domain::query::SearchQuery;
use crate::error::{HostelError, Result};
use crate::ports::auth::AuthPort;
use crate::ports::gateway::ListingGateway;

/// Reqwest-backed implementation of [`ListingGateway`] against the hostel
/// backend REST API. Attaches a bearer credential when the auth port has
/// one; never retries on its own.
pub struct HostelApi {
    http: Client,
    base_url: String,
    auth: Arc<dyn AuthPort>,
}

impl HostelApi {
    pub fn new(
        config: &ApiConfig,
        auth: Arc<dyn AuthPort>,
    ) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn endpoint(&self, path: &str, pairs: &[(String, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))?;
        if !pairs.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (key, value) in pairs {
                qp.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET the URL and decode a JSON body. Network failures become
    /// `Transport`; a non-2xx answer becomes `Remote` carrying the backend's
    /// `message` field when the body holds one.
    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!(%url, "Fetching");

        let mut request = self.http.get(url);
        if let Some(token) = self.auth.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(HostelError::Transport);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from));
        Err(HostelError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ListingGateway for HostelApi {
    async fn list_listings(&self, query: &SearchQuery) -> Result<ResultPage> {
        query.validate()?;

        let url = self.endpoint("/hostels/", &query.to_query_pairs())?;
        let body = self.get_json(url).await?;
        let envelope: ListingsEnvelope = serde_json::from_value(body)?;
        Ok(envelope.into_result_page(query.page_size))
    }

    async fn get_listing(&self, id: &str) -> Result<Listing> {
        let url = self.endpoint(&format!("/hostels/{id}"), &[])?;
        match self.get_json(url).await {
            Ok(body) => Ok(normalize(&body)),
            Err(HostelError::Remote { status: 404, .. }) => {
                Err(HostelError::ListingNotFound { id: id.to_string() })
            }
            Err(e) => Err(e),
        }
    }

    async fn list_featured(&self, limit: u32) -> Result<Vec<Listing>> {
        let pairs = vec![
            ("featured_only".to_string(), "true".to_string()),
            ("per_page".to_string(), limit.to_string()),
        ];
        let url = self.endpoint("/hostels/", &pairs)?;
        let body = self.get_json(url).await?;
        let envelope: ListingsEnvelope = serde_json::from_value(body)?;
        Ok(envelope.hostels.iter().map(normalize).collect())
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        let url = self.endpoint("/search/filters", &[])?;
        let body = self.get_json(url).await?;
        let envelope: FiltersEnvelope = serde_json::from_value(body)?;
        Ok(envelope.into())
    }

    async fn search_suggestions(&self, term: &str) -> Result<Vec<String>> {
        // The backend only suggests from two characters on; skip the round
        // trip entirely below that.
        let term = term.trim();
        if term.chars().count() < 2 {
            return Ok(Vec::new());
        }
        let pairs = vec![("q".to_string(), term.to_string())];
        let url = self.endpoint("/search/suggestions", &pairs)?;
        let body = self.get_json(url).await?;
        let envelope: SuggestionsEnvelope = serde_json::from_value(body)?;
        Ok(envelope.into_texts())
    }
}
