use std::sync::Arc;

use hostel_search::adapters::rest::client::HostelApi;
use hostel_search::config::types::ApiConfig;
use hostel_search::domain::query::{SearchQuery, SortBy};
use hostel_search::error::HostelError;
use hostel_search::ports::auth::{NoAuth, StaticToken};
use hostel_search::ports::gateway::ListingGateway;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_api(base_url: &str) -> HostelApi {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..Default::default()
    };
    HostelApi::new(&config, Arc::new(NoAuth)).unwrap()
}

fn listings_body() -> serde_json::Value {
    json!({
        "hostels": [
            {
                "id": 1,
                "name": "Sunrise Hostel",
                "price": 7500,
                "location": "Juja, Nairobi",
                "room_type": "Single Room",
                "images": ["https://img.example.com/1.jpg"],
                "amenities": {"wifi": true, "hot_water": "yes", "parking": false},
                "landlord": {"name": "Wanjiku Properties", "is_verified": true}
            },
            {
                "id": 2,
                "name": "Campus View",
                "price": 9000,
                "location": "Thika Road, Nairobi",
                "room_type": "Bedsitter",
                "images": [],
                "amenities": ["wifi", "water"]
            }
        ],
        "total": 2,
        "current_page": 1,
        "per_page": 12,
        "pages": 1
    })
}

#[tokio::test]
async fn list_listings_sends_backend_dialect_params() {
    let mock_server = MockServer::start().await;

    let mut query = SearchQuery::default().with_term("Juja");
    query.filters.min_price = Some(5000);
    query.filters.max_price = Some(10000);
    query.sort_by = SortBy::Relevance;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .and(query_param("location", "Juja"))
        .and(query_param("min_price", "5000"))
        .and(query_param("max_price", "10000"))
        .and(query_param("sort_by", "newest"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let page = api.list_listings(&query).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn list_listings_normalizes_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_body()))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let page = api.list_listings(&SearchQuery::default()).await.unwrap();

    let first = &page.items[0];
    assert_eq!(first.id, "1");
    assert_eq!(first.title, "Sunrise Hostel");
    assert_eq!(first.location.area, "Juja");
    assert_eq!(first.location.city, "Nairobi");
    assert_eq!(first.currency, "KES");
    // truthy map keys survive, falsy ones are dropped
    assert!(first.amenities.contains(&"wifi".to_string()));
    assert!(first.amenities.contains(&"hot water".to_string()));
    assert!(!first.amenities.contains(&"parking".to_string()));
    let landlord = first.landlord.as_ref().unwrap();
    assert_eq!(landlord.name, "Wanjiku Properties");
    assert!(landlord.verified);

    // empty image list gets a deterministic fallback
    let second = &page.items[1];
    assert!(!second.images.is_empty());
    assert!(second.images[0].starts_with("https://images.unsplash.com/"));
}

#[tokio::test]
async fn bearer_token_is_attached_when_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        base_url: mock_server.uri(),
        request_timeout_secs: 5,
        ..Default::default()
    };
    let api = HostelApi::new(&config, Arc::new(StaticToken("secret-token".into()))).unwrap();
    api.list_listings(&SearchQuery::default()).await.unwrap();
}

struct NoAuthorizationHeader;

impl wiremock::Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn anonymous_requests_carry_no_auth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .and(NoAuthorizationHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    api.list_listings(&SearchQuery::default()).await.unwrap();
}

#[tokio::test]
async fn get_listing_normalizes_a_single_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "Hilltop Rooms",
            "price": 6500,
            "location": "Gate C, Juja",
            "amenities": {"wifi": true},
            "is_featured": true
        })))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let listing = api.get_listing("42").await.unwrap();
    assert_eq!(listing.id, "42");
    assert_eq!(listing.title, "Hilltop Rooms");
    assert_eq!(listing.location.area, "Gate C");
    assert!(listing.featured);
}

#[tokio::test]
async fn get_listing_maps_404_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/h99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Hostel not found"})))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let err = api.get_listing("h99").await.unwrap_err();
    assert!(matches!(err, HostelError::ListingNotFound { ref id } if id == "h99"));
}

#[tokio::test]
async fn remote_error_carries_backend_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database exploded"})),
        )
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let err = api.list_listings(&SearchQuery::default()).await.unwrap_err();
    match err {
        HostelError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("database exploded"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_error_tolerates_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let err = api.list_listings(&SearchQuery::default()).await.unwrap_err();
    assert!(matches!(err, HostelError::Remote { status: 502, message: None }));
}

#[tokio::test]
async fn list_featured_requests_featured_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostels/"))
        .and(query_param("featured_only", "true"))
        .and(query_param("per_page", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let featured = api.list_featured(6).await.unwrap();
    assert_eq!(featured.len(), 2);
}

#[tokio::test]
async fn filter_options_parses_vocabulary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "room_types": ["Single Room", "Bedsitter"],
            "amenities": [{"name": "wifi"}, "water"],
            "price_ranges": {"min_price": 2000, "max_price": 30000}
        })))
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let options = api.filter_options().await.unwrap();
    assert_eq!(options.room_types, vec!["Single Room", "Bedsitter"]);
    assert_eq!(options.amenities, vec!["wifi", "water"]);
    assert_eq!(options.min_price, 2000.0);
    assert_eq!(options.max_price, 30000.0);
}

#[tokio::test]
async fn suggestions_below_two_chars_never_hit_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"suggestions": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    assert!(api.search_suggestions("j").await.unwrap().is_empty());
    assert!(api.search_suggestions("  j  ").await.unwrap().is_empty());
    assert!(api.search_suggestions("").await.unwrap().is_empty());
}

#[tokio::test]
async fn suggestions_query_the_backend_from_two_chars() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/suggestions"))
        .and(query_param("q", "ju"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": ["Juja", {"text": "Juja Farm"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = test_api(&mock_server.uri());
    let suggestions = api.search_suggestions("ju").await.unwrap();
    assert_eq!(suggestions, vec!["Juja", "Juja Farm"]);
}
