use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use hostel_search::adapters::rest::client::HostelApi;
use hostel_search::config::load_config;
use hostel_search::config::types::SearchConfig;
use hostel_search::domain::query::SearchQuery;
use hostel_search::ports::auth::NoAuth;
use hostel_search::ports::gateway::ListingGateway;
use hostel_search::search::resolver::ResultResolver;
use hostel_search::search::state::SearchState;

/// Picks a config.yaml from the working directory first, then from next to
/// the binary. Falls back to the working-directory path so the loader can
/// report it by name.
fn find_config_path() -> PathBuf {
    let local = PathBuf::from("config.yaml");
    if local.exists() {
        return local;
    }
    let beside_binary = exe_dir().join("config.yaml");
    if beside_binary.exists() {
        return beside_binary;
    }
    local
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn initial_query(config: &SearchConfig, mut args: std::env::Args) -> Result<SearchQuery> {
    args.next(); // program name
    let mut query = SearchQuery {
        page_size: config.default_page_size,
        ..SearchQuery::default()
    };
    if let Some(min) = args.nth(1) {
        query.filters.min_price = Some(min.parse()?);
    }
    if let Some(max) = args.next() {
        query.filters.max_price = Some(max.parse()?);
    }
    Ok(query)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr so listing output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let api = Arc::new(HostelApi::new(&config.api, Arc::new(NoAuth))?);
    let resolver = ResultResolver::new(api as Arc<dyn ListingGateway>, &config.cache);

    // Usage: hostel-search [location] [min_price] [max_price]
    let term = std::env::args().nth(1).unwrap_or_default();
    let initial = initial_query(&config.search, std::env::args())?;

    // Feed the term through the same debounced state the UI uses
    let state = SearchState::new(initial, Duration::from_millis(config.search.debounce_ms));
    let mut committed = state.subscribe();
    state.input(&term);
    if state.is_searching() {
        committed.changed().await?;
    }
    let query = committed.borrow_and_update().clone();

    tracing::info!(term = %query.location_term, page = query.page, "Searching hostels");

    let resolution = resolver.resolve(&query).await;
    if let Some(error) = resolution.error {
        anyhow::bail!("search failed: {error}");
    }

    if let Some(page) = resolution.data {
        println!(
            "{} hostels found (page {} of {})",
            page.total, page.page, page.total_pages
        );
        for listing in &page.items {
            println!("  {listing}");
        }
    } else {
        println!("no results");
    }

    Ok(())
}
