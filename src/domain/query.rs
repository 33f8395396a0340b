use serde::{Deserialize, Serialize};

use crate::error::{HostelError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// The full set of user-chosen search parameters. Mutations go through the
/// `with_*` constructors so the page-reset rule is applied in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub location_term: String,
    pub filters: Filters,
    pub sort_by: SortBy,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub room_types: Vec<String>,
    pub amenities: Vec<String>,
    pub university: Option<String>,
    pub furnished: Option<bool>,
    pub parking_only: bool,
    pub available_only: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            room_types: Vec::new(),
            amenities: Vec::new(),
            university: None,
            furnished: None,
            parking_only: false,
            available_only: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Rating,
    Featured,
}

impl SortBy {
    /// Token used in the browser URL (`sortBy=` key).
    pub fn as_url_token(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
            Self::Featured => "featured",
        }
    }

    fn from_url_token(token: &str) -> Option<Self> {
        match token {
            "relevance" => Some(Self::Relevance),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "rating" => Some(Self::Rating),
            "featured" => Some(Self::Featured),
            _ => None,
        }
    }

    /// Value sent to the backend's `sort_by` parameter. The backend has no
    /// relevance or featured ordering, both fall back to `newest`.
    pub fn as_backend_value(self) -> &'static str {
        match self {
            Self::Relevance | Self::Featured => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
        }
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            location_term: String::new(),
            filters: Filters::default(),
            sort_by: SortBy::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    pub fn validate(&self) -> Result<()> {
        if let Some(min) = self.filters.min_price
            && let Some(max) = self.filters.max_price
            && min > max
        {
            return Err(HostelError::InvalidQuery {
                reason: "min_price cannot be greater than max_price".into(),
            });
        }
        if self.page == 0 {
            return Err(HostelError::InvalidQuery {
                reason: "page must be at least 1".into(),
            });
        }
        if self.page_size == 0 {
            return Err(HostelError::InvalidQuery {
                reason: "page_size must be positive".into(),
            });
        }
        Ok(())
    }

    /// New query with a changed committed search term. Resets to page 1.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.location_term = term.into();
        self.page = 1;
        self
    }

    /// New query with replaced filters. Resets to page 1.
    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self.page = 1;
        self
    }

    /// New query with a changed sort order. Resets to page 1.
    #[must_use]
    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self.page = 1;
        self
    }

    /// New query on a different page. Does not reset anything else.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Query parameters in the backend's dialect (`GET /hostels/`).
    ///
    /// `university`, `parking_only` and `available_only` are client-side
    /// state only, they round-trip through the URL and the cache key but the
    /// backend has no parameter for them.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        let term = self.location_term.trim();
        if !term.is_empty() {
            pairs.push(("location".into(), term.to_string()));
        }
        if let Some(min) = self.filters.min_price {
            pairs.push(("min_price".into(), min.to_string()));
        }
        if let Some(max) = self.filters.max_price {
            pairs.push(("max_price".into(), max.to_string()));
        }
        for room_type in &self.filters.room_types {
            pairs.push(("room_type".into(), room_type.clone()));
        }
        for amenity in &self.filters.amenities {
            pairs.push(("amenities".into(), amenity.clone()));
        }
        if let Some(furnished) = self.filters.furnished {
            pairs.push(("furnished".into(), furnished.to_string()));
        }
        pairs.push(("sort_by".into(), self.sort_by.as_backend_value().into()));
        pairs.push(("page".into(), self.page.to_string()));
        pairs.push(("per_page".into(), self.page_size.to_string()));

        pairs
    }

    /// Deterministic cache key. Fixed field order; the term is trimmed and
    /// lowercased and list filters are sorted, so logically identical
    /// queries always map to the same key.
    pub fn cache_key(&self) -> String {
        let mut key = format!("loc={}", self.location_term.trim().to_lowercase());
        if let Some(min) = self.filters.min_price {
            key.push_str(&format!(":min={min}"));
        }
        if let Some(max) = self.filters.max_price {
            key.push_str(&format!(":max={max}"));
        }
        if !self.filters.room_types.is_empty() {
            let mut types = self.filters.room_types.clone();
            types.sort();
            key.push_str(&format!(":rt={}", types.join("+")));
        }
        if !self.filters.amenities.is_empty() {
            let mut amenities = self.filters.amenities.clone();
            amenities.sort();
            key.push_str(&format!(":am={}", amenities.join("+")));
        }
        if let Some(ref university) = self.filters.university {
            key.push_str(&format!(":uni={}", university.to_lowercase()));
        }
        if let Some(furnished) = self.filters.furnished {
            key.push_str(&format!(":furn={furnished}"));
        }
        if self.filters.parking_only {
            key.push_str(":park=true");
        }
        if !self.filters.available_only {
            key.push_str(":avail=false");
        }
        key.push_str(&format!(
            ":sort={}:p={}:ps={}",
            self.sort_by.as_url_token(),
            self.page,
            self.page_size
        ));
        key
    }

    /// Serialize into the browser URL query string. Fields at their default
    /// value are omitted so shared links stay short.
    pub fn to_url_query(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());

        if !self.location_term.is_empty() {
            ser.append_pair("location", &self.location_term);
        }
        if let Some(min) = self.filters.min_price {
            ser.append_pair("minPrice", &min.to_string());
        }
        if let Some(max) = self.filters.max_price {
            ser.append_pair("maxPrice", &max.to_string());
        }
        if !self.filters.room_types.is_empty() {
            ser.append_pair("roomType", &self.filters.room_types.join(","));
        }
        if !self.filters.amenities.is_empty() {
            ser.append_pair("amenities", &self.filters.amenities.join(","));
        }
        if let Some(ref university) = self.filters.university {
            ser.append_pair("university", university);
        }
        if let Some(furnished) = self.filters.furnished {
            ser.append_pair("furnished", &furnished.to_string());
        }
        if self.filters.parking_only {
            ser.append_pair("parking", "true");
        }
        if !self.filters.available_only {
            ser.append_pair("available", "false");
        }
        if self.sort_by != SortBy::Relevance {
            ser.append_pair("sortBy", self.sort_by.as_url_token());
        }
        if self.page != 1 {
            ser.append_pair("page", &self.page.to_string());
        }
        if self.page_size != DEFAULT_PAGE_SIZE {
            ser.append_pair("perPage", &self.page_size.to_string());
        }

        ser.finish()
    }

    /// Reconstruct a query from a browser URL query string. The URL is
    /// user-editable input: unknown keys and unparseable values are ignored
    /// and fall back to defaults.
    pub fn from_url_query(query: &str) -> Self {
        let mut out = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "location" => out.location_term = value.into_owned(),
                "minPrice" => out.filters.min_price = value.parse().ok(),
                "maxPrice" => out.filters.max_price = value.parse().ok(),
                "roomType" => {
                    out.filters.room_types = split_csv(&value);
                }
                "amenities" => {
                    out.filters.amenities = split_csv(&value);
                }
                "university" => {
                    if !value.is_empty() {
                        out.filters.university = Some(value.into_owned());
                    }
                }
                "furnished" => {
                    if let Some(flag) = parse_flag(&value) {
                        out.filters.furnished = Some(flag);
                    }
                }
                "parking" => {
                    if let Some(flag) = parse_flag(&value) {
                        out.filters.parking_only = flag;
                    }
                }
                "available" => {
                    if let Some(flag) = parse_flag(&value) {
                        out.filters.available_only = flag;
                    }
                }
                "sortBy" => {
                    if let Some(sort) = SortBy::from_url_token(&value) {
                        out.sort_by = sort;
                    }
                }
                "page" => {
                    if let Ok(page) = value.parse::<u32>()
                        && page >= 1
                    {
                        out.page = page;
                    }
                }
                "perPage" => {
                    if let Ok(size) = value.parse::<u32>()
                        && size > 0
                    {
                        out.page_size = size;
                    }
                }
                _ => {}
            }
        }

        out
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
