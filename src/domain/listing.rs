use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical listing shape. Every field a renderer reads has a defined
/// default; `normalize` is the single place raw backend payloads become this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub location: Location,
    pub price: f64,
    pub currency: String,
    pub room_type: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub landlord: Option<Landlord>,
    #[serde(default)]
    pub features: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub area: String,
    pub city: String,
    #[serde(default)]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landlord {
    pub name: String,
    pub verified: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub minimum_stay: Option<String>,
    #[serde(default)]
    pub deposit: Option<f64>,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            available: true,
            available_from: None,
            minimum_stay: None,
            deposit: None,
        }
    }
}

/// One page of search results as served to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<Listing>,
    pub total: u32,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Filter vocabulary advertised by the backend (`GET /search/filters`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterOptions {
    pub room_types: Vec<String>,
    pub amenities: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({} {}/month, {})",
            self.title, self.location, self.currency, self.price, self.room_type
        )?;
        if let Some(ref landlord) = self.landlord {
            write!(f, " | {}", landlord.name)?;
            if landlord.verified {
                write!(f, " (verified)")?;
            }
        }
        if self.featured {
            write!(f, " | Featured")?;
        }
        if !self.availability.available {
            write!(f, " | Unavailable")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.city.is_empty() {
            write!(f, "{}", self.area)
        } else {
            write!(f, "{}, {}", self.area, self.city)
        }
    }
}
