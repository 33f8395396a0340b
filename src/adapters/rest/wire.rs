//! Raw response envelopes in the backend's dialect. Records inside them stay
//! untyped `serde_json::Value`s until they pass through the normalizer.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::listing::{FilterOptions, ResultPage};
use crate::domain::normalize::normalize;

/// `GET /hostels/` answer: `{ hostels, total, current_page, per_page, pages }`.
#[derive(Debug, Deserialize, Default)]
pub struct ListingsEnvelope {
    #[serde(default)]
    pub hostels: Vec<Value>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "default_page")]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub pages: u32,
}

fn default_page() -> u32 {
    1
}

impl ListingsEnvelope {
    /// Normalize every record and map the backend pagination fields onto a
    /// [`ResultPage`]. `fallback_page_size` covers envelopes that omit
    /// `per_page`.
    pub fn into_result_page(self, fallback_page_size: u32) -> ResultPage {
        let page_size = if self.per_page > 0 {
            self.per_page
        } else {
            fallback_page_size
        };
        ResultPage {
            items: self.hostels.iter().map(normalize).collect(),
            total: self.total,
            page: self.current_page.max(1),
            page_size,
            total_pages: self.pages,
        }
    }
}

/// `GET /search/filters` answer. Amenities arrive either as plain strings or
/// as serialized amenity rows with a `name` field.
#[derive(Debug, Deserialize, Default)]
pub struct FiltersEnvelope {
    #[serde(default)]
    pub room_types: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<Value>,
    #[serde(default)]
    pub price_ranges: PriceRanges,
}

#[derive(Debug, Deserialize, Default)]
pub struct PriceRanges {
    #[serde(default)]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

fn default_max_price() -> f64 {
    50_000.0
}

impl From<FiltersEnvelope> for FilterOptions {
    fn from(envelope: FiltersEnvelope) -> Self {
        let amenities = envelope
            .amenities
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(String::from),
                _ => None,
            })
            .collect();
        Self {
            room_types: envelope.room_types,
            amenities,
            min_price: envelope.price_ranges.min_price,
            max_price: envelope.price_ranges.max_price,
        }
    }
}

/// `GET /search/suggestions` answer. Entries are strings or `{ text, type }`
/// rows.
#[derive(Debug, Deserialize, Default)]
pub struct SuggestionsEnvelope {
    #[serde(default)]
    pub suggestions: Vec<Value>,
}

impl SuggestionsEnvelope {
    pub fn into_texts(self) -> Vec<String> {
        self.suggestions
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map
                    .get("text")
                    .and_then(Value::as_str)
                    .map(String::from),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_maps_pagination_fields() {
        let envelope: ListingsEnvelope = serde_json::from_value(json!({
            "hostels": [{"id": "1", "name": "A"}, {"id": "2", "name": "B"}],
            "total": 15,
            "current_page": 2,
            "per_page": 12,
            "pages": 2
        }))
        .unwrap();
        let page = envelope.into_result_page(12);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 15);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn envelope_missing_fields_default() {
        let envelope: ListingsEnvelope = serde_json::from_value(json!({})).unwrap();
        let page = envelope.into_result_page(12);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 12);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn envelope_records_are_normalized() {
        let envelope: ListingsEnvelope = serde_json::from_value(json!({
            "hostels": [{"id": "1", "name": "Sunrise", "location": "Juja, Kiambu"}],
            "total": 1,
            "pages": 1
        }))
        .unwrap();
        let page = envelope.into_result_page(12);
        assert_eq!(page.items[0].title, "Sunrise");
        assert_eq!(page.items[0].location.area, "Juja");
        assert_eq!(page.items[0].location.city, "Kiambu");
    }

    #[test]
    fn filters_envelope_extracts_amenity_names() {
        let envelope: FiltersEnvelope = serde_json::from_value(json!({
            "room_types": ["Single", "Bedsitter"],
            "amenities": [{"name": "wifi", "id": 1}, "water", 42],
            "price_ranges": {"min_price": 2000, "max_price": 30000, "avg_price": 9000}
        }))
        .unwrap();
        let options = FilterOptions::from(envelope);
        assert_eq!(options.room_types, vec!["Single", "Bedsitter"]);
        assert_eq!(options.amenities, vec!["wifi", "water"]);
        assert_eq!(options.min_price, 2000.0);
        assert_eq!(options.max_price, 30000.0);
    }

    #[test]
    fn suggestions_envelope_accepts_both_shapes() {
        let envelope: SuggestionsEnvelope = serde_json::from_value(json!({
            "suggestions": [{"text": "Juja", "type": "location"}, "Thika", null]
        }))
        .unwrap();
        assert_eq!(envelope.into_texts(), vec!["Juja", "Thika"]);
    }
}
