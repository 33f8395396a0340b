use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::listing::{Availability, Landlord, Listing, Location};

/// Stock photos used when a listing carries no usable image of its own.
const FALLBACK_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1555854877-bab0e564b8d5?w=600&q=80",
    "https://images.unsplash.com/photo-1595526114035-0d45ed16cfbf?w=600&q=80",
    "https://images.unsplash.com/photo-1522771753033-6a586611bf9e?w=600&q=80",
    "https://images.unsplash.com/photo-1598928506311-c55ded91a20c?w=600&q=80",
    "https://images.unsplash.com/photo-1595524366196-b96a325832ae?w=600&q=80",
];

/// Reshape a raw backend listing record into the canonical [`Listing`].
///
/// The backend is loose about field names and shapes (`name` vs `title`,
/// string vs structured location, array vs flag-map amenities). This is the
/// single place those variations are absorbed; it never fails, every missing
/// field gets its documented default. Pure function, and idempotent: feeding
/// a normalized listing back in reproduces it exactly.
pub fn normalize(raw: &Value) -> Listing {
    let id = match raw.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let title = string_field(raw, &["name", "title"]).unwrap_or_else(|| "Hostel".to_string());

    let location = normalize_location(raw.get("location"));
    let price = raw
        .get("price")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .max(0.0);
    let currency =
        string_field(raw, &["currency"]).unwrap_or_else(|| "KES".to_string());
    let room_type =
        string_field(raw, &["room_type", "roomType"]).unwrap_or_else(|| "Room".to_string());

    let images = normalize_images(raw.get("images"), &id);
    let amenities = normalize_amenities(raw.get("amenities"));
    let landlord = raw.get("landlord").and_then(normalize_landlord);

    let features = match raw.get("features") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => BTreeMap::new(),
    };

    let availability = normalize_availability(raw.get("availability"));
    let featured = flag_field(raw, &["is_featured", "featured"]);
    let verified = flag_field(raw, &["is_verified", "verified"]);

    Listing {
        id,
        title,
        location,
        price,
        currency,
        room_type,
        images,
        amenities,
        landlord,
        features,
        availability,
        featured,
        verified,
    }
}

/// A string location splits on the first comma into area / city; a structured
/// one passes through. No comma means the whole string is the area.
fn normalize_location(raw: Option<&Value>) -> Location {
    match raw {
        Some(Value::String(s)) => match s.split_once(',') {
            Some((area, city)) => Location {
                area: area.trim().to_string(),
                city: city.trim().to_string(),
                distance: None,
            },
            None => Location {
                area: s.trim().to_string(),
                city: String::new(),
                distance: None,
            },
        },
        Some(Value::Object(map)) => Location {
            area: map
                .get("area")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            city: map
                .get("city")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            distance: map
                .get("distance")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from),
        },
        _ => Location::default(),
    }
}

/// Keep only entries that look like resolvable URLs: non-empty strings of
/// more than five characters starting with `http` or `/`. This drops
/// ephemeral local-preview references (`blob:` URLs). When nothing survives,
/// a fallback image is chosen from the id so the same input always yields
/// the same picture.
fn normalize_images(raw: Option<&Value>, id: &str) -> Vec<String> {
    let candidates: Vec<&str> = match raw {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    };

    let valid: Vec<String> = candidates
        .into_iter()
        .filter(|img| img.len() > 5 && (img.starts_with("http") || img.starts_with('/')))
        .map(String::from)
        .collect();

    if valid.is_empty() {
        vec![FALLBACK_IMAGES[fallback_index(id)].to_string()]
    } else {
        valid
    }
}

fn fallback_index(id: &str) -> usize {
    let digest = id.parse::<u64>().unwrap_or_else(|_| {
        id.bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
    });
    (digest % FALLBACK_IMAGES.len() as u64) as usize
}

/// Arrays pass through; a map of flags keeps the truthy keys with
/// underscores turned into spaces; anything else is empty.
fn normalize_amenities(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, value)| is_truthy(value))
            .map(|(key, _)| key.replace('_', " "))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn normalize_landlord(raw: &Value) -> Option<Landlord> {
    let map = raw.as_object()?;
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .or_else(|| map.get("business_name").and_then(Value::as_str))
        .unwrap_or("Landlord")
        .to_string();
    let verified = map
        .get("is_verified")
        .or_else(|| map.get("verified"))
        .is_some_and(is_truthy);
    Some(Landlord {
        name,
        verified,
        rating: map.get("rating").and_then(Value::as_f64),
        review_count: map
            .get("review_count")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
    })
}

fn normalize_availability(raw: Option<&Value>) -> Availability {
    let Some(Value::Object(map)) = raw else {
        return Availability::default();
    };
    Availability {
        available: map.get("available").map_or(true, is_truthy),
        available_from: map
            .get("available_from")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        minimum_stay: map
            .get("minimum_stay")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from),
        deposit: map.get("deposit").and_then(Value::as_f64),
    }
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn flag_field(raw: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find(|v| !v.is_null())
        .is_some_and(is_truthy)
}
