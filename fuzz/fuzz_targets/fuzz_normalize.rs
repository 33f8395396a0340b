#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) {
        let listing = hostel_search::domain::normalize::normalize(&raw);
        assert!(listing.price >= 0.0);
        assert!(!listing.images.is_empty());
    }
});
