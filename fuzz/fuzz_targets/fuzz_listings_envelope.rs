#![no_main]
use libfuzzer_sys::fuzz_target;

use hostel_search::adapters::rest::wire::ListingsEnvelope;

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = serde_json::from_slice::<ListingsEnvelope>(data) {
        let page = envelope.into_result_page(12);
        assert!(page.page >= 1);
        assert!(page.page_size >= 1);
    }
});
