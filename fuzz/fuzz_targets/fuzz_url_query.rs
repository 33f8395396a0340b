#![no_main]
use libfuzzer_sys::fuzz_target;

use hostel_search::domain::query::SearchQuery;

fuzz_target!(|data: &[u8]| {
    if let Ok(query_string) = std::str::from_utf8(data) {
        let query = SearchQuery::from_url_query(query_string);
        // whatever survives parsing must serialize and parse back stably
        let url = query.to_url_query();
        let back = SearchQuery::from_url_query(&url);
        assert_eq!(back.to_url_query(), url);
    }
});
