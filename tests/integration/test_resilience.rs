//! Resilience tests: malformed records are skipped without aborting the scan

#[cfg(test)]
mod tests {
    use crate::fixtures::{BUCKET, codes, ndjson, plain_record, status_record};
    use lograte::services::store::memory::MemoryObjectStore;
    use lograte::services::store::{ListPage, ObjectStore};
    use lograte::{ExtractorKind, ObjectRef, ScanOptions};
    use std::io::{self, Read};

    /// Store whose listing claims far more bytes than the object holds.
    struct InflatedListing {
        listed_size: u64,
    }

    impl ObjectStore for InflatedListing {
        fn list_page(&self, _: &str, _: &str, _: Option<&str>) -> io::Result<ListPage> {
            Ok(ListPage::new(
                vec![ObjectRef::new("logs/a.json", self.listed_size)],
                None,
            ))
        }

        fn get(&self, _: &str, _: &str) -> io::Result<Box<dyn Read + Send>> {
            Ok(Box::new(io::Cursor::new(codes(&[200]).into_bytes())))
        }
    }

    fn scan(store: &MemoryObjectStore, extractor: ExtractorKind) -> lograte::Summary {
        let opts = ScanOptions {
            extractor,
            ..Default::default()
        };
        lograte::scan_summary("s3://access-logs/logs", store, &opts).expect("scan should succeed")
    }

    #[test]
    fn test_malformed_line_does_not_change_rates() {
        let clean = [200, 200, 404, 503, 500];
        let mut with_garbage: Vec<String> = clean.iter().map(|c| status_record(*c)).collect();
        with_garbage.insert(2, r#"{"message": "HTTP Status Code: 500", "truncated"#.to_string());

        let mut clean_store = MemoryObjectStore::new();
        clean_store.put(BUCKET, "logs/a.json", codes(&clean));

        let mut dirty_store = MemoryObjectStore::new();
        dirty_store.put(BUCKET, "logs/a.json", ndjson(&with_garbage));

        for extractor in [ExtractorKind::Literal, ExtractorKind::Regex] {
            let clean_summary = scan(&clean_store, extractor);
            let dirty_summary = scan(&dirty_store, extractor);

            assert_eq!(clean_summary.rates, dirty_summary.rates);
            assert_eq!(clean_summary.totals.total, dirty_summary.totals.total);
            assert_eq!(dirty_summary.totals.malformed, 1);
            assert_eq!(clean_summary.totals.malformed, 0);
        }
    }

    #[test]
    fn test_assorted_garbage_is_skipped() {
        let content = ndjson([
            status_record(200),
            "not json at all".to_string(),
            "[\"HTTP Status Code: 500\"]".to_string(),
            "42".to_string(),
            r#"{"message": 503}"#.to_string(),
            r#"{"message": null}"#.to_string(),
            String::new(),
            "   ".to_string(),
            status_record(404),
        ]);

        let mut store = MemoryObjectStore::new();
        store.put(BUCKET, "logs/noisy.json", content);

        let summary = scan(&store, ExtractorKind::Literal);

        assert_eq!(summary.totals.total, 2);
        assert_eq!(summary.totals.count_2xx, 1);
        assert_eq!(summary.totals.count_4xx, 1);
        // Three non-object lines; the non-string and null messages are well-formed.
        assert_eq!(summary.totals.malformed, 3);
        assert_eq!(summary.totals.unclassified, 2);
    }

    #[test]
    fn test_invalid_utf8_line_is_malformed() {
        let mut content = codes(&[200]).into_bytes();
        content.extend_from_slice(b"{\"message\": \"HTTP Status Code: 500 \xff\xfe\"}\n");
        content.extend_from_slice(codes(&[500]).as_bytes());

        let mut store = MemoryObjectStore::new();
        store.put(BUCKET, "logs/bin.json", content);

        let summary = scan(&store, ExtractorKind::Regex);

        assert_eq!(summary.totals.total, 2);
        assert_eq!(summary.totals.malformed, 1);
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let content = format!(
            "{}\r\n{}\r\n{}",
            status_record(200),
            status_record(500),
            status_record(500)
        );
        let mut store = MemoryObjectStore::new();
        store.put(BUCKET, "logs/win.json", content);

        let summary = scan(&store, ExtractorKind::Literal);

        assert_eq!(summary.totals.total, 3);
        assert_eq!(summary.totals.malformed, 0);
        assert_eq!(summary.totals.count_5xx, 2);
    }

    #[test]
    fn test_empty_objects_and_all_garbage_yield_zero_rates() {
        let mut store = MemoryObjectStore::new();
        store.put(BUCKET, "logs/empty.json", Vec::new());
        store.put(BUCKET, "logs/garbage.json", ndjson(["{", "}", "nope"]));
        store.put(BUCKET, "logs/quiet.json", ndjson([plain_record("healthcheck ok")]));

        let summary = scan(&store, ExtractorKind::Literal);

        assert_eq!(summary.objects_scanned, 3);
        assert_eq!(summary.totals.total, 0);
        assert_eq!(summary.rates, lograte::RateResult::default());
    }

    #[test]
    fn test_empty_prefix_is_not_an_error() {
        let mut store = MemoryObjectStore::new();
        store.create_bucket(BUCKET);

        let summary = scan(&store, ExtractorKind::Literal);

        assert_eq!(summary.objects_scanned, 0);
        assert!(summary.checkpoints.is_empty());
        assert_eq!(summary.rates.rate_2xx, 0.0);
        assert_eq!(summary.rates.rate_4xx, 0.0);
        assert_eq!(summary.rates.rate_5xx, 0.0);
    }

    #[test]
    fn test_inflated_listed_size_is_tolerated() {
        let store = InflatedListing {
            listed_size: u64::MAX / 2,
        };

        let summary = lograte::scan_summary("s3://access-logs/logs", &store, &ScanOptions::default())
            .expect("scan should succeed");

        assert_eq!(summary.objects_scanned, 1);
        assert_eq!(summary.totals.count_2xx, 1);
        assert_eq!(summary.rates.rate_2xx, 1.0);
        // Progress follows the listing, not the fetched length.
        assert_eq!(summary.bytes_scanned, u64::MAX / 2);
    }
}
