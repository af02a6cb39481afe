//! Directory-backed object store tests

use crate::fixtures::{assert_close, codes, write_object};
use lograte::services::store::ObjectStore;
use lograte::services::store::fs::FsObjectStore;
use lograte::{Error, ScanOptions};
use std::io::Read;
use tempfile::TempDir;

fn seeded_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_object(root, "web", "logs/2024/10/01.json", codes(&[200, 200, 404]).as_bytes()).unwrap();
    write_object(root, "web", "logs/2024/10/02.json", codes(&[503, 200]).as_bytes()).unwrap();
    write_object(root, "web", "logs/2024/11/01.json", codes(&[500]).as_bytes()).unwrap();
    write_object(root, "web", "logs-old/legacy.json", codes(&[404, 404]).as_bytes()).unwrap();
    write_object(root, "web", "README", b"not a log").unwrap();

    temp_dir
}

#[test]
fn test_listing_is_sorted_and_prefixed() {
    let temp_dir = seeded_root();
    let store = FsObjectStore::new(temp_dir.path());

    let page = store.list_page("web", "logs/", None).unwrap();
    let keys: Vec<&str> = page.objects.iter().map(|o| o.key.as_str()).collect();

    assert_eq!(
        keys,
        vec![
            "logs/2024/10/01.json",
            "logs/2024/10/02.json",
            "logs/2024/11/01.json"
        ]
    );
    assert!(page.next_token.is_none());
    assert_eq!(page.objects[0].size_bytes, codes(&[200, 200, 404]).len() as u64);
}

#[test]
fn test_listing_pages_with_start_after() {
    let temp_dir = seeded_root();
    let store = FsObjectStore::with_page_size(temp_dir.path(), 2);

    let first = store.list_page("web", "", None).unwrap();
    assert_eq!(first.objects.len(), 2);
    let token = first.next_token.clone().expect("more pages");

    let second = store.list_page("web", "", Some(&token)).unwrap();
    let third_token = second.next_token.clone().expect("more pages");
    let third = store.list_page("web", "", Some(&third_token)).unwrap();

    assert!(third.next_token.is_none());
    let total = first.objects.len() + second.objects.len() + third.objects.len();
    assert_eq!(total, 5);
    assert_eq!(third.objects.last().map(|o| o.key.as_str()), Some("logs/2024/11/01.json"));
}

#[test]
fn test_get_reads_object_and_rejects_escapes() {
    let temp_dir = seeded_root();
    let store = FsObjectStore::new(temp_dir.path());

    let mut content = String::new();
    store
        .get("web", "README")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "not a log");

    let escaped = store.get("web", "../web/README");
    assert_eq!(
        escaped.err().map(|e| e.kind()),
        Some(std::io::ErrorKind::InvalidInput)
    );
}

#[test]
fn test_scan_over_directory_store() {
    let temp_dir = seeded_root();
    let store = FsObjectStore::with_page_size(temp_dir.path(), 1);

    let summary =
        lograte::scan_summary("s3://web/logs/2024", &store, &ScanOptions::default()).unwrap();

    assert_eq!(summary.objects_scanned, 3);
    assert_eq!(summary.totals.total, 6);
    assert_close(summary.rates.rate_2xx, 3.0 / 6.0);
    assert_close(summary.rates.rate_4xx, 1.0 / 6.0);
    assert_close(summary.rates.rate_5xx, 2.0 / 6.0);
}

#[test]
fn test_missing_bucket_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(temp_dir.path());

    let result = lograte::scan_summary("s3://absent", &store, &ScanOptions::default());
    assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
}

fn list_all(store: &FsObjectStore, bucket: &str, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = store.list_page(bucket, prefix, token.as_deref()).unwrap();
        assert!(page.objects.len() <= 2);
        keys.extend(page.objects.into_iter().map(|o| o.key));
        match page.next_token {
            Some(next) => token = Some(next),
            None => return keys,
        }
    }
}

#[test]
fn test_paging_follows_key_order_across_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for key in [
        "a0.json",
        "a/y/z.json",
        "a-b.json",
        "a/x.json",
        "a/y.json",
        "b/deep/er/log.json",
        "a/y/a.json",
    ] {
        write_object(root, "web", key, b"{}").unwrap();
    }
    let store = FsObjectStore::with_page_size(root, 2);

    assert_eq!(
        list_all(&store, "web", ""),
        vec![
            "a-b.json",
            "a/x.json",
            "a/y.json",
            "a/y/a.json",
            "a/y/z.json",
            "a0.json",
            "b/deep/er/log.json",
        ]
    );
    assert_eq!(list_all(&store, "web", "a/y/"), vec!["a/y/a.json", "a/y/z.json"]);

    let resumed = store.list_page("web", "", Some("a/y/a.json")).unwrap();
    let keys: Vec<&str> = resumed.objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["a/y/z.json", "a0.json"]);
    assert_eq!(resumed.next_token.as_deref(), Some("a0.json"));
}
