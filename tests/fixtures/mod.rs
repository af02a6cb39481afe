//! Test fixtures for deterministic log corpora

#![allow(dead_code)]

use lograte::services::store::memory::MemoryObjectStore;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const BUCKET: &str = "access-logs";

/// One well-formed record whose message carries `code`.
pub fn status_record(code: u16) -> String {
    format!(
        r#"{{"timestamp":"2024-10-01T12:00:00Z","level":"info","message":"GET /api/orders HTTP Status Code: {code} served in 12ms"}}"#
    )
}

/// A well-formed record without any status marker.
pub fn plain_record(message: &str) -> String {
    serde_json::json!({ "level": "debug", "message": message }).to_string()
}

/// Newline-delimited content, terminated by a trailing newline.
pub fn ndjson<I, S>(records: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for record in records {
        out.push_str(record.as_ref());
        out.push('\n');
    }
    out
}

pub fn codes(codes: &[u16]) -> String {
    ndjson(codes.iter().map(|code| status_record(*code)))
}

/// Five 200s, two 404s and three 503s spread over three objects under `logs/`.
pub fn scenario_store() -> MemoryObjectStore {
    let mut store = MemoryObjectStore::with_page_size(2);
    store.put(BUCKET, "logs/part-000.json", codes(&[200, 200, 404, 503]));
    store.put(BUCKET, "logs/part-001.json", codes(&[200, 503, 200]));
    store.put(BUCKET, "logs/part-002.json", codes(&[404, 503, 200]));
    store
}

/// Write an object into a directory-backed store rooted at `root`.
pub fn write_object(root: &Path, bucket: &str, key: &str, content: &[u8]) -> std::io::Result<()> {
    let path = root.join(bucket).join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    Ok(())
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
