//! In-memory object store for tests and embedders that already hold their data.

use super::{DEFAULT_PAGE_SIZE, ListPage, ObjectStore, paginate};
use crate::ObjectRef;
use std::collections::BTreeMap;
use std::io;
use std::io::{Cursor, Read};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    buckets: BTreeMap<String, BTreeMap<String, Arc<Vec<u8>>>>,
    page_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: BTreeMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Create an empty bucket; a no-op if it already exists.
    pub fn create_bucket(&mut self, bucket: &str) {
        self.buckets.entry(bucket.to_string()).or_default();
    }

    /// Store an object, creating the bucket on first use.
    pub fn put(&mut self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), Arc::new(content.into()));
    }

    fn bucket(&self, bucket: &str) -> io::Result<&BTreeMap<String, Arc<Vec<u8>>>> {
        self.buckets.get(bucket).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such bucket: {bucket}"))
        })
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
    ) -> io::Result<ListPage> {
        let objects = self
            .bucket(bucket)?
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, content)| ObjectRef::new(key.clone(), content.len() as u64));

        Ok(paginate(objects, start_after, self.page_size))
    }

    fn get(&self, bucket: &str, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let content = self.bucket(bucket)?.get(key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such key: {key}"))
        })?;

        Ok(Box::new(Cursor::new(SharedBytes(Arc::clone(content)))))
    }
}

struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
