//! Paged enumeration of the objects under a location.

use crate::services::location::Location;
use crate::services::store::ObjectStore;
use crate::{Error, ObjectRef, Result};

/// Lists objects under a location, one store page at a time.
///
/// Enumeration is restartable: every call to [`ObjectEnumerator::pages`]
/// lists from the beginning again. No continuation token outlives the iterator.
pub struct ObjectEnumerator<'a> {
    store: &'a dyn ObjectStore,
    location: &'a Location,
}

impl<'a> ObjectEnumerator<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore, location: &'a Location) -> Self {
        Self { store, location }
    }

    /// Lazily list pages, stopping after the first failure.
    #[must_use]
    pub fn pages(&self) -> Pages<'a> {
        Pages {
            store: self.store,
            location: self.location,
            token: None,
            done: false,
        }
    }

    /// Lazily list individual objects across all pages.
    pub fn objects(&self) -> impl Iterator<Item = Result<ObjectRef>> + 'a {
        self.pages().flat_map(|page| match page {
            Ok(objects) => objects.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        })
    }

    /// List everything, failing without partial results if any page fails.
    pub fn collect_all(&self) -> Result<Vec<ObjectRef>> {
        let mut all = Vec::new();
        for page in self.pages() {
            all.extend(page?);
        }
        Ok(all)
    }
}

pub struct Pages<'a> {
    store: &'a dyn ObjectStore,
    location: &'a Location,
    token: Option<String>,
    done: bool,
}

impl Iterator for Pages<'_> {
    type Item = Result<Vec<ObjectRef>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bucket = self.location.bucket.as_str();
        let prefix = self.location.prefix.as_str();

        let page = match self.store.list_page(bucket, prefix, self.token.as_deref()) {
            Ok(page) => page,
            Err(source) => {
                self.done = true;
                return Some(Err(Error::StorageUnavailable {
                    bucket: bucket.to_string(),
                    prefix: prefix.to_string(),
                    source,
                }));
            }
        };

        log::debug!(
            "Listed page of {} objects under {}",
            page.objects.len(),
            self.location
        );

        match page.next_token {
            // A store handing back the same token would page forever.
            Some(next) if self.token.as_deref() != Some(next.as_str()) => {
                self.token = Some(next);
            }
            _ => self.done = true,
        }

        if page.objects.is_empty() && self.done {
            return None;
        }

        Some(Ok(page.objects))
    }
}
