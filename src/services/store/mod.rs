//! Object store abstraction consumed by the scanner.

use crate::ObjectRef;
use std::io;
use std::io::Read;

/// Default number of objects returned per listing page, matching common blob stores.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectRef>,
    /// Token to pass as `start_after` for the following page; `None` on the last page.
    pub next_token: Option<String>,
}

impl ListPage {
    #[must_use]
    pub fn new(objects: Vec<ObjectRef>, next_token: Option<String>) -> Self {
        Self {
            objects,
            next_token,
        }
    }
}

/// Blob store operations required by a scan.
pub trait ObjectStore: Send + Sync {
    /// List objects under `prefix` in key order, starting after `start_after` when given.
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
    ) -> io::Result<ListPage>;

    /// Open the full content of one object.
    fn get(&self, bucket: &str, key: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Slice an ordered key listing into one page.
pub(crate) fn paginate<I>(objects: I, start_after: Option<&str>, page_size: usize) -> ListPage
where
    I: IntoIterator<Item = ObjectRef>,
{
    let page_size = page_size.max(1);
    let mut remaining = objects
        .into_iter()
        .filter(|object| start_after.is_none_or(|token| object.key.as_str() > token));

    let page: Vec<ObjectRef> = remaining.by_ref().take(page_size).collect();
    let next_token = if remaining.next().is_some() {
        page.last().map(|object| object.key.clone())
    } else {
        None
    };

    ListPage::new(page, next_token)
}

pub mod fs;
pub mod memory;
