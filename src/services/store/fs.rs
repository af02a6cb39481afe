//! Directory-backed object store.
//!
//! Each top-level directory under the store root is a bucket; object keys are
//! the `/`-separated paths of regular files relative to that bucket directory.
//! Listing walks the bucket in lexicographic key order, the way blob stores
//! list, and only reads the directories one page needs.

use super::{DEFAULT_PAGE_SIZE, ListPage, ObjectStore, paginate};
use crate::ObjectRef;
use std::fs;
use std::io;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    page_size: usize,
}

impl FsObjectStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_page_size(root, DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub fn with_page_size<P: AsRef<Path>>(root: P, page_size: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            page_size: page_size.max(1),
        }
    }

    fn bucket_dir(&self, bucket: &str) -> io::Result<PathBuf> {
        let dir = self.root.join(checked_relative(bucket)?);
        let metadata = fs::metadata(&dir).map_err(|err| {
            io::Error::new(err.kind(), format!("no such bucket: {bucket} ({err})"))
        })?;
        if !metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such bucket: {bucket}"),
            ));
        }
        Ok(dir)
    }
}

impl ObjectStore for FsObjectStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        start_after: Option<&str>,
    ) -> io::Result<ListPage> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let walk = ListingWalk {
            prefix,
            start_after,
            // One extra key tells whether another page follows.
            limit: self.page_size.saturating_add(1),
        };
        let mut objects = Vec::new();
        walk.collect(&bucket_dir, "", &mut objects)?;

        log::trace!(
            "Listed {} objects under {bucket}/{prefix} after {start_after:?} from {}",
            objects.len(),
            bucket_dir.display()
        );

        Ok(paginate(objects, start_after, self.page_size))
    }

    fn get(&self, bucket: &str, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = self.bucket_dir(bucket)?.join(checked_relative(key)?);
        let file = fs::File::open(&path)?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

/// One page worth of a key-ordered directory walk.
///
/// Entries are visited in key order (a directory sorts as its key plus `/`),
/// so every subtree is a contiguous run of keys. Subtrees that end before
/// `start_after` or miss `prefix` are never opened, and the walk stops once
/// `limit` keys are gathered.
struct ListingWalk<'a> {
    prefix: &'a str,
    start_after: Option<&'a str>,
    limit: usize,
}

impl ListingWalk<'_> {
    fn collect(&self, dir: &Path, key_base: &str, out: &mut Vec<ObjectRef>) -> io::Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = if file_type.is_dir() {
                format!("{key_base}{name}/")
            } else {
                format!("{key_base}{name}")
            };
            entries.push((key, file_type, entry));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, file_type, entry) in entries {
            if out.len() >= self.limit {
                break;
            }

            if file_type.is_dir() {
                if self.may_contain(&key) {
                    self.collect(&entry.path(), &key, out)?;
                }
            } else if file_type.is_file() && self.selects(&key) {
                out.push(ObjectRef::new(key, entry.metadata()?.len()));
            }
        }

        Ok(())
    }

    /// Whether a directory key can still hold selected keys.
    fn may_contain(&self, dir_key: &str) -> bool {
        let overlaps_prefix = dir_key.starts_with(self.prefix) || self.prefix.starts_with(dir_key);
        // Every key below `dir_key` sorts before `after` unless `after` lies inside it.
        let ends_before = self
            .start_after
            .is_some_and(|after| dir_key < after && !after.starts_with(dir_key));
        overlaps_prefix && !ends_before
    }

    fn selects(&self, key: &str) -> bool {
        key.starts_with(self.prefix) && self.start_after.is_none_or(|after| key > after)
    }
}

/// Reject keys that would resolve outside the bucket directory.
fn checked_relative(name: &str) -> io::Result<&Path> {
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));

    if name.is_empty() || escapes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid object name: {name:?}"),
        ));
    }

    Ok(path)
}
