//! Byte sources for asset locators

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use uuid::Uuid;

use super::locator::Locator;
use super::{preview, AssetError};

/// Fetches the raw bytes behind a locator
///
/// `data:` locators are decoded by the loader itself and never reach a source.
pub trait AssetSource {
    /// Read every byte behind `locator`
    fn fetch<'a>(&'a self, locator: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, AssetError>>;
}

/// In-memory table of `blob:` URLs
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    blobs: Rc<RefCell<HashMap<String, Rc<[u8]>>>>,
}

impl BlobStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes under a fresh `blob:` URL
    pub fn create_object_url(&self, bytes: Vec<u8>) -> String {
        let url = format!("blob:{}", Uuid::new_v4());
        self.insert(url.clone(), bytes);
        url
    }

    /// Store bytes under a caller-chosen URL, replacing any previous blob
    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.borrow_mut().insert(url.into(), Rc::from(bytes));
    }

    /// Drop a blob. Returns false if nothing was stored under the URL.
    pub fn revoke(&self, url: &str) -> bool {
        self.blobs.borrow_mut().remove(url).is_some()
    }

    /// Bytes stored under a URL
    pub fn get(&self, url: &str) -> Option<Rc<[u8]>> {
        self.blobs.borrow().get(url).cloned()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

/// Project directory plus blob store
#[derive(Debug, Clone)]
pub struct LocalAssetSource {
    root: PathBuf,
    blobs: BlobStore,
}

impl LocalAssetSource {
    /// Source resolving relative paths against `root`
    pub fn new(root: impl Into<PathBuf>, blobs: BlobStore) -> Self {
        Self {
            root: root.into(),
            blobs,
        }
    }

    /// Directory relative paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shared blob table
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    fn read_file(path: &Path) -> Result<Vec<u8>, AssetError> {
        log::debug!("Reading asset file {}", path.display());
        std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl AssetSource for LocalAssetSource {
    fn fetch<'a>(&'a self, locator: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, AssetError>> {
        async move {
            match Locator::parse(locator) {
                Some(Locator::Blob(url)) => self
                    .blobs
                    .get(url)
                    .map(|bytes| bytes.to_vec())
                    .ok_or_else(|| AssetError::BlobNotFound(url.to_string())),
                Some(Locator::AbsolutePath(path)) => Self::read_file(Path::new(path)),
                Some(Locator::RelativePath(path)) => Self::read_file(&self.root.join(path)),
                Some(Locator::Data { .. }) | None => Err(AssetError::UnsupportedLocator {
                    key: locator.to_string(),
                    locator: preview(locator),
                }),
            }
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_blob_urls_are_shared_between_clones() {
        let store = BlobStore::new();
        let source = LocalAssetSource::new(".", store.clone());
        let url = store.create_object_url(vec![1, 2, 3]);
        assert!(url.starts_with("blob:"));

        assert_eq!(block_on(source.fetch(&url)).unwrap(), vec![1, 2, 3]);
        assert!(store.revoke(&url));
        assert!(matches!(block_on(source.fetch(&url)), Err(AssetError::BlobNotFound(_))));
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi").unwrap();
        let source = LocalAssetSource::new(dir.path(), BlobStore::new());

        assert_eq!(block_on(source.fetch("hello.txt")).unwrap(), b"hi");
        assert!(matches!(block_on(source.fetch("missing.txt")), Err(AssetError::Io { .. })));
    }
}
