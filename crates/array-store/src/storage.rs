//! Storage backends for Zarr access, selected from a store locator.
//!
//! HTTP(S) locators go through `object_store`'s HTTP client wrapped in the
//! async-to-sync adapter so the synchronous zarrs API can read from them.
//! Everything else is treated as a local filesystem path.

use std::path::PathBuf;
use std::sync::Arc;

use object_store::http::HttpBuilder;
use tokio::runtime::Handle;
use zarrs::storage::ReadableStorageTraits;
use zarrs_filesystem::FilesystemStore;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};

use crate::error::{ArrayStoreError, Result};

/// Shared read-only storage handed to `zarrs::array::Array::open`.
pub type SyncStorage = Arc<dyn ReadableStorageTraits>;

/// Blocking executor for the async-to-sync adapter.
///
/// Zarr reads run on `spawn_blocking` threads, where driving a future with the
/// runtime handle directly is allowed.
#[derive(Clone)]
pub struct RuntimeBlockOn(Handle);

impl RuntimeBlockOn {
    pub fn new(handle: Handle) -> Self {
        Self(handle)
    }
}

impl AsyncToSyncBlockOn for RuntimeBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Where an array store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocator {
    Http(String),
    Filesystem(PathBuf),
}

impl StoreLocator {
    pub fn parse(locator: &str) -> Self {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            StoreLocator::Http(locator.trim_end_matches('/').to_string())
        } else {
            let path = locator.strip_prefix("file://").unwrap_or(locator);
            StoreLocator::Filesystem(PathBuf::from(path))
        }
    }

    /// Open the storage backend. Must be called from a blocking thread when
    /// the locator is HTTP.
    pub fn open(&self, handle: Handle) -> Result<SyncStorage> {
        match self {
            StoreLocator::Http(url) => {
                let http = HttpBuilder::new().with_url(url.as_str()).build().map_err(|e| {
                    ArrayStoreError::open_failed(url.as_str(), "", format!("HTTP store: {}", e))
                })?;
                let async_store = Arc::new(AsyncObjectStore::new(http));
                let sync_store =
                    AsyncToSyncStorageAdapter::new(async_store, RuntimeBlockOn::new(handle));
                Ok(Arc::new(sync_store))
            }
            StoreLocator::Filesystem(path) => {
                let store = FilesystemStore::new(path).map_err(|e| {
                    ArrayStoreError::open_failed(path.display().to_string(), "", e.to_string())
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}
