//! Read-only array store access for point-series extraction.
//!
//! Datasets expose a Zarr V3 store as their `data` asset. This crate opens a
//! variable inside such a store and reads the subset selected by an
//! [`IndexSlice`]: one fixed index or full range per dimension.
//!
//! ```text
//! ArrayStore::open(locator, variable)
//!      │
//!      ▼
//! ArrayHandle::get(slice, cancel)
//!      │
//!      ├─► IndexSlice::resolve(shape)   (rank / bounds checks)
//!      │
//!      ├─► zarrs retrieve on a blocking thread
//!      │
//!      └─► SliceData { shape, values }  (fixed dimensions dropped)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use array_store::{ArrayStore, DimSelector, IndexSlice, ZarrArrayStore};
//!
//! let handle = ZarrArrayStore::new()
//!     .open("https://example.com/waterlevel.zarr", "waterlevel")
//!     .await?;
//! let slice = IndexSlice::new(vec![DimSelector::Index(3), DimSelector::Full, DimSelector::Full]);
//! let data = handle.get(&slice, &CancellationToken::new()).await?;
//! for row in data.rows() {
//!     // one chart series per row
//! }
//! ```

pub mod error;
pub mod slice;
pub mod storage;
pub mod store;
pub mod zarr;

pub use error::{ArrayStoreError, Result};
pub use slice::{DimSelector, IndexSlice, ResolvedSlice, SliceData};
pub use storage::StoreLocator;
pub use store::{ArrayHandle, ArrayStore};
pub use tokio_util::sync::CancellationToken;
pub use zarr::{variable_path, ZarrArrayHandle, ZarrArrayStore};
