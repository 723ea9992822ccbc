//! Array store traits.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::slice::{IndexSlice, SliceData};

/// Opens variables of out-of-core array stores in read-only mode.
#[async_trait]
pub trait ArrayStore: Send + Sync {
    /// Open `variable` inside the store at `locator`.
    async fn open(&self, locator: &str, variable: &str) -> Result<Arc<dyn ArrayHandle>>;
}

/// A read-only handle to one array variable.
#[async_trait]
pub trait ArrayHandle: Send + Sync {
    /// Extent of every dimension.
    fn shape(&self) -> &[u64];

    /// Read the data selected by `slice`.
    ///
    /// Returns [`ArrayStoreError::Cancelled`](crate::ArrayStoreError::Cancelled)
    /// if `cancel` fires before the read completes.
    async fn get(&self, slice: &IndexSlice, cancel: &CancellationToken) -> Result<SliceData>;
}
