//! In-memory array store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use array_store::{
    variable_path, ArrayHandle, ArrayStore, ArrayStoreError, IndexSlice, ResolvedSlice, SliceData,
};

/// A dense array held in memory, values in C order.
#[derive(Debug, Clone)]
pub struct InMemoryArray {
    shape: Vec<u64>,
    values: Vec<f64>,
    delay: Option<Duration>,
}

impl InMemoryArray {
    /// Create an array. Panics if `values` does not fill `shape`.
    pub fn new(shape: Vec<u64>, values: Vec<f64>) -> Self {
        let expected: u64 = shape.iter().product();
        assert_eq!(
            expected as usize,
            values.len(),
            "shape {:?} needs {} values",
            shape,
            expected
        );
        Self {
            shape,
            values,
            delay: None,
        }
    }

    fn extract(&self, resolved: &ResolvedSlice) -> Vec<f64> {
        let rank = self.shape.len();
        let mut strides = vec![1u64; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.shape[d + 1];
        }

        let total: u64 = resolved.shape.iter().product();
        let mut out = Vec::with_capacity(total as usize);
        let mut offset = vec![0u64; rank];
        for _ in 0..total {
            let flat: u64 = (0..rank)
                .map(|d| (resolved.start[d] + offset[d]) * strides[d])
                .sum();
            out.push(self.values[flat as usize]);

            for d in (0..rank).rev() {
                offset[d] += 1;
                if offset[d] < resolved.shape[d] {
                    break;
                }
                offset[d] = 0;
            }
        }
        out
    }
}

#[async_trait]
impl ArrayHandle for InMemoryArray {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    async fn get(
        &self,
        slice: &IndexSlice,
        cancel: &CancellationToken,
    ) -> array_store::Result<SliceData> {
        let resolved = slice.resolve(&self.shape)?;
        if let Some(delay) = self.delay {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ArrayStoreError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(ArrayStoreError::Cancelled);
        }
        SliceData::new(resolved.output_shape.clone(), self.extract(&resolved))
    }
}

/// Serves arrays registered under `(locator, variable path)`.
#[derive(Clone, Default)]
pub struct InMemoryArrayStore {
    arrays: HashMap<(String, String), Arc<InMemoryArray>>,
    opens: Arc<AtomicUsize>,
}

impl InMemoryArrayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an array at `locator` under `variable`.
    pub fn with_array(
        mut self,
        locator: impl Into<String>,
        variable: &str,
        shape: Vec<u64>,
        values: Vec<f64>,
    ) -> Self {
        self.arrays.insert(
            (locator.into(), variable_path(variable)),
            Arc::new(InMemoryArray::new(shape, values)),
        );
        self
    }

    /// Delay every read of the given array, for stale-load tests.
    pub fn with_read_delay(mut self, locator: &str, variable: &str, delay: Duration) -> Self {
        let key = (locator.to_string(), variable_path(variable));
        if let Some(array) = self.arrays.get(&key) {
            let mut delayed = array.as_ref().clone();
            delayed.delay = Some(delay);
            self.arrays.insert(key, Arc::new(delayed));
        }
        self
    }

    /// Number of `open` calls served so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArrayStore for InMemoryArrayStore {
    async fn open(&self, locator: &str, variable: &str) -> array_store::Result<Arc<dyn ArrayHandle>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let path = variable_path(variable);
        match self.arrays.get(&(locator.to_string(), path.clone())) {
            Some(array) => Ok(array.clone() as Arc<dyn ArrayHandle>),
            None => Err(ArrayStoreError::open_failed(locator, path, "no such array")),
        }
    }
}
