//! Zarr V3 array store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use zarrs::array::{Array, DataType, ElementOwned};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

use crate::error::{ArrayStoreError, Result};
use crate::slice::{IndexSlice, ResolvedSlice, SliceData};
use crate::storage::StoreLocator;
use crate::store::{ArrayHandle, ArrayStore};

type ZarrArray = Array<dyn ReadableStorageTraits>;

/// Array store reading Zarr V3 variables from the filesystem or over HTTP.
///
/// All zarrs calls are synchronous and run on blocking threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZarrArrayStore;

impl ZarrArrayStore {
    pub fn new() -> Self {
        Self
    }
}

/// Path of a variable inside a store (`"waterlevel"` -> `"/waterlevel"`).
pub fn variable_path(variable: &str) -> String {
    if variable.starts_with('/') {
        variable.to_string()
    } else {
        format!("/{}", variable)
    }
}

#[async_trait]
impl ArrayStore for ZarrArrayStore {
    async fn open(&self, locator: &str, variable: &str) -> Result<Arc<dyn ArrayHandle>> {
        let parsed = StoreLocator::parse(locator);
        let path = variable_path(variable);
        let runtime = Handle::current();

        let open_locator = locator.to_string();
        let open_path = path.clone();
        let array = tokio::task::spawn_blocking(move || -> Result<ZarrArray> {
            let storage = parsed.open(runtime)?;
            Array::open(storage, &open_path).map_err(|e| {
                ArrayStoreError::open_failed(open_locator.as_str(), open_path.as_str(), e.to_string())
            })
        })
        .await
        .map_err(|e| ArrayStoreError::read_failed(format!("open task failed: {}", e)))??;

        let shape = array.shape().to_vec();
        tracing::debug!(
            locator = %locator,
            path = %path,
            shape = ?shape,
            data_type = ?array.data_type(),
            "Opened Zarr array"
        );

        Ok(Arc::new(ZarrArrayHandle {
            array: Arc::new(array),
            path,
            shape,
        }))
    }
}

/// Handle to one opened Zarr array.
pub struct ZarrArrayHandle {
    array: Arc<ZarrArray>,
    path: String,
    shape: Vec<u64>,
}

#[async_trait]
impl ArrayHandle for ZarrArrayHandle {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    async fn get(&self, slice: &IndexSlice, cancel: &CancellationToken) -> Result<SliceData> {
        let resolved = slice.resolve(&self.shape)?;
        if cancel.is_cancelled() {
            return Err(ArrayStoreError::Cancelled);
        }

        tracing::debug!(
            path = %self.path,
            start = ?resolved.start,
            shape = ?resolved.shape,
            "Reading array subset"
        );

        let array = Arc::clone(&self.array);
        let read = tokio::task::spawn_blocking(move || read_subset(&array, &resolved));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(path = %self.path, "Array read cancelled");
                Err(ArrayStoreError::Cancelled)
            }
            joined = read => joined
                .map_err(|e| ArrayStoreError::read_failed(format!("read task failed: {}", e)))?,
        }
    }
}

fn read_subset(array: &ZarrArray, resolved: &ResolvedSlice) -> Result<SliceData> {
    let subset = ArraySubset::new_with_start_shape(resolved.start.clone(), resolved.shape.clone())
        .map_err(|e| ArrayStoreError::read_failed(e.to_string()))?;

    let values = match array.data_type() {
        DataType::Float32 => widen::<f32>(array, &subset)?,
        DataType::Float64 => widen::<f64>(array, &subset)?,
        DataType::Int8 => widen::<i8>(array, &subset)?,
        DataType::Int16 => widen::<i16>(array, &subset)?,
        DataType::Int32 => widen::<i32>(array, &subset)?,
        DataType::UInt8 => widen::<u8>(array, &subset)?,
        DataType::UInt16 => widen::<u16>(array, &subset)?,
        DataType::UInt32 => widen::<u32>(array, &subset)?,
        DataType::Int64 => retrieve::<i64>(array, &subset)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        DataType::UInt64 => retrieve::<u64>(array, &subset)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        other => return Err(ArrayStoreError::UnsupportedDataType(format!("{:?}", other))),
    };

    SliceData::new(resolved.output_shape.clone(), values)
}

fn retrieve<T: ElementOwned>(array: &ZarrArray, subset: &ArraySubset) -> Result<Vec<T>> {
    array
        .retrieve_array_subset_elements::<T>(subset)
        .map_err(|e| ArrayStoreError::read_failed(e.to_string()))
}

fn widen<T: ElementOwned + Into<f64>>(array: &ZarrArray, subset: &ArraySubset) -> Result<Vec<f64>> {
    Ok(retrieve::<T>(array, subset)?
        .into_iter()
        .map(Into::into)
        .collect())
}
