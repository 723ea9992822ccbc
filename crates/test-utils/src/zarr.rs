//! Helpers for writing small Zarr V3 stores to disk.

use std::path::Path;
use std::sync::Arc;

use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

/// Write a float32 variable at `/<variable>` inside the store at `root`.
///
/// The store is chunked along the first dimension only.
pub fn write_zarr_variable(
    root: &Path,
    variable: &str,
    shape: &[u64],
    values: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(root)?;
    let store = Arc::new(FilesystemStore::new(root)?);

    let mut chunk_shape = shape.to_vec();
    if let Some(first) = chunk_shape.first_mut() {
        *first = 1;
    }

    let array = ArrayBuilder::new(
        shape.to_vec(),
        DataType::Float32,
        chunk_shape.try_into()?,
        FillValue::from(f32::NAN),
    )
    .build(store, &format!("/{}", variable))?;
    array.store_metadata()?;

    let data: Vec<f32> = values.iter().map(|v| *v as f32).collect();
    let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape.to_vec())?;
    array.store_array_subset_elements(&subset, &data)?;
    Ok(())
}

/// Write the station cube used by the sample catalog and return the store path.
pub fn write_station_cube(
    dir: &Path,
    variable: &str,
    stations: usize,
    series: usize,
    times: usize,
) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let root = dir.join(format!("{}.zarr", variable));
    write_zarr_variable(
        &root,
        variable,
        &[stations as u64, series as u64, times as u64],
        &crate::generators::create_station_cube(stations, series, times),
    )?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_array_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_station_cube(dir.path(), "waterlevel", 2, 2, 3).unwrap();
        assert!(root.join("waterlevel").join("zarr.json").exists());
    }
}
