//! Index slices and the data they select.

use serde::{Deserialize, Serialize};

use crate::error::{ArrayStoreError, Result};

/// Selection along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimSelector {
    /// A single position; the dimension is dropped from the result.
    Index(u64),
    /// The full extent of the dimension.
    Full,
}

/// One selector per array dimension, in the array's axis order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexSlice(pub Vec<DimSelector>);

impl IndexSlice {
    pub fn new(selectors: Vec<DimSelector>) -> Self {
        Self(selectors)
    }

    pub fn selectors(&self) -> &[DimSelector] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Resolve against an array shape into `(start, shape)` of the subset to
    /// read, plus the shape of the result once fixed dimensions are dropped.
    pub fn resolve(&self, array_shape: &[u64]) -> Result<ResolvedSlice> {
        if self.rank() != array_shape.len() {
            return Err(ArrayStoreError::RankMismatch {
                slice: self.rank(),
                array: array_shape.len(),
            });
        }

        let mut start = Vec::with_capacity(array_shape.len());
        let mut shape = Vec::with_capacity(array_shape.len());
        let mut output_shape = Vec::new();

        for (dimension, (selector, &length)) in self.0.iter().zip(array_shape).enumerate() {
            match *selector {
                DimSelector::Index(index) => {
                    if index >= length {
                        return Err(ArrayStoreError::SliceOutOfBounds {
                            dimension,
                            index,
                            length,
                        });
                    }
                    start.push(index);
                    shape.push(1);
                }
                DimSelector::Full => {
                    start.push(0);
                    shape.push(length);
                    output_shape.push(length as usize);
                }
            }
        }

        Ok(ResolvedSlice {
            start,
            shape,
            output_shape,
        })
    }
}

/// An [`IndexSlice`] resolved against a concrete array shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlice {
    pub start: Vec<u64>,
    pub shape: Vec<u64>,
    /// Shape of the returned data (unsliced dimensions only).
    pub output_shape: Vec<usize>,
}

/// Data returned for a slice, in C order over the unsliced dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceData {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl SliceData {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(ArrayStoreError::read_failed(format!(
                "shape {:?} needs {} values but {} were read",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    /// Split along the last axis: one row per combination of the leading axes.
    ///
    /// Scalar and one-dimensional data yield a single row.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.shape.len() <= 1 {
            return vec![self.values.clone()];
        }
        let row_len = self.shape[self.shape.len() - 1];
        if row_len == 0 {
            let row_count: usize = self.shape[..self.shape.len() - 1].iter().product();
            return vec![Vec::new(); row_count];
        }
        self.values.chunks(row_len).map(|c| c.to_vec()).collect()
    }
}
