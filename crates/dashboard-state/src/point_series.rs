//! Point-series extraction: slice a dataset's array store at the selected
//! station and reshape the rows into named chart series.

use array_store::{ArrayStore, DimSelector, IndexSlice, SliceData};
use tokio_util::sync::CancellationToken;

use stac_common::{
    ChartSeries, Dataset, DashboardError, DashboardResult, PointSeriesResult, XAxis, YAxis,
};

/// Ordinal position, among `cube:dimensions`, of the chart's x-axis dimension.
pub const X_AXIS_DIMENSION_INDEX: usize = 2;

/// Everything needed to read the slice for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    /// Array store locator (the dataset's data asset href).
    pub locator: String,
    /// Primary variable name.
    pub variable: String,
    pub slice: IndexSlice,
}

/// One selector per variable dimension: the station dimension fixed at
/// `location`, every other dimension taken in full.
pub fn build_index_slice(dimensions: &[String], station_dimension: &str, location: u64) -> IndexSlice {
    IndexSlice::new(
        dimensions
            .iter()
            .map(|dim| {
                if dim == station_dimension {
                    DimSelector::Index(location)
                } else {
                    DimSelector::Full
                }
            })
            .collect(),
    )
}

/// Resolve the locator, variable and slice for a dataset.
pub fn plan_request(
    dataset: &Dataset,
    station_dimension: &str,
    location: Option<u64>,
) -> DashboardResult<SeriesRequest> {
    let context = format!("dataset {}", dataset.id);
    let (variable, cube_variable) = dataset
        .primary_variable()
        .ok_or_else(|| DashboardError::schema_field(&context, "cube:variables"))?;
    let asset = dataset
        .data_asset()
        .ok_or_else(|| DashboardError::schema_field(&context, "assets.data"))?;

    Ok(SeriesRequest {
        locator: asset.href.clone(),
        variable: variable.to_string(),
        slice: build_index_slice(&cube_variable.dimensions, station_dimension, location.unwrap_or(0)),
    })
}

/// Turn slice rows into a [`PointSeriesResult`].
///
/// Series are named positionally by the labels of the `plotSeries`
/// dimension; the counts must agree.
pub fn shape_series(dataset: &Dataset, data: &SliceData) -> DashboardResult<PointSeriesResult> {
    let context = format!("dataset {}", dataset.id);

    let plot_dimension = dataset
        .plot_series_dimension()
        .ok_or_else(|| DashboardError::schema_field(&context, "properties.plotSeries"))?;
    let labels = dataset
        .cube_dimensions
        .get(plot_dimension)
        .ok_or_else(|| {
            DashboardError::schema_field(&context, format!("cube:dimensions.{}", plot_dimension))
        })?
        .labels();

    let rows = data.rows();
    if rows.len() != labels.len() {
        return Err(DashboardError::SliceShape {
            series: rows.len(),
            labels: labels.len(),
        });
    }

    let series = labels
        .into_iter()
        .zip(rows)
        .map(|(label, row)| ChartSeries::line(label, row))
        .collect();

    let (x_name, x_dimension) = dataset
        .cube_dimensions
        .get_index(X_AXIS_DIMENSION_INDEX)
        .ok_or_else(|| {
            DashboardError::schema_field(
                &context,
                format!("cube:dimensions[{}]", X_AXIS_DIMENSION_INDEX),
            )
        })?;

    let unit = dataset
        .primary_variable()
        .and_then(|(_, var)| var.unit.clone())
        .unwrap_or_default();

    Ok(PointSeriesResult {
        id: dataset.id.clone(),
        name: dataset.name.clone(),
        series,
        x_axis: XAxis {
            name: x_name.clone(),
            kind: x_dimension.kind.clone(),
            data: x_dimension.values.clone(),
        },
        y_axis: YAxis { unit },
    })
}

/// Open the dataset's store, read the station slice and shape it.
pub async fn extract_point_series(
    store: &dyn ArrayStore,
    dataset: &Dataset,
    station_dimension: &str,
    location: Option<u64>,
    cancel: &CancellationToken,
) -> DashboardResult<PointSeriesResult> {
    let request = plan_request(dataset, station_dimension, location)?;

    tracing::debug!(
        dataset_id = %dataset.id,
        locator = %request.locator,
        variable = %request.variable,
        slice = ?request.slice,
        "Reading point series"
    );

    let handle = store.open(&request.locator, &request.variable).await?;
    let data = handle.get(&request.slice, cancel).await?;
    shape_series(dataset, &data)
}
