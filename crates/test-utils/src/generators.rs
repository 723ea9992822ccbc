//! Test data generators for synthetic point-series cubes.
//!
//! Values are predictable so a slice can be checked against the indices it
//! was taken at.

/// Values of a `[stations, series, time]` cube in C order.
///
/// Each value is `station * 100 + series * 10 + time`.
///
/// # Example
///
/// ```
/// use test_utils::create_station_cube;
///
/// let cube = create_station_cube(2, 2, 3);
/// assert_eq!(cube.len(), 12);
/// assert_eq!(cube[0], 0.0);    // station 0, series 0, time 0
/// assert_eq!(cube[4], 11.0);   // station 0, series 1, time 1
/// assert_eq!(cube[6], 100.0);  // station 1, series 0, time 0
/// ```
pub fn create_station_cube(stations: usize, series: usize, times: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(stations * series * times);
    for station in 0..stations {
        for s in 0..series {
            for t in 0..times {
                data.push(station_cube_value(station, s, t));
            }
        }
    }
    data
}

/// The value [`create_station_cube`] stores at one position.
pub fn station_cube_value(station: usize, series: usize, time: usize) -> f64 {
    (station * 100 + series * 10 + time) as f64
}

/// Expected rows of a station slice of [`create_station_cube`].
pub fn expected_station_rows(station: usize, series: usize, times: usize) -> Vec<Vec<f64>> {
    (0..series)
        .map(|s| (0..times).map(|t| station_cube_value(station, s, t)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_cube_layout() {
        let cube = create_station_cube(3, 2, 4);
        assert_eq!(cube.len(), 24);
        // station 2, series 1, time 3 -> 2*8 + 1*4 + 3
        assert_eq!(cube[23], 213.0);
    }

    #[test]
    fn test_expected_rows_match_cube() {
        let cube = create_station_cube(2, 2, 3);
        let rows = expected_station_rows(1, 2, 3);
        assert_eq!(rows[0], cube[6..9].to_vec());
        assert_eq!(rows[1], cube[9..12].to_vec());
    }
}
