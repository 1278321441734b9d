use crate::error::{ProcessingError, Result};
use crate::models::SeriesId;
use std::path::Path;

/// Extract the (pollutant, station) pair from a series file name.
///
/// The base name up to the first `.` must be two integers joined by an
/// underscore.
///
/// # Examples
/// ```
/// use airpy_db::utils::parse_series_id;
/// use std::path::Path;
///
/// let id = parse_series_id(Path::new("pkl/6_1002.json")).unwrap();
/// assert_eq!((id.pollutant_id, id.station_id), (6, 1002));
/// ```
pub fn parse_series_id(path: &Path) -> Result<SeriesId> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid file path: {}", path.display())))?;

    let invalid = || ProcessingError::InvalidFileName {
        name: filename.to_string(),
    };

    let stem = filename.split('.').next().unwrap_or_default();
    let mut parts = stem.split('_');

    let (Some(pollutant), Some(station), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let pollutant_id = pollutant.parse::<i64>().map_err(|_| invalid())?;
    let station_id = station.parse::<i64>().map_err(|_| invalid())?;

    Ok(SeriesId::new(pollutant_id, station_id))
}

/// Build the file name a series is stored under, e.g. `6_1002.json`
pub fn series_file_name(id: SeriesId, extension: &str) -> String {
    format!("{}_{}.{}", id.pollutant_id, id.station_id, extension)
}

/// File name of the shared timestamp index for a given extension
pub fn index_file_name(stem: &str, extension: &str) -> String {
    format!("{}.{}", stem, extension)
}
