use crate::models::SeriesId;

/// Quality marker stored in the `flag` column of the fact table.
///
/// Only `Valid` is produced today; the column is reserved for later
/// quality/validity marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityFlag {
    #[default]
    Valid = 0,
}

impl QualityFlag {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

/// One numeric observation, destined for the `data` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub pollutant_id: i64,
    pub station_id: i64,
    pub timestamp: i64,
    pub value: f64,
    pub flag: i64,
}

impl FactRow {
    pub fn new(series: SeriesId, timestamp: i64, value: f64) -> Self {
        Self {
            pollutant_id: series.pollutant_id,
            station_id: series.station_id,
            timestamp,
            value,
            flag: QualityFlag::Valid.as_i64(),
        }
    }

    pub fn series(&self) -> SeriesId {
        SeriesId::new(self.pollutant_id, self.station_id)
    }
}

/// One annotated observation, destined for the `data_meta` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRow {
    pub pollutant_id: i64,
    pub station_id: i64,
    pub timestamp: i64,
    pub code: i64,
}

impl MetaRow {
    pub fn new(series: SeriesId, timestamp: i64, code: i64) -> Self {
        Self {
            pollutant_id: series.pollutant_id,
            station_id: series.station_id,
            timestamp,
            code,
        }
    }

    pub fn series(&self) -> SeriesId {
        SeriesId::new(self.pollutant_id, self.station_id)
    }
}
