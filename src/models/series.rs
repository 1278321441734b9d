use std::fmt;

/// Identifies one source file: a pollutant measured at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId {
    pub pollutant_id: i64,
    pub station_id: i64,
}

impl SeriesId {
    pub fn new(pollutant_id: i64, station_id: i64) -> Self {
        Self {
            pollutant_id,
            station_id,
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pollutant_id, self.station_id)
    }
}
