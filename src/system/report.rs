//! JSON payloads of the sensor endpoints

use serde::Serialize;

use crate::system::distance::Reading;

/// Where a reported distance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// Measured by the sensor
    Ok,
    /// Produced by the synthetic generator
    Simulated,
    /// No reading available
    Timeout,
}

impl From<&Reading> for ReadingStatus {
    fn from(reading: &Reading) -> Self {
        match reading {
            Reading::Measured(_) => ReadingStatus::Ok,
            Reading::Synthetic(_) => ReadingStatus::Simulated,
        }
    }
}

/// Rounds to one decimal, the resolution shown by the UI
fn tenths(cm: f32) -> f32 {
    libm::roundf(cm * 10.0) / 10.0
}

/// Body of `/radar-data`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarReport {
    pub angle: u8,
    pub distance: f32,
    pub timestamp: u64,
    pub status: ReadingStatus,
}

impl RadarReport {
    pub fn new(angle: u8, reading: Reading, timestamp: u64) -> Self {
        Self {
            angle,
            distance: tenths(reading.cm()),
            timestamp,
            status: ReadingStatus::from(&reading),
        }
    }
}

/// Body of `/distance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceReport {
    /// -1 when unknown
    pub distance: f32,
    pub unit: &'static str,
    pub status: ReadingStatus,
    pub timestamp: u64,
}

impl DistanceReport {
    pub fn new(distance_cm: Option<f32>, timestamp: u64) -> Self {
        let (distance, status) = match distance_cm {
            Some(cm) => (tenths(cm), ReadingStatus::Ok),
            None => (-1.0, ReadingStatus::Timeout),
        };
        Self {
            distance,
            unit: "cm",
            status,
            timestamp,
        }
    }
}
