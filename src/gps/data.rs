// src/gps/data.rs
//! Fix record and fix quality

use super::nmea::{gga::GgaData, rmc::RmcData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// GGA fix quality indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixQuality {
    NoFix,
    Gps,
    Dgps,
    Pps,
    Rtk,
    FloatRtk,
    DeadReckoning,
    Manual,
    Simulation,
    Unknown,
}

impl FixQuality {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => FixQuality::NoFix,
            1 => FixQuality::Gps,
            2 => FixQuality::Dgps,
            3 => FixQuality::Pps,
            4 => FixQuality::Rtk,
            5 => FixQuality::FloatRtk,
            6 => FixQuality::DeadReckoning,
            7 => FixQuality::Manual,
            8 => FixQuality::Simulation,
            _ => FixQuality::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FixQuality::NoFix => "invalid",
            FixQuality::Gps => "GPS fix (SPS)",
            FixQuality::Dgps => "DGPS fix",
            FixQuality::Pps => "PPS fix",
            FixQuality::Rtk => "Real Time Kinematic",
            FixQuality::FloatRtk => "Float RTK",
            FixQuality::DeadReckoning => "estimated (dead reckoning)",
            FixQuality::Manual => "Manual input mode",
            FixQuality::Simulation => "Simulation mode",
            FixQuality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Immutable snapshot of one gather cycle.
///
/// Either complete (built from an RMC and a GGA sentence of the same cycle)
/// or empty with `status` explaining why. Unknown values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fix {
    timestamp: Option<DateTime<Utc>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    grid_square: String,
    fix_quality: Option<FixQuality>,
    satellites: Option<u32>,
    hdop: Option<f64>,
    status: String,
}

impl Fix {
    /// A fix with nothing known, carrying the reason.
    pub fn empty(status: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            latitude: None,
            longitude: None,
            grid_square: String::new(),
            fix_quality: None,
            satellites: None,
            hdop: None,
            status: status.into(),
        }
    }

    /// Combine the two halves captured during one cycle. The grid square
    /// comes from the same RMC sentence as the coordinates.
    pub fn from_sentences(rmc: &RmcData, gga: &GgaData) -> Self {
        Self {
            timestamp: Some(rmc.timestamp),
            latitude: Some(rmc.latitude),
            longitude: Some(rmc.longitude),
            grid_square: rmc.grid_square.clone(),
            fix_quality: Some(gga.fix_quality),
            satellites: Some(gga.satellites),
            hdop: Some(gga.hdop),
            status: String::new(),
        }
    }

    /// Same values, different status.
    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self.clone()
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn grid_square(&self) -> &str {
        &self.grid_square
    }

    pub fn fix_quality(&self) -> Option<FixQuality> {
        self.fix_quality
    }

    pub fn satellites(&self) -> Option<u32> {
        self.satellites
    }

    pub fn hdop(&self) -> Option<f64> {
        self.hdop
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Check if the fix carries a position
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Empty status means the fix is usable
    pub fn is_ok(&self) -> bool {
        self.status.is_empty()
    }

    /// Age of the fix in seconds, measured against the host clock
    pub fn age_seconds(&self) -> Option<i64> {
        self.timestamp
            .map(|ts| Utc::now().signed_duration_since(ts).num_seconds())
    }
}

impl Default for Fix {
    fn default() -> Self {
        Self::empty("waiting for first fix")
    }
}

/// Status for display: `OK` when empty, otherwise capitalised.
pub fn format_status(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        None => "OK".to_string(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

pub fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%d-%b-%Y %H:%M:%S UTC").to_string(),
        None => String::new(),
    }
}

/// Shortest round-trip decimal, or empty when unknown or outside `±bound`.
pub fn format_coordinate(coord: Option<f64>, bound: f64) -> String {
    match coord {
        Some(val) if val.abs() <= bound => format!("{}", val),
        _ => String::new(),
    }
}

pub fn format_value<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(val) => val.to_string(),
        None => String::new(),
    }
}
