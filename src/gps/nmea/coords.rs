// src/gps/nmea/coords.rs
//! Sexagesimal `(d)ddmm.mmmm` coordinates to decimal degrees

use crate::error::{GpsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Width of the degree prefix in the NMEA field
    fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    pub fn bound(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    /// Hemisphere letter that makes the value negative
    fn negative_hemisphere(self) -> &'static str {
        match self {
            Axis::Latitude => "S",
            Axis::Longitude => "W",
        }
    }
}

/// Convert a degrees-minutes field to unsigned decimal degrees.
pub fn parse_degrees_minutes(dm: &str, axis: Axis) -> Result<f64> {
    let split = axis.degree_digits();
    let (degrees, minutes) = match (dm.get(..split), dm.get(split..)) {
        (Some(d), Some(m)) if !m.is_empty() => (d, m),
        _ => {
            return Err(GpsError::MalformedField(format!(
                "{:?} is not a {:?} in (d)ddmm.mmmm form",
                dm, axis
            )))
        }
    };

    if !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GpsError::MalformedField(format!("degrees {:?} in {:?}", degrees, dm)));
    }
    let degrees: f64 = degrees
        .parse()
        .map_err(|_| GpsError::MalformedField(format!("degrees {:?} in {:?}", degrees, dm)))?;

    if !minutes.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(GpsError::MalformedField(format!("minutes {:?} in {:?}", minutes, dm)));
    }
    let minutes: f64 = minutes
        .parse()
        .map_err(|_| GpsError::MalformedField(format!("minutes {:?} in {:?}", minutes, dm)))?;

    if degrees > axis.bound() {
        return Err(GpsError::OutOfRange(format!(
            "{} degrees exceeds {:?} bound of {}",
            degrees,
            axis,
            axis.bound()
        )));
    }

    Ok(degrees + minutes / 60.0)
}

/// Convert a coordinate field plus its hemisphere letter to signed decimal degrees.
///
/// Only `S`/`W` negate; any other letter, or none, reads as north/east.
pub fn parse_coordinate(dm: &str, hemisphere: &str, axis: Axis) -> Result<f64> {
    let value = parse_degrees_minutes(dm, axis)?;
    if hemisphere == axis.negative_hemisphere() {
        Ok(-value)
    } else {
        Ok(value)
    }
}
