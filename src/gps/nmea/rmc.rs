// src/gps/nmea/rmc.rs
//! RMC (Recommended Minimum Navigation Information) sentence

use super::coords::{parse_coordinate, Axis};
use super::sentence::{Sentence, SentenceKind};
use crate::error::{GpsError, Result};
use crate::gps::grid;
use chrono::{DateTime, NaiveDate, Utc};

const TIME: usize = 1;
const STATUS: usize = 2;
const LATITUDE: usize = 3;
const LAT_HEMISPHERE: usize = 4;
const LONGITUDE: usize = 5;
const LON_HEMISPHERE: usize = 6;
const DATE: usize = 9;

/// Time and position taken from one RMC sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct RmcData {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub grid_square: String,
}

/// Interpret a decoded RMC sentence.
///
/// Fails with `InvalidFixState` unless the receiver reports status `A`.
pub fn parse_rmc(sentence: &Sentence) -> Result<RmcData> {
    if sentence.kind() != &SentenceKind::Rmc {
        return Err(GpsError::MalformedSentence(format!(
            "expected RMC, got {:?}",
            sentence.kind()
        )));
    }

    let status = sentence.field(STATUS);
    if status != "A" {
        return Err(GpsError::InvalidFixState(status.to_string()));
    }

    let timestamp = parse_timestamp(sentence.field(DATE), sentence.field(TIME))?;

    let latitude = parse_coordinate(
        sentence.field(LATITUDE),
        sentence.field(LAT_HEMISPHERE),
        Axis::Latitude,
    )?;
    let longitude = parse_coordinate(
        sentence.field(LONGITUDE),
        sentence.field(LON_HEMISPHERE),
        Axis::Longitude,
    )?;
    let grid_square = grid::locate(latitude, longitude)?;

    Ok(RmcData {
        timestamp,
        latitude,
        longitude,
        grid_square,
    })
}

/// Build a UTC timestamp from `ddmmyy` and `hhmmss[.ss]`.
///
/// Two-digit years always land in 2000-2099; dates past 2099 cannot be
/// represented. Fractional seconds are dropped.
pub fn parse_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let day = two_digits(date, 0, "day")?;
    let month = two_digits(date, 2, "month")?;
    let year = 2000 + two_digits(date, 4, "year")? as i32;

    let whole_seconds = time.split('.').next().unwrap_or("");
    let hour = two_digits(whole_seconds, 0, "hour")?;
    let minute = two_digits(whole_seconds, 2, "minute")?;
    let second = two_digits(whole_seconds, 4, "second")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            GpsError::MalformedField(format!("date {:?} time {:?} is not a calendar time", date, time))
        })
}

fn two_digits(field: &str, start: usize, what: &str) -> Result<u32> {
    match field.get(start..start + 2) {
        Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => digits
            .parse()
            .map_err(|_| GpsError::MalformedField(format!("{} in {:?}", what, field))),
        _ => Err(GpsError::MalformedField(format!("{} in {:?}", what, field))),
    }
}
