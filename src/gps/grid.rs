// src/gps/grid.rs
//! Maidenhead grid square locator

use crate::error::{GpsError, Result};

const UPPER: &[u8; 24] = b"ABCDEFGHIJKLMNOPQRSTUVWX";
const LOWER: &[u8; 24] = b"abcdefghijklmnopqrstuvwx";

/// Convert decimal latitude/longitude to a 6-character Maidenhead locator
/// (field, square, subsquare).
///
/// The poles and the antimeridian are valid inputs: `lat = 90` lands in
/// field row `S`, `lon = 180` in field column `S`. Only magnitudes strictly
/// beyond ±90 / ±180 are rejected.
pub fn locate(lat: f64, lon: f64) -> Result<String> {
    // written as negations so NaN is rejected too
    if !(lat.abs() <= 90.0) || !(lon.abs() <= 180.0) {
        return Err(GpsError::OutOfRange(format!("{}, {}", lat, lon)));
    }

    let adj_lat = lat + 90.0;
    let adj_lon = lon + 180.0;

    let lon_field = (adj_lon / 20.0) as usize;
    let lat_field = (adj_lat / 10.0) as usize;

    let lon_square = ((adj_lon / 2.0) % 10.0) as u8;
    let lat_square = (adj_lat % 10.0) as u8;

    // remainder inside the square: 2 degrees of longitude, 1 of latitude
    let lon_sub = ((adj_lon - 2.0 * (adj_lon / 2.0).trunc()) * 60.0 / 5.0) as usize;
    let lat_sub = ((adj_lat - adj_lat.trunc()) * 60.0 / 2.5) as usize;

    Ok(format!(
        "{}{}{}{}{}{}",
        UPPER[lon_field.min(23)] as char,
        UPPER[lat_field.min(23)] as char,
        lon_square,
        lat_square,
        LOWER[lon_sub.min(23)] as char,
        LOWER[lat_sub.min(23)] as char,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_locations() {
        let cases = [
            ("Budapest", 47.44304, 19.000968, "JN97mk"),
            ("Rio De Janeiro", -22.912328, -43.182617, "GG87jc"),
            ("Washington DC", 38.92, -77.065, "FM18lw"),
            ("McMurdo Station", -77.855, 166.706667, "RB32id"),
        ];
        for (name, lat, lon, want) in cases {
            assert_eq!(locate(lat, lon).unwrap(), want, "{}", name);
        }
    }

    #[test]
    fn test_poles_and_equator() {
        assert_eq!(locate(-90.0, 0.0).unwrap(), "JA00aa");
        assert_eq!(locate(90.0, 0.0).unwrap(), "JS00aa");
        assert_eq!(locate(0.0, 0.0).unwrap(), "JJ00aa");
        assert_eq!(locate(0.0, 180.0).unwrap(), "SJ00aa");
        assert_eq!(locate(0.0, -180.0).unwrap(), "AJ00aa");
    }

    #[test]
    fn test_corners() {
        assert_eq!(locate(90.0, 180.0).unwrap(), "SS00aa");
        assert_eq!(locate(90.0, -180.0).unwrap(), "AS00aa");
        assert_eq!(locate(-90.0, 180.0).unwrap(), "SA00aa");
        assert_eq!(locate(-90.0, -180.0).unwrap(), "AA00aa");
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(locate(91.0, 181.0), Err(GpsError::OutOfRange(_))));
        assert!(matches!(locate(90.000001, 0.0), Err(GpsError::OutOfRange(_))));
        assert!(matches!(locate(0.0, -180.5), Err(GpsError::OutOfRange(_))));
        assert!(matches!(locate(f64::NAN, 0.0), Err(GpsError::OutOfRange(_))));
    }
}
