// src/gps/nmea/gga.rs
//! GGA (Global Positioning System Fix Data) sentence

use super::sentence::{Sentence, SentenceKind};
use crate::error::{GpsError, Result};
use crate::gps::data::FixQuality;

const QUALITY: usize = 6;
const SATELLITES: usize = 7;
const HDOP: usize = 8;

/// Fix quality figures taken from one GGA sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct GgaData {
    pub fix_quality: FixQuality,
    pub satellites: u32,
    pub hdop: f64,
}

/// Interpret a decoded GGA sentence.
///
/// Quality codes outside 0-8 read as `FixQuality::Unknown`; a field that is
/// not a number voids the whole result.
pub fn parse_gga(sentence: &Sentence) -> Result<GgaData> {
    if sentence.kind() != &SentenceKind::Gga {
        return Err(GpsError::MalformedSentence(format!(
            "expected GGA, got {:?}",
            sentence.kind()
        )));
    }

    let code = sentence.field(QUALITY);
    let fix_quality = code
        .parse::<u32>()
        .map(FixQuality::from_code)
        .map_err(|_| GpsError::MalformedField(format!("fix quality {:?}", code)))?;

    let satellites = sentence.field(SATELLITES);
    let satellites = satellites
        .parse::<u32>()
        .map_err(|_| GpsError::MalformedField(format!("satellite count {:?}", satellites)))?;

    let hdop = sentence.field(HDOP);
    let hdop = match hdop.parse::<f64>() {
        Ok(h) if h.is_finite() && h >= 0.0 => h,
        _ => return Err(GpsError::MalformedField(format!("hdop {:?}", hdop))),
    };

    Ok(GgaData {
        fix_quality,
        satellites,
        hdop,
    })
}
