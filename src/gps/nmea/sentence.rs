// src/gps/nmea/sentence.rs
//! NMEA-0183 sentence framing and checksum validation

use crate::error::{GpsError, Result};

/// Sentence types this crate understands. The two-character talker prefix
/// (GP, GN, GL, ...) is stripped before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceKind {
    Rmc,
    Gga,
    Other(String),
}

impl SentenceKind {
    fn from_formatter(formatter: &str) -> Self {
        match formatter {
            "RMC" => SentenceKind::Rmc,
            "GGA" => SentenceKind::Gga,
            other => SentenceKind::Other(other.to_string()),
        }
    }

    /// Minimum number of comma-separated fields, address included
    pub fn min_fields(&self) -> usize {
        match self {
            SentenceKind::Rmc => 11,
            SentenceKind::Gga => 8,
            SentenceKind::Other(_) => 1,
        }
    }
}

/// A checksum-verified sentence split into its fields.
///
/// Field 0 is the address (`GNRMC`); the checksum suffix is not part of any field.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    talker: String,
    kind: SentenceKind,
    fields: Vec<String>,
}

impl Sentence {
    /// Decode the text between two `$` frame delimiters.
    ///
    /// A leading `$` and trailing whitespace (the `\r\n` line ending) are
    /// tolerated. Field count is checked before the checksum so that a
    /// truncated sentence reports as malformed rather than unchecked.
    pub fn decode(frame: &str) -> Result<Self> {
        let frame = frame.strip_prefix('$').unwrap_or(frame).trim_end();
        let (body, declared) = match frame.split_once('*') {
            Some((body, declared)) => (body, Some(declared)),
            None => (frame, None),
        };

        let fields: Vec<String> = body.split(',').map(str::to_string).collect();

        let address = &fields[0];
        let (talker, formatter) = match (address.get(..2), address.get(2..)) {
            (Some(talker), Some(formatter)) if !formatter.is_empty() => {
                (talker.to_string(), formatter)
            }
            _ => {
                return Err(GpsError::MalformedSentence(format!(
                    "unrecognised address {:?}",
                    address
                )))
            }
        };
        let kind = SentenceKind::from_formatter(formatter);

        if fields.len() < kind.min_fields() {
            return Err(GpsError::MalformedSentence(format!(
                "{} has {} fields, need at least {}",
                address,
                fields.len(),
                kind.min_fields()
            )));
        }

        let declared = match declared {
            Some(d) if d.len() == 2 && d.bytes().all(|b| b.is_ascii_hexdigit()) => d,
            _ => return Err(GpsError::MissingChecksum),
        };

        let expected = format_checksum(checksum(body));
        if expected != declared {
            return Err(GpsError::BadChecksum {
                expected,
                declared: declared.to_string(),
            });
        }

        Ok(Self {
            talker,
            kind,
            fields,
        })
    }

    pub fn talker(&self) -> &str {
        &self.talker
    }

    pub fn kind(&self) -> &SentenceKind {
        &self.kind
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field by 0-based index; absent trailing fields read as empty.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Running XOR over every byte of the sentence body (between `$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Two-digit uppercase hex, as it appears after the `*`.
pub fn format_checksum(sum: u8) -> String {
    format!("{:02X}", sum)
}

/// Append a valid checksum to a sentence body.
pub fn frame(body: &str) -> String {
    format!("{}*{}", body, format_checksum(checksum(body)))
}
