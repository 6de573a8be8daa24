// src/error.rs
//! Error types for gps-timesync

use std::fmt;

pub type Result<T> = std::result::Result<T, GpsError>;

#[derive(Debug)]
pub enum GpsError {
    /// Wrong field count or unrecognisable sentence address
    MalformedSentence(String),
    /// No single `*HH` checksum suffix
    MissingChecksum,
    BadChecksum { expected: String, declared: String },
    /// Receiver status field is not `A`
    InvalidFixState(String),
    MalformedField(String),
    OutOfRange(String),
    Transport(String),
    Clock(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(String),
    Other(String),
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsError::MalformedSentence(msg) => write!(f, "malformed sentence: {}", msg),
            GpsError::MissingChecksum => write!(f, "missing checksum"),
            GpsError::BadChecksum { expected, declared } => {
                write!(f, "bad checksum: computed {}, sentence declares {}", expected, declared)
            }
            GpsError::InvalidFixState(state) => {
                write!(f, "receiver not in valid state (status {:?})", state)
            }
            GpsError::MalformedField(msg) => write!(f, "malformed field: {}", msg),
            GpsError::OutOfRange(msg) => write!(f, "invalid location: {}", msg),
            GpsError::Transport(msg) => write!(f, "transport error: {}", msg),
            GpsError::Clock(msg) => write!(f, "clock error: {}", msg),
            GpsError::Io(e) => write!(f, "IO error: {}", e),
            GpsError::Json(e) => write!(f, "JSON error: {}", e),
            GpsError::Config(msg) => write!(f, "configuration error: {}", msg),
            GpsError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for GpsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpsError::Io(e) => Some(e),
            GpsError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GpsError {
    fn from(error: std::io::Error) -> Self {
        GpsError::Io(error)
    }
}

impl From<tokio_serial::Error> for GpsError {
    fn from(error: tokio_serial::Error) -> Self {
        GpsError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for GpsError {
    fn from(error: serde_json::Error) -> Self {
        GpsError::Json(error)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for GpsError {
    fn from(error: windows::core::Error) -> Self {
        GpsError::Clock(error.to_string())
    }
}

impl From<anyhow::Error> for GpsError {
    fn from(error: anyhow::Error) -> Self {
        GpsError::Other(error.to_string())
    }
}
