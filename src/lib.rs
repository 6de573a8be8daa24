// src/lib.rs
//! gps-timesync library
//!
//! Reads NMEA-0183 RMC and GGA sentences from a serial GPS receiver, keeps
//! the last good fix (time, position, Maidenhead grid square, fix quality)
//! and uses it to set the host clock.

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod gate;
pub mod gather;
pub mod gps;
pub mod scheduler;
pub mod transport;

// Re-export main types for convenience
pub use clock::{Clock, SystemClock};
pub use config::{GpsConfig, PartialFailurePolicy};
pub use error::{GpsError, Result};
pub use gate::ExclusiveGate;
pub use gather::{GatherSettings, Gatherer};
pub use gps::{Fix, FixQuality, FixStore};
pub use transport::{LineReader, SerialTransport, Transport};
