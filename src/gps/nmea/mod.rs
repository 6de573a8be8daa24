// src/gps/nmea/mod.rs
//! NMEA-0183 RMC and GGA sentence parsing

pub mod coords;
pub mod gga;
pub mod rmc;
pub mod sentence;

pub use gga::{parse_gga, GgaData};
pub use rmc::{parse_rmc, RmcData};
pub use sentence::{Sentence, SentenceKind};
