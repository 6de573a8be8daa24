// src/gps/mod.rs
//! GPS fix data, parsing and storage

pub mod data;
pub mod grid;
pub mod nmea;
pub mod store;

pub use data::{Fix, FixQuality};
pub use store::FixStore;
