// src/gps/store.rs
//! Shared holder for the last committed fix

use super::data::{self, Fix, FixQuality};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Concurrency-safe holder of the latest committed [`Fix`].
///
/// Commits swap in a whole new snapshot, so `get` never returns a mix of two
/// commits. The per-field accessors each take their own snapshot; two calls
/// may straddle a commit.
#[derive(Debug, Default)]
pub struct FixStore {
    current: RwLock<Arc<Fix>>,
}

impl FixStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a given fix
    pub fn with_fix(fix: Fix) -> Self {
        Self {
            current: RwLock::new(Arc::new(fix)),
        }
    }

    /// The currently committed fix
    pub fn get(&self) -> Arc<Fix> {
        // a panicking writer cannot leave a half-built snapshot behind
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the committed fix
    pub fn commit(&self, fix: Fix) {
        let fix = Arc::new(fix);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = fix;
    }

    pub fn status(&self) -> String {
        self.get().status().to_string()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.get().timestamp()
    }

    pub fn grid_square(&self) -> String {
        self.get().grid_square().to_string()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.get().latitude()
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get().longitude()
    }

    pub fn fix_quality(&self) -> Option<FixQuality> {
        self.get().fix_quality()
    }

    pub fn satellites(&self) -> Option<u32> {
        self.get().satellites()
    }

    pub fn hdop(&self) -> Option<f64> {
        self.get().hdop()
    }

    pub fn format_status(&self) -> String {
        data::format_status(&self.status())
    }

    pub fn format_time(&self) -> String {
        data::format_time(self.timestamp())
    }

    pub fn format_grid_square(&self) -> String {
        self.grid_square()
    }

    pub fn format_latitude(&self) -> String {
        data::format_coordinate(self.latitude(), 90.0)
    }

    pub fn format_longitude(&self) -> String {
        data::format_coordinate(self.longitude(), 180.0)
    }

    pub fn format_fix_quality(&self) -> String {
        data::format_value(self.fix_quality())
    }

    pub fn format_satellites(&self) -> String {
        data::format_value(self.satellites())
    }

    pub fn format_hdop(&self) -> String {
        data::format_value(self.hdop())
    }
}
