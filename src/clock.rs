// src/clock.rs
//! Setting the host clock

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Sets the operating system clock.
pub trait Clock: Send + Sync {
    fn set_system_time(&self, time: DateTime<Utc>) -> Result<()>;
}

/// The platform clock: `SetSystemTime` on Windows, a logged no-op elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl Clock for SystemClock {
    fn set_system_time(&self, time: DateTime<Utc>) -> Result<()> {
        use chrono::{Datelike, Timelike};
        use windows::Win32::{Foundation::SYSTEMTIME, System::SystemInformation::SetSystemTime};

        let systime = SYSTEMTIME {
            wYear: time.year() as u16,
            wMonth: time.month() as u16,
            wDayOfWeek: 0,
            wDay: time.day() as u16,
            wHour: time.hour() as u16,
            wMinute: time.minute() as u16,
            wSecond: time.second() as u16,
            wMilliseconds: 0,
        };

        // SAFETY: systime is a fully initialised SYSTEMTIME that outlives the call
        unsafe { SetSystemTime(&systime) }?;
        log::info!("System time set to {}", time);
        Ok(())
    }
}

#[cfg(not(windows))]
impl Clock for SystemClock {
    fn set_system_time(&self, time: DateTime<Utc>) -> Result<()> {
        log::info!("Not setting system time to {} on this platform", time);
        Ok(())
    }
}
