//! # Service Window
//!
//! Decides whether "now" falls inside the daily window during which the board shows
//! slides. The comparison works on the zero-padded `HH:MM` time of day, inclusive on
//! both ends, so a window of `06:00`–`07:15` is active from 06:00:00 through 07:15:59.
//!
//! No timezone conversion happens here: "now" is whatever local time the caller passes
//! in, normally the host clock. Windows never wrap past midnight.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use thiserror::Error;

/// Errors raised while building a [`ServiceWindow`] from configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("service window starts at {start} but ends earlier at {end}")]
    Inverted { start: String, end: String },
}

/// Daily `[start, end]` interval, minute resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ServiceWindow {
    /// Build a window from two `HH:MM` strings.
    ///
    /// # Example
    /// ```
    /// use morning_board_lib::schedule::ServiceWindow;
    ///
    /// let window = ServiceWindow::parse("06:00", "07:15").unwrap();
    /// assert_eq!(window.to_string(), "06:00-07:15");
    /// assert!(ServiceWindow::parse("08:00", "07:00").is_err());
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        let start_time = parse_hh_mm(start)?;
        let end_time = parse_hh_mm(end)?;
        if start_time > end_time {
            return Err(WindowError::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            start: start_time,
            end: end_time,
        })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True when the minute of `time` lies within the window, both ends included.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let minute = truncate_to_minute(time);
        self.start <= minute && minute <= self.end
    }
}

impl std::fmt::Display for ServiceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Extra rules layered on top of the time comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Treat every moment as service time (manual override / testing)
    pub force: bool,
    /// Skip Saturdays and Sundays
    pub weekdays_only: bool,
}

/// Is the board supposed to be showing slides right now?
///
/// The `force` override wins before any time comparison is made.
pub fn is_service_time(now: NaiveDateTime, window: &ServiceWindow, policy: &WindowPolicy) -> bool {
    if policy.force {
        return true;
    }
    if policy.weekdays_only && matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    window.contains(now.time())
}

/// Parse a zero-padded 24h `HH:MM` time of day.
pub fn parse_hh_mm(value: &str) -> Result<NaiveTime, WindowError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| WindowError::InvalidTime(value.to_string()))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
