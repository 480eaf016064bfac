//! Forex Session Rules
//!
//! Turns a market clock reading into an open/closed decision under the
//! weekly forex trading-hours rule. All hours are in the market timezone.
//!
//! # Trading Week
//!
//! | Day            | Open when                     |
//! |----------------|-------------------------------|
//! | Monday–Thursday| always                        |
//! | Friday         | `hour < close_hour_friday`    |
//! | Saturday       | never                         |
//! | Sunday         | `hour >= open_hour_sunday`    |
//! | Unknown        | never                         |
//!
//! Nothing is cached: every call recomputes from the instant, so there is no
//! missed-transition state to drift.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::MarketClock;

// =============================================================================
// Clock Reading
// =============================================================================

/// Day of the week as seen in the market timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketWeekday {
    /// Sunday.
    Sunday,
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// The clock could not resolve the day.
    Unknown,
}

impl MarketWeekday {
    /// Index with Sunday = 0, or -1 for [`MarketWeekday::Unknown`].
    #[must_use]
    pub const fn index(self) -> i8 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
            Self::Unknown => -1,
        }
    }

    /// English day name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<chrono::Weekday> for MarketWeekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

/// Wall-clock reading in the market timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketClockReading {
    /// Day of the week.
    pub weekday: MarketWeekday,
    /// Hour, 0..=23.
    pub hour: u8,
    /// Minute, 0..=59.
    pub minute: u8,
    /// Second, 0..=59.
    pub second: u8,
}

impl MarketClockReading {
    /// Create a reading.
    #[must_use]
    pub const fn new(weekday: MarketWeekday, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            weekday,
            hour,
            minute,
            second,
        }
    }

    /// Reading produced when the timezone cannot be resolved.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(MarketWeekday::Unknown, 0, 0, 0)
    }

    /// Time of day as `HH:MM:SS`.
    #[must_use]
    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// =============================================================================
// Session Hours
// =============================================================================

/// Default Sunday open hour (market time).
pub const DEFAULT_OPEN_HOUR_SUNDAY: u8 = 17;

/// Default Friday close hour (market time).
pub const DEFAULT_CLOSE_HOUR_FRIDAY: u8 = 17;

/// Weekly boundary hours. Both are clamped to `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHours {
    open_hour_sunday: u8,
    close_hour_friday: u8,
}

impl SessionHours {
    /// Create session hours, clamping both values to `0..=23`.
    #[must_use]
    pub fn new(open_hour_sunday: u8, close_hour_friday: u8) -> Self {
        Self {
            open_hour_sunday: open_hour_sunday.min(23),
            close_hour_friday: close_hour_friday.min(23),
        }
    }

    /// Hour at which the market opens on Sunday.
    #[must_use]
    pub const fn open_hour_sunday(&self) -> u8 {
        self.open_hour_sunday
    }

    /// Hour at which the market closes on Friday.
    #[must_use]
    pub const fn close_hour_friday(&self) -> u8 {
        self.close_hour_friday
    }
}

impl Default for SessionHours {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_HOUR_SUNDAY, DEFAULT_CLOSE_HOUR_FRIDAY)
    }
}

/// Apply the weekly trading rule to a reading.
#[must_use]
pub const fn is_session_open(reading: &MarketClockReading, hours: &SessionHours) -> bool {
    match reading.weekday {
        MarketWeekday::Monday
        | MarketWeekday::Tuesday
        | MarketWeekday::Wednesday
        | MarketWeekday::Thursday => true,
        MarketWeekday::Friday => reading.hour < hours.close_hour_friday,
        MarketWeekday::Sunday => reading.hour >= hours.open_hour_sunday,
        MarketWeekday::Saturday | MarketWeekday::Unknown => false,
    }
}

// =============================================================================
// Market Status
// =============================================================================

/// Why the market is in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusReason {
    /// Market is open.
    Open,
    /// Weekend closure (Friday after close, Saturday, Sunday before open).
    Weekend,
    /// Closed for any other reason (unresolved day).
    Closed,
}

impl StatusReason {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Weekend => "weekend",
            Self::Closed => "closed",
        }
    }
}

/// Snapshot of the market session at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    /// Whether trading is open.
    pub is_open: bool,
    /// Reason for the state.
    pub reason: StatusReason,
    /// Market timezone identifier.
    pub timezone: String,
    /// Day name in the market timezone.
    pub market_day: String,
    /// Time of day in the market timezone, `HH:MM:SS`.
    pub market_time: String,
}

impl MarketStatus {
    /// Build a status from a reading.
    #[must_use]
    pub fn from_reading(reading: &MarketClockReading, hours: &SessionHours, timezone: &str) -> Self {
        let is_open = is_session_open(reading, hours);
        let reason = if is_open {
            StatusReason::Open
        } else {
            match reading.weekday {
                MarketWeekday::Friday | MarketWeekday::Saturday | MarketWeekday::Sunday => {
                    StatusReason::Weekend
                }
                _ => StatusReason::Closed,
            }
        };

        Self {
            is_open,
            reason,
            timezone: timezone.to_string(),
            market_day: reading.weekday.name().to_string(),
            market_time: reading.time_string(),
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates the forex session for instants, reading time through a
/// [`MarketClock`].
#[derive(Debug, Clone)]
pub struct MarketSessionEvaluator<C> {
    clock: C,
    hours: SessionHours,
}

impl<C: MarketClock> MarketSessionEvaluator<C> {
    /// Create an evaluator.
    #[must_use]
    pub const fn new(clock: C, hours: SessionHours) -> Self {
        Self { clock, hours }
    }

    /// Whether the market is open at `instant`.
    #[must_use]
    pub fn is_open(&self, instant: DateTime<Utc>) -> bool {
        is_session_open(&self.clock.read(instant), &self.hours)
    }

    /// Full status at `instant`.
    #[must_use]
    pub fn status(&self, instant: DateTime<Utc>) -> MarketStatus {
        let reading = self.clock.read(instant);
        MarketStatus::from_reading(&reading, &self.hours, self.clock.timezone())
    }

    /// Whether the market is open right now.
    #[must_use]
    pub fn is_open_now(&self) -> bool {
        self.is_open(Utc::now())
    }

    /// Status right now.
    #[must_use]
    pub fn status_now(&self) -> MarketStatus {
        self.status(Utc::now())
    }

    /// Configured session hours.
    #[must_use]
    pub const fn hours(&self) -> &SessionHours {
        &self.hours
    }

    /// Underlying clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}
