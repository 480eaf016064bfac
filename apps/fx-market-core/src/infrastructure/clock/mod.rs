//! Zoned Market Clock
//!
//! [`MarketClock`] backed by the IANA timezone database (`chrono-tz`).

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::application::ports::MarketClock;
use crate::domain::session::{MarketClockReading, MarketWeekday};

/// Reference timezone for forex session rules.
pub const DEFAULT_MARKET_TIMEZONE: &str = "America/New_York";

/// Reads instants in a fixed IANA timezone.
#[derive(Debug, Clone)]
pub struct ZonedClock {
    name: String,
    tz: Option<Tz>,
}

impl ZonedClock {
    /// Clock for a timezone identifier.
    ///
    /// An unknown identifier does not fail: the clock reports
    /// [`MarketClockReading::unknown`] for every instant, which evaluates
    /// as closed.
    #[must_use]
    pub fn named(name: &str) -> Self {
        let tz = name.parse::<Tz>().ok();
        if tz.is_none() {
            tracing::warn!(timezone = name, "Unknown market timezone, session will read as closed");
        }
        Self {
            name: name.to_string(),
            tz,
        }
    }

    /// Whether the timezone resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.tz.is_some()
    }
}

impl Default for ZonedClock {
    fn default() -> Self {
        Self::named(DEFAULT_MARKET_TIMEZONE)
    }
}

impl MarketClock for ZonedClock {
    #[allow(clippy::cast_possible_truncation)]
    fn read(&self, instant: DateTime<Utc>) -> MarketClockReading {
        let Some(tz) = self.tz else {
            return MarketClockReading::unknown();
        };

        let local = instant.with_timezone(&tz);
        MarketClockReading::new(
            MarketWeekday::from(local.weekday()),
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
        )
    }

    fn timezone(&self) -> &str {
        &self.name
    }
}
