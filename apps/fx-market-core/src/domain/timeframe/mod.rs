//! Timeframe Normalization
//!
//! Parses loosely formatted timeframe strings (`"M15"`, `"1hr"`, `" D1 "`)
//! into a canonical `<count><unit>` interval, and sizes the default
//! footprint window for an interval.
//!
//! A zero count (`"0m"`) is syntactically valid here; rejecting zero-length
//! intervals is left to callers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static PREFIXED: LazyLock<Regex> = LazyLock::new(|| compile(r"^([mhd])(\d+)$"));
static SUFFIXED: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\d+)([mhd])$"));
static HOUR_ALIAS: LazyLock<Regex> = LazyLock::new(|| compile(r"hours|hour|hrs|hr"));
static MINUTE_ALIAS: LazyLock<Regex> = LazyLock::new(|| compile(r"minutes|minute|mins|min"));
static DAY_ALIAS: LazyLock<Regex> = LazyLock::new(|| compile(r"days|day"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static timeframe pattern is valid")
}

/// Fallback window size for intervals without a table entry.
pub const DEFAULT_FOOTPRINT_POINTS: u32 = 180;

// =============================================================================
// Types
// =============================================================================

/// Unit of a canonical interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    /// Minutes.
    Minute,
    /// Hours.
    Hour,
    /// Days.
    Day,
}

impl IntervalUnit {
    const fn from_letter(letter: &str) -> Option<Self> {
        match letter.as_bytes() {
            b"m" => Some(Self::Minute),
            b"h" => Some(Self::Hour),
            b"d" => Some(Self::Day),
            _ => None,
        }
    }

    /// Single-letter suffix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
        }
    }
}

/// Canonical interval such as `15m`, `4h` or `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalInterval {
    count: u32,
    unit: IntervalUnit,
}

impl CanonicalInterval {
    /// Number of units.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Interval unit.
    #[must_use]
    pub const fn unit(&self) -> IntervalUnit {
        self.unit
    }
}

impl fmt::Display for CanonicalInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.as_str())
    }
}

/// Error returned when a string is not a recognizable timeframe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized timeframe: {0:?}")]
pub struct InvalidTimeframe(pub String);

impl FromStr for CanonicalInterval {
    type Err = InvalidTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s).ok_or_else(|| InvalidTimeframe(s.to_string()))
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalize a timeframe string.
///
/// Returns `None` when the input cannot be read as a timeframe.
///
/// ```
/// use fx_market_core::domain::timeframe::normalize;
///
/// assert_eq!(normalize("M15").unwrap().to_string(), "15m");
/// assert_eq!(normalize("1hr").unwrap().to_string(), "1h");
/// assert!(normalize("bogus").is_none());
/// ```
#[must_use]
pub fn normalize(input: &str) -> Option<CanonicalInterval> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let compact: String = trimmed
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if let Some(caps) = PREFIXED.captures(&compact) {
        return build(&caps[2], &caps[1]);
    }

    let expanded = HOUR_ALIAS.replace_all(&compact, "h");
    let expanded = MINUTE_ALIAS.replace_all(&expanded, "m");
    let expanded = DAY_ALIAS.replace_all(&expanded, "d");

    let caps = SUFFIXED.captures(&expanded)?;
    build(&caps[1], &caps[2])
}

fn build(digits: &str, letter: &str) -> Option<CanonicalInterval> {
    Some(CanonicalInterval {
        count: digits.parse().ok()?,
        unit: IntervalUnit::from_letter(letter)?,
    })
}

/// Default number of historical bars to request for an interval.
#[must_use]
pub const fn default_points(interval: &CanonicalInterval) -> u32 {
    match (interval.count, interval.unit) {
        (1, IntervalUnit::Minute) => 360,
        (15, IntervalUnit::Minute) | (1 | 4, IntervalUnit::Hour) => 240,
        (1, IntervalUnit::Day) => 180,
        _ => DEFAULT_FOOTPRINT_POINTS,
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("M15", Some("15m") ; "minute prefix")]
    #[test_case("H4", Some("4h") ; "hour prefix")]
    #[test_case("1hr", Some("1h") ; "hr alias")]
    #[test_case("  D1 ", Some("1d") ; "padded day prefix")]
    #[test_case("15 minutes", Some("15m") ; "spelled minutes")]
    #[test_case("2 Hours", Some("2h") ; "spelled hours")]
    #[test_case("3days", Some("3d") ; "spelled days")]
    #[test_case("m015", Some("15m") ; "leading zeros stripped")]
    #[test_case("0m", Some("0m") ; "zero accepted")]
    #[test_case("1h", Some("1h") ; "already canonical")]
    #[test_case("garbage", None ; "garbage")]
    #[test_case("bogus", None ; "bogus")]
    #[test_case("", None ; "empty")]
    #[test_case("   ", None ; "blank")]
    #[test_case("15", None ; "missing unit")]
    #[test_case("1w", None ; "unsupported unit")]
    #[test_case("h", None ; "missing digits")]
    #[test_case("m99999999999", None ; "overflowing count")]
    fn normalizes(input: &str, expected: Option<&str>) {
        assert_eq!(normalize(input).map(|i| i.to_string()).as_deref(), expected);
    }

    #[test_case("1m", 360)]
    #[test_case("15m", 240)]
    #[test_case("1h", 240)]
    #[test_case("4h", 240)]
    #[test_case("1d", 180)]
    #[test_case("5m", 180 ; "fallback")]
    fn default_points_table(interval: &str, points: u32) {
        let interval: CanonicalInterval = interval.parse().unwrap();
        assert_eq!(default_points(&interval), points);
    }

    #[test]
    fn from_str_reports_input() {
        let err = "nope".parse::<CanonicalInterval>().unwrap_err();
        assert_eq!(err, InvalidTimeframe("nope".to_string()));
    }

    #[test]
    fn accessors() {
        let interval = normalize("H4").unwrap();
        assert_eq!(interval.count(), 4);
        assert_eq!(interval.unit(), IntervalUnit::Hour);
    }
}
