//! Departure time normalization.
//!
//! Upstream departure boards report times in several lossy shapes: epoch
//! seconds, a full `"YYYY-MM-DD HH:MM:SS"` rendering, a bare `"HH:MM"`
//! cell (often with stray markup characters attached), or an already
//! structured datetime. This module absorbs all of them into one naive
//! local instant, minute-precise, and decides whether a bare clock time
//! read shortly before midnight belongs to the next day.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

/// Rendering used for full datetime strings, `"2013-01-02 03:04:05"`.
const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of a [`FULL_FORMAT`] rendering.
const FULL_LEN: usize = 19;

/// Length of a bare `"HH:MM"` clock time.
const HHMM_LEN: usize = 5;

/// Threshold for assuming a departure is on the next day.
///
/// A board never shows anything further than half a day in the past; a
/// candidate instant below this is taken to have wrapped past midnight.
const ROLLOVER_THRESHOLD_SECS: i64 = 12 * 60 * 60;

/// Error returned when a `when` input cannot be resolved to an instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// Text that matches neither the full nor the bare clock-time format.
    #[error("unrecognized time text: {0:?}")]
    UnrecognizedText(String),

    /// Epoch seconds outside the representable datetime range.
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    /// Date arithmetic left the representable range.
    #[error("date out of range")]
    DateOutOfRange,
}

/// A scheduled-time input in one of the shapes upstream sources produce.
///
/// The set of shapes is closed; anything else is a compile error rather
/// than a runtime check.
///
/// # Examples
///
/// ```
/// use abfahrt::domain::When;
/// use chrono::NaiveDate;
///
/// let from_text: When = "16:15".into();
/// assert_eq!(from_text, When::Text("16:15".to_owned()));
///
/// let dt = NaiveDate::from_ymd_opt(2013, 1, 2)
///     .unwrap()
///     .and_hms_opt(3, 4, 0)
///     .unwrap();
/// assert_eq!(When::from(dt), When::Instant(dt));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum When {
    /// Whole epoch seconds, interpreted in local time.
    Timestamp(i64),
    /// A full `"YYYY-MM-DD HH:MM:SS"` rendering or a bare `"HH:MM"` clock
    /// time; trailing garbage after the recognized prefix is ignored.
    Text(String),
    /// An already-structured instant.
    Instant(NaiveDateTime),
}

impl From<i64> for When {
    fn from(secs: i64) -> Self {
        When::Timestamp(secs)
    }
}

impl From<&str> for When {
    fn from(text: &str) -> Self {
        When::Text(text.to_owned())
    }
}

impl From<String> for When {
    fn from(text: String) -> Self {
        When::Text(text)
    }
}

impl From<NaiveDateTime> for When {
    fn from(instant: NaiveDateTime) -> Self {
        When::Instant(instant)
    }
}

/// Render an instant in the full datetime format.
pub fn full_format(instant: NaiveDateTime) -> String {
    instant.format(FULL_FORMAT).to_string()
}

/// Seconds from `since` to `when`, truncated to minute granularity.
///
/// Both instants are floored to the minute before differencing, so the
/// result is always a multiple of 60 and antisymmetric in its arguments.
/// This models a departure board that only shows minutes.
///
/// # Examples
///
/// ```
/// use abfahrt::domain::compute_remaining;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap();
/// let since = day.and_hms_opt(3, 4, 59).unwrap();
/// let when = day.and_hms_opt(3, 5, 0).unwrap();
///
/// assert_eq!(compute_remaining(since, when), 60);
/// assert_eq!(compute_remaining(when, since), -60);
/// ```
pub fn compute_remaining(since: NaiveDateTime, when: NaiveDateTime) -> i64 {
    (floor_to_minute(when) - floor_to_minute(since)).num_seconds()
}

/// Resolve a [`When`] against the reference instant `since`.
///
/// Bare clock times borrow their date from `since`. If the candidate ends
/// up more than half a day in the past (minute-truncated), it is assumed
/// to be scheduled for the next day and advanced by one day, unless
/// `no_add_day` keeps the raw same-day reading.
///
/// # Examples
///
/// ```
/// use abfahrt::domain::normalize;
/// use chrono::NaiveDate;
///
/// let since = NaiveDate::from_ymd_opt(2013, 1, 2)
///     .unwrap()
///     .and_hms_opt(23, 59, 0)
///     .unwrap();
///
/// // One minute past midnight: that is tomorrow, not 24 hours ago.
/// let when = normalize(&"00:01".into(), since, false).unwrap();
/// assert_eq!(when.date(), NaiveDate::from_ymd_opt(2013, 1, 3).unwrap());
///
/// let same_day = normalize(&"00:01".into(), since, true).unwrap();
/// assert_eq!(same_day.date(), since.date());
/// ```
pub fn normalize(
    when: &When,
    since: NaiveDateTime,
    no_add_day: bool,
) -> Result<NaiveDateTime, TimeError> {
    let candidate = match when {
        When::Timestamp(secs) => local_from_timestamp(*secs)?,
        When::Text(text) => parse_text(text, since.date())?,
        When::Instant(instant) => *instant,
    };

    if no_add_day || compute_remaining(since, candidate) >= -ROLLOVER_THRESHOLD_SECS {
        Ok(candidate)
    } else {
        candidate
            .checked_add_signed(Duration::days(1))
            .ok_or(TimeError::DateOutOfRange)
    }
}

fn floor_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|i| i.with_nanosecond(0))
        .unwrap_or(instant)
}

fn local_from_timestamp(secs: i64) -> Result<NaiveDateTime, TimeError> {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.naive_local())
        .ok_or(TimeError::TimestampOutOfRange(secs))
}

fn parse_text(text: &str, base: NaiveDate) -> Result<NaiveDateTime, TimeError> {
    let trimmed = text.trim();

    if let Some(prefix) = trimmed.get(..FULL_LEN) {
        if let Ok(instant) = NaiveDateTime::parse_from_str(prefix, FULL_FORMAT) {
            return Ok(instant);
        }
    }

    if let Some(prefix) = trimmed.get(..HHMM_LEN) {
        if let Ok(time) = NaiveTime::parse_from_str(prefix, "%H:%M") {
            return Ok(base.and_time(time));
        }
    }

    Err(TimeError::UnrecognizedText(text.to_owned()))
}
