//! A single scheduled departure.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::time::{TimeError, When, compute_remaining, normalize};

/// One row of a departure board: a line leaving a station for a
/// destination at a scheduled time, with a countdown relative to a
/// reference instant.
///
/// The countdown is minute-granular (always a multiple of 60 seconds,
/// possibly negative) and fixed at construction; a `Departure` never
/// changes afterwards.
///
/// Ordering and equality compare the scheduled instant only, so a list of
/// departures sorts into board order with `sort()` and stays stable for
/// equal times.
#[derive(Debug, Clone)]
pub struct Departure {
    start: String,
    end: String,
    line: String,
    when: NaiveDateTime,
    since: NaiveDateTime,
    remaining: i64,
}

impl Departure {
    /// Build a departure with the current local time as reference.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
    ) -> Result<Self, TimeError> {
        Self::build(start, end, when, line, Local::now().naive_local(), false)
    }

    /// Build a departure against an explicit reference instant.
    pub fn with_since(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
        since: NaiveDateTime,
    ) -> Result<Self, TimeError> {
        Self::build(start, end, when, line, since, false)
    }

    /// Like [`Departure::with_since`], but keep the raw same-day reading
    /// of a time that would otherwise wrap to the next day.
    pub fn same_day(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
        since: NaiveDateTime,
    ) -> Result<Self, TimeError> {
        Self::build(start, end, when, line, since, true)
    }

    fn build(
        start: impl Into<String>,
        end: impl Into<String>,
        when: impl Into<When>,
        line: impl Into<String>,
        since: NaiveDateTime,
        no_add_day: bool,
    ) -> Result<Self, TimeError> {
        let when = normalize(&when.into(), since, no_add_day)?;
        Ok(Self {
            start: start.into(),
            end: end.into(),
            line: line.into(),
            when,
            since,
            remaining: compute_remaining(since, when),
        })
    }

    /// Origin station name.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Destination station name.
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Route or line identifier.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The normalized scheduled instant.
    pub fn when(&self) -> NaiveDateTime {
        self.when
    }

    /// The reference instant the countdown was computed against.
    pub fn since(&self) -> NaiveDateTime {
        self.since
    }

    /// Seconds until departure, minute-truncated; negative when gone.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }
}

impl fmt::Display for Departure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start: {}, End: {}, when: {}, now: {}, line: {}",
            self.start,
            self.end,
            self.when.format("%H:%M"),
            self.since.format("%H:%M"),
            self.line
        )
    }
}

impl PartialEq for Departure {
    fn eq(&self, other: &Self) -> bool {
        self.when == other.when
    }
}

impl Eq for Departure {}

impl Ord for Departure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.when.cmp(&other.when)
    }
}

impl PartialOrd for Departure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Departure {
    // Key set and order are a wire contract for downstream consumers.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Departure", 4)?;
        row.serialize_field("start", &self.start)?;
        row.serialize_field("line", &self.line)?;
        row.serialize_field("end", &self.end)?;
        row.serialize_field("remaining", &self.remaining)?;
        row.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::full_format;
    use chrono::{NaiveDate, TimeZone};

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    const SINCE_TS: i64 = 1_357_092_240;

    fn since_from_ts() -> NaiveDateTime {
        Local.timestamp_opt(SINCE_TS, 0).single().unwrap().naive_local()
    }

    #[test]
    fn timestamp_future() {
        let since = since_from_ts();
        for (delta, expected) in [(45, 0), (80, 60), (150, 120)] {
            let dep =
                Departure::with_since("from", "to", SINCE_TS + delta, "line", since).unwrap();
            assert_eq!(dep.remaining(), expected);
        }
    }

    #[test]
    fn timestamp_now() {
        let since = since_from_ts();
        let dep = Departure::with_since("from", "to", SINCE_TS, "line", since).unwrap();
        assert_eq!(dep.remaining(), 0);
    }

    #[test]
    fn timestamp_past() {
        let since = since_from_ts();
        for (delta, expected) in [(45, -60), (80, -120), (150, -180)] {
            let dep =
                Departure::with_since("from", "to", SINCE_TS - delta, "line", since).unwrap();
            assert_eq!(dep.remaining(), expected);
        }
    }

    #[test]
    fn full_string_future() {
        let since = dt(2013, 1, 2, 3, 4, 0);
        for (delta, expected) in [(45, 0), (80, 60), (150, 120)] {
            let when = full_format(since + chrono::Duration::seconds(delta));
            let dep = Departure::with_since("from", "to", when, "line", since).unwrap();
            assert_eq!(dep.remaining(), expected);
        }
    }

    #[test]
    fn full_string_now() {
        let since = dt(2013, 1, 2, 3, 4, 0);
        let dep =
            Departure::with_since("from", "to", full_format(since), "line", since).unwrap();
        assert_eq!(dep.remaining(), 0);
    }

    #[test]
    fn full_string_past() {
        let since = dt(2013, 1, 2, 3, 4, 0);
        for (delta, expected) in [(45, -60), (80, -120), (150, -180)] {
            let when = full_format(since - chrono::Duration::seconds(delta));
            let dep = Departure::with_since("from", "to", when, "line", since).unwrap();
            assert_eq!(dep.remaining(), expected);
        }
    }

    #[test]
    fn datetime_future_now_past() {
        let since = dt(2013, 1, 2, 3, 4, 0);
        for (delta, expected) in [(150, 120), (80, 60), (45, 0), (0, 0), (-45, -60), (-80, -120), (-150, -180)] {
            let when = since + chrono::Duration::seconds(delta);
            let dep = Departure::with_since("from", "to", when, "line", since).unwrap();
            assert_eq!(dep.remaining(), expected, "delta {delta}");
        }
    }

    #[test]
    fn garbage_suffixed_bare_time_is_accepted() {
        assert!(Departure::new("from", "to", "16:15\n \t*", "line").is_ok());
    }

    #[test]
    fn unparseable_when_is_rejected() {
        let err = Departure::new("from", "to", "[when]", "line").unwrap_err();
        assert!(matches!(err, TimeError::UnrecognizedText(_)));
    }

    #[test]
    fn new_day_rollover() {
        let now = dt(2013, 1, 2, 23, 59, 0);

        let shortly_past_midnight = dt(2013, 1, 2, 0, 1, 2);
        let dep = Departure::with_since("From My Station", "To Your Station", shortly_past_midnight, "A Line", now)
            .unwrap();
        assert_eq!(dep.remaining(), 120);
        let dep = Departure::same_day("From My Station", "To Your Station", shortly_past_midnight, "A Line", now)
            .unwrap();
        assert_eq!(dep.remaining(), -86_280);

        // Exactly half a day back is still this day's board.
        let midday = dt(2013, 1, 2, 11, 59, 0);
        let dep = Departure::with_since("From My Station", "To Your Station", midday, "A Line", now).unwrap();
        assert_eq!(dep.remaining(), -43_200);

        // One second further wraps to tomorrow.
        let just_before_midday = dt(2013, 1, 2, 11, 58, 59);
        let dep = Departure::with_since("From My Station", "To Your Station", just_before_midday, "A Line", now)
            .unwrap();
        assert_eq!(dep.remaining(), 43_140);
        let dep = Departure::same_day("From My Station", "To Your Station", just_before_midday, "A Line", now)
            .unwrap();
        assert_eq!(dep.remaining(), -43_260);
    }

    #[test]
    fn display_layout() {
        let now = dt(2013, 1, 2, 12, 13, 0);
        let when = dt(2013, 1, 2, 12, 15, 0);
        let dep = Departure::with_since("From My Station", "To Your Station", when, "A Line", now).unwrap();
        assert_eq!(
            dep.to_string(),
            "Start: From My Station, End: To Your Station, when: 12:15, now: 12:13, line: A Line"
        );
    }

    #[test]
    fn chronological_order() {
        let since = dt(2013, 1, 2, 3, 0, 0);
        let earlier = Departure::with_since("a", "b", dt(2013, 1, 2, 3, 3, 1), "l", since).unwrap();
        let middle = Departure::with_since("a", "b", dt(2013, 1, 2, 3, 4, 1), "l", since).unwrap();
        let later = Departure::with_since("a", "b", dt(2013, 1, 2, 3, 5, 1), "l", since).unwrap();

        assert_eq!(middle, middle.clone());
        assert_ne!(earlier, later);
        assert!(earlier < middle);
        assert!(later > middle);

        let mut board = vec![
            middle.clone(),
            earlier.clone(),
            later.clone(),
            middle.clone(),
            later.clone(),
            earlier.clone(),
        ];
        board.sort();
        assert_eq!(
            board.iter().map(Departure::when).collect::<Vec<_>>(),
            vec![
                earlier.when(),
                earlier.when(),
                middle.when(),
                middle.when(),
                later.when(),
                later.when()
            ]
        );

        board.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            board.iter().map(Departure::when).collect::<Vec<_>>(),
            vec![
                later.when(),
                later.when(),
                middle.when(),
                middle.when(),
                earlier.when(),
                earlier.when()
            ]
        );
    }

    #[test]
    fn wire_shape() {
        let since = dt(2013, 1, 2, 3, 0, 0);
        let dep =
            Departure::with_since("ZOO", "HBF", dt(2013, 1, 2, 3, 4, 0), "S5", since).unwrap();
        assert_eq!(
            serde_json::to_string(&dep).unwrap(),
            r#"{"start":"ZOO","line":"S5","end":"HBF","remaining":240}"#
        );
    }
}
