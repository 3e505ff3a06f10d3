//! "Open now" evaluation over a cafe's weekly schedule.
//!
//! Opening and closing times are naive wall-clock values: they are written,
//! stored and compared exactly as entered, with no timezone conversion. The
//! caller supplies "now" in the same local convention.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    pub fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.as_str(),
            Locale::Id => match self {
                DayOfWeek::Monday => "Senin",
                DayOfWeek::Tuesday => "Selasa",
                DayOfWeek::Wednesday => "Rabu",
                DayOfWeek::Thursday => "Kamis",
                DayOfWeek::Friday => "Jumat",
                DayOfWeek::Saturday => "Sabtu",
                DayOfWeek::Sunday => "Minggu",
            },
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown day of week: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

/// Parses `HH:MM` (or `HH:MM:SS`) wall-clock input.
pub fn parse_wall_clock(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}

pub fn format_wall_clock(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Serde adapter writing `NaiveTime` as `HH:MM`.
pub mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wall_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wall_clock(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected HH:MM, got {raw:?}")))
    }
}

/// The evaluator's view of one opening-hour row. Times are optional so that
/// rows with unparseable input still evaluate (to closed).
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub day: DayOfWeek,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub is_closed: bool,
    pub is_open_24_hours: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusReason {
    OpenNow,
    Open24Hours,
    ClosedNow,
    ClosedToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenStatus {
    pub is_open: bool,
    pub reason: StatusReason,
}

impl OpenStatus {
    fn open(reason: StatusReason) -> Self {
        Self { is_open: true, reason }
    }

    fn closed(reason: StatusReason) -> Self {
        Self { is_open: false, reason }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self.reason) {
            (Locale::En, StatusReason::OpenNow) => "Open Now",
            (Locale::En, StatusReason::Open24Hours) => "Open 24 Hours",
            (Locale::En, StatusReason::ClosedNow) => "Closed Now",
            (Locale::En, StatusReason::ClosedToday) => "Closed Today",
            (Locale::Id, StatusReason::OpenNow) => "Buka Sekarang",
            (Locale::Id, StatusReason::Open24Hours) => "Buka 24 Jam",
            (Locale::Id, StatusReason::ClosedNow) => "Tutup Sekarang",
            (Locale::Id, StatusReason::ClosedToday) => "Tutup Hari Ini",
        }
    }
}

/// Decides whether a cafe is open at `now`, given today's row.
///
/// A window whose close time is not after its open time crosses midnight,
/// so `07:00-00:00` and `18:00-02:00` both use the wraparound comparison.
pub fn evaluate(today: Option<&DaySchedule>, now: NaiveTime) -> OpenStatus {
    let Some(row) = today else {
        return OpenStatus::closed(StatusReason::ClosedToday);
    };
    if row.is_closed {
        return OpenStatus::closed(StatusReason::ClosedToday);
    }
    if row.is_open_24_hours {
        return OpenStatus::open(StatusReason::Open24Hours);
    }
    let (Some(open), Some(close)) = (row.open_time, row.close_time) else {
        return OpenStatus::closed(StatusReason::ClosedNow);
    };

    // Compare at minute resolution.
    let now = truncate_to_minute(now);
    let is_open = if close > open {
        open <= now && now < close
    } else {
        now >= open || now < close
    };

    if is_open {
        OpenStatus::open(StatusReason::OpenNow)
    } else {
        OpenStatus::closed(StatusReason::ClosedNow)
    }
}

/// Picks the row for `now`'s weekday and evaluates it.
pub fn status_at(rows: &[DaySchedule], now: NaiveDateTime) -> OpenStatus {
    let today = DayOfWeek::from(now.weekday());
    evaluate(rows.iter().find(|row| row.day == today), now.time())
}

/// Text for one row of the weekly table.
pub fn display_hours(row: &DaySchedule, locale: Locale) -> String {
    if row.is_closed {
        return match locale {
            Locale::En => "Closed".to_string(),
            Locale::Id => "Tutup".to_string(),
        };
    }
    if row.is_open_24_hours {
        return match locale {
            Locale::En => "24 Hours".to_string(),
            Locale::Id => "24 Jam".to_string(),
        };
    }
    match (row.open_time, row.close_time) {
        (Some(open), Some(close)) => {
            format!("{} - {}", format_wall_clock(open), format_wall_clock(close))
        }
        _ => "-".to_string(),
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
