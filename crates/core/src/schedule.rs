//! Recurring schedule configuration: daily or weekly at a wall-clock time.
//!
//! [`ScheduleConfig`] is the draft attached to a not-yet-submitted
//! sequence; [`Schedule`] is the server-confirmed recurring job.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::types::{deserialize_id, deserialize_timestamp, ScheduleId, ScriptId, Timestamp};

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day of the week, serialized as its lowercase English name.
///
/// Ordering follows the calendar week starting on Monday, so a
/// `BTreeSet<Weekday>` iterates in natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = CoreError;

    /// Accepts full names and three-letter abbreviations, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == lower || (lower.len() == 3 && d.as_str().starts_with(&lower)))
            .ok_or_else(|| CoreError::Validation(format!("Unknown weekday '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// ScheduleTime
// ---------------------------------------------------------------------------

/// Wall-clock time of day, 24h, minute precision. Wire form is `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, CoreError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| CoreError::Validation(format!("Invalid time {hour}:{minute}")))
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }
}

impl Default for ScheduleTime {
    fn default() -> Self {
        Self(NaiveTime::MIN)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ScheduleTime {
    type Err = CoreError;

    /// Parses `HH:MM`; a trailing `:SS` from the service is tolerated and
    /// dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map_err(|_| CoreError::Validation(format!("Invalid time '{s}' (expected HH:MM)")))
            .and_then(|t| Self::new(t.hour(), t.minute()))
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ScheduleConfig
// ---------------------------------------------------------------------------

/// Draft recurring-run configuration attached to a sequence submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub frequency: Frequency,
    pub time: ScheduleTime,
    /// Only meaningful when `frequency` is weekly.
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
}

impl ScheduleConfig {
    /// An enabled daily configuration.
    pub fn daily(time: ScheduleTime) -> Self {
        Self {
            enabled: true,
            frequency: Frequency::Daily,
            time,
            days: BTreeSet::new(),
        }
    }

    /// An enabled weekly configuration on the given days.
    pub fn weekly(time: ScheduleTime, days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            enabled: true,
            frequency: Frequency::Weekly,
            time,
            days: days.into_iter().collect(),
        }
    }

    /// Weekly with no days never fires. Not rejected client-side; callers
    /// log it.
    pub fn has_empty_week(&self) -> bool {
        self.frequency == Frequency::Weekly && self.days.is_empty()
    }

    /// Human-readable cadence, e.g. `weekly on monday, friday at 09:00`.
    pub fn describe(&self) -> String {
        describe_cadence(self.frequency, &self.days, self.time)
    }
}

fn describe_cadence(frequency: Frequency, days: &BTreeSet<Weekday>, time: ScheduleTime) -> String {
    match frequency {
        Frequency::Daily => format!("daily at {time}"),
        Frequency::Weekly if days.is_empty() => format!("weekly (no days selected) at {time}"),
        Frequency::Weekly => {
            let names: Vec<&str> = days.iter().map(|d| d.as_str()).collect();
            format!("weekly on {} at {time}", names.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// A server-confirmed recurring job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: ScheduleId,
    #[serde(default)]
    pub scripts: Vec<ScriptId>,
    pub frequency: Frequency,
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
    pub time: ScheduleTime,
    pub enabled: bool,
    /// `None` when the service has nothing scheduled (e.g. disabled).
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub next_run: Option<Timestamp>,
    /// `None` until the schedule has fired at least once.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_run: Option<Timestamp>,
}

impl Schedule {
    pub fn describe(&self) -> String {
        describe_cadence(self.frequency, &self.days, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn time_parses_and_formats() {
        let t: ScheduleTime = "09:00".parse().unwrap();
        assert_eq!(t.to_string(), "09:00");
        let t: ScheduleTime = "7:05".parse().unwrap();
        assert_eq!(t.to_string(), "07:05");
        let t: ScheduleTime = "23:59:30".parse().unwrap();
        assert_eq!(t.to_string(), "23:59");
    }

    #[test]
    fn time_rejects_out_of_range() {
        assert_matches!("24:00".parse::<ScheduleTime>(), Err(CoreError::Validation(_)));
        assert_matches!("noon".parse::<ScheduleTime>(), Err(CoreError::Validation(_)));
        assert_matches!(ScheduleTime::new(12, 60), Err(CoreError::Validation(_)));
    }

    #[test]
    fn weekday_parsing_is_lenient() {
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("fri".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekly_config_wire_shape() {
        let time = "09:00".parse().unwrap();
        let config = ScheduleConfig::weekly(time, [Weekday::Friday, Weekday::Monday]);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "enabled": true,
                "frequency": "weekly",
                "time": "09:00",
                "days": ["monday", "friday"],
            })
        );
    }

    #[test]
    fn describe_cadences() {
        let time = "09:00".parse().unwrap();
        assert_eq!(ScheduleConfig::daily(time).describe(), "daily at 09:00");
        assert_eq!(
            ScheduleConfig::weekly(time, [Weekday::Friday, Weekday::Monday]).describe(),
            "weekly on monday, friday at 09:00"
        );
        let empty = ScheduleConfig::weekly(time, Vec::<Weekday>::new());
        assert!(empty.has_empty_week());
        assert_eq!(empty.describe(), "weekly (no days selected) at 09:00");
    }

    #[test]
    fn default_draft_is_disabled_daily_midnight() {
        let draft = ScheduleConfig::default();
        assert!(!draft.enabled);
        assert_eq!(draft.frequency, Frequency::Daily);
        assert_eq!(draft.time.to_string(), "00:00");
        assert!(!draft.has_empty_week());
    }

    #[test]
    fn schedule_decodes_with_nulls() {
        let s: Schedule = serde_json::from_value(serde_json::json!({
            "id": 3,
            "scripts": ["backup"],
            "frequency": "daily",
            "time": "06:30",
            "enabled": false,
            "next_run": null,
            "last_run": null,
        }))
        .unwrap();
        assert_eq!(s.id, "3");
        assert!(s.days.is_empty());
        assert!(s.next_run.is_none());
        assert_eq!(s.describe(), "daily at 06:30");
    }
}
