//! Identifier aliases and tolerant serde helpers shared by every payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Name of a runnable script, as listed by the execution service catalog.
pub type ScriptId = String;

/// Opaque task identifier assigned by the execution service.
pub type TaskId = String;

/// Opaque schedule identifier assigned by the execution service.
pub type ScheduleId = String;

/// All timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Identifiers arrive either as JSON strings or as integers depending on
/// the service version; both are kept as strings client-side.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

/// Deserialize an opaque identifier that may be a string or an integer.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// Deserialize an optional identifier (`null` and absent both map to `None`).
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    }))
}

/// Parse a timestamp in any of the shapes the execution service emits.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]+HH:MM`, and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.f]` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Deserialize an optional timestamp, mapping unparseable text to `None`
/// so that one odd field never fails a whole poll.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let parsed = parse_timestamp(&s);
        if parsed.is_none() {
            tracing::debug!(raw = %s, "Ignoring unparseable timestamp");
        }
        parsed
    }))
}
