use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// The seven recurring weekdays an availability window can fall on.
/// Serialized as the lowercase English day name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        };
        write!(f, "{}", name)
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
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

/// A stored recurring weekly window during which a doctor accepts
/// appointments. Windows may overlap or duplicate each other; each is
/// checked independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// One window as submitted by a doctor. Times are accepted in 24-hour
/// ("13:00:00") or 12-hour ("01:00:00PM") form and normalized on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindowInput {
    pub day_of_week: DayOfWeek,
    #[serde(deserialize_with = "deserialize_flexible_time")]
    pub start_time: NaiveTime,
    #[serde(deserialize_with = "deserialize_flexible_time")]
    pub end_time: NaiveTime,
}

pub fn parse_flexible_time(value: &str) -> Option<NaiveTime> {
    let upper = value.trim().to_uppercase();
    NaiveTime::parse_from_str(&upper, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&upper, "%H:%M"))
        .or_else(|_| NaiveTime::parse_from_str(&upper, "%I:%M:%S%p"))
        .or_else(|_| NaiveTime::parse_from_str(&upper, "%I:%M:%S %p"))
        .ok()
}

fn deserialize_flexible_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized time format: {}", raw)))
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
