use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking request as it arrives over the wire. The appointment time is kept
/// raw here and normalized by `parse_appointment_time` before any core step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_time: String,
}

/// Normalize a raw appointment timestamp into an absolute instant. Accepts a
/// 12-hour form with an AM/PM marker ("2024-01-01 01:00:00 PM", marker case
/// and the space before it both optional) and the usual ISO-like 24-hour
/// forms. Naive values are taken as UTC.
pub fn parse_appointment_time(raw: &str) -> Result<DateTime<Utc>, SchedulingError> {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    if let Ok(naive) = NaiveDateTime::parse_from_str(&upper, "%Y-%m-%d %I:%M:%S %p")
        .or_else(|_| NaiveDateTime::parse_from_str(&upper, "%Y-%m-%d %I:%M:%S%p"))
    {
        return Ok(naive.and_utc());
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|_| SchedulingError::BadTimeFormat(raw.to_string()))
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("The requested time slot is outside the doctor's availability")]
    OutsideAvailability,

    #[error("This time slot is already booked")]
    SlotTaken,

    #[error("Not authorized to modify this appointment")]
    Forbidden,

    #[error("Cannot cancel an appointment with status '{0}'")]
    InvalidTransition(AppointmentStatus),

    #[error("Unrecognized appointment time format: {0}")]
    BadTimeFormat(String),

    #[error("Database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_12_hour_time() {
        let parsed = parse_appointment_time("2024-01-01 01:00:00 PM").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap());
    }

    #[test]
    fn parses_12_hour_time_without_space_and_lowercase() {
        let parsed = parse_appointment_time("2024-01-01 09:15:00am").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_appointment_time("2024-01-01T13:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_24_hour_forms_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();
        assert_eq!(parse_appointment_time("2024-01-01T13:00:00").unwrap(), expected);
        assert_eq!(parse_appointment_time("2024-01-01 13:00:00").unwrap(), expected);
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(matches!(
            parse_appointment_time("next tuesday-ish"),
            Err(SchedulingError::BadTimeFormat(_))
        ));
        assert!(matches!(
            parse_appointment_time("2024-01-01 25:00:00"),
            Err(SchedulingError::BadTimeFormat(_))
        ));
    }

    #[test]
    fn status_display_matches_storage_values() {
        assert_eq!(AppointmentStatus::Scheduled.to_string(), "scheduled");
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(AppointmentStatus::Completed.to_string(), "completed");
    }
}
