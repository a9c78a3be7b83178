use chrono::{DateTime, Datelike, Utc};

use crate::models::{AvailabilityWindow, DayOfWeek};

/// Decide whether an instant falls inside any of the doctor's open windows.
/// Pure function: the weekday and time-of-day of the instant are compared
/// against each window independently. The interval is half-open, so the
/// window's end boundary itself is not bookable.
pub fn is_within_availability(windows: &[AvailabilityWindow], instant: DateTime<Utc>) -> bool {
    let day = DayOfWeek::from(instant.weekday());
    let time_of_day = instant.time();

    windows.iter().any(|window| {
        window.day_of_week == day
            && window.start_time <= time_of_day
            && time_of_day < window.end_time
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone};
    use uuid::Uuid;

    use super::*;

    fn window(day: DayOfWeek, start: (u32, u32, u32), end: (u32, u32, u32)) -> AvailabilityWindow {
        AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, start.2).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    // 2024-01-01 is a Monday.
    fn monday_at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, min, sec).unwrap()
    }

    #[test]
    fn instant_inside_window_is_available() {
        let windows = vec![window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0))];
        assert!(is_within_availability(&windows, monday_at(12, 30, 0)));
    }

    #[test]
    fn start_boundary_is_available() {
        let windows = vec![window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0))];
        assert!(is_within_availability(&windows, monday_at(9, 0, 0)));
    }

    #[test]
    fn end_boundary_is_not_available() {
        let windows = vec![window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0))];
        assert!(!is_within_availability(&windows, monday_at(17, 0, 0)));
    }

    #[test]
    fn one_second_before_end_is_available() {
        let windows = vec![window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0))];
        assert!(is_within_availability(&windows, monday_at(16, 59, 59)));
    }

    #[test]
    fn wrong_day_is_not_available() {
        let windows = vec![window(DayOfWeek::Tuesday, (9, 0, 0), (17, 0, 0))];
        assert!(!is_within_availability(&windows, monday_at(12, 0, 0)));
    }

    #[test]
    fn empty_window_set_is_never_available() {
        assert!(!is_within_availability(&[], monday_at(12, 0, 0)));
    }

    #[test]
    fn any_matching_window_suffices() {
        let windows = vec![
            window(DayOfWeek::Monday, (8, 0, 0), (10, 0, 0)),
            window(DayOfWeek::Monday, (14, 0, 0), (16, 0, 0)),
        ];
        assert!(is_within_availability(&windows, monday_at(15, 0, 0)));
        assert!(!is_within_availability(&windows, monday_at(12, 0, 0)));
    }

    #[test]
    fn duplicate_windows_are_checked_independently() {
        let windows = vec![
            window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0)),
            window(DayOfWeek::Monday, (9, 0, 0), (17, 0, 0)),
        ];
        assert!(is_within_availability(&windows, monday_at(9, 0, 0)));
    }
}
