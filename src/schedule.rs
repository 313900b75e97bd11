//! Week and slot calculator.
//!
//! This module owns the fixed court/time-slot catalog and the pure date
//! arithmetic behind the weekly view:
//! - The club has two padel courts, numbered 2 and 3.
//! - Each day offers 8 fixed time slots; the first four are grouped as
//!   "morning" for display purposes only.
//! - The bookable week always runs Monday through Sunday, derived from the
//!   current **local** date. Local calendar fields are used deliberately:
//!   formatting via UTC would file a booking made near local midnight under
//!   the wrong day.

use chrono::{Datelike, Local, NaiveDate};

/// Court numbers available for booking.
pub const PADEL_COURTS: [i32; 2] = [2, 3];

/// The fixed daily time slots, in display (and sort) order.
pub const TIME_SLOTS: [&str; 8] = [
    "09:00", "10:30", "12:00", "13:30", "16:30", "18:00", "19:30", "21:00",
];

/// Slots grouped under the "morning" heading. Display grouping only;
/// carries no booking-logic effect.
pub const MORNING_SLOTS: [&str; 4] = ["09:00", "10:30", "12:00", "13:30"];

/// Returns the Monday-to-Sunday week containing `today`.
///
/// Monday is day 0 regardless of locale. A Sunday wraps back to the Monday
/// six days earlier rather than forward to the next week.
pub fn week_dates(today: NaiveDate) -> [NaiveDate; 7] {
    let days_from_monday = today.weekday().num_days_from_monday() as i64;
    let monday = today - chrono::Duration::days(days_from_monday);

    std::array::from_fn(|i| monday + chrono::Duration::days(i as i64))
}

/// Returns this week's dates, computed from the local current date.
pub fn current_week_dates() -> [NaiveDate; 7] {
    week_dates(Local::now().date_naive())
}

/// Renders a date as its `YYYY-MM-DD` lookup key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whether `court` is one of the club's courts.
pub fn is_valid_court(court: i32) -> bool {
    PADEL_COURTS.contains(&court)
}

/// Whether `time` is one of the fixed slot labels.
pub fn is_valid_slot(time: &str) -> bool {
    TIME_SLOTS.contains(&time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn week_starts_on_monday_and_has_seven_consecutive_days() {
        // 2024-06-12 is a Wednesday
        let week = week_dates(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());

        assert_eq!(week[0].weekday(), Weekday::Mon);
        assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        for pair in week.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
        assert_eq!(week[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn sunday_wraps_back_to_the_preceding_monday() {
        // 2024-06-16 is a Sunday; its week began on 2024-06-10
        let week = week_dates(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());

        assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(week[6], NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(week_dates(monday)[0], monday);
    }

    #[test]
    fn every_day_falls_within_its_own_week() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for offset in 0..366 {
            let day = start + chrono::Duration::days(offset);
            let week = week_dates(day);
            assert!(week[0] <= day && day <= week[6], "{day} outside its week");
        }
    }

    #[test]
    fn date_key_formats_and_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let key = date_key(date);

        assert_eq!(key, "2024-06-03");
        let parsed = NaiveDate::parse_from_str(&key, "%Y-%m-%d").unwrap();
        assert_eq!(date_key(parsed), key);
    }

    #[test]
    fn date_key_is_injective_across_a_year() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut seen = std::collections::HashSet::new();
        for offset in 0..366 {
            assert!(seen.insert(date_key(start + chrono::Duration::days(offset))));
        }
    }

    #[test]
    fn catalog_membership_checks() {
        assert!(is_valid_court(2));
        assert!(is_valid_court(3));
        assert!(!is_valid_court(1));

        assert!(is_valid_slot("09:00"));
        assert!(is_valid_slot("21:00"));
        assert!(!is_valid_slot("08:00"));

        // Morning slots are a strict subset of the catalog
        assert!(MORNING_SLOTS.iter().all(|&s| is_valid_slot(s)));
    }
}
