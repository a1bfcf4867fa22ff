//! Appointment slot availability.
//!
//! The clinic opens two windows a day, 08:00-12:00 and 13:00-17:00, split
//! into 30 minute slots. A window's end time is not itself a slot.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

/// Length of one appointment slot.
pub const SLOT_MINUTES: i64 = 30;

/// Number of days offered for booking, starting tomorrow.
pub const BOOKING_WINDOW_DAYS: i64 = 14;

/// Opening windows as (start hour, end hour), end exclusive.
const WINDOWS: [(u32, u32); 2] = [(8, 12), (13, 17)];

/// Display format of a slot time.
pub const SLOT_TIME_FORMAT: &str = "%H:%M";

/// Every slot with its availability, as consumed by the booking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SlotBoard {
    /// Slot times in schedule order (`HH:MM`)
    pub hours: Vec<String>,
    /// Slot time to availability flag
    pub availability: BTreeMap<String, bool>,
}

/// Domain service for the clinic schedule.
pub struct ClinicSchedule;

impl ClinicSchedule {
    /// All slots of a working day in order.
    pub fn slots() -> Vec<NaiveTime> {
        let step = Duration::minutes(SLOT_MINUTES);
        let mut slots = Vec::new();

        for (start, end) in WINDOWS {
            let (Some(mut time), Some(end)) = (
                NaiveTime::from_hms_opt(start, 0, 0),
                NaiveTime::from_hms_opt(end, 0, 0),
            ) else {
                continue;
            };
            while time < end {
                slots.push(time);
                time += step;
            }
        }

        slots
    }

    /// True when `time` is exactly one of the schedule's slots.
    pub fn is_bookable_slot(time: NaiveTime) -> bool {
        Self::slots().contains(&time)
    }

    /// Slots not taken by any of the `booked` times, in schedule order.
    pub fn available_slots(booked: &[NaiveTime]) -> Vec<NaiveTime> {
        Self::slots()
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect()
    }

    /// Every slot with a flag telling whether it is still free.
    pub fn slot_board(booked: &[NaiveTime]) -> SlotBoard {
        let slots = Self::slots();
        let hours: Vec<String> = slots
            .iter()
            .map(|t| t.format(SLOT_TIME_FORMAT).to_string())
            .collect();
        let availability = slots
            .iter()
            .zip(hours.iter())
            .map(|(slot, label)| (label.clone(), !booked.contains(slot)))
            .collect();

        SlotBoard {
            hours,
            availability,
        }
    }

    /// Dates offered for booking: the 14 days after `today`.
    pub fn booking_dates(today: NaiveDate) -> Vec<NaiveDate> {
        (1..=BOOKING_WINDOW_DAYS)
            .map(|offset| today + Duration::days(offset))
            .collect()
    }

    /// True when `date` falls within the booking window seen from `today`.
    pub fn is_within_booking_window(today: NaiveDate, date: NaiveDate) -> bool {
        let days_ahead = (date - today).num_days();
        (1..=BOOKING_WINDOW_DAYS).contains(&days_ahead)
    }

    /// Parse an `HH:MM` slot time.
    pub fn parse_slot_time(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value.trim(), SLOT_TIME_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_schedule_has_sixteen_slots() {
        let slots = ClinicSchedule::slots();

        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first(), Some(&t(8, 0)));
        assert_eq!(slots[7], t(11, 30));
        assert_eq!(slots[8], t(13, 0));
        assert_eq!(slots.last(), Some(&t(16, 30)));
    }

    #[test_case(8, 0, true)]
    #[test_case(11, 30, true)]
    #[test_case(12, 0, false ; "lunch break")]
    #[test_case(12, 30, false)]
    #[test_case(16, 30, true)]
    #[test_case(17, 0, false ; "closing time")]
    #[test_case(9, 15, false ; "off grid")]
    fn test_is_bookable_slot(h: u32, m: u32, expected: bool) {
        assert_eq!(ClinicSchedule::is_bookable_slot(t(h, m)), expected);
    }

    #[test]
    fn test_available_slots_exclude_booked() {
        let available = ClinicSchedule::available_slots(&[t(8, 0), t(13, 30)]);

        assert_eq!(available.len(), 14);
        assert!(!available.contains(&t(8, 0)));
        assert!(!available.contains(&t(13, 30)));
        assert_eq!(available[0], t(8, 30));
    }

    #[test]
    fn test_booked_times_outside_schedule_are_ignored() {
        assert_eq!(ClinicSchedule::available_slots(&[t(18, 0)]).len(), 16);
    }

    #[test]
    fn test_slot_board_flags() {
        let board = ClinicSchedule::slot_board(&[t(10, 0)]);

        assert_eq!(board.hours.len(), 16);
        assert_eq!(board.hours[0], "08:00");
        assert_eq!(board.availability.get("10:00"), Some(&false));
        assert_eq!(board.availability.get("10:30"), Some(&true));
        assert_eq!(board.availability.get("12:00"), None);
    }

    #[test]
    fn test_booking_dates_start_tomorrow() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        let dates = ClinicSchedule::booking_dates(today);

        assert_eq!(dates.len(), 14);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 12, 26).unwrap());
        assert_eq!(dates[13], NaiveDate::from_ymd_opt(2027, 1, 8).unwrap());
    }

    #[test_case(0, false ; "today")]
    #[test_case(1, true ; "tomorrow")]
    #[test_case(14, true ; "last day")]
    #[test_case(15, false ; "past window")]
    #[test_case(-1, false ; "yesterday")]
    fn test_booking_window(offset: i64, expected: bool) {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let date = today + Duration::days(offset);
        assert_eq!(ClinicSchedule::is_within_booking_window(today, date), expected);
    }

    #[test_case("09:30", Some((9, 30)))]
    #[test_case(" 14:00 ", Some((14, 0)))]
    #[test_case("9h30", None)]
    #[test_case("25:00", None)]
    fn test_parse_slot_time(input: &str, expected: Option<(u32, u32)>) {
        assert_eq!(
            ClinicSchedule::parse_slot_time(input),
            expected.map(|(h, m)| t(h, m))
        );
    }
}
