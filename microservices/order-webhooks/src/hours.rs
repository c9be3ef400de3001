//! Opening hours in restaurant-local time

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};

pub const STORE_OPEN: &str = "store is open.";
pub const STORE_CLOSED: &str =
    "store is closed. You cannot order at this time. Please call back when we are open to place an order.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHours {
    pub open_hour: u32,
    pub close_hour: u32,
    pub sunday_close_hour: u32,
    /// Standard-time offset from UTC
    pub utc_offset_hours: i32,
    /// Second Sunday of March 02:00 to first Sunday of November 02:00
    pub observes_us_dst: bool,
}

impl Default for StoreHours {
    fn default() -> Self {
        Self {
            open_hour: 11,
            close_hour: 22,
            sunday_close_hour: 21,
            utc_offset_hours: -5,
            observes_us_dst: true,
        }
    }
}

impl StoreHours {
    /// Wall-clock time at the restaurant
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        let standard = now.naive_utc() + Duration::hours(i64::from(self.utc_offset_hours));
        if self.observes_us_dst && in_us_dst(standard) {
            standard + Duration::hours(1)
        } else {
            standard
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = self.local_time(now);
        let close = if local.weekday() == Weekday::Sun {
            self.sunday_close_hour
        } else {
            self.close_hour
        };
        let minutes = local.hour() * 60 + local.minute();
        minutes >= self.open_hour * 60 && minutes < close * 60
    }

    pub fn status(&self, now: DateTime<Utc>) -> &'static str {
        if self.is_open(now) {
            STORE_OPEN
        } else {
            STORE_CLOSED
        }
    }
}

/// `standard` is local standard time. DST starts at 02:00 standard and ends
/// at 02:00 daylight, which is 01:00 standard.
fn in_us_dst(standard: NaiveDateTime) -> bool {
    let year = standard.year();
    let (Some(start), Some(end)) = (
        NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
            .and_then(|day| day.and_hms_opt(2, 0, 0)),
        NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
            .and_then(|day| day.and_hms_opt(1, 0, 0)),
    ) else {
        return false;
    };
    standard >= start && standard < end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_local_time_standard_and_daylight() {
        let hours = StoreHours::default();
        // January: UTC-5
        assert_eq!(hours.local_time(utc(2025, 1, 15, 17, 0)).hour(), 12);
        // July: UTC-4
        assert_eq!(hours.local_time(utc(2025, 7, 15, 17, 0)).hour(), 13);
    }

    #[test]
    fn test_dst_boundaries_2025() {
        let hours = StoreHours::default();
        // 2025-03-09 is the second Sunday of March
        assert_eq!(hours.local_time(utc(2025, 3, 9, 6, 59)).hour(), 1);
        assert_eq!(hours.local_time(utc(2025, 3, 9, 7, 0)).hour(), 3);
        // 2025-11-02 is the first Sunday of November
        assert_eq!(hours.local_time(utc(2025, 11, 2, 5, 59)).hour(), 1);
        assert_eq!(hours.local_time(utc(2025, 11, 2, 6, 0)).hour(), 1);
        assert_eq!(hours.local_time(utc(2025, 11, 2, 7, 0)).hour(), 2);
    }

    #[test]
    fn test_open_hours() {
        let hours = StoreHours::default();
        // Wednesday 2025-01-15, local 10:59 / 11:00 / 21:59 / 22:00
        assert!(!hours.is_open(utc(2025, 1, 15, 15, 59)));
        assert!(hours.is_open(utc(2025, 1, 15, 16, 0)));
        assert!(hours.is_open(utc(2025, 1, 16, 2, 59)));
        assert!(!hours.is_open(utc(2025, 1, 16, 3, 0)));
    }

    #[test]
    fn test_sunday_closes_early() {
        let hours = StoreHours::default();
        // Sunday 2025-01-19 local 21:30
        assert_eq!(hours.status(utc(2025, 1, 20, 2, 30)), STORE_CLOSED);
        // Sunday local 20:30
        assert_eq!(hours.status(utc(2025, 1, 20, 1, 30)), STORE_OPEN);
    }

    #[test]
    fn test_without_dst() {
        let hours = StoreHours {
            observes_us_dst: false,
            ..StoreHours::default()
        };
        assert_eq!(hours.local_time(utc(2025, 7, 15, 17, 0)).hour(), 12);
    }
}
