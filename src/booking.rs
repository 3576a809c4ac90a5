//! Booking price and trip date helpers used by the booking form and the
//! booking lists.

use crate::core::{ListError, Record, Result};
use chrono::NaiveDate;

/// Price of one booking: unit price per member times the party size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingQuote {
    unit_price: f64,
    members: u32,
}

impl BookingQuote {
    pub fn new(unit_price: f64, members: u32) -> Result<Self> {
        if members == 0 {
            return Err(ListError::InvalidRequest("A booking needs at least one member".into()));
        }
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(ListError::InvalidRequest(format!("Invalid unit price: {}", unit_price)));
        }
        Ok(Self { unit_price, members })
    }

    /// Quote from a package record; a missing or unreadable price counts as 0.
    pub fn from_record(package: &Record, members: u32) -> Result<Self> {
        Self::new(package.number("price"), members)
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn members(&self) -> u32 {
        self.members
    }

    pub fn total(&self) -> f64 {
        self.unit_price * f64::from(self.members)
    }
}

/// `"12 Jan 2025 - 15 Jan 2025"`, or a single date when the trip is one day.
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> Result<String> {
    if end < start {
        return Err(ListError::InvalidRequest(format!(
            "Trip ends ({}) before it starts ({})",
            end, start
        )));
    }
    const FORMAT: &str = "%d %b %Y";
    if start == end {
        return Ok(start.format(FORMAT).to_string());
    }
    Ok(format!("{} - {}", start.format(FORMAT), end.format(FORMAT)))
}

/// Number of calendar days covered by a trip, both ends included.
pub fn trip_days(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    if end < start {
        return Err(ListError::InvalidRequest("Trip ends before it starts".into()));
    }
    u32::try_from((end - start).num_days())
        .ok()
        .and_then(|days| days.checked_add(1))
        .ok_or_else(|| ListError::InvalidRequest(format!("Trip from {} to {} is too long", start, end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total() {
        let quote = BookingQuote::new(4500.0, 3).unwrap();
        assert_eq!(quote.total(), 13500.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(BookingQuote::new(100.0, 0).is_err());
        assert!(BookingQuote::new(-5.0, 1).is_err());
        assert!(BookingQuote::new(f64::NAN, 1).is_err());
    }

    #[test]
    fn test_from_wrapped_record() {
        let package = Record::from_value(json!({"price": {"$numberInt": "500"}})).unwrap();
        let quote = BookingQuote::from_record(&package, 4).unwrap();
        assert_eq!(quote.total(), 2000.0);

        let unpriced = Record::from_value(json!({"tripTitle": "Bandarban"})).unwrap();
        assert_eq!(BookingQuote::from_record(&unpriced, 2).unwrap().total(), 0.0);
    }

    #[test]
    fn test_format_date_range() {
        assert_eq!(
            format_date_range(date(2025, 1, 12), date(2025, 1, 15)).unwrap(),
            "12 Jan 2025 - 15 Jan 2025"
        );
        assert_eq!(format_date_range(date(2025, 3, 2), date(2025, 3, 2)).unwrap(), "02 Mar 2025");
        assert!(format_date_range(date(2025, 3, 2), date(2025, 3, 1)).is_err());
    }

    #[test]
    fn test_trip_days() {
        assert_eq!(trip_days(date(2025, 1, 30), date(2025, 2, 2)).unwrap(), 4);
        assert_eq!(trip_days(date(2025, 1, 30), date(2025, 1, 30)).unwrap(), 1);
    }

    #[test]
    fn test_trip_days_full_calendar_range() {
        let days = trip_days(NaiveDate::MIN, NaiveDate::MAX).unwrap();
        assert_eq!(i64::from(days), (NaiveDate::MAX - NaiveDate::MIN).num_days() + 1);
        assert!(trip_days(date(2025, 1, 30), date(2025, 1, 29)).is_err());
    }
}
