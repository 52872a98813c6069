//! Month and weekday values shared by filtering, aggregation and histograms.
//!
//! Both wrap chrono's calendar enums. Months are numbered 1..=12 (January = 1). Weekdays are
//! indexed 0..=6 with Monday = 0, the convention used for both day filtering and the weekday
//! histogram, and they order Monday first. Names parse case-insensitively but must be spelled
//! out in full: chrono's own parsers also accept `"mar"` or `"fri"`, which filters reject.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(chrono::Month);

impl Month {
    pub const JANUARY: Month = Month(chrono::Month::January);
    pub const FEBRUARY: Month = Month(chrono::Month::February);
    pub const MARCH: Month = Month(chrono::Month::March);
    pub const APRIL: Month = Month(chrono::Month::April);
    pub const MAY: Month = Month(chrono::Month::May);
    pub const JUNE: Month = Month(chrono::Month::June);
    pub const JULY: Month = Month(chrono::Month::July);
    pub const AUGUST: Month = Month(chrono::Month::August);
    pub const SEPTEMBER: Month = Month(chrono::Month::September);
    pub const OCTOBER: Month = Month(chrono::Month::October);
    pub const NOVEMBER: Month = Month(chrono::Month::November);
    pub const DECEMBER: Month = Month(chrono::Month::December);

    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Self::JANUARY,
        Self::FEBRUARY,
        Self::MARCH,
        Self::APRIL,
        Self::MAY,
        Self::JUNE,
        Self::JULY,
        Self::AUGUST,
        Self::SEPTEMBER,
        Self::OCTOBER,
        Self::NOVEMBER,
        Self::DECEMBER,
    ];

    /// Month number, 1..=12.
    pub fn number(self) -> u32 {
        self.0.number_from_month()
    }

    /// Lowercase English name (`"january"`).
    pub fn name(self) -> &'static str {
        MONTH_NAMES[self.number() as usize - 1]
    }

    /// Three-letter label used on histogram axes (`"Jan"`).
    pub fn short_label(self) -> &'static str {
        &self.0.name()[..3]
    }

    pub fn from_number(number: u32) -> Option<Self> {
        let number = u8::try_from(number).ok()?;
        chrono::Month::try_from(number).ok().map(Month)
    }

    /// Parse a full month name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        wanted
            .parse::<chrono::Month>()
            .ok()
            .map(Month)
            .filter(|m| m.name().eq_ignore_ascii_case(wanted))
    }

    pub fn of(ts: &NaiveDateTime) -> Self {
        // chrono guarantees month0() is in 0..=11.
        Self::ALL[ts.month0() as usize]
    }
}

impl From<chrono::Month> for Month {
    fn from(month: chrono::Month) -> Self {
        Month(month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weekday(chrono::Weekday);

impl Weekday {
    pub const MONDAY: Weekday = Weekday(chrono::Weekday::Mon);
    pub const TUESDAY: Weekday = Weekday(chrono::Weekday::Tue);
    pub const WEDNESDAY: Weekday = Weekday(chrono::Weekday::Wed);
    pub const THURSDAY: Weekday = Weekday(chrono::Weekday::Thu);
    pub const FRIDAY: Weekday = Weekday(chrono::Weekday::Fri);
    pub const SATURDAY: Weekday = Weekday(chrono::Weekday::Sat);
    pub const SUNDAY: Weekday = Weekday(chrono::Weekday::Sun);

    /// All weekdays, Monday through Sunday.
    pub const ALL: [Weekday; 7] = [
        Self::MONDAY,
        Self::TUESDAY,
        Self::WEDNESDAY,
        Self::THURSDAY,
        Self::FRIDAY,
        Self::SATURDAY,
        Self::SUNDAY,
    ];

    /// Weekday index, Monday = 0 … Sunday = 6.
    pub fn index(self) -> u32 {
        self.0.num_days_from_monday()
    }

    pub fn name(self) -> &'static str {
        WEEKDAY_NAMES[self.index() as usize]
    }

    pub fn from_index(index: u32) -> Option<Self> {
        let index = u8::try_from(index).ok()?;
        chrono::Weekday::try_from(index).ok().map(Weekday)
    }

    /// Parse a full weekday name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        wanted
            .parse::<chrono::Weekday>()
            .ok()
            .map(Weekday)
            .filter(|d| d.name().eq_ignore_ascii_case(wanted))
    }

    pub fn of(ts: &NaiveDateTime) -> Self {
        Weekday(ts.weekday())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday(day)
    }
}

impl Ord for Weekday {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl PartialOrd for Weekday {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.name().chars();
        if let Some(first) = chars.next() {
            write!(f, "{}", first.to_ascii_uppercase())?;
        }
        f.write_str(chars.as_str())
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accepted values for a filter dimension: `"all"` followed by the enumeration's names.
pub fn accepted_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'static str>,
{
    std::iter::once("all")
        .chain(names)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{accepted_names, Month, Weekday};
    use chrono::NaiveDate;

    #[test]
    fn month_numbers_follow_calendar_order() {
        for (i, m) in Month::ALL.iter().enumerate() {
            assert_eq!(m.number(), i as u32 + 1);
            assert_eq!(Month::from_number(m.number()), Some(*m));
        }
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Month::from_number(256 + 3), None);
    }

    #[test]
    fn names_parse_case_insensitively_but_reject_abbreviations() {
        assert_eq!(Month::from_name("MARCH"), Some(Month::MARCH));
        assert_eq!(Month::from_name("  june "), Some(Month::JUNE));
        assert_eq!(Month::from_name("May"), Some(Month::MAY));
        assert_eq!(Month::from_name("mar"), None);
        assert_eq!(Month::from_name("marchx"), None);
        assert_eq!(Weekday::from_name("Friday"), Some(Weekday::FRIDAY));
        assert_eq!(Weekday::from_name("fri"), None);
        assert_eq!(Weekday::from_name(""), None);
    }

    #[test]
    fn derives_month_and_weekday_from_timestamp() {
        // 2017-03-03 was a Friday.
        let ts = NaiveDate::from_ymd_opt(2017, 3, 3)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(Month::of(&ts), Month::MARCH);
        assert_eq!(Weekday::of(&ts), Weekday::FRIDAY);
        assert_eq!(Weekday::FRIDAY.index(), 4);
        assert_eq!(Weekday::from_index(4), Some(Weekday::FRIDAY));
        assert_eq!(Weekday::from_index(7), None);
    }

    #[test]
    fn weekdays_order_monday_first() {
        assert!(Weekday::MONDAY < Weekday::SUNDAY);
        let mut days = vec![Weekday::SUNDAY, Weekday::WEDNESDAY, Weekday::MONDAY];
        days.sort();
        assert_eq!(days, vec![Weekday::MONDAY, Weekday::WEDNESDAY, Weekday::SUNDAY]);
        assert!(Month::JANUARY < Month::DECEMBER);
    }

    #[test]
    fn display_is_title_case_and_serde_is_lowercase() {
        assert_eq!(Month::SEPTEMBER.to_string(), "September");
        assert_eq!(Month::SEPTEMBER.short_label(), "Sep");
        assert_eq!(Weekday::SUNDAY.to_string(), "Sunday");
        assert_eq!(serde_json::to_string(&Month::MAY).unwrap(), "\"may\"");
        assert_eq!(serde_json::to_string(&Weekday::MONDAY).unwrap(), "\"monday\"");
    }

    #[test]
    fn accepted_names_lead_with_all() {
        let names = accepted_names(Weekday::ALL.map(Weekday::name));
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "all");
        assert_eq!(names[7], "sunday");
    }
}
