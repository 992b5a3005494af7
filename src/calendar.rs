//! Day-index to weekday mapping for a scheduling horizon.
//!
//! Day indices are zero-based offsets from the first day of the horizon.
//! The weekday of day zero is configured; every later day follows by
//! modular arithmetic, wrapping Sunday back to Monday.

use std::collections::BTreeSet;
use std::fmt;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
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
    /// All weekdays, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Zero-based position in the week (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weekday at position `index mod 7`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    /// The following weekday.
    #[inline]
    pub fn succ(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weekday of `day`, given the weekday of day zero.
///
/// # Examples
///
/// ```
/// use u_rotation::calendar::{weekday_of, Weekday};
///
/// assert_eq!(weekday_of(0, Weekday::Friday), Weekday::Friday);
/// assert_eq!(weekday_of(3, Weekday::Friday), Weekday::Monday);
/// assert_eq!(weekday_of(7, Weekday::Friday), Weekday::Friday);
/// ```
#[inline]
pub fn weekday_of(day: usize, first: Weekday) -> Weekday {
    Weekday::from_index(first.index() + day % 7)
}

/// Weekday labels for every day of a horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayCalendar {
    first: Weekday,
    days: Vec<Weekday>,
}

impl WeekdayCalendar {
    /// Weekday of the first day.
    pub fn first(&self) -> Weekday {
        self.first
    }

    /// Weekday of `day`, or `None` outside the horizon.
    #[inline]
    pub fn get(&self, day: usize) -> Option<Weekday> {
        self.days.get(day).copied()
    }

    /// Number of days in the horizon.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// `(day, weekday)` pairs in day order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Weekday)> + '_ {
        self.days.iter().copied().enumerate()
    }

    pub fn as_slice(&self) -> &[Weekday] {
        &self.days
    }
}

/// Builds the calendar of a `num_days` horizon starting on `first`.
pub fn compute_calendar(first: Weekday, num_days: usize) -> WeekdayCalendar {
    let mut days = Vec::with_capacity(num_days);
    let mut current = first;
    for _ in 0..num_days {
        days.push(current);
        current = current.succ();
    }
    WeekdayCalendar { first, days }
}

/// Day indices whose weekday satisfies `predicate`.
pub fn days_matching<P>(calendar: &WeekdayCalendar, predicate: P) -> BTreeSet<usize>
where
    P: Fn(Weekday) -> bool,
{
    calendar
        .iter()
        .filter(|&(_, weekday)| predicate(weekday))
        .map(|(day, _)| day)
        .collect()
}
