//! Structured per-solution reports.
//!
//! A report carries the data a presentation layer needs to print one
//! schedule: per day, the weekday and the workers on duty; per worker, the
//! days worked. Worker days are 1-based ordinals ("day 1" is the first day
//! of the horizon); everywhere else in the crate days are 0-based indices.

use std::collections::BTreeSet;

use crate::calendar::{Weekday, WeekdayCalendar};
use crate::rotation::ShiftGrid;

/// Staffing of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayReport {
    /// 0-based day index.
    pub day: usize,
    pub weekday: Weekday,
    /// Workers on duty, ascending. May be empty.
    pub workers: Vec<usize>,
}

impl DayReport {
    /// Workers of a `num_workers` roster not on duty this day.
    pub fn idle_workers(&self, num_workers: usize) -> Vec<usize> {
        (0..num_workers)
            .filter(|w| !self.workers.contains(w))
            .collect()
    }
}

/// Duties of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerReport {
    pub worker: usize,
    /// Worked days as 1-based ordinals, ascending.
    pub days: Vec<usize>,
}

/// Full breakdown of one solution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionReport {
    /// 0-based discovery ordinal.
    pub index: u64,
    pub days: Vec<DayReport>,
    pub workers: Vec<WorkerReport>,
}

impl SolutionReport {
    /// Total duties on days whose weekday is in `weekend`.
    pub fn weekend_load(&self, weekend: &BTreeSet<Weekday>) -> usize {
        self.days
            .iter()
            .filter(|d| weekend.contains(&d.weekday))
            .map(|d| d.workers.len())
            .sum()
    }
}

/// Packages one materialized solution.
///
/// Days beyond the calendar are skipped.
///
/// # Examples
///
/// ```
/// use u_rotation::calendar::{compute_calendar, Weekday};
/// use u_rotation::report::assemble;
/// use u_rotation::rotation::ShiftGrid;
///
/// let grid = ShiftGrid::from_fn(2, 3, |w, d| w == d % 2);
/// let report = assemble(0, &grid, &compute_calendar(Weekday::Saturday, 3));
/// assert_eq!(report.days[1].weekday, Weekday::Sunday);
/// assert_eq!(report.days[1].workers, vec![1]);
/// assert_eq!(report.workers[0].days, vec![1, 3]);
/// ```
pub fn assemble(index: u64, grid: &ShiftGrid, calendar: &WeekdayCalendar) -> SolutionReport {
    let days = calendar
        .iter()
        .take(grid.num_days())
        .map(|(day, weekday)| DayReport {
            day,
            weekday,
            workers: grid.day_workers(day),
        })
        .collect();

    let workers = (0..grid.num_workers())
        .map(|worker| WorkerReport {
            worker,
            days: grid.worker_days(worker).into_iter().map(|d| d + 1).collect(),
        })
        .collect();

    SolutionReport {
        index,
        days,
        workers,
    }
}
