//! Materialized shift assignments.

use crate::calendar::WeekdayCalendar;

use super::config::CoveragePolicy;

/// A full `workers × days` valuation of the assignment grid.
///
/// Stored worker-major. Cells outside the grid read as unassigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftGrid {
    num_workers: usize,
    num_days: usize,
    cells: Vec<bool>,
}

impl ShiftGrid {
    /// An empty grid (nobody works).
    pub fn new(num_workers: usize, num_days: usize) -> Self {
        Self {
            num_workers,
            num_days,
            cells: vec![false; num_workers * num_days],
        }
    }

    /// A grid whose cell `(worker, day)` is `f(worker, day)`.
    pub fn from_fn<F>(num_workers: usize, num_days: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut cells = Vec::with_capacity(num_workers * num_days);
        for worker in 0..num_workers {
            for day in 0..num_days {
                cells.push(f(worker, day));
            }
        }
        Self {
            num_workers,
            num_days,
            cells,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    #[inline]
    pub fn is_assigned(&self, worker: usize, day: usize) -> bool {
        worker < self.num_workers && day < self.num_days && self.cells[worker * self.num_days + day]
    }

    /// Sets one cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, worker: usize, day: usize, assigned: bool) {
        if worker < self.num_workers && day < self.num_days {
            self.cells[worker * self.num_days + day] = assigned;
        }
    }

    /// Days `worker` works, ascending.
    pub fn worker_days(&self, worker: usize) -> Vec<usize> {
        (0..self.num_days)
            .filter(|&d| self.is_assigned(worker, d))
            .collect()
    }

    /// Workers on duty on `day`, ascending.
    pub fn day_workers(&self, day: usize) -> Vec<usize> {
        (0..self.num_workers)
            .filter(|&w| self.is_assigned(w, day))
            .collect()
    }

    /// Number of days `worker` works.
    pub fn worker_load(&self, worker: usize) -> usize {
        (0..self.num_days)
            .filter(|&d| self.is_assigned(worker, d))
            .count()
    }

    /// Number of workers on duty on `day`.
    pub fn day_coverage(&self, day: usize) -> usize {
        (0..self.num_workers)
            .filter(|&w| self.is_assigned(w, day))
            .count()
    }

    /// Total assignments falling on weekend days.
    pub fn weekend_load(&self, calendar: &WeekdayCalendar, coverage: &CoveragePolicy) -> usize {
        calendar
            .iter()
            .filter(|&(_, weekday)| coverage.is_weekend(weekday))
            .map(|(day, _)| self.day_coverage(day))
            .sum()
    }
}
