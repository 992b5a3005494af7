//! Direct rule checks for materialized grids.
//!
//! Re-derives every rotation rule from the configuration without going
//! through the CP layer, so solver output can be verified independently.

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::calendar::{days_matching, WeekdayCalendar};

use super::config::{Bounds, RotationConfig};
use super::grid::ShiftGrid;

/// A broken rotation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Grid dimensions differ from the configuration.
    Shape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Day staffed outside its coverage bounds.
    Coverage {
        day: usize,
        assigned: usize,
        bounds: Bounds,
    },
    /// Worker's total outside the workload bounds.
    Workload {
        worker: usize,
        assigned: usize,
        bounds: Bounds,
    },
    /// Worker assigned on a requested day off.
    Unavailable { worker: usize, day: usize },
    /// Worker assigned on `day` and `day + 1`.
    ConsecutiveDays { worker: usize, day: usize },
    /// Worker assigned on an anchor day but not on its paired day.
    Pairing {
        worker: usize,
        anchor: usize,
        paired: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Shape { expected, actual } => write!(
                f,
                "grid is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Violation::Coverage {
                day,
                assigned,
                bounds,
            } => write!(
                f,
                "day {day}: {assigned} workers, allowed [{}, {}]",
                bounds.min, bounds.max
            ),
            Violation::Workload {
                worker,
                assigned,
                bounds,
            } => write!(
                f,
                "worker {worker}: {assigned} shifts, allowed [{}, {}]",
                bounds.min, bounds.max
            ),
            Violation::Unavailable { worker, day } => {
                write!(f, "worker {worker} assigned on day off {day}")
            }
            Violation::ConsecutiveDays { worker, day } => {
                write!(f, "worker {worker} assigned on days {day} and {}", day + 1)
            }
            Violation::Pairing {
                worker,
                anchor,
                paired,
            } => write!(
                f,
                "worker {worker} assigned on anchor day {anchor} but not on day {paired}"
            ),
        }
    }
}

/// Lists every rule `grid` breaks under `config`. Empty means valid.
pub fn audit(config: &RotationConfig, calendar: &WeekdayCalendar, grid: &ShiftGrid) -> Vec<Violation> {
    let expected = (config.num_workers, config.num_days);
    let actual = (grid.num_workers(), grid.num_days());
    if expected != actual || calendar.len() != config.num_days {
        return vec![Violation::Shape { expected, actual }];
    }

    let mut violations: Vec<Violation> = calendar
        .iter()
        .filter_map(|(day, weekday)| {
            let bounds = config.coverage.bounds_for(weekday);
            let assigned = grid.day_coverage(day);
            (!bounds.contains(assigned as i64)).then_some(Violation::Coverage {
                day,
                assigned,
                bounds,
            })
        })
        .collect();

    let anchors: Vec<(usize, usize)> = if config.enforce_weekend_pairing {
        days_matching(calendar, |w| w == config.pairing_anchor)
            .into_iter()
            .filter_map(|d| {
                d.checked_add(config.pairing_offset)
                    .filter(|&paired| paired < config.num_days)
                    .map(|paired| (d, paired))
            })
            .collect()
    } else {
        Vec::new()
    };

    #[cfg(feature = "parallel")]
    let per_worker: Vec<Violation> = (0..config.num_workers)
        .into_par_iter()
        .flat_map_iter(|w| audit_worker(config, &anchors, grid, w))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let per_worker: Vec<Violation> = (0..config.num_workers)
        .flat_map(|w| audit_worker(config, &anchors, grid, w))
        .collect();

    violations.extend(per_worker);
    violations
}

fn audit_worker(
    config: &RotationConfig,
    anchors: &[(usize, usize)],
    grid: &ShiftGrid,
    worker: usize,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let assigned = grid.worker_load(worker);
    if !config.shifts_per_worker.contains(assigned as i64) {
        violations.push(Violation::Workload {
            worker,
            assigned,
            bounds: config.shifts_per_worker,
        });
    }

    for day in config.unavailable_days(worker) {
        if grid.is_assigned(worker, day) {
            violations.push(Violation::Unavailable { worker, day });
        }
    }

    for day in 0..config.num_days.saturating_sub(1) {
        if grid.is_assigned(worker, day) && grid.is_assigned(worker, day + 1) {
            violations.push(Violation::ConsecutiveDays { worker, day });
        }
    }

    for &(anchor, paired) in anchors {
        if grid.is_assigned(worker, anchor) && !grid.is_assigned(worker, paired) {
            violations.push(Violation::Pairing {
                worker,
                anchor,
                paired,
            });
        }
    }

    violations
}
