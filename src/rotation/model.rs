//! Rotation constraint model.
//!
//! Declares one boolean per `(worker, day)` cell and registers the rotation
//! rules as CP constraints:
//!
//! 1. **Coverage**: per day, assigned workers within the day's bounds
//! 2. **Workload**: per worker, worked days within `shifts_per_worker`
//! 3. **Unavailability**: requested days off are fixed to `false`
//! 4. **Rest**: `x(w, d) + x(w, d + 1) <= 1`
//! 5. **Pairing** (optional): `x(w, anchor) => x(w, anchor + offset)`
//! 6. **Objective** (optional): minimize assignments on weekend days

use std::collections::BTreeSet;

use tracing::info;

use crate::calendar::{compute_calendar, days_matching, WeekdayCalendar};
use crate::cp::{CpModel, CpSolution, VarId};
use crate::error::Result;

use super::audit::{audit, Violation};
use super::config::RotationConfig;
use super::grid::ShiftGrid;

/// The rotation problem expressed as a [`CpModel`].
///
/// # Examples
///
/// ```
/// use u_rotation::rotation::{RotationConfig, RotationModel};
///
/// let config = RotationConfig::default().with_workers(3).with_days(7);
/// let model = RotationModel::build(&config).unwrap();
/// assert_eq!(model.cp_model().var_count(), 21);
/// assert!(!model.has_objective());
/// ```
#[derive(Debug, Clone)]
pub struct RotationModel {
    config: RotationConfig,
    calendar: WeekdayCalendar,
    cp: CpModel,
    /// Worker-major handles: `vars[worker * num_days + day]`.
    vars: Vec<VarId>,
    weekend_days: BTreeSet<usize>,
    anchor_days: BTreeSet<usize>,
}

impl RotationModel {
    /// Validates `config` and builds the constraint model.
    pub fn build(config: &RotationConfig) -> Result<Self> {
        config.validate()?;

        let (num_workers, num_days) = (config.num_workers, config.num_days);
        let calendar = compute_calendar(config.first_weekday, num_days);
        let mut cp = CpModel::new("rotation");

        // Declared day-major; looked up worker-major.
        let mut vars = vec![VarId(0); num_workers * num_days];
        for day in 0..num_days {
            for worker in 0..num_workers {
                vars[worker * num_days + day] = cp.new_bool_var(format!("shift_w{worker}_d{day}"));
            }
        }
        let var = |worker: usize, day: usize| vars[worker * num_days + day];

        for (day, weekday) in calendar.iter() {
            let bounds = config.coverage.bounds_for(weekday);
            let terms = (0..num_workers).map(|w| (var(w, day), 1)).collect();
            cp.add_linear(terms, bounds.min, bounds.max);
        }

        for worker in 0..num_workers {
            let terms = (0..num_days).map(|d| (var(worker, d), 1)).collect();
            cp.add_linear(
                terms,
                config.shifts_per_worker.min,
                config.shifts_per_worker.max,
            );
        }

        for worker in 0..num_workers {
            for day in config.unavailable_days(worker) {
                cp.add_fixed(var(worker, day), false);
            }
        }

        for worker in 0..num_workers {
            for day in 0..num_days.saturating_sub(1) {
                cp.add_linear(vec![(var(worker, day), 1), (var(worker, day + 1), 1)], 0, 1);
            }
        }

        let offset = config.pairing_offset;
        let anchor_days: BTreeSet<usize> =
            days_matching(&calendar, |w| w == config.pairing_anchor)
                .into_iter()
                .filter(|&d| d.checked_add(offset).is_some_and(|p| p < num_days))
                .collect();
        if config.enforce_weekend_pairing {
            for worker in 0..num_workers {
                for &anchor in &anchor_days {
                    cp.add_implication(var(worker, anchor), var(worker, anchor + offset));
                }
            }
        }

        let weekend_days = days_matching(&calendar, |w| config.coverage.is_weekend(w));
        if config.minimize_weekend_load {
            let terms = weekend_days
                .iter()
                .flat_map(|&d| (0..num_workers).map(move |w| (w, d)))
                .map(|(w, d)| (var(w, d), 1))
                .collect();
            cp.minimize(terms);
        }

        info!(
            event = "model_built",
            workers = num_workers,
            days = num_days,
            variables = cp.var_count(),
            constraints = cp.constraint_count(),
            pairing = config.enforce_weekend_pairing,
            objective = config.minimize_weekend_load,
        );

        Ok(Self {
            config: config.clone(),
            calendar,
            cp,
            vars,
            weekend_days,
            anchor_days,
        })
    }

    /// Handle of `assigned(worker, day)`.
    ///
    /// # Panics
    ///
    /// Panics if `worker` or `day` is outside the grid.
    #[inline]
    pub fn var(&self, worker: usize, day: usize) -> VarId {
        assert!(
            worker < self.config.num_workers && day < self.config.num_days,
            "cell ({worker}, {day}) outside {}x{} grid",
            self.config.num_workers,
            self.config.num_days
        );
        self.vars[worker * self.config.num_days + day]
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WeekdayCalendar {
        &self.calendar
    }

    pub fn cp_model(&self) -> &CpModel {
        &self.cp
    }

    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    pub fn num_days(&self) -> usize {
        self.config.num_days
    }

    /// Days whose weekday is classified as weekend.
    pub fn weekend_days(&self) -> &BTreeSet<usize> {
        &self.weekend_days
    }

    /// Anchor days that have a paired day inside the horizon.
    pub fn anchor_days(&self) -> &BTreeSet<usize> {
        &self.anchor_days
    }

    /// Whether an objective was registered.
    pub fn has_objective(&self) -> bool {
        self.cp.objective.is_some()
    }

    /// Reads the assignment grid out of a solver solution.
    pub fn read_grid(&self, solution: &CpSolution) -> ShiftGrid {
        ShiftGrid::from_fn(self.num_workers(), self.num_days(), |w, d| {
            solution.value(self.vars[w * self.config.num_days + d])
        })
    }

    /// Solver-order values for a grid; the inverse of [`read_grid`](Self::read_grid).
    pub fn encode_grid(&self, grid: &ShiftGrid) -> Vec<bool> {
        let mut values = vec![false; self.cp.var_count()];
        for worker in 0..self.num_workers() {
            for day in 0..self.num_days() {
                values[self.vars[worker * self.config.num_days + day].index()] =
                    grid.is_assigned(worker, day);
            }
        }
        values
    }

    /// Checks `grid` against the rotation rules directly, without the solver.
    pub fn audit(&self, grid: &ShiftGrid) -> Vec<Violation> {
        audit(&self.config, &self.calendar, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekday;
    use crate::cp::Constraint;
    use crate::rotation::{Bounds, CoveragePolicy};

    #[test]
    fn test_constraint_counts() {
        let config = RotationConfig::default()
            .with_workers(3)
            .with_days(10)
            .with_unavailable(0, [1, 2])
            .with_unavailable(2, [9]);
        let model = RotationModel::build(&config).unwrap();

        // 10 coverage + 3 workload + 3 fixed + 3 * 9 rest
        assert_eq!(model.cp_model().constraint_count(), 10 + 3 + 3 + 27);
        assert_eq!(model.cp_model().var_count(), 30);
        assert!(model.cp_model().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RotationConfig::default().with_shifts_per_worker(3, 2);
        assert!(RotationModel::build(&config).is_err());
    }

    #[test]
    fn test_var_handles_are_distinct() {
        let model = RotationModel::build(&RotationConfig::default().with_workers(4).with_days(5))
            .unwrap();
        let mut seen = BTreeSet::new();
        for w in 0..4 {
            for d in 0..5 {
                assert!(seen.insert(model.var(w, d)));
            }
        }
    }

    #[test]
    fn test_anchor_days_respect_horizon() {
        // Starting on Monday, Fridays fall on days 4, 11, 18, 25.
        let config = RotationConfig::default().with_days(26).with_weekend_pairing(true);
        let model = RotationModel::build(&config).unwrap();
        assert_eq!(
            model.anchor_days().iter().copied().collect::<Vec<_>>(),
            vec![4, 11, 18]
        );

        let implications = model
            .cp_model()
            .constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Implication { .. }))
            .count();
        assert_eq!(implications, 6 * 3);
    }

    #[test]
    fn test_pairing_offset_beyond_horizon() {
        let config = RotationConfig::default()
            .with_weekend_pairing(true)
            .with_pairing_offset(usize::MAX);
        assert!(config.validate().is_ok());

        let model = RotationModel::build(&config).unwrap();
        assert!(model.anchor_days().is_empty());
        assert!(!model
            .cp_model()
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::Implication { .. })));

        let grid = ShiftGrid::from_fn(6, 30, |w, d| d % 6 == w);
        assert!(!model
            .audit(&grid)
            .iter()
            .any(|v| matches!(v, Violation::Pairing { .. })));
    }

    #[test]
    fn test_pairing_disabled_adds_no_implications() {
        let model = RotationModel::build(&RotationConfig::default()).unwrap();
        assert!(!model
            .cp_model()
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::Implication { .. })));
    }

    #[test]
    fn test_weekday_dependent_coverage() {
        let coverage = CoveragePolicy::uniform(Bounds::new(1, 2))
            .with_weekend(Bounds::exactly(2), [Weekday::Friday, Weekday::Saturday]);
        let config = RotationConfig::default()
            .with_days(7)
            .with_first_weekday(Weekday::Friday)
            .with_coverage(coverage);
        let model = RotationModel::build(&config).unwrap();

        assert_eq!(
            model.weekend_days().iter().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );
        match &model.cp_model().constraints[0] {
            Constraint::Linear { min, max, .. } => assert_eq!((*min, *max), (2, 2)),
            other => panic!("unexpected {other:?}"),
        }
        match &model.cp_model().constraints[2] {
            Constraint::Linear { min, max, .. } => assert_eq!((*min, *max), (1, 2)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_objective_covers_weekend_cells() {
        let config = RotationConfig::default()
            .with_workers(2)
            .with_days(7)
            .with_minimize_weekend_load(true);
        let model = RotationModel::build(&config).unwrap();
        assert!(model.has_objective());
        let objective = model.cp_model().objective.as_ref().unwrap();
        let mut cells: Vec<VarId> = objective.terms.iter().map(|&(v, _)| v).collect();
        cells.sort();
        let mut expected = vec![
            model.var(0, 5),
            model.var(1, 5),
            model.var(0, 6),
            model.var(1, 6),
        ];
        expected.sort();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_read_and_encode_round_trip() {
        let model =
            RotationModel::build(&RotationConfig::default().with_workers(3).with_days(4)).unwrap();
        let grid = ShiftGrid::from_fn(3, 4, |w, d| w == d % 3);
        let values = model.encode_grid(&grid);
        let solution = CpSolution::new(values, None);
        assert_eq!(model.read_grid(&solution), grid);
    }

    #[test]
    fn test_single_day_has_no_rest_rows() {
        let config = RotationConfig::default()
            .with_workers(2)
            .with_days(1)
            .with_shifts_per_worker(0, 1);
        let model = RotationModel::build(&config).unwrap();
        assert_eq!(model.cp_model().constraint_count(), 1 + 2);
    }
}
