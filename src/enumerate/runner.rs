//! Enumeration loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cp::{CpSolution, CpSolver, SearchCommand, SearchOutcome, SolverConfig, SolverStatus};
use crate::error::{RotationError, Result};
use crate::report::assemble;
use crate::rotation::{RotationConfig, RotationModel};

use super::config::{CountConvention, EnumeratorConfig};
use super::types::{ReportSink, RunOutcome, RunState, RunStatistics, SolveMode};

/// Drives a solver over a [`RotationModel`], counting solutions, reporting
/// the requested ones and enforcing the solution ceiling.
///
/// The mode follows the model: a model with a weekend-load objective is
/// optimized, any other model is enumerated.
///
/// # Examples
///
/// ```
/// use u_rotation::cp::BacktrackSolver;
/// use u_rotation::enumerate::{EnumeratorConfig, RunState, SolutionEnumerator};
/// use u_rotation::report::SolutionReport;
/// use u_rotation::rotation::{Bounds, CoveragePolicy, RotationConfig, RotationModel};
///
/// let config = RotationConfig::default()
///     .with_workers(2)
///     .with_days(5)
///     .with_coverage(CoveragePolicy::uniform(Bounds::exactly(1)))
///     .with_shifts_per_worker(2, 3);
/// let model = RotationModel::build(&config).unwrap();
///
/// let mut enumerator = SolutionEnumerator::new(&model, EnumeratorConfig::default()).unwrap();
/// let mut reports: Vec<SolutionReport> = Vec::new();
/// let outcome = enumerator.run(&BacktrackSolver::new(), &mut reports).unwrap();
///
/// assert_eq!(outcome.state, RunState::ExhaustedProof);
/// assert_eq!(outcome.statistics.solution_count, 2);
/// assert_eq!(reports.len(), 2);
/// ```
#[derive(Debug)]
pub struct SolutionEnumerator<'m> {
    model: &'m RotationModel,
    config: EnumeratorConfig,
    state: RunState,
}

impl<'m> SolutionEnumerator<'m> {
    /// Creates an idle enumerator. Fails on an invalid configuration.
    pub fn new(model: &'m RotationModel, config: EnumeratorConfig) -> Result<Self> {
        config.validate().map_err(RotationError::InvalidConfig)?;
        Ok(Self {
            model,
            config,
            state: RunState::Idle,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    pub fn mode(&self) -> SolveMode {
        if self.model.has_objective() {
            SolveMode::Optimize
        } else {
            SolveMode::EnumerateAll
        }
    }

    /// Runs the solver to a terminal state.
    ///
    /// Each call is an independent run.
    pub fn run<S, K>(&mut self, solver: &S, sink: &mut K) -> Result<RunOutcome>
    where
        S: CpSolver + ?Sized,
        K: ReportSink + ?Sized,
    {
        self.run_with_cancel(solver, sink, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is handed to the solver, which polls it before every
    /// decision, and is checked again after each observed solution. Raising
    /// it ends the run in [`RunState::StoppedEarly`] with `cancelled` set,
    /// even when no solution has been found yet. A token given here takes
    /// precedence over one in the solver settings.
    pub fn run_with_cancel<S, K>(
        &mut self,
        solver: &S,
        sink: &mut K,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunOutcome>
    where
        S: CpSolver + ?Sized,
        K: ReportSink + ?Sized,
    {
        let mode = self.mode();
        let model = self.model;
        let limit = self.config.solution_limit;
        let indices = &self.config.report_indices;
        let cancel = cancel.or_else(|| self.config.solver.cancel.clone());
        let solver_config = SolverConfig {
            cancel: cancel.clone(),
            ..self.config.solver.clone()
        };
        let start = Instant::now();

        self.state = RunState::Running;
        info!(event = "run_start", mode = %mode, limit);

        let mut observed = 0u64;
        let mut reports = 0u64;
        let mut ceiling_hit = false;
        let mut cancelled = false;

        let mut on_solution = |solution: &CpSolution| -> SearchCommand {
            observed += 1;
            let index = observed - 1;

            let reported = indices.contains(&index);
            if reported {
                let grid = model.read_grid(solution);
                sink.on_report(assemble(index, &grid, model.calendar()));
                reports += 1;
            }
            debug!(
                event = "solution",
                index,
                objective = ?solution.objective_value(),
                reported
            );

            if observed >= limit {
                ceiling_hit = true;
                return SearchCommand::Stop;
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    return SearchCommand::Stop;
                }
            }
            SearchCommand::Continue
        };

        let outcome = match mode {
            SolveMode::EnumerateAll => {
                solver.search_all(model.cp_model(), &solver_config, &mut on_solution)
            }
            SolveMode::Optimize => {
                solver.minimize(model.cp_model(), &solver_config, &mut on_solution)
            }
        };

        let cancelled = cancelled
            || (outcome.status == SolverStatus::Interrupted
                && !ceiling_hit
                && cancel
                    .as_ref()
                    .is_some_and(|flag| flag.load(Ordering::Relaxed)));
        let terminal = classify(mode, ceiling_hit || cancelled, &outcome);
        let stopped_early = matches!(terminal, Ok((RunState::StoppedEarly, _)));

        let statistics = RunStatistics {
            solutions_observed: observed,
            solution_count: match self.config.count_convention {
                CountConvention::ExcludeTrigger if ceiling_hit && stopped_early => {
                    observed.saturating_sub(1)
                }
                _ => observed,
            },
            reports_emitted: reports,
            conflicts: outcome.stats.conflicts,
            branches: outcome.stats.branches,
            wall_time: start.elapsed(),
        };

        let (state, proven_optimal) = match terminal {
            Ok(terminal) => terminal,
            Err(reason) => {
                self.state = RunState::Aborted;
                warn!(
                    event = "solver_aborted",
                    mode = %mode,
                    status = %outcome.status,
                    observed,
                    conflicts = statistics.conflicts,
                    branches = statistics.branches,
                );
                return Err(RotationError::SolverAborted { reason, statistics });
            }
        };
        self.state = state;

        info!(
            event = "run_end",
            mode = %mode,
            state = %state,
            observed,
            count = statistics.solution_count,
            conflicts = statistics.conflicts,
            branches = statistics.branches,
            elapsed_ms = statistics.wall_time.as_millis() as u64,
        );

        Ok(RunOutcome {
            state,
            mode,
            statistics,
            objective: match mode {
                SolveMode::Optimize => outcome.best_objective,
                SolveMode::EnumerateAll => None,
            },
            proven_optimal: mode == SolveMode::Optimize && proven_optimal,
            cancelled: cancelled && stopped_early,
        })
    }
}

/// Maps the solver's final status to a terminal state and whether the
/// result is proven, or to the reason the run must abort.
///
/// A stop request that arrived when nothing was left to explore still ends
/// in a proven state.
fn classify(
    mode: SolveMode,
    stopped: bool,
    outcome: &SearchOutcome,
) -> std::result::Result<(RunState, bool), String> {
    if stopped && !outcome.status.is_proven() {
        return Ok((RunState::StoppedEarly, false));
    }
    match (mode, outcome.status) {
        (_, SolverStatus::ModelInvalid) => Err("constraint model rejected by solver".into()),
        (SolveMode::EnumerateAll, SolverStatus::AllSolutions | SolverStatus::Infeasible) => {
            Ok((RunState::ExhaustedProof, true))
        }
        (SolveMode::Optimize, status) if status.is_proven() => Ok((RunState::Completed, true)),
        (SolveMode::Optimize, status) if status.is_limit() && outcome.is_solution_found() => {
            Ok((RunState::Completed, false))
        }
        (_, status) if status.is_limit() => Err(format!("{status} reached")),
        (_, status) => Err(format!("unexpected solver status: {status}")),
    }
}

/// Builds the model for `rotation` and runs it to completion.
///
/// Configuration errors surface before any solving starts.
pub fn solve<S, K>(
    rotation: &RotationConfig,
    config: &EnumeratorConfig,
    solver: &S,
    sink: &mut K,
) -> Result<RunOutcome>
where
    S: CpSolver + ?Sized,
    K: ReportSink + ?Sized,
{
    config.validate().map_err(RotationError::InvalidConfig)?;
    let model = RotationModel::build(rotation)?;
    SolutionEnumerator::new(&model, config.clone())?.run(solver, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekday;
    use crate::cp::{BacktrackSolver, CpModel, SearchStats, SolutionCallback};
    use crate::report::SolutionReport;
    use crate::rotation::{Bounds, CoveragePolicy, ShiftGrid};
    use std::collections::BTreeSet;

    /// Replays canned solutions, then reports a fixed status.
    struct ScriptedSolver {
        solutions: Vec<Vec<bool>>,
        status: SolverStatus,
    }

    impl ScriptedSolver {
        fn replay(&self, callback: &mut dyn SolutionCallback, objective: bool) -> SearchOutcome {
            let mut outcome = SearchOutcome::empty(self.status);
            outcome.stats = SearchStats {
                conflicts: 3,
                branches: 11,
                ..SearchStats::default()
            };
            for (i, values) in self.solutions.iter().enumerate() {
                let value = objective.then_some(10 - i as i64);
                outcome.solutions += 1;
                outcome.best_objective = value;
                let solution = CpSolution::new(values.clone(), value);
                if callback.on_solution(&solution) == SearchCommand::Stop {
                    outcome.status = SolverStatus::Interrupted;
                    break;
                }
            }
            outcome
        }
    }

    impl CpSolver for ScriptedSolver {
        fn search_all(
            &self,
            _model: &CpModel,
            _config: &SolverConfig,
            callback: &mut dyn SolutionCallback,
        ) -> SearchOutcome {
            self.replay(callback, false)
        }

        fn minimize(
            &self,
            _model: &CpModel,
            _config: &SolverConfig,
            callback: &mut dyn SolutionCallback,
        ) -> SearchOutcome {
            self.replay(callback, true)
        }
    }

    fn alternating_config() -> RotationConfig {
        RotationConfig::default()
            .with_workers(2)
            .with_days(5)
            .with_coverage(CoveragePolicy::uniform(Bounds::exactly(1)))
            .with_shifts_per_worker(2, 3)
    }

    fn single_worker_config() -> RotationConfig {
        RotationConfig::default()
            .with_workers(1)
            .with_days(3)
            .with_unavailable(0, [1])
            .with_coverage(CoveragePolicy::uniform(Bounds::new(0, 1)))
            .with_shifts_per_worker(0, 3)
    }

    fn enumerate_all(config: &RotationConfig, limit: u64) -> (RunOutcome, Vec<SolutionReport>) {
        let mut reports: Vec<SolutionReport> = Vec::new();
        let outcome = solve(
            config,
            &EnumeratorConfig::default()
                .with_first_reports(limit)
                .with_solution_limit(limit),
            &BacktrackSolver::new(),
            &mut reports,
        )
        .unwrap();
        (outcome, reports)
    }

    fn discard() -> Vec<SolutionReport> {
        Vec::new()
    }

    fn grid_of(report: &SolutionReport, workers: usize, days: usize) -> ShiftGrid {
        ShiftGrid::from_fn(workers, days, |w, d| report.workers[w].days.contains(&(d + 1)))
    }

    fn brute_force(config: &RotationConfig) -> BTreeSet<ShiftGrid> {
        let model = RotationModel::build(config).unwrap();
        let (workers, days) = (config.num_workers, config.num_days);
        let cells = workers * days;
        (0u64..1 << cells)
            .map(|mask| ShiftGrid::from_fn(workers, days, |w, d| (mask >> (w * days + d)) & 1 == 1))
            .filter(|grid| model.audit(grid).is_empty())
            .collect()
    }

    #[test]
    fn test_alternating_schedule() {
        let (outcome, reports) = enumerate_all(&alternating_config(), 100);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.mode, SolveMode::EnumerateAll);
        assert_eq!(outcome.statistics.solution_count, 2);
        assert_eq!(outcome.objective, None);

        let schedules: BTreeSet<(Vec<usize>, Vec<usize>)> = reports
            .iter()
            .map(|r| (r.workers[0].days.clone(), r.workers[1].days.clone()))
            .collect();
        let expected: BTreeSet<_> = [
            (vec![1, 3, 5], vec![2, 4]),
            (vec![2, 4], vec![1, 3, 5]),
        ]
        .into_iter()
        .collect();
        assert_eq!(schedules, expected);
    }

    #[test]
    fn test_day_off_respected() {
        let (outcome, reports) = enumerate_all(&single_worker_config(), 100);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.statistics.solution_count, 4);

        let schedules: BTreeSet<Vec<usize>> =
            reports.iter().map(|r| r.workers[0].days.clone()).collect();
        let expected: BTreeSet<Vec<usize>> =
            [vec![], vec![1], vec![3], vec![1, 3]].into_iter().collect();
        assert_eq!(schedules, expected);
    }

    #[test]
    fn test_matches_brute_force() {
        let config = RotationConfig::default()
            .with_workers(3)
            .with_days(4)
            .with_first_weekday(Weekday::Friday)
            .with_unavailable(1, [0])
            .with_shifts_per_worker(1, 2);
        let expected = brute_force(&config);

        let (outcome, reports) = enumerate_all(&config, 10_000);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.statistics.solution_count, expected.len() as u64);

        let found: BTreeSet<ShiftGrid> = reports.iter().map(|r| grid_of(r, 3, 4)).collect();
        assert_eq!(found.len(), reports.len());
        assert_eq!(found, expected);
    }

    #[test]
    fn test_pairing_matches_brute_force() {
        // Fridays on day 0 only; day 7 has no paired day inside the horizon.
        let config = RotationConfig::default()
            .with_workers(2)
            .with_days(8)
            .with_first_weekday(Weekday::Friday)
            .with_shifts_per_worker(2, 4)
            .with_weekend_pairing(true);
        let expected = brute_force(&config);
        assert!(!expected.is_empty());

        let (outcome, reports) = enumerate_all(&config, 10_000);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        let found: BTreeSet<ShiftGrid> = reports.iter().map(|r| grid_of(r, 2, 8)).collect();
        assert_eq!(found, expected);
        for grid in &found {
            for w in 0..2 {
                assert!(!grid.is_assigned(w, 0) || grid.is_assigned(w, 2));
            }
        }
    }

    #[test]
    fn test_infeasible_is_exhausted_with_zero() {
        // Two workers cannot cover five days with at most one shift each.
        let config = alternating_config().with_shifts_per_worker(0, 1);
        let (outcome, reports) = enumerate_all(&config, 100);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.statistics.solution_count, 0);
        assert!(outcome.is_infeasible());
        assert!(reports.is_empty());
    }

    #[test]
    fn test_ceiling_stops_early() {
        let model = RotationModel::build(&single_worker_config()).unwrap();
        let config = EnumeratorConfig::default().with_solution_limit(3);
        let mut enumerator = SolutionEnumerator::new(&model, config).unwrap();
        assert_eq!(enumerator.state(), RunState::Idle);

        let mut reports: Vec<SolutionReport> = Vec::new();
        let outcome = enumerator.run(&BacktrackSolver::new(), &mut reports).unwrap();
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert_eq!(enumerator.state(), RunState::StoppedEarly);
        assert_eq!(outcome.statistics.solutions_observed, 3);
        assert_eq!(outcome.statistics.solution_count, 3);
        assert_eq!(reports.len(), 3);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_exclude_trigger_convention() {
        let config = EnumeratorConfig::default()
            .with_solution_limit(3)
            .with_count_convention(CountConvention::ExcludeTrigger);
        let mut reports: Vec<SolutionReport> = Vec::new();
        let outcome = solve(
            &single_worker_config(),
            &config,
            &BacktrackSolver::new(),
            &mut reports,
        )
        .unwrap();
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert_eq!(outcome.statistics.solutions_observed, 3);
        assert_eq!(outcome.statistics.solution_count, 2);
        // The triggering solution is still reported.
        assert_eq!(reports.len(), 3);

        // Without an early stop both conventions agree.
        let config = config.with_solution_limit(100);
        let outcome = solve(
            &single_worker_config(),
            &config,
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap();
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.statistics.solution_count, 4);
    }

    #[test]
    fn test_report_indices_select_solutions() {
        let config = EnumeratorConfig::default().with_report_indices([1, 3, 99]);
        let mut seen = Vec::new();
        let mut sink = |r: SolutionReport| seen.push(r.index);
        let outcome = solve(
            &single_worker_config(),
            &config,
            &BacktrackSolver::new(),
            &mut sink,
        )
        .unwrap();
        assert_eq!(outcome.statistics.reports_emitted, 2);
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn test_optimize_matches_enumeration_minimum() {
        let base = RotationConfig::default()
            .with_workers(3)
            .with_days(7)
            .with_shifts_per_worker(1, 3);

        let (all, reports) = enumerate_all(&base, 10_000);
        assert_eq!(all.state, RunState::ExhaustedProof);
        let weekend = base.coverage.weekend_days.clone();
        let minimum = reports
            .iter()
            .map(|r| r.weekend_load(&weekend))
            .min()
            .unwrap();
        assert_eq!(minimum, 2);

        let mut improvements: Vec<SolutionReport> = Vec::new();
        let outcome = solve(
            &base.clone().with_minimize_weekend_load(true),
            &EnumeratorConfig::default().with_first_reports(100),
            &BacktrackSolver::new(),
            &mut improvements,
        )
        .unwrap();
        assert_eq!(outcome.mode, SolveMode::Optimize);
        assert_eq!(outcome.state, RunState::Completed);
        assert!(outcome.proven_optimal);
        assert_eq!(outcome.objective, Some(minimum as i64));

        let loads: Vec<usize> = improvements
            .iter()
            .map(|r| r.weekend_load(&weekend))
            .collect();
        assert!(loads.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(loads.last().copied(), Some(minimum));
    }

    #[test]
    fn test_optimize_infeasible_completes() {
        let config = alternating_config()
            .with_shifts_per_worker(0, 1)
            .with_minimize_weekend_load(true);
        let outcome = solve(
            &config,
            &EnumeratorConfig::default(),
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap();
        assert_eq!(outcome.state, RunState::Completed);
        assert!(outcome.proven_optimal);
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.objective, None);
    }

    #[test]
    fn test_branch_limit_aborts_enumeration() {
        let config = EnumeratorConfig::default()
            .with_solver(SolverConfig::default().with_branch_limit(5));
        let err = solve(
            &RotationConfig::residency_month(),
            &config,
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap_err();
        match err {
            RotationError::SolverAborted { statistics, .. } => {
                assert_eq!(statistics.branches, 5);
                assert_eq!(statistics.solutions_observed, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_scripted_limit_mapping() {
        let model = RotationModel::build(&single_worker_config()).unwrap();
        let opt_model =
            RotationModel::build(&single_worker_config().with_minimize_weekend_load(true))
                .unwrap();
        let solutions = vec![vec![true, false, false], vec![false, false, true]];

        // Enumeration cut short by a budget is an abort, with partial counts.
        let solver = ScriptedSolver {
            solutions: solutions.clone(),
            status: SolverStatus::Timeout,
        };
        let mut enumerator = SolutionEnumerator::new(&model, EnumeratorConfig::default()).unwrap();
        let err = enumerator.run(&solver, &mut discard()).unwrap_err();
        assert_eq!(enumerator.state(), RunState::Aborted);
        let stats = err.statistics().unwrap();
        assert_eq!(stats.solutions_observed, 2);
        assert_eq!(stats.conflicts, 3);
        assert_eq!(stats.branches, 11);

        // Optimization keeps its incumbent.
        let mut enumerator =
            SolutionEnumerator::new(&opt_model, EnumeratorConfig::default()).unwrap();
        let outcome = enumerator.run(&solver, &mut discard()).unwrap();
        assert_eq!(outcome.state, RunState::Completed);
        assert!(!outcome.proven_optimal);
        assert_eq!(outcome.objective, Some(9));

        // ...unless nothing was found.
        let empty = ScriptedSolver {
            solutions: Vec::new(),
            status: SolverStatus::BranchLimit,
        };
        let mut enumerator =
            SolutionEnumerator::new(&opt_model, EnumeratorConfig::default()).unwrap();
        assert!(matches!(
            enumerator.run(&empty, &mut discard()),
            Err(RotationError::SolverAborted { .. })
        ));

        let invalid = ScriptedSolver {
            solutions: Vec::new(),
            status: SolverStatus::ModelInvalid,
        };
        let mut enumerator = SolutionEnumerator::new(&model, EnumeratorConfig::default()).unwrap();
        assert!(enumerator.run(&invalid, &mut discard()).is_err());
    }

    #[test]
    fn test_optimize_ceiling_stops_early() {
        let opt_model =
            RotationModel::build(&single_worker_config().with_minimize_weekend_load(true))
                .unwrap();
        let solver = ScriptedSolver {
            solutions: vec![vec![true, false, false], vec![false, false, true]],
            status: SolverStatus::Optimal,
        };
        let config = EnumeratorConfig::default().with_solution_limit(1);
        let outcome = SolutionEnumerator::new(&opt_model, config)
            .unwrap()
            .run(&solver, &mut discard())
            .unwrap();
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert!(!outcome.proven_optimal);
        assert_eq!(outcome.statistics.solutions_observed, 1);
    }

    #[test]
    fn test_cancellation() {
        let model = RotationModel::build(&single_worker_config()).unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let config =
            EnumeratorConfig::default().with_count_convention(CountConvention::ExcludeTrigger);
        let mut enumerator = SolutionEnumerator::new(&model, config).unwrap();

        let raise = Arc::clone(&flag);
        let mut sink = |_: SolutionReport| raise.store(true, Ordering::Relaxed);
        let outcome = enumerator
            .run_with_cancel(&BacktrackSolver::new(), &mut sink, Some(flag))
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert_eq!(outcome.statistics.solutions_observed, 1);
        // Cancellation is not a ceiling hit; counts are untouched.
        assert_eq!(outcome.statistics.solution_count, 1);
    }

    #[test]
    fn test_cancellation_before_any_solution() {
        let model = RotationModel::build(&RotationConfig::residency_month()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let mut enumerator = SolutionEnumerator::new(&model, EnumeratorConfig::default()).unwrap();
        let outcome = enumerator
            .run_with_cancel(&BacktrackSolver::new(), &mut discard(), Some(flag))
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert_eq!(outcome.statistics.solutions_observed, 0);
        assert_eq!(outcome.statistics.branches, 0);
        assert!(!outcome.is_infeasible());
    }

    #[test]
    fn test_cancel_token_in_solver_settings() {
        let flag = Arc::new(AtomicBool::new(true));
        let config = EnumeratorConfig::default()
            .with_solver(SolverConfig::default().with_cancel(Arc::clone(&flag)));
        let outcome = solve(
            &RotationConfig::residency_month(),
            &config,
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.state, RunState::StoppedEarly);

        flag.store(false, Ordering::Relaxed);
        let outcome = solve(
            &single_worker_config(),
            &config,
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap();
        assert!(!outcome.cancelled);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
    }

    #[test]
    fn test_ceiling_equal_to_count_is_exhaustive() {
        for convention in [CountConvention::IncludeTrigger, CountConvention::ExcludeTrigger] {
            let config = EnumeratorConfig::default()
                .with_solution_limit(2)
                .with_count_convention(convention);
            let mut reports: Vec<SolutionReport> = Vec::new();
            let outcome = solve(
                &alternating_config(),
                &config,
                &BacktrackSolver::new(),
                &mut reports,
            )
            .unwrap();
            assert_eq!(outcome.state, RunState::ExhaustedProof);
            assert_eq!(outcome.statistics.solutions_observed, 2);
            assert_eq!(outcome.statistics.solution_count, 2);
            assert_eq!(reports.len(), 2);
            assert!(!outcome.is_infeasible());
        }

        // One below the true count still stops early.
        let (outcome, _) = enumerate_all(&alternating_config(), 1);
        assert_eq!(outcome.state, RunState::StoppedEarly);

        // Same for the 1×3 roster with four schedules.
        let (outcome, _) = enumerate_all(&single_worker_config(), 4);
        assert_eq!(outcome.state, RunState::ExhaustedProof);
        assert_eq!(outcome.statistics.solution_count, 4);
    }

    #[test]
    fn test_invalid_configs() {
        let err = solve(
            &RotationConfig::default().with_days(0),
            &EnumeratorConfig::default(),
            &BacktrackSolver::new(),
            &mut discard(),
        )
        .unwrap_err();
        assert!(matches!(err, RotationError::InvalidConfig(_)));
        assert!(err.statistics().is_none());

        let model = RotationModel::build(&single_worker_config()).unwrap();
        assert!(matches!(
            SolutionEnumerator::new(&model, EnumeratorConfig::default().with_solution_limit(0)),
            Err(RotationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_residency_month_first_solutions() {
        let rotation = RotationConfig::residency_month();
        let model = RotationModel::build(&rotation).unwrap();
        let mut reports: Vec<SolutionReport> = Vec::new();
        let config = EnumeratorConfig::default().with_solution_limit(5);
        let outcome = SolutionEnumerator::new(&model, config)
            .unwrap()
            .run(&BacktrackSolver::new(), &mut reports)
            .unwrap();
        assert_eq!(outcome.state, RunState::StoppedEarly);
        assert_eq!(reports.len(), 5);
        for report in &reports {
            let grid = grid_of(report, 6, 30);
            assert_eq!(model.audit(&grid), vec![]);
        }
    }
}
