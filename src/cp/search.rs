//! Depth-first search over boolean models.
//!
//! # Algorithm
//!
//! 1. Every constraint is normalized into a linear row `min <= sum <= max`
//!    with merged coefficients. Implications become `a - b <= 0`, fixings
//!    become single-term rows.
//! 2. Bounds propagation: for each row, the reachable sum interval
//!    `[lo, hi]` given the current partial assignment is computed. An
//!    empty intersection with `[min, max]` is a conflict; an unassigned
//!    term whose value would push the sum out of range is forced.
//! 3. Branch on the first unassigned variable, propagate, recurse,
//!    undo through a trail.
//! 4. Minimization keeps the objective as a row whose upper bound is
//!    tightened to `best - 1` after each solution (branch and bound).
//! 5. A stop request from the callback is honored at the next branch that
//!    survives propagation. When no such branch is left the tree counts as
//!    exhausted.
//!
//! # Reference
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming", Ch. 4

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::model::{Constraint, CpModel};
use super::solver::{
    CpSolution, CpSolver, SearchCommand, SearchOutcome, SearchStats, SolutionCallback,
    SolverConfig, SolverStatus,
};

/// Time limit is polled once per this many branches.
const CLOCK_POLL_INTERVAL: u64 = 256;

/// A complete backtracking solver for boolean models.
///
/// Exhaustive: enumeration reports every feasible assignment exactly once,
/// and minimization proves optimality when it runs to completion. Intended
/// for small rosters; large horizons should bound the run with a solution
/// ceiling or [`SolverConfig`] limits.
///
/// # Examples
///
/// ```
/// use u_rotation::cp::{
///     BacktrackSolver, CpModel, CpSolution, CpSolver, SearchCommand, SolverConfig, SolverStatus,
/// };
///
/// let mut model = CpModel::new("pick-one");
/// let vars: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{i}"))).collect();
/// model.add_linear(vars.iter().map(|&v| (v, 1)).collect(), 1, 1);
///
/// let mut count = 0;
/// let outcome = BacktrackSolver::new().search_all(&model, &SolverConfig::default(), &mut |_: &CpSolution| {
///     count += 1;
///     SearchCommand::Continue
/// });
/// assert_eq!(outcome.status, SolverStatus::AllSolutions);
/// assert_eq!(count, 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackSolver;

impl BacktrackSolver {
    pub fn new() -> Self {
        Self
    }

    fn run(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        callback: &mut dyn SolutionCallback,
        minimize: bool,
    ) -> SearchOutcome {
        if let Err(reason) = model.validate() {
            trace!(event = "model_invalid", %reason);
            return SearchOutcome::empty(SolverStatus::ModelInvalid);
        }

        let start = Instant::now();
        let mut search = Search::new(model, config, callback, minimize, start);
        search.solve();

        let status = match search.halt {
            Some(Halt::Interrupted) => SolverStatus::Interrupted,
            Some(Halt::Timeout) => SolverStatus::Timeout,
            Some(Halt::BranchLimit) => SolverStatus::BranchLimit,
            Some(Halt::Proven) | None => match (search.solutions > 0, minimize) {
                (false, _) => SolverStatus::Infeasible,
                (true, true) => SolverStatus::Optimal,
                (true, false) => SolverStatus::AllSolutions,
            },
        };

        SearchOutcome {
            status,
            stats: SearchStats {
                conflicts: search.conflicts,
                branches: search.branches,
                wall_time: start.elapsed(),
            },
            solutions: search.solutions,
            best_objective: search.best,
        }
    }
}

impl CpSolver for BacktrackSolver {
    fn search_all(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        callback: &mut dyn SolutionCallback,
    ) -> SearchOutcome {
        self.run(model, config, callback, false)
    }

    fn minimize(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        callback: &mut dyn SolutionCallback,
    ) -> SearchOutcome {
        self.run(model, config, callback, true)
    }
}

/// Why the search stopped before exhausting the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Interrupted,
    Timeout,
    BranchLimit,
    /// Nothing better can exist (minimizing a model without objective).
    Proven,
}

#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(usize, i64)>,
    min: i64,
    max: i64,
}

impl Row {
    fn new(terms: &[(usize, i64)], min: i64, max: i64) -> Self {
        let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
        for &(var, coef) in terms {
            *merged.entry(var).or_insert(0) += coef;
        }
        Self {
            terms: merged.into_iter().filter(|&(_, c)| c != 0).collect(),
            min,
            max,
        }
    }
}

struct Search<'a> {
    rows: Vec<Row>,
    watches: Vec<Vec<usize>>,
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    queue: Vec<usize>,
    queued: Vec<bool>,
    objective_row: Option<usize>,
    objective_terms: Option<Vec<(usize, i64)>>,
    minimize: bool,
    callback: &'a mut dyn SolutionCallback,
    rng: Option<StdRng>,
    deadline: Option<Instant>,
    branch_limit: u64,
    cancel: Option<Arc<AtomicBool>>,
    stop_requested: bool,
    conflicts: u64,
    branches: u64,
    solutions: u64,
    best: Option<i64>,
    halt: Option<Halt>,
}

impl<'a> Search<'a> {
    fn new(
        model: &CpModel,
        config: &SolverConfig,
        callback: &'a mut dyn SolutionCallback,
        minimize: bool,
        start: Instant,
    ) -> Self {
        let n = model.var_count();
        let mut rows: Vec<Row> = model
            .constraints
            .iter()
            .map(|c| match c {
                Constraint::Linear { terms, min, max } => {
                    let terms: Vec<(usize, i64)> = terms.iter().map(|&(v, c)| (v.0, c)).collect();
                    Row::new(&terms, *min, *max)
                }
                Constraint::Implication {
                    antecedent,
                    consequent,
                } => Row::new(&[(antecedent.0, 1), (consequent.0, -1)], -1, 0),
                Constraint::Fixed { var, value } => {
                    let v = i64::from(*value);
                    Row::new(&[(var.0, 1)], v, v)
                }
            })
            .collect();

        let objective_terms: Option<Vec<(usize, i64)>> = model
            .objective
            .as_ref()
            .map(|o| o.terms.iter().map(|&(v, c)| (v.0, c)).collect());

        let objective_row = match (&objective_terms, minimize) {
            (Some(terms), true) => {
                rows.push(Row::new(terms, i64::MIN, i64::MAX));
                Some(rows.len() - 1)
            }
            _ => None,
        };

        let mut watches = vec![Vec::new(); n];
        for (r, row) in rows.iter().enumerate() {
            for &(var, _) in &row.terms {
                watches[var].push(r);
            }
        }

        let deadline = (config.time_limit_ms > 0)
            .then(|| start + Duration::from_millis(config.time_limit_ms));

        Self {
            queued: vec![false; rows.len()],
            rows,
            watches,
            values: vec![None; n],
            trail: Vec::with_capacity(n),
            queue: Vec::new(),
            objective_row,
            objective_terms,
            minimize,
            callback,
            rng: config.seed.map(StdRng::seed_from_u64),
            deadline,
            branch_limit: config.branch_limit,
            cancel: config.cancel.clone(),
            stop_requested: false,
            conflicts: 0,
            branches: 0,
            solutions: 0,
            best: None,
            halt: None,
        }
    }

    fn solve(&mut self) {
        for r in 0..self.rows.len() {
            self.enqueue(r);
        }
        if self.propagate() {
            self.dfs();
        }
    }

    /// Explores the subtree below the current assignment. Returns `true`
    /// when the whole search must halt.
    fn dfs(&mut self) -> bool {
        let Some(var) = self.values.iter().position(Option::is_none) else {
            return self.on_leaf();
        };

        let first = match self.rng.as_mut() {
            Some(rng) => rng.random_bool(0.5),
            None => false,
        };

        for value in [first, !first] {
            if !self.stop_requested && self.limit_reached() {
                return true;
            }
            self.branches += 1;

            let mark = self.trail.len();
            self.assign(var, value);
            if let Some(r) = self.objective_row {
                self.enqueue(r);
            }
            let consistent = self.propagate();
            if consistent && self.stop_requested {
                self.undo(mark);
                self.halt = Some(Halt::Interrupted);
                return true;
            }
            let halted = consistent && self.dfs();
            self.undo(mark);
            if halted {
                return true;
            }
        }
        false
    }

    fn on_leaf(&mut self) -> bool {
        let values: Vec<bool> = self.values.iter().map(|v| v.unwrap_or(false)).collect();
        let objective = self.objective_terms.as_ref().map(|terms| {
            terms
                .iter()
                .filter(|&&(var, _)| values[var])
                .map(|&(_, c)| c)
                .sum::<i64>()
        });

        self.solutions += 1;
        if self.minimize {
            self.best = Some(objective.unwrap_or(0));
        } else if objective.is_some() {
            self.best = match (self.best, objective) {
                (Some(b), Some(o)) => Some(b.min(o)),
                (_, o) => o,
            };
        }

        let solution = CpSolution::new(values, objective);
        if self.callback.on_solution(&solution) == SearchCommand::Stop {
            self.stop_requested = true;
        }

        if self.minimize {
            match (self.objective_row, objective) {
                (Some(r), Some(value)) => self.rows[r].max = value - 1,
                _ => {
                    self.halt = Some(Halt::Proven);
                    return true;
                }
            }
        }
        false
    }

    fn limit_reached(&mut self) -> bool {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            self.halt = Some(Halt::Interrupted);
            return true;
        }
        if self.branch_limit > 0 && self.branches >= self.branch_limit {
            self.halt = Some(Halt::BranchLimit);
            return true;
        }
        if let Some(deadline) = self.deadline {
            if self.branches % CLOCK_POLL_INTERVAL == 0 && Instant::now() >= deadline {
                self.halt = Some(Halt::Timeout);
                return true;
            }
        }
        false
    }

    fn enqueue(&mut self, row: usize) {
        if !self.queued[row] {
            self.queued[row] = true;
            self.queue.push(row);
        }
    }

    fn assign(&mut self, var: usize, value: bool) {
        self.values[var] = Some(value);
        self.trail.push(var);
        for i in 0..self.watches[var].len() {
            let r = self.watches[var][i];
            self.enqueue(r);
        }
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                self.values[var] = None;
            }
        }
    }

    fn clear_queue(&mut self) {
        for r in self.queue.drain(..) {
            self.queued[r] = false;
        }
    }

    /// Runs bounds propagation to a fixpoint. Returns `false` on conflict.
    fn propagate(&mut self) -> bool {
        while let Some(r) = self.queue.pop() {
            self.queued[r] = false;

            let (mut lo, mut hi) = (0i64, 0i64);
            for &(var, c) in &self.rows[r].terms {
                match self.values[var] {
                    Some(true) => {
                        lo += c;
                        hi += c;
                    }
                    Some(false) => {}
                    None if c > 0 => hi += c,
                    None => lo += c,
                }
            }

            let (min, max) = (self.rows[r].min, self.rows[r].max);
            if lo > max || hi < min {
                self.conflicts += 1;
                trace!(event = "conflict", row = r, lo, hi, min, max);
                self.clear_queue();
                return false;
            }

            // Bounds are only tightened by forced assignments, and the row
            // is re-queued by them, so stale `lo`/`hi` here stay sound.
            for i in 0..self.rows[r].terms.len() {
                let (var, c) = self.rows[r].terms[i];
                if self.values[var].is_some() {
                    continue;
                }
                let forced = if c > 0 {
                    if lo + c > max {
                        Some(false)
                    } else if hi - c < min {
                        Some(true)
                    } else {
                        None
                    }
                } else if hi + c < min {
                    Some(false)
                } else if lo - c > max {
                    Some(true)
                } else {
                    None
                };
                if let Some(value) = forced {
                    self.assign(var, value);
                }
            }
        }
        true
    }
}
