//! Rotation problem configuration.

use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::Weekday;
use crate::error::{Result, RotationError};

/// A closed integer interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// The single-point interval `[value, value]`.
    pub fn exactly(value: i64) -> Self {
        Self::new(value, value)
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, what: &str) -> Result<()> {
        if self.min < 0 || self.max < 0 {
            return Err(RotationError::invalid(format!(
                "{what} bounds must be non-negative, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(RotationError::invalid(format!(
                "{what} min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// How many workers each day needs, by weekday class.
///
/// Days whose weekday is in `weekend_days` use `weekend`; all others use
/// `weekday`. The same classification defines the weekend load objective.
///
/// # Examples
///
/// ```
/// use u_rotation::calendar::Weekday;
/// use u_rotation::rotation::{Bounds, CoveragePolicy};
///
/// // Exactly 2 on Friday/Saturday, between 1 and 2 otherwise.
/// let policy = CoveragePolicy::uniform(Bounds::new(1, 2))
///     .with_weekend(Bounds::exactly(2), [Weekday::Friday, Weekday::Saturday]);
/// assert_eq!(policy.bounds_for(Weekday::Friday), Bounds::exactly(2));
/// assert_eq!(policy.bounds_for(Weekday::Sunday), Bounds::new(1, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoveragePolicy {
    /// Bounds on ordinary days.
    pub weekday: Bounds,
    /// Bounds on weekend days.
    pub weekend: Bounds,
    /// Weekdays classified as weekend.
    pub weekend_days: BTreeSet<Weekday>,
}

impl CoveragePolicy {
    /// Same bounds every day; Saturday and Sunday form the weekend.
    pub fn uniform(bounds: Bounds) -> Self {
        Self {
            weekday: bounds,
            weekend: bounds,
            weekend_days: [Weekday::Saturday, Weekday::Sunday].into_iter().collect(),
        }
    }

    /// Replaces the weekend bounds and the weekend weekday set.
    pub fn with_weekend(
        mut self,
        bounds: Bounds,
        days: impl IntoIterator<Item = Weekday>,
    ) -> Self {
        self.weekend = bounds;
        self.weekend_days = days.into_iter().collect();
        self
    }

    #[inline]
    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        self.weekend_days.contains(&weekday)
    }

    /// Coverage bounds for a day falling on `weekday`.
    #[inline]
    pub fn bounds_for(&self, weekday: Weekday) -> Bounds {
        if self.is_weekend(weekday) {
            self.weekend
        } else {
            self.weekday
        }
    }
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self::uniform(Bounds::new(1, 2))
    }
}

/// Configuration of one rotation run.
///
/// # Examples
///
/// ```
/// use u_rotation::calendar::Weekday;
/// use u_rotation::rotation::RotationConfig;
///
/// let config = RotationConfig::default()
///     .with_workers(4)
///     .with_days(14)
///     .with_first_weekday(Weekday::Wednesday)
///     .with_unavailable(2, [3, 4])
///     .with_shifts_per_worker(2, 5)
///     .with_weekend_pairing(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationConfig {
    /// Roster size.
    pub num_workers: usize,
    /// Horizon length in days.
    pub num_days: usize,
    /// Weekday of day 0.
    pub first_weekday: Weekday,
    /// Requested days off, per worker. Workers without an entry are
    /// always available.
    pub unavailable: BTreeMap<usize, BTreeSet<usize>>,
    /// Allowed number of worked days per worker over the horizon.
    pub shifts_per_worker: Bounds,
    /// Allowed number of workers per day.
    pub coverage: CoveragePolicy,
    /// Whether working an anchor day obliges working `anchor + offset`.
    pub enforce_weekend_pairing: bool,
    /// Weekday of pairing anchors.
    pub pairing_anchor: Weekday,
    /// Distance in days from an anchor to its paired day.
    pub pairing_offset: usize,
    /// Minimize the total number of weekend assignments.
    pub minimize_weekend_load: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            num_workers: 6,
            num_days: 30,
            first_weekday: Weekday::Monday,
            unavailable: BTreeMap::new(),
            shifts_per_worker: Bounds::new(4, 8),
            coverage: CoveragePolicy::default(),
            enforce_weekend_pairing: false,
            pairing_anchor: Weekday::Friday,
            pairing_offset: 2,
            minimize_weekend_load: false,
        }
    }
}

impl RotationConfig {
    /// Six residents over a 30-day month, each with four requested days
    /// off, 1–2 residents on duty per day and 4–8 duties each.
    pub fn residency_month() -> Self {
        let days_off: [[usize; 4]; 6] = [
            [1, 7, 14, 23],
            [3, 14, 18, 20],
            [8, 10, 18, 29],
            [1, 8, 12, 25],
            [5, 6, 7, 8],
            [3, 8, 12, 20],
        ];
        days_off
            .into_iter()
            .enumerate()
            .fold(Self::default(), |config, (worker, days)| {
                config.with_unavailable(worker, days)
            })
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_days(mut self, n: usize) -> Self {
        self.num_days = n;
        self
    }

    pub fn with_first_weekday(mut self, weekday: Weekday) -> Self {
        self.first_weekday = weekday;
        self
    }

    /// Adds requested days off for `worker`.
    pub fn with_unavailable(mut self, worker: usize, days: impl IntoIterator<Item = usize>) -> Self {
        self.unavailable.entry(worker).or_default().extend(days);
        self
    }

    pub fn with_shifts_per_worker(mut self, min: i64, max: i64) -> Self {
        self.shifts_per_worker = Bounds::new(min, max);
        self
    }

    pub fn with_coverage(mut self, coverage: CoveragePolicy) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn with_weekend_pairing(mut self, enabled: bool) -> Self {
        self.enforce_weekend_pairing = enabled;
        self
    }

    pub fn with_pairing_anchor(mut self, anchor: Weekday) -> Self {
        self.pairing_anchor = anchor;
        self
    }

    pub fn with_pairing_offset(mut self, offset: usize) -> Self {
        self.pairing_offset = offset;
        self
    }

    pub fn with_minimize_weekend_load(mut self, enabled: bool) -> Self {
        self.minimize_weekend_load = enabled;
        self
    }

    /// Days off requested by `worker`.
    pub fn unavailable_days(&self, worker: usize) -> impl Iterator<Item = usize> + '_ {
        self.unavailable.get(&worker).into_iter().flatten().copied()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers < 1 {
            return Err(RotationError::invalid("num_workers must be at least 1"));
        }
        if self.num_days < 1 {
            return Err(RotationError::invalid("num_days must be at least 1"));
        }
        self.shifts_per_worker.check("shifts_per_worker")?;
        self.coverage.weekday.check("weekday coverage")?;
        self.coverage.weekend.check("weekend coverage")?;
        if self.pairing_offset == 0 {
            return Err(RotationError::invalid("pairing_offset must be positive"));
        }
        for (&worker, days) in &self.unavailable {
            if worker >= self.num_workers {
                return Err(RotationError::invalid(format!(
                    "unavailable days given for worker {worker}, roster has {}",
                    self.num_workers
                )));
            }
            if let Some(&day) = days.iter().find(|&&d| d >= self.num_days) {
                return Err(RotationError::invalid(format!(
                    "worker {worker} unavailable on day {day}, horizon is {} days",
                    self.num_days
                )));
            }
        }
        Ok(())
    }
}
