//! Partition planner: splits a dataset into fragments with boundary predicates.

use super::error::{PlanningError, PlanningResult};
use super::fragment::{BoundValue, Boundary, Fragment};
use super::spec::{IntervalUnit, PartitionRange, PartitionSpec};
use crate::catalog::LiteralStyle;
use chrono::{Days, Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FRAGMENTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Upper bound on the number of fragments a single plan may produce
    pub max_fragments: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_fragments: DEFAULT_MAX_FRAGMENTS,
        }
    }
}

pub struct PartitionPlanner {
    config: PlannerConfig,
}

impl PartitionPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Plan fragments for a partition spec. Without a spec the dataset is a
    /// single unbounded fragment.
    pub fn plan(&self, spec: Option<&PartitionSpec>) -> PlanningResult<Vec<Fragment>> {
        let boundaries = match spec {
            None => vec![Boundary::Unbounded],
            Some(spec) => self.boundaries(spec)?,
        };

        let fragments = boundaries
            .iter()
            .enumerate()
            .map(|(index, boundary)| Fragment::new(index, boundary))
            .collect::<PlanningResult<Vec<_>>>()?;
        debug!("Planned {} fragments", fragments.len());
        Ok(fragments)
    }

    /// Boundaries of every fragment, in order.
    pub fn boundaries(&self, spec: &PartitionSpec) -> PlanningResult<Vec<Boundary>> {
        match &spec.range {
            PartitionRange::Date {
                start,
                end,
                count,
                unit,
            } => self.date_boundaries(&spec.column, *start, *end, *count, *unit),
            PartitionRange::Integer {
                start,
                end,
                interval,
            } => self.integer_boundaries(&spec.column, *start, *end, *interval),
            PartitionRange::Enumerated { values } => {
                self.check_limit(values.len())?;
                Ok(values
                    .iter()
                    .map(|value| Boundary::Value {
                        column: spec.column.clone(),
                        value: match spec.style {
                            LiteralStyle::Quoted => BoundValue::Text(value.clone()),
                            LiteralStyle::Bare => BoundValue::Number(value.clone()),
                        },
                    })
                    .collect())
            }
        }
    }

    fn date_boundaries(
        &self,
        column: &str,
        start: NaiveDate,
        end: NaiveDate,
        count: u32,
        unit: IntervalUnit,
    ) -> PlanningResult<Vec<Boundary>> {
        let mut boundaries = Vec::new();
        let mut lower = start;
        let mut step: u32 = 0;
        while lower < end {
            self.check_limit(boundaries.len() + 1)?;
            step += 1;
            // Offsets are taken from `start` so month-end clamping never drifts.
            let upper = step_date(start, step, count, unit)
                .filter(|date| *date < end)
                .unwrap_or(end);
            boundaries.push(Boundary::Range {
                column: column.to_string(),
                lower: BoundValue::Date(lower),
                upper: BoundValue::Date(upper),
            });
            lower = upper;
        }
        Ok(boundaries)
    }

    fn integer_boundaries(
        &self,
        column: &str,
        start: i64,
        end: i64,
        interval: i64,
    ) -> PlanningResult<Vec<Boundary>> {
        let span = i128::from(end) - i128::from(start);
        let steps = (span + i128::from(interval) - 1) / i128::from(interval);
        let steps = usize::try_from(steps).unwrap_or(usize::MAX);
        self.check_limit(steps)?;

        let mut boundaries = Vec::with_capacity(steps);
        let mut lower = i128::from(start);
        while lower < i128::from(end) {
            let upper = (lower + i128::from(interval)).min(i128::from(end));
            // Both bounds lie within [start, end], so they fit in i64.
            boundaries.push(Boundary::Range {
                column: column.to_string(),
                lower: BoundValue::Integer(lower as i64),
                upper: BoundValue::Integer(upper as i64),
            });
            lower = upper;
        }
        Ok(boundaries)
    }

    fn check_limit(&self, needed: usize) -> PlanningResult<()> {
        if needed > self.config.max_fragments {
            return Err(PlanningError::TooManyFragments {
                limit: self.config.max_fragments,
            });
        }
        Ok(())
    }
}

impl Default for PartitionPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

/// `start + step * count` units, or `None` past the end of the calendar.
fn step_date(start: NaiveDate, step: u32, count: u32, unit: IntervalUnit) -> Option<NaiveDate> {
    let units = step.checked_mul(count)?;
    match unit {
        IntervalUnit::Day => start.checked_add_days(Days::new(u64::from(units))),
        IntervalUnit::Month => start.checked_add_months(Months::new(units)),
        IntervalUnit::Year => start.checked_add_months(Months::new(units.checked_mul(12)?)),
    }
}
