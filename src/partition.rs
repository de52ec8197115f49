//! Partition planning.
//!
//! A dataset is split into fragments that are scanned independently:
//! - `date`: `[start, end)` stepped by `count` days, months or years
//! - `int`: `[start, end)` stepped by a fixed count
//! - `enum`: one fragment per listed value
//!
//! Fragments of one plan never overlap, and range plans cover the whole range.

pub mod error;
pub mod fragment;
pub mod planner;
pub mod spec;

pub use error::{PlanningError, PlanningResult};
pub use fragment::{BoundValue, Boundary, Fragment, DESCRIPTOR_VERSION};
pub use planner::{PartitionPlanner, PlannerConfig, DEFAULT_MAX_FRAGMENTS};
pub use spec::{IntervalUnit, PartitionKind, PartitionOptions, PartitionRange, PartitionSpec};
