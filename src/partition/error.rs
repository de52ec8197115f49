//! Partition planning errors.

use super::spec::PartitionKind;
use crate::catalog::DataType;
use thiserror::Error;

/// An invalid partition configuration or fragment descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    #[error("Invalid PARTITION_BY '{0}': expected column:type")]
    MalformedPartitionBy(String),

    #[error("Unknown partition type '{0}': expected date, int or enum")]
    UnknownKind(String),

    #[error("Partition column '{0}' is not in the tuple descriptor")]
    UnknownColumn(String),

    #[error("Partition column '{column}' of type {data_type} cannot be rendered")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error("Partition column '{column}' of type {data_type} cannot be partitioned by {kind}")]
    KindMismatch {
        column: String,
        data_type: DataType,
        kind: PartitionKind,
    },

    #[error("Option {0} is given more than once")]
    DuplicateOption(String),

    #[error("RANGE is required for {0} partitioning")]
    MissingRange(PartitionKind),

    #[error("Invalid RANGE '{range}': {reason}")]
    MalformedRange { range: String, reason: String },

    #[error("INTERVAL is required for {0} partitioning")]
    MissingInterval(PartitionKind),

    #[error("Invalid INTERVAL '{interval}': {reason}")]
    MalformedInterval { interval: String, reason: String },

    #[error("INTERVAL must be positive, got {0}")]
    NonPositiveInterval(i64),

    #[error("RANGE end {end} is not after start {start}")]
    EmptyRange { start: String, end: String },

    #[error("Duplicate partition value '{0}'")]
    DuplicateValue(String),

    #[error("Partition value '{value}' is not a number but column {column} is numeric")]
    NonNumericValue { value: String, column: String },

    #[error("Partition value '{value}' is not a boolean but column {column} is boolean")]
    NonBooleanValue { value: String, column: String },

    #[error("Plan needs more than {limit} fragments")]
    TooManyFragments { limit: usize },

    #[error("Unsupported fragment descriptor version {0}")]
    UnsupportedVersion(u16),

    #[error("Invalid fragment descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Result type for partition planning.
pub type PlanningResult<T> = Result<T, PlanningError>;

impl From<bincode::Error> for PlanningError {
    fn from(err: bincode::Error) -> Self {
        PlanningError::InvalidDescriptor(err.to_string())
    }
}

impl From<std::io::Error> for PlanningError {
    fn from(err: std::io::Error) -> Self {
        PlanningError::InvalidDescriptor(err.to_string())
    }
}
