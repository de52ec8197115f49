//! Partitioning configuration: `PARTITION_BY`, `RANGE` and `INTERVAL`.

use super::error::{PlanningError, PlanningResult};
use crate::catalog::{DataType, LiteralStyle, TupleDescriptor};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const PARTITION_BY_OPTION: &str = "PARTITION_BY";
pub const RANGE_OPTION: &str = "RANGE";
pub const INTERVAL_OPTION: &str = "INTERVAL";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionKind {
    Date,
    Integer,
    Enumerated,
}

impl FromStr for PartitionKind {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(PartitionKind::Date),
            "int" | "integer" => Ok(PartitionKind::Integer),
            "enum" | "enumerated" => Ok(PartitionKind::Enumerated),
            other => Err(PlanningError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartitionKind::Date => "date",
            PartitionKind::Integer => "int",
            PartitionKind::Enumerated => "enum",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalUnit {
    Day,
    Month,
    Year,
}

impl FromStr for IntervalUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(IntervalUnit::Day),
            "month" => Ok(IntervalUnit::Month),
            "year" => Ok(IntervalUnit::Year),
            other => Err(format!("unknown unit '{}', expected day, month or year", other)),
        }
    }
}

/// Raw partitioning options as supplied with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOptions {
    /// `column:kind`
    pub partition_by: String,
    pub range: Option<String>,
    pub interval: Option<String>,
}

impl PartitionOptions {
    pub fn new(partition_by: impl Into<String>) -> Self {
        Self {
            partition_by: partition_by.into(),
            range: None,
            interval: None,
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Pick the partitioning options out of a request option map. Keys are
    /// matched case-insensitively; a key given twice under different cases is
    /// an error. Returns `None` when `PARTITION_BY` is absent.
    pub fn from_options(options: &HashMap<String, String>) -> PlanningResult<Option<Self>> {
        let lookup = |key: &str| -> PlanningResult<Option<String>> {
            let mut found = options
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(key));
            let value = found.next().map(|(_, value)| value.clone());
            if found.next().is_some() {
                return Err(PlanningError::DuplicateOption(key.to_string()));
            }
            Ok(value)
        };

        let range = lookup(RANGE_OPTION)?;
        let interval = lookup(INTERVAL_OPTION)?;
        let Some(partition_by) = lookup(PARTITION_BY_OPTION)? else {
            if range.is_some() || interval.is_some() {
                warn!("RANGE/INTERVAL given without PARTITION_BY, ignoring them");
            }
            return Ok(None);
        };

        Ok(Some(Self {
            partition_by,
            range,
            interval,
        }))
    }
}

/// Validated partitioning of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionRange {
    /// Half-open `[start, end)` stepped by `count` units
    Date {
        start: NaiveDate,
        end: NaiveDate,
        count: u32,
        unit: IntervalUnit,
    },
    /// Half-open `[start, end)` stepped by `interval`
    Integer { start: i64, end: i64, interval: i64 },
    /// One fragment per listed value, in order
    Enumerated { values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpec {
    pub column: String,
    pub style: LiteralStyle,
    pub range: PartitionRange,
}

impl PartitionSpec {
    pub fn kind(&self) -> PartitionKind {
        match self.range {
            PartitionRange::Date { .. } => PartitionKind::Date,
            PartitionRange::Integer { .. } => PartitionKind::Integer,
            PartitionRange::Enumerated { .. } => PartitionKind::Enumerated,
        }
    }

    /// Validate partitioning options against the tuple descriptor.
    pub fn parse(options: &PartitionOptions, tuple: &TupleDescriptor) -> PlanningResult<Self> {
        let (column_name, kind) = options
            .partition_by
            .split_once(':')
            .ok_or_else(|| PlanningError::MalformedPartitionBy(options.partition_by.clone()))?;
        let kind: PartitionKind = kind.parse()?;

        let column = tuple
            .find(column_name.trim())
            .ok_or_else(|| PlanningError::UnknownColumn(column_name.trim().to_string()))?;

        let range = options
            .range
            .as_deref()
            .ok_or(PlanningError::MissingRange(kind))?;

        let fits = match kind {
            PartitionKind::Date => column.column_type.is_datetime(),
            PartitionKind::Integer => column.column_type.is_integer(),
            PartitionKind::Enumerated => true,
        };
        if !fits {
            return Err(PlanningError::KindMismatch {
                column: column.column_name.clone(),
                data_type: column.column_type,
                kind,
            });
        }

        let (style, range) = match kind {
            PartitionKind::Date => {
                let interval = options
                    .interval
                    .as_deref()
                    .ok_or(PlanningError::MissingInterval(kind))?;
                (LiteralStyle::Quoted, parse_date_range(range, interval)?)
            }
            PartitionKind::Integer => {
                let interval = options
                    .interval
                    .as_deref()
                    .ok_or(PlanningError::MissingInterval(kind))?;
                (LiteralStyle::Bare, parse_integer_range(range, interval)?)
            }
            PartitionKind::Enumerated => {
                if options.interval.is_some() {
                    warn!("INTERVAL is ignored for enum partitioning");
                }
                let style = column.column_type.literal_style().ok_or_else(|| {
                    PlanningError::UnsupportedColumnType {
                        column: column.column_name.clone(),
                        data_type: column.column_type,
                    }
                })?;
                let values = parse_enumeration(range)?;
                if column.column_type.is_numeric() {
                    if let Some(value) = values.iter().find(|value| !is_number(value)) {
                        return Err(PlanningError::NonNumericValue {
                            value: value.clone(),
                            column: column.column_name.clone(),
                        });
                    }
                } else if column.column_type == DataType::Boolean {
                    if let Some(value) = values.iter().find(|value| !is_boolean(value)) {
                        return Err(PlanningError::NonBooleanValue {
                            value: value.clone(),
                            column: column.column_name.clone(),
                        });
                    }
                }
                if let Some(max_length) = column.max_length() {
                    for value in values.iter().filter(|value| value.chars().count() > max_length) {
                        warn!(
                            "Partition value '{}' exceeds {} characters, no row of {} matches",
                            value, max_length, column.column_name
                        );
                    }
                }
                (style, PartitionRange::Enumerated { values })
            }
        };

        Ok(Self {
            column: column.column_name.clone(),
            style,
            range,
        })
    }
}

fn split_range(range: &str) -> PlanningResult<(&str, &str)> {
    range
        .split_once(':')
        .map(|(start, end)| (start.trim(), end.trim()))
        .ok_or_else(|| PlanningError::MalformedRange {
            range: range.to_string(),
            reason: "expected start:end".to_string(),
        })
}

fn parse_count(interval: &str, text: &str) -> PlanningResult<i64> {
    let count: i64 = text
        .trim()
        .parse()
        .map_err(|_| PlanningError::MalformedInterval {
            interval: interval.to_string(),
            reason: format!("'{}' is not a number", text.trim()),
        })?;
    if count <= 0 {
        return Err(PlanningError::NonPositiveInterval(count));
    }
    Ok(count)
}

fn parse_date_range(range: &str, interval: &str) -> PlanningResult<PartitionRange> {
    let (start_text, end_text) = split_range(range)?;
    let parse_date = |text: &str| {
        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|err| PlanningError::MalformedRange {
            range: range.to_string(),
            reason: format!("'{}' is not a YYYY-MM-DD date: {}", text, err),
        })
    };
    let start = parse_date(start_text)?;
    let end = parse_date(end_text)?;
    if end <= start {
        return Err(PlanningError::EmptyRange {
            start: start_text.to_string(),
            end: end_text.to_string(),
        });
    }

    let (count_text, unit_text) =
        interval
            .split_once(':')
            .ok_or_else(|| PlanningError::MalformedInterval {
                interval: interval.to_string(),
                reason: "expected count:unit".to_string(),
            })?;
    let count = parse_count(interval, count_text)?;
    let count = u32::try_from(count).map_err(|_| PlanningError::MalformedInterval {
        interval: interval.to_string(),
        reason: "count is too large".to_string(),
    })?;
    let unit: IntervalUnit = unit_text
        .parse()
        .map_err(|reason| PlanningError::MalformedInterval {
            interval: interval.to_string(),
            reason,
        })?;

    Ok(PartitionRange::Date {
        start,
        end,
        count,
        unit,
    })
}

fn parse_integer_range(range: &str, interval: &str) -> PlanningResult<PartitionRange> {
    let (start_text, end_text) = split_range(range)?;
    let parse_int = |text: &str| {
        text.parse::<i64>().map_err(|_| PlanningError::MalformedRange {
            range: range.to_string(),
            reason: format!("'{}' is not an integer", text),
        })
    };
    let start = parse_int(start_text)?;
    let end = parse_int(end_text)?;
    if end <= start {
        return Err(PlanningError::EmptyRange {
            start: start_text.to_string(),
            end: end_text.to_string(),
        });
    }

    let interval = parse_count(interval, interval)?;
    Ok(PartitionRange::Integer {
        start,
        end,
        interval,
    })
}

fn parse_enumeration(range: &str) -> PlanningResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for value in range.split(':') {
        if value.is_empty() {
            return Err(PlanningError::MalformedRange {
                range: range.to_string(),
                reason: "empty value".to_string(),
            });
        }
        if !seen.insert(value) {
            return Err(PlanningError::DuplicateValue(value.to_string()));
        }
        values.push(value.to_string());
    }
    Ok(values)
}

fn is_boolean(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "t" | "true" | "f" | "false"
    )
}

fn is_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .map(|number| number.is_finite())
        .unwrap_or(false)
}
