//! Column descriptors of the external table.

use crate::catalog::data_type::DataType;
use anyhow::{bail, Context, Result};

/// Length header the front-end folds into character type modifiers.
const VARHDRSZ: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub column_type: DataType,
    pub type_modifier: i32,
    pub column_order: usize,
}

impl ColumnInfo {
    pub fn new(column_name: impl Into<String>, column_type: DataType, column_order: usize) -> Self {
        Self {
            column_name: column_name.into(),
            column_type,
            type_modifier: -1,
            column_order,
        }
    }

    pub fn with_type_modifier(mut self, type_modifier: i32) -> Self {
        self.type_modifier = type_modifier;
        self
    }

    /// Declared length of a `char(n)`/`varchar(n)` column.
    pub fn max_length(&self) -> Option<usize> {
        match self.column_type {
            DataType::Bpchar | DataType::Varchar if self.type_modifier >= VARHDRSZ => {
                usize::try_from(self.type_modifier - VARHDRSZ).ok()
            }
            _ => None,
        }
    }

    /// Parse a `name:type` pair, e.g. `cdate:date` or `grade:varchar(10)`.
    pub fn parse(spec: &str, column_order: usize) -> Result<Self> {
        let Some((name, type_name)) = spec.split_once(':') else {
            bail!("Invalid column spec '{}': expected name:type", spec);
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Invalid column spec '{}': empty column name", spec);
        }

        let (type_name, length) = match type_name.split_once('(') {
            Some((base, rest)) => {
                let length: i32 = rest
                    .trim()
                    .strip_suffix(')')
                    .and_then(|length| length.trim().parse().ok())
                    .filter(|length| *length > 0 && *length <= i32::MAX - VARHDRSZ)
                    .with_context(|| format!("Invalid column spec '{}': bad length", spec))?;
                (base, Some(length))
            }
            None => (type_name, None),
        };
        let column_type = DataType::from_name(type_name)
            .with_context(|| format!("Invalid column spec '{}'", spec))?;

        let column = Self::new(name, column_type, column_order);
        match length {
            Some(length) if matches!(column_type, DataType::Bpchar | DataType::Varchar) => {
                Ok(column.with_type_modifier(length + VARHDRSZ))
            }
            Some(_) => bail!("Invalid column spec '{}': {} takes no length", spec, column_type),
            None => Ok(column),
        }
    }
}
