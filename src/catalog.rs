//! Tuple descriptor of the external table as seen by the front-end.

pub mod column_info;
pub mod data_type;

pub use column_info::ColumnInfo;
pub use data_type::{quote_literal, DataType, LiteralStyle};

use anyhow::Result;

/// Ordered column schema; filter attribute tokens index into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupleDescriptor {
    columns: Vec<ColumnInfo>,
}

impl TupleDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor from `(name, type)` pairs in column order.
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = (&'a str, DataType)>) -> Self {
        let mut descriptor = Self::new();
        for (name, data_type) in columns {
            descriptor.push(name, data_type);
        }
        descriptor
    }

    /// Parse a comma-separated `name:type` list, e.g. `id:int4,cdate:date`.
    pub fn parse(spec: &str) -> Result<Self> {
        let columns = spec
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .enumerate()
            .map(|(order, part)| ColumnInfo::parse(part, order))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn push(&mut self, name: impl Into<String>, data_type: DataType) {
        let order = self.columns.len();
        self.columns.push(ColumnInfo::new(name, data_type, order));
    }

    pub fn column(&self, index: usize) -> Option<&ColumnInfo> {
        self.columns.get(index)
    }

    /// Case-insensitive lookup by column name.
    pub fn find(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|column| column.column_name.eq_ignore_ascii_case(name))
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
