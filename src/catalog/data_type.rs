//! External type identifiers as sent by the front-end.

use anyhow::{bail, Result};
use std::fmt;

/// How a literal of a given column type is written into backend WHERE text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralStyle {
    /// Written as-is (`id=1`, `amt>1200`).
    Bare,
    /// Wrapped in single quotes with embedded quotes doubled (`cdate>'2008-02-01'`).
    Quoted,
}

/// Column and constant types, keyed by the front-end's type OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Bytea,
    Int8,
    Int2,
    Int4,
    Text,
    Float4,
    Float8,
    Bpchar,
    Varchar,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Numeric,
    /// Any OID this engine has no rendering rule for.
    Other(u32),
}

impl DataType {
    pub fn from_oid(oid: u32) -> Self {
        match oid {
            16 => DataType::Boolean,
            17 => DataType::Bytea,
            20 => DataType::Int8,
            21 => DataType::Int2,
            23 => DataType::Int4,
            25 => DataType::Text,
            700 => DataType::Float4,
            701 => DataType::Float8,
            1042 => DataType::Bpchar,
            1043 => DataType::Varchar,
            1082 => DataType::Date,
            1083 => DataType::Time,
            1114 => DataType::Timestamp,
            1184 => DataType::TimestampTz,
            1700 => DataType::Numeric,
            other => DataType::Other(other),
        }
    }

    pub fn oid(&self) -> u32 {
        match self {
            DataType::Boolean => 16,
            DataType::Bytea => 17,
            DataType::Int8 => 20,
            DataType::Int2 => 21,
            DataType::Int4 => 23,
            DataType::Text => 25,
            DataType::Float4 => 700,
            DataType::Float8 => 701,
            DataType::Bpchar => 1042,
            DataType::Varchar => 1043,
            DataType::Date => 1082,
            DataType::Time => 1083,
            DataType::Timestamp => 1114,
            DataType::TimestampTz => 1184,
            DataType::Numeric => 1700,
            DataType::Other(oid) => *oid,
        }
    }

    /// Parse a type name as written in a column list (`int4`, `date`, `varchar`, ...).
    pub fn from_name(name: &str) -> Result<Self> {
        let data_type = match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => DataType::Boolean,
            "bytea" => DataType::Bytea,
            "int8" | "bigint" => DataType::Int8,
            "int2" | "smallint" => DataType::Int2,
            "int4" | "int" | "integer" => DataType::Int4,
            "text" => DataType::Text,
            "float4" | "real" => DataType::Float4,
            "float8" | "double" => DataType::Float8,
            "bpchar" | "char" => DataType::Bpchar,
            "varchar" => DataType::Varchar,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" => DataType::Timestamp,
            "timestamptz" => DataType::TimestampTz,
            "numeric" | "decimal" => DataType::Numeric,
            other => bail!("Unknown data type: {}", other),
        };
        Ok(data_type)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int2 | DataType::Int4 | DataType::Int8)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float4 | DataType::Float8)
    }

    /// Date and timestamp types, the ones a date range can partition.
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::Timestamp | DataType::TimestampTz
        )
    }

    /// Integer, floating point and numeric types.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || *self == DataType::Numeric
    }

    /// Rendering rule for literals compared against a column of this type.
    ///
    /// `None` means the type cannot be rendered and any predicate on it must not
    /// be pushed down.
    pub fn literal_style(&self) -> Option<LiteralStyle> {
        match self {
            DataType::Boolean
            | DataType::Int2
            | DataType::Int4
            | DataType::Int8
            | DataType::Float4
            | DataType::Float8
            | DataType::Numeric => Some(LiteralStyle::Bare),
            DataType::Text
            | DataType::Bpchar
            | DataType::Varchar
            | DataType::Date
            | DataType::Time
            | DataType::Timestamp
            | DataType::TimestampTz => Some(LiteralStyle::Quoted),
            DataType::Bytea | DataType::Other(_) => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "bool",
            DataType::Bytea => "bytea",
            DataType::Int8 => "int8",
            DataType::Int2 => "int2",
            DataType::Int4 => "int4",
            DataType::Text => "text",
            DataType::Float4 => "float4",
            DataType::Float8 => "float8",
            DataType::Bpchar => "bpchar",
            DataType::Varchar => "varchar",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
            DataType::TimestampTz => "timestamptz",
            DataType::Numeric => "numeric",
            DataType::Other(oid) => return write!(f, "oid({})", oid),
        };
        f.write_str(name)
    }
}

/// Quote a literal for a `LiteralStyle::Quoted` column.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
