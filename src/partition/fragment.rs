//! Fragments and their boundary descriptors.
//!
//! A fragment's metadata is a self-contained encoding of its boundary: a
//! little-endian `u16` format version followed by a bincode payload. The
//! predicate can be regenerated from the metadata alone, so planning and query
//! assembly may happen in different processes.

use super::error::{PlanningError, PlanningResult};
use crate::catalog::quote_literal;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DESCRIPTOR_VERSION: u16 = 1;

/// A literal bound of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundValue {
    Date(NaiveDate),
    Integer(i64),
    /// Quoted literal
    Text(String),
    /// Bare numeric literal, already validated
    Number(String),
}

impl BoundValue {
    pub fn render(&self) -> String {
        match self {
            BoundValue::Date(date) => format!("'{}'", date.format("%Y-%m-%d")),
            BoundValue::Integer(value) => value.to_string(),
            BoundValue::Text(value) => quote_literal(value),
            BoundValue::Number(value) => value.clone(),
        }
    }
}

/// The slice of the dataset one fragment covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// The whole dataset; used when no partitioning is configured
    Unbounded,
    /// `column >= lower AND column < upper`
    Range {
        column: String,
        lower: BoundValue,
        upper: BoundValue,
    },
    /// `column = value`
    Value { column: String, value: BoundValue },
}

impl Boundary {
    /// Predicate text for this boundary, `None` for the unbounded fragment.
    pub fn predicate(&self) -> Option<String> {
        match self {
            Boundary::Unbounded => None,
            Boundary::Range {
                column,
                lower,
                upper,
            } => Some(format!(
                "{column}>={} AND {column}<{}",
                lower.render(),
                upper.render()
            )),
            Boundary::Value { column, value } => Some(format!("{}={}", column, value.render())),
        }
    }

    pub fn encode(&self) -> PlanningResult<Vec<u8>> {
        let mut data = Vec::new();
        data.write_u16::<LittleEndian>(DESCRIPTOR_VERSION)?;
        bincode::serialize_into(&mut data, self)?;
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> PlanningResult<Self> {
        let mut cursor = data;
        let version = cursor.read_u16::<LittleEndian>()?;
        if version != DESCRIPTOR_VERSION {
            return Err(PlanningError::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(cursor)?)
    }
}

/// One independently scannable unit of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    index: usize,
    metadata: Vec<u8>,
}

impl Fragment {
    pub fn new(index: usize, boundary: &Boundary) -> PlanningResult<Self> {
        Ok(Self {
            index,
            metadata: boundary.encode()?,
        })
    }

    /// Rebuild a fragment from metadata received from elsewhere.
    pub fn from_metadata(index: usize, metadata: Vec<u8>) -> PlanningResult<Self> {
        Boundary::decode(&metadata)?;
        Ok(Self { index, metadata })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    pub fn boundary(&self) -> PlanningResult<Boundary> {
        Boundary::decode(&self.metadata)
    }

    pub fn predicate(&self) -> PlanningResult<Option<String>> {
        Ok(self.boundary()?.predicate())
    }
}
