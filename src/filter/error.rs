//! Filter parsing errors.

use thiserror::Error;

/// A malformed serialized filter. Always fatal for the filter it came from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty filter string")]
    EmptyFilter,

    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("Expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },

    #[error("Number out of range at offset {offset}")]
    NumberOutOfRange { offset: usize },

    #[error("Literal at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedLiteral {
        declared: usize,
        available: usize,
        offset: usize,
    },

    #[error("Literal '{literal}' is not a valid {data_type} constant")]
    InvalidLiteral { literal: String, data_type: String },

    #[error("Column index {index} out of bounds for tuple with {columns} columns")]
    ColumnOutOfBounds { index: usize, columns: usize },

    #[error("Unknown operator {opcode} at offset {offset}")]
    UnknownOperator { opcode: u32, offset: usize },

    #[error("Unknown connective {opcode} at offset {offset}")]
    UnknownConnective { opcode: u32, offset: usize },

    #[error("Stack underflow: {token} at offset {offset} needs {needed} operands")]
    StackUnderflow {
        token: &'static str,
        offset: usize,
        needed: usize,
    },

    #[error("Missing connective before operator at offset {offset}")]
    MissingConnective { offset: usize },

    #[error("Operator {operator} at offset {offset} needs {expected}")]
    InvalidOperands {
        operator: &'static str,
        expected: &'static str,
        offset: usize,
    },

    #[error("Connective at offset {offset} applied to a non-predicate operand")]
    ConnectiveOperand { offset: usize },

    #[error("Filter leaves {count} values on the stack")]
    ResidualValues { count: usize },

    #[error("Filter does not end in a predicate")]
    DanglingOperand,
}

/// Result type for filter parsing.
pub type ParseResult<T> = Result<T, ParseError>;
