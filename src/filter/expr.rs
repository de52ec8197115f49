//! Expression tree built from a parsed filter.

use super::error::{ParseError, ParseResult};
use super::operator::{Connective, Operator};
use crate::catalog::DataType;
use std::fmt;

/// Column reference in an expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Column index in the tuple descriptor (0-based)
    pub index: usize,
    /// Column name, resolved at parse time
    pub name: String,
}

impl ColumnRef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Decoded literal value of a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Arbitrary-precision numeric, kept as validated text.
    Numeric(String),
    Text(String),
}

impl Value {
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Numeric(value) | Value::Text(value) => f.write_str(value),
        }
    }
}

/// Typed constant operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub data_type: DataType,
    pub value: Value,
}

impl Constant {
    pub fn new(data_type: DataType, value: Value) -> Self {
        Self { data_type, value }
    }

    /// Decode a literal according to its declared type. Numeric and boolean
    /// types must parse; everything else is kept as text.
    pub fn decode(data_type: DataType, literal: &str) -> ParseResult<Self> {
        let invalid = || ParseError::InvalidLiteral {
            literal: literal.to_string(),
            data_type: data_type.to_string(),
        };

        let value = match data_type {
            DataType::Boolean => match literal.to_ascii_lowercase().as_str() {
                "t" | "true" => Value::Boolean(true),
                "f" | "false" => Value::Boolean(false),
                _ => return Err(invalid()),
            },
            t if t.is_integer() => Value::Integer(literal.parse().map_err(|_| invalid())?),
            t if t.is_float() => {
                let value: f64 = literal.parse().map_err(|_| invalid())?;
                if !value.is_finite() {
                    return Err(invalid());
                }
                Value::Float(value)
            }
            DataType::Numeric => {
                let valid = literal
                    .parse::<f64>()
                    .map(|value| value.is_finite())
                    .unwrap_or(false);
                if !valid {
                    return Err(invalid());
                }
                Value::Numeric(literal.to_string())
            }
            _ => Value::Text(literal.to_string()),
        };

        Ok(Self { data_type, value })
    }
}

/// Expression tree node. Leaves are always predicates over a single column.
///
/// Trees built from long AND chains can be arbitrarily deep, so dropping,
/// comparing and printing walk them with an explicit stack.
#[derive(Debug)]
pub enum Expression {
    /// `column <op> constant`, column normalized to the left
    Comparison {
        op: Operator,
        column: ColumnRef,
        constant: Constant,
    },

    /// `column IS [NOT] NULL`
    NullTest { column: ColumnRef, negated: bool },

    /// AND/OR over two predicate subtrees
    Logical {
        connective: Connective,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn comparison(op: Operator, column: ColumnRef, constant: Constant) -> Self {
        Expression::Comparison {
            op,
            column,
            constant,
        }
    }

    pub fn is_null(column: ColumnRef) -> Self {
        Expression::NullTest {
            column,
            negated: false,
        }
    }

    pub fn is_not_null(column: ColumnRef) -> Self {
        Expression::NullTest {
            column,
            negated: true,
        }
    }

    pub fn logical(connective: Connective, left: Expression, right: Expression) -> Self {
        Expression::Logical {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of leaf predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Expression::Logical { left, right, .. } => {
                    pending.push(&**right);
                    pending.push(&**left);
                }
                _ => count += 1,
            }
        }
        count
    }

    /// Move both children out of a logical node that has a logical child,
    /// leaving cheap leaves behind.
    fn take_children(&mut self) -> Option<(Expression, Expression)> {
        match self {
            Expression::Logical { left, right, .. }
                if left.is_logical() || right.is_logical() =>
            {
                Some((
                    std::mem::replace(left.as_mut(), Expression::placeholder()),
                    std::mem::replace(right.as_mut(), Expression::placeholder()),
                ))
            }
            _ => None,
        }
    }

    fn is_logical(&self) -> bool {
        matches!(self, Expression::Logical { .. })
    }

    fn placeholder() -> Self {
        Expression::NullTest {
            column: ColumnRef {
                index: 0,
                name: String::new(),
            },
            negated: false,
        }
    }
}

impl Drop for Expression {
    fn drop(&mut self) {
        let Some((left, right)) = self.take_children() else {
            return;
        };
        let mut pending = vec![left, right];
        while let Some(mut node) = pending.pop() {
            if let Some((left, right)) = node.take_children() {
                pending.push(left);
                pending.push(right);
            }
        }
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            let equal = match pair {
                (
                    Expression::Comparison {
                        op,
                        column,
                        constant,
                    },
                    Expression::Comparison {
                        op: other_op,
                        column: other_column,
                        constant: other_constant,
                    },
                ) => op == other_op && column == other_column && constant == other_constant,
                (
                    Expression::NullTest { column, negated },
                    Expression::NullTest {
                        column: other_column,
                        negated: other_negated,
                    },
                ) => column == other_column && negated == other_negated,
                (
                    Expression::Logical {
                        connective,
                        left,
                        right,
                    },
                    Expression::Logical {
                        connective: other_connective,
                        left: other_left,
                        right: other_right,
                    },
                ) => {
                    pending.push((&**right, &**other_right));
                    pending.push((&**left, &**other_left));
                    connective == other_connective
                }
                _ => false,
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

/// Pieces of the parenthesized rendering still to be written.
enum DisplayStep<'a> {
    Node(&'a Expression),
    Text(&'static str),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![DisplayStep::Node(self)];
        while let Some(step) = pending.pop() {
            match step {
                DisplayStep::Text(text) => f.write_str(text)?,
                DisplayStep::Node(Expression::Comparison {
                    op,
                    column,
                    constant,
                }) => write!(f, "{} {} {}", column.name, op.as_str(), constant.value)?,
                DisplayStep::Node(Expression::NullTest { column, negated }) => {
                    let test = if *negated { "IS NOT NULL" } else { "IS NULL" };
                    write!(f, "{} {}", column.name, test)?;
                }
                DisplayStep::Node(Expression::Logical {
                    connective,
                    left,
                    right,
                }) => {
                    pending.push(DisplayStep::Text(")"));
                    pending.push(DisplayStep::Node(&**right));
                    pending.push(DisplayStep::Text(" "));
                    pending.push(DisplayStep::Text(connective.as_str()));
                    pending.push(DisplayStep::Text(" "));
                    pending.push(DisplayStep::Node(&**left));
                    f.write_str("(")?;
                }
            }
        }
        Ok(())
    }
}
