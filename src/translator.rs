//! Translation of filter expressions into backend WHERE text.
//!
//! Only conjunctions of simple comparisons and null tests are pushed down. If any
//! part of the tree cannot be rendered the whole filter stays with the front-end;
//! a partial WHERE clause is never produced, since dropping a conjunct is safe but
//! dropping a disjunct would lose rows.

use crate::catalog::{quote_literal, DataType, LiteralStyle, TupleDescriptor};
use crate::filter::{
    parse_filter, ColumnRef, Connective, Constant, Expression, Operator, ParseResult,
};
use log::debug;
use std::fmt;

/// Why a filter could not be pushed down.
#[derive(Debug, Clone, PartialEq)]
pub enum UnsupportedReason {
    /// An OR connective somewhere in the tree
    Disjunction,
    /// An operator outside the pushable subset (LIKE, IN)
    Operator(Operator),
    /// A column whose type has no literal rendering rule
    ColumnType { column: String, data_type: DataType },
    /// A text constant compared against a numeric column
    LiteralMismatch { column: String },
    /// A column index the descriptor does not know
    UnknownColumn { index: usize },
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::Disjunction => write!(f, "OR is not pushed down"),
            UnsupportedReason::Operator(op) => {
                write!(f, "operator {} is not pushed down", op.as_str())
            }
            UnsupportedReason::ColumnType { column, data_type } => {
                write!(f, "column {} of type {} cannot be rendered", column, data_type)
            }
            UnsupportedReason::LiteralMismatch { column } => {
                write!(f, "text constant compared with numeric column {}", column)
            }
            UnsupportedReason::UnknownColumn { index } => {
                write!(f, "column index {} is not in the tuple descriptor", index)
            }
        }
    }
}

/// Outcome of translating a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Pushdown {
    /// WHERE-clause body to send to the backend (without the `WHERE` keyword)
    Where(String),
    /// Nothing can be pushed down; the front-end filters locally
    Unsupported(UnsupportedReason),
}

impl Pushdown {
    pub fn where_clause(&self) -> Option<&str> {
        match self {
            Pushdown::Where(clause) => Some(clause),
            Pushdown::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Pushdown::Where(_))
    }
}

/// Renders expression trees against a tuple descriptor.
pub struct WhereBuilder<'a> {
    tuple: &'a TupleDescriptor,
}

impl<'a> WhereBuilder<'a> {
    pub fn new(tuple: &'a TupleDescriptor) -> Self {
        Self { tuple }
    }

    pub fn build(&self, expr: &Expression) -> Pushdown {
        match self.render(expr) {
            Ok(clause) => {
                debug!("Pushing down WHERE {}", clause);
                Pushdown::Where(clause)
            }
            Err(reason) => {
                debug!("Filter {} not pushed down: {}", expr, reason);
                Pushdown::Unsupported(reason)
            }
        }
    }

    /// Render the tree depth-first, left to right, over an explicit stack so that
    /// long AND chains do not grow the call stack.
    fn render(&self, expr: &Expression) -> Result<String, UnsupportedReason> {
        let mut conjuncts = Vec::new();
        let mut pending = vec![expr];
        while let Some(node) = pending.pop() {
            match node {
                Expression::Logical {
                    connective: Connective::And,
                    left,
                    right,
                } => {
                    pending.push(&**right);
                    pending.push(&**left);
                }
                Expression::Logical {
                    connective: Connective::Or,
                    ..
                } => return Err(UnsupportedReason::Disjunction),
                Expression::NullTest { column, negated } => {
                    let test = if *negated { "IS NOT NULL" } else { "IS NULL" };
                    conjuncts.push(format!("{} {}", column.name, test));
                }
                Expression::Comparison {
                    op,
                    column,
                    constant,
                } => conjuncts.push(self.render_comparison(*op, column, constant)?),
            }
        }
        Ok(conjuncts.join(" AND "))
    }

    fn render_comparison(
        &self,
        op: Operator,
        column: &ColumnRef,
        constant: &Constant,
    ) -> Result<String, UnsupportedReason> {
        let op_text = match op {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            other => return Err(UnsupportedReason::Operator(other)),
        };
        let literal = self.render_literal(column.index, constant)?;
        Ok(format!("{}{}{}", column.name, op_text, literal))
    }

    fn render_literal(
        &self,
        index: usize,
        constant: &Constant,
    ) -> Result<String, UnsupportedReason> {
        let column = self
            .tuple
            .column(index)
            .ok_or(UnsupportedReason::UnknownColumn { index })?;

        match column.column_type.literal_style() {
            Some(LiteralStyle::Quoted) => Ok(quote_literal(&constant.value.to_string())),
            Some(LiteralStyle::Bare) if constant.value.is_text() => {
                Err(UnsupportedReason::LiteralMismatch {
                    column: column.column_name.clone(),
                })
            }
            Some(LiteralStyle::Bare) => Ok(constant.value.to_string()),
            None => Err(UnsupportedReason::ColumnType {
                column: column.column_name.clone(),
                data_type: column.column_type,
            }),
        }
    }
}

/// Parse and translate an optional filter string.
///
/// Returns `Ok(None)` when no filter was supplied (absent or empty), and an
/// error only when the filter is malformed.
pub fn translate_filter(
    filter: Option<&str>,
    tuple: &TupleDescriptor,
) -> ParseResult<Option<Pushdown>> {
    match filter {
        None => Ok(None),
        Some(filter) if filter.is_empty() => Ok(None),
        Some(filter) => {
            let expr = parse_filter(filter, tuple)?;
            Ok(Some(WhereBuilder::new(tuple).build(&expr)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ParseError, Value};

    fn sales() -> TupleDescriptor {
        TupleDescriptor::from_columns([
            ("id", DataType::Int4),
            ("cdate", DataType::Date),
            ("amt", DataType::Float8),
            ("grade", DataType::Text),
            ("payload", DataType::Bytea),
        ])
    }

    fn translate(filter: &str) -> Pushdown {
        translate_filter(Some(filter), &sales()).unwrap().unwrap()
    }

    /// `id <> 0`, `id <> 1`, ... joined left-deep by `connective`, the shape a
    /// front-end produces for `id NOT IN (...)`.
    fn not_in_chain(count: usize, connective: &str) -> String {
        let mut filter = String::new();
        for value in 0..count {
            let literal = value.to_string();
            filter.push_str(&format!("a0c23s{}d{}o6", literal.len(), literal));
            if value > 0 {
                filter.push_str(connective);
            }
        }
        filter
    }

    fn run_on_small_stack(task: impl FnOnce() + Send + 'static) {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(task)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_single_comparison() {
        assert_eq!(translate("a0c20s1d1o5"), Pushdown::Where("id=1".to_string()));
        assert_eq!(translate("a0c20s1d5o2"), Pushdown::Where("id>5".to_string()));
        assert_eq!(
            translate("a3c25s4dgoodo6"),
            Pushdown::Where("grade<>'good'".to_string())
        );
    }

    #[test]
    fn test_conjunction() {
        assert_eq!(
            translate("a1c25s10d2008-02-01o2a1c25s10d2008-12-01o1l0a2c20s4d1200o2l0"),
            Pushdown::Where(
                "cdate>'2008-02-01' AND cdate<'2008-12-01' AND amt>1200".to_string()
            )
        );
    }

    #[test]
    fn test_long_and_chain() {
        run_on_small_stack(|| {
            let filter = not_in_chain(100_000, "l0");
            let pushdown = translate(&filter);
            let clause = pushdown.where_clause().unwrap();
            assert!(clause.starts_with("id<>0 AND id<>1 AND id<>2 AND "));
            assert!(clause.ends_with(" AND id<>99999"));
            assert_eq!(clause.matches(" AND ").count(), 99_999);
        });
    }

    #[test]
    fn test_long_chains_that_are_not_pushed_down() {
        run_on_small_stack(|| {
            assert_eq!(
                translate(&not_in_chain(200_000, "l1")),
                Pushdown::Unsupported(UnsupportedReason::Disjunction)
            );

            // A LIKE at the very end of a long AND chain
            let mut filter = not_in_chain(100_000, "l0");
            filter.push_str("a3c25s3dbado7l0");
            assert_eq!(
                translate(&filter),
                Pushdown::Unsupported(UnsupportedReason::Operator(Operator::Like))
            );
        });
    }

    #[test]
    fn test_null_tests() {
        assert_eq!(
            translate("a3o8a0o9l0"),
            Pushdown::Where("grade IS NULL AND id IS NOT NULL".to_string())
        );
    }

    #[test]
    fn test_like_is_not_pushed_down() {
        assert_eq!(
            translate("a3c25s3dbado7"),
            Pushdown::Unsupported(UnsupportedReason::Operator(Operator::Like))
        );
    }

    #[test]
    fn test_unsupported_operator_anywhere_disables_pushdown() {
        // id=1 AND grade LIKE 'bad'
        assert_eq!(
            translate("a0c20s1d1o5a3c25s3dbado7l0"),
            Pushdown::Unsupported(UnsupportedReason::Operator(Operator::Like))
        );
        // id IN 1
        assert_eq!(
            translate("a0c20s1d1o10"),
            Pushdown::Unsupported(UnsupportedReason::Operator(Operator::In))
        );
    }

    #[test]
    fn test_or_is_never_pushed_down() {
        assert_eq!(
            translate("a1c25s10d2008-02-01o2a2c20s4d1200o2l1"),
            Pushdown::Unsupported(UnsupportedReason::Disjunction)
        );
        // OR nested under AND
        assert_eq!(
            translate("a0c20s1d1o5a0c20s1d2o5a0c20s1d3o5l1l0"),
            Pushdown::Unsupported(UnsupportedReason::Disjunction)
        );
    }

    #[test]
    fn test_literal_quoting_follows_column_type() {
        // A numeric constant against a text column is still quoted
        assert_eq!(translate("a3c23s1d7o5"), Pushdown::Where("grade='7'".to_string()));
        assert_eq!(
            translate("a3c25s6do'neilo5"),
            Pushdown::Where("grade='o''neil'".to_string())
        );
        assert_eq!(
            translate("a0c25s3dabco5"),
            Pushdown::Unsupported(UnsupportedReason::LiteralMismatch {
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn test_unmappable_column_type() {
        assert_eq!(
            translate("a4c25s2dffo5"),
            Pushdown::Unsupported(UnsupportedReason::ColumnType {
                column: "payload".to_string(),
                data_type: DataType::Bytea,
            })
        );
    }

    #[test]
    fn test_column_missing_from_descriptor() {
        let tuple = TupleDescriptor::from_columns([("id", DataType::Int4)]);
        let expr = Expression::comparison(
            Operator::Eq,
            ColumnRef::new(3, "grade"),
            Constant::new(DataType::Text, Value::Text("bad".to_string())),
        );
        assert_eq!(
            WhereBuilder::new(&tuple).build(&expr),
            Pushdown::Unsupported(UnsupportedReason::UnknownColumn { index: 3 })
        );
    }

    #[test]
    fn test_absent_filter() {
        let tuple = sales();
        assert_eq!(translate_filter(None, &tuple), Ok(None));
        assert_eq!(translate_filter(Some(""), &tuple), Ok(None));
    }

    #[test]
    fn test_malformed_filter_is_an_error() {
        assert!(matches!(
            translate_filter(Some("a0c20s1d1o5a0c20s1d2o5l2"), &sales()),
            Err(ParseError::UnknownConnective { opcode: 2, .. })
        ));
    }

    #[test]
    fn test_pushdown_accessors() {
        let pushdown = Pushdown::Where("id=1".to_string());
        assert_eq!(pushdown.where_clause(), Some("id=1"));
        assert!(pushdown.is_supported());
        let pushdown = Pushdown::Unsupported(UnsupportedReason::Disjunction);
        assert_eq!(pushdown.where_clause(), None);
        assert!(!pushdown.is_supported());
    }
}
