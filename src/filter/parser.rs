// Filter parser - evaluates the postfix token stream into an expression tree

use super::error::{ParseError, ParseResult};
use super::expr::{ColumnRef, Constant, Expression};
use super::lexer::Lexer;
use super::operator::{Connective, Operator};
use super::token::{Lexeme, Token};
use crate::catalog::{DataType, TupleDescriptor};
use log::debug;

/// Values living on the operand stack while the filter is evaluated.
#[derive(Debug)]
enum StackItem {
    Column(ColumnRef),
    Constant(Constant),
    Predicate(Expression),
}

pub struct Parser<'a> {
    tuple: &'a TupleDescriptor,
}

impl<'a> Parser<'a> {
    pub fn new(tuple: &'a TupleDescriptor) -> Self {
        Self { tuple }
    }

    /// Parse a serialized filter into an expression tree.
    ///
    /// The filter is evaluated left to right over an explicit stack: operands
    /// are pushed, operators and connectives pop exactly their arity and push a
    /// predicate. Exactly one predicate must remain at the end.
    pub fn parse(&self, filter: &str) -> ParseResult<Expression> {
        let lexemes = Lexer::new(filter).tokenize()?;
        if lexemes.is_empty() {
            return Err(ParseError::EmptyFilter);
        }

        let mut stack: Vec<StackItem> = Vec::with_capacity(lexemes.len());
        for Lexeme { token, offset } in lexemes {
            let kind = token.kind();
            let item = match token {
                Token::Attribute(index) => StackItem::Column(self.resolve_column(index)?),
                Token::Constant { type_oid, literal } => {
                    StackItem::Constant(Constant::decode(DataType::from_oid(type_oid), &literal)?)
                }
                Token::Operator(opcode) => {
                    let op = Operator::from_opcode(opcode)
                        .ok_or(ParseError::UnknownOperator { opcode, offset })?;
                    StackItem::Predicate(Self::apply_operator(op, &mut stack, kind, offset)?)
                }
                Token::Connective(opcode) => {
                    let connective = Connective::from_opcode(opcode)
                        .ok_or(ParseError::UnknownConnective { opcode, offset })?;
                    StackItem::Predicate(Self::apply_connective(
                        connective, &mut stack, kind, offset,
                    )?)
                }
            };
            stack.push(item);
        }

        if stack.len() > 1 {
            return Err(ParseError::ResidualValues { count: stack.len() });
        }
        match stack.pop() {
            Some(StackItem::Predicate(expr)) => {
                debug!("Parsed filter '{}' into {}", filter, expr);
                Ok(expr)
            }
            _ => Err(ParseError::DanglingOperand),
        }
    }

    fn resolve_column(&self, index: usize) -> ParseResult<ColumnRef> {
        let column = self
            .tuple
            .column(index)
            .ok_or(ParseError::ColumnOutOfBounds {
                index,
                columns: self.tuple.len(),
            })?;
        Ok(ColumnRef::new(index, column.column_name.clone()))
    }

    fn apply_operator(
        op: Operator,
        stack: &mut Vec<StackItem>,
        kind: &'static str,
        offset: usize,
    ) -> ParseResult<Expression> {
        let needed = if op.is_unary() { 1 } else { 2 };
        if stack.len() < needed {
            return Err(ParseError::StackUnderflow {
                token: kind,
                offset,
                needed,
            });
        }

        if op.is_unary() {
            return match stack.pop() {
                Some(StackItem::Column(column)) if op == Operator::IsNull => {
                    Ok(Expression::is_null(column))
                }
                Some(StackItem::Column(column)) => Ok(Expression::is_not_null(column)),
                Some(StackItem::Predicate(_)) => Err(ParseError::MissingConnective { offset }),
                _ => Err(ParseError::InvalidOperands {
                    operator: op.as_str(),
                    expected: "a column",
                    offset,
                }),
            };
        }

        let right = stack.pop();
        let left = stack.pop();
        match (left, right) {
            (Some(StackItem::Column(column)), Some(StackItem::Constant(constant))) => {
                Ok(Expression::comparison(op, column, constant))
            }
            (Some(StackItem::Constant(constant)), Some(StackItem::Column(column))) => {
                Ok(Expression::comparison(op.mirrored(), column, constant))
            }
            (Some(StackItem::Predicate(_)), _) | (_, Some(StackItem::Predicate(_))) => {
                Err(ParseError::MissingConnective { offset })
            }
            _ => Err(ParseError::InvalidOperands {
                operator: op.as_str(),
                expected: "a column and a constant",
                offset,
            }),
        }
    }

    fn apply_connective(
        connective: Connective,
        stack: &mut Vec<StackItem>,
        kind: &'static str,
        offset: usize,
    ) -> ParseResult<Expression> {
        if stack.len() < 2 {
            return Err(ParseError::StackUnderflow {
                token: kind,
                offset,
                needed: 2,
            });
        }

        let right = stack.pop();
        let left = stack.pop();
        match (left, right) {
            (Some(StackItem::Predicate(left)), Some(StackItem::Predicate(right))) => {
                Ok(Expression::logical(connective, left, right))
            }
            _ => Err(ParseError::ConnectiveOperand { offset }),
        }
    }
}

/// Parse a filter against a tuple descriptor (convenience function)
pub fn parse_filter(filter: &str, tuple: &TupleDescriptor) -> ParseResult<Expression> {
    Parser::new(tuple).parse(filter)
}
