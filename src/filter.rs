//! Serialized filter parsing.
//!
//! The front-end sends WHERE-clause filters as a postfix token string:
//! - `a<index>` pushes a column reference
//! - `c<oid>s<len>d<literal>` pushes a typed constant
//! - `o<opcode>` applies a predicate operator
//! - `l<opcode>` applies a logical connective (0 = AND, 1 = OR)
//!
//! For example `a0c20s1d5o2a3c25s3dbado5l0` is `id > 5 AND grade = 'bad'`.

pub mod error;
pub mod expr;
pub mod lexer;
pub mod operator;
pub mod parser;
pub mod token;

pub use error::{ParseError, ParseResult};
pub use expr::{ColumnRef, Constant, Expression, Value};
pub use lexer::Lexer;
pub use operator::{Connective, Operator};
pub use parser::{parse_filter, Parser};
pub use token::{Lexeme, Token};
