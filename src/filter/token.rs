// Filter tokens for lexical analysis

/// One token of the postfix filter encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `a<index>`: column reference by tuple-descriptor index.
    Attribute(usize),
    /// `c<oid>s<len>d<bytes>`: typed constant with a length-prefixed literal.
    Constant { type_oid: u32, literal: String },
    /// `o<opcode>`: predicate operator.
    Operator(u32),
    /// `l<opcode>`: logical connective.
    Connective(u32),
}

impl Token {
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Attribute(_) => "attribute",
            Token::Constant { .. } => "constant",
            Token::Operator(_) => "operator",
            Token::Connective(_) => "connective",
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub offset: usize,
}
