//! Operator and connective definitions for filter predicates.

/// Predicate operators, numbered as on the wire starting at opcode 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Like,
    IsNull,
    IsNotNull,
    In,
}

/// Opcode `n` maps to `OPERATORS[n - 1]`.
const OPERATORS: [Operator; 10] = [
    Operator::Lt,
    Operator::Gt,
    Operator::Le,
    Operator::Ge,
    Operator::Eq,
    Operator::Ne,
    Operator::Like,
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::In,
];

impl Operator {
    pub fn from_opcode(opcode: u32) -> Option<Self> {
        let index = usize::try_from(opcode).ok()?.checked_sub(1)?;
        OPERATORS.get(index).copied()
    }

    pub fn opcode(&self) -> u32 {
        match self {
            Operator::Lt => 1,
            Operator::Gt => 2,
            Operator::Le => 3,
            Operator::Ge => 4,
            Operator::Eq => 5,
            Operator::Ne => 6,
            Operator::Like => 7,
            Operator::IsNull => 8,
            Operator::IsNotNull => 9,
            Operator::In => 10,
        }
    }

    /// IS NULL and IS NOT NULL take a column and nothing else.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// The operator to use when the operands are swapped, so `5 > id` becomes `id < 5`.
    pub fn mirrored(&self) -> Self {
        match self {
            Operator::Lt => Operator::Gt,
            Operator::Gt => Operator::Lt,
            Operator::Le => Operator::Ge,
            Operator::Ge => Operator::Le,
            other => *other,
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Like => "LIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::In => "IN",
        }
    }
}

/// Logical connectives. Opcode 0 is AND and 1 is OR; nothing else is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

const CONNECTIVES: [Connective; 2] = [Connective::And, Connective::Or];

impl Connective {
    pub fn from_opcode(opcode: u32) -> Option<Self> {
        CONNECTIVES.get(usize::try_from(opcode).ok()?).copied()
    }

    pub fn opcode(&self) -> u32 {
        match self {
            Connective::And => 0,
            Connective::Or => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}
