use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Operator tags of an operation node.
///
/// Each operator has a stable numeric code used by the node codec. Codes must
/// never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    And,
    Or,
    Xor,
    Not,
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Round,
    Sum,
    Min,
    Max,
    Avg,
    Count,
    Func,
    DateAddSeconds,
    StartsWith,
    EndsWith,
    Contains,
}

const ALL: [Operator; 31] = [
    Operator::Equal,
    Operator::NotEqual,
    Operator::GreaterThan,
    Operator::GreaterOrEqual,
    Operator::LessThan,
    Operator::LessOrEqual,
    Operator::And,
    Operator::Or,
    Operator::Xor,
    Operator::Not,
    Operator::Like,
    Operator::In,
    Operator::NotIn,
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::Add,
    Operator::Subtract,
    Operator::Multiply,
    Operator::Divide,
    Operator::Modulo,
    Operator::Round,
    Operator::Sum,
    Operator::Min,
    Operator::Max,
    Operator::Avg,
    Operator::Count,
    Operator::Func,
    Operator::DateAddSeconds,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Contains,
];

impl Operator {
    pub fn code(self) -> u8 {
        match self {
            Operator::Equal => 1,
            Operator::NotEqual => 2,
            Operator::GreaterThan => 3,
            Operator::GreaterOrEqual => 4,
            Operator::LessThan => 5,
            Operator::LessOrEqual => 6,
            Operator::And => 7,
            Operator::Or => 8,
            Operator::Xor => 9,
            Operator::Not => 10,
            Operator::Like => 11,
            Operator::In => 12,
            Operator::NotIn => 13,
            Operator::IsNull => 14,
            Operator::IsNotNull => 15,
            Operator::Add => 16,
            Operator::Subtract => 17,
            Operator::Multiply => 18,
            Operator::Divide => 19,
            Operator::Modulo => 20,
            Operator::Round => 21,
            Operator::Sum => 22,
            Operator::Min => 23,
            Operator::Max => 24,
            Operator::Avg => 25,
            Operator::Count => 26,
            Operator::Func => 27,
            Operator::DateAddSeconds => 28,
            Operator::StartsWith => 29,
            Operator::EndsWith => 30,
            Operator::Contains => 31,
        }
    }

    pub fn from_code(code: u8) -> Result<Operator> {
        ALL.into_iter()
            .find(|op| op.code() == code)
            .ok_or_else(|| err!("unknown operator code {code}"))
    }

    /// Aggregates make a query grouped.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Operator::Sum | Operator::Min | Operator::Max | Operator::Avg | Operator::Count
        )
    }

    /// Checks operand count. Arity is validated when a statement is
    /// rendered, not when the node is built.
    pub fn check_arity(self, count: usize) -> Result<()> {
        use Operator::*;

        let ok = match self {
            Equal | NotEqual | GreaterThan | GreaterOrEqual | LessThan | LessOrEqual | Xor
            | Like | In | NotIn | DateAddSeconds | StartsWith | EndsWith | Contains => count == 2,
            Not | IsNull | IsNotNull | Sum | Min | Max | Avg => count == 1,
            And | Or => count >= 1,
            Add | Subtract | Multiply | Divide | Modulo => count >= 2,
            Round => count == 1 || count == 2,
            Count | Func => true,
        };

        if ok {
            Ok(())
        } else {
            Err(Error::invalid_statement(format!(
                "operator {self:?} does not take {count} operand(s)"
            )))
        }
    }
}

impl From<Operator> for u8 {
    fn from(op: Operator) -> u8 {
        op.code()
    }
}

impl TryFrom<u8> for Operator {
    type Error = Error;

    fn try_from(code: u8) -> Result<Operator> {
        Operator::from_code(code)
    }
}
