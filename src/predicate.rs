//! Comparison operators used by predicates and selectivity estimation.

use crate::error::DbError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Equals,
    GreaterThan,
    LessThan,
    LessThanOrEq,
    GreaterThanOrEq,
    Like,
    NotEquals,
}

impl Op {
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Equals => "=",
            Op::GreaterThan => ">",
            Op::LessThan => "<",
            Op::LessThanOrEq => "<=",
            Op::GreaterThanOrEq => ">=",
            Op::Like => "LIKE",
            Op::NotEquals => "<>",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Op {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Op::Equals),
            ">" => Ok(Op::GreaterThan),
            "<" => Ok(Op::LessThan),
            "<=" => Ok(Op::LessThanOrEq),
            ">=" => Ok(Op::GreaterThanOrEq),
            "LIKE" => Ok(Op::Like),
            "<>" | "!=" => Ok(Op::NotEquals),
            other => Err(DbError::InvalidArgument(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }
}
