//! Operator table.

use crate::error::LogicError;

/// A JSON-logic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Data access
    Var,
    Missing,
    MissingSome,
    // Control flow
    If,
    And,
    Or,
    Not,
    Truthy,
    // Equality
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    // Ordering
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Max,
    Min,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Strings and arrays
    In,
    Cat,
    Substr,
    Merge,
    Map,
    Filter,
    Reduce,
    All,
    None,
    Some,
    // Dates
    PlusTime,
    After,
    Before,
    NotAfter,
    NotBefore,
}

impl Operator {
    /// Look up an operator by its JSON-logic name.
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "var" => Self::Var,
            "missing" => Self::Missing,
            "missing_some" => Self::MissingSome,
            "if" | "?:" => Self::If,
            "and" => Self::And,
            "or" => Self::Or,
            "!" => Self::Not,
            "!!" => Self::Truthy,
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "===" => Self::StrictEq,
            "!==" => Self::StrictNotEq,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "max" => Self::Max,
            "min" => Self::Min,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "in" => Self::In,
            "cat" => Self::Cat,
            "substr" => Self::Substr,
            "merge" => Self::Merge,
            "map" => Self::Map,
            "filter" => Self::Filter,
            "reduce" => Self::Reduce,
            "all" => Self::All,
            "none" => Self::None,
            "some" => Self::Some,
            "plusTime" => Self::PlusTime,
            "after" => Self::After,
            "before" => Self::Before,
            "not-after" => Self::NotAfter,
            "not-before" => Self::NotBefore,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical name, as written in predicates.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Missing => "missing",
            Self::MissingSome => "missing_some",
            Self::If => "if",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "!",
            Self::Truthy => "!!",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNotEq => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Max => "max",
            Self::Min => "min",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::In => "in",
            Self::Cat => "cat",
            Self::Substr => "substr",
            Self::Merge => "merge",
            Self::Map => "map",
            Self::Filter => "filter",
            Self::Reduce => "reduce",
            Self::All => "all",
            Self::None => "none",
            Self::Some => "some",
            Self::PlusTime => "plusTime",
            Self::After => "after",
            Self::Before => "before",
            Self::NotAfter => "not-after",
            Self::NotBefore => "not-before",
        }
    }

    /// Reject argument counts the operator cannot accept.
    ///
    /// Variadic operators (`and`, `or`, `if`, `cat`, `+`, ...) accept any count.
    pub fn check_arity(&self, found: usize) -> Result<(), LogicError> {
        let (ok, expected) = match self {
            Self::Var => (found <= 2, "0 to 2"),
            Self::MissingSome => (found == 2, "2"),
            Self::Not | Self::Truthy => (found == 1, "1"),
            Self::Eq | Self::NotEq | Self::StrictEq | Self::StrictNotEq => (found == 2, "2"),
            Self::Gt | Self::Ge => (found == 2, "2"),
            Self::Lt | Self::Le => (found == 2 || found == 3, "2 or 3"),
            Self::Sub => (found == 1 || found == 2, "1 or 2"),
            Self::Div | Self::Mod => (found == 2, "2"),
            Self::In => (found == 2, "2"),
            Self::Substr => (found == 2 || found == 3, "2 or 3"),
            Self::Map | Self::Filter | Self::All | Self::None | Self::Some => (found == 2, "2"),
            Self::Reduce => (found == 2 || found == 3, "2 or 3"),
            Self::PlusTime => (found == 3, "3"),
            Self::After | Self::Before | Self::NotAfter | Self::NotBefore => {
                (found == 2 || found == 3, "2 or 3")
            }
            _ => (true, "any"),
        };
        if ok {
            Ok(())
        } else {
            Err(LogicError::Arity {
                op: self.name(),
                expected,
                found,
            })
        }
    }
}
