//! # JSON-logic interpreter
//!
//! Rule predicates are third-party authored and run against untrusted
//! payloads. The interpreter therefore separates two phases:
//!
//! 1. [`Expr::compile`] parses predicate text into an expression tree and
//!    rejects anything malformed up front: invalid JSON, unknown operators,
//!    multi-key operation objects, wrong fixed arities, excessive nesting.
//! 2. [`Expr::apply`] evaluates the tree against a data value. It never
//!    panics; operand shapes it cannot work with surface as
//!    [`LogicError::InvalidOperand`].
//!
//! Coercion rules live in [`value`]. Missing variables read as `null`.
//!
//! Besides standard JSON-logic the interpreter understands date operators:
//! `plusTime` shifts a date by an amount of calendar units, and `after`,
//! `before`, `not-after`, `not-before` compare two or three dates. Date
//! operands are strings read with the credential date grammar.

pub mod ops;
pub mod value;

use serde_json::{Map, Value};

use hcv_core::{TimeUnit, Timestamp};

use crate::error::LogicError;
pub use ops::Operator;
use value::{compare, loose_eq, number_value, strict_eq, to_number, to_text, truthy};

/// Maximum nesting depth accepted by [`Expr::compile`].
pub const MAX_DEPTH: usize = 64;

/// A compiled predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A data literal (including `{}`).
    Literal(Value),
    /// An array whose elements are themselves expressions.
    Array(Vec<Expr>),
    /// An operator applied to argument expressions.
    Operation { op: Operator, args: Vec<Expr> },
}

impl Expr {
    /// Compile predicate text.
    pub fn compile(text: &str) -> Result<Self, LogicError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| LogicError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Compile an already-parsed predicate.
    pub fn from_value(value: &Value) -> Result<Self, LogicError> {
        compile_value(value, 0)
    }

    /// Evaluate against `data`.
    pub fn apply(&self, data: &Value) -> Result<Value, LogicError> {
        match self {
            Self::Literal(v) => Ok(v.clone()),
            Self::Array(items) => items
                .iter()
                .map(|item| item.apply(data))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Self::Operation { op, args } => apply_operation(*op, args, data),
        }
    }
}

fn compile_value(value: &Value, depth: usize) -> Result<Expr, LogicError> {
    if depth > MAX_DEPTH {
        return Err(LogicError::TooDeep(MAX_DEPTH));
    }
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| compile_value(item, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Expr::Array),
        Value::Object(map) if map.is_empty() => Ok(Expr::Literal(value.clone())),
        Value::Object(map) => {
            if map.len() > 1 {
                return Err(LogicError::MultipleOperators(map.keys().cloned().collect()));
            }
            let (name, raw_args) = map.iter().next().ok_or_else(|| {
                LogicError::MultipleOperators(Vec::new())
            })?;
            let op = Operator::from_name(name)
                .ok_or_else(|| LogicError::UnknownOperator(name.clone()))?;
            let args = match raw_args {
                Value::Array(items) => items
                    .iter()
                    .map(|item| compile_value(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![compile_value(single, depth + 1)?],
            };
            op.check_arity(args.len())?;
            Ok(Expr::Operation { op, args })
        }
        _ => Ok(Expr::Literal(value.clone())),
    }
}

fn eval_all(args: &[Expr], data: &Value) -> Result<Vec<Value>, LogicError> {
    args.iter().map(|arg| arg.apply(data)).collect()
}

fn arg<'a>(values: &'a [Value], index: usize) -> &'a Value {
    values.get(index).unwrap_or(&Value::Null)
}

fn apply_operation(op: Operator, args: &[Expr], data: &Value) -> Result<Value, LogicError> {
    match op {
        // Lazy operators evaluate only the branches they need.
        Operator::If => apply_if(args, data),
        Operator::And => {
            let mut last = Value::Null;
            for expr in args {
                last = expr.apply(data)?;
                if !truthy(&last) {
                    break;
                }
            }
            Ok(last)
        }
        Operator::Or => {
            let mut last = Value::Null;
            for expr in args {
                last = expr.apply(data)?;
                if truthy(&last) {
                    break;
                }
            }
            Ok(last)
        }
        Operator::Map | Operator::Filter | Operator::All | Operator::None | Operator::Some => {
            apply_iteration(op, args, data)
        }
        Operator::Reduce => apply_reduce(args, data),
        _ => {
            let values = eval_all(args, data)?;
            apply_eager(op, &values, data)
        }
    }
}

fn apply_if(args: &[Expr], data: &Value) -> Result<Value, LogicError> {
    for pair in args.chunks(2) {
        match pair {
            [condition, then] => {
                if truthy(&condition.apply(data)?) {
                    return then.apply(data);
                }
            }
            [otherwise] => return otherwise.apply(data),
            _ => {}
        }
    }
    Ok(Value::Null)
}

fn apply_iteration(op: Operator, args: &[Expr], data: &Value) -> Result<Value, LogicError> {
    let items = match args[0].apply(data)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    let logic = &args[1];
    match op {
        Operator::Map => items
            .iter()
            .map(|item| logic.apply(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Operator::Filter => {
            let mut kept = Vec::new();
            for item in items {
                if truthy(&logic.apply(&item)?) {
                    kept.push(item);
                }
            }
            Ok(Value::Array(kept))
        }
        Operator::All => {
            if items.is_empty() {
                return Ok(Value::Bool(false));
            }
            for item in &items {
                if !truthy(&logic.apply(item)?) {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Operator::Some | Operator::None => {
            let mut any = false;
            for item in &items {
                if truthy(&logic.apply(item)?) {
                    any = true;
                    break;
                }
            }
            Ok(Value::Bool(if op == Operator::Some { any } else { !any }))
        }
        _ => Ok(Value::Null),
    }
}

fn apply_reduce(args: &[Expr], data: &Value) -> Result<Value, LogicError> {
    let items = args[0].apply(data)?;
    let logic = &args[1];
    let mut accumulator = match args.get(2) {
        Some(initial) => initial.apply(data)?,
        None => Value::Null,
    };
    let Value::Array(items) = items else {
        return Ok(accumulator);
    };
    for current in items {
        let mut scope = Map::new();
        scope.insert("current".to_string(), current);
        scope.insert("accumulator".to_string(), accumulator);
        accumulator = logic.apply(&Value::Object(scope))?;
    }
    Ok(accumulator)
}

fn apply_eager(op: Operator, values: &[Value], data: &Value) -> Result<Value, LogicError> {
    let result = match op {
        Operator::Var => lookup_var(values, data),
        Operator::Missing => Value::Array(missing_keys(values, data)),
        Operator::MissingSome => {
            let need = to_number(arg(values, 0));
            let keys = match arg(values, 1) {
                Value::Array(keys) => keys.as_slice(),
                _ => &[],
            };
            let missing = missing_keys(keys, data);
            let present = (keys.len() - missing.len()) as f64;
            if present >= need {
                Value::Array(Vec::new())
            } else {
                Value::Array(missing)
            }
        }
        Operator::Not => Value::Bool(!truthy(arg(values, 0))),
        Operator::Truthy => Value::Bool(truthy(arg(values, 0))),
        Operator::Eq => Value::Bool(loose_eq(arg(values, 0), arg(values, 1))),
        Operator::NotEq => Value::Bool(!loose_eq(arg(values, 0), arg(values, 1))),
        Operator::StrictEq => Value::Bool(strict_eq(arg(values, 0), arg(values, 1))),
        Operator::StrictNotEq => Value::Bool(!strict_eq(arg(values, 0), arg(values, 1))),
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            Value::Bool(chained_order(op, values))
        }
        Operator::Max | Operator::Min => {
            let numbers: Vec<f64> = values.iter().map(to_number).collect();
            if numbers.is_empty() || numbers.iter().any(|n| n.is_nan()) {
                Value::Null
            } else {
                let folded = numbers.into_iter().reduce(|a, b| {
                    if op == Operator::Max {
                        a.max(b)
                    } else {
                        a.min(b)
                    }
                });
                folded.map(number_value).unwrap_or(Value::Null)
            }
        }
        Operator::Add => number_value(values.iter().map(to_number).sum()),
        Operator::Mul => number_value(values.iter().map(to_number).product()),
        Operator::Sub => match values {
            [single] => number_value(-to_number(single)),
            [a, b] => number_value(to_number(a) - to_number(b)),
            _ => Value::Null,
        },
        Operator::Div => number_value(to_number(arg(values, 0)) / to_number(arg(values, 1))),
        Operator::Mod => number_value(to_number(arg(values, 0)) % to_number(arg(values, 1))),
        Operator::In => {
            let needle = arg(values, 0);
            match arg(values, 1) {
                Value::String(haystack) => Value::Bool(haystack.contains(&to_text(needle))),
                Value::Array(items) => Value::Bool(items.iter().any(|item| strict_eq(item, needle))),
                _ => Value::Bool(false),
            }
        }
        Operator::Cat => Value::String(values.iter().map(to_text).collect()),
        Operator::Substr => substr(values),
        Operator::Merge => {
            let mut merged = Vec::new();
            for v in values {
                match v {
                    Value::Array(items) => merged.extend(items.iter().cloned()),
                    other => merged.push(other.clone()),
                }
            }
            Value::Array(merged)
        }
        Operator::PlusTime => plus_time(values)?,
        Operator::After | Operator::Before | Operator::NotAfter | Operator::NotBefore => {
            Value::Bool(chained_dates(op, values)?)
        }
        Operator::If
        | Operator::And
        | Operator::Or
        | Operator::Map
        | Operator::Filter
        | Operator::Reduce
        | Operator::All
        | Operator::None
        | Operator::Some => Value::Null,
    };
    Ok(result)
}

/// Resolve a dotted path against `data`. Numeric segments index arrays.
fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(data);
    }
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn path_text(path: &Value) -> String {
    match path {
        Value::Null => String::new(),
        other => to_text(other),
    }
}

fn lookup_var(values: &[Value], data: &Value) -> Value {
    let path = path_text(arg(values, 0));
    match resolve_path(data, &path) {
        Some(Value::Null) | None => values.get(1).cloned().unwrap_or(Value::Null),
        Some(found) => found.clone(),
    }
}

fn missing_keys(values: &[Value], data: &Value) -> Vec<Value> {
    let keys = match values.first() {
        Some(Value::Array(keys)) => keys.as_slice(),
        _ => values,
    };
    keys.iter()
        .filter(|key| match resolve_path(data, &path_text(key)) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .cloned()
        .collect()
}

fn chained_order(op: Operator, values: &[Value]) -> bool {
    use std::cmp::Ordering;
    let holds = |a: &Value, b: &Value| match compare(a, b) {
        Some(Ordering::Less) => matches!(op, Operator::Lt | Operator::Le),
        Some(Ordering::Equal) => matches!(op, Operator::Le | Operator::Ge),
        Some(Ordering::Greater) => matches!(op, Operator::Gt | Operator::Ge),
        None => false,
    };
    values.windows(2).all(|pair| holds(&pair[0], &pair[1]))
}

fn substr(values: &[Value]) -> Value {
    let chars: Vec<char> = to_text(arg(values, 0)).chars().collect();
    let len = chars.len() as i64;
    let start = to_number(arg(values, 1));
    let start = if start.is_nan() { 0 } else { start as i64 };
    let start = if start < 0 {
        len.saturating_add(start).max(0)
    } else {
        start.min(len)
    };
    let end = match values.get(2) {
        None => len,
        Some(v) => {
            let n = to_number(v);
            let n = if n.is_nan() { 0 } else { n as i64 };
            if n < 0 {
                len.saturating_add(n).max(start)
            } else {
                start.saturating_add(n).min(len)
            }
        }
    };
    let (start, end) = (start as usize, end.max(start) as usize);
    Value::String(chars[start..end].iter().collect())
}

fn date_operand(op: Operator, value: &Value) -> Result<Timestamp, LogicError> {
    let text = value.as_str().ok_or_else(|| LogicError::InvalidOperand {
        op: op.name(),
        reason: format!("expected a date string, found {value}"),
    })?;
    Timestamp::parse_credential_date(text).ok_or_else(|| LogicError::InvalidOperand {
        op: op.name(),
        reason: format!("unparseable date {text:?}"),
    })
}

fn plus_time(values: &[Value]) -> Result<Value, LogicError> {
    let op = Operator::PlusTime;
    let base = date_operand(op, arg(values, 0))?;
    let amount = to_number(arg(values, 1));
    if !amount.is_finite() || amount.fract() != 0.0 || amount.abs() > i64::MAX as f64 / 2.0 {
        return Err(LogicError::InvalidOperand {
            op: op.name(),
            reason: format!("amount must be an integer, found {}", arg(values, 1)),
        });
    }
    let unit_value = arg(values, 2);
    let unit = unit_value
        .as_str()
        .and_then(TimeUnit::from_name)
        .ok_or_else(|| LogicError::InvalidOperand {
            op: op.name(),
            reason: format!("unknown time unit {unit_value}"),
        })?;
    let shifted = base
        .checked_add(amount as i64, unit)
        .map_err(|e| LogicError::InvalidOperand {
            op: op.name(),
            reason: e.to_string(),
        })?;
    Ok(Value::String(shifted.to_iso8601()))
}

fn chained_dates(op: Operator, values: &[Value]) -> Result<bool, LogicError> {
    let dates = values
        .iter()
        .map(|v| date_operand(op, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dates.windows(2).all(|pair| match op {
        Operator::After => pair[0] > pair[1],
        Operator::Before => pair[0] < pair[1],
        Operator::NotAfter => pair[0] <= pair[1],
        Operator::NotBefore => pair[0] >= pair[1],
        _ => false,
    }))
}
