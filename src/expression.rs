//! The expression evaluator collaborator.
//!
//! The engine only ever talks to an [`ExpressionEvaluator`]; which grammar
//! sits behind it is not the engine's concern. [`StandardEvaluator`] is the
//! evaluator the interpreter uses unless one is supplied.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use crate::parser;
use crate::source::Literal;
use crate::value::{Scope, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid syntax: {0}")]
    Syntax(String),
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    #[error("{0}")]
    Type(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0}")]
    Index(String),
    #[error("integer overflow")]
    Overflow,
    #[error("{0}")]
    Custom(String),
}

type Result<T> = std::result::Result<T, EvalError>;

/// Evaluates one textual expression against a scope.
pub trait ExpressionEvaluator {
    fn evaluate(&self, scope: &Scope, expr: &str) -> Result<Value>;

    /// How this evaluator spells the `null`/`true`/`false` literals. Source
    /// lines are respelled before execution.
    fn native_literal(&self, literal: Literal) -> &str {
        literal.keyword()
    }
}

/// The built-in evaluator: arithmetic, comparisons, boolean logic,
/// containers, indexing and a handful of pure intrinsics.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardEvaluator;

impl ExpressionEvaluator for StandardEvaluator {
    fn evaluate(&self, scope: &Scope, expr: &str) -> Result<Value> {
        let expr = parser::parse(expr)?;
        eval(&expr, scope)
    }
}

pub fn eval(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Name(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownName(name.clone())),
        Expr::List(items) => Ok(Value::List(eval_all(items, scope)?)),
        Expr::Tuple(items) => Ok(Value::Tuple(eval_all(items, scope)?)),
        Expr::Map(pairs) => {
            let mut out: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key = eval(k, scope)?;
                let value = eval(v, scope)?;
                match out.iter_mut().find(|(existing, _)| existing.loose_eq(&key)) {
                    Some(slot) => slot.1 = value,
                    None => out.push((key, value)),
                }
            }
            Ok(Value::Map(out))
        }
        Expr::Unary { op, operand } => unary(*op, eval(operand, scope)?),
        Expr::Binary { op, lhs, rhs } => binary(*op, eval(lhs, scope)?, eval(rhs, scope)?),
        Expr::Compare { first, rest } => {
            let mut left = eval(first, scope)?;
            for (op, operand) in rest {
                let right = eval(operand, scope)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
        Expr::And(lhs, rhs) => {
            let left = eval(lhs, scope)?;
            if left.is_truthy() {
                eval(rhs, scope)
            } else {
                Ok(left)
            }
        }
        Expr::Or(lhs, rhs) => {
            let left = eval(lhs, scope)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval(rhs, scope)
            }
        }
        Expr::Index { target, index } => subscript(eval(target, scope)?, eval(index, scope)?),
        Expr::Call { name, args } => intrinsic(name, eval_all(args, scope)?),
    }
}

fn eval_all(items: &[Expr], scope: &Scope) -> Result<Vec<Value>> {
    items.iter().map(|e| eval(e, scope)).collect()
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn unary(op: UnaryOp, operand: Value) -> Result<Value> {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Pos, v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
        (op, v) => {
            let sym = if op == UnaryOp::Neg { "-" } else { "+" };
            Err(EvalError::Type(format!(
                "bad operand type for unary {}: '{}'",
                sym,
                v.type_name()
            )))
        }
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn floor_div(a: i64, b: i64) -> Result<i64> {
    let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Result<i64> {
    let r = a.checked_rem(b).ok_or(EvalError::Overflow)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn repeat<T: Clone>(items: &[T], times: i64) -> Vec<T> {
    let times = usize::try_from(times).unwrap_or(0);
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    use Value::*;

    match (op, &lhs, &rhs) {
        (BinaryOp::Add, Int(a), Int(b)) => return a.checked_add(*b).map(Int).ok_or(EvalError::Overflow),
        (BinaryOp::Sub, Int(a), Int(b)) => return a.checked_sub(*b).map(Int).ok_or(EvalError::Overflow),
        (BinaryOp::Mul, Int(a), Int(b)) => return a.checked_mul(*b).map(Int).ok_or(EvalError::Overflow),
        (BinaryOp::FloorDiv | BinaryOp::Mod, Int(_), Int(0)) => return Err(EvalError::DivisionByZero),
        (BinaryOp::FloorDiv, Int(a), Int(b)) => return floor_div(*a, *b).map(Int),
        (BinaryOp::Mod, Int(a), Int(b)) => return floor_mod(*a, *b).map(Int),
        (BinaryOp::Add, Str(a), Str(b)) => return Ok(Str(format!("{}{}", a, b))),
        (BinaryOp::Add, List(a), List(b)) => return Ok(List([a.as_slice(), b.as_slice()].concat())),
        (BinaryOp::Add, Tuple(a), Tuple(b)) => return Ok(Tuple([a.as_slice(), b.as_slice()].concat())),
        (BinaryOp::Mul, Str(s), Int(n)) | (BinaryOp::Mul, Int(n), Str(s)) => {
            let chars: Vec<char> = s.chars().collect();
            return Ok(Str(repeat(&chars, *n).into_iter().collect()));
        }
        (BinaryOp::Mul, List(items), Int(n)) | (BinaryOp::Mul, Int(n), List(items)) => {
            return Ok(List(repeat(items, *n)));
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (as_f64(&lhs), as_f64(&rhs)) else {
        return Err(EvalError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op,
            lhs.type_name(),
            rhs.type_name()
        )));
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(EvalError::DivisionByZero);
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a - b * (a / b).floor(),
    };
    Ok(Float(result))
}

fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> Result<bool> {
    match op {
        CompareOp::Eq => return Ok(lhs.loose_eq(rhs)),
        CompareOp::NotEq => return Ok(!lhs.loose_eq(rhs)),
        _ => {}
    }
    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (as_f64(lhs), as_f64(rhs)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(EvalError::Type(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op,
                    lhs.type_name(),
                    rhs.type_name()
                )));
            }
        },
    };
    // NaN compares false under every ordering operator.
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Eq | CompareOp::NotEq => unreachable!("equality handled above"),
    })
}

fn subscript(target: Value, index: Value) -> Result<Value> {
    fn position(len: usize, index: &Value, what: &str) -> Result<usize> {
        let Value::Int(i) = index else {
            return Err(EvalError::Type(format!(
                "{} indices must be integers, not '{}'",
                what,
                index.type_name()
            )));
        };
        let len = len as i64;
        let pos = if *i < 0 { len + i } else { *i };
        if (0..len).contains(&pos) {
            Ok(pos as usize)
        } else {
            Err(EvalError::Index(format!("{} index out of range", what)))
        }
    }

    match target {
        Value::List(items) => Ok(items[position(items.len(), &index, "list")?].clone()),
        Value::Tuple(items) => Ok(items[position(items.len(), &index, "tuple")?].clone()),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let pos = position(chars.len(), &index, "string")?;
            Ok(Value::Str(chars[pos].to_string()))
        }
        Value::Map(pairs) => pairs
            .into_iter()
            .find(|(k, _)| k.loose_eq(&index))
            .map(|(_, v)| v)
            .ok_or_else(|| EvalError::Index(format!("key {} not found", index))),
        other => Err(EvalError::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Intrinsics
// ---------------------------------------------------------------------------

fn intrinsic(name: &str, args: Vec<Value>) -> Result<Value> {
    let arg = |args: Vec<Value>| -> Result<Value> {
        let count = args.len();
        let mut args = args.into_iter();
        match (args.next(), args.next()) {
            (Some(v), None) => Ok(v),
            _ => Err(EvalError::Type(format!(
                "{}() takes exactly one argument ({} given)",
                name, count
            ))),
        }
    };

    match name {
        "len" => match arg(args)? {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::List(items) | Value::Tuple(items) => Ok(Value::Int(items.len() as i64)),
            Value::Map(pairs) => Ok(Value::Int(pairs.len() as i64)),
            other => Err(EvalError::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        },
        "str" => Ok(Value::Str(arg(args)?.to_string())),
        "int" => match arg(args)? {
            v @ Value::Int(_) => Ok(v),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
            Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
                EvalError::Custom(format!("invalid literal for int(): \"{}\"", s))
            }),
            other => Err(EvalError::Type(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
        "float" => match arg(args)? {
            Value::Int(i) => Ok(Value::Float(i as f64)),
            v @ Value::Float(_) => Ok(v),
            Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| {
                EvalError::Custom(format!("could not convert string to float: \"{}\"", s))
            }),
            other => Err(EvalError::Type(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
        "abs" => match arg(args)? {
            Value::Int(i) => i.checked_abs().map(Value::Int).ok_or(EvalError::Overflow),
            Value::Float(x) => Ok(Value::Float(x.abs())),
            other => Err(EvalError::Type(format!(
                "bad operand type for abs(): '{}'",
                other.type_name()
            ))),
        },
        _ => Err(EvalError::UnknownName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(src: &str) -> Result<Value> {
        let mut scope = Scope::new();
        scope.insert("x".into(), Value::Int(12));
        scope.insert("name".into(), Value::from("cat"));
        scope.insert("xs".into(), Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        StandardEvaluator.evaluate(&scope, src)
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(eval_str("x + 1"), Ok(Value::Int(13)));
        assert_eq!(eval_str("x * 2 - 4"), Ok(Value::Int(20)));
        assert_eq!(eval_str("x // 5"), Ok(Value::Int(2)));
        assert_eq!(eval_str("-7 // 2"), Ok(Value::Int(-4)));
        assert_eq!(eval_str("-7 % 3"), Ok(Value::Int(2)));
    }

    #[test]
    fn true_division_yields_float() {
        assert_eq!(eval_str("x / 2"), Ok(Value::Float(6.0)));
        assert_eq!(eval_str("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval_str("1 % 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(eval_str("9223372036854775807 + 1"), Err(EvalError::Overflow));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval_str("x == 12"), Ok(Value::Bool(true)));
        assert_eq!(eval_str("x == 12.0"), Ok(Value::Bool(true)));
        assert_eq!(eval_str("0 < x < 10"), Ok(Value::Bool(false)));
        assert_eq!(eval_str("not x == 10 and name == \"cat\""), Ok(Value::Bool(true)));
        assert_eq!(eval_str("null or 5"), Ok(Value::Int(5)));
        assert!(matches!(eval_str("name < 3"), Err(EvalError::Type(_))));
    }

    #[test]
    fn strings_and_lists() {
        assert_eq!(eval_str("name + \"s\""), Ok(Value::from("cats")));
        assert_eq!(eval_str("\"ab\" * 2"), Ok(Value::from("abab")));
        assert_eq!(eval_str("xs[-1]"), Ok(Value::Int(3)));
        assert_eq!(eval_str("name[0]"), Ok(Value::from("c")));
        assert_eq!(
            eval_str("xs + [4]"),
            Ok(Value::List((1..=4).map(Value::Int).collect()))
        );
        assert!(matches!(eval_str("xs[3]"), Err(EvalError::Index(_))));
    }

    #[test]
    fn maps() {
        assert_eq!(eval_str(r#"{"a": 1, "b": 2}["b"]"#), Ok(Value::Int(2)));
        assert!(matches!(eval_str(r#"{"a": 1}["z"]"#), Err(EvalError::Index(_))));
    }

    #[test]
    fn intrinsics() {
        assert_eq!(eval_str("len(xs)"), Ok(Value::Int(3)));
        assert_eq!(eval_str("str(x) + name"), Ok(Value::from("12cat")));
        assert_eq!(eval_str("int(\" 42 \")"), Ok(Value::Int(42)));
        assert_eq!(eval_str("float(1)"), Ok(Value::Float(1.0)));
        assert_eq!(eval_str("abs(-3)"), Ok(Value::Int(3)));
        assert_eq!(eval_str("Nope(1)"), Err(EvalError::UnknownName("Nope".into())));
    }

    #[test]
    fn unknown_names() {
        assert_eq!(eval_str("y + 1"), Err(EvalError::UnknownName("y".into())));
        assert_eq!(
            eval_str("y + 1").unwrap_err().to_string(),
            "name 'y' is not defined"
        );
    }

    #[test]
    fn default_literal_spelling() {
        assert_eq!(StandardEvaluator.native_literal(Literal::Null), "null");
        assert_eq!(StandardEvaluator.native_literal(Literal::True), "true");
    }
}
