//! Expression evaluator: leaf retrieval and single-level binary dispatch.
//!
//! Operator semantics are chosen by the runtime types of the two operands:
//! string/string, int/int, and any int/real mix (promoted to real). Every
//! other pairing is a type error naming the statement's source line.

use crate::errors::ExecError;
use crate::graph::{Element, Expr, Operator};
use crate::ram::Ram;
use crate::value::Value;

/// Produces the value of a leaf element: literals parse their source text,
/// identifiers read a copy of their current binding from memory.
pub fn retrieve(element: &Element, ram: &Ram, line: u32) -> Result<Value, ExecError> {
    match element {
        Element::IntLiteral(text) => {
            let value = text
                .parse::<i64>()
                .unwrap_or_else(|_| panic!("malformed int literal '{text}' in program graph"));
            Ok(Value::Int(value))
        }
        Element::RealLiteral(text) => {
            let value = text
                .parse::<f64>()
                .unwrap_or_else(|_| panic!("malformed real literal '{text}' in program graph"));
            Ok(Value::Real(value))
        }
        Element::StrLiteral(text) => Ok(Value::Str(text.clone())),
        Element::True => Ok(Value::Bool(true)),
        Element::False => Ok(Value::Bool(false)),
        Element::Identifier(name) => {
            ram.read_by_name(name).ok_or_else(|| ExecError::UndefinedName {
                name: name.clone(),
                line,
            })
        }
    }
}

/// Evaluates an expression against the store. The lhs is evaluated first;
/// the rhs only when the operator is not `NoOp`; failure from either side
/// propagates immediately.
pub fn evaluate(expr: &Expr, ram: &Ram, line: u32) -> Result<Value, ExecError> {
    let lhs = retrieve(&expr.lhs, ram, line)?;
    if expr.op == Operator::NoOp {
        return Ok(lhs);
    }
    let rhs_element = expr
        .rhs
        .as_ref()
        .unwrap_or_else(|| panic!("binary expression on line {line} is missing its rhs"));
    let rhs = retrieve(rhs_element, ram, line)?;

    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => eval_str(a, b, expr.op, line),
        (Value::Int(a), Value::Int(b)) => eval_int(a, b, expr.op, line),
        (Value::Int(a), Value::Real(b)) => eval_real(a as f64, b, expr.op, line),
        (Value::Real(a), Value::Int(b)) => eval_real(a, b as f64, expr.op, line),
        (Value::Real(a), Value::Real(b)) => eval_real(a, b, expr.op, line),
        _ => Err(ExecError::InvalidOperands { line }),
    }
}

fn eval_str(a: String, b: String, op: Operator, line: u32) -> Result<Value, ExecError> {
    let value = match op {
        Operator::Plus => Value::Str(a + &b),
        // str comparisons are byte-wise lexicographic.
        Operator::Equal => Value::Bool(a == b),
        Operator::NotEqual => Value::Bool(a != b),
        Operator::Lt => Value::Bool(a < b),
        Operator::Lte => Value::Bool(a <= b),
        Operator::Gt => Value::Bool(a > b),
        Operator::Gte => Value::Bool(a >= b),
        _ => return Err(ExecError::InvalidOperands { line }),
    };
    Ok(value)
}

fn eval_int(a: i64, b: i64, op: Operator, line: u32) -> Result<Value, ExecError> {
    // Arithmetic wraps two's-complement on overflow.
    let value = match op {
        Operator::Plus => Value::Int(a.wrapping_add(b)),
        Operator::Minus => Value::Int(a.wrapping_sub(b)),
        Operator::Asterisk => Value::Int(a.wrapping_mul(b)),
        Operator::Div => {
            if b == 0 {
                return Err(ExecError::DivisionByZero { line });
            }
            Value::Int(a.wrapping_div(b))
        }
        Operator::Mod => {
            if b == 0 {
                return Err(ExecError::DivisionByZero { line });
            }
            Value::Int(a.wrapping_rem(b))
        }
        // Computed through floating exponentiation and narrowed back, so
        // results lose precision above 2^53.
        Operator::Power => Value::Int((a as f64).powf(b as f64) as i64),
        Operator::Equal => Value::Bool(a == b),
        Operator::NotEqual => Value::Bool(a != b),
        Operator::Lt => Value::Bool(a < b),
        Operator::Lte => Value::Bool(a <= b),
        Operator::Gt => Value::Bool(a > b),
        Operator::Gte => Value::Bool(a >= b),
        Operator::NoOp => unreachable!("NoOp handled before dispatch"),
    };
    Ok(value)
}

fn eval_real(a: f64, b: f64, op: Operator, line: u32) -> Result<Value, ExecError> {
    let value = match op {
        Operator::Plus => Value::Real(a + b),
        Operator::Minus => Value::Real(a - b),
        Operator::Asterisk => Value::Real(a * b),
        Operator::Div => {
            if b == 0.0 {
                return Err(ExecError::DivisionByZero { line });
            }
            Value::Real(a / b)
        }
        Operator::Mod => {
            if b == 0.0 {
                return Err(ExecError::DivisionByZero { line });
            }
            Value::Real(a % b)
        }
        Operator::Power => Value::Real(a.powf(b)),
        Operator::Equal => Value::Bool(a == b),
        Operator::NotEqual => Value::Bool(a != b),
        Operator::Lt => Value::Bool(a < b),
        Operator::Lte => Value::Bool(a <= b),
        Operator::Gt => Value::Bool(a > b),
        Operator::Gte => Value::Bool(a >= b),
        Operator::NoOp => unreachable!("NoOp handled before dispatch"),
    };
    Ok(value)
}
