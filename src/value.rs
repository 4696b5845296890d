use std::fmt;

/// tinypy runtime value. Every value stored in RAM or produced by the
/// evaluator is one of these variants; `Clone` performs a deep copy, so a
/// cloned `Str` never aliases the original buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Int(i64),
    Real(f64),
    Str(String),
    Bool(bool),
    Ptr(usize),
}

impl Value {
    /// Human-readable name of the variant, as shown in memory dumps and by
    /// the debugger's `p` command.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Ptr(_) => "ptr",
        }
    }

    /// Truthiness used by while-loop conditions: non-zero numerics and true
    /// booleans. Other variants have no truth value (the executor reports a
    /// type error for them).
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Value::Int(i) => Some(*i != 0),
            Value::Real(r) => Some(*r != 0.0),
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders per the print contract: integers in decimal, reals with six
    /// fixed decimals, strings verbatim, booleans as `True`/`False`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:.6}", r),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Ptr(p) => write!(f, "{}", p),
        }
    }
}
