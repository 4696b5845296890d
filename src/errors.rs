//! Runtime error taxonomy.
//!
//! Every semantic failure carries the source line it was detected on, and
//! its Display form is exactly the single diagnostic line the runtime
//! prints before halting: `**<category>: <detail> (line N)`. Errors are
//! propagated inline with `Result`; nothing unwinds across the
//! evaluator/executor/debugger boundary, and nothing is retried.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("**SEMANTIC ERROR: name '{name}' is not defined (line {line})")]
    UndefinedName { name: String, line: u32 },

    #[error("**SEMANTIC ERROR: invalid operand types (line {line})")]
    InvalidOperands { line: u32 },

    #[error("**SEMANTIC ERROR: invalid string for {builtin}() (line {line})")]
    InvalidConversion { builtin: &'static str, line: u32 },

    #[error("**SEMANTIC ERROR: function '{name}' is not defined (line {line})")]
    UndefinedFunction { name: String, line: u32 },

    #[error("**ZeroDivisionError: division by zero (line {line})")]
    DivisionByZero { line: u32 },

    #[error("**ERROR: input stream failed: {0}")]
    Io(#[from] io::Error),
}

impl ExecError {
    /// Source line the failure was reported on, when one applies.
    pub fn line(&self) -> Option<u32> {
        match self {
            ExecError::UndefinedName { line, .. }
            | ExecError::InvalidOperands { line }
            | ExecError::InvalidConversion { line, .. }
            | ExecError::UndefinedFunction { line, .. }
            | ExecError::DivisionByZero { line } => Some(*line),
            ExecError::Io(_) => None,
        }
    }
}
