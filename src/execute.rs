//! Statement executor: walks the program graph and mutates memory.
//!
//! The engine is built around [`step`], which executes exactly one arena
//! node and returns the id of its successor. Batch execution ([`run`]) is a
//! loop over `step`; the debugger drives the same function one node at a
//! time, so both traversal disciplines share one implementation and the
//! graph is never mutated by either.

use std::io::{BufRead, Write};

use crate::errors::ExecError;
use crate::eval;
use crate::graph::{AssignRhs, Element, Program, StmtId, StmtKind};
use crate::ram::Ram;
use crate::value::Value;

/// Injected I/O streams backing `print` and `input`.
pub struct Console<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Console { input, output }
    }
}

/// Runs the program from its entry node to completion. Halts on the first
/// error from any evaluation; memory keeps everything already written.
pub fn run(program: &Program, ram: &mut Ram, console: &mut Console<'_>) -> Result<(), ExecError> {
    let mut cur = program.entry();
    while let Some(id) = cur {
        cur = step(program, id, ram, console)?;
    }
    Ok(())
}

/// Executes the single statement `id` and returns its successor: the
/// forward link for assignment/call/pass, or the condition-selected branch
/// for a while loop.
pub fn step(
    program: &Program,
    id: StmtId,
    ram: &mut Ram,
    console: &mut Console<'_>,
) -> Result<Option<StmtId>, ExecError> {
    let stmt = program.stmt(id);
    match &stmt.kind {
        StmtKind::Assignment {
            var_name,
            rhs,
            next,
        } => {
            let value = match rhs {
                AssignRhs::Expr(expr) => eval::evaluate(expr, ram, stmt.line)?,
                AssignRhs::Call { name, arg } => {
                    exec_builtin(name, arg.as_ref(), ram, console, stmt.line)?
                }
            };
            ram.write_by_name(value, var_name);
            Ok(*next)
        }
        StmtKind::FunctionCall { name, arg, next } => {
            if name != "print" {
                return Err(ExecError::UndefinedFunction {
                    name: name.clone(),
                    line: stmt.line,
                });
            }
            exec_print(arg.as_ref(), ram, console, stmt.line)?;
            Ok(*next)
        }
        StmtKind::Pass { next } => Ok(*next),
        StmtKind::WhileLoop {
            condition,
            body,
            next,
        } => {
            let value = eval::evaluate(condition, ram, stmt.line)?;
            match value.as_condition() {
                Some(true) => Ok(*body),
                Some(false) => Ok(*next),
                None => Err(ExecError::InvalidOperands { line: stmt.line }),
            }
        }
    }
}

/// Builtin calls allowed on an assignment's right-hand side.
fn exec_builtin(
    name: &str,
    arg: Option<&Element>,
    ram: &Ram,
    console: &mut Console<'_>,
    line: u32,
) -> Result<Value, ExecError> {
    match name {
        "input" => exec_input(arg, ram, console, line),
        "int" => exec_convert("int", arg, ram, line),
        "float" => exec_convert("float", arg, ram, line),
        other => Err(ExecError::UndefinedFunction {
            name: other.to_string(),
            line,
        }),
    }
}

/// `input(prompt)`: prompt without a newline, then block reading one line
/// and strip its trailing newline.
fn exec_input(
    arg: Option<&Element>,
    ram: &Ram,
    console: &mut Console<'_>,
    line: u32,
) -> Result<Value, ExecError> {
    if let Some(element) = arg {
        let prompt = eval::retrieve(element, ram, line)?;
        write!(console.output, "{prompt}")?;
        console.output.flush()?;
    }
    let mut buffer = String::new();
    console.input.read_line(&mut buffer)?;
    while buffer.ends_with(['\n', '\r']) {
        buffer.pop();
    }
    Ok(Value::Str(buffer))
}

/// `int(x)` / `float(x)`: reads the String variable named by the argument
/// and parses its text. The standard numeric grammar is the single source
/// of validity, so `int("3.5")` is a conversion error rather than a silent
/// truncation.
fn exec_convert(
    builtin: &'static str,
    arg: Option<&Element>,
    ram: &Ram,
    line: u32,
) -> Result<Value, ExecError> {
    let Some(Element::Identifier(var)) = arg else {
        return Err(ExecError::InvalidConversion { builtin, line });
    };
    let value = ram
        .read_by_name(var)
        .ok_or_else(|| ExecError::UndefinedName {
            name: var.clone(),
            line,
        })?;
    let Value::Str(text) = value else {
        return Err(ExecError::InvalidConversion { builtin, line });
    };
    match builtin {
        "int" => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ExecError::InvalidConversion { builtin, line }),
        _ => text
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| ExecError::InvalidConversion { builtin, line }),
    }
}

/// `print`: blank line with no argument, otherwise one line rendered by
/// runtime type.
fn exec_print(
    arg: Option<&Element>,
    ram: &Ram,
    console: &mut Console<'_>,
    line: u32,
) -> Result<(), ExecError> {
    match arg {
        None => writeln!(console.output)?,
        Some(element) => {
            let value = eval::retrieve(element, ram, line)?;
            writeln!(console.output, "{value}")?;
        }
    }
    Ok(())
}
