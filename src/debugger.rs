//! Interactive stepping debugger: a gdb-like front end over the batch
//! execution engine.
//!
//! The controller keeps a cursor (the current arena id) over the immutable
//! program graph and delegates one node at a time to [`execute::step`],
//! which hands back the successor, including the branch a while loop
//! selects. The graph is never mutated, so it is guaranteed identical
//! before and after any session, whether it ends by completion, error, or
//! an early quit.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;

use crate::execute::{self, Console};
use crate::graph::{Program, StmtId};
use crate::ram::Ram;

/// Debugger lifecycle. `Completed` is absorbing: further run or step
/// requests only report that the program has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Loaded,
    Running,
    Completed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Loaded => "Loaded",
            State::Running => "Running",
            State::Completed => "Completed",
        };
        f.write_str(name)
    }
}

pub struct Debugger<'p> {
    program: &'p Program,
    ram: Ram,
    state: State,
    cur: Option<StmtId>,
    /// line -> "already hit this pass" flag; ordered so `lb` lists
    /// breakpoints in line order.
    breakpoints: BTreeMap<u32, bool>,
    statement_lines: HashSet<u32>,
}

impl<'p> Debugger<'p> {
    pub fn new(program: &'p Program) -> Self {
        Debugger {
            program,
            ram: Ram::new(),
            state: State::Loaded,
            cur: program.entry(),
            breakpoints: BTreeMap::new(),
            statement_lines: program.statement_lines().collect(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn current_line(&self) -> Option<u32> {
        self.cur.map(|id| self.program.stmt(id).line)
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Command loop for one debugging session. Commands and the debuggee's
    /// `input()` lines both arrive on `console.input`, consumed one line
    /// per request, so a redirected stream interleaves them in order.
    /// Replies and program output go to `console.output`. Returns when the
    /// operator quits or the stream ends.
    pub fn session(&mut self, console: &mut Console<'_>) -> io::Result<()> {
        loop {
            writeln!(console.output)?;
            writeln!(console.output, "Enter a command, type h for help. Type r to run. > ")?;

            let mut line = String::new();
            if console.input.read_line(&mut line)? == 0 {
                break; // command stream exhausted, same as quit
            }
            let mut tokens = line.split_whitespace();
            let Some(cmd) = tokens.next() else {
                continue;
            };
            let arg = tokens.next();

            match cmd {
                "q" => break,
                "h" => self.print_help(console)?,
                "r" => self.advance(false, console)?,
                "s" => self.advance(true, console)?,
                "b" => match arg.and_then(|text| text.parse().ok()) {
                    Some(line) => self.set_breakpoint(line, console)?,
                    None => writeln!(console.output, "unknown command")?,
                },
                "rb" => match arg.and_then(|text| text.parse().ok()) {
                    Some(line) => self.remove_breakpoint(line, console)?,
                    None => writeln!(console.output, "unknown command")?,
                },
                "lb" => self.list_breakpoints(console)?,
                "cb" => {
                    self.breakpoints.clear();
                    writeln!(console.output, "breakpoints cleared")?;
                }
                "p" => match arg {
                    Some(name) => self.print_variable(name, console)?,
                    None => writeln!(console.output, "unknown command")?,
                },
                "sm" => self.ram.dump(console.output)?,
                "ss" => writeln!(console.output, "{}", self.state)?,
                "w" => self.print_location(console)?,
                _ => writeln!(console.output, "unknown command")?,
            }
        }
        Ok(())
    }

    /// Executes statements through the shared single-step engine. A step
    /// executes at most one statement; a run continues until a freshly hit
    /// breakpoint, a reported error, or graph exhaustion.
    fn advance(&mut self, stepping: bool, console: &mut Console<'_>) -> io::Result<()> {
        if self.state == State::Completed {
            return writeln!(console.output, "program has completed");
        }
        if self.state == State::Loaded {
            self.state = State::Running;
        }

        while let Some(id) = self.cur {
            let line = self.program.stmt(id).line;
            if !stepping {
                if let Some(hit) = self.breakpoints.get_mut(&line) {
                    if !*hit {
                        // Pause before executing this statement; the set
                        // flag lets the next run through this line proceed,
                        // re-arming on the pass after that.
                        *hit = true;
                        return writeln!(console.output, "hit breakpoint at line {line}");
                    }
                    *hit = false;
                }
            }

            match execute::step(self.program, id, &mut self.ram, console) {
                Ok(next) => self.cur = next,
                Err(err) => {
                    writeln!(console.output, "{err}")?;
                    self.state = State::Completed;
                    return Ok(());
                }
            }

            if stepping {
                break;
            }
        }

        if self.cur.is_none() {
            self.state = State::Completed;
        }
        Ok(())
    }

    fn set_breakpoint(&mut self, line: u32, console: &mut Console<'_>) -> io::Result<()> {
        let reply = if !self.statement_lines.contains(&line) {
            "no such line"
        } else if self.breakpoints.contains_key(&line) {
            "breakpoint already set"
        } else {
            self.breakpoints.insert(line, false);
            "breakpoint set"
        };
        writeln!(console.output, "{reply}")
    }

    fn remove_breakpoint(&mut self, line: u32, console: &mut Console<'_>) -> io::Result<()> {
        let reply = match self.breakpoints.remove(&line) {
            Some(_) => "breakpoint removed",
            None => "no such breakpoint",
        };
        writeln!(console.output, "{reply}")
    }

    fn list_breakpoints(&self, console: &mut Console<'_>) -> io::Result<()> {
        if self.breakpoints.is_empty() {
            return writeln!(console.output, "no breakpoints");
        }
        write!(console.output, "breakpoints on lines:")?;
        for line in self.breakpoints.keys() {
            write!(console.output, " {line}")?;
        }
        writeln!(console.output)
    }

    fn print_variable(&self, name: &str, console: &mut Console<'_>) -> io::Result<()> {
        match self.ram.read_by_name(name) {
            None => writeln!(console.output, "no such variable"),
            Some(value) => {
                writeln!(console.output, "{name} ({}): {value}", value.type_name())
            }
        }
    }

    fn print_location(&self, console: &mut Console<'_>) -> io::Result<()> {
        match (self.state, self.current_line()) {
            (State::Completed, _) | (_, None) => {
                writeln!(console.output, "completed execution")
            }
            (_, Some(line)) => writeln!(console.output, "line {line}"),
        }
    }

    fn print_help(&self, console: &mut Console<'_>) -> io::Result<()> {
        writeln!(
            console.output,
            "Available commands:\n\
             r -> Run the program / continue from a breakpoint\n\
             s -> Step to next stmt by executing current stmt\n\
             b n -> Breakpoint at line n\n\
             rb n -> Remove breakpoint at line n\n\
             lb -> List all breakpoints\n\
             cb -> Clear all breakpoints\n\
             p varname -> Print variable\n\
             sm -> Show memory contents\n\
             ss -> Show state of debugger\n\
             w -> What line are we on?\n\
             q -> Quit the debugger"
        )
    }
}
