use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tinypy::debugger::Debugger;
use tinypy::execute::{self, Console};
use tinypy::graph::Program;
use tinypy::ram::Ram;

#[derive(Debug, Parser)]
#[command(
    name = "tinypy",
    about = "Runs or interactively debugs a tinypy program graph.",
    version
)]
struct Args {
    /// Path to the program graph (JSON) produced by the front end.
    program: PathBuf,

    /// Open the interactive debugger instead of running to completion.
    #[arg(long)]
    debug: bool,

    /// Skip the memory dump after a batch run.
    #[arg(long)]
    no_dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let program = Program::from_path(&args.program)
        .with_context(|| format!("failed to load {}", args.program.display()))?;

    if args.debug {
        debug_program(&program)
    } else {
        run_program(&program, args.no_dump)
    }
}

/// Batch mode: run to completion (or first diagnostic), then dump memory.
fn run_program(program: &Program, no_dump: bool) -> Result<()> {
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut ram = Ram::new();
    let mut console = Console::new(&mut input, &mut output);
    if let Err(err) = execute::run(program, &mut ram, &mut console) {
        writeln!(console.output, "{err}")?;
    }
    writeln!(console.output, "**done")?;
    if !no_dump {
        ram.dump(console.output)?;
    }
    Ok(())
}

/// Interactive mode. Debugger commands and the debuggee's `input()` share
/// one buffered stdin reader, consumed a line per request, so a redirected
/// stream is handed out in order instead of being prefetched by a second
/// reader.
fn debug_program(program: &Program) -> Result<()> {
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let mut debugger = Debugger::new(program);
    let mut console = Console::new(&mut input, &mut output);
    debugger.session(&mut console)?;
    Ok(())
}
