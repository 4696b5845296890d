// Scripted debugging sessions driving the interactive command loop. The
// session consumes one stream for both commands and the debuggee's
// `input()` lines, so a script interleaves them in execution order.

use std::io::Cursor;

use tinypy::debugger::{Debugger, State};
use tinypy::execute::Console;
use tinypy::graph::{Element, Expr, Operator, Program, ProgramBuilder};
use tinypy::value::Value;

fn ident(name: &str) -> Element {
    Element::Identifier(name.into())
}

// n = 2
// while n > 0:
//     print(n)
//     n = n - 1
// print("liftoff")
fn countdown() -> Program {
    let mut b = ProgramBuilder::new();
    b.assign(1, "n", Expr::element(Element::IntLiteral("2".into())))
        .while_loop(
            2,
            Expr::binary(ident("n"), Operator::Gt, Element::IntLiteral("0".into())),
        )
        .call(3, "print", Some(ident("n")))
        .assign(
            4,
            "n",
            Expr::binary(ident("n"), Operator::Minus, Element::IntLiteral("1".into())),
        )
        .end_loop()
        .call(5, "print", Some(Element::StrLiteral("liftoff".into())));
    b.build()
}

fn session(program: &Program, script: &str) -> (String, State) {
    let mut dbg = Debugger::new(program);
    let mut stream = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    {
        let mut console = Console::new(&mut stream, &mut output);
        dbg.session(&mut console).unwrap();
    }
    (String::from_utf8(output).unwrap(), dbg.state())
}

#[test]
fn breakpoint_inside_loop_body_pauses_every_pass() {
    let program = countdown();
    let (output, state) = session(&program, "b 4\nr\np n\nr\np n\nr\nq\n");

    // First pause happens after printing 2 but before the decrement.
    let hits = output.matches("hit breakpoint at line 4").count();
    assert_eq!(hits, 2);
    assert!(output.contains("n (int): 2"));
    assert!(output.contains("n (int): 1"));
    // The final resume drains the loop and the trailing print.
    assert!(output.contains("liftoff"));
    assert_eq!(state, State::Completed);
}

#[test]
fn breakpoint_on_loop_header_retriggers_every_pass() {
    let program = countdown();
    // The header is evaluated once per pass plus the final failing check.
    let (output, state) = session(&program, "b 2\nr\nr\nr\nr\nq\n");

    assert_eq!(output.matches("hit breakpoint at line 2").count(), 3);
    assert!(output.contains("liftoff"));
    assert_eq!(state, State::Completed);
}

#[test]
fn stepping_ignores_breakpoints() {
    let program = countdown();
    let (output, _) = session(&program, "b 1\nb 3\ns\ns\ns\nq\n");

    assert!(!output.contains("hit breakpoint"));
    // Three steps reach the loop body's print.
    assert!(output.contains("2\n"));
}

#[test]
fn resume_after_clearing_breakpoints_runs_to_completion() {
    let program = countdown();
    let (output, state) = session(&program, "b 3\nr\ncb\nr\nq\n");

    assert_eq!(output.matches("hit breakpoint at line 3").count(), 1);
    assert!(output.contains("breakpoints cleared"));
    assert!(output.contains("liftoff"));
    assert_eq!(state, State::Completed);
}

#[test]
fn debuggee_input_is_read_during_a_paused_run() {
    // name = input("who? ")  print(name)
    let mut b = ProgramBuilder::new();
    b.assign_call(1, "name", "input", Some(Element::StrLiteral("who? ".into())))
        .call(2, "print", Some(ident("name")));
    let program = b.build();

    // The `r` reaches the input() call, which consumes the next line.
    let (output, state) = session(&program, "b 2\nr\nada\np name\nr\nq\n");
    assert!(output.contains("who? "));
    assert!(output.contains("name (str): ada"));
    assert!(output.contains("ada\n"));
    assert_eq!(state, State::Completed);
}

#[test]
fn redirected_stream_feeds_input_between_commands() {
    // name = input("who? ")  print(name)
    let mut b = ProgramBuilder::new();
    b.assign_call(1, "name", "input", Some(Element::StrLiteral("who? ".into())))
        .call(2, "print", Some(ident("name")));
    let program = b.build();

    // The step executes input(), so the line after `s` must reach the
    // debuggee rather than being swallowed or parsed as a command.
    let (output, state) = session(&program, "s\nada\nr\nq\n");
    assert!(output.contains("who? "));
    assert!(output.contains("ada\n"));
    assert!(!output.contains("unknown command"));
    assert_eq!(state, State::Completed);
}

#[test]
fn runtime_error_completes_the_session_and_keeps_the_store() {
    // x = 1  y = x / 0
    let mut b = ProgramBuilder::new();
    b.assign(1, "x", Expr::element(Element::IntLiteral("1".into())))
        .assign(
            2,
            "y",
            Expr::binary(ident("x"), Operator::Div, Element::IntLiteral("0".into())),
        );
    let program = b.build();

    let mut dbg = Debugger::new(&program);
    let mut stream = Cursor::new(b"r\nr\nsm\nq\n".to_vec());
    let mut output = Vec::new();
    {
        let mut console = Console::new(&mut stream, &mut output);
        dbg.session(&mut console).unwrap();
    }
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("**ZeroDivisionError: division by zero (line 2)"));
    assert!(output.contains("program has completed"));
    // The store still holds everything written before the fault.
    assert_eq!(dbg.ram().read_by_name("x"), Some(Value::Int(1)));
    assert!(output.contains(" 0: x, int, 1"));
}

#[test]
fn where_tracks_the_cursor_through_the_loop() {
    let program = countdown();
    let (output, _) = session(&program, "w\ns\nw\ns\nw\nq\n");

    assert!(output.contains("line 1"));
    assert!(output.contains("line 2"));
    assert!(output.contains("line 3"));
}

#[test]
fn session_leaves_the_program_graph_untouched() {
    let program = countdown();
    let pristine = program.clone();
    let (_, state) = session(&program, "b 2\nr\nr\nr\nr\nq\n");

    assert_eq!(state, State::Completed);
    assert_eq!(program, pristine);
}

#[test]
fn breakpoint_management_replies() {
    let program = countdown();
    let (output, _) = session(&program, "b 99\nb 4\nb 4\nlb\nrb 4\nrb 4\nlb\nq\n");

    assert!(output.contains("no such line"));
    assert!(output.contains("breakpoint set"));
    assert!(output.contains("breakpoint already set"));
    assert!(output.contains("breakpoints on lines: 4"));
    assert!(output.contains("breakpoint removed"));
    assert!(output.contains("no such breakpoint"));
    assert!(output.contains("no breakpoints"));
}
