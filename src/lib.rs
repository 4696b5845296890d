//! tinypy: a tree-walking runtime for a small teaching language, plus an
//! interactive stepping debugger that drives the same engine one statement
//! at a time.
//!
//! The front end (scanner/parser/graph builder) is external; it hands this
//! crate a [`graph::Program`], either as JSON or through
//! [`graph::ProgramBuilder`], which [`execute`] runs against a [`ram::Ram`]
//! variable store, or [`debugger::Debugger`] steps interactively.

pub mod debugger;
pub mod errors;
pub mod eval;
pub mod execute;
pub mod graph;
pub mod ram;
pub mod value;
