//! Program graph: the statement/expression structure handed to the runtime
//! by the front end.
//!
//! Statements live in an arena (`Vec<Stmt>`) and link to each other through
//! stable indices, so the executor and debugger can walk the graph with a
//! plain cursor and never mutate its topology. The graph is read-mostly:
//! built once (by deserializing the front end's JSON output or through
//! [`ProgramBuilder`]) and only traversed afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable arena index of a statement node.
pub type StmtId = usize;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read program file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse program graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("program entry {0} is out of range")]
    EntryOutOfRange(StmtId),
    #[error("statement {from} links to {to}, which is out of range")]
    LinkOutOfRange { from: StmtId, to: StmtId },
}

/// Binary and relational operators. `NoOp` marks a single-element
/// expression whose value is the lhs unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Plus,
    Minus,
    Asterisk,
    Div,
    Mod,
    Power,
    Equal,
    NotEqual,
    Lt,
    Lte,
    Gt,
    Gte,
    NoOp,
}

/// Leaf expression operand: a literal (carrying its source text) or an
/// identifier reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    IntLiteral(String),
    RealLiteral(String),
    StrLiteral(String),
    True,
    False,
    Identifier(String),
}

/// One expression: a leaf, or exactly one operator applied to two leaves.
/// The front end never nests binaries, and this type cannot represent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub lhs: Element,
    pub op: Operator,
    pub rhs: Option<Element>,
}

impl Expr {
    pub fn element(lhs: Element) -> Self {
        Expr {
            lhs,
            op: Operator::NoOp,
            rhs: None,
        }
    }

    pub fn binary(lhs: Element, op: Operator, rhs: Element) -> Self {
        Expr {
            lhs,
            op,
            rhs: Some(rhs),
        }
    }
}

/// Right-hand side of an assignment: an expression, or a call to one of the
/// builtin functions (`input`, `int`, `float`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignRhs {
    Expr(Expr),
    Call { name: String, arg: Option<Element> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Assignment {
        var_name: String,
        rhs: AssignRhs,
        next: Option<StmtId>,
    },
    FunctionCall {
        name: String,
        arg: Option<Element>,
        next: Option<StmtId>,
    },
    Pass {
        next: Option<StmtId>,
    },
    WhileLoop {
        condition: Expr,
        /// Entered when the condition is true; the body's last statement
        /// links back to this node.
        body: Option<StmtId>,
        /// Taken when the condition is false.
        next: Option<StmtId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub line: u32,
    pub kind: StmtKind,
}

/// The whole statement arena plus its entry node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    stmts: Vec<Stmt>,
    entry: Option<StmtId>,
}

impl Program {
    pub fn entry(&self) -> Option<StmtId> {
        self.entry
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Source lines that carry a statement, for breakpoint validation.
    pub fn statement_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.stmts.iter().map(|stmt| stmt.line)
    }

    /// Deserializes a program graph from JSON text and validates its links.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let program: Program = serde_json::from_str(text)?;
        program.validate()?;
        Ok(program)
    }

    /// Loads a program graph from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, GraphError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Checks that the entry and every link point inside the arena. A graph
    /// failing this check is a front-end contract violation, not something
    /// the runtime can recover from.
    pub fn validate(&self) -> Result<(), GraphError> {
        if let Some(entry) = self.entry {
            if entry >= self.stmts.len() {
                return Err(GraphError::EntryOutOfRange(entry));
            }
        }
        for (from, stmt) in self.stmts.iter().enumerate() {
            let links = match &stmt.kind {
                StmtKind::Assignment { next, .. }
                | StmtKind::FunctionCall { next, .. }
                | StmtKind::Pass { next } => [*next, None],
                StmtKind::WhileLoop { body, next, .. } => [*body, *next],
            };
            for to in links.into_iter().flatten() {
                if to >= self.stmts.len() {
                    return Err(GraphError::LinkOutOfRange { from, to });
                }
            }
        }
        Ok(())
    }
}

/// Which outgoing link of a statement is still waiting to be wired by the
/// builder.
#[derive(Debug, Clone, Copy)]
enum OpenLink {
    Next(StmtId),
    Body(StmtId),
}

/// Sequential construction of a program graph, standing in for the excluded
/// front end. Statements appended after `while_loop` form the loop body
/// until the matching `end_loop`, which links the body back to the loop
/// header.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    stmts: Vec<Stmt>,
    entry: Option<StmtId>,
    pending: Option<OpenLink>,
    open_loops: Vec<StmtId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, line: u32, var_name: &str, rhs: Expr) -> &mut Self {
        self.push(line, StmtKind::Assignment {
            var_name: var_name.to_string(),
            rhs: AssignRhs::Expr(rhs),
            next: None,
        })
    }

    pub fn assign_call(
        &mut self,
        line: u32,
        var_name: &str,
        func: &str,
        arg: Option<Element>,
    ) -> &mut Self {
        self.push(line, StmtKind::Assignment {
            var_name: var_name.to_string(),
            rhs: AssignRhs::Call {
                name: func.to_string(),
                arg,
            },
            next: None,
        })
    }

    pub fn call(&mut self, line: u32, name: &str, arg: Option<Element>) -> &mut Self {
        self.push(line, StmtKind::FunctionCall {
            name: name.to_string(),
            arg,
            next: None,
        })
    }

    pub fn pass(&mut self, line: u32) -> &mut Self {
        self.push(line, StmtKind::Pass { next: None })
    }

    pub fn while_loop(&mut self, line: u32, condition: Expr) -> &mut Self {
        self.push(line, StmtKind::WhileLoop {
            condition,
            body: None,
            next: None,
        });
        let id = self.stmts.len() - 1;
        self.open_loops.push(id);
        self.pending = Some(OpenLink::Body(id));
        self
    }

    /// Closes the innermost open loop, linking the body's last statement
    /// back to the loop header.
    pub fn end_loop(&mut self) -> &mut Self {
        let header = self
            .open_loops
            .pop()
            .expect("end_loop without a matching while_loop");
        self.wire_pending(header);
        self.pending = Some(OpenLink::Next(header));
        self
    }

    pub fn build(mut self) -> Program {
        assert!(
            self.open_loops.is_empty(),
            "program has an unclosed while loop"
        );
        self.pending = None;
        Program {
            stmts: self.stmts,
            entry: self.entry,
        }
    }

    fn push(&mut self, line: u32, kind: StmtKind) -> &mut Self {
        self.stmts.push(Stmt { line, kind });
        let id = self.stmts.len() - 1;
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        self.wire_pending(id);
        if !matches!(self.stmts[id].kind, StmtKind::WhileLoop { .. }) {
            self.pending = Some(OpenLink::Next(id));
        }
        self
    }

    fn wire_pending(&mut self, target: StmtId) {
        let Some(open) = self.pending.take() else {
            return;
        };
        match open {
            OpenLink::Next(id) => match &mut self.stmts[id].kind {
                StmtKind::Assignment { next, .. }
                | StmtKind::FunctionCall { next, .. }
                | StmtKind::Pass { next }
                | StmtKind::WhileLoop { next, .. } => *next = Some(target),
            },
            OpenLink::Body(id) => match &mut self.stmts[id].kind {
                StmtKind::WhileLoop { body, .. } => *body = Some(target),
                _ => unreachable!("body link on a non-loop statement"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_wires_straight_line_links() {
        let mut b = ProgramBuilder::new();
        b.assign(1, "x", Expr::element(Element::IntLiteral("1".into())))
            .pass(2)
            .call(3, "print", Some(Element::Identifier("x".into())));
        let program = b.build();

        assert_eq!(program.entry(), Some(0));
        match &program.stmt(0).kind {
            StmtKind::Assignment { next, .. } => assert_eq!(*next, Some(1)),
            other => panic!("expected assignment, found {other:?}"),
        }
        match &program.stmt(1).kind {
            StmtKind::Pass { next } => assert_eq!(*next, Some(2)),
            other => panic!("expected pass, found {other:?}"),
        }
        match &program.stmt(2).kind {
            StmtKind::FunctionCall { next, .. } => assert_eq!(*next, None),
            other => panic!("expected call, found {other:?}"),
        }
    }

    #[test]
    fn builder_loops_rejoin_the_header() {
        let mut b = ProgramBuilder::new();
        b.assign(1, "x", Expr::element(Element::IntLiteral("0".into())))
            .while_loop(
                2,
                Expr::binary(
                    Element::Identifier("x".into()),
                    Operator::Lt,
                    Element::IntLiteral("3".into()),
                ),
            )
            .assign(
                3,
                "x",
                Expr::binary(
                    Element::Identifier("x".into()),
                    Operator::Plus,
                    Element::IntLiteral("1".into()),
                ),
            )
            .end_loop()
            .call(4, "print", Some(Element::Identifier("x".into())));
        let program = b.build();

        match &program.stmt(1).kind {
            StmtKind::WhileLoop { body, next, .. } => {
                assert_eq!(*body, Some(2));
                assert_eq!(*next, Some(3));
            }
            other => panic!("expected while loop, found {other:?}"),
        }
        // Loop body's last statement links back to the header.
        match &program.stmt(2).kind {
            StmtKind::Assignment { next, .. } => assert_eq!(*next, Some(1)),
            other => panic!("expected assignment, found {other:?}"),
        }
        assert!(program.validate().is_ok());
    }

    #[test]
    fn from_json_accepts_a_front_end_graph() {
        let text = r#"
        {
          "stmts": [
            { "line": 1,
              "kind": { "Assignment": {
                "var_name": "x",
                "rhs": { "Expr": { "lhs": { "IntLiteral": "5" },
                                   "op": "NoOp", "rhs": null } },
                "next": 1 } } },
            { "line": 2,
              "kind": { "FunctionCall": {
                "name": "print",
                "arg": { "Identifier": "x" },
                "next": null } } }
          ],
          "entry": 0
        }"#;
        let program = Program::from_json(text).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.entry(), Some(0));
    }

    #[test]
    fn validate_rejects_dangling_links() {
        let text = r#"
        { "stmts": [ { "line": 1, "kind": { "Pass": { "next": 9 } } } ],
          "entry": 0 }"#;
        let err = Program::from_json(text).unwrap_err();
        assert!(matches!(
            err,
            GraphError::LinkOutOfRange { from: 0, to: 9 }
        ));
    }
}
