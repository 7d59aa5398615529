//! The rewriting engine: expression trees, pattern matching,
//! substitution, rule application and the breadth-first searches built
//! on top of them. Statements that drive the engine live in the
//! [command](super::command) module.

pub mod diagnostics;
pub mod lexer;
#[macro_use]
pub mod expr;
pub mod rule;
pub mod search;
