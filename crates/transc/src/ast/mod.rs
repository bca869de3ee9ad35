//! AST definitions consumed by the semantic analyzer
//!
//! The tree is built by an external parser. Nodes that open a lexical scope
//! (the program, function bodies, if branches) carry the [`ScopeId`] of that
//! scope inside the program's [`ScopeArena`].

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::sema::{ScopeArena, ScopeId};

/// A complete compilation unit with the scopes its parser created
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Block,
    pub scopes: ScopeArena,
}

impl Program {
    pub fn new(body: Block, scopes: ScopeArena) -> Self {
        Self { body, scopes }
    }

    /// Root scope of the program
    pub fn context(&self) -> ScopeId {
        self.body.context
    }
}
