//! Statement AST nodes

use super::{Expr, Parameter};
use crate::common::Span;
use crate::sema::ScopeId;

/// A list of statements evaluated in its own lexical scope
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub context: ScopeId,
    pub span: Span,
}

impl Block {
    pub fn new(body: Vec<Stmt>, context: ScopeId, span: Span) -> Self {
        Self { body, context, span }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// import a, 'b'
    Import(ImportStatement),
    /// let x = init
    Variable(VariableDeclaration),
    /// let a = 1, b = 2
    MultipleVariables(Vec<VariableDeclaration>),
    /// if test { } else if test { } else { }
    If(IfStatement),
    /// func name(params) { }
    Function(FunctionDeclaration),
    /// return a / return a, b
    Return(ReturnStatement),
    /// enum Name { A, B = 2 }
    Enumeration(Enumeration),
    /// Expression in statement position: calls, assignments, member access
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub specifiers: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    /// Bound by reference to its initializer
    pub is_reference: bool,
    pub is_pointer: bool,
    pub init: Option<Expr>,
    pub span: Span,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, init: Option<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            is_reference: false,
            is_pointer: false,
            init,
            span,
        }
    }

    pub fn with_reference(mut self, is_reference: bool) -> Self {
        self.is_reference = is_reference;
        self
    }

    pub fn with_pointer(mut self, is_pointer: bool) -> Self {
        self.is_pointer = is_pointer;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub test: Expr,
    pub consequent: Option<Block>,
    pub alternate: Option<Alternate>,
}

/// What follows `else`
#[derive(Debug, Clone, PartialEq)]
pub enum Alternate {
    ElseIf(Box<IfStatement>),
    Else(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<Parameter>,
    /// Body block; its context is the function scope holding the return slots
    pub body: Block,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub argument: Option<ReturnValue>,
}

/// Returned expression(s)
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Single(Expr),
    /// Positional values for a function with named return slots
    Multiple(Vec<Expr>),
}

impl ReturnValue {
    /// Values in slot order
    pub fn values_mut(&mut self) -> &mut [Expr] {
        match self {
            ReturnValue::Single(expr) => std::slice::from_mut(expr),
            ReturnValue::Multiple(exprs) => exprs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReturnValue::Single(_) => 1,
            ReturnValue::Multiple(exprs) => exprs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<Expr>,
    pub span: Span,
}
