//! Expression AST nodes

use crate::common::Span;
use crate::lexer::TokenKind;
use crate::sema::Access;

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn identifier(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Identifier(Identifier::new(name)), span)
    }

    pub fn pointer(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Identifier(Identifier::new(name).with_pointer(true)), span)
    }

    pub fn number(value: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::new(LiteralKind::Number, value)), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::new(LiteralKind::String, value)), span)
    }

    pub fn binary(left: Expr, operator: TokenKind, right: Expr) -> Self {
        let span = left.span.to(right.span);
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                arguments,
            },
            span,
        )
    }

    pub fn member(object: Expr, property: Expr) -> Self {
        let span = object.span.to(property.span);
        Self::new(
            ExprKind::Member {
                object: Box::new(object),
                property: Box::new(property),
            },
            span,
        )
    }

    pub fn array(elements: Vec<Expr>, span: Span) -> Self {
        Self::new(ExprKind::Array(elements), span)
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Number, string or keyword literal: 5, 'text', true
    Literal(Literal),
    /// Name reference: x
    Identifier(Identifier),
    /// Parameter node used in value position
    Parameter(Parameter),
    /// Binary operation; the operator is a token kind code: a + b
    Binary {
        left: Box<Expr>,
        operator: TokenKind,
        right: Box<Expr>,
    },
    /// Function call: f(a, b)
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    /// Member access: a.b, f().b, a.b.c
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
    },
    /// Array construction: [a, b, c]
    Array(Vec<Expr>),
}

/// Literal category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
}

/// A literal with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Numeric value of a number literal with finite, well-formed text
    pub fn as_number(&self) -> Option<f64> {
        if self.kind != LiteralKind::Number {
            return None;
        }
        self.value.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

/// A name reference
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    /// Written as an explicit pointer at this use site
    pub is_pointer: bool,
    /// Filled in by the analyzer
    pub access: Option<Access>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_pointer: false,
            access: None,
        }
    }

    pub fn with_pointer(mut self, is_pointer: bool) -> Self {
        self.is_pointer = is_pointer;
        self
    }
}

/// A declared function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// In-out parameter: reads and writes go through an indirection cell
    pub is_reference: bool,
    pub is_pointer: bool,
    pub span: Span,
}

impl Parameter {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            is_reference: false,
            is_pointer: false,
            span,
        }
    }

    pub fn reference(name: impl Into<String>, span: Span) -> Self {
        Self {
            is_reference: true,
            ..Self::new(name, span)
        }
    }

    pub fn with_pointer(mut self, is_pointer: bool) -> Self {
        self.is_pointer = is_pointer;
        self
    }
}
