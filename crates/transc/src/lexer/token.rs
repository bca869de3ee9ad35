//! Token definitions

use crate::common::Span;
use std::fmt;

/// Integer code identifying a lexeme's category
///
/// Codes come from a [`TokenTable`](super::TokenTable). The three reserved
/// codes below are shared by every table; everything else is assigned by
/// the table that maps keywords and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(pub u16);

impl TokenKind {
    /// Any alpha-led word that is not a keyword
    pub const IDENTIFIER: TokenKind = TokenKind(1);
    /// Digit-led run of digits and dots
    pub const NUMBER: TokenKind = TokenKind(2);
    /// Quoted text, delimiters included
    pub const STRING: TokenKind = TokenKind(3);

    /// First code available to table entries
    pub const FIRST_FREE: u16 = 16;

    pub fn code(self) -> u16 {
        self.0
    }

    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_FREE
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TokenKind::IDENTIFIER => write!(f, "identifier"),
            TokenKind::NUMBER => write!(f, "number"),
            TokenKind::STRING => write!(f, "string"),
            TokenKind(code) => write!(f, "#{code}"),
        }
    }
}

/// Token with source location
///
/// The value borrows from the scanned buffer, so tokens never outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub value: &'s str,
    pub span: Span,
}

impl<'s> Token<'s> {
    pub fn new(kind: TokenKind, value: &'s str, span: Span) -> Self {
        Self { kind, value, span }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4} {:<10} {:?}", self.kind.code(), self.kind.to_string(), self.value)
    }
}
