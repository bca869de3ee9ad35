//! Lexer module for turning source text into tokens

mod token;
mod table;
mod scanner;

pub use token::{Token, TokenKind};
pub use table::TokenTable;
pub use scanner::{QuoteMatching, Scanner};
