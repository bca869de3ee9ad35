//! transc - scanner and semantic analysis front end
//!
//! The front end turns source text into tokens and, once an external parser
//! has built a scoped AST from them, resolves every identifier against the
//! scope chain so a code generator knows how each reference must be written.
//!
//! ## Architecture
//!
//! - **Common** (`common/`): errors, spans and diagnostic reporting
//! - **Lexer** (`lexer/`): token table and the table-driven scanner
//! - **AST** (`ast/`): node vocabulary shared with the parser
//! - **Sema** (`sema/`): scope arena, access classification, analyzer
//! - **Driver** (`driver/`): scanner, program builder and analyzer in sequence

pub mod ast;
pub mod common;
pub mod driver;
pub mod lexer;
pub mod sema;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{Compiled, Pipeline, ProgramBuilder};
pub use lexer::{QuoteMatching, Scanner, Token, TokenKind, TokenTable};
pub use sema::{Access, Analysis, AnalyzerConfig, Policy, SemanticAnalyzer};
