//! Common infrastructure shared by the scanner, analyzer and driver

mod error;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use span::Span;
