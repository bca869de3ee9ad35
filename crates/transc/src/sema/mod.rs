//! Semantic analysis

mod access;
mod analyzer;
mod fold;
mod scope;

pub use access::{Access, Resolution};
pub use analyzer::{Analysis, AnalyzerConfig, Note, Policy, SemanticAnalyzer};
pub use fold::{Folded, ModuloMode, fold_binary};
pub use scope::{DeclKind, Declaration, ReturnSlot, Scope, ScopeArena, ScopeId, ScopeKind};
