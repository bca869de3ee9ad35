//! How each name reference is materialized in the output

use super::scope::{DeclKind, Declaration};
use crate::common::Span;
use std::borrow::Cow;

/// Access mode decided for one identifier reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Plain value, rendered by bare name
    Value,
    /// Explicit pointer, rendered by bare name and never unwrapped
    Pointer,
    /// By-reference binding, rendered through its indirection cell
    Cell,
    /// No declaration in scope; rendered by bare name
    Unresolved,
}

impl Access {
    /// Classify a reference written with `use_is_pointer` against its
    /// declaration. Pointer status always wins over reference flags.
    pub fn classify(use_is_pointer: bool, decl: Option<&Declaration>) -> Self {
        let Some(decl) = decl else {
            return Access::Unresolved;
        };
        if use_is_pointer || decl.is_pointer {
            return Access::Pointer;
        }
        match decl.kind {
            DeclKind::Parameter if decl.is_reference => Access::Cell,
            DeclKind::Parameter => Access::Value,
            _ if decl.is_reference => Access::Cell,
            _ => Access::Value,
        }
    }

    /// Target-side spelling of `name` under this access mode
    pub fn render<'n>(&self, name: &'n str) -> Cow<'n, str> {
        match self {
            Access::Cell => Cow::Owned(format!("{name}.value")),
            Access::Value | Access::Pointer | Access::Unresolved => Cow::Borrowed(name),
        }
    }
}

/// One identifier decision recorded during analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub access: Access,
    pub rendered: String,
    /// Right-hand side of a member expression
    pub member: bool,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_parameter_uses_cell() {
        let decl = Declaration::parameter("n").with_reference(true);
        let access = Access::classify(false, Some(&decl));
        assert_eq!(access, Access::Cell);
        assert_eq!(access.render("n"), "n.value");
    }

    #[test]
    fn test_plain_parameter_is_value() {
        let decl = Declaration::parameter("n");
        assert_eq!(Access::classify(false, Some(&decl)), Access::Value);
    }

    #[test]
    fn test_reference_variable_uses_cell() {
        let decl = Declaration::variable("v").with_reference(true);
        assert_eq!(Access::classify(false, Some(&decl)), Access::Cell);
    }

    #[test]
    fn test_pointer_wins_over_reference() {
        let decl = Declaration::parameter("p").with_reference(true);
        assert_eq!(Access::classify(true, Some(&decl)), Access::Pointer);

        let decl = Declaration::variable("q").with_reference(true).with_pointer(true);
        let access = Access::classify(false, Some(&decl));
        assert_eq!(access, Access::Pointer);
        assert_eq!(access.render("q"), "q");
    }

    #[test]
    fn test_unresolved_renders_bare_name() {
        let access = Access::classify(true, None);
        assert_eq!(access, Access::Unresolved);
        assert_eq!(access.render("ghost"), "ghost");
    }
}
