//! Scope arena and symbol table

use std::collections::HashMap;
use std::fmt;
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Index of a scope inside its [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Construct that introduced a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Program root
    Global,
    /// Function body; carries the declared return slots
    Function,
    /// If/else branch or other nested block
    Block,
}

/// Kind of declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Parameter,
    Function,
    Enumeration,
}

/// Declaration-site metadata of a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// Explicit pointer: accessed directly, never through a cell
    pub is_pointer: bool,
    /// In-out/by-reference binding: accessed through a cell
    pub is_reference: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_pointer: false,
            is_reference: false,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Variable)
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Parameter)
    }

    pub fn with_pointer(mut self, is_pointer: bool) -> Self {
        self.is_pointer = is_pointer;
        self
    }

    pub fn with_reference(mut self, is_reference: bool) -> Self {
        self.is_reference = is_reference;
        self
    }
}

/// One declared return slot of a function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnSlot {
    pub name: Option<String>,
    pub ty: Option<String>,
}

impl ReturnSlot {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty: None,
        }
    }
}

/// A lexical environment
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: HashMap<DefaultSymbol, Declaration>,
    returns: Vec<ReturnSlot>,
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn returns(&self) -> &[ReturnSlot] {
        &self.returns
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Owner of every scope of one compilation unit
///
/// Children refer to parents by index only, so the tree can never form an
/// ownership cycle and lives exactly as long as the arena.
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    names: DefaultStringInterner,
}

impl ScopeArena {
    /// Arena holding a single global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                parent: None,
                symbols: HashMap::new(),
                returns: Vec::new(),
            }],
            names: DefaultStringInterner::default(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Create a child scope of `parent`
    pub fn new_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.push(Scope {
            kind,
            parent: Some(parent),
            symbols: HashMap::new(),
            returns: Vec::new(),
        })
    }

    /// Create a function scope with its declared return slots
    pub fn new_function_scope(&mut self, parent: ScopeId, returns: Vec<ReturnSlot>) -> ScopeId {
        self.push(Scope {
            kind: ScopeKind::Function,
            parent: Some(parent),
            symbols: HashMap::new(),
            returns,
        })
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.get(id).kind
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).parent
    }

    pub fn returns(&self, id: ScopeId) -> &[ReturnSlot] {
        &self.get(id).returns
    }

    /// Define a symbol, failing if the name is already bound in this scope
    pub fn define(&mut self, scope: ScopeId, decl: Declaration) -> Result<(), String> {
        let name = self.names.get_or_intern(&decl.name);
        let symbols = &mut self.scopes[scope.index()].symbols;
        if symbols.contains_key(&name) {
            return Err(format!("symbol '{}' already defined in this scope", decl.name));
        }
        symbols.insert(name, decl);
        Ok(())
    }

    /// Bind a symbol unless the name is already bound in this scope
    ///
    /// Returns whether the declaration was inserted.
    pub fn bind(&mut self, scope: ScopeId, decl: Declaration) -> bool {
        self.define(scope, decl).is_ok()
    }

    /// Resolve a name, walking outward through parent scopes
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Declaration> {
        let symbol = self.names.get(name)?;
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(decl) = scope.symbols.get(&symbol) {
                return Some(decl);
            }
            current = scope.parent;
        }
        None
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Declaration> {
        let symbol = self.names.get(name)?;
        self.get(scope).symbols.get(&symbol)
    }

    /// Nearest scope of `kind`, starting at `scope` itself
    pub fn nearest(&self, scope: ScopeId, kind: ScopeKind) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.kind(id) == kind {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Number of parent links between `scope` and the root
    pub fn depth(&self, scope: ScopeId) -> usize {
        std::iter::successors(self.parent(scope), |id| self.parent(*id)).count()
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
