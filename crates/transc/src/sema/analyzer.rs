//! Semantic analyzer - scope tracking and reference resolution

use super::access::{Access, Resolution};
use super::fold::{Folded, ModuloMode, fold_binary};
use super::scope::{DeclKind, Declaration, ScopeArena, ScopeId, ScopeKind};
use crate::ast::*;
use crate::common::{CompileError, CompileResult, Span};
use crate::lexer::{TokenKind, TokenTable};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Operators the analyzer can map back from a kind code
const OPERAND_SYMBOLS: [&str; 10] = ["*", "/", "+", "-", ">", "<", "=", "%", "==", "."];

/// How lenient the analyzer is with incomplete programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Unresolved names render by bare name, return arity and enum members
    /// are not checked
    #[default]
    Permissive,
    /// Those cases are semantic errors
    Strict,
}

/// Analyzer options
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerConfig {
    pub policy: Policy,
    pub modulo: ModuloMode,
}

impl AnalyzerConfig {
    pub fn strict() -> Self {
        Self {
            policy: Policy::Strict,
            ..Self::default()
        }
    }

    fn is_strict(&self) -> bool {
        self.policy == Policy::Strict
    }
}

/// Soft diagnostic; reported and collected, never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    UnknownOperator { kind: TokenKind, span: Span },
    ImportLiteral { value: String, span: Span },
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::UnknownOperator { kind, .. } => write!(f, "unknown operand {kind}"),
            Note::ImportLiteral { value, .. } => write!(f, "import of literal {value}"),
        }
    }
}

/// Everything one analysis pass decided
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Identifier decisions in traversal order
    pub resolutions: Vec<Resolution>,
    pub notes: Vec<Note>,
    pub pushes: usize,
    pub pops: usize,
    /// Scope the traversal ended in
    pub final_scope: ScopeId,
    bindings: Bindings,
}

impl Analysis {
    pub fn resolutions_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Resolution> {
        self.resolutions.iter().filter(move |r| r.name == name)
    }

    /// Declaration this pass made for `name` directly in `scope`
    pub fn declaration(&self, scope: ScopeId, name: &str) -> Option<&Declaration> {
        self.bindings.get(&scope)?.get(name)
    }
}

/// Declarations made by one pass, per scope
type Bindings = HashMap<ScopeId, HashMap<String, Declaration>>;

/// Mutable state of one traversal, threaded through every call
///
/// The program's scopes are only read. Declarations found while walking go
/// to `bindings`, layered over them and dropped with the pass.
struct Traversal<'p> {
    scopes: &'p ScopeArena,
    bindings: Bindings,
    scope: ScopeId,
    saved: Vec<ScopeId>,
    pushes: usize,
    pops: usize,
    resolutions: Vec<Resolution>,
    notes: Vec<Note>,
}

impl<'p> Traversal<'p> {
    fn new(scopes: &'p ScopeArena, root: ScopeId) -> Self {
        Self {
            scopes,
            bindings: Bindings::new(),
            scope: root,
            saved: Vec::new(),
            pushes: 0,
            pops: 0,
            resolutions: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn push_scope(&mut self, scope: ScopeId) {
        log::trace!("enter {scope} from {}", self.scope);
        self.saved.push(self.scope);
        self.scope = scope;
        self.pushes += 1;
    }

    fn pop_scope(&mut self) {
        if let Some(previous) = self.saved.pop() {
            log::trace!("leave {} to {previous}", self.scope);
            self.scope = previous;
            self.pops += 1;
        }
    }

    /// Resolve a name from the current scope outward; at each level the
    /// parser's declaration wins over one made during this pass
    fn lookup(&self, name: &str) -> Option<&Declaration> {
        let mut current = Some(self.scope);
        while let Some(id) = current {
            let decl = self
                .scopes
                .lookup_local(id, name)
                .or_else(|| self.bindings.get(&id)?.get(name));
            if decl.is_some() {
                return decl;
            }
            current = self.scopes.parent(id);
        }
        None
    }

    /// Bind in the current scope unless the parser already declared the name
    /// there; a later declaration in the same scope replaces an earlier one
    fn bind(&mut self, decl: Declaration) {
        let scope = self.scope;
        if self.scopes.lookup_local(scope, &decl.name).is_some() {
            log::trace!("'{}' already declared in {scope}, keeping it", decl.name);
            return;
        }

        log::trace!("bind '{}' ({:?}) in {scope}", decl.name, decl.kind);
        let names = self.bindings.entry(scope).or_default();
        if let Some(previous) = names.insert(decl.name.clone(), decl) {
            log::trace!("'{}' redeclared in {scope}", previous.name);
        }
    }

    fn finish(self) -> Analysis {
        Analysis {
            resolutions: self.resolutions,
            notes: self.notes,
            pushes: self.pushes,
            pops: self.pops,
            final_scope: self.scope,
            bindings: self.bindings,
        }
    }
}

/// Semantic analyzer
///
/// Holds only configuration, so one analyzer can run any number of
/// independent passes.
pub struct SemanticAnalyzer<'t> {
    table: &'t TokenTable,
    config: AnalyzerConfig,
}

impl<'t> SemanticAnalyzer<'t> {
    pub fn new(table: &'t TokenTable) -> Self {
        Self::with_config(table, AnalyzerConfig::default())
    }

    pub fn with_config(table: &'t TokenTable, config: AnalyzerConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a program, annotating every identifier with its access mode
    pub fn analyze(&self, program: &mut Program) -> CompileResult<Analysis> {
        let root = program.context();
        let Program { body, scopes } = program;
        let mut cx = Traversal::new(scopes, root);

        self.analyze_block(&mut body.body, &mut cx)?;

        debug_assert!(cx.saved.is_empty(), "unbalanced scope stack");
        let analysis = cx.finish();
        log::debug!(
            "analyzed {} references, {} notes, {} scopes entered",
            analysis.resolutions.len(),
            analysis.notes.len(),
            analysis.pushes
        );
        Ok(analysis)
    }

    /// Target spelling of a name-like expression as seen from `scope`
    ///
    /// Literals and parameters render as their own text; other expression
    /// kinds have no single spelling.
    pub fn render(&self, scopes: &ScopeArena, scope: ScopeId, expr: &Expr) -> CompileResult<Option<String>> {
        match &expr.kind {
            ExprKind::Identifier(ident) => {
                let access = self.classify(scopes.lookup(scope, &ident.name), ident, expr.span)?;
                Ok(Some(access.render(&ident.name).into_owned()))
            }
            ExprKind::Literal(literal) => Ok(Some(literal.value.clone())),
            ExprKind::Parameter(param) => Ok(Some(param.name.clone())),
            _ => Ok(None),
        }
    }

    /// Canonical text of an operator kind
    pub fn operator_symbol(&self, kind: TokenKind) -> Option<&'static str> {
        OPERAND_SYMBOLS
            .iter()
            .copied()
            .find(|symbol| self.table.kind_of(symbol) == Some(kind))
    }

    /// Fold `left operator right` under the configured `%` semantics
    pub fn fold(&self, left: f64, right: f64, operator: &str) -> Option<Folded> {
        fold_binary(left, right, operator, self.config.modulo)
    }

    /// Fold a binary expression whose operands are both numeric literals
    pub fn fold_expr(&self, expr: &Expr) -> Option<Folded> {
        let ExprKind::Binary { left, operator, right } = &expr.kind else {
            return None;
        };
        let (ExprKind::Literal(left), ExprKind::Literal(right)) = (&left.kind, &right.kind) else {
            return None;
        };
        let symbol = self.operator_symbol(*operator)?;
        self.fold(left.as_number()?, right.as_number()?, symbol)
    }

    fn classify(&self, decl: Option<&Declaration>, ident: &Identifier, span: Span) -> CompileResult<Access> {
        let access = Access::classify(ident.is_pointer, decl);
        if access == Access::Unresolved && self.config.is_strict() {
            return Err(CompileError::semantic(
                format!("undefined identifier '{}'", ident.name),
                span,
            ));
        }
        Ok(access)
    }

    fn analyze_block(&self, stmts: &mut [Stmt], cx: &mut Traversal<'_>) -> CompileResult<()> {
        for stmt in stmts {
            self.analyze_stmt(stmt, cx)?;
        }
        Ok(())
    }

    /// Analyze a block inside its own scope; the scope is left on every path
    fn analyze_scoped_block(&self, block: &mut Block, cx: &mut Traversal<'_>) -> CompileResult<()> {
        cx.push_scope(block.context);
        let result = self.analyze_block(&mut block.body, cx);
        cx.pop_scope();
        result
    }

    fn analyze_stmt(&self, stmt: &mut Stmt, cx: &mut Traversal<'_>) -> CompileResult<()> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Import(import) => {
                self.analyze_import(import, cx);
                Ok(())
            }
            StmtKind::Variable(decl) => self.analyze_variable_declaration(decl, cx),
            StmtKind::MultipleVariables(decls) => {
                for decl in decls {
                    self.analyze_variable_declaration(decl, cx)?;
                }
                Ok(())
            }
            StmtKind::If(if_stmt) => self.analyze_if(if_stmt, cx),
            StmtKind::Function(func) => self.analyze_function(func, cx),
            StmtKind::Return(ret) => self.analyze_return(ret, span, cx),
            StmtKind::Enumeration(enumeration) => self.analyze_enumeration(enumeration, cx),
            StmtKind::Expr(expr) => self.analyze_expr(expr, cx),
        }
    }

    fn analyze_expr(&self, expr: &mut Expr, cx: &mut Traversal<'_>) -> CompileResult<()> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Identifier(ident) => self.resolve_identifier(ident, span, false, cx),
            ExprKind::Literal(_) | ExprKind::Parameter(_) => Ok(()),
            ExprKind::Binary { left, operator, right } => {
                self.analyze_expr(left, cx)?;
                self.analyze_operand(*operator, span, cx);
                self.analyze_expr(right, cx)
            }
            ExprKind::Call { callee, arguments } => {
                self.analyze_expr(callee, cx)?;
                // No arity check against the callee
                for argument in arguments {
                    self.analyze_expr(argument, cx)?;
                }
                Ok(())
            }
            ExprKind::Member { object, property } => self.analyze_member(object, property, cx),
            ExprKind::Array(elements) => self.analyze_tuple(elements, cx),
        }
    }

    fn resolve_identifier(
        &self,
        ident: &mut Identifier,
        span: Span,
        member: bool,
        cx: &mut Traversal<'_>,
    ) -> CompileResult<()> {
        let access = self.classify(cx.lookup(&ident.name), ident, span)?;
        let rendered = access.render(&ident.name).into_owned();
        log::trace!("'{}' -> '{rendered}' ({access:?}) in {}", ident.name, cx.scope);

        ident.access = Some(access);
        cx.resolutions.push(Resolution {
            name: ident.name.clone(),
            access,
            rendered,
            member,
            span,
        });
        Ok(())
    }

    fn analyze_member(&self, object: &mut Expr, property: &mut Expr, cx: &mut Traversal<'_>) -> CompileResult<()> {
        self.analyze_expr(object, cx)?;
        let span = property.span;
        if let ExprKind::Identifier(ident) = &mut property.kind {
            return self.resolve_identifier(ident, span, true, cx);
        }
        self.analyze_expr(property, cx)
    }

    fn analyze_operand(&self, kind: TokenKind, span: Span, cx: &mut Traversal<'_>) {
        if self.operator_symbol(kind).is_none() {
            log::error!("unknown operand: {kind}");
            cx.notes.push(Note::UnknownOperator { kind, span });
        }
    }

    fn analyze_tuple(&self, elements: &mut [Expr], cx: &mut Traversal<'_>) -> CompileResult<()> {
        for element in elements {
            self.analyze_expr(element, cx)?;
        }
        Ok(())
    }

    fn analyze_variable_declaration(&self, decl: &mut VariableDeclaration, cx: &mut Traversal<'_>) -> CompileResult<()> {
        if let Some(init) = &mut decl.init {
            if decl.is_reference {
                self.analyze_expr(init, cx)?;
            } else if let ExprKind::Array(elements) = &mut init.kind {
                self.analyze_tuple(elements, cx)?;
            } else {
                self.analyze_expr(init, cx)?;
            }
        }

        // Bound after the initializer, which still sees any outer binding
        cx.bind(
            Declaration::variable(decl.name.as_str())
                .with_reference(decl.is_reference)
                .with_pointer(decl.is_pointer),
        );
        Ok(())
    }

    fn analyze_if(&self, if_stmt: &mut IfStatement, cx: &mut Traversal<'_>) -> CompileResult<()> {
        self.analyze_expr(&mut if_stmt.test, cx)?;

        if let Some(consequent) = &mut if_stmt.consequent {
            self.analyze_scoped_block(consequent, cx)?;
        }

        match &mut if_stmt.alternate {
            Some(Alternate::ElseIf(nested)) => self.analyze_if(nested, cx),
            Some(Alternate::Else(block)) => self.analyze_scoped_block(block, cx),
            None => Ok(()),
        }
    }

    fn analyze_function(&self, func: &mut FunctionDeclaration, cx: &mut Traversal<'_>) -> CompileResult<()> {
        if func.exported {
            log::debug!("exported function '{}'", func.name);
        }
        cx.bind(Declaration::new(func.name.as_str(), DeclKind::Function));

        cx.push_scope(func.body.context);
        self.analyze_parameters(&func.params, cx);
        let result = self.analyze_block(&mut func.body.body, cx);
        cx.pop_scope();
        result
    }

    fn analyze_parameters(&self, params: &[Parameter], cx: &mut Traversal<'_>) {
        for param in params {
            cx.bind(
                Declaration::parameter(param.name.as_str())
                    .with_reference(param.is_reference)
                    .with_pointer(param.is_pointer),
            );
        }
    }

    fn analyze_return(&self, ret: &mut ReturnStatement, span: Span, cx: &mut Traversal<'_>) -> CompileResult<()> {
        let Some(argument) = &mut ret.argument else {
            return Ok(());
        };

        let arity = match cx.scopes.nearest(cx.scope, ScopeKind::Function) {
            Some(function) => cx.scopes.returns(function).len(),
            None if self.config.is_strict() => {
                return Err(CompileError::semantic("return outside of a function", span));
            }
            None => 0,
        };

        if self.config.is_strict() && argument.len() != arity.max(1) {
            return Err(CompileError::semantic(
                format!("expected {} return value(s), found {}", arity.max(1), argument.len()),
                span,
            ));
        }

        if arity == 0 {
            // Single implicit return: the argument is one expression
            for value in argument.values_mut() {
                self.analyze_expr(value, cx)?;
            }
            return Ok(());
        }

        // Values past the declared slots are not visited
        for (slot, value) in argument.values_mut().iter_mut().take(arity).enumerate() {
            log::trace!("return slot {slot}");
            self.analyze_expr(value, cx)?;
        }
        Ok(())
    }

    fn analyze_enumeration(&self, enumeration: &mut Enumeration, cx: &mut Traversal<'_>) -> CompileResult<()> {
        if enumeration.exported {
            log::debug!("exported enum '{}'", enumeration.name);
        }
        cx.bind(Declaration::new(enumeration.name.as_str(), DeclKind::Enumeration));
        self.analyze_enumeration_body(enumeration)
    }

    /// Member values are not resolved; strict mode rejects duplicate names
    fn analyze_enumeration_body(&self, enumeration: &Enumeration) -> CompileResult<()> {
        log::trace!("enum '{}' with {} members", enumeration.name, enumeration.members.len());
        if !self.config.is_strict() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for member in &enumeration.members {
            if !seen.insert(member.name.as_str()) {
                return Err(CompileError::semantic(
                    format!("duplicate member '{}' in enum '{}'", member.name, enumeration.name),
                    member.span,
                ));
            }
        }
        Ok(())
    }

    fn analyze_import(&self, import: &ImportStatement, cx: &mut Traversal<'_>) {
        for specifier in &import.specifiers {
            if let ExprKind::Literal(literal) = &specifier.kind {
                log::info!("import literal {}", literal.value);
                cx.notes.push(Note::ImportLiteral {
                    value: literal.value.clone(),
                    span: specifier.span,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::ReturnSlot;
    use pretty_assertions::assert_eq;

    fn sp() -> Span {
        Span::default()
    }

    fn ident(name: &str) -> Expr {
        Expr::identifier(name, sp())
    }

    fn op(lexeme: &str) -> TokenKind {
        TokenTable::standard().kind_of(lexeme).unwrap()
    }

    fn func(name: &str, params: Vec<Parameter>, context: ScopeId, body: Vec<Stmt>) -> Stmt {
        Stmt::new(
            StmtKind::Function(FunctionDeclaration {
                name: name.to_string(),
                params,
                body: Block::new(body, context, sp()),
                exported: false,
            }),
            sp(),
        )
    }

    fn ret(value: ReturnValue) -> Stmt {
        Stmt::new(StmtKind::Return(ReturnStatement { argument: Some(value) }), sp())
    }

    fn let_stmt(decl: VariableDeclaration) -> Stmt {
        Stmt::new(StmtKind::Variable(decl), sp())
    }

    fn program(scopes: ScopeArena, body: Vec<Stmt>) -> Program {
        let root = scopes.root();
        Program::new(Block::new(body, root, sp()), scopes)
    }

    fn rendered(analysis: &Analysis) -> Vec<&str> {
        analysis.resolutions.iter().map(|r| r.rendered.as_str()).collect()
    }

    #[test]
    fn test_reference_parameter_reads_through_cell() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), Vec::new());
        let branch = scopes.new_scope(body, ScopeKind::Block);

        let if_stmt = IfStatement {
            test: Expr::binary(ident("n"), op(">"), Expr::number("0", sp())),
            consequent: Some(Block::new(
                vec![Stmt::expr(Expr::binary(ident("n"), op("="), ident("m")))],
                branch,
                sp(),
            )),
            alternate: None,
        };
        let mut program = program(
            scopes,
            vec![func(
                "bump",
                vec![Parameter::reference("n", sp()), Parameter::new("m", sp())],
                body,
                vec![Stmt::new(StmtKind::If(if_stmt), sp())],
            )],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();

        assert_eq!(rendered(&analysis), vec!["n.value", "n.value", "m"]);
        assert!(analysis.resolutions_of("n").all(|r| r.access == Access::Cell));
        assert_eq!(analysis.resolutions_of("m").next().unwrap().access, Access::Value);
    }

    #[test]
    fn test_pointer_use_keeps_bare_name() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), Vec::new());
        let mut program = program(
            scopes,
            vec![func(
                "swap",
                vec![Parameter::reference("p", sp())],
                body,
                vec![
                    Stmt::expr(Expr::pointer("p", sp())),
                    Stmt::expr(ident("p")),
                ],
            )],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();

        assert_eq!(rendered(&analysis), vec!["p", "p.value"]);
        assert_eq!(analysis.resolutions[0].access, Access::Pointer);
    }

    #[test]
    fn test_pointer_declaration_wins_over_reference() {
        let table = TokenTable::standard();
        let mut program = program(
            ScopeArena::new(),
            vec![
                let_stmt(
                    VariableDeclaration::new("buf", None, sp())
                        .with_reference(true)
                        .with_pointer(true),
                ),
                Stmt::expr(ident("buf")),
            ],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(analysis.resolutions[0].access, Access::Pointer);
        assert_eq!(rendered(&analysis), vec!["buf"]);
    }

    #[test]
    fn test_reference_variable_and_annotation() {
        let table = TokenTable::standard();
        let mut program = program(
            ScopeArena::new(),
            vec![
                let_stmt(VariableDeclaration::new("a", Some(Expr::number("1", sp())), sp())),
                let_stmt(VariableDeclaration::new("r", Some(ident("a")), sp()).with_reference(true)),
                Stmt::expr(Expr::binary(ident("r"), op("+"), ident("a"))),
            ],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["a", "r.value", "a"]);

        let StmtKind::Expr(Expr { kind: ExprKind::Binary { left, .. }, .. }) = &program.body.body[2].kind else {
            panic!("expected binary expression statement");
        };
        let ExprKind::Identifier(r) = &left.kind else {
            panic!("expected identifier");
        };
        assert_eq!(r.access, Some(Access::Cell));
    }

    #[test]
    fn test_initializer_sees_outer_binding() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let inner = scopes.new_scope(root, ScopeKind::Block);
        scopes.define(root, Declaration::variable("x").with_reference(true)).unwrap();

        let if_stmt = IfStatement {
            test: Expr::string("'yes'", sp()),
            consequent: Some(Block::new(
                vec![
                    let_stmt(VariableDeclaration::new("x", Some(ident("x")), sp())),
                    Stmt::expr(ident("x")),
                ],
                inner,
                sp(),
            )),
            alternate: None,
        };
        let mut program = program(scopes, vec![Stmt::new(StmtKind::If(if_stmt), sp())]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["x.value", "x"]);
        assert!(!analysis.declaration(inner, "x").unwrap().is_reference);
        assert!(program.scopes.lookup_local(inner, "x").is_none());
        assert!(program.scopes.lookup(root, "x").unwrap().is_reference);
    }

    #[test]
    fn test_reanalyzing_a_program_is_stable() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let inner = scopes.new_scope(root, ScopeKind::Block);
        let body = scopes.new_function_scope(root, Vec::new());
        scopes.define(root, Declaration::variable("x").with_reference(true)).unwrap();

        let if_stmt = IfStatement {
            test: Expr::number("1", sp()),
            consequent: Some(Block::new(
                vec![let_stmt(VariableDeclaration::new("x", Some(ident("x")), sp()))],
                inner,
                sp(),
            )),
            alternate: None,
        };
        let mut program = program(
            scopes,
            vec![
                Stmt::new(StmtKind::If(if_stmt), sp()),
                func("f", vec![Parameter::reference("p", sp())], body, vec![Stmt::expr(ident("p"))]),
                Stmt::expr(ident("p")),
            ],
        );
        let before = program.scopes.clone();

        let analyzer = SemanticAnalyzer::new(&table);
        let first = analyzer.analyze(&mut program).unwrap();
        let second = analyzer.analyze(&mut program).unwrap();

        assert_eq!(rendered(&first), vec!["x.value", "p.value", "p"]);
        assert_eq!(first.resolutions, second.resolutions);
        for name in ["x", "p", "f"] {
            for id in [root, inner, body] {
                assert_eq!(program.scopes.lookup_local(id, name), before.lookup_local(id, name));
            }
        }
    }

    #[test]
    fn test_redeclaration_takes_latest_flags() {
        let table = TokenTable::standard();
        let mut program = program(
            ScopeArena::new(),
            vec![
                let_stmt(VariableDeclaration::new("a", None, sp())),
                let_stmt(VariableDeclaration::new("r", Some(ident("a")), sp())),
                Stmt::expr(ident("r")),
                let_stmt(VariableDeclaration::new("r", Some(ident("a")), sp()).with_reference(true)),
                Stmt::expr(ident("r")),
            ],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        let uses: Vec<Access> = analysis.resolutions_of("r").map(|r| r.access).collect();
        assert_eq!(uses, vec![Access::Value, Access::Cell]);
    }

    #[test]
    fn test_parser_declaration_is_kept() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.define(root, Declaration::variable("r").with_reference(true)).unwrap();
        let mut program = program(
            scopes,
            vec![
                let_stmt(VariableDeclaration::new("r", None, sp())),
                Stmt::expr(ident("r")),
            ],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["r.value"]);
        assert!(analysis.declaration(root, "r").is_none());
    }

    #[test]
    fn test_unresolved_identifier_policy() {
        let table = TokenTable::standard();
        let body = vec![Stmt::expr(Expr::call(ident("print"), vec![ident("ghost")], sp()))];

        let mut lenient = program(ScopeArena::new(), body.clone());
        let analysis = SemanticAnalyzer::new(&table).analyze(&mut lenient).unwrap();
        assert_eq!(rendered(&analysis), vec!["print", "ghost"]);
        assert!(analysis.resolutions.iter().all(|r| r.access == Access::Unresolved));

        let mut strict = program(ScopeArena::new(), body);
        let err = SemanticAnalyzer::with_config(&table, AnalyzerConfig::strict())
            .analyze(&mut strict)
            .unwrap_err();
        assert!(matches!(err, CompileError::Semantic { message, .. } if message == "undefined identifier 'print'"));
    }

    #[test]
    fn test_member_expression_marks_property() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.define(root, Declaration::variable("obj").with_reference(true)).unwrap();

        // obj.inner.field
        let chain = Expr::member(Expr::member(ident("obj"), ident("inner")), ident("field"));
        let mut program = program(scopes, vec![Stmt::expr(chain)]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        let members: Vec<(&str, bool)> = analysis
            .resolutions
            .iter()
            .map(|r| (r.rendered.as_str(), r.member))
            .collect();
        assert_eq!(members, vec![("obj.value", false), ("inner", true), ("field", true)]);
    }

    #[test]
    fn test_call_arguments_in_order() {
        let table = TokenTable::standard();
        let call = Expr::call(
            Expr::member(ident("io"), ident("write")),
            vec![ident("a"), Expr::number("2", sp()), Expr::call(ident("f"), vec![ident("b")], sp()), ident("c")],
            sp(),
        );
        let mut program = program(ScopeArena::new(), vec![Stmt::expr(call)]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["io", "write", "a", "f", "b", "c"]);
    }

    #[test]
    fn test_multiple_return_slots() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), vec![ReturnSlot::named("q"), ReturnSlot::named("r")]);
        let mut program = program(
            scopes,
            vec![func(
                "divmod",
                vec![Parameter::new("a", sp()), Parameter::reference("b", sp())],
                body,
                vec![ret(ReturnValue::Multiple(vec![ident("a"), ident("b")]))],
            )],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["a", "b.value"]);
    }

    #[test]
    fn test_extra_return_values_not_visited() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), vec![ReturnSlot::named("x"), ReturnSlot::named("y")]);
        let stmts = vec![func(
            "pair",
            Vec::new(),
            body,
            vec![ret(ReturnValue::Multiple(vec![ident("a"), ident("b"), ident("c")]))],
        )];

        let mut lenient = program(scopes.clone(), stmts.clone());
        let analysis = SemanticAnalyzer::new(&table).analyze(&mut lenient).unwrap();
        assert_eq!(rendered(&analysis), vec!["a", "b"]);

        let mut strict = program(scopes, stmts);
        let err = SemanticAnalyzer::with_config(&table, AnalyzerConfig { policy: Policy::Strict, ..Default::default() })
            .analyze(&mut strict)
            .unwrap_err();
        assert!(matches!(err, CompileError::Semantic { message, .. } if message == "expected 2 return value(s), found 3"));
    }

    #[test]
    fn test_single_return_is_one_expression() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), Vec::new());
        let mut program = program(
            scopes,
            vec![func(
                "sum",
                vec![Parameter::new("a", sp()), Parameter::new("b", sp())],
                body,
                vec![ret(ReturnValue::Single(Expr::binary(ident("a"), op("+"), ident("b"))))],
            )],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["a", "b"]);
    }

    #[test]
    fn test_return_outside_function() {
        let table = TokenTable::standard();
        let stmts = vec![ret(ReturnValue::Single(Expr::number("1", sp())))];

        let mut lenient = program(ScopeArena::new(), stmts.clone());
        assert!(SemanticAnalyzer::new(&table).analyze(&mut lenient).is_ok());

        let mut strict = program(ScopeArena::new(), stmts);
        assert!(SemanticAnalyzer::with_config(&table, AnalyzerConfig::strict()).analyze(&mut strict).is_err());
    }

    #[test]
    fn test_if_chain_scope_discipline() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        let first = scopes.new_scope(root, ScopeKind::Block);
        let second = scopes.new_scope(root, ScopeKind::Block);
        let last = scopes.new_scope(root, ScopeKind::Block);
        let nested = scopes.new_scope(first, ScopeKind::Block);

        let inner_if = IfStatement {
            test: ident("t"),
            consequent: Some(Block::new(vec![let_stmt(VariableDeclaration::new("deep", None, sp()))], nested, sp())),
            alternate: None,
        };
        let chain = IfStatement {
            test: ident("a"),
            consequent: Some(Block::new(
                vec![
                    let_stmt(VariableDeclaration::new("t", None, sp())),
                    Stmt::new(StmtKind::If(inner_if), sp()),
                ],
                first,
                sp(),
            )),
            alternate: Some(Alternate::ElseIf(Box::new(IfStatement {
                test: ident("b"),
                consequent: Some(Block::new(vec![Stmt::expr(ident("t"))], second, sp())),
                alternate: Some(Alternate::Else(Block::new(vec![Stmt::expr(ident("c"))], last, sp()))),
            }))),
        };
        let mut program = program(scopes, vec![Stmt::new(StmtKind::If(chain), sp())]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();

        assert_eq!(analysis.pushes, 4);
        assert_eq!(analysis.pops, analysis.pushes);
        assert_eq!(analysis.final_scope, program.context());
        // `t` from the first branch is invisible in the else-if branch
        let t_uses: Vec<Access> = analysis.resolutions_of("t").map(|r| r.access).collect();
        assert_eq!(t_uses, vec![Access::Value, Access::Unresolved]);
        assert!(program.scopes.lookup(root, "deep").is_none());
    }

    #[test]
    fn test_failed_branch_still_restores_scope() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let branch = scopes.new_scope(scopes.root(), ScopeKind::Block);
        let mut program = program(
            scopes,
            vec![Stmt::new(
                StmtKind::If(IfStatement {
                    test: Expr::number("1", sp()),
                    consequent: Some(Block::new(vec![Stmt::expr(ident("missing"))], branch, sp())),
                    alternate: None,
                }),
                sp(),
            )],
        );

        let analyzer = SemanticAnalyzer::with_config(&table, AnalyzerConfig::strict());
        assert!(analyzer.analyze(&mut program).is_err());
        // A fresh pass starts from the root again
        program.scopes.define(branch, Declaration::variable("missing")).unwrap();
        let analysis = analyzer.analyze(&mut program).unwrap();
        assert_eq!(analysis.final_scope, program.context());
    }

    #[test]
    fn test_unknown_operator_is_soft() {
        let table = TokenTable::standard();
        let weird = Expr::binary(ident("a"), op("&&"), ident("b"));
        let mut program = program(ScopeArena::new(), vec![Stmt::expr(weird)]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(analysis.notes, vec![Note::UnknownOperator { kind: op("&&"), span: sp() }]);
        assert_eq!(rendered(&analysis), vec!["a", "b"]);
    }

    #[test]
    fn test_import_literals_are_reported() {
        let table = TokenTable::standard();
        let import = ImportStatement {
            specifiers: vec![Expr::string("'./math'", sp()), ident("print")],
        };
        let mut program = program(ScopeArena::new(), vec![Stmt::new(StmtKind::Import(import), sp())]);

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(
            analysis.notes,
            vec![Note::ImportLiteral { value: "'./math'".to_string(), span: sp() }]
        );
        assert!(analysis.resolutions.is_empty());
    }

    #[test]
    fn test_enum_duplicates_only_rejected_when_strict() {
        let table = TokenTable::standard();
        let member = |name: &str| EnumMember { name: name.to_string(), value: None, span: sp() };
        let enumeration = Enumeration {
            name: "Color".to_string(),
            members: vec![member("Red"), member("Green"), member("Red")],
            exported: true,
        };
        let stmts = vec![Stmt::new(StmtKind::Enumeration(enumeration), sp())];

        let mut lenient = program(ScopeArena::new(), stmts.clone());
        let analysis = SemanticAnalyzer::new(&table).analyze(&mut lenient).unwrap();
        assert_eq!(
            analysis.declaration(lenient.context(), "Color").map(|d| d.kind),
            Some(DeclKind::Enumeration)
        );

        let mut strict = program(ScopeArena::new(), stmts);
        let err = SemanticAnalyzer::with_config(&table, AnalyzerConfig::strict())
            .analyze(&mut strict)
            .unwrap_err();
        assert!(matches!(err, CompileError::Semantic { message, .. } if message == "duplicate member 'Red' in enum 'Color'"));
    }

    #[test]
    fn test_array_elements_analyzed() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.define(root, Declaration::variable("cell").with_reference(true)).unwrap();
        let init = Expr::array(vec![ident("cell"), Expr::number("2", sp()), ident("other")], sp());

        let mut program = program(
            scopes,
            vec![Stmt::new(
                StmtKind::MultipleVariables(vec![
                    VariableDeclaration::new("list", Some(init), sp()),
                    VariableDeclaration::new("copy", Some(ident("list")), sp()),
                ]),
                sp(),
            )],
        );

        let analysis = SemanticAnalyzer::new(&table).analyze(&mut program).unwrap();
        assert_eq!(rendered(&analysis), vec!["cell.value", "other", "list"]);
        assert_eq!(analysis.resolutions[2].access, Access::Value);
    }

    #[test]
    fn test_functions_are_bound_for_later_calls() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), Vec::new());
        let mut program = program(
            scopes,
            vec![
                func("noop", Vec::new(), body, Vec::new()),
                Stmt::expr(Expr::call(ident("noop"), Vec::new(), sp())),
            ],
        );

        let analyzer = SemanticAnalyzer::with_config(&table, AnalyzerConfig::strict());
        let analysis = analyzer.analyze(&mut program).unwrap();
        assert_eq!(analysis.resolutions[0].access, Access::Value);
        assert_eq!(analysis.pushes, 1);
        assert_eq!(analysis.pops, 1);
    }

    #[test]
    fn test_render_query() {
        let table = TokenTable::standard();
        let mut scopes = ScopeArena::new();
        let root = scopes.root();
        scopes.define(root, Declaration::parameter("n").with_reference(true)).unwrap();
        let analyzer = SemanticAnalyzer::new(&table);

        let render = |expr: &Expr| analyzer.render(&scopes, root, expr).unwrap();
        assert_eq!(render(&ident("n")), Some("n.value".to_string()));
        assert_eq!(render(&Expr::pointer("n", sp())), Some("n".to_string()));
        assert_eq!(render(&Expr::number("7", sp())), Some("7".to_string()));
        assert_eq!(
            render(&Expr::new(ExprKind::Parameter(Parameter::new("p", sp())), sp())),
            Some("p".to_string())
        );
        assert_eq!(render(&Expr::array(Vec::new(), sp())), None);
    }

    #[test]
    fn test_operator_symbols_round_trip() {
        let table = TokenTable::standard();
        let analyzer = SemanticAnalyzer::new(&table);
        for symbol in OPERAND_SYMBOLS {
            assert_eq!(analyzer.operator_symbol(op(symbol)), Some(symbol));
        }
        assert_eq!(analyzer.operator_symbol(op("!=")), None);
        assert_eq!(analyzer.operator_symbol(TokenKind::IDENTIFIER), None);
    }

    #[test]
    fn test_fold_expr() {
        let table = TokenTable::standard();
        let number = |v: &str| Expr::number(v, sp());

        let legacy = SemanticAnalyzer::new(&table);
        assert_eq!(legacy.fold_expr(&Expr::binary(number("6"), op("*"), number("7"))), Some(Folded::Number(42.0)));
        assert_eq!(legacy.fold_expr(&Expr::binary(number("7"), op("%"), number("3"))), Some(Folded::Bool(false)));
        assert_eq!(legacy.fold_expr(&Expr::binary(number("7"), op("%"), ident("n"))), None);

        let fixed = SemanticAnalyzer::with_config(
            &table,
            AnalyzerConfig { modulo: ModuloMode::Remainder, ..Default::default() },
        );
        assert_eq!(fixed.fold_expr(&Expr::binary(number("7"), op("%"), number("3"))), Some(Folded::Number(1.0)));
    }

    #[test]
    fn test_analyzer_is_reusable() {
        let table = TokenTable::standard();
        let analyzer = SemanticAnalyzer::new(&table);
        let mut scopes = ScopeArena::new();
        let body = scopes.new_function_scope(scopes.root(), Vec::new());
        let stmts = vec![func("f", vec![Parameter::reference("x", sp())], body, vec![Stmt::expr(ident("x"))])];

        let mut first = program(scopes.clone(), stmts.clone());
        let mut second = program(scopes, stmts);
        let a = analyzer.analyze(&mut first).unwrap();
        let b = analyzer.analyze(&mut second).unwrap();
        assert_eq!(a.resolutions, b.resolutions);
        assert_eq!(a.final_scope, b.final_scope);
    }
}
