//! Compilation driver and pipeline orchestration

use crate::ast::Program;
use crate::common::CompileResult;
use crate::lexer::{QuoteMatching, Scanner, Token, TokenTable};
use crate::sema::{Analysis, AnalyzerConfig, SemanticAnalyzer};

/// Seam to the parser that turns tokens into a scoped [`Program`]
pub trait ProgramBuilder {
    fn build(&self, tokens: &[Token<'_>]) -> CompileResult<Program>;
}

/// A program after analysis, with every identifier annotated
#[derive(Debug)]
pub struct Compiled {
    pub program: Program,
    pub analysis: Analysis,
}

/// Scanner and analyzer sharing one token table
pub struct Pipeline {
    table: TokenTable,
    quotes: QuoteMatching,
    analyzer: AnalyzerConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_table(TokenTable::standard())
    }

    pub fn with_table(table: TokenTable) -> Self {
        Self {
            table,
            quotes: QuoteMatching::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }

    pub fn with_quote_matching(mut self, quotes: QuoteMatching) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_analyzer_config(mut self, config: AnalyzerConfig) -> Self {
        self.analyzer = config;
        self
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    pub fn scan<'s>(&self, source: &'s str) -> CompileResult<Vec<Token<'s>>> {
        Scanner::new(&self.table)
            .with_quote_matching(self.quotes)
            .scan(source)
    }

    pub fn analyze(&self, program: &mut Program) -> CompileResult<Analysis> {
        SemanticAnalyzer::with_config(&self.table, self.analyzer).analyze(program)
    }

    /// Scan, build and analyze one source buffer
    pub fn compile(&self, source: &str, builder: &dyn ProgramBuilder) -> CompileResult<Compiled> {
        let tokens = self.scan(source)?;
        log::debug!("scanned {} tokens", tokens.len());

        let mut program = builder.build(&tokens)?;
        let analysis = self.analyze(&mut program)?;
        Ok(Compiled { program, analysis })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
