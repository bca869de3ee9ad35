//! Lexeme → token kind lookup shared by the scanner and the analyzer

use super::token::TokenKind;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Keywords of the standard vocabulary
const KEYWORDS: &[&str] = &[
    "let", "const", "if", "else", "func", "return", "enum", "import", "export",
    "inout", "true", "false", "null",
];

/// Operators and punctuation of the standard vocabulary
///
/// Every multi-character operator must have all its prefixes in the table,
/// since the scanner only extends a candidate while the extension is a key.
const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "==", "!", "!=", "<", ">", "<=", ">=",
    "&", "&&", "|", "||", ".", ",", ";", ":", "(", ")", "[", "]", "{", "}",
    "->", "=>",
];

/// Formatting characters, always filtered from the token stream
const BLANKS: &[&str] = &[" ", "\t", "\n", "\r"];

/// Lookup table from literal lexemes to token kinds, plus the ignore set
#[derive(Debug, Clone)]
pub struct TokenTable {
    kinds: HashMap<String, TokenKind>,
    ignored: HashSet<TokenKind>,
    /// `None` once every code up to `u16::MAX` is taken
    next_code: Option<u16>,
}

impl TokenTable {
    /// Empty table: only the reserved identifier/number/string kinds exist
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            ignored: HashSet::new(),
            next_code: Some(TokenKind::FIRST_FREE),
        }
    }

    /// Table with the default keyword, operator and whitespace vocabulary
    pub fn standard() -> Self {
        let mut table = Self::new();
        let vocabulary = KEYWORDS.iter().chain(OPERATORS).chain(BLANKS);
        for (code, lexeme) in (TokenKind::FIRST_FREE..).zip(vocabulary) {
            table.kinds.insert((*lexeme).to_string(), TokenKind(code));
            table.next_code = code.checked_add(1);
        }
        for lexeme in BLANKS {
            if let Some(kind) = table.kind_of(lexeme) {
                table.ignore(kind);
            }
        }
        table
    }

    /// Map a lexeme to a fresh kind, or return the kind it already has
    pub fn insert(&mut self, lexeme: &str) -> Result<TokenKind, String> {
        if let Some(kind) = self.kinds.get(lexeme) {
            return Ok(*kind);
        }
        let code = self
            .next_code
            .ok_or_else(|| format!("no token kind left for '{lexeme}'"))?;
        let kind = TokenKind(code);
        self.next_code = code.checked_add(1);
        self.kinds.insert(lexeme.to_string(), kind);
        Ok(kind)
    }

    /// Map a lexeme to an explicit kind code
    ///
    /// Codes below [`TokenKind::FIRST_FREE`] belong to identifiers, numbers
    /// and strings and are rejected.
    pub fn insert_with(&mut self, lexeme: &str, kind: TokenKind) -> Result<(), String> {
        if kind.is_reserved() {
            return Err(format!("token kind {} is reserved", kind.code()));
        }
        let after = kind.code().checked_add(1);
        self.next_code = match (self.next_code, after) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
        self.kinds.insert(lexeme.to_string(), kind);
        Ok(())
    }

    /// Filter tokens of this kind out of every scan
    pub fn ignore(&mut self, kind: TokenKind) {
        self.ignored.insert(kind);
    }

    pub fn kind_of(&self, lexeme: &str) -> Option<TokenKind> {
        self.kinds.get(lexeme).copied()
    }

    pub fn contains(&self, lexeme: &str) -> bool {
        self.kinds.contains_key(lexeme)
    }

    /// Reverse lookup; the first lexeme in code order wins on collisions
    pub fn lexeme_of(&self, kind: TokenKind) -> Option<&str> {
        self.kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(lexeme, _)| lexeme.as_str())
            .min()
    }

    pub fn is_ignored(&self, kind: TokenKind) -> bool {
        self.ignored.contains(&kind)
    }

    /// All entries ordered by kind code
    pub fn entries(&self) -> impl Iterator<Item = (&str, TokenKind)> {
        let ordered: BTreeMap<(TokenKind, &str), ()> = self
            .kinds
            .iter()
            .map(|(lexeme, kind)| ((*kind, lexeme.as_str()), ()))
            .collect();
        ordered.into_keys().map(|(kind, lexeme)| (lexeme, kind))
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::standard()
    }
}
