//! Hand-written scanner driven by a [`TokenTable`]

use super::table::TokenTable;
use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};

/// How the string reader finds the closing delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMatching {
    /// Search for the next `'` first and fall back to `"`, whatever opened
    /// the literal. Existing sources are tokenized this way.
    #[default]
    PreferSingle,
    /// Search only for the quote character that opened the literal
    Opening,
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_alpha_digit(c: char) -> bool {
    is_alpha(c) || is_digit(c) || c == '_'
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Scanner for one token table
///
/// Holds no per-buffer state: every call to [`Scanner::scan`] starts a fresh
/// cursor at the beginning of its input.
pub struct Scanner<'t> {
    table: &'t TokenTable,
    quotes: QuoteMatching,
}

impl<'t> Scanner<'t> {
    pub fn new(table: &'t TokenTable) -> Self {
        Self {
            table,
            quotes: QuoteMatching::default(),
        }
    }

    pub fn with_quote_matching(mut self, quotes: QuoteMatching) -> Self {
        self.quotes = quotes;
        self
    }

    /// Scan the whole buffer
    ///
    /// Ignored kinds are dropped and unrecognized characters are skipped
    /// without a token. An unterminated string aborts the scan.
    pub fn scan<'s>(&self, source: &'s str) -> CompileResult<Vec<Token<'s>>> {
        let mut cursor = Cursor {
            table: self.table,
            quotes: self.quotes,
            source,
            index: 0,
        };
        let mut tokens = Vec::new();

        while let Some(c) = cursor.current() {
            let token = if self.table.contains(cursor.char_slice(c)) {
                cursor.read_sign()
            } else if is_digit(c) {
                cursor.read_number(cursor.index)
            } else if is_alpha(c) {
                cursor.read_identifier()
            } else if is_quote(c) {
                cursor.read_string(c)?
            } else {
                cursor.index += c.len_utf8();
                continue;
            };

            if !self.table.is_ignored(token.kind) {
                tokens.push(token);
            }
        }

        log::debug!("scanned {} tokens from {} bytes", tokens.len(), source.len());
        Ok(tokens)
    }
}

/// Read position over one buffer
struct Cursor<'t, 's> {
    table: &'t TokenTable,
    quotes: QuoteMatching,
    source: &'s str,
    index: usize,
}

impl<'s> Cursor<'_, 's> {
    fn current(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn char_slice(&self, c: char) -> &'s str {
        &self.source[self.index..self.index + c.len_utf8()]
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'s> {
        Token::new(kind, &self.source[start..self.index], Span::new(start, self.index))
    }

    /// Digits and dots from the current position; `start` may point at a
    /// leading `-` already consumed by the sign reader.
    fn read_number(&mut self, start: usize) -> Token<'s> {
        let bytes = self.source.as_bytes();
        let mut end = self.index + 1;
        while end < bytes.len() && (bytes[end] == b'.' || bytes[end].is_ascii_digit()) {
            end += 1;
        }
        self.index = end;
        self.token(TokenKind::NUMBER, start)
    }

    fn read_identifier(&mut self) -> Token<'s> {
        let start = self.index;
        let end = self.source[start..]
            .char_indices()
            .skip(1)
            .find(|(_, c)| !is_alpha_digit(*c))
            .map_or(self.source.len(), |(offset, _)| start + offset);
        self.index = end;

        let kind = self
            .table
            .kind_of(&self.source[start..end])
            .unwrap_or(TokenKind::IDENTIFIER);
        self.token(kind, start)
    }

    fn read_string(&mut self, opening: char) -> CompileResult<Token<'s>> {
        let start = self.index;
        let rest = &self.source[start + 1..];
        let close = match self.quotes {
            QuoteMatching::PreferSingle => rest.find('\'').or_else(|| rest.find('"')),
            QuoteMatching::Opening => rest.find(opening),
        };

        let Some(offset) = close else {
            return Err(CompileError::lexer(
                "unterminated string literal",
                Span::new(start, self.source.len()),
            ));
        };

        // Both quote characters are one byte wide
        self.index = start + 1 + offset + 1;
        Ok(self.token(TokenKind::STRING, start))
    }

    /// Longest operator that is a key of the table, or a negative number
    /// when a lone `-` is directly followed by a digit.
    fn read_sign(&mut self) -> Token<'s> {
        let start = self.index;
        let mut kind = None;

        while let Some(c) = self.current() {
            let candidate = &self.source[start..self.index];
            if is_digit(c) && candidate == "-" {
                return self.read_number(start);
            }

            let extended = &self.source[start..self.index + c.len_utf8()];
            match self.table.kind_of(extended) {
                Some(k) => {
                    kind = Some(k);
                    self.index += c.len_utf8();
                }
                None => break,
            }
        }

        // The dispatcher only calls in when the first character is a key
        let kind = kind.unwrap_or(TokenKind::IDENTIFIER);
        self.token(kind, start)
    }
}
