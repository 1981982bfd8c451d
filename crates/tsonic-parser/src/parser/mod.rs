//! Recursive-descent parser.
//!
//! One `Parser` per source file. The parser owns the scanner, tracks the
//! current token, and accumulates diagnostics; it never panics on bad input.

mod expressions;
mod statements;
mod types;

#[cfg(test)]
mod tests;

use crate::ast::{NodeId, SourceFile};
use tsonic_common::diagnostics::codes;
use tsonic_common::{Diagnostic, LineMap, Span};
use tsonic_scanner::{Scanner, Token, TokenKind};

const MAX_PARSE_ERRORS: usize = 50;

/// Result of parsing one file.
#[derive(Debug)]
pub struct ParseResult {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse one source file.
pub fn parse_source_file(path: &str, source: &str) -> ParseResult {
    let mut parser = Parser::new(path, source);
    let statements = parser.parse_statements_until(TokenKind::Eof);
    ParseResult {
        file: SourceFile {
            path: path.to_string(),
            source: source.to_string(),
            statements,
        },
        diagnostics: parser.diagnostics,
    }
}

pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) file: String,
    pub(crate) scanner: Scanner<'a>,
    pub(crate) token: Token,
    pub(crate) line_map: LineMap,
    pub(crate) diagnostics: Vec<Diagnostic>,
    next_node_id: NodeId,
}

/// A saved parser position for bounded backtracking.
pub(crate) struct Checkpoint {
    scanner_pos: u32,
    token: Token,
    diag_len: usize,
    next_node_id: NodeId,
}

impl<'a> Parser<'a> {
    pub fn new(path: &str, source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let token = scanner.scan();
        Self {
            source,
            file: path.to_string(),
            scanner,
            token,
            line_map: LineMap::build(source),
            diagnostics: Vec::new(),
            next_node_id: 0,
        }
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    pub(crate) fn bump(&mut self) -> Token {
        let current = self.token;
        self.token = self.scanner.scan();
        current
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `TSN1005`. Never consumes on mismatch.
    pub(crate) fn expect(&mut self, kind: TokenKind, display: &str) -> Span {
        if self.at(kind) {
            self.bump().span
        } else {
            self.error_at(self.token.span, codes::EXPECTED_TOKEN, &[display]);
            self.token.span
        }
    }

    pub(crate) fn token_text(&self) -> &'a str {
        self.token.text(self.source)
    }

    /// Accept an identifier or contextual keyword as a name.
    pub(crate) fn at_name(&self) -> bool {
        self.token.kind == TokenKind::Identifier || self.token.kind.is_contextual_keyword()
    }

    pub(crate) fn fresh_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    /// Optional statement-terminating semicolon.
    pub(crate) fn eat_semicolon(&mut self) {
        self.eat(TokenKind::Semicolon);
    }

    // =========================================================================
    // Backtracking
    // =========================================================================

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            scanner_pos: self.scanner.pos(),
            token: self.token,
            diag_len: self.diagnostics.len(),
            next_node_id: self.next_node_id,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.scanner.reset_to(checkpoint.scanner_pos);
        self.token = checkpoint.token;
        self.diagnostics.truncate(checkpoint.diag_len);
        self.next_node_id = checkpoint.next_node_id;
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error_at(&mut self, span: Span, code: &str, args: &[&str]) {
        if self.diagnostics.len() >= MAX_PARSE_ERRORS {
            return;
        }
        let location = self.line_map.locate(&self.file, span);
        self.diagnostics
            .push(Diagnostic::from_template(code, args).with_location(location));
    }

    pub(crate) fn error_unexpected(&mut self) {
        let text = self.token_text().to_string();
        let display = if text.is_empty() { "<eof>" } else { &text };
        self.error_at(self.token.span, codes::UNEXPECTED_TOKEN, &[display]);
    }
}
