//! The scanner proper.

use crate::token::{Token, TokenKind};
use tsonic_common::Span;

/// Pull scanner over a single source file.
///
/// The scanner never fails: malformed input produces an `Unknown` token and
/// the parser turns it into a diagnostic.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset.
    pub fn pos(&self) -> u32 {
        self.pos as u32
    }

    /// Rewind to a previously observed offset. The parser uses this for
    /// bounded backtracking (arrow-function and call-type-argument lookahead).
    pub fn reset_to(&mut self, pos: u32) {
        self.pos = pos as usize;
    }

    /// Scan the next token, skipping whitespace and comments.
    pub fn scan(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Token::new(TokenKind::Eof, Span::at(start as u32));
        };

        let kind = match ch {
            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            '{' => self.single(TokenKind::OpenBrace),
            '}' => self.single(TokenKind::CloseBrace),
            '[' => self.single(TokenKind::OpenBracket),
            ']' => self.single(TokenKind::CloseBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '~' => self.single(TokenKind::Tilde),
            '@' => self.single(TokenKind::At),
            '.' => {
                if self.source[self.pos..].starts_with("...") {
                    self.pos += 3;
                    TokenKind::DotDotDot
                } else {
                    self.single(TokenKind::Dot)
                }
            }
            '?' => self.scan_question(),
            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '<' => self.scan_less(),
            '>' => self.scan_greater(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_asterisk(),
            '/' => self.pick2('=', TokenKind::SlashEquals, TokenKind::Slash),
            '%' => self.pick2('=', TokenKind::PercentEquals, TokenKind::Percent),
            '&' => self.scan_ampersand(),
            '|' => self.scan_bar(),
            '^' => self.pick2('=', TokenKind::CaretEquals, TokenKind::Caret),
            '\'' | '"' => return self.scan_string(start, ch),
            '`' => return self.scan_template_part(start, true),
            '0'..='9' => return self.scan_number(start),
            c if is_identifier_start(c) => return self.scan_identifier(start),
            _ => {
                self.advance_char();
                TokenKind::Unknown
            }
        };

        Token::new(kind, Span::new(start as u32, self.pos as u32))
    }

    /// Re-scan starting at a `}` token as a template continuation, producing
    /// a `TemplateMiddle` or `TemplateTail` token. The parser calls this when
    /// it finishes a `${...}` substitution.
    pub fn rescan_template_continuation(&mut self, close_brace: Token) -> Token {
        let start = close_brace.span.start as usize;
        self.pos = start + 1; // past '}'
        self.scan_template_part(start, false)
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    while self.pos < self.source.len() {
                        if self.source[self.pos..].starts_with("*/") {
                            self.pos += 2;
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    // =========================================================================
    // Compound operators
    // =========================================================================

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Consume one char, then `next` if it follows, picking between kinds.
    fn pick2(&mut self, next: char, matched: TokenKind, fallback: TokenKind) -> TokenKind {
        self.pos += 1;
        if self.peek_char() == Some(next) {
            self.pos += 1;
            matched
        } else {
            fallback
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('.') => {
                self.pos += 1;
                TokenKind::QuestionDot
            }
            Some('?') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::QuestionQuestionEquals
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('=') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::EqualsEqualsEquals
                } else {
                    TokenKind::EqualsEquals
                }
            }
            Some('>') => {
                self.pos += 1;
                TokenKind::Arrow
            }
            _ => TokenKind::Equals,
        }
    }

    fn scan_exclamation(&mut self) -> TokenKind {
        self.pos += 1;
        if self.peek_char() == Some('=') {
            self.pos += 1;
            if self.peek_char() == Some('=') {
                self.pos += 1;
                TokenKind::ExclamationEqualsEquals
            } else {
                TokenKind::ExclamationEquals
            }
        } else {
            TokenKind::Exclamation
        }
    }

    fn scan_less(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('=') => {
                self.pos += 1;
                TokenKind::LessEquals
            }
            Some('<') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::LessLessEquals
                } else {
                    TokenKind::LessLess
                }
            }
            _ => TokenKind::Less,
        }
    }

    fn scan_greater(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('=') => {
                self.pos += 1;
                TokenKind::GreaterEquals
            }
            Some('>') => {
                self.pos += 1;
                match self.peek_char() {
                    Some('>') => {
                        self.pos += 1;
                        if self.peek_char() == Some('=') {
                            self.pos += 1;
                            TokenKind::GreaterGreaterGreaterEquals
                        } else {
                            TokenKind::GreaterGreaterGreater
                        }
                    }
                    Some('=') => {
                        self.pos += 1;
                        TokenKind::GreaterGreaterEquals
                    }
                    _ => TokenKind::GreaterGreater,
                }
            }
            _ => TokenKind::Greater,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('+') => {
                self.pos += 1;
                TokenKind::PlusPlus
            }
            Some('=') => {
                self.pos += 1;
                TokenKind::PlusEquals
            }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('-') => {
                self.pos += 1;
                TokenKind::MinusMinus
            }
            Some('=') => {
                self.pos += 1;
                TokenKind::MinusEquals
            }
            _ => TokenKind::Minus,
        }
    }

    fn scan_asterisk(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('*') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::AsteriskAsteriskEquals
                } else {
                    TokenKind::AsteriskAsterisk
                }
            }
            Some('=') => {
                self.pos += 1;
                TokenKind::AsteriskEquals
            }
            _ => TokenKind::Asterisk,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('&') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::AmpersandAmpersandEquals
                } else {
                    TokenKind::AmpersandAmpersand
                }
            }
            Some('=') => {
                self.pos += 1;
                TokenKind::AmpersandEquals
            }
            _ => TokenKind::Ampersand,
        }
    }

    fn scan_bar(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek_char() {
            Some('|') => {
                self.pos += 1;
                if self.peek_char() == Some('=') {
                    self.pos += 1;
                    TokenKind::BarBarEquals
                } else {
                    TokenKind::BarBar
                }
            }
            Some('=') => {
                self.pos += 1;
                TokenKind::BarEquals
            }
            _ => TokenKind::Bar,
        }
    }

    // =========================================================================
    // Literals and identifiers
    // =========================================================================

    fn scan_string(&mut self, start: usize, quote: char) -> Token {
        self.pos += 1; // opening quote
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    // Unterminated; parser reports TSN1010
                    return Token::new(
                        TokenKind::Unknown,
                        Span::new(start as u32, self.pos as u32),
                    );
                }
                Some('\\') => {
                    self.advance_char();
                    if self.peek_char().is_some() {
                        self.advance_char();
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Token::new(
                        TokenKind::StringLiteral,
                        Span::new(start as u32, self.pos as u32),
                    );
                }
                Some(_) => {
                    self.advance_char();
                }
            }
        }
    }

    /// Scan a template part. `from_backtick` selects head-or-complete
    /// (entered at `` ` ``) vs middle-or-tail (entered past `}`).
    fn scan_template_part(&mut self, start: usize, from_backtick: bool) -> Token {
        if from_backtick {
            self.pos += 1; // opening backtick
        }
        loop {
            match self.peek_char() {
                None => {
                    return Token::new(
                        TokenKind::Unknown,
                        Span::new(start as u32, self.pos as u32),
                    );
                }
                Some('`') => {
                    self.pos += 1;
                    let kind = if from_backtick {
                        TokenKind::NoSubstitutionTemplate
                    } else {
                        TokenKind::TemplateTail
                    };
                    return Token::new(kind, Span::new(start as u32, self.pos as u32));
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    self.pos += 2;
                    let kind = if from_backtick {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    };
                    return Token::new(kind, Span::new(start as u32, self.pos as u32));
                }
                Some('\\') => {
                    self.advance_char();
                    if self.peek_char().is_some() {
                        self.advance_char();
                    }
                }
                Some(_) => {
                    self.advance_char();
                }
            }
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let rest = &self.source[self.pos..];
        if rest.len() > 2 {
            let prefix = &rest[0..2];
            if prefix.eq_ignore_ascii_case("0x") {
                self.pos += 2;
                self.consume_while(|c| c.is_ascii_hexdigit() || c == '_');
                return self.number_token(start);
            }
            if prefix.eq_ignore_ascii_case("0b") || prefix.eq_ignore_ascii_case("0o") {
                self.pos += 2;
                self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
                return self.number_token(start);
            }
        }

        self.consume_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek_char() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.consume_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+' | '-')) {
                lookahead = 2;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += lookahead;
                self.consume_while(|c| c.is_ascii_digit() || c == '_');
            }
        }
        self.number_token(start)
    }

    fn number_token(&self, start: usize) -> Token {
        Token::new(
            TokenKind::NumericLiteral,
            Span::new(start as u32, self.pos as u32),
        )
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        self.consume_while(is_identifier_part);
        let text = &self.source[start..self.pos];
        let kind = TokenKind::from_keyword(text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, Span::new(start as u32, self.pos as u32))
    }

    // =========================================================================
    // Char helpers
    // =========================================================================

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.scan();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn scans_declaration() {
        use TokenKind::*;
        assert_eq!(
            kinds("const x: int = 42;"),
            vec![
                Const, Identifier, Colon, Identifier, Equals, NumericLiteral, Semicolon
            ]
        );
    }

    #[test]
    fn scans_compound_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a ??= b >>> c ** d !== e?.f"),
            vec![
                Identifier,
                QuestionQuestionEquals,
                Identifier,
                GreaterGreaterGreater,
                Identifier,
                AsteriskAsterisk,
                Identifier,
                ExclamationEqualsEquals,
                Identifier,
                QuestionDot,
                Identifier,
            ]
        );
    }

    #[test]
    fn skips_comments() {
        use TokenKind::*;
        assert_eq!(
            kinds("a // line\n/* block\nstill */ b"),
            vec![Identifier, Identifier]
        );
    }

    #[test]
    fn scans_strings_and_numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"'a\'b' "c" 0xFF 1_000 1.5e-3"#),
            vec![
                StringLiteral,
                StringLiteral,
                NumericLiteral,
                NumericLiteral,
                NumericLiteral,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_unknown() {
        assert_eq!(kinds("'abc"), vec![TokenKind::Unknown]);
    }

    #[test]
    fn template_protocol() {
        let source = "`a${x}b${y}c`";
        let mut scanner = Scanner::new(source);
        let head = scanner.scan();
        assert_eq!(head.kind, TokenKind::TemplateHead);
        assert_eq!(head.text(source), "`a${");

        assert_eq!(scanner.scan().kind, TokenKind::Identifier);
        let close = scanner.scan();
        assert_eq!(close.kind, TokenKind::CloseBrace);

        let middle = scanner.rescan_template_continuation(close);
        assert_eq!(middle.kind, TokenKind::TemplateMiddle);
        assert_eq!(middle.text(source), "}b${");

        assert_eq!(scanner.scan().kind, TokenKind::Identifier);
        let close = scanner.scan();
        let tail = scanner.rescan_template_continuation(close);
        assert_eq!(tail.kind, TokenKind::TemplateTail);
        assert_eq!(tail.text(source), "}c`");
    }

    #[test]
    fn no_substitution_template() {
        assert_eq!(kinds("`abc`"), vec![TokenKind::NoSubstitutionTemplate]);
    }

    #[test]
    fn keywords_vs_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("interface Point extends struct"),
            vec![Interface, Identifier, Extends, Identifier]
        );
    }
}
