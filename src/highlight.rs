//! Single-pass Luau tokenizer used to color the code viewer.
//!
//! The returned spans tile the input: every byte belongs to exactly one span
//! and span boundaries always fall on UTF-8 char boundaries. Whitespace and
//! anything unrecognised come back as [`TokenKind::Plain`].

use std::ops::Range;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Keyword,
    Literal,
    String,
    Number,
    Comment,
    Operator,
    Punctuation,
    Identifier,
    Plain,
}

impl TokenKind {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Keyword => "tok-keyword",
            Self::Literal => "tok-literal",
            Self::String => "tok-string",
            Self::Number => "tok-number",
            Self::Comment => "tok-comment",
            Self::Operator => "tok-operator",
            Self::Punctuation => "tok-punctuation",
            Self::Identifier => "tok-identifier",
            Self::Plain => "tok-plain",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Span {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

const KEYWORDS: &[&str] = &[
    "and", "break", "continue", "do", "else", "elseif", "end", "export", "for", "function", "goto",
    "if", "in", "local", "not", "or", "repeat", "return", "then", "type", "until", "while",
];

const LITERALS: &[&str] = &["true", "false", "nil"];

// Longest first so `..=` wins over `..` and `.`.
const MULTI_CHAR_OPERATORS: &[&str] = &[
    "...", "..=", "//=", "==", "~=", "<=", ">=", "//", "..", "+=", "-=", "*=", "/=", "%=", "^=", "->",
];

pub fn highlight(source: &str) -> Vec<Span> {
    let mut scanner = Scanner { src: source, pos: 0 };
    let mut spans: Vec<Span> = Vec::new();

    while let Some(ch) = scanner.peek() {
        let start = scanner.pos;
        let kind = match ch {
            '-' if scanner.peek_nth(1) == Some('-') => {
                scanner.scan_comment();
                TokenKind::Comment
            }
            '"' | '\'' | '`' => {
                scanner.scan_quoted(ch);
                TokenKind::String
            }
            '[' if long_bracket_level(scanner.rest()).is_some() => {
                scanner.scan_long_bracket();
                TokenKind::String
            }
            c if c.is_ascii_digit() || (c == '.' && scanner.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) => {
                scanner.scan_number();
                TokenKind::Number
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                scanner.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                classify_word(&source[start..scanner.pos])
            }
            c if is_operator_char(c) => {
                scanner.scan_operator();
                TokenKind::Operator
            }
            '(' | ')' | '{' | '}' | '[' | ']' | ',' | ';' | ':' => {
                scanner.bump();
                TokenKind::Punctuation
            }
            _ => {
                scanner.bump();
                TokenKind::Plain
            }
        };

        push_span(&mut spans, kind, start..scanner.pos);
    }

    spans
}

fn push_span(spans: &mut Vec<Span>, kind: TokenKind, range: Range<usize>) {
    if kind == TokenKind::Plain {
        if let Some(last) = spans.last_mut() {
            if last.kind == TokenKind::Plain && last.range.end == range.start {
                last.range.end = range.end;
                return;
            }
        }
    }

    spans.push(Span { kind, range });
}

fn classify_word(word: &str) -> TokenKind {
    if LITERALS.contains(&word) {
        TokenKind::Literal
    } else if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    }
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '+' | '-' | '*' | '/' | '%' | '^' | '#' | '=' | '~' | '<' | '>' | '&' | '|' | '.')
}

/// Level of a `[`, N×`=`, `[` opener at the start of `text`.
fn long_bracket_level(text: &str) -> Option<usize> {
    let after_open = text.strip_prefix('[')?;
    let level = after_open.chars().take_while(|&c| c == '=').count();

    after_open[level..].starts_with('[').then_some(level)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn eat_digits(&mut self, hex: bool) {
        if hex {
            self.eat_while(|c| c == '_' || c.is_ascii_hexdigit());
        } else {
            self.eat_while(|c| c == '_' || c.is_ascii_digit());
        }
    }

    fn scan_comment(&mut self) {
        self.pos += 2;
        if long_bracket_level(self.rest()).is_some() {
            self.scan_long_bracket();
        } else {
            self.eat_while(|c| c != '\n');
        }
    }

    /// Consumes `[=*[ ... ]=*]`. An unterminated bracket runs to the end.
    fn scan_long_bracket(&mut self) {
        let Some(level) = long_bracket_level(self.rest()) else {
            return;
        };

        self.pos += level + 2;
        let close = format!("]{}]", "=".repeat(level));
        match self.rest().find(&close) {
            Some(offset) => self.pos += offset + close.len(),
            None => self.pos = self.src.len(),
        }
    }

    /// Backtick strings may span lines; quoted ones stop at the line end when
    /// left unterminated.
    fn scan_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(ch) = self.peek() {
            if ch == '\n' && quote != '`' {
                return;
            }

            self.bump();
            if ch == '\\' {
                self.bump();
            } else if ch == quote {
                return;
            }
        }
    }

    fn scan_number(&mut self) {
        let radix_prefix = self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X' | 'b' | 'B'));

        if radix_prefix {
            self.pos += 1;
            let hex = matches!(self.bump(), Some('x' | 'X'));
            self.eat_digits(hex);
            if hex && self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
                self.eat_digits(true);
            }
            if hex {
                self.scan_exponent(['p', 'P']);
            }
            return;
        }

        self.eat_digits(false);
        // `1..2` is a concat, not a float.
        if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
            self.bump();
            self.eat_digits(false);
        }
        self.scan_exponent(['e', 'E']);
    }

    fn scan_exponent(&mut self, markers: [char; 2]) {
        let Some(marker) = self.peek() else {
            return;
        };
        if !markers.contains(&marker) {
            return;
        }

        let signed = matches!(self.peek_nth(1), Some('+' | '-'));
        let digit_at = if signed { 2 } else { 1 };
        if !self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
            return;
        }

        self.pos += digit_at;
        self.eat_digits(false);
    }

    fn scan_operator(&mut self) {
        if let Some(operator) = MULTI_CHAR_OPERATORS
            .iter()
            .find(|operator| self.rest().starts_with(*operator))
        {
            self.pos += operator.len();
        } else {
            self.bump();
        }
    }
}
