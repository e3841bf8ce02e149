//! Lexer and token snapshot.
//!
//! A [`TokenSnapshot`] is the immutable, randomly addressable token sequence
//! the parser and the inspection engine consume. Whitespace and comments
//! never become tokens; they live in a side-channel keyed by the index of
//! the token that follows them.

mod cursor;

use cursor::{Cursor, EOF_CHAR};
pub use line_index::{LineCol, LineIndex};
pub use quill_syntax::SyntaxKind;
use quill_syntax::SyntaxKind::*;
use quill_syntax::TokenRange;
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub start: LineCol,
    pub end: LineCol,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriviaKind {
    Whitespace,
    LineComment,
    BlockComment,
}

/// A whitespace or comment run. `token` is the index of the token the piece
/// precedes; pieces after the last token carry the token count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub range: TextRange,
    pub token: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TokenSnapshot {
    text: String,
    tokens: Vec<Token>,
    trivia: Vec<Trivia>,
}

impl TokenSnapshot {
    pub fn new(text: &str) -> Self {
        Lexer::new(text).snapshot()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> u32 {
        self.tokens.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Token> {
        self.tokens.get(index as usize)
    }

    /// `EOF` past the end, so the parser can peek without bounds checks.
    pub fn kind(&self, index: u32) -> SyntaxKind {
        self.get(index).map_or(EOF, |token| token.kind)
    }

    pub fn token_text(&self, index: u32) -> &str {
        self.get(index).map_or("", |token| &self.text[token.range])
    }

    /// Text range covered by a token range; an empty token range maps to an
    /// empty text range anchored at its boundary.
    pub fn text_range(&self, range: TokenRange) -> TextRange {
        if range.is_empty() || self.tokens.is_empty() {
            let end = self.end_offset(range.start);
            return TextRange::empty(end);
        }

        let start = self.tokens[range.start as usize].range.start();
        let last = (range.end - 1).min(self.len() - 1);
        TextRange::new(start, self.tokens[last as usize].range.end())
    }

    fn end_offset(&self, index: u32) -> TextSize {
        match self.tokens.get(index as usize) {
            Some(token) => token.range.start(),
            None => TextSize::new(self.text.len() as u32),
        }
    }

    /// The token the offset falls in, or the nearest token to its left when
    /// the offset sits in trivia or an unresolved gap. A caret touching the
    /// end of an identifier belongs to that identifier, not to the
    /// punctuation that follows it. `None` when the offset is outside the
    /// text or before the first token.
    pub fn token_at_offset(&self, offset: TextSize) -> Option<u32> {
        if u32::from(offset) > self.text.len() as u32 {
            return None;
        }

        let after = self.tokens.partition_point(|token| token.range.start() <= offset);
        let index = after.checked_sub(1)?;

        if let Some(previous) = index.checked_sub(1)
            && self.tokens[index].range.start() == offset
            && self.tokens[previous].range.end() == offset
            && self.tokens[previous].kind == IDENT
        {
            return Some(previous as u32);
        }

        Some(index as u32)
    }

    pub fn trivia(&self) -> &[Trivia] {
        &self.trivia
    }

    /// Trivia pieces directly preceding `token`.
    pub fn trivia_before(&self, token: u32) -> impl Iterator<Item = &Trivia> {
        self.trivia.iter().filter(move |piece| piece.token == token)
    }
}

struct Lexer<'text> {
    text: &'text str,
    cursor: Cursor<'text>,
    tokens: Vec<Token>,
    trivia: Vec<Trivia>,
}

impl<'text> Lexer<'text> {
    fn new(text: &'text str) -> Self {
        Self { text, cursor: Cursor::new(text), tokens: Vec::new(), trivia: Vec::new() }
    }

    fn snapshot(mut self) -> TokenSnapshot {
        loop {
            self.trivia();

            if self.cursor.is_eof() {
                break;
            }

            let kind = self.syntax_kind();
            let range = self.range();
            self.cursor.reset_pos_within_token();
            self.tokens.push(Token {
                kind,
                range,
                start: LineCol { line: 0, col: 0 },
                end: LineCol { line: 0, col: 0 },
            });
        }

        let index = LineIndex::new(self.text);
        for token in &mut self.tokens {
            token.start = index.line_col(token.range.start());
            token.end = index.line_col(token.range.end());
        }

        TokenSnapshot { text: self.text.to_owned(), tokens: self.tokens, trivia: self.trivia }
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end: u32 = self.offset().into();
        let len: u32 = self.cursor.pos_within_token().into();
        TextRange::at((end - len).into(), len.into())
    }

    fn text(&self) -> &'text str {
        let range: std::ops::Range<usize> = self.range().into();
        &self.text[range]
    }

    fn trivia(&mut self) {
        loop {
            let kind = match self.cursor.peek() {
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_while(|c| c != '\n');
                    TriviaKind::LineComment
                }
                '/' if self.cursor.second() == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_eof()
                        && !(self.cursor.matches('*') && self.cursor.second() == '/')
                    {
                        self.cursor.advance();
                    }
                    if !self.cursor.is_eof() {
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                    TriviaKind::BlockComment
                }
                first_char if first_char.is_whitespace() => {
                    self.cursor.advance_while(char::is_whitespace);
                    TriviaKind::Whitespace
                }
                _ => break,
            };

            let range = self.range();
            self.cursor.reset_pos_within_token();
            self.trivia.push(Trivia { kind, range, token: self.tokens.len() as u32 });
        }
    }

    fn syntax_kind(&mut self) -> SyntaxKind {
        match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '/' => SLASH,
            '&' => AMPERSAND,
            '=' => {
                if self.cursor.matches('>') {
                    self.cursor.advance();
                    FAT_ARROW
                } else {
                    EQ
                }
            }
            '<' => match self.cursor.peek() {
                '=' => {
                    self.cursor.advance();
                    LT_EQ
                }
                '>' => {
                    self.cursor.advance();
                    NOT_EQ
                }
                _ => LT,
            },
            '>' => {
                if self.cursor.matches('=') {
                    self.cursor.advance();
                    GT_EQ
                } else {
                    GT
                }
            }
            '"' => self.text_literal(),
            first_char @ '0'..='9' => self.number(first_char),
            'A'..='Z' | 'a'..='z' | '_' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                match self.text() {
                    "and" => AND_KW,
                    "or" => OR_KW,
                    "not" => NOT_KW,
                    "is" => IS_KW,
                    "as" => AS_KW,
                    "each" => EACH_KW,
                    "if" => IF_KW,
                    "then" => THEN_KW,
                    "else" => ELSE_KW,
                    "let" => LET_KW,
                    "in" => IN_KW,
                    "section" => SECTION_KW,
                    "shared" => SHARED_KW,
                    "optional" => OPTIONAL_KW,
                    "nullable" => NULLABLE_KW,
                    "true" => TRUE_KW,
                    "false" => FALSE_KW,
                    "null" => NULL_KW,
                    _ => IDENT,
                }
            }
            _ => UNKNOWN,
        }
    }

    /// Double quotes escape by doubling; an unterminated literal runs to
    /// end of input and is still classified as text.
    fn text_literal(&mut self) -> SyntaxKind {
        loop {
            match self.cursor.peek() {
                '"' if self.cursor.second() == '"' => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                '"' => {
                    self.cursor.advance();
                    break;
                }
                EOF_CHAR => break,
                _ => {
                    self.cursor.advance();
                }
            }
        }

        TEXT
    }

    fn number(&mut self, first_char: char) -> SyntaxKind {
        if first_char == '0' && (self.cursor.matches('x') || self.cursor.matches('X')) {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_hexdigit());
            return HEX_NUMBER;
        }

        self.cursor.advance_while(|c| c.is_ascii_digit());

        let mut float = false;
        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit());
            float = true;
        }

        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.cursor.advance();
            if self.cursor.matches('-') || self.cursor.matches('+') {
                self.cursor.advance();
            }
            self.cursor.advance_while(|c| c.is_ascii_digit());
            float = true;
        }

        if float { FLOAT_NUMBER } else { INT_NUMBER }
    }
}
