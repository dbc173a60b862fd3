//! The lexical analyzer (lexer).
//!
//! At each position, the patterns below are tried in order and the first one matching wins:
//!
//! 1. whitespace and comments (`#` up to the end of the line), both dropped
//! 2. keywords: a [reserved word](KEYWORDS) directly followed by a whitespace character
//! 3. identifiers: `[a-zA-Z_][a-zA-Z0-9-_]*`
//! 4. punctuators
//! 5. float literals: `[0-9]+\.[0-9]+`
//! 6. integer literals: `[0-9]+`
//! 7. text literals: `"[^"]*"`
//!
//! Lexing is all-or-nothing: the first character no pattern accepts aborts it.

use diagnostics::{Diagnostic, ErrorCode};
use span::{Position, SourceFileIndex, Span};
use std::fmt;
use token::{is_identifier_middle, is_identifier_start, is_punctuator, is_whitespace};
use utility::QuoteExt;

pub use token::{KEYWORDS, Token, TokenKind};

#[cfg(test)]
mod test;
pub mod token;

pub fn lex(source: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(source).lex()
}

/// The state of the lexer.
struct Lexer<'a> {
    source: &'a str,
    /// The byte index of the next character.
    index: usize,
    /// The location of the next character.
    position: Position,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: 0,
            position: Position::default(),
            tokens: Vec::new(),
        }
    }

    fn lex(mut self) -> Result<Vec<Token>, Error> {
        while let Some(character) = self.peek() {
            match character {
                character if is_whitespace(character) => self.take_while(is_whitespace),
                '#' => self.lex_comment(),
                character if is_identifier_start(character) => self.lex_keyword_or_identifier(),
                character if is_punctuator(character) => {
                    let (start, position) = (self.index, self.position);
                    self.advance();
                    self.add(TokenKind::Punctuator, start, position);
                }
                character if character.is_ascii_digit() => self.lex_number_literal(),
                '"' => self.lex_text_literal()?,
                character => {
                    return Err(Error::new(
                        ErrorKind::InvalidCharacter(character),
                        self.position,
                    ));
                }
            }
        }

        self.tokens
            .push(Token::new(TokenKind::EndOfInput, "", self.position));

        Ok(self.tokens)
    }

    fn lex_comment(&mut self) {
        self.take_while(|character| character != '\n');
        // the line break belongs to the comment
        self.advance();
    }

    fn lex_keyword_or_identifier(&mut self) {
        let (start, position) = (self.index, self.position);
        self.take_while(is_identifier_middle);

        let word = &self.source[start..self.index];

        if KEYWORDS.contains(&word) && self.peek().is_some_and(is_whitespace) {
            self.add(TokenKind::Keyword, start, position);
            // the whitespace character is consumed together with the keyword
            self.advance();
        } else {
            self.add(TokenKind::Identifier, start, position);
        }
    }

    fn lex_number_literal(&mut self) {
        let (start, position) = (self.index, self.position);
        self.take_while(|character| character.is_ascii_digit());

        let mut rest = self.source[self.index..].chars();

        if rest.next() == Some('.')
            && rest.next().is_some_and(|character| character.is_ascii_digit())
        {
            self.advance();
            self.take_while(|character| character.is_ascii_digit());
            self.add(TokenKind::Float, start, position);
        } else {
            self.add(TokenKind::Integer, start, position);
        }
    }

    fn lex_text_literal(&mut self) -> Result<(), Error> {
        let (start, position) = (self.index, self.position);

        let Some(length) = self.source[start + 1..].find('"') else {
            return Err(Error::new(ErrorKind::UnterminatedTextLiteral, position));
        };

        // the opening quote, the content and the closing quote
        let end = start + 1 + length + 1;
        while self.index < end {
            self.advance();
        }

        self.add(TokenKind::String, start, position);
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(character) = self.peek() {
            self.index += character.len_utf8();
            self.position.advance(character);
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(character) = self.peek() {
            if !predicate(character) {
                break;
            }
            self.advance();
        }
    }

    fn add(&mut self, kind: TokenKind, start: usize, position: Position) {
        let image = &self.source[start..self.index];
        self.tokens.push(Token::new(kind, image, position));
    }
}

/// A fatal lexical error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub position: Position,
}

impl Error {
    pub const fn new(kind: ErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn diagnostic(&self, file: SourceFileIndex) -> Diagnostic {
        let span = Span::new(file, self.position, 1);

        match self.kind {
            ErrorKind::InvalidCharacter(character) => Diagnostic::error()
                .code(ErrorCode::E001)
                .message(format!("found invalid character {}", character.quote()))
                .span(span, "unexpected character"),
            ErrorKind::UnterminatedTextLiteral => Diagnostic::error()
                .code(ErrorCode::E002)
                .message("unterminated text literal")
                .span(span, "missing closing quote"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::InvalidCharacter(character) => {
                write!(f, "invalid character {} at {}", character.quote(), self.position)
            }
            ErrorKind::UnterminatedTextLiteral => {
                write!(f, "unterminated text literal at {}", self.position)
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    InvalidCharacter(char),
    UnterminatedTextLiteral,
}
