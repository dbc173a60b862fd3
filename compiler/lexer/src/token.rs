//! The tokens emitted by the lexer.

use span::{Position, SourceFileIndex, Span};
use std::fmt;
use utility::QuoteExt;

/// The reserved words of the language.
///
/// A reserved word only counts as a keyword if it is directly followed by whitespace.
pub const KEYWORDS: [&str; 17] = [
    "fn", "if", "else", "elif", "and", "or", "not", "return", "true", "false", "import", "from",
    "as", "for", "in", "break", "continue",
];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    ///
    /// Keywords exclude the whitespace character following them and text literals
    /// include their surrounding quotes.
    pub image: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, image: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            image: image.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind, image: &str) -> bool {
        self.kind == kind && self.image == image
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenKind::Keyword, keyword)
    }

    pub fn is_punctuator(&self, punctuator: &str) -> bool {
        self.is(TokenKind::Punctuator, punctuator)
    }

    /// The content of a text literal without its quotes.
    pub fn text(&self) -> &str {
        self.image
            .strip_prefix('"')
            .and_then(|image| image.strip_suffix('"'))
            .unwrap_or(&self.image)
    }

    pub fn span(&self, file: SourceFileIndex) -> Span {
        Span::new(file, self.position, self.image.chars().count() as u32)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::String => write!(f, "text literal {}", self.image),
            kind => write!(f, "{kind} {}", self.image.as_str().quote()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    Integer,
    Float,
    String,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::Punctuator => "punctuator",
            Self::Integer => "integer literal",
            Self::Float => "float literal",
            Self::String => "text literal",
            Self::EndOfInput => "end of input",
        })
    }
}

pub(crate) const fn is_punctuator(character: char) -> bool {
    matches!(
        character,
        '{' | '}'
            | '('
            | ')'
            | '['
            | ']'
            | '<'
            | '>'
            | ','
            | '.'
            | ';'
            | '+'
            | '-'
            | '/'
            | '*'
            | '%'
            | '='
            | '|'
            | '!'
    )
}

/// Whitespace as understood by the language, notably excluding Unicode spaces.
pub(crate) const fn is_whitespace(character: char) -> bool {
    matches!(character, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

pub(crate) const fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

pub(crate) const fn is_identifier_middle(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '-')
}
