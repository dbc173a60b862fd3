//! The syntactic analyzer (parser).
//!
//! The parser is a library of matchers, one per production of the grammar.
//! A matcher is a pure function of the token sequence and an offset into it.
//! It either returns the node it built together with the range of tokens it
//! consumed or it fails at a token.
//!
//! Alternatives are tried in a fixed order and the first one to succeed wins.
//! When all of them fail, the failure that got furthest into the input is kept.
//! There is no error recovery.
//!
//! # Grammar
//!
//! Notation: Terminals are quoted or start with `#`. Alternatives are ordered.
//!
//! ```ebnf
//! Posh ::= (Function | Import)* #End-Of-Input
//! Import ::= "from" #Text "import" ("*" "as" #Identifier | Import-Item ("," Import-Item)*)
//! Import-Item ::= #Identifier ("as" #Identifier)?
//! Function ::= "fn" #Identifier Parameters #Identifier? Function-Body
//! Parameters ::= "(" (#Identifier #Identifier ","?)* ")"
//! Function-Body ::= "{" Statement* "}"
//! For-Body ::= "{" (Statement | "break" | "continue")* "}"
//! Statement ::= Assignment | Function-Call | Return | If | For
//! Assignment ::= #Identifier "=" Expression
//! Return ::= "return" Expression?
//! If ::= "if" Condition Function-Body ("elif" Condition Function-Body)* ("else" Function-Body)?
//! Condition ::= Logical | Boolean
//! For ::= "for" #Identifier ("," #Identifier)? "in" (Range | Expression) For-Body
//! Expression ::= Pipe | Range | Simple-Expression
//! Pipe ::= Simple-Expression ("|" Function-Call)+
//! Range ::= Numeric ("," Numeric)? "." "." Numeric?
//! Simple-Expression ::= Arithmetic | Function-Call | Numeric | #Text | Boolean
//! Arithmetic ::= Numeric (("+" | "-" | "*" | "/") Numeric)+
//! Comparison ::= Numeric (Comparison-Operator Numeric)+
//! Comparison-Operator ::= "<" "=" | ">" "=" | "=" "=" | "!" "=" | "<" | ">"
//! Logical ::= Boolean ("and" | "or") (Logical | Boolean)
//! Boolean ::= Comparison | Negation | Numeric | "true" | "false"
//! Negation ::= "not" Boolean
//! Numeric ::= "(" Arithmetic ")" | Dot-Notation | #Integer | #Float | #Identifier
//! Dot-Notation ::= #Identifier ("." #Identifier)+
//! Function-Call ::= (Dot-Notation | #Identifier) "(" ((Simple-Expression | Flag) ","?)* ")"
//! Flag ::= "-" "-"? #Identifier
//! ```

use ast::Posh;
use diagnostics::{Diagnostic, ErrorCode};
use lexer::{Token, TokenKind};
use span::{SourceFileIndex, Span};
use std::fmt;

/// Try the given matchers in order and return the first success or else the furthest failure.
///
/// The failure defaults to the token at the given offset.
macro_rules! first_of {
    ($tokens:expr, $offset:expr; $( $matcher:expr ),+ $(,)?) => {{
        let mut failure = $crate::Failure::at($tokens, $offset);
        loop {
            $(
                match $matcher {
                    Ok(found) => break Ok(found),
                    Err(error) => failure = failure.furthest(error),
                }
            )+
            break Err(failure);
        }
    }};
}

mod base;
mod declaration;
mod expression;
mod statement;

pub use declaration::{match_function, match_import, match_parameters, match_posh};
pub use expression::{
    match_arithmetic, match_boolean, match_comparison, match_dot_notation, match_expression,
    match_flag, match_function_call, match_logical, match_negation, match_numeric, match_pipe,
    match_range, match_simple_expression,
};
pub use statement::{
    match_assignment, match_for_body, match_for_loop, match_function_body, match_if_statement,
    match_return,
};

/// Parse a whole compilation unit.
///
/// The token sequence has to be terminated by an end-of-input token as produced by the lexer.
pub fn parse(tokens: &[Token]) -> Result<Posh, ParseError> {
    match_posh(tokens, 0)
        .map(|found| found.node)
        .map_err(|failure| ParseError {
            token: failure.token.clone(),
        })
}

pub type ParseResult<'t, T> = Result<Match<T>, Failure<'t>>;

/// A successful match of a production.
#[derive(Debug, PartialEq, Eq)]
pub struct Match<T> {
    pub node: T,
    /// The offset of the first token consumed.
    pub start: usize,
    /// The offset right after the last token consumed.
    pub end: usize,
}

impl<T> Match<T> {
    #[track_caller]
    pub fn new(node: T, start: usize, end: usize) -> Self {
        debug_assert!(end > start, "empty match from {start} to {end}");
        Self { node, start, end }
    }

    pub fn map<U>(self, mapper: impl FnOnce(T) -> U) -> Match<U> {
        Match {
            node: mapper(self.node),
            start: self.start,
            end: self.end,
        }
    }
}

pub(crate) trait ParseResultExt<'t, T> {
    fn map_node<U>(self, mapper: impl FnOnce(T) -> U) -> ParseResult<'t, U>;
}

impl<'t, T> ParseResultExt<'t, T> for ParseResult<'t, T> {
    fn map_node<U>(self, mapper: impl FnOnce(T) -> U) -> ParseResult<'t, U> {
        self.map(|found| found.map(mapper))
    }
}

/// The token at which a matcher gave up.
#[derive(Clone, Copy, Debug)]
pub struct Failure<'t> {
    pub token: &'t Token,
}

impl<'t> Failure<'t> {
    pub fn at(tokens: &'t [Token], offset: usize) -> Self {
        Self {
            token: base::token(tokens, offset),
        }
    }

    /// The one of both failures located further into the source.
    ///
    /// On a tie, the receiver is kept.
    #[must_use]
    pub fn furthest(self, other: Self) -> Self {
        if other.token.position > self.token.position {
            other
        } else {
            self
        }
    }
}

/// Failures are equal if they occur at the same location.
impl PartialEq for Failure<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.token.position == other.token.position
    }
}

impl Eq for Failure<'_> {}

/// A syntax error pointing at the furthest token the parser could not get past.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseError {
    pub token: Token,
}

impl ParseError {
    pub fn diagnostic(&self, file: SourceFileIndex) -> Diagnostic {
        let diagnostic = Diagnostic::error().code(ErrorCode::E010);

        match self.token.kind {
            TokenKind::EndOfInput => diagnostic
                .message("unexpected end of input")
                .span(Span::new(file, self.token.position, 0), "unexpected end of input"),
            _ => diagnostic
                .message(format!("found unexpected {}", self.token))
                .span(self.token.span(file), "unexpected token"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected {} at {}", self.token, self.token.position)
    }
}

impl std::error::Error for ParseError {}
