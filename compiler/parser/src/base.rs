//! Matchers for single tokens.

use crate::{Failure, Match, ParseResult};
use lexer::{Token, TokenKind};

/// The token at the given offset.
///
/// Offsets past the end refer to the final end-of-input token.
pub(crate) fn token(tokens: &[Token], offset: usize) -> &Token {
    &tokens[offset.min(tokens.len() - 1)]
}

pub(crate) fn punctuator<'t>(
    tokens: &'t [Token],
    offset: usize,
    punctuator: &str,
) -> ParseResult<'t, &'t Token> {
    single(tokens, offset, |token| token.is_punctuator(punctuator))
}

pub(crate) fn keyword<'t>(
    tokens: &'t [Token],
    offset: usize,
    keyword: &str,
) -> ParseResult<'t, &'t Token> {
    single(tokens, offset, |token| token.is_keyword(keyword))
}

pub(crate) fn kind<'t>(
    tokens: &'t [Token],
    offset: usize,
    kind: TokenKind,
) -> ParseResult<'t, &'t Token> {
    single(tokens, offset, |token| token.kind == kind)
}

pub(crate) fn identifier<'t>(tokens: &'t [Token], offset: usize) -> ParseResult<'t, Token> {
    kind(tokens, offset, TokenKind::Identifier).map(|found| found.map(Clone::clone))
}

fn single<'t>(
    tokens: &'t [Token],
    offset: usize,
    predicate: impl FnOnce(&Token) -> bool,
) -> ParseResult<'t, &'t Token> {
    let token = token(tokens, offset);

    if token.kind != TokenKind::EndOfInput && predicate(token) {
        Ok(Match::new(token, offset, offset + 1))
    } else {
        Err(Failure { token })
    }
}
