use crate::{Error, ErrorKind, Token, TokenKind::*, lex};
use span::Position;
use utility::difference;

fn token(kind: crate::TokenKind, image: &str, line: u32, column: u32) -> Token {
    Token::new(kind, image, Position::new(line, column))
}

#[track_caller]
fn assert_lex_eq(source: &str, expected: Vec<Token>) {
    let actual = lex(source);
    let expected = Ok(expected);

    if actual != expected {
        panic!(
            "the output by the lexer does not match the expected one:\n{}",
            difference(&format!("{expected:#?}"), &format!("{actual:#?}"), "\n"),
        );
    }
}

#[test]
fn function_with_arithmetic() {
    assert_lex_eq(
        "fn main() { x = 1 + 2 }",
        vec![
            token(Keyword, "fn", 0, 0),
            token(Identifier, "main", 0, 3),
            token(Punctuator, "(", 0, 7),
            token(Punctuator, ")", 0, 8),
            token(Punctuator, "{", 0, 10),
            token(Identifier, "x", 0, 12),
            token(Punctuator, "=", 0, 14),
            token(Integer, "1", 0, 16),
            token(Punctuator, "+", 0, 18),
            token(Integer, "2", 0, 20),
            token(Punctuator, "}", 0, 22),
            token(EndOfInput, "", 0, 23),
        ],
    );
}

#[test]
fn float_literals_take_precedence_over_integer_literals() {
    assert_lex_eq(
        "3.14 3 1..10",
        vec![
            token(Float, "3.14", 0, 0),
            token(Integer, "3", 0, 5),
            token(Integer, "1", 0, 7),
            token(Punctuator, ".", 0, 8),
            token(Punctuator, ".", 0, 9),
            token(Integer, "10", 0, 10),
            token(EndOfInput, "", 0, 12),
        ],
    );
}

#[test]
fn keywords_need_to_be_followed_by_whitespace() {
    assert_lex_eq(
        "return}\nfor\ti",
        vec![
            token(Identifier, "return", 0, 0),
            token(Punctuator, "}", 0, 6),
            token(Keyword, "for", 1, 0),
            token(Identifier, "i", 1, 4),
            token(EndOfInput, "", 1, 5),
        ],
    );
}

#[test]
fn keyword_prefixes_are_identifiers() {
    assert_lex_eq(
        "format input",
        vec![
            token(Identifier, "format", 0, 0),
            token(Identifier, "input", 0, 7),
            token(EndOfInput, "", 0, 12),
        ],
    );
}

#[test]
fn identifiers_may_contain_dashes() {
    assert_lex_eq(
        "foo-bar - baz",
        vec![
            token(Identifier, "foo-bar", 0, 0),
            token(Punctuator, "-", 0, 8),
            token(Identifier, "baz", 0, 10),
            token(EndOfInput, "", 0, 13),
        ],
    );
}

#[test]
fn comments_are_dropped() {
    assert_lex_eq(
        "# leading\nx = \"a b\"\n# trailing",
        vec![
            token(Identifier, "x", 1, 0),
            token(Punctuator, "=", 1, 2),
            token(String, "\"a b\"", 1, 4),
            token(EndOfInput, "", 2, 10),
        ],
    );
}

#[test]
fn text_literals_spanning_several_lines() {
    assert_lex_eq(
        "\"a\nb\" x",
        vec![
            token(String, "\"a\nb\"", 0, 0),
            token(Identifier, "x", 1, 3),
            token(EndOfInput, "", 1, 4),
        ],
    );
}

#[test]
fn flags_and_pipes() {
    assert_lex_eq(
        "ls(--all) | wc(-l)",
        vec![
            token(Identifier, "ls", 0, 0),
            token(Punctuator, "(", 0, 2),
            token(Punctuator, "-", 0, 3),
            token(Punctuator, "-", 0, 4),
            token(Identifier, "all", 0, 5),
            token(Punctuator, ")", 0, 8),
            token(Punctuator, "|", 0, 10),
            token(Identifier, "wc", 0, 12),
            token(Punctuator, "(", 0, 14),
            token(Punctuator, "-", 0, 15),
            token(Identifier, "l", 0, 16),
            token(Punctuator, ")", 0, 17),
            token(EndOfInput, "", 0, 18),
        ],
    );
}

#[test]
fn empty_source() {
    assert_lex_eq(" \n\t", vec![token(EndOfInput, "", 1, 1)]);
}

#[test]
fn invalid_character() {
    assert_eq!(
        lex("x = 1 @"),
        Err(Error::new(ErrorKind::InvalidCharacter('@'), Position::new(0, 6)))
    );
}

#[test]
fn unterminated_text_literal() {
    assert_eq!(
        lex("fn main() {\n  x = \"abc\n}"),
        Err(Error::new(
            ErrorKind::UnterminatedTextLiteral,
            Position::new(1, 6)
        ))
    );
}

#[test]
fn text_literal_content() {
    let tokens = lex(r#"echo("hi there")"#).unwrap();

    assert_eq!(tokens[2].kind, String);
    assert_eq!(tokens[2].text(), "hi there");
}

#[test]
fn images_reconstruct_source_modulo_whitespace() {
    let source = "fn add(a int, b int) int {\n\treturn a + b\n}\n";
    let tokens = lex(source).unwrap();

    let reconstructed: std::string::String =
        tokens.iter().map(|token| token.image.as_str()).collect();
    let stripped: std::string::String = source
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect();

    assert_eq!(reconstructed, stripped);
}
