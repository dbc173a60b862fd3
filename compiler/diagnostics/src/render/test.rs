use crate::{reporter::render_to_string, Diagnostic, ErrorCode};
use span::{FileName, Position, SourceMap, Span};

#[track_caller]
fn assert_format(diagnostic: &Diagnostic, map: Option<&SourceMap>, expected: &str) {
    // We are not interested in checking the coloring.
    let actual = render_to_string(diagnostic, map);

    if actual != expected {
        panic!(
            "the output differs:\n{}",
            utility::difference(expected, &actual, "\n")
        );
    }
}

#[test]
fn format_no_highlights() {
    let diagnostic = Diagnostic::error().code(ErrorCode::E000).message("summary");

    assert_format(&diagnostic, None, "error[E000]: summary");
}

#[test]
fn format_single_line_primary_highlight() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "fn main() {\n  x = ls(\n}\n");

    let diagnostic = Diagnostic::error()
        .code(ErrorCode::E010)
        .message("unexpected token")
        .span(Span::new(file, Position::new(2, 0), 1), "unexpected token");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error[E010]: unexpected token
  ┌─ ⟨anonymous⟩:3:1
  │
3 │ }
  │ ═ unexpected token",
    );
}

#[test]
fn format_zero_length_highlight_at_end_of_line() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Virtual("main.posh"), "fn main() {");

    let diagnostic = Diagnostic::error()
        .message("unexpected end of input")
        .span(Span::new(file, Position::new(0, 11), 0), "missing ‘}’");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error: unexpected end of input
  ┌─ main.posh:1:12
  │
1 │ fn main() {
  │           ⟫⟪ missing ‘}’",
    );
}

#[test]
fn format_subdiagnostics() {
    let diagnostic = Diagnostic::error()
        .message("summary")
        .note("first line\nsecond line")
        .help("do something");

    assert_format(
        &diagnostic,
        None,
        "\
error: summary
 note: first line
       second line
 help: do something",
    );
}

#[test]
fn format_path_without_highlights() {
    let diagnostic = Diagnostic::error()
        .code(ErrorCode::E016)
        .message("could not load module ‘/lib/missing.posh’")
        .path("/lib/missing.posh".into());

    assert_format(
        &diagnostic,
        None,
        "\
error[E016]: could not load module ‘/lib/missing.posh’
  ── /lib/missing.posh",
    );
}

#[test]
fn format_bug() {
    let diagnostic = Diagnostic::bug()
        .message("thread panicked")
        .note("at compiler/parser/src/lib.rs:10:5");

    assert_format(
        &diagnostic,
        None,
        "\
internal compiler error: thread panicked
 note: at compiler/parser/src/lib.rs:10:5",
    );
}
