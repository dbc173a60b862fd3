use super::{FileName, Highlight, LineWithHighlight, SourceMap};
use crate::{Position, Span};

#[test]
fn lines_are_zero_indexed_without_line_breaks() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "fn main() {\r\n\tx = 1\n}\n");

    assert_eq!(map[file].line(0), Some("fn main() {"));
    assert_eq!(map[file].line(1), Some("\tx = 1"));
    assert_eq!(map[file].line(2), Some("}"));
    assert_eq!(map[file].line(3), Some(""));
    assert_eq!(map[file].line(4), None);
}

#[test]
fn snippet_of_single_token() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "x = ls(\"-la\")\n");

    let span = Span::new(file, Position::new(0, 4), 2);
    assert_eq!(map.snippet(span), "ls");
}

#[test]
fn snippet_clamped_to_end_of_line() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "return");

    let span = Span::new(file, Position::new(0, 6), 1);
    assert_eq!(map.snippet(span), "");
}

#[test]
fn highlight_after_wide_characters() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "x = \"日本\" + y\n");

    let span = Span::new(file, Position::new(0, 11), 1);

    assert_eq!(
        map.line_with_highlight(span),
        LineWithHighlight {
            file: &FileName::Anonymous,
            number: 1,
            content: "x = \"日本\" + y",
            highlight: Highlight {
                start: 12,
                end: 13,
                width: 1,
                prefix_width: 13,
            },
        }
    );
}

#[test]
fn end_of_file() {
    let mut map = SourceMap::default();
    let file = map.add_str(FileName::Anonymous, "fn main() {\n}\n");

    assert_eq!(map[file].end(), Position::new(2, 0));
}
