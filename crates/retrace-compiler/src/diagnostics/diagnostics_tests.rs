use super::{ErrorKind, SyntaxError};

#[test]
fn codes_are_stable() {
    assert_eq!(ErrorKind::EmptyCharClass.code(), -102);
    assert_eq!(ErrorKind::UnmatchedOpenParenthesis.code(), -117);
    assert_eq!(ErrorKind::InvalidBackref.code(), -208);
    assert_eq!(ErrorKind::NeverEndingRecursion.code(), -221);
    assert_eq!(ErrorKind::InvalidCodePoint.code(), -400);
}

#[test]
fn display_includes_offset() {
    let err = SyntaxError::new(ErrorKind::UndefinedName("x".into()), 4..9);
    insta::assert_snapshot!(err.to_string(), @"undefined name <x> reference at offset 4");
    assert_eq!(err.offset(), 4);
    assert_eq!(err.code(), -217);
}

#[test]
fn unsupported_message() {
    let kind = ErrorKind::Unsupported("absent stopper");
    insta::assert_snapshot!(kind.to_string(), @"absent stopper is not supported by this syntax");
}

#[test]
fn render_points_at_span() {
    let err = SyntaxError::new(ErrorKind::UnmatchedCloseParenthesis, 2..3);
    insta::assert_snapshot!(err.render("ab)", false), @r"
    error: unmatched close parenthesis
      |
    1 | ab)
      |   ^
    ");
}

#[test]
fn render_widens_empty_span() {
    let err = SyntaxError::new(ErrorKind::EndPatternAtEscape, 1..1);
    insta::assert_snapshot!(err.render("a\\", false), @r"
    error: end pattern at escape
      |
    1 | a\
      |  ^
    ");
}

#[test]
fn render_clamps_span_past_end() {
    let err = SyntaxError::new(ErrorKind::UnmatchedOpenParenthesis, 0..40);
    insta::assert_snapshot!(err.render("(ab", false), @r"
    error: end pattern with unmatched parenthesis
      |
    1 | (ab
      | ^^^
    ");
}
