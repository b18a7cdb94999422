use indoc::indoc;
use retrace_core::{Options, Syntax, UTF8};

use super::parse;
use crate::diagnostics::SyntaxError;
use crate::limits::CompileLimits;

fn try_parse(pattern: &str, syntax: &Syntax) -> Result<super::Ast, SyntaxError> {
    parse(
        pattern.as_bytes(),
        syntax,
        syntax.options,
        &UTF8,
        &CompileLimits::default(),
    )
}

fn dump(pattern: &str) -> String {
    dump_with(pattern, &Syntax::ONIGURUMA)
}

fn dump_with(pattern: &str, syntax: &Syntax) -> String {
    try_parse(pattern, syntax).expect("pattern should parse").dump()
}

fn error_code(pattern: &str, syntax: &Syntax) -> i32 {
    try_parse(pattern, syntax)
        .expect_err("pattern should be rejected")
        .code()
}

#[test]
fn sequence_with_quantified_group() {
    insta::assert_snapshot!(dump("a(b|c)*d"), @r#"
    Sequence
      Literal "a"
      Quantifier {0,inf} greedy
        Capture 1
          Alternation
            Literal "b"
            Literal "c"
      Literal "d"
    "#);
}

#[test]
fn quantifier_binds_last_char() {
    insta::assert_snapshot!(dump("abc+"), @r#"
    Sequence
      Literal "ab"
      Quantifier {1,inf} greedy
        Literal "c"
    "#);
}

#[test]
fn lazy_possessive_and_interval() {
    insta::assert_snapshot!(dump("a*?b++c{2,3}"), @r#"
    Sequence
      Quantifier {0,inf} lazy
        Literal "a"
      Quantifier {1,inf} possessive
        Literal "b"
      Quantifier {2,3} greedy
        Literal "c"
    "#);
}

#[test]
fn invalid_interval_is_literal() {
    insta::assert_snapshot!(dump("a{,x}"), @r#"Literal "a{,x}""#);
}

#[test]
fn multiplexed_name_backref() {
    insta::assert_snapshot!(dump(r"(?<x>a)|(?<x>b)\k<x>"), @r#"
    Alternation
      Capture 1 <x>
        Literal "a"
      Sequence
        Capture 2 <x>
          Literal "b"
        BackRef x -> [1, 2]
    "#);
}

#[test]
fn plain_groups_stop_capturing_next_to_named_ones() {
    let ast = try_parse("(a)(?<n>b)", &Syntax::ONIGURUMA).unwrap();
    assert_eq!(ast.num_captures, 1);
    assert_eq!(ast.names.groups("n"), Some(&[1][..]));
    insta::assert_snapshot!(ast.dump(), @r#"
    Sequence
      Group
        Literal "a"
      Capture 1 <n>
        Literal "b"
    "#);
}

#[test]
fn capture_group_option_keeps_plain_groups() {
    let syntax = Syntax {
        options: Options::CAPTURE_GROUP,
        ..Syntax::ONIGURUMA
    };
    let ast = try_parse(r"(a)(?<n>b)\1", &syntax).unwrap();
    assert_eq!(ast.num_captures, 2);
    assert_eq!(ast.names.groups("n"), Some(&[2][..]));
}

#[test]
fn inline_options_reach_end_of_group() {
    insta::assert_snapshot!(dump("(?i)ab|c"), @r#"
    Alternation
      Literal "ab" ic
      Literal "c" ic
    "#);
}

#[test]
fn scoped_options_are_restored() {
    insta::assert_snapshot!(dump("(?i:a)b"), @r#"
    Sequence
      Group
        Literal "a" ic
      Literal "b"
    "#);
}

#[test]
fn extended_mode_skips_space_and_comments() {
    let pattern = indoc! {"
        (?x) a b # comment
          c
    "};
    insta::assert_snapshot!(dump(pattern), @r#"Literal "abc""#);
}

#[test]
fn perl_anchors_follow_singleline() {
    insta::assert_snapshot!(dump_with("^.$(?ms)^.$", &Syntax::PERL), @r#"
    Sequence
      Anchor begin-buf
      AnyChar
      Anchor semi-end-buf
      Sequence
        Anchor begin-line
        AnyChar ml
        Anchor end-line
    "#);
}

#[test]
fn class_intersection_with_nested_negation() {
    insta::assert_snapshot!(dump("[a-z&&[^aeiou]]"), @"Class [b-d f-h j-n p-t v-z]");
}

#[test]
fn negated_class_keeps_flag() {
    insta::assert_snapshot!(dump("[^a-c]"), @"Class ^[a-c]");
}

#[test]
fn leading_bracket_is_literal() {
    insta::assert_snapshot!(dump("[]a]"), @"Class [] a]");
}

#[test]
fn ignore_case_class_adds_folds() {
    insta::assert_snapshot!(dump("(?i:[a-c])"), @r#"
    Group
      Class [A-C a-c]
    "#);
}

#[test]
fn ignore_case_class_with_multi_char_fold() {
    let ast = try_parse("(?i)[ß]", &Syntax::ONIGURUMA).unwrap();
    let super::NodeKind::Alternation(branches) = &ast.root.kind else {
        panic!("expected alternation, got {}", ast.dump());
    };
    assert!(matches!(
        &branches[0].kind,
        super::NodeKind::Literal { bytes, ignore_case: true } if bytes == b"ss"
    ));
    assert!(matches!(branches.last().unwrap().kind, super::NodeKind::Class { .. }));
}

#[test]
fn posix_bracket() {
    let syntax = Syntax {
        options: Options::POSIX_IS_ASCII,
        ..Syntax::ONIGURUMA
    };
    insta::assert_snapshot!(dump_with("[[:xdigit:]_]", &syntax), @"Class [0-9 A-F _ a-f]");
}

#[test]
fn branch_reset_shares_numbers() {
    let ast = try_parse("(?|(a)|(b)(c))", &Syntax::ONIGURUMA).unwrap();
    assert_eq!(ast.num_captures, 2);
    insta::assert_snapshot!(ast.dump(), @r#"
    Group
      Alternation
        Capture 1
          Literal "a"
        Sequence
          Capture 1
            Literal "b"
          Capture 2
            Literal "c"
    "#);
}

#[test]
fn conditional_on_group() {
    insta::assert_snapshot!(dump("(a)?(?(1)b|c)"), @r#"
    Sequence
      Quantifier {0,1} greedy
        Capture 1
          Literal "a"
      Conditional 1 -> [1]
        Literal "b"
        Literal "c"
    "#);
}

#[test]
fn lookbehind_and_absent() {
    insta::assert_snapshot!(dump("(?<=a)b(?~c)"), @r#"
    Sequence
      Look positive behind
        Literal "a"
      Literal "b"
      Absent
        Literal "c"
    "#);
}

#[test]
fn relative_backref_and_calls() {
    insta::assert_snapshot!(dump(r"(a)(b)\k<-1>\g<1>(?R)"), @r#"
    Sequence
      Capture 1
        Literal "a"
      Capture 2
        Literal "b"
      BackRef 2 -> [2]
      Call 1 -> 1
      Call 0 -> 0
    "#);
}

#[test]
fn escapes_become_literal_bytes() {
    insta::assert_snapshot!(dump(r"\x41é\t"), @r#"Literal "Aé\t""#);
}

#[test]
fn quoted_text_splits_before_quantifier() {
    insta::assert_snapshot!(dump_with(r"\Qa.b\E+", &Syntax::PERL), @r#"
    Sequence
      Literal "a."
      Quantifier {1,inf} greedy
        Literal "b"
    "#);
}

#[test]
fn posix_basic_escaped_operators() {
    insta::assert_snapshot!(dump_with(r"\(a\)\{2\}", &Syntax::POSIX_BASIC), @r#"
    Quantifier {2,2} greedy
      Capture 1
        Literal "a"
    "#);
}

#[test]
fn char_types() {
    insta::assert_snapshot!(dump(r"\w\D\p{^Alpha}"), @r#"
    Sequence
      CharType word
      CharType ^digit
      CharType ^alpha
    "#);
}

#[test]
fn rejects_malformed_patterns() {
    let onig = Syntax::ONIGURUMA;
    assert_eq!(error_code("a)", &onig), -116);
    assert_eq!(error_code("(a", &onig), -117);
    assert_eq!(error_code("[a", &onig), -103);
    assert_eq!(error_code("a{3,2}", &onig), -202);
    assert_eq!(error_code("*a", &onig), -113);
    assert_eq!(error_code("[b-a]", &onig), -203);
    assert_eq!(error_code("(?z)", &onig), -119);
    assert_eq!(error_code(r"\p{Nope}", &onig), -223);
    assert_eq!(error_code("a\\", &onig), -104);
    assert_eq!(error_code("(?<1a>x)", &onig), -216);
    assert_eq!(error_code("(?<>x)", &onig), -214);
    assert_eq!(error_code("(?(1)a|b|c)", &onig), -224);
    assert_eq!(error_code("[[:foo:]]", &onig), -121);
    assert_eq!(error_code("a**", &Syntax::PERL), -115);
}

#[test]
fn rejects_bad_references() {
    let onig = Syntax::ONIGURUMA;
    assert_eq!(error_code(r"\1", &onig), -208);
    assert_eq!(error_code(r"(?<a>x)\k<nope>", &onig), -217);
    assert_eq!(error_code(r"\g<1>", &onig), -218);
    assert_eq!(error_code(r"(a)(?<n>b)\1", &onig), -209);
    assert_eq!(error_code(r"(?<x>a)(?<x>b)\g<x>", &onig), -220);
    assert_eq!(error_code("(?<a>x)(?<a>y)", &Syntax::JAVA), -219);
}

#[test]
fn error_spans_point_at_the_culprit() {
    let err = try_parse("ab)", &Syntax::ONIGURUMA).unwrap_err();
    assert_eq!(err.span, 2..3);
    let err = try_parse("x(?<a>y)\\k<b>", &Syntax::ONIGURUMA).unwrap_err();
    assert_eq!(err.offset(), 8);
}

#[test]
fn depth_limit() {
    let pattern = "(".repeat(20) + &")".repeat(20);
    let limits = CompileLimits::default().parse_depth(10);
    let err = parse(
        pattern.as_bytes(),
        &Syntax::ONIGURUMA,
        Options::empty(),
        &UTF8,
        &limits,
    )
    .unwrap_err();
    assert_eq!(err.code(), -16);
}

#[test]
fn too_many_captures() {
    let pattern = "(a)".repeat(5);
    let limits = CompileLimits::default().max_captures(4);
    let err = parse(
        pattern.as_bytes(),
        &Syntax::ONIGURUMA,
        Options::empty(),
        &UTF8,
        &limits,
    )
    .unwrap_err();
    assert_eq!(err.code(), -210);
}
