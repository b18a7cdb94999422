use retrace_core::{Syntax, UTF8};

use super::{Analysis, analyze};
use crate::diagnostics::SyntaxError;
use crate::limits::CompileLimits;
use crate::parser::{Ast, parse};

fn analyzed(pattern: &str, syntax: &Syntax) -> Result<(Ast, Analysis), SyntaxError> {
    let mut ast = parse(
        pattern.as_bytes(),
        syntax,
        syntax.options,
        &UTF8,
        &CompileLimits::default(),
    )?;
    let analysis = analyze(&mut ast, syntax, &UTF8)?;
    Ok((ast, analysis))
}

fn onig(pattern: &str) -> (Ast, Analysis) {
    analyzed(pattern, &Syntax::ONIGURUMA).expect("pattern should analyze")
}

fn error_code(pattern: &str, syntax: &Syntax) -> i32 {
    analyzed(pattern, syntax)
        .expect_err("pattern should be rejected")
        .code()
}

#[test]
fn lengths_and_flags() {
    let (ast, _) = onig("a(bc)*d");
    insta::assert_snapshot!(ast.dump_with_info(), @r#"
    Sequence  [2..inf bytes>=2 HAS_CAPTURE]
      Literal "a"  [1..1 bytes>=1 FIXED_LEN]
      Quantifier {0,inf} greedy  [0..inf bytes>=0 HAS_CAPTURE]
        Capture 1  [2..2 bytes>=2 FIXED_LEN HAS_CAPTURE]
          Literal "bc"  [2..2 bytes>=2 FIXED_LEN]
      Literal "d"  [1..1 bytes>=1 FIXED_LEN]
    "#);
}

#[test]
fn multibyte_literal_counts_chars() {
    let (ast, _) = onig("日本");
    assert_eq!(ast.root.info.min_chars, 2);
    assert_eq!(ast.root.info.max_chars, Some(2));
    assert_eq!(ast.root.info.min_bytes, 6);
}

#[test]
fn ignore_case_literal_allows_fold_expansion() {
    let (ast, _) = onig("(?i)ss");
    assert_eq!(ast.root.info.min_chars, 1);
    assert_eq!(ast.root.info.max_chars, Some(2));
    assert!(!ast.root.info.is_fixed());
}

#[test]
fn alternation_and_interval_bounds() {
    let (ast, _) = onig("(?:ab|c){2,3}");
    assert_eq!(ast.root.info.min_chars, 2);
    assert_eq!(ast.root.info.max_chars, Some(6));
}

#[test]
fn backref_is_unbounded() {
    let (ast, _) = onig(r"(a)\1");
    assert_eq!(ast.root.info.min_chars, 1);
    assert_eq!(ast.root.info.max_chars, None);
}

#[test]
fn quantifier_depth() {
    let (ast, _) = onig("(a*)*b+");
    assert_eq!(ast.root.info.depth, 2);
    let (ast, _) = onig("a{2,5}b?");
    assert_eq!(ast.root.info.depth, 0);
}

#[test]
fn variable_lookbehind_allowed_natively() {
    assert!(analyzed("(?<=a{1,3})x", &Syntax::ONIGURUMA).is_ok());
    assert!(analyzed("(?<=a|b{2,4})x", &Syntax::ONIGURUMA).is_ok());
}

#[test]
fn unbounded_lookbehind_rejected() {
    assert_eq!(error_code("(?<=a+)b", &Syntax::ONIGURUMA), -122);
    assert_eq!(error_code("(?<!a*)b", &Syntax::ONIGURUMA), -122);
    assert_eq!(error_code("(?<=x(?:ab)*)b", &Syntax::PERL), -122);
}

#[test]
fn ruby_needs_fixed_lookbehind() {
    assert_eq!(error_code("(?<=a+)x", &Syntax::RUBY), -122);
    assert_eq!(error_code("(?<=a(?~b))x", &Syntax::ONIGURUMA), -122);
    assert_eq!(error_code(r"(?<=\g<1>)(a)", &Syntax::ONIGURUMA), -122);
}

#[test]
fn lookbehind_alternation_is_split() {
    let (ast, _) = analyzed("(?<=a|bc)x", &Syntax::RUBY).unwrap();
    insta::assert_snapshot!(ast.dump(), @r#"
    Sequence
      Alternation
        Look positive behind
          Literal "a"
        Look positive behind
          Literal "bc"
      Literal "x"
    "#);
}

#[test]
fn negative_lookbehind_alternation_is_split_into_sequence() {
    let (ast, _) = analyzed("(?<!a|bc)", &Syntax::RUBY).unwrap();
    insta::assert_snapshot!(ast.dump(), @r#"
    Sequence
      Look negative behind
        Literal "a"
      Look negative behind
        Literal "bc"
    "#);
}

#[test]
fn recursive_group_is_marked() {
    let (_, analysis) = onig(r"(?<p>\(\g<p>*\))");
    assert!(analysis.calls.is_called(1));
    assert!(analysis.calls.is_recursive(1));
    assert!(!analysis.calls.is_called(0));
}

#[test]
fn plain_call_is_not_recursive() {
    let (_, analysis) = onig(r"(?<a>x\g<b>)(?<b>y)");
    assert!(analysis.calls.is_called(2));
    assert!(!analysis.calls.is_recursive(2));
    assert!(!analysis.calls.is_called(1));
}

#[test]
fn whole_pattern_recursion() {
    let (_, analysis) = onig("a(?R)?b");
    assert!(analysis.calls.is_called(0));
    assert!(analysis.calls.is_recursive(0));
}

#[test]
fn never_ending_recursion() {
    assert_eq!(error_code(r"(?<a>a\g<a>)", &Syntax::ONIGURUMA), -221);
    assert_eq!(error_code(r"(?<a>\g<a>b|c)", &Syntax::ONIGURUMA), -221);
    assert_eq!(error_code(r"(?<a>\g<b>)(?<b>\g<a>)", &Syntax::ONIGURUMA), -221);
}

#[test]
fn mutual_recursion_with_exit_is_fine() {
    let (_, analysis) = onig(r"(?<a>x\g<b>)(?<b>y\g<a>|z)");
    assert!(analysis.calls.is_recursive(1));
    assert!(analysis.calls.is_recursive(2));
}
