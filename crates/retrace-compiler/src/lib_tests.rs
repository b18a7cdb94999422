use retrace_core::{Options, Syntax, UTF8};

use crate::{CompileLimits, Error, compile, effective_options};

#[test]
fn dialect_options_are_merged() {
    let opts = effective_options(&Syntax::PERL, Options::IGNORECASE).unwrap();
    assert_eq!(opts, Options::SINGLELINE | Options::IGNORECASE);
}

#[test]
fn negate_single_line_clears_dialect_default() {
    let opts = effective_options(&Syntax::PERL, Options::NEGATE_SINGLE_LINE).unwrap();
    assert_eq!(opts, Options::empty());
}

#[test]
fn conflicting_capture_options_are_rejected() {
    let err = effective_options(
        &Syntax::ONIGURUMA,
        Options::DONT_CAPTURE_GROUP | Options::CAPTURE_GROUP,
    )
    .unwrap_err();
    assert_eq!(err.code(), -403);
}

#[test]
fn syntax_errors_surface_with_code() {
    let err = compile(b"a(b", &Syntax::ONIGURUMA, Options::empty(), &UTF8, &CompileLimits::default())
        .unwrap_err();
    assert!(matches!(err, Error::Syntax(_)));
    assert_eq!(err.code(), -117);
}

#[test]
fn analysis_errors_surface_with_code() {
    let err = compile(
        br"(?<a>a\g<a>)",
        &Syntax::ONIGURUMA,
        Options::empty(),
        &UTF8,
        &CompileLimits::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), -221);
}

#[test]
fn compiled_program_records_options() {
    let program = compile(b"(?<n>x)", &Syntax::RUBY, Options::IGNORECASE, &UTF8, &CompileLimits::default())
        .unwrap();
    assert!(program.options().contains(Options::IGNORECASE));
    assert_eq!(program.names().groups("n"), Some(&[1][..]));
}
