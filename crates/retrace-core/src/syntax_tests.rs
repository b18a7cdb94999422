use crate::{Options, SearchOptions, Syntax, SyntaxBehavior, SyntaxOperators};

#[test]
fn ruby_has_named_groups_and_absent() {
    let ruby = Syntax::RUBY;
    assert!(ruby.allows(SyntaxOperators::QMARK_LT_NAMED_GROUP));
    assert!(ruby.allows(SyntaxOperators::QMARK_TILDE_ABSENT_GROUP));
    assert!(ruby.behaves(SyntaxBehavior::CAPTURE_ONLY_NAMED_GROUP));
    assert!(!ruby.allows(SyntaxOperators::ESC_CAPITAL_Q_QUOTE));
}

#[test]
fn perl_defaults_to_singleline() {
    assert!(Syntax::PERL.options.contains(Options::SINGLELINE));
    assert!(Syntax::PERL.allows(SyntaxOperators::OPTION_PERL));
    assert!(!Syntax::PERL.allows(SyntaxOperators::QMARK_LT_NAMED_GROUP));
    assert!(Syntax::PERL_NT.allows(SyntaxOperators::QMARK_LT_NAMED_GROUP));
}

#[test]
fn posix_basic_uses_escaped_groups() {
    let basic = Syntax::POSIX_BASIC;
    assert!(basic.allows(SyntaxOperators::ESC_LPAREN_SUBEXP));
    assert!(!basic.allows(SyntaxOperators::LPAREN_SUBEXP));
    assert!(!basic.allows(SyntaxOperators::VBAR_ALT));
}

#[test]
fn posix_presets_take_backrefs_and_control_escapes() {
    for syntax in [Syntax::POSIX_BASIC, Syntax::POSIX_EXTENDED] {
        assert!(syntax.allows(SyntaxOperators::DECIMAL_BACKREF));
        assert!(syntax.allows(SyntaxOperators::ESC_CONTROL_CHARS));
    }
}

#[test]
fn builder_toggles() {
    let syntax = Syntax::RUBY
        .with_behavior(SyntaxBehavior::BACKREF_UNSET_MATCHES_EMPTY, true)
        .with_operator(SyntaxOperators::QMARK_TILDE_ABSENT_GROUP, false);
    assert!(syntax.behaves(SyntaxBehavior::BACKREF_UNSET_MATCHES_EMPTY));
    assert!(!syntax.allows(SyntaxOperators::QMARK_TILDE_ABSENT_GROUP));
    assert_eq!(Syntax::default(), Syntax::ONIGURUMA);
}

#[test]
fn search_defaults_follow_compile_options() {
    let opts = Options::FIND_LONGEST | Options::IGNORECASE;
    assert_eq!(opts.search_defaults(), SearchOptions::FIND_LONGEST);
    assert!(Options::INLINE.contains(Options::EXTEND));
}
