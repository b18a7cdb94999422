use retrace_bytecode::{AnchorHint, Instr, Program, ProgramFlags};
use retrace_core::{Colors, Options, Syntax, UTF8};

use super::generate;
use crate::analyze::analyze;
use crate::limits::CompileLimits;
use crate::parser::parse;

fn compile_with(pattern: &str, syntax: &Syntax, options: Options, limits: &CompileLimits) -> Program {
    let options = syntax.options | options;
    let mut ast = parse(pattern.as_bytes(), syntax, options, &UTF8, limits).expect("pattern should parse");
    let analysis = analyze(&mut ast, syntax, &UTF8).expect("pattern should analyze");
    generate(&ast, &analysis, syntax, options, &UTF8, limits).expect("pattern should compile")
}

fn compile(pattern: &str) -> Program {
    compile_with(pattern, &Syntax::ONIGURUMA, Options::empty(), &CompileLimits::default())
}

fn dump(pattern: &str) -> String {
    compile(pattern).dump(Colors::OFF)
}

#[test]
fn alternation() {
    insta::assert_snapshot!(dump("a|bc"), @r#"
    [code]
    0  push             @3
    1  byte             "a"
    2  jump             @4
    3  str              "bc"
    4  end
    [hints]
    first-bytes "ab"
    min-len 1
    "#);
}

#[test]
fn top_level_groups_use_plain_captures() {
    insta::assert_snapshot!(dump("(a)(b)"), @r#"
    [code]
    0  mem-start        1
    1  byte             "a"
    2  mem-end          1
    3  mem-start        2
    4  byte             "b"
    5  mem-end          2
    6  end
    [hints]
    prefix "a"
    first-bytes "a"
    min-len 2
    "#);
}

#[test]
fn capture_history_logs_every_capture() {
    let program = compile_with(
        "(a)",
        &Syntax::ONIGURUMA,
        Options::CAPTURE_HISTORY,
        &CompileLimits::default(),
    );
    assert!(program.flags().contains(ProgramFlags::CAPTURE_HISTORY));
    insta::assert_snapshot!(program.dump(Colors::OFF), @r#"
    [code]
    0  mem-start-push   1
    1  byte             "a"
    2  mem-end-push     1
    3  end
    [hints]
    prefix "a"
    first-bytes "a"
    min-len 1
    "#);
}

#[test]
fn greedy_star() {
    insta::assert_snapshot!(dump("a*"), @r#"
    [code]
    0  push             @3
    1  byte             "a"
    2  jump             @0
    3  end
    "#);
}

#[test]
fn lazy_star() {
    insta::assert_snapshot!(dump("a*?b"), @r#"
    [code]
    0  push             @2
    1  jump             @4
    2  byte             "a"
    3  jump             @0
    4  byte             "b"
    5  end
    [hints]
    min-len 1
    "#);
}

#[test]
fn greedy_plus_enters_body_first() {
    insta::assert_snapshot!(dump("a+"), @r#"
    [code]
    0  jump             @2
    1  push             @4
    2  byte             "a"
    3  jump             @1
    4  end
    [hints]
    first-bytes "a"
    min-len 1
    "#);
}

#[test]
fn nullable_loop_body_is_null_checked() {
    insta::assert_snapshot!(dump("(?:a|)*"), @r#"
    [code]
    0  push             @7
    1  null-check-start 0
    2  push             @5
    3  byte             "a"
    4  jump             @5
    5  null-check-end   0
    6  jump             @0
    7  end
    "#);
}

#[test]
fn small_interval_is_unrolled() {
    insta::assert_snapshot!(dump("a{2,3}"), @r#"
    [code]
    0  byte             "a"
    1  byte             "a"
    2  push             @4
    3  byte             "a"
    4  end
    [hints]
    first-bytes "a"
    min-len 2
    "#);
}

#[test]
fn large_interval_uses_repeat_table() {
    insta::assert_snapshot!(dump("(?:abc){30}"), @r#"
    [code]
    0  repeat           0
    1  str              "abc"
    2  repeat-inc       0
    3  end
    [repeats]
    0  {30,30} greedy body @1 exit @3
    [hints]
    first-bytes "a"
    min-len 90
    "#);
}

#[test]
fn dot_star_peeks_at_next_literal() {
    insta::assert_snapshot!(dump(".*a"), @r#"
    [code]
    0  any*-peek        "a"
    1  byte             "a"
    2  end
    [hints]
    min-len 1
    "#);
}

#[test]
fn atomic_group() {
    insta::assert_snapshot!(dump("(?>a|ab)c"), @r#"
    [code]
    0  atomic-start     0
    1  push             @4
    2  byte             "a"
    3  jump             @5
    4  str              "ab"
    5  atomic-end       0
    6  byte             "c"
    7  end
    [hints]
    first-bytes "a"
    min-len 2
    "#);
}

#[test]
fn possessive_is_atomic() {
    let program = compile("a++");
    let names: Vec<&str> = program.code().iter().map(|i| i.name()).collect();
    assert_eq!(names, ["atomic-start", "jump", "push", "byte", "jump", "atomic-end", "end"]);
}

#[test]
fn lookbehind_steps_back() {
    insta::assert_snapshot!(dump("(?<=a)b"), @r#"
    [code]
    0  push-pos         0
    1  step-back        1
    2  byte             "a"
    3  pos-check        0
    4  pop-pos          0
    5  byte             "b"
    6  end
    [hints]
    prefix "b"
    first-bytes "b"
    min-len 1
    "#);
    assert!(compile("(?<=a)b").flags().contains(ProgramFlags::HAS_LOOKBEHIND));
}

#[test]
fn negative_lookahead() {
    insta::assert_snapshot!(dump("(?!a)"), @r#"
    [code]
    0  push             @6
    1  push-pos         0
    2  byte             "a"
    3  pop-to-mark      0
    4  pop
    5  fail
    6  end
    "#);
}

#[test]
fn backref_inside_plain_group() {
    insta::assert_snapshot!(dump(r"(a*)\1"), @r#"
    [code]
    0  mem-start        1
    1  push             @4
    2  byte             "a"
    3  jump             @1
    4  mem-end          1
    5  backref          1
    6  end
    "#);
}

#[test]
fn conditional() {
    insta::assert_snapshot!(dump("(a)?(?(1)b|c)"), @r#"
    [code]
    0  push             @4
    1  mem-start-push   1
    2  byte             "a"
    3  mem-end-push     1
    4  cond-ref         1 else @7
    5  byte             "b"
    6  jump             @8
    7  byte             "c"
    8  end
    [hints]
    min-len 1
    "#);
}

#[test]
fn absent_group() {
    insta::assert_snapshot!(dump("(?~ab)"), @r#"
    [code]
    0  absent           @2
    1  jump             @4
    2  str              "ab"
    3  absent-end
    4  end
    "#);
}

#[test]
fn recursive_group_becomes_subroutine() {
    insta::assert_snapshot!(dump(r"(?<p>a\g<p>?b)"), @r#"
    [code]
    0  call             @2 subexp 0
    1  end
    2  mem-start-push   1
    3  byte             "a"
    4  push             @6
    5  call             @2 subexp 0
    6  byte             "b"
    7  mem-end-rec      1
    8  return
    [subexps]
    0  group 1 entry @2 captures 1..2 repeats 0..0
    [names]
    p  1
    [hints]
    prefix "a"
    first-bytes "a"
    min-len 2
    "#);
}

#[test]
fn whole_pattern_call() {
    let program = compile("a(?R)?b");
    assert_eq!(program.subexps().len(), 1);
    assert_eq!(program.subexps()[0].group, 0);
    assert_eq!(program.code()[0].name(), "call");
    assert_eq!(program.code()[1].name(), "end");
    assert!(program.flags().contains(ProgramFlags::HAS_CALL));
}

#[test]
fn nested_stars_guard_every_loop_head() {
    let program = compile("(a*)*");
    assert!(program.flags().contains(ProgramFlags::STATE_CHECK));
    assert_eq!(program.num_state_checks(), 2);
    insta::assert_snapshot!(program.dump(Colors::OFF), @r#"
    [code]
     0  state-check      0
     1  push             @11
     2  null-check-start 0
     3  mem-start-push   1
     4  state-check      1 within 0
     5  push             @8
     6  byte             "a"
     7  jump             @4
     8  mem-end-push     1
     9  null-check-end   0
    10  jump             @0
    11  end
    "#);
}

#[test]
fn three_level_nesting_guards_each_level() {
    let program = compile("(?:(?:a*)*)*b");
    assert_eq!(program.num_state_checks(), 3);
    let guards: Vec<_> = program
        .code()
        .iter()
        .filter_map(|i| match i {
            Instr::StateCheck { id, within } => Some((*id, *within)),
            _ => None,
        })
        .collect();
    assert_eq!(guards, [(0, None), (1, Some(0)), (2, Some(1))]);
}

#[test]
fn lone_loop_stays_unguarded() {
    let program = compile("a*b+c");
    assert_eq!(program.num_state_checks(), 0);
    assert!(!program.flags().contains(ProgramFlags::STATE_CHECK));
}

#[test]
fn explosion_guard_needs_a_pure_pattern() {
    assert!(!compile(r"(a*)*\1").flags().contains(ProgramFlags::STATE_CHECK));
    assert!(!compile("(?>(a*)*)").flags().contains(ProgramFlags::STATE_CHECK));
    let longest = compile_with(
        "(a*)*",
        &Syntax::ONIGURUMA,
        Options::FIND_LONGEST,
        &CompileLimits::default(),
    );
    assert!(!longest.flags().contains(ProgramFlags::STATE_CHECK));
    let disabled = compile_with(
        "(a*)*",
        &Syntax::ONIGURUMA,
        Options::empty(),
        &CompileLimits::new().explosion_depth(0),
    );
    assert_eq!(disabled.num_state_checks(), 0);
}

#[test]
fn null_check_tracks_captures_when_backrefs_exist() {
    let program = compile(r"(a|)*\1");
    let ends: Vec<String> = program
        .code()
        .iter()
        .filter(|i| i.name() == "null-check-end")
        .map(retrace_bytecode::format_operands)
        .collect();
    assert_eq!(ends, ["0 captures"]);
}

#[test]
fn keep_sets_flag() {
    assert!(compile(r"a\Kb").flags().contains(ProgramFlags::HAS_KEEP));
}

#[test]
fn anchor_hints() {
    let program = compile(r"\Aabc");
    assert_eq!(program.hints().anchor, AnchorHint::BEGIN_BUF);
    assert_eq!(program.hints().prefix.as_deref(), Some(&b"abc"[..]));

    assert_eq!(compile("^a|^b").hints().anchor, AnchorHint::BEGIN_LINE);
    assert_eq!(compile("^a|b").hints().anchor, AnchorHint::empty());
    assert_eq!(compile(r"\Gx").hints().anchor, AnchorHint::BEGIN_POSITION);
}

#[test]
fn class_and_case_fold_first_bytes() {
    let class = compile("[a-c]x");
    let map = class.hints().first_bytes.expect("class narrows first bytes");
    assert_eq!(map.iter_ones().collect::<Vec<_>>(), [0x61, 0x62, 0x63]);

    assert!(compile("[^a]").hints().first_bytes.is_none());
    assert!(compile("[é]").hints().first_bytes.is_none());

    let folded = compile("(?i)s").hints().first_bytes.expect("fold narrows first bytes");
    assert!(folded[usize::from(b's')]);
    assert!(folded[usize::from(b'S')]);
    assert!(compile("(?i)s").hints().prefix.is_none());
}

#[test]
fn nullable_start_has_no_first_bytes() {
    assert!(compile("a?b").hints().first_bytes.is_none());
    assert!(compile("a|").hints().first_bytes.is_none());
}
