//! Instruction semantics, exercised through compiled patterns.

use std::time::Duration;

use retrace_bytecode::Program;
use retrace_compiler::CompileLimits;
use retrace_core::{Options, SearchOptions, Syntax, UTF8};

use super::{Interrupt, MatchLimits, RuntimeError, SearchOutcome, VM};

type Spans = Vec<Option<(usize, usize)>>;

fn compile_with(pattern: &str, options: Options) -> Program {
    retrace_compiler::compile(
        pattern.as_bytes(),
        &Syntax::ONIGURUMA,
        options,
        &UTF8,
        &CompileLimits::default(),
    )
    .expect("pattern should compile")
}

fn compile(pattern: &str) -> Program {
    compile_with(pattern, Options::empty())
}

fn spans_in(program: &Program, subject: &str, options: SearchOptions) -> Option<Spans> {
    let mut vm = VM::builder(program, subject.as_bytes()).build();
    let outcome = vm
        .search_with(0, subject.len(), options, &mut super::NoopTracer)
        .expect("search should stay within limits");
    let region = outcome.into_region()?;
    Some(region.iter().map(|s| s.map(|s| (s.start, s.end))).collect())
}

/// Spans of every group of the first match, group 0 first.
fn spans(pattern: &str, subject: &str) -> Option<Spans> {
    spans_in(&compile(pattern), subject, SearchOptions::empty())
}

/// Whole-match span of the first match.
fn find(pattern: &str, subject: &str) -> Option<(usize, usize)> {
    spans(pattern, subject).and_then(|s| s[0])
}

#[test]
fn groups_report_their_spans() {
    assert_eq!(spans("(a)(b)", "ab"), Some(vec![Some((0, 2)), Some((0, 1)), Some((1, 2))]));
    assert_eq!(spans("b(a+)", "xbaa"), Some(vec![Some((1, 4)), Some((2, 4))]));
}

#[test]
fn unmatched_group_is_unset() {
    assert_eq!(spans("(a)|(b)", "b"), Some(vec![Some((0, 1)), None, Some((0, 1))]));
}

#[test]
fn alternation_prefers_leftmost_branch() {
    assert_eq!(find("a|ab", "ab"), Some((0, 1)));
    assert_eq!(find("ab|a", "ab"), Some((0, 2)));
}

#[test]
fn greedy_and_lazy_quantifiers() {
    assert_eq!(find("a+", "aaa"), Some((0, 3)));
    assert_eq!(find("a+?", "aaa"), Some((0, 1)));
    assert_eq!(find("a*?b", "aab"), Some((0, 3)));
    assert_eq!(find("a{2,3}", "aaaa"), Some((0, 3)));
    assert_eq!(find("a{2,3}?", "aaaa"), Some((0, 2)));
}

#[test]
fn counted_loops() {
    let subject = "ab".repeat(31);
    assert_eq!(find("(?:ab){30}", &subject), Some((0, 60)));
    assert_eq!(find("a{3,100}b", "aaaab"), Some((0, 5)));
    assert_eq!(find("a{3,100}?", "aaaaa"), Some((0, 3)));
    assert_eq!(find("a{3,}", "aa"), None);
    assert_eq!(find("(?:a{2}){40,60}", &"a".repeat(90)), Some((0, 90)));
}

#[test]
fn backref_retries_shorter_captures() {
    assert_eq!(spans(r"(a*)\1", "aaaa"), Some(vec![Some((0, 4)), Some((0, 2))]));
    assert_eq!(find(r"(a+)b\1", "aaba"), Some((1, 4)));
}

#[test]
fn backref_to_unset_group_fails() {
    assert_eq!(find(r"(?:(a)|b)\1", "b"), None);
}

#[test]
fn multiplexed_name_follows_the_participating_group() {
    let program = compile(r"(?:(?<x>abc)|(?<x>efg))\k<x>");
    let got = spans_in(&program, "abcefgefg", SearchOptions::empty());
    assert_eq!(got, Some(vec![Some((3, 9)), None, Some((3, 6))]));
}

#[test]
fn case_insensitive_matching() {
    let program = compile_with("abc", Options::IGNORECASE);
    assert_eq!(
        spans_in(&program, "xABC", SearchOptions::empty()),
        Some(vec![Some((1, 4))])
    );
    assert_eq!(find(r"(?i)(a)\1", "aA"), Some((0, 2)));
    assert_eq!(find(r"(?i:[a-c]+)", "xBcA"), Some((1, 4)));
}

#[test]
fn line_and_buffer_anchors() {
    assert_eq!(find("^b", "a\nb"), Some((2, 3)));
    assert_eq!(find("a$", "a\nb"), Some((0, 1)));
    assert_eq!(find(r"\Aa", "ba"), None);
    assert_eq!(find(r"a\z", "a\n"), None);
    assert_eq!(find(r"a\Z", "a\n"), Some((0, 1)));
}

#[test]
fn word_boundaries() {
    assert_eq!(find(r"\bfoo\b", "a foo b"), Some((2, 5)));
    assert_eq!(find(r"\bfoo\b", "afoo"), None);
    assert_eq!(find(r"\Boo", "foo"), Some((1, 3)));
}

#[test]
fn dot_star_backtracks_to_the_last_literal() {
    assert_eq!(find(".*a", "xaya"), Some((0, 4)));
    assert_eq!(find(".*a", "b\nxa"), Some((2, 4)));
    assert_eq!(find("(?m).*a", "b\nxa"), Some((0, 4)));
}

#[test]
fn null_loop_terminates() {
    assert_eq!(find("()*", ""), Some((0, 0)));
    assert_eq!(find("(?:a|)*", "aab"), Some((0, 2)));
    assert_eq!(find("(?:a*)*b", "aab"), Some((0, 3)));
}

#[test]
fn atomic_group_commits() {
    assert_eq!(find("(?>a|ab)c", "abc"), None);
    assert_eq!(find("(?>ab|a)c", "abc"), Some((0, 3)));
    assert_eq!(find("(?>a+)a", "aaa"), None);
    assert_eq!(find("a++a", "aa"), None);
}

#[test]
fn lookahead() {
    assert_eq!(find("a(?=b)", "acab"), Some((2, 3)));
    assert_eq!(find("a(?!b)", "abac"), Some((2, 3)));
    assert_eq!(spans("(?=(a))a", "a"), Some(vec![Some((0, 1)), Some((0, 1))]));
}

#[test]
fn lookbehind() {
    assert_eq!(find("(?<=a)b", "ab"), Some((1, 2)));
    assert_eq!(find("(?<=a)b", "b"), None);
    assert_eq!(find("(?<=a)b", "cbab"), Some((3, 4)));
    assert_eq!(find("(?<!a)b", "abcb"), Some((3, 4)));
    assert_eq!(find("(?<=a|bc)d", "xbcd"), Some((3, 4)));
}

#[test]
fn conditional_on_group() {
    assert_eq!(find("(a)?(?(1)b|c)", "ab"), Some((0, 2)));
    assert_eq!(find("(a)?(?(1)b|c)", "c"), Some((0, 1)));
    assert_eq!(find("^(a)?(?(1)b|c)$", "ac"), None);
}

#[test]
fn keep_moves_the_reported_start() {
    assert_eq!(find(r"a\Kb", "ab"), Some((1, 2)));
    assert_eq!(find(r"(?:x\K)*y", "xxy"), Some((2, 3)));
}

#[test]
fn recursion_restores_the_outer_capture() {
    assert_eq!(
        spans(r"(?<p>a\g<p>?b)", "aaabbb"),
        Some(vec![Some((0, 6)), Some((0, 6))])
    );
    assert_eq!(find(r"(?<p>a\g<p>?b)", "aabbb"), Some((0, 4)));
}

#[test]
fn whole_pattern_recursion_matches_balanced_parens() {
    assert_eq!(find(r"\((?:[^()]|\g<0>)*\)", "x(a(b)c)y"), Some((1, 8)));
    assert_eq!(find(r"\((?:[^()]|\g<0>)*\)", "(()"), Some((1, 3)));
}

#[test]
fn absent_takes_the_longest_span_without_the_body() {
    assert_eq!(find("(?~ab)", "cabd"), Some((0, 2)));
    assert_eq!(find(r"/\*(?~\*/)\*/", "/* x */ y */"), Some((0, 7)));
}

#[test]
fn capture_history_keeps_every_iteration() {
    let program = compile_with("(a)+", Options::CAPTURE_HISTORY);
    let mut vm = VM::builder(&program, b"aaa").build();
    let region = vm
        .search()
        .expect("search should stay within limits")
        .into_region()
        .expect("pattern should match");
    assert_eq!(region.pos(1).map(|s| (s.start, s.end)), Some((2, 3)));
    let history: Vec<(usize, usize)> = region
        .history(1)
        .expect("history is recorded")
        .iter()
        .map(|s| (s.start, s.end))
        .collect();
    assert_eq!(history, [(0, 1), (1, 2), (2, 3)]);
    assert_eq!(region.history(0).map(<[_]>::len), Some(1));
}

#[test]
fn history_is_absent_by_default() {
    let program = compile("(a)+");
    let mut vm = VM::builder(&program, b"aa").build();
    let region = vm.search().unwrap().into_region().unwrap();
    assert!(region.history(1).is_none());
}

#[test]
fn find_longest_scans_every_alternative() {
    let program = compile("a|ab|abc");
    assert_eq!(
        spans_in(&program, "abc", SearchOptions::FIND_LONGEST),
        Some(vec![Some((0, 3))])
    );
    assert_eq!(spans_in(&program, "abc", SearchOptions::empty()), Some(vec![Some((0, 1))]));
}

#[test]
fn find_longest_prefers_earlier_start_on_ties() {
    let program = compile("b|ab|a");
    assert_eq!(
        spans_in(&program, "abab", SearchOptions::FIND_LONGEST),
        Some(vec![Some((0, 2))])
    );
}

#[test]
fn find_not_empty_skips_empty_matches() {
    let program = compile("a*");
    assert_eq!(
        spans_in(&program, "baa", SearchOptions::FIND_NOT_EMPTY),
        Some(vec![Some((1, 3))])
    );
    assert_eq!(spans_in(&program, "bbb", SearchOptions::FIND_NOT_EMPTY), None);
    assert_eq!(spans_in(&program, "baa", SearchOptions::empty()), Some(vec![Some((0, 0))]));
}

#[test]
fn notbol_and_noteol() {
    let program = compile("^a$");
    assert_eq!(spans_in(&program, "a", SearchOptions::NOTBOL), None);
    assert_eq!(spans_in(&program, "a", SearchOptions::NOTEOL), None);
    assert_eq!(spans_in(&program, "a", SearchOptions::empty()), Some(vec![Some((0, 1))]));
}

fn fails_within_budget(pattern: &str, subject: &str) {
    let program = compile(pattern);
    let mut vm = VM::builder(&program, subject.as_bytes())
        .retry_limit(200_000)
        .build();
    assert_eq!(vm.search(), Ok(SearchOutcome::NoMatch), "{pattern}");
}

#[test]
fn explosion_guard_covers_two_levels() {
    fails_within_budget("(a*)*b", &"a".repeat(40));
}

#[test]
fn explosion_guard_covers_three_levels() {
    let subject = "a".repeat(30) + "c";
    fails_within_budget("(?:(?:a*)*)*b", &subject);
    fails_within_budget("(?:(?:(?:a+)*)+)*b", &subject);
}

#[test]
fn explosion_guard_covers_alternation_bodies() {
    let subject = "a".repeat(30) + "c";
    fails_within_budget("(?:(?:a|a)+)+b", &subject);
    fails_within_budget("(?:(?:a|a)*)*b", &subject);
}

#[test]
fn guarded_loops_still_find_matches() {
    assert_eq!(spans("(?:(?:a*)*)*b", "aaab"), Some(vec![Some((0, 4))]));
    assert_eq!(spans("(?:(?:a|a)+)+b", "xaab"), Some(vec![Some((1, 4))]));
    assert_eq!(spans("(?:a*|b)*c", "aabac"), Some(vec![Some((0, 5))]));
    assert_eq!(spans("(?:(?:a*)*b)*c", "aabbabc"), Some(vec![Some((0, 7))]));
    assert_eq!(spans("(?:x?(?:a*)*)*y", "xaaxay"), Some(vec![Some((0, 6))]));
}

#[test]
fn retry_limit_aborts_the_search() {
    let program = compile(r"(a|a)*\1c");
    let subject = "a".repeat(30);
    let mut vm = VM::builder(&program, subject.as_bytes())
        .retry_limit(1000)
        .build();
    assert_eq!(vm.search(), Err(RuntimeError::RetryLimitInMatch(1000)));
}

#[test]
fn search_retry_limit_spans_offsets() {
    let program = compile("a+b");
    let subject = "a".repeat(50);
    let limits = MatchLimits::new().search_retry_limit(100);
    let mut vm = VM::builder(&program, subject.as_bytes()).limits(limits).build();
    assert_eq!(vm.search(), Err(RuntimeError::RetryLimitInSearch(100)));
}

#[test]
fn recursion_limit_aborts_the_search() {
    let program = compile(r"(?<p>a\g<p>?b)");
    let mut vm = VM::builder(&program, b"aaaaabbbbb").recursion_limit(3).build();
    assert_eq!(vm.search(), Err(RuntimeError::RecursionLimitExceeded(3)));
}

#[test]
fn stack_limit_aborts_the_search() {
    let program = compile("a*b");
    let subject = "a".repeat(100);
    let limits = MatchLimits::new().stack_limit(10);
    let mut vm = VM::builder(&program, subject.as_bytes()).limits(limits).build();
    assert_eq!(vm.search(), Err(RuntimeError::StackLimitExceeded(10)));
}

#[test]
fn triggered_interrupt_stops_before_matching() {
    let program = compile("a");
    let interrupt = Interrupt::new();
    interrupt.trigger();
    let mut vm = VM::builder(&program, b"a").interrupt(interrupt.clone()).build();
    assert_eq!(vm.search(), Ok(SearchOutcome::Interrupted));

    interrupt.reset();
    assert!(vm.search().expect("search should stay within limits").is_match());
}

#[test]
fn interrupt_stops_a_runaway_search() {
    let program = compile(r"(a|a)*\1c");
    let subject = "a".repeat(64);
    let interrupt = Interrupt::new();
    let limits = MatchLimits::new().retry_limit(0).interrupt_interval(64);
    let mut vm = VM::builder(&program, subject.as_bytes())
        .limits(limits)
        .interrupt(interrupt.clone())
        .build();

    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        interrupt.trigger();
    });
    assert_eq!(vm.search(), Ok(SearchOutcome::Interrupted));
    trigger.join().expect("trigger thread should not panic");
}

#[test]
fn repeated_searches_are_identical() {
    let program = compile(r"(?<w>\w+)\s+\k<w>");
    let mut vm = VM::builder(&program, b"say hello hello world".as_slice()).build();
    let first = vm.search().expect("search should stay within limits");
    let second = vm.search().expect("search should stay within limits");
    assert!(first.is_match());
    assert_eq!(first, second);
}

#[test]
fn limits_builder() {
    let limits = MatchLimits::new()
        .retry_limit(5)
        .search_retry_limit(6)
        .recursion_limit(7)
        .stack_limit(8)
        .interrupt_interval(0);
    assert_eq!(limits.get_retry_limit(), 5);
    assert_eq!(limits.get_search_retry_limit(), 6);
    assert_eq!(limits.get_recursion_limit(), 7);
    assert_eq!(limits.get_stack_limit(), 8);
    assert_eq!(limits.get_interrupt_interval(), 1);
    assert_eq!(MatchLimits::default().get_retry_limit(), 10_000_000);
}
