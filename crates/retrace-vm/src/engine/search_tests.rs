use retrace_bytecode::Program;
use retrace_compiler::CompileLimits;
use retrace_core::{Options, SearchOptions, Syntax, UTF8};

use super::{NoopTracer, SearchOutcome, VM};

fn compile(pattern: &str) -> Program {
    retrace_compiler::compile(
        pattern.as_bytes(),
        &Syntax::ONIGURUMA,
        Options::empty(),
        &UTF8,
        &CompileLimits::default(),
    )
    .expect("pattern should compile")
}

fn search_range(pattern: &str, subject: &str, start: usize, range: usize) -> Option<(usize, usize)> {
    let program = compile(pattern);
    let mut vm = VM::builder(&program, subject.as_bytes()).build();
    let outcome = vm
        .search_with(start, range, SearchOptions::empty(), &mut NoopTracer)
        .expect("search should stay within limits");
    outcome.region().map(|r| (r.whole().start, r.whole().end))
}

fn find(pattern: &str, subject: &str) -> Option<(usize, usize)> {
    search_range(pattern, subject, 0, subject.len())
}

#[test]
fn literal_prefix_is_located() {
    assert_eq!(find("needle", "hay needle hay"), Some((4, 10)));
    assert_eq!(find("needle", "hay needl"), None);
}

#[test]
fn first_byte_set_skips_offsets() {
    assert_eq!(find("[xyz]+", "abcyzx"), Some((3, 6)));
    assert_eq!(find("a|bc", "xxbc"), Some((2, 4)));
    assert_eq!(find("[a-f]1", "zzze1"), Some((3, 5)));
}

#[test]
fn line_anchor_jumps_to_line_starts() {
    assert_eq!(find("^b+", "ab\nbb\nb"), Some((3, 5)));
    assert_eq!(find("^c", "ab\nbb\n"), None);
}

#[test]
fn buffer_anchor_tries_only_offset_zero() {
    assert_eq!(find(r"\Ab", "ab"), None);
    assert_eq!(search_range(r"\Aa", "aa", 1, 2), None);
}

#[test]
fn empty_pattern_matches_at_the_end() {
    assert_eq!(search_range("", "abc", 3, 3), Some((3, 3)));
    assert_eq!(find("x*$", "ab"), Some((2, 2)));
}

#[test]
fn out_of_range_offsets_never_match() {
    assert_eq!(search_range("a", "a", 2, 2), None);
    assert_eq!(search_range("a", "a", 0, 5), None);
}

#[test]
fn range_bounds_the_start_offset() {
    assert_eq!(search_range("b", "aab", 0, 1), None);
    assert_eq!(search_range("b", "aab", 0, 2), Some((2, 3)));
    assert_eq!(search_range("ab", "aab", 1, 1), Some((1, 3)));
}

#[test]
fn backward_search_prefers_the_last_offset() {
    assert_eq!(search_range("a", "aba", 3, 0), Some((2, 3)));
    assert_eq!(search_range("a+", "aab", 3, 0), Some((1, 2)));
    assert_eq!(search_range("b", "aba", 0, 0), None);
    assert_eq!(search_range("^a", "a\na", 3, 0), Some((2, 3)));
}

#[test]
fn search_position_anchor_binds_to_start() {
    assert_eq!(search_range(r"\Ga", "aab", 1, 3), Some((1, 2)));
    assert_eq!(search_range(r"\Ga", "aab", 2, 3), None);
    assert_eq!(search_range(r"\Gb", "aab", 3, 0), None);
}

#[test]
fn multibyte_offsets_stay_on_char_boundaries() {
    assert_eq!(find(".", "é"), Some((0, 2)));
    assert_eq!(search_range(".", "éa", 1, 3), Some((2, 3)));
    assert_eq!(search_range(".", "éa", 3, 0), Some((2, 3)));
}

#[test]
fn match_at_does_not_scan() {
    let program = compile("b");
    let mut vm = VM::builder(&program, b"ab").build();
    assert_eq!(vm.match_at(0), Ok(SearchOutcome::NoMatch));
    let region = vm.match_at(1).expect("within limits").into_region().expect("matches at 1");
    assert_eq!(region.start(0), Some(1));
    assert_eq!(vm.match_at(3), Ok(SearchOutcome::NoMatch));
}
