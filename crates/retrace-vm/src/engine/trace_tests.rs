use retrace_bytecode::Program;
use retrace_compiler::CompileLimits;
use retrace_core::{Colors, Options, SearchOptions, Syntax, UTF8};

use super::{PrintTracer, VM, Verbosity};

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

fn trace(pattern: &str, subject: &str, verbosity: Verbosity) -> String {
    let program = compile(pattern);
    let mut tracer = PrintTracer::new(&program, subject.as_bytes(), verbosity, Colors::OFF);
    let mut vm = VM::builder(&program, subject.as_bytes()).build();
    vm.search_with(0, subject.len(), SearchOptions::empty(), &mut tracer)
        .expect("search should stay within limits");
    tracer.output()
}

#[test]
fn default_trace_shows_backtracks() {
    insta::assert_snapshot!(trace("a|bc", "xbc", Verbosity::Default), @r#"
    start 1
    1  0  push             @3
    1  1  byte             "a"
          < backtrack to @3 at 1
    1  3  str              "bc"
    3  4  end
    accept 1..3
    "#);
}

#[test]
fn verbose_trace_shows_alternatives() {
    insta::assert_snapshot!(trace("a|bc", "xbc", Verbosity::Verbose), @r#"
    start 1
    1  0  push             @3
          + alt @3 at 1
    1  1  byte             "a"
          < backtrack to @3 at 1
    1  3  str              "bc"
    3  4  end
    accept 1..3
    "#);
}

#[test]
fn failed_offsets_are_reported() {
    insta::assert_snapshot!(trace(".c", "abc", Verbosity::Default), @r#"
    start 0
    0  0  any
    1  1  byte             "c"
    no match at 0

    start 1
    1  0  any
    2  1  byte             "c"
    3  2  end
    accept 1..3
    "#);
}

#[test]
fn very_verbose_trace_shows_the_subject() {
    let output = trace("b", "ab", Verbosity::VeryVerbose);
    assert!(output.contains(r#"byte             "b"  "b""#), "{output}");
}
