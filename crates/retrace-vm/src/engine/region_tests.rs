use indoc::indoc;
use retrace_bytecode::Program;
use retrace_compiler::CompileLimits;
use retrace_core::{Options, Syntax, UTF8};

use super::{Region, Span, VM};

fn region(pattern: &str, subject: &str) -> (Program, Region) {
    let program = retrace_compiler::compile(
        pattern.as_bytes(),
        &Syntax::ONIGURUMA,
        Options::empty(),
        &UTF8,
        &CompileLimits::default(),
    )
    .expect("pattern should compile");
    let mut vm = VM::builder(&program, subject.as_bytes()).build();
    let region = vm
        .search()
        .expect("search should stay within limits")
        .into_region()
        .expect("pattern should match");
    (program, region)
}

#[test]
fn accessors() {
    let (_, region) = region("(a)|(b)", "xb");
    assert_eq!(region.len(), 3);
    assert!(!region.is_empty());
    assert_eq!(region.whole(), Span::new(1, 2));
    assert_eq!(region.start(0), Some(1));
    assert_eq!(region.end(2), Some(2));
    assert_eq!(region.pos(1), None);
    assert_eq!(region.pos(9), None);
    assert_eq!(region.iter().filter(Option::is_some).count(), 2);
}

#[test]
fn span_helpers() {
    let span = Span::new(2, 5);
    assert_eq!(span.len(), 3);
    assert!(!span.is_empty());
    assert!(Span::new(4, 4).is_empty());
    assert_eq!(std::ops::Range::from(span), 2..5);
}

#[test]
fn named_groups_resolve_against_the_match() {
    let (program, region) = region(r"(?<x>a)|(?<x>b)", "b");
    let names = program.names();
    assert_eq!(region.name_to_group(names, "x"), Some(2));
    assert_eq!(region.named(names, "x"), Some(Span::new(0, 1)));
    assert_eq!(region.named(names, "y"), None);
}

#[test]
fn serializes_to_json() {
    let (_, region) = region("(a)|(b)", "b");
    let json = serde_json::to_string_pretty(&region).expect("region should serialize");
    assert_eq!(
        json,
        indoc! {r#"
            {
              "spans": [
                {
                  "start": 0,
                  "end": 1
                },
                null,
                {
                  "start": 0,
                  "end": 1
                }
              ]
            }"#}
    );
}
