//! Matching behavior through the public API.

use std::time::Duration;

use crate::{Interrupt, MatchLimits, Regex, SearchOutcome};

fn spans(pattern: &str, subject: &str) -> Option<Vec<Option<(usize, usize)>>> {
    let re = Regex::new(pattern).expect("pattern should compile");
    let caps = re.captures(subject).expect("search should stay within limits")?;
    Some(caps.iter().map(|m| m.map(|m| (m.start(), m.end()))).collect())
}

#[test]
fn two_groups_split_the_match() {
    assert_eq!(
        spans("(a)(b)", "ab"),
        Some(vec![Some((0, 2)), Some((0, 1)), Some((1, 2))])
    );
}

#[test]
fn backref_forces_a_shorter_greedy_capture() {
    assert_eq!(spans(r"(a*)\1", "aaaa"), Some(vec![Some((0, 4)), Some((0, 2))]));
}

#[test]
fn empty_loop_terminates() {
    let re = Regex::new("()*").expect("pattern should compile");
    let found = re.find("").expect("search should stay within limits");
    assert_eq!(found.map(|m| m.range()), Some(0..0));
}

#[test]
fn atomic_group_does_not_retry() {
    let re = Regex::new("(?>a|ab)c").expect("pattern should compile");
    assert!(!re.is_match("abc").expect("search should stay within limits"));
}

#[test]
fn lookbehind_needs_the_preceding_text() {
    let re = Regex::new("(?<=a)b").expect("pattern should compile");
    assert_eq!(re.find("ab").unwrap().map(|m| m.range()), Some(1..2));
    assert_eq!(re.find("b").unwrap(), None);
}

#[test]
fn named_backref_follows_the_participating_alternative() {
    let re = Regex::new(r"(?:(?<x>abc)|(?<x>efg))\k<x>").expect("pattern should compile");
    let caps = re
        .captures("abcefgefg")
        .expect("search should stay within limits")
        .expect("pattern should match");
    assert_eq!(caps.whole().range(), 3..9);
    assert_eq!(caps.name("x").map(|m| m.range()), Some(3..6));
    assert_eq!(caps.get(1), None);
}

#[test]
fn interrupt_cancels_a_pathological_search() {
    let interrupt = Interrupt::new();
    let re = Regex::builder(r"(a|a)*\1c")
        .match_limits(MatchLimits::new().retry_limit(0).interrupt_interval(256))
        .interrupt(interrupt.clone())
        .build()
        .expect("pattern should compile");
    let subject = "a".repeat(64);

    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        interrupt.trigger();
    });
    assert_eq!(re.search(&subject), Ok(SearchOutcome::Interrupted));
    trigger.join().expect("trigger thread should not panic");
}

#[test]
fn repeated_searches_give_identical_regions() {
    let re = Regex::new(r"(?<w>\w+)\s+\k<w>|(x)").expect("pattern should compile");
    let subject = "it is is fine";
    let first = re.search(subject).expect("search should stay within limits");
    for _ in 0..3 {
        assert_eq!(re.search(subject), Ok(first.clone()));
    }
    assert_eq!(first.region().map(|r| r.whole().range()), Some(3..8));
}

#[test]
fn regex_is_shared_across_threads() {
    let re = Regex::new(r"\d+").expect("pattern should compile");
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let re = re.clone();
            std::thread::spawn(move || {
                let subject = format!("n{}", "7".repeat(i + 1));
                re.find(&subject).unwrap().map(|m| m.len())
            })
        })
        .collect();
    let lens: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(lens, [Some(1), Some(2), Some(3), Some(4)]);
}
