//! Invariant checks excluded from coverage reports.
//!
//! A verified program never trips these; reaching one means the compiler
//! and the VM disagree about the shape of the code.

#![cfg_attr(coverage_nightly, coverage(off))]

use retrace_bytecode::{Addr, GroupId};

#[inline]
pub(super) fn ensure_frame<T>(found: Option<T>, what: &str, ip: Addr) -> T {
    match found {
        Some(value) => value,
        None => panic!("broken VM invariant: no {what} frame on the stack at {ip}"),
    }
}

#[inline]
pub(super) fn ensure_group_entered(entered: bool, group: GroupId, ip: Addr) {
    assert!(
        entered,
        "broken VM invariant: group {group} closed at {ip} without being opened",
    );
}
