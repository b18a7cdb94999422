use retrace_bytecode::Addr;

use super::captures::Slot;
use super::frame::{CallState, Frame, FrameStack};

fn alt(ip: u32) -> Frame {
    Frame::Alt { ip: Addr(ip), pos: 0 }
}

fn call(ret: u32) -> Frame {
    Frame::Call {
        ret: Addr(ret),
        subexp: 0,
        saved: Box::new(CallState {
            starts: vec![],
            counts: vec![],
        }),
    }
}

fn ret() -> Frame {
    Frame::Return {
        subexp: 0,
        undo: Box::new(CallState {
            starts: vec![],
            counts: vec![],
        }),
    }
}

#[test]
fn saved_pos_finds_the_innermost_mark() {
    let mut stack = FrameStack::new();
    stack.push(Frame::SavedPos { mark: 0, pos: 1 });
    stack.push(alt(5));
    stack.push(Frame::SavedPos { mark: 1, pos: 3 });

    assert_eq!(stack.saved_pos(0), Some((0, 1)));
    assert_eq!(stack.saved_pos(1), Some((2, 3)));
    assert_eq!(stack.saved_pos(2), None);
}

#[test]
fn lookups_stop_at_the_enclosing_call() {
    let mut stack = FrameStack::new();
    stack.push(Frame::AtomicMark { mark: 0 });
    stack.push(call(4));

    assert_eq!(stack.atomic(0), None);
}

#[test]
fn lookups_skip_finished_invocations() {
    let mut stack = FrameStack::new();
    stack.push(Frame::NullCheck { id: 0, pos: 2 });
    stack.push(call(4));
    stack.push(Frame::NullCheck { id: 0, pos: 7 });
    stack.push(ret());

    assert_eq!(stack.null_check(0), Some((0, 2)));
}

#[test]
fn current_call_skips_returned_calls() {
    let mut stack = FrameStack::new();
    stack.push(call(1));
    stack.push(call(6));
    stack.push(ret());

    let (ret_addr, subexp, _) = stack.current_call().expect("outer call is active");
    assert_eq!(ret_addr, Addr(1));
    assert_eq!(subexp, 0);
}

#[test]
fn cut_drops_choices_and_keeps_undo_records() {
    let mut stack = FrameStack::new();
    stack.push(alt(9));
    stack.push(Frame::AtomicMark { mark: 0 });
    stack.push(alt(3));
    stack.push(Frame::Capture {
        group: 1,
        prev: Slot::default(),
        history: 0,
    });
    stack.push(alt(4));

    let index = stack.atomic(0).expect("mark is on the stack");
    stack.cut(index);

    assert_eq!(stack.len(), 4);
    assert!(matches!(stack.above(0).last(), Some(Frame::Capture { group: 1, .. })));
    assert_eq!(stack.above(0).len(), 3);
    assert!(matches!(stack.above(0)[0], Frame::Void));
    assert!(matches!(stack.above(0)[1], Frame::Void));
}

#[test]
fn cut_at_the_top_leaves_nothing_behind() {
    let mut stack = FrameStack::new();
    stack.push(alt(2));
    stack.push(Frame::SavedPos { mark: 0, pos: 0 });
    stack.push(alt(3));

    stack.cut(1);

    assert_eq!(stack.len(), 1);
    assert!(matches!(stack.pop(), Some(Frame::Alt { ip: Addr(2), .. })));
}
