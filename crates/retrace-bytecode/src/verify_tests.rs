use retrace_core::UTF8;

use crate::{Addr, Instr, Program, ProgramError, ProgramMeta, RepeatInfo};

fn build(code: Vec<Instr>, meta: ProgramMeta) -> Result<Program, ProgramError> {
    Program::new(code, meta, &UTF8)
}

#[test]
fn rejects_empty_program() {
    assert_eq!(build(vec![], ProgramMeta::default()).unwrap_err(), ProgramError::Empty);
}

#[test]
fn rejects_fall_through_at_end() {
    let err = build(vec![Instr::Byte(b'a')], ProgramMeta::default()).unwrap_err();
    assert_eq!(err, ProgramError::FallsOffEnd(Addr(0)));
}

#[test]
fn rejects_jump_outside() {
    let err = build(vec![Instr::Push(Addr(9)), Instr::End], ProgramMeta::default()).unwrap_err();
    assert_eq!(
        err,
        ProgramError::AddressOutOfRange {
            at: Addr(0),
            target: Addr(9)
        }
    );
    assert_eq!(err.to_string(), "@0: jump target @9 outside program");
}

#[test]
fn rejects_unknown_group_and_repeat() {
    let err = build(vec![Instr::MemStart(1), Instr::End], ProgramMeta::default()).unwrap_err();
    assert_eq!(err, ProgramError::GroupOutOfRange { at: Addr(0), group: 1 });

    let err = build(vec![Instr::Repeat(0), Instr::End], ProgramMeta::default()).unwrap_err();
    assert_eq!(err, ProgramError::UnknownRepeat { at: Addr(0), id: 0 });
}

#[test]
fn rejects_repeat_layout_outside() {
    let meta = ProgramMeta {
        repeats: vec![RepeatInfo {
            min: 0,
            max: None,
            greedy: true,
            body: Addr(1),
            exit: Addr(7),
        }],
        ..ProgramMeta::default()
    };
    let err = build(vec![Instr::Repeat(0), Instr::End], meta).unwrap_err();
    assert_eq!(err, ProgramError::RepeatLayout { id: 0 });
}

#[test]
fn rejects_unallocated_marks() {
    let err = build(vec![Instr::AtomicStart(0), Instr::End], ProgramMeta::default()).unwrap_err();
    assert_eq!(err, ProgramError::UnknownMark { at: Addr(0), id: 0 });
}

#[test]
fn accepts_well_formed_program() {
    let meta = ProgramMeta {
        num_captures: 1,
        num_marks: 1,
        ..ProgramMeta::default()
    };
    let code = vec![
        Instr::AtomicStart(0),
        Instr::MemStart(1),
        Instr::Byte(b'x'),
        Instr::MemEnd(1),
        Instr::AtomicEnd(0),
        Instr::End,
    ];
    let program = build(code, meta).unwrap();
    assert_eq!(program.len(), 6);
    assert_eq!(program.num_captures(), 1);
}
