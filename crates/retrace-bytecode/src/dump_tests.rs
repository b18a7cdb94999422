use indoc::indoc;
use retrace_core::{Colors, UTF8};

use crate::{Addr, AnchorHint, Instr, NameTable, Program, ProgramMeta, RepeatInfo, SearchHints, dump};

fn alternation() -> Program {
    let code = vec![
        Instr::Push(Addr(3)),
        Instr::Byte(b'a'),
        Instr::Jump(Addr(4)),
        Instr::Str(b"bc".to_vec().into_boxed_slice()),
        Instr::End,
    ];
    Program::new(code, ProgramMeta::default(), &UTF8).unwrap()
}

#[test]
fn dump_plain_code() {
    insta::assert_snapshot!(dump(&alternation(), Colors::OFF), @r#"
    [code]
    0  push             @3
    1  byte             "a"
    2  jump             @4
    3  str              "bc"
    4  end
    "#);
}

#[test]
fn dump_tables_and_hints() {
    let code = vec![
        Instr::MemStartPush(1),
        Instr::Repeat(0),
        Instr::Byte(b'a'),
        Instr::RepeatInc(0),
        Instr::MemEndPush(1),
        Instr::End,
    ];
    let mut names = NameTable::new();
    names.insert("word", 1);
    let meta = ProgramMeta {
        repeats: vec![RepeatInfo {
            min: 2,
            max: Some(40),
            greedy: true,
            body: Addr(2),
            exit: Addr(4),
        }],
        names,
        num_captures: 1,
        hints: SearchHints {
            anchor: AnchorHint::BEGIN_BUF,
            prefix: Some(b"aa".to_vec().into_boxed_slice()),
            first_bytes: None,
            min_len: 2,
        },
        ..ProgramMeta::default()
    };
    let program = Program::new(code, meta, &UTF8).unwrap();
    let expected = indoc! {r#"
        [code]
        0  mem-start-push   1
        1  repeat           0
        2  byte             "a"
        3  repeat-inc       0
        4  mem-end-push     1
        5  end
        [repeats]
        0  {2,40} greedy body @2 exit @4
        [names]
        word  1
        [hints]
        anchor begin-buf
        prefix "aa"
        min-len 2
    "#};
    assert_eq!(dump(&program, Colors::OFF), expected);
}

#[test]
fn dump_colors_wrap_opcodes() {
    let out = dump(&alternation(), Colors::ON);
    assert!(out.contains("\x1b[34mpush"));
    assert!(out.starts_with("\x1b[34m[code]\x1b[0m\n"));
}
