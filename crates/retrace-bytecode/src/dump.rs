//! Human-readable program dump for debugging and tests.

use std::fmt::Write as _;

use retrace_core::Colors;

use crate::instr::Instr;
use crate::program::{AnchorHint, Program};

/// Generate a human-readable dump of a compiled program.
pub fn dump(program: &Program, colors: Colors) -> String {
    let mut out = String::new();
    dump_code(&mut out, program, colors);
    dump_repeats(&mut out, program, colors);
    dump_subexps(&mut out, program, colors);
    dump_names(&mut out, program, colors);
    dump_hints(&mut out, program, colors);
    out
}

fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).max(1).to_string().len()
}

fn literal(bytes: &[u8]) -> String {
    format!("\"{}\"", bytes.escape_ascii())
}

/// Operand text of one instruction, empty when it has none.
pub fn format_operands(instr: &Instr) -> String {
    match instr {
        Instr::Byte(b) => literal(&[*b]),
        Instr::Str(bytes) | Instr::StrIc(bytes) => literal(bytes),
        Instr::Class(class) => class.to_string(),
        Instr::CType { ctype, negated, ascii } => {
            let mut s = String::new();
            if *negated {
                s.push('^');
            }
            s.push_str(ctype.name());
            if *ascii {
                s.push_str(" ascii");
            }
            s
        }
        Instr::AnyCharStar { multiline } => {
            if *multiline { "ml".into() } else { String::new() }
        }
        Instr::AnyCharStarPeekNext { multiline, next } => {
            let ml = if *multiline { " ml" } else { "" };
            format!("{}{ml}", literal(&[*next]))
        }
        Instr::WordBoundary { ascii }
        | Instr::NotWordBoundary { ascii }
        | Instr::WordBegin { ascii }
        | Instr::WordEnd { ascii } => {
            if *ascii { "ascii".into() } else { String::new() }
        }
        Instr::BackRef { groups, ignore_case } => {
            let list = join(groups.iter());
            if *ignore_case { format!("{list} ic") } else { list }
        }
        Instr::CondRef { groups, otherwise } => format!("{} else {otherwise}", join(groups.iter())),
        Instr::MemStart(g)
        | Instr::MemStartPush(g)
        | Instr::MemEnd(g)
        | Instr::MemEndPush(g)
        | Instr::MemEndRec(g) => g.to_string(),
        Instr::Jump(addr) | Instr::Push(addr) => addr.to_string(),
        Instr::Repeat(id) | Instr::RepeatInc(id) => id.to_string(),
        Instr::NullCheckStart(id) => id.to_string(),
        Instr::NullCheckEnd { id, captures } => {
            if *captures { format!("{id} captures") } else { id.to_string() }
        }
        Instr::PushPos(id)
        | Instr::PopPos(id)
        | Instr::AtomicStart(id)
        | Instr::AtomicEnd(id)
        | Instr::PopToMark(id)
        | Instr::PosCheck(id) => id.to_string(),
        Instr::StepBack { min, max } => match max {
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{min}..{max}"),
            None => format!("{min}.."),
        },
        Instr::Call { target, subexp } => format!("{target} subexp {subexp}"),
        Instr::StateCheck { id, within } => match within {
            Some(check) => format!("{id} within {check}"),
            None => id.to_string(),
        },
        Instr::Absent { body } => body.to_string(),
        Instr::End
        | Instr::AnyChar
        | Instr::AnyCharMl
        | Instr::BeginBuf
        | Instr::EndBuf
        | Instr::SemiEndBuf
        | Instr::BeginLine
        | Instr::EndLine
        | Instr::BeginPosition
        | Instr::Keep
        | Instr::Fail
        | Instr::Pop
        | Instr::Return
        | Instr::AbsentEnd => String::new(),
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

fn dump_code(out: &mut String, program: &Program, colors: Colors) {
    let c = colors;
    let width = width_for_count(program.len());
    writeln!(out, "{}[code]{}", c.blue, c.reset).unwrap();
    for (i, instr) in program.code().iter().enumerate() {
        let operands = format_operands(instr);
        let line = format!(
            "{}{i:>width$}{}  {}{:<16}{} {operands}",
            c.dim,
            c.reset,
            c.blue,
            instr.name(),
            c.reset
        );
        writeln!(out, "{}", line.trim_end()).unwrap();
    }
}

fn dump_repeats(out: &mut String, program: &Program, colors: Colors) {
    let c = colors;
    if program.repeats().is_empty() {
        return;
    }
    writeln!(out, "{}[repeats]{}", c.blue, c.reset).unwrap();
    for (id, r) in program.repeats().iter().enumerate() {
        let max = r.max.map_or_else(String::new, |m| m.to_string());
        let mode = if r.greedy { "greedy" } else { "lazy" };
        writeln!(
            out,
            "{id}  {{{},{max}}} {mode} body {}{}{} exit {}{}{}",
            r.min, c.dim, r.body, c.reset, c.dim, r.exit, c.reset
        )
        .unwrap();
    }
}

fn dump_subexps(out: &mut String, program: &Program, colors: Colors) {
    let c = colors;
    if program.subexps().is_empty() {
        return;
    }
    writeln!(out, "{}[subexps]{}", c.blue, c.reset).unwrap();
    for (id, s) in program.subexps().iter().enumerate() {
        writeln!(
            out,
            "{id}  group {} entry {}{}{} captures {}..{} repeats {}..{}",
            s.group, c.dim, s.entry, c.reset, s.captures.start, s.captures.end, s.repeats.start, s.repeats.end
        )
        .unwrap();
    }
}

fn dump_names(out: &mut String, program: &Program, colors: Colors) {
    let c = colors;
    if program.names().is_empty() {
        return;
    }
    writeln!(out, "{}[names]{}", c.blue, c.reset).unwrap();
    for (name, groups) in program.names().iter() {
        writeln!(out, "{}{name}{}  {}", c.green, c.reset, join(groups.iter())).unwrap();
    }
}

fn dump_hints(out: &mut String, program: &Program, colors: Colors) {
    let c = colors;
    let hints = program.hints();
    let mut lines = Vec::new();
    for (flag, name) in [
        (AnchorHint::BEGIN_BUF, "begin-buf"),
        (AnchorHint::BEGIN_POSITION, "begin-position"),
        (AnchorHint::BEGIN_LINE, "begin-line"),
    ] {
        if hints.anchor.contains(flag) {
            lines.push(format!("anchor {name}"));
        }
    }
    if let Some(prefix) = &hints.prefix {
        lines.push(format!("prefix {}{}{}", c.green, literal(prefix), c.reset));
    }
    if let Some(map) = &hints.first_bytes {
        let bytes: Vec<u8> = map.iter_ones().map(|b| b as u8).collect();
        lines.push(format!("first-bytes {}{}{}", c.green, literal(&bytes), c.reset));
    }
    if hints.min_len > 0 {
        lines.push(format!("min-len {}", hints.min_len));
    }
    if lines.is_empty() {
        return;
    }
    writeln!(out, "{}[hints]{}", c.blue, c.reset).unwrap();
    for line in lines {
        writeln!(out, "{line}").unwrap();
    }
}
