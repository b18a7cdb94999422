//! Tracing infrastructure for debugging VM execution.
//!
//! # Design: Zero-Cost Abstraction
//!
//! The VM is generic over its tracer. With `NoopTracer` every trait method
//! is an `#[inline(always)]` empty function, so the calls and their
//! arguments disappear from the compiled dispatch loop. No tracing state
//! lives in the VM itself.
//!
//! `PrintTracer` collects one line per event, formatted like the program
//! dump so a trace can be read side by side with it.

use retrace_bytecode::{Addr, Instr, MarkId, Program, format_operands};
use retrace_core::Colors;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Instructions, backtracks and outcomes.
    #[default]
    Default,
    /// Also alternatives created, regions committed, calls and returns.
    Verbose,
    /// Also the subject text at the current position on every instruction.
    VeryVerbose,
}

/// Tracer trait for VM execution instrumentation.
///
/// Each method is called at a specific point during execution:
/// - `trace_start` - before matching from a start offset
/// - `trace_instruction` - before executing an instruction
/// - `trace_push` - when an alternative is left on the stack
/// - `trace_backtrack` - when execution resumes at an alternative
/// - `trace_cut` - when a lookaround or atomic region commits
/// - `trace_call` / `trace_return` - around subroutine invocations
/// - `trace_accept` - when a match is found
/// - `trace_exhausted` - when no alternative is left at the start offset
pub trait Tracer {
    fn trace_start(&mut self, start: usize);

    fn trace_instruction(&mut self, ip: Addr, instr: &Instr, pos: usize);

    fn trace_push(&mut self, ip: Addr, pos: usize);

    fn trace_backtrack(&mut self, ip: Addr, pos: usize);

    fn trace_cut(&mut self, mark: MarkId);

    fn trace_call(&mut self, target: Addr, depth: u32);

    fn trace_return(&mut self, ret: Addr);

    fn trace_accept(&mut self, start: usize, end: usize);

    fn trace_exhausted(&mut self, start: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_start(&mut self, _start: usize) {}

    #[inline(always)]
    fn trace_instruction(&mut self, _ip: Addr, _instr: &Instr, _pos: usize) {}

    #[inline(always)]
    fn trace_push(&mut self, _ip: Addr, _pos: usize) {}

    #[inline(always)]
    fn trace_backtrack(&mut self, _ip: Addr, _pos: usize) {}

    #[inline(always)]
    fn trace_cut(&mut self, _mark: MarkId) {}

    #[inline(always)]
    fn trace_call(&mut self, _target: Addr, _depth: u32) {}

    #[inline(always)]
    fn trace_return(&mut self, _ret: Addr) {}

    #[inline(always)]
    fn trace_accept(&mut self, _start: usize, _end: usize) {}

    #[inline(always)]
    fn trace_exhausted(&mut self, _start: usize) {}
}

/// Longest subject excerpt shown on a very verbose instruction line.
const EXCERPT_LEN: usize = 12;

/// Tracer that collects execution trace for debugging.
pub struct PrintTracer<'s> {
    subject: &'s [u8],
    verbosity: Verbosity,
    lines: Vec<String>,
    /// Width of instruction addresses.
    ip_width: usize,
    /// Width of subject offsets.
    pos_width: usize,
    colors: Colors,
}

fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).max(1).to_string().len()
}

impl<'s> PrintTracer<'s> {
    pub fn new(program: &Program, subject: &'s [u8], verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            subject,
            verbosity,
            lines: Vec::new(),
            ip_width: width_for_count(program.len()),
            pos_width: width_for_count(subject.len() + 1),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All trace lines joined with newlines.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    /// Add a sub-line, indented past the position and address columns.
    fn add_subline(&mut self, content: &str) {
        let indent = self.pos_width + 2 + self.ip_width + 2;
        self.lines.push(format!("{:indent$}{content}", ""));
    }

    fn excerpt(&self, pos: usize) -> String {
        let rest = self.subject.get(pos..).unwrap_or_default();
        let cut = rest.len().min(EXCERPT_LEN);
        let ellipsis = if rest.len() > EXCERPT_LEN { "…" } else { "" };
        format!("\"{}{ellipsis}\"", rest[..cut].escape_ascii())
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_start(&mut self, start: usize) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        let c = self.colors;
        self.lines.push(format!("{}start{} {start}", c.blue, c.reset));
    }

    fn trace_instruction(&mut self, ip: Addr, instr: &Instr, pos: usize) {
        let c = self.colors;
        let operands = format_operands(instr);
        let mut line = format!(
            "{}{:>pw$}{}  {:>iw$}  {}{:<16}{} {}",
            c.dim,
            pos,
            c.reset,
            ip.0,
            c.blue,
            instr.name(),
            c.reset,
            operands,
            pw = self.pos_width,
            iw = self.ip_width,
        );
        if self.verbosity == Verbosity::VeryVerbose {
            line.push_str(&format!("  {}{}{}", c.green, self.excerpt(pos), c.reset));
        }
        self.lines.push(line.trim_end().to_string());
    }

    fn trace_push(&mut self, ip: Addr, pos: usize) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline(&format!("+ alt {ip} at {pos}"));
    }

    fn trace_backtrack(&mut self, ip: Addr, pos: usize) {
        let c = self.colors;
        self.add_subline(&format!("{}<{} backtrack to {ip} at {pos}", c.blue, c.reset));
    }

    fn trace_cut(&mut self, mark: MarkId) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline(&format!("! commit {mark}"));
    }

    fn trace_call(&mut self, target: Addr, depth: u32) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline(&format!("> call {target} depth {depth}"));
    }

    fn trace_return(&mut self, ret: Addr) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        self.add_subline(&format!("< return to {ret}"));
    }

    fn trace_accept(&mut self, start: usize, end: usize) {
        let c = self.colors;
        self.lines.push(format!("{}accept{} {start}..{end}", c.green, c.reset));
    }

    fn trace_exhausted(&mut self, start: usize) {
        self.lines.push(format!("no match at {start}"));
    }
}
