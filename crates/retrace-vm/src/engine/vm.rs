//! Virtual machine for executing compiled programs.
//!
//! One VM runs one program against one subject. Every attempt starts from
//! a clean state, so a VM can be reused for any number of searches and
//! repeated searches give identical results.

use retrace_bytecode::{Addr, GroupId, Instr, MarkId, NullCheckId, Program, ProgramFlags, RepeatId, RepeatInfo, StateCheckId, SubexpId};
use retrace_core::SearchOptions;

use super::captures::CaptureTable;
use super::error::{Control, RuntimeError};
use super::frame::{CallState, Frame, FrameStack};
use super::input::Input;
use super::interrupt::Interrupt;
use super::invariants::{ensure_frame, ensure_group_entered};
use super::memo::StateMemo;
use super::region::{Region, Span};
use super::trace::{NoopTracer, Tracer};

/// Runtime limits for matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchLimits {
    /// Alternatives resumed per start offset; 0 is unlimited (default: 10,000,000).
    pub(crate) retry_limit: u64,
    /// Alternatives resumed per search; 0 is unlimited (default: 0).
    pub(crate) search_retry_limit: u64,
    /// Maximum subroutine call depth (default: 1,024).
    pub(crate) recursion_limit: u32,
    /// Maximum backtrack stack frames; 0 is unlimited (default: 0).
    pub(crate) stack_limit: usize,
    /// Steps between interrupt polls (default: 16,384).
    pub(crate) interrupt_interval: u32,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            retry_limit: 10_000_000,
            search_retry_limit: 0,
            recursion_limit: 1024,
            stack_limit: 0,
            interrupt_interval: 16384,
        }
    }
}

impl MatchLimits {
    /// Create new match limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_limit(mut self, limit: u64) -> Self {
        self.retry_limit = limit;
        self
    }

    pub fn search_retry_limit(mut self, limit: u64) -> Self {
        self.search_retry_limit = limit;
        self
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn stack_limit(mut self, limit: usize) -> Self {
        self.stack_limit = limit;
        self
    }

    pub fn interrupt_interval(mut self, steps: u32) -> Self {
        self.interrupt_interval = steps.max(1);
        self
    }

    pub fn get_retry_limit(&self) -> u64 {
        self.retry_limit
    }
    pub fn get_search_retry_limit(&self) -> u64 {
        self.search_retry_limit
    }
    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }
    pub fn get_stack_limit(&self) -> usize {
        self.stack_limit
    }
    pub fn get_interrupt_interval(&self) -> u32 {
        self.interrupt_interval
    }
}

/// Result of matching from one start offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    Matched,
    Failed,
    Interrupted,
}

/// Virtual machine state for matching.
pub struct VM<'p, 's> {
    pub(crate) program: &'p Program,
    pub(crate) input: Input<'s>,
    pub(crate) limits: MatchLimits,
    pub(crate) interrupt: Option<Interrupt>,
    /// Effective options of the current search.
    pub(crate) options: SearchOptions,

    pub(crate) ip: Addr,
    pub(crate) pos: usize,
    /// Start offset of the current attempt.
    pub(crate) start: usize,
    /// Offset `\G` matches at.
    pub(crate) search_start: usize,
    pub(crate) stack: FrameStack,
    pub(crate) captures: CaptureTable,
    /// Iteration counts of the counted loops.
    pub(crate) counts: Vec<u32>,
    /// Reported match start set by `\K`.
    pub(crate) keep: Option<usize>,
    /// Subroutine call depth.
    pub(crate) depth: u32,
    pub(crate) memo: Option<StateMemo>,
    /// Longest match so far, with its length, under find-longest.
    pub(crate) best: Option<(usize, Region)>,

    pub(crate) retries: u64,
    pub(crate) search_retries: u64,
    /// Steps since the interrupt flag was last polled.
    pub(crate) ticks: u32,
    pub(crate) fold_buf: Vec<u8>,
}

/// Builder for VM instances.
pub struct VMBuilder<'p, 's> {
    program: &'p Program,
    subject: &'s [u8],
    limits: MatchLimits,
    interrupt: Option<Interrupt>,
}

impl<'p, 's> VMBuilder<'p, 's> {
    /// Create a new VM builder.
    pub fn new(program: &'p Program, subject: &'s [u8]) -> Self {
        Self {
            program,
            subject,
            limits: MatchLimits::default(),
            interrupt: None,
        }
    }

    /// Set the match limits.
    pub fn limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the per-offset retry limit.
    pub fn retry_limit(mut self, limit: u64) -> Self {
        self.limits = self.limits.retry_limit(limit);
        self
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.limits = self.limits.recursion_limit(limit);
        self
    }

    /// Poll `interrupt` while searching.
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Build the VM.
    pub fn build(self) -> VM<'p, 's> {
        let options = self.program.options().search_defaults();
        VM {
            program: self.program,
            input: Input::new(self.subject, self.program.encoding(), options),
            limits: self.limits,
            interrupt: self.interrupt,
            options,
            ip: Addr(0),
            pos: 0,
            start: 0,
            search_start: 0,
            stack: FrameStack::new(),
            captures: CaptureTable::default(),
            counts: Vec::new(),
            keep: None,
            depth: 0,
            memo: None,
            best: None,
            retries: 0,
            search_retries: 0,
            ticks: 0,
            fold_buf: Vec::new(),
        }
    }
}

impl<'p, 's> VM<'p, 's> {
    /// Create a VM builder.
    pub fn builder(program: &'p Program, subject: &'s [u8]) -> VMBuilder<'p, 's> {
        VMBuilder::new(program, subject)
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn subject(&self) -> &'s [u8] {
        self.input.bytes
    }

    /// Prepares per-search state: options, `\G` and the explosion memo.
    pub(crate) fn begin_search(&mut self, search_start: usize, options: SearchOptions) {
        let program = self.program;
        self.options = program.options().search_defaults() | options;
        self.input = Input::new(self.input.bytes, program.encoding(), self.options);
        self.search_start = search_start;
        self.search_retries = 0;
        self.ticks = 0;
        self.best = None;
        let guarded = program.flags().contains(ProgramFlags::STATE_CHECK)
            && !self
                .options
                .intersects(SearchOptions::FIND_LONGEST | SearchOptions::FIND_NOT_EMPTY);
        self.memo = if guarded {
            StateMemo::new(program.num_state_checks(), self.input.len())
        } else {
            None
        };
    }

    fn reset(&mut self, start: usize) {
        let program = self.program;
        self.stack.clear();
        self.captures.reset(program.num_captures());
        self.counts.clear();
        self.counts.resize(program.repeats().len(), 0);
        self.keep = None;
        self.depth = 0;
        self.retries = 0;
        self.start = start;
        self.pos = start;
    }

    /// Matches from `start`, beginning at `entry`.
    ///
    /// On `Matched`, the capture table and position describe the match
    /// until the next attempt.
    pub(crate) fn run<T: Tracer>(
        &mut self,
        entry: Addr,
        start: usize,
        tracer: &mut T,
    ) -> Result<Attempt, RuntimeError> {
        self.reset(start);
        self.ip = entry;
        tracer.trace_start(start);

        loop {
            let program = self.program;
            let instr = program.instr(self.ip);
            tracer.trace_instruction(self.ip, instr, self.pos);

            match self.step(instr, tracer) {
                Ok(()) | Err(Control::Backtracked) => continue,
                Err(Control::Accept) => return Ok(Attempt::Matched),
                Err(Control::Exhausted) => {
                    tracer.trace_exhausted(start);
                    return Ok(Attempt::Failed);
                }
                Err(Control::Interrupted) => return Ok(Attempt::Interrupted),
                Err(Control::Limit(e)) => return Err(e),
            }
        }
    }

    fn step<T: Tracer>(&mut self, instr: &Instr, tracer: &mut T) -> Result<(), Control> {
        let input = self.input;
        let pos = self.pos;
        match instr {
            Instr::End => self.exec_end(tracer),

            Instr::Byte(b) => self.consume((input.bytes.get(pos) == Some(b)).then_some(1), tracer),
            Instr::Str(lit) => self.consume(input.match_str(pos, lit), tracer),
            Instr::StrIc(folded) => {
                let len = input.match_folded(pos, folded, &mut self.fold_buf);
                self.consume(len, tracer)
            }
            Instr::Class(class) => self.consume(input.match_class(pos, class), tracer),
            Instr::CType {
                ctype,
                negated,
                ascii,
            } => self.consume(input.match_ctype(pos, *ctype, *negated, *ascii), tracer),
            Instr::AnyChar => self.consume(input.match_any(pos, false), tracer),
            Instr::AnyCharMl => self.consume(input.match_any(pos, true), tracer),
            Instr::AnyCharStar { multiline } => self.exec_any_char_star(*multiline, None),
            Instr::AnyCharStarPeekNext { multiline, next } => self.exec_any_char_star(*multiline, Some(*next)),

            Instr::WordBoundary { ascii } => {
                let (before, after) = input.word_sides(pos, *ascii);
                self.check(before != after, tracer)
            }
            Instr::NotWordBoundary { ascii } => {
                let (before, after) = input.word_sides(pos, *ascii);
                self.check(before == after, tracer)
            }
            Instr::WordBegin { ascii } => {
                let (before, after) = input.word_sides(pos, *ascii);
                self.check(!before && after, tracer)
            }
            Instr::WordEnd { ascii } => {
                let (before, after) = input.word_sides(pos, *ascii);
                self.check(before && !after, tracer)
            }
            Instr::BeginBuf => self.check(input.is_begin_buf(pos), tracer),
            Instr::EndBuf => self.check(input.is_end_buf(pos), tracer),
            Instr::SemiEndBuf => self.check(input.is_semi_end_buf(pos), tracer),
            Instr::BeginLine => self.check(input.is_begin_line(pos), tracer),
            Instr::EndLine => self.check(input.is_end_line(pos), tracer),
            Instr::BeginPosition => self.check(pos == self.search_start, tracer),

            Instr::BackRef { groups, ignore_case } => self.exec_backref(groups, *ignore_case, tracer),
            Instr::CondRef { groups, otherwise } => {
                if groups.iter().any(|&g| self.captures.is_set(g)) {
                    self.next()
                } else {
                    self.ip = *otherwise;
                    Ok(())
                }
            }

            Instr::MemStart(group) => {
                self.captures.start(*group, pos);
                self.next()
            }
            Instr::MemStartPush(group) => {
                self.log_capture(*group)?;
                self.captures.start(*group, pos);
                self.next()
            }
            Instr::MemEnd(group) => {
                let entered = self.captures.end(*group, pos);
                ensure_group_entered(entered, *group, self.ip);
                self.next()
            }
            Instr::MemEndPush(group) | Instr::MemEndRec(group) => self.exec_mem_end_push(*group),
            Instr::Keep => {
                self.push(Frame::Keep { prev: self.keep })?;
                self.keep = Some(pos);
                self.next()
            }

            Instr::Fail => self.backtrack(tracer),
            Instr::Jump(addr) => {
                self.ip = *addr;
                Ok(())
            }
            Instr::Push(addr) => {
                self.push_alt(*addr, tracer)?;
                self.next()
            }
            Instr::Pop => {
                ensure_frame(self.stack.pop(), "alternative", self.ip);
                self.next()
            }

            Instr::Repeat(id) => self.exec_repeat(*id, tracer),
            Instr::RepeatInc(id) => self.exec_repeat_inc(*id, tracer),

            Instr::NullCheckStart(id) => {
                self.push(Frame::NullCheck { id: *id, pos })?;
                self.next()
            }
            Instr::NullCheckEnd { id, captures } => self.exec_null_check_end(*id, *captures),

            Instr::PushPos(mark) => {
                self.push(Frame::SavedPos { mark: *mark, pos })?;
                self.next()
            }
            Instr::PopPos(mark) => {
                let (index, saved) = ensure_frame(self.stack.saved_pos(*mark), "lookaround", self.ip);
                self.pos = saved;
                self.stack.cut(index);
                tracer.trace_cut(*mark);
                self.next()
            }
            Instr::AtomicStart(mark) => {
                self.push(Frame::AtomicMark { mark: *mark })?;
                self.next()
            }
            Instr::AtomicEnd(mark) => {
                let index = ensure_frame(self.stack.atomic(*mark), "atomic", self.ip);
                self.stack.cut(index);
                tracer.trace_cut(*mark);
                self.next()
            }
            Instr::PopToMark(mark) => self.exec_pop_to_mark(*mark),
            Instr::StepBack { min, max } => self.exec_step_back(*min, *max, tracer),
            Instr::PosCheck(mark) => {
                let (_, saved) = ensure_frame(self.stack.saved_pos(*mark), "lookaround", self.ip);
                self.check(pos == saved, tracer)
            }

            Instr::Call { target, subexp } => self.exec_call(*target, *subexp, tracer),
            Instr::Return => self.exec_return(tracer),

            Instr::StateCheck { id, within } => self.exec_state_check(*id, *within, tracer),

            Instr::Absent { body } => self.exec_absent(*body, tracer),
            // Only reachable inside the nested run of an absent body.
            Instr::AbsentEnd => Err(Control::Accept),
        }
    }

    #[inline]
    fn next(&mut self) -> Result<(), Control> {
        self.ip = self.ip.next();
        Ok(())
    }

    /// Advances past `len` matched bytes, or fails.
    #[inline]
    fn consume<T: Tracer>(&mut self, len: Option<usize>, tracer: &mut T) -> Result<(), Control> {
        match len {
            Some(len) => {
                self.pos += len;
                self.next()
            }
            None => self.backtrack(tracer),
        }
    }

    /// Zero-width assertion.
    #[inline]
    fn check<T: Tracer>(&mut self, ok: bool, tracer: &mut T) -> Result<(), Control> {
        if ok { self.next() } else { self.backtrack(tracer) }
    }

    fn push(&mut self, frame: Frame) -> Result<(), Control> {
        let limit = self.limits.stack_limit;
        if limit != 0 && self.stack.len() >= limit {
            return Err(RuntimeError::StackLimitExceeded(limit).into());
        }
        self.stack.push(frame);
        Ok(())
    }

    fn push_alt<T: Tracer>(&mut self, ip: Addr, tracer: &mut T) -> Result<(), Control> {
        tracer.trace_push(ip, self.pos);
        self.push(Frame::Alt { ip, pos: self.pos })
    }

    fn log_capture(&mut self, group: GroupId) -> Result<(), Control> {
        self.push(Frame::Capture {
            group,
            prev: self.captures.slot(group),
            history: self.captures.history_len(),
        })
    }

    /// Reported start of the current match: the `\K` position if any.
    pub(crate) fn match_start(&self) -> usize {
        self.keep.unwrap_or(self.start).min(self.pos)
    }

    /// Region of the match that just completed.
    pub(crate) fn region(&self) -> Region {
        let mut spans: Vec<Option<Span>> = self
            .captures
            .spans()
            .map(|span| span.map(|(start, end)| Span::new(start, end)))
            .collect();
        spans[0] = Some(Span::new(self.match_start(), self.pos));
        let region = Region::new(spans);
        if self.program.flags().contains(ProgramFlags::CAPTURE_HISTORY) {
            region.with_history(self.captures.history())
        } else {
            region
        }
    }

    fn exec_end<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), Control> {
        let start = self.match_start();
        if self.options.contains(SearchOptions::FIND_NOT_EMPTY) && start == self.pos {
            return self.backtrack(tracer);
        }
        if self.options.contains(SearchOptions::FIND_LONGEST) {
            let len = self.pos - self.start;
            if self.best.as_ref().is_none_or(|(best, _)| len > *best) {
                tracer.trace_accept(start, self.pos);
                self.best = Some((len, self.region()));
            }
            return self.backtrack(tracer);
        }
        tracer.trace_accept(start, self.pos);
        Err(Control::Accept)
    }

    /// Greedy `.*` in one step: every position it passes is left as an
    /// alternative, or only those where `peek` follows.
    fn exec_any_char_star(&mut self, multiline: bool, peek: Option<u8>) -> Result<(), Control> {
        let input = self.input;
        let next = self.ip.next();
        while let Some(len) = input.match_any(self.pos, multiline) {
            if peek.is_none_or(|b| input.bytes.get(self.pos) == Some(&b)) {
                self.push(Frame::Alt { ip: next, pos: self.pos })?;
            }
            self.pos += len;
        }
        self.ip = next;
        Ok(())
    }

    /// Tries each group that has a capture, last defined first.
    fn exec_backref<T: Tracer>(&mut self, groups: &[GroupId], ignore_case: bool, tracer: &mut T) -> Result<(), Control> {
        let mut any_set = false;
        for &group in groups.iter().rev() {
            let Some(span) = self.captures.span(group) else {
                continue;
            };
            any_set = true;
            if let Some(len) = self.input.match_backref(self.pos, span, ignore_case, &mut self.fold_buf) {
                return self.consume(Some(len), tracer);
            }
        }
        let unset_matches_empty = self
            .program
            .flags()
            .contains(ProgramFlags::BACKREF_UNSET_MATCHES_EMPTY);
        if !any_set && unset_matches_empty {
            return self.next();
        }
        self.backtrack(tracer)
    }

    fn exec_mem_end_push(&mut self, group: GroupId) -> Result<(), Control> {
        self.log_capture(group)?;
        let entered = self.captures.end(group, self.pos);
        ensure_group_entered(entered, group, self.ip);
        if self.program.flags().contains(ProgramFlags::CAPTURE_HISTORY)
            && let Some((start, end)) = self.captures.span(group)
        {
            self.captures.record(group, start, end);
        }
        self.next()
    }

    fn exec_repeat<T: Tracer>(&mut self, id: RepeatId, tracer: &mut T) -> Result<(), Control> {
        let info = *self.program.repeat(id);
        let index = usize::from(id);
        self.push(Frame::Repeat {
            id,
            prev: self.counts[index],
        })?;
        self.counts[index] = 0;
        if info.min == 0 {
            return self.repeat_choice(info, tracer);
        }
        self.ip = info.body;
        Ok(())
    }

    fn exec_repeat_inc<T: Tracer>(&mut self, id: RepeatId, tracer: &mut T) -> Result<(), Control> {
        let info = *self.program.repeat(id);
        let index = usize::from(id);
        let prev = self.counts[index];
        self.push(Frame::Repeat { id, prev })?;
        let count = prev.saturating_add(1);
        self.counts[index] = count;

        if info.max.is_some_and(|max| count >= max) {
            self.ip = info.exit;
            Ok(())
        } else if count < info.min {
            self.ip = info.body;
            Ok(())
        } else {
            self.repeat_choice(info, tracer)
        }
    }

    /// Another iteration or the exit, in the loop's preferred order.
    fn repeat_choice<T: Tracer>(&mut self, info: RepeatInfo, tracer: &mut T) -> Result<(), Control> {
        if info.greedy {
            self.push_alt(info.exit, tracer)?;
            self.ip = info.body;
        } else {
            self.push_alt(info.body, tracer)?;
            self.ip = info.exit;
        }
        Ok(())
    }

    /// An iteration that consumed nothing skips the loop's back edge.
    fn exec_null_check_end(&mut self, id: NullCheckId, captures: bool) -> Result<(), Control> {
        let (index, entry) = ensure_frame(self.stack.null_check(id), "null check", self.ip);
        let empty = entry == self.pos && !(captures && self.captures_changed_since(index));
        self.ip = if empty { Addr(self.ip.0 + 2) } else { self.ip.next() };
        Ok(())
    }

    fn captures_changed_since(&self, index: usize) -> bool {
        self.stack.above(index).iter().any(|frame| {
            matches!(frame, Frame::Capture { group, prev, .. } if self.captures.slot(*group) != *prev)
        })
    }

    /// Unwinds the failed-to-fail body of a negative lookaround.
    fn exec_pop_to_mark(&mut self, mark: MarkId) -> Result<(), Control> {
        let mut level = 0u32;
        loop {
            let frame = ensure_frame(self.stack.pop(), "lookaround", self.ip);
            match frame {
                Frame::SavedPos { mark: m, .. } if m == mark && level == 0 => break,
                Frame::Return { .. } => level += 1,
                Frame::Call { .. } => level = ensure_frame(level.checked_sub(1), "matching call", self.ip),
                _ => {}
            }
            self.undo(frame);
        }
        self.next()
    }

    fn exec_step_back<T: Tracer>(&mut self, min: u32, max: Option<u32>, tracer: &mut T) -> Result<(), Control> {
        let mut pos = self.pos;
        for _ in 0..min {
            match self.input.prev(pos) {
                Some(prev) => pos = prev,
                None => return self.backtrack(tracer),
            }
        }
        let next = self.ip.next();
        let remaining = max.map_or(u32::MAX, |max| max - min);
        if remaining > 0 && pos > 0 {
            self.push(Frame::StepBack {
                ip: next,
                pos,
                remaining,
            })?;
        }
        self.pos = pos;
        self.ip = next;
        Ok(())
    }

    fn call_state(&self, subexp: SubexpId) -> CallState {
        let sub = &self.program.subexps()[usize::from(subexp)];
        let repeats = usize::from(sub.repeats.start)..usize::from(sub.repeats.end);
        CallState {
            starts: self.captures.starts(sub.captures.clone()),
            counts: self.counts[repeats].to_vec(),
        }
    }

    fn restore_call_state(&mut self, subexp: SubexpId, state: &CallState) {
        let sub = &self.program.subexps()[usize::from(subexp)];
        let repeats = usize::from(sub.repeats.start)..usize::from(sub.repeats.end);
        self.captures.set_starts(sub.captures.clone(), &state.starts);
        self.counts[repeats].copy_from_slice(&state.counts);
    }

    fn exec_call<T: Tracer>(&mut self, target: Addr, subexp: SubexpId, tracer: &mut T) -> Result<(), Control> {
        if self.depth >= self.limits.recursion_limit {
            return Err(RuntimeError::RecursionLimitExceeded(self.limits.recursion_limit).into());
        }
        let saved = Box::new(self.call_state(subexp));
        self.push(Frame::Call {
            ret: self.ip.next(),
            subexp,
            saved,
        })?;
        self.depth += 1;
        tracer.trace_call(target, self.depth);
        self.ip = target;
        Ok(())
    }

    /// Returns to the caller, putting back the pending starts and loop
    /// counts the call saved so a recursive invocation leaves the
    /// enclosing one intact.
    fn exec_return<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), Control> {
        let (ret, subexp, saved) = ensure_frame(self.stack.current_call(), "call", self.ip);
        let saved = saved.clone();
        let undo = Box::new(self.call_state(subexp));
        self.restore_call_state(subexp, &saved);
        self.push(Frame::Return { subexp, undo })?;
        self.depth -= 1;
        tracer.trace_return(ret);
        self.ip = ret;
        Ok(())
    }

    /// Explosion guard. What follows a guard inside a null-checked body
    /// depends on where the iteration began until the iteration consumes
    /// input, so the memo is neither read nor written before that.
    fn exec_state_check<T: Tracer>(
        &mut self,
        id: StateCheckId,
        within: Option<NullCheckId>,
        tracer: &mut T,
    ) -> Result<(), Control> {
        let pos = self.pos;
        if self.memo.is_none() {
            return self.next();
        }
        if let Some(check) = within {
            let (_, entry) = ensure_frame(self.stack.null_check(check), "null check", self.ip);
            if entry == pos {
                return self.next();
            }
        }
        if let Some(memo) = &self.memo {
            if memo.is_failed(id, pos) {
                return self.backtrack(tracer);
            }
            self.push(Frame::StateCheck { id, pos })?;
        }
        self.next()
    }

    /// Absent operator: takes the longest span from here that contains no
    /// match of the body, leaving the shorter ones as alternatives.
    fn exec_absent<T: Tracer>(&mut self, body: Addr, tracer: &mut T) -> Result<(), Control> {
        let start = self.pos;
        let Some(end) = self.absent_end(body, start)? else {
            return self.backtrack(tracer);
        };
        let resume = self.ip.next();
        if end > start {
            self.push(Frame::Absent {
                ip: resume,
                start,
                end,
            })?;
        }
        self.pos = end;
        self.ip = resume;
        Ok(())
    }

    /// Largest `end` such that the body matches nowhere inside
    /// `start..end`, or `None` if it matches the empty string at `start`.
    ///
    /// Containing a match only grows with `end`, so the boundary is found
    /// by binary search over character boundaries.
    fn absent_end(&mut self, body: Addr, start: usize) -> Result<Option<usize>, Control> {
        let input = self.input;
        let mut cuts = vec![start];
        let mut at = start;
        while !input.at_end(at) {
            at = input.next(at);
            cuts.push(at);
        }

        if self.absent_blocked(body, start, start)? {
            return Ok(None);
        }
        // cuts[lo] is free of matches, cuts[hi] (if in range) contains one.
        let (mut lo, mut hi) = (0, cuts.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.absent_blocked(body, start, cuts[mid])? {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(Some(cuts[lo]))
    }

    /// Whether the body matches somewhere inside `start..end`.
    fn absent_blocked(&mut self, body: Addr, start: usize, end: usize) -> Result<bool, Control> {
        let mut child = self.nested(end);
        let mut from = start;
        loop {
            match child.run(body, from, &mut NoopTracer)? {
                Attempt::Matched => return Ok(true),
                Attempt::Interrupted => return Err(Control::Interrupted),
                Attempt::Failed => {}
            }
            if from >= end {
                return Ok(false);
            }
            from = child.input.next(from);
        }
    }

    /// A VM for a nested run over the subject cut off at `end`.
    fn nested(&self, end: usize) -> VM<'p, 's> {
        let mut child = VM::builder(self.program, self.input.bytes)
            .limits(self.limits)
            .build();
        child.interrupt = self.interrupt.clone();
        child.options = self.options - (SearchOptions::FIND_LONGEST | SearchOptions::FIND_NOT_EMPTY);
        child.input = self.input.truncated(end);
        child.search_start = self.search_start;
        child
    }

    /// Undoes the state change a frame recorded.
    fn undo(&mut self, frame: Frame) {
        match frame {
            Frame::Capture { group, prev, history } => {
                self.captures.restore(group, prev);
                self.captures.truncate_history(history);
            }
            Frame::Repeat { id, prev } => self.counts[usize::from(id)] = prev,
            Frame::Call { .. } => self.depth -= 1,
            Frame::Return { subexp, undo } => {
                self.restore_call_state(subexp, &undo);
                self.depth += 1;
            }
            Frame::Keep { prev } => self.keep = prev,
            Frame::Alt { .. }
            | Frame::StepBack { .. }
            | Frame::SavedPos { .. }
            | Frame::AtomicMark { .. }
            | Frame::NullCheck { .. }
            | Frame::StateCheck { .. }
            | Frame::Absent { .. }
            | Frame::Void => {}
        }
    }

    /// Pops frames until one resumes execution.
    ///
    /// Returns `Err(Backtracked)` after resuming, or `Err(Exhausted)` when
    /// the stack runs dry.
    fn backtrack<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), Control> {
        loop {
            let frame = self.stack.pop().ok_or(Control::Exhausted)?;
            let resume = match frame {
                Frame::Alt { ip, pos } => Some((ip, pos)),
                Frame::StepBack { ip, pos, remaining } => self.input.prev(pos).map(|prev| {
                    if remaining > 1 && prev > 0 {
                        self.stack.push(Frame::StepBack {
                            ip,
                            pos: prev,
                            remaining: remaining - 1,
                        });
                    }
                    (ip, prev)
                }),
                Frame::Absent { ip, start, end } => self.input.prev(end).filter(|&prev| prev >= start).map(|prev| {
                    if prev > start {
                        self.stack.push(Frame::Absent { ip, start, end: prev });
                    }
                    (ip, prev)
                }),
                Frame::StateCheck { id, pos } => {
                    if let Some(memo) = &mut self.memo {
                        memo.mark_failed(id, pos);
                    }
                    None
                }
                other => {
                    self.undo(other);
                    None
                }
            };

            if let Some((ip, pos)) = resume {
                self.ip = ip;
                self.pos = pos;
                tracer.trace_backtrack(ip, pos);
                self.count_retry()?;
                return Err(Control::Backtracked);
            }
        }
    }

    fn count_retry(&mut self) -> Result<(), Control> {
        self.retries += 1;
        self.search_retries += 1;
        let limits = self.limits;
        if limits.retry_limit != 0 && self.retries > limits.retry_limit {
            return Err(RuntimeError::RetryLimitInMatch(limits.retry_limit).into());
        }
        if limits.search_retry_limit != 0 && self.search_retries > limits.search_retry_limit {
            return Err(RuntimeError::RetryLimitInSearch(limits.search_retry_limit).into());
        }
        if self.poll_interrupt() {
            return Err(Control::Interrupted);
        }
        Ok(())
    }

    /// Counts a step; every `interrupt_interval` steps, reports whether
    /// the search was interrupted.
    pub(crate) fn poll_interrupt(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks < self.limits.interrupt_interval {
            return false;
        }
        self.ticks = 0;
        self.interrupt.as_ref().is_some_and(Interrupt::is_triggered)
    }
}
