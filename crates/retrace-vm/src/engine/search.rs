//! Search loop: drives match attempts over a range of start offsets.
//!
//! Offsets are visited in order (forward, or backward when `range < start`)
//! and filtered with the program's search hints before the VM runs.

use memchr::{memchr, memchr2, memchr3, memmem};
use retrace_bytecode::{Addr, AnchorHint, ByteMap, SearchHints};
use retrace_core::SearchOptions;

use super::error::RuntimeError;
use super::interrupt::Interrupt;
use super::region::Region;
use super::trace::{NoopTracer, Tracer};
use super::vm::{Attempt, VM};

/// Outcome of a search that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Match(Region),
    /// The range was exhausted without a match.
    NoMatch,
    /// The search was cancelled through its [`super::Interrupt`].
    Interrupted,
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, SearchOutcome::Match(_))
    }

    pub fn region(&self) -> Option<&Region> {
        match self {
            SearchOutcome::Match(region) => Some(region),
            _ => None,
        }
    }

    pub fn into_region(self) -> Option<Region> {
        match self {
            SearchOutcome::Match(region) => Some(region),
            _ => None,
        }
    }
}

/// How candidate first bytes are located.
enum ByteScan {
    Any,
    One(u8),
    Two(u8, u8),
    Three(u8, u8, u8),
    Map(ByteMap),
}

impl ByteScan {
    fn new(first: Option<&ByteMap>) -> Self {
        let Some(map) = first else {
            return ByteScan::Any;
        };
        let mut bytes = map.iter_ones().map(|b| b as u8);
        match map.count_ones() {
            1 => ByteScan::One(bytes.next().unwrap_or_default()),
            2 => {
                let (a, b) = (bytes.next(), bytes.next());
                ByteScan::Two(a.unwrap_or_default(), b.unwrap_or_default())
            }
            3 => {
                let (a, b, c) = (bytes.next(), bytes.next(), bytes.next());
                ByteScan::Three(a.unwrap_or_default(), b.unwrap_or_default(), c.unwrap_or_default())
            }
            _ => ByteScan::Map(*map),
        }
    }

    /// First offset at or after `from` whose byte may start a match.
    fn find(&self, haystack: &[u8], from: usize) -> Option<usize> {
        let rest = haystack.get(from..)?;
        let found = match self {
            ByteScan::Any => return Some(from),
            ByteScan::One(a) => memchr(*a, rest),
            ByteScan::Two(a, b) => memchr2(*a, *b, rest),
            ByteScan::Three(a, b, c) => memchr3(*a, *b, *c, rest),
            ByteScan::Map(map) => rest.iter().position(|&b| map[b as usize]),
        };
        found.map(|i| from + i)
    }

    fn accepts(&self, byte: Option<u8>) -> bool {
        match (self, byte) {
            (ByteScan::Any, _) => true,
            (_, None) => false,
            (ByteScan::One(a), Some(b)) => b == *a,
            (ByteScan::Two(a, c), Some(b)) => b == *a || b == *c,
            (ByteScan::Three(a, c, d), Some(b)) => b == *a || b == *c || b == *d,
            (ByteScan::Map(map), Some(b)) => map[b as usize],
        }
    }
}

impl<'p, 's> VM<'p, 's> {
    /// Searches the whole subject from offset 0.
    pub fn search(&mut self) -> Result<SearchOutcome, RuntimeError> {
        let len = self.input.len();
        self.search_with(0, len, SearchOptions::empty(), &mut NoopTracer)
    }

    /// Tries start offsets from `start` to `range`, both inclusive, going
    /// backward when `range < start`. `\G` matches at `start`.
    pub fn search_with<T: Tracer>(
        &mut self,
        start: usize,
        range: usize,
        options: SearchOptions,
        tracer: &mut T,
    ) -> Result<SearchOutcome, RuntimeError> {
        let len = self.input.len();
        if start > len || range > len {
            return Ok(SearchOutcome::NoMatch);
        }
        self.begin_search(start, options);

        let outcome = if range >= start {
            self.search_forward(start, range, tracer)?
        } else {
            self.search_backward(start, range, tracer)?
        };
        log::trace!(
            "search {start}..{range}: {} after {} retries",
            if outcome.is_match() { "match" } else { "no match" },
            self.search_retries,
        );
        Ok(outcome)
    }

    /// Matches at exactly `at`, without scanning.
    pub fn match_at(&mut self, at: usize) -> Result<SearchOutcome, RuntimeError> {
        self.match_at_with(at, SearchOptions::empty(), &mut NoopTracer)
    }

    pub fn match_at_with<T: Tracer>(
        &mut self,
        at: usize,
        options: SearchOptions,
        tracer: &mut T,
    ) -> Result<SearchOutcome, RuntimeError> {
        if at > self.input.len() {
            return Ok(SearchOutcome::NoMatch);
        }
        self.begin_search(at, options);
        if let Some(outcome) = self.attempt(at, tracer)? {
            return Ok(outcome);
        }
        Ok(self.take_best())
    }

    /// Runs one attempt; `Some` ends the search.
    fn attempt<T: Tracer>(&mut self, at: usize, tracer: &mut T) -> Result<Option<SearchOutcome>, RuntimeError> {
        if self.interrupt.as_ref().is_some_and(Interrupt::is_triggered) {
            return Ok(Some(SearchOutcome::Interrupted));
        }
        match self.run(Addr(0), at, tracer)? {
            Attempt::Matched => Ok(Some(SearchOutcome::Match(self.region()))),
            Attempt::Interrupted => Ok(Some(SearchOutcome::Interrupted)),
            Attempt::Failed => Ok(None),
        }
    }

    fn take_best(&mut self) -> SearchOutcome {
        match self.best.take() {
            Some((_, region)) => SearchOutcome::Match(region),
            None => SearchOutcome::NoMatch,
        }
    }

    fn search_forward<T: Tracer>(
        &mut self,
        start: usize,
        range: usize,
        tracer: &mut T,
    ) -> Result<SearchOutcome, RuntimeError> {
        let program = self.program;
        let hints: &SearchHints = program.hints();
        let input = self.input;
        let len = input.len();

        let mut last = range;
        if hints.anchor.contains(AnchorHint::BEGIN_BUF) {
            if start > 0 || self.options.contains(SearchOptions::NOTBOL) {
                return Ok(SearchOutcome::NoMatch);
            }
            last = 0;
        } else if hints.anchor.contains(AnchorHint::BEGIN_POSITION) {
            last = start;
        }
        if len < hints.min_len {
            return Ok(SearchOutcome::NoMatch);
        }
        last = last.min(len - hints.min_len);
        let begin_line = hints.anchor.contains(AnchorHint::BEGIN_LINE);
        let finder = hints.prefix.as_deref().map(memmem::Finder::new);
        let scan = ByteScan::new(hints.first_bytes.as_ref());

        let mut at = input.left_adjust(start);
        if at < start {
            at = input.next(at);
        }
        while at <= last {
            // Jump to the next offset the hints allow.
            let candidate = if let Some(finder) = &finder {
                finder.find(&input.bytes[at..]).map(|i| input.left_adjust(at + i))
            } else if begin_line && at > 0 && !input.is_begin_line(at) {
                memchr(b'\n', &input.bytes[at..]).map(|i| at + i + 1)
            } else {
                scan.find(input.bytes, at)
            };
            let Some(candidate) = candidate.filter(|&c| c <= last) else {
                break;
            };
            if candidate < at {
                // The prefix sits inside a character; skip past it.
                at = input.next(at);
                continue;
            }
            at = candidate;

            if let Some(outcome) = self.attempt(at, tracer)? {
                return Ok(outcome);
            }
            if input.at_end(at) {
                break;
            }
            at = input.next(at);
        }
        Ok(self.take_best())
    }

    fn search_backward<T: Tracer>(
        &mut self,
        start: usize,
        range: usize,
        tracer: &mut T,
    ) -> Result<SearchOutcome, RuntimeError> {
        let program = self.program;
        let hints: &SearchHints = program.hints();
        let input = self.input;
        let scan = ByteScan::new(hints.first_bytes.as_ref());
        let prefix = hints.prefix.as_deref();

        let mut at = input.left_adjust(start);
        loop {
            if at < range {
                break;
            }
            let allowed = (!hints.anchor.contains(AnchorHint::BEGIN_BUF) || input.is_begin_buf(at))
                && (!hints.anchor.contains(AnchorHint::BEGIN_POSITION) || at == start)
                && (!hints.anchor.contains(AnchorHint::BEGIN_LINE) || input.is_begin_line(at))
                && input.len() - at >= hints.min_len
                && prefix.is_none_or(|p| input.bytes[at..].starts_with(p))
                && scan.accepts(input.bytes.get(at).copied());

            if allowed && let Some(outcome) = self.attempt(at, tracer)? {
                return Ok(outcome);
            }
            match input.prev(at) {
                Some(prev) => at = prev,
                None => break,
            }
        }
        Ok(self.take_best())
    }
}
