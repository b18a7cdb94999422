//! Compiled patterns and their search entry points.

use std::sync::Arc;

use retrace_bytecode::{GroupId, Program};
use retrace_compiler::CompileLimits;
use retrace_core::{Colors, EncodingRef, Options, SearchOptions, Syntax, UTF8};
use retrace_vm::{Interrupt, MatchLimits, NoopTracer, PrintTracer, Region, SearchOutcome, VM, Verbosity};

use crate::captures::{Captures, Match};
use crate::{Error, Result};

/// Builder for [`Regex`].
///
/// Defaults: the Oniguruma dialect, UTF-8 subjects, no extra options and
/// default compile and match limits.
#[derive(Debug, Clone)]
pub struct RegexBuilder<'a> {
    pattern: &'a [u8],
    syntax: Syntax,
    options: Options,
    encoding: EncodingRef,
    compile_limits: CompileLimits,
    match_limits: MatchLimits,
    interrupt: Option<Interrupt>,
}

impl<'a> RegexBuilder<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Self::bytes(pattern.as_bytes())
    }

    /// Builder for a pattern that is not UTF-8, such as a Latin-1 pattern.
    pub fn bytes(pattern: &'a [u8]) -> Self {
        Self {
            pattern,
            syntax: Syntax::ONIGURUMA,
            options: Options::empty(),
            encoding: &UTF8,
            compile_limits: CompileLimits::default(),
            match_limits: MatchLimits::default(),
            interrupt: None,
        }
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn encoding(mut self, encoding: EncodingRef) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn compile_limits(mut self, limits: CompileLimits) -> Self {
        self.compile_limits = limits;
        self
    }

    pub fn match_limits(mut self, limits: MatchLimits) -> Self {
        self.match_limits = limits;
        self
    }

    /// Searches of the built regex poll `interrupt`.
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn build(self) -> Result<Regex> {
        let program = retrace_compiler::compile(
            self.pattern,
            &self.syntax,
            self.options,
            self.encoding,
            &self.compile_limits,
        )?;
        log::debug!(
            "compiled {:?} into {} instructions",
            self.pattern.escape_ascii().to_string(),
            program.len()
        );
        Ok(Regex {
            pattern: self.pattern.into(),
            program: Arc::new(program),
            limits: self.match_limits,
            interrupt: self.interrupt,
        })
    }
}

/// A compiled pattern.
///
/// Cloning is cheap: clones share the compiled program. Searches take
/// `&self`, so one regex can serve any number of threads at once.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Box<[u8]>,
    program: Arc<Program>,
    limits: MatchLimits,
    interrupt: Option<Interrupt>,
}

impl Regex {
    /// Compiles `pattern` with the defaults of [`RegexBuilder`].
    pub fn new(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern).build()
    }

    pub fn builder(pattern: &str) -> RegexBuilder<'_> {
        RegexBuilder::new(pattern)
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Options the pattern was compiled with, dialect defaults included.
    pub fn options(&self) -> Options {
        self.program.options()
    }

    pub fn encoding(&self) -> EncodingRef {
        self.program.encoding()
    }

    pub fn match_limits(&self) -> MatchLimits {
        self.limits
    }

    /// Number of capture groups, not counting group 0.
    pub fn capture_count(&self) -> usize {
        usize::from(self.program.num_captures())
    }

    /// Group names with the groups each one names, in definition order.
    pub fn names(&self) -> impl Iterator<Item = (&str, &[GroupId])> {
        self.program.names().iter()
    }

    /// Groups named `name`, in definition order.
    pub fn name_to_group_numbers(&self, name: &str) -> Option<&[GroupId]> {
        self.program.names().groups(name)
    }

    fn vm<'s>(&self, subject: &'s [u8]) -> VM<'_, 's> {
        let builder = VM::builder(&self.program, subject).limits(self.limits);
        match &self.interrupt {
            Some(interrupt) => builder.interrupt(interrupt.clone()).build(),
            None => builder.build(),
        }
    }

    /// Tries start offsets from `start` to `range`, going backward when
    /// `range < start`. `\G` matches at `start`.
    pub fn search_with(
        &self,
        subject: &(impl AsRef<[u8]> + ?Sized),
        start: usize,
        range: usize,
        options: SearchOptions,
    ) -> Result<SearchOutcome> {
        let subject = subject.as_ref();
        let outcome = self
            .vm(subject)
            .search_with(start, range, options, &mut NoopTracer)?;
        Ok(outcome)
    }

    /// Searches the whole subject.
    pub fn search(&self, subject: &(impl AsRef<[u8]> + ?Sized)) -> Result<SearchOutcome> {
        let subject = subject.as_ref();
        self.search_with(subject, 0, subject.len(), SearchOptions::empty())
    }

    /// Matches at exactly `at`.
    pub fn match_at(&self, subject: &(impl AsRef<[u8]> + ?Sized), at: usize) -> Result<SearchOutcome> {
        Ok(self.vm(subject.as_ref()).match_at(at)?)
    }

    /// Searches the whole subject, recording every VM step.
    pub fn trace(
        &self,
        subject: &(impl AsRef<[u8]> + ?Sized),
        verbosity: Verbosity,
        colors: Colors,
    ) -> Result<(SearchOutcome, String)> {
        let subject = subject.as_ref();
        let mut tracer = PrintTracer::new(&self.program, subject, verbosity, colors);
        let outcome = self
            .vm(subject)
            .search_with(0, subject.len(), SearchOptions::empty(), &mut tracer)?;
        Ok((outcome, tracer.output()))
    }

    pub fn is_match(&self, subject: &(impl AsRef<[u8]> + ?Sized)) -> Result<bool> {
        Ok(self.first(subject.as_ref())?.is_some())
    }

    /// The first match in `subject`.
    pub fn find<'s, S>(&self, subject: &'s S) -> Result<Option<Match<'s>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let subject = subject.as_ref();
        let region = self.first(subject)?;
        Ok(region.map(|region| Match::new(subject, region.whole())))
    }

    /// Capture groups of the first match in `subject`.
    pub fn captures<'s, S>(&self, subject: &'s S) -> Result<Option<Captures<'_, 's>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let subject = subject.as_ref();
        let region = self.first(subject)?;
        Ok(region.map(|region| Captures::new(subject, region, self.program.names())))
    }

    fn first(&self, subject: &[u8]) -> Result<Option<Region>> {
        match self.search(subject)? {
            SearchOutcome::Match(region) => Ok(Some(region)),
            SearchOutcome::NoMatch => Ok(None),
            SearchOutcome::Interrupted => Err(Error::Interrupted),
        }
    }
}
