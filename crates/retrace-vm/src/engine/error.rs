//! Errors that can occur while matching.

/// A resource limit was hit during a search.
///
/// These are not match outcomes: the search was abandoned before it could
/// decide whether the subject matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// Too many alternatives were resumed while matching at one offset.
    #[error("retry-limit-in-match over ({0})")]
    RetryLimitInMatch(u64),

    /// Too many alternatives were resumed over a whole search.
    #[error("retry-limit-in-search over ({0})")]
    RetryLimitInSearch(u64),

    /// Subexpression calls nested too deeply.
    #[error("subexp-call-limit-in-search over ({0})")]
    RecursionLimitExceeded(u32),

    /// The backtrack stack outgrew its limit.
    #[error("match-stack limit over ({0})")]
    StackLimitExceeded(usize),
}

impl RuntimeError {
    /// Stable negative code, numbered like the syntax error codes.
    pub fn code(&self) -> i32 {
        match self {
            RuntimeError::StackLimitExceeded(_) => -15,
            RuntimeError::RetryLimitInMatch(_) => -17,
            RuntimeError::RetryLimitInSearch(_) => -18,
            RuntimeError::RecursionLimitExceeded(_) => -19,
        }
    }
}

/// Why the dispatch loop leaves the normal fall-through path.
#[derive(Debug)]
pub(crate) enum Control {
    /// Resumed at an alternative; the loop continues from there.
    Backtracked,
    /// The match is final.
    Accept,
    /// No alternative is left at this start offset.
    Exhausted,
    Interrupted,
    Limit(RuntimeError),
}

impl From<RuntimeError> for Control {
    fn from(e: RuntimeError) -> Self {
        Control::Limit(e)
    }
}
