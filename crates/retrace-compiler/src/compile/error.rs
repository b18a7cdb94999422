use retrace_bytecode::{GroupId, ProgramError};

/// Failure while generating code for an already validated tree.
///
/// Every variant is a limit or a compiler bug; user mistakes in the pattern
/// surface earlier as [`crate::SyntaxError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("label {0} was never bound")]
    UnboundLabel(u32),
    #[error("group {0} is called but was never defined")]
    MissingSubroutine(GroupId),
    #[error("too many {0} in one pattern")]
    TooMany(&'static str),
    #[error("invalid program: {0}")]
    Program(#[from] ProgramError),
}
