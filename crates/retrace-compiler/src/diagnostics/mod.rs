//! Syntax errors and their rendering.
//!
//! Every user-facing failure of [`crate::compile()`] is a [`SyntaxError`]: a
//! kind with a stable numeric code and the byte span of the pattern that
//! caused it.

mod printer;

#[cfg(test)]
mod diagnostics_tests;

use std::ops::Range;

/// What went wrong while reading a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("end pattern at left brace")]
    EndPatternAtLeftBrace,
    #[error("end pattern at left bracket")]
    EndPatternAtLeftBracket,
    #[error("empty char-class")]
    EmptyCharClass,
    #[error("premature end of char-class")]
    PrematureEndOfCharClass,
    #[error("end pattern at escape")]
    EndPatternAtEscape,
    #[error("end pattern at meta")]
    EndPatternAtMeta,
    #[error("end pattern at control")]
    EndPatternAtControl,
    #[error("invalid meta-code syntax")]
    MetaCodeSyntax,
    #[error("invalid control-code syntax")]
    ControlCodeSyntax,
    #[error("char-class value at end of range")]
    CharClassValueAtEndOfRange,
    #[error("char-class value at start of range")]
    CharClassValueAtStartOfRange,
    #[error("target of repeat operator is not specified")]
    TargetOfRepeatNotSpecified,
    #[error("target of repeat operator is invalid")]
    TargetOfRepeatInvalid,
    #[error("nested repeat operator")]
    NestedRepeat,
    #[error("unmatched close parenthesis")]
    UnmatchedCloseParenthesis,
    #[error("end pattern with unmatched parenthesis")]
    UnmatchedOpenParenthesis,
    #[error("end pattern in group")]
    EndPatternInGroup,
    #[error("undefined group option")]
    UndefinedGroupOption,
    #[error("invalid group option")]
    InvalidGroupOption,
    #[error("invalid POSIX bracket type")]
    InvalidPosixBracketType,
    #[error("invalid pattern in look-behind")]
    InvalidLookBehind,
    #[error("invalid repeat range {{lower,upper}}")]
    InvalidRepeatRange,
    #[error("too big number")]
    TooBigNumber,
    #[error("too big number for repeat range")]
    RepeatCountTooLarge,
    #[error("upper bound is smaller than lower bound in repeat range")]
    UpperSmallerThanLower,
    #[error("empty range in char class")]
    EmptyRangeInCharClass,
    #[error("too big backref number")]
    TooBigBackrefNumber,
    #[error("invalid backref number/name")]
    InvalidBackref,
    #[error("numbered backref/call is not allowed (use name)")]
    NumberedRefNotAllowed,
    #[error("too many captures")]
    TooManyCaptures,
    #[error("group name is empty")]
    EmptyGroupName,
    #[error("invalid group name <{0}>")]
    InvalidGroupName(String),
    #[error("invalid char in group name <{0}>")]
    InvalidCharInGroupName(String),
    #[error("undefined name <{0}> reference")]
    UndefinedName(String),
    #[error("undefined group <{0}> reference")]
    UndefinedGroupReference(String),
    #[error("multiplex defined name <{0}>")]
    MultiplexDefinedName(String),
    #[error("multiplex definition name <{0}> call")]
    MultiplexDefinitionNameCall(String),
    #[error("never ending recursion")]
    NeverEndingRecursion,
    #[error("invalid character property name {{{0}}}")]
    InvalidPropertyName(String),
    #[error("invalid if-else syntax")]
    InvalidConditionPattern,
    #[error("invalid absent group pattern")]
    InvalidAbsentGroup,
    #[error("invalid code point value")]
    InvalidCodePoint,
    #[error("too big wide-char value")]
    TooBigWideCharValue,
    #[error("{0} is not supported by this syntax")]
    Unsupported(&'static str),
    #[error("parse depth limit over")]
    ParseDepthLimit,
    #[error("invalid combination of options")]
    InvalidCombinationOfOptions,
}

impl ErrorKind {
    /// Stable numeric code; negative, grouped by category.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::ParseDepthLimit => -16,
            ErrorKind::EndPatternAtLeftBrace => -100,
            ErrorKind::EndPatternAtLeftBracket => -101,
            ErrorKind::EmptyCharClass => -102,
            ErrorKind::PrematureEndOfCharClass => -103,
            ErrorKind::EndPatternAtEscape => -104,
            ErrorKind::EndPatternAtMeta => -105,
            ErrorKind::EndPatternAtControl => -106,
            ErrorKind::MetaCodeSyntax => -108,
            ErrorKind::ControlCodeSyntax => -109,
            ErrorKind::CharClassValueAtEndOfRange => -110,
            ErrorKind::CharClassValueAtStartOfRange => -111,
            ErrorKind::TargetOfRepeatNotSpecified => -113,
            ErrorKind::TargetOfRepeatInvalid => -114,
            ErrorKind::NestedRepeat => -115,
            ErrorKind::UnmatchedCloseParenthesis => -116,
            ErrorKind::UnmatchedOpenParenthesis => -117,
            ErrorKind::EndPatternInGroup => -118,
            ErrorKind::UndefinedGroupOption => -119,
            ErrorKind::InvalidGroupOption => -120,
            ErrorKind::InvalidPosixBracketType => -121,
            ErrorKind::InvalidLookBehind => -122,
            ErrorKind::InvalidRepeatRange => -123,
            ErrorKind::TooBigNumber => -200,
            ErrorKind::RepeatCountTooLarge => -201,
            ErrorKind::UpperSmallerThanLower => -202,
            ErrorKind::EmptyRangeInCharClass => -203,
            ErrorKind::TooBigBackrefNumber => -207,
            ErrorKind::InvalidBackref => -208,
            ErrorKind::NumberedRefNotAllowed => -209,
            ErrorKind::TooManyCaptures => -210,
            ErrorKind::EmptyGroupName => -214,
            ErrorKind::InvalidGroupName(_) => -215,
            ErrorKind::InvalidCharInGroupName(_) => -216,
            ErrorKind::UndefinedName(_) => -217,
            ErrorKind::UndefinedGroupReference(_) => -218,
            ErrorKind::MultiplexDefinedName(_) => -219,
            ErrorKind::MultiplexDefinitionNameCall(_) => -220,
            ErrorKind::NeverEndingRecursion => -221,
            ErrorKind::InvalidPropertyName(_) => -223,
            ErrorKind::InvalidConditionPattern => -224,
            ErrorKind::InvalidAbsentGroup => -225,
            ErrorKind::Unsupported(_) => -230,
            ErrorKind::InvalidCodePoint => -400,
            ErrorKind::TooBigWideCharValue => -401,
            ErrorKind::InvalidCombinationOfOptions => -403,
        }
    }
}

/// A rejected pattern: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {}", span.start)]
pub struct SyntaxError {
    pub kind: ErrorKind,
    /// Byte range of the pattern blamed for the error.
    pub span: Range<usize>,
}

impl SyntaxError {
    pub fn new(kind: ErrorKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    /// Byte offset of the offending construct.
    pub fn offset(&self) -> usize {
        self.span.start
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Annotated report pointing into `pattern`.
    pub fn render(&self, pattern: &str, colored: bool) -> String {
        printer::render(self, pattern, colored)
    }
}
