//! Character encodings consumed by the compiler and the VM.
//!
//! An [`Encoding`] is a capability table selected once per pattern. The
//! compiler uses it to decode pattern bytes, resolve property names and
//! expand case-insensitive classes; the VM uses it for every character step,
//! case fold and backward boundary adjustment. Lazily built tables are
//! initialized once per process and then only read; a property name is
//! resolved and interned the first time a pattern uses it.

mod ascii;
mod latin1;
mod unicode;
mod utf8;

#[cfg(test)]
mod encoding_tests;

use std::fmt;

pub use ascii::{ASCII, Ascii};
pub use latin1::{LATIN1, Latin1};
pub use utf8::{UTF8, Utf8};

/// A decoded character value.
pub type CodePoint = u32;

/// Inclusive code point range.
pub type CodeRange = (CodePoint, CodePoint);

/// Shared reference to an encoding table.
pub type EncodingRef = &'static dyn Encoding;

/// A Unicode property resolved from `\p{...}`: its name as first written
/// and its code point ranges.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    name: &'static str,
    ranges: &'static [CodeRange],
}

impl Property {
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Sorted, non-overlapping ranges.
    pub fn ranges(self) -> &'static [CodeRange] {
        self.ranges
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

/// Character types resolvable from POSIX bracket and property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharType {
    Newline,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    XDigit,
    Word,
    Alnum,
    Ascii,
    Any,
    Property(Property),
}

impl CharType {
    /// Built-in types, each with a lazily computed range table.
    pub(crate) const COMPUTED: [CharType; 16] = [
        CharType::Newline,
        CharType::Alpha,
        CharType::Blank,
        CharType::Cntrl,
        CharType::Digit,
        CharType::Graph,
        CharType::Lower,
        CharType::Print,
        CharType::Punct,
        CharType::Space,
        CharType::Upper,
        CharType::XDigit,
        CharType::Word,
        CharType::Alnum,
        CharType::Ascii,
        CharType::Any,
    ];

    pub(crate) fn table_index(self) -> Option<usize> {
        Self::COMPUTED.iter().position(|t| *t == self)
    }

    /// Name used by dumps and traces.
    pub fn name(self) -> &'static str {
        match self {
            CharType::Newline => "newline",
            CharType::Alpha => "alpha",
            CharType::Blank => "blank",
            CharType::Cntrl => "cntrl",
            CharType::Digit => "digit",
            CharType::Graph => "graph",
            CharType::Lower => "lower",
            CharType::Print => "print",
            CharType::Punct => "punct",
            CharType::Space => "space",
            CharType::Upper => "upper",
            CharType::XDigit => "xdigit",
            CharType::Word => "word",
            CharType::Alnum => "alnum",
            CharType::Ascii => "ascii",
            CharType::Any => "any",
            CharType::Property(property) => property.name(),
        }
    }

    /// Names accepted inside `[:...:]`.
    pub fn from_posix_bracket(name: &str) -> Option<Self> {
        Some(match name {
            "alnum" => CharType::Alnum,
            "alpha" => CharType::Alpha,
            "ascii" => CharType::Ascii,
            "blank" => CharType::Blank,
            "cntrl" => CharType::Cntrl,
            "digit" => CharType::Digit,
            "graph" => CharType::Graph,
            "lower" => CharType::Lower,
            "print" => CharType::Print,
            "punct" => CharType::Punct,
            "space" => CharType::Space,
            "upper" => CharType::Upper,
            "xdigit" => CharType::XDigit,
            "word" => CharType::Word,
            _ => return None,
        })
    }
}

/// Error returned when a code point cannot be represented in an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCodePoint(pub CodePoint);

impl fmt::Display for InvalidCodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid code point value 0x{:x}", self.0)
    }
}

impl std::error::Error for InvalidCodePoint {}

/// Capability table for one character encoding.
///
/// Offsets are byte offsets into the subject. Implementations must never
/// panic on malformed input: a truncated or invalid sequence decodes to
/// something and advances by at least one byte.
pub trait Encoding: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Byte length of the character whose first byte is `head`.
    fn char_len(&self, head: u8) -> usize;

    fn min_char_len(&self) -> usize;

    fn max_char_len(&self) -> usize;

    /// Largest representable code point.
    fn max_code(&self) -> CodePoint;

    /// Decodes the character at the front of `bytes`.
    ///
    /// `bytes` must be non-empty.
    fn decode(&self, bytes: &[u8]) -> CodePoint;

    /// Appends the encoded form of `code` to `out`.
    fn encode(&self, code: CodePoint, out: &mut Vec<u8>) -> Result<usize, InvalidCodePoint>;

    /// Case-folds the character at the front of `bytes` into `out`.
    ///
    /// Returns the number of input bytes consumed. The folded form may be
    /// several characters long (e.g. `ß` folds to `ss`).
    fn fold_case(&self, bytes: &[u8], out: &mut Vec<u8>) -> usize;

    /// Calls `f(from, to)` for every fold relation of the encoding.
    ///
    /// Single-character relations are reported in both directions, so every
    /// member of an equivalence class sees every other member. Multi-character
    /// relations report the expansion as `to`.
    fn for_each_fold(&self, f: &mut dyn FnMut(CodePoint, &[CodePoint]));

    /// Resolves a property name (as written in `\p{...}`) to a character type.
    fn property_ctype(&self, name: &str) -> Option<CharType>;

    fn is_code_ctype(&self, code: CodePoint, ctype: CharType) -> bool;

    /// Sorted, non-overlapping ranges of code points having `ctype`.
    fn ctype_ranges(&self, ctype: CharType) -> &'static [CodeRange];

    /// Moves `at` left to the nearest character boundary at or before it.
    fn left_adjust_char_head(&self, bytes: &[u8], at: usize) -> usize;

    /// Whether scanning backward byte by byte always finds character heads.
    fn is_backward_scan_safe(&self) -> bool;

    fn is_newline(&self, bytes: &[u8], at: usize) -> bool {
        bytes.get(at) == Some(&b'\n')
    }

    fn is_single_byte(&self) -> bool {
        self.max_char_len() == 1
    }
}

/// Byte length of the character at `at`, clamped to the end of `bytes`.
pub fn char_len_at(enc: &dyn Encoding, bytes: &[u8], at: usize) -> usize {
    let len = enc.char_len(bytes[at]).max(1);
    len.min(bytes.len() - at)
}

/// Offset of the character boundary preceding `at`, if any.
pub fn prev_char_head(enc: &dyn Encoding, bytes: &[u8], at: usize) -> Option<usize> {
    if at == 0 {
        return None;
    }
    Some(enc.left_adjust_char_head(bytes, at - 1))
}

/// Decodes the character at `at` together with its byte length.
pub fn decode_at(enc: &dyn Encoding, bytes: &[u8], at: usize) -> (CodePoint, usize) {
    let len = char_len_at(enc, bytes, at);
    (enc.decode(&bytes[at..at + len]), len)
}

/// Case-folds a whole byte string into a fresh buffer.
pub fn fold_str(enc: &dyn Encoding, bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut at = 0;
    while at < bytes.len() {
        let consumed = enc.fold_case(&bytes[at..], &mut out).max(1);
        at += consumed;
    }
    out
}
