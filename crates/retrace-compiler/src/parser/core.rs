//! Parser state and low-level cursor operations.

use std::ops::Range;

use retrace_core::encoding::decode_at;
use retrace_core::{CodePoint, EncodingRef, Options, Syntax, SyntaxBehavior, SyntaxOperators};

use crate::diagnostics::{ErrorKind, SyntaxError};
use crate::limits::CompileLimits;

pub(super) type PResult<T> = Result<T, SyntaxError>;

/// Meta-characters whose spelling depends on the dialect (`(` vs `\(`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Meta {
    Alt,
    Open,
    Close,
    Star,
    Plus,
    QMark,
    Interval,
}

/// A group definition in raw (parse-order) numbering.
#[derive(Debug, Clone)]
pub(super) struct GroupDef {
    pub name: Option<String>,
    /// Plain `(...)` group, as opposed to a named one.
    pub plain: bool,
}

/// A numbered reference, remembered for the capture-only-named check.
#[derive(Debug, Clone)]
pub(super) struct NumberedRef {
    pub span: Range<usize>,
}

pub struct Parser<'p> {
    pub(super) pattern: &'p [u8],
    pub(super) pos: usize,
    pub(super) syntax: &'p Syntax,
    pub(super) enc: EncodingRef,
    /// Options in effect at the cursor.
    pub(super) options: Options,
    pub(super) limits: &'p CompileLimits,
    pub(super) depth: u32,
    /// Groups opened so far, in raw numbering; branch reset rewinds it.
    pub(super) group_count: u32,
    /// Indexed by raw group number minus one.
    pub(super) groups: Vec<GroupDef>,
    pub(super) has_named: bool,
    pub(super) numbered_refs: Vec<NumberedRef>,
    pub(super) calls_whole_pattern: bool,
}

impl<'p> Parser<'p> {
    pub fn new(
        pattern: &'p [u8],
        syntax: &'p Syntax,
        options: Options,
        enc: EncodingRef,
        limits: &'p CompileLimits,
    ) -> Self {
        Self {
            pattern,
            pos: 0,
            syntax,
            enc,
            options,
            limits,
            depth: 0,
            group_count: 0,
            groups: Vec::new(),
            has_named: false,
            numbered_refs: Vec::new(),
            calls_whole_pattern: false,
        }
    }

    pub(super) fn allows(&self, op: SyntaxOperators) -> bool {
        self.syntax.allows(op)
    }

    pub(super) fn behaves(&self, bv: SyntaxBehavior) -> bool {
        self.syntax.behaves(bv)
    }

    pub(super) fn error<T>(&self, kind: ErrorKind, span: Range<usize>) -> PResult<T> {
        Err(SyntaxError::new(kind, span))
    }

    /// Error blamed on the byte range from `start` to the cursor.
    pub(super) fn error_since<T>(&self, kind: ErrorKind, start: usize) -> PResult<T> {
        let end = self.pos.max(start);
        self.error(kind, start..end)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    pub(super) fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    pub(super) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.pattern.get(self.pos + offset).copied()
    }

    pub(super) fn at(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    pub(super) fn at_str(&self, s: &[u8]) -> bool {
        self.pattern[self.pos..].starts_with(s)
    }

    pub(super) fn eat(&mut self, byte: u8) -> bool {
        if self.at(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn eat_str(&mut self, s: &[u8]) -> bool {
        if self.at_str(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub(super) fn bump(&mut self) -> u8 {
        let b = self.pattern[self.pos];
        self.pos += 1;
        b
    }

    /// Decodes the character at the cursor without consuming it.
    pub(super) fn peek_char(&self) -> Option<(CodePoint, usize)> {
        if self.eof() {
            return None;
        }
        Some(decode_at(self.enc, self.pattern, self.pos))
    }

    /// Consumes one character, returning its code and its bytes.
    pub(super) fn bump_char(&mut self) -> (CodePoint, &'p [u8]) {
        let (code, len) = decode_at(self.enc, self.pattern, self.pos);
        let bytes = &self.pattern[self.pos..self.pos + len];
        self.pos += len;
        (code, bytes)
    }

    /// The dialect-dependent meta-character at the cursor and its length.
    pub(super) fn peek_meta(&self) -> Option<(Meta, usize)> {
        use SyntaxOperators as Op;
        let b = self.peek()?;
        let plain = |meta: Meta, op: Op| self.allows(op).then_some((meta, 1));
        match b {
            b'|' => plain(Meta::Alt, Op::VBAR_ALT),
            b'(' => plain(Meta::Open, Op::LPAREN_SUBEXP),
            b')' => plain(Meta::Close, Op::LPAREN_SUBEXP),
            b'*' => plain(Meta::Star, Op::ASTERISK_ZERO_INF),
            b'+' => plain(Meta::Plus, Op::PLUS_ONE_INF),
            b'?' => plain(Meta::QMark, Op::QMARK_ZERO_ONE),
            b'{' => plain(Meta::Interval, Op::BRACE_INTERVAL),
            b'\\' => {
                let escaped = |meta: Meta, op: Op| self.allows(op).then_some((meta, 2));
                match self.peek_at(1)? {
                    b'|' => escaped(Meta::Alt, Op::ESC_VBAR_ALT),
                    b'(' => escaped(Meta::Open, Op::ESC_LPAREN_SUBEXP),
                    b')' => escaped(Meta::Close, Op::ESC_LPAREN_SUBEXP),
                    b'*' => escaped(Meta::Star, Op::ESC_ASTERISK_ZERO_INF),
                    b'+' => escaped(Meta::Plus, Op::ESC_PLUS_ONE_INF),
                    b'?' => escaped(Meta::QMark, Op::ESC_QMARK_ZERO_ONE),
                    b'{' => escaped(Meta::Interval, Op::ESC_BRACE_INTERVAL),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Skips whitespace and `#` comments when extended mode is on.
    pub(super) fn skip_extended(&mut self) {
        if !self.options.contains(Options::EXTEND) {
            return;
        }
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x0b' => self.pos += 1,
                b'#' => {
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Enters one nesting level of groups or classes.
    pub(super) fn descend(&mut self, start: usize) -> PResult<()> {
        self.depth += 1;
        if self.depth > self.limits.parse_depth {
            return self.error(ErrorKind::ParseDepthLimit, start..start + 1);
        }
        Ok(())
    }

    pub(super) fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Reads a decimal number, failing on overflow past `u32`.
    pub(super) fn read_decimal(&mut self) -> PResult<Option<u32>> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            self.pos += 1;
            value = value * 10 + u64::from(b - b'0');
            if value > u64::from(u32::MAX) {
                return self.error_since(ErrorKind::TooBigNumber, start);
            }
        }
        Ok((self.pos > start).then_some(value as u32))
    }

    /// Reads up to `max_digits` digits in `radix`.
    pub(super) fn read_radix(&mut self, radix: u32, max_digits: usize) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while self.pos - start < max_digits {
            let Some(d) = self.peek().and_then(|b| (b as char).to_digit(radix)) else {
                break;
            };
            value = value.wrapping_mul(radix).wrapping_add(d);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }
}

impl Parser<'_> {
    /// Parses the whole pattern.
    pub fn parse_root(&mut self) -> PResult<super::ast::Node> {
        let root = self.parse_alternation(false)?;
        self.assert_consumed();
        Ok(root)
    }
}
