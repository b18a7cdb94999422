//! Escapes that denote a single character, and property names.

use retrace_core::{CharType, CodePoint, SyntaxOperators as Op};

use crate::diagnostics::ErrorKind;
use crate::parser::core::{PResult, Parser};

/// A character written as an escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Escaped {
    /// A code point, encoded with the pattern's encoding.
    Code(CodePoint),
    /// A raw byte (`\xHH`, short octal), taken as-is.
    Byte(u8),
}

impl Escaped {
    pub(super) fn code(self) -> CodePoint {
        match self {
            Escaped::Code(code) => code,
            Escaped::Byte(b) => CodePoint::from(b),
        }
    }
}

const MAX_WIDE_CHAR: u32 = 0x7fff_ffff;

impl Parser<'_> {
    /// Parses a character escape; the cursor is just past the backslash.
    ///
    /// Unknown escapes stand for the escaped character itself.
    pub(super) fn parse_char_escape(&mut self, in_class: bool, start: usize) -> PResult<Escaped> {
        let Some(c) = self.peek() else {
            return self.error(ErrorKind::EndPatternAtEscape, start..self.pos);
        };
        let control = self.allows(Op::ESC_CONTROL_CHARS);
        let simple = match c {
            b't' if control => Some(0x09),
            b'n' if control => Some(0x0a),
            b'r' if control => Some(0x0d),
            b'f' if control => Some(0x0c),
            b'a' if control => Some(0x07),
            b'e' if control => Some(0x1b),
            b'v' if self.allows(Op::ESC_V_VTAB) => Some(0x0b),
            b'b' if in_class => Some(0x08),
            _ => None,
        };
        if let Some(code) = simple {
            self.pos += 1;
            return Ok(Escaped::Code(code));
        }

        match c {
            b'x' if self.allows(Op::ESC_X_BRACE_HEX8) && self.peek_at(1) == Some(b'{') => {
                self.pos += 2;
                let code = self.read_braced(16, 8, start)?;
                Ok(Escaped::Code(code))
            }
            b'x' if self.allows(Op::ESC_X_HEX2) => {
                self.pos += 1;
                match self.read_radix(16, 2) {
                    Some(v) if in_class => Ok(Escaped::Code(v)),
                    Some(v) => Ok(Escaped::Byte(v as u8)),
                    None => Ok(Escaped::Code(0)),
                }
            }
            b'u' if self.allows(Op::ESC_U_HEX4) => {
                self.pos += 1;
                let digits = self.pos;
                let code = self.read_radix(16, 4);
                match code {
                    Some(code) if self.pos - digits == 4 => Ok(Escaped::Code(code)),
                    _ => self.error_since(ErrorKind::InvalidCodePoint, start),
                }
            }
            b'o' if self.allows(Op::ESC_O_BRACE_OCTAL) && self.peek_at(1) == Some(b'{') => {
                self.pos += 2;
                let code = self.read_braced(8, 11, start)?;
                Ok(Escaped::Code(code))
            }
            b'0'..=b'7' if self.allows(Op::ESC_OCTAL3) => {
                let v = self.read_radix(8, 3).unwrap_or(0);
                if v > 0xff || in_class {
                    Ok(Escaped::Code(v))
                } else {
                    Ok(Escaped::Byte(v as u8))
                }
            }
            b'c' if self.allows(Op::ESC_C_CONTROL) => {
                self.pos += 1;
                let Some(x) = self.peek() else {
                    return self.error(ErrorKind::EndPatternAtControl, start..self.pos);
                };
                self.pos += 1;
                let code = if x == b'?' { 0x7f } else { u32::from(x & 0x1f) };
                Ok(Escaped::Code(code))
            }
            _ => {
                let (code, _) = self.bump_char();
                Ok(Escaped::Code(code))
            }
        }
    }

    /// Reads digits up to a closing brace: `{7F}` after `\x` or `\o`.
    fn read_braced(&mut self, radix: u32, max_digits: usize, start: usize) -> PResult<CodePoint> {
        let digits = self.pos;
        let mut value: u64 = 0;
        while let Some(d) = self.peek().and_then(|b| (b as char).to_digit(radix)) {
            self.pos += 1;
            value = value * u64::from(radix) + u64::from(d);
            if self.pos - digits > max_digits || value > u64::from(MAX_WIDE_CHAR) {
                return self.error_since(ErrorKind::TooBigWideCharValue, start);
            }
        }
        if self.pos == digits || !self.eat(b'}') {
            return self.error_since(ErrorKind::InvalidCodePoint, start);
        }
        Ok(value as CodePoint)
    }

    /// Parses `p{Name}`, `p{^Name}` or `P{Name}`; the cursor is on the `p`.
    ///
    /// Returns the type and whether it is negated.
    pub(super) fn parse_property(&mut self, start: usize) -> PResult<(CharType, bool)> {
        let mut negated = self.bump() == b'P';
        self.pos += 1;
        if self.at(b'^') && self.allows(Op::ESC_P_BRACE_CIRCUMFLEX_NOT) {
            self.pos += 1;
            negated = !negated;
        }
        let name_start = self.pos;
        while !self.eof() && !self.at(b'}') {
            self.pos += 1;
        }
        let name = String::from_utf8_lossy(&self.pattern[name_start..self.pos]).into_owned();
        if !self.eat(b'}') {
            return self.error_since(ErrorKind::InvalidPropertyName(name), start);
        }
        match self.enc.property_ctype(&name) {
            Some(ctype) => Ok((ctype, negated)),
            None => self.error_since(ErrorKind::InvalidPropertyName(name), start),
        }
    }
}
