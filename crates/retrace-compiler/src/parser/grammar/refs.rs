//! Group names and the targets of backreferences, calls and conditions.

use retrace_core::CharType;

use crate::diagnostics::ErrorKind;
use crate::parser::ast::Target;
use crate::parser::core::{PResult, Parser};

impl Parser<'_> {
    /// Parses a reference up to and including `close`: `name`, `3`, `-1`,
    /// or for calls also `+1`. The cursor is just past the opening delimiter.
    pub(super) fn parse_ref_target(&mut self, close: u8, start: usize, is_call: bool) -> PResult<Target> {
        match self.peek() {
            Some(b'-' | b'+') => {
                let sign = self.bump();
                if sign == b'+' && !is_call {
                    return self.error_since(ErrorKind::InvalidBackref, start);
                }
                let Some(n) = self.read_decimal()? else {
                    return self.error_since(ErrorKind::InvalidBackref, start);
                };
                self.expect_ref_close(close, start)?;
                if n == 0 {
                    return self.error_since(ErrorKind::InvalidBackref, start);
                }
                let target = if sign == b'-' {
                    (self.group_count + 1).checked_sub(n).filter(|&g| g > 0)
                } else {
                    self.group_count.checked_add(n)
                };
                match target {
                    Some(group) => Ok(Target::Relative(group)),
                    None => self.error_since(ErrorKind::InvalidBackref, start),
                }
            }
            Some(b'0'..=b'9') => {
                let Some(n) = self.read_decimal()? else {
                    return self.error_since(ErrorKind::InvalidBackref, start);
                };
                self.expect_ref_close(close, start)?;
                if n == 0 && !is_call {
                    return self.error_since(ErrorKind::InvalidBackref, start);
                }
                Ok(Target::Number(n))
            }
            _ => Ok(Target::Name(self.read_group_name(close, start)?)),
        }
    }

    fn expect_ref_close(&mut self, close: u8, start: usize) -> PResult<()> {
        if self.eat(close) {
            return Ok(());
        }
        if matches!(self.peek(), Some(b'+' | b'-')) {
            return self.error_since(ErrorKind::Unsupported("backreference level"), start);
        }
        self.error_since(ErrorKind::InvalidBackref, start)
    }

    /// Reads a group name up to and including `close`.
    ///
    /// A name starts with a word character that is not a digit and continues
    /// with word characters.
    pub(super) fn read_group_name(&mut self, close: u8, start: usize) -> PResult<String> {
        let name_start = self.pos;
        let mut bad_char = false;
        while let Some((code, len)) = self.peek_char() {
            if self.at(close) {
                break;
            }
            if matches!(self.peek(), Some(b'+' | b'-')) && self.pos > name_start {
                let name = self.name_text(name_start);
                self.pos += 1;
                if self.read_decimal()?.is_some() && self.at(close) {
                    return self.error_since(ErrorKind::Unsupported("backreference level"), start);
                }
                return self.error_since(ErrorKind::InvalidCharInGroupName(name), start);
            }
            let first = self.pos == name_start;
            let word = self.enc.is_code_ctype(code, CharType::Word);
            if !word || (first && self.enc.is_code_ctype(code, CharType::Digit)) {
                bad_char = true;
            }
            self.pos += len;
        }
        let name = self.name_text(name_start);
        if !self.eat(close) {
            return self.error_since(ErrorKind::InvalidGroupName(name), start);
        }
        if name.is_empty() {
            return self.error_since(ErrorKind::EmptyGroupName, start);
        }
        if bad_char {
            return self.error_since(ErrorKind::InvalidCharInGroupName(name), start);
        }
        Ok(name)
    }

    fn name_text(&self, from: usize) -> String {
        String::from_utf8_lossy(&self.pattern[from..self.pos]).into_owned()
    }
}
