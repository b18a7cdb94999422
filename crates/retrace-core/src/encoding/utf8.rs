use super::{CharType, CodePoint, CodeRange, Encoding, InvalidCodePoint, unicode};

/// UTF-8. Malformed sequences decode byte-wise so matching never stalls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

pub static UTF8: Utf8 = Utf8;

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl Encoding for Utf8 {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn char_len(&self, head: u8) -> usize {
        match head {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 1,
        }
    }

    fn min_char_len(&self) -> usize {
        1
    }

    fn max_char_len(&self) -> usize {
        4
    }

    fn max_code(&self) -> CodePoint {
        0x10FFFF
    }

    fn decode(&self, bytes: &[u8]) -> CodePoint {
        let head = bytes[0];
        let len = self.char_len(head).min(bytes.len());
        if len == 1 {
            return CodePoint::from(head);
        }
        let mut code = CodePoint::from(head & (0x7F >> len));
        for &byte in &bytes[1..len] {
            if !is_continuation(byte) {
                return CodePoint::from(head);
            }
            code = (code << 6) | CodePoint::from(byte & 0x3F);
        }
        code
    }

    fn encode(&self, code: CodePoint, out: &mut Vec<u8>) -> Result<usize, InvalidCodePoint> {
        let c = char::from_u32(code).ok_or(InvalidCodePoint(code))?;
        let mut buf = [0u8; 4];
        let encoded = c.encode_utf8(&mut buf);
        out.extend_from_slice(encoded.as_bytes());
        Ok(encoded.len())
    }

    fn fold_case(&self, bytes: &[u8], out: &mut Vec<u8>) -> usize {
        let head = bytes[0];
        if head < 0x80 {
            out.push(head.to_ascii_lowercase());
            return 1;
        }
        let len = self.char_len(head).min(bytes.len());
        let code = self.decode(&bytes[..len]);
        let mut folded = Vec::with_capacity(3);
        unicode::fold_code(code, self.max_code(), &mut folded);
        for code in folded {
            if self.encode(code, out).is_err() {
                out.extend_from_slice(&bytes[..len]);
                return len;
            }
        }
        len
    }

    fn for_each_fold(&self, f: &mut dyn FnMut(CodePoint, &[CodePoint])) {
        unicode::for_each_fold(self.max_code(), f);
    }

    fn property_ctype(&self, name: &str) -> Option<CharType> {
        unicode::resolve_property(name, true)
    }

    fn is_code_ctype(&self, code: CodePoint, ctype: CharType) -> bool {
        unicode::is_code_ctype(code, ctype)
    }

    fn ctype_ranges(&self, ctype: CharType) -> &'static [CodeRange] {
        unicode::ctype_ranges(ctype, self.max_code())
    }

    fn left_adjust_char_head(&self, bytes: &[u8], at: usize) -> usize {
        if at >= bytes.len() {
            return at;
        }
        let floor = at.saturating_sub(3);
        let mut p = at;
        while p > floor && is_continuation(bytes[p]) {
            p -= 1;
        }
        // A stray continuation byte is a character of its own.
        if is_continuation(bytes[p]) || p + self.char_len(bytes[p]) <= at {
            at
        } else {
            p
        }
    }

    fn is_backward_scan_safe(&self) -> bool {
        true
    }
}
