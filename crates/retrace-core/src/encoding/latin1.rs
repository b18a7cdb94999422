use super::{CharType, CodePoint, CodeRange, Encoding, InvalidCodePoint, unicode};

/// ISO-8859-1: one byte per character, code point equal to the byte value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

pub static LATIN1: Latin1 = Latin1;

fn is_latin1_ctype(code: CodePoint, ctype: CharType) -> bool {
    code <= 0xFF && unicode::is_code_ctype(code, ctype)
}

impl Encoding for Latin1 {
    fn name(&self) -> &'static str {
        "ISO-8859-1"
    }

    fn char_len(&self, _head: u8) -> usize {
        1
    }

    fn min_char_len(&self) -> usize {
        1
    }

    fn max_char_len(&self) -> usize {
        1
    }

    fn max_code(&self) -> CodePoint {
        0xFF
    }

    fn decode(&self, bytes: &[u8]) -> CodePoint {
        CodePoint::from(bytes[0])
    }

    fn encode(&self, code: CodePoint, out: &mut Vec<u8>) -> Result<usize, InvalidCodePoint> {
        let byte = u8::try_from(code).map_err(|_| InvalidCodePoint(code))?;
        out.push(byte);
        Ok(1)
    }

    fn fold_case(&self, bytes: &[u8], out: &mut Vec<u8>) -> usize {
        let mut folded = Vec::with_capacity(2);
        unicode::fold_code(CodePoint::from(bytes[0]), self.max_code(), &mut folded);
        // Every folded code point of a Latin-1 character is itself Latin-1.
        out.extend(folded.into_iter().map(|code| code as u8));
        1
    }

    fn for_each_fold(&self, f: &mut dyn FnMut(CodePoint, &[CodePoint])) {
        unicode::for_each_fold(self.max_code(), f);
    }

    fn property_ctype(&self, name: &str) -> Option<CharType> {
        unicode::resolve_property(name, false)
    }

    fn is_code_ctype(&self, code: CodePoint, ctype: CharType) -> bool {
        is_latin1_ctype(code, ctype)
    }

    fn ctype_ranges(&self, ctype: CharType) -> &'static [CodeRange] {
        unicode::ctype_ranges(ctype, self.max_code())
    }

    fn left_adjust_char_head(&self, _bytes: &[u8], at: usize) -> usize {
        at
    }

    fn is_backward_scan_safe(&self) -> bool {
        true
    }
}
