use super::{CharType, CodePoint, CodeRange, Encoding, InvalidCodePoint, unicode};

/// 7-bit ASCII. Bytes above 0x7f decode to their own value and belong to no
/// character type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

pub static ASCII: Ascii = Ascii;

fn is_ascii_ctype(code: CodePoint, ctype: CharType) -> bool {
    code < 0x80 && unicode::is_code_ctype(code, ctype)
}

impl Encoding for Ascii {
    fn name(&self) -> &'static str {
        "ASCII"
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
        0x7F
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
        out.push(bytes[0].to_ascii_lowercase());
        1
    }

    fn for_each_fold(&self, f: &mut dyn FnMut(CodePoint, &[CodePoint])) {
        for upper in b'A'..=b'Z' {
            let lower = upper.to_ascii_lowercase();
            f(CodePoint::from(upper), &[CodePoint::from(lower)]);
            f(CodePoint::from(lower), &[CodePoint::from(upper)]);
        }
    }

    fn property_ctype(&self, name: &str) -> Option<CharType> {
        unicode::resolve_property(name, false)
    }

    fn is_code_ctype(&self, code: CodePoint, ctype: CharType) -> bool {
        is_ascii_ctype(code, ctype)
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
