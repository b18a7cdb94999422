//! Subject access through the program's encoding.
//!
//! Every character step goes through the encoding: the VM never assumes
//! fixed-width characters, and backward moves always land on a character
//! head.

use retrace_core::encoding::{char_len_at, decode_at, fold_str, prev_char_head};
use retrace_core::{CharType, CodePoint, EncodingRef, SearchOptions};

use retrace_bytecode::CharClass;

#[derive(Clone, Copy)]
pub(crate) struct Input<'s> {
    pub(crate) bytes: &'s [u8],
    pub(crate) enc: EncodingRef,
    /// Offset 0 is not a beginning of buffer or line.
    notbol: bool,
    /// The subject end is not an end of buffer or line.
    noteol: bool,
}

impl<'s> Input<'s> {
    pub(crate) fn new(bytes: &'s [u8], enc: EncodingRef, options: SearchOptions) -> Self {
        Self {
            bytes,
            enc,
            notbol: options.contains(SearchOptions::NOTBOL),
            noteol: options.contains(SearchOptions::NOTEOL),
        }
    }

    /// The same subject cut off at `end`.
    pub(crate) fn truncated(self, end: usize) -> Self {
        Self {
            bytes: &self.bytes[..end],
            ..self
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub(crate) fn at_end(&self, pos: usize) -> bool {
        pos >= self.bytes.len()
    }

    /// Byte length of the character at `pos`; `pos` must be before the end.
    #[inline]
    pub(crate) fn char_len(&self, pos: usize) -> usize {
        char_len_at(self.enc, self.bytes, pos)
    }

    #[inline]
    pub(crate) fn decode(&self, pos: usize) -> Option<(CodePoint, usize)> {
        (!self.at_end(pos)).then(|| decode_at(self.enc, self.bytes, pos))
    }

    #[inline]
    pub(crate) fn prev(&self, pos: usize) -> Option<usize> {
        prev_char_head(self.enc, self.bytes, pos)
    }

    /// Moves `pos` left onto a character head.
    pub(crate) fn left_adjust(&self, pos: usize) -> usize {
        if pos == 0 || pos >= self.bytes.len() {
            return pos.min(self.bytes.len());
        }
        self.enc.left_adjust_char_head(self.bytes, pos)
    }

    /// Offset of the character after the one at `pos`.
    pub(crate) fn next(&self, pos: usize) -> usize {
        if self.at_end(pos) { pos + 1 } else { pos + self.char_len(pos) }
    }

    #[inline]
    pub(crate) fn is_newline(&self, pos: usize) -> bool {
        !self.at_end(pos) && self.enc.is_newline(self.bytes, pos)
    }

    pub(crate) fn match_str(&self, pos: usize, lit: &[u8]) -> Option<usize> {
        self.bytes
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(lit))
            .then_some(lit.len())
    }

    /// Length of the input at `pos` whose case fold equals `folded`.
    ///
    /// Input characters are folded one at a time, so a pattern `ss` matches
    /// an input `ß` and the other way around.
    pub(crate) fn match_folded(&self, pos: usize, folded: &[u8], buf: &mut Vec<u8>) -> Option<usize> {
        buf.clear();
        let mut at = pos;
        while buf.len() < folded.len() {
            if self.at_end(at) {
                return None;
            }
            let consumed = self.enc.fold_case(&self.bytes[at..], buf).max(1);
            if !folded.starts_with(&buf[..buf.len().min(folded.len())]) {
                return None;
            }
            at += consumed;
        }
        (buf.as_slice() == folded).then_some(at - pos)
    }

    /// Matches the text of `span` again at `pos`.
    pub(crate) fn match_backref(&self, pos: usize, span: (usize, usize), ignore_case: bool, buf: &mut Vec<u8>) -> Option<usize> {
        let (start, end) = span;
        let text = self.bytes.get(start..end)?;
        if ignore_case {
            let folded = fold_str(self.enc, text);
            self.match_folded(pos, &folded, buf)
        } else {
            self.match_str(pos, text)
        }
    }

    pub(crate) fn match_class(&self, pos: usize, class: &CharClass) -> Option<usize> {
        let (code, len) = self.decode(pos)?;
        class.matches(code).then_some(len)
    }

    pub(crate) fn match_ctype(&self, pos: usize, ctype: CharType, negated: bool, ascii: bool) -> Option<usize> {
        let (code, len) = self.decode(pos)?;
        let has = (!ascii || code < 0x80) && self.enc.is_code_ctype(code, ctype);
        (has != negated).then_some(len)
    }

    /// Any character; a newline only with `multiline`.
    pub(crate) fn match_any(&self, pos: usize, multiline: bool) -> Option<usize> {
        if self.at_end(pos) || (!multiline && self.is_newline(pos)) {
            return None;
        }
        Some(self.char_len(pos))
    }

    fn is_word(&self, pos: usize, ascii: bool) -> bool {
        self.decode(pos)
            .is_some_and(|(code, _)| (!ascii || code < 0x80) && self.enc.is_code_ctype(code, CharType::Word))
    }

    /// Word-ness of the characters before and at `pos`.
    pub(crate) fn word_sides(&self, pos: usize, ascii: bool) -> (bool, bool) {
        let before = self.prev(pos).is_some_and(|p| self.is_word(p, ascii));
        (before, self.is_word(pos, ascii))
    }

    pub(crate) fn is_begin_buf(&self, pos: usize) -> bool {
        pos == 0 && !self.notbol
    }

    pub(crate) fn is_end_buf(&self, pos: usize) -> bool {
        pos == self.bytes.len() && !self.noteol
    }

    /// End of buffer, or a final newline right before it.
    pub(crate) fn is_semi_end_buf(&self, pos: usize) -> bool {
        if pos == self.bytes.len() {
            return !self.noteol;
        }
        self.is_newline(pos) && self.next(pos) == self.bytes.len()
    }

    /// Start of the buffer, or after a newline that does not end it.
    pub(crate) fn is_begin_line(&self, pos: usize) -> bool {
        if pos == 0 {
            return !self.notbol;
        }
        !self.at_end(pos) && self.prev(pos).is_some_and(|p| self.is_newline(p))
    }

    pub(crate) fn is_end_line(&self, pos: usize) -> bool {
        if pos == self.bytes.len() {
            return !self.noteol;
        }
        self.is_newline(pos)
    }
}
