//! Single atoms: literals, dots, anchors and backslash escapes.

use retrace_core::{CharType, Options, SyntaxBehavior as Bv, SyntaxOperators as Op};

use super::escapes::Escaped;
use crate::diagnostics::ErrorKind;
use crate::parser::ast::{Anchor, GroupKind, Node, NodeKind, Target};
use crate::parser::core::{Meta, NumberedRef, PResult, Parser};

/// What one atom position produced.
pub(in crate::parser) enum Atom {
    Node(Node),
    /// A comment; nothing to match.
    Skip,
    /// `(?imx)` without a body: options for the rest of the enclosing group.
    OptionsRest(Options),
}

impl Parser<'_> {
    pub(super) fn parse_atom(&mut self) -> PResult<Atom> {
        let start = self.pos;

        if let Some((meta, len)) = self.peek_meta() {
            match meta {
                Meta::Open => return self.parse_group(),
                Meta::Star | Meta::Plus | Meta::QMark => {
                    if self.behaves(Bv::CONTEXT_INDEP_REPEAT_OPS)
                        && self.behaves(Bv::CONTEXT_INVALID_REPEAT_OPS)
                    {
                        return self.error(ErrorKind::TargetOfRepeatNotSpecified, start..start + len);
                    }
                    return Ok(Atom::Node(self.literal_bytes(start, len)));
                }
                Meta::Interval => {
                    if self.at_valid_interval()? && self.behaves(Bv::CONTEXT_INVALID_REPEAT_OPS) {
                        return self.error(ErrorKind::TargetOfRepeatNotSpecified, start..start + len);
                    }
                    return Ok(Atom::Node(self.literal_bytes(start, len)));
                }
                // Only reached for a stray `)` the dialect reads literally.
                Meta::Close => return Ok(Atom::Node(self.literal_bytes(start, len))),
                Meta::Alt => {}
            }
        }

        let node = match self.peek() {
            Some(b'[') if self.allows(Op::BRACKET_CC) => self.parse_class()?,
            Some(b'.') if self.allows(Op::DOT_ANYCHAR) => {
                self.pos += 1;
                let multiline = self.options.contains(Options::MULTILINE);
                Node::new(NodeKind::AnyChar { multiline }, start..self.pos)
            }
            Some(b'^') if self.allows(Op::LINE_ANCHOR) => {
                self.pos += 1;
                let anchor = if self.options.contains(Options::SINGLELINE) {
                    Anchor::BeginBuf
                } else {
                    Anchor::BeginLine
                };
                Node::new(NodeKind::Anchor(anchor), start..self.pos)
            }
            Some(b'$') if self.allows(Op::LINE_ANCHOR) => {
                self.pos += 1;
                let anchor = if self.options.contains(Options::SINGLELINE) {
                    Anchor::SemiEndBuf
                } else {
                    Anchor::EndLine
                };
                Node::new(NodeKind::Anchor(anchor), start..self.pos)
            }
            Some(b'\\') => self.parse_escape()?,
            _ => {
                let (_, bytes) = self.bump_char();
                self.literal(bytes.to_vec(), start)
            }
        };
        Ok(Atom::Node(node))
    }

    pub(in crate::parser) fn literal(&self, bytes: Vec<u8>, start: usize) -> Node {
        let ignore_case = self.options.contains(Options::IGNORECASE);
        Node::new(NodeKind::Literal { bytes, ignore_case }, start..self.pos)
    }

    fn literal_bytes(&mut self, start: usize, len: usize) -> Node {
        let bytes = self.pattern[start + len - 1..start + len].to_vec();
        self.pos = start + len;
        self.literal(bytes, start)
    }

    fn parse_escape(&mut self) -> PResult<Node> {
        let start = self.pos;
        self.pos += 1;
        let Some(c) = self.peek() else {
            return self.error(ErrorKind::EndPatternAtEscape, start..self.pos);
        };

        if let Some((ctype, negated, ascii)) = self.escape_ctype(c) {
            self.pos += 1;
            return Ok(Node::new(
                NodeKind::CharType {
                    ctype,
                    negated,
                    ascii,
                },
                start..self.pos,
            ));
        }

        if matches!(c, b'p' | b'P')
            && self.allows(Op::ESC_P_BRACE_CHAR_PROPERTY)
            && self.peek_at(1) == Some(b'{')
        {
            let (ctype, negated) = self.parse_property(start)?;
            return Ok(Node::new(
                NodeKind::CharType {
                    ctype,
                    negated,
                    ascii: false,
                },
                start..self.pos,
            ));
        }

        let anchor = |p: &mut Self, anchor: Anchor| -> PResult<Node> {
            p.pos += 1;
            Ok(Node::new(NodeKind::Anchor(anchor), start..p.pos))
        };
        let word_ascii = self.options.contains(Options::WORD_IS_ASCII);
        match c {
            b'A' | b'z' | b'Z' if self.allows(Op::ESC_AZ_BUF_ANCHOR) => {
                let kind = match c {
                    b'A' => Anchor::BeginBuf,
                    b'z' => Anchor::EndBuf,
                    _ => Anchor::SemiEndBuf,
                };
                return anchor(self, kind);
            }
            b'G' if self.allows(Op::ESC_CAPITAL_G_BEGIN_ANCHOR) => {
                return anchor(self, Anchor::BeginPosition);
            }
            b'b' if self.allows(Op::ESC_B_WORD_BOUND) => {
                return anchor(self, Anchor::WordBoundary { ascii: word_ascii });
            }
            b'B' if self.allows(Op::ESC_B_WORD_BOUND) => {
                return anchor(self, Anchor::NotWordBoundary { ascii: word_ascii });
            }
            b'<' if self.allows(Op::ESC_LTGT_WORD_BEGIN_END) => {
                return anchor(self, Anchor::WordBegin { ascii: word_ascii });
            }
            b'>' if self.allows(Op::ESC_LTGT_WORD_BEGIN_END) => {
                return anchor(self, Anchor::WordEnd { ascii: word_ascii });
            }
            b'K' if self.allows(Op::ESC_CAPITAL_K_KEEP) => return anchor(self, Anchor::Keep),
            b'R' if self.allows(Op::ESC_CAPITAL_R_GENERAL_NEWLINE) => {
                self.pos += 1;
                return Ok(self.general_newline(start));
            }
            b'N' if self.allows(Op::ESC_CAPITAL_N_O_SUPER_DOT) => {
                self.pos += 1;
                return Ok(Node::new(NodeKind::AnyChar { multiline: false }, start..self.pos));
            }
            b'X' => {
                return self.error(ErrorKind::Unsupported("\\X"), start..self.pos + 1);
            }
            b'Q' if self.allows(Op::ESC_CAPITAL_Q_QUOTE) => {
                self.pos += 1;
                let body_start = self.pos;
                while !self.eof() && !self.at_str(b"\\E") {
                    self.pos += 1;
                }
                let bytes = self.pattern[body_start..self.pos].to_vec();
                self.eat_str(b"\\E");
                return Ok(self.literal(bytes, start));
            }
            b'k' if self.allows(Op::ESC_K_NAMED_BACKREF) && matches!(self.peek_at(1), Some(b'<' | b'\'')) => {
                self.pos += 1;
                let close = if self.bump() == b'<' { b'>' } else { b'\'' };
                let target = self.parse_ref_target(close, start, false)?;
                return Ok(self.backref(target, start));
            }
            b'g' if self.allows(Op::ESC_G_SUBEXP_CALL) && matches!(self.peek_at(1), Some(b'<' | b'\'')) => {
                self.pos += 1;
                let close = if self.bump() == b'<' { b'>' } else { b'\'' };
                let target = self.parse_ref_target(close, start, true)?;
                return Ok(self.call(target, start));
            }
            b'1'..=b'9' => {
                if let Some(node) = self.parse_decimal_backref(start)? {
                    return Ok(node);
                }
            }
            _ => {}
        }

        match self.parse_char_escape(false, start)? {
            Escaped::Byte(b) => Ok(self.literal(vec![b], start)),
            Escaped::Code(code) => {
                let mut bytes = Vec::new();
                if self.enc.encode(code, &mut bytes).is_err() {
                    return self.error_since(ErrorKind::InvalidCodePoint, start);
                }
                Ok(self.literal(bytes, start))
            }
        }
    }

    /// `\w \d \s \h` and their negations, if `c` names one.
    ///
    /// Returns the type, whether it is negated, and whether it is limited to ASCII.
    pub(super) fn escape_ctype(&mut self, c: u8) -> Option<(CharType, bool, bool)> {
        let opts = self.options;
        let negated = c.is_ascii_uppercase();
        match c.to_ascii_lowercase() {
            b'w' if self.allows(Op::ESC_W_WORD) => {
                Some((CharType::Word, negated, opts.contains(Options::WORD_IS_ASCII)))
            }
            b'd' if self.allows(Op::ESC_D_DIGIT) => {
                Some((CharType::Digit, negated, opts.contains(Options::DIGIT_IS_ASCII)))
            }
            b's' if self.allows(Op::ESC_S_WHITE_SPACE) => {
                Some((CharType::Space, negated, opts.contains(Options::SPACE_IS_ASCII)))
            }
            b'h' if self.allows(Op::ESC_H_XDIGIT) => Some((CharType::XDigit, negated, false)),
            b'h' if self.allows(Op::OPTION_PERL) => Some((CharType::Blank, negated, false)),
            _ => None,
        }
    }

    /// `\R`: `\r\n` or any single vertical-space character, atomically.
    fn general_newline(&self, start: usize) -> Node {
        let span = start..self.pos;
        let max = self.enc.max_code();
        let ranges: Vec<_> = [(0x0a, 0x0d), (0x85, 0x85), (0x2028, 0x2029)]
            .into_iter()
            .filter(|&(lo, _)| lo <= max)
            .collect();
        let crlf = Node::new(
            NodeKind::Literal {
                bytes: b"\r\n".to_vec(),
                ignore_case: false,
            },
            span.clone(),
        );
        let single = Node::new(
            NodeKind::Class {
                ranges,
                negated: false,
            },
            span.clone(),
        );
        let alt = Node::new(NodeKind::Alternation(vec![crlf, single]), span.clone());
        Node::new(
            NodeKind::Group {
                kind: GroupKind::Atomic,
                body: Box::new(alt),
            },
            span,
        )
    }

    /// `\1`..`\9` and longer numbers naming an existing group; otherwise the
    /// digits are an octal escape or a literal.
    fn parse_decimal_backref(&mut self, start: usize) -> PResult<Option<Node>> {
        if !self.allows(Op::DECIMAL_BACKREF) {
            return Ok(None);
        }
        let digits = self.pos;
        let n = self.read_decimal()?.unwrap_or(0);
        if n <= 9 || n <= self.group_count {
            if n > u32::from(self.limits.max_captures) {
                return self.error_since(ErrorKind::TooBigBackrefNumber, start);
            }
            return Ok(Some(self.backref(Target::Number(n), start)));
        }
        self.pos = digits;
        Ok(None)
    }

    pub(in crate::parser) fn backref(&mut self, target: Target, start: usize) -> Node {
        if !matches!(target, Target::Name(_)) {
            self.numbered_refs.push(NumberedRef {
                span: start..self.pos,
            });
        }
        let ignore_case = self.options.contains(Options::IGNORECASE);
        Node::new(
            NodeKind::BackRef {
                target,
                groups: Vec::new(),
                ignore_case,
            },
            start..self.pos,
        )
    }

    pub(in crate::parser) fn call(&mut self, target: Target, start: usize) -> Node {
        match target {
            Target::Number(0) => self.calls_whole_pattern = true,
            Target::Name(_) => {}
            Target::Number(_) | Target::Relative(_) => self.numbered_refs.push(NumberedRef {
                span: start..self.pos,
            }),
        }
        Node::new(NodeKind::Call { target, group: 0 }, start..self.pos)
    }
}
