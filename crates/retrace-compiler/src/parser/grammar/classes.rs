//! Bracket expressions: `[...]` with ranges, POSIX brackets, nesting and `&&`.

use retrace_core::{CharType, CodePoint, Options, SyntaxBehavior as Bv, SyntaxOperators as Op};

use crate::diagnostics::ErrorKind;
use crate::parser::ast::{Node, NodeKind};
use crate::parser::class_set::ClassSet;
use crate::parser::core::{PResult, Parser};

/// One element between the brackets.
enum Item {
    Char(CodePoint),
    Set(ClassSet),
}

impl Parser<'_> {
    /// Parses a whole bracket expression; the cursor is on the `[`.
    ///
    /// Under ignore-case, characters whose fold is several characters long
    /// (`ß` and `ss`) turn the class into an alternation with those strings
    /// tried first.
    pub(super) fn parse_class(&mut self) -> PResult<Node> {
        let start = self.pos;
        let (mut set, negated) = self.parse_bracket()?;
        set.clamp(self.enc.max_code());

        let strings = if self.options.contains(Options::IGNORECASE) {
            self.fold_class(&mut set, negated)
        } else {
            Vec::new()
        };
        if negated && self.behaves(Bv::NOT_NEWLINE_IN_NEGATIVE_CC) {
            set.add(0x0a);
        }

        let span = start..self.pos;
        let class = Node::new(
            NodeKind::Class {
                ranges: set.into_ranges(),
                negated,
            },
            span.clone(),
        );
        if strings.is_empty() {
            return Ok(class);
        }
        let mut branches: Vec<Node> = strings
            .into_iter()
            .map(|bytes| {
                Node::new(
                    NodeKind::Literal {
                        bytes,
                        ignore_case: true,
                    },
                    span.clone(),
                )
            })
            .collect();
        branches.push(class);
        Ok(Node::new(NodeKind::Alternation(branches), span))
    }

    /// Returns the positive set and whether the bracket was negated.
    fn parse_bracket(&mut self) -> PResult<(ClassSet, bool)> {
        let start = self.pos;
        self.descend(start)?;
        self.pos += 1;
        let negated = self.eat(b'^');

        let mut intersection: Option<ClassSet> = None;
        let mut current = ClassSet::new();
        let mut first = true;
        loop {
            let Some(b) = self.peek() else {
                return self.error_since(ErrorKind::PrematureEndOfCharClass, start);
            };
            if b == b']' {
                if !first {
                    self.pos += 1;
                    break;
                }
                // A leading `]` is literal, provided the class closes later.
                if !self.pattern[self.pos + 1..].contains(&b']') {
                    return self.error(ErrorKind::EmptyCharClass, start..self.pos + 1);
                }
            }
            if self.allows(Op::CCLASS_SET_OP) && self.at_str(b"&&") {
                self.pos += 2;
                let left = std::mem::take(&mut current);
                intersection = Some(match intersection {
                    Some(acc) => acc.intersect(&left),
                    None => left,
                });
                first = false;
                continue;
            }

            let item = self.parse_class_item(first)?;
            first = false;
            match item {
                Item::Set(set) => current.add_set(&set),
                Item::Char(lo) => {
                    if !(self.at(b'-') && self.peek_at(1).is_some_and(|b| b != b']')) {
                        current.add(lo);
                        continue;
                    }
                    let range_start = self.pos;
                    self.pos += 1;
                    match self.parse_class_item(false)? {
                        Item::Char(hi) if hi >= lo => current.add_range(lo, hi),
                        Item::Char(_) => {
                            if !self.behaves(Bv::ALLOW_EMPTY_RANGE_IN_CC) {
                                return self.error_since(ErrorKind::EmptyRangeInCharClass, range_start);
                            }
                        }
                        Item::Set(_) => {
                            return self.error_since(ErrorKind::CharClassValueAtEndOfRange, range_start);
                        }
                    }
                }
            }
        }
        self.ascend();

        let set = match intersection {
            Some(acc) => acc.intersect(&current),
            None => current,
        };
        Ok((set, negated))
    }

    fn parse_class_item(&mut self, first: bool) -> PResult<Item> {
        let start = self.pos;
        match self.peek() {
            Some(b'[') if self.allows(Op::POSIX_BRACKET) && self.at_str(b"[:") => {
                if let Some(set) = self.parse_posix_bracket()? {
                    return Ok(Item::Set(set));
                }
            }
            Some(b'[') if self.allows(Op::CCLASS_SET_OP) => {
                let (set, negated) = self.parse_bracket()?;
                let set = if negated {
                    set.complement(self.enc.max_code())
                } else {
                    set
                };
                return Ok(Item::Set(set));
            }
            Some(b']') if first => {
                self.pos += 1;
                return Ok(Item::Char(CodePoint::from(b']')));
            }
            Some(b'\\') if self.behaves(Bv::BACKSLASH_ESCAPE_IN_CC) => {
                self.pos += 1;
                let Some(c) = self.peek() else {
                    return self.error(ErrorKind::EndPatternAtEscape, start..self.pos);
                };
                if let Some((ctype, negated, ascii)) = self.escape_ctype(c) {
                    self.pos += 1;
                    return Ok(Item::Set(self.ctype_set(ctype, negated, ascii)));
                }
                if matches!(c, b'p' | b'P')
                    && self.allows(Op::ESC_P_BRACE_CHAR_PROPERTY)
                    && self.peek_at(1) == Some(b'{')
                {
                    let (ctype, negated) = self.parse_property(start)?;
                    return Ok(Item::Set(self.ctype_set(ctype, negated, false)));
                }
                return Ok(Item::Char(self.parse_char_escape(true, start)?.code()));
            }
            _ => {}
        }
        let (code, _) = self.bump_char();
        Ok(Item::Char(code))
    }

    /// `[:name:]` or `[:^name:]`. Returns `None` with the cursor untouched
    /// when the text is not shaped like a POSIX bracket.
    fn parse_posix_bracket(&mut self) -> PResult<Option<ClassSet>> {
        let start = self.pos;
        self.pos += 2;
        let negated = self.eat(b'^');
        let name_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name_end = self.pos;
        if !self.eat_str(b":]") {
            self.pos = start;
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&self.pattern[name_start..name_end]);
        let Some(ctype) = CharType::from_posix_bracket(&name) else {
            return self.error_since(ErrorKind::InvalidPosixBracketType, start);
        };
        let ascii = self.options.contains(Options::POSIX_IS_ASCII);
        Ok(Some(self.ctype_set(ctype, negated, ascii)))
    }

    fn ctype_set(&self, ctype: CharType, negated: bool, ascii: bool) -> ClassSet {
        let mut set = ClassSet::from_ranges(self.enc.ctype_ranges(ctype));
        if ascii {
            set = set.intersect(&ClassSet::from_ranges(&[(0, 0x7f)]));
        }
        if negated {
            set = set.complement(self.enc.max_code());
        }
        set
    }

    /// Closes `set` under single-character case folding and returns the
    /// encoded multi-character folds of its members.
    fn fold_class(&self, set: &mut ClassSet, negated: bool) -> Vec<Vec<u8>> {
        set.normalize();
        let enc = self.enc;
        let mut singles = Vec::new();
        let mut strings: Vec<Vec<u8>> = Vec::new();
        let view: &ClassSet = set;
        enc.for_each_fold(&mut |from, to| {
            if !view.contains(from) {
                return;
            }
            match to {
                [single] => singles.push(*single),
                _ if !negated => {
                    let mut bytes = Vec::new();
                    if to.iter().all(|&c| enc.encode(c, &mut bytes).is_ok()) {
                        strings.push(bytes);
                    }
                }
                _ => {}
            }
        });
        for code in singles {
            set.add(code);
        }
        strings.sort();
        strings.dedup();
        strings
    }
}
