//! Alternations, sequences and quantifiers.

use retrace_core::{SyntaxBehavior as Bv, SyntaxOperators as Op};

use super::Atom;
use crate::diagnostics::ErrorKind;
use crate::parser::ast::{Anchor, Node, NodeKind};
use crate::parser::core::{Meta, PResult, Parser};

/// A parsed repeat operator.
struct Repeat {
    min: u32,
    max: Option<u32>,
    interval: bool,
}

impl Parser<'_> {
    /// Parses `a|b|...` up to the end of the pattern or the enclosing group's close.
    ///
    /// With `branch_reset`, every branch numbers its groups from the same base.
    pub(in crate::parser) fn parse_alternation(&mut self, branch_reset: bool) -> PResult<Node> {
        let start = self.pos;
        let base = self.group_count;
        let mut highest = base;

        let mut branches = Vec::new();
        loop {
            if branch_reset {
                self.group_count = base;
            }
            branches.push(self.parse_sequence()?);
            highest = highest.max(self.group_count);
            match self.peek_meta() {
                Some((Meta::Alt, len)) => self.pos += len,
                _ => break,
            }
        }
        if branch_reset {
            self.group_count = highest;
        }

        if branches.len() == 1 {
            return Ok(branches.swap_remove(0));
        }
        Ok(Node::new(NodeKind::Alternation(branches), start..self.pos))
    }

    fn parse_sequence(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut items: Vec<Node> = Vec::new();

        loop {
            self.skip_extended();
            if self.eof() {
                break;
            }
            match self.peek_meta() {
                Some((Meta::Alt, _)) => break,
                Some((Meta::Close, len)) if self.depth == 0 => {
                    if !self.behaves(Bv::ALLOW_UNMATCHED_CLOSE_SUBEXP) {
                        return self.error(ErrorKind::UnmatchedCloseParenthesis, self.pos..self.pos + len);
                    }
                }
                Some((Meta::Close, _)) => break,
                _ => {}
            }

            let atom_start = self.pos;
            let atom = match self.parse_atom()? {
                Atom::Node(node) => node,
                Atom::Skip => continue,
                Atom::OptionsRest(options) => {
                    // `(?i)` applies up to the end of the enclosing group, across `|`.
                    self.options = options;
                    items.push(self.parse_alternation(false)?);
                    break;
                }
            };
            items.push(self.parse_quantifiers(atom, atom_start)?);
        }

        let mut items = merge_literals(items);
        Ok(match items.len() {
            0 => Node::empty(start),
            1 => items.swap_remove(0),
            _ => Node::new(NodeKind::Sequence(items), start..self.pos),
        })
    }

    fn parse_quantifiers(&mut self, mut node: Node, start: usize) -> PResult<Node> {
        let mut quantified = false;
        loop {
            self.skip_extended();
            let op_start = self.pos;
            let Some(repeat) = self.parse_repeat_op()? else {
                break;
            };

            let fixed = repeat.interval && repeat.max == Some(repeat.min);
            let mut greedy = true;
            let mut possessive = false;
            if self.at(b'?')
                && self.allows(Op::QMARK_NON_GREEDY)
                && !(fixed && self.behaves(Bv::FIXED_INTERVAL_IS_GREEDY_ONLY))
            {
                self.pos += 1;
                greedy = false;
            } else if self.at(b'+') {
                let allowed = if repeat.interval {
                    self.allows(Op::PLUS_POSSESSIVE_INTERVAL)
                } else {
                    self.allows(Op::PLUS_POSSESSIVE_REPEAT)
                };
                if allowed {
                    self.pos += 1;
                    possessive = true;
                }
            }

            match &node.kind {
                NodeKind::Anchor(anchor) if !matches!(anchor, Anchor::Look { .. }) => {
                    return self.error_since(ErrorKind::TargetOfRepeatInvalid, op_start);
                }
                NodeKind::Quantifier { .. } if quantified && self.behaves(Bv::FORBID_NESTED_REPEAT) => {
                    return self.error_since(ErrorKind::NestedRepeat, op_start);
                }
                _ => {}
            }

            let (prefix, target) = split_last_char(node, self);
            let span = target.span.start..self.pos;
            let repeated = Node::new(
                NodeKind::Quantifier {
                    body: Box::new(target),
                    min: repeat.min,
                    max: repeat.max,
                    greedy,
                    possessive,
                },
                span,
            );
            node = match prefix {
                Some(prefix) => Node::new(NodeKind::Sequence(vec![prefix, repeated]), start..self.pos),
                None => repeated,
            };
            quantified = true;
        }
        Ok(node)
    }

    fn parse_repeat_op(&mut self) -> PResult<Option<Repeat>> {
        let Some((meta, len)) = self.peek_meta() else {
            return Ok(None);
        };
        let (min, max) = match meta {
            Meta::Star => (0, None),
            Meta::Plus => (1, None),
            Meta::QMark => (0, Some(1)),
            Meta::Interval => return self.parse_interval(),
            Meta::Alt | Meta::Open | Meta::Close => return Ok(None),
        };
        self.pos += len;
        Ok(Some(Repeat {
            min,
            max,
            interval: false,
        }))
    }

    /// Parses `{n}`, `{n,}`, `{n,m}` or `{,m}`.
    ///
    /// Returns `None` with the cursor untouched when the braces do not form
    /// an interval and the dialect reads them literally.
    fn parse_interval(&mut self) -> PResult<Option<Repeat>> {
        let start = self.pos;
        let escaped = self.at(b'\\');
        self.pos += if escaped { 2 } else { 1 };

        let parsed = self.read_interval_body(escaped)?;
        let Some((low, high)) = parsed else {
            if self.behaves(Bv::ALLOW_INVALID_INTERVAL) {
                self.pos = start;
                return Ok(None);
            }
            if self.eof() {
                return self.error_since(ErrorKind::EndPatternAtLeftBrace, start);
            }
            return self.error_since(ErrorKind::InvalidRepeatRange, start);
        };

        let repeat_max = self.limits.repeat_max;
        if low > repeat_max || high.is_some_and(|h| h > repeat_max) {
            return self.error_since(ErrorKind::RepeatCountTooLarge, start);
        }
        if high.is_some_and(|h| h < low) {
            return self.error_since(ErrorKind::UpperSmallerThanLower, start);
        }
        Ok(Some(Repeat {
            min: low,
            max: high,
            interval: true,
        }))
    }

    fn read_interval_body(&mut self, escaped: bool) -> PResult<Option<(u32, Option<u32>)>> {
        let low = self.read_decimal()?;
        let (low, high) = if self.eat(b',') {
            let high = self.read_decimal()?;
            match low {
                Some(low) => (low, high),
                None if high.is_some() && self.behaves(Bv::ALLOW_INTERVAL_LOW_ABBREV) => (0, high),
                None => return Ok(None),
            }
        } else {
            match low {
                Some(low) => (low, Some(low)),
                None => return Ok(None),
            }
        };
        let closed = if escaped {
            self.eat_str(b"\\}")
        } else {
            self.eat(b'}')
        };
        Ok(closed.then_some((low, high)))
    }

    /// Whether the cursor sits on a well-formed interval, without consuming it.
    pub(super) fn at_valid_interval(&mut self) -> PResult<bool> {
        let start = self.pos;
        let escaped = self.at(b'\\');
        self.pos += if escaped { 2 } else { 1 };
        let parsed = self.read_interval_body(escaped);
        self.pos = start;
        Ok(parsed?.is_some())
    }
}

/// Splits a multi-character literal so a quantifier binds to its last character.
fn split_last_char(node: Node, parser: &Parser<'_>) -> (Option<Node>, Node) {
    let NodeKind::Literal { bytes, ignore_case } = &node.kind else {
        return (None, node);
    };
    let mut last = 0;
    let mut at = 0;
    while at < bytes.len() {
        last = at;
        at += parser.enc.char_len(bytes[at]).max(1);
    }
    if last == 0 {
        return (None, node);
    }
    let ignore_case = *ignore_case;
    let split = node.span.end.saturating_sub(bytes.len() - last).max(node.span.start);
    let head = Node::new(
        NodeKind::Literal {
            bytes: bytes[..last].to_vec(),
            ignore_case,
        },
        node.span.start..split,
    );
    let tail = Node::new(
        NodeKind::Literal {
            bytes: bytes[last..].to_vec(),
            ignore_case,
        },
        split..node.span.end,
    );
    (Some(head), tail)
}

/// Joins adjacent literals with the same case sensitivity.
fn merge_literals(items: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(items.len());
    for item in items {
        if let NodeKind::Literal {
            bytes,
            ignore_case,
        } = &item.kind
            && let Some(Node {
                kind:
                    NodeKind::Literal {
                        bytes: prev,
                        ignore_case: prev_ic,
                    },
                span,
                ..
            }) = out.last_mut()
            && *prev_ic == *ignore_case
        {
            prev.extend_from_slice(bytes);
            span.end = item.span.end;
            continue;
        }
        if !matches!(item.kind, NodeKind::Empty) {
            out.push(item);
        }
    }
    out
}
