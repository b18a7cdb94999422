//! Parenthesized constructs: groups, lookaround, options, calls and conditions.

use retrace_bytecode::GroupId;
use retrace_core::{Options, SyntaxBehavior as Bv, SyntaxOperators as Op};

use super::Atom;
use crate::diagnostics::ErrorKind;
use crate::parser::ast::{Anchor, GroupKind, Node, NodeKind, Target};
use crate::parser::core::{GroupDef, Meta, NumberedRef, PResult, Parser};

impl Parser<'_> {
    /// Parses a group; the cursor is on the opening parenthesis.
    pub(super) fn parse_group(&mut self) -> PResult<Atom> {
        let start = self.pos;
        let open_len = self.peek_meta().map_or(1, |(_, len)| len);
        self.pos += open_len;

        if self.at(b'?') && self.allows(Op::QMARK_GROUP_EFFECT) {
            self.pos += 1;
            return self.parse_extended_group(start);
        }

        let kind = if self.options.contains(Options::DONT_CAPTURE_GROUP) {
            GroupKind::NonCapture
        } else {
            let group = self.open_group(None, start)?;
            GroupKind::Capture { group, name: None }
        };
        self.parse_group_body(start, kind).map(Atom::Node)
    }

    /// Everything after `(?`.
    fn parse_extended_group(&mut self, start: usize) -> PResult<Atom> {
        let Some(c) = self.peek() else {
            return self.error_since(ErrorKind::EndPatternInGroup, start);
        };

        match c {
            b':' => {
                self.pos += 1;
                self.parse_group_body(start, GroupKind::NonCapture).map(Atom::Node)
            }
            b'>' => {
                self.pos += 1;
                self.parse_group_body(start, GroupKind::Atomic).map(Atom::Node)
            }
            b'=' | b'!' => {
                self.pos += 1;
                self.parse_look(start, false, c == b'!').map(Atom::Node)
            }
            b'<' if matches!(self.peek_at(1), Some(b'=' | b'!')) => {
                self.pos += 2;
                let negated = self.pattern[self.pos - 1] == b'!';
                self.parse_look(start, true, negated).map(Atom::Node)
            }
            b'<' | b'\'' if self.allows(Op::QMARK_LT_NAMED_GROUP) => {
                self.pos += 1;
                let close = if c == b'<' { b'>' } else { b'\'' };
                self.parse_named_group(close, start).map(Atom::Node)
            }
            b'#' => {
                while !self.eof() && !self.at(b')') {
                    if self.at(b'\\') {
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
                if !self.eat(b')') {
                    return self.error_since(ErrorKind::EndPatternInGroup, start);
                }
                Ok(Atom::Skip)
            }
            b'~' if self.allows(Op::QMARK_TILDE_ABSENT_GROUP) => {
                self.pos += 1;
                if self.at(b'|') {
                    return self.error(ErrorKind::Unsupported("absent stopper"), start..self.pos + 1);
                }
                self.parse_group_body(start, GroupKind::Absent).map(Atom::Node)
            }
            b'|' if self.allows(Op::QMARK_VBAR_BRANCH_RESET) => {
                self.pos += 1;
                self.descend(start)?;
                let saved = self.options;
                let body = self.parse_alternation(true)?;
                self.expect_close(start)?;
                self.options = saved;
                self.ascend();
                Ok(Atom::Node(group_node(GroupKind::NonCapture, body, start..self.pos)))
            }
            b'(' if self.allows(Op::QMARK_LPAREN_IF_ELSE) => {
                self.pos += 1;
                self.parse_conditional(start).map(Atom::Node)
            }
            b'P' if self.allows(Op::QMARK_CAPITAL_P_NAME) => self.parse_python_group(start),
            b'R' | b'&' | b'0'..=b'9' | b'+' if self.allows(Op::QMARK_PERL_SUBEXP_CALL) => {
                self.parse_perl_call(start).map(Atom::Node)
            }
            b'-' if self.allows(Op::QMARK_PERL_SUBEXP_CALL)
                && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) =>
            {
                self.parse_perl_call(start).map(Atom::Node)
            }
            _ => self.parse_option_group(start),
        }
    }

    /// Body of a group up to and including its closing parenthesis.
    fn parse_group_body(&mut self, start: usize, kind: GroupKind) -> PResult<Node> {
        self.descend(start)?;
        let saved = self.options;
        let body = self.parse_alternation(false)?;
        self.expect_close(start)?;
        self.options = saved;
        self.ascend();
        Ok(group_node(kind, body, start..self.pos))
    }

    fn parse_look(&mut self, start: usize, behind: bool, negated: bool) -> PResult<Node> {
        self.descend(start)?;
        let saved = self.options;
        let body = self.parse_alternation(false)?;
        self.expect_close(start)?;
        self.options = saved;
        self.ascend();
        Ok(Node::new(
            NodeKind::Anchor(Anchor::Look {
                behind,
                negated,
                body: Box::new(body),
            }),
            start..self.pos,
        ))
    }

    fn parse_named_group(&mut self, close: u8, start: usize) -> PResult<Node> {
        let name = self.read_group_name(close, start)?;
        let group = self.open_group(Some(name.clone()), start)?;
        self.parse_group_body(
            start,
            GroupKind::Capture {
                group,
                name: Some(name),
            },
        )
    }

    /// `(?P<name>...)`, `(?P=name)` and `(?P>name)`.
    fn parse_python_group(&mut self, start: usize) -> PResult<Atom> {
        self.pos += 1;
        match self.peek() {
            Some(b'<') => {
                self.pos += 1;
                self.parse_named_group(b'>', start).map(Atom::Node)
            }
            Some(b'=') => {
                self.pos += 1;
                let name = self.read_group_name(b')', start)?;
                Ok(Atom::Node(self.backref(Target::Name(name), start)))
            }
            Some(b'>') => {
                self.pos += 1;
                let name = self.read_group_name(b')', start)?;
                Ok(Atom::Node(self.call(Target::Name(name), start)))
            }
            _ => self.error_since(ErrorKind::UndefinedGroupOption, start),
        }
    }

    /// `(?R)`, `(?&name)`, `(?1)`, `(?-1)` and `(?+1)`.
    fn parse_perl_call(&mut self, start: usize) -> PResult<Node> {
        let target = match self.peek() {
            Some(b'R') => {
                self.pos += 1;
                if !self.eat(b')') {
                    return self.error_since(ErrorKind::InvalidGroupOption, start);
                }
                Target::Number(0)
            }
            Some(b'&') => {
                self.pos += 1;
                Target::Name(self.read_group_name(b')', start)?)
            }
            _ => self.parse_ref_target(b')', start, true)?,
        };
        Ok(self.call(target, start))
    }

    /// `(?(cond)yes|no)`; the cursor is past the condition's `(`.
    fn parse_conditional(&mut self, start: usize) -> PResult<Node> {
        let cond_start = self.pos;
        let target = match self.peek() {
            Some(b'<') => {
                self.pos += 1;
                let target = self.parse_ref_target(b'>', cond_start, false)?;
                self.expect_cond_close(start)?;
                target
            }
            Some(b'\'') => {
                self.pos += 1;
                let target = self.parse_ref_target(b'\'', cond_start, false)?;
                self.expect_cond_close(start)?;
                target
            }
            Some(b'0'..=b'9' | b'-' | b'+') => self.parse_ref_target(b')', cond_start, false)?,
            Some(b'?') | None => return self.error_since(ErrorKind::InvalidConditionPattern, start),
            Some(_) => Target::Name(self.read_group_name(b')', cond_start)?),
        };
        if !matches!(target, Target::Name(_)) {
            self.numbered_refs.push(NumberedRef {
                span: cond_start..self.pos,
            });
        }

        self.descend(start)?;
        let saved = self.options;
        let body = self.parse_alternation(false)?;
        self.expect_close(start)?;
        self.options = saved;
        self.ascend();

        let (yes, otherwise) = match body.kind {
            NodeKind::Alternation(mut branches) => {
                if branches.len() > 2 {
                    return self.error_since(ErrorKind::InvalidConditionPattern, start);
                }
                let no = branches.pop().map(Box::new);
                let yes = branches.pop().unwrap_or_else(|| Node::empty(start));
                (yes, no)
            }
            _ => (body, None),
        };
        let kind = GroupKind::Conditional {
            target,
            groups: Vec::new(),
            otherwise,
        };
        Ok(group_node(kind, yes, start..self.pos))
    }

    fn expect_cond_close(&mut self, start: usize) -> PResult<()> {
        if self.eat(b')') {
            return Ok(());
        }
        self.error_since(ErrorKind::InvalidConditionPattern, start)
    }

    /// `(?imx-imx)` or `(?imx-imx:...)`.
    fn parse_option_group(&mut self, start: usize) -> PResult<Atom> {
        let mut options = self.options;
        let mut negative = false;
        loop {
            let Some(c) = self.peek() else {
                return self.error_since(ErrorKind::EndPatternInGroup, start);
            };
            self.pos += 1;
            match c {
                b')' => return Ok(Atom::OptionsRest(options)),
                b':' => {
                    self.descend(start)?;
                    let saved = self.options;
                    self.options = options;
                    let body = self.parse_alternation(false)?;
                    self.expect_close(start)?;
                    self.options = saved;
                    self.ascend();
                    return Ok(Atom::Node(group_node(GroupKind::NonCapture, body, start..self.pos)));
                }
                b'-' if !negative => negative = true,
                b'i' => options.set(Options::IGNORECASE, !negative),
                b'x' => options.set(Options::EXTEND, !negative),
                b'm' if self.allows(Op::OPTION_PERL) => options.set(Options::SINGLELINE, negative),
                b's' if self.allows(Op::OPTION_PERL) => options.set(Options::MULTILINE, !negative),
                b'm' if self.allows(Op::OPTION_RUBY) => options.set(Options::MULTILINE, !negative),
                _ => return self.error_since(ErrorKind::UndefinedGroupOption, start),
            }
        }
    }

    fn expect_close(&mut self, start: usize) -> PResult<()> {
        match self.peek_meta() {
            Some((Meta::Close, len)) => {
                self.pos += len;
                Ok(())
            }
            _ => self.error(ErrorKind::UnmatchedOpenParenthesis, start..self.pattern.len()),
        }
    }

    /// Allocates the next raw group number.
    ///
    /// Inside a branch reset a number may be handed out again; the first
    /// definition's name wins unless a later one adds a name.
    pub(super) fn open_group(&mut self, name: Option<String>, start: usize) -> PResult<GroupId> {
        self.group_count += 1;
        let raw = self.group_count;
        if raw > u32::from(self.limits.max_captures) {
            return self.error_since(ErrorKind::TooManyCaptures, start);
        }

        if let Some(name) = &name {
            self.has_named = true;
            let clash = self
                .groups
                .iter()
                .enumerate()
                .any(|(i, def)| i + 1 != raw as usize && def.name.as_deref() == Some(name));
            if clash && !self.behaves(Bv::ALLOW_MULTIPLEX_DEFINITION_NAME) {
                return self.error_since(ErrorKind::MultiplexDefinedName(name.clone()), start);
            }
        }

        let plain = name.is_none();
        match self.groups.get_mut(raw as usize - 1) {
            Some(def) => {
                if def.name.is_none() {
                    def.name = name;
                }
                def.plain &= plain;
            }
            None => self.groups.push(GroupDef { name, plain }),
        }
        Ok(raw as GroupId)
    }
}

fn group_node(kind: GroupKind, body: Node, span: std::ops::Range<usize>) -> Node {
    Node::new(
        NodeKind::Group {
            kind,
            body: Box::new(body),
        },
        span,
    )
}
