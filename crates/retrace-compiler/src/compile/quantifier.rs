//! Quantifier compilation.
//!
//! Small bounded repeats are unrolled into copies of the body; larger ones
//! use a counted loop driven by the repeat table. Unbounded loops whose body
//! can match empty get a null check so an empty iteration leaves the loop.
//!
//! Loop shapes (`[..]` parts are optional):
//! - greedy `X*`: `L0: [StateCheck] Push exit; [NCS] X [NCE] Jump L0; exit:`
//! - lazy `X*`: `L0: [StateCheck] Push body; Jump exit; body: [NCS] X [NCE] Jump L0; exit:`
//! - greedy `X+`: `Jump body; L0: [StateCheck] Push exit; body: [NCS] X [NCE] Jump L0; exit:`
//! - lazy `X+`: `body: [StateCheck] [NCS] X [NCE] Push body; exit:`
//! - counted: `Repeat id; body: [NCS] X [NCE] RepeatInc id; exit:`

use retrace_bytecode::{Instr, ProgramFlags};

use super::{CResult, Compiler};
use crate::parser::{Node, NodeFlags, NodeKind};

/// Largest `copies * body size` that is unrolled instead of counted.
const UNROLL_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    /// `{0,0}`: nothing to emit.
    Skip,
    Optional,
    Star,
    Plus,
    /// `min` copies, then `max - min` optional copies or a loop.
    Unroll,
    Counted,
}

fn plan(min: u32, max: Option<u32>, body: &Node) -> Plan {
    match (min, max) {
        (_, Some(0)) => Plan::Skip,
        (0, Some(1)) => Plan::Optional,
        (0, None) => Plan::Star,
        (1, None) => Plan::Plus,
        _ => {
            let copies = max.unwrap_or(min);
            if copies.saturating_mul(weight(body)) <= UNROLL_LIMIT {
                Plan::Unroll
            } else {
                Plan::Counted
            }
        }
    }
}

/// Rough code size of a subtree.
fn weight(node: &Node) -> u32 {
    let mut n = 0u32;
    node.walk(&mut |_| n = n.saturating_add(1));
    n
}

/// Whether the explosion guard is sound for the whole pattern: the outcome
/// from a given instruction and position must not depend on anything else
/// the VM tracks.
pub(super) fn guard_allowed(root: &Node) -> bool {
    let flags = root.info.flags;
    if flags.intersects(NodeFlags::HAS_BACKREF | NodeFlags::HAS_CALL | NodeFlags::HAS_CONTROL) {
        return false;
    }
    let mut ok = true;
    root.walk(&mut |n| {
        if let NodeKind::Quantifier {
            body,
            min,
            max,
            possessive,
            ..
        } = &n.kind
        {
            ok &= !possessive && plan(*min, *max, body) != Plan::Counted;
        }
    });
    ok
}

impl Compiler<'_> {
    pub(super) fn compile_quantifier(&mut self, node: &Node, next: Option<&Node>) -> CResult<()> {
        let NodeKind::Quantifier {
            body,
            min,
            max,
            greedy,
            possessive,
        } = &node.kind
        else {
            return Ok(());
        };
        if *possessive {
            let mark = self.fresh_mark()?;
            self.emit(Instr::AtomicStart(mark));
            self.compile_repeat(node, body, *min, *max, true, next)?;
            self.emit(Instr::AtomicEnd(mark));
            return Ok(());
        }
        self.compile_repeat(node, body, *min, *max, *greedy, next)
    }

    fn compile_repeat(
        &mut self,
        node: &Node,
        body: &Node,
        min: u32,
        max: Option<u32>,
        greedy: bool,
        next: Option<&Node>,
    ) -> CResult<()> {
        match plan(min, max, body) {
            Plan::Skip => Ok(()),
            Plan::Optional => self.compile_optional(body, 1, greedy),
            Plan::Star => {
                if greedy && self.try_any_char_star(node, body, next) {
                    return Ok(());
                }
                self.compile_star(node, body, greedy)
            }
            Plan::Plus => self.compile_plus(node, body, greedy),
            Plan::Unroll => {
                let required = if max.is_none() { min - 1 } else { min };
                for _ in 0..required {
                    self.compile_node(body)?;
                }
                match max {
                    None => self.compile_plus(node, body, greedy),
                    Some(max) => self.compile_optional(body, max - min, greedy),
                }
            }
            Plan::Counted => self.compile_counted(body, min, max, greedy),
        }
    }

    /// `count` nested optional copies: `(?:X(?:X)?)?`.
    fn compile_optional(&mut self, body: &Node, count: u32, greedy: bool) -> CResult<()> {
        if count == 0 {
            return Ok(());
        }
        let exit = self.fresh_label();
        for _ in 0..count {
            if greedy {
                self.emit(Instr::Push(exit.addr()));
            } else {
                let take = self.fresh_label();
                self.emit(Instr::Push(take.addr()));
                self.emit(Instr::Jump(exit.addr()));
                self.bind(take);
            }
            self.compile_node(body)?;
        }
        self.bind(exit);
        Ok(())
    }

    /// Greedy `.*` as a single instruction, peeking at a following literal.
    fn try_any_char_star(&mut self, node: &Node, body: &Node, next: Option<&Node>) -> bool {
        let NodeKind::AnyChar { multiline } = body.kind else {
            return false;
        };
        if self.guard_site(node) {
            return false;
        }
        let peek = match next.map(|n| &n.kind) {
            Some(NodeKind::Literal {
                bytes,
                ignore_case: false,
            }) => bytes.first().copied(),
            _ => None,
        };
        self.emit(match peek {
            Some(next) => Instr::AnyCharStarPeekNext { multiline, next },
            None => Instr::AnyCharStar { multiline },
        });
        true
    }

    fn compile_star(&mut self, node: &Node, body: &Node, greedy: bool) -> CResult<()> {
        let head = self.fresh_label();
        let exit = self.fresh_label();
        self.bind(head);
        self.emit_guard(node)?;
        if greedy {
            self.emit(Instr::Push(exit.addr()));
            self.compile_loop_body(body)?;
        } else {
            let take = self.fresh_label();
            self.emit(Instr::Push(take.addr()));
            self.emit(Instr::Jump(exit.addr()));
            self.bind(take);
            self.compile_loop_body(body)?;
        }
        self.emit(Instr::Jump(head.addr()));
        self.bind(exit);
        Ok(())
    }

    fn compile_plus(&mut self, node: &Node, body: &Node, greedy: bool) -> CResult<()> {
        let entry = self.fresh_label();
        if greedy {
            let head = self.fresh_label();
            let exit = self.fresh_label();
            self.emit(Instr::Jump(entry.addr()));
            self.bind(head);
            self.emit_guard(node)?;
            self.emit(Instr::Push(exit.addr()));
            self.bind(entry);
            self.compile_loop_body(body)?;
            self.emit(Instr::Jump(head.addr()));
            self.bind(exit);
        } else {
            self.bind(entry);
            self.emit_guard(node)?;
            self.compile_loop_body(body)?;
            self.emit(Instr::Push(entry.addr()));
        }
        Ok(())
    }

    fn compile_counted(&mut self, body: &Node, min: u32, max: Option<u32>, greedy: bool) -> CResult<()> {
        let body_label = self.fresh_label();
        let exit = self.fresh_label();
        let id = self.add_repeat(min, max, greedy, body_label, exit)?;
        self.emit(Instr::Repeat(id));
        self.bind(body_label);
        self.compile_loop_body(body)?;
        self.emit(Instr::RepeatInc(id));
        self.bind(exit);
        Ok(())
    }

    /// The loop body, wrapped in a null check when it can match empty.
    ///
    /// The null check skips the instruction right after it, which every
    /// loop shape makes the back edge.
    fn compile_loop_body(&mut self, body: &Node) -> CResult<()> {
        self.loop_depth += 1;
        let result = if body.info.min_chars > 0 {
            self.compile_node(body)
        } else {
            self.compile_null_checked(body)
        };
        self.loop_depth -= 1;
        result
    }

    fn compile_null_checked(&mut self, body: &Node) -> CResult<()> {
        let id = self.fresh_null_check()?;
        let captures = self.captures_matter && body.info.flags.contains(NodeFlags::HAS_CAPTURE);
        self.emit(Instr::NullCheckStart(id));
        self.null_checks.push(id);
        let result = self.compile_node(body);
        self.null_checks.pop();
        result?;
        self.emit(Instr::NullCheckEnd { id, captures });
        Ok(())
    }

    /// Whether a loop head for `node` gets an explosion guard: every loop on
    /// a chain of at least `explosion_depth` nested unbounded loops does,
    /// counting the loops around it and the ones inside it.
    fn guard_site(&self, node: &Node) -> bool {
        let depth = self.limits.get_explosion_depth();
        let chain = u32::from(node.info.depth) + u32::from(self.loop_depth);
        self.state_checks && depth > 0 && chain >= u32::from(depth)
    }

    fn emit_guard(&mut self, node: &Node) -> CResult<()> {
        if self.guard_site(node) {
            let id = self.fresh_state_check()?;
            self.flags |= ProgramFlags::STATE_CHECK;
            self.emit(Instr::StateCheck {
                id,
                within: self.null_checks.last().copied(),
            });
        }
        Ok(())
    }
}
