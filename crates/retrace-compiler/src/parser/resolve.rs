//! Group numbering and reference binding after parsing.

use retrace_bytecode::{GroupId, NameTable};
use retrace_core::{Options, SyntaxBehavior};

use super::Ast;
use super::ast::{GroupKind, Node, NodeKind, Target};
use super::core::{PResult, Parser};
use crate::diagnostics::{ErrorKind, SyntaxError};

struct Groups {
    /// Raw number minus one to final number; `None` for groups that stop capturing.
    numbering: Vec<Option<GroupId>>,
    num_captures: u16,
    names: NameTable,
}

impl Groups {
    fn number(&self, raw: GroupId) -> Option<GroupId> {
        self.numbering.get(usize::from(raw).checked_sub(1)?).copied().flatten()
    }
}

pub(super) fn resolve(parser: Parser<'_>, mut root: Node) -> PResult<Ast> {
    let only_named = parser.has_named
        && parser.behaves(SyntaxBehavior::CAPTURE_ONLY_NAMED_GROUP)
        && !parser.options.contains(Options::CAPTURE_GROUP);

    if only_named && let Some(numbered) = parser.numbered_refs.first() {
        return Err(SyntaxError::new(
            ErrorKind::NumberedRefNotAllowed,
            numbered.span.clone(),
        ));
    }

    let mut next: GroupId = 0;
    let numbering: Vec<Option<GroupId>> = parser
        .groups
        .iter()
        .map(|def| {
            if only_named && def.plain {
                return None;
            }
            next += 1;
            Some(next)
        })
        .collect();

    let mut names = NameTable::new();
    for (def, number) in parser.groups.iter().zip(&numbering) {
        if let (Some(name), Some(number)) = (&def.name, number) {
            names.insert(name, *number);
        }
    }

    let groups = Groups {
        numbering,
        num_captures: next,
        names,
    };
    renumber(&mut root, &groups);
    bind(&mut root, &groups)?;

    Ok(Ast {
        root,
        num_captures: groups.num_captures,
        names: groups.names,
        calls_whole_pattern: parser.calls_whole_pattern,
    })
}

fn renumber(node: &mut Node, groups: &Groups) {
    if let NodeKind::Group { kind, .. } = &mut node.kind
        && let GroupKind::Capture { group, .. } = kind
    {
        match groups.number(*group) {
            Some(number) => *group = number,
            None => *kind = GroupKind::NonCapture,
        }
    }
    for child in node.children_mut() {
        renumber(child, groups);
    }
}

fn bind(node: &mut Node, groups: &Groups) -> PResult<()> {
    let span = node.span.clone();
    let fail = |kind: ErrorKind| Err(SyntaxError::new(kind, span.clone()));

    match &mut node.kind {
        NodeKind::BackRef { target, groups: bound, .. } => match lookup(target, groups) {
            Lookup::Found(found) => *bound = found,
            Lookup::NoName(name) => return fail(ErrorKind::UndefinedName(name)),
            Lookup::BadNumber => return fail(ErrorKind::InvalidBackref),
        },
        NodeKind::Group {
            kind: GroupKind::Conditional { target, groups: bound, .. },
            ..
        } => match lookup(target, groups) {
            Lookup::Found(found) => *bound = found,
            Lookup::NoName(name) => return fail(ErrorKind::UndefinedName(name)),
            Lookup::BadNumber => return fail(ErrorKind::InvalidBackref),
        },
        NodeKind::Call { target, group } => {
            if *target == Target::Number(0) {
                *group = 0;
            } else {
                match lookup(target, groups) {
                    Lookup::Found(found) if found.len() == 1 => *group = found[0],
                    Lookup::Found(_) => {
                        return fail(ErrorKind::MultiplexDefinitionNameCall(target.to_string()));
                    }
                    Lookup::NoName(name) => return fail(ErrorKind::UndefinedName(name)),
                    Lookup::BadNumber => {
                        return fail(ErrorKind::UndefinedGroupReference(target.to_string()));
                    }
                }
            }
        }
        _ => {}
    }

    for child in node.children_mut() {
        bind(child, groups)?;
    }
    Ok(())
}

enum Lookup {
    Found(Vec<GroupId>),
    NoName(String),
    BadNumber,
}

fn lookup(target: &Target, groups: &Groups) -> Lookup {
    match target {
        Target::Name(name) => match groups.names.groups(name) {
            Some(found) => Lookup::Found(found.to_vec()),
            None => Lookup::NoName(name.clone()),
        },
        Target::Number(n) | Target::Relative(n) => {
            match GroupId::try_from(*n).ok().and_then(|raw| groups.number(raw)) {
                Some(number) => Lookup::Found(vec![number]),
                None => Lookup::BadNumber,
            }
        }
    }
}
