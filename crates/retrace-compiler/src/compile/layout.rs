//! Label resolution and program assembly.

use retrace_bytecode::{Addr, Program, ProgramMeta, RepeatInfo, Subexp};

use super::{CResult, CompileError, Compiler, Label, hints};

pub(super) fn assemble(compiler: Compiler<'_>) -> Result<Program, CompileError> {
    let Compiler {
        ast,
        enc,
        options,
        mut code,
        labels,
        repeats,
        subexps,
        num_marks,
        num_null_checks,
        num_state_checks,
        flags,
        ..
    } = compiler;

    let resolve = |label: Label| -> CResult<Addr> {
        labels
            .get(label.0 as usize)
            .copied()
            .flatten()
            .map(Addr)
            .ok_or(CompileError::UnboundLabel(label.0))
    };

    for instr in &mut code {
        let mut unbound = None;
        instr.map_addrs(|placeholder| match resolve(Label(placeholder.0)) {
            Ok(addr) => addr,
            Err(_) => {
                unbound = Some(placeholder.0);
                placeholder
            }
        });
        if let Some(label) = unbound {
            return Err(CompileError::UnboundLabel(label));
        }
    }

    let repeats = repeats
        .into_iter()
        .map(|r| {
            Ok(RepeatInfo {
                min: r.min,
                max: r.max,
                greedy: r.greedy,
                body: resolve(r.body)?,
                exit: resolve(r.exit)?,
            })
        })
        .collect::<CResult<Vec<_>>>()?;

    let subexps = subexps
        .into_iter()
        .map(|s| {
            Ok(Subexp {
                group: s.group,
                entry: resolve(s.entry)?,
                captures: s.captures,
                repeats: s.repeats,
            })
        })
        .collect::<CResult<Vec<_>>>()?;

    let meta = ProgramMeta {
        repeats,
        subexps,
        names: ast.names.clone(),
        num_captures: ast.num_captures,
        num_marks,
        num_null_checks,
        num_state_checks,
        options,
        flags,
        hints: hints::compute(&ast.root, enc),
    };
    Ok(Program::new(code, meta, enc)?)
}
