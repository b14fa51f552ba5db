//! Template expansion for stages and top-level steps.
//!
//! Expansion is all-or-nothing: a single unresolved reference fails the
//! whole call and nothing partially expanded is returned. Inlined steps
//! replace the reference at its original position, so surrounding step
//! order is preserved.

use crate::error::{CompilerError, CompilerResult, RefScope};
use crate::template::TemplateVars;
use conveyor_core::pipeline::{CompiledStage, Stage, Step, StepEntry, Template};
use std::collections::HashMap;

/// Resolve every template reference inside the given stages.
pub fn expand_stages(
    stages: &[Stage],
    tmpls: &HashMap<&str, &Template>,
) -> CompilerResult<Vec<CompiledStage>> {
    stages
        .iter()
        .map(|stage| {
            let steps = expand_entries(&stage.steps, tmpls, |_| {
                RefScope::Stage(stage.name.clone())
            })?;
            Ok(CompiledStage {
                name: stage.name.clone(),
                steps,
            })
        })
        .collect()
}

/// Resolve every template reference in the top-level step sequence.
pub fn expand_steps(
    steps: &[StepEntry],
    tmpls: &HashMap<&str, &Template>,
) -> CompilerResult<Vec<Step>> {
    expand_entries(steps, tmpls, RefScope::Step)
}

fn expand_entries(
    entries: &[StepEntry],
    tmpls: &HashMap<&str, &Template>,
    scope_of: impl Fn(usize) -> RefScope,
) -> CompilerResult<Vec<Step>> {
    let mut expanded = Vec::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        match entry {
            StepEntry::Run(step) => {
                expanded.push(step.clone());
            }
            StepEntry::Template(r) => {
                let tmpl = tmpls.get(r.name.as_str()).ok_or_else(|| {
                    CompilerError::UnresolvedTemplate {
                        scope: scope_of(position),
                        template: r.name.clone(),
                    }
                })?;
                let vars = TemplateVars::new(&r.vars);
                expanded.extend(tmpl.steps.iter().map(|s| vars.apply(s)));
            }
        }
    }

    Ok(expanded)
}
