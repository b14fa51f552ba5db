//! Template lookup and parameter substitution.

use conveyor_core::pipeline::{Step, Template};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// Regex for matching ${inputs.NAME} substitution variables.
static INPUT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{inputs\.([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Build a lookup table from template name to template definition.
///
/// Single pass over the sequence; a later template overwrites an earlier one
/// with the same name. Never fails: an unresolvable reference is surfaced by
/// the expanders, not here.
pub fn map_from_templates(templates: &[Template]) -> HashMap<&str, &Template> {
    let mut map = HashMap::new();

    for tmpl in templates {
        map.insert(tmpl.name.as_str(), tmpl);
    }

    map
}

/// Substitution variables declared on a template reference.
///
/// `${inputs.<key>}` occurrences in a template step's image, commands, and
/// environment values are replaced when the step is inlined. Unknown inputs
/// are left in place so the author can see what failed to resolve.
#[derive(Debug)]
pub struct TemplateVars<'a> {
    vars: &'a HashMap<String, String>,
}

impl<'a> TemplateVars<'a> {
    pub fn new(vars: &'a HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Interpolate all `${inputs.*}` variables in a string.
    pub fn interpolate(&self, input: &str) -> String {
        INPUT_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let name = &caps[1];
                self.vars
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| format!("${{inputs.{}}}", name))
            })
            .to_string()
    }

    /// Produce a copy of a template step with substitution applied.
    pub fn apply(&self, step: &Step) -> Step {
        Step {
            name: step.name.clone(),
            image: self.interpolate(&step.image),
            commands: step.commands.iter().map(|c| self.interpolate(c)).collect(),
            env: step
                .env
                .iter()
                .map(|(k, v)| (k.clone(), self.interpolate(v)))
                .collect(),
        }
    }
}
