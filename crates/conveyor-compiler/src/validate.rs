//! Pipeline document validation.
//!
//! Checks the invariants that must hold before expansion is attempted.
//! First violation wins; expansion assumes a validated document and only
//! re-checks reference resolution.

use crate::error::{CompilerError, CompilerResult};
use conveyor_core::pipeline::{Pipeline, StepEntry};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Schema versions this compiler understands.
const SUPPORTED_VERSIONS: &[&str] = &["1"];

// Names used as lookup keys must be plain identifiers.
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap());

/// Validate a parsed pipeline document.
pub fn validate(pipeline: &Pipeline) -> CompilerResult<()> {
    if !SUPPORTED_VERSIONS.contains(&pipeline.version.as_str()) {
        return Err(CompilerError::InvalidValue {
            field: "pipeline version".to_string(),
            message: format!("unsupported version '{}'", pipeline.version),
        });
    }

    if pipeline.metadata.server.address.is_empty() {
        return Err(CompilerError::MissingField(
            "metadata server address".to_string(),
        ));
    }

    validate_templates(pipeline)?;
    validate_stages(pipeline)?;
    validate_entries(&pipeline.steps, "top-level step")?;

    Ok(())
}

fn validate_templates(pipeline: &Pipeline) -> CompilerResult<()> {
    let mut seen = HashSet::new();

    for tmpl in &pipeline.templates {
        check_name(&tmpl.name, "template")?;
        if !seen.insert(tmpl.name.as_str()) {
            return Err(CompilerError::Duplicate(format!(
                "template '{}'",
                tmpl.name
            )));
        }
    }

    Ok(())
}

fn validate_stages(pipeline: &Pipeline) -> CompilerResult<()> {
    let mut seen = HashSet::new();

    for stage in &pipeline.stages {
        check_name(&stage.name, "stage")?;
        if !seen.insert(stage.name.as_str()) {
            return Err(CompilerError::Duplicate(format!("stage '{}'", stage.name)));
        }
        validate_entries(&stage.steps, &format!("step in stage '{}'", stage.name))?;
    }

    Ok(())
}

fn validate_entries(entries: &[StepEntry], scope: &str) -> CompilerResult<()> {
    let mut seen = HashSet::new();

    for entry in entries {
        match entry {
            StepEntry::Run(step) => {
                check_name(&step.name, scope)?;
                if !seen.insert(step.name.as_str()) {
                    return Err(CompilerError::Duplicate(format!(
                        "{} '{}'",
                        scope, step.name
                    )));
                }
            }
            StepEntry::Template(r) => {
                check_name(&r.name, "template reference")?;
            }
        }
    }

    Ok(())
}

fn check_name(name: &str, kind: &str) -> CompilerResult<()> {
    if name.is_empty() {
        return Err(CompilerError::MissingField(format!("{} name", kind)));
    }
    if !NAME_REGEX.is_match(name) {
        return Err(CompilerError::InvalidValue {
            field: format!("{} name", kind),
            message: format!("'{}' is not a valid identifier", name),
        });
    }
    Ok(())
}
