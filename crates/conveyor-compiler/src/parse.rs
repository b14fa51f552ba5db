//! Pipeline configuration parsing.
//!
//! Turns raw KDL text into a [`Pipeline`] document. Only structural
//! well-formedness is checked here (malformed KDL, missing names, missing
//! images); cross-reference and semantic rules belong to
//! [`validate`](crate::validate).

use crate::error::{CompilerError, CompilerResult};
use conveyor_core::Metadata;
use conveyor_core::pipeline::{Pipeline, Stage, Step, StepEntry, Template, TemplateRef};
use kdl::{KdlDocument, KdlNode};
use std::collections::HashMap;

/// Parse a pipeline document from raw configuration bytes.
///
/// The returned pipeline carries default metadata; the orchestrator attaches
/// the real platform context after parsing.
pub fn parse(raw: &[u8]) -> CompilerResult<Pipeline> {
    let text = std::str::from_utf8(raw)?;
    let doc: KdlDocument = text.parse()?;

    let mut version = String::new();
    let mut templates = Vec::new();
    let mut stages = Vec::new();
    let mut steps = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "pipeline" => {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        if child.name().value() == "version" {
                            version = get_first_string_arg(child).ok_or_else(|| {
                                CompilerError::MissingField("pipeline version".to_string())
                            })?;
                        }
                    }
                }
            }
            "template" => {
                templates.push(parse_template(node)?);
            }
            "stage" => {
                stages.push(parse_stage(node)?);
            }
            "step" => {
                steps.push(StepEntry::Run(parse_step(node)?));
            }
            "use" => {
                steps.push(StepEntry::Template(parse_template_ref(node)?));
            }
            _ => {} // Ignore unknown nodes
        }
    }

    if version.is_empty() {
        return Err(CompilerError::MissingField("pipeline version".to_string()));
    }

    Ok(Pipeline {
        metadata: Metadata::default(),
        version,
        templates,
        stages,
        steps,
    })
}

fn parse_template(node: &KdlNode) -> CompilerResult<Template> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| CompilerError::MissingField("template name".to_string()))?;

    let source = get_string_prop(node, "source");
    let format = get_string_prop(node, "format");

    let mut steps = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "step" {
                steps.push(parse_step(child)?);
            }
        }
    }

    Ok(Template {
        name,
        source,
        format,
        steps,
    })
}

fn parse_stage(node: &KdlNode) -> CompilerResult<Stage> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| CompilerError::MissingField("stage name".to_string()))?;

    let mut steps = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "step" => {
                    steps.push(StepEntry::Run(parse_step(child)?));
                }
                "use" => {
                    steps.push(StepEntry::Template(parse_template_ref(child)?));
                }
                _ => {}
            }
        }
    }

    Ok(Stage { name, steps })
}

fn parse_step(node: &KdlNode) -> CompilerResult<Step> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| CompilerError::MissingField("step name".to_string()))?;

    let mut image = String::new();
    let mut commands = Vec::new();
    let mut env = HashMap::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "image" => {
                    image = get_first_string_arg(child).unwrap_or_default();
                }
                "run" => {
                    if let Some(cmd) = get_first_string_arg(child) {
                        commands.push(cmd);
                    }
                }
                "env" => {
                    if let Some(grandchildren) = child.children() {
                        for gc in grandchildren.nodes() {
                            let key = gc.name().value().to_string();
                            if let Some(val) = get_first_string_arg(gc) {
                                env.insert(key, val);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if image.is_empty() {
        return Err(CompilerError::MissingField(format!(
            "image for step '{}'",
            name
        )));
    }

    Ok(Step {
        name,
        image,
        commands,
        env,
    })
}

fn parse_template_ref(node: &KdlNode) -> CompilerResult<TemplateRef> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| CompilerError::MissingField("template reference name".to_string()))?;

    // Every named property on a `use` node becomes a substitution variable.
    let mut vars = HashMap::new();
    for entry in node.entries() {
        if let Some(entry_name) = entry.name() {
            if let Some(value) = entry.value().as_string() {
                vars.insert(entry_name.value().to_string(), value.to_string());
            }
        }
    }

    Ok(TemplateRef { name, vars })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
