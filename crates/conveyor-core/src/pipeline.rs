//! Pipeline document types.
//!
//! A [`Pipeline`] is the parsed form of a user-authored configuration file:
//! templates, stages, and top-level steps, where stages and steps may still
//! contain template references. A [`CompiledPipeline`] is the fully expanded
//! result; template references cannot be represented in it, so a compiled
//! pipeline is self-contained by construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::metadata::Metadata;

/// A parsed pipeline document, prior to template expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Platform context attached by the compiler after parsing.
    pub metadata: Metadata,
    /// Schema version declared in the `pipeline` header.
    pub version: String,
    /// Named reusable step fragments, in document order.
    pub templates: Vec<Template>,
    /// Stages, in document order. May be empty.
    pub stages: Vec<Stage>,
    /// Top-level steps, in document order. May be empty.
    pub steps: Vec<StepEntry>,
}

/// A named, reusable fragment of steps referenced from stages or the
/// top-level step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Lookup key; unique within a valid document.
    pub name: String,
    /// Provenance of the template body. Carried through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Expansion-strategy discriminator. Carried through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// The steps inlined wherever this template is referenced.
    pub steps: Vec<Step>,
}

/// A named, ordered group of steps, possibly containing template references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub steps: Vec<StepEntry>,
}

/// A pre-expansion entry in a step sequence: either a concrete step or a
/// reference to a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEntry {
    Run(Step),
    Template(TemplateRef),
}

/// A reference to a template by name, with substitution variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    /// Values substituted for `${inputs.<key>}` in the template body.
    #[serde(default)]
    pub vars: HashMap<String, String>,
}

/// A single executable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// Container image the step runs in.
    pub image: String,
    /// Commands executed in order inside the image.
    pub commands: Vec<String>,
    /// Step-scoped environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// A fully expanded pipeline, ready for execution scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledPipeline {
    pub metadata: Metadata,
    pub version: String,
    /// The templates the document declared, kept for provenance.
    pub templates: Vec<Template>,
    pub stages: Vec<CompiledStage>,
    pub steps: Vec<Step>,
}

/// A stage after expansion: concrete steps only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledStage {
    pub name: String,
    pub steps: Vec<Step>,
}
