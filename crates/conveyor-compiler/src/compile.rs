//! Compilation orchestration.

use std::sync::Arc;

use conveyor_core::pipeline::CompiledPipeline;
use conveyor_core::user::User;
use conveyor_core::{ConfigSource, Metadata};
use tracing::debug;

use crate::error::CompileError;
use crate::{expand, parse, template, validate};

/// Sequences one compilation: fetch, parse, validate, expand stages, expand
/// steps. The first failing phase terminates the invocation; no phase is
/// retried here (retrieval retries belong to the [`ConfigSource`]).
///
/// A `Compiler` holds no per-invocation state, so one instance serves
/// concurrent compilations.
pub struct Compiler {
    source: Arc<dyn ConfigSource>,
    metadata: Metadata,
}

impl Compiler {
    pub fn new(source: Arc<dyn ConfigSource>, metadata: Metadata) -> Self {
        Self { source, metadata }
    }

    /// Compile the pipeline configuration of `org/repo`, authenticated as
    /// `owner`, into a fully expanded pipeline.
    pub async fn compile(
        &self,
        owner: &User,
        org: &str,
        repo: &str,
        ref_override: Option<&str>,
    ) -> Result<CompiledPipeline, CompileError> {
        let raw = self
            .source
            .fetch_config(owner, org, repo, ref_override)
            .await?;
        debug!(org, repo, bytes = raw.len(), "fetched pipeline configuration");

        let mut pipeline = parse::parse(&raw).map_err(CompileError::Parse)?;
        pipeline.metadata = self.metadata.clone();

        validate::validate(&pipeline).map_err(CompileError::Validation)?;

        let tmpls = template::map_from_templates(&pipeline.templates);
        debug!(templates = tmpls.len(), "built template index");

        let stages = if pipeline.stages.is_empty() {
            Vec::new()
        } else {
            expand::expand_stages(&pipeline.stages, &tmpls)
                .map_err(CompileError::ExpandStages)?
        };

        let steps =
            expand::expand_steps(&pipeline.steps, &tmpls).map_err(CompileError::ExpandSteps)?;

        Ok(CompiledPipeline {
            metadata: pipeline.metadata,
            version: pipeline.version,
            templates: pipeline.templates,
            stages,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompilerError, RefScope};
    use async_trait::async_trait;
    use conveyor_core::metadata::ServerMetadata;
    use conveyor_core::source::{SourceError, SourceResult};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves a fixed configuration and counts fetches.
    struct FixedSource {
        config: Option<Vec<u8>>,
        fetches: AtomicU32,
    }

    impl FixedSource {
        fn new(config: &str) -> Self {
            Self {
                config: Some(config.as_bytes().to_vec()),
                fetches: AtomicU32::new(0),
            }
        }

        fn unavailable() -> Self {
            Self {
                config: None,
                fetches: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ConfigSource for FixedSource {
        async fn fetch_config(
            &self,
            _owner: &User,
            org: &str,
            repo: &str,
            _ref_override: Option<&str>,
        ) -> SourceResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.config.clone().ok_or_else(|| SourceError::NotFound {
                org: org.to_string(),
                repo: repo.to_string(),
            })
        }
    }

    fn owner() -> User {
        User {
            id: uuid::Uuid::now_v7(),
            name: "octocat".to_string(),
            token: "s3cr3t".to_string(),
            active: true,
            created_at: chrono::Utc::now(),
        }
    }

    fn metadata() -> Metadata {
        Metadata {
            server: ServerMetadata {
                address: "http://localhost:3000".to_string(),
            },
            ..Metadata::default()
        }
    }

    fn compiler(source: FixedSource) -> (Compiler, Arc<FixedSource>) {
        let source = Arc::new(source);
        (Compiler::new(source.clone(), metadata()), source)
    }

    #[tokio::test]
    async fn test_end_to_end_expansion() {
        let config = r#"
            pipeline {
                version "1"
            }

            template "go-test" {
                step "lint" {
                    image "golangci/golangci-lint:v1.58"
                    run "golangci-lint run"
                }
                step "unit" {
                    image "golang:1.22"
                    run "go test ./..."
                }
            }

            stage "test" {
                use "go-test"
            }

            step "notify" {
                image "curlimages/curl"
                run "curl -XPOST https://hooks.example.com"
            }
        "#;
        let (compiler, source) = compiler(FixedSource::new(config));

        let compiled = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap();

        assert_eq!(compiled.stages.len(), 1);
        assert_eq!(compiled.stages[0].name, "test");
        let names: Vec<&str> = compiled.stages[0]
            .steps
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["lint", "unit"]);

        assert_eq!(compiled.steps.len(), 1);
        assert_eq!(compiled.steps[0].name, "notify");

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_config_unavailable_halts_compilation() {
        let (compiler, source) = compiler(FixedSource::unavailable());

        let err = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::ConfigUnavailable(_)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_short_circuits() {
        // Malformed KDL fails at the parse phase; the error kind proves
        // validation and expansion never ran.
        let (compiler, _) = compiler(FixedSource::new("pipeline { version \"1\""));

        let err = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Parse(_)));
    }

    #[tokio::test]
    async fn test_validation_failure_reported_with_phase() {
        let config = r#"
            pipeline {
                version "2"
            }
        "#;
        let (compiler, _) = compiler(FixedSource::new(config));

        let err = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unresolved_step_template_reported() {
        let config = r#"
            pipeline {
                version "1"
            }

            template "build" {
                step "compile" {
                    image "golang:1.22"
                    run "go build ./..."
                }
            }

            use "deploy"
        "#;
        let (compiler, _) = compiler(FixedSource::new(config));

        let err = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap_err();

        match err {
            CompileError::ExpandSteps(CompilerError::UnresolvedTemplate { scope, template }) => {
                assert_eq!(scope, RefScope::Step(0));
                assert_eq!(template, "deploy");
            }
            other => panic!("expected ExpandSteps/UnresolvedTemplate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stageless_pipeline_compiles() {
        let config = r#"
            pipeline {
                version "1"
            }

            step "notify" {
                image "curlimages/curl"
                run "true"
            }
        "#;
        let (compiler, _) = compiler(FixedSource::new(config));

        let compiled = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap();

        assert!(compiled.stages.is_empty());
        assert_eq!(compiled.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_attached_to_output() {
        let config = r#"
            pipeline {
                version "1"
            }
        "#;
        let (compiler, _) = compiler(FixedSource::new(config));

        let compiled = compiler
            .compile(&owner(), "octocat", "widgets", None)
            .await
            .unwrap();

        assert_eq!(compiled.metadata.server.address, "http://localhost:3000");
    }
}
