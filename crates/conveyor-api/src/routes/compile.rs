//! Pipeline compilation endpoint.

use axum::extract::{Path, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use conveyor_core::ResourceId;
use conveyor_core::pipeline::CompiledPipeline;
use conveyor_db::DbError;

pub fn router() -> Router<AppState> {
    Router::new().route("/{org}/{repo}", post(compile))
}

#[derive(Debug, Deserialize)]
struct CompileQuery {
    /// Commit or branch overriding the repository's default branch.
    r#ref: Option<String>,
}

/// Compile the pipeline configuration of a connected repository into a
/// fully expanded pipeline.
async fn compile(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<CompileQuery>,
) -> Result<Json<CompiledPipeline>, ApiError> {
    let repository = state
        .repository_store
        .get_by_full_name(&org, &repo)
        .await
        .map_err(|err| match err {
            DbError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        })?;

    let owner = state
        .user_store
        .get_by_id(ResourceId::from_uuid(repository.user_id))
        .await
        .map_err(|err| {
            ApiError::BadRequest(format!(
                "unable to get owner for {}: {}",
                repository.full_name, err
            ))
        })?;

    info!(
        repo = %repository.full_name,
        owner = %owner.name,
        git_ref = query.r#ref.as_deref().unwrap_or(&repository.branch),
        "compiling pipeline"
    );

    let compiled = state
        .compiler
        .compile(
            &owner,
            &repository.org,
            &repository.name,
            query.r#ref.as_deref(),
        )
        .await?;

    Ok(Json(compiled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use conveyor_core::Metadata;
    use conveyor_core::metadata::ServerMetadata;
    use conveyor_core::repository::Repository;
    use conveyor_core::user::User;
    use conveyor_db::{DbResult, RepositoryStore, UserStore};
    use conveyor_source::MemorySource;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FakeUserStore {
        user: Option<User>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn get_by_id(&self, id: ResourceId) -> DbResult<User> {
            self.user
                .clone()
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
        }
    }

    struct FakeRepositoryStore {
        repository: Option<Repository>,
    }

    #[async_trait]
    impl RepositoryStore for FakeRepositoryStore {
        async fn get_by_full_name(&self, org: &str, name: &str) -> DbResult<Repository> {
            self.repository
                .clone()
                .ok_or_else(|| DbError::NotFound(format!("repository {}/{}", org, name)))
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

    fn repository(user_id: uuid::Uuid) -> Repository {
        Repository {
            id: uuid::Uuid::now_v7(),
            user_id,
            org: "octocat".to_string(),
            name: "widgets".to_string(),
            full_name: "octocat/widgets".to_string(),
            branch: "main".to_string(),
            config_path: ".conveyor.kdl".to_string(),
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

    fn app(
        user: Option<User>,
        repository: Option<Repository>,
        source: MemorySource,
    ) -> axum::Router {
        let state = AppState::with_collaborators(
            Arc::new(FakeUserStore { user }),
            Arc::new(FakeRepositoryStore { repository }),
            Arc::new(source),
            metadata(),
        );
        routes::router(state)
    }

    fn compile_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/compile/octocat/widgets")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_compile_success() {
        let user = owner();
        let source = MemorySource::new();
        source.insert(
            "octocat",
            "widgets",
            r#"
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
                    run "true"
                }
            "#,
        );
        let app = app(Some(user.clone()), Some(repository(user.id)), source);

        let response = app.oneshot(compile_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let compiled: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(compiled["stages"][0]["name"], "test");
        assert_eq!(compiled["stages"][0]["steps"][0]["name"], "lint");
        assert_eq!(compiled["stages"][0]["steps"][1]["name"], "unit");
        assert_eq!(compiled["steps"][0]["name"], "notify");
    }

    #[tokio::test]
    async fn test_unknown_repository_is_not_found() {
        let app = app(Some(owner()), None, MemorySource::new());

        let response = app.oneshot(compile_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_owner_is_bad_request() {
        let user = owner();
        let app = app(None, Some(repository(user.id)), MemorySource::new());

        let response = app.oneshot(compile_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_configuration_is_not_found() {
        let user = owner();
        let app = app(Some(user.clone()), Some(repository(user.id)), MemorySource::new());

        let response = app.oneshot(compile_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unresolved_template_is_internal_error() {
        let user = owner();
        let source = MemorySource::new();
        source.insert(
            "octocat",
            "widgets",
            r#"
                pipeline {
                    version "1"
                }

                use "deploy"
            "#,
        );
        let app = app(Some(user.clone()), Some(repository(user.id)), source);

        let response = app.oneshot(compile_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let message = error["error"].as_str().unwrap();
        assert!(message.contains("deploy"));
        assert!(message.contains("unable to expand steps"));
    }
}
