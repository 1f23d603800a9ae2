//! Handlers for the job API.
//!
//! Every POST queues a background job and answers with its task id at once;
//! clients poll `GET /api/task/:task_id` for the outcome.

use crate::server::models::{
    CodeResult, DebugCodeRequest, DocumentCodeRequest, GenerateCodeRequest,
    GithubIntegrationRequest, OptimizeCodeRequest, TaskResponse,
};
use crate::server::tasks::{spawn_job, TaskStatus};
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use forge_agents::{generate, GenerateRequest};
use forge_core::{AppError, AppResult};
use serde_json::{json, Value};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/generate-code", post(generate_code))
        .route("/debug-code", post(debug_code))
        .route("/optimize-code", post(optimize_code))
        .route("/document-code", post(document_code))
        .route("/github-integration", post(github_integration))
        .route("/task/:task_id", get(task_status));

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Forge code generation API",
        "docs": "/api",
        "status": "operational",
    }))
}

fn accepted(task_id: String) -> Json<TaskResponse> {
    Json(TaskResponse {
        task_id,
        status: TaskStatus::Pending,
    })
}

fn code_result(code: String, language: String) -> AppResult<Value> {
    Ok(serde_json::to_value(CodeResult { code, language })?)
}

async fn generate_code(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Json<TaskResponse> {
    let registry = state.registry.clone();
    let task_id = spawn_job(state.tasks.clone(), "generation", async move {
        let request = GenerateRequest {
            prompt: req.prompt,
            language: req.language,
            debug: req.debug,
            optimize: req.optimize,
            document: req.document,
        };
        let generated = generate(&registry, &request).await?;
        code_result(generated.code, generated.language)
    })
    .await;
    accepted(task_id)
}

async fn debug_code(
    State(state): State<AppState>,
    Json(req): Json<DebugCodeRequest>,
) -> Json<TaskResponse> {
    let registry = state.registry.clone();
    let task_id = spawn_job(state.tasks.clone(), "debugging", async move {
        let errors = req.joined_errors();
        let code = registry
            .debugging
            .debug_code(&req.code, &req.language, errors.as_deref())
            .await?;
        code_result(code, req.language)
    })
    .await;
    accepted(task_id)
}

async fn optimize_code(
    State(state): State<AppState>,
    Json(req): Json<OptimizeCodeRequest>,
) -> Json<TaskResponse> {
    let registry = state.registry.clone();
    let task_id = spawn_job(state.tasks.clone(), "optimization", async move {
        let code = registry
            .optimization
            .optimize_code(&req.code, &req.language, &req.optimization_target)
            .await?;
        code_result(code, req.language)
    })
    .await;
    accepted(task_id)
}

async fn document_code(
    State(state): State<AppState>,
    Json(req): Json<DocumentCodeRequest>,
) -> Json<TaskResponse> {
    let registry = state.registry.clone();
    let task_id = spawn_job(state.tasks.clone(), "documentation", async move {
        let code = registry
            .documentation
            .document_code(&req.code, &req.language, &req.documentation_style)
            .await?;
        code_result(code, req.language)
    })
    .await;
    accepted(task_id)
}

async fn github_integration(
    State(state): State<AppState>,
    Json(req): Json<GithubIntegrationRequest>,
) -> Json<TaskResponse> {
    let github = state.github.clone();
    let task_id = spawn_job(state.tasks.clone(), "GitHub integration", async move {
        let client = github.ok_or_else(|| {
            AppError::GitHub("GitHub integration is not configured".to_string())
        })?;
        let result = client
            .commit_and_push(&req.code, &req.file_path, &req.commit_message, &req.branch)
            .await?;
        Ok(serde_json::to_value(result)?)
    })
    .await;
    accepted(task_id)
}

async fn task_status(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    match state.tasks.get(&task_id).await {
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Task not found" })),
        )
            .into_response(),
    }
}
