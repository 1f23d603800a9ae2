//! Publish flow against an in-process fake of the GitHub API.

use crate::GitHubClient;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct FakeGitHub {
    files: Arc<Mutex<HashMap<String, String>>>,
    branches: Arc<Mutex<Vec<String>>>,
    puts: Arc<Mutex<Vec<Value>>>,
}

async fn get_ref(Path(branch): Path<String>) -> (StatusCode, Json<Value>) {
    if branch == "main" {
        (
            StatusCode::OK,
            Json(json!({"ref": "refs/heads/main", "object": {"sha": "base-sha"}})),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"})))
    }
}

async fn create_ref(State(fake): State<FakeGitHub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let name = body["ref"].as_str().unwrap_or_default().to_string();
    let mut branches = fake.branches.lock().unwrap();
    if branches.contains(&name) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Reference already exists"})),
        );
    }
    branches.push(name.clone());
    (StatusCode::CREATED, Json(json!({"ref": name, "object": {"sha": body["sha"]}})))
}

async fn get_file(State(fake): State<FakeGitHub>, Path(path): Path<String>) -> (StatusCode, Json<Value>) {
    match fake.files.lock().unwrap().get(&path) {
        Some(sha) => (StatusCode::OK, Json(json!({"path": path, "sha": sha}))),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))),
    }
}

async fn put_file(
    State(fake): State<FakeGitHub>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.puts.lock().unwrap().push(body);
    let existed = fake
        .files
        .lock()
        .unwrap()
        .insert(path.clone(), "file-sha".to_string())
        .is_some();

    let status = if existed { StatusCode::OK } else { StatusCode::CREATED };
    (
        status,
        Json(json!({
            "content": {"sha": "file-sha", "html_url": format!("https://github.com/octo/demo/blob/x/{}", path)},
            "commit": {"sha": "c1", "html_url": "https://github.com/octo/demo/commit/c1"}
        })),
    )
}

async fn create_pull(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({"number": 7, "html_url": format!("https://github.com/octo/demo/pull/7?head={}", body["head"].as_str().unwrap_or_default())})),
    )
}

async fn start(fake: FakeGitHub) -> GitHubClient {
    let app = Router::new()
        .route("/repos/octo/demo/git/ref/heads/:branch", get(get_ref))
        .route("/repos/octo/demo/git/refs", post(create_ref))
        .route("/repos/octo/demo/contents/*path", get(get_file).put(put_file))
        .route("/repos/octo/demo/pulls", post(create_pull))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    GitHubClient::new("ghp_test", "octo", "demo")
        .unwrap()
        .with_api_url(&format!("http://{}", addr))
}

#[tokio::test]
async fn test_publish_new_file_on_base_branch() {
    let fake = FakeGitHub::default();
    let client = start(fake.clone()).await;

    let result = client
        .commit_and_push("print(1)", "src/main.py", "Add main", "main")
        .await
        .unwrap();

    assert_eq!(result.status, "success");
    assert_eq!(result.file_path, "src/main.py");
    assert_eq!(result.branch, "main");
    assert_eq!(result.commit_url, "https://github.com/octo/demo/commit/c1");
    assert_eq!(result.file_url, "https://github.com/octo/demo/blob/x/src/main.py");

    assert!(fake.branches.lock().unwrap().is_empty());
    let puts = fake.puts.lock().unwrap();
    assert_eq!(puts[0]["content"], "cHJpbnQoMSk=");
    assert_eq!(puts[0]["message"], "Add main");
    assert!(puts[0].get("sha").is_none());
}

#[tokio::test]
async fn test_update_sends_existing_sha() {
    let fake = FakeGitHub::default();
    fake.files
        .lock()
        .unwrap()
        .insert("app.py".to_string(), "old-sha".to_string());
    let client = start(fake.clone()).await;

    client
        .create_or_update_file("app.py", "x = 2", "Update app", "main")
        .await
        .unwrap();

    assert_eq!(fake.puts.lock().unwrap()[0]["sha"], "old-sha");
}

#[tokio::test]
async fn test_feature_branch_is_created_once() {
    let fake = FakeGitHub::default();
    let client = start(fake.clone()).await;

    client
        .commit_and_push("a", "a.py", "first", "feature/gen")
        .await
        .unwrap();
    let second = client
        .commit_and_push("b", "a.py", "second", "feature/gen")
        .await
        .unwrap();

    assert_eq!(second.branch, "feature/gen");
    assert_eq!(
        *fake.branches.lock().unwrap(),
        vec!["refs/heads/feature/gen".to_string()]
    );
    assert_eq!(fake.puts.lock().unwrap()[1]["branch"], "feature/gen");
}

#[tokio::test]
async fn test_existing_branch_keeps_base_sha() {
    let fake = FakeGitHub::default();
    fake.branches
        .lock()
        .unwrap()
        .push("refs/heads/dev".to_string());
    let client = start(fake).await;

    let git_ref = client.create_branch("dev", "main").await.unwrap();
    assert_eq!(git_ref.name, "refs/heads/dev");
    assert_eq!(git_ref.object.sha, "base-sha");
}

#[tokio::test]
async fn test_missing_base_branch_is_error() {
    let client = start(FakeGitHub::default()).await;
    let result = client.create_branch("dev", "trunk").await;
    assert!(matches!(result, Err(forge_core::AppError::GitHub(_))));
}

#[tokio::test]
async fn test_create_pull_request() {
    let client = start(FakeGitHub::default()).await;
    let pr = client
        .create_pull_request("Generated code", "body", "feature/gen", "main")
        .await
        .unwrap();
    assert_eq!(pr.number, 7);
    assert_eq!(
        pr.html_url.as_deref(),
        Some("https://github.com/octo/demo/pull/7?head=feature/gen")
    );
}
