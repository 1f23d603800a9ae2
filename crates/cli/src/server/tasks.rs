//! In-memory table of background jobs.
//!
//! Ids are `task_{n}` from a process-wide counter starting at 1. Records
//! are never evicted.

use chrono::{DateTime, Utc};
use forge_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub status: TaskStatus,
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, TaskRecord>>,
    next_id: AtomicU64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending task and return its id.
    pub async fn create(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task_id = format!("task_{}", n);
        let now = Utc::now();

        self.tasks.write().await.insert(
            task_id.clone(),
            TaskRecord {
                task_id: task_id.clone(),
                status: TaskStatus::Pending,
                result: None,
                created_at: now,
                updated_at: now,
            },
        );
        task_id
    }

    async fn update(&self, task_id: &str, status: TaskStatus, result: Option<Value>) {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(record) => {
                record.status = status;
                record.result = result;
                record.updated_at = Utc::now();
            }
            None => tracing::warn!("Update for unknown task {}", task_id),
        }
    }

    pub async fn set_status(&self, task_id: &str, status: TaskStatus) {
        self.update(task_id, status, None).await;
    }

    pub async fn complete(&self, task_id: &str, result: Value) {
        self.update(task_id, TaskStatus::Completed, Some(result)).await;
    }

    pub async fn fail(&self, task_id: &str, error: &str) {
        self.update(
            task_id,
            TaskStatus::Failed,
            Some(serde_json::json!({ "error": error })),
        )
        .await;
    }

    pub async fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks.read().await.get(task_id).cloned()
    }
}

/// Create a task and run `job` for it on the runtime.
///
/// The returned id is pending until the job starts.
pub async fn spawn_job<F>(store: Arc<TaskStore>, kind: &'static str, job: F) -> String
where
    F: Future<Output = AppResult<Value>> + Send + 'static,
{
    let task_id = store.create().await;
    tracing::info!("Queued {} task {}", kind, task_id);

    let id = task_id.clone();
    tokio::spawn(async move {
        store.set_status(&id, TaskStatus::Processing).await;
        match job.await {
            Ok(result) => {
                tracing::info!("Task {} completed", id);
                store.complete(&id, result).await;
            }
            Err(e) => {
                tracing::error!("Error in {} task {}: {}", kind, id, e);
                store.fail(&id, &e.to_string()).await;
            }
        }
    });

    task_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::AppError;
    use std::time::Duration;

    async fn wait_for(store: &TaskStore, id: &str) -> TaskRecord {
        for _ in 0..200 {
            if let Some(record) = store.get(id).await {
                if matches!(record.status, TaskStatus::Completed | TaskStatus::Failed) {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} did not finish", id);
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = TaskStore::new();
        assert_eq!(store.create().await, "task_1");
        assert_eq!(store.create().await, "task_2");
        assert_eq!(store.get("task_2").await.unwrap().status, TaskStatus::Pending);
        assert!(store.get("task_3").await.is_none());
    }

    #[tokio::test]
    async fn test_job_completes() {
        let store = Arc::new(TaskStore::new());
        let id = spawn_job(store.clone(), "test", async {
            Ok(serde_json::json!({"code": "print(1)", "language": "python"}))
        })
        .await;

        let record = wait_for(&store, &id).await;
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.result.unwrap()["code"], "print(1)");
        assert!(record.updated_at >= record.created_at);
    }

    #[tokio::test]
    async fn test_job_failure_records_error() {
        let store = Arc::new(TaskStore::new());
        let id = spawn_job(store.clone(), "test", async {
            Err(AppError::Llm("quota exceeded".to_string()))
        })
        .await;

        let record = wait_for(&store, &id).await;
        assert_eq!(record.status, TaskStatus::Failed);
        let error = record.result.unwrap()["error"].as_str().unwrap().to_string();
        assert!(error.contains("quota exceeded"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
