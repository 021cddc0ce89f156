//! Errors - 失敗タスクの報告用エラー
//!
//! TaskError は classifier が failed チャネルへ流す構造化エラー。
//! 表示形式は `task id <id> time <created_at>, error <reason>`。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CreatedAt, FailureReason, TaskId};

/// A failed task, as reported to the result sink.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("task id {id} time {created_at}, error {reason}")]
pub struct TaskError {
    pub id: TaskId,
    pub created_at: CreatedAt,
    pub reason: FailureReason,
}

impl TaskError {
    pub fn new(id: TaskId, created_at: CreatedAt, reason: FailureReason) -> Self {
        Self {
            id,
            created_at,
            reason,
        }
    }
}
