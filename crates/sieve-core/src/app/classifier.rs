//! Classifier - 処理済みタスクの振り分け
//!
//! - Completed → TaskId を completed チャネルへ
//! - Failed(reason) → TaskError を failed チャネルへ
//! - Pending → 配線のバグなのでエラーで止まる
//!
//! 入力が閉じたら両方の Sender を drop して aggregator に終わりを伝える。

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::app::status::StageCounters;
use crate::domain::{Outcome, Task, TaskError, TaskId};
use crate::error::{PipelineError, Stage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierSummary {
    pub completed: u64,
    pub failed: u64,
}

pub(crate) struct Classifier {
    input: mpsc::Receiver<Task>,
    completed: mpsc::Sender<TaskId>,
    failed: mpsc::Sender<TaskError>,
    counters: Arc<StageCounters>,
}

impl Classifier {
    pub fn new(
        input: mpsc::Receiver<Task>,
        completed: mpsc::Sender<TaskId>,
        failed: mpsc::Sender<TaskError>,
        counters: Arc<StageCounters>,
    ) -> Self {
        Self {
            input,
            completed,
            failed,
            counters,
        }
    }

    pub async fn run(mut self) -> Result<ClassifierSummary, PipelineError> {
        let stage = Stage::Classifier;
        let mut summary = ClassifierSummary::default();
        info!(%stage, "classifier started");

        while let Some(task) = self.input.recv().await {
            match task.outcome() {
                Outcome::Completed => {
                    debug!(%stage, task_id = %task.id(), "routed to completed");
                    self.completed
                        .send(task.id())
                        .await
                        .map_err(|_| PipelineError::closed(stage))?;
                    summary.completed += 1;
                    self.counters.completed.fetch_add(1, Ordering::Relaxed);
                }
                Outcome::Failed(reason) => {
                    debug!(%stage, task_id = %task.id(), %reason, "routed to failed");
                    let err = TaskError::new(task.id(), task.created_at().clone(), reason.clone());
                    self.failed
                        .send(err)
                        .await
                        .map_err(|_| PipelineError::closed(stage))?;
                    summary.failed += 1;
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                }
                Outcome::Pending => {
                    error!(%stage, task_id = %task.id(), "unfinished task reached the classifier");
                    return Err(PipelineError::UnfinishedTask(task.id()));
                }
            }
        }

        info!(%stage, completed = summary.completed, failed = summary.failed, "classifier stopped");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreatedAt, FailureReason};
    use chrono::{TimeZone, Utc};

    fn finished(id: u64, outcome: Outcome) -> Task {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let created_at = if outcome.failure_reason().is_some_and(FailureReason::is_malformed) {
            CreatedAt::malformed()
        } else {
            CreatedAt::At(t)
        };
        let mut task = Task::new(TaskId::new(id), created_at);
        task.finish(outcome, t).unwrap();
        task
    }

    #[tokio::test]
    async fn routes_each_task_to_exactly_one_side() {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (ok_tx, mut ok_rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = mpsc::channel(8);
        let classifier = Classifier::new(in_rx, ok_tx, err_tx, Arc::new(StageCounters::default()));

        in_tx.send(finished(1, Outcome::Completed)).await.unwrap();
        in_tx
            .send(finished(2, Outcome::failed(FailureReason::MalformedTimestamp)))
            .await
            .unwrap();
        in_tx.send(finished(3, Outcome::Completed)).await.unwrap();
        drop(in_tx);

        let summary = classifier.run().await.unwrap();
        assert_eq!(summary, ClassifierSummary { completed: 2, failed: 1 });

        assert_eq!(ok_rx.recv().await, Some(TaskId::new(1)));
        assert_eq!(ok_rx.recv().await, Some(TaskId::new(3)));
        assert_eq!(ok_rx.recv().await, None);

        let err = err_rx.recv().await.unwrap();
        assert_eq!(err.id, TaskId::new(2));
        assert_eq!(err.created_at, CreatedAt::malformed());
        assert_eq!(err.reason, FailureReason::MalformedTimestamp);
        assert!(err_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn pending_task_is_a_structural_error() {
        let (in_tx, in_rx) = mpsc::channel(1);
        let (ok_tx, _ok_rx) = mpsc::channel(1);
        let (err_tx, _err_rx) = mpsc::channel(1);
        let classifier = Classifier::new(in_rx, ok_tx, err_tx, Arc::new(StageCounters::default()));

        in_tx.send(Task::new(TaskId::new(5), Utc::now())).await.unwrap();
        drop(in_tx);

        let err = classifier.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::UnfinishedTask(id) if id == TaskId::new(5)));
    }

    #[tokio::test]
    async fn empty_input_closes_both_outputs() {
        let (in_tx, in_rx) = mpsc::channel::<Task>(1);
        let (ok_tx, mut ok_rx) = mpsc::channel(1);
        let (err_tx, mut err_rx) = mpsc::channel(1);
        drop(in_tx);

        let summary = Classifier::new(in_rx, ok_tx, err_tx, Arc::new(StageCounters::default()))
            .run()
            .await
            .unwrap();
        assert_eq!(summary, ClassifierSummary::default());
        assert!(ok_rx.recv().await.is_none());
        assert!(err_rx.recv().await.is_none());
    }
}
