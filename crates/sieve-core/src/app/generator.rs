//! Generator - タスクの生成と投入
//!
//! # フロー
//! 1. 出力チャネルの空きを `reserve()` で待つ（満杯ならここで止まる = backpressure）
//! 2. TaskSource から 1 件取り出す
//! 3. 予約済みの枠に送る
//!
//! 停止条件は cancel / 上限件数 / ソース枯渇のいずれか。
//! 終了時に Sender を drop するので、下流はチャネルのクローズで終わりを知る。

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::status::StageCounters;
use crate::domain::Task;
use crate::error::{PipelineError, Stage};
use crate::ports::TaskSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    Cancelled,
    LimitReached,
    SourceExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSummary {
    pub published: u64,
    pub cause: StopCause,
}

pub(crate) struct Generator {
    source: Box<dyn TaskSource>,
    output: mpsc::Sender<Task>,
    cancel: CancellationToken,
    max_tasks: Option<u64>,
    counters: Arc<StageCounters>,
}

impl Generator {
    pub fn new(
        source: Box<dyn TaskSource>,
        output: mpsc::Sender<Task>,
        cancel: CancellationToken,
        max_tasks: Option<u64>,
        counters: Arc<StageCounters>,
    ) -> Self {
        Self {
            source,
            output,
            cancel,
            max_tasks,
            counters,
        }
    }

    pub async fn run(mut self) -> Result<GeneratorSummary, PipelineError> {
        let mut published = 0u64;
        info!(stage = %Stage::Generator, max_tasks = ?self.max_tasks, "generator started");

        let cause = loop {
            if self.max_tasks.is_some_and(|max| published >= max) {
                break StopCause::LimitReached;
            }

            // cancel を優先して見る。空きがあっても停止要求が来ていれば作らない。
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break StopCause::Cancelled,
                permit = self.output.reserve() => {
                    permit.map_err(|_| PipelineError::closed(Stage::Generator))?
                }
            };

            let Some(task) = self.source.next_task() else {
                break StopCause::SourceExhausted;
            };
            debug!(task_id = %task.id(), created_at = %task.created_at(), "task generated");
            permit.send(task);
            published += 1;
            self.counters.generated.fetch_add(1, Ordering::Relaxed);
        };

        info!(stage = %Stage::Generator, published, cause = ?cause, "generator stopped");
        Ok(GeneratorSummary { published, cause })
    }
}
