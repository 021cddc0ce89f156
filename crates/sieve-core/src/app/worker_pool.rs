//! WorkerPool - 固定数のワーカーでタスクを処理
//!
//! # フロー（ワーカー 1 本あたり）
//! 1. 共有 Receiver から 1 件だけ受け取る（受け取った値だけを処理する）
//! 2. StalenessPolicy で outcome を決め、finished_at を打刻
//! 3. 擬似的な処理時間（jitter）を待つ
//! 4. 出力チャネルへ送る
//!
//! 入力チャネルが閉じて空になったらワーカーは終了する。出力 Sender は
//! 各ワーカーが clone を 1 つずつ持つので、最後のワーカーが抜けた時点で
//! 出力チャネルは一度だけ閉じる。

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::status::{LiveWorkerGuard, StageCounters};
use crate::domain::{StalenessPolicy, Task};
use crate::error::{PipelineError, Stage};
use crate::ports::Clock;

/// What every worker needs to decorate a task.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub clock: Arc<dyn Clock>,
    pub policy: StalenessPolicy,
    pub max_jitter: Duration,
    pub counters: Arc<StageCounters>,
}

/// Worker group handle.
/// - `join()` で全ワーカーの終了を待てる
/// - 停止はチャネルのクローズで伝わる（個別のフラグは持たない）
pub(crate) struct WorkerPool {
    joins: Vec<JoinHandle<Result<u64, PipelineError>>>,
}

impl WorkerPool {
    /// Spawn `n` workers sharing one input receiver.
    pub fn spawn(
        n: usize,
        input: mpsc::Receiver<Task>,
        output: mpsc::Sender<Task>,
        ctx: WorkerContext,
    ) -> Self {
        let input = Arc::new(Mutex::new(input));

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let input = Arc::clone(&input);
            let output = output.clone();
            let ctx = ctx.clone();
            // guard は spawn 前に作る。join 前に live_workers を読んでも取りこぼさない。
            let guard = LiveWorkerGuard::enter(Arc::clone(&ctx.counters));

            let join = tokio::spawn(async move {
                let _guard = guard;
                worker_loop(worker_id, input, output, ctx).await
            });
            joins.push(join);
        }
        // 元の Sender はここで drop。以降はワーカーの clone だけが出力を開いている。
        drop(output);

        Self { joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    /// Wait for every worker. Returns how many tasks were processed in total,
    /// or every error the workers reported.
    pub async fn join(self) -> Result<u64, Vec<PipelineError>> {
        let mut processed = 0;
        let mut errors = Vec::new();
        for (worker_id, join) in self.joins.into_iter().enumerate() {
            match join.await {
                Ok(Ok(n)) => processed += n,
                Ok(Err(e)) => errors.push(e),
                Err(e) => errors.push(PipelineError::from_join(Stage::Worker(worker_id), e)),
            }
        }
        if errors.is_empty() {
            Ok(processed)
        } else {
            Err(errors)
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    input: Arc<Mutex<mpsc::Receiver<Task>>>,
    output: mpsc::Sender<Task>,
    ctx: WorkerContext,
) -> Result<u64, PipelineError> {
    let stage = Stage::Worker(worker_id);
    let mut processed = 0u64;
    debug!(%stage, "worker started");

    loop {
        // ロックは受信の間だけ。処理中は他のワーカーが受信できる。
        let next = {
            let mut rx = input.lock().await;
            rx.recv().await
        };
        let Some(mut task) = next else {
            break;
        };

        process(&mut task, &ctx)?;
        debug!(
            %stage,
            task_id = %task.id(),
            outcome = ?task.outcome(),
            "task processed"
        );

        let delay = jitter(ctx.max_jitter);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        output
            .send(task)
            .await
            .map_err(|_| PipelineError::closed(stage))?;
        processed += 1;
        ctx.counters.processed.fetch_add(1, Ordering::Relaxed);
    }

    info!(%stage, processed, "worker stopped");
    Ok(processed)
}

/// Attach the outcome and finish time. A task can only be finished once.
pub(crate) fn process(task: &mut Task, ctx: &WorkerContext) -> Result<(), PipelineError> {
    let now = ctx.clock.now();
    let outcome = ctx.policy.evaluate(task.created_at(), now);
    task.finish(outcome, now)?;
    Ok(())
}

fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
}
