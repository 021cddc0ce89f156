//! Coordinator - ステージの配線・起動・停止・drain
//!
//! # 状態遷移
//! Idle → Running → Draining → Done
//!
//! - `start()` で全ステージを起動して Running
//! - 停止シグナル（stop / 期限 / 上限件数 / ソース枯渇）で generator が抜けたら Draining
//! - generator → workers → classifier → aggregators の順に全 JoinHandle を
//!   待ち終えてから Done。固定時間の sleep で待つことはしない。

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::app::aggregator::Aggregator;
use crate::app::builder::PipelineBuilder;
use crate::app::classifier::{Classifier, ClassifierSummary};
use crate::app::config::PipelineConfig;
use crate::app::generator::{Generator, GeneratorSummary};
use crate::app::status::{PipelineStatus, StageCounters};
use crate::app::worker_pool::{WorkerContext, WorkerPool};
use crate::domain::{PipelineState, RunReport, StalenessPolicy, TaskError, TaskId};
use crate::error::{PipelineError, Stage};
use crate::ports::{Clock, ResultSink, TaskSource};

/// Moves the shared state forward; illegal transitions are ignored.
fn advance(state: &watch::Sender<PipelineState>, next: PipelineState) -> bool {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            info!(from = %current, to = %next, "pipeline state changed");
            *current = next;
            true
        } else {
            false
        }
    })
}

/// A wired but not yet started pipeline. Build one with [`Pipeline::builder`].
pub struct Pipeline {
    config: PipelineConfig,
    policy: StalenessPolicy,
    clock: Arc<dyn Clock>,
    source: Box<dyn TaskSource>,
    endless: bool,
    state: Arc<watch::Sender<PipelineState>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub(crate) fn new(
        config: PipelineConfig,
        policy: StalenessPolicy,
        clock: Arc<dyn Clock>,
        source: Box<dyn TaskSource>,
        endless: bool,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            config,
            policy,
            clock,
            source,
            endless,
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Observe state transitions, starting from `Idle`.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Spawn every stage. Must be called inside a tokio runtime.
    pub fn start(self) -> PipelineHandle {
        let Pipeline {
            config,
            policy,
            clock,
            source,
            state,
            ..
        } = self;

        let started_at = Instant::now();
        let cancel = CancellationToken::new();
        let counters = Arc::new(StageCounters::default());

        let (generated_tx, generated_rx) = mpsc::channel(config.generated_capacity);
        let (processed_tx, processed_rx) = mpsc::channel(config.processed_capacity);
        let (completed_tx, completed_rx) = mpsc::channel::<TaskId>(config.completed_capacity);
        let (failed_tx, failed_rx) = mpsc::channel::<TaskError>(config.failed_capacity);

        // 下流から起動する。上流が送り始めた時点で受け手が必ずいる。
        let completed = Aggregator::spawn(Stage::CompletedAggregator, completed_rx);
        let failed = Aggregator::spawn(Stage::FailedAggregator, failed_rx);
        let classifier = tokio::spawn(
            Classifier::new(processed_rx, completed_tx, failed_tx, Arc::clone(&counters)).run(),
        );
        let workers = WorkerPool::spawn(
            config.workers,
            generated_rx,
            processed_tx,
            WorkerContext {
                clock,
                policy,
                max_jitter: config.max_jitter,
                counters: Arc::clone(&counters),
            },
        );

        // generator より先に Running にしておく（すぐ枯渇するソースでも順序が崩れない）
        advance(&state, PipelineState::Running);
        info!(
            workers = workers.len(),
            generated_capacity = config.generated_capacity,
            staleness_threshold = ?config.staleness_threshold,
            "pipeline started"
        );

        let generator = {
            let generator = Generator::new(
                source,
                generated_tx,
                cancel.clone(),
                config.termination.max_tasks,
                Arc::clone(&counters),
            );
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                let result = generator.run().await;
                advance(&state, PipelineState::Draining);
                result
            })
        };

        let deadline = config.termination.max_duration.map(|limit| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        info!(?limit, "run duration reached, stopping");
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            })
        });

        PipelineHandle {
            cancel,
            state,
            counters,
            started_at,
            generator,
            deadline,
            workers,
            classifier,
            completed,
            failed,
        }
    }

    /// Start, then wait for the run to end according to the termination policy.
    ///
    /// 無限ソースに停止条件がない場合は誰も止められないので、起動せずに
    /// `NoTermination` を返す。
    pub async fn run(self) -> Result<RunReport, PipelineError> {
        if self.endless && self.config.termination.is_manual() {
            return Err(PipelineError::NoTermination);
        }
        self.start().wait().await
    }

    /// Like [`Pipeline::run`], then hand the report to `sink`.
    pub async fn run_into(self, sink: &mut dyn ResultSink) -> Result<RunReport, PipelineError> {
        let report = self.run().await?;
        sink.deliver(&report).await?;
        Ok(report)
    }
}

/// Cheap, clonable way to stop a running pipeline from anywhere.
///
/// Stopping is idempotent: calling it again has no further effect.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("stop requested");
        }
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A running pipeline.
pub struct PipelineHandle {
    cancel: CancellationToken,
    state: Arc<watch::Sender<PipelineState>>,
    counters: Arc<StageCounters>,
    started_at: Instant,
    generator: JoinHandle<Result<GeneratorSummary, PipelineError>>,
    deadline: Option<JoinHandle<()>>,
    workers: WorkerPool,
    classifier: JoinHandle<Result<ClassifierSummary, PipelineError>>,
    completed: Aggregator<TaskId>,
    failed: Aggregator<TaskError>,
}

impl PipelineHandle {
    /// Ask the generator to stop producing. In-flight tasks still drain.
    pub fn stop(&self) {
        self.stopper().stop();
    }

    pub fn stopper(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> PipelineStatus {
        self.counters.snapshot(self.state())
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Wait until every stage has finished, then return the aggregated results.
    ///
    /// Stages are joined in pipeline order. Structural errors from any stage
    /// are returned once all stages are joined; nothing is left running.
    pub async fn wait(self) -> Result<RunReport, PipelineError> {
        let mut errors = Vec::new();

        let generated = match self.generator.await {
            Ok(Ok(summary)) => summary.published,
            Ok(Err(e)) => {
                errors.push(e);
                self.counters.generated.load(Ordering::Relaxed)
            }
            Err(e) => {
                errors.push(PipelineError::from_join(Stage::Generator, e));
                self.counters.generated.load(Ordering::Relaxed)
            }
        };
        // generator が panic していても Draining には進める
        advance(&self.state, PipelineState::Draining);

        // 期限タイマーを片付ける（cancel は冪等）
        self.cancel.cancel();
        if let Some(deadline) = self.deadline {
            if let Err(e) = deadline.await {
                errors.push(PipelineError::from_join(Stage::Deadline, e));
            }
        }

        if let Err(mut worker_errors) = self.workers.join().await {
            errors.append(&mut worker_errors);
        }

        match self.classifier.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => errors.push(e),
            Err(e) => errors.push(PipelineError::from_join(Stage::Classifier, e)),
        }

        let completed = self.completed.join().await.unwrap_or_else(|e| {
            errors.push(e);
            Vec::new()
        });
        let failed = self.failed.join().await.unwrap_or_else(|e| {
            errors.push(e);
            Vec::new()
        });

        let live_workers = self.counters.live_workers.load(Ordering::Acquire);
        if live_workers != 0 {
            warn!(live_workers, "workers still alive after drain");
        }
        advance(&self.state, PipelineState::Done);

        for e in &errors {
            error!(error = %e, "pipeline stage failed");
        }
        if let Some(e) = PipelineError::root_cause(errors) {
            return Err(e);
        }

        let report = RunReport {
            completed,
            failed,
            generated,
            elapsed: self.started_at.elapsed(),
            live_workers,
        };
        info!(
            generated = report.generated,
            completed = report.completed.len(),
            failed = report.failed.len(),
            elapsed = ?report.elapsed,
            "pipeline drained"
        );
        Ok(report)
    }

    /// Stop and wait.
    pub async fn shutdown(self) -> Result<RunReport, PipelineError> {
        self.stop();
        self.wait().await
    }
}
