//! sieve-core
//!
//! Core building blocks for the Sieve task pipeline.
//!
//! Generator → (bounded) → WorkerPool → Classifier → { completed, failed } → Aggregators
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, outcome, staleness, state, report, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, FaultInjector, TaskSource, ResultSink）
//! - **app**: パイプライン本体（builder, config, generator, worker_pool, classifier, aggregator, coordinator）
//! - **impls**: ports の実装（RandomFault, GeneratedTasks, FixedTasks, MemorySink）
//! - **error**: 構造的エラー（PipelineError）

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{Pipeline, PipelineBuilder, PipelineConfig, TerminationPolicy};
pub use domain::{RunReport, Task, TaskError, TaskId};
pub use error::PipelineError;
