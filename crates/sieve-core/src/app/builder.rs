//! PipelineBuilder - パイプラインの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - build() 時に PipelineConfig を検証する
//! - 不正な設定（ワーカー 0、容量 0、確率が範囲外など）は BuildError で返す
//! - 起動後に設定ミスで止まることはない

use std::sync::Arc;

use crate::app::config::{ConfigError, PipelineConfig};
use crate::app::coordinator::Pipeline;
use crate::domain::Task;
use crate::impls::{FixedTasks, GeneratedTasks, RandomFault};
use crate::ports::{
    Clock, FaultInjector, IdGenerator, SequentialIdGenerator, SystemClock, TaskSource,
};

/// BuildError はパイプライン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid pipeline config: {0}")]
    Config(#[from] ConfigError),

    /// `id_generator` / `fault_injector` only shape generated tasks.
    #[error("{setting} has no effect on a caller-supplied task source")]
    SourceConflict { setting: &'static str },
}

/// PipelineBuilder はパイプラインを構築
///
/// # 使用例
/// ```ignore
/// let report = Pipeline::builder()
///     .config(PipelineConfig::default().with_workers(8))
///     .clock(Arc::new(SystemClock))
///     .build()?
///     .run()
///     .await?;
/// ```
///
/// 何も指定しなければ SystemClock + 連番 ID + RandomFault(config の確率) で
/// 無限にタスクを生成する。`tasks()` / `source()` を渡すとそちらを使う。
/// その場合 `id_generator()` / `fault_injector()` との併用は BuildError。
pub struct PipelineBuilder {
    config: PipelineConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    fault: Option<Arc<dyn FaultInjector>>,
    source: Option<Box<dyn TaskSource>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            clock: None,
            ids: None,
            fault: None,
            source: None,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Generated tasks only.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replace the probability-based fault rule. Generated tasks only.
    pub fn fault_injector(mut self, fault: Arc<dyn FaultInjector>) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Feed a fixed list of tasks instead of generating them.
    pub fn tasks(self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.source(Box::new(FixedTasks::new(tasks)))
    }

    pub fn source(mut self, source: Box<dyn TaskSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Result<Pipeline, BuildError> {
        self.config.validate()?;
        let policy = self.config.staleness_policy()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let (source, endless): (Box<dyn TaskSource>, bool) = match self.source {
            Some(_) if self.ids.is_some() => {
                return Err(BuildError::SourceConflict {
                    setting: "id_generator",
                });
            }
            Some(_) if self.fault.is_some() => {
                return Err(BuildError::SourceConflict {
                    setting: "fault_injector",
                });
            }
            Some(source) => (source, false),
            None => {
                let ids = self
                    .ids
                    .unwrap_or_else(|| Arc::new(SequentialIdGenerator::new()));
                let probability = self.config.malformed_probability;
                let fault = self
                    .fault
                    .unwrap_or_else(|| Arc::new(RandomFault::new(probability)));
                (
                    Box::new(GeneratedTasks::new(Arc::clone(&clock), ids, fault)),
                    true,
                )
            }
        };

        Ok(Pipeline::new(self.config, policy, clock, source, endless))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
