//! App - アプリケーション層
//!
//! このモジュールは、ports と domain を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **PipelineBuilder**: 構築とワイヤリング（起動時検証）
//! - **Generator**: TaskSource から取り出して bounded チャネルへ投入
//! - **WorkerPool**: 固定数のワーカーで鮮度判定
//! - **Classifier**: completed / failed への振り分け
//! - **Aggregator**: 結果の収集（書き手 1 つ）
//! - **Pipeline / PipelineHandle**: 起動・停止・drain

pub mod aggregator;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod generator;
pub mod status;
pub mod worker_pool;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, PipelineBuilder};
pub use self::classifier::ClassifierSummary;
pub use self::config::{ConfigError, PipelineConfig, TerminationPolicy};
pub use self::coordinator::{Pipeline, PipelineHandle, StopHandle};
pub use self::generator::{GeneratorSummary, StopCause};
pub use self::status::PipelineStatus;
