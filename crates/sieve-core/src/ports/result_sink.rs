//! ResultSink port - 集計結果の受け取り先
//!
//! 表示（stdout）、ログ、HTTP レスポンスなどは呼び出し側の責務。
//! コアは drain 完了後に RunReport をそのまま渡すだけ。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RunReport;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Receives the two final collections once the pipeline has drained.
///
/// Empty collections are valid and must be accepted.
#[async_trait]
pub trait ResultSink: Send {
    async fn deliver(&mut self, report: &RunReport) -> Result<(), SinkError>;
}
